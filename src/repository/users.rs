//! Users repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use super::contains_pattern;
use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User, UserQuery},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get an active user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1) AND is_active",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List users with optional filters
    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        let pattern = query.name.as_deref().map(contains_pattern);
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::text IS NULL OR role = $1)
              AND ($2::int IS NULL OR lab_id = $2)
              AND ($3::text IS NULL OR LOWER(username) LIKE $3 ESCAPE '\' OR LOWER(full_name) LIKE $3 ESCAPE '\')
            ORDER BY full_name
            "#,
        )
        .bind(query.role.map(|r| r.as_str()))
        .bind(query.lab_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Custodian currently assigned to a laboratory
    pub async fn custodian_of(&self, lab_id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE lab_id = $1 AND role = 'custodian'",
        )
        .bind(lab_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a user with an already-hashed password
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        username: &str,
        password_hash: &str,
        full_name: &str,
        email: Option<&str>,
        role: Role,
        lab_id: Option<i32>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, full_name, email, role, lab_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(email)
        .bind(role)
        .bind(lab_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Update a user; `None` fields keep their current value
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i32,
        password_hash: Option<&str>,
        full_name: Option<&str>,
        email: Option<&str>,
        role: Option<Role>,
        lab_id: Option<i32>,
        is_active: Option<bool>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                password_hash = COALESCE($2, password_hash),
                full_name = COALESCE($3, full_name),
                email = COALESCE($4, email),
                role = COALESCE($5, role),
                lab_id = COALESCE($6, lab_id),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(full_name)
        .bind(email)
        .bind(role)
        .bind(lab_id)
        .bind(is_active)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Delete a user
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Whether at least one active administrator exists
    pub async fn admin_exists(&self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin' AND is_active)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

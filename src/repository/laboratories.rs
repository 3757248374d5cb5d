//! Laboratories repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::laboratory::{CreateLaboratory, Laboratory, LaboratoryOption, UpdateLaboratory},
};

const LAB_SELECT: &str = r#"
    SELECT l.lab_id, l.lab_name, l.location, l.in_charge_id,
           u.full_name AS in_charge_name, l.created_at, l.updated_at
    FROM laboratories l
    LEFT JOIN users u ON u.user_id = l.in_charge_id
"#;

#[derive(Clone)]
pub struct LaboratoriesRepository {
    pool: Pool<Postgres>,
}

impl LaboratoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List laboratories, optionally restricted to one
    pub async fn list(&self, lab_filter: Option<i32>) -> AppResult<Vec<Laboratory>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR l.lab_id = $1) ORDER BY l.lab_name",
            LAB_SELECT
        );
        let labs = sqlx::query_as::<_, Laboratory>(&query)
            .bind(lab_filter)
            .fetch_all(&self.pool)
            .await?;
        Ok(labs)
    }

    /// Names and ids only, for public form selectors
    pub async fn list_options(&self) -> AppResult<Vec<LaboratoryOption>> {
        let labs = sqlx::query_as::<_, LaboratoryOption>(
            "SELECT lab_id, lab_name FROM laboratories ORDER BY lab_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(labs)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Laboratory> {
        let query = format!("{} WHERE l.lab_id = $1", LAB_SELECT);
        sqlx::query_as::<_, Laboratory>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Laboratory {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM laboratories WHERE lab_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Number of (workstations, assets) in a laboratory
    pub async fn counts(&self, id: i32) -> AppResult<(i64, i64)> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM workstations WHERE lab_id = $1),
                (SELECT COUNT(*) FROM inventory_assets WHERE lab_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn create(&self, data: &CreateLaboratory) -> AppResult<Laboratory> {
        let lab_id: i32 = sqlx::query_scalar(
            "INSERT INTO laboratories (lab_name, location) VALUES ($1, $2) RETURNING lab_id",
        )
        .bind(data.lab_name.trim())
        .bind(&data.location)
        .fetch_one(&self.pool)
        .await?;
        self.get_by_id(lab_id).await
    }

    pub async fn update(&self, id: i32, data: &UpdateLaboratory) -> AppResult<Laboratory> {
        let result = sqlx::query(
            r#"
            UPDATE laboratories SET
                lab_name = COALESCE($2, lab_name),
                location = COALESCE($3, location),
                updated_at = NOW()
            WHERE lab_id = $1
            "#,
        )
        .bind(id)
        .bind(data.lab_name.as_deref().map(str::trim))
        .bind(&data.location)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Laboratory {} not found", id)));
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM laboratories WHERE lab_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Laboratory {} not found", id)));
        }
        Ok(())
    }

    /// Makes `user_id` the only custodian in charge of `lab_id`.
    ///
    /// Clears the user from any other laboratory it was in charge of,
    /// detaches the custodian previously assigned here and points the
    /// user's own assignment at this laboratory.
    pub async fn assign_custodian(
        &self,
        conn: &mut PgConnection,
        lab_id: i32,
        user_id: i32,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE laboratories SET in_charge_id = NULL, updated_at = NOW() WHERE in_charge_id = $1 AND lab_id <> $2",
        )
        .bind(user_id)
        .bind(lab_id)
        .execute(&mut *conn)
        .await?;

        let result = sqlx::query(
            "UPDATE laboratories SET in_charge_id = $2, updated_at = NOW() WHERE lab_id = $1",
        )
        .bind(lab_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Laboratory {} not found", lab_id)));
        }

        sqlx::query(
            "UPDATE users SET lab_id = NULL, updated_at = NOW() WHERE lab_id = $1 AND role = 'custodian' AND user_id <> $2",
        )
        .bind(lab_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query("UPDATE users SET lab_id = $2, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .bind(lab_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Removes `user_id` from every laboratory it is in charge of
    pub async fn release_custodian(&self, conn: &mut PgConnection, user_id: i32) -> AppResult<()> {
        sqlx::query("UPDATE laboratories SET in_charge_id = NULL, updated_at = NOW() WHERE in_charge_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Name of the custodian in charge, used as "monitored by" on reports
    pub async fn custodian_name(&self, lab_id: i32) -> AppResult<Option<String>> {
        let name: Option<String> = sqlx::query_scalar(
            r#"
            SELECT u.full_name
            FROM laboratories l
            JOIN users u ON u.user_id = l.in_charge_id
            WHERE l.lab_id = $1
            "#,
        )
        .bind(lab_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(name)
    }
}

//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserClaims, UserQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by username and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password_hash, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.user_id,
            role: user.role,
            lab_id: user.lab_id,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!(user_id = user.user_id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        self.repository.users.list(query).await
    }

    /// Create a new user; a custodian given a laboratory is put in charge of it
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        if let Some(lab_id) = data.lab_id {
            self.ensure_lab_exists(lab_id).await?;
        }
        let custodian_lab = custodian_lab(data.role, data.lab_id);
        if let Some(lab_id) = custodian_lab {
            let holder = self.repository.users.custodian_of(lab_id).await?;
            ensure_lab_free(lab_id, holder.as_ref(), None)?;
        }

        let hash = hash_password(&data.password)?;
        let mut tx = self.repository.begin().await?;
        let user = self
            .repository
            .users
            .create(
                &mut tx,
                data.username.trim(),
                &hash,
                data.full_name.trim(),
                data.email.as_deref(),
                data.role,
                data.lab_id,
            )
            .await?;
        if let Some(lab_id) = custodian_lab {
            self.repository
                .laboratories
                .assign_custodian(&mut tx, lab_id, user.user_id)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(user_id = user.user_id, role = %user.role, lab_id = ?user.lab_id, "User created");
        Ok(user)
    }

    /// Update an existing user, keeping the laboratory's custodian in step
    pub async fn update_user(&self, id: i32, data: UpdateUser) -> AppResult<User> {
        let current = self.repository.users.get_by_id(id).await?;
        if let Some(lab_id) = data.lab_id {
            self.ensure_lab_exists(lab_id).await?;
        }
        let custodian_lab = custodian_lab(
            data.role.unwrap_or(current.role),
            data.lab_id.or(current.lab_id),
        );
        if let Some(lab_id) = custodian_lab {
            let holder = self.repository.users.custodian_of(lab_id).await?;
            ensure_lab_free(lab_id, holder.as_ref(), Some(id))?;
        }

        let hash = data.password.as_deref().map(hash_password).transpose()?;
        let mut tx = self.repository.begin().await?;
        let user = self
            .repository
            .users
            .update(
                &mut tx,
                id,
                hash.as_deref(),
                data.full_name.as_deref().map(str::trim),
                data.email.as_deref(),
                data.role,
                data.lab_id,
                data.is_active,
            )
            .await?;
        match custodian_lab {
            Some(lab_id) => {
                self.repository
                    .laboratories
                    .assign_custodian(&mut tx, lab_id, id)
                    .await?
            }
            None => self.repository.laboratories.release_custodian(&mut tx, id).await?,
        }
        tx.commit().await?;

        tracing::info!(user_id = id, "User updated");
        Ok(user)
    }

    /// Delete a user; callers cannot delete themselves
    pub async fn delete_user(&self, caller_id: i32, id: i32) -> AppResult<()> {
        if caller_id == id {
            return Err(AppError::BusinessRule("You cannot delete your own account".to_string()));
        }
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Create the configured administrator when the database has none
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin_username.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.admin_exists().await? {
            return Ok(());
        }

        let hash = hash_password(password)?;
        let mut tx = self.repository.begin().await?;
        let user = self
            .repository
            .users
            .create(&mut tx, username, &hash, "Administrator", None, Role::Admin, None)
            .await?;
        tx.commit().await?;
        tracing::warn!(user_id = user.user_id, "Bootstrap administrator created; change its password");
        Ok(())
    }

    async fn ensure_lab_exists(&self, lab_id: i32) -> AppResult<()> {
        if self.repository.laboratories.exists(lab_id).await? {
            Ok(())
        } else {
            Err(AppError::Validation(format!("Unknown laboratory {}", lab_id)))
        }
    }
}

/// Laboratory a user of `role` would be in charge of
fn custodian_lab(role: Role, lab_id: Option<i32>) -> Option<i32> {
    match role {
        Role::Custodian => lab_id,
        Role::Admin => None,
    }
}

/// Fails when a custodian other than `user_id` already holds the laboratory
fn ensure_lab_free(lab_id: i32, holder: Option<&User>, user_id: Option<i32>) -> AppResult<()> {
    match holder {
        Some(holder) if Some(holder.user_id) != user_id => Err(AppError::Conflict(format!(
            "Laboratory {} already has custodian {} in charge",
            lab_id, holder.username
        ))),
        _ => Ok(()),
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    fn custodian(user_id: i32) -> User {
        User {
            user_id,
            username: format!("custodian{}", user_id),
            password_hash: String::new(),
            full_name: "Lab Custodian".to_string(),
            email: None,
            role: Role::Custodian,
            lab_id: Some(3),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_custodians_hold_a_lab() {
        assert_eq!(custodian_lab(Role::Custodian, Some(3)), Some(3));
        assert_eq!(custodian_lab(Role::Custodian, None), None);
        assert_eq!(custodian_lab(Role::Admin, Some(3)), None);
    }

    #[test]
    fn test_lab_held_by_another_custodian() {
        let holder = custodian(4);
        assert!(ensure_lab_free(3, None, None).is_ok());
        assert!(ensure_lab_free(3, Some(&holder), Some(4)).is_ok());
        assert!(matches!(
            ensure_lab_free(3, Some(&holder), None),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            ensure_lab_free(3, Some(&holder), Some(5)),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        assert!(matches!(
            verify_password("not-a-hash", "x"),
            Err(AppError::Internal(_))
        ));
    }
}

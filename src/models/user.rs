//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::AppError,
    rules::{scope_to_caller, AccessScope},
};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Custodian,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Custodian => "custodian",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "custodian" => Ok(Role::Custodian),
            _ => Err(AppError::Validation(format!("Invalid role: {}", s))),
        }
    }
}

sql_text_enum!(Role);

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: Role,
    /// Laboratory the user is assigned to (custodians)
    pub lab_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub lab_id: Option<i32>,
    /// Matches username or full name
    pub name: Option<String>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 64, message = "Username must be 3 to 64 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub role: Role,
    pub lab_id: Option<i32>,
}

/// Update user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub lab_id: Option<i32>,
    pub is_active: Option<bool>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub lab_id: Option<i32>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Replaces the role and lab assignment carried by the token with the
    /// stored account's current values
    pub fn refreshed(mut self, account: &User) -> Result<Self, AppError> {
        if account.user_id != self.user_id {
            return Err(AppError::Authentication("Token does not match account".to_string()));
        }
        if !account.is_active {
            return Err(AppError::Authentication("Account is deactivated".to_string()));
        }
        self.role = account.role;
        self.lab_id = account.lab_id;
        Ok(self)
    }

    /// Laboratories this caller may access
    pub fn scope(&self) -> Result<AccessScope, AppError> {
        scope_to_caller(self.role, self.lab_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, lab_id: Option<i32>) -> UserClaims {
        UserClaims {
            sub: "jdoe".to_string(),
            user_id: 7,
            role,
            lab_id,
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let original = claims(Role::Custodian, Some(2));
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.role, Role::Custodian);
        assert_eq!(parsed.lab_id, Some(2));
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    fn account(role: Role, lab_id: Option<i32>, is_active: bool) -> User {
        User {
            user_id: 7,
            username: "jdoe".to_string(),
            password_hash: String::new(),
            full_name: "Jane Doe".to_string(),
            email: None,
            role,
            lab_id,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_refreshed_follows_current_assignment() {
        let stale = claims(Role::Custodian, Some(1));

        let moved = stale.clone().refreshed(&account(Role::Custodian, Some(2), true)).unwrap();
        assert_eq!(moved.scope().unwrap(), AccessScope::Lab(2));
        assert!(moved.scope().unwrap().ensure_lab(1).is_err());

        let detached = stale.clone().refreshed(&account(Role::Custodian, None, true)).unwrap();
        assert!(matches!(detached.scope(), Err(AppError::Authorization(_))));

        let promoted = stale.clone().refreshed(&account(Role::Admin, None, true)).unwrap();
        assert!(promoted.is_admin());
    }

    #[test]
    fn test_refreshed_rejects_inactive_or_foreign_account() {
        let stale = claims(Role::Custodian, Some(1));
        assert!(matches!(
            stale.clone().refreshed(&account(Role::Custodian, Some(1), false)),
            Err(AppError::Authentication(_))
        ));

        let mut other = account(Role::Custodian, Some(1), true);
        other.user_id = 8;
        assert!(matches!(stale.refreshed(&other), Err(AppError::Authentication(_))));
    }

    #[test]
    fn test_require_admin() {
        assert!(claims(Role::Admin, None).require_admin().is_ok());
        assert!(claims(Role::Custodian, Some(1)).require_admin().is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("librarian".parse::<Role>().is_err());
    }

    #[test]
    fn test_create_user_validation() {
        let user = CreateUser {
            username: "ab".to_string(),
            password: "short".to_string(),
            full_name: "".to_string(),
            email: Some("not-an-email".to_string()),
            role: Role::Custodian,
            lab_id: None,
        };
        let errors = user.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("full_name"));
        assert!(fields.contains_key("email"));
    }
}

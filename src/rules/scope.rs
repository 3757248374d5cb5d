//! Authorization scoping of reads and writes to the caller's laboratory

use crate::{error::AppError, models::user::Role};

/// Which laboratories a caller may see or touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Administrators: every laboratory
    All,
    /// Custodians: only their assigned laboratory
    Lab(i32),
}

/// Derives the access scope for an authenticated caller
pub fn scope_to_caller(role: Role, lab_id: Option<i32>) -> Result<AccessScope, AppError> {
    match (role, lab_id) {
        (Role::Admin, _) => Ok(AccessScope::All),
        (Role::Custodian, Some(lab_id)) => Ok(AccessScope::Lab(lab_id)),
        (Role::Custodian, None) => Err(AppError::Authorization(
            "Custodian is not assigned to a laboratory".to_string(),
        )),
    }
}

impl AccessScope {
    /// Lab id every list query must be filtered by, `None` meaning unrestricted
    pub fn lab_filter(&self) -> Option<i32> {
        match self {
            AccessScope::All => None,
            AccessScope::Lab(id) => Some(*id),
        }
    }

    /// Combines a caller-supplied lab filter with the scope
    pub fn narrow(&self, requested: Option<i32>) -> Result<Option<i32>, AppError> {
        match (self, requested) {
            (AccessScope::All, requested) => Ok(requested),
            (AccessScope::Lab(own), None) => Ok(Some(*own)),
            (AccessScope::Lab(own), Some(req)) if req == *own => Ok(Some(req)),
            (AccessScope::Lab(_), Some(req)) => Err(AppError::Authorization(format!(
                "Not allowed to access laboratory {}",
                req
            ))),
        }
    }

    /// Fails unless the record's laboratory is inside the scope
    pub fn ensure_lab(&self, lab_id: i32) -> Result<(), AppError> {
        match self {
            AccessScope::All => Ok(()),
            AccessScope::Lab(own) if *own == lab_id => Ok(()),
            AccessScope::Lab(_) => Err(AppError::Authorization(format!(
                "Not allowed to access laboratory {}",
                lab_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_role() {
        assert_eq!(scope_to_caller(Role::Admin, None).unwrap(), AccessScope::All);
        assert_eq!(scope_to_caller(Role::Admin, Some(3)).unwrap(), AccessScope::All);
        assert_eq!(
            scope_to_caller(Role::Custodian, Some(3)).unwrap(),
            AccessScope::Lab(3)
        );
        assert!(matches!(
            scope_to_caller(Role::Custodian, None),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_ensure_lab() {
        assert!(AccessScope::All.ensure_lab(9).is_ok());
        assert!(AccessScope::Lab(1).ensure_lab(1).is_ok());
        assert!(matches!(
            AccessScope::Lab(1).ensure_lab(2),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_narrow() {
        assert_eq!(AccessScope::All.narrow(None).unwrap(), None);
        assert_eq!(AccessScope::All.narrow(Some(4)).unwrap(), Some(4));
        assert_eq!(AccessScope::Lab(2).narrow(None).unwrap(), Some(2));
        assert_eq!(AccessScope::Lab(2).narrow(Some(2)).unwrap(), Some(2));
        assert!(AccessScope::Lab(2).narrow(Some(5)).is_err());
        assert_eq!(AccessScope::Lab(2).lab_filter(), Some(2));
        assert_eq!(AccessScope::All.lab_filter(), None);
    }
}

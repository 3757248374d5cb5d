//! Approval workflow for lab requests, equipment borrows and software installations
//!
//! ```text
//! Pending --custodian--> CustodianApproved --admin--> AdminApproved
//!    |                          |
//!    +--custodian--> Rejected <-+--admin
//! ```
//!
//! Software installations stop at `CustodianApproved`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    LabRequest,
    EquipmentBorrow,
    SoftwareInstallation,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::LabRequest => "lab_request",
            FormType::EquipmentBorrow => "equipment_borrow",
            FormType::SoftwareInstallation => "software_installation",
        }
    }

    /// Software installations are settled by the custodian alone
    pub fn requires_admin_approval(&self) -> bool {
        !matches!(self, FormType::SoftwareInstallation)
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lab_request" => Ok(FormType::LabRequest),
            "equipment_borrow" => Ok(FormType::EquipmentBorrow),
            "software_installation" => Ok(FormType::SoftwareInstallation),
            other => Err(AppError::Validation(format!("Unknown form type: {}", other))),
        }
    }
}

sql_text_enum!(FormType);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Pending,
    CustodianApproved,
    AdminApproved,
    Rejected,
}

impl FormStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Pending => "pending",
            FormStatus::CustodianApproved => "custodian_approved",
            FormStatus::AdminApproved => "admin_approved",
            FormStatus::Rejected => "rejected",
        }
    }

    /// No further transition is possible from this status
    pub fn is_final(&self, form_type: FormType) -> bool {
        match self {
            FormStatus::Pending => false,
            FormStatus::CustodianApproved => !form_type.requires_admin_approval(),
            FormStatus::AdminApproved | FormStatus::Rejected => true,
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FormStatus::Pending),
            "custodian_approved" => Ok(FormStatus::CustodianApproved),
            "admin_approved" => Ok(FormStatus::AdminApproved),
            "rejected" => Ok(FormStatus::Rejected),
            other => Err(AppError::Validation(format!("Unknown form status: {}", other))),
        }
    }
}

sql_text_enum!(FormStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Approve,
    Reject,
}

/// Status a form moves to when `actor` applies `action`.
///
/// Lab ownership is not checked here; callers scope the form to the actor first.
pub fn next_status(
    form_type: FormType,
    current: FormStatus,
    actor: Role,
    action: FormAction,
) -> Result<FormStatus, AppError> {
    if current.is_final(form_type) {
        return Err(AppError::BusinessRule(format!(
            "Form is already {} and cannot change",
            current
        )));
    }

    match (actor, current) {
        (Role::Custodian, FormStatus::Pending) => Ok(match action {
            FormAction::Approve => FormStatus::CustodianApproved,
            FormAction::Reject => FormStatus::Rejected,
        }),
        (Role::Custodian, _) => Err(AppError::BusinessRule(
            "Custodians can only act on pending forms".to_string(),
        )),
        (Role::Admin, FormStatus::CustodianApproved) => Ok(match action {
            FormAction::Approve => FormStatus::AdminApproved,
            FormAction::Reject => FormStatus::Rejected,
        }),
        (Role::Admin, FormStatus::Pending) => Err(AppError::BusinessRule(
            "Form is awaiting custodian approval".to_string(),
        )),
        (Role::Admin, _) => Err(AppError::BusinessRule(format!(
            "Form in status {} cannot be acted on",
            current
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    use super::FormAction::*;
    use super::FormStatus::*;
    use super::FormType::*;

    #[test]
    fn test_full_two_step_approval() {
        let s = assert_ok!(next_status(LabRequest, Pending, Role::Custodian, Approve));
        assert_eq!(s, CustodianApproved);
        let s = assert_ok!(next_status(LabRequest, s, Role::Admin, Approve));
        assert_eq!(s, AdminApproved);
    }

    #[test]
    fn test_rejection_at_either_step() {
        assert_eq!(
            assert_ok!(next_status(EquipmentBorrow, Pending, Role::Custodian, Reject)),
            Rejected
        );
        assert_eq!(
            assert_ok!(next_status(EquipmentBorrow, CustodianApproved, Role::Admin, Reject)),
            Rejected
        );
    }

    #[test]
    fn test_software_installation_stops_at_custodian() {
        let s = assert_ok!(next_status(SoftwareInstallation, Pending, Role::Custodian, Approve));
        assert_eq!(s, CustodianApproved);
        assert!(s.is_final(SoftwareInstallation));
        assert_err!(next_status(SoftwareInstallation, s, Role::Admin, Approve));
        assert_err!(next_status(SoftwareInstallation, s, Role::Admin, Reject));
    }

    #[test]
    fn test_invalid_transitions() {
        assert_err!(next_status(LabRequest, AdminApproved, Role::Admin, Approve));
        assert_err!(next_status(LabRequest, Rejected, Role::Custodian, Approve));
        assert_err!(next_status(LabRequest, CustodianApproved, Role::Custodian, Approve));
        assert_err!(next_status(LabRequest, Pending, Role::Admin, Approve));
    }

    #[test]
    fn test_invalid_transition_is_business_rule() {
        let err = next_status(LabRequest, AdminApproved, Role::Admin, Approve).unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
    }

    #[test]
    fn test_round_trip_names() {
        for status in [Pending, CustodianApproved, AdminApproved, Rejected] {
            assert_eq!(status.as_str().parse::<FormStatus>().unwrap(), status);
        }
        assert!("approved".parse::<FormStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&SoftwareInstallation).unwrap(),
            "\"software_installation\""
        );
    }
}

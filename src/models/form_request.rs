//! Lab requests, equipment borrows and software installation requests

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::rules::{FormStatus, FormType};

/// Type-specific content of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormDetails {
    /// Reservation of the laboratory itself
    LabRequest {
        date_needed: NaiveDate,
        time_start: String,
        time_end: String,
        expected_participants: Option<i32>,
    },
    /// Borrowing of inventory assets
    EquipmentBorrow {
        asset_ids: Vec<i32>,
        borrow_date: NaiveDate,
        return_date: NaiveDate,
    },
    /// Installation of software on workstations
    SoftwareInstallation {
        software_name: String,
        version: Option<String>,
        workstation_ids: Vec<i32>,
        license: Option<String>,
    },
}

impl FormDetails {
    pub fn form_type(&self) -> FormType {
        match self {
            FormDetails::LabRequest { .. } => FormType::LabRequest,
            FormDetails::EquipmentBorrow { .. } => FormType::EquipmentBorrow,
            FormDetails::SoftwareInstallation { .. } => FormType::SoftwareInstallation,
        }
    }
}

fn validate_details(details: &FormDetails) -> Result<(), ValidationError> {
    match details {
        FormDetails::LabRequest { time_start, time_end, .. } => {
            if time_start.trim().is_empty() || time_end.trim().is_empty() {
                return Err(ValidationError::new("time_range")
                    .with_message("Start and end time are required".into()));
            }
        }
        FormDetails::EquipmentBorrow { asset_ids, borrow_date, return_date } => {
            if asset_ids.is_empty() {
                return Err(ValidationError::new("asset_ids")
                    .with_message("At least one asset must be selected".into()));
            }
            if return_date < borrow_date {
                return Err(ValidationError::new("return_date")
                    .with_message("Return date must not precede borrow date".into()));
            }
        }
        FormDetails::SoftwareInstallation { software_name, .. } => {
            if software_name.trim().is_empty() {
                return Err(ValidationError::new("software_name")
                    .with_message("Software name is required".into()));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FormRequest {
    pub form_id: i32,
    /// Tracking reference given to the requester
    pub reference: Uuid,
    pub form_type: FormType,
    pub lab_id: i32,
    pub requester_name: String,
    pub requester_email: Option<String>,
    pub purpose: String,
    #[schema(value_type = FormDetails)]
    pub details: Json<FormDetails>,
    pub status: FormStatus,
    pub custodian_id: Option<i32>,
    pub custodian_acted_at: Option<DateTime<Utc>>,
    pub admin_id: Option<i32>,
    pub admin_acted_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request submitted through a public form
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitFormRequest {
    pub lab_id: i32,
    #[validate(length(min = 1, max = 160, message = "Requester name is required"))]
    pub requester_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub requester_email: Option<String>,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,
    #[validate(custom(function = "validate_details"))]
    pub details: FormDetails,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct FormQuery {
    pub status: Option<FormStatus>,
    pub form_type: Option<FormType>,
    pub lab_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectForm {
    #[validate(length(min = 1, message = "A reason is required"))]
    pub reason: String,
}

/// Receipt returned to a public requester
#[derive(Debug, Serialize, ToSchema)]
pub struct FormReceipt {
    pub form_id: i32,
    pub reference: Uuid,
    pub status: FormStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn borrow(asset_ids: Vec<i32>, from: (i32, u32, u32), to: (i32, u32, u32)) -> FormDetails {
        FormDetails::EquipmentBorrow {
            asset_ids,
            borrow_date: NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
            return_date: NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
        }
    }

    #[test]
    fn test_details_tagging() {
        let json = r#"{"kind": "software_installation", "software_name": "Python",
                       "version": "3.12", "workstation_ids": [1, 2], "license": null}"#;
        let details: FormDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.form_type(), FormType::SoftwareInstallation);
    }

    #[test]
    fn test_borrow_validation() {
        assert!(validate_details(&borrow(vec![1], (2026, 5, 1), (2026, 5, 3))).is_ok());
        assert!(validate_details(&borrow(vec![], (2026, 5, 1), (2026, 5, 3))).is_err());
        assert!(validate_details(&borrow(vec![1], (2026, 5, 3), (2026, 5, 1))).is_err());
    }

    #[test]
    fn test_submit_validation() {
        let request = SubmitFormRequest {
            lab_id: 1,
            requester_name: "".to_string(),
            requester_email: None,
            purpose: "Thesis defense".to_string(),
            details: FormDetails::SoftwareInstallation {
                software_name: " ".to_string(),
                version: None,
                workstation_ids: vec![],
                license: None,
            },
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("requester_name"));
        assert!(fields.contains_key("details"));
    }
}

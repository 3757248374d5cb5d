//! Laboratory model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Laboratory record, joined with its custodian in charge
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Laboratory {
    pub lab_id: i32,
    pub lab_name: String,
    pub location: Option<String>,
    /// Custodian in charge (at most one per laboratory)
    pub in_charge_id: Option<i32>,
    pub in_charge_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Laboratory with inventory counters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LaboratoryDetails {
    #[serde(flatten)]
    pub laboratory: Laboratory,
    pub workstation_count: i64,
    pub asset_count: i64,
}

/// Minimal laboratory entry for public form selectors
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LaboratoryOption {
    pub lab_id: i32,
    pub lab_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLaboratory {
    #[validate(length(min = 1, max = 120, message = "Laboratory name must be 1 to 120 characters"))]
    pub lab_name: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLaboratory {
    #[validate(length(min = 1, max = 120, message = "Laboratory name must be 1 to 120 characters"))]
    pub lab_name: Option<String>,
    pub location: Option<String>,
}

/// Assign the custodian in charge of a laboratory
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignCustodian {
    pub user_id: i32,
}

//! Maintenance procedures (checklist items)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

/// Checklist a procedure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ProcedureCategory {
    /// Daily Activity Report
    #[serde(rename = "DAR")]
    Dar,
    /// Quarterly Preventive Maintenance Check
    #[serde(rename = "QPMC")]
    Qpmc,
}

impl ProcedureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureCategory::Dar => "DAR",
            ProcedureCategory::Qpmc => "QPMC",
        }
    }
}

impl FromStr for ProcedureCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DAR" => Ok(ProcedureCategory::Dar),
            "QPMC" => Ok(ProcedureCategory::Qpmc),
            other => Err(AppError::Validation(format!("Unknown procedure category: {}", other))),
        }
    }
}

sql_text_enum!(ProcedureCategory);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Procedure {
    pub procedure_id: i32,
    pub category: ProcedureCategory,
    pub description: String,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ProcedureQuery {
    pub category: Option<ProcedureCategory>,
    /// Include deactivated procedures
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProcedure {
    pub category: ProcedureCategory,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProcedure {
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

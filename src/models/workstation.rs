//! Workstation model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{models::asset::Asset, rules::WorkstationStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Workstation {
    pub workstation_id: i32,
    pub lab_id: i32,
    pub workstation_name: String,
    pub location: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workstation list entry with its live aggregate status
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkstationSummary {
    #[serde(flatten)]
    pub workstation: Workstation,
    pub system_status: WorkstationStatus,
    pub asset_count: usize,
}

/// Workstation with its assets split by kind
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkstationDetails {
    #[serde(flatten)]
    pub workstation: Workstation,
    pub system_status: WorkstationStatus,
    pub system_assets: Vec<Asset>,
    pub peripherals: Vec<Asset>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct WorkstationQuery {
    pub lab_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkstation {
    pub lab_id: i32,
    #[validate(length(min = 1, max = 120, message = "Workstation name must be 1 to 120 characters"))]
    pub workstation_name: String,
    pub location: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkstation {
    #[validate(length(min = 1, max = 120, message = "Workstation name must be 1 to 120 characters"))]
    pub workstation_name: Option<String>,
    pub location: Option<String>,
    pub remarks: Option<String>,
}

//! Inventory asset model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::rules::status::{is_system_component, StatusBearing};

/// Row of the `asset_statuses` lookup table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssetStatus {
    pub status_id: i32,
    pub status_name: String,
}

/// Inventory asset with its status name resolved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Asset {
    pub asset_id: i32,
    pub property_tag: String,
    /// Unit type, e.g. CPU, RAM, Keyboard
    pub unit_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub specifications: Option<String>,
    pub date_acquired: Option<NaiveDate>,
    pub status_id: i32,
    pub status_name: String,
    pub lab_id: i32,
    pub workstation_id: Option<i32>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn is_system_component(&self) -> bool {
        is_system_component(&self.unit_type)
    }
}

impl StatusBearing for Asset {
    fn unit_type(&self) -> &str {
        &self.unit_type
    }

    fn status_name(&self) -> &str {
        &self.status_name
    }
}

/// Asset query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AssetQuery {
    pub lab_id: Option<i32>,
    pub workstation_id: Option<i32>,
    /// Status name, e.g. "For Repair"
    pub status: Option<String>,
    pub unit_type: Option<String>,
    /// Matches property tag, brand, model or serial number
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl AssetQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 200)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// Create asset request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 64, message = "Property tag must be 1 to 64 characters"))]
    pub property_tag: String,
    #[validate(length(min = 1, max = 64, message = "Unit type is required"))]
    pub unit_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub specifications: Option<String>,
    pub date_acquired: Option<NaiveDate>,
    /// Status name; defaults to "Functional"
    pub status: Option<String>,
    pub lab_id: i32,
    pub workstation_id: Option<i32>,
    pub remarks: Option<String>,
}

/// Create several assets at once (all or nothing)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetBatch {
    #[validate(length(min = 1, max = 500, message = "Batch must contain 1 to 500 assets"), nested)]
    pub assets: Vec<CreateAsset>,
}

/// Update asset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 64, message = "Property tag must be 1 to 64 characters"))]
    pub property_tag: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Unit type cannot be empty"))]
    pub unit_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub specifications: Option<String>,
    pub date_acquired: Option<NaiveDate>,
    pub status: Option<String>,
    pub workstation_id: Option<i32>,
    /// Detach the asset from its workstation
    #[serde(default)]
    pub unassign_workstation: bool,
    pub remarks: Option<String>,
}

/// Number of assets per status
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StatusCount {
    pub status_name: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(tag: &str) -> CreateAsset {
        CreateAsset {
            property_tag: tag.to_string(),
            unit_type: "Monitor".to_string(),
            brand: None,
            model: None,
            serial_number: None,
            specifications: None,
            date_acquired: None,
            status: None,
            lab_id: 1,
            workstation_id: None,
            remarks: None,
        }
    }

    #[test]
    fn test_batch_validates_each_asset() {
        let batch = CreateAssetBatch { assets: vec![] };
        assert!(batch.validate().unwrap_err().field_errors().contains_key("assets"));

        let batch = CreateAssetBatch {
            assets: vec![asset("PT-1"), asset("PT-2")],
        };
        assert!(batch.validate().is_ok());

        let batch = CreateAssetBatch {
            assets: vec![asset("PT-1"), asset("")],
        };
        assert!(batch.validate().is_err());
    }
}

//! Preventive maintenance (QPMC) reports and service logs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::AppError,
    models::asset::Asset,
    rules::{quarter::QUARTER_RE, WorkstationStatus},
};

/// What was done to an asset during a service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceAction {
    #[default]
    Checked,
    Repaired,
    Replaced,
    Upgraded,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Checked => "CHECKED",
            ServiceAction::Repaired => "REPAIRED",
            ServiceAction::Replaced => "REPLACED",
            ServiceAction::Upgraded => "UPGRADED",
        }
    }

    /// Actions accepted by a standalone repair log
    pub fn is_repair(&self) -> bool {
        !matches!(self, ServiceAction::Checked)
    }
}

/// Origin of a service log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogType {
    /// Quarterly preventive maintenance
    Qpmc,
    /// Out-of-cycle repair
    Repair,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Qpmc => "QPMC",
            LogType::Repair => "REPAIR",
        }
    }
}

impl FromStr for LogType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QPMC" => Ok(LogType::Qpmc),
            "REPAIR" => Ok(LogType::Repair),
            other => Err(AppError::Validation(format!("Unknown log type: {}", other))),
        }
    }
}

sql_text_enum!(LogType);

/// Before/after record of one asset inside a service log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssetActionRecord {
    pub asset_id: i32,
    pub unit_type: String,
    pub property_tag: String,
    pub action: ServiceAction,
    pub status_before: String,
    pub status_after: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_property_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_property_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl AssetActionRecord {
    pub fn status_changed(&self) -> bool {
        self.status_before != self.status_after
    }
}

/// One maintenance report per workstation and quarter
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PmcReport {
    pub pmc_id: i32,
    pub workstation_id: i32,
    /// Quarter in `YYYY-Qn` form
    pub quarter: String,
    /// Aggregate workstation status captured when the report was last filed
    pub workstation_status: String,
    pub remarks: Option<String>,
    pub service_count: i32,
    pub performed_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report row returned by the upsert, with whether it was freshly inserted
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedReport {
    #[sqlx(flatten)]
    pub report: PmcReport,
    pub inserted: bool,
}

/// Report list entry
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PmcReportListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub report: PmcReport,
    pub workstation_name: String,
    pub lab_id: i32,
    pub lab_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ServiceLog {
    pub log_id: i32,
    /// Report the log belongs to; empty for standalone repairs
    pub pmc_id: Option<i32>,
    pub workstation_id: i32,
    pub log_type: LogType,
    #[schema(value_type = Vec<AssetActionRecord>)]
    pub asset_actions: Json<Vec<AssetActionRecord>>,
    pub remarks: Option<String>,
    pub performed_by: Option<i32>,
    pub performed_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Report together with its service history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PmcReportDetails {
    #[serde(flatten)]
    pub report: PmcReportListing,
    pub service_logs: Vec<ServiceLog>,
}

/// Outcome of a maintenance submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MaintenanceOutcome {
    pub report: PmcReport,
    pub log: ServiceLog,
    /// True when this submission opened the report for the quarter
    pub created: bool,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PmcQuery {
    pub quarter: Option<String>,
    pub lab_id: Option<i32>,
    pub workstation_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct QuarterQuery {
    pub quarter: Option<String>,
    pub lab_id: Option<i32>,
}

/// Whether a workstation has been serviced in a quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ServiceState {
    Unserviced,
    Serviced,
}

/// Service state of one workstation for a quarter
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkstationServiceState {
    pub workstation_id: i32,
    pub workstation_name: String,
    pub lab_id: i32,
    pub quarter: String,
    pub state: ServiceState,
    pub pmc_id: Option<i32>,
    pub service_count: i32,
    /// Live aggregate computed from the workstation's current assets
    pub system_status: WorkstationStatus,
    pub last_serviced_at: Option<DateTime<Utc>>,
}

/// Asset touched by a maintenance submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MaintenanceAssetAction {
    pub asset_id: i32,
    #[serde(default)]
    pub action: ServiceAction,
    /// New status name; keeps the current status when absent
    pub status: Option<String>,
    pub remarks: Option<String>,
}

/// Quarterly maintenance submission for one workstation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitMaintenance {
    pub workstation_id: i32,
    /// Defaults to the current quarter
    #[validate(regex(path = *QUARTER_RE, message = "Quarter must look like 2026-Q1"))]
    pub quarter: Option<String>,
    pub remarks: Option<String>,
    #[validate(length(min = 1, message = "At least one asset must be selected"), nested)]
    pub asset_actions: Vec<MaintenanceAssetAction>,
}

/// Asset touched by an out-of-cycle repair
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RepairAssetAction {
    pub asset_id: i32,
    pub action: ServiceAction,
    /// New status name; keeps the current status when absent
    pub status: Option<String>,
    /// Replacement part property tag (REPLACED only)
    #[validate(length(min = 1, max = 64, message = "Property tag must be 1 to 64 characters"))]
    pub new_property_tag: Option<String>,
    /// Replacement part serial number (REPLACED only)
    pub new_serial_number: Option<String>,
    pub remarks: Option<String>,
}

/// Standalone repair log for one workstation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRepairLog {
    pub workstation_id: i32,
    pub remarks: Option<String>,
    #[validate(length(min = 1, message = "At least one asset must be selected"), nested)]
    pub assets: Vec<RepairAssetAction>,
}

/// Asset row of an exported report
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExportAssetRow {
    pub property_tag: String,
    pub unit_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: String,
}

impl From<&Asset> for ExportAssetRow {
    fn from(asset: &Asset) -> Self {
        Self {
            property_tag: asset.property_tag.clone(),
            unit_type: asset.unit_type.clone(),
            brand: asset.brand.clone(),
            model: asset.model.clone(),
            serial_number: asset.serial_number.clone(),
            status: asset.status_name.clone(),
        }
    }
}

/// Payload handed to the document templating service
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PmcExport {
    pub pmc_id: i32,
    pub lab_name: String,
    pub workstation_name: String,
    pub quarter: String,
    pub workstation_status: String,
    pub service_count: i32,
    pub remarks: Option<String>,
    /// Custodian in charge of the laboratory
    pub monitored_by: Option<String>,
    pub system_assets: Vec<ExportAssetRow>,
    pub peripherals: Vec<ExportAssetRow>,
    pub service_logs: Vec<ServiceLog>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_requires_assets() {
        let payload = SubmitMaintenance {
            workstation_id: 1,
            quarter: None,
            remarks: None,
            asset_actions: vec![],
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("asset_actions"));
    }

    #[test]
    fn test_submit_rejects_bad_quarter() {
        let payload = SubmitMaintenance {
            workstation_id: 1,
            quarter: Some("2026-Q7".to_string()),
            remarks: None,
            asset_actions: vec![MaintenanceAssetAction {
                asset_id: 1,
                action: ServiceAction::Checked,
                status: None,
                remarks: None,
            }],
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_repair_log_validates_each_asset() {
        let empty = CreateRepairLog {
            workstation_id: 2,
            remarks: None,
            assets: vec![],
        };
        assert!(empty.validate().unwrap_err().field_errors().contains_key("assets"));

        let mut log = CreateRepairLog {
            workstation_id: 2,
            remarks: Some("Swapped PSU".to_string()),
            assets: vec![RepairAssetAction {
                asset_id: 9,
                action: ServiceAction::Replaced,
                status: None,
                new_property_tag: Some("PT-0900".to_string()),
                new_serial_number: None,
                remarks: None,
            }],
        };
        assert!(log.validate().is_ok());

        log.assets[0].new_property_tag = Some(String::new());
        assert!(log.validate().is_err());
    }

    #[test]
    fn test_action_defaults_to_checked() {
        let action: MaintenanceAssetAction =
            serde_json::from_str(r#"{"asset_id": 4, "status": "For Repair"}"#).unwrap();
        assert_eq!(action.action, ServiceAction::Checked);
        assert!(!action.action.is_repair());
    }

    #[test]
    fn test_action_record_json_shape() {
        let record = AssetActionRecord {
            asset_id: 3,
            unit_type: "RAM".to_string(),
            property_tag: "PT-0003".to_string(),
            action: ServiceAction::Replaced,
            status_before: "For Replacement".to_string(),
            status_after: "Functional".to_string(),
            old_property_tag: Some("PT-0003".to_string()),
            new_property_tag: Some("PT-0103".to_string()),
            old_serial_number: None,
            new_serial_number: None,
            remarks: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["action"], "REPLACED");
        assert!(json.get("old_serial_number").is_none());
        assert!(record.status_changed());
    }
}

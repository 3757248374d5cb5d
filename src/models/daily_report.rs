//! Daily activity reports (DAR)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyReport {
    pub daily_report_id: i32,
    pub lab_id: i32,
    pub lab_name: String,
    pub report_date: NaiveDate,
    pub checked_by: Option<i32>,
    pub checked_by_name: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DailyReportEntry {
    pub entry_id: i32,
    pub procedure_id: i32,
    pub description: String,
    pub is_done: bool,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyReportDetails {
    #[serde(flatten)]
    pub report: DailyReport,
    pub entries: Vec<DailyReportEntry>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DailyReportQuery {
    pub lab_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDailyReportEntry {
    pub procedure_id: i32,
    #[serde(default)]
    pub is_done: bool,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDailyReport {
    pub lab_id: i32,
    pub report_date: NaiveDate,
    pub remarks: Option<String>,
    #[validate(length(min = 1, message = "At least one procedure entry is required"), nested)]
    pub entries: Vec<CreateDailyReportEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_needs_entries() {
        let mut report = CreateDailyReport {
            lab_id: 1,
            report_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            remarks: None,
            entries: vec![],
        };
        assert!(report.validate().unwrap_err().field_errors().contains_key("entries"));

        report.entries.push(CreateDailyReportEntry {
            procedure_id: 1,
            is_done: true,
            remarks: None,
        });
        assert!(report.validate().is_ok());
    }
}

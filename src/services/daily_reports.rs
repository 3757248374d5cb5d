//! Daily activity report (DAR) service

use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{
        daily_report::{CreateDailyReport, DailyReport, DailyReportDetails, DailyReportQuery},
        procedure::ProcedureCategory,
        user::UserClaims,
    },
    repository::Repository,
    rules::AccessScope,
};

#[derive(Clone)]
pub struct DailyReportsService {
    repository: Repository,
}

impl DailyReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, scope: AccessScope, query: &DailyReportQuery) -> AppResult<Vec<DailyReport>> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if to < from {
                return Err(AppError::Validation("Date range ends before it starts".to_string()));
            }
        }
        let lab_id = scope.narrow(query.lab_id)?;
        self.repository.daily_reports.list(query, lab_id).await
    }

    pub async fn get(&self, scope: AccessScope, id: i32) -> AppResult<DailyReportDetails> {
        let report = self.repository.daily_reports.get_by_id(id).await?;
        scope.ensure_lab(report.lab_id)?;
        let entries = self.repository.daily_reports.entries(id).await?;
        Ok(DailyReportDetails { report, entries })
    }

    /// File the report of one laboratory for one day
    pub async fn create(&self, caller: &UserClaims, data: &CreateDailyReport) -> AppResult<DailyReportDetails> {
        let scope = caller.scope()?;
        scope.ensure_lab(data.lab_id)?;
        if !self.repository.laboratories.exists(data.lab_id).await? {
            return Err(AppError::Validation(format!("Unknown laboratory {}", data.lab_id)));
        }

        let mut requested = HashSet::new();
        for entry in &data.entries {
            if !requested.insert(entry.procedure_id) {
                return Err(AppError::Validation(format!(
                    "Procedure {} is listed more than once",
                    entry.procedure_id
                )));
            }
        }
        let ids: Vec<i32> = requested.iter().copied().collect();
        let known: HashSet<i32> = self
            .repository
            .procedures
            .filter_active(&ids, ProcedureCategory::Dar)
            .await?
            .into_iter()
            .collect();
        if let Some(unknown) = data.entries.iter().find(|e| !known.contains(&e.procedure_id)) {
            return Err(AppError::Validation(format!(
                "Procedure {} is not an active daily report procedure",
                unknown.procedure_id
            )));
        }

        let mut tx = self.repository.begin().await?;
        let id = self
            .repository
            .daily_reports
            .insert(&mut tx, data, caller.user_id)
            .await?;
        tx.commit().await?;

        tracing::info!(daily_report_id = id, lab_id = data.lab_id, date = %data.report_date, "Daily report filed");
        self.get(scope, id).await
    }

    pub async fn delete(&self, scope: AccessScope, id: i32) -> AppResult<()> {
        let report = self.repository.daily_reports.get_by_id(id).await?;
        scope.ensure_lab(report.lab_id)?;
        self.repository.daily_reports.delete(id).await?;
        tracing::info!(daily_report_id = id, "Daily report deleted");
        Ok(())
    }
}

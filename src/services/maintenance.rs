//! Quarterly preventive maintenance and repair logging

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::Asset,
        maintenance::{
            AssetActionRecord, CreateRepairLog, ExportAssetRow, LogType, MaintenanceOutcome, PmcExport, PmcQuery,
            PmcReportDetails, PmcReportListing, ServiceAction, ServiceLog, ServiceState, SubmitMaintenance,
            WorkstationServiceState,
        },
        user::UserClaims,
        workstation::Workstation,
    },
    repository::{assets::AssetsRepository, workstations::WorkstationsRepository, Repository},
    rules::{aggregate_status, status::split_by_kind, AccessScope, Quarter},
    services::workstations::group_by_workstation,
};

/// Status given to repaired assets when the request names none
const REPAIRED_STATUS: &str = "Functional";

#[derive(Clone)]
pub struct MaintenanceService {
    repository: Repository,
}

impl MaintenanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// File (or re-file) the quarter's maintenance report of a workstation.
    ///
    /// Asset statuses, the report upsert and its service log are written in
    /// one transaction. The workstation row is locked first so two
    /// submissions for the same workstation serialize.
    pub async fn submit_report(
        &self,
        caller: &UserClaims,
        quarter: Quarter,
        payload: &SubmitMaintenance,
    ) -> AppResult<MaintenanceOutcome> {
        if payload.asset_actions.is_empty() {
            return Err(AppError::Validation("At least one asset must be selected".to_string()));
        }
        ensure_distinct(payload.asset_actions.iter().map(|a| a.asset_id))?;

        let scope = caller.scope()?;
        let mut tx = self.repository.begin().await?;

        let workstation = lock_workstation(&mut tx, scope, payload.workstation_id).await?;
        let mut assets = index_assets(AssetsRepository::for_workstation(&mut *tx, workstation.workstation_id).await?);

        let mut records = Vec::with_capacity(payload.asset_actions.len());
        for action in &payload.asset_actions {
            let asset = assets
                .get_mut(&action.asset_id)
                .ok_or_else(|| not_on_workstation(action.asset_id, &workstation))?;

            let status_before = asset.status_name.clone();
            if let Some(name) = action.status.as_deref() {
                let status = AssetsRepository::status_by_name(&mut *tx, name).await?;
                if status.status_id != asset.status_id {
                    self.repository
                        .assets
                        .set_status(&mut tx, asset.asset_id, status.status_id)
                        .await?;
                }
                asset.status_id = status.status_id;
                asset.status_name = status.status_name;
            }

            records.push(AssetActionRecord {
                asset_id: asset.asset_id,
                unit_type: asset.unit_type.clone(),
                property_tag: asset.property_tag.clone(),
                action: action.action,
                status_before,
                status_after: asset.status_name.clone(),
                old_property_tag: None,
                new_property_tag: None,
                old_serial_number: None,
                new_serial_number: None,
                remarks: action.remarks.clone(),
            });
        }

        let workstation_status = aggregate_status(assets.values());
        let quarter = quarter.to_string();
        let upserted = self
            .repository
            .maintenance
            .upsert_report(
                &mut tx,
                workstation.workstation_id,
                &quarter,
                workstation_status.as_str(),
                payload.remarks.as_deref(),
                caller.user_id,
            )
            .await?;

        let log = self
            .repository
            .maintenance
            .insert_log(
                &mut tx,
                Some(upserted.report.pmc_id),
                workstation.workstation_id,
                LogType::Qpmc,
                &records,
                payload.remarks.as_deref(),
                caller.user_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            pmc_id = upserted.report.pmc_id,
            workstation_id = workstation.workstation_id,
            quarter = %quarter,
            service_count = upserted.report.service_count,
            status = %workstation_status,
            status_changes = records.iter().filter(|r| r.status_changed()).count(),
            "Maintenance report filed"
        );

        Ok(MaintenanceOutcome {
            report: upserted.report,
            log,
            created: upserted.inserted,
        })
    }

    /// Record repairs outside the quarterly cycle
    pub async fn create_repair_log(&self, caller: &UserClaims, payload: &CreateRepairLog) -> AppResult<ServiceLog> {
        if payload.assets.is_empty() {
            return Err(AppError::Validation("At least one asset must be selected".to_string()));
        }
        ensure_distinct(payload.assets.iter().map(|a| a.asset_id))?;
        for action in &payload.assets {
            if !action.action.is_repair() {
                return Err(AppError::Validation(format!(
                    "Asset {}: {} is not a repair action",
                    action.asset_id,
                    action.action.as_str()
                )));
            }
            let replaces_identifiers = action.new_property_tag.is_some() || action.new_serial_number.is_some();
            if replaces_identifiers && action.action != ServiceAction::Replaced {
                return Err(AppError::Validation(format!(
                    "Asset {}: new identifiers are only accepted for REPLACED parts",
                    action.asset_id
                )));
            }
        }

        let scope = caller.scope()?;
        let mut tx = self.repository.begin().await?;

        let workstation = lock_workstation(&mut tx, scope, payload.workstation_id).await?;
        let assets = index_assets(AssetsRepository::for_workstation(&mut *tx, workstation.workstation_id).await?);

        let mut records = Vec::with_capacity(payload.assets.len());
        for action in &payload.assets {
            let asset = assets
                .get(&action.asset_id)
                .ok_or_else(|| not_on_workstation(action.asset_id, &workstation))?;

            let new_property_tag = action.new_property_tag.as_deref().map(str::trim);
            let new_serial_number = action.new_serial_number.as_deref().map(str::trim);
            if new_property_tag.is_some() || new_serial_number.is_some() {
                self.repository
                    .assets
                    .replace_identifiers(&mut tx, asset.asset_id, new_property_tag, new_serial_number)
                    .await?;
            }

            let status_name = action.status.as_deref().unwrap_or(REPAIRED_STATUS);
            let status = AssetsRepository::status_by_name(&mut *tx, status_name).await?;
            if status.status_id != asset.status_id {
                self.repository
                    .assets
                    .set_status(&mut tx, asset.asset_id, status.status_id)
                    .await?;
            }

            records.push(AssetActionRecord {
                asset_id: asset.asset_id,
                unit_type: asset.unit_type.clone(),
                property_tag: new_property_tag.unwrap_or(asset.property_tag.as_str()).to_string(),
                action: action.action,
                status_before: asset.status_name.clone(),
                status_after: status.status_name,
                old_property_tag: new_property_tag.map(|_| asset.property_tag.clone()),
                new_property_tag: new_property_tag.map(str::to_string),
                old_serial_number: new_serial_number.and(asset.serial_number.clone()),
                new_serial_number: new_serial_number.map(str::to_string),
                remarks: action.remarks.clone(),
            });
        }

        let log = self
            .repository
            .maintenance
            .insert_log(
                &mut tx,
                None,
                workstation.workstation_id,
                LogType::Repair,
                &records,
                payload.remarks.as_deref(),
                caller.user_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            log_id = log.log_id,
            workstation_id = workstation.workstation_id,
            assets = records.len(),
            "Repair logged"
        );
        Ok(log)
    }

    pub async fn list(&self, scope: AccessScope, query: &PmcQuery) -> AppResult<Vec<PmcReportListing>> {
        if let Some(quarter) = query.quarter.as_deref() {
            quarter.parse::<Quarter>()?;
        }
        let lab_id = scope.narrow(query.lab_id)?;
        self.repository.maintenance.list_reports(query, lab_id).await
    }

    pub async fn get(&self, scope: AccessScope, pmc_id: i32) -> AppResult<PmcReportDetails> {
        let report = self.get_scoped(scope, pmc_id).await?;
        let service_logs = self.repository.maintenance.logs_for_report(pmc_id).await?;
        Ok(PmcReportDetails { report, service_logs })
    }

    /// Serviced/unserviced state of every workstation in scope for a quarter
    pub async fn quarter_status(
        &self,
        scope: AccessScope,
        quarter: Quarter,
        lab_id: Option<i32>,
    ) -> AppResult<Vec<WorkstationServiceState>> {
        let lab_id = scope.narrow(lab_id)?;
        let quarter = quarter.to_string();

        let workstations = self.repository.workstations.list(lab_id).await?;
        let mut reports: HashMap<i32, _> = self
            .repository
            .maintenance
            .reports_for_quarter(&quarter, lab_id)
            .await?
            .into_iter()
            .map(|r| (r.workstation_id, r))
            .collect();
        let ids: Vec<i32> = workstations.iter().map(|w| w.workstation_id).collect();
        let mut assets = group_by_workstation(self.repository.assets.for_workstations(&ids).await?);

        Ok(workstations
            .into_iter()
            .map(|w| {
                let report = reports.remove(&w.workstation_id);
                let own = assets.remove(&w.workstation_id).unwrap_or_default();
                WorkstationServiceState {
                    workstation_id: w.workstation_id,
                    workstation_name: w.workstation_name,
                    lab_id: w.lab_id,
                    quarter: quarter.clone(),
                    state: if report.is_some() {
                        ServiceState::Serviced
                    } else {
                        ServiceState::Unserviced
                    },
                    pmc_id: report.as_ref().map(|r| r.pmc_id),
                    service_count: report.as_ref().map_or(0, |r| r.service_count),
                    system_status: aggregate_status(&own),
                    last_serviced_at: report.as_ref().map(|r| r.updated_at),
                }
            })
            .collect())
    }

    /// Data handed to the document renderer for a filed report
    pub async fn export(&self, scope: AccessScope, pmc_id: i32) -> AppResult<PmcExport> {
        let listing = self.get_scoped(scope, pmc_id).await?;
        let monitored_by = self.repository.laboratories.custodian_name(listing.lab_id).await?;
        let assets = AssetsRepository::for_workstation(&self.repository.pool, listing.report.workstation_id).await?;
        let (system_assets, peripherals) = split_by_kind(assets);
        let service_logs = self.repository.maintenance.logs_for_report(pmc_id).await?;

        Ok(PmcExport {
            pmc_id,
            lab_name: listing.lab_name,
            workstation_name: listing.workstation_name,
            quarter: listing.report.quarter,
            workstation_status: listing.report.workstation_status,
            service_count: listing.report.service_count,
            remarks: listing.report.remarks,
            monitored_by,
            system_assets: system_assets.iter().map(ExportAssetRow::from).collect(),
            peripherals: peripherals.iter().map(ExportAssetRow::from).collect(),
            service_logs,
            generated_at: Utc::now(),
        })
    }

    async fn get_scoped(&self, scope: AccessScope, pmc_id: i32) -> AppResult<PmcReportListing> {
        let listing = self.repository.maintenance.get_report(pmc_id).await?;
        scope.ensure_lab(listing.lab_id)?;
        Ok(listing)
    }
}

/// Lock the workstation row and check it is inside the caller's scope
async fn lock_workstation(
    conn: &mut sqlx::PgConnection,
    scope: AccessScope,
    workstation_id: i32,
) -> AppResult<Workstation> {
    let workstation = WorkstationsRepository::lock(&mut *conn, workstation_id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Unknown workstation {}", workstation_id)))?;
    scope.ensure_lab(workstation.lab_id)?;
    Ok(workstation)
}

fn index_assets(assets: Vec<Asset>) -> HashMap<i32, Asset> {
    assets.into_iter().map(|a| (a.asset_id, a)).collect()
}

fn not_on_workstation(asset_id: i32, workstation: &Workstation) -> AppError {
    AppError::Validation(format!(
        "Asset {} is not attached to workstation {}",
        asset_id, workstation.workstation_name
    ))
}

fn ensure_distinct(ids: impl IntoIterator<Item = i32>) -> AppResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("Asset {} is listed more than once", id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_distinct() {
        assert!(ensure_distinct([1, 2, 3]).is_ok());
        assert!(matches!(ensure_distinct([4, 5, 4]), Err(AppError::Validation(_))));
    }
}

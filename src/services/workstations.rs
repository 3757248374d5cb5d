//! Workstation service: CRUD plus live status aggregation

use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::Asset,
        maintenance::ServiceLog,
        workstation::{CreateWorkstation, UpdateWorkstation, Workstation, WorkstationDetails, WorkstationSummary},
    },
    repository::{assets::AssetsRepository, Repository},
    rules::{aggregate_status, status::split_by_kind, AccessScope},
};

#[derive(Clone)]
pub struct WorkstationsService {
    repository: Repository,
}

/// Groups assets by the workstation they are attached to
pub fn group_by_workstation(assets: Vec<Asset>) -> HashMap<i32, Vec<Asset>> {
    let mut grouped: HashMap<i32, Vec<Asset>> = HashMap::new();
    for asset in assets {
        if let Some(ws) = asset.workstation_id {
            grouped.entry(ws).or_default().push(asset);
        }
    }
    grouped
}

impl WorkstationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Workstations in scope, each with its status recomputed from its assets
    pub async fn list(&self, scope: AccessScope, lab_id: Option<i32>) -> AppResult<Vec<WorkstationSummary>> {
        let lab_id = scope.narrow(lab_id)?;
        let workstations = self.repository.workstations.list(lab_id).await?;
        let ids: Vec<i32> = workstations.iter().map(|w| w.workstation_id).collect();
        let mut assets = group_by_workstation(self.repository.assets.for_workstations(&ids).await?);

        Ok(workstations
            .into_iter()
            .map(|workstation| {
                let own = assets.remove(&workstation.workstation_id).unwrap_or_default();
                WorkstationSummary {
                    system_status: aggregate_status(&own),
                    asset_count: own.len(),
                    workstation,
                }
            })
            .collect())
    }

    pub async fn get(&self, scope: AccessScope, id: i32) -> AppResult<WorkstationDetails> {
        let workstation = self.get_scoped(scope, id).await?;
        let assets = AssetsRepository::for_workstation(&self.repository.pool, id).await?;
        let system_status = aggregate_status(&assets);
        let (system_assets, peripherals) = split_by_kind(assets);
        Ok(WorkstationDetails {
            workstation,
            system_status,
            system_assets,
            peripherals,
        })
    }

    pub async fn create(&self, scope: AccessScope, data: &CreateWorkstation) -> AppResult<Workstation> {
        scope.ensure_lab(data.lab_id)?;
        if !self.repository.laboratories.exists(data.lab_id).await? {
            return Err(AppError::Validation(format!("Unknown laboratory {}", data.lab_id)));
        }
        let workstation = self.repository.workstations.create(data).await?;
        tracing::info!(
            workstation_id = workstation.workstation_id,
            lab_id = workstation.lab_id,
            "Workstation created"
        );
        Ok(workstation)
    }

    pub async fn update(&self, scope: AccessScope, id: i32, data: &UpdateWorkstation) -> AppResult<Workstation> {
        self.get_scoped(scope, id).await?;
        let workstation = self.repository.workstations.update(id, data).await?;
        tracing::info!(workstation_id = id, "Workstation updated");
        Ok(workstation)
    }

    pub async fn delete(&self, scope: AccessScope, id: i32) -> AppResult<()> {
        self.get_scoped(scope, id).await?;
        self.repository.workstations.delete(id).await?;
        tracing::info!(workstation_id = id, "Workstation deleted");
        Ok(())
    }

    /// Maintenance and repair history of a workstation
    pub async fn service_logs(&self, scope: AccessScope, id: i32) -> AppResult<Vec<ServiceLog>> {
        self.get_scoped(scope, id).await?;
        self.repository.maintenance.logs_for_workstation(id).await
    }

    async fn get_scoped(&self, scope: AccessScope, id: i32) -> AppResult<Workstation> {
        let workstation = self.repository.workstations.get_by_id(id).await?;
        scope.ensure_lab(workstation.lab_id)?;
        Ok(workstation)
    }
}

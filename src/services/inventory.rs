//! Inventory service

use std::collections::HashSet;

use sqlx::PgConnection;

use crate::{
    error::{AppError, AppResult},
    models::asset::{Asset, AssetQuery, AssetStatus, CreateAsset, StatusCount, UpdateAsset},
    repository::{assets::AssetsRepository, workstations::WorkstationsRepository, Repository},
    rules::AccessScope,
};

/// Status given to assets created without one
pub const DEFAULT_STATUS: &str = "Functional";

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn search(&self, scope: AccessScope, query: &AssetQuery) -> AppResult<(Vec<Asset>, i64)> {
        let lab_id = scope.narrow(query.lab_id)?;
        self.repository.assets.search(query, lab_id).await
    }

    pub async fn get(&self, scope: AccessScope, id: i32) -> AppResult<Asset> {
        let asset = self.repository.assets.get_by_id(id).await?;
        scope.ensure_lab(asset.lab_id)?;
        Ok(asset)
    }

    pub async fn create(&self, scope: AccessScope, data: &CreateAsset) -> AppResult<Asset> {
        let mut tx = self.repository.begin().await?;
        let id = self.insert_checked(&mut tx, scope, data).await?;
        tx.commit().await?;

        tracing::info!(asset_id = id, lab_id = data.lab_id, "Asset created");
        self.repository.assets.get_by_id(id).await
    }

    /// Create every asset or none of them
    pub async fn create_batch(&self, scope: AccessScope, assets: &[CreateAsset]) -> AppResult<Vec<Asset>> {
        ensure_unique_tags(assets)?;

        let mut tx = self.repository.begin().await?;
        let mut ids = Vec::with_capacity(assets.len());
        for (index, data) in assets.iter().enumerate() {
            let id = self
                .insert_checked(&mut tx, scope, data)
                .await
                .map_err(|e| in_batch(index, e))?;
            ids.push(id);
        }

        let mut created = Vec::with_capacity(ids.len());
        for id in ids {
            let asset = AssetsRepository::find(&mut *tx, id)
                .await?
                .ok_or_else(|| AppError::Internal(format!("Asset {} vanished inside its batch", id)))?;
            created.push(asset);
        }
        tx.commit().await?;

        tracing::info!(count = created.len(), "Asset batch created");
        Ok(created)
    }

    pub async fn update(&self, scope: AccessScope, id: i32, data: &UpdateAsset) -> AppResult<Asset> {
        let existing = self.get(scope, id).await?;

        if let Some(workstation_id) = data.workstation_id.filter(|_| !data.unassign_workstation) {
            let workstation = WorkstationsRepository::find(&self.repository.pool, workstation_id)
                .await?
                .ok_or_else(|| AppError::Validation(format!("Unknown workstation {}", workstation_id)))?;
            if workstation.lab_id != existing.lab_id {
                return Err(AppError::Validation(
                    "Workstation belongs to another laboratory".to_string(),
                ));
            }
        }

        let status_id = match data.status.as_deref() {
            Some(name) => Some(AssetsRepository::status_by_name(&self.repository.pool, name).await?.status_id),
            None => None,
        };

        let asset = self.repository.assets.update(id, data, status_id).await?;
        if existing.status_id != asset.status_id {
            tracing::info!(
                asset_id = id,
                from = %existing.status_name,
                to = %asset.status_name,
                "Asset status changed"
            );
        }
        Ok(asset)
    }

    pub async fn delete(&self, scope: AccessScope, id: i32) -> AppResult<()> {
        self.get(scope, id).await?;
        self.repository.assets.delete(id).await?;
        tracing::info!(asset_id = id, "Asset deleted");
        Ok(())
    }

    pub async fn statuses(&self) -> AppResult<Vec<AssetStatus>> {
        self.repository.assets.statuses().await
    }

    /// Asset counts per status for the laboratories in scope
    pub async fn summary(&self, scope: AccessScope, lab_id: Option<i32>) -> AppResult<Vec<StatusCount>> {
        let lab_id = scope.narrow(lab_id)?;
        self.repository.assets.count_by_status(lab_id).await
    }

    async fn insert_checked(&self, conn: &mut PgConnection, scope: AccessScope, data: &CreateAsset) -> AppResult<i32> {
        scope.ensure_lab(data.lab_id)?;

        if let Some(workstation_id) = data.workstation_id {
            let workstation = WorkstationsRepository::find(&mut *conn, workstation_id)
                .await?
                .ok_or_else(|| AppError::Validation(format!("Unknown workstation {}", workstation_id)))?;
            if workstation.lab_id != data.lab_id {
                return Err(AppError::Validation(
                    "Workstation belongs to another laboratory".to_string(),
                ));
            }
        }

        let status_name = data.status.as_deref().unwrap_or(DEFAULT_STATUS);
        let status = AssetsRepository::status_by_name(&mut *conn, status_name).await?;
        self.repository.assets.insert(conn, data, status.status_id).await
    }
}

/// Rejects a batch naming the same property tag twice
fn ensure_unique_tags(assets: &[CreateAsset]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for (index, asset) in assets.iter().enumerate() {
        if !seen.insert(asset.property_tag.trim()) {
            return Err(AppError::Conflict(format!(
                "Asset #{}: property tag {} appears twice in the batch",
                index + 1,
                asset.property_tag.trim()
            )));
        }
    }
    Ok(())
}

/// Prefix an error with the 1-based position of the failing asset
fn in_batch(index: usize, err: AppError) -> AppError {
    let position = index + 1;
    match err {
        AppError::Validation(msg) => AppError::Validation(format!("Asset #{}: {}", position, msg)),
        AppError::Conflict(msg) => AppError::Conflict(format!("Asset #{}: {}", position, msg)),
        AppError::Authorization(msg) => AppError::Authorization(format!("Asset #{}: {}", position, msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(tag: &str) -> CreateAsset {
        CreateAsset {
            property_tag: tag.to_string(),
            unit_type: "CPU".to_string(),
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
    fn test_duplicate_tags_in_batch() {
        let batch = vec![asset("PT-1"), asset("PT-2"), asset("PT-1 ")];
        match ensure_unique_tags(&batch) {
            Err(AppError::Conflict(msg)) => assert!(msg.starts_with("Asset #3")),
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(ensure_unique_tags(&batch[..2]).is_ok());
    }

    #[test]
    fn test_tags_differing_in_case_are_distinct() {
        // inventory_assets_property_tag_key compares tags exactly
        let batch = vec![asset("PT-1"), asset("pt-1")];
        assert!(ensure_unique_tags(&batch).is_ok());
    }

    #[test]
    fn test_batch_error_keeps_kind() {
        let err = in_batch(2, AppError::Conflict("Property tag already exists".to_string()));
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, "Asset #3: Property tag already exists"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            in_batch(0, AppError::Internal("x".to_string())),
            AppError::Internal(_)
        ));
    }
}

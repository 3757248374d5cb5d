//! Laboratory management service

use crate::{
    error::{AppError, AppResult},
    models::{
        laboratory::{CreateLaboratory, Laboratory, LaboratoryDetails, LaboratoryOption, UpdateLaboratory},
        user::Role,
    },
    repository::Repository,
    rules::AccessScope,
};

#[derive(Clone)]
pub struct LaboratoriesService {
    repository: Repository,
}

impl LaboratoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, scope: AccessScope) -> AppResult<Vec<Laboratory>> {
        self.repository.laboratories.list(scope.lab_filter()).await
    }

    pub async fn list_options(&self) -> AppResult<Vec<LaboratoryOption>> {
        self.repository.laboratories.list_options().await
    }

    pub async fn get(&self, scope: AccessScope, id: i32) -> AppResult<LaboratoryDetails> {
        scope.ensure_lab(id)?;
        let laboratory = self.repository.laboratories.get_by_id(id).await?;
        let (workstation_count, asset_count) = self.repository.laboratories.counts(id).await?;
        Ok(LaboratoryDetails {
            laboratory,
            workstation_count,
            asset_count,
        })
    }

    pub async fn create(&self, data: &CreateLaboratory) -> AppResult<Laboratory> {
        let lab = self.repository.laboratories.create(data).await?;
        tracing::info!(lab_id = lab.lab_id, "Laboratory created");
        Ok(lab)
    }

    pub async fn update(&self, id: i32, data: &UpdateLaboratory) -> AppResult<Laboratory> {
        let lab = self.repository.laboratories.update(id, data).await?;
        tracing::info!(lab_id = id, "Laboratory updated");
        Ok(lab)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.laboratories.delete(id).await?;
        tracing::info!(lab_id = id, "Laboratory deleted");
        Ok(())
    }

    /// Put a custodian in charge of a laboratory, replacing the previous one
    pub async fn assign_custodian(&self, lab_id: i32, user_id: i32) -> AppResult<Laboratory> {
        let user = self
            .repository
            .users
            .get_by_id(user_id)
            .await
            .map_err(|e| unknown_user(user_id, e))?;
        if user.role != Role::Custodian {
            return Err(AppError::Validation(format!(
                "User {} is not a custodian",
                user.username
            )));
        }
        if !user.is_active {
            return Err(AppError::Validation(format!(
                "User {} is deactivated",
                user.username
            )));
        }

        let mut tx = self.repository.begin().await?;
        self.repository
            .laboratories
            .assign_custodian(&mut tx, lab_id, user_id)
            .await?;
        tx.commit().await?;

        tracing::info!(lab_id, user_id, "Custodian assigned to laboratory");
        self.repository.laboratories.get_by_id(lab_id).await
    }
}

/// A missing user is a bad request here; other failures pass through
fn unknown_user(user_id: i32, err: AppError) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::Validation(format!("Unknown user {}", user_id)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_keeps_database_failures() {
        assert!(matches!(
            unknown_user(5, AppError::NotFound("User with id 5 not found".to_string())),
            AppError::Validation(msg) if msg == "Unknown user 5"
        ));
        assert!(matches!(
            unknown_user(5, AppError::Database(sqlx::Error::PoolTimedOut)),
            AppError::Database(_)
        ));
    }
}

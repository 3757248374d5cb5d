//! Checklist procedures used by daily and quarterly reports

use crate::{
    error::AppResult,
    models::procedure::{CreateProcedure, Procedure, ProcedureQuery, UpdateProcedure},
    repository::Repository,
};

#[derive(Clone)]
pub struct ProceduresService {
    repository: Repository,
}

impl ProceduresService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &ProcedureQuery) -> AppResult<Vec<Procedure>> {
        self.repository
            .procedures
            .list(query.category, query.include_inactive)
            .await
    }

    pub async fn create(&self, data: &CreateProcedure) -> AppResult<Procedure> {
        let procedure = self.repository.procedures.create(data).await?;
        tracing::info!(procedure_id = procedure.procedure_id, category = procedure.category.as_str(), "Procedure created");
        Ok(procedure)
    }

    pub async fn update(&self, id: i32, data: &UpdateProcedure) -> AppResult<Procedure> {
        self.repository.procedures.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.procedures.delete(id).await?;
        tracing::info!(procedure_id = id, "Procedure removed");
        Ok(())
    }
}

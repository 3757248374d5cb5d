//! Business logic services

pub mod daily_reports;
pub mod forms;
pub mod inventory;
pub mod laboratories;
pub mod maintenance;
pub mod procedures;
pub mod users;
pub mod workstations;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub laboratories: laboratories::LaboratoriesService,
    pub workstations: workstations::WorkstationsService,
    pub inventory: inventory::InventoryService,
    pub maintenance: maintenance::MaintenanceService,
    pub daily_reports: daily_reports::DailyReportsService,
    pub procedures: procedures::ProceduresService,
    pub forms: forms::FormsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            laboratories: laboratories::LaboratoriesService::new(repository.clone()),
            workstations: workstations::WorkstationsService::new(repository.clone()),
            inventory: inventory::InventoryService::new(repository.clone()),
            maintenance: maintenance::MaintenanceService::new(repository.clone()),
            daily_reports: daily_reports::DailyReportsService::new(repository.clone()),
            procedures: procedures::ProceduresService::new(repository.clone()),
            forms: forms::FormsService::new(repository.clone()),
            repository,
        }
    }

    /// Database connectivity check
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}

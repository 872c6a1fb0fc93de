//! Business logic services

pub mod assets;
pub mod logs;
pub mod maintenance;
pub mod reference;
pub mod specifications;
pub mod summary;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub users: users::UsersService,
    pub reference: reference::ReferenceService,
    pub assets: assets::AssetsService,
    pub specifications: specifications::SpecificationsService,
    pub logs: logs::LogsService,
    pub maintenance: maintenance::MaintenanceService,
    pub summary: summary::SummaryService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            reference: reference::ReferenceService::new(repository.clone()),
            assets: assets::AssetsService::new(repository.clone()),
            specifications: specifications::SpecificationsService::new(repository.clone()),
            logs: logs::LogsService::new(repository.clone()),
            maintenance: maintenance::MaintenanceService::new(repository.clone()),
            summary: summary::SummaryService::new(repository.clone()),
            repository,
        }
    }
}

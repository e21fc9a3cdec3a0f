//! Business logic services

pub mod catalog;
pub mod inventory;
pub mod loans;
pub mod redis;
pub mod users;

use std::sync::Arc;

use crate::{
    config::AppConfig, models::renewal::RenewalPolicy, repository::Repository,
    session::SessionBackendStore,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub inventory: inventory::InventoryService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    /// Per-request source of the logged-in user's permissions
    pub accounts: Arc<dyn users::AccountLookup>,
    pub sessions: SessionBackendStore,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository and session backend
    pub fn new(repository: Repository, config: &AppConfig, sessions: SessionBackendStore) -> Self {
        let users = users::UsersService::new(repository.clone());
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            inventory: inventory::InventoryService::new(repository.clone()),
            loans: loans::LoansService::new(
                repository.clone(),
                RenewalPolicy::from(&config.catalog),
            ),
            accounts: Arc::new(users.clone()),
            users,
            sessions,
            repository,
        }
    }
}

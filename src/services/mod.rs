//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;

use sqlx::{Pool, Postgres};

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pool: Pool<Postgres>,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            pool: repository.pool,
        }
    }

    /// Database pool, for readiness probes
    pub fn pool(&self) -> Pool<Postgres> {
        self.pool.clone()
    }
}

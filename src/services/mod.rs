//! Business logic services

pub mod auth;
pub mod email;
pub mod loans;
pub mod requests;
pub mod returns;
pub mod stats;
pub mod tools;
pub mod users;

use crate::config::{AuthConfig, EmailConfig};
use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub tools: tools::ToolsService,
    pub requests: requests::RequestsService,
    pub loans: loans::LoansService,
    pub returns: returns::ReturnsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        email_config: &EmailConfig,
    ) -> Self {
        let notifier = email::notifier_from_config(email_config);
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config, notifier),
            users: users::UsersService::new(repository.clone()),
            tools: tools::ToolsService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            returns: returns::ReturnsService::new(repository.clone()),
            stats: stats::StatsService::new(repository),
        }
    }
}

//! Application state - Dependency injection container for handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::events::UserEventPublisher;
use crate::infra::{Database, FileStore};
use crate::services::{AuthService, ListingService, Services, TokenService, UserService};

/// Application state holding every collaborator the handlers use.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub listing_service: Arc<dyn ListingService>,
    pub token_service: Arc<dyn TokenService>,
    /// File persistence for uploaded pictures
    pub files: Arc<dyn FileStore>,
    /// Outbound event queue
    pub events: Arc<dyn UserEventPublisher>,
    pub database: Arc<Database>,
    pub config: Config,
}

impl AppState {
    /// Build state from a wired service container.
    pub fn new(
        services: Arc<Services>,
        files: Arc<dyn FileStore>,
        events: Arc<dyn UserEventPublisher>,
        database: Arc<Database>,
        config: Config,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            listing_service: services.listings(),
            token_service: services.tokens(),
            files,
            events,
            database,
            config,
        }
    }
}

//! Service container - wires repositories into services.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AuthService, Authenticator, ListingManager, ListingService, TokenManager, TokenService,
    UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{ListingStore, TokenStore, UserStore};

/// Holds one instance of every application service.
pub struct Services {
    auth: Arc<dyn AuthService>,
    users: Arc<dyn UserService>,
    listings: Arc<dyn ListingService>,
    tokens: Arc<dyn TokenService>,
}

impl Services {
    /// Wire services from a live database connection.
    pub fn from_connection(db: DatabaseConnection, config: Config) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let listing_repo = Arc::new(ListingStore::new(db.clone()));
        let token_repo = Arc::new(TokenStore::new(db));

        Self {
            auth: Arc::new(Authenticator::new(user_repo.clone(), config)),
            users: Arc::new(UserManager::new(user_repo)),
            listings: Arc::new(ListingManager::new(listing_repo)),
            tokens: Arc::new(TokenManager::new(token_repo)),
        }
    }

    /// Assemble a container from pre-built services (tests inject fakes here).
    pub fn new(
        auth: Arc<dyn AuthService>,
        users: Arc<dyn UserService>,
        listings: Arc<dyn ListingService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            auth,
            users,
            listings,
            tokens,
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    pub fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    pub fn listings(&self) -> Arc<dyn ListingService> {
        self.listings.clone()
    }

    pub fn tokens(&self) -> Arc<dyn TokenService> {
        self.tokens.clone()
    }
}

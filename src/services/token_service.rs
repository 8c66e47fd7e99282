//! Token service - password-reset token lifecycle.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::RESET_TOKEN_HOURS;
use crate::domain::ResetToken;
use crate::errors::AppResult;
use crate::infra::TokenRepository;

/// Token service trait for dependency injection.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issue a fresh reset token for a user.
    async fn issue(&self, user_id: Uuid) -> AppResult<ResetToken>;

    /// Resolve a token by its emailed secret; expired tokens read as absent.
    async fn find_valid(&self, secret: &str) -> AppResult<Option<ResetToken>>;

    /// Delete one token. Returns false if it was already gone.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Delete every outstanding token for a user. Returns the count.
    async fn purge_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}

/// Concrete implementation of TokenService.
pub struct TokenManager {
    tokens: Arc<dyn TokenRepository>,
}

impl TokenManager {
    pub fn new(tokens: Arc<dyn TokenRepository>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TokenService for TokenManager {
    async fn issue(&self, user_id: Uuid) -> AppResult<ResetToken> {
        let secret = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);
        self.tokens.insert(user_id, secret, expires_at).await
    }

    async fn find_valid(&self, secret: &str) -> AppResult<Option<ResetToken>> {
        let token = self.tokens.find_by_secret(secret).await?;
        Ok(token.filter(|t| !t.is_expired(Utc::now())))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.tokens.delete_by_id(id).await
    }

    async fn purge_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.tokens.delete_by_user(user_id).await
    }
}

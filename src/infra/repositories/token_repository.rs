//! Password-reset token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::reset_token;
use crate::domain::ResetToken;
use crate::errors::AppResult;

/// Reset-token repository trait for dependency injection.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn insert(
        &self,
        user_id: Uuid,
        secret: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<ResetToken>;

    async fn find_by_secret(&self, secret: &str) -> AppResult<Option<ResetToken>>;

    /// Delete one token. Returns false if it was already gone.
    async fn delete_by_id(&self, id: Uuid) -> AppResult<bool>;

    /// Delete every outstanding token for a user. Returns the count.
    async fn delete_by_user(&self, user_id: Uuid) -> AppResult<u64>;
}

/// SeaORM-backed reset-token repository.
pub struct TokenStore {
    db: DatabaseConnection,
}

impl TokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn insert(
        &self,
        user_id: Uuid,
        secret: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<ResetToken> {
        let active = reset_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            secret: Set(secret),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now()),
        };

        let model = active.insert(&self.db).await?;
        Ok(ResetToken::from(model))
    }

    async fn find_by_secret(&self, secret: &str) -> AppResult<Option<ResetToken>> {
        let result = reset_token::Entity::find()
            .filter(reset_token::Column::Secret.eq(secret))
            .one(&self.db)
            .await?;
        Ok(result.map(ResetToken::from))
    }

    async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        let result = reset_token::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = reset_token::Entity::delete_many()
            .filter(reset_token::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

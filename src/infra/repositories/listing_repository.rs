//! Listing and listing-photo persistence.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{listing, listing_photo};
use crate::domain::Listing;
use crate::errors::{AppError, AppResult};

/// Listing repository trait for dependency injection.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn insert(
        &self,
        owner_id: Uuid,
        title: String,
        description: String,
        address: String,
        price: i64,
    ) -> AppResult<Listing>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>>;

    /// Caller's listings, newest first.
    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Listing>>;

    async fn add_photo(&self, listing_id: Uuid, path: String) -> AppResult<()>;

    /// Stored photo paths for a listing, oldest first.
    async fn photos(&self, listing_id: Uuid) -> AppResult<Vec<String>>;
}

/// SeaORM-backed listing repository.
pub struct ListingStore {
    db: DatabaseConnection,
}

impl ListingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingRepository for ListingStore {
    async fn insert(
        &self,
        owner_id: Uuid,
        title: String,
        description: String,
        address: String,
        price: i64,
    ) -> AppResult<Listing> {
        let now = Utc::now();
        let active = listing::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            title: Set(title),
            description: Set(description),
            address: Set(address),
            price: Set(price),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&self.db).await?;
        Ok(Listing::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let result = listing::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Listing::from))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Listing>> {
        let models = listing::Entity::find()
            .filter(listing::Column::OwnerId.eq(owner_id))
            .order_by_desc(listing::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Listing::from).collect())
    }

    async fn add_photo(&self, listing_id: Uuid, path: String) -> AppResult<()> {
        let active = listing_photo::ActiveModel {
            id: Set(Uuid::new_v4()),
            listing_id: Set(listing_id),
            path: Set(path),
            created_at: Set(Utc::now()),
        };
        active.insert(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn photos(&self, listing_id: Uuid) -> AppResult<Vec<String>> {
        let models = listing_photo::Entity::find()
            .filter(listing_photo::Column::ListingId.eq(listing_id))
            .order_by_asc(listing_photo::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| m.path).collect())
    }
}

//! Listing service - listing creation, lookup, and photo bookkeeping.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Listing, ListingBasicInfoForm};
use crate::errors::AppResult;
use crate::infra::ListingRepository;

/// Listing service trait for dependency injection.
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Create a listing from a validated basic-info form.
    async fn create(&self, owner_id: Uuid, form: ListingBasicInfoForm) -> AppResult<Listing>;

    /// Lookup by id. Missing listings return None; the edit view turns
    /// that into a soft redirect rather than a 404.
    async fn get(&self, id: Uuid) -> AppResult<Option<Listing>>;

    /// All listings owned by the caller, newest first.
    async fn get_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Listing>>;

    /// Record a stored photo path against a listing.
    async fn add_photo(&self, listing_id: Uuid, path: String) -> AppResult<()>;

    /// Stored photo paths, oldest first.
    async fn photos(&self, listing_id: Uuid) -> AppResult<Vec<String>>;
}

/// Concrete implementation of ListingService.
pub struct ListingManager {
    listings: Arc<dyn ListingRepository>,
}

impl ListingManager {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }
}

#[async_trait]
impl ListingService for ListingManager {
    async fn create(&self, owner_id: Uuid, form: ListingBasicInfoForm) -> AppResult<Listing> {
        self.listings
            .insert(owner_id, form.title, form.description, form.address, form.price)
            .await
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Listing>> {
        self.listings.find_by_id(id).await
    }

    async fn get_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Listing>> {
        self.listings.find_by_owner(owner_id).await
    }

    async fn add_photo(&self, listing_id: Uuid, path: String) -> AppResult<()> {
        self.listings.add_photo(listing_id, path).await
    }

    async fn photos(&self, listing_id: Uuid) -> AppResult<Vec<String>> {
        self.listings.photos(listing_id).await
    }
}

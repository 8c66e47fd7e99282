//! Listing domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Property listing owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    /// Asking price in minor currency units
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Sunny two-bedroom near the park")]
    pub title: String,
    pub description: String,
    pub address: String,
    /// Asking price in minor currency units
    #[schema(example = 25000000)]
    pub price: i64,
    /// Stored photo paths, oldest first
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ListingResponse {
    pub fn new(listing: Listing, photos: Vec<String>) -> Self {
        Self {
            id: listing.id,
            owner_id: listing.owner_id,
            title: listing.title,
            description: listing.description,
            address: listing.address,
            price: listing.price,
            photos,
            created_at: listing.created_at,
        }
    }
}

/// Compact listing representation for index pages; photo paths are
/// only loaded for the single-listing view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListingSummary {
    pub id: Uuid,
    pub title: String,
    pub address: String,
    /// Asking price in minor currency units
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Listing> for ListingSummary {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title,
            address: listing.address,
            price: listing.price,
            created_at: listing.created_at,
        }
    }
}

//! Repository layer - Data access abstraction
//!
//! Repositories provide trait-shaped access to persistence so services
//! can be unit tested against mocks.

pub(crate) mod entities;
mod listing_repository;
mod token_repository;
mod user_repository;

pub use listing_repository::{ListingRepository, ListingStore};
pub use token_repository::{TokenRepository, TokenStore};
pub use user_repository::{UserRepository, UserStore};

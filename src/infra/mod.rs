//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and repositories
//! - Local file storage for uploads

pub mod db;
pub mod repositories;
pub mod storage;

pub use db::{Database, Migrator};
pub use repositories::{
    ListingRepository, ListingStore, TokenRepository, TokenStore, UserRepository, UserStore,
};
pub use storage::{FileStore, LocalFileStore};

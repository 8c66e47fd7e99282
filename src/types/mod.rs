//! Shared types used across handlers.

pub mod response;

pub use response::{GenericResponse, MessageResponse};

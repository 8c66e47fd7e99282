//! Standard response types.

use serde::Serialize;
use utoipa::ToSchema;

/// Success/failure envelope for fire-and-report operations
/// such as photo uploads.
#[derive(Debug, Serialize, ToSchema)]
pub struct GenericResponse {
    pub success: bool,
    pub message: String,
}

impl GenericResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Message-only response
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

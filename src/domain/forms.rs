//! Request-scoped form objects.
//!
//! Forms are bound from request bodies, validated declaratively, then
//! mapped into domain entities by the service layer. They are never
//! persisted. Several handlers share the same form (admin create and
//! public signup both use `UserCreateForm`), which is why they live in
//! the domain layer rather than next to a single handler.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// New-account form, used by public signup and admin user creation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UserCreateForm {
    /// Email address, unique across accounts
    #[validate(email(message = "a well-formed email address is required"))]
    #[schema(example = "user@example.com")]
    pub email: String,

    /// Display name
    #[validate(length(min = 1, message = "name is required"))]
    #[schema(example = "John Doe")]
    pub name: String,

    /// Password (minimum 8 characters)
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,

    /// Password confirmation, must match `password`
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    #[schema(example = "SecurePass123!")]
    pub password_repeated: String,
}

/// Forgot-password form.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ForgetPasswordForm {
    #[validate(email(message = "a well-formed email address is required"))]
    #[schema(example = "user@example.com")]
    pub email: String,
}

/// Reset-password form. The target account comes from the reset
/// session, never from this form.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ResetPasswordForm {
    /// New password (minimum 8 characters)
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,

    /// Password confirmation, must match `password`
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    #[schema(example = "SecurePass123!")]
    pub password_repeated: String,
}

/// Password-change form for a logged-in user.
///
/// Deliberately not a `Validate` form: the change flow reports one
/// human-readable error at a time, checked in order by the service.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub repeated_password: String,
}

/// Basic-info form for creating or editing a listing.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ListingBasicInfoForm {
    #[validate(length(min = 1, message = "title is required"))]
    #[schema(example = "Sunny two-bedroom near the park")]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, message = "address is required"))]
    #[schema(example = "12 Elm Street, Springfield")]
    pub address: String,

    /// Asking price in minor currency units, must be positive
    #[validate(range(min = 1, message = "price must be positive"))]
    #[schema(example = 25000000)]
    pub price: i64,
}

//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{account_handler, auth_handler, listing_handler, user_handler};
use crate::domain::{
    ChangePasswordForm, ForgetPasswordForm, ListingBasicInfoForm, ListingResponse, ListingSummary,
    ProfileResponse, ResetPasswordForm, UserCreateForm, UserResponse, UserRole,
};
use crate::services::TokenResponse;
use crate::types::{GenericResponse, MessageResponse};

/// OpenAPI documentation for the Nestpoint API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nestpoint API",
        version = "0.1.0",
        description = "Property-listing marketplace: accounts, password reset, profiles, and listings",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        // Authentication
        auth_handler::login,
        // Public account flows
        account_handler::signup,
        account_handler::forget_password,
        account_handler::open_reset_session,
        account_handler::reset_password,
        // User pages
        user_handler::get_user_page,
        user_handler::get_self_page,
        user_handler::post_profile,
        user_handler::get_password_policy,
        user_handler::post_password_change,
        user_handler::get_user_create_form,
        user_handler::post_user_create,
        // Listings
        listing_handler::new_listing_form,
        listing_handler::create_listing,
        listing_handler::my_listings,
        listing_handler::view_listing,
        listing_handler::photo_page,
        listing_handler::upload_photo,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            ProfileResponse,
            ListingResponse,
            ListingSummary,
            // Forms
            UserCreateForm,
            ForgetPasswordForm,
            ResetPasswordForm,
            ChangePasswordForm,
            ListingBasicInfoForm,
            // Auth types
            auth_handler::LoginRequest,
            TokenResponse,
            // Handler types
            user_handler::PasswordPolicyResponse,
            listing_handler::ListingEditResponse,
            listing_handler::PhotoPageResponse,
            // Shared responses
            GenericResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login"),
        (name = "Account", description = "Registration and password reset"),
        (name = "Users", description = "User pages and profile management"),
        (name = "Listings", description = "Listing management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /login"))
                        .build(),
                ),
            );
        }
    }
}

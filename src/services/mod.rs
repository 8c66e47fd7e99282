//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on repository traits for
//! dependency inversion, so every service is unit-testable against
//! mocks.

mod auth_service;
pub mod container;
mod listing_service;
mod token_service;
mod user_service;

pub use auth_service::{AuthService, Authenticator, Claims, ResetSessionClaims, TokenResponse};
pub use container::Services;
pub use listing_service::{ListingManager, ListingService};
pub use token_service::{TokenManager, TokenService};
pub use user_service::{UserManager, UserService};

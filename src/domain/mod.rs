//! Domain layer - Core business entities and rules.

pub mod authz;
pub mod forms;
pub mod listing;
pub mod password;
pub mod token;
pub mod user;

pub use authz::{can_access_user, can_edit_listing, Caller};
pub use forms::{
    ChangePasswordForm, ForgetPasswordForm, ListingBasicInfoForm, ResetPasswordForm,
    UserCreateForm,
};
pub use listing::{Listing, ListingResponse, ListingSummary};
pub use password::Password;
pub use token::ResetToken;
pub use user::{ProfileResponse, User, UserProfile, UserResponse, UserRole};

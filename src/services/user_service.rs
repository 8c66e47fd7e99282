//! User service - account creation, profile, and password use cases.

use async_trait::async_trait;
use sea_orm::SqlErr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{ChangePasswordForm, Password, User, UserCreateForm, UserProfile, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID; missing users are a hard not-found.
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Get the profile extension; a user without one gets the empty default.
    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile>;

    async fn update_self_intro(&self, user_id: Uuid, text: String) -> AppResult<()>;

    /// Record a stored picture path on the profile.
    async fn set_picture(&self, user_id: Uuid, path: String) -> AppResult<()>;

    /// Change the caller's password. Checks run in order and the first
    /// failure stops the flow before any mutation.
    async fn change_password(&self, user_id: Uuid, form: &ChangePasswordForm) -> AppResult<()>;

    /// Create an account from a validated form. A duplicate-email race
    /// that slips past form validation surfaces as a field-level
    /// validation error, not a server error.
    async fn create(&self, form: UserCreateForm, role: UserRole) -> AppResult<User>;

    /// Overwrite the password for a reset flow. The caller is
    /// responsible for having resolved `user_id` from trusted state.
    async fn reset_password(&self, user_id: Uuid, new_password: &str) -> AppResult<User>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_by_email(email).await
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        Ok(self
            .users
            .find_profile(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::empty(user_id)))
    }

    async fn update_self_intro(&self, user_id: Uuid, text: String) -> AppResult<()> {
        self.users.upsert_self_intro(user_id, text).await
    }

    async fn set_picture(&self, user_id: Uuid, path: String) -> AppResult<()> {
        self.users.set_picture_path(user_id, path).await
    }

    async fn change_password(&self, user_id: Uuid, form: &ChangePasswordForm) -> AppResult<()> {
        if form.current_password.trim().is_empty()
            || form.new_password.trim().is_empty()
            || form.repeated_password.trim().is_empty()
        {
            return Err(AppError::validation(
                "current password, new password and password confirmation must be provided",
            ));
        }

        if form.new_password != form.repeated_password {
            return Err(AppError::validation("new passwords do not match"));
        }

        let user = self.get_user(user_id).await?;
        if !Password::from_hash(user.password_hash).verify(&form.current_password) {
            return Err(AppError::validation("current password is not correct"));
        }

        let hash = Password::hash(&form.new_password)?.into_string();
        if !self.users.update_password(user_id, hash).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn create(&self, form: UserCreateForm, role: UserRole) -> AppResult<User> {
        let hash = Password::hash(&form.password)?.into_string();

        match self
            .users
            .create(form.email, hash, form.name, role)
            .await
        {
            Ok(user) => Ok(user),
            Err(AppError::Database(e))
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                // Concurrent submissions of the same email both pass form
                // validation; the database unique index decides the winner.
                tracing::warn!(
                    "unique violation while creating user, assuming duplicate email: {}",
                    e
                );
                Err(AppError::validation_field("email", "email already exists"))
            }
            Err(e) => Err(e),
        }
    }

    async fn reset_password(&self, user_id: Uuid, new_password: &str) -> AppResult<User> {
        let user = self.get_user(user_id).await?;
        let hash = Password::hash(new_password)?.into_string();
        if !self.users.update_password(user_id, hash).await? {
            return Err(AppError::NotFound);
        }
        // Re-read so the caller sees the persisted state
        self.get_user(user.id).await
    }
}

//! User and profile persistence.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::{user, user_profile};
use crate::domain::{User, UserProfile, UserRole};
use crate::errors::{AppError, AppResult};

/// User repository trait for dependency injection.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user row. A duplicate email surfaces as the
    /// underlying database error so callers can inspect it.
    async fn create(
        &self,
        email: String,
        password_hash: String,
        name: String,
        role: UserRole,
    ) -> AppResult<User>;

    /// Replace the stored password hash. Returns false if no row matched.
    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<bool>;

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    /// Create or update the profile row's self-introduction text.
    async fn upsert_self_intro(&self, user_id: Uuid, text: String) -> AppResult<()>;

    /// Create or update the profile row's picture path.
    async fn set_picture_path(&self, user_id: Uuid, path: String) -> AppResult<()>;
}

/// SeaORM-backed user repository.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn profile_model(&self, user_id: Uuid) -> AppResult<Option<user_profile::Model>> {
        user_profile::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(AppError::from)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(result.map(User::from))
    }

    async fn create(
        &self,
        email: String,
        password_hash: String,
        name: String,
        role: UserRole,
    ) -> AppResult<User> {
        let now = Utc::now();
        let active = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            name: Set(name),
            role: Set(role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&self.db).await?;
        Ok(User::from(model))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<bool> {
        let Some(model) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(false);
        };

        let mut active: user::ActiveModel = model.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(true)
    }

    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        Ok(self.profile_model(user_id).await?.map(UserProfile::from))
    }

    async fn upsert_self_intro(&self, user_id: Uuid, text: String) -> AppResult<()> {
        match self.profile_model(user_id).await? {
            Some(model) => {
                let mut active: user_profile::ActiveModel = model.into();
                active.self_introduction = Set(text);
                active.update(&self.db).await?;
            }
            None => {
                let active = user_profile::ActiveModel {
                    user_id: Set(user_id),
                    self_introduction: Set(text),
                    picture_path: Set(None),
                };
                active.insert(&self.db).await?;
            }
        }
        Ok(())
    }

    async fn set_picture_path(&self, user_id: Uuid, path: String) -> AppResult<()> {
        match self.profile_model(user_id).await? {
            Some(model) => {
                let mut active: user_profile::ActiveModel = model.into();
                active.picture_path = Set(Some(path));
                active.update(&self.db).await?;
            }
            None => {
                let active = user_profile::ActiveModel {
                    user_id: Set(user_id),
                    self_introduction: Set(String::new()),
                    picture_path: Set(Some(path)),
                };
                active.insert(&self.db).await?;
            }
        }
        Ok(())
    }
}

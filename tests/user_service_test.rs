//! User service unit tests.
//!
//! The password-change guarantees matter most here: every failed check
//! must leave the stored password untouched.

use std::sync::Arc;

use chrono::Utc;
use mockall::mock;
use uuid::Uuid;

use nestpoint::domain::{ChangePasswordForm, Password, User, UserCreateForm, UserProfile, UserRole};
use nestpoint::errors::{AppError, AppResult};
use nestpoint::infra::UserRepository;
use nestpoint::services::{UserManager, UserService};

mock! {
    UserRepo {}

    #[async_trait::async_trait]
    impl UserRepository for UserRepo {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
        async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
        async fn create(
            &self,
            email: String,
            password_hash: String,
            name: String,
            role: UserRole,
        ) -> AppResult<User>;
        async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<bool>;
        async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;
        async fn upsert_self_intro(&self, user_id: Uuid, text: String) -> AppResult<()>;
        async fn set_picture_path(&self, user_id: Uuid, path: String) -> AppResult<()>;
    }
}

fn test_user(id: Uuid, password_hash: String) -> User {
    User {
        id,
        email: "test@example.com".to_string(),
        password_hash,
        name: "Test User".to_string(),
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn service(repo: MockUserRepo) -> UserManager {
    UserManager::new(Arc::new(repo))
}

fn change_form(current: &str, new: &str, repeated: &str) -> ChangePasswordForm {
    ChangePasswordForm {
        current_password: current.to_string(),
        new_password: new.to_string(),
        repeated_password: repeated.to_string(),
    }
}

fn first_message(err: AppError) -> String {
    match err {
        AppError::Validation(fields) => fields[0].message.clone(),
        other => panic!("expected validation error, got {:?}", other),
    }
}

// =============================================================================
// Password change
// =============================================================================

#[tokio::test]
async fn change_password_with_blank_field_touches_nothing() {
    // No expectations set: any repository call fails the test
    let repo = MockUserRepo::new();
    let svc = service(repo);

    let result = svc
        .change_password(Uuid::new_v4(), &change_form("", "new-password-1", "new-password-1"))
        .await;

    let msg = first_message(result.unwrap_err());
    assert!(msg.contains("must be provided"));
}

#[tokio::test]
async fn change_password_mismatch_touches_nothing() {
    let repo = MockUserRepo::new();
    let svc = service(repo);

    let result = svc
        .change_password(
            Uuid::new_v4(),
            &change_form("old-password", "new-password-1", "something-else"),
        )
        .await;

    let msg = first_message(result.unwrap_err());
    assert!(msg.contains("do not match"));
}

#[tokio::test]
async fn change_password_wrong_current_does_not_persist() {
    let user_id = Uuid::new_v4();
    let stored = Password::hash("the-real-password").unwrap().into_string();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(Some(test_user(id, stored.clone()))));
    repo.expect_update_password().never();

    let svc = service(repo);
    let result = svc
        .change_password(
            user_id,
            &change_form("wrong-guess", "new-password-1", "new-password-1"),
        )
        .await;

    let msg = first_message(result.unwrap_err());
    assert!(msg.contains("current password"));
}

#[tokio::test]
async fn change_password_success_persists_new_hash() {
    let user_id = Uuid::new_v4();
    let stored = Password::hash("the-real-password").unwrap().into_string();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(Some(test_user(id, stored.clone()))));
    repo.expect_update_password()
        .withf(move |id, hash| {
            *id == user_id && Password::from_hash(hash.clone()).verify("brand-new-password")
        })
        .times(1)
        .returning(|_, _| Ok(true));

    let svc = service(repo);
    let result = svc
        .change_password(
            user_id,
            &change_form("the-real-password", "brand-new-password", "brand-new-password"),
        )
        .await;

    assert!(result.is_ok());
}

// =============================================================================
// Account creation
// =============================================================================

#[tokio::test]
async fn create_hashes_password_before_storage() {
    let mut repo = MockUserRepo::new();
    repo.expect_create()
        .withf(|_, hash, _, _| hash.starts_with("$argon2") && !hash.contains("hunter2"))
        .times(1)
        .returning(|email, hash, name, _| {
            Ok(User {
                id: Uuid::new_v4(),
                email,
                password_hash: hash,
                name,
                role: UserRole::User,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

    let svc = service(repo);
    let form = UserCreateForm {
        email: "jane@example.com".to_string(),
        name: "Jane".to_string(),
        password: "hunter2hunter2".to_string(),
        password_repeated: "hunter2hunter2".to_string(),
    };

    let user = svc.create(form, UserRole::User).await.unwrap();
    assert_eq!(user.email, "jane@example.com");
}

#[tokio::test]
async fn create_propagates_unrelated_database_errors() {
    let mut repo = MockUserRepo::new();
    repo.expect_create()
        .returning(|_, _, _, _| Err(AppError::Database(sea_orm::DbErr::Custom("boom".into()))));

    let svc = service(repo);
    let form = UserCreateForm {
        email: "jane@example.com".to_string(),
        name: "Jane".to_string(),
        password: "hunter2hunter2".to_string(),
        password_repeated: "hunter2hunter2".to_string(),
    };

    // Not a unique violation, so the duplicate-email mapping must not fire
    let err = svc.create(form, UserRole::User).await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
}

// =============================================================================
// Password reset
// =============================================================================

#[tokio::test]
async fn reset_password_only_touches_the_given_user() {
    let user_id = Uuid::new_v4();
    let stored = Password::hash("forgotten-password").unwrap().into_string();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .withf(move |id| *id == user_id)
        .returning(move |id| Ok(Some(test_user(id, stored.clone()))));
    repo.expect_update_password()
        .withf(move |id, _| *id == user_id)
        .times(1)
        .returning(|_, _| Ok(true));

    let svc = service(repo);
    let user = svc.reset_password(user_id, "replacement-password").await.unwrap();
    assert_eq!(user.id, user_id);
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn missing_profile_reads_as_empty_default() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepo::new();
    repo.expect_find_profile().returning(|_| Ok(None));

    let svc = service(repo);
    let profile = svc.get_profile(user_id).await.unwrap();

    assert_eq!(profile.user_id, user_id);
    assert!(profile.self_introduction.is_empty());
    assert!(profile.picture_path.is_none());
}

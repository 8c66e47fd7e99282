//! Integration tests for API endpoints.
//!
//! The router runs against in-memory service fakes, so these tests
//! exercise binding, validation, authorization, and response mapping
//! without a database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use nestpoint::api::{create_router, AppState};
use nestpoint::config::Config;
use nestpoint::domain::{
    ChangePasswordForm, Listing, ListingBasicInfoForm, ResetToken, User, UserCreateForm,
    UserProfile, UserRole,
};
use nestpoint::errors::{AppError, AppResult};
use nestpoint::events::{UserEventKind, UserEventPublisher};
use nestpoint::infra::{Database, FileStore};
use nestpoint::services::{
    AuthService, Claims, ListingService, ResetSessionClaims, Services, TokenResponse,
    TokenService, UserService,
};

// Fixed identities used across the tests
const ALICE: Uuid = Uuid::from_u128(0xA11CE);
const BOB: Uuid = Uuid::from_u128(0xB0B);
const ADMIN: Uuid = Uuid::from_u128(0xAD);
const LISTING_ID: Uuid = Uuid::from_u128(0x1157);
const NEW_LISTING_ID: Uuid = Uuid::from_u128(0x2257);
const RESET_TOKEN_ID: Uuid = Uuid::from_u128(0x70CE);

fn test_user(id: Uuid, email: &str) -> User {
    User {
        id,
        email: email.to_string(),
        password_hash: "hashed".to_string(),
        name: "Test User".to_string(),
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_listing(id: Uuid, owner_id: Uuid) -> Listing {
    Listing {
        id,
        owner_id,
        title: "Sunny two-bedroom".to_string(),
        description: "Close to the park".to_string(),
        address: "12 Elm Street".to_string(),
        price: 25_000_000,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Service fakes
// =============================================================================

/// Auth fake: fixed bearer tokens, transparent reset sessions.
struct FakeAuthService;

#[async_trait]
impl AuthService for FakeAuthService {
    async fn login(&self, _email: String, _password: String) -> AppResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: "test-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let (sub, role) = match token {
            "alice-token" => (ALICE, "user"),
            "bob-token" => (BOB, "user"),
            "admin-token" => (ADMIN, "admin"),
            _ => return Err(AppError::Unauthorized),
        };
        Ok(Claims {
            sub,
            email: "caller@example.com".to_string(),
            role: role.to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }

    fn issue_reset_session(&self, user_id: Uuid, token_id: Uuid) -> AppResult<String> {
        Ok(format!("reset.{}.{}", user_id, token_id))
    }

    fn verify_reset_session(&self, token: &str) -> AppResult<ResetSessionClaims> {
        let mut parts = token.split('.');
        let (Some("reset"), Some(sub), Some(tid)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::Unauthorized);
        };
        Ok(ResetSessionClaims {
            sub: sub.parse().map_err(|_| AppError::Unauthorized)?,
            tid: tid.parse().map_err(|_| AppError::Unauthorized)?,
            exp: Utc::now().timestamp() + 600,
        })
    }
}

/// User fake: one known account, one permanently-taken email, and a
/// record of reset calls.
#[derive(Default)]
struct FakeUserService {
    reset_calls: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl UserService for FakeUserService {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        Ok(test_user(id, "someone@example.com"))
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        if email == "known@example.com" {
            Ok(Some(test_user(ALICE, email)))
        } else {
            Ok(None)
        }
    }

    async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        Ok(UserProfile::empty(user_id))
    }

    async fn update_self_intro(&self, _user_id: Uuid, _text: String) -> AppResult<()> {
        Ok(())
    }

    async fn set_picture(&self, _user_id: Uuid, _path: String) -> AppResult<()> {
        Ok(())
    }

    async fn change_password(&self, _user_id: Uuid, _form: &ChangePasswordForm) -> AppResult<()> {
        Ok(())
    }

    async fn create(&self, form: UserCreateForm, _role: UserRole) -> AppResult<User> {
        if form.email == "taken@example.com" {
            // What the real service produces when it loses the
            // duplicate-email race at the storage boundary
            return Err(AppError::validation_field("email", "email already exists"));
        }
        Ok(test_user(Uuid::new_v4(), &form.email))
    }

    async fn reset_password(&self, user_id: Uuid, _new_password: &str) -> AppResult<User> {
        self.reset_calls.lock().unwrap().push(user_id);
        Ok(test_user(user_id, "reset@example.com"))
    }
}

/// Listing fake: one existing listing owned by ALICE.
#[derive(Default)]
struct FakeListingService {
    created: Mutex<Vec<(Uuid, ListingBasicInfoForm)>>,
}

#[async_trait]
impl ListingService for FakeListingService {
    async fn create(&self, owner_id: Uuid, form: ListingBasicInfoForm) -> AppResult<Listing> {
        self.created.lock().unwrap().push((owner_id, form));
        Ok(test_listing(NEW_LISTING_ID, owner_id))
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Listing>> {
        if id == LISTING_ID {
            Ok(Some(test_listing(id, ALICE)))
        } else {
            Ok(None)
        }
    }

    async fn get_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Listing>> {
        Ok(vec![test_listing(LISTING_ID, owner_id)])
    }

    async fn add_photo(&self, _listing_id: Uuid, _path: String) -> AppResult<()> {
        Ok(())
    }

    async fn photos(&self, _listing_id: Uuid) -> AppResult<Vec<String>> {
        Ok(vec![])
    }
}

/// Token fake: one valid secret, counts of deletions.
#[derive(Default)]
struct FakeTokenService {
    deleted: Mutex<Vec<Uuid>>,
    purged_users: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl TokenService for FakeTokenService {
    async fn issue(&self, user_id: Uuid) -> AppResult<ResetToken> {
        Ok(ResetToken {
            id: RESET_TOKEN_ID,
            user_id,
            secret: "good-secret".to_string(),
            expires_at: Utc::now() + Duration::hours(24),
            created_at: Utc::now(),
        })
    }

    async fn find_valid(&self, secret: &str) -> AppResult<Option<ResetToken>> {
        if secret == "good-secret" {
            Ok(Some(ResetToken {
                id: RESET_TOKEN_ID,
                user_id: ALICE,
                secret: secret.to_string(),
                expires_at: Utc::now() + Duration::hours(24),
                created_at: Utc::now(),
            }))
        } else {
            Ok(None)
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.deleted.lock().unwrap().push(id);
        Ok(true)
    }

    async fn purge_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.purged_users.lock().unwrap().push(user_id);
        Ok(1)
    }
}

struct FakeFileStore;

#[async_trait]
impl FileStore for FakeFileStore {
    async fn store_user_picture(
        &self,
        _user_id: Uuid,
        _filename: &str,
        _bytes: &[u8],
    ) -> AppResult<String> {
        Ok("users/test/picture.jpg".to_string())
    }

    async fn store_listing_photo(
        &self,
        _listing_id: Uuid,
        _filename: &str,
        _bytes: &[u8],
    ) -> AppResult<String> {
        Ok("listings/test/photo.jpg".to_string())
    }
}

/// Event publisher that records instead of dispatching.
#[derive(Default)]
struct RecordingPublisher {
    events: Mutex<Vec<(UserEventKind, Uuid)>>,
}

impl RecordingPublisher {
    fn count(&self, kind: UserEventKind) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

impl UserEventPublisher for RecordingPublisher {
    fn publish(&self, kind: UserEventKind, user: &User) {
        self.events.lock().unwrap().push((kind, user.id));
    }
}

// =============================================================================
// Test harness
// =============================================================================

struct TestApp {
    router: Router,
    events: Arc<RecordingPublisher>,
    users: Arc<FakeUserService>,
    listings: Arc<FakeListingService>,
    tokens: Arc<FakeTokenService>,
}

fn test_app() -> TestApp {
    let events = Arc::new(RecordingPublisher::default());
    let users = Arc::new(FakeUserService::default());
    let listings = Arc::new(FakeListingService::default());
    let tokens = Arc::new(FakeTokenService::default());

    let services = Arc::new(Services::new(
        Arc::new(FakeAuthService),
        users.clone(),
        listings.clone(),
        tokens.clone(),
    ));

    let database = Arc::new(Database::from_connection(
        sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection(),
    ));

    let state = AppState::new(
        services,
        Arc::new(FakeFileStore),
        events.clone(),
        database,
        Config::from_env(),
    );

    TestApp {
        router: create_router(state),
        events,
        users,
        listings,
        tokens,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    request
}

fn validation_fields(body: &Value) -> Vec<String> {
    body["error"]["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Signup
// =============================================================================

#[tokio::test]
async fn signup_creates_account_and_publishes_confirmation() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        json_post(
            "/signup",
            json!({
                "email": "jane@example.com",
                "name": "Jane",
                "password": "hunter2hunter2",
                "password_repeated": "hunter2hunter2",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "jane@example.com");
    assert_eq!(app.events.count(UserEventKind::AccountConfirmation), 1);
}

#[tokio::test]
async fn signup_reports_every_failed_field() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        json_post(
            "/signup",
            json!({
                "email": "not-an-email",
                "name": "",
                "password": "short",
                "password_repeated": "short",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields = validation_fields(&body);
    assert!(fields.contains(&"email".to_string()));
    assert!(fields.contains(&"name".to_string()));
    assert!(fields.contains(&"password".to_string()));
    assert_eq!(app.events.count(UserEventKind::AccountConfirmation), 0);
}

#[tokio::test]
async fn duplicate_email_is_a_field_error_not_a_server_error() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        json_post(
            "/signup",
            json!({
                "email": "taken@example.com",
                "name": "Jane",
                "password": "hunter2hunter2",
                "password_repeated": "hunter2hunter2",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(validation_fields(&body), vec!["email".to_string()]);
}

// =============================================================================
// Forgot password
// =============================================================================

#[tokio::test]
async fn forgot_password_unknown_email_fails_without_event() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        json_post("/password/forget/handler", json!({"email": "missing@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("no existing user account"));
    assert_eq!(app.events.count(UserEventKind::PasswordResetRequest), 0);
}

#[tokio::test]
async fn forgot_password_known_email_succeeds_with_exactly_one_event() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        json_post("/password/forget/handler", json!({"email": "known@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
    assert_eq!(app.events.count(UserEventKind::PasswordResetRequest), 1);
}

// =============================================================================
// Password reset
// =============================================================================

#[tokio::test]
async fn reset_password_resolves_user_from_session_not_body() {
    let app = test_app();

    // Body claims BOB; the session cookie says ALICE. Only ALICE's
    // account may change.
    let request = Request::builder()
        .method("POST")
        .uri("/password/reset/handler")
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::COOKIE,
            format!("reset_session=reset.{}.{}", ALICE, RESET_TOKEN_ID),
        )
        .body(Body::from(
            json!({
                "user_id": BOB,
                "password": "fresh-password-1",
                "password_repeated": "fresh-password-1",
            })
            .to_string(),
        ))
        .unwrap();

    let (status, _body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(*app.users.reset_calls.lock().unwrap(), vec![ALICE]);
    assert_eq!(app.events.count(UserEventKind::PasswordResetComplete), 1);
    // The session token is deleted and the rest are purged
    assert_eq!(*app.tokens.deleted.lock().unwrap(), vec![RESET_TOKEN_ID]);
    assert_eq!(*app.tokens.purged_users.lock().unwrap(), vec![ALICE]);
}

#[tokio::test]
async fn reset_password_without_session_is_unauthorized() {
    let app = test_app();

    let (status, _body) = send(
        &app.router,
        json_post(
            "/password/reset/handler",
            json!({
                "password": "fresh-password-1",
                "password_repeated": "fresh-password-1",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.users.reset_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn opening_reset_session_requires_valid_secret() {
    let app = test_app();

    let request = Request::builder()
        .uri("/password/reset/bad-secret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .uri("/password/reset/good-secret")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("reset_session="));
    assert!(set_cookie.contains("HttpOnly"));
}

// =============================================================================
// User pages & authorization
// =============================================================================

#[tokio::test]
async fn user_routes_require_authentication() {
    let app = test_app();

    let request = Request::builder().uri("/user").body(Body::empty()).unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_page_denies_other_users() {
    let app = test_app();

    let request = authed(
        Request::builder()
            .uri(format!("/user/{}", ALICE))
            .body(Body::empty())
            .unwrap(),
        "bob-token",
    );
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_page_allows_self_and_admin() {
    let app = test_app();

    let request = authed(
        Request::builder()
            .uri(format!("/user/{}", ALICE))
            .body(Body::empty())
            .unwrap(),
        "alice-token",
    );
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = authed(
        Request::builder()
            .uri(format!("/user/{}", ALICE))
            .body(Body::empty())
            .unwrap(),
        "admin-token",
    );
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_create_is_admin_only() {
    let app = test_app();

    let request = authed(
        Request::builder()
            .uri("/user/create")
            .body(Body::empty())
            .unwrap(),
        "alice-token",
    );
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = authed(
        Request::builder()
            .uri("/user/create")
            .body(Body::empty())
            .unwrap(),
        "admin-token",
    );
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn unknown_listing_redirects_to_root() {
    let app = test_app();

    let request = authed(
        Request::builder()
            .uri(format!("/mgmt/listing/{}", Uuid::from_u128(0xDEAD)))
            .body(Body::empty())
            .unwrap(),
        "alice-token",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn invalid_listing_form_blocks_creation() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        authed(
            json_post(
                "/mgmt/listing",
                json!({"title": "", "address": "12 Elm Street", "price": 0}),
            ),
            "alice-token",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = validation_fields(&body);
    assert!(fields.contains(&"title".to_string()));
    assert!(fields.contains(&"price".to_string()));
    assert!(app.listings.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn listing_create_redirects_to_the_new_listing() {
    let app = test_app();

    let request = authed(
        json_post(
            "/mgmt/listing",
            json!({
                "title": "Sunny two-bedroom",
                "description": "Close to the park",
                "address": "12 Elm Street",
                "price": 25_000_000u64,
            }),
        ),
        "alice-token",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        &format!("/mgmt/listing/{}", NEW_LISTING_ID)
    );

    let created = app.listings.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, ALICE);
}

#[tokio::test]
async fn listing_view_denies_non_owner() {
    let app = test_app();

    let request = authed(
        Request::builder()
            .uri(format!("/mgmt/listing/{}", LISTING_ID))
            .body(Body::empty())
            .unwrap(),
        "bob-token",
    );
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn photo_upload_denies_non_owner_before_storing() {
    let app = test_app();

    let boundary = "x-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
         Content-Type: image/png\r\n\r\nfake-bytes\r\n--{b}--\r\n",
        b = boundary
    );

    let request = authed(
        Request::builder()
            .method("POST")
            .uri(format!("/mgmt/listing/{}/photo", LISTING_ID))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap(),
        "bob-token",
    );
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn photo_upload_by_owner_reports_success() {
    let app = test_app();

    let boundary = "x-test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
         Content-Type: image/png\r\n\r\nfake-bytes\r\n--{b}--\r\n",
        b = boundary
    );

    let request = authed(
        Request::builder()
            .method("POST")
            .uri(format!("/mgmt/listing/{}/photo", LISTING_ID))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap(),
        "alice-token",
    );
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn my_listings_returns_summaries() {
    let app = test_app();

    let request = authed(
        Request::builder()
            .uri("/mgmt/listings")
            .body(Body::empty())
            .unwrap(),
        "alice-token",
    );
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    let listings = body.as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["title"], "Sunny two-bedroom");
}

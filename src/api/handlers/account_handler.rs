//! Public account handlers: signup and the password-reset flow.
//!
//! None of these routes sit behind the JWT middleware. The reset flow
//! resolves its target account from a signed reset-session cookie, so
//! nothing in a request body can redirect the reset at another user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::RESET_SESSION_COOKIE;
use crate::domain::{ForgetPasswordForm, ResetPasswordForm, UserCreateForm, UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::events::UserEventKind;
use crate::types::MessageResponse;

/// Create public account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/password/forget/handler", post(forget_password))
        .route("/password/reset/:secret", get(open_reset_session))
        .route("/password/reset/handler", post(reset_password))
}

/// Public registration
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Account",
    request_body = UserCreateForm,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation error with all failed fields")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<UserCreateForm>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    tracing::debug!(email = %form.email, "processing signup");

    let user = state.user_service.create(form, UserRole::User).await?;
    state
        .events
        .publish(UserEventKind::AccountConfirmation, &user);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Request a password reset email
#[utoipa::path(
    post,
    path = "/password/forget/handler",
    tag = "Account",
    request_body = ForgetPasswordForm,
    responses(
        (status = 200, description = "Reset requested, empty body"),
        (status = 400, description = "Unknown email or validation error")
    )
)]
pub async fn forget_password(
    State(state): State<AppState>,
    ValidatedJson(form): ValidatedJson<ForgetPasswordForm>,
) -> AppResult<StatusCode> {
    tracing::debug!(email = %form.email, "processing forgot-password");

    // Naming the missing account discloses which emails are registered.
    // The product accepts that tradeoff for a clearer user experience.
    let Some(user) = state.user_service.get_user_by_email(&form.email).await? else {
        return Err(AppError::BadRequest(
            "there is no existing user account associated with this email address".to_string(),
        ));
    };

    state
        .events
        .publish(UserEventKind::PasswordResetRequest, &user);

    Ok(StatusCode::OK)
}

/// Exchange an emailed reset-token secret for a reset session.
///
/// Sets a short-lived signed cookie binding the session to the account
/// and the token row it came from.
#[utoipa::path(
    get,
    path = "/password/reset/{secret}",
    tag = "Account",
    params(("secret" = String, Path, description = "Emailed reset-token secret")),
    responses(
        (status = 200, description = "Reset session opened"),
        (status = 400, description = "Invalid or expired reset link")
    )
)]
pub async fn open_reset_session(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let Some(token) = state.token_service.find_valid(&secret).await? else {
        return Err(AppError::BadRequest(
            "this password reset link is invalid or has expired".to_string(),
        ));
    };

    let session = state
        .auth_service
        .issue_reset_session(token.user_id, token.id)?;

    let cookie = Cookie::build((RESET_SESSION_COOKIE, session))
        .path("/")
        .http_only(true)
        .build();

    Ok((
        jar.add(cookie),
        Json(MessageResponse::new("reset session opened")),
    ))
}

/// Complete a password reset.
///
/// The target account comes from the reset-session cookie; any user id
/// smuggled into the request body is ignored.
#[utoipa::path(
    post,
    path = "/password/reset/handler",
    tag = "Account",
    request_body = ResetPasswordForm,
    responses(
        (status = 200, description = "Password reset", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "No open reset session")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(form): ValidatedJson<ResetPasswordForm>,
) -> AppResult<(CookieJar, Json<UserResponse>)> {
    let session = jar
        .get(RESET_SESSION_COOKIE)
        .ok_or(AppError::Unauthorized)?
        .value()
        .to_string();
    let claims = state.auth_service.verify_reset_session(&session)?;

    tracing::debug!(user = %claims.sub, "processing password reset");

    let user = state
        .user_service
        .reset_password(claims.sub, &form.password)
        .await?;

    state
        .events
        .publish(UserEventKind::PasswordResetComplete, &user);

    // The session's token goes first; purging the rest closes the hole
    // where older emailed links would stay usable after a reset.
    let deleted = state.token_service.delete(claims.tid).await?;
    let purged = state.token_service.purge_for_user(claims.sub).await?;
    tracing::debug!(deleted, purged, "reset tokens cleaned up");

    Ok((
        jar.remove(Cookie::from(RESET_SESSION_COOKIE)),
        Json(UserResponse::from(user)),
    ))
}

//! User page, profile, password-change, and admin-create handlers.

use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
    response::{Json, Redirect},
    routing::get,
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::config::MIN_PASSWORD_LENGTH;
use crate::domain::{
    can_access_user, ChangePasswordForm, ProfileResponse, UserCreateForm, UserResponse, UserRole,
};
use crate::errors::{AppError, AppResult};
use crate::types::MessageResponse;

/// Password policy descriptor for the change-password page.
#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordPolicyResponse {
    pub min_password_length: u64,
}

/// Create user routes (all behind the JWT middleware)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(get_self_page).post(post_profile))
        .route(
            "/user/password",
            get(get_password_policy).post(post_password_change),
        )
        .route(
            "/user/create",
            get(get_user_create_form).post(post_user_create),
        )
        .route("/user/:id", get(get_user_page))
}

/// View another user's page
#[utoipa::path(
    get,
    path = "/user/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 403, description = "Caller may not access this user"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    if !can_access_user(&current.caller(), id) {
        return Err(AppError::Forbidden);
    }

    tracing::debug!(user = %id, "getting user page");
    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// View own profile
#[utoipa::path(
    get,
    path = "/user",
    tag = "Users",
    responses((status = 200, description = "Own profile", body = ProfileResponse)),
    security(("bearer_auth" = []))
)]
pub async fn get_self_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ProfileResponse>> {
    let user = state.user_service.get_user(current.id).await?;
    let profile = state.user_service.get_profile(current.id).await?;
    Ok(Json(ProfileResponse::new(user, profile)))
}

/// Update own profile: optional picture upload plus self-introduction.
///
/// Multipart fields: `file` (optional picture) and `self-introduction`
/// (free text). The picture is stored before any text is persisted.
#[utoipa::path(
    post,
    path = "/user",
    tag = "Users",
    responses(
        (status = 303, description = "Profile updated, redirect to /user"),
        (status = 400, description = "Upload rejected")
    ),
    security(("bearer_auth" = []))
)]
pub async fn post_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut self_intro = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() {
                    upload = Some((filename, bytes.to_vec()));
                }
            }
            Some("self-introduction") => {
                self_intro = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            _ => {}
        }
    }

    // Store the picture first; text fields persist only afterwards
    if let Some((filename, bytes)) = upload {
        let path = state
            .files
            .store_user_picture(current.id, &filename, &bytes)
            .await?;
        state.user_service.set_picture(current.id, path).await?;
    }

    state
        .user_service
        .update_self_intro(current.id, self_intro)
        .await?;

    Ok(Redirect::to("/user"))
}

/// Password policy for the change form
#[utoipa::path(
    get,
    path = "/user/password",
    tag = "Users",
    responses((status = 200, description = "Password policy", body = PasswordPolicyResponse)),
    security(("bearer_auth" = []))
)]
pub async fn get_password_policy() -> Json<PasswordPolicyResponse> {
    Json(PasswordPolicyResponse {
        min_password_length: MIN_PASSWORD_LENGTH,
    })
}

/// Change own password
#[utoipa::path(
    post,
    path = "/user/password",
    tag = "Users",
    request_body = ChangePasswordForm,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "One human-readable error; nothing was changed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn post_password_change(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(form): Json<ChangePasswordForm>,
) -> AppResult<Json<MessageResponse>> {
    state
        .user_service
        .change_password(current.id, &form)
        .await?;

    Ok(Json(MessageResponse::new(
        "Password is updated successfully",
    )))
}

/// Admin: empty user-create form scaffold
#[utoipa::path(
    get,
    path = "/user/create",
    tag = "Users",
    responses(
        (status = 200, description = "Empty form", body = UserCreateForm),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_create_form(
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserCreateForm>> {
    require_admin(&current)?;
    tracing::debug!("getting user create form");
    Ok(Json(UserCreateForm::default()))
}

/// Admin: create a user
///
/// Two admins racing on the same email can both pass validation; the
/// loser's unique violation comes back as a field-level error on
/// `email`, not a server error.
#[utoipa::path(
    post,
    path = "/user/create",
    tag = "Users",
    request_body = UserCreateForm,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error, including duplicate email"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn post_user_create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(form): ValidatedJson<UserCreateForm>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    require_admin(&current)?;
    tracing::debug!(email = %form.email, "processing admin user create");

    let user = state.user_service.create(form, UserRole::User).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

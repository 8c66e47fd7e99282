//! Listing management handlers under `/mgmt`.

use axum::{
    extract::{Extension, Multipart, Path, State},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    can_edit_listing, Listing, ListingBasicInfoForm, ListingResponse, ListingSummary,
};
use crate::errors::{AppError, AppResult};
use crate::types::GenericResponse;

/// Data for the single-listing edit view: the listing itself plus a
/// form prefilled with its current basic info.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingEditResponse {
    pub listing: ListingResponse,
    pub form: ListingBasicInfoForm,
}

/// Descriptor for the photo-upload page
#[derive(Debug, Serialize, ToSchema)]
pub struct PhotoPageResponse {
    pub listing_id: Uuid,
}

/// Create listing routes (all behind the JWT middleware)
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/mgmt/listing/new", get(new_listing_form))
        .route("/mgmt/listing", post(create_listing))
        .route("/mgmt/listings", get(my_listings))
        .route("/mgmt/listing/:id", get(view_listing))
        .route(
            "/mgmt/listing/:id/photo",
            get(photo_page).post(upload_photo),
        )
}

/// Fetch a listing and check the caller may edit it.
async fn editable_listing(
    state: &AppState,
    current: &CurrentUser,
    id: Uuid,
) -> AppResult<Listing> {
    let listing = state
        .listing_service
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !can_edit_listing(&current.caller(), listing.owner_id) {
        return Err(AppError::Forbidden);
    }

    Ok(listing)
}

/// Empty listing form scaffold
#[utoipa::path(
    get,
    path = "/mgmt/listing/new",
    tag = "Listings",
    responses((status = 200, description = "Empty form", body = ListingBasicInfoForm)),
    security(("bearer_auth" = []))
)]
pub async fn new_listing_form() -> Json<ListingBasicInfoForm> {
    Json(ListingBasicInfoForm::default())
}

/// Create a listing owned by the caller.
///
/// Validation failures block creation; on success the caller is
/// redirected to the new listing's page.
#[utoipa::path(
    post,
    path = "/mgmt/listing",
    tag = "Listings",
    request_body = ListingBasicInfoForm,
    responses(
        (status = 303, description = "Created, redirect to the listing page"),
        (status = 400, description = "Validation error, nothing created")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(form): ValidatedJson<ListingBasicInfoForm>,
) -> AppResult<Redirect> {
    tracing::debug!(owner = %current.id, "processing listing create");

    let listing = state.listing_service.create(current.id, form).await?;
    Ok(Redirect::to(&format!("/mgmt/listing/{}", listing.id)))
}

/// Caller's own listings
#[utoipa::path(
    get,
    path = "/mgmt/listings",
    tag = "Listings",
    responses((status = 200, description = "Caller's listings, newest first", body = [ListingSummary])),
    security(("bearer_auth" = []))
)]
pub async fn my_listings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ListingSummary>>> {
    let listings = state.listing_service.get_by_owner(current.id).await?;
    Ok(Json(
        listings.into_iter().map(ListingSummary::from).collect(),
    ))
}

/// View/edit a single listing.
///
/// An id that resolves to nothing redirects to the site root instead
/// of returning 404.
#[utoipa::path(
    get,
    path = "/mgmt/listing/{id}",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing with prefilled edit form", body = ListingEditResponse),
        (status = 303, description = "Unknown id, redirect to /"),
        (status = 403, description = "Caller may not edit this listing")
    ),
    security(("bearer_auth" = []))
)]
pub async fn view_listing(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let Some(listing) = state.listing_service.get(id).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    if !can_edit_listing(&current.caller(), listing.owner_id) {
        return Err(AppError::Forbidden);
    }

    let photos = state.listing_service.photos(listing.id).await?;
    let form = ListingBasicInfoForm {
        title: listing.title.clone(),
        description: listing.description.clone(),
        address: listing.address.clone(),
        price: listing.price,
    };

    Ok(Json(ListingEditResponse {
        listing: ListingResponse::new(listing, photos),
        form,
    })
    .into_response())
}

/// Photo-upload page descriptor
#[utoipa::path(
    get,
    path = "/mgmt/listing/{id}/photo",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Upload page data", body = PhotoPageResponse),
        (status = 403, description = "Caller may not edit this listing"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn photo_page(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PhotoPageResponse>> {
    let listing = editable_listing(&state, &current, id).await?;
    Ok(Json(PhotoPageResponse {
        listing_id: listing.id,
    }))
}

/// Upload a photo for a listing.
///
/// Multipart field: `file`. The response reports whether a stored path
/// was produced; upload problems come back as `success: false` rather
/// than an error status.
#[utoipa::path(
    post,
    path = "/mgmt/listing/{id}/photo",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Upload outcome", body = GenericResponse),
        (status = 403, description = "Caller may not edit this listing"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<GenericResponse>> {
    let listing = editable_listing(&state, &current, id).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some((filename, bytes.to_vec()));
        }
    }

    let Some((filename, bytes)) = upload else {
        return Ok(Json(GenericResponse::failure("no file provided")));
    };

    match state
        .files
        .store_listing_photo(listing.id, &filename, &bytes)
        .await
    {
        Ok(path) => {
            state.listing_service.add_photo(listing.id, path).await?;
            Ok(Json(GenericResponse::ok()))
        }
        Err(AppError::BadRequest(msg)) => Ok(Json(GenericResponse::failure(msg))),
        Err(e) => Err(e),
    }
}

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
};
use tracing::warn;

use apotheca_core::catalog::{MEDICINE_IMAGE_FOLDER, PHARMACY_IMAGE_FOLDER};
use apotheca_types::api::UploadImageResponse;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Request body limit for the upload routes. Slightly above the image limit
/// so oversize images reach validation and get a 400.
pub const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Pulls the `image` field out of a multipart body as (data, content type).
async fn read_image(mut multipart: Multipart) -> ApiResult<(Bytes, String)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart upload: {}", e);
        ApiError::bad_request("Malformed multipart body")
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            warn!("Failed to read uploaded image: {}", e);
            ApiError::bad_request("Image could not be read (maximum size is 5MB)")
        })?;
        return Ok((data, content_type));
    }

    Err(ApiError::bad_request("No image file provided"))
}

/// POST /chat/images: multipart form with an `image` file field; returns
/// `{ imageUrl }`.
pub async fn upload_chat_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadImageResponse>)> {
    let (data, content_type) = read_image(multipart).await?;
    let image_url = state.chat.upload_image(data, &content_type).await?;
    Ok((StatusCode::CREATED, Json(UploadImageResponse { image_url })))
}

pub async fn upload_medicine_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadImageResponse>)> {
    let (data, content_type) = read_image(multipart).await?;
    let image_url = state
        .catalog
        .upload_image(MEDICINE_IMAGE_FOLDER, data, &content_type)
        .await?;
    Ok((StatusCode::CREATED, Json(UploadImageResponse { image_url })))
}

pub async fn upload_pharmacy_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadImageResponse>)> {
    let (data, content_type) = read_image(multipart).await?;
    let image_url = state
        .catalog
        .upload_image(PHARMACY_IMAGE_FOLDER, data, &content_type)
        .await?;
    Ok((StatusCode::CREATED, Json(UploadImageResponse { image_url })))
}

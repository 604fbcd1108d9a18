use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use apotheca_types::api::{
    Claims, CreateMedicineRequest, CreatePharmacyRequest, CreatePharmacyResponse,
    PharmacyWithOwner, SuccessResponse, UpdateAccountStatusRequest, UpdateMedicineRequest,
    UpdatePharmacyRequest, UpdateUserRequest,
};
use apotheca_types::models::{
    AccountProfile, AccountStatus, Availability, Medicine, Pharmacy, PharmacyStatus,
};

use crate::auth::{AppState, MIN_PASSWORD_LEN, hash_password};
use crate::error::{ApiError, ApiResult, blocking};

#[derive(Debug, Deserialize)]
pub struct StatusFilter<S> {
    pub status: Option<S>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// -- Medicine catalog --

pub async fn create_medicine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateMedicineRequest>,
) -> ApiResult<(StatusCode, Json<Medicine>)> {
    let medicine = blocking(move || state.catalog.create_medicine(&claims.sub, req)).await?;
    Ok((StatusCode::CREATED, Json(medicine)))
}

pub async fn list_medicines(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter<Availability>>,
) -> ApiResult<Json<Vec<Medicine>>> {
    Ok(Json(blocking(move || state.catalog.list_medicines(filter.status)).await?))
}

pub async fn search_medicines(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Medicine>>> {
    Ok(Json(blocking(move || state.catalog.search_medicines(&query.q)).await?))
}

pub async fn get_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Medicine>> {
    Ok(Json(blocking(move || state.catalog.get_medicine(&id)).await?))
}

pub async fn update_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMedicineRequest>,
) -> ApiResult<Json<Medicine>> {
    let st = state.clone();
    let updated = blocking(move || st.catalog.update_medicine(&id, req)).await?;
    state.catalog.discard_images(updated.stale_images).await;
    Ok(Json(updated.item))
}

pub async fn delete_medicine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let st = state.clone();
    let stale = blocking(move || st.catalog.delete_medicine(&id)).await?;
    state.catalog.discard_images(stale).await;
    Ok(Json(SuccessResponse::with_message("Medicine deleted")))
}

// -- Pharmacy directory --

pub async fn create_pharmacy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePharmacyRequest>,
) -> ApiResult<(StatusCode, Json<CreatePharmacyResponse>)> {
    if req.owner_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Owner password must be at least 6 characters"));
    }
    let password_hash = hash_password(req.owner_password.clone()).await?;

    let created =
        blocking(move || state.catalog.create_pharmacy(&claims.sub, req, password_hash)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_pharmacies(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter<PharmacyStatus>>,
) -> ApiResult<Json<Vec<Pharmacy>>> {
    Ok(Json(blocking(move || state.catalog.list_pharmacies(filter.status)).await?))
}

pub async fn search_pharmacies(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Pharmacy>>> {
    Ok(Json(blocking(move || state.catalog.search_pharmacies(&query.q)).await?))
}

pub async fn get_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PharmacyWithOwner>> {
    Ok(Json(blocking(move || state.catalog.pharmacy_with_owner(&id)).await?))
}

pub async fn update_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut req): Json<UpdatePharmacyRequest>,
) -> ApiResult<Json<PharmacyWithOwner>> {
    let owner_password_hash = match req.owner_password.take() {
        Some(password) if password.chars().count() < MIN_PASSWORD_LEN => {
            return Err(ApiError::bad_request("Owner password must be at least 6 characters"));
        }
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };

    let st = state.clone();
    let updated =
        blocking(move || st.catalog.update_pharmacy(&id, req, owner_password_hash)).await?;
    state.catalog.discard_images(updated.stale_images).await;
    Ok(Json(updated.item))
}

pub async fn delete_pharmacy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let st = state.clone();
    let stale = blocking(move || st.catalog.delete_pharmacy(&id)).await?;
    state.catalog.discard_images(stale).await;
    Ok(Json(SuccessResponse::with_message(
        "Pharmacy and owner deleted",
    )))
}

pub async fn list_owners(State(state): State<AppState>) -> ApiResult<Json<Vec<AccountProfile>>> {
    Ok(Json(blocking(move || state.catalog.list_owners()).await?))
}

pub async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AccountProfile>> {
    Ok(Json(blocking(move || state.catalog.get_owner(&id)).await?))
}

// -- Users --

pub async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter<AccountStatus>>,
) -> ApiResult<Json<Vec<AccountProfile>>> {
    Ok(Json(blocking(move || state.accounts.list_users(filter.status)).await?))
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<AccountProfile>>> {
    Ok(Json(blocking(move || state.accounts.search_users(&query.q)).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AccountProfile>> {
    Ok(Json(blocking(move || state.accounts.get_user(&id)).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<AccountProfile>> {
    Ok(Json(blocking(move || state.accounts.update_user(&id, req)).await?))
}

/// PATCH /admin/users/{id}/status: ban (`banned`) or reinstate (`active`).
pub async fn update_user_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAccountStatusRequest>,
) -> ApiResult<Json<AccountProfile>> {
    Ok(Json(
        blocking(move || state.accounts.set_user_status(&id, req.status)).await?,
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    blocking(move || state.accounts.delete_user(&id)).await?;
    Ok(Json(SuccessResponse::with_message("User deleted")))
}

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use apotheca_core::ownership::verify_ownership;
use apotheca_types::api::{
    AddPharmacyMedicineRequest, Claims, SuccessResponse, UpdatePharmacyMedicineRequest,
};
use apotheca_types::models::{
    Medicine, MedicineSubscription, PharmacyMedicine, PharmacyMedicineDetails,
};

use crate::auth::AppState;
use crate::error::{ApiResult, blocking};

/// The full catalog, for owners browsing what to stock.
pub async fn list_catalog(State(state): State<AppState>) -> ApiResult<Json<Vec<Medicine>>> {
    Ok(Json(blocking(move || state.catalog.list_medicines(None)).await?))
}

pub async fn list_medicines(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<PharmacyMedicineDetails>>> {
    let rows =
        blocking(move || state.inventory.list_for_pharmacy(&pharmacy_id, &claims.sub)).await?;
    Ok(Json(rows))
}

pub async fn list_addable(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<Medicine>>> {
    let medicines =
        blocking(move || state.inventory.list_addable(&pharmacy_id, &claims.sub)).await?;
    Ok(Json(medicines))
}

pub async fn add_medicine(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddPharmacyMedicineRequest>,
) -> ApiResult<(StatusCode, Json<PharmacyMedicine>)> {
    let row = blocking(move || {
        state
            .inventory
            .add_medicine(&pharmacy_id, &claims.sub, &req.medicine_id, req.status)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_medicine(
    State(state): State<AppState>,
    Path((pharmacy_id, row_id)): Path<(String, String)>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePharmacyMedicineRequest>,
) -> ApiResult<Json<PharmacyMedicine>> {
    let row = blocking(move || {
        state
            .inventory
            .update_status(&row_id, &pharmacy_id, &claims.sub, req.status)
    })
    .await?;
    Ok(Json(row))
}

pub async fn remove_medicine(
    State(state): State<AppState>,
    Path((pharmacy_id, row_id)): Path<(String, String)>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<SuccessResponse>> {
    blocking(move || state.inventory.remove_medicine(&row_id, &pharmacy_id, &claims.sub)).await?;
    Ok(Json(SuccessResponse::with_message("Medicine removed from pharmacy")))
}

/// Subscriptions at this pharmacy still waiting for delivery.
pub async fn list_pending_notifications(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<MedicineSubscription>>> {
    let pending = blocking(move || {
        verify_ownership(state.store.as_ref(), &pharmacy_id, &claims.sub)?;
        Ok(state.notifications.list_pending(&pharmacy_id))
    })
    .await?;
    Ok(Json(pending))
}

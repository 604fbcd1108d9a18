use serde::{Deserialize, Serialize};

use crate::models::{
    AccountProfile, AccountStatus, Availability, Location, Pharmacy, PharmacyStatus, WorkingHours,
};

// -- JWT Claims --

/// JWT claims shared by the auth handlers (issuance) and the bearer
/// middleware (validation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: crate::models::Role,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub account: AccountProfile,
}

#[derive(Debug, Serialize)]
pub struct OwnerLoginResponse {
    pub token: String,
    pub owner: AccountProfile,
    pub pharmacy: Option<Pharmacy>,
}

// -- Catalog --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateMedicineRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub front_image_url: Option<String>,
    #[serde(default)]
    pub back_image_url: Option<String>,
    #[serde(default)]
    pub status: Option<Availability>,
}

/// Absent fields are left unchanged. A replaced image URL makes the old
/// image eligible for deletion.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateMedicineRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub front_image_url: Option<String>,
    #[serde(default)]
    pub back_image_url: Option<String>,
    #[serde(default)]
    pub status: Option<Availability>,
}

// -- Directory --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreatePharmacyRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub working_hours: Vec<WorkingHours>,
    #[serde(default)]
    pub status: Option<PharmacyStatus>,
    #[serde(default)]
    pub owner_name: Option<String>,
    pub owner_email: String,
    pub owner_password: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePharmacyResponse {
    pub pharmacy: Pharmacy,
    pub owner: AccountProfile,
}

/// Partial pharmacy update. The `owner*` fields are applied to the owner
/// account; `owner_password` must arrive already validated and is hashed by
/// the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdatePharmacyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub working_hours: Option<Vec<WorkingHours>>,
    #[serde(default)]
    pub status: Option<PharmacyStatus>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub owner_password: Option<String>,
}

/// A pharmacy with its owner's profile, as shown in the admin panel.
#[derive(Debug, Serialize)]
pub struct PharmacyWithOwner {
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    pub owner: Option<AccountProfile>,
}

// -- User administration --

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAccountStatusRequest {
    pub status: AccountStatus,
}

// -- Inventory --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AddPharmacyMedicineRequest {
    pub medicine_id: String,
    #[serde(default)]
    pub status: Option<Availability>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePharmacyMedicineRequest {
    pub status: Availability,
}

// -- Chat --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub user_id: String,
    pub pharmacy_owner_id: String,
    pub pharmacy_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub success: bool,
    pub marked_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true, message: None }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

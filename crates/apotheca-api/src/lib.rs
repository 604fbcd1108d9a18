pub mod admin;
pub mod auth;
pub mod chat;
pub mod error;
pub mod files;
pub mod inventory;
pub mod middleware;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
};

use crate::auth::AppState;
use crate::middleware::{admin_only, chat_participants_only, owner_only, require_auth};

/// Every API route. Layers such as CORS and tracing are left to the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/admin/register", post(auth::register_admin))
        .route("/auth/admin/login", post(auth::login_admin))
        .route("/auth/users/register", post(auth::register_user))
        .route("/auth/users/login", post(auth::login_user))
        .route("/auth/owners/login", post(auth::login_owner));

    let admin_routes = Router::new()
        .route(
            "/admin/medicines",
            post(admin::create_medicine).get(admin::list_medicines),
        )
        .route("/admin/medicines/search", get(admin::search_medicines))
        .route(
            "/admin/medicines/images",
            post(files::upload_medicine_image).layer(DefaultBodyLimit::max(files::UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/admin/medicines/{id}",
            get(admin::get_medicine)
                .patch(admin::update_medicine)
                .delete(admin::delete_medicine),
        )
        .route(
            "/admin/pharmacies",
            post(admin::create_pharmacy).get(admin::list_pharmacies),
        )
        .route("/admin/pharmacies/search", get(admin::search_pharmacies))
        .route(
            "/admin/pharmacies/upload-image",
            post(files::upload_pharmacy_image).layer(DefaultBodyLimit::max(files::UPLOAD_BODY_LIMIT)),
        )
        .route("/admin/pharmacies/owners/all", get(admin::list_owners))
        .route("/admin/pharmacies/owners/{id}", get(admin::get_owner))
        .route(
            "/admin/pharmacies/{id}",
            get(admin::get_pharmacy)
                .patch(admin::update_pharmacy)
                .delete(admin::delete_pharmacy),
        )
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/search", get(admin::search_users))
        .route(
            "/admin/users/{id}",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/admin/users/{id}/status", patch(admin::update_user_status))
        .layer(from_fn(admin_only));

    let owner_routes = Router::new()
        .route("/owner/medicines", get(inventory::list_catalog))
        .route(
            "/owner/pharmacies/{pharmacy_id}/medicines",
            get(inventory::list_medicines).post(inventory::add_medicine),
        )
        .route(
            "/owner/pharmacies/{pharmacy_id}/medicines/addable",
            get(inventory::list_addable),
        )
        .route(
            "/owner/pharmacies/{pharmacy_id}/medicines/{row_id}",
            patch(inventory::update_medicine).delete(inventory::remove_medicine),
        )
        .route(
            "/notifications/pharmacies/{pharmacy_id}",
            get(inventory::list_pending_notifications),
        )
        .layer(from_fn(owner_only));

    let chat_routes = Router::new()
        .route(
            "/chat/conversations",
            post(chat::get_or_create_conversation).get(chat::list_conversations),
        )
        .route("/chat/conversations/{id}", get(chat::get_conversation))
        .route(
            "/chat/conversations/{id}/archive",
            patch(chat::archive_conversation),
        )
        .route(
            "/chat/conversations/{id}/messages",
            get(chat::get_messages).post(chat::send_message),
        )
        .route("/chat/conversations/{id}/read", post(chat::mark_read))
        .route(
            "/chat/images",
            post(files::upload_chat_image).layer(DefaultBodyLimit::max(files::UPLOAD_BODY_LIMIT)),
        )
        .layer(from_fn(chat_participants_only));

    let protected_routes = Router::new()
        .merge(admin_routes)
        .merge(owner_routes)
        .merge(chat_routes)
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use apotheca_core::accounts::AccountAdmin;
use apotheca_core::catalog::{CatalogService, normalize_email};
use apotheca_core::chat::ChatService;
use apotheca_core::inventory::InventoryManager;
use apotheca_core::notifications::{NotificationEngine, NotificationQueue};
use apotheca_core::object_store::ObjectStore;
use apotheca_core::{ServiceError, ServiceResult};
use apotheca_db::{AccountRow, Store};
use apotheca_types::api::{
    AuthResponse, Claims, LoginRequest, OwnerLoginResponse, RegisterAdminRequest,
    RegisterUserRequest,
};
use apotheca_types::models::{AccountStatus, Role};

use crate::error::{ApiError, ApiResult, blocking};

pub const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_TTL_DAYS: i64 = 30;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn Store>,
    pub catalog: CatalogService,
    pub accounts: AccountAdmin,
    pub inventory: InventoryManager,
    pub notifications: Arc<NotificationEngine>,
    pub chat: ChatService,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(
        store: Arc<dyn Store>,
        objects: Arc<dyn ObjectStore>,
        queue: NotificationQueue,
        notify_concurrency: usize,
        jwt_secret: String,
    ) -> Self {
        Self {
            catalog: CatalogService::new(store.clone(), objects.clone()),
            accounts: AccountAdmin::new(store.clone()),
            inventory: InventoryManager::new(store.clone(), queue),
            notifications: Arc::new(NotificationEngine::new(store.clone(), notify_concurrency)),
            chat: ChatService::new(store.clone(), objects),
            store,
            jwt_secret,
        }
    }
}

pub async fn register_admin(
    State(state): State<AppState>,
    Json(req): Json<RegisterAdminRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    let account = register(state.clone(), Role::Admin, name, &req.email, &req.password).await?;

    let token = create_token(&state.jwt_secret, &account)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            account: account.profile(),
        }),
    ))
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let name = req.full_name.trim().to_string();
    if name.chars().count() < 2 {
        return Err(ApiError::bad_request("Full name must be at least 2 characters"));
    }
    if req.password != req.confirm_password {
        return Err(ApiError::bad_request("Passwords do not match"));
    }
    let account = register(state.clone(), Role::User, name, &req.email, &req.password).await?;

    let token = create_token(&state.jwt_secret, &account)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            account: account.profile(),
        }),
    ))
}

pub async fn login_admin(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let account = login(state.clone(), Role::Admin, req).await?;
    let token = create_token(&state.jwt_secret, &account)?;
    Ok(Json(AuthResponse {
        token,
        account: account.profile(),
    }))
}

pub async fn login_user(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let account = login(state.clone(), Role::User, req).await?;
    let token = create_token(&state.jwt_secret, &account)?;
    Ok(Json(AuthResponse {
        token,
        account: account.profile(),
    }))
}

/// Owner login also returns the owner's pharmacy.
pub async fn login_owner(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<OwnerLoginResponse>> {
    let account = login(state.clone(), Role::PharmacyOwner, req).await?;
    let token = create_token(&state.jwt_secret, &account)?;

    let st = state.clone();
    let owner_id = account.id.clone();
    let pharmacy = blocking(move || Ok(st.store.get_pharmacy_by_owner(&owner_id)?)).await?;

    Ok(Json(OwnerLoginResponse {
        token,
        owner: account.profile(),
        pharmacy,
    }))
}

async fn register(
    state: AppState,
    role: Role,
    name: String,
    email: &str,
    password: &str,
) -> ApiResult<AccountRow> {
    let email = normalize_email(email);
    if !email.contains('@') {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request("Password must be at least 6 characters"));
    }
    let password_hash = hash_password(password.to_string()).await?;

    blocking(move || {
        if state.store.get_account_by_email(role, &email)?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".into()));
        }

        let now = Utc::now();
        let account = AccountRow {
            id: Uuid::new_v4().to_string(),
            role,
            name,
            email,
            password: password_hash,
            status: AccountStatus::Active,
            pharmacy_id: None,
            notifications_enabled: None,
            created_at: now,
            updated_at: now,
            created_by: None,
        };
        state.store.insert_account(&account)?;
        info!("Registered {} account {}", role, account.id);
        Ok(account)
    })
    .await
}

async fn login(state: AppState, role: Role, req: LoginRequest) -> ApiResult<AccountRow> {
    let email = normalize_email(&req.email);
    let account = blocking(move || Ok(state.store.get_account_by_email(role, &email)?))
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let hash = account.password.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&req.password, &hash))
        .await
        .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))??;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    match account.status {
        AccountStatus::Active => Ok(account),
        AccountStatus::Banned => Err(ApiError::unauthorized("Your account has been banned")),
        AccountStatus::Inactive => Err(ApiError::unauthorized("Your account is inactive")),
    }
}

/// Argon2id with a random salt, off the async runtime.
pub async fn hash_password(password: String) -> ApiResult<String> {
    let hash = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
            .to_string();
        Ok(hash)
    })
    .await
    .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))??;
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("stored hash is invalid: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn create_token(secret: &str, account: &AccountRow) -> ServiceResult<String> {
    let claims = Claims {
        sub: account.id.clone(),
        role: account.role,
        email: account.email.clone(),
        exp: (Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(anyhow::Error::from)?;

    Ok(token)
}

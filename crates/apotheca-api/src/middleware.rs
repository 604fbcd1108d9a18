use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use apotheca_types::api::Claims;
use apotheca_types::models::Role;

use crate::auth::AppState;
use crate::error::ApiError;

/// Extract and validate the bearer JWT; the claims are stored as a request
/// extension for the handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_claims(&req, &state.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn bearer_claims(req: &Request, secret: &str) -> Result<Claims, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    Ok(token_data.claims)
}

fn require_role(req: &Request, allowed: &[Role]) -> Result<(), ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Insufficient role for this resource"))
    }
}

pub async fn admin_only(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&req, &[Role::Admin])?;
    Ok(next.run(req).await)
}

pub async fn owner_only(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&req, &[Role::PharmacyOwner])?;
    Ok(next.run(req).await)
}

pub async fn chat_participants_only(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&req, &[Role::User, Role::PharmacyOwner])?;
    Ok(next.run(req).await)
}

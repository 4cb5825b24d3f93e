use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, ProfileResponse, RegisterRequest, TokenResponse},
        extractors::{AuthUser, JsonBody},
        services::AuthService,
        validation::Validate,
    },
    error::AuthResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
}

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<TokenResponse>)> {
    payload.validate()?;
    let res = auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AuthResult<Json<TokenResponse>> {
    payload.validate()?;
    Ok(Json(auth.login(payload).await?))
}

#[instrument(skip(auth))]
pub async fn profile(
    State(auth): State<AuthService>,
    AuthUser(user_id): AuthUser,
) -> AuthResult<Json<ProfileResponse>> {
    Ok(Json(auth.profile(user_id).await?))
}

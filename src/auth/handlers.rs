use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        jwt::JwtKeys,
        repo_types::User,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(payload) = payload?;
    let user = services::register(state.users.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    let keys = JwtKeys::from_ref(&state);
    let token = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(LoginResponse { token }))
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateTodoRequest, TodoPatch},
    repo_types::Todo,
    services,
};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", patch(update_todo).delete(delete_todo))
}

/// An unparsable id can't name any row, so it reads as not found.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Todo"))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = services::list_todos(state.todos.as_ref(), user.id).await?;
    Ok(Json(todos))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let Json(input) = payload?;
    let todo = services::create_todo(state.todos.as_ref(), user.id, input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let Json(patch) = payload?;
    let id = parse_id(&id)?;
    let todo = services::update_todo(state.todos.as_ref(), id, user.id, patch).await?;
    Ok(Json(todo))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    services::delete_todo(state.todos.as_ref(), id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Passthrough to the upstream bin store, so browsers and other instances
//! can reach it from this origin.

use crate::errors::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::Value;
use tracing::warn;

pub async fn create_bin(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let created = state.upstream.create_raw(&body).await.map_err(|err| {
        warn!("bin create failed: {err}");
        AppError::internal(err)
    })?;
    Ok(Json(created))
}

pub async fn read_bin(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, AppError> {
    let body = state.upstream.read(&id).await.map_err(|err| {
        warn!(bin = %id, "bin read failed: {err}");
        AppError::internal(err)
    })?;
    Ok(Json(body))
}

pub async fn replace_bin(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let replaced = state.upstream.replace(&id, &body).await.map_err(|err| {
        warn!(bin = %id, "bin replace failed: {err}");
        AppError::internal(err)
    })?;
    Ok(Json(replaced))
}

pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}

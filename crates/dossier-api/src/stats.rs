//! `GET /stats`

use std::sync::Arc;

use axum::{Json, extract::State};
use dossier_core::store::{CaseStore, Stats};

use crate::error::ApiError;

pub async fn handler<S: CaseStore>(State(store): State<Arc<S>>) -> Result<Json<Stats>, ApiError> {
  Ok(Json(store.stats().await.map_err(ApiError::store)?))
}

//! `POST /passwords/export`: a wordlist or full CSV download of the
//! credentials matching the request body.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::header,
  response::IntoResponse,
};
use chrono::Utc;
use dossier_core::{
  export::{ExportRequest, render_export},
  store::CaseStore,
};

use crate::error::ApiError;

pub async fn handler<S: CaseStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(request) = body?;

  let passwords = store.list_passwords().await.map_err(ApiError::store)?;
  let accounts = store.list_user_accounts().await.map_err(ApiError::store)?;
  let file = render_export(&request, &passwords, &accounts, Utc::now().date_naive())
    .map_err(ApiError::Export)?;

  tracing::info!(
    export_type = %request.export_type,
    filename = %file.filename,
    bytes = file.body.len(),
    "rendered credential export"
  );

  let headers = [
    (header::CONTENT_TYPE, file.media_type.to_owned()),
    (header::CONTENT_DISPOSITION, format!("attachment; filename={}", file.filename)),
  ];
  Ok((headers, file.body))
}

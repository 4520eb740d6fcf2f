//! Case administration: listing upload sessions and deleting data.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/cases` | Cases with their sessions and totals |
//! | `DELETE` | `/admin/cases/{case_number}` | Every record of the case |
//! | `DELETE` | `/admin/sessions/by-profile/{profile_id}` | 404 if the profile is unknown |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use dossier_core::{
  cases::{CaseSummary, case_summaries},
  store::{CaseStore, DeleteStats},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `GET /admin/cases`
pub async fn cases<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<CaseSummary>>, ApiError> {
  let profiles = store.list_suspect_profiles(None).await.map_err(ApiError::store)?;
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  let passwords = store.list_passwords().await.map_err(ApiError::store)?;
  let accounts = store.list_user_accounts().await.map_err(ApiError::store)?;
  Ok(Json(case_summaries(&profiles, &contacts, &passwords, &accounts)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDeleted {
  pub case_number: String,
  #[serde(flatten)]
  pub deleted:     DeleteStats,
}

/// `DELETE /admin/cases/{case_number}`. Deleting an unknown case removes
/// nothing and still succeeds.
pub async fn delete_case<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(case_number): Path<String>,
) -> Result<Json<CaseDeleted>, ApiError> {
  let deleted = store.delete_case(&case_number).await.map_err(ApiError::store)?;
  Ok(Json(CaseDeleted { case_number, deleted }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDeleted {
  pub profile_id: String,
  #[serde(flatten)]
  pub deleted:    DeleteStats,
}

/// `DELETE /admin/sessions/by-profile/{profile_id}`
pub async fn delete_session<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(profile_id): Path<String>,
) -> Result<Json<SessionDeleted>, ApiError> {
  let deleted = store
    .delete_session(&profile_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("suspect profile {profile_id} not found")))?;
  Ok(Json(SessionDeleted { profile_id, deleted }))
}

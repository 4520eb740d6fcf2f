//! Handlers for the device owners of each case.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/suspect-profile[?case_number=]` | One profile for a case, else all |
//! | `GET`  | `/suspect-info` | Owner phone and photo per case, from contacts |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use dossier_core::{
  cases::{SuspectInfo, suspect_info},
  store::CaseStore,
  suspect::SuspectProfile,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SuspectParams {
  pub case_number: Option<String>,
}

/// One profile when a case is given, every profile otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuspectReply {
  One(SuspectProfile),
  All(Vec<SuspectProfile>),
}

/// `GET /suspect-profile`
pub async fn profile<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SuspectParams>,
) -> Result<Json<SuspectReply>, ApiError> {
  let case = params.case_number.as_deref().map(str::trim).filter(|c| !c.is_empty());

  let mut profiles = store.list_suspect_profiles(case).await.map_err(ApiError::store)?;
  let Some(case) = case else {
    return Ok(Json(SuspectReply::All(profiles)));
  };
  if profiles.is_empty() {
    return Err(ApiError::NotFound(format!("no suspect profile found for case {case}")));
  }
  Ok(Json(SuspectReply::One(profiles.swap_remove(0))))
}

/// `GET /suspect-info`
pub async fn info<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<SuspectInfo>>, ApiError> {
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(suspect_info(&contacts)))
}

//! Handlers for `/whatsapp-groups` endpoints.
//!
//! Groups are not stored; they are rebuilt from the contacts' membership
//! entries on every request.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use dossier_core::{
  contact::Contact,
  store::CaseStore,
  whatsapp::{WhatsAppGroup, build_groups, group_members},
};

use crate::error::ApiError;

/// `GET /whatsapp-groups`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<WhatsAppGroup>>, ApiError> {
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(build_groups(&contacts)))
}

/// `GET /whatsapp-groups/{group_id}/members`: the raw contact records of
/// one group. Unknown groups yield an empty list.
pub async fn members<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(group_id): Path<String>,
) -> Result<Json<Vec<Contact>>, ApiError> {
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  let members = group_members(&group_id, &contacts).into_iter().cloned().collect();
  Ok(Json(members))
}

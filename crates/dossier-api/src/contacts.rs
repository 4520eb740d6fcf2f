//! Handlers for `/contacts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contacts` | Raw records in insertion order |
//! | `GET`  | `/contacts/deduplicated` | Merged by normalized phone |
//! | `GET`  | `/contacts/{id}/details` | 404 if not found |
//! | `GET`  | `/contacts-by-photo?case_number=` | Shared photos, largest group first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::QueryRejection},
};
use dossier_core::{
  cases::{PhotoGroup, contacts_by_photo},
  contact::{Contact, ContactDetails},
  dedup::{contact_details, dedup_contacts},
  store::CaseStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /contacts`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Contact>>, ApiError> {
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(contacts))
}

/// `GET /contacts/deduplicated`
pub async fn deduplicated<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Contact>>, ApiError> {
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  let merged = dedup_contacts(&contacts);
  tracing::debug!(raw = contacts.len(), merged = merged.len(), "deduplicated contacts");
  Ok(Json(merged))
}

/// `GET /contacts/{id}/details`
pub async fn details<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<ContactDetails>, ApiError> {
  let main = store
    .get_contact(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("contact {id} not found")))?;
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(contact_details(main, &contacts)))
}

#[derive(Debug, Deserialize)]
pub struct PhotoParams {
  pub case_number: String,
}

/// `GET /contacts-by-photo?case_number=<case>`
pub async fn by_photo<S: CaseStore>(
  State(store): State<Arc<S>>,
  params: Result<Query<PhotoParams>, QueryRejection>,
) -> Result<Json<Vec<PhotoGroup>>, ApiError> {
  let Query(PhotoParams { case_number }) = params?;
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  Ok(Json(contacts_by_photo(&case_number, &contacts)))
}

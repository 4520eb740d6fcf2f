//! `POST /search`: free-text search over the stored collections.
//!
//! Body: `{"query": "ion", "data_type": "contacts"}`; `data_type` is optional
//! and one of `contacts`, `passwords` or `user_accounts`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use dossier_core::{
  search::{SearchRequest, SearchResults, search_collections},
  store::CaseStore,
};

use crate::error::ApiError;

pub async fn handler<S: CaseStore>(
  State(store): State<Arc<S>>,
  body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResults>, ApiError> {
  let Json(request) = body?;
  let contacts = store.list_contacts().await.map_err(ApiError::store)?;
  let passwords = store.list_passwords().await.map_err(ApiError::store)?;
  let accounts = store.list_user_accounts().await.map_err(ApiError::store)?;

  let results = search_collections(&request, &contacts, &passwords, &accounts);
  tracing::debug!(
    query = %request.query,
    contacts = results.contacts.len(),
    passwords = results.passwords.len(),
    user_accounts = results.user_accounts.len(),
    "search"
  );
  Ok(Json(results))
}

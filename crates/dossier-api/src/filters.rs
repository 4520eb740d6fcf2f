//! `GET /filters/{data_type}`: distinct stored values that seed the filter
//! dropdowns of one collection.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use dossier_core::{
  available::{AvailableFilters, DataType, contact_filters, password_filters, user_account_filters},
  store::CaseStore,
};

use crate::error::ApiError;

pub async fn available<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(data_type): Path<String>,
) -> Result<Json<AvailableFilters>, ApiError> {
  let data_type: DataType = data_type
    .parse()
    .map_err(|e: dossier_core::Error| ApiError::BadRequest(e.to_string()))?;

  let filters = match data_type {
    DataType::Contacts => {
      let contacts = store.list_contacts().await.map_err(ApiError::store)?;
      contact_filters(&contacts)
    }
    DataType::Passwords => {
      let passwords = store.list_passwords().await.map_err(ApiError::store)?;
      password_filters(&passwords)
    }
    DataType::UserAccounts => {
      let accounts = store.list_user_accounts().await.map_err(ApiError::store)?;
      user_account_filters(&accounts)
    }
  };
  Ok(Json(filters))
}

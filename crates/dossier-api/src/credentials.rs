//! Handlers for password, user-account and merged credential endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/passwords` | Raw password records |
//! | `GET`  | `/passwords/deduplicated` | Newest per username and application |
//! | `GET`  | `/user-accounts` | Raw account records |
//! | `GET`  | `/user-accounts/deduplicated` | Newest per username and source |
//! | `GET`  | `/discord-accounts` | Accounts whose source is Discord |
//! | `GET`  | `/credentials/deduplicated` | Passwords then accounts |
//! | `GET`  | `/credentials/{id}/details` | 404 if not found |
//! | `GET`  | `/credentials/password-analysis` | Reuse groups, most used first |
//! | `PUT`  | `/credentials/{id}/category` | Body: `{"category":"Email"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use dossier_core::{
  credential::{Credential, CredentialDetails, UserAccount, discord_accounts},
  dedup::{
    account_details, dedup_credentials, dedup_passwords, dedup_user_accounts, password_details,
  },
  reuse::{PasswordGroup, group_passwords},
  store::CaseStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `GET /passwords`
pub async fn passwords<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Credential>>, ApiError> {
  Ok(Json(store.list_passwords().await.map_err(ApiError::store)?))
}

/// `GET /user-accounts`
pub async fn user_accounts<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<UserAccount>>, ApiError> {
  Ok(Json(store.list_user_accounts().await.map_err(ApiError::store)?))
}

/// `GET /passwords/deduplicated`
pub async fn passwords_deduplicated<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Credential>>, ApiError> {
  let passwords = store.list_passwords().await.map_err(ApiError::store)?;
  Ok(Json(dedup_passwords(&passwords)))
}

/// `GET /user-accounts/deduplicated`
pub async fn user_accounts_deduplicated<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<UserAccount>>, ApiError> {
  let accounts = store.list_user_accounts().await.map_err(ApiError::store)?;
  Ok(Json(dedup_user_accounts(&accounts)))
}

/// `GET /discord-accounts`
pub async fn discord<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<UserAccount>>, ApiError> {
  let accounts = store.list_user_accounts().await.map_err(ApiError::store)?;
  Ok(Json(discord_accounts(&accounts).into_iter().cloned().collect()))
}

async fn load_all<S: CaseStore>(
  store: &S,
) -> Result<(Vec<Credential>, Vec<UserAccount>), ApiError> {
  let passwords = store.list_passwords().await.map_err(ApiError::store)?;
  let accounts = store.list_user_accounts().await.map_err(ApiError::store)?;
  Ok((passwords, accounts))
}

/// `GET /credentials/deduplicated`
pub async fn deduplicated<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Credential>>, ApiError> {
  let (passwords, accounts) = load_all(&*store).await?;
  Ok(Json(dedup_credentials(&passwords, &accounts)))
}

/// `GET /credentials/{id}/details`: the id is looked up among passwords
/// first, then among user accounts.
pub async fn details<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<CredentialDetails>, ApiError> {
  if let Some(main) = store.get_password(&id).await.map_err(ApiError::store)? {
    let passwords = store.list_passwords().await.map_err(ApiError::store)?;
    return Ok(Json(password_details(main, &passwords)));
  }
  if let Some(main) = store.get_user_account(&id).await.map_err(ApiError::store)? {
    let accounts = store.list_user_accounts().await.map_err(ApiError::store)?;
    return Ok(Json(account_details(main, &accounts)));
  }
  Err(ApiError::NotFound(format!("credential {id} not found")))
}

/// `GET /credentials/password-analysis`
pub async fn password_analysis<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<PasswordGroup>>, ApiError> {
  let (passwords, accounts) = load_all(&*store).await?;
  Ok(Json(group_passwords(&passwords, &accounts)))
}

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBody {
  pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdated {
  pub id:       String,
  pub category: String,
}

/// `PUT /credentials/{id}/category`
pub async fn update_category<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  body: Result<Json<CategoryBody>, JsonRejection>,
) -> Result<Json<CategoryUpdated>, ApiError> {
  let Json(CategoryBody { category }) = body?;
  let category = category.trim().to_owned();
  if category.is_empty() {
    return Err(ApiError::BadRequest("category is required".into()));
  }

  let found = store
    .update_credential_category(&id, &category)
    .await
    .map_err(ApiError::store)?;
  if !found {
    return Err(ApiError::NotFound(format!("credential {id} not found")));
  }

  tracing::info!(%id, %category, "credential category updated");
  Ok(Json(CategoryUpdated { id, category }))
}

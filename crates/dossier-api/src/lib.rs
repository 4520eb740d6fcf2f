//! JSON REST API for Dossier.
//!
//! Exposes an axum [`Router`] backed by any [`dossier_core::store::CaseStore`].
//! Every view is computed per request from the full stored collections.
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dossier_api::api_router(store.clone()))
//! ```

pub mod admin;
pub mod contacts;
pub mod credentials;
pub mod error;
pub mod export;
pub mod filters;
pub mod groups;
pub mod search;
pub mod stats;
pub mod suspects;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use dossier_core::store::CaseStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CaseStore + 'static,
{
  Router::new()
    // Contacts
    .route("/contacts", get(contacts::list::<S>))
    .route("/contacts/deduplicated", get(contacts::deduplicated::<S>))
    .route("/contacts/{id}/details", get(contacts::details::<S>))
    .route("/contacts-by-photo", get(contacts::by_photo::<S>))
    // Credentials
    .route("/passwords", get(credentials::passwords::<S>))
    .route("/passwords/deduplicated", get(credentials::passwords_deduplicated::<S>))
    .route("/passwords/export", post(export::handler::<S>))
    .route("/user-accounts", get(credentials::user_accounts::<S>))
    .route("/user-accounts/deduplicated", get(credentials::user_accounts_deduplicated::<S>))
    .route("/discord-accounts", get(credentials::discord::<S>))
    .route("/credentials/deduplicated", get(credentials::deduplicated::<S>))
    .route("/credentials/password-analysis", get(credentials::password_analysis::<S>))
    .route("/credentials/{id}/details", get(credentials::details::<S>))
    .route("/credentials/{id}/category", put(credentials::update_category::<S>))
    // Search, filters, groups, suspects
    .route("/search", post(search::handler::<S>))
    .route("/filters/{data_type}", get(filters::available::<S>))
    .route("/whatsapp-groups", get(groups::list::<S>))
    .route("/whatsapp-groups/{group_id}/members", get(groups::members::<S>))
    .route("/suspect-profile", get(suspects::profile::<S>))
    .route("/suspect-info", get(suspects::info::<S>))
    .route("/stats", get(stats::handler::<S>))
    // Administration
    .route("/admin/cases", get(admin::cases::<S>))
    .route("/admin/cases/{case_number}", delete(admin::delete_case::<S>))
    .route("/admin/sessions/by-profile/{profile_id}", delete(admin::delete_session::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

//! The `CaseStore` trait and the bundle format it ingests.
//!
//! The trait is implemented by storage backends (e.g. `dossier-store-sqlite`).
//! Higher layers (`dossier-api`, `dossier-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  contact::Contact,
  credential::{Credential, UserAccount},
  suspect::SuspectProfile,
};

// ─── Bundle ──────────────────────────────────────────────────────────────────

/// Everything the extraction parser produced for one or more uploads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordBundle {
  pub contacts:         Vec<Contact>,
  pub passwords:        Vec<Credential>,
  pub user_accounts:    Vec<UserAccount>,
  pub suspect_profiles: Vec<SuspectProfile>,
}

/// Rows written by one [`CaseStore::ingest`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
  pub contacts:         usize,
  pub passwords:        usize,
  pub user_accounts:    usize,
  pub suspect_profiles: usize,
}

/// Rows removed by a case or session deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStats {
  pub contacts:         usize,
  pub passwords:        usize,
  pub user_accounts:    usize,
  pub suspect_profiles: usize,
}

/// Collection sizes, as reported by `/api/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
  pub contacts:      usize,
  pub passwords:     usize,
  pub user_accounts: usize,
  pub total:         usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a case record store backend.
///
/// Records are written once by [`ingest`](CaseStore::ingest) and read back in
/// insertion order. The only in-place mutation is a credential's category;
/// whole cases and upload sessions can be deleted.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist every record of `bundle` in one transaction. Records with an
  /// empty id are assigned a fresh one; existing ids are replaced.
  fn ingest(
    &self,
    bundle: RecordBundle,
  ) -> impl Future<Output = Result<IngestStats, Self::Error>> + Send + '_;

  // ── Contacts ──────────────────────────────────────────────────────────

  fn list_contacts(&self) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  fn get_contact<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  // ── Credentials ───────────────────────────────────────────────────────

  fn list_passwords(
    &self,
  ) -> impl Future<Output = Result<Vec<Credential>, Self::Error>> + Send + '_;

  fn get_password<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Credential>, Self::Error>> + Send + 'a;

  fn list_user_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<UserAccount>, Self::Error>> + Send + '_;

  fn get_user_account<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<UserAccount>, Self::Error>> + Send + 'a;

  /// Set the category of the password or user account `id`. Returns `false`
  /// when neither collection holds the id. Setting the same category twice
  /// is a no-op that still returns `true`.
  fn update_credential_category<'a>(
    &'a self,
    id: &'a str,
    category: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Suspects ──────────────────────────────────────────────────────────

  /// Suspect profiles, optionally restricted to one case.
  fn list_suspect_profiles<'a>(
    &'a self,
    case_number: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<SuspectProfile>, Self::Error>> + Send + 'a;

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;

  // ── Deletion ──────────────────────────────────────────────────────────

  /// Remove every record and suspect profile of `case_number`.
  fn delete_case<'a>(
    &'a self,
    case_number: &'a str,
  ) -> impl Future<Output = Result<DeleteStats, Self::Error>> + Send + 'a;

  /// Remove the suspect profile `profile_id` and every record sharing its
  /// case, person and device (empty and absent values compare equal).
  /// `None` when no such profile exists.
  fn delete_session<'a>(
    &'a self,
    profile_id: &'a str,
  ) -> impl Future<Output = Result<Option<DeleteStats>, Self::Error>> + Send + 'a;
}

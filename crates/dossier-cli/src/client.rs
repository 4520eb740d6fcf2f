//! Async HTTP client wrapping the Dossier JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dossier_core::{
  cases::{CaseSummary, PhotoGroup, SuspectInfo},
  contact::{Contact, ContactDetails},
  credential::{Credential, CredentialDetails, UserAccount},
  export::ExportRequest,
  reuse::PasswordGroup,
  store::{DeleteStats, Stats},
  suspect::SuspectProfile,
  whatsapp::WhatsAppGroup,
};
use reqwest::{Client, Response, header};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Connection settings for the Dossier API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the Dossier JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// A downloaded export.
#[derive(Debug)]
pub struct Download {
  pub filename: String,
  pub body:     Vec<u8>,
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_default();
  Err(anyhow!("{what} → {status} {message}"))
}

/// `attachment; filename=<name>` → `<name>`
fn attachment_name(resp: &Response) -> Option<String> {
  let value = resp.headers().get(header::CONTENT_DISPOSITION)?.to_str().ok()?;
  let name = value.split_once("filename=")?.1.trim_matches('"');
  Some(name.to_owned()).filter(|n| !n.is_empty())
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let what = format!("GET {path}");
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let what = format!("DELETE {path}");
    let resp = self
      .client
      .delete(self.url(path))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, &what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  // ── Collections ───────────────────────────────────────────────────────────

  /// `GET /api/contacts`
  pub async fn contacts(&self) -> Result<Vec<Contact>> { self.get_json("/contacts").await }

  /// `GET /api/contacts/deduplicated`
  pub async fn deduplicated_contacts(&self) -> Result<Vec<Contact>> {
    self.get_json("/contacts/deduplicated").await
  }

  /// `GET /api/contacts/{id}/details`
  pub async fn contact_details(&self, id: &str) -> Result<ContactDetails> {
    self.get_json(&format!("/contacts/{id}/details")).await
  }

  /// `GET /api/passwords`
  pub async fn passwords(&self) -> Result<Vec<Credential>> { self.get_json("/passwords").await }

  /// `GET /api/user-accounts`
  pub async fn user_accounts(&self) -> Result<Vec<UserAccount>> {
    self.get_json("/user-accounts").await
  }

  /// `GET /api/credentials/deduplicated`
  pub async fn deduplicated_credentials(&self) -> Result<Vec<Credential>> {
    self.get_json("/credentials/deduplicated").await
  }

  /// `GET /api/credentials/{id}/details`
  pub async fn credential_details(&self, id: &str) -> Result<CredentialDetails> {
    self.get_json(&format!("/credentials/{id}/details")).await
  }

  /// `GET /api/credentials/password-analysis`
  pub async fn password_analysis(&self) -> Result<Vec<PasswordGroup>> {
    self.get_json("/credentials/password-analysis").await
  }

  /// `GET /api/whatsapp-groups`
  pub async fn whatsapp_groups(&self) -> Result<Vec<WhatsAppGroup>> {
    self.get_json("/whatsapp-groups").await
  }

  /// `GET /api/suspect-profile`
  pub async fn suspect_profiles(&self) -> Result<Vec<SuspectProfile>> {
    self.get_json("/suspect-profile").await
  }

  /// `GET /api/suspect-info`
  pub async fn suspect_info(&self) -> Result<Vec<SuspectInfo>> {
    self.get_json("/suspect-info").await
  }

  /// `GET /api/contacts-by-photo?case_number=<case>`
  pub async fn contacts_by_photo(&self, case_number: &str) -> Result<Vec<PhotoGroup>> {
    let what = "GET /contacts-by-photo";
    let resp = self
      .client
      .get(self.url("/contacts-by-photo"))
      .query(&[("case_number", case_number)])
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, what).await?.json().await.context("deserialising /contacts-by-photo")
  }

  /// `GET /api/stats`
  pub async fn stats(&self) -> Result<Stats> { self.get_json("/stats").await }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// `PUT /api/credentials/{id}/category`
  pub async fn set_category(&self, id: &str, category: &str) -> Result<()> {
    let what = format!("PUT /credentials/{id}/category");
    let resp = self
      .client
      .put(self.url(&format!("/credentials/{id}/category")))
      .json(&json!({ "category": category }))
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    check(resp, &what).await?;
    Ok(())
  }

  /// `GET /api/admin/cases`
  pub async fn cases(&self) -> Result<Vec<CaseSummary>> { self.get_json("/admin/cases").await }

  /// `DELETE /api/admin/cases/{case_number}`
  pub async fn delete_case(&self, case_number: &str) -> Result<DeleteStats> {
    self.delete_json(&format!("/admin/cases/{case_number}")).await
  }

  /// `DELETE /api/admin/sessions/by-profile/{profile_id}`
  pub async fn delete_session(&self, profile_id: &str) -> Result<DeleteStats> {
    self.delete_json(&format!("/admin/sessions/by-profile/{profile_id}")).await
  }

  /// `POST /api/passwords/export`
  pub async fn export(&self, request: &ExportRequest) -> Result<Download> {
    let what = "POST /passwords/export";
    let resp = self
      .client
      .post(self.url("/passwords/export"))
      .json(request)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;
    let resp = check(resp, what).await?;

    let filename = attachment_name(&resp).unwrap_or_else(|| "export".to_owned());
    let body = resp.bytes().await.context("reading export body")?.to_vec();
    Ok(Download { filename, body })
  }
}

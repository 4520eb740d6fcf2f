//! Locally cached collections and the mutations applied to them.
//!
//! A [`Session`] holds the last successfully fetched copy of every
//! collection. Views are computed from these copies by `dossier-core`; the
//! only write is a credential's category, applied locally first and rolled
//! back when the server rejects it.

#![allow(async_fn_in_trait)]

use anyhow::{Result, bail};
use dossier_core::{
  contact::Contact,
  credential::{Credential, UserAccount},
  reuse::PasswordGroup,
  suspect::SuspectProfile,
  whatsapp::WhatsAppGroup,
};

use crate::client::ApiClient;

// ─── Backend ──────────────────────────────────────────────────────────────────

/// The remote operations a session needs.
pub trait Backend {
  async fn contacts(&self) -> Result<Vec<Contact>>;
  async fn passwords(&self) -> Result<Vec<Credential>>;
  async fn user_accounts(&self) -> Result<Vec<UserAccount>>;
  async fn password_analysis(&self) -> Result<Vec<PasswordGroup>>;
  async fn whatsapp_groups(&self) -> Result<Vec<WhatsAppGroup>>;
  async fn suspect_profiles(&self) -> Result<Vec<SuspectProfile>>;
  async fn set_category(&self, id: &str, category: &str) -> Result<()>;
}

impl Backend for ApiClient {
  async fn contacts(&self) -> Result<Vec<Contact>> { ApiClient::contacts(self).await }

  async fn passwords(&self) -> Result<Vec<Credential>> { ApiClient::passwords(self).await }

  async fn user_accounts(&self) -> Result<Vec<UserAccount>> {
    ApiClient::user_accounts(self).await
  }

  async fn password_analysis(&self) -> Result<Vec<PasswordGroup>> {
    ApiClient::password_analysis(self).await
  }

  async fn whatsapp_groups(&self) -> Result<Vec<WhatsAppGroup>> {
    ApiClient::whatsapp_groups(self).await
  }

  async fn suspect_profiles(&self) -> Result<Vec<SuspectProfile>> {
    ApiClient::suspect_profiles(self).await
  }

  async fn set_category(&self, id: &str, category: &str) -> Result<()> {
    ApiClient::set_category(self, id, category).await
  }
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// Categories held by one credential id before an optimistic update.
#[derive(Debug, Default)]
struct Previous {
  password: Option<Option<String>>,
  account:  Option<Option<String>>,
  /// `(group index, usage index, category)`
  usages:   Vec<(usize, usize, Option<String>)>,
}

pub struct Session<B> {
  backend: B,

  pub contacts:        Vec<Contact>,
  pub passwords:       Vec<Credential>,
  pub user_accounts:   Vec<UserAccount>,
  pub password_groups: Vec<PasswordGroup>,
  pub whatsapp_groups: Vec<WhatsAppGroup>,
  pub suspects:        Vec<SuspectProfile>,

  /// One entry per failed fetch since the session started.
  pub warnings: Vec<String>,
}

/// Replace `slot` on success; keep the stale value and note the failure
/// otherwise.
fn keep_or_replace<T>(
  slot: &mut Vec<T>,
  fetched: Result<Vec<T>>,
  what: &str,
  warnings: &mut Vec<String>,
) {
  match fetched {
    Ok(values) => *slot = values,
    Err(e) => {
      tracing::warn!(error = %e, "failed to refresh {what}");
      warnings.push(format!("{what}: {e:#}"));
    }
  }
}

fn set_usage_category(group: &mut PasswordGroup, index: usize, category: Option<String>) {
  let mut usages = group.usages().to_vec();
  if let Some(usage) = usages.get_mut(index) {
    usage.category = category;
  }
  let rebuilt = PasswordGroup::new(group.password(), usages);
  *group = rebuilt;
}

impl<B: Backend> Session<B> {
  pub fn new(backend: B) -> Self {
    Self {
      backend,
      contacts: Vec::new(),
      passwords: Vec::new(),
      user_accounts: Vec::new(),
      password_groups: Vec::new(),
      whatsapp_groups: Vec::new(),
      suspects: Vec::new(),
      warnings: Vec::new(),
    }
  }

  #[cfg(test)]
  fn backend(&self) -> &B { &self.backend }

  /// Fetch every collection concurrently. Returns how many fetches failed.
  pub async fn refresh(&mut self) -> usize {
    let before = self.warnings.len();
    let (contacts, passwords, accounts, groups, whatsapp, suspects) = tokio::join!(
      self.backend.contacts(),
      self.backend.passwords(),
      self.backend.user_accounts(),
      self.backend.password_analysis(),
      self.backend.whatsapp_groups(),
      self.backend.suspect_profiles(),
    );

    let w = &mut self.warnings;
    keep_or_replace(&mut self.contacts, contacts, "contacts", w);
    keep_or_replace(&mut self.passwords, passwords, "passwords", w);
    keep_or_replace(&mut self.user_accounts, accounts, "user accounts", w);
    keep_or_replace(&mut self.password_groups, groups, "password analysis", w);
    keep_or_replace(&mut self.whatsapp_groups, whatsapp, "whatsapp groups", w);
    keep_or_replace(&mut self.suspects, suspects, "suspect profiles", w);

    self.warnings.len() - before
  }

  /// Passwords followed by user accounts, as one credential list.
  pub fn credentials(&self) -> Vec<Credential> {
    self
      .passwords
      .iter()
      .cloned()
      .chain(self.user_accounts.iter().cloned().map(Credential::from))
      .collect()
  }

  // ── Category ──────────────────────────────────────────────────────────────

  /// Set the category of credential `id` locally, then on the server. On
  /// failure the local copies get their previous category back.
  pub async fn set_category(&mut self, id: &str, category: &str) -> Result<()> {
    let category = category.trim();
    if category.is_empty() {
      bail!("category is required");
    }

    let previous = self.write_category(id, category);
    if let Err(e) = self.backend.set_category(id, category).await {
      tracing::warn!(%id, error = %e, "category update rejected, rolling back");
      self.restore(id, previous);
      return Err(e);
    }
    Ok(())
  }

  fn write_category(&mut self, id: &str, category: &str) -> Previous {
    let mut previous = Previous::default();
    if let Some(p) = self.passwords.iter_mut().find(|p| p.id == id) {
      previous.password = Some(p.category.replace(category.to_owned()));
    }
    if let Some(a) = self.user_accounts.iter_mut().find(|a| a.id == id) {
      previous.account = Some(a.category.replace(category.to_owned()));
    }
    for (g, group) in self.password_groups.iter_mut().enumerate() {
      if let Some(u) = group.usages().iter().position(|u| u.id == id) {
        previous.usages.push((g, u, group.usages()[u].category.clone()));
        set_usage_category(group, u, Some(category.to_owned()));
      }
    }
    previous
  }

  fn restore(&mut self, id: &str, previous: Previous) {
    if let Some(old) = previous.password
      && let Some(p) = self.passwords.iter_mut().find(|p| p.id == id)
    {
      p.category = old;
    }
    if let Some(old) = previous.account
      && let Some(a) = self.user_accounts.iter_mut().find(|a| a.id == id)
    {
      a.category = old;
    }
    for (g, u, old) in previous.usages {
      if let Some(group) = self.password_groups.get_mut(g) {
        set_usage_category(group, u, old);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  };

  use anyhow::anyhow;
  use dossier_core::reuse::group_passwords;

  use super::*;

  #[derive(Default)]
  struct FakeBackend {
    contacts:       Mutex<Vec<Contact>>,
    passwords:      Vec<Credential>,
    fail_contacts:  AtomicBool,
    fail_passwords: AtomicBool,
    reject_updates: AtomicBool,
    updates:        Mutex<Vec<(String, String)>>,
  }

  fn down() -> anyhow::Error { anyhow!("connection refused") }

  impl Backend for FakeBackend {
    async fn contacts(&self) -> Result<Vec<Contact>> {
      if self.fail_contacts.load(Ordering::SeqCst) {
        return Err(down());
      }
      Ok(self.contacts.lock().unwrap().clone())
    }

    async fn passwords(&self) -> Result<Vec<Credential>> {
      if self.fail_passwords.load(Ordering::SeqCst) {
        return Err(down());
      }
      Ok(self.passwords.clone())
    }

    async fn user_accounts(&self) -> Result<Vec<UserAccount>> { Ok(Vec::new()) }

    async fn password_analysis(&self) -> Result<Vec<PasswordGroup>> {
      Ok(group_passwords(&self.passwords, &[]))
    }

    async fn whatsapp_groups(&self) -> Result<Vec<WhatsAppGroup>> { Ok(Vec::new()) }

    async fn suspect_profiles(&self) -> Result<Vec<SuspectProfile>> { Ok(Vec::new()) }

    async fn set_category(&self, id: &str, category: &str) -> Result<()> {
      if self.reject_updates.load(Ordering::SeqCst) {
        return Err(anyhow!("PUT /credentials/{id}/category → 500"));
      }
      self.updates.lock().unwrap().push((id.to_owned(), category.to_owned()));
      Ok(())
    }
  }

  fn contact(id: &str) -> Contact { Contact { id: id.into(), ..Default::default() } }

  fn password(id: &str, app: &str) -> Credential {
    Credential {
      id: id.into(),
      application: Some(app.into()),
      username: Some("ion".into()),
      password: Some("abc123".into()),
      category: Some("Email".into()),
      ..Default::default()
    }
  }

  fn backend() -> FakeBackend {
    FakeBackend {
      contacts: Mutex::new(vec![contact("c1")]),
      passwords: vec![password("p1", "Gmail"), password("p2", "Facebook")],
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn refresh_loads_every_collection() {
    let mut session = Session::new(backend());
    assert_eq!(session.refresh().await, 0);
    assert_eq!(session.contacts.len(), 1);
    assert_eq!(session.passwords.len(), 2);
    assert_eq!(session.password_groups.len(), 1);
    assert!(session.warnings.is_empty());
  }

  #[tokio::test]
  async fn failed_fetch_keeps_stale_data() {
    let mut session = Session::new(backend());
    session.refresh().await;

    session.backend().contacts.lock().unwrap().push(contact("c2"));
    session.backend().fail_passwords.store(true, Ordering::SeqCst);
    assert_eq!(session.refresh().await, 1);

    assert_eq!(session.contacts.len(), 2);
    assert_eq!(session.passwords.len(), 2);
    assert_eq!(session.warnings.len(), 1);
    assert!(session.warnings[0].starts_with("passwords:"));
  }

  #[tokio::test]
  async fn first_refresh_failure_leaves_empty() {
    let mut session = Session::new(backend());
    session.backend().fail_contacts.store(true, Ordering::SeqCst);
    assert_eq!(session.refresh().await, 1);
    assert!(session.contacts.is_empty());
    assert_eq!(session.passwords.len(), 2);
  }

  #[tokio::test]
  async fn category_update_applies_everywhere() {
    let mut session = Session::new(backend());
    session.refresh().await;

    session.set_category("p2", "Social").await.unwrap();

    assert_eq!(session.passwords[1].category.as_deref(), Some("Social"));
    let usage = session.password_groups[0].usages().iter().find(|u| u.id == "p2").unwrap();
    assert_eq!(usage.category.as_deref(), Some("Social"));
    assert_eq!(session.password_groups[0].usage_count(), 2);
    assert_eq!(
      *session.backend().updates.lock().unwrap(),
      [("p2".to_owned(), "Social".to_owned())]
    );
  }

  #[tokio::test]
  async fn rejected_category_update_rolls_back() {
    let mut session = Session::new(backend());
    session.refresh().await;
    session.backend().reject_updates.store(true, Ordering::SeqCst);

    let err = session.set_category("p1", "Social").await.unwrap_err();
    assert!(err.to_string().contains("500"));

    assert_eq!(session.passwords[0].category.as_deref(), Some("Email"));
    let usage = session.password_groups[0].usages().iter().find(|u| u.id == "p1").unwrap();
    assert_eq!(usage.category.as_deref(), Some("Email"));
  }

  #[tokio::test]
  async fn blank_category_is_refused_locally() {
    let mut session = Session::new(backend());
    session.refresh().await;
    assert!(session.set_category("p1", "   ").await.is_err());
    assert!(session.backend().updates.lock().unwrap().is_empty());
    assert_eq!(session.passwords[0].category.as_deref(), Some("Email"));
  }
}

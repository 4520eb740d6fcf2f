//! Credentials: saved passwords and the user accounts found on a device.
//!
//! The two collections are stored apart but browsed together, so a
//! [`UserAccount`] converts into the common [`Credential`] shape.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  raw::{RawData, null_as_default},
  resolve::{Attr, Record, RecordKind},
  search::{Searchable, push_opt},
};

/// A saved password, or a user account in the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
  pub id:                 String,
  pub application:        Option<String>,
  pub source:             Option<String>,
  pub username:           Option<String>,
  pub email:              Option<String>,
  pub password:           Option<String>,
  pub url:                Option<String>,
  pub description:        Option<String>,
  pub email_domain:       Option<String>,
  pub category:           Option<String>,
  pub case_number:        Option<String>,
  pub person_name:        Option<String>,
  pub device_info:        Option<String>,
  pub service_identifier: Option<String>,
  pub service_type:       Option<String>,
  pub user_id:            Option<String>,
  pub notes:              Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duplicate_count:    Option<usize>,
  #[serde(deserialize_with = "null_as_default")]
  pub raw_data:           RawData,
  pub created_at:         Option<DateTime<Utc>>,
}

impl Credential {
  /// Whether this record carries a password, as opposed to an account.
  pub fn has_password(&self) -> bool {
    self.password.as_deref().is_some_and(|p| !p.is_empty())
  }
}

impl Record for Credential {
  const KIND: RecordKind = RecordKind::Credential;

  fn attr(&self, attr: Attr) -> Option<&str> {
    match attr {
      Attr::Application => self.application.as_deref(),
      Attr::Source => self.source.as_deref(),
      Attr::Url => self.url.as_deref(),
      Attr::Username => self.username.as_deref(),
      Attr::Email => self.email.as_deref(),
      Attr::Category => self.category.as_deref(),
      Attr::EmailDomain => self.email_domain.as_deref(),
      Attr::Device => self.device_info.as_deref(),
      Attr::Case => self.case_number.as_deref(),
      Attr::Suspect => self.person_name.as_deref(),
      Attr::Service => self.service_identifier.as_deref(),
      Attr::Raw(key) => self.raw_data.field(key),
      Attr::Name | Attr::PhotoPath | Attr::PersonName => None,
    }
  }
}

impl Searchable for Credential {
  fn scalar_fields(&self) -> Vec<Cow<'_, str>> {
    let mut fields = vec![Cow::Borrowed(self.id.as_str())];
    for value in [
      &self.application,
      &self.source,
      &self.username,
      &self.email,
      &self.password,
      &self.url,
      &self.description,
      &self.email_domain,
      &self.category,
      &self.case_number,
      &self.person_name,
      &self.device_info,
      &self.service_identifier,
      &self.service_type,
      &self.user_id,
      &self.notes,
    ] {
      push_opt(&mut fields, value);
    }
    if let Some(n) = self.duplicate_count.filter(|n| *n > 0) {
      fields.push(Cow::Owned(n.to_string()));
    }
    if let Some(at) = self.created_at {
      fields.push(Cow::Owned(at.to_rfc3339()));
    }
    fields
  }
}

/// An account record from the device's account databases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAccount {
  pub id:                 String,
  pub case_number:        Option<String>,
  pub person_name:        Option<String>,
  pub device_info:        Option<String>,
  pub source:             Option<String>,
  pub service_type:       Option<String>,
  pub service_identifier: Option<String>,
  pub username:           Option<String>,
  pub email:              Option<String>,
  pub name:               Option<String>,
  pub user_id:            Option<String>,
  pub notes:              Option<String>,
  pub category:           Option<String>,
  pub email_domain:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duplicate_count:    Option<usize>,
  /// Free-form enrichment (bio, birthday, profile URLs).
  #[serde(deserialize_with = "null_as_default")]
  pub metadata:           serde_json::Value,
  #[serde(deserialize_with = "null_as_default")]
  pub raw_data:           RawData,
  pub created_at:         Option<DateTime<Utc>>,
}

impl From<UserAccount> for Credential {
  fn from(account: UserAccount) -> Self {
    Self {
      id: account.id,
      application: None,
      source: account.source,
      username: account.username,
      email: account.email,
      password: None,
      url: None,
      description: account.name,
      email_domain: account.email_domain,
      category: account.category,
      case_number: account.case_number,
      person_name: account.person_name,
      device_info: account.device_info,
      service_identifier: account.service_identifier,
      service_type: account.service_type,
      user_id: account.user_id,
      notes: account.notes,
      duplicate_count: account.duplicate_count,
      raw_data: account.raw_data,
      created_at: account.created_at,
    }
  }
}

impl Searchable for UserAccount {
  fn scalar_fields(&self) -> Vec<Cow<'_, str>> {
    let mut fields = vec![Cow::Borrowed(self.id.as_str())];
    for value in [
      &self.source,
      &self.service_type,
      &self.service_identifier,
      &self.username,
      &self.email,
      &self.name,
      &self.user_id,
      &self.notes,
      &self.category,
      &self.email_domain,
      &self.case_number,
      &self.person_name,
      &self.device_info,
    ] {
      push_opt(&mut fields, value);
    }
    fields
  }
}

/// Source label of accounts pulled from the Discord client.
pub const DISCORD_SOURCE: &str = "Discord";

/// The accounts whose source is exactly [`DISCORD_SOURCE`], in input order.
pub fn discord_accounts(accounts: &[UserAccount]) -> Vec<&UserAccount> {
  accounts
    .iter()
    .filter(|a| a.source.as_deref() == Some(DISCORD_SOURCE))
    .collect()
}

/// A credential together with the records that deduplicated into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialDetails {
  pub main_credential:  Credential,
  pub all_records:      Vec<Credential>,
  pub total_duplicates: usize,
  pub is_password:      bool,
}

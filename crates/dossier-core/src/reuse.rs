//! Password-reuse analysis.
//!
//! [`group_passwords`] buckets every password-like value found in the
//! extraction with the places it was used; [`aggregate`] narrows those
//! groups to the usages matching a filter selection.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
  credential::{Credential, UserAccount},
  filter::matches,
  raw::{RawData, null_as_default},
  resolve::{Attr, Record, RecordKind},
  selection::FilterSelection,
};

/// Where a usage was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageOrigin {
  Password,
  Account,
}

/// One place a password value was used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
  #[serde(default)]
  pub id:          String,
  pub service:     String,
  pub username:    String,
  #[serde(default)]
  pub email:       Option<String>,
  #[serde(default)]
  pub category:    Option<String>,
  #[serde(default)]
  pub device:      Option<String>,
  #[serde(default)]
  pub case_number: Option<String>,
  #[serde(default)]
  pub suspect:     Option<String>,
  #[serde(default)]
  pub person_name: Option<String>,
  #[serde(default)]
  pub url:         Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub raw_data:    RawData,
  #[serde(rename = "type")]
  pub origin:      UsageOrigin,
}

impl Record for Usage {
  const KIND: RecordKind = RecordKind::Usage;

  fn attr(&self, attr: Attr) -> Option<&str> {
    match attr {
      Attr::Service => Some(&self.service),
      Attr::Username => Some(&self.username),
      Attr::Email => self.email.as_deref(),
      Attr::Category => self.category.as_deref(),
      Attr::Device => self.device.as_deref(),
      Attr::Case => self.case_number.as_deref(),
      Attr::Suspect => self.suspect.as_deref(),
      Attr::PersonName => self.person_name.as_deref(),
      Attr::Url => self.url.as_deref(),
      Attr::Raw(key) => self.raw_data.field(key),
      _ => None,
    }
  }
}

/// Every usage of one password value.
///
/// `usage_count` and `is_reused` are derived from `usages` on construction
/// and cannot drift from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GroupWire")]
pub struct PasswordGroup {
  password:    String,
  usage_count: usize,
  usages:      Vec<Usage>,
  is_reused:   bool,
}

#[derive(Deserialize)]
struct GroupWire {
  password: String,
  #[serde(default)]
  usages:   Vec<Usage>,
}

impl From<GroupWire> for PasswordGroup {
  fn from(wire: GroupWire) -> Self { Self::new(wire.password, wire.usages) }
}

impl PasswordGroup {
  pub fn new(password: impl Into<String>, usages: Vec<Usage>) -> Self {
    Self {
      password: password.into(),
      usage_count: usages.len(),
      is_reused: usages.len() > 1,
      usages,
    }
  }

  pub fn password(&self) -> &str { &self.password }

  pub fn usages(&self) -> &[Usage] { &self.usages }

  pub fn usage_count(&self) -> usize { self.usage_count }

  pub fn is_reused(&self) -> bool { self.is_reused }
}

// ─── Upstream grouping ───────────────────────────────────────────────────────

/// Values of `url` that name no real service.
const PLACEHOLDER_URLS: &[&str] = &["-", "None", "Multiple Accounts"];

fn trimmed(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Identity fields are compared as stored, surrounding whitespace included.
fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.is_empty())
}

fn password_usage(record: &Credential) -> Option<(String, Usage)> {
  let value = record.password.as_deref().unwrap_or_default().trim();
  // Too short to be real, or an email typed into the password field.
  if value.chars().count() < 2 || (value.contains('@') && value.contains('.')) {
    return None;
  }

  let url = trimmed(&record.url);
  let service = url
    .filter(|u| !PLACEHOLDER_URLS.contains(u))
    .or_else(|| trimmed(&record.application))
    .or_else(|| record.raw_data.field("ServiceIdentifier").filter(|s| !s.is_empty()))
    .unwrap_or("-");

  let usage = Usage {
    id:          record.id.clone(),
    service:     service.to_owned(),
    username:    present(&record.username).unwrap_or("-").to_owned(),
    email:       record.email.clone(),
    category:    record.category.clone().or_else(|| Some("Other".to_owned())),
    device:      record.device_info.clone(),
    case_number: record.case_number.clone(),
    suspect:     record.person_name.clone(),
    person_name: record.person_name.clone(),
    url:         url.map(str::to_owned),
    raw_data:    record.raw_data.clone(),
    origin:      UsageOrigin::Password,
  };
  Some((value.to_owned(), usage))
}

fn account_usage(record: &UserAccount) -> Option<(String, Usage)> {
  let value = record.user_id.as_deref().unwrap_or_default().trim();
  // Numeric ids, emails and short handles are not secrets.
  if value.chars().count() < 6
    || value.chars().all(|c| c.is_ascii_digit())
    || value.contains('@')
  {
    return None;
  }

  let service = present(&record.source)
    .or_else(|| present(&record.service_identifier))
    .unwrap_or("-");
  let username = present(&record.username)
    .or_else(|| present(&record.email))
    .unwrap_or("-");

  let usage = Usage {
    id:          record.id.clone(),
    service:     service.to_owned(),
    username:    username.to_owned(),
    email:       record.email.clone(),
    category:    record.category.clone().or_else(|| Some("Other".to_owned())),
    device:      record.device_info.clone(),
    case_number: record.case_number.clone(),
    suspect:     record.person_name.clone(),
    person_name: record.person_name.clone(),
    url:         Some(service.to_owned()),
    raw_data:    record.raw_data.clone(),
    origin:      UsageOrigin::Account,
  };
  Some((value.to_owned(), usage))
}

/// Group every password-like value of `passwords` and `accounts` with its
/// usages. Usages repeating the same service, username, case and device are
/// collapsed to the first one. Groups come out most-used first; ties keep
/// the order in which their password was first seen.
pub fn group_passwords(passwords: &[Credential], accounts: &[UserAccount]) -> Vec<PasswordGroup> {
  let mut order: Vec<String> = Vec::new();
  let mut buckets: HashMap<String, (Vec<Usage>, HashSet<String>)> = HashMap::new();

  let found = passwords
    .iter()
    .filter_map(password_usage)
    .chain(accounts.iter().filter_map(account_usage));

  for (value, usage) in found {
    let (usages, seen) = buckets.entry(value.clone()).or_insert_with(|| {
      order.push(value);
      Default::default()
    });
    let key = format!(
      "{}_{}_{}_{}",
      usage.service,
      usage.username,
      usage.case_number.as_deref().unwrap_or("-"),
      usage.device.as_deref().unwrap_or("-"),
    );
    if seen.insert(key) {
      usages.push(usage);
    }
  }

  let mut groups: Vec<PasswordGroup> = order
    .into_iter()
    .filter_map(|value| {
      let (usages, _) = buckets.remove(&value)?;
      Some(PasswordGroup::new(value, usages))
    })
    .collect();
  groups.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
  groups
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Narrow each group to the usages matching `selection`. Groups left with no
/// usages are dropped; group and usage order are preserved.
pub fn aggregate(groups: &[PasswordGroup], selection: &FilterSelection) -> Vec<PasswordGroup> {
  groups
    .iter()
    .filter_map(|group| {
      let usages: Vec<Usage> = group
        .usages
        .iter()
        .filter(|u| matches(*u, selection))
        .cloned()
        .collect();
      (!usages.is_empty()).then(|| PasswordGroup::new(group.password.clone(), usages))
    })
    .collect()
}

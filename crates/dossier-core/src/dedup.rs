//! Deduplication of the raw collections.
//!
//! The same person typically appears many times across a device: once in the
//! address book, again per messenger, again per backup. Contacts merge on
//! their normalized phone; credentials merge on account and application.

use std::{
  cmp::Reverse,
  collections::{HashMap, hash_map::Entry},
  hash::Hash,
};

use chrono::{DateTime, Utc};

use crate::{
  contact::{Contact, ContactDetails},
  credential::{Credential, CredentialDetails, UserAccount},
  text::{looks_like_phone, normalize, normalize_phone},
  whatsapp::GroupRef,
};

/// Source label for address-book entries, which carry none.
pub const DEFAULT_CONTACT_SOURCE: &str = "Agenda Telefon";

const MESSENGER_NAMES: &[&str] = &["whatsapp", "facebook", "instagram", "telegram", "viber"];

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.is_empty())
}

// ─── Contacts ────────────────────────────────────────────────────────────────

/// A name worth showing: not blank, not a phone number and not just the
/// name of the messenger it came from.
fn is_real_name(name: &str) -> bool {
  let trimmed = name.trim();
  if trimmed.is_empty() || trimmed == "-" || looks_like_phone(name) {
    return false;
  }
  let lower = name.to_lowercase();
  let messenger = MESSENGER_NAMES.iter().any(|m| lower.contains(m));
  !(messenger && trimmed.chars().count() < 6)
}

/// Longer names win; any letter earns a large bonus over digit soup.
fn name_score(name: &str) -> usize {
  let bonus = if name.chars().any(char::is_alphabetic) { 50 } else { 0 };
  name.trim().chars().count() + bonus
}

/// Merge contacts sharing a normalized phone number. Contacts without a
/// phone are dropped. The result is sorted by folded name, so `Ștefan`
/// sorts with `stefan`.
pub fn dedup_contacts(contacts: &[Contact]) -> Vec<Contact> {
  // First photo seen per normalized phone, for the suspect's own picture.
  let mut photo_by_phone: HashMap<String, &str> = HashMap::new();
  for c in contacts {
    if let (Some(photo), Some(phone)) = (non_empty(&c.photo_path), non_empty(&c.phone)) {
      let normalized = normalize_phone(phone);
      if !normalized.is_empty() {
        photo_by_phone.entry(normalized).or_insert(photo);
      }
    }
  }

  let mut order: Vec<String> = Vec::new();
  let mut groups: HashMap<String, Vec<&Contact>> = HashMap::new();
  for c in contacts {
    let Some(phone) = non_empty(&c.phone) else { continue };
    let key = normalize_phone(phone);
    groups
      .entry(key.clone())
      .or_insert_with(|| {
        order.push(key);
        Vec::new()
      })
      .push(c);
  }

  let mut merged: Vec<Contact> = order
    .iter()
    .filter_map(|key| groups.get(key))
    .map(|group| merge_contacts(group, &photo_by_phone))
    .collect();
  merged.sort_by_cached_key(|c| normalize(c.name_or_empty()));
  merged
}

fn merge_contacts(group: &[&Contact], photo_by_phone: &HashMap<String, &str>) -> Contact {
  let mut merged = group[0].clone();
  let mut best_score = 0;
  let mut all_names: Vec<String> = Vec::new();
  let mut all_phones: Vec<String> = Vec::new();
  let mut sources: Vec<String> = Vec::new();

  for c in group {
    if let Some(name) = non_empty(&c.name).filter(|n| is_real_name(n)) {
      if !all_names.iter().any(|n| n == name) {
        all_names.push(name.to_owned());
      }
      let score = name_score(name);
      if score > best_score {
        best_score = score;
        merged.name = Some(name.to_owned());
      }
    }

    if non_empty(&merged.photo_path).is_none() && non_empty(&c.photo_path).is_some() {
      merged.photo_path = c.photo_path.clone();
    }
    if non_empty(&merged.email).is_none() && non_empty(&c.email).is_some() {
      merged.email = c.email.clone();
    }

    if let Some(phone) = non_empty(&c.phone)
      && !all_phones.iter().any(|p| p == phone)
    {
      all_phones.push(phone.to_owned());
    }
    let source = non_empty(&c.source).unwrap_or(DEFAULT_CONTACT_SOURCE);
    if !sources.iter().any(|s| s == source) {
      sources.push(source.to_owned());
    }
  }

  if non_empty(&merged.source).is_none() {
    merged.source = Some(DEFAULT_CONTACT_SOURCE.to_owned());
  }
  merged.duplicate_count = Some(group.len());
  if let Some(first) = all_phones.first() {
    merged.phone = Some(first.clone());
  }
  merged.all_phones = all_phones;
  merged.all_names = all_names;
  merged.sources = sources;

  if let Some(suspect_phone) = non_empty(&merged.suspect_phone)
    && let Some(photo) = photo_by_phone.get(&normalize_phone(suspect_phone))
  {
    merged.suspect_photo_path = Some((*photo).to_owned());
  }
  merged
}

/// `main` plus every contact sharing its normalized phone, and the WhatsApp
/// groups any of them belong to.
pub fn contact_details(main: Contact, contacts: &[Contact]) -> ContactDetails {
  let mut all_records = Vec::new();
  let mut entries: Vec<&str> = Vec::new();
  if let Some(phone) = non_empty(&main.phone) {
    let wanted = normalize_phone(phone);
    for c in contacts {
      if non_empty(&c.phone).is_some_and(|p| normalize_phone(p) == wanted) {
        all_records.push(c.clone());
        for entry in &c.whatsapp_groups {
          if !entries.contains(&entry.as_str()) {
            entries.push(entry);
          }
        }
      }
    }
  }

  ContactDetails {
    main_contact: main,
    total_duplicates: all_records.len(),
    all_records,
    whatsapp_groups: entries.into_iter().filter_map(GroupRef::parse).collect(),
  }
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Account service types that hold machine secrets rather than logins.
const SECRET_SERVICE_TYPES: &[&str] = &["key", "secret", "token"];

fn dedup_key(account: Option<&str>, application: Option<&str>) -> String {
  format!("{}_{}", account.unwrap_or_default(), application.unwrap_or_default()).to_lowercase()
}

/// One row per account and application across passwords and user accounts.
/// The first record of each key is kept and carries the duplicate count.
pub fn dedup_credentials(passwords: &[Credential], accounts: &[UserAccount]) -> Vec<Credential> {
  let mut out: Vec<Credential> = Vec::new();
  let mut seen: HashMap<String, usize> = HashMap::new();

  let mut push = |key: String, has_account: bool, record: Credential| {
    if let Some(&at) = seen.get(&key) {
      let count = out[at].duplicate_count.get_or_insert(1);
      *count += 1;
    } else if has_account {
      seen.insert(key, out.len());
      out.push(Credential { duplicate_count: Some(1), ..record });
    }
  };

  for p in passwords {
    let account = non_empty(&p.username).or_else(|| non_empty(&p.password));
    let key = dedup_key(account, p.application.as_deref());
    push(key, account.is_some(), p.clone());
  }

  for a in accounts {
    let service_type = a.service_type.as_deref().unwrap_or_default().to_lowercase();
    if SECRET_SERVICE_TYPES.contains(&service_type.as_str()) {
      continue;
    }
    let account = non_empty(&a.username).or_else(|| non_empty(&a.email));
    let key = dedup_key(account, a.source.as_deref());
    push(key, account.is_some(), Credential::from(a.clone()));
  }

  out
}

/// The password `main` and every password sharing its account and
/// application.
pub fn password_details(main: Credential, passwords: &[Credential]) -> CredentialDetails {
  let account = non_empty(&main.username)
    .or_else(|| non_empty(&main.email))
    .or_else(|| non_empty(&main.password));
  let application = non_empty(&main.application).or_else(|| non_empty(&main.source));

  let mut related: Vec<Credential> = Vec::new();
  if let (Some(account), Some(application)) = (account, application) {
    related.extend(
      passwords
        .iter()
        .filter(|p| is(&p.application, application))
        .filter(|p| is(&p.username, account) || is(&p.password, account))
        .cloned(),
    );
  }
  details(main, related, true)
}

/// The user account `main` and every account sharing its login and source.
pub fn account_details(main: UserAccount, accounts: &[UserAccount]) -> CredentialDetails {
  let main = Credential::from(main);
  let account = non_empty(&main.username).or_else(|| non_empty(&main.email));
  let source = non_empty(&main.source);

  let mut related: Vec<Credential> = Vec::new();
  if let (Some(account), Some(source)) = (account, source) {
    related.extend(
      accounts
        .iter()
        .filter(|a| is(&a.source, source))
        .filter(|a| is(&a.username, account) || is(&a.email, account))
        .cloned()
        .map(Credential::from),
    );
  }
  details(main, related, false)
}

fn is(value: &Option<String>, want: &str) -> bool { value.as_deref() == Some(want) }

fn details(main: Credential, related: Vec<Credential>, is_password: bool) -> CredentialDetails {
  let all_records = if related.is_empty() { vec![main.clone()] } else { related };
  CredentialDetails {
    main_credential: main,
    total_duplicates: all_records.len(),
    all_records,
    is_password,
  }
}

// ─── Per collection ──────────────────────────────────────────────────────────

/// Walk `records` newest first (undated last, ties in input order) and keep
/// the first record per key with the size of its bucket.
fn newest_per_key<T, K: Eq + Hash>(
  records: &[T],
  created_at: impl Fn(&T) -> Option<DateTime<Utc>>,
  key: impl Fn(&T) -> K,
) -> Vec<(&T, usize)> {
  let mut sorted: Vec<&T> = records.iter().collect();
  sorted.sort_by_key(|r| Reverse(created_at(r)));

  let mut out: Vec<(&T, usize)> = Vec::new();
  let mut seen: HashMap<K, usize> = HashMap::new();
  for record in sorted {
    match seen.entry(key(record)) {
      Entry::Occupied(at) => out[*at.get()].1 += 1,
      Entry::Vacant(slot) => {
        slot.insert(out.len());
        out.push((record, 1));
      }
    }
  }
  out
}

/// Passwords collapsed on username (the password itself when the username
/// is absent) and application. Keys compare exactly. The newest record of
/// each key is kept and carries the duplicate count.
pub fn dedup_passwords(passwords: &[Credential]) -> Vec<Credential> {
  let key = |p: &Credential| {
    (p.username.clone().or_else(|| p.password.clone()), p.application.clone())
  };
  newest_per_key(passwords, |p| p.created_at, key)
    .into_iter()
    .map(|(p, n)| Credential { duplicate_count: Some(n), ..p.clone() })
    .collect()
}

/// User accounts collapsed on username (the email when absent) and source,
/// newest record first.
pub fn dedup_user_accounts(accounts: &[UserAccount]) -> Vec<UserAccount> {
  let key = |a: &UserAccount| (a.username.clone().or_else(|| a.email.clone()), a.source.clone());
  newest_per_key(accounts, |a| a.created_at, key)
    .into_iter()
    .map(|(a, n)| UserAccount { duplicate_count: Some(n), ..a.clone() })
    .collect()
}

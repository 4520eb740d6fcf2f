//! Contacts extracted from a device's address book and messenger apps.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  raw::{RawData, null_as_default},
  resolve::{Attr, Record, RecordKind},
  search::{Query, Searchable, push_opt},
  whatsapp::GroupRef,
};

/// One contact record as produced by the extraction parser, or a merged
/// contact after [`dedup_contacts`](crate::dedup::dedup_contacts).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
  pub id:                 String,
  pub name:               Option<String>,
  /// Every distinct real name seen for this phone (merged contacts only).
  #[serde(deserialize_with = "null_as_default")]
  pub all_names:          Vec<String>,
  pub phone:              Option<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub all_phones:         Vec<String>,
  pub source:             Option<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub sources:            Vec<String>,
  pub category:           Option<String>,
  pub case_number:        Option<String>,
  /// The suspect whose device this contact was extracted from.
  pub person_name:        Option<String>,
  pub device_info:        Option<String>,
  pub photo_path:         Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duplicate_count:    Option<usize>,
  pub account:            Option<String>,
  pub email:              Option<String>,
  pub user_id:            Option<String>,
  /// The device owner's own phone number.
  pub suspect_phone:      Option<String>,
  pub suspect_photo_path: Option<String>,
  /// Raw "group in common" entries, e.g. `"4076…-16019…@g.us Family"`.
  #[serde(deserialize_with = "null_as_default")]
  pub whatsapp_groups:    Vec<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub raw_data:           RawData,
  pub created_at:         Option<DateTime<Utc>>,
}

impl Contact {
  /// The stored name, or empty when absent.
  pub fn name_or_empty(&self) -> &str { self.name.as_deref().unwrap_or_default() }
}

impl Record for Contact {
  const KIND: RecordKind = RecordKind::Contact;

  fn attr(&self, attr: Attr) -> Option<&str> {
    match attr {
      Attr::Source => self.source.as_deref(),
      Attr::Category => self.category.as_deref(),
      Attr::Device => self.device_info.as_deref(),
      Attr::Case => self.case_number.as_deref(),
      Attr::Suspect => self.person_name.as_deref(),
      Attr::Name => self.name.as_deref(),
      Attr::PhotoPath => self.photo_path.as_deref(),
      Attr::Email => self.email.as_deref(),
      Attr::Username => self.account.as_deref(),
      Attr::Raw(key) => self.raw_data.field(key),
      _ => None,
    }
  }
}

impl Searchable for Contact {
  fn scalar_fields(&self) -> Vec<Cow<'_, str>> {
    let mut fields = vec![Cow::Borrowed(self.id.as_str())];
    push_opt(&mut fields, &self.name);
    push_opt(&mut fields, &self.phone);
    push_opt(&mut fields, &self.source);
    push_opt(&mut fields, &self.category);
    push_opt(&mut fields, &self.case_number);
    push_opt(&mut fields, &self.person_name);
    push_opt(&mut fields, &self.device_info);
    push_opt(&mut fields, &self.photo_path);
    if let Some(n) = self.duplicate_count.filter(|n| *n > 0) {
      fields.push(Cow::Owned(n.to_string()));
    }
    push_opt(&mut fields, &self.account);
    push_opt(&mut fields, &self.email);
    push_opt(&mut fields, &self.user_id);
    push_opt(&mut fields, &self.suspect_phone);
    push_opt(&mut fields, &self.suspect_photo_path);
    if let Some(at) = self.created_at {
      fields.push(Cow::Owned(at.to_rfc3339()));
    }
    fields
  }

  fn matches(&self, query: &Query) -> bool {
    // Digit runs would otherwise hit ids, timestamps and phone-like names.
    if query.is_phone() {
      return query.found_in(self.phone.as_deref().unwrap_or_default());
    }
    if !self.all_names.is_empty() && query.found_in_all(&self.all_names) {
      return true;
    }
    query.found_in_all(self.scalar_fields())
  }
}

/// A contact together with every record sharing its normalized phone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
  pub main_contact:     Contact,
  pub all_records:      Vec<Contact>,
  pub total_duplicates: usize,
  pub whatsapp_groups:  Vec<GroupRef>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::search::search;

  fn contact(name: &str, phone: Option<&str>) -> Contact {
    Contact {
      id: format!("id-{name}"),
      name: Some(name.to_owned()),
      phone: phone.map(str::to_owned),
      ..Default::default()
    }
  }

  #[test]
  fn phone_query_only_looks_at_the_phone() {
    let records = vec![
      contact("Ion Popescu", Some("0765111222")),
      contact("0765111222 Maria", None),
    ];

    let hits = search("111222", &records);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name.as_deref(), Some("Ion Popescu"));

    // Still all digits, so still phone mode.
    let hits = search("0765111222", &records);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name.as_deref(), Some("Ion Popescu"));
  }

  #[test]
  fn phone_mode_ignores_digits_in_names() {
    let records = vec![
      contact("Ana", Some("0765457608")),
      contact("Bogdan 0765457608", Some("0722000111")),
    ];
    let hits = search("0765457608", &records);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name.as_deref(), Some("Ana"));
  }

  #[test]
  fn mixed_queries_scan_every_field() {
    let records = vec![
      contact("Ion Popescu", Some("0765111222")),
      contact("0765111222 Maria", None),
    ];
    let hits = search("0765111222 m", &records);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].phone, None);

    assert_eq!(search("popescu", &records).len(), 1);
    assert_eq!(search("i", &records).len(), 2);
  }

  #[test]
  fn alternate_names_are_searched() {
    let mut merged = contact("Ion", Some("0700000000"));
    merged.all_names = vec!["Ion".into(), "Ionuț Șerban".into()];
    let records = vec![merged];
    assert_eq!(search("ionut serban", &records).len(), 1);
  }

  #[test]
  fn raw_payload_is_not_searched() {
    let mut c = contact("Ion", None);
    c.raw_data = RawData::with_fields([("Notes", "secret-word")]);
    let records = vec![c];
    assert!(search("secret-word", &records).is_empty());
  }

  #[test]
  fn null_lists_deserialize_as_empty() {
    let c: Contact = serde_json::from_str(
      r#"{"id":"1","name":"Ion","all_names":null,"whatsapp_groups":null,"raw_data":null}"#,
    )
    .unwrap();
    assert!(c.all_names.is_empty());
    assert!(c.whatsapp_groups.is_empty());
    assert_eq!(c.raw_data, RawData::default());
  }
}

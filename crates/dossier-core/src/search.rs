//! Free-text search over in-memory collections.
//!
//! Search is a boolean filter, not a ranking: a record matches when the
//! normalized query is a substring of its normalized searchable text. Each
//! record type decides what its searchable text is through [`Searchable`].

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{
  available::DataType,
  contact::Contact,
  credential::{Credential, UserAccount},
  dedup::dedup_contacts,
  text::normalize,
};

/// A parsed, non-blank search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
  needle: String,
  phone:  bool,
}

impl Query {
  /// `None` for empty or whitespace-only input.
  pub fn parse(raw: &str) -> Option<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return None;
    }
    Some(Self {
      needle: normalize(trimmed),
      phone:  trimmed.len() >= 3 && trimmed.bytes().all(|b| b.is_ascii_digit()),
    })
  }

  /// The normalized query text.
  pub fn needle(&self) -> &str { &self.needle }

  /// An all-digit query of at least three digits. Contacts match such
  /// queries against their phone number only.
  pub fn is_phone(&self) -> bool { self.phone }

  /// Whether the query occurs in `text` after normalization.
  pub fn found_in(&self, text: &str) -> bool { normalize(text).contains(&self.needle) }

  /// Whether the query occurs in the space-joined normalization of `parts`.
  pub fn found_in_all<I, S>(&self, parts: I) -> bool
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let joined = parts
      .into_iter()
      .map(|p| normalize(p.as_ref()))
      .collect::<Vec<_>>()
      .join(" ");
    joined.contains(&self.needle)
  }
}

/// A record type the search engine can scan.
pub trait Searchable {
  /// The record's scalar text and number fields, in field order. Opaque
  /// payloads, nested lists and anything the record checks separately in
  /// [`Searchable::matches`] stay out.
  fn scalar_fields(&self) -> Vec<Cow<'_, str>>;

  fn matches(&self, query: &Query) -> bool { query.found_in_all(self.scalar_fields()) }
}

/// The subsequence of `records` matching `query`, in input order. A blank
/// query returns every record.
pub fn search<'a, R, I>(query: &str, records: I) -> Vec<&'a R>
where
  R: Searchable + 'a,
  I: IntoIterator<Item = &'a R>,
{
  match Query::parse(query) {
    None => records.into_iter().collect(),
    Some(q) => records.into_iter().filter(|r| r.matches(&q)).collect(),
  }
}

/// Push `value` onto `fields` when present and non-empty.
pub(crate) fn push_opt<'a>(fields: &mut Vec<Cow<'a, str>>, value: &'a Option<String>) {
  if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
    fields.push(Cow::Borrowed(v));
  }
}

// ─── Stored collections ──────────────────────────────────────────────────────

/// A search over the stored collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
  pub query:     String,
  /// One collection, or every collection when absent.
  #[serde(default)]
  pub data_type: Option<DataType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
  pub contacts:      Vec<Contact>,
  pub passwords:     Vec<Credential>,
  pub user_accounts: Vec<UserAccount>,
}

/// Run `request` against each selected collection. Contact hits are merged
/// by phone exactly as [`dedup_contacts`] merges them.
pub fn search_collections(
  request: &SearchRequest,
  contacts: &[Contact],
  passwords: &[Credential],
  accounts: &[UserAccount],
) -> SearchResults {
  let wanted = |t: DataType| request.data_type.is_none_or(|d| d == t);
  let query = request.query.as_str();

  let mut results = SearchResults::default();
  if wanted(DataType::Contacts) {
    let hits: Vec<Contact> = search(query, contacts).into_iter().cloned().collect();
    results.contacts = dedup_contacts(&hits);
  }
  if wanted(DataType::Passwords) {
    results.passwords = search(query, passwords).into_iter().cloned().collect();
  }
  if wanted(DataType::UserAccounts) {
    results.user_accounts = search(query, accounts).into_iter().cloned().collect();
  }
  results
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Note {
    title: &'static str,
    body:  &'static str,
  }

  impl Searchable for Note {
    fn scalar_fields(&self) -> Vec<Cow<'_, str>> {
      vec![Cow::Borrowed(self.title), Cow::Borrowed(self.body)]
    }
  }

  fn notes() -> Vec<Note> {
    vec![
      Note { title: "Ștefan", body: "met at café" },
      Note { title: "Maria", body: "call 0765111222" },
      Note { title: "Ion", body: "" },
    ]
  }

  #[test]
  fn blank_query_is_identity() {
    let all = notes();
    for q in ["", "   ", "\t"] {
      assert_eq!(search(q, &all).len(), all.len());
    }
  }

  #[test]
  fn matching_ignores_case_and_diacritics() {
    let all = notes();
    let hits = search("STEFAN", &all);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Ștefan");

    assert_eq!(search("cafe", &all).len(), 1);
  }

  #[test]
  fn results_are_an_ordered_subsequence() {
    let all = notes();
    let hits = search("a", &all);
    let titles: Vec<_> = hits.iter().map(|n| n.title).collect();
    assert_eq!(titles, ["Ștefan", "Maria"]);
  }

  #[test]
  fn fields_are_joined_with_a_space() {
    let all = notes();
    assert_eq!(search("maria call", &all).len(), 1);
    assert_eq!(search("mariacall", &all).len(), 0);
  }

  #[test]
  fn phone_queries() {
    assert!(Query::parse("0765").unwrap().is_phone());
    assert!(!Query::parse("07").unwrap().is_phone());
    assert!(!Query::parse("07 65").unwrap().is_phone());
    assert!(Query::parse(" 123 ").unwrap().is_phone());
  }

  #[test]
  fn collection_search_respects_the_data_type() {
    let contacts = vec![
      Contact {
        id: "c1".into(),
        name: Some("Ion".into()),
        phone: Some("0721000111".into()),
        ..Default::default()
      },
      Contact {
        id: "c2".into(),
        name: Some("Ionel".into()),
        phone: Some("+40721000111".into()),
        ..Default::default()
      },
    ];
    let passwords = vec![Credential {
      id: "p1".into(),
      application: Some("Ionos".into()),
      ..Default::default()
    }];
    let accounts = vec![UserAccount {
      id: "a1".into(),
      username: Some("ion.p".into()),
      ..Default::default()
    }];

    let all = SearchRequest { query: "ion".into(), data_type: None };
    let found = search_collections(&all, &contacts, &passwords, &accounts);
    assert_eq!(found.contacts.len(), 1);
    assert_eq!(found.contacts[0].duplicate_count, Some(2));
    assert_eq!(found.passwords.len(), 1);
    assert_eq!(found.user_accounts.len(), 1);

    let only = SearchRequest { data_type: Some(DataType::Passwords), ..all };
    let found = search_collections(&only, &contacts, &passwords, &accounts);
    assert!(found.contacts.is_empty());
    assert!(found.user_accounts.is_empty());
    assert_eq!(found.passwords[0].id, "p1");
  }
}

//! Mapping between core record types and the document rows stored in
//! SQLite.
//!
//! Every collection table has the same shape (`id`, `case_number`, `body`),
//! so one [`Document`] impl per record type is all the store needs.

use dossier_core::{
  contact::Contact,
  credential::{Credential, UserAccount},
  suspect::SuspectProfile,
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Document ────────────────────────────────────────────────────────────────

/// A record type persisted as a JSON document in its own table.
pub trait Document: Serialize + DeserializeOwned + Send + 'static {
  const TABLE: &'static str;

  fn id(&self) -> &str;

  fn set_id(&mut self, id: String);

  fn case_number(&self) -> Option<&str>;
}

impl Document for Contact {
  const TABLE: &'static str = "contacts";

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn case_number(&self) -> Option<&str> { self.case_number.as_deref() }
}

impl Document for Credential {
  const TABLE: &'static str = "passwords";

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn case_number(&self) -> Option<&str> { self.case_number.as_deref() }
}

impl Document for UserAccount {
  const TABLE: &'static str = "user_accounts";

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn case_number(&self) -> Option<&str> { self.case_number.as_deref() }
}

impl Document for SuspectProfile {
  const TABLE: &'static str = "suspect_profiles";

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn case_number(&self) -> Option<&str> { Some(self.case_number.as_str()).filter(|c| !c.is_empty()) }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One row as written to a collection table.
#[derive(Debug, Clone)]
pub struct DocRow {
  pub id:          String,
  pub case_number: Option<String>,
  pub body:        String,
}

pub fn new_id() -> String { Uuid::new_v4().hyphenated().to_string() }

/// Encode `docs` for insertion, assigning a fresh id to any without one.
pub fn encode_docs<D: Document>(docs: Vec<D>) -> Result<Vec<DocRow>> {
  docs
    .into_iter()
    .map(|mut doc| {
      if doc.id().is_empty() {
        doc.set_id(new_id());
      }
      Ok(DocRow {
        id:          doc.id().to_owned(),
        case_number: doc.case_number().map(str::to_owned),
        body:        serde_json::to_string(&doc)?,
      })
    })
    .collect()
}

/// Decode `(id, body)` pairs read back from `D::TABLE`.
pub fn decode_docs<D: Document>(rows: Vec<(String, String)>) -> Result<Vec<D>> {
  rows
    .into_iter()
    .map(|(id, body)| {
      serde_json::from_str(&body).map_err(|source| Error::CorruptRow {
        table: D::TABLE,
        id,
        source,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_ids_are_assigned() {
    let rows = encode_docs(vec![
      Contact { id: String::new(), ..Default::default() },
      Contact { id: "keep".into(), case_number: Some("C1".into()), ..Default::default() },
    ])
    .unwrap();
    assert!(Uuid::parse_str(&rows[0].id).is_ok());
    assert_eq!(rows[1].id, "keep");
    assert_eq!(rows[1].case_number.as_deref(), Some("C1"));
  }

  #[test]
  fn corrupt_bodies_name_the_row() {
    let err = decode_docs::<Contact>(vec![("x1".into(), "{not json".into())]).unwrap_err();
    assert!(matches!(err, Error::CorruptRow { table: "contacts", ref id, .. } if id == "x1"));
  }
}

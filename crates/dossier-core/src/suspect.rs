//! Suspect profiles: the device owner's identity as gathered from one
//! extraction.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  credential::UserAccount,
  raw::null_as_default,
  search::{Query, Searchable, push_opt},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspectProfile {
  pub id:                 String,
  pub person_name:        String,
  pub case_number:        String,
  pub device_info:        Option<String>,
  pub suspect_phone:      Option<String>,
  /// Path of the owner's profile picture inside the extraction.
  pub profile_image_path: Option<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub emails:             Vec<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub user_accounts:      Vec<UserAccount>,
  pub created_at:         Option<DateTime<Utc>>,
  pub updated_at:         Option<DateTime<Utc>>,
}

impl Searchable for SuspectProfile {
  fn scalar_fields(&self) -> Vec<Cow<'_, str>> {
    let mut fields = vec![
      Cow::Borrowed(self.id.as_str()),
      Cow::Borrowed(self.person_name.as_str()),
      Cow::Borrowed(self.case_number.as_str()),
    ];
    push_opt(&mut fields, &self.device_info);
    push_opt(&mut fields, &self.suspect_phone);
    push_opt(&mut fields, &self.profile_image_path);
    fields
  }

  fn matches(&self, query: &Query) -> bool {
    if query.found_in_all(self.scalar_fields()) {
      return true;
    }
    if self.emails.iter().any(|e| query.found_in(e)) {
      return true;
    }
    self.user_accounts.iter().any(|account| {
      let parts = [
        &account.username,
        &account.email,
        &account.name,
        &account.source,
        &account.notes,
      ];
      query.found_in_all(parts.iter().filter_map(|p| p.as_deref()))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::search::search;

  fn profile() -> SuspectProfile {
    SuspectProfile {
      id: "s1".into(),
      person_name: "Andrei Ionescu".into(),
      case_number: "C-2024-17".into(),
      emails: vec!["andrei@example.ro".into()],
      user_accounts: vec![UserAccount {
        source: Some("Telegram".into()),
        username: Some("shadow_fox".into()),
        ..Default::default()
      }],
      ..Default::default()
    }
  }

  #[test]
  fn matches_scalars_emails_and_accounts() {
    let profiles = vec![profile()];
    assert_eq!(search("ionescu", &profiles).len(), 1);
    assert_eq!(search("example.ro", &profiles).len(), 1);
    assert_eq!(search("SHADOW", &profiles).len(), 1);
    assert_eq!(search("telegram", &profiles).len(), 1);
    assert!(search("whatsapp", &profiles).is_empty());
  }
}

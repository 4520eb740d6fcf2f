//! Distinct stored values per collection, used to seed filter dropdowns
//! before any facet computation has run.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  contact::Contact,
  credential::{Credential, UserAccount},
};

/// The collections that expose a filter seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
  Contacts,
  Passwords,
  UserAccounts,
}

impl DataType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Contacts => "contacts",
      Self::Passwords => "passwords",
      Self::UserAccounts => "user_accounts",
    }
  }
}

impl fmt::Display for DataType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for DataType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "contacts" => Ok(Self::Contacts),
      "passwords" => Ok(Self::Passwords),
      "user_accounts" => Ok(Self::UserAccounts),
      other => Err(Error::UnknownDataType(other.to_owned())),
    }
  }
}

/// Sorted distinct values per stored attribute. Lists that do not apply to
/// the collection are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableFilters {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sources:       Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub applications:  Option<Vec<String>>,
  #[serde(default)]
  pub categories:    Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email_domains: Option<Vec<String>>,
  #[serde(default)]
  pub devices:       Vec<String>,
  #[serde(default)]
  pub cases:         Vec<String>,
  #[serde(default)]
  pub suspects:      Vec<String>,
}

fn distinct<'a, T: 'a>(
  records: impl IntoIterator<Item = &'a T>,
  field: impl Fn(&'a T) -> Option<&'a String>,
) -> Vec<String> {
  records
    .into_iter()
    .filter_map(field)
    .filter(|v| !v.is_empty())
    .cloned()
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

pub fn contact_filters(contacts: &[Contact]) -> AvailableFilters {
  AvailableFilters {
    sources: Some(distinct(contacts, |c| c.source.as_ref())),
    applications: None,
    categories: distinct(contacts, |c| c.category.as_ref()),
    email_domains: None,
    devices: distinct(contacts, |c| c.device_info.as_ref()),
    cases: distinct(contacts, |c| c.case_number.as_ref()),
    suspects: distinct(contacts, |c| c.person_name.as_ref()),
  }
}

pub fn password_filters(passwords: &[Credential]) -> AvailableFilters {
  AvailableFilters {
    sources: None,
    applications: Some(distinct(passwords, |p| p.application.as_ref())),
    categories: distinct(passwords, |p| p.category.as_ref()),
    email_domains: Some(distinct(passwords, |p| p.email_domain.as_ref())),
    devices: distinct(passwords, |p| p.device_info.as_ref()),
    cases: distinct(passwords, |p| p.case_number.as_ref()),
    suspects: distinct(passwords, |p| p.person_name.as_ref()),
  }
}

pub fn user_account_filters(accounts: &[UserAccount]) -> AvailableFilters {
  AvailableFilters {
    sources: Some(distinct(accounts, |a| a.source.as_ref())),
    applications: None,
    categories: distinct(accounts, |a| a.category.as_ref()),
    email_domains: Some(distinct(accounts, |a| a.email_domain.as_ref())),
    devices: distinct(accounts, |a| a.device_info.as_ref()),
    cases: distinct(accounts, |a| a.case_number.as_ref()),
    suspects: distinct(accounts, |a| a.person_name.as_ref()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_data_types() {
    assert_eq!("user_accounts".parse::<DataType>().unwrap(), DataType::UserAccounts);
    assert!(matches!("groups".parse::<DataType>(), Err(Error::UnknownDataType(_))));
  }

  #[test]
  fn values_are_distinct_sorted_and_non_empty() {
    let contacts = vec![
      Contact { source: Some("WhatsApp".into()), ..Default::default() },
      Contact { source: Some("".into()), ..Default::default() },
      Contact { source: Some("Agenda".into()), ..Default::default() },
      Contact { source: Some("WhatsApp".into()), ..Default::default() },
      Contact::default(),
    ];
    let seed = contact_filters(&contacts);
    assert_eq!(seed.sources.unwrap(), ["Agenda", "WhatsApp"]);
    assert!(seed.applications.is_none());
    assert!(seed.devices.is_empty());
  }

  #[test]
  fn json_omits_lists_foreign_to_the_collection() {
    let json = serde_json::to_value(password_filters(&[])).unwrap();
    assert!(json.get("applications").is_some());
    assert!(json.get("sources").is_none());
  }
}

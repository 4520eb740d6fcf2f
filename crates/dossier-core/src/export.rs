//! Credential export: a password wordlist or a full CSV report.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  credential::{Credential, UserAccount},
  selection::{ALL, Facet, FilterSelection},
  text::email_domain,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
  /// Sorted unique passwords, one per line.
  Wordlist,
  /// Every matching password and account as CSV.
  #[default]
  Full,
}

impl FromStr for ExportType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "wordlist" => Ok(Self::Wordlist),
      "full" => Ok(Self::Full),
      other => Err(Error::UnknownExportType(other.to_owned())),
    }
  }
}

impl fmt::Display for ExportType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Wordlist => "wordlist",
      Self::Full => "full",
    })
  }
}

/// Which credentials to export. Absent or `"all"` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportRequest {
  pub export_type:  ExportType,
  pub case_number:  Option<String>,
  /// Matched against category, service type and the raw `Type` field.
  pub category:     Option<String>,
  /// Matched against a password's application, or an account's source or
  /// service identifier.
  pub application:  Option<String>,
  pub email_domain: Option<String>,
  pub device:       Option<String>,
  pub person_name:  Option<String>,
}

impl ExportRequest {
  /// The request matching a credential filter selection.
  pub fn from_selection(export_type: ExportType, selection: &FilterSelection) -> Self {
    let get = |facet| selection.get(facet).map(str::to_owned);
    Self {
      export_type,
      case_number: get(Facet::Case),
      category: get(Facet::Type),
      application: get(Facet::Service),
      email_domain: get(Facet::EmailDomain),
      device: get(Facet::Device),
      person_name: get(Facet::Suspect),
    }
  }
}

/// A rendered export, ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
  pub filename:   String,
  pub media_type: &'static str,
  pub body:       Vec<u8>,
}

/// The constraint carried by an optional request field.
fn wanted(field: &Option<String>) -> Option<&str> {
  field.as_deref().filter(|v| !v.is_empty() && *v != ALL)
}

fn equals(value: &Option<String>, want: Option<&str>) -> bool {
  want.is_none_or(|w| value.as_deref() == Some(w))
}

/// The stored domain, else the domain of the first address-looking login.
fn domain_of(stored: &Option<String>, logins: [&Option<String>; 2]) -> Option<String> {
  stored
    .clone()
    .filter(|d| !d.is_empty())
    .or_else(|| logins.iter().find_map(|l| l.as_deref().and_then(email_domain)))
}

struct Common<'a> {
  case:         &'a Option<String>,
  device:       &'a Option<String>,
  person:       &'a Option<String>,
  email_domain: Option<String>,
  category:     [Option<&'a str>; 3],
}

impl ExportRequest {
  fn accepts_common(&self, r: Common<'_>) -> bool {
    equals(r.case, wanted(&self.case_number))
      && equals(r.device, wanted(&self.device))
      && equals(r.person, wanted(&self.person_name))
      && equals(&r.email_domain, wanted(&self.email_domain))
      && wanted(&self.category).is_none_or(|c| r.category.contains(&Some(c)))
  }

  fn accepts_password(&self, p: &Credential) -> bool {
    self.accepts_common(Common {
      case:         &p.case_number,
      device:       &p.device_info,
      person:       &p.person_name,
      email_domain: domain_of(&p.email_domain, [&p.email, &p.username]),
      category:     [
        p.category.as_deref(),
        p.service_type.as_deref(),
        p.raw_data.field("Type"),
      ],
    }) && equals(&p.application, wanted(&self.application))
  }

  fn accepts_account(&self, a: &UserAccount) -> bool {
    self.accepts_common(Common {
      case:         &a.case_number,
      device:       &a.device_info,
      person:       &a.person_name,
      email_domain: domain_of(&a.email_domain, [&a.email, &a.username]),
      category:     [
        a.category.as_deref(),
        a.service_type.as_deref(),
        a.raw_data.field("Type"),
      ],
    }) && wanted(&self.application).is_none_or(|app| {
      a.source.as_deref() == Some(app) || a.service_identifier.as_deref() == Some(app)
    })
  }
}

const CSV_HEADER: [&str; 12] = [
  "Type",
  "Case Number",
  "Suspect",
  "Device",
  "Source/App",
  "Username/Email",
  "Password/Data",
  "Category",
  "Service Type",
  "Description/Notes",
  "URL",
  "Created At",
];

/// Render the export described by `request`. `today` dates the CSV file
/// name.
pub fn render_export(
  request: &ExportRequest,
  passwords: &[Credential],
  accounts: &[UserAccount],
  today: NaiveDate,
) -> Result<ExportFile> {
  let passwords: Vec<&Credential> =
    passwords.iter().filter(|p| request.accepts_password(p)).collect();

  match request.export_type {
    ExportType::Wordlist => Ok(ExportFile {
      filename:   "wordlist.txt".to_owned(),
      media_type: "text/plain",
      body:       wordlist(&passwords).into_bytes(),
    }),
    ExportType::Full => {
      let accounts: Vec<&UserAccount> =
        accounts.iter().filter(|a| request.accepts_account(a)).collect();
      Ok(ExportFile {
        filename:   format!("credentials_export_{}.csv", today.format("%Y%m%d")),
        media_type: "text/csv",
        body:       full_csv(&passwords, &accounts)?,
      })
    }
  }
}

fn wordlist(passwords: &[&Credential]) -> String {
  let unique: std::collections::BTreeSet<&str> = passwords
    .iter()
    .filter_map(|p| p.password.as_deref())
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect();
  unique.into_iter().map(|p| format!("{p}\n")).collect()
}

fn opt(value: &Option<String>) -> &str { value.as_deref().unwrap_or_default() }

fn timestamp(at: Option<DateTime<Utc>>) -> String {
  at.map(|t| t.to_rfc3339()).unwrap_or_default()
}

/// `username (email)` when both are present and differ.
fn account_user(a: &UserAccount) -> String {
  let username = opt(&a.username);
  match a.email.as_deref().filter(|e| !e.is_empty() && *e != username) {
    Some(email) if username.is_empty() => email.to_owned(),
    Some(email) => format!("{username} ({email})"),
    None => username.to_owned(),
  }
}

fn full_csv(passwords: &[&Credential], accounts: &[&UserAccount]) -> Result<Vec<u8>> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(CSV_HEADER)?;

  for p in passwords {
    writer.write_record([
      "Password",
      opt(&p.case_number),
      opt(&p.person_name),
      opt(&p.device_info),
      opt(&p.application),
      opt(&p.username),
      opt(&p.password),
      opt(&p.category),
      "-",
      opt(&p.description),
      opt(&p.url),
      timestamp(p.created_at).as_str(),
    ])?;
  }

  for a in accounts {
    let service_type = a
      .service_type
      .as_deref()
      .filter(|s| !s.is_empty())
      .or_else(|| a.raw_data.field("Type"))
      .unwrap_or_default();
    writer.write_record([
      "Account",
      opt(&a.case_number),
      opt(&a.person_name),
      opt(&a.device_info),
      opt(&a.source),
      account_user(a).as_str(),
      opt(&a.user_id),
      opt(&a.category),
      service_type,
      opt(&a.notes),
      opt(&a.service_identifier),
      timestamp(a.created_at).as_str(),
    ])?;
  }

  writer.flush()?;
  writer
    .into_inner()
    .map_err(|e| Error::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::raw::RawData;

  fn pwd(password: &str, app: &str, case: &str) -> Credential {
    Credential {
      id: format!("{password}-{app}"),
      password: Some(password.into()),
      application: Some(app.into()),
      username: Some("ion".into()),
      case_number: Some(case.into()),
      category: Some("Email".into()),
      ..Default::default()
    }
  }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, 9).unwrap() }

  fn body(file: &ExportFile) -> &str { std::str::from_utf8(&file.body).unwrap() }

  #[test]
  fn wordlist_is_sorted_unique_and_trimmed() {
    let passwords = vec![
      pwd("zeta", "Gmail", "C1"),
      pwd(" alpha ", "Yahoo", "C1"),
      pwd("zeta", "Yahoo", "C1"),
      pwd("   ", "Yahoo", "C1"),
    ];
    let req = ExportRequest { export_type: ExportType::Wordlist, ..Default::default() };
    let file = render_export(&req, &passwords, &[], today()).unwrap();
    assert_eq!(file.filename, "wordlist.txt");
    assert_eq!(file.media_type, "text/plain");
    assert_eq!(body(&file), "alpha\nzeta\n");
  }

  #[test]
  fn all_means_unconstrained() {
    let passwords = vec![pwd("a1", "Gmail", "C1"), pwd("b2", "Gmail", "C2")];
    let req = ExportRequest {
      export_type: ExportType::Wordlist,
      case_number: Some("all".into()),
      application: Some("Gmail".into()),
      ..Default::default()
    };
    let file = render_export(&req, &passwords, &[], today()).unwrap();
    assert_eq!(body(&file), "a1\nb2\n");
  }

  #[test]
  fn full_csv_lists_passwords_then_accounts() {
    let passwords = vec![pwd("s3cret", "Gmail", "C1"), pwd("other", "Gmail", "C2")];
    let accounts = vec![UserAccount {
      source: Some("Gmail".into()),
      username: Some("ion".into()),
      email: Some("ion@gmail.com".into()),
      user_id: Some("1234".into()),
      case_number: Some("C1".into()),
      raw_data: RawData::with_fields([("Type", "Default")]),
      ..Default::default()
    }];
    let req = ExportRequest { case_number: Some("C1".into()), ..Default::default() };

    let file = render_export(&req, &passwords, &accounts, today()).unwrap();
    assert_eq!(file.filename, "credentials_export_20240309.csv");
    assert_eq!(file.media_type, "text/csv");

    let text = body(&file);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Type,Case Number,Suspect,Device,Source/App"));
    assert_eq!(lines[1], "Password,C1,,,Gmail,ion,s3cret,Email,-,,,");
    assert_eq!(lines[2], "Account,C1,,,Gmail,ion (ion@gmail.com),1234,,Default,,,");
  }

  #[test]
  fn category_matches_service_type_and_raw_type() {
    let accounts = vec![
      UserAccount { id: "1".into(), service_type: Some("Key".into()), ..Default::default() },
      UserAccount {
        id: "2".into(),
        raw_data: RawData::with_fields([("Type", "Key")]),
        ..Default::default()
      },
      UserAccount { id: "3".into(), category: Some("Social".into()), ..Default::default() },
    ];
    let req = ExportRequest { category: Some("Key".into()), ..Default::default() };
    let file = render_export(&req, &[], &accounts, today()).unwrap();
    assert_eq!(body(&file).lines().count(), 3);
  }

  #[test]
  fn email_domain_falls_back_to_the_login() {
    let mut stored = pwd("one", "Gmail", "C1");
    stored.email_domain = Some("yahoo.com".into());
    let mut derived = pwd("two", "Gmail", "C1");
    derived.username = Some("Ion@Gmail.com".into());
    let bare = pwd("three", "Gmail", "C1");

    let req = ExportRequest {
      export_type: ExportType::Wordlist,
      email_domain: Some("gmail.com".into()),
      ..Default::default()
    };
    let file = render_export(&req, &[stored, derived, bare], &[], today()).unwrap();
    assert_eq!(body(&file), "two\n");
  }

  #[test]
  fn request_from_selection_maps_facets() {
    let sel = FilterSelection::new()
      .with(Facet::Service, "Gmail")
      .with(Facet::Type, "Default")
      .with(Facet::Suspect, "Ion");
    let req = ExportRequest::from_selection(ExportType::Full, &sel);
    assert_eq!(req.application.as_deref(), Some("Gmail"));
    assert_eq!(req.category.as_deref(), Some("Default"));
    assert_eq!(req.person_name.as_deref(), Some("Ion"));
    assert_eq!(req.case_number, None);
  }

  #[test]
  fn export_type_parsing() {
    assert_eq!("wordlist".parse::<ExportType>().unwrap(), ExportType::Wordlist);
    assert!(matches!("pdf".parse::<ExportType>(), Err(Error::UnknownExportType(_))));
  }
}

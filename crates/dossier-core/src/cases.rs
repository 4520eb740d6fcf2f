//! Case-level summaries: who owns each extraction, which photos are shared
//! between contacts, and what every upload session holds.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  contact::Contact,
  credential::{Credential, UserAccount},
  suspect::SuspectProfile,
  text::phones_match,
};

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.is_empty())
}

// ─── Suspect info ────────────────────────────────────────────────────────────

/// The device owner of one case, as seen from its contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspectInfo {
  pub case_number:        String,
  pub person_name:        Option<String>,
  pub device_info:        Option<String>,
  pub suspect_phone:      String,
  pub suspect_photo_path: Option<String>,
}

/// One entry per case whose contacts record the owner's phone, in order of
/// first appearance. The owner's photo is the one on the last contact whose
/// own number matches the owner's.
pub fn suspect_info(contacts: &[Contact]) -> Vec<SuspectInfo> {
  let mut out: Vec<SuspectInfo> = Vec::new();
  let mut index: HashMap<&str, usize> = HashMap::new();

  for c in contacts {
    let (Some(case), Some(owner)) = (non_empty(&c.case_number), non_empty(&c.suspect_phone))
    else {
      continue;
    };
    let at = *index.entry(case).or_insert_with(|| {
      out.push(SuspectInfo {
        case_number:        case.to_owned(),
        person_name:        c.person_name.clone(),
        device_info:        c.device_info.clone(),
        suspect_phone:      owner.to_owned(),
        suspect_photo_path: None,
      });
      out.len() - 1
    });

    if let (Some(phone), Some(photo)) = (non_empty(&c.phone), non_empty(&c.photo_path))
      && phones_match(phone, owner)
    {
      out[at].suspect_photo_path = Some(photo.to_owned());
    }
  }
  out
}

// ─── Photos ──────────────────────────────────────────────────────────────────

/// The identifying fields of a contact inside a [`PhotoGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoContact {
  pub id:      String,
  pub name:    Option<String>,
  pub phone:   Option<String>,
  pub source:  Option<String>,
  pub user_id: Option<String>,
}

impl From<&Contact> for PhotoContact {
  fn from(c: &Contact) -> Self {
    Self {
      id:      c.id.clone(),
      name:    c.name.clone(),
      phone:   c.phone.clone(),
      source:  c.source.clone(),
      user_id: c.user_id.clone(),
    }
  }
}

/// Every contact of a case showing the same picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoGroup {
  pub photo_path:              String,
  pub contacts:                Vec<PhotoContact>,
  pub suspect_phone:           Option<String>,
  /// Whether one of the contacts carries the owner's own number.
  pub contains_suspect_number: bool,
}

/// Contacts of `case_number` grouped by photo, most shared photo first.
/// Groups of equal size keep the order in which their photo was first seen.
pub fn contacts_by_photo(case_number: &str, contacts: &[Contact]) -> Vec<PhotoGroup> {
  let in_case: Vec<&Contact> = contacts
    .iter()
    .filter(|c| c.case_number.as_deref() == Some(case_number))
    .filter(|c| non_empty(&c.photo_path).is_some())
    .collect();
  let owner = in_case.iter().copied().find_map(|c| non_empty(&c.suspect_phone));

  let mut groups: Vec<PhotoGroup> = Vec::new();
  let mut index: HashMap<&str, usize> = HashMap::new();
  for c in in_case {
    let Some(photo) = non_empty(&c.photo_path) else { continue };
    let at = *index.entry(photo).or_insert_with(|| {
      groups.push(PhotoGroup {
        photo_path:              photo.to_owned(),
        contacts:                Vec::new(),
        suspect_phone:           owner.map(str::to_owned),
        contains_suspect_number: false,
      });
      groups.len() - 1
    });

    let group = &mut groups[at];
    if let (Some(owner), Some(phone)) = (owner, non_empty(&c.phone))
      && phones_match(phone, owner)
    {
      group.contains_suspect_number = true;
    }
    group.contacts.push(PhotoContact::from(c));
  }

  groups.sort_by(|a, b| b.contacts.len().cmp(&a.contacts.len()));
  groups
}

// ─── Upload sessions ─────────────────────────────────────────────────────────

/// Record counts shared by sessions and case totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
  pub contacts:      usize,
  pub passwords:     usize,
  pub user_accounts: usize,
  pub total:         usize,
}

impl RecordCounts {
  fn add(&mut self, other: RecordCounts) {
    self.contacts += other.contacts;
    self.passwords += other.passwords;
    self.user_accounts += other.user_accounts;
    self.total += other.total;
  }
}

/// One upload: a suspect profile and the records sharing its case, person
/// and device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
  pub session_id:  String,
  pub profile_id:  String,
  pub person_name: String,
  pub device_info: Option<String>,
  #[serde(flatten)]
  pub counts:      RecordCounts,
  pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
  pub case_number: String,
  pub sessions:    Vec<SessionSummary>,
  pub totals:      RecordCounts,
}

/// The key tying records to an upload session. Empty and absent values are
/// the same.
type SessionKey<'a> = (&'a str, Option<&'a str>, Option<&'a str>);

fn session_key<'a>(
  case: &'a Option<String>,
  person: &'a Option<String>,
  device: &'a Option<String>,
) -> SessionKey<'a> {
  (non_empty(case).unwrap_or_default(), non_empty(person), non_empty(device))
}

/// Every case with a suspect profile, sorted by case number. Sessions keep
/// profile order; profiles without a case are skipped.
pub fn case_summaries(
  profiles: &[SuspectProfile],
  contacts: &[Contact],
  passwords: &[Credential],
  accounts: &[UserAccount],
) -> Vec<CaseSummary> {
  let mut counts: HashMap<SessionKey<'_>, RecordCounts> = HashMap::new();
  for c in contacts {
    let key = session_key(&c.case_number, &c.person_name, &c.device_info);
    counts.entry(key).or_default().contacts += 1;
  }
  for p in passwords {
    let key = session_key(&p.case_number, &p.person_name, &p.device_info);
    counts.entry(key).or_default().passwords += 1;
  }
  for a in accounts {
    let key = session_key(&a.case_number, &a.person_name, &a.device_info);
    counts.entry(key).or_default().user_accounts += 1;
  }

  let mut cases: BTreeMap<&str, Vec<SessionSummary>> = BTreeMap::new();
  for profile in profiles.iter().filter(|p| !p.case_number.is_empty()) {
    let person = Some(profile.person_name.as_str()).filter(|p| !p.is_empty());
    let device = non_empty(&profile.device_info);
    let mut found = counts
      .get(&(profile.case_number.as_str(), person, device))
      .copied()
      .unwrap_or_default();
    found.total = found.contacts + found.passwords + found.user_accounts;

    let uploaded = profile.created_at.map(|t| t.to_rfc3339()).unwrap_or_default();
    cases.entry(profile.case_number.as_str()).or_default().push(SessionSummary {
      session_id:  format!(
        "{}_{}_{}_{uploaded}",
        profile.case_number,
        profile.person_name,
        device.unwrap_or_default(),
      ),
      profile_id:  profile.id.clone(),
      person_name: profile.person_name.clone(),
      device_info: profile.device_info.clone(),
      counts:      found,
      uploaded_at: profile.created_at,
    });
  }

  cases
    .into_iter()
    .map(|(case, sessions)| {
      let mut totals = RecordCounts::default();
      for s in &sessions {
        totals.add(s.counts);
      }
      CaseSummary { case_number: case.to_owned(), sessions, totals }
    })
    .collect()
}

//! WhatsApp groups reconstructed from contacts' "groups in common" entries.

use std::{
  borrow::Cow,
  collections::{BTreeSet, HashMap},
};

use serde::{Deserialize, Serialize};

use crate::{
  contact::Contact,
  search::{Query, Searchable, push_opt},
  text::normalize_phone,
};

/// Suffix of a WhatsApp group JID.
const GROUP_JID_MARKER: &str = "@g.us";

/// A group id and display name parsed from one raw membership entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
  pub group_id:   String,
  pub group_name: String,
}

impl GroupRef {
  /// Parse `"<jid>@g.us <name>"`. The name defaults to the id; entries that
  /// are not group JIDs yield `None`.
  pub fn parse(entry: &str) -> Option<Self> {
    if !entry.contains(GROUP_JID_MARKER) {
      return None;
    }
    let (id, name) = entry.split_once(' ').unwrap_or((entry, entry));
    Some(Self { group_id: id.to_owned(), group_name: name.to_owned() })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppMember {
  pub id:           String,
  pub name:         Option<String>,
  pub phone:        Option<String>,
  pub user_id:      Option<String>,
  pub photo_path:   Option<String>,
  pub case_number:  Option<String>,
  /// Suspect on whose device the membership was seen.
  pub person_name:  Option<String>,
  pub device_info:  Option<String>,
  /// How many contact records collapsed into this member.
  pub source_count: usize,
}

impl WhatsAppMember {
  fn from_contact(contact: &Contact) -> Self {
    Self {
      id:           contact.id.clone(),
      name:         contact.name.clone(),
      phone:        contact.phone.clone(),
      user_id:      contact.user_id.clone(),
      photo_path:   contact.photo_path.clone(),
      case_number:  contact.case_number.clone(),
      person_name:  contact.person_name.clone(),
      device_info:  contact.device_info.clone(),
      source_count: 0,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppGroup {
  pub group_id:     String,
  pub group_name:   String,
  pub members:      Vec<WhatsAppMember>,
  pub member_count: usize,
  /// Sorted case numbers of the contributing contacts.
  pub cases:        Vec<String>,
  /// Sorted devices of the contributing contacts.
  pub devices:      Vec<String>,
}

impl Searchable for WhatsAppGroup {
  fn scalar_fields(&self) -> Vec<Cow<'_, str>> {
    vec![
      Cow::Borrowed(self.group_id.as_str()),
      Cow::Borrowed(self.group_name.as_str()),
      Cow::Owned(self.member_count.to_string()),
    ]
  }

  fn matches(&self, query: &Query) -> bool {
    if query.found_in(&self.group_name) {
      return true;
    }
    let member_hit = self.members.iter().any(|m| {
      let mut fields = Vec::new();
      push_opt(&mut fields, &m.name);
      push_opt(&mut fields, &m.phone);
      push_opt(&mut fields, &m.person_name);
      fields.iter().any(|f| query.found_in(f))
    });
    member_hit || query.found_in_all(self.scalar_fields())
  }
}

/// Key under which a contact counts as one member of a group.
fn member_key(contact: &Contact) -> String {
  if let Some(user_id) = contact.user_id.as_deref().filter(|u| !u.is_empty()) {
    return user_id.to_owned();
  }
  match contact.phone.as_deref().filter(|p| !p.is_empty()) {
    Some(phone) => format!("phone_{}", normalize_phone(phone)),
    None => format!(
      "no_id_{}_{}",
      contact.name.as_deref().unwrap_or_default(),
      contact.device_info.as_deref().unwrap_or_default(),
    ),
  }
}

#[derive(Default)]
struct GroupBuilder {
  group_name:  String,
  member_keys: Vec<String>,
  members:     HashMap<String, WhatsAppMember>,
  cases:       BTreeSet<String>,
  devices:     BTreeSet<String>,
}

/// Build every group mentioned by `contacts`, largest first.
pub fn build_groups(contacts: &[Contact]) -> Vec<WhatsAppGroup> {
  let mut order: Vec<String> = Vec::new();
  let mut builders: HashMap<String, GroupBuilder> = HashMap::new();

  for contact in contacts {
    for group in contact.whatsapp_groups.iter().filter_map(|e| GroupRef::parse(e)) {
      let builder = builders.entry(group.group_id.clone()).or_insert_with(|| {
        order.push(group.group_id.clone());
        GroupBuilder { group_name: group.group_name.clone(), ..Default::default() }
      });

      let key = member_key(contact);
      if !builder.members.contains_key(&key) {
        builder.member_keys.push(key.clone());
      }
      builder
        .members
        .entry(key)
        .or_insert_with(|| WhatsAppMember::from_contact(contact))
        .source_count += 1;

      if let Some(case) = contact.case_number.as_deref().filter(|c| !c.is_empty()) {
        builder.cases.insert(case.to_owned());
      }
      if let Some(device) = contact.device_info.as_deref().filter(|d| !d.is_empty()) {
        builder.devices.insert(device.to_owned());
      }
    }
  }

  let mut groups: Vec<WhatsAppGroup> = order
    .into_iter()
    .filter_map(|group_id| {
      let mut b = builders.remove(&group_id)?;
      let members: Vec<WhatsAppMember> = b
        .member_keys
        .iter()
        .filter_map(|k| b.members.remove(k))
        .collect();
      Some(WhatsAppGroup {
        group_id,
        group_name: b.group_name,
        member_count: members.len(),
        members,
        cases: b.cases.into_iter().collect(),
        devices: b.devices.into_iter().collect(),
      })
    })
    .collect();
  groups.sort_by(|a, b| b.member_count.cmp(&a.member_count));
  groups
}

/// Every contact record that lists `group_id` among its groups.
pub fn group_members<'a>(group_id: &str, contacts: &'a [Contact]) -> Vec<&'a Contact> {
  contacts
    .iter()
    .filter(|c| {
      c.whatsapp_groups
        .iter()
        .filter_map(|e| GroupRef::parse(e))
        .any(|g| g.group_id == group_id)
    })
    .collect()
}

// ─── Scoping and filtering ───────────────────────────────────────────────────

/// Groups seen in `case`; every group when `case` is `None`.
pub fn scope_to_case<'a, I>(groups: I, case: Option<&str>) -> Vec<&'a WhatsAppGroup>
where
  I: IntoIterator<Item = &'a WhatsAppGroup>,
{
  groups
    .into_iter()
    .filter(|g| case.is_none_or(|c| g.cases.iter().any(|gc| gc == c)))
    .collect()
}

/// Dropdown options for the group list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOptions {
  pub devices:  Vec<String>,
  pub suspects: Vec<String>,
  pub cases:    Vec<String>,
}

/// Options computed from the (already scoped) group list.
pub fn group_options(groups: &[&WhatsAppGroup]) -> GroupOptions {
  let mut devices = BTreeSet::new();
  let mut suspects = BTreeSet::new();
  let mut cases = BTreeSet::new();
  for group in groups {
    devices.extend(group.devices.iter().cloned());
    cases.extend(group.cases.iter().cloned());
    suspects.extend(
      group
        .members
        .iter()
        .filter_map(|m| m.person_name.clone())
        .filter(|p| !p.is_empty()),
    );
  }
  GroupOptions {
    devices:  devices.into_iter().collect(),
    suspects: suspects.into_iter().collect(),
    cases:    cases.into_iter().collect(),
  }
}

/// Active selections for the group list; `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFilter {
  pub device:  Option<String>,
  pub suspect: Option<String>,
  pub case:    Option<String>,
}

impl GroupFilter {
  fn accepts(&self, group: &WhatsAppGroup) -> bool {
    let device_ok = self.device.as_ref().is_none_or(|d| group.devices.contains(d));
    let case_ok = self.case.as_ref().is_none_or(|c| group.cases.contains(c));
    let suspect_ok = self.suspect.as_deref().is_none_or(|s| {
      group.members.iter().any(|m| m.person_name.as_deref() == Some(s))
    });
    device_ok && case_ok && suspect_ok
  }
}

/// Groups accepted by `filter`, in input order.
pub fn filter_groups<'a>(groups: &[&'a WhatsAppGroup], filter: &GroupFilter) -> Vec<&'a WhatsAppGroup> {
  groups.iter().copied().filter(|g| filter.accepts(g)).collect()
}

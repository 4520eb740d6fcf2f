//! Per-collection view pipelines: search, then case scope, then facets, then
//! filters.
//!
//! Facet options are always computed from the searched and case-scoped set,
//! never from the filtered one, so every dropdown keeps offering the values
//! that would still produce results.

use crate::{
  contact::Contact,
  facets::{Facets, compute_facets},
  filter::apply_filters,
  resolve::{Record, resolve},
  reuse::{PasswordGroup, aggregate},
  search::{Searchable, search},
  selection::{ALL, Facet, FilterSelection},
  suspect::SuspectProfile,
  text::normalize,
  whatsapp::{GroupFilter, GroupOptions, WhatsAppGroup, filter_groups, group_options, scope_to_case},
};

/// The records to display together with the dropdown options that led to
/// them.
#[derive(Debug)]
pub struct View<'a, R> {
  pub records: Vec<&'a R>,
  pub facets:  Facets,
  /// Records left after search and case scope, before filtering.
  pub scoped:  usize,
}

/// `None` for an absent, blank or `"all"` case selection.
fn active_case(case: Option<&str>) -> Option<&str> {
  case.map(str::trim).filter(|c| !c.is_empty() && *c != ALL)
}

impl<'a, R: Record + Searchable> View<'a, R> {
  pub fn build(
    records: &'a [R],
    query: &str,
    case: Option<&str>,
    selection: &FilterSelection,
  ) -> Self {
    let mut scoped = search(query, records);
    if let Some(case) = active_case(case) {
      scoped.retain(|r| resolve(*r, Facet::Case) == Some(case));
    }
    let facets = compute_facets(&scoped, selection);
    let records = apply_filters(scoped.iter().copied(), selection);
    Self { scoped: scoped.len(), records, facets }
  }
}

/// The contact list view, sorted by folded name.
pub fn contacts_view<'a>(
  contacts: &'a [Contact],
  query: &str,
  case: Option<&str>,
  selection: &FilterSelection,
) -> View<'a, Contact> {
  let mut view = View::build(contacts, query, case, selection);
  view.records.sort_by_cached_key(|c| normalize(c.name_or_empty()));
  view
}

/// Password-reuse groups narrowed by the credential selection.
pub fn password_view(groups: &[PasswordGroup], selection: &FilterSelection) -> Vec<PasswordGroup> {
  aggregate(groups, selection)
}

pub fn suspect_view<'a>(
  profiles: &'a [SuspectProfile],
  query: &str,
  case: Option<&str>,
) -> Vec<&'a SuspectProfile> {
  let mut hits = search(query, profiles);
  if let Some(case) = active_case(case) {
    hits.retain(|p| p.case_number == case);
  }
  hits
}

#[derive(Debug)]
pub struct GroupsView<'a> {
  pub groups:  Vec<&'a WhatsAppGroup>,
  pub options: GroupOptions,
}

pub fn whatsapp_view<'a>(
  groups: &'a [WhatsAppGroup],
  query: &str,
  case: Option<&str>,
  filter: &GroupFilter,
) -> GroupsView<'a> {
  let scoped = scope_to_case(search(query, groups), active_case(case));
  GroupsView {
    options: group_options(&scoped),
    groups:  filter_groups(&scoped, filter),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::credential::Credential;

  fn cred(id: &str, app: &str, case: &str, device: &str) -> Credential {
    Credential {
      id: id.into(),
      application: Some(app.into()),
      case_number: Some(case.into()),
      device_info: Some(device.into()),
      ..Default::default()
    }
  }

  #[test]
  fn facets_come_from_the_scoped_set() {
    let records = vec![
      cred("1", "Gmail", "C1", "Pixel"),
      cred("2", "Facebook", "C1", "iPhone"),
      cred("3", "Yahoo", "C2", "Pixel"),
    ];
    let sel = FilterSelection::new().with(Facet::Device, "Pixel");
    let view = View::build(&records, "", Some("C1"), &sel);

    assert_eq!(view.scoped, 2);
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.records[0].id, "1");
    // Yahoo is out of case; Facebook is hidden by the device choice.
    assert_eq!(view.facets[&Facet::Application].values, ["Gmail"]);
    // The device facet still offers both devices within the case.
    assert_eq!(view.facets[&Facet::Device].values, ["Pixel", "iPhone"]);
  }

  #[test]
  fn all_case_is_unscoped() {
    let records = vec![cred("1", "Gmail", "C1", "Pixel"), cred("2", "Yahoo", "C2", "Pixel")];
    let view = View::build(&records, "", Some("all"), &FilterSelection::new());
    assert_eq!(view.records.len(), 2);
  }

  #[test]
  fn search_runs_before_faceting() {
    let records = vec![cred("1", "Gmail", "C1", "Pixel"), cred("2", "Yahoo", "C1", "iPhone")];
    let view = View::build(&records, "yahoo", None, &FilterSelection::new());
    assert_eq!(view.facets[&Facet::Device].values, ["iPhone"]);
  }

  #[test]
  fn contacts_sort_by_name() {
    let contacts = vec![
      Contact { id: "1".into(), name: Some("zoe".into()), ..Default::default() },
      Contact { id: "2".into(), name: Some("Ana".into()), ..Default::default() },
      Contact { id: "3".into(), ..Default::default() },
    ];
    let view = contacts_view(&contacts, "", None, &FilterSelection::new());
    let ids: Vec<_> = view.records.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["3", "2", "1"]);
  }

  #[test]
  fn accented_names_sort_with_their_base_letter() {
    let contacts = vec![
      Contact { id: "z".into(), name: Some("Zoe".into()), ..Default::default() },
      Contact { id: "s".into(), name: Some("Șerban".into()), ..Default::default() },
      Contact { id: "a".into(), name: Some("Ana".into()), ..Default::default() },
    ];
    let view = contacts_view(&contacts, "", None, &FilterSelection::new());
    let ids: Vec<_> = view.records.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["a", "s", "z"]);
  }

  #[test]
  fn suspects_scope_by_case() {
    let profiles = vec![
      SuspectProfile { person_name: "A".into(), case_number: "C1".into(), ..Default::default() },
      SuspectProfile { person_name: "B".into(), case_number: "C2".into(), ..Default::default() },
    ];
    let hits = suspect_view(&profiles, "", Some("C2"));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].person_name, "B");
  }
}

//! The filter predicate: keep the records whose resolved value equals every
//! active selection entry.

use crate::{
  resolve::{Attr, Record, resolve},
  selection::{Facet, FilterSelection},
};

/// Whether `record` satisfies every active entry of `selection`.
pub fn matches<R: Record>(record: &R, selection: &FilterSelection) -> bool {
  matches_except(record, selection, None)
}

/// [`matches`], ignoring the entry for `excluded` if any. This is the
/// cascading step of facet computation.
pub fn matches_except<R: Record>(
  record: &R,
  selection: &FilterSelection,
  excluded: Option<Facet>,
) -> bool {
  selection
    .active()
    .filter(|(facet, _)| Some(*facet) != excluded)
    .filter(|(facet, _)| R::KIND.defines(*facet))
    .all(|(facet, wanted)| entry_matches(record, facet, wanted))
}

fn entry_matches<R: Record>(record: &R, facet: Facet, wanted: &str) -> bool {
  match facet {
    Facet::HasName => presence_matches(record.attr(Attr::Name), wanted),
    Facet::HasPhoto => presence_matches(record.attr(Attr::PhotoPath), wanted),
    _ => resolve(record, facet) == Some(wanted),
  }
}

/// `yes` wants a non-blank value, `no` wants a blank or absent one. Any
/// other selection matches nothing.
fn presence_matches(value: Option<&str>, wanted: &str) -> bool {
  let present = value.is_some_and(|v| !v.trim().is_empty());
  match wanted {
    "yes" => present,
    "no" => !present,
    _ => false,
  }
}

/// The records matching `selection`, in input order.
pub fn apply_filters<'a, R, I>(records: I, selection: &FilterSelection) -> Vec<&'a R>
where
  R: Record + 'a,
  I: IntoIterator<Item = &'a R>,
{
  records
    .into_iter()
    .filter(|r| matches(*r, selection))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{contact::Contact, credential::Credential, raw::RawData};

  fn cred(app: &str, device: &str, raw_source: Option<&str>) -> Credential {
    Credential {
      id: format!("{app}-{device}"),
      application: Some(app.into()),
      device_info: Some(device.into()),
      raw_data: raw_source
        .map(|s| RawData::with_fields([("Source", s)]))
        .unwrap_or_default(),
      ..Default::default()
    }
  }

  fn creds() -> Vec<Credential> {
    vec![
      cred("Gmail", "Pixel", None),
      cred("Facebook", "Pixel", None),
      cred("Gmail", "iPhone", None),
      cred("", "iPhone", Some("Chrome")),
    ]
  }

  #[test]
  fn entries_are_anded() {
    let all = creds();
    let sel = FilterSelection::new()
      .with(Facet::Application, "Gmail")
      .with(Facet::Device, "Pixel");
    let hits = apply_filters(&all, &sel);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "Gmail-Pixel");
  }

  #[test]
  fn equality_is_exact_and_case_sensitive() {
    let all = creds();
    let sel = FilterSelection::new().with(Facet::Application, "gmail");
    assert!(apply_filters(&all, &sel).is_empty());
  }

  #[test]
  fn resolution_falls_back_through_priorities() {
    let all = creds();
    let sel = FilterSelection::new().with(Facet::Service, "Chrome");
    let hits = apply_filters(&all, &sel);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "-iPhone");
  }

  #[test]
  fn filtering_is_idempotent() {
    let all = creds();
    let sel = FilterSelection::new().with(Facet::Device, "iPhone");
    let once = apply_filters(&all, &sel);
    let twice = apply_filters(once.iter().copied(), &sel);
    assert_eq!(once, twice);
  }

  #[test]
  fn empty_selection_keeps_everything_in_order() {
    let all = creds();
    let hits = apply_filters(&all, &FilterSelection::new());
    let ids: Vec<_> = hits.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["Gmail-Pixel", "Facebook-Pixel", "Gmail-iPhone", "-iPhone"]);
  }

  #[test]
  fn presence_facets_on_contacts() {
    let contacts = vec![
      Contact { id: "1".into(), name: Some("Ion".into()), ..Default::default() },
      Contact { id: "2".into(), name: Some("   ".into()), ..Default::default() },
      Contact {
        id: "3".into(),
        photo_path: Some("photos/3.jpg".into()),
        ..Default::default()
      },
    ];

    let named = apply_filters(&contacts, &FilterSelection::new().with(Facet::HasName, "yes"));
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].id, "1");

    let unnamed = apply_filters(&contacts, &FilterSelection::new().with(Facet::HasName, "no"));
    assert_eq!(unnamed.len(), 2);

    let photo = apply_filters(&contacts, &FilterSelection::new().with(Facet::HasPhoto, "yes"));
    assert_eq!(photo.len(), 1);
    assert_eq!(photo[0].id, "3");
  }

  #[test]
  fn facets_foreign_to_the_kind_are_ignored() {
    let contacts = vec![Contact { id: "1".into(), ..Default::default() }];
    let sel = FilterSelection::new().with(Facet::Application, "Gmail");
    assert_eq!(apply_filters(&contacts, &sel).len(), 1);
  }
}

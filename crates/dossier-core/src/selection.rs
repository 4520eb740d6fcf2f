//! Filterable fields and the immutable filter selection threaded through the
//! view functions.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Sentinel accepted from clients for "no constraint".
pub const ALL: &str = "all";

// ─── Facet ───────────────────────────────────────────────────────────────────

/// A logical filterable field. Which record attributes back it depends on the
/// record kind (see [`crate::resolve`]).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
  Source,
  Category,
  Application,
  EmailDomain,
  Device,
  Case,
  Suspect,
  Account,
  Service,
  #[serde(rename = "type")]
  Type,
  /// Contacts only: `yes` / `no` on a non-blank name.
  HasName,
  /// Contacts only: `yes` / `no` on a non-blank photo path.
  HasPhoto,
}

impl Facet {
  pub const ALL: [Facet; 12] = [
    Facet::Source,
    Facet::Category,
    Facet::Application,
    Facet::EmailDomain,
    Facet::Device,
    Facet::Case,
    Facet::Suspect,
    Facet::Account,
    Facet::Service,
    Facet::Type,
    Facet::HasName,
    Facet::HasPhoto,
  ];

  /// Wire name; must match the serde renames above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Source => "source",
      Self::Category => "category",
      Self::Application => "application",
      Self::EmailDomain => "email_domain",
      Self::Device => "device",
      Self::Case => "case",
      Self::Suspect => "suspect",
      Self::Account => "account",
      Self::Service => "service",
      Self::Type => "type",
      Self::HasName => "has_name",
      Self::HasPhoto => "has_photo",
    }
  }

  /// Presence facets take `yes` / `no` rather than a stored value and never
  /// produce dropdown options.
  pub fn is_presence(self) -> bool { matches!(self, Self::HasName | Self::HasPhoto) }
}

impl fmt::Display for Facet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Facet {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
    Facet::ALL
      .into_iter()
      .find(|f| f.as_str() == wanted)
      .ok_or_else(|| Error::UnknownFacet(s.to_owned()))
  }
}

// ─── FilterSelection ─────────────────────────────────────────────────────────

/// The user's chosen value per facet. Facets without an entry are
/// unconstrained; `"all"` and blank values are never stored.
///
/// Serialises as a flat object, e.g. `{"service":"Gmail","device":"SM-G991B"}`;
/// `"all"` entries are dropped on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Facet, String>", into = "BTreeMap<Facet, String>")]
pub struct FilterSelection {
  entries: BTreeMap<Facet, String>,
}

impl FilterSelection {
  pub fn new() -> Self { Self::default() }

  /// A copy of this selection with `facet` set to `value`. Selecting
  /// `"all"` (or a blank value) clears the facet instead.
  #[must_use]
  pub fn with(&self, facet: Facet, value: impl Into<String>) -> Self {
    let mut next = self.clone();
    let value = value.into();
    if is_unconstrained(&value) {
      next.entries.remove(&facet);
    } else {
      next.entries.insert(facet, value);
    }
    next
  }

  /// A copy of this selection with `facet` cleared.
  #[must_use]
  pub fn without(&self, facet: Facet) -> Self {
    let mut next = self.clone();
    next.entries.remove(&facet);
    next
  }

  pub fn get(&self, facet: Facet) -> Option<&str> {
    self.entries.get(&facet).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Active `(facet, value)` entries in facet order.
  pub fn active(&self) -> impl Iterator<Item = (Facet, &str)> {
    self.entries.iter().map(|(f, v)| (*f, v.as_str()))
  }

  /// Parse a `FIELD=VALUE` pair as typed on the command line.
  pub fn parse_pair(pair: &str) -> crate::Result<(Facet, String)> {
    let (field, value) = pair
      .split_once('=')
      .ok_or_else(|| Error::MalformedFilter(pair.to_owned()))?;
    Ok((field.parse()?, value.trim().to_owned()))
  }

  /// Build a selection from `FIELD=VALUE` pairs.
  pub fn from_pairs<I, S>(pairs: I) -> crate::Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    pairs
      .into_iter()
      .map(|p| Self::parse_pair(p.as_ref()))
      .collect()
  }
}

fn is_unconstrained(value: &str) -> bool {
  let value = value.trim();
  value.is_empty() || value == ALL
}

impl FromIterator<(Facet, String)> for FilterSelection {
  fn from_iter<T: IntoIterator<Item = (Facet, String)>>(iter: T) -> Self {
    let entries = iter
      .into_iter()
      .filter(|(_, v)| !is_unconstrained(v))
      .collect();
    Self { entries }
  }
}

impl From<BTreeMap<Facet, String>> for FilterSelection {
  fn from(map: BTreeMap<Facet, String>) -> Self { map.into_iter().collect() }
}

impl From<FilterSelection> for BTreeMap<Facet, String> {
  fn from(selection: FilterSelection) -> Self { selection.entries }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn all_and_blank_clear_the_facet() {
    let s = FilterSelection::new().with(Facet::Service, "Gmail");
    assert_eq!(s.get(Facet::Service), Some("Gmail"));
    assert!(s.with(Facet::Service, "all").is_empty());
    assert!(s.with(Facet::Service, "  ").is_empty());
  }

  #[test]
  fn with_leaves_the_original_untouched() {
    let base = FilterSelection::new().with(Facet::Case, "C-1");
    let next = base.with(Facet::Device, "Pixel");
    assert_eq!(base.active().count(), 1);
    assert_eq!(next.active().count(), 2);
  }

  #[test]
  fn parses_cli_pairs() {
    let s = FilterSelection::from_pairs(["service=Gmail", "email-domain=x.ro", "type=all"])
      .unwrap();
    assert_eq!(s.get(Facet::Service), Some("Gmail"));
    assert_eq!(s.get(Facet::EmailDomain), Some("x.ro"));
    assert_eq!(s.get(Facet::Type), None);

    assert!(matches!(
      FilterSelection::parse_pair("service"),
      Err(Error::MalformedFilter(_))
    ));
    assert!(matches!(
      FilterSelection::parse_pair("colour=red"),
      Err(Error::UnknownFacet(_))
    ));
  }

  #[test]
  fn json_shape_is_a_flat_object() {
    let s: FilterSelection =
      serde_json::from_str(r#"{"service":"Gmail","case":"all","has_name":"yes"}"#).unwrap();
    assert_eq!(s.get(Facet::Service), Some("Gmail"));
    assert_eq!(s.get(Facet::Case), None);
    assert_eq!(s.get(Facet::HasName), Some("yes"));

    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json, serde_json::json!({ "service": "Gmail", "has_name": "yes" }));
  }
}

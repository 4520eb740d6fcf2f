//! Cascading facet computation.
//!
//! Each facet's options come from the records that pass every *other* active
//! filter, so selecting a value never hides its siblings from its own
//! dropdown while the remaining facets still narrow it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  filter::matches_except,
  resolve::{Record, resolve},
  selection::{Facet, FilterSelection},
};

/// Selectable values of one facet and how many records carry each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
  /// Distinct values, sorted lexicographically.
  pub values: Vec<String>,
  pub counts: BTreeMap<String, usize>,
}

impl FacetOptions {
  pub fn count(&self, value: &str) -> usize { self.counts.get(value).copied().unwrap_or(0) }

  pub fn total(&self) -> usize { self.counts.values().sum() }
}

/// Options for every value facet of a record kind.
pub type Facets = BTreeMap<Facet, FacetOptions>;

/// Compute the options of every value facet of `R`'s kind under `selection`.
pub fn compute_facets<R: Record>(records: &[&R], selection: &FilterSelection) -> Facets {
  R::KIND
    .facets()
    .iter()
    .map(|facet| (*facet, facet_options(records, selection, *facet)))
    .collect()
}

/// Options of a single facet: records are filtered by every entry except
/// `facet`, then bucketed by their resolved value.
pub fn facet_options<R: Record>(
  records: &[&R],
  selection: &FilterSelection,
  facet: Facet,
) -> FacetOptions {
  let mut counts = BTreeMap::<String, usize>::new();
  for record in records
    .iter()
    .filter(|r| matches_except(**r, selection, Some(facet)))
  {
    if let Some(value) = resolve(*record, facet) {
      *counts.entry(value.to_owned()).or_default() += 1;
    }
  }

  // BTreeMap keys are already in byte order.
  let values = counts.keys().cloned().collect();
  FacetOptions { values, counts }
}

//! The parser's untyped payload attached to every record.
//!
//! Its schema belongs to the upstream extraction parser, so it stays an
//! opaque key/value map; only a handful of keys (`Account`, `Source`,
//! `ServiceIdentifier`, `Type`) are ever read by the resolver.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Raw fields copied verbatim from the extraction report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawData {
  /// Identifier of the source element in the extraction report.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub xml_id: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub fields: BTreeMap<String, String>,
  /// Nested models; carried through but never indexed.
  #[serde(
    default,
    deserialize_with = "null_as_default",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub models: Vec<serde_json::Value>,
}

impl RawData {
  /// Look up a raw field by its report name (e.g. `"ServiceIdentifier"`).
  pub fn field(&self, name: &str) -> Option<&str> {
    self.fields.get(name).map(String::as_str)
  }

  /// Convenience constructor for records built in code.
  pub fn with_fields<I, K, V>(fields: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      xml_id: None,
      fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
      models: Vec::new(),
    }
  }
}

/// Upstream emits `null` for empty lists and payloads; read those as the
/// default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! Multi-attribute priority resolution.
//!
//! A facet such as `application` is backed by several record attributes,
//! tried in a fixed order per record kind; the first non-empty one wins. The
//! facet engine, the filter predicate and the reuse aggregator all resolve
//! through [`resolve`], so the three can never disagree about a record's
//! value.

use crate::selection::Facet;

/// A record attribute that can back a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
  Application,
  Source,
  Url,
  Username,
  Email,
  Category,
  EmailDomain,
  Device,
  Case,
  Suspect,
  /// The extraction's person name, for records that keep it apart from the
  /// suspect field.
  PersonName,
  Name,
  PhotoPath,
  Service,
  /// A key of the record's opaque [`RawData`](crate::raw::RawData) fields.
  Raw(&'static str),
}

/// The record kinds that take part in faceted filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
  Contact,
  Credential,
  Usage,
}

const CONTACT_FACETS: &[Facet] = &[
  Facet::Source,
  Facet::Category,
  Facet::Device,
  Facet::Case,
  Facet::Suspect,
];

const CREDENTIAL_FACETS: &[Facet] = &[
  Facet::Application,
  Facet::Source,
  Facet::Category,
  Facet::EmailDomain,
  Facet::Device,
  Facet::Case,
  Facet::Suspect,
  Facet::Account,
  Facet::Service,
  Facet::Type,
];

const USAGE_FACETS: &[Facet] = &[
  Facet::Account,
  Facet::Service,
  Facet::Type,
  Facet::Device,
  Facet::Case,
  Facet::Suspect,
];

impl RecordKind {
  /// Value facets that get dropdown options for this kind, in display order.
  pub fn facets(self) -> &'static [Facet] {
    match self {
      Self::Contact => CONTACT_FACETS,
      Self::Credential => CREDENTIAL_FACETS,
      Self::Usage => USAGE_FACETS,
    }
  }

  /// Attributes backing `facet` for this kind, highest priority first.
  /// Empty when the kind does not define the facet.
  pub fn priority(self, facet: Facet) -> &'static [Attr] {
    use Attr::*;

    if (self, facet) == (Self::Usage, Facet::Suspect) {
      return &[Suspect, PersonName];
    }

    // Shared by every kind.
    match facet {
      Facet::Device => return &[Device],
      Facet::Case => return &[Case],
      Facet::Suspect => return &[Suspect],
      _ => {}
    }

    match (self, facet) {
      (Self::Contact, Facet::Source) => &[Source],
      (Self::Contact, Facet::Category) => &[Category],
      (Self::Contact, Facet::HasName) => &[Name],
      (Self::Contact, Facet::HasPhoto) => &[PhotoPath],

      (Self::Credential, Facet::Application) => {
        &[Application, Source, Raw("ServiceIdentifier"), Url]
      }
      (Self::Credential, Facet::Source) => &[Source],
      (Self::Credential, Facet::Category) => &[Category],
      (Self::Credential, Facet::EmailDomain) => &[EmailDomain],
      (Self::Credential, Facet::Account) => &[Username, Email, Raw("Account")],
      (Self::Credential, Facet::Service) => {
        &[Application, Raw("Source"), Raw("ServiceIdentifier")]
      }
      (Self::Credential, Facet::Type) => &[Raw("Type"), Category],

      (Self::Usage, Facet::Account) => &[Raw("Account"), Username, Email],
      (Self::Usage, Facet::Service) => &[Service],
      (Self::Usage, Facet::Type) => &[Raw("Type"), Category],

      _ => &[],
    }
  }

  /// Whether filter entries for `facet` apply to this kind at all.
  pub fn defines(self, facet: Facet) -> bool { !self.priority(facet).is_empty() }
}

/// A record that exposes its attributes to the resolver.
pub trait Record {
  const KIND: RecordKind;

  /// The raw value of `attr`, if the record carries it.
  fn attr(&self, attr: Attr) -> Option<&str>;
}

impl<R: Record> Record for &R {
  const KIND: RecordKind = R::KIND;

  fn attr(&self, attr: Attr) -> Option<&str> { (**self).attr(attr) }
}

/// The record's value for `facet`: the first non-empty attribute in the
/// kind's priority list.
pub fn resolve<R: Record>(record: &R, facet: Facet) -> Option<&str> {
  R::KIND
    .priority(facet)
    .iter()
    .find_map(|attr| record.attr(*attr).filter(|v| !v.is_empty()))
}

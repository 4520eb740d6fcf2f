//! Plain-text rendering of views as aligned tables.

use std::fmt;

use dossier_core::{
  cases::{CaseSummary, PhotoGroup, SuspectInfo},
  contact::{Contact, ContactDetails},
  credential::{Credential, CredentialDetails},
  facets::Facets,
  reuse::PasswordGroup,
  store::{DeleteStats, Stats},
  suspect::SuspectProfile,
  text::{clean_display_name, normalize_service_identifier},
  whatsapp::{GroupOptions, WhatsAppGroup},
};

const EMPTY: &str = "—";

// ─── Table ────────────────────────────────────────────────────────────────────

pub struct Table {
  title:   String,
  headers: Vec<&'static str>,
  rows:    Vec<Vec<String>>,
}

impl Table {
  pub fn new(title: impl Into<String>, headers: &[&'static str]) -> Self {
    Self { title: title.into(), headers: headers.to_vec(), rows: Vec::new() }
  }

  pub fn push<I, S>(&mut self, cells: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut row: Vec<String> = cells
      .into_iter()
      .map(Into::into)
      .map(|c| if c.trim().is_empty() { EMPTY.to_owned() } else { c })
      .collect();
    row.resize(self.headers.len(), EMPTY.to_owned());
    self.rows.push(row);
  }

  fn widths(&self) -> Vec<usize> {
    self
      .headers
      .iter()
      .enumerate()
      .map(|(i, h)| {
        self
          .rows
          .iter()
          .map(|r| r[i].chars().count())
          .chain([h.chars().count()])
          .max()
          .unwrap_or_default()
      })
      .collect()
  }
}

fn write_row<S: AsRef<str>>(
  f: &mut fmt::Formatter<'_>,
  cells: &[S],
  widths: &[usize],
) -> fmt::Result {
  let line: Vec<String> = cells
    .iter()
    .zip(widths)
    .map(|(c, w)| format!("{:<w$}", c.as_ref(), w = *w))
    .collect();
  writeln!(f, "{}", line.join("  ").trim_end())
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", self.title)?;
    let widths = self.widths();
    write_row(f, self.headers.as_slice(), &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(f, rule.as_slice(), &widths)?;
    for row in &self.rows {
      write_row(f, row.as_slice(), &widths)?;
    }
    Ok(())
  }
}

fn opt(value: &Option<String>) -> String { value.clone().unwrap_or_default() }

/// A contact name without the phone number some sources prefix to it.
fn display_name(name: &Option<String>) -> String {
  name.as_deref().map(clean_display_name).unwrap_or_default()
}

/// A service identifier or URL shortened for display; blank when absent.
fn service_id(id: Option<&str>) -> String {
  id.filter(|s| !s.is_empty()).map(|s| normalize_service_identifier(Some(s))).unwrap_or_default()
}

fn count_title(name: &str, shown: usize, total: usize) -> String {
  if shown == total {
    format!("{name} ({total})")
  } else {
    format!("{name} ({shown}/{total})")
  }
}

// ─── Views ────────────────────────────────────────────────────────────────────

pub fn contacts(records: &[&Contact], total: usize) -> Table {
  let mut table = Table::new(
    count_title("Contacts", records.len(), total),
    &["Name", "Phone", "Source", "Case", "Device", "Suspect", "Dupes"],
  );
  for c in records {
    table.push([
      display_name(&c.name),
      opt(&c.phone),
      opt(&c.source),
      opt(&c.case_number),
      opt(&c.device_info),
      opt(&c.person_name),
      c.duplicate_count.map(|n| n.to_string()).unwrap_or_default(),
    ]);
  }
  table
}

pub fn credentials(records: &[&Credential], total: usize) -> Table {
  let mut table = Table::new(
    count_title("Credentials", records.len(), total),
    &["Id", "Service", "Service id", "Username", "Password", "Category", "Case", "Device"],
  );
  for c in records {
    let service = c.application.clone().or_else(|| c.source.clone()).unwrap_or_default();
    let username = c.username.clone().or_else(|| c.email.clone()).unwrap_or_default();
    table.push([
      c.id.clone(),
      service,
      service_id(c.service_identifier.as_deref().or(c.url.as_deref())),
      username,
      opt(&c.password),
      opt(&c.category),
      opt(&c.case_number),
      opt(&c.device_info),
    ]);
  }
  table
}

pub fn password_groups(groups: &[PasswordGroup]) -> Table {
  let mut table = Table::new(
    format!("Password reuse ({})", groups.len()),
    &["Password", "Uses", "Reused", "Services"],
  );
  for g in groups {
    let services: Vec<String> =
      g.usages().iter().map(|u| service_id(Some(u.service.as_str()))).collect();
    table.push([
      g.password().to_owned(),
      g.usage_count().to_string(),
      if g.is_reused() { "yes" } else { "no" }.to_owned(),
      services.join(", "),
    ]);
  }
  table
}

pub fn whatsapp_groups(groups: &[&WhatsAppGroup], total: usize) -> Table {
  let mut table = Table::new(
    count_title("WhatsApp groups", groups.len(), total),
    &["Group", "Members", "Cases", "Devices"],
  );
  for g in groups {
    table.push([
      g.group_name.clone(),
      g.member_count.to_string(),
      g.cases.join(", "),
      g.devices.join(", "),
    ]);
  }
  table
}

pub fn suspects(profiles: &[&SuspectProfile]) -> Table {
  let mut table = Table::new(
    format!("Suspects ({})", profiles.len()),
    &["Name", "Case", "Device", "Phone", "Emails", "Accounts"],
  );
  for p in profiles {
    table.push([
      p.person_name.clone(),
      p.case_number.clone(),
      opt(&p.device_info),
      opt(&p.suspect_phone),
      p.emails.join(", "),
      p.user_accounts.len().to_string(),
    ]);
  }
  table
}

/// One line per facet: `service: Gmail (2), Yahoo (1)`.
pub fn facets(facets: &Facets) -> String {
  facets
    .iter()
    .filter(|(_, options)| !options.values.is_empty())
    .map(|(facet, options)| {
      let values: Vec<String> = options
        .values
        .iter()
        .map(|v| format!("{v} ({})", options.count(v)))
        .collect();
      format!("{facet}: {}\n", values.join(", "))
    })
    .collect()
}

pub fn group_options(options: &GroupOptions) -> String {
  [("device", &options.devices), ("suspect", &options.suspects), ("case", &options.cases)]
    .into_iter()
    .filter(|(_, values)| !values.is_empty())
    .map(|(name, values)| format!("{name}: {}\n", values.join(", ")))
    .collect()
}

// ─── Details ──────────────────────────────────────────────────────────────────

pub fn contact_details(details: &ContactDetails) -> String {
  let main = &details.main_contact;
  let mut out = format!(
    "{} ({})\n",
    Some(display_name(&main.name)).filter(|n| !n.is_empty()).as_deref().unwrap_or(EMPTY),
    main.phone.as_deref().unwrap_or(EMPTY),
  );
  let records: Vec<&Contact> = details.all_records.iter().collect();
  out.push_str(&contacts(&records, details.total_duplicates).to_string());
  if !details.whatsapp_groups.is_empty() {
    out.push_str("WhatsApp groups:\n");
    for g in &details.whatsapp_groups {
      out.push_str(&format!("  {} [{}]\n", g.group_name, g.group_id));
    }
  }
  out
}

pub fn credential_details(details: &CredentialDetails) -> String {
  let kind = if details.is_password { "password" } else { "account" };
  let records: Vec<&Credential> = details.all_records.iter().collect();
  format!(
    "{} {kind}\n{}",
    details.main_credential.id,
    credentials(&records, details.total_duplicates)
  )
}

// ─── Cases ────────────────────────────────────────────────────────────────────

pub fn suspect_info(owners: &[SuspectInfo]) -> Table {
  let mut table = Table::new(
    format!("Device owners ({})", owners.len()),
    &["Case", "Name", "Device", "Phone", "Photo"],
  );
  for o in owners {
    table.push([
      o.case_number.clone(),
      opt(&o.person_name),
      opt(&o.device_info),
      o.suspect_phone.clone(),
      opt(&o.suspect_photo_path),
    ]);
  }
  table
}

/// One block per photo, the owner's own photo marked with `*`.
pub fn photo_groups(case_number: &str, groups: &[PhotoGroup]) -> String {
  let mut out = format!("Shared photos in {case_number} ({})\n", groups.len());
  for g in groups {
    let mark = if g.contains_suspect_number { " *" } else { "" };
    out.push_str(&format!("{} ({}){mark}\n", g.photo_path, g.contacts.len()));
    for c in &g.contacts {
      let name = Some(display_name(&c.name)).filter(|n| !n.is_empty());
      out.push_str(&format!(
        "  {} {}\n",
        name.as_deref().unwrap_or(EMPTY),
        c.phone.as_deref().unwrap_or(EMPTY),
      ));
    }
  }
  out
}

pub fn cases(cases: &[CaseSummary]) -> Table {
  let mut table = Table::new(
    format!("Cases ({})", cases.len()),
    &["Case", "Profile", "Person", "Device", "Contacts", "Passwords", "Accounts", "Uploaded"],
  );
  for case in cases {
    for s in &case.sessions {
      table.push([
        case.case_number.clone(),
        s.profile_id.clone(),
        s.person_name.clone(),
        opt(&s.device_info),
        s.counts.contacts.to_string(),
        s.counts.passwords.to_string(),
        s.counts.user_accounts.to_string(),
        s.uploaded_at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default(),
      ]);
    }
  }
  table
}

pub fn deleted(stats: &DeleteStats) -> String {
  format!(
    "contacts          {}\npasswords         {}\nuser accounts     {}\nsuspect profiles  {}\n",
    stats.contacts, stats.passwords, stats.user_accounts, stats.suspect_profiles
  )
}

pub fn stats(stats: &Stats) -> String {
  format!(
    "contacts       {}\npasswords      {}\nuser accounts  {}\ntotal          {}\n",
    stats.contacts, stats.passwords, stats.user_accounts, stats.total
  )
}

#[cfg(test)]
mod tests {
  use dossier_core::{facets::FacetOptions, selection::Facet};

  use super::*;

  #[test]
  fn columns_align_and_blank_cells_dash() {
    let mut table = Table::new("T", &["A", "Long header"]);
    table.push(["wide value", ""]);
    table.push(["x"]);
    let text = table.to_string();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "T");
    assert_eq!(lines[1], "A           Long header");
    assert_eq!(lines[2], "----------  -----------");
    assert_eq!(lines[3], "wide value  —");
    assert_eq!(lines[4], "x           —");
  }

  #[test]
  fn filtered_titles_show_both_counts() {
    let c = Contact { id: "1".into(), name: Some("Ana".into()), ..Default::default() };
    assert!(contacts(&[&c], 1).to_string().starts_with("Contacts (1)\n"));
    assert!(contacts(&[&c], 4).to_string().starts_with("Contacts (1/4)\n"));
  }

  #[test]
  fn names_and_services_display_cleaned() {
    let c = Contact {
      id: "1".into(),
      name: Some("0765457608 John Doe".into()),
      ..Default::default()
    };
    let text = contacts(&[&c], 1).to_string();
    assert!(text.lines().nth(3).unwrap().starts_with("John Doe "));

    let p = Credential {
      id: "p1".into(),
      application: Some("Facebook".into()),
      service_identifier: Some("https://www.facebook.com/login/".into()),
      ..Default::default()
    };
    let row = credentials(&[&p], 1).to_string().lines().nth(3).unwrap().to_owned();
    assert!(row.contains("facebook.com/login"));
    assert!(!row.contains("https://"));
  }

  #[test]
  fn facet_lines_carry_counts() {
    let mut f = Facets::new();
    f.insert(Facet::Service, FacetOptions {
      values: vec!["Gmail".into(), "Yahoo".into()],
      counts: [("Gmail".to_owned(), 2), ("Yahoo".to_owned(), 1)].into(),
    });
    f.insert(Facet::Device, FacetOptions::default());
    assert_eq!(facets(&f), "service: Gmail (2), Yahoo (1)\n");
  }
}

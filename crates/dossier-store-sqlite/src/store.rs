//! [`SqliteStore`], the SQLite implementation of [`CaseStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, params};

use dossier_core::{
  contact::Contact,
  credential::{Credential, UserAccount},
  store::{CaseStore, DeleteStats, IngestStats, RecordBundle, Stats},
  suspect::SuspectProfile,
};

use crate::{
  Error, Result,
  encode::{DocRow, Document, decode_docs, encode_docs},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Dossier case store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every document of `D`, in insertion order, optionally limited to one
  /// case.
  async fn read_docs<D: Document>(&self, case_number: Option<String>) -> Result<Vec<D>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let rows = match case_number {
          Some(case) => {
            let sql = format!(
              "SELECT id, body FROM {} WHERE case_number = ?1 ORDER BY rowid",
              D::TABLE
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
              .query_map(params![case], id_and_body)?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
          }
          None => {
            let sql = format!("SELECT id, body FROM {} ORDER BY rowid", D::TABLE);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
              .query_map([], id_and_body)?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
          }
        };
        Ok(rows)
      })
      .await?;

    decode_docs(rows)
  }

  async fn read_doc<D: Document>(&self, id: &str) -> Result<Option<D>> {
    let id = id.to_owned();
    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT id, body FROM {} WHERE id = ?1", D::TABLE);
        let row = conn
          .query_row(&sql, params![id], id_and_body)
          .optional()?;
        Ok(row)
      })
      .await?;

    Ok(decode_docs(row.into_iter().collect())?.pop())
  }

  async fn count(&self, table: &'static str) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let n = conn.query_row(&sql, [], |r| r.get::<_, i64>(0))?;
        Ok(n)
      })
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }
}

fn id_and_body(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String)> {
  Ok((row.get(0)?, row.get(1)?))
}

/// Upsert `rows` into `table`, returning how many were written.
fn insert_rows(
  tx: &rusqlite::Transaction<'_>,
  table: &str,
  rows: &[DocRow],
) -> rusqlite::Result<usize> {
  let mut stmt = tx.prepare_cached(&format!(
    "INSERT OR REPLACE INTO {table} (id, case_number, body) VALUES (?1, ?2, ?3)"
  ))?;
  for row in rows {
    stmt.execute(params![row.id, row.case_number, row.body])?;
  }
  Ok(rows.len())
}

/// Delete the contact, password and account rows matching `filter`, a
/// `WHERE` clause over `case_number` and `body`.
fn delete_records(
  tx: &rusqlite::Transaction<'_>,
  filter: &str,
  args: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<DeleteStats> {
  let delete = |table: &str| tx.execute(&format!("DELETE FROM {table} WHERE {filter}"), args);
  Ok(DeleteStats {
    contacts:         delete(Contact::TABLE)?,
    passwords:        delete(Credential::TABLE)?,
    user_accounts:    delete(UserAccount::TABLE)?,
    suspect_profiles: 0,
  })
}

/// Rows of one upload session: same case, person and device.
const SESSION_FILTER: &str = "COALESCE(case_number, '') = ?1 \
  AND COALESCE(json_extract(body, '$.person_name'), '') = ?2 \
  AND COALESCE(json_extract(body, '$.device_info'), '') = ?3";

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  async fn ingest(&self, bundle: RecordBundle) -> Result<IngestStats> {
    let contacts = encode_docs(bundle.contacts)?;
    let passwords = encode_docs(bundle.passwords)?;
    let user_accounts = encode_docs(bundle.user_accounts)?;
    let suspect_profiles = encode_docs(bundle.suspect_profiles)?;

    let stats = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let stats = IngestStats {
          contacts:         insert_rows(&tx, Contact::TABLE, &contacts)?,
          passwords:        insert_rows(&tx, Credential::TABLE, &passwords)?,
          user_accounts:    insert_rows(&tx, UserAccount::TABLE, &user_accounts)?,
          suspect_profiles: insert_rows(&tx, SuspectProfile::TABLE, &suspect_profiles)?,
        };
        tx.commit()?;
        Ok(stats)
      })
      .await?;

    tracing::info!(?stats, "ingested record bundle");
    Ok(stats)
  }

  // ── Contacts ──────────────────────────────────────────────────────────

  async fn list_contacts(&self) -> Result<Vec<Contact>> { self.read_docs(None).await }

  async fn get_contact<'a>(&'a self, id: &'a str) -> Result<Option<Contact>> {
    self.read_doc(id).await
  }

  // ── Credentials ───────────────────────────────────────────────────────

  async fn list_passwords(&self) -> Result<Vec<Credential>> { self.read_docs(None).await }

  async fn get_password<'a>(&'a self, id: &'a str) -> Result<Option<Credential>> {
    self.read_doc(id).await
  }

  async fn list_user_accounts(&self) -> Result<Vec<UserAccount>> { self.read_docs(None).await }

  async fn get_user_account<'a>(&'a self, id: &'a str) -> Result<Option<UserAccount>> {
    self.read_doc(id).await
  }

  async fn update_credential_category<'a>(&'a self, id: &'a str, category: &'a str) -> Result<bool> {
    let id = id.to_owned();
    let category = category.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        let mut changed = 0;
        for table in [Credential::TABLE, UserAccount::TABLE] {
          changed += conn.execute(
            &format!("UPDATE {table} SET body = json_set(body, '$.category', ?2) WHERE id = ?1"),
            params![id, category],
          )?;
        }
        Ok(changed)
      })
      .await?;

    tracing::debug!(changed, "credential category update");
    Ok(changed > 0)
  }

  // ── Suspects ──────────────────────────────────────────────────────────

  async fn list_suspect_profiles<'a>(
    &'a self,
    case_number: Option<&'a str>,
  ) -> Result<Vec<SuspectProfile>> {
    self.read_docs(case_number.map(str::to_owned)).await
  }

  async fn stats(&self) -> Result<Stats> {
    let contacts = self.count(Contact::TABLE).await?;
    let passwords = self.count(Credential::TABLE).await?;
    let user_accounts = self.count(UserAccount::TABLE).await?;
    Ok(Stats {
      contacts,
      passwords,
      user_accounts,
      total: contacts + passwords + user_accounts,
    })
  }

  // ── Deletion ──────────────────────────────────────────────────────────

  async fn delete_case<'a>(&'a self, case_number: &'a str) -> Result<DeleteStats> {
    let case = case_number.to_owned();

    let stats = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut stats = delete_records(&tx, "case_number = ?1", params![case])?;
        stats.suspect_profiles = tx.execute(
          &format!("DELETE FROM {} WHERE case_number = ?1", SuspectProfile::TABLE),
          params![case],
        )?;
        tx.commit()?;
        Ok(stats)
      })
      .await?;

    tracing::info!(case_number, ?stats, "deleted case");
    Ok(stats)
  }

  async fn delete_session<'a>(&'a self, profile_id: &'a str) -> Result<Option<DeleteStats>> {
    let id = profile_id.to_owned();

    let stats = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let session: Option<(String, String, String)> = tx
          .query_row(
            &format!(
              "SELECT COALESCE(case_number, ''), \
                      COALESCE(json_extract(body, '$.person_name'), ''), \
                      COALESCE(json_extract(body, '$.device_info'), '') \
               FROM {} WHERE id = ?1",
              SuspectProfile::TABLE
            ),
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
          )
          .optional()?;
        let Some((case, person, device)) = session else {
          return Ok(None);
        };

        let mut stats = delete_records(&tx, SESSION_FILTER, params![case, person, device])?;
        stats.suspect_profiles = tx.execute(
          &format!("DELETE FROM {} WHERE id = ?1", SuspectProfile::TABLE),
          params![id],
        )?;
        tx.commit()?;
        Ok(Some(stats))
      })
      .await?;

    match &stats {
      Some(stats) => tracing::info!(profile_id, ?stats, "deleted upload session"),
      None => tracing::debug!(profile_id, "no such upload session"),
    }
    Ok(stats)
  }
}

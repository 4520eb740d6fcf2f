//! Integration tests for `SqliteStore` against an in-memory database.

use dossier_core::{
  contact::Contact,
  credential::{Credential, UserAccount},
  store::{CaseStore, DeleteStats, RecordBundle},
  suspect::SuspectProfile,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn contact(id: &str, name: &str) -> Contact {
  Contact { id: id.into(), name: Some(name.into()), ..Default::default() }
}

fn password(id: &str, app: &str) -> Credential {
  Credential {
    id: id.into(),
    application: Some(app.into()),
    password: Some("abc123".into()),
    category: Some("Email".into()),
    ..Default::default()
  }
}

fn account(id: &str, source: &str) -> UserAccount {
  UserAccount { id: id.into(), source: Some(source.into()), ..Default::default() }
}

fn suspect(id: &str, name: &str, case: &str) -> SuspectProfile {
  SuspectProfile {
    id: id.into(),
    person_name: name.into(),
    case_number: case.into(),
    ..Default::default()
  }
}

// ─── Ingest ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_and_list_round_trip() {
  let s = store().await;
  let bundle = RecordBundle {
    contacts:         vec![contact("c1", "Ana"), contact("c2", "Ion")],
    passwords:        vec![password("p1", "Gmail")],
    user_accounts:    vec![account("a1", "Facebook")],
    suspect_profiles: vec![suspect("s1", "Ion Popescu", "C1")],
  };

  let stats = s.ingest(bundle.clone()).await.unwrap();
  assert_eq!(stats.contacts, 2);
  assert_eq!(stats.passwords, 1);
  assert_eq!(stats.user_accounts, 1);
  assert_eq!(stats.suspect_profiles, 1);

  assert_eq!(s.list_contacts().await.unwrap(), bundle.contacts);
  assert_eq!(s.list_passwords().await.unwrap(), bundle.passwords);
  assert_eq!(s.list_user_accounts().await.unwrap(), bundle.user_accounts);
  assert_eq!(s.list_suspect_profiles(None).await.unwrap(), bundle.suspect_profiles);
}

#[tokio::test]
async fn lists_keep_insertion_order() {
  let s = store().await;
  let contacts = vec![contact("z", "Zoe"), contact("a", "Ana"), contact("m", "Mara")];
  s.ingest(RecordBundle { contacts, ..Default::default() }).await.unwrap();
  s.ingest(RecordBundle { contacts: vec![contact("b", "Bogdan")], ..Default::default() })
    .await
    .unwrap();

  let ids: Vec<_> = s.list_contacts().await.unwrap().into_iter().map(|c| c.id).collect();
  assert_eq!(ids, ["z", "a", "m", "b"]);
}

#[tokio::test]
async fn empty_ids_are_assigned() {
  let s = store().await;
  s.ingest(RecordBundle {
    contacts: vec![contact("", "Ana"), contact("", "Ion")],
    ..Default::default()
  })
  .await
  .unwrap();

  let contacts = s.list_contacts().await.unwrap();
  assert_eq!(contacts.len(), 2);
  assert!(contacts.iter().all(|c| !c.id.is_empty()));
  assert_ne!(contacts[0].id, contacts[1].id);

  let fetched = s.get_contact(&contacts[1].id).await.unwrap();
  assert_eq!(fetched.and_then(|c| c.name).as_deref(), Some("Ion"));
}

#[tokio::test]
async fn reingesting_an_id_replaces_it() {
  let s = store().await;
  s.ingest(RecordBundle { contacts: vec![contact("c1", "Old")], ..Default::default() })
    .await
    .unwrap();
  s.ingest(RecordBundle { contacts: vec![contact("c1", "New")], ..Default::default() })
    .await
    .unwrap();

  let contacts = s.list_contacts().await.unwrap();
  assert_eq!(contacts.len(), 1);
  assert_eq!(contacts[0].name.as_deref(), Some("New"));
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get_contact("nope").await.unwrap().is_none());
  assert!(s.get_password("nope").await.unwrap().is_none());
  assert!(s.get_user_account("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn get_finds_each_collection() {
  let s = store().await;
  s.ingest(RecordBundle {
    passwords: vec![password("p1", "Gmail")],
    user_accounts: vec![account("a1", "Facebook")],
    ..Default::default()
  })
  .await
  .unwrap();

  let p = s.get_password("p1").await.unwrap().unwrap();
  assert_eq!(p.application.as_deref(), Some("Gmail"));
  assert!(s.get_password("a1").await.unwrap().is_none());

  let a = s.get_user_account("a1").await.unwrap().unwrap();
  assert_eq!(a.source.as_deref(), Some("Facebook"));
}

// ─── Category updates ────────────────────────────────────────────────────────

#[tokio::test]
async fn update_category_on_password() {
  let s = store().await;
  s.ingest(RecordBundle { passwords: vec![password("p1", "Gmail")], ..Default::default() })
    .await
    .unwrap();

  assert!(s.update_credential_category("p1", "Social").await.unwrap());
  let p = s.get_password("p1").await.unwrap().unwrap();
  assert_eq!(p.category.as_deref(), Some("Social"));
  assert_eq!(p.application.as_deref(), Some("Gmail"));
}

#[tokio::test]
async fn update_category_on_account() {
  let s = store().await;
  s.ingest(RecordBundle { user_accounts: vec![account("a1", "Facebook")], ..Default::default() })
    .await
    .unwrap();

  assert!(s.update_credential_category("a1", "Social").await.unwrap());
  let a = s.get_user_account("a1").await.unwrap().unwrap();
  assert_eq!(a.category.as_deref(), Some("Social"));
}

#[tokio::test]
async fn update_category_is_idempotent() {
  let s = store().await;
  s.ingest(RecordBundle { passwords: vec![password("p1", "Gmail")], ..Default::default() })
    .await
    .unwrap();

  assert!(s.update_credential_category("p1", "Email").await.unwrap());
  assert!(s.update_credential_category("p1", "Email").await.unwrap());
  assert_eq!(s.list_passwords().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_category_unknown_id() {
  let s = store().await;
  assert!(!s.update_credential_category("ghost", "Email").await.unwrap());
}

// ─── Suspects & stats ────────────────────────────────────────────────────────

#[tokio::test]
async fn suspects_filter_by_case() {
  let s = store().await;
  s.ingest(RecordBundle {
    suspect_profiles: vec![
      suspect("s1", "Ion", "C1"),
      suspect("s2", "Maria", "C2"),
      suspect("s3", "Vlad", "C1"),
    ],
    ..Default::default()
  })
  .await
  .unwrap();

  let c1 = s.list_suspect_profiles(Some("C1")).await.unwrap();
  let names: Vec<_> = c1.iter().map(|p| p.person_name.as_str()).collect();
  assert_eq!(names, ["Ion", "Vlad"]);
  assert!(s.list_suspect_profiles(Some("C9")).await.unwrap().is_empty());
  assert_eq!(s.list_suspect_profiles(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn stats_count_collections() {
  let s = store().await;
  let empty = s.stats().await.unwrap();
  assert_eq!(empty.total, 0);

  s.ingest(RecordBundle {
    contacts: vec![contact("c1", "Ana"), contact("c2", "Ion")],
    passwords: vec![password("p1", "Gmail")],
    user_accounts: vec![account("a1", "Facebook"), account("a2", "Yahoo")],
    suspect_profiles: vec![suspect("s1", "Ion", "C1")],
  })
  .await
  .unwrap();

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.contacts, 2);
  assert_eq!(stats.passwords, 1);
  assert_eq!(stats.user_accounts, 2);
  assert_eq!(stats.total, 5);
}

// ─── Deletion ────────────────────────────────────────────────────────────────

fn sessions() -> RecordBundle {
  let c = |id: &str, case: &str, device: Option<&str>| Contact {
    id: id.into(),
    case_number: Some(case.into()),
    person_name: Some("Ion".into()),
    device_info: device.map(Into::into),
    ..Default::default()
  };
  RecordBundle {
    contacts:         vec![c("c1", "C1", Some("Pixel")), c("c2", "C1", None), c("c3", "C2", Some("Pixel"))],
    passwords:        vec![Credential {
      case_number: Some("C1".into()),
      person_name: Some("Ion".into()),
      device_info: Some("Pixel".into()),
      ..password("p1", "Gmail")
    }],
    user_accounts:    vec![UserAccount { case_number: Some("C2".into()), ..account("a1", "Facebook") }],
    suspect_profiles: vec![
      SuspectProfile { device_info: Some("Pixel".into()), ..suspect("s1", "Ion", "C1") },
      // An empty device is the same session as a missing one.
      SuspectProfile { device_info: Some(String::new()), ..suspect("s2", "Ion", "C1") },
      suspect("s3", "Maria", "C2"),
    ],
  }
}

#[tokio::test]
async fn delete_case_clears_every_collection() {
  let s = store().await;
  s.ingest(sessions()).await.unwrap();

  let stats = s.delete_case("C1").await.unwrap();
  assert_eq!(stats, DeleteStats {
    contacts:         2,
    passwords:        1,
    user_accounts:    0,
    suspect_profiles: 2,
  });

  let ids: Vec<_> = s.list_contacts().await.unwrap().into_iter().map(|c| c.id).collect();
  assert_eq!(ids, ["c3"]);
  assert!(s.list_passwords().await.unwrap().is_empty());
  assert_eq!(s.list_suspect_profiles(None).await.unwrap().len(), 1);

  assert_eq!(s.delete_case("C1").await.unwrap(), DeleteStats::default());
}

#[tokio::test]
async fn delete_session_matches_case_person_and_device() {
  let s = store().await;
  s.ingest(sessions()).await.unwrap();

  let stats = s.delete_session("s2").await.unwrap().unwrap();
  assert_eq!(stats, DeleteStats {
    contacts:         1,
    passwords:        0,
    user_accounts:    0,
    suspect_profiles: 1,
  });

  let ids: Vec<_> = s.list_contacts().await.unwrap().into_iter().map(|c| c.id).collect();
  assert_eq!(ids, ["c1", "c3"]);
  let profiles: Vec<_> =
    s.list_suspect_profiles(None).await.unwrap().into_iter().map(|p| p.id).collect();
  assert_eq!(profiles, ["s1", "s3"]);
  assert_eq!(s.list_passwords().await.unwrap().len(), 1);

  assert!(s.delete_session("s2").await.unwrap().is_none());
}

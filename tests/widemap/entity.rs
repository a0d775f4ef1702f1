//! Entities, snapshots and internal wide maps sharing an entity row

use crate::common::*;
use widecol::{EntityPersister, Error, WideMapLocation};

#[test]
fn persist_load_remove() {
    let (_store, em) = manager();
    let repo = em.repository::<User>();
    repo.persist(&user(1, "alice"), None).unwrap();

    assert_eq!(repo.load_by_id(&1).unwrap(), Some(user(1, "alice")));
    assert!(repo.exists(&1).unwrap());
    assert!(!repo.exists(&2).unwrap());

    repo.remove(&1, None).unwrap();
    assert_eq!(repo.load_by_id(&1).unwrap(), None);
}

#[test]
fn snapshot_flushes_only_dirty_fields() {
    let (store, em) = manager();
    em.repository::<User>().persist(&user(7, "bob"), None).unwrap();

    let mut snap = em.snapshot::<User>(&7).unwrap().unwrap();
    assert!(!snap.is_dirty());
    snap.modify(|u| u.name = "robert".to_string()).unwrap();
    assert_eq!(snap.dirty_fields().iter().collect::<Vec<_>>(), vec!["name"]);

    let writes = store.writes();
    // name + marker
    assert_eq!(snap.flush(None).unwrap(), 1);
    assert_eq!(store.writes() - writes, 2);
    assert!(!snap.is_dirty());
    assert_eq!(snap.flush(None).unwrap(), 0);

    assert_eq!(
        em.repository::<User>().load_by_id(&7).unwrap(),
        Some(user(7, "robert"))
    );
}

#[test]
fn snapshot_revert_clears_dirty() {
    let (_store, em) = manager();
    em.repository::<User>().persist(&user(3, "carol"), None).unwrap();
    let mut snap = em.snapshot::<User>(&3).unwrap().unwrap();
    snap.modify(|u| u.name = "x".to_string()).unwrap();
    snap.modify(|u| u.name = "carol".to_string()).unwrap();
    assert!(!snap.is_dirty());
}

#[test]
fn snapshot_rejects_primary_key_change() {
    let (_store, em) = manager();
    em.repository::<User>().persist(&user(4, "dan"), None).unwrap();
    let mut snap = em.snapshot::<User>(&4).unwrap().unwrap();
    let err = snap.modify(|u| u.id = 5).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(snap.get(), &user(4, "dan"));
}

#[test]
fn snapshot_refresh_after_removal_is_stale() {
    let (_store, em) = manager();
    let repo = em.repository::<User>();
    repo.persist(&user(9, "eve"), None).unwrap();
    let mut snap = em.snapshot::<User>(&9).unwrap().unwrap();

    repo.persist(&user(9, "eve2"), None).unwrap();
    snap.refresh().unwrap();
    assert_eq!(snap.get().name, "eve2");

    repo.remove(&9, None).unwrap();
    assert!(matches!(snap.refresh(), Err(Error::StaleEntity { .. })));
}

#[test]
fn missing_entity_has_no_snapshot() {
    let (_store, em) = manager();
    assert!(em.snapshot::<User>(&404).unwrap().is_none());
}

#[test]
fn internal_map_shares_row_without_clobbering_fields() {
    let (store, em) = manager();
    let repo = em.repository::<User>();
    repo.persist(&user(1, "alice"), None).unwrap();

    let followers =
        em.wide_map::<i64, String>(WideMapLocation::internal::<User>(&1, "followers").unwrap());
    let tags = em.wide_map::<i64, String>(WideMapLocation::internal::<User>(&1, "tags").unwrap());
    followers.insert(&10, &"bob".to_string()).unwrap();
    followers.insert(&20, &"carol".to_string()).unwrap();
    tags.insert(&10, &"rust".to_string()).unwrap();

    // Same physical row as the entity
    assert_eq!(followers.row(), tags.row());
    assert!(store.inner().row_len(followers.row()) >= 5);

    assert_eq!(followers.find_keys(None, true, None, true, false, 0).unwrap(), vec![10, 20]);
    assert_eq!(tags.find_values(None, true, None, true, false, 0).unwrap(), vec!["rust"]);
    assert_eq!(repo.load_by_id(&1).unwrap(), Some(user(1, "alice")));

    followers.remove_range(None, true, None, true).unwrap();
    assert_eq!(tags.get(&10).unwrap(), Some("rust".to_string()));
    assert!(repo.exists(&1).unwrap());
}

#[test]
fn empty_internal_property_rejected() {
    let err = WideMapLocation::internal::<User>(&1, "").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn snapshot_flush_in_batch() {
    let (store, em) = manager();
    em.repository::<User>().persist(&user(2, "fay"), None).unwrap();
    let mut snap = em.snapshot::<User>(&2).unwrap().unwrap();
    snap.modify(|u| u.name = "faye".to_string()).unwrap();

    let mut batch = em.begin_batch();
    snap.flush(Some(&mut batch)).unwrap();
    assert_eq!(em.repository::<User>().load_by_id(&2).unwrap(), Some(user(2, "fay")));
    batch.flush().unwrap();
    assert_eq!(store.commits(), 1);
    assert_eq!(em.repository::<User>().load_by_id(&2).unwrap(), Some(user(2, "faye")));
}

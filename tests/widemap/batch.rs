//! Batched atomicity across a wide map and its cascaded join entities

use crate::common::*;
use widecol::{ConsistencyLevel, Error, JoinProperties, WideMapLocation};

#[test]
fn batch_commits_parent_and_child_together() {
    let (store, em) = manager();
    let timeline = em.join_wide_map::<i64, Tweet>(
        WideMapLocation::external("timeline", &1u64).unwrap(),
        JoinProperties::persist(),
    );
    let t = tweet(1, "hello");

    let mut batch = em.begin_batch();
    timeline.batched(&mut batch).insert(&100, &t).unwrap();
    let writes = store.writes();

    // Nothing is visible before flush
    assert_eq!(timeline.get(&100).unwrap(), None);
    assert!(em.repository::<Tweet>().load_fields(&t.id).unwrap().is_none());

    let flushed = batch.flush().unwrap();
    assert!(flushed.puts >= 2);
    assert_eq!(store.writes(), writes);
    assert_eq!(store.commits(), 1);
    assert_eq!(timeline.get(&100).unwrap(), Some(t));
}

#[test]
fn failed_commit_leaves_nothing_visible() {
    let (store, em) = manager();
    let timeline = em.join_wide_map::<i64, Tweet>(
        WideMapLocation::external("timeline", &1u64).unwrap(),
        JoinProperties::persist(),
    );
    let t = tweet(1, "lost");

    let mut batch = em.begin_batch();
    timeline.batched(&mut batch).insert(&1, &t).unwrap();
    timeline.batched(&mut batch).insert(&2, &tweet(1, "also lost")).unwrap();

    store.fail_writes_to("timeline");
    let err = batch.flush().unwrap_err();
    assert!(matches!(err, Error::BatchCommit(_)));

    store.heal();
    assert_eq!(timeline.find(None, true, None, true, false, 0).unwrap(), vec![]);
    assert!(store.inner().table_rows("tweets").is_empty());
}

#[test]
fn immediate_cascade_is_not_atomic() {
    let (store, em) = manager();
    let timeline = em.join_wide_map::<i64, Tweet>(
        WideMapLocation::external("timeline", &1u64).unwrap(),
        JoinProperties::persist(),
    );
    let t = tweet(1, "orphan");

    store.fail_writes_to("timeline");
    assert!(matches!(timeline.insert(&1, &t), Err(Error::Storage(_))));
    store.heal();

    // The child was written before the parent write failed
    assert!(em.repository::<Tweet>().load_fields(&t.id).unwrap().is_some());
    assert_eq!(timeline.get(&1).unwrap(), None);
}

#[test]
fn batch_mixes_puts_and_removes() {
    let (_store, em) = manager();
    let map = em.wide_map::<i64, String>(WideMapLocation::external("mixed", "m").unwrap());
    for k in 1..=5i64 {
        map.insert(&k, &k.to_string()).unwrap();
    }

    let mut batch = em.begin_batch();
    {
        let mut b = map.batched(&mut batch);
        b.remove(&1).unwrap();
        b.remove_range(Some(&4), true, None, true).unwrap();
        b.insert(&6, &"6".to_string()).unwrap();
    }
    let pending = batch.pending();
    assert_eq!((pending.puts, pending.deletes, pending.range_deletes), (1, 1, 1));

    // Unflushed
    assert_eq!(map.find_keys(None, true, None, true, false, 0).unwrap(), vec![1, 2, 3, 4, 5]);
    batch.flush().unwrap();
    assert_eq!(map.find_keys(None, true, None, true, false, 0).unwrap(), vec![2, 3, 6]);
}

#[test]
fn discard_drops_staged_work() {
    let (store, em) = manager();
    let map = em.wide_map::<i64, String>(WideMapLocation::external("d", "d").unwrap());
    let mut batch = em.begin_batch();
    map.batched(&mut batch).insert(&1, &"x".to_string()).unwrap();
    let dropped = batch.discard();
    assert_eq!(dropped.total(), 1);
    assert_eq!(store.commits(), 0);
    assert_eq!(map.get(&1).unwrap(), None);
}

#[test]
fn commit_uses_batch_level() {
    let (store, em) = manager();
    let map = em.wide_map::<i64, String>(WideMapLocation::external("lvl", "l").unwrap());
    let mut batch = em.begin_batch().with_commit_level(ConsistencyLevel::Quorum);
    map.batched(&mut batch).insert(&1, &"x".to_string()).unwrap();
    store.clear_levels();
    batch.flush().unwrap();
    assert_eq!(
        store.levels(),
        vec![(Call::Commit, "lvl".to_string(), ConsistencyLevel::Quorum)]
    );
}

//! Join wide maps: cascade, existence checks and null references

use crate::common::*;
use widecol::{EntityPersister, Error, JoinProperties, LifecycleOp, WideMapLocation};

#[test]
fn cascade_persists_referenced_entity() {
    let (_store, em) = manager();
    let friends = em.join_wide_map::<i64, User>(
        WideMapLocation::internal::<User>(&1, "friends").unwrap(),
        JoinProperties::persist(),
    );
    friends.insert(&1, &user(2, "bob")).unwrap();

    assert_eq!(em.repository::<User>().load_by_id(&2).unwrap(), Some(user(2, "bob")));
    assert_eq!(friends.get(&1).unwrap(), Some(user(2, "bob")));
}

#[test]
fn without_cascade_missing_entity_blocks_parent_write() {
    let (store, em) = manager();
    let timeline = em.join_wide_map::<i64, Tweet>(
        WideMapLocation::external("timeline", &1u64).unwrap(),
        JoinProperties::none(),
    );
    let t = tweet(1, "never saved");
    let writes = store.writes();

    let err = timeline.insert(&1, &t).unwrap_err();
    assert!(matches!(err, Error::JoinEntityNotFound { ref table, .. } if table == "tweets"));
    assert_eq!(store.writes(), writes);
    assert_eq!(timeline.get(&1).unwrap(), None);
}

#[test]
fn without_cascade_existing_entity_is_referenced() {
    let (_store, em) = manager();
    let t = tweet(1, "saved first");
    em.repository::<Tweet>().persist(&t, None).unwrap();
    let timeline = em.join_wide_map::<i64, Tweet>(
        WideMapLocation::external("timeline", &1u64).unwrap(),
        JoinProperties::none(),
    );

    timeline.insert(&5, &t).unwrap();
    assert_eq!(timeline.last().unwrap(), Some((5, t)));
}

#[test]
fn null_join_value_rejected_without_io() {
    let (store, em) = manager();
    let timeline = em.join_wide_map::<i64, Tweet>(
        WideMapLocation::external("timeline", &1u64).unwrap(),
        JoinProperties::persist(),
    );
    let (reads, writes) = (store.reads(), store.writes());

    let err = timeline.insert_option(&1, None).unwrap_err();
    assert!(matches!(err, Error::NullJoinValue { ref property } if property == "timeline"));
    assert!(err.is_validation());
    assert_eq!((store.reads(), store.writes()), (reads, writes));
}

#[test]
fn null_scalar_value_is_invalid_input() {
    let (_store, em) = manager();
    let map = em.wide_map::<i64, String>(WideMapLocation::external("plain", "p").unwrap());
    assert!(matches!(map.insert_option(&1, None), Err(Error::InvalidInput(_))));
}

#[test]
fn dangling_reference_surfaces_on_read() {
    let (_store, em) = manager();
    let timeline = em.join_wide_map::<i64, Tweet>(
        WideMapLocation::external("timeline", &1u64).unwrap(),
        JoinProperties::persist(),
    );
    let t = tweet(1, "deleted later");
    timeline.insert(&1, &t).unwrap();
    em.repository::<Tweet>().remove(&t.id, None).unwrap();

    let err = timeline.get(&1).unwrap_err();
    assert!(matches!(err, Error::JoinEntityNotFound { .. }));
    assert!(err.is_integrity());
}

#[test]
fn cascade_on_remove_not_supported() {
    let err = JoinProperties::new([LifecycleOp::Persist, LifecycleOp::Remove]).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn internal_join_error_names_property() {
    let (_store, em) = manager();
    let friends = em.join_wide_map::<i64, User>(
        WideMapLocation::internal::<User>(&1, "friends").unwrap(),
        JoinProperties::none(),
    );
    let err = friends.insert_option(&1, None).unwrap_err();
    assert!(matches!(err, Error::NullJoinValue { ref property } if property == "friends"));
}

#[test]
fn merge_cascades_only_when_enabled() {
    let (_store, em) = manager();
    let t = tweet(3, "merged");

    let persist_only = em.join_persister::<Tweet>("pinned", JoinProperties::persist());
    let err = persist_only
        .cascade(LifecycleOp::Merge, Some(&t), None)
        .unwrap_err();
    assert!(matches!(err, Error::JoinEntityNotFound { .. }));

    let all = em.join_persister::<Tweet>("pinned", JoinProperties::all());
    assert_eq!(all.cascade(LifecycleOp::Merge, Some(&t), None).unwrap(), t.id);
    assert_eq!(all.load(&t.id).unwrap(), t);
}

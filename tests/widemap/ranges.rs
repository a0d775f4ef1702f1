//! Range reads and removes over sub-keys {1, 3, 5, 7, 9}

use crate::common::*;
use widecol::{Error, WideMap, WideMapLocation};

fn populated() -> (std::sync::Arc<RecordingStore>, WideMap<i64, String>) {
    let (store, em) = manager();
    let map = em.wide_map::<i64, String>(WideMapLocation::external("ranges", "r1").unwrap());
    for k in [1i64, 3, 5, 7, 9] {
        map.insert(&k, &format!("v{}", k)).unwrap();
    }
    (store, map)
}

fn keys(entries: Vec<(i64, String)>) -> Vec<i64> {
    entries.into_iter().map(|(k, _)| k).collect()
}

#[test]
fn inclusive_range() {
    let (_store, map) = populated();
    let found = map.find(Some(&3), true, Some(&7), true, false, 0).unwrap();
    assert_eq!(keys(found), vec![3, 5, 7]);
}

#[test]
fn exclusive_range() {
    let (_store, map) = populated();
    let found = map.find(Some(&3), false, Some(&7), false, false, 0).unwrap();
    assert_eq!(keys(found), vec![5]);
}

#[test]
fn reverse_range_end_exclusive() {
    let (_store, map) = populated();
    let found = map.find(Some(&3), true, Some(&7), false, true, 0).unwrap();
    assert_eq!(keys(found), vec![5, 3]);
}

#[test]
fn reverse_range_given_high_to_low() {
    let (_store, map) = populated();
    let found = map.find(Some(&7), true, Some(&3), true, true, 0).unwrap();
    assert_eq!(keys(found), vec![7, 5, 3]);
}

#[test]
fn values_are_returned_with_keys() {
    let (_store, map) = populated();
    let found = map.find(Some(&5), true, Some(&5), true, false, 0).unwrap();
    assert_eq!(found, vec![(5, "v5".to_string())]);
}

#[test]
fn count_limits_from_the_scan_start() {
    let (_store, map) = populated();
    assert_eq!(keys(map.find(None, true, None, true, false, 2).unwrap()), vec![1, 3]);
    assert_eq!(keys(map.find(None, true, None, true, true, 2).unwrap()), vec![9, 7]);
}

#[test]
fn empty_range_issues_no_scan() {
    let (store, map) = populated();
    let scans = store.scans();
    let found = map.find(Some(&5), false, Some(&5), false, false, 0).unwrap();
    assert!(found.is_empty());
    assert!(map.find_keys(Some(&5), false, Some(&5), false, true, 0).unwrap().is_empty());
    assert_eq!(store.scans(), scans);
}

#[test]
fn forward_start_after_end_fails_before_scan() {
    let (store, map) = populated();
    let scans = store.scans();
    let err = map.find(Some(&7), true, Some(&3), true, false, 0).unwrap_err();
    assert!(matches!(err, Error::InvalidRange(_)));
    assert!(err.is_validation());
    assert_eq!(store.scans(), scans);
}

#[test]
fn range_between_stored_keys_is_empty_but_scanned() {
    let (store, map) = populated();
    let scans = store.scans();
    assert!(map.find(Some(&4), true, Some(&4), true, false, 0).unwrap().is_empty());
    assert_eq!(store.scans(), scans + 1);
}

#[test]
fn remove_range_is_forward_only() {
    let (_store, map) = populated();
    let err = map.remove_range(Some(&9), true, Some(&1), true).unwrap_err();
    assert!(matches!(err, Error::InvalidRange(_)));
    assert_eq!(map.find_keys(None, true, None, true, false, 0).unwrap().len(), 5);

    map.remove_range(Some(&3), true, Some(&7), false).unwrap();
    assert_eq!(map.find_keys(None, true, None, true, false, 0).unwrap(), vec![1, 7, 9]);
}

#[test]
fn remove_first_and_last() {
    let (_store, map) = populated();
    map.remove_first(2).unwrap();
    map.remove_last(1).unwrap();
    assert_eq!(map.find_keys(None, true, None, true, false, 0).unwrap(), vec![5, 7]);
}

#[test]
fn remove_first_zero_is_a_no_op() {
    let (store, map) = populated();
    let scans = store.scans();
    let deletes = store.deletes();
    map.remove_first(0).unwrap();
    map.remove_last(0).unwrap();
    assert_eq!(store.scans(), scans);
    assert_eq!(store.deletes(), deletes);
}

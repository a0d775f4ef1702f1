//! Composite sub-keys: stored order must equal tuple order

use crate::common::*;
use uuid::Uuid;
use widecol::{ColumnStore, ConsistencyLevel, Error, WideMapLocation};

#[test]
fn negative_and_positive_longs_sort_numerically() {
    let (_store, em) = manager();
    let map = em.wide_map::<i64, u8>(WideMapLocation::external("nums", "n").unwrap());
    let input = [0i64, -1, i64::MAX, i64::MIN, 42, -42];
    for k in input {
        map.insert(&k, &0).unwrap();
    }
    let mut expected = input.to_vec();
    expected.sort();
    assert_eq!(map.find_keys(None, true, None, true, false, 0).unwrap(), expected);
}

#[test]
fn strings_sort_bytewise_including_prefixes_and_nul() {
    let (_store, em) = manager();
    let map = em.wide_map::<String, u8>(WideMapLocation::external("words", "w").unwrap());
    let input = ["b", "a", "ab", "a\0", "", "a\0b", "\u{e9}"];
    for k in input {
        map.insert(&k.to_string(), &0).unwrap();
    }
    let mut expected: Vec<String> = input.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(map.find_keys(None, true, None, true, false, 0).unwrap(), expected);
}

#[test]
fn tuple_keys_sort_by_first_then_second() {
    let (_store, em) = manager();
    let map = em.wide_map::<(i32, String), u8>(WideMapLocation::external("pairs", "p").unwrap());
    let input = [
        (2, "a".to_string()),
        (1, "zz".to_string()),
        (1, "a".to_string()),
        (-3, "m".to_string()),
    ];
    for k in &input {
        map.insert(k, &0).unwrap();
    }
    let mut expected = input.to_vec();
    expected.sort();
    assert_eq!(map.find_keys(None, true, None, true, false, 0).unwrap(), expected);

    let from = (1, "b".to_string());
    let found = map.find_keys(Some(&from), true, None, true, false, 0).unwrap();
    assert_eq!(found, vec![(1, "zz".to_string()), (2, "a".to_string())]);
}

#[test]
fn uuid_keys_round_trip() {
    let (_store, em) = manager();
    let map = em.wide_map::<Uuid, String>(WideMapLocation::external("ids", "i").unwrap());
    let id = Uuid::new_v4();
    map.insert(&id, &"x".to_string()).unwrap();
    assert_eq!(map.get(&id).unwrap(), Some("x".to_string()));
    assert_eq!(map.first().unwrap(), Some((id, "x".to_string())));
}

#[test]
fn foreign_column_in_map_row_is_malformed() {
    let (store, em) = manager();
    let location = WideMapLocation::external("mixed", "m").unwrap();
    let map = em.wide_map::<i64, u8>(location.clone());
    map.insert(&1, &1).unwrap();
    store
        .write_column(&location.row_key(), vec![0xEE, 0x01], vec![], None, ConsistencyLevel::One)
        .unwrap();

    let err = map.find(None, true, None, true, false, 0).unwrap_err();
    assert!(matches!(err, Error::MalformedKey(_)));
    assert!(err.is_integrity());
}

//! Consistency levels handed to the store

use crate::common::*;
use std::collections::BTreeMap;
use widecol::{ConsistencyConfig, ConsistencyLevel, JoinProperties, WideColConfig, WideMapLocation};

fn config() -> WideColConfig {
    let mut read_overrides = BTreeMap::new();
    read_overrides.insert("timeline".to_string(), "quorum".to_string());
    let mut write_overrides = BTreeMap::new();
    write_overrides.insert("tweets".to_string(), "local_quorum".to_string());
    WideColConfig {
        consistency: ConsistencyConfig {
            read: "one".to_string(),
            write: "two".to_string(),
            read_overrides,
            write_overrides,
        },
        ..WideColConfig::default()
    }
}

#[test]
fn levels_follow_table_overrides() {
    let (store, em) = manager_with(config());
    let timeline = em.join_wide_map::<i64, Tweet>(
        WideMapLocation::external("timeline", &1u64).unwrap(),
        JoinProperties::persist(),
    );
    let t = tweet(1, "hi");

    store.clear_levels();
    timeline.insert(&1, &t).unwrap();
    let writes: Vec<_> = store
        .levels()
        .into_iter()
        .filter(|(call, _, _)| *call == Call::Write)
        .collect();
    assert!(writes
        .iter()
        .filter(|(_, table, _)| table == "tweets")
        .all(|(_, _, level)| *level == ConsistencyLevel::LocalQuorum));
    assert!(writes.contains(&(Call::Write, "timeline".to_string(), ConsistencyLevel::Two)));

    store.clear_levels();
    timeline.find(None, true, None, true, false, 0).unwrap();
    assert_eq!(
        store.levels()[0],
        (Call::Scan, "timeline".to_string(), ConsistencyLevel::Quorum)
    );
    // Join values are read back at the entity table's level
    assert!(store
        .levels()
        .iter()
        .filter(|(_, table, _)| table == "tweets")
        .all(|(_, _, level)| *level == ConsistencyLevel::One));
}

#[test]
fn defaults_read_one_write_all() {
    let (store, em) = manager();
    let map = em.wide_map::<i64, String>(WideMapLocation::external("plain", "p").unwrap());
    store.clear_levels();
    map.insert(&1, &"x".to_string()).unwrap();
    map.get(&1).unwrap();
    map.remove(&1).unwrap();
    assert_eq!(
        store.levels(),
        vec![
            (Call::Write, "plain".to_string(), ConsistencyLevel::All),
            (Call::Read, "plain".to_string(), ConsistencyLevel::One),
            (Call::Delete, "plain".to_string(), ConsistencyLevel::All),
        ]
    );
}

#[test]
fn unknown_level_in_config_rejected() {
    let mut config = config();
    config.consistency.read = "most".to_string();
    let err = widecol::EntityManager::new(RecordingStore::new(), config).unwrap_err();
    assert!(matches!(err, widecol::Error::InvalidConfig(_)));
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn record_key_orders_by_topic_then_key() {
    let mut keys = vec![
        RecordKey::new("b", "t2"),
        RecordKey::new("z", "t1"),
        RecordKey::new("a", "t2"),
    ];
    keys.sort();

    assert_eq!(
        keys,
        vec![
            RecordKey::new("z", "t1"),
            RecordKey::new("a", "t2"),
            RecordKey::new("b", "t2"),
        ]
    );
}

#[test]
fn record_key_display_is_topic_slash_key() {
    assert_eq!(RecordKey::new("a", "t").to_string(), "t/a");
}

#[parameterized(
    normal = { "a", true },
    empty = { "", false },
    whitespace = { " ", true },
)]
fn record_validity(key: &str, valid: bool) {
    assert_eq!(Record::new(key, "t", "c").is_valid(), valid);
}

#[test]
fn record_id_matches_fields() {
    let record = Record::new("a", "t", "hello");
    assert_eq!(record.id(), RecordKey::new("a", "t"));
    assert!(record.same_identity(&Record::new("a", "t", "other")));
    assert!(!record.same_identity(&Record::new("a", "u", "hello")));
}

#[test]
fn record_serializes_with_snake_case_timestamps() {
    let record = Record::new("a", "t", "hello").with_timestamps(1, 2);
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["created_at"], 1);
    assert_eq!(json["updated_at"], 2);
    assert_eq!(json["topic"], "t");
}

#[test]
fn record_without_topic_deserializes_into_default_namespace() {
    let record: Record =
        serde_json::from_str(r#"{"key":"a","content":"x","updated_at":5,"created_at":4}"#)
            .unwrap();

    assert_eq!(record.topic, DEFAULT_TOPIC);
    assert_eq!(record.created_at, 4);
    assert_eq!(record.updated_at, 5);
}

//! Tests for the conversation store and its snapshot file

use std::fs;
use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use bookfinder::error::StoreError;
use bookfinder::model::{Message, ProfileFields, Sender, UserRecord};
use bookfinder::store::{save_snapshot, ConversationStore};

fn message(content: &str, sender: Sender) -> Message {
    Message::new(content, sender, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
}

fn username(name: &str) -> ProfileFields {
    ProfileFields {
        username: Some(name.to_string()),
        ..ProfileFields::default()
    }
}

#[test]
fn test_append_to_unknown_user_is_not_found() {
    let store = ConversationStore::new();

    let result = store.append(42, message("hi", Sender::User));
    assert_eq!(result, Err(StoreError::NotFound(42)));
    assert!(store.is_empty());
}

#[test]
fn test_try_append_then_create() {
    let store = ConversationStore::new();
    let first = message("hi", Sender::User);

    if let Err(StoreError::NotFound(id)) = store.append(42, first.clone()) {
        store.upsert_profile(id, &username("ann"));
        store.append(id, first).unwrap();
    }
    let record = store.append(42, message("hello", Sender::Bot)).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(record.username.as_deref(), Some("ann"));
    assert_eq!(record.messages.len(), 2);
    assert_eq!(record.messages[0].content, "hi");
    assert_eq!(record.messages[1].sender, Sender::Bot);
}

#[test]
fn test_upsert_profile_creates_empty_record() {
    let store = ConversationStore::new();

    let record = store.upsert_profile(7, &username("bob"));
    assert_eq!(record.id, 7);
    assert_eq!(record.username.as_deref(), Some("bob"));
    assert!(record.messages.is_empty());
}

#[test]
fn test_upsert_profile_keeps_history_and_unset_fields() {
    let store = ConversationStore::new();
    store.upsert_profile(7, &username("bob"));
    store.append(7, message("hi", Sender::User)).unwrap();

    let update = ProfileFields {
        first_name: Some("Bob".to_string()),
        phone_number: Some("+100".to_string()),
        ..ProfileFields::default()
    };
    let record = store.upsert_profile(7, &update);

    assert_eq!(record.username.as_deref(), Some("bob"));
    assert_eq!(record.first_name.as_deref(), Some("Bob"));
    assert_eq!(record.phone_number.as_deref(), Some("+100"));
    assert_eq!(record.messages.len(), 1);

    let renamed = store.upsert_profile(7, &username("robert"));
    assert_eq!(renamed.username.as_deref(), Some("robert"));
}

#[test]
fn test_message_count_matches_successful_appends_in_order() {
    let store = ConversationStore::new();
    let mut appended = 0;

    for i in 0..5 {
        if store.append(1, message(&i.to_string(), Sender::User)).is_ok() {
            appended += 1;
        }
        store.upsert_profile(1, &ProfileFields::default());
    }

    let record = store.get(1).unwrap();
    let contents: Vec<&str> = record.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(appended, 4);
    assert_eq!(contents, vec!["1", "2", "3", "4"]);
}

#[test]
fn test_concurrent_appends_lose_nothing() {
    let store = Arc::new(ConversationStore::new());
    let per_thread = 200;

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                // Threads 0..4 share user 0, the rest each own a user
                let user_id = if t < 4 { 0 } else { t };
                for i in 0..per_thread {
                    store.upsert(user_id, |record| {
                        record.messages.push(message(&format!("{t}-{i}"), Sender::User));
                    });
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 5);
    assert_eq!(store.get(0).unwrap().messages.len(), 4 * per_thread);
    for user_id in 4..8 {
        let record = store.get(user_id).unwrap();
        let contents: Vec<String> = record.messages.into_iter().map(|m| m.content).collect();
        let expected: Vec<String> = (0..per_thread).map(|i| format!("{user_id}-{i}")).collect();
        assert_eq!(contents, expected);
    }
}

#[test]
fn test_snapshot_keeps_first_appearance_order() {
    let store = ConversationStore::new();
    store.upsert_profile(3, &ProfileFields::default());
    store.upsert_profile(1, &ProfileFields::default());
    store.upsert_profile(2, &ProfileFields::default());
    store.upsert_profile(3, &username("again"));

    let ids: Vec<i64> = store.snapshot().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_snapshot_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user_data.json");

    let store = ConversationStore::new();
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    store.upsert(42, |record| {
        record.username = Some("ann".to_string());
        record.messages.push(Message::new("hi", Sender::User, t0));
        record
            .messages
            .push(Message::new("hello", Sender::Bot, t0 + Duration::seconds(1)));
    });
    save_snapshot(&path, &store.snapshot()).unwrap();

    let json = fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"profile_photo_url\": null"));
    assert!(json.contains("\"sender\": \"user\""));
    assert!(json.contains("\"sender\": \"bot\""));

    let reloaded = ConversationStore::load(&path).unwrap();
    assert_eq!(reloaded.snapshot(), store.snapshot());
}

#[test]
fn test_load_missing_or_empty_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user_data.json");

    assert!(ConversationStore::load(&path).unwrap().is_empty());

    fs::write(&path, "").unwrap();
    assert!(ConversationStore::load(&path).unwrap().is_empty());
}

#[test]
fn test_load_corrupt_snapshot_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user_data.json");
    fs::write(&path, "{not json").unwrap();

    assert!(ConversationStore::load(&path).is_err());
}

#[test]
fn test_load_reads_go_style_snapshot_and_merges_duplicates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user_data.json");
    fs::write(
        &path,
        r#"[
  {"id": 5, "profile_photo_url": "", "username": "ann", "first_name": "Ann",
   "last_name": "", "phone_number": "",
   "messages": [{"content": "hi", "sender": "user", "timestamp": "2024-05-01T12:00:00+07:00"}]},
  {"id": 5, "username": "ann2",
   "messages": [{"content": "again", "sender": "user", "timestamp": "2024-05-01T12:05:00Z"}]}
]"#,
    )
    .unwrap();

    let store = ConversationStore::load(&path).unwrap();
    let records: Vec<UserRecord> = store.snapshot();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].username.as_deref(), Some("ann2"));
    assert_eq!(records[0].first_name.as_deref(), Some("Ann"));
    assert_eq!(records[0].messages.len(), 2);
    assert_eq!(
        records[0].messages[0].timestamp,
        Utc.with_ymd_and_hms(2024, 5, 1, 5, 0, 0).unwrap()
    );
}

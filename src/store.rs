//! Conversation log store
//!
//! Holds one [`UserRecord`] per chat id behind a single mutex. Every
//! read-modify-write of a record happens under that lock, so concurrent
//! updates for different users never lose messages and updates for the same
//! user are applied one after another.
//!
//! The store has no durability of its own: callers take a [`snapshot`] and
//! write it with [`save_snapshot`] after mutating.
//!
//! [`snapshot`]: ConversationStore::snapshot

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::error::{LoadError, PersistenceError, StoreError};
use crate::model::{Message, ProfileFields, UserRecord};

#[derive(Debug, Default)]
struct Records {
    /// Records in order of first appearance
    list: Vec<UserRecord>,
    /// Chat id -> position in `list`
    index: HashMap<i64, usize>,
}

impl Records {
    fn get_mut(&mut self, user_id: i64) -> Option<&mut UserRecord> {
        let position = *self.index.get(&user_id)?;
        self.list.get_mut(position)
    }

    fn get_or_create(&mut self, user_id: i64) -> &mut UserRecord {
        let position = match self.index.get(&user_id) {
            Some(position) => *position,
            None => {
                self.list.push(UserRecord::new(user_id));
                let position = self.list.len() - 1;
                self.index.insert(user_id, position);
                position
            }
        };
        &mut self.list[position]
    }
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    records: Mutex<Records>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from previously persisted records
    ///
    /// Records sharing an id are merged into the first one: later profile
    /// values win and messages are appended in file order.
    pub fn from_records(records: Vec<UserRecord>) -> Self {
        let mut merged = Records::default();
        for record in records {
            if merged.index.contains_key(&record.id) {
                warn!(user_id = record.id, "merging duplicate conversation record");
            }
            let target = merged.get_or_create(record.id);
            let profile = ProfileFields {
                username: record.username,
                first_name: record.first_name,
                last_name: record.last_name,
                phone_number: record.phone_number,
                profile_photo_url: record.profile_photo_url,
            };
            profile.apply_to(target);
            target.messages.extend(record.messages);
        }
        Self {
            records: Mutex::new(merged),
        }
    }

    /// Loads the conversation snapshot at `path`
    ///
    /// A missing file is a fresh start, not an error.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(LoadError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        // An empty file is what a crash mid-create leaves behind
        if json.trim().is_empty() {
            return Ok(Self::new());
        }

        let records: Vec<UserRecord> =
            serde_json::from_str(&json).map_err(|source| LoadError::Snapshot {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_records(records))
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        // Mutations are single pushes or assignments, so poisoned data is still whole
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `message` to an existing record
    ///
    /// Fails with [`StoreError::NotFound`] when `user_id` has no record yet;
    /// the caller then creates one (see [`upsert_profile`](Self::upsert_profile)
    /// or [`upsert`](Self::upsert)).
    pub fn append(&self, user_id: i64, message: Message) -> Result<UserRecord, StoreError> {
        let mut records = self.lock();
        let record = records
            .get_mut(user_id)
            .ok_or(StoreError::NotFound(user_id))?;
        record.messages.push(message);
        Ok(record.clone())
    }

    /// Creates the record if absent, then overwrites the provided profile fields
    ///
    /// Message history is never touched.
    pub fn upsert_profile(&self, user_id: i64, profile: &ProfileFields) -> UserRecord {
        self.upsert(user_id, |record| {
            profile.apply_to(record);
            record.clone()
        })
    }

    /// Runs `mutate` on the record for `user_id`, creating it first if needed
    ///
    /// The lookup, creation and mutation happen under one lock acquisition.
    pub fn upsert<F, R>(&self, user_id: i64, mutate: F) -> R
    where
        F: FnOnce(&mut UserRecord) -> R,
    {
        let mut records = self.lock();
        mutate(records.get_or_create(user_id))
    }

    pub fn get(&self, user_id: i64) -> Option<UserRecord> {
        self.lock().get_mut(user_id).map(|record| record.clone())
    }

    /// Copies every record, in order of first appearance
    pub fn snapshot(&self) -> Vec<UserRecord> {
        self.lock().list.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writes `records` as pretty-printed JSON to `path`
pub fn save_snapshot(path: &Path, records: &[UserRecord]) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

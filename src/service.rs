//! The service object request handlers share
//!
//! [`CatalogService`] owns the read-only catalog, the matcher and the
//! conversation store. It is built once at startup and handed to handlers
//! through [`AppState`].

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::catalog::{self, Catalog};
use crate::config::Config;
use crate::error::{LoadError, PersistenceError};
use crate::matcher::KeywordMatcher;
use crate::model::{Message, Product, ProfileFields, Sender, UserRecord};
use crate::render;
use crate::review;
use crate::store::{self, ConversationStore};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogService>,
}

impl AppState {
    pub fn new(service: CatalogService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug)]
pub struct CatalogService {
    catalog: Catalog,
    matcher: KeywordMatcher,
    store: ConversationStore,
    user_data_path: PathBuf,
    user_html_path: PathBuf,
    review_form_url: String,
    /// Serializes snapshot writes so the newest snapshot is written last
    persist_lock: Mutex<()>,
}

impl CatalogService {
    pub fn new(
        catalog: Catalog,
        matcher: KeywordMatcher,
        store: ConversationStore,
        config: &Config,
    ) -> Self {
        Self {
            catalog,
            matcher,
            store,
            user_data_path: config.user_data_path.clone(),
            user_html_path: config.user_html_path.clone(),
            review_form_url: config.review_form_url.clone(),
            persist_lock: Mutex::new(()),
        }
    }

    /// Loads the catalog and any prior conversation snapshot
    ///
    /// Errors here are fatal: the caller must not start serving.
    pub fn from_config(config: &Config) -> Result<Self, LoadError> {
        let catalog = catalog::load_catalog(config)?;
        let store = ConversationStore::load(&config.user_data_path)?;
        debug!(users = store.len(), "conversation log loaded");
        Ok(Self::new(
            catalog,
            KeywordMatcher::from(config.match_policy),
            store,
            config,
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn review_form_url(&self) -> &str {
        &self.review_form_url
    }

    pub fn find_products(&self, query: &str) -> Vec<&Product> {
        self.matcher.find(query, &self.catalog.products)
    }

    pub fn find_review_link(&self, product_name: &str) -> Option<&str> {
        review::resolve(product_name, &self.catalog.review_links)
    }

    /// Updates the sender's profile, logs one message, then persists
    ///
    /// A failed write is logged and otherwise ignored: the in-memory record
    /// stays authoritative until the next successful write.
    pub async fn record_message(
        &self,
        user_id: i64,
        profile: &ProfileFields,
        content: impl Into<String>,
        sender: Sender,
        timestamp: DateTime<Utc>,
    ) -> UserRecord {
        let message = Message::new(content, sender, timestamp);
        let record = self.store.upsert(user_id, |record| {
            profile.apply_to(record);
            record.messages.push(message);
            record.clone()
        });
        self.persist_or_log().await;
        record
    }

    /// Logs an inbound text and the bot's answer with a single write
    pub async fn record_exchange(
        &self,
        user_id: i64,
        profile: &ProfileFields,
        user_text: &str,
        bot_text: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> UserRecord {
        let record = self.store.upsert(user_id, |record| {
            profile.apply_to(record);
            record
                .messages
                .push(Message::new(user_text, Sender::User, timestamp));
            if let Some(bot_text) = bot_text {
                record
                    .messages
                    .push(Message::new(bot_text, Sender::Bot, timestamp));
            }
            record.clone()
        });
        self.persist_or_log().await;
        record
    }

    pub fn conversations(&self) -> Vec<UserRecord> {
        self.store.snapshot()
    }

    pub fn render_conversations(&self) -> Result<String, PersistenceError> {
        render::render_html(&self.store.snapshot())
    }

    /// Writes the JSON snapshot and the rendered page
    pub async fn persist(&self) -> Result<(), PersistenceError> {
        let _guard = self.persist_lock.lock().await;
        let records = self.store.snapshot();

        let json_path = self.user_data_path.clone();
        let html_path = self.user_html_path.clone();
        tokio::task::spawn_blocking(move || {
            store::save_snapshot(&json_path, &records)?;
            let page = render::render_html(&records)?;
            std::fs::write(&html_path, page).map_err(|source| PersistenceError::Io {
                path: html_path.clone(),
                source,
            })
        })
        .await
        .map_err(|join_err| PersistenceError::Io {
            path: self.user_data_path.clone(),
            source: std::io::Error::other(join_err),
        })?
    }

    async fn persist_or_log(&self) {
        if let Err(err) = self.persist().await {
            error!(error = %err, "failed to persist conversation log");
        }
    }
}

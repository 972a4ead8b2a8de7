//! Data models for the catalog bot
//!
//! This module defines the catalog records, the conversation log records and
//! the request/response shapes exchanged with the chat transport.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ordered `label -> url` mapping attached to a product
///
/// Serialized as a JSON object. Insertion order is kept so the first link
/// can be used as the preview link. Re-inserting an existing label replaces
/// the url in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<(String, String)>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: String, url: String) {
        match self.0.iter_mut().find(|(existing, _)| *existing == label) {
            Some(entry) => entry.1 = url,
            None => self.0.push((label, url)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, url)| url.as_str())
    }

    /// The preview link: first link encountered while parsing
    pub fn first(&self) -> Option<(&str, &str)> {
        self.0.first().map(|(label, url)| (label.as_str(), url.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(label, url)| (label.as_str(), url.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, url) in &self.0 {
            map.serialize_entry(label, url)?;
        }
        map.end()
    }
}

struct LinksVisitor;

impl<'de> Visitor<'de> for LinksVisitor {
    type Value = Links;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of link labels to urls")
    }

    // Older snapshots wrote `null` for products without links
    fn visit_unit<E: serde::de::Error>(self) -> Result<Links, E> {
        Ok(Links::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Links, A::Error> {
        let mut links = Links::new();
        while let Some((label, url)) = access.next_entry::<String, String>()? {
            links.insert(label, url);
        }
        Ok(links)
    }
}

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LinksVisitor)
    }
}

/// A catalog entry
///
/// # Example
/// ```json
/// {
///   "name": "Clean Code",
///   "links": { "ebook": "http://x/a", "paperback": "http://x/b" }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Product {
    /// Display name, also the business key used by review lookups
    pub name: String,

    #[serde(default)]
    pub links: Links,
}

/// Review page for a product, matched by exact product name
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReviewLink {
    #[serde(rename = "productName")]
    pub product_name: String,
    pub link: String,
}

/// Who wrote a logged message
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry of a user's conversation log
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(content: impl Into<String>, sender: Sender, timestamp: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            sender,
            timestamp,
        }
    }
}

/// Per-user aggregate of profile fields and message history
///
/// Keyed by the chat id. `messages` is append-only and kept in arrival order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,

    #[serde(default)]
    pub profile_photo_url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub messages: Vec<Message>,
}

impl UserRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            profile_photo_url: None,
            username: None,
            first_name: None,
            last_name: None,
            phone_number: None,
            messages: Vec::new(),
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Profile values seen on an inbound message
///
/// `None` means "not provided" and never clears a stored value.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub profile_photo_url: Option<String>,
}

impl ProfileFields {
    /// Overwrites the fields of `record` that this update carries
    pub fn apply_to(&self, record: &mut UserRecord) {
        let fields = [
            (&self.username, &mut record.username),
            (&self.first_name, &mut record.first_name),
            (&self.last_name, &mut record.last_name),
            (&self.phone_number, &mut record.phone_number),
            (&self.profile_photo_url, &mut record.profile_photo_url),
        ];
        for (incoming, stored) in fields {
            if let Some(value) = incoming {
                *stored = Some(value.clone());
            }
        }
    }
}

/// Inbound chat-platform update (the subset of a Telegram `Update` we read)
///
/// # Example
/// ```json
/// {
///   "update_id": 1,
///   "message": {
///     "chat": { "id": 42 },
///     "from": { "id": 42, "username": "ann", "first_name": "Ann" },
///     "text": "clean code"
///   }
/// }
/// ```
#[derive(Deserialize, Debug)]
pub struct Update {
    pub update_id: Option<i64>,
    pub message: Option<IncomingMessage>,
}

#[derive(Deserialize, Debug)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub from: Option<ChatUser>,
    pub text: Option<String>,
    pub contact: Option<Contact>,
}

impl IncomingMessage {
    /// Profile fields carried by this message's sender and shared contact
    pub fn profile(&self) -> ProfileFields {
        let mut profile = ProfileFields::default();
        if let Some(from) = &self.from {
            profile.username = from.username.clone();
            profile.first_name = from.first_name.clone();
            profile.last_name = from.last_name.clone();
        }
        if let Some(contact) = &self.contact {
            profile.phone_number = Some(contact.phone_number.clone());
        }
        profile
    }
}

#[derive(Deserialize, Debug)]
pub struct Chat {
    pub id: i64,
}

#[derive(Deserialize, Debug)]
pub struct ChatUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Contact {
    pub phone_number: String,
}

/// An inline button pointing at one of a product's links
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// Outbound reply produced for one inbound message
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<LinkButton>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }
}

/// Response body of the webhook endpoint
#[derive(Serialize, Debug)]
pub struct WebhookResponse {
    pub chat_id: Option<i64>,
    pub replies: Vec<Reply>,
}

/// Query parameters for product search
///
/// Query string: `?q=clean%20code`
#[derive(Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub q: String,
}

/// Query parameters for review link lookup
///
/// `name` must be the exact, case-sensitive product name.
#[derive(Deserialize)]
pub struct ReviewQuery {
    pub name: String,
}

//! HTML page of the conversation log
//!
//! The HTML page has a users table (one row per record with the latest
//! message) followed by each user's full transcript. All user-supplied
//! text is HTML-escaped by the template engine.

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

use crate::error::PersistenceError;
use crate::model::{Sender, UserRecord};

pub const BOT_NAME: &str = "BookFinderBot";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ bot_name }} | Conversations</title>
</head>
<body>
<h1>Users</h1>
<table id="users">
<thead>
<tr><th>#</th><th>Profile</th><th>ID</th><th>FirstName</th><th>LastName</th><th>PhoneNumber</th><th>Messages</th><th>Date</th></tr>
</thead>
<tbody>
{% for user in users %}
<tr>
<td>{{ loop.index }}</td>
<td>{% if user.photo %}<a href="#user-{{ user.id }}"><img src="{{ user.photo }}" alt="Profile Photo" width="50">{{ user.username }}</a>{% else %}No photo{% endif %}</td>
<td>{{ user.id }}</td>
<td>{{ user.first_name }}</td>
<td>{{ user.last_name }}</td>
<td>{{ user.phone_number }}</td>
<td>{{ user.last_message }}</td>
<td>{{ user.last_timestamp }}</td>
</tr>
{% endfor %}
</tbody>
</table>
<h1>Direct Chat</h1>
{% for user in users %}
<section class="chat" id="user-{{ user.id }}">
<h2>{{ user.username or user.id }}</h2>
{% for message in user.messages %}
<div class="msg {{ message.side }}">
<span class="name">{{ message.name }}</span>
<span class="timestamp">{{ message.timestamp }}</span>
<div class="text">{{ message.content }}</div>
</div>
{% endfor %}
</section>
{% endfor %}
</body>
</html>
"##;

#[derive(Serialize)]
struct UserRow<'a> {
    id: i64,
    photo: &'a str,
    username: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    phone_number: &'a str,
    last_message: &'a str,
    last_timestamp: String,
    messages: Vec<MessageRow<'a>>,
}

#[derive(Serialize)]
struct MessageRow<'a> {
    name: &'a str,
    side: &'static str,
    timestamp: String,
    content: &'a str,
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

impl<'a> From<&'a UserRecord> for UserRow<'a> {
    fn from(record: &'a UserRecord) -> Self {
        let last = record.last_message();
        let messages = record
            .messages
            .iter()
            .map(|message| {
                let (name, side) = match message.sender {
                    Sender::User => (field(&record.username), "left"),
                    Sender::Bot => (BOT_NAME, "right"),
                };
                MessageRow {
                    name,
                    side,
                    timestamp: message.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    content: &message.content,
                }
            })
            .collect();

        Self {
            id: record.id,
            photo: field(&record.profile_photo_url),
            username: field(&record.username),
            first_name: field(&record.first_name),
            last_name: field(&record.last_name),
            phone_number: field(&record.phone_number),
            last_message: last.map_or("No messages", |message| message.content.as_str()),
            last_timestamp: last
                .map(|message| message.timestamp.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            messages,
        }
    }
}

/// Renders the conversation page
pub fn render_html(records: &[UserRecord]) -> Result<String, PersistenceError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_auto_escape_callback(|_| AutoEscape::Html);

    let users: Vec<UserRow> = records.iter().map(UserRow::from).collect();
    let page = env.render_str(
        PAGE_TEMPLATE,
        context! {
            bot_name => BOT_NAME,
            users => users,
        },
    )?;
    Ok(page)
}

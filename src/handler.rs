//! HTTP request handlers
//!
//! - Webhook intake: answers an inbound chat message and logs the exchange
//! - Product search and review link lookup
//! - Conversation log as JSON and as an HTML page

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info};

use crate::bot;
use crate::model::{ProductQuery, ReviewQuery, Update, WebhookResponse};
use crate::service::AppState;

/// Handles one chat-platform update
///
/// This handler:
/// 1. Ignores updates that carry no message
/// 2. Builds the replies (command answer, review link or product matches)
/// 3. Logs the user's text and the bot's answer under the chat id
/// 4. Returns the replies for the transport to deliver
///
/// # Response
///
/// ```json
/// {
///   "chat_id": 42,
///   "replies": [
///     {
///       "text": "📖 Title: Clean Code\n🔗 [ebook](http://x/a)",
///       "buttons": [{ "label": "ebook", "url": "http://x/a" }]
///     }
///   ]
/// }
/// ```
pub async fn webhook(
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> impl IntoResponse {
    let Some(message) = update.message else {
        return Json(WebhookResponse {
            chat_id: None,
            replies: Vec::new(),
        });
    };

    let received_at = Utc::now();
    let chat_id = message.chat.id;
    let text = message.text.as_deref().unwrap_or_default();
    let profile = message.profile();

    info!(
        chat_id,
        user_id = message.from.as_ref().map(|from| from.id),
        username = profile.username.as_deref().unwrap_or_default(),
        text,
        "inbound message"
    );

    let replies = if text.is_empty() {
        Vec::new()
    } else {
        bot::respond(&state.service, text)
    };
    let transcript = bot::transcript(&replies);

    state
        .service
        .record_exchange(chat_id, &profile, text, transcript.as_deref(), received_at)
        .await;

    Json(WebhookResponse {
        chat_id: Some(chat_id),
        replies,
    })
}

/// Lists products matching a free-text query
///
/// `GET /api/products?q=i%20want%20clean%20code`
///
/// ```json
/// { "query": "i want clean code", "total": 1, "data": [{ "name": "Clean Code", "links": {...} }] }
/// ```
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<ProductQuery>,
) -> impl IntoResponse {
    let products = state.service.find_products(&params.q);
    Json(json!({
        "query": params.q,
        "total": products.len(),
        "data": products,
    }))
}

/// Looks up the review link of an exactly named product
///
/// - **200 OK** - `{"product_name": .., "link": ..}`
/// - **404 Not Found** - no review link under that exact name
pub async fn review_link(
    State(state): State<AppState>,
    Query(params): Query<ReviewQuery>,
) -> impl IntoResponse {
    match state.service.find_review_link(&params.name) {
        Some(link) => (
            StatusCode::OK,
            Json(json!({
                "product_name": params.name,
                "link": link,
            })),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Review link not found",
                "code": "not_found",
                "review_form_url": state.service.review_form_url(),
            })),
        )
            .into_response(),
    }
}

/// Full conversation log as JSON
pub async fn list_conversations(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.conversations())
}

/// Conversation log as an HTML page
pub async fn conversations_html(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.render_conversations() {
        Ok(page) => Html(page).into_response(),
        Err(err) => {
            error!(error = %err, "failed to render conversations");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to render conversations",
                    "code": "render_failed"
                })),
            )
                .into_response()
        }
    }
}

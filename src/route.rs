//! Route definitions
//!
//! Maps every HTTP route to its handler and injects the shared state.

use axum::routing::{get, post};
use axum::Router;

use crate::handler::{
    conversations_html, list_conversations, review_link, search_products, webhook,
};
use crate::service::AppState;

/// Creates the application router
///
/// # Route Definitions
///
/// - `POST /webhook` - Inbound chat update, answered with the replies to send
/// - `GET /api/products?q=` - Products matching a free-text query
/// - `GET /api/reviews?name=` - Review link for an exact product name
/// - `GET /api/conversations` - Conversation log as JSON
/// - `GET /html` - Conversation log as an HTML page
///
/// # Example Usage
///
/// ```no_run
/// # use bookfinder::config::Config;
/// # use bookfinder::service::{AppState, CatalogService};
/// # use bookfinder::route::create_app;
/// let config = Config::from_env();
/// let service = CatalogService::from_config(&config).unwrap();
/// let app = create_app(AppState::new(service));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/products", get(search_products))
        .route("/reviews", get(review_link))
        .route("/conversations", get(list_conversations));

    Router::new()
        .route("/webhook", post(webhook))
        .route("/html", get(conversations_html))
        .nest("/api", api_routes)
        .with_state(state)
}

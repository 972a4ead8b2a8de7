//! Chat replies for inbound messages
//!
//! Commands:
//! - `/start`, `/help` - fixed introduction texts
//! - `/ulasan` - asks for a product title
//! - `/ulasan <exact title>` - review link for that product
//!
//! Any other text is a product search with one reply per matching product.

use crate::model::{LinkButton, Product, Reply};
use crate::service::CatalogService;

pub const REVIEW_COMMAND: &str = "/ulasan";

pub const START_TEXT: &str = "📚 Welcome to BookFinderBot! I search ebooks and books for you. \
Type a title or a topic and I will look it up.";

pub const REVIEW_USAGE_TEXT: &str = "⚠️ Please give the full book title to get its review link.\n\
Example: /ulasan Book Title";

pub const PRODUCT_NOT_FOUND_TEXT: &str = "⚠️ Product not found.";

fn help_text(review_form_url: &str) -> String {
    format!(
        "ℹ️ Use this bot to find ebooks and books. Type a title or a topic and I will search for it.\n\n\
🔍 Examples:\n\
Type \"Learn Python\" to find books about Python programming.\n\
Type \"Hacking\" to find books about hacking.\n\n\
📖 You can also use:\n\
/ulasan [full product name] to get the review link of that product.\n\n\
⚠️ The title must match exactly, including upper and lower case.\n\n\
📝 You can leave your own review here:\n{review_form_url}"
    )
}

/// Builds the replies for one inbound text
pub fn respond(service: &CatalogService, text: &str) -> Vec<Reply> {
    match text {
        "/start" => vec![Reply::text(START_TEXT)],
        "/help" => vec![Reply::text(help_text(service.review_form_url()))],
        REVIEW_COMMAND => vec![Reply::text(REVIEW_USAGE_TEXT)],
        _ => match review_argument(text) {
            Some(product_name) => vec![review_reply(service, product_name)],
            None => search_replies(service, text),
        },
    }
}

fn review_argument(text: &str) -> Option<&str> {
    text.strip_prefix(REVIEW_COMMAND)?.strip_prefix(' ')
}

fn review_reply(service: &CatalogService, product_name: &str) -> Reply {
    match service.find_review_link(product_name) {
        Some(link) => Reply::text(format!("📘 Review link for {product_name}:\n{link}")),
        None => Reply::text(format!(
            "⚠️ Review link for {product_name} not found.\nYou can leave a review here: {}",
            service.review_form_url()
        )),
    }
}

fn search_replies(service: &CatalogService, query: &str) -> Vec<Reply> {
    let products = service.find_products(query);
    if products.is_empty() {
        return vec![Reply::text(PRODUCT_NOT_FOUND_TEXT)];
    }
    products.into_iter().map(product_reply).collect()
}

/// Title plus preview link, with one button per link
pub fn product_reply(product: &Product) -> Reply {
    let mut text = format!("📖 Title: {}", product.name);
    if let Some((label, url)) = product.links.first() {
        text.push_str(&format!("\n🔗 [{label}]({url})"));
    }

    let buttons = product
        .links
        .iter()
        .map(|(label, url)| LinkButton {
            label: label.to_string(),
            url: url.to_string(),
        })
        .collect();

    Reply { text, buttons }
}

/// The single bot message logged for a set of replies
pub fn transcript(replies: &[Reply]) -> Option<String> {
    if replies.is_empty() {
        return None;
    }
    let texts: Vec<&str> = replies.iter().map(|reply| reply.text.as_str()).collect();
    Some(texts.join("\n\n"))
}

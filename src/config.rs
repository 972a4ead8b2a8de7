//! Runtime configuration read from the environment
//!
//! Every value has a default, so the service starts with no `.env` at all.
//! Unparseable values fall back to their defaults.
//!
//! # Environment Variables
//!
//! - `PORT` - Server port number (default: 3000)
//! - `PRODUCTS_PATH` - Catalog text source (default: "products.txt")
//! - `REVIEW_LINKS_PATH` - Review link text source (default: "review_links.txt")
//! - `PRODUCTS_JSON_PATH` - Product JSON snapshot (default: "products.json")
//! - `REVIEW_LINKS_JSON_PATH` - Review link JSON snapshot (default: "review_links.json")
//! - `USER_DATA_PATH` - Conversation JSON snapshot (default: "user_data.json")
//! - `USER_HTML_PATH` - Rendered conversation page (default: "user_data.html")
//! - `REVIEW_FORM_URL` - Where users are sent when no review exists
//! - `MATCH_POLICY` - `any` or `all` (default: any)

use std::env;
use std::path::PathBuf;

use crate::matcher::PolicyKind;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REVIEW_FORM_URL: &str = "http://aigoretech.rf.gd/kirim-ulasan";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub products_path: PathBuf,
    pub review_links_path: PathBuf,
    pub products_json_path: PathBuf,
    pub review_links_json_path: PathBuf,
    pub user_data_path: PathBuf,
    pub user_html_path: PathBuf,
    pub review_form_url: String,
    pub match_policy: PolicyKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            products_path: "products.txt".into(),
            review_links_path: "review_links.txt".into(),
            products_json_path: "products.json".into(),
            review_links_json_path: "review_links.json".into(),
            user_data_path: "user_data.json".into(),
            user_html_path: "user_data.html".into(),
            review_form_url: DEFAULT_REVIEW_FORM_URL.to_string(),
            match_policy: PolicyKind::default(),
        }
    }
}

impl Config {
    /// Builds the configuration from environment variables over the defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed("PORT").unwrap_or(defaults.port),
            products_path: path("PRODUCTS_PATH").unwrap_or(defaults.products_path),
            review_links_path: path("REVIEW_LINKS_PATH").unwrap_or(defaults.review_links_path),
            products_json_path: path("PRODUCTS_JSON_PATH").unwrap_or(defaults.products_json_path),
            review_links_json_path: path("REVIEW_LINKS_JSON_PATH")
                .unwrap_or(defaults.review_links_json_path),
            user_data_path: path("USER_DATA_PATH").unwrap_or(defaults.user_data_path),
            user_html_path: path("USER_HTML_PATH").unwrap_or(defaults.user_html_path),
            review_form_url: env::var("REVIEW_FORM_URL").unwrap_or(defaults.review_form_url),
            match_policy: parsed("MATCH_POLICY").unwrap_or(defaults.match_policy),
        }
    }

    /// Points every file this service reads or writes into `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let defaults = Self::default();
        Self {
            products_path: dir.join(&defaults.products_path),
            review_links_path: dir.join(&defaults.review_links_path),
            products_json_path: dir.join(&defaults.products_json_path),
            review_links_json_path: dir.join(&defaults.review_links_json_path),
            user_data_path: dir.join(&defaults.user_data_path),
            user_html_path: dir.join(&defaults.user_html_path),
            ..defaults
        }
    }
}

fn path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

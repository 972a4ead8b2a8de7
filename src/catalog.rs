//! Catalog ingestion
//!
//! Parses the plain-text product and review-link sources and round-trips
//! them through their JSON snapshots at startup.
//!
//! # Product source
//!
//! ```text
//! Clean Code
//! ebook: http://x/a
//! paperback: http://x/b
//!
//! Refactoring
//! ebook: http://x/c
//! ```
//!
//! # Review link source
//!
//! ```text
//! Clean Code: http://review/1
//! ```

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::LoadError;
use crate::model::{Product, ReviewLink};

/// Splits a link line into label and url
pub const SEPARATOR: char = ':';

/// The read-only tables loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub review_links: Vec<ReviewLink>,
}

/// Parses the product source into products, in source order
///
/// Records are separated by blank lines. A line containing the separator
/// adds a link, any other line sets the record name (the last one wins).
/// Records that end without a name are dropped together with their links.
pub fn parse_products(text: &str) -> Vec<Product> {
    let mut products = Vec::new();
    let mut current = Product::default();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            finish_record(&mut products, &mut current);
            continue;
        }

        match line.split_once(SEPARATOR) {
            Some((label, url)) => current
                .links
                .insert(label.trim().to_string(), url.trim().to_string()),
            None => current.name = line.to_string(),
        }
    }

    // The source may end without a blank line
    finish_record(&mut products, &mut current);
    products
}

fn finish_record(products: &mut Vec<Product>, current: &mut Product) {
    let record = std::mem::take(current);
    if record.name.is_empty() {
        if !record.links.is_empty() {
            debug!(links = record.links.len(), "skipping catalog record without a name");
        }
        return;
    }
    products.push(record);
}

/// Parses the review source, one `name: url` pair per line
///
/// Lines without a separator are skipped.
pub fn parse_review_links(text: &str) -> Vec<ReviewLink> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (name, link) = line.split_once(SEPARATOR)?;
            Some(ReviewLink {
                product_name: name.trim().to_string(),
                link: link.trim().to_string(),
            })
        })
        .collect()
}

pub fn read_products(path: &Path) -> Result<Vec<Product>, LoadError> {
    read_source(path).map(|text| parse_products(&text))
}

pub fn read_review_links(path: &Path) -> Result<Vec<ReviewLink>, LoadError> {
    read_source(path).map(|text| parse_review_links(&text))
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `items` as a pretty-printed (2-space indent) JSON array
pub fn write_snapshot<T: Serialize>(path: &Path, items: &[T]) -> Result<(), LoadError> {
    let json = serde_json::to_string_pretty(items).map_err(|source| LoadError::Snapshot {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| LoadError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let json = read_source(path)?;
    serde_json::from_str(&json).map_err(|source| LoadError::Snapshot {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the catalog for serving
///
/// 1. Parses both text sources
/// 2. Writes their JSON snapshots
/// 3. Reads the snapshots back, so the served tables are exactly what was persisted
///
/// Any failure here means the service must not start.
pub fn load_catalog(config: &Config) -> Result<Catalog, LoadError> {
    let products = read_products(&config.products_path)?;
    let review_links = read_review_links(&config.review_links_path)?;

    write_snapshot(&config.products_json_path, &products)?;
    write_snapshot(&config.review_links_json_path, &review_links)?;

    let catalog = Catalog {
        products: read_snapshot(&config.products_json_path)?,
        review_links: read_snapshot(&config.review_links_json_path)?,
    };

    info!(
        products = catalog.products.len(),
        review_links = catalog.review_links.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

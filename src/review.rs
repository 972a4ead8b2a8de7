//! Review link lookup
//!
//! Unlike product search, this is an exact, case-sensitive match on the
//! product name: users must type the full catalog title.

use crate::model::ReviewLink;

/// Returns the link of the first entry named exactly `product_name`
pub fn resolve<'a>(product_name: &str, links: &'a [ReviewLink]) -> Option<&'a str> {
    links
        .iter()
        .find(|entry| entry.product_name == product_name)
        .map(|entry| entry.link.as_str())
}

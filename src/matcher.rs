//! Keyword matching between free-text queries and catalog products
//!
//! The decision for a single product is delegated to a [`MatchPolicy`], so a
//! stricter policy can replace the default without touching the catalog or
//! the conversation store.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::model::Product;

/// Decides whether one product matches a query
///
/// `query` is already lower-cased by the caller.
pub trait MatchPolicy: fmt::Debug + Send + Sync {
    fn matches(&self, query: &str, product: &Product) -> bool;

    /// Whether later products sharing a lower-cased name are dropped
    fn unique_names(&self) -> bool {
        false
    }
}

/// A product matches if any word of its name occurs in the query
///
/// Words are whitespace-delimited and lower-cased. Containment is plain
/// substring search, so very short words match easily.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyToken;

impl MatchPolicy for AnyToken {
    fn matches(&self, query: &str, product: &Product) -> bool {
        name_tokens(&product.name).any(|token| query.contains(token.as_str()))
    }
}

/// A product matches if every word of the query occurs in its name
///
/// Query words are runs of letters, so punctuation and digits split words
/// and are never required. A query with no letters matches nothing.
/// Only the first product of each lower-cased name is returned.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllTokens;

impl MatchPolicy for AllTokens {
    fn matches(&self, query: &str, product: &Product) -> bool {
        let name = product.name.to_lowercase();
        let mut words = query_words(query).peekable();
        words.peek().is_some() && words.all(|word| name.contains(word))
    }

    fn unique_names(&self) -> bool {
        true
    }
}

/// Lower-cased, whitespace-delimited words of a product name
pub fn name_tokens(name: &str) -> impl Iterator<Item = String> + '_ {
    name.split_whitespace().map(str::to_lowercase)
}

/// Runs of letters in a query
pub fn query_words(query: &str) -> impl Iterator<Item = &str> {
    query
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
}

/// Which policy to build, as named in configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    #[default]
    Any,
    All,
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "any" | "or" => Ok(Self::Any),
            "all" | "and" => Ok(Self::All),
            other => Err(format!("unknown match policy '{other}'")),
        }
    }
}

#[derive(Debug)]
pub struct KeywordMatcher {
    policy: Box<dyn MatchPolicy>,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(AnyToken)
    }
}

impl From<PolicyKind> for KeywordMatcher {
    fn from(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Any => Self::new(AnyToken),
            PolicyKind::All => Self::new(AllTokens),
        }
    }
}

impl KeywordMatcher {
    pub fn new(policy: impl MatchPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
        }
    }

    /// Returns every matching product in catalog order
    ///
    /// No match yields an empty vector.
    pub fn find<'a>(&self, query: &str, catalog: &'a [Product]) -> Vec<&'a Product> {
        let query = query.to_lowercase();
        let unique = self.policy.unique_names();
        let mut seen = HashSet::new();
        catalog
            .iter()
            .filter(|product| self.policy.matches(&query, product))
            .filter(|product| !unique || seen.insert(product.name.to_lowercase()))
            .collect()
    }
}

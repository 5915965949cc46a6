//! Product listing predicates
//!
//! A [`ProductFilter`] is a conjunction of [`FilterCondition`] leaves. The
//! empty conjunction matches every product. The same predicate can be
//! evaluated in memory with [`ProductFilter::matches`] or rendered into a
//! SQL `WHERE` clause with [`ProductFilter::push_where`]; both agree.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};

use crate::models::Product;
use crate::utils::like_pattern;

/// A single leaf condition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FilterCondition {
    /// Any whitespace-separated word of the term occurs in the name or
    /// description (ASCII case-insensitive)
    TextSearch(String),
    /// `price <= n`
    PriceAtMost(f64),
    /// `price >= n`
    PriceAtLeast(f64),
}

impl FilterCondition {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            FilterCondition::TextSearch(term) => {
                let name = product.name.to_ascii_lowercase();
                let description = product.description.to_ascii_lowercase();
                search_words(term)
                    .iter()
                    .any(|w| name.contains(w.as_str()) || description.contains(w.as_str()))
            }
            FilterCondition::PriceAtMost(max) => product.price <= *max,
            FilterCondition::PriceAtLeast(min) => product.price >= *min,
        }
    }

    fn push_sql(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            FilterCondition::TextSearch(term) => {
                let words = search_words(term);
                if words.is_empty() {
                    builder.push("0");
                    return;
                }
                builder.push("(");
                for (i, word) in words.iter().enumerate() {
                    if i > 0 {
                        builder.push(" OR ");
                    }
                    let pattern = like_pattern(word);
                    builder.push("lower(name) LIKE ");
                    builder.push_bind(pattern.clone());
                    builder.push(" ESCAPE '\\' OR lower(description) LIKE ");
                    builder.push_bind(pattern);
                    builder.push(" ESCAPE '\\'");
                }
                builder.push(")");
            }
            FilterCondition::PriceAtMost(max) => {
                builder.push("price <= ");
                builder.push_bind(*max);
            }
            FilterCondition::PriceAtLeast(min) => {
                builder.push("price >= ");
                builder.push_bind(*min);
            }
        }
    }
}

/// Split a search term into lowercase words
///
/// Case folding is ASCII-only so in-memory matching agrees with SQLite's
/// `lower()`.
fn search_words(term: &str) -> Vec<String> {
    term.split_whitespace()
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

/// Conjunction of filter conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductFilter {
    conditions: Vec<FilterCondition>,
}

impl ProductFilter {
    /// The predicate that matches every product
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a condition to the conjunction
    pub fn and(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn is_match_all(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.conditions.iter().all(|c| c.matches(product))
    }

    /// Append ` WHERE ...` to `builder`, or nothing for the match-all filter
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        for (i, condition) in self.conditions.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            condition.push_sql(builder);
        }
    }
}

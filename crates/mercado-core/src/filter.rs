//! Listing query parameters to product filters

use mercado_db::{FilterCondition, ProductFilter};
use serde::Deserialize;

use crate::error::CoreError;

/// Raw listing query parameters
///
/// Values stay as strings so that malformed numbers are reported by
/// [`build_filter`] rather than silently dropped. `plt` and `pgt` are
/// accepted as older names for the price bounds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub search: Option<String>,
    #[serde(rename = "priceAtMost", alias = "plt")]
    pub price_at_most: Option<String>,
    #[serde(rename = "priceAtLeast", alias = "pgt")]
    pub price_at_least: Option<String>,
}

/// Build a validated filter; empty parameters count as absent
pub fn build_filter(params: &FilterParams) -> Result<ProductFilter, CoreError> {
    let mut filter = ProductFilter::all();

    if let Some(term) = present(&params.search) {
        filter = filter.and(FilterCondition::TextSearch(term.to_string()));
    }

    if let Some(max) = present(&params.price_at_most) {
        filter = filter.and(FilterCondition::PriceAtMost(parse_bound(max)?));
    }

    if let Some(min) = present(&params.price_at_least) {
        filter = filter.and(FilterCondition::PriceAtLeast(parse_bound(min)?));
    }

    Ok(filter)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_bound(value: &str) -> Result<f64, CoreError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CoreError::Validation("invalid filter".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(search: Option<&str>, max: Option<&str>, min: Option<&str>) -> FilterParams {
        FilterParams {
            search: search.map(String::from),
            price_at_most: max.map(String::from),
            price_at_least: min.map(String::from),
        }
    }

    #[test]
    fn test_no_params_match_everything() {
        let filter = build_filter(&FilterParams::default()).unwrap();
        assert!(filter.is_match_all());

        let filter = build_filter(&params(Some(""), Some(""), Some(""))).unwrap();
        assert!(filter.is_match_all());
    }

    #[test]
    fn test_all_params() {
        let filter = build_filter(&params(Some("mesa"), Some("10"), Some("5"))).unwrap();

        assert_eq!(
            filter.conditions(),
            &[
                FilterCondition::TextSearch("mesa".to_string()),
                FilterCondition::PriceAtMost(10.0),
                FilterCondition::PriceAtLeast(5.0),
            ]
        );
    }

    #[test]
    fn test_numeric_forms() {
        for (raw, expected) in [("7", 7.0), (" 7.5 ", 7.5), ("1e2", 100.0), ("-3", -3.0)] {
            let filter = build_filter(&params(None, Some(raw), None)).unwrap();
            assert_eq!(filter.conditions(), &[FilterCondition::PriceAtMost(expected)]);
        }
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        for raw in ["abc", "10abc", "NaN", "inf", "-Infinity", " "] {
            assert!(matches!(
                build_filter(&params(None, Some(raw), None)),
                Err(CoreError::Validation(_))
            ));
            assert!(matches!(
                build_filter(&params(None, None, Some(raw))),
                Err(CoreError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_inverted_bounds_are_valid() {
        let filter = build_filter(&params(None, Some("5"), Some("10"))).unwrap();
        assert_eq!(filter.conditions().len(), 2);
    }
}

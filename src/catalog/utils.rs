use std::{collections::HashSet, time::Duration};

use lazy_static::lazy_static;
use regex::Regex;
use rquest::Client;
use serde_json::{Number, Value};

use super::types::Product;

lazy_static! {
    static ref NUMBER_REGEX: Regex = Regex::new(r"^-?\d+(\.\d+)?$").unwrap();
}

pub fn get_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

// order-preserving; the last page may be short
pub fn chunk_ids(ids: &[String], size: usize) -> Vec<Vec<String>> {
    ids.chunks(size).map(|chunk| chunk.to_vec()).collect()
}

// first occurrence wins
pub fn dedupe_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

pub fn dedupe_products(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::new();
    products
        .into_iter()
        .filter(|product| seen.insert(product.id.clone()))
        .collect()
}

// The API compares prices numerically, so decimal-shaped input goes on
// the wire as a JSON number (integral kept integral); everything else
// as a string.
pub fn parse_filter_value(raw: &str) -> Value {
    if NUMBER_REGEX.is_match(raw) {
        if let Ok(int) = raw.parse::<i64>() {
            return Value::Number(int.into());
        }
        if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }

    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_chunk_ids_with_remainder() {
        let pages = chunk_ids(&ids(&["a", "b", "c", "d", "e"]), 2);

        assert_eq!(
            pages,
            vec![ids(&["a", "b"]), ids(&["c", "d"]), ids(&["e"])]
        );
    }

    #[test]
    fn test_chunk_ids_exact_split() {
        let pages = chunk_ids(&ids(&["a", "b", "c", "d"]), 2);
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|page| page.len() == 2));
    }

    #[test]
    fn test_chunk_ids_smaller_than_page() {
        assert_eq!(chunk_ids(&ids(&["a"]), 50), vec![ids(&["a"])]);
        assert!(chunk_ids(&[], 50).is_empty());
    }

    #[test]
    fn test_dedupe_ids_keeps_first_occurrence() {
        let deduped = dedupe_ids(ids(&["b", "a", "b", "c", "a"]));
        assert_eq!(deduped, ids(&["b", "a", "c"]));
    }

    #[test]
    fn test_dedupe_products_by_id() {
        let products = vec![
            Product {
                id: "1".to_string(),
                name: "Gold ring".to_string(),
                price: 17500.0,
                brand: None,
            },
            Product {
                id: "1".to_string(),
                name: "Gold ring".to_string(),
                price: 17500.0,
                brand: Some("Aurora".to_string()),
            },
            Product {
                id: "2".to_string(),
                name: "Silver ring".to_string(),
                price: 1200.0,
                brand: None,
            },
        ];

        let deduped = dedupe_products(products);
        assert_eq!(deduped.len(), 2);
        assert!(deduped[0].brand.is_none());
    }

    #[test]
    fn test_parse_filter_value() {
        assert_eq!(parse_filter_value("500"), json!(500));
        assert_eq!(parse_filter_value("-3"), json!(-3));
        assert_eq!(parse_filter_value("17500.5"), json!(17500.5));
        assert_eq!(parse_filter_value("Aurora"), json!("Aurora"));
        assert_eq!(parse_filter_value("1.2.3"), json!("1.2.3"));
        assert_eq!(parse_filter_value(""), json!(""));
    }
}

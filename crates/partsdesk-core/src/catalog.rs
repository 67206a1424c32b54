//! # Catalog Filter
//!
//! The free-text search box on the product grid.
//!
//! A product matches when the query is a substring of its name, part number
//! or barcode, ignoring ASCII case. The product repository runs the same rule
//! in SQL with `LIKE`; this version filters lists already in memory.
//!
//! SQLite's `LIKE` folds only ASCII letters, so "ÖL" finds "Öl" but not
//! "öl". The in-memory filter folds the same way so both paths return the
//! same rows.

use crate::types::Product;

/// Whether `product` matches a trimmed, non-empty `query`.
///
/// An empty query matches everything.
///
/// ## Example
/// ```rust,ignore
/// // name "Brake Pad Set", part number "BRK-PAD-001", barcode "8991234500011"
/// matches_query(&pads, "brake");   // true
/// matches_query(&pads, "pad-0");   // true
/// matches_query(&pads, "45000");   // true (barcode)
/// ```
pub fn matches_query(product: &Product, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    let needle = query.to_ascii_lowercase();
    let hit = |field: &str| field.to_ascii_lowercase().contains(&needle);

    hit(&product.name) || hit(&product.part_number) || product.barcode.as_deref().is_some_and(hit)
}

/// Keeps the products matching `query`, preserving order.
pub fn filter_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    products.iter().filter(|p| matches_query(p, query)).collect()
}

/// A scanner sends a run of digits; exact barcode lookup goes first then.
pub fn looks_like_barcode(query: &str) -> bool {
    let query = query.trim();
    (8..=14).contains(&query.len()) && query.chars().all(|c| c.is_ascii_digit())
}

/// Escapes `%`, `_` and `\` so user text is literal inside a `LIKE ... ESCAPE '\'`.
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, part_number: &str, barcode: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            price: 100_000,
            stock: 5,
            min_stock: 1,
            category_id: None,
            brand_id: None,
            part_number: part_number.to_string(),
            barcode: barcode.map(str::to_string),
            image_url: None,
            weight: None,
            dimensions: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            category_name: None,
            brand_name: None,
        }
    }

    #[test]
    fn test_matches_name_case_insensitive() {
        let pads = product("Brake Pad Set", "BRK-PAD-001", Some("8991234500011"));
        assert!(matches_query(&pads, "brake"));
        assert!(matches_query(&pads, "PAD SET"));
        assert!(!matches_query(&pads, "filter"));
    }

    #[test]
    fn test_non_ascii_letters_match_case_sensitively() {
        let filter = product("Ölfilter Kawasaki", "OF-KWS-01", None);
        assert!(matches_query(&filter, "ÖL"));
        assert!(matches_query(&filter, "kawasaki"));
        assert!(!matches_query(&filter, "ölfilter"));
    }

    #[test]
    fn test_matches_part_number_and_barcode() {
        let pads = product("Brake Pad Set", "BRK-PAD-001", Some("8991234500011"));
        assert!(matches_query(&pads, "pad-0"));
        assert!(matches_query(&pads, "12345"));
        assert!(matches_query(&pads, "   "));
    }

    #[test]
    fn test_filter_preserves_order() {
        let list = vec![
            product("Oil Filter", "OF-1", None),
            product("Air Filter", "AF-1", None),
            product("Spark Plug", "SP-1", None),
        ];
        let hits: Vec<_> = filter_products(&list, "filter").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(hits, vec!["Oil Filter", "Air Filter"]);
    }

    #[test]
    fn test_looks_like_barcode() {
        assert!(looks_like_barcode("8991234500011"));
        assert!(!looks_like_barcode("BRK-PAD-001"));
        assert!(!looks_like_barcode("123"));
    }

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern(" oil "), "%oil%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}

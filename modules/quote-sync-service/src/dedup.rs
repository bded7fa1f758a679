//! Quote normalization and identity-key derivation.
//!
//! One definition shared by the store, the import codec, and the sync
//! worker, so the same quote arriving from any source deduplicates
//! identically.

use quote_sync_types::Quote;

/// Both fields must contain at least one non-whitespace character.
pub fn is_valid(text: &str, category: &str) -> bool {
    !text.trim().is_empty() && !category.trim().is_empty()
}

pub fn normalize(text: &str, category: &str) -> Quote {
    Quote {
        text: text.trim().to_string(),
        category: category.trim().to_string(),
    }
}

/// Derived identity: trimmed, case-folded `text|category`.
pub fn identity_key(quote: &Quote) -> String {
    format!(
        "{}|{}",
        quote.text.trim().to_lowercase(),
        quote.category.trim().to_lowercase()
    )
}

/// Extract a valid, normalized quote from a JSON value, or `None` if
/// either field is missing, non-string, or blank.
pub fn quote_from_value(value: &serde_json::Value) -> Option<Quote> {
    let text = value.get("text")?.as_str()?;
    let category = value.get("category")?.as_str()?;
    if !is_valid(text, category) {
        return None;
    }
    Some(normalize(text, category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_key_trims_and_case_folds() {
        let a = Quote {
            text: "Do it.".to_string(),
            category: "Motivation".to_string(),
        };
        let b = Quote {
            text: "do it.  ".to_string(),
            category: "  MOTIVATION".to_string(),
        };
        assert_eq!(identity_key(&a), "do it.|motivation");
        assert_eq!(identity_key(&a), identity_key(&b));
    }

    #[test]
    fn blank_fields_are_invalid() {
        assert!(is_valid("a", "b"));
        assert!(!is_valid("", "b"));
        assert!(!is_valid("a", "   "));
        assert!(!is_valid("\t\n", ""));
    }

    #[test]
    fn normalize_strips_surrounding_whitespace() {
        let q = normalize("  hello  ", " world ");
        assert_eq!(q.text, "hello");
        assert_eq!(q.category, "world");
    }

    #[test]
    fn quote_from_value_rejects_malformed_elements() {
        assert!(quote_from_value(&json!({"text": "A", "category": "B"})).is_some());
        assert!(quote_from_value(&json!({"text": "", "category": "B"})).is_none());
        assert!(quote_from_value(&json!({"text": "A"})).is_none());
        assert!(quote_from_value(&json!({"text": 42, "category": "B"})).is_none());
        assert!(quote_from_value(&json!("just a string")).is_none());
    }
}

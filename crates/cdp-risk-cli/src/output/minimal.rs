use serde_json::Value;

use super::{cell, result_of};

/// Headline answer of each command, first present wins.
const HEADLINE_KEYS: [&str; 6] = [
    "redemption_risk",
    "resulting_tcr",
    "would_violate",
    "ltv",
    "effective_rate",
    "total_debt",
];

/// Print only the headline value, falling back to the first result field.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(result_of(value)));
}

fn headline(result: &Value) -> String {
    let Value::Object(fields) = result else {
        return cell(result, "null");
    };
    HEADLINE_KEYS
        .iter()
        .find_map(|k| fields.get(*k).filter(|v| !v.is_null()))
        .map(|v| cell(v, "null"))
        .or_else(|| {
            fields
                .iter()
                .next()
                .map(|(k, v)| format!("{}: {}", k, cell(v, "null")))
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tcr_check_headline_skips_invalid_tcr() {
        // An invalid operation has no resulting TCR; would_violate answers instead
        let result = json!({"resulting_tcr": null, "would_violate": true, "new_debt": "0"});
        assert_eq!(headline(&result), "true");
    }

    #[test]
    fn test_fallback_to_first_field() {
        assert_eq!(headline(&json!({"bracket_count": 3})), "bracket_count: 3");
    }
}

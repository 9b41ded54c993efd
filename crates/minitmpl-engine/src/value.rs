// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Property-bag view over the engine's data model.
//!
//! Models are `serde_json::Value`s. Objects answer member lookups (exact key
//! first, then case-insensitively, which is how serialized struct fields are
//! addressed), arrays and strings are enumerable, and everything has a string
//! form used for output and comparisons.

use std::borrow::Cow;

use serde_json::{Number, Value};

/// Looks up `name` on `target`.
///
/// Returns `None` when the member does not exist; a member holding `null`
/// resolves to `Some(Value::Null)`.
pub fn member<'a>(target: &'a Value, name: &str) -> Option<Cow<'a, Value>> {
    match target {
        Value::Object(map) => map
            .get(name)
            .or_else(|| {
                map.iter()
                    .find(|(key, _)| eq_ignore_case(key, name))
                    .map(|(_, value)| value)
            })
            .map(Cow::Borrowed),
        Value::Array(items)
            if eq_ignore_case(name, "Count") || eq_ignore_case(name, "Length") =>
        {
            Some(Cow::Owned(Value::from(items.len())))
        }
        Value::String(text) if eq_ignore_case(name, "Length") => {
            Some(Cow::Owned(Value::from(text.chars().count())))
        }
        _ => None,
    }
}

/// Iterates over the elements of an enumerable value.
///
/// Arrays yield their items, strings yield one single-character string per
/// character. Any other value is not enumerable and yields `None`.
pub fn elements(value: &Value) -> Option<Box<dyn Iterator<Item = Cow<'_, Value>> + '_>> {
    match value {
        Value::Array(items) => Some(Box::new(items.iter().map(Cow::Borrowed))),
        Value::String(text) => Some(Box::new(
            text.chars()
                .map(|ch| Cow::Owned(Value::String(ch.to_string()))),
        )),
        _ => None,
    }
}

/// Truthiness used by bare `$if(path)` conditions. A missing value is false.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                n.as_f64().map_or(true, |f| f != 0.0)
            }
        }
        Some(Value::Object(_)) => true,
    }
}

/// String form of a value, used for output and for comparisons.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let mut s = n.to_string();
                if s.contains('.') && !s.contains(['e', 'E']) {
                    while s.ends_with('0') {
                        s.pop();
                    }
                    if s.ends_with('.') {
                        s.pop();
                    }
                }
                s
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Parses a decimal literal such as `42`, `-3` or `2.50`.
pub fn parse_number(text: &str) -> Option<Number> {
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(value) = text.parse::<i64>() {
            return Some(Number::from(value));
        }
        if let Ok(value) = text.parse::<u64>() {
            return Some(Number::from(value));
        }
    }

    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Case-insensitive string comparison that also folds non-ASCII letters.
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    if left.is_ascii() && right.is_ascii() {
        return left.eq_ignore_ascii_case(right);
    }
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}

/// Escapes the characters that are significant in HTML text and attributes.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut output = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(ch),
        }
    }
    Cow::Owned(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_prefers_exact_key_then_ignores_case() {
        let model = json!({"name": "lower", "Name": "upper", "City": "Paris"});
        assert_eq!(member(&model, "Name").as_deref(), Some(&json!("upper")));
        assert_eq!(member(&model, "name").as_deref(), Some(&json!("lower")));
        assert_eq!(member(&model, "city").as_deref(), Some(&json!("Paris")));
        assert!(member(&model, "country").is_none());
    }

    #[test]
    fn member_on_null_value_is_found() {
        let model = json!({"Missing": null});
        assert_eq!(member(&model, "Missing").as_deref(), Some(&Value::Null));
    }

    #[test]
    fn arrays_and_strings_expose_length() {
        let items = json!([1, 2, 3]);
        assert_eq!(member(&items, "Count").as_deref(), Some(&json!(3)));
        assert_eq!(member(&items, "length").as_deref(), Some(&json!(3)));
        assert!(member(&items, "first").is_none());

        let text = json!("héllo");
        assert_eq!(member(&text, "Length").as_deref(), Some(&json!(5)));
        assert!(member(&json!(12), "Length").is_none());
    }

    #[test]
    fn elements_cover_arrays_and_strings() {
        let items = json!(["a", "b"]);
        let collected: Vec<Value> = elements(&items)
            .expect("arrays are enumerable")
            .map(Cow::into_owned)
            .collect();
        assert_eq!(collected, vec![json!("a"), json!("b")]);

        let chars: Vec<Value> = elements(&json!("ab"))
            .expect("strings are enumerable")
            .map(Cow::into_owned)
            .collect();
        assert_eq!(chars, vec![json!("a"), json!("b")]);

        assert!(elements(&json!({"a": 1})).is_none());
        assert!(elements(&json!(5)).is_none());
        assert!(elements(&Value::Null).is_none());
    }

    #[test]
    fn truthiness_rules() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(is_truthy(Some(&json!(true))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!("   "))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(!is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!([0]))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(0.0))));
        assert!(is_truthy(Some(&json!(-2))));
        assert!(is_truthy(Some(&json!({}))));
    }

    #[test]
    fn string_forms() {
        assert_eq!(value_to_string(&Value::Null), "");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(2.5)), "2.5");
        assert_eq!(value_to_string(&json!(3.0)), "3");
        assert_eq!(value_to_string(&json!([1, "a"])), "[1,\"a\"]");
    }

    #[test]
    fn number_literals() {
        assert_eq!(parse_number("42"), Some(Number::from(42)));
        assert_eq!(parse_number("-7"), Some(Number::from(-7)));
        assert!(parse_number("1.25").is_some());
        assert!(parse_number("Items").is_none());
        assert!(parse_number("inf").is_none());
        assert!(parse_number("").is_none());
    }

    #[test]
    fn case_folding() {
        assert!(eq_ignore_case("Paris", "PARIS"));
        assert!(eq_ignore_case("Ärger", "ärger"));
        assert!(!eq_ignore_case("Paris", "Pari"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}

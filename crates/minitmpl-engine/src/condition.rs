// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Evaluation of `$if(...)` conditions.
//!
//! Three forms are recognised, tried in order:
//!
//! 1. `collection.Contains(item)`: membership, compared case-insensitively on
//!    string forms.
//! 2. `left == right`: equality of string forms, case-insensitive.
//! 3. `path`: truthiness of the resolved value.
//!
//! Operands of the first two forms may be quoted string literals, decimal
//! literals or paths. Detection is plain substring search, so a quoted literal
//! that itself contains `==` or `.Contains(` splits in the wrong place.

use std::borrow::Cow;

use serde_json::Value;

use crate::context::Context;
use crate::resolve::resolve_path;
use crate::value::{elements, eq_ignore_case, is_truthy, parse_number, value_to_string};

const CONTAINS: &str = ".Contains(";
const EQUALS: &str = "==";

/// Evaluates `cond` in `ctx`. Unresolvable operands never error; they compare
/// as empty strings or count as false.
pub fn evaluate(cond: &str, ctx: &Context<'_>) -> bool {
    if let Some(idx) = cond.find(CONTAINS) {
        let collection_path = cond[..idx].trim();
        let rest = &cond[idx + CONTAINS.len()..];
        let item_token = rest.find(')').map_or(rest, |end| &rest[..end]).trim();
        return contains(collection_path, item_token, ctx);
    }

    if let Some(idx) = cond.find(EQUALS) {
        let left = resolve_operand(cond[..idx].trim(), ctx);
        let right = resolve_operand(cond[idx + EQUALS.len()..].trim(), ctx);
        return eq_ignore_case(&string_form(left.as_deref()), &string_form(right.as_deref()));
    }

    is_truthy(resolve_path(cond.trim(), ctx).as_deref())
}

fn contains(collection_path: &str, item_token: &str, ctx: &Context<'_>) -> bool {
    let item = string_form(resolve_operand(item_token, ctx).as_deref());
    let Some(collection) = resolve_path(collection_path, ctx) else {
        return false;
    };
    let Some(mut items) = elements(&collection) else {
        return false;
    };
    items.any(|element| eq_ignore_case(&value_to_string(&element), &item))
}

/// Resolves a condition operand: a quoted literal, a decimal literal, or a path.
pub fn resolve_operand<'c>(token: &str, ctx: &'c Context<'_>) -> Option<Cow<'c, Value>> {
    if let Some(literal) = quoted(token) {
        return Some(Cow::Owned(Value::String(literal.to_string())));
    }
    if let Some(number) = parse_number(token) {
        return Some(Cow::Owned(Value::Number(number)));
    }
    resolve_path(token, ctx)
}

fn quoted(token: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|quote| {
        token
            .strip_prefix(quote)
            .and_then(|inner| inner.strip_suffix(quote))
    })
}

fn string_form(value: Option<&Value>) -> String {
    value.map(value_to_string).unwrap_or_default()
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Dotted path resolution against a [`Context`].
//!
//! The first segment is looked up in the scope stack (innermost first). A path
//! of a single segment that no scope binds then falls back to the current loop
//! element (`this`) when one is bound. After that come members of the root
//! model, and finally `root` (any casing) names the model itself. Later
//! segments are member lookups on the previous value. Resolution never fails
//! loudly: any missing segment makes the whole path unresolved.

use std::borrow::Cow;

use serde_json::Value;
use smallvec::SmallVec;

use crate::context::Context;
use crate::value::{eq_ignore_case, member};

/// Resolves `path` (for example `item.Profile.City`) in `ctx`.
pub fn resolve_path<'c>(path: &str, ctx: &'c Context<'_>) -> Option<Cow<'c, Value>> {
    resolve_with(path, ctx.root(), |name| ctx.lookup(name).map(Cow::Borrowed))
}

/// Resolves `path` into a value that outlives the borrow of `ctx`.
///
/// Values reached through the model stay borrowed from it; only values that a
/// scope owns (such as characters of an enumerated string) are cloned.
pub fn resolve_detached<'a>(path: &str, ctx: &Context<'a>) -> Option<Cow<'a, Value>> {
    resolve_with(path, ctx.root(), |name| {
        ctx.binding(name).map(|bound| match bound {
            Cow::Borrowed(value) => Cow::Borrowed(*value),
            Cow::Owned(value) => Cow::Owned(value.clone()),
        })
    })
}

fn resolve_with<'v>(
    path: &str,
    root: &'v Value,
    lookup: impl Fn(&str) -> Option<Cow<'v, Value>>,
) -> Option<Cow<'v, Value>> {
    let segments: SmallVec<[&str; 4]> = path
        .split('.')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();
    let (&head, rest) = segments.split_first()?;

    let mut current = lookup(head)
        .or_else(|| if rest.is_empty() { lookup("this") } else { None })
        .or_else(|| member(root, head))
        .or_else(|| eq_ignore_case(head, "root").then_some(Cow::Borrowed(root)))?;
    for segment in rest {
        current = step(current, segment)?;
    }
    Some(current)
}

fn step<'v>(current: Cow<'v, Value>, name: &str) -> Option<Cow<'v, Value>> {
    match current {
        Cow::Borrowed(value) => member(value, name),
        Cow::Owned(value) => member(&value, name).map(|found| Cow::Owned(found.into_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved(path: &str, ctx: &Context<'_>) -> Option<Value> {
        resolve_path(path, ctx).map(Cow::into_owned)
    }

    #[test]
    fn resolves_root_members_and_nested_paths() {
        let model = json!({"Name": "Alice", "Profile": {"City": "Paris"}});
        let ctx = Context::new(&model);
        assert_eq!(resolved("Name", &ctx), Some(json!("Alice")));
        assert_eq!(resolved("Profile.City", &ctx), Some(json!("Paris")));
        assert_eq!(resolved("profile.city", &ctx), Some(json!("Paris")));
    }

    #[test]
    fn missing_segments_short_circuit() {
        let model = json!({"Profile": {"City": "Paris"}, "Empty": null});
        let ctx = Context::new(&model);
        assert_eq!(resolved("Nope", &ctx), None);
        assert_eq!(resolved("Profile.Street", &ctx), None);
        assert_eq!(resolved("Profile.City.Zip", &ctx), None);
        assert_eq!(resolved("Empty.Anything", &ctx), None);
        assert_eq!(resolved("Empty", &ctx), Some(Value::Null));
    }

    #[test]
    fn blank_paths_resolve_to_nothing() {
        let model = json!({"a": 1});
        let ctx = Context::new(&model);
        assert_eq!(resolved("", &ctx), None);
        assert_eq!(resolved(" . ", &ctx), None);
    }

    #[test]
    fn root_alias_is_case_insensitive() {
        let model = json!({"Title": "Home"});
        let ctx = Context::new(&model);
        assert_eq!(resolved("root.Title", &ctx), Some(json!("Home")));
        assert_eq!(resolved("Root.Title", &ctx), Some(json!("Home")));
        assert_eq!(resolved("ROOT", &ctx), Some(model.clone()));
    }

    #[test]
    fn model_member_named_root_wins_over_alias() {
        let model = json!({"Root": {"Title": "inner"}, "Title": "outer"});
        let ctx = Context::new(&model);
        assert_eq!(resolved("Root.Title", &ctx), Some(json!("inner")));
        assert_eq!(resolved("root.Title", &ctx), Some(json!("outer")));
    }

    #[test]
    fn scopes_are_searched_before_the_model() {
        let model = json!({"item": "from model", "Items": [1, 2]});
        let mut ctx = Context::new(&model);
        ctx.push_scope();
        ctx.set("item", Cow::Owned(json!({"Name": "from scope"})));
        assert_eq!(resolved("item.Name", &ctx), Some(json!("from scope")));
        ctx.pop_scope();
        assert_eq!(resolved("item", &ctx), Some(json!("from model")));
    }

    #[test]
    fn pseudo_members_chain_through_owned_values() {
        let model = json!({"Items": [1, 2, 3]});
        let ctx = Context::new(&model);
        assert_eq!(resolved("Items.Count", &ctx), Some(json!(3)));
        assert_eq!(resolved("Items.Count.Anything", &ctx), None);
    }

    #[test]
    fn this_is_unbound_outside_loops() {
        let model = json!({"Name": "top"});
        let ctx = Context::new(&model);
        assert_eq!(resolved("this", &ctx), None);
        assert_eq!(resolved("this.Name", &ctx), None);
        assert_eq!(resolved("Name", &ctx), Some(json!("top")));
    }

    #[test]
    fn single_segment_falls_back_to_the_loop_element() {
        let model = json!({"Name": "top", "Sep": ","});
        let mut ctx = Context::new(&model);
        ctx.push_scope();
        ctx.set("this", Cow::Owned(json!({"Name": "inner"})));
        ctx.set("x", Cow::Owned(json!({"Name": "inner"})));

        assert_eq!(resolved("Missing", &ctx), Some(json!({"Name": "inner"})));
        assert_eq!(resolved("Sep", &ctx), Some(json!({"Name": "inner"})));
        assert_eq!(resolved("x.Name", &ctx), Some(json!("inner")));
        assert_eq!(resolved("root.Sep", &ctx), Some(json!(",")));
        assert_eq!(resolved("Name.Length", &ctx), Some(json!(3)));
        assert_eq!(resolved("Missing.Name", &ctx), None);
    }

    #[test]
    fn detached_results_borrow_from_the_model() {
        let model = json!({"Items": [{"Name": "a"}]});
        let mut ctx = Context::new(&model);
        ctx.push_scope();
        ctx.set("row", Cow::Borrowed(&model["Items"][0]));
        ctx.set("chr", Cow::Owned(json!("z")));

        assert!(matches!(resolve_detached("Items", &ctx), Some(Cow::Borrowed(_))));
        assert!(matches!(resolve_detached("row.Name", &ctx), Some(Cow::Borrowed(_))));
        assert_eq!(
            resolve_detached("chr", &ctx).map(Cow::into_owned),
            Some(json!("z"))
        );
        assert_eq!(resolve_detached("Nope.Deeper", &ctx), None);
    }
}

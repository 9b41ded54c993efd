// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::borrow::Cow;

use serde_json::Value;

use crate::ast::{Block, ForEachNode, IfNode, Node, VarNode};
use crate::condition;
use crate::context::Context;
use crate::resolve::{resolve_detached, resolve_path};
use crate::value::{elements, escape_html, value_to_string};

/// Renders `block` against `model` with a fresh [`Context`].
pub fn render_block(block: &Block, model: &Value) -> String {
    let mut ctx = Context::new(model);
    let mut output = String::new();
    write_block(&mut ctx, block, &mut output);
    output
}

fn write_block(ctx: &mut Context<'_>, block: &Block, output: &mut String) {
    for node in &block.nodes {
        match node {
            Node::Text(text) => output.push_str(&text.text),
            Node::Var(var) => write_var(ctx, var, output),
            Node::If(if_node) => write_if(ctx, if_node, output),
            Node::ForEach(foreach) => write_foreach(ctx, foreach, output),
        }
    }
}

fn write_var(ctx: &Context<'_>, node: &VarNode, output: &mut String) {
    let text = resolve_path(&node.expr, ctx)
        .map(|value| value_to_string(&value))
        .unwrap_or_default();
    if node.is_raw() {
        output.push_str(&text);
    } else {
        output.push_str(&escape_html(&text));
    }
}

fn write_if(ctx: &mut Context<'_>, node: &IfNode, output: &mut String) {
    if condition::evaluate(&node.condition, ctx) {
        write_block(ctx, &node.then_block, output);
    } else if let Some(else_block) = &node.else_block {
        write_block(ctx, else_block, output);
    }
}

fn write_foreach(ctx: &mut Context<'_>, node: &ForEachNode, output: &mut String) {
    let Some(items) = resolve_detached(&node.source_expr, ctx).and_then(loop_items) else {
        return;
    };

    for item in items {
        ctx.push_scope();
        ctx.set("this", item.clone());
        ctx.set(node.item_name.as_str(), item);
        write_block(ctx, &node.body, output);
        ctx.pop_scope();
    }
}

/// Elements of a loop source. Elements of a source borrowed from the model
/// stay borrowed.
fn loop_items(source: Cow<'_, Value>) -> Option<Vec<Cow<'_, Value>>> {
    match source {
        Cow::Borrowed(value) => Some(elements(value)?.collect()),
        Cow::Owned(value) => {
            let items = elements(&value)?
                .map(|item| Cow::Owned(item.into_owned()))
                .collect();
            Some(items)
        }
    }
}

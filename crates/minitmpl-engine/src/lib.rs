#![forbid(unsafe_code)]
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Parser and renderer for the minitmpl template language.
//!
//! Templates mix literal text with four directives:
//!
//! | Construct | Syntax |
//! |---|---|
//! | Variable | `${path.to.value}` or `$(path.to.value)` |
//! | Conditional | `$if(cond)...[$else...]$endif` |
//! | Loop | `$foreach(var x in path)...$endfor` or `$foreach(x in path)...$endfor` |
//! | Raw output | a path whose last segment ends in `Html` |
//!
//! Conditions are a bare path (truthiness), `left == right`, or
//! `collection.Contains(item)`. Models are `serde_json::Value`s; any
//! `Serialize` type can be rendered through [`Template::render_serialize`].
//!
//! Only parsing can fail. Rendering never errors: unknown paths render as
//! empty strings and unknown loop sources render nothing.
//!
//! ```
//! use minitmpl_engine::Template;
//! use serde_json::json;
//!
//! let tmpl = Template::parse_str("greeting", "Hello, ${Name}!").unwrap();
//! assert_eq!(tmpl.render(&json!({"Name": "Bob"})), "Hello, Bob!");
//! ```

pub mod ast;
pub mod condition;
pub mod context;
mod error;
mod parser;
mod render;
pub mod resolve;
pub mod telemetry;
pub mod value;

pub use ast::{Ast, Block, ForEachNode, IfNode, Node, Span, TextNode, VarNode, VarStyle};
pub use context::Context;
pub use error::Error;
pub use telemetry::Phase;
pub use value::{escape_html, is_truthy, value_to_string};

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Instant;

/// Parsed template with associated AST and original source.
///
/// A `Template` is immutable once parsed and can be rendered any number of
/// times, including from several threads at once.
#[derive(Clone)]
pub struct Template {
    name: String,
    source: String,
    ast: Ast,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

impl Template {
    /// Parses template source into an AST representation.
    pub fn parse_str(name: &str, source: &str) -> Result<Self, Error> {
        let started = Instant::now();
        let result = parser::parse_template(name, source);
        telemetry::record(
            Phase::Parse,
            name,
            source.len(),
            started.elapsed(),
            result.is_ok(),
        );
        Ok(Self {
            name: name.to_string(),
            source: source.to_string(),
            ast: result?,
        })
    }

    /// Returns the original template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the original template source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns a reference to the parsed AST.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Renders the template against the provided data.
    pub fn render(&self, data: &Value) -> String {
        let started = Instant::now();
        let output = render::render_block(&self.ast.root, data);
        telemetry::record(
            Phase::Render,
            &self.name,
            self.source.len(),
            started.elapsed(),
            true,
        );
        output
    }

    /// Converts `data` into the engine's data model and renders against it.
    ///
    /// Struct fields become members that resolve case-insensitively, so a
    /// field `city` answers to `${Profile.City}`.
    pub fn render_serialize<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, Error> {
        let value = serde_json::to_value(data)?;
        Ok(self.render(&value))
    }

    /// Returns a canonical string representation of the parsed template.
    ///
    /// Expressions are printed trimmed, so the output may differ from the
    /// source in whitespace inside directives; it parses back to the same tree.
    pub fn to_template_string(&self) -> String {
        let mut out = String::new();
        Self::write_block(&mut out, &self.ast.root);
        out
    }

    fn write_block(out: &mut String, block: &Block) {
        for node in &block.nodes {
            match node {
                Node::Text(text) => out.push_str(&text.text),
                Node::Var(var) => out.push_str(&var.to_template_fragment()),
                Node::If(if_node) => {
                    out.push_str("$if(");
                    out.push_str(&if_node.condition);
                    out.push(')');
                    Self::write_block(out, &if_node.then_block);
                    if let Some(else_block) = &if_node.else_block {
                        out.push_str("$else");
                        Self::write_block(out, else_block);
                    }
                    out.push_str("$endif");
                }
                Node::ForEach(foreach) => {
                    out.push_str("$foreach(var ");
                    out.push_str(&foreach.item_name);
                    out.push_str(" in ");
                    out.push_str(&foreach.source_expr);
                    out.push(')');
                    Self::write_block(out, &foreach.body);
                    out.push_str("$endfor");
                }
            }
        }
    }
}

/// Parses and renders `source` in one step.
pub fn render_str(source: &str, data: &Value) -> Result<String, Error> {
    Ok(Template::parse_str("inline", source)?.render(data))
}

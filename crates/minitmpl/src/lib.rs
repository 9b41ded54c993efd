#![forbid(unsafe_code)]
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! HTML template rendering facade built on [`minitmpl_engine`].
//!
//! This crate is the only layer that touches the filesystem. Every call parses
//! the template afresh; callers that render the same template repeatedly can
//! hold on to a [`Template`] instead.

pub use minitmpl_engine::{
    escape_html, is_truthy, render_str, telemetry, value_to_string, Ast, Block, Context, Error,
    ForEachNode, IfNode, Node, Span, Template, TextNode, VarNode, VarStyle,
};

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

/// Entry points an HTTP view layer (or any other collaborator) renders through.
pub trait TemplateRenderer {
    /// Renders `template` against `model`.
    fn render_from_string(&self, template: &str, model: &Value) -> Result<String, Error>;

    /// Reads the whole file at `path` and renders it against `model`.
    fn render_from_file(&self, path: &Path, model: &Value) -> Result<String, Error>;

    /// Renders the template at `input` and writes the result to `output`,
    /// creating the destination directory when it is missing. The rendered
    /// text is returned as well.
    fn render_to_file(&self, input: &Path, output: &Path, model: &Value)
        -> Result<String, Error>;
}

/// [`TemplateRenderer`] producing HTML: interpolated values are escaped unless
/// their path ends in `Html`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTemplateRenderer;

impl HtmlTemplateRenderer {
    /// Creates a renderer.
    pub fn new() -> Self {
        Self
    }

    /// Like [`TemplateRenderer::render_from_string`], for any `Serialize` model.
    pub fn render_serialize_from_string<T: Serialize + ?Sized>(
        &self,
        template: &str,
        model: &T,
    ) -> Result<String, Error> {
        self.render_from_string(template, &to_model(model)?)
    }

    /// Like [`TemplateRenderer::render_from_file`], for any `Serialize` model.
    pub fn render_serialize_from_file<T: Serialize + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        model: &T,
    ) -> Result<String, Error> {
        self.render_from_file(path.as_ref(), &to_model(model)?)
    }

    /// Like [`TemplateRenderer::render_to_file`], for any `Serialize` model.
    pub fn render_serialize_to_file<T: Serialize + ?Sized>(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        model: &T,
    ) -> Result<String, Error> {
        self.render_to_file(input.as_ref(), output.as_ref(), &to_model(model)?)
    }
}

impl TemplateRenderer for HtmlTemplateRenderer {
    fn render_from_string(&self, template: &str, model: &Value) -> Result<String, Error> {
        render_named("inline", template, model)
    }

    fn render_from_file(&self, path: &Path, model: &Value) -> Result<String, Error> {
        let source = read_template(path)?;
        render_named(&path.display().to_string(), &source, model)
    }

    fn render_to_file(
        &self,
        input: &Path,
        output: &Path,
        model: &Value,
    ) -> Result<String, Error> {
        let rendered = self.render_from_file(input, model)?;
        write_output(output, &rendered)?;
        Ok(rendered)
    }
}

fn render_named(name: &str, source: &str, model: &Value) -> Result<String, Error> {
    Ok(Template::parse_str(name, source)?.render(model))
}

fn to_model<T: Serialize + ?Sized>(model: &T) -> Result<Value, Error> {
    Ok(serde_json::to_value(model)?)
}

fn read_template(path: &Path) -> Result<String, Error> {
    let result = fs::read_to_string(path);
    telemetry::record_file_access(&path.display().to_string(), "read", result.is_ok());
    result.map_err(|err| Error::io(path, err))
}

fn write_output(path: &Path, contents: &str) -> Result<(), Error> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;
    }
    let result = fs::write(path, contents);
    telemetry::record_file_access(&path.display().to_string(), "write", result.is_ok());
    result.map_err(|err| Error::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_from_string() {
        let renderer = HtmlTemplateRenderer::new();
        let out = renderer
            .render_from_string("<p>${Name}</p>", &json!({"Name": "A & B"}))
            .unwrap();
        assert_eq!(out, "<p>A &amp; B</p>");
    }

    #[test]
    fn usable_as_trait_object() {
        let renderer: Box<dyn TemplateRenderer> = Box::new(HtmlTemplateRenderer);
        let out = renderer
            .render_from_string("$if(On)on$endif", &json!({"On": 1}))
            .unwrap();
        assert_eq!(out, "on");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = HtmlTemplateRenderer
            .render_from_file(Path::new("/definitely/not/here.html"), &json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.html"));
    }

    #[test]
    fn syntax_errors_surface_from_strings() {
        let err = HtmlTemplateRenderer
            .render_from_string("$foreach(x)$endfor", &json!({}))
            .unwrap_err();
        assert_eq!(err.offset(), Some(9));
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::fmt;

/// Byte offsets into the original template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Root AST structure for a parsed template.
#[derive(Debug, Clone)]
pub struct Ast {
    pub name: String,
    pub root: Block,
}

impl Ast {
    pub fn new(name: impl Into<String>, root: Block) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

/// A sequential block of nodes.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub nodes: Vec<Node>,
}

impl Block {
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Node types recognised by the parser.
///
/// The set is closed: the renderer and the source printer match on it
/// exhaustively.
#[derive(Debug, Clone)]
pub enum Node {
    Text(TextNode),
    Var(VarNode),
    If(IfNode),
    ForEach(ForEachNode),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Text(node) => node.span,
            Node::Var(node) => node.span,
            Node::If(node) => node.span,
            Node::ForEach(node) => node.span,
        }
    }
}

/// Raw text literal.
#[derive(Debug, Clone)]
pub struct TextNode {
    pub span: Span,
    pub text: String,
}

impl TextNode {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

/// Which delimiters a variable was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarStyle {
    /// `${path}`
    Brace,
    /// `$(path)`
    Paren,
}

/// Interpolation of a dotted path (`${a.b}` or `$(a.b)`).
#[derive(Debug, Clone)]
pub struct VarNode {
    pub span: Span,
    pub expr: String,
    pub style: VarStyle,
}

impl VarNode {
    pub fn new(span: Span, expr: impl Into<String>, style: VarStyle) -> Self {
        Self {
            span,
            expr: expr.into(),
            style,
        }
    }

    /// Reports whether the value is emitted without HTML escaping, which is the
    /// case when the last path segment ends in `Html`.
    pub fn is_raw(&self) -> bool {
        let last = self.expr.rsplit('.').next().unwrap_or_default();
        last.len() >= 4
            && last.is_char_boundary(last.len() - 4)
            && last[last.len() - 4..].eq_ignore_ascii_case("html")
    }

    pub fn to_template_fragment(&self) -> String {
        match self.style {
            VarStyle::Brace => format!("${{{}}}", self.expr),
            VarStyle::Paren => format!("$({})", self.expr),
        }
    }
}

/// `$if(cond) ... [$else ...] $endif`
#[derive(Debug, Clone)]
pub struct IfNode {
    pub span: Span,
    pub condition: String,
    pub then_block: Block,
    pub else_block: Option<Block>,
}

impl IfNode {
    pub fn new(
        span: Span,
        condition: impl Into<String>,
        then_block: Block,
        else_block: Option<Block>,
    ) -> Self {
        Self {
            span,
            condition: condition.into(),
            then_block,
            else_block,
        }
    }
}

/// `$foreach(var item in source) ... $endfor`
#[derive(Debug, Clone)]
pub struct ForEachNode {
    pub span: Span,
    pub item_name: String,
    pub source_expr: String,
    pub body: Block,
}

impl ForEachNode {
    pub fn new(
        span: Span,
        item_name: impl Into<String>,
        source_expr: impl Into<String>,
        body: Block,
    ) -> Self {
        Self {
            span,
            item_name: item_name.into(),
            source_expr: source_expr.into(),
            body,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Text(node) => write!(f, "Text({:?})", node.text),
            Node::Var(node) => write!(f, "Var({:?})", node.expr),
            Node::If(node) => write!(f, "If({:?})", node.condition),
            Node::ForEach(node) => {
                write!(f, "ForEach({:?} in {:?})", node.item_name, node.source_expr)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(expr: &str) -> VarNode {
        VarNode::new(Span::new(0, 0), expr, VarStyle::Brace)
    }

    #[test]
    fn raw_suffix_checks_last_segment() {
        assert!(var("BodyHtml").is_raw());
        assert!(var("page.introHTML").is_raw());
        assert!(var("Html").is_raw());
        assert!(!var("page.Title").is_raw());
        assert!(!var("HtmlBody.text").is_raw());
        assert!(!var("tml").is_raw());
    }

    #[test]
    fn var_fragment_keeps_delimiters() {
        assert_eq!(var("a.b").to_template_fragment(), "${a.b}");
        let paren = VarNode::new(Span::new(0, 0), "a.b", VarStyle::Paren);
        assert_eq!(paren.to_template_fragment(), "$(a.b)");
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::ast::{Ast, Block, ForEachNode, IfNode, Node, Span, TextNode, VarNode, VarStyle};
use crate::error::Error;

const VAR_BRACE_OPEN: &str = "${";
const VAR_PAREN_OPEN: &str = "$(";
const IF_OPEN: &str = "$if(";
const FOREACH_OPEN: &str = "$foreach(";
const ELSE: &str = "$else";
const ENDIF: &str = "$endif";
const ENDFOR: &str = "$endfor";

const DIRECTIVE_PREFIXES: [&str; 4] = [VAR_BRACE_OPEN, VAR_PAREN_OPEN, IF_OPEN, FOREACH_OPEN];

/// Primary entry point for parsing template sources.
///
/// The parser is a single forward cursor over the source. Directives are
/// recognised by literal prefix matching at the cursor; there is no separate
/// token stream. Nested constructs are handled by recursive calls to
/// `parse_block`, each of which runs until its stop token:
///
/// - the `then` branch of an `$if` stops at `$else` or `$endif`,
/// - the `else` branch stops at `$endif`,
/// - a `$foreach` body stops at `$endfor`,
/// - the top level runs to the end of input.
///
/// Closers that belong to no open construct (a top-level `$endif`, `$endfor`
/// or `$else`, or a `$endfor` inside an `$if`) are ordinary text.
pub fn parse_template(name: &str, source: &str) -> Result<Ast, Error> {
    let mut parser = Parser::new(source);
    let root = parser.parse_block(None)?;
    Ok(Ast::new(name, root))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopToken {
    EndIf,
    EndFor,
}

impl StopToken {
    fn literal(self) -> &'static str {
        match self {
            StopToken::EndIf => ENDIF,
            StopToken::EndFor => ENDFOR,
        }
    }
}

struct Parser<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self { source, pos: 0 }
    }

    fn parse_block(&mut self, stop: Option<StopToken>) -> Result<Block, Error> {
        let mut block = Block::default();
        while !self.eof() {
            if self.at_block_end(stop) {
                break;
            }

            let node = if self.peek(VAR_BRACE_OPEN) {
                self.parse_var(VarStyle::Brace)?
            } else if self.peek(VAR_PAREN_OPEN) {
                self.parse_var(VarStyle::Paren)?
            } else if self.peek(IF_OPEN) {
                self.parse_if()?
            } else if self.peek(FOREACH_OPEN) {
                self.parse_foreach()?
            } else {
                self.parse_text(stop)
            };
            block.push(node);
        }
        Ok(block)
    }

    fn at_block_end(&self, stop: Option<StopToken>) -> bool {
        match stop {
            Some(StopToken::EndIf) => self.peek(ELSE) || self.peek(ENDIF),
            Some(StopToken::EndFor) => self.peek(ENDFOR),
            None => false,
        }
    }

    fn parse_var(&mut self, style: VarStyle) -> Result<Node, Error> {
        let start = self.pos;
        let expr = match style {
            VarStyle::Brace => {
                self.expect(VAR_BRACE_OPEN)?;
                let expr = self.read_until_brace();
                self.expect("}")?;
                expr
            }
            VarStyle::Paren => {
                self.expect(VAR_PAREN_OPEN)?;
                let expr = self.read_until_close_paren();
                self.expect(")")?;
                expr
            }
        };
        Ok(Node::Var(VarNode::new(
            Span::new(start, self.pos),
            expr.trim(),
            style,
        )))
    }

    fn parse_if(&mut self) -> Result<Node, Error> {
        let start = self.pos;
        self.expect(IF_OPEN)?;
        let condition = self.read_until_close_paren();
        self.expect(")")?;

        let then_block = self.parse_block(Some(StopToken::EndIf))?;
        let else_block = if self.peek(ELSE) {
            self.expect(ELSE)?;
            Some(self.parse_block(Some(StopToken::EndIf))?)
        } else {
            None
        };
        self.expect(StopToken::EndIf.literal())?;

        Ok(Node::If(IfNode::new(
            Span::new(start, self.pos),
            condition.trim(),
            then_block,
            else_block,
        )))
    }

    fn parse_foreach(&mut self) -> Result<Node, Error> {
        let start = self.pos;
        self.expect(FOREACH_OPEN)?;
        let header_start = self.pos;
        let header = self.read_until_close_paren();
        self.expect(")")?;

        let Some((item_name, source_expr)) = split_foreach_header(header) else {
            return Err(Error::syntax(
                "malformed foreach header, expected `var item in path`",
                self.char_offset(header_start),
            ));
        };

        let body = self.parse_block(Some(StopToken::EndFor))?;
        self.expect(StopToken::EndFor.literal())?;

        Ok(Node::ForEach(ForEachNode::new(
            Span::new(start, self.pos),
            item_name,
            source_expr,
            body,
        )))
    }

    fn parse_text(&mut self, stop: Option<StopToken>) -> Node {
        let start = self.pos;
        while !self.eof() {
            if self.pos > start && self.text_ends_here(stop) {
                break;
            }
            // Every terminator starts with `$`, so jump straight to the next one.
            let rest = self.rest();
            let step = rest
                .char_indices()
                .skip(1)
                .find(|(_, ch)| *ch == '$')
                .map_or(rest.len(), |(idx, _)| idx);
            self.pos += step;
        }
        Node::Text(TextNode::new(
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        ))
    }

    fn text_ends_here(&self, stop: Option<StopToken>) -> bool {
        if DIRECTIVE_PREFIXES.iter().any(|prefix| self.peek(prefix)) {
            return true;
        }
        match stop {
            Some(StopToken::EndIf) => self.peek(ENDIF) || self.peek(ELSE),
            Some(StopToken::EndFor) => self.peek(ENDFOR),
            None => false,
        }
    }

    fn read_until_brace(&mut self) -> &'s str {
        let source = self.source;
        let start = self.pos;
        self.pos = source[start..]
            .find('}')
            .map_or(source.len(), |idx| start + idx);
        &source[start..self.pos]
    }

    /// Reads up to the `)` that closes the directive, skipping nested
    /// parentheses and quoted spans so `Tags.Contains('x')` stays intact.
    ///
    /// A quote that is never closed (an apostrophe inside a literal, as in
    /// `Name == 'Don't'`) does not count as quoting: the read is repeated with
    /// parentheses only.
    fn read_until_close_paren(&mut self) -> &'s str {
        let source = self.source;
        let start = self.pos;
        let rest = &source[start..];
        let end = find_close_paren(rest, true)
            .or_else(|| find_close_paren(rest, false))
            .map_or(source.len(), |idx| start + idx);
        self.pos = end;
        &source[start..end]
    }

    fn expect(&mut self, literal: &str) -> Result<(), Error> {
        if !self.peek(literal) {
            return Err(self.error(format!("expected `{literal}`")));
        }
        self.pos += literal.len();
        Ok(())
    }

    fn peek(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn char_offset(&self, byte_pos: usize) -> usize {
        self.source[..byte_pos].chars().count()
    }

    fn error(&self, message: String) -> Error {
        Error::syntax(message, self.char_offset(self.pos))
    }
}

/// Byte index of the `)` at depth zero in `text`. With `quotes`, quoted spans
/// are skipped, and an unterminated quote means no match.
fn find_close_paren(text: &str, quotes: bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (idx, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') if quotes => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') if depth == 0 => return Some(idx),
            (None, ')') => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Splits `var item in path` (or `item in path`) into the item name and the
/// source expression.
fn split_foreach_header(header: &str) -> Option<(&str, &str)> {
    let signature = header.trim();
    let signature = signature.strip_prefix("var ").unwrap_or(signature);

    let mut parts = signature.split(" in ").filter(|part| !part.is_empty());
    let item_name = parts.next()?.trim();
    let source_expr = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }
    Some((item_name, source_expr))
}

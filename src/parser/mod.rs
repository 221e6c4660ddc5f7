//! Parser module - Reads the mask text format into [`Mask`] trees.
//!
//! The grammar is
//!
//! ```text
//! mask    := branch (',' branch)*
//! branch  := segment ('.' segment)*
//! segment := key | '*' | '(' mask ')'
//! key     := [A-Za-z0-9_]+ | "json string"
//! ```
//!
//! A group fans the branch out: `a.(b,c).d` is `a.b.d,a.c.d`.

mod error;
mod level;
mod lexer;

#[cfg(test)]
mod parser_test;

pub use error::ParseError;
pub use lexer::{Lexer, Token, TokenKind};

use tracing::{debug, trace};

use crate::fieldmask::{FieldKey, Mask};
use level::{Level, Tree};

/// Default limit on the depth of parsed masks.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// ParseOptions configures [`parse_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of nested levels in the parsed mask.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Returns options with the given depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Key,
    Separator,
    LevelStart,
}

/// Parses mask text with default options.
///
/// Empty or blank text is the empty mask.
pub fn parse(source: &str) -> Result<Mask, ParseError> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parses mask text.
pub fn parse_with_options(source: &str, opts: &ParseOptions) -> Result<Mask, ParseError> {
    trace!(source, "parsing mask");
    let result = Parser::new(source, opts).run();
    match &result {
        Ok(mask) => trace!(source, branches = mask.len(), "parsed mask"),
        Err(e) => debug!(source, error = %e, "failed to parse mask"),
    }
    result
}

struct Parser<'a> {
    source: &'a str,
    opts: &'a ParseOptions,
    tree: Tree,
    /// Enclosing levels, innermost last.
    stack: Vec<Level>,
    level: Level,
    state: State,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, opts: &'a ParseOptions) -> Self {
        let tree = Tree::new();
        let level = Level::top(tree.root());
        Parser {
            source,
            opts,
            tree,
            stack: Vec::new(),
            level,
            state: State::Key,
        }
    }

    fn run(mut self) -> Result<Mask, ParseError> {
        if self.source.trim_start_matches([' ', '\r', '\n', '\t']).is_empty() {
            return Ok(Mask::new());
        }
        let tokens = Lexer::new(self.source).collect::<Result<Vec<_>, _>>()?;
        for token in &tokens {
            self.step(token)?;
        }
        if !self.stack.is_empty() {
            return Err(self.error(self.level.pos, "unclosed left brace"));
        }
        if self.state != State::Separator {
            let end = self.source.chars().count();
            return Err(self.error(end, "unexpected end of mask"));
        }
        Ok(self.tree.into_mask())
    }

    fn step(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.state == State::LevelStart {
            // An empty group is allowed and leaves the branch unchanged.
            self.state = if token.kind == TokenKind::RBrace {
                State::Separator
            } else {
                State::Key
            };
        }
        match self.state {
            State::Separator => self.expect_separator(token),
            State::Key | State::LevelStart => self.expect_key(token),
        }
    }

    fn expect_key(&mut self, token: &Token) -> Result<(), ParseError> {
        match token.kind {
            TokenKind::PlainKey => {
                self.level
                    .add_key(&mut self.tree, &FieldKey::new(token.value.as_str()));
                self.check_depth(token)?;
                self.state = State::Separator;
            }
            TokenKind::WildCard => {
                self.level.add_any(&mut self.tree);
                self.check_depth(token)?;
                self.state = State::Separator;
            }
            TokenKind::LBrace => {
                let nested = Level::nested(&self.level, token.pos);
                self.stack.push(std::mem::replace(&mut self.level, nested));
                self.state = State::LevelStart;
            }
            _ => {
                return Err(self.error(
                    token.pos,
                    format!("unexpected token {}, expecting field or submask", token),
                ));
            }
        }
        Ok(())
    }

    fn expect_separator(&mut self, token: &Token) -> Result<(), ParseError> {
        match token.kind {
            TokenKind::Dot => self.state = State::Key,
            TokenKind::Comma => {
                self.level.new_mask();
                self.state = State::Key;
            }
            TokenKind::RBrace => {
                let Some(parent) = self.stack.pop() else {
                    return Err(self.error(token.pos, "unmatched right brace"));
                };
                let inner = std::mem::replace(&mut self.level, parent);
                inner.close_into(&mut self.level);
                self.state = State::Separator;
            }
            _ => {
                return Err(self.error(
                    token.pos,
                    format!(
                        "unexpected token {}, expecting separator or closing brace",
                        token
                    ),
                ));
            }
        }
        Ok(())
    }

    fn check_depth(&self, token: &Token) -> Result<(), ParseError> {
        if self.level.max_active_depth(&self.tree) > self.opts.max_depth {
            return Err(self.error(token.pos, "mask is nested too deeply"));
        }
        Ok(())
    }

    fn error(&self, pos: usize, summary: impl Into<String>) -> ParseError {
        ParseError::contexted(self.source, pos, summary)
    }
}

//! Tokenizer for the mask text format.

use std::fmt;

use super::error::ParseError;
use crate::fieldmask::is_plain_key_char;

/// TokenKind is the kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comma,
    Dot,
    LBrace,
    RBrace,
    WildCard,
    PlainKey,
    QuotedKey,
    Eol,
}

impl TokenKind {
    fn name(self) -> &'static str {
        match self {
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::WildCard => "WILD_CARD",
            TokenKind::PlainKey => "PLAIN_KEY",
            TokenKind::QuotedKey => "QUOTED_KEY",
            TokenKind::Eol => "EOL",
        }
    }
}

/// Token is a single lexed token with its character position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub pos: usize,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, pos: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            pos,
        }
    }

    /// Decodes a quoted key token into a plain key token.
    ///
    /// Other tokens are returned unchanged.
    pub fn unquote(self, source: &str) -> Result<Token, ParseError> {
        if self.kind != TokenKind::QuotedKey {
            return Ok(self);
        }
        let decoded: serde_json::Value = serde_json::from_str(&self.value)
            .map_err(|e| ParseError::contexted(source, self.pos, format!("invalid quoted key: {}", e)))?;
        match decoded {
            serde_json::Value::String(key) => Ok(Token::new(TokenKind::PlainKey, key, self.pos)),
            _ => Err(ParseError::contexted(
                source,
                self.pos,
                format!("token is not a quoted string: {}", self),
            )),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.kind == TokenKind::QuotedKey {
            self.value.clone()
        } else {
            serde_json::to_string(&self.value).map_err(|_| fmt::Error)?
        };
        write!(f, "Token{}({} pos {})", self.kind.name(), value, self.pos)
    }
}

/// Lexer splits mask text into tokens.
///
/// Whitespace between tokens is skipped. Quoted keys are decoded as they are
/// read, so the parser only ever sees plain keys.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            chars: source.chars().collect(),
            pos: 0,
            done: false,
        }
    }

    /// Scans the next raw token, quoted keys still quoted.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eol, "", start));
        };
        let kind = match c {
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LBrace,
            ')' => TokenKind::RBrace,
            '*' => TokenKind::WildCard,
            '"' => return self.scan_quoted_key(),
            c if is_plain_key_char(c) => return Ok(self.scan_plain_key()),
            _ => {
                return Err(ParseError::contexted(self.source, start, "unexpected symbol"));
            }
        };
        self.pos += 1;
        Ok(Token::new(kind, c.to_string(), start))
    }

    fn scan_plain_key(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(is_plain_key_char) {
            self.pos += 1;
        }
        Token::new(TokenKind::PlainKey, self.slice(start, self.pos), start)
    }

    fn scan_quoted_key(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.chars.len() && self.chars[self.pos] != '"' {
            // An escape always covers the next character.
            if self.chars[self.pos] == '\\' {
                self.pos += 2;
            } else {
                self.pos += 1;
            }
        }
        if self.peek() == Some('"') {
            self.pos += 1;
            return Ok(Token::new(
                TokenKind::QuotedKey,
                self.slice(start, self.pos),
                start,
            ));
        }
        Err(ParseError::contexted(
            self.source,
            start,
            "unterminated quoted string",
        ))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ParseError>;

    /// Yields decoded tokens until the end of input; the end itself is not
    /// yielded.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self
            .next_token()
            .and_then(|token| token.unquote(self.source));
        match token {
            Ok(token) if token.kind == TokenKind::Eol => {
                self.done = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\n' | '\t')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Result<Vec<(TokenKind, String, usize)>, ParseError> {
        Lexer::new(source)
            .map(|t| t.map(|t| (t.kind, t.value, t.pos)))
            .collect()
    }

    #[test]
    fn test_lex_punctuation_and_keys() {
        let tokens = lex(" a.( b ,*)\n").unwrap();
        assert_eq!(
            tokens,
            vec![
                (TokenKind::PlainKey, "a".to_string(), 1),
                (TokenKind::Dot, ".".to_string(), 2),
                (TokenKind::LBrace, "(".to_string(), 3),
                (TokenKind::PlainKey, "b".to_string(), 5),
                (TokenKind::Comma, ",".to_string(), 7),
                (TokenKind::WildCard, "*".to_string(), 8),
                (TokenKind::RBrace, ")".to_string(), 9),
            ]
        );
    }

    #[test]
    fn test_lex_quoted_key_is_decoded() {
        let tokens = lex(r#""a.b\"c".x"#).unwrap();
        assert_eq!(tokens[0], (TokenKind::PlainKey, "a.b\"c".to_string(), 0));
        assert_eq!(tokens[1], (TokenKind::Dot, ".".to_string(), 8));
        assert_eq!(tokens[2], (TokenKind::PlainKey, "x".to_string(), 9));
    }

    #[test]
    fn test_lex_positions_count_characters() {
        let tokens = lex(r#""ключ".b"#).unwrap();
        assert_eq!(tokens[0].1, "ключ");
        assert_eq!(tokens[1].2, 6);
        assert_eq!(tokens[2].2, 7);
    }

    #[test]
    fn test_lex_unexpected_symbol() {
        let err = lex("a.b-c").unwrap_err();
        assert_eq!(err.summary(), "unexpected symbol");
        assert_eq!(err.position(), 3);
    }

    #[test]
    fn test_lex_unterminated_quote() {
        let err = lex(r#"a."bc"#).unwrap_err();
        assert_eq!(err.summary(), "unterminated quoted string");
        assert_eq!(err.position(), 2);

        // A trailing backslash escapes past the end of input.
        let err = lex(r#""ab\"#).unwrap_err();
        assert_eq!(err.summary(), "unterminated quoted string");
    }

    #[test]
    fn test_lex_bad_escape() {
        let err = lex(r#"a."\q""#).unwrap_err();
        assert!(err.summary().starts_with("invalid quoted key"), "{}", err);
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenKind::Dot, ".", 2);
        assert_eq!(token.to_string(), r#"TokenDOT("." pos 2)"#);
    }
}

//! Parse errors with source context.

use thiserror::Error;

/// Maximum length of the context shown in error messages.
const MAX_CONTEXT: usize = 30;
/// Number of characters shown before the error position.
const CONTEXT_BACK: usize = 12;
/// Combining enclosing square, placed right after the error position.
const ERROR_MARK: char = '\u{20de}';

/// ParseError represents a failure to read mask text.
///
/// Every error carries the character position of the failure and a snippet of
/// the source around it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{summary} {context}")]
pub struct ParseError {
    input: String,
    position: usize,
    summary: String,
    context: String,
}

impl ParseError {
    /// Creates an error at `position` (in characters) of `input`.
    pub fn contexted(input: &str, position: usize, summary: impl Into<String>) -> Self {
        ParseError {
            input: input.to_string(),
            position,
            summary: summary.into(),
            context: context_around(input, position),
        }
    }

    /// Returns the source text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the character position of the failure.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the short description of the failure.
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// Renders up to [`MAX_CONTEXT`] characters around `pos` with a mark at `pos`.
fn context_around(source: &str, pos: usize) -> String {
    let start = pos.saturating_sub(CONTEXT_BACK);
    let delta = pos - start;

    let tail: Vec<char> = source.chars().skip(start).collect();
    let mut snippet: Vec<char> = if tail.len() > MAX_CONTEXT {
        let mut cut = tail[..MAX_CONTEXT - 3].to_vec();
        cut.extend("...".chars());
        cut
    } else {
        tail
    };
    let mark_at = delta.min(snippet.len());
    snippet.insert(mark_at, ERROR_MARK);

    let marked: String = snippet.into_iter().collect();
    let quoted = serde_json::to_string(&marked).unwrap_or_else(|_| format!("{:?}", marked));
    format!("at position {} near {}", pos, quoted)
}

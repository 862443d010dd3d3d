use crate::ast::Position;
use serde::{Deserialize, Serialize};

/// Class of a syntax error. Every class is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The scanner could not form a token (unterminated string, comment, ...).
    Lexical,
    /// The current token does not match the one the grammar expects here.
    UnexpectedToken,
    /// A mandatory clause (`why:`, `do:`, `with:`, `then`) is absent.
    MissingClause,
    /// A keyword-shaped token is outside the closed set expected here.
    InvalidKeyword,
    /// Calls or `if` statements nest past the parser's depth limit.
    NestingLimit,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::UnexpectedToken => "unexpected_token",
            ErrorKind::MissingClause => "missing_clause",
            ErrorKind::InvalidKeyword => "invalid_keyword",
            ErrorKind::NestingLimit => "nesting_limit",
        }
    }
}

/// The first syntax fault in a source unit. No AST accompanies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    /// Text of the offending token, `EOF` at end of input.
    pub found: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(
        kind: ErrorKind,
        message: impl Into<String>,
        found: impl Into<String>,
        position: Position,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            found: found.into(),
            position,
        }
    }

    pub fn lexical(message: impl Into<String>, found: impl Into<String>, position: Position) -> Self {
        ParseError::new(ErrorKind::Lexical, message, found, position)
    }

    pub fn unexpected(expected: &str, found: &str, position: Position) -> Self {
        ParseError::new(
            ErrorKind::UnexpectedToken,
            format!("expected {}, got {:?}", expected, found),
            found,
            position,
        )
    }

    /// Input nested deeper than `limit` levels of calls or `if` statements.
    pub fn nesting_limit(limit: usize, found: &str, position: Position) -> Self {
        ParseError::new(
            ErrorKind::NestingLimit,
            format!("nesting deeper than {} levels, got {:?}", limit, found),
            found,
            position,
        )
    }

    pub fn missing_clause(clause: &str, found: &str, position: Position) -> Self {
        ParseError::new(
            ErrorKind::MissingClause,
            format!("missing mandatory '{}' clause, got {:?}", clause, found),
            found,
            position,
        )
    }

    pub fn invalid_keyword(what: &str, found: &str, position: Position) -> Self {
        ParseError::new(
            ErrorKind::InvalidKeyword,
            format!("invalid {} {:?}", what, found),
            found,
            position,
        )
    }

    /// Serialize to the expected-error JSON shape used by the conformance
    /// fixtures. All fields are present; `file` is null when unknown.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "column":  self.position.column,
            "file":    self.position.file,
            "found":   self.found,
            "kind":    self.kind.as_str(),
            "line":    self.position.line,
            "message": self.message,
        })
    }
}

/// Failure to obtain or parse a source unit.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

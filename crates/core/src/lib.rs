#![allow(clippy::result_large_err)]
//! cloudpact-core: CloudPact scanner and parser.
//!
//! Turns `.cp` source text into a [`File`] syntax tree. Parsing stops at the
//! first fault and reports it as a [`ParseError`] carrying the offending
//! token and its position.
//!
//! # Public API
//!
//! - [`parse()`], [`parse_with_filename()`], [`parse_with_options()`] -- parse
//!   in-memory source text
//! - [`parse_reader()`] and [`parse_source()`] -- read then parse, reporting
//!   I/O failures as [`LoadError`]
//! - [`ParseOptions`] / [`Grammar`] -- file name for positions and grammar
//!   generation
//! - AST types live in [`ast`]; the token stream is available via [`lexer`].

/// Version label of the grammar accepted by [`Grammar::Current`].
pub const GRAMMAR_VERSION: &str = "2.0";

pub mod ast;
pub mod error;
pub mod keywords;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod source;

use std::io::Read;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{Expr, File, Position, Statement};
pub use error::{ErrorKind, LoadError, ParseError};
pub use options::{Grammar, ParseOptions};
pub use source::{parse_source, FileSystemProvider, InMemoryProvider, SourceProvider};

/// Parse source text with default options.
pub fn parse(src: &str) -> Result<File, ParseError> {
    parse_with_options(src, &ParseOptions::default())
}

/// Parse source text, attaching `filename` to every reported position.
pub fn parse_with_filename(src: &str, filename: &str) -> Result<File, ParseError> {
    parse_with_options(src, &ParseOptions::new().with_filename(filename))
}

pub fn parse_with_options(src: &str, options: &ParseOptions) -> Result<File, ParseError> {
    let result = parser::parse_file(src, options);

    #[cfg(feature = "tracing")]
    match &result {
        Ok(file) => tracing::debug!(
            file = options.filename.as_deref().unwrap_or("<input>"),
            grammar = options.grammar.version(),
            records = file.records.len(),
            models = file.models.len(),
            functions = file.functions.len(),
            type_defs = file.type_defs.len(),
            assignments = file.assignments.len(),
            "parsed source unit"
        ),
        Err(err) => tracing::debug!(
            kind = err.kind.as_str(),
            position = %err.position,
            "parse failed"
        ),
    }

    result
}

/// Read all of `reader` as UTF-8 and parse it.
pub fn parse_reader<R: Read>(mut reader: R, options: &ParseOptions) -> Result<File, LoadError> {
    let mut src = String::new();
    reader
        .read_to_string(&mut src)
        .map_err(|source| LoadError::Io {
            path: options
                .filename
                .clone()
                .unwrap_or_else(|| "<reader>".to_owned()),
            source,
        })?;
    Ok(parse_with_options(&src, options)?)
}

//! Single-token-lookahead recursive-descent parser.
//!
//! The parser pulls tokens from a [`Scanner`] one at a time and stops at the
//! first syntax fault; there is no recovery and no partial [`File`].
use crate::ast::{File, Module, Position};
use crate::error::ParseError;
use crate::keywords;
use crate::lexer::{Scanner, Spanned, Token};
use crate::options::{Grammar, ParseOptions};

mod declarations;
mod expressions;
mod functions;
mod statements;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

/// Deepest allowed nesting of call arguments and `if` branches. Deeper input
/// is rejected instead of exhausting the stack.
pub const MAX_NESTING: usize = 128;

pub(crate) struct Parser<'a> {
    scanner: Scanner<'a>,
    tok: Spanned,
    grammar: Grammar,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str, options: &ParseOptions) -> Result<Self, ParseError> {
        let mut scanner = Scanner::new(src, options.filename.as_deref());
        let tok = scanner.advance()?;
        Ok(Parser {
            scanner,
            tok,
            grammar: options.grammar,
            depth: 0,
        })
    }

    fn peek(&self) -> &Token {
        &self.tok.token
    }

    fn pos(&self) -> Position {
        self.tok.pos.clone()
    }

    /// Move to the next token and return the one just consumed.
    fn advance(&mut self) -> Result<Spanned, ParseError> {
        let next = self.scanner.advance()?;
        Ok(std::mem::replace(&mut self.tok, next))
    }

    fn current_word(&self) -> Option<&str> {
        match self.peek() {
            Token::Word(w) => Some(w.as_str()),
            _ => None,
        }
    }

    fn is_word(&self, w: &str) -> bool {
        self.current_word() == Some(w)
    }

    fn found(&self) -> String {
        self.peek().text()
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected(expected, &self.found(), self.pos())
    }

    fn expect(&mut self, tok: Token) -> Result<(), ParseError> {
        if self.peek() == &tok {
            self.advance()?;
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", tok)))
        }
    }

    fn expect_word(&mut self, expected: &str) -> Result<Position, ParseError> {
        if self.is_word(expected) {
            Ok(self.advance()?.pos)
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    /// Consume a mandatory clause keyword (`why`, `do`, `with`, `then`).
    fn expect_clause(&mut self, keyword: &str, clause: &str) -> Result<Position, ParseError> {
        if self.is_word(keyword) {
            Ok(self.advance()?.pos)
        } else {
            Err(ParseError::missing_clause(clause, &self.found(), self.pos()))
        }
    }

    fn take_word(&mut self, what: &str) -> Result<String, ParseError> {
        if let Token::Word(w) = self.peek() {
            let w = w.clone();
            self.advance()?;
            Ok(w)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn take_str(&mut self, what: &str) -> Result<String, ParseError> {
        if let Token::Str(s) = self.peek() {
            let s = s.clone();
            self.advance()?;
            Ok(s)
        } else {
            Err(self.unexpected(what))
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::nesting_limit(
                MAX_NESTING,
                &self.found(),
                self.pos(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // -- File level ---------------------------------------------

    pub(crate) fn parse_file(&mut self) -> Result<File, ParseError> {
        let mut file = File {
            position: self.pos(),
            ..File::default()
        };

        if self.grammar == Grammar::Current && self.is_word("module") {
            file.module = Some(self.parse_module()?);
        }

        while self.peek() != &Token::Eof {
            self.parse_declaration(&mut file)?;
        }
        Ok(file)
    }

    fn parse_declaration(&mut self, file: &mut File) -> Result<(), ParseError> {
        let word = match self.current_word() {
            Some(w) if self.grammar.is_top_level_keyword(w) => w.to_owned(),
            _ => return Err(self.unexpected(&self.expected_declaration())),
        };
        match word.as_str() {
            "define" => self.parse_define(file)?,
            "function" => {
                let function = self.parse_function()?;
                file.functions.push(function);
            }
            "model" => {
                let model = self.parse_model()?;
                file.models.push(model);
            }
            "assign-use" => {
                let assignment = self.parse_assignment()?;
                file.assignments.push(assignment);
            }
            // `module` is only valid as the first declaration
            _ => return Err(self.unexpected(&self.expected_declaration())),
        }
        Ok(())
    }

    fn expected_declaration(&self) -> String {
        let words = match self.grammar {
            Grammar::Current => keywords::DECLARATION,
            Grammar::Legacy => keywords::LEGACY_TOP_LEVEL,
        };
        let quoted: Vec<_> = words.iter().map(|w| format!("'{}'", w)).collect();
        format!("declaration ({})", quoted.join(", "))
    }

    fn parse_module(&mut self) -> Result<Module, ParseError> {
        let position = self.expect_word("module")?;
        let name = self.take_word("module name")?;
        Ok(Module { name, position })
    }
}

/// Parse a whole source unit.
pub fn parse_file(src: &str, options: &ParseOptions) -> Result<File, ParseError> {
    let mut p = Parser::new(src, options)?;
    p.parse_file()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

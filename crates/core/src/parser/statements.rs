use super::Parser;
use crate::ast::{Expr, FieldAssignment, LiteralKind, Statement, USE_VARIABLE};
use crate::error::ParseError;
use crate::keywords;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    /// Parse one statement, or consume one filler token and return `None`
    /// when the current token does not start a statement.
    pub(super) fn parse_statement(&mut self) -> Result<Option<Statement>, ParseError> {
        let stmt = match self.current_word() {
            Some("if") => self.nested(Self::parse_if)?,
            Some("return") => self.parse_return()?,
            Some("set") => self.parse_set()?,
            Some("create") => self.parse_create()?,
            Some("fail") => self.parse_fail()?,
            Some("use") => self.parse_use()?,
            _ => {
                let _skipped = self.advance()?;
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    token = %_skipped.token,
                    position = %_skipped.pos,
                    "skipping token in function body"
                );
                return Ok(None);
            }
        };
        Ok(Some(stmt))
    }

    /// Branch of an `if`. Keywords that end a body run (other than
    /// statement keywords) leave the branch empty without being consumed.
    fn parse_branch(&mut self) -> Result<Option<Box<Statement>>, ParseError> {
        let ends_branch = match self.peek() {
            Token::Eof => true,
            Token::Word(w) => keywords::ends_body_run(w) && !keywords::is_statement_keyword(w),
            _ => false,
        };
        if ends_branch {
            return Ok(None);
        }
        Ok(self.parse_statement()?.map(Box::new))
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let position = self.expect_word("if")?;
        let condition = self.parse_expression()?;
        self.expect_clause("then", "then")?;
        let then_branch = self.parse_branch()?;
        let else_branch = if self.is_word("else") {
            self.advance()?;
            self.parse_branch()?
        } else {
            None
        };
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            position,
        })
    }

    fn parse_return(&mut self) -> Result<Statement, ParseError> {
        let position = self.expect_word("return")?;
        let value = if self.starts_expression() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Statement::Return { value, position })
    }

    fn starts_expression(&self) -> bool {
        match self.peek() {
            Token::Word(w) => !keywords::ends_body_run(w),
            Token::Str(_) | Token::Int(_) | Token::Float(_) => true,
            _ => false,
        }
    }

    fn parse_set(&mut self) -> Result<Statement, ParseError> {
        let position = self.expect_word("set")?;
        let variable = self.take_word("variable name after 'set'")?;
        self.expect(Token::Eq)?;
        let value = self.parse_expression()?;
        Ok(Statement::Assign {
            variable,
            value,
            position,
        })
    }

    /// `create Type with: field = expr ...` up to the next keyword that ends
    /// a body run.
    fn parse_create(&mut self) -> Result<Statement, ParseError> {
        let position = self.expect_word("create")?;
        let type_name = self.take_word("type name after 'create'")?;
        self.expect_clause("with", "with:")?;
        self.expect(Token::Colon)?;

        let mut assignments = Vec::new();
        while let Some(w) = self.current_word() {
            if keywords::ends_body_run(w) {
                break;
            }
            let field_position = self.pos();
            let field = self.take_word("field name")?;
            self.expect(Token::Eq)?;
            let value = self.parse_expression()?;
            assignments.push(FieldAssignment {
                field,
                value,
                position: field_position,
            });
        }
        Ok(Statement::Create {
            type_name,
            assignments,
            position,
        })
    }

    fn parse_fail(&mut self) -> Result<Statement, ParseError> {
        let position = self.expect_word("fail")?;
        let message = self.take_str("error message string after 'fail'")?;
        Ok(Statement::Fail { message, position })
    }

    /// `use bcrypt algorithm` becomes an assignment of the phrase, as one
    /// string literal, to [`USE_VARIABLE`].
    fn parse_use(&mut self) -> Result<Statement, ParseError> {
        let position = self.expect_word("use")?;
        let mut parts = Vec::new();
        while let Some(w) = self.current_word() {
            if keywords::ends_body_run(w) {
                break;
            }
            parts.push(w.to_owned());
            self.advance()?;
        }
        Ok(Statement::Assign {
            variable: USE_VARIABLE.to_owned(),
            value: Expr::Literal {
                value: parts.join(" "),
                kind: LiteralKind::String,
                position: position.clone(),
            },
            position,
        })
    }
}

use super::Parser;
use crate::ast::{BinaryOp, Expr, LiteralKind, Position};
use crate::error::ParseError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Expression parsing --------------------------------------
    //
    // Two tiers only: primaries, and a left-associative comparison tier on
    // top. Arithmetic characters are not operators; inside a function body
    // they end the expression and are skipped as filler.

    pub(super) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;
        while let Some(operator) = self.parse_compare_op()? {
            let right = self.parse_primary()?;
            let position = left.position().clone();
            left = Expr::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    /// Consume a comparison operator if one is next. `not contains` is one
    /// operator; a bare `not` is its own operator.
    fn parse_compare_op(&mut self) -> Result<Option<BinaryOp>, ParseError> {
        if self.is_word("not") {
            self.advance()?;
            if self.is_word("contains") {
                self.advance()?;
                return Ok(Some(BinaryOp::NotContains));
            }
            return Ok(Some(BinaryOp::Not));
        }
        let op = match self.peek() {
            Token::Lt => BinaryOp::Lt,
            Token::Gt => BinaryOp::Gt,
            Token::Eq => BinaryOp::Eq,
            Token::Word(w) if w == "contains" => BinaryOp::Contains,
            _ => return Ok(None),
        };
        self.advance()?;
        Ok(Some(op))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let position = self.pos();
        match self.peek().clone() {
            Token::Word(name) => {
                self.advance()?;
                if self.peek() == &Token::LParen {
                    return self.parse_call(name, position);
                }
                let mut expr = Expr::Identifier {
                    name,
                    position: position.clone(),
                };
                while self.peek() == &Token::Dot {
                    self.advance()?;
                    let property = self.take_word("property name after '.'")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        position: position.clone(),
                    };
                }
                Ok(expr)
            }
            Token::Str(value) => self.literal(value, LiteralKind::String, position),
            Token::Int(value) => self.literal(value, LiteralKind::Int, position),
            Token::Float(value) => self.literal(value, LiteralKind::Float, position),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn literal(
        &mut self,
        value: String,
        kind: LiteralKind,
        position: Position,
    ) -> Result<Expr, ParseError> {
        self.advance()?;
        Ok(Expr::Literal {
            value,
            kind,
            position,
        })
    }

    fn parse_call(&mut self, function: String, position: Position) -> Result<Expr, ParseError> {
        self.expect(Token::LParen)?;
        let mut arguments = Vec::new();
        if self.peek() != &Token::RParen {
            loop {
                arguments.push(self.parse_expression()?);
                if self.peek() != &Token::Comma {
                    break;
                }
                self.advance()?;
            }
        }
        self.expect(Token::RParen)?;
        Ok(Expr::Call {
            function,
            arguments,
            position,
        })
    }
}

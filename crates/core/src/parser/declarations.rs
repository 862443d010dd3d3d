use super::Parser;
use crate::ast::{
    Assignment, Field, FieldDef, File, Model, Record, Relationship, RelationshipKind, Type,
    TypeDef,
};
use crate::error::{ErrorKind, ParseError};
use crate::keywords;
use crate::lexer::Token;
use serde_json::Value;
use std::collections::BTreeMap;

impl<'a> Parser<'a> {
    // -- define record / define type ----------------------------

    pub(super) fn parse_define(&mut self, file: &mut File) -> Result<(), ParseError> {
        self.expect_word("define")?;
        match self.current_word() {
            Some("record") => {
                let record = self.parse_record()?;
                file.records.push(record);
            }
            Some("type") => {
                let type_def = self.parse_type_def()?;
                file.type_defs.push(type_def);
            }
            Some(other) => {
                return Err(ParseError::new(
                    ErrorKind::InvalidKeyword,
                    format!("expected 'record' or 'type' after 'define', got {:?}", other),
                    other,
                    self.pos(),
                ))
            }
            None => return Err(self.unexpected("'record' or 'type' after 'define'")),
        }
        Ok(())
    }

    /// Fields run until the next top-level keyword or a non-word token.
    fn parse_record(&mut self) -> Result<Record, ParseError> {
        let position = self.expect_word("record")?;
        let name = self.take_word("record name")?;
        let mut fields = Vec::new();
        while let Some(w) = self.current_word() {
            if keywords::is_top_level_keyword(w) {
                break;
            }
            fields.push(self.parse_field_def()?);
        }
        Ok(Record {
            name,
            fields,
            position,
        })
    }

    fn parse_field_def(&mut self) -> Result<FieldDef, ParseError> {
        let position = self.pos();
        let name = self.take_word("field name")?;
        self.expect(Token::Colon)?;
        let type_ = self.parse_type()?;
        Ok(FieldDef {
            name,
            type_,
            position,
        })
    }

    fn parse_type_def(&mut self) -> Result<TypeDef, ParseError> {
        let position = self.expect_word("type")?;
        let name = self.take_word("type name")?;
        self.expect_word("as")?;
        let base_type = self.parse_type()?;
        let mut why = None;
        let mut validation = BTreeMap::new();
        loop {
            match self.current_word() {
                Some("why") => why = Some(self.parse_why()?),
                Some("validate") => self.parse_validate(&mut validation)?,
                _ => break,
            }
        }
        Ok(TypeDef {
            name,
            base_type,
            why,
            validation,
            position,
        })
    }

    // -- Shared clauses -----------------------------------------

    pub(super) fn parse_type(&mut self) -> Result<Type, ParseError> {
        let position = self.pos();
        let name = self.take_word("type name")?;
        Ok(Type {
            name,
            constraints: BTreeMap::new(),
            position,
        })
    }

    /// `why: "text"` on type definitions and assignments, where it is optional.
    fn parse_why(&mut self) -> Result<String, ParseError> {
        self.expect_word("why")?;
        self.expect(Token::Colon)?;
        self.take_str("string after 'why:'")
    }

    /// `validate: "rule"`. The rule string is optional; it is stored under
    /// the `rule` key.
    fn parse_validate(&mut self, validation: &mut BTreeMap<String, Value>) -> Result<(), ParseError> {
        self.expect_word("validate")?;
        self.expect(Token::Colon)?;
        if let Token::Str(rule) = self.peek() {
            validation.insert("rule".to_owned(), Value::String(rule.clone()));
            self.advance()?;
        }
        Ok(())
    }

    // -- Legacy declarations ------------------------------------

    pub(super) fn parse_model(&mut self) -> Result<Model, ParseError> {
        let position = self.expect_word("model")?;
        let name = self.take_word("model name")?;
        self.expect(Token::LBrace)?;
        let mut fields = Vec::new();
        while self.peek() != &Token::RBrace && self.peek() != &Token::Eof {
            fields.push(self.parse_field()?);
        }
        self.expect(Token::RBrace)?;
        Ok(Model {
            name,
            fields,
            position,
        })
    }

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let position = self.pos();
        let name = self.take_word("field name")?;
        self.expect(Token::Colon)?;
        let type_ = self.parse_type()?;
        let relationship = if self
            .current_word()
            .is_some_and(keywords::is_relationship_keyword)
        {
            Some(self.parse_relationship()?)
        } else {
            None
        };
        Ok(Field {
            name,
            type_,
            relationship,
            position,
        })
    }

    fn parse_relationship(&mut self) -> Result<Relationship, ParseError> {
        let position = self.pos();
        let word = self.take_word("relationship keyword")?;
        let kind = RelationshipKind::from_keyword(&word)
            .ok_or_else(|| ParseError::invalid_keyword("relationship type", &word, position.clone()))?;
        let target = self.take_word("target model name")?;
        Ok(Relationship {
            kind,
            target,
            position,
        })
    }

    /// `assign-use Name as Base [why: "..."] [validate: "..."]`, clauses in
    /// that order.
    pub(super) fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let position = self.expect_word("assign-use")?;
        let type_name = self.take_word("type name")?;
        self.expect_word("as")?;
        let base_type = self.parse_type()?;
        let why = if self.is_word("why") {
            Some(self.parse_why()?)
        } else {
            None
        };
        let mut validation = BTreeMap::new();
        if self.is_word("validate") {
            self.parse_validate(&mut validation)?;
        }
        Ok(Assignment {
            type_name,
            base_type,
            why,
            validation,
            position,
        })
    }
}

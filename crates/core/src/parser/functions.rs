use super::Parser;
use crate::ast::{
    AiAnnotation, AnnotationKind, Function, FunctionBody, NativeBlock, NativeLanguage, Parameter,
};
use crate::error::ParseError;
use crate::keywords;
use crate::lexer::Token;
use crate::options::Grammar;

impl<'a> Parser<'a> {
    /// `function name(params) [returns T] {ai-*: "..."} why: "..." do: body`
    pub(super) fn parse_function(&mut self) -> Result<Function, ParseError> {
        let position = self.expect_word("function")?;
        let name = self.take_word("function name")?;
        self.expect(Token::LParen)?;
        let parameters = self.parse_parameter_list()?;
        self.expect(Token::RParen)?;

        let return_type = if self.is_word("returns") {
            self.advance()?;
            Some(self.parse_type()?)
        } else {
            None
        };

        let mut ai_annotations = Vec::new();
        if self.grammar == Grammar::Current {
            while self.current_word().is_some_and(keywords::is_ai_annotation) {
                ai_annotations.push(self.parse_ai_annotation()?);
            }
        }

        self.expect_clause("why", "why:")?;
        self.expect(Token::Colon)?;
        let why = self.take_str("string after 'why:'")?;

        self.expect_clause("do", "do:")?;
        self.expect(Token::Colon)?;
        let body = self.parse_function_body()?;

        Ok(Function {
            name,
            parameters,
            return_type,
            ai_annotations,
            why,
            body,
            position,
        })
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut parameters = Vec::new();
        if self.peek() == &Token::RParen {
            return Ok(parameters);
        }
        loop {
            let position = self.pos();
            let name = self.take_word("parameter name")?;
            self.expect(Token::Colon)?;
            let type_ = self.parse_type()?;
            parameters.push(Parameter {
                name,
                type_,
                position,
            });
            if self.peek() != &Token::Comma {
                break;
            }
            self.advance()?;
        }
        Ok(parameters)
    }

    fn parse_ai_annotation(&mut self) -> Result<AiAnnotation, ParseError> {
        let position = self.pos();
        let word = self.take_word("AI annotation")?;
        let kind = AnnotationKind::from_keyword(&word)
            .ok_or_else(|| ParseError::invalid_keyword("AI annotation", &word, position.clone()))?;
        self.expect(Token::Colon)?;
        let content = self.take_str("string after AI annotation")?;
        Ok(AiAnnotation {
            kind,
            content,
            position,
        })
    }

    /// The body runs to the next top-level keyword or end of input. In the
    /// legacy grammar only native blocks are collected and everything else
    /// is skipped.
    fn parse_function_body(&mut self) -> Result<FunctionBody, ParseError> {
        let mut body = FunctionBody {
            position: self.pos(),
            ..FunctionBody::default()
        };

        let grammar = self.grammar;
        loop {
            if self.peek() == &Token::Eof
                || self
                    .current_word()
                    .is_some_and(|w| grammar.is_top_level_keyword(w))
            {
                break;
            }
            if self
                .current_word()
                .is_some_and(keywords::is_native_block_keyword)
            {
                let block = self.parse_native_block()?;
                body.native_blocks.push(block);
                continue;
            }
            match grammar {
                Grammar::Current => {
                    if let Some(stmt) = self.parse_statement()? {
                        body.statements.push(stmt);
                    }
                }
                Grammar::Legacy => {
                    self.advance()?;
                }
            }
        }
        Ok(body)
    }

    fn parse_native_block(&mut self) -> Result<NativeBlock, ParseError> {
        let position = self.pos();
        let tag = self.take_word("native block type")?;
        let language = NativeLanguage::from_keyword(&tag)
            .ok_or_else(|| ParseError::invalid_keyword("native block type", &tag, position.clone()))?;
        self.expect(Token::Colon)?;
        let code = match self.peek() {
            Token::Str(code) | Token::Raw(code) => code.clone(),
            _ => return Err(self.unexpected("native code string")),
        };
        self.advance()?;
        Ok(NativeBlock {
            language,
            code,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{AnnotationKind, File, NativeLanguage, Statement};
    use crate::error::{ErrorKind, ParseError};
    use crate::options::{Grammar, ParseOptions};
    use crate::parser::parse_file;

    fn parse(src: &str) -> Result<File, ParseError> {
        parse_file(src, &ParseOptions::new())
    }

    fn parse_legacy(src: &str) -> Result<File, ParseError> {
        parse_file(src, &ParseOptions::new().with_grammar(Grammar::Legacy))
    }

    #[test]
    fn minimal_function() {
        let file = parse(r#"function ping() why: "health check" do: return"#).unwrap();
        let f = &file.functions[0];
        assert_eq!(f.name, "ping");
        assert!(f.parameters.is_empty());
        assert!(f.return_type.is_none());
        assert_eq!(f.why, "health check");
        assert_eq!(f.body.statements.len(), 1);
    }

    #[test]
    fn parameters_and_return_type() {
        let src = r#"function transfer(from: Account, to: Account, amount: Money) returns Receipt
    why: "Moves funds between accounts"
    do:
        return receipt"#;
        let file = parse(src).unwrap();
        let f = &file.functions[0];
        let params: Vec<_> = f
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.type_.name.as_str()))
            .collect();
        assert_eq!(
            params,
            vec![("from", "Account"), ("to", "Account"), ("amount", "Money")]
        );
        assert_eq!(f.return_type.as_ref().unwrap().name, "Receipt");
        assert_eq!(f.position.line, 1);
    }

    #[test]
    fn missing_why_is_terminal() {
        let err = parse("function f(x: Int) returns Int do: return x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingClause);
        assert_eq!(err.found, "do");
        assert!(err.message.contains("why:"));
    }

    #[test]
    fn why_must_be_a_string() {
        let err = parse("function f() why: because do: return").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert_eq!(err.found, "because");
    }

    #[test]
    fn missing_do_is_terminal() {
        let err = parse(r#"function f() why: "x" return 1"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingClause);
        assert_eq!(err.found, "return");
        assert!(err.message.contains("do:"));
    }

    #[test]
    fn annotations_keep_order_and_duplicates() {
        let src = r#"function hash(pw: String) returns String
    ai-security: "use a slow hash"
    ai-feedback: "first note"
    ai-feedback: "second note"
    ai-decision-accepted: "bcrypt chosen"
    why: "Stores credentials safely"
    do:
        use bcrypt algorithm
        return pw"#;
        let file = parse(src).unwrap();
        let kinds: Vec<_> = file.functions[0]
            .ai_annotations
            .iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                AnnotationKind::Security,
                AnnotationKind::Feedback,
                AnnotationKind::Feedback,
                AnnotationKind::DecisionAccepted,
            ]
        );
        assert_eq!(file.functions[0].ai_annotations[2].content, "second note");
    }

    #[test]
    fn annotation_after_why_is_not_accepted() {
        let err = parse(r#"function f() why: "x" ai-feedback: "late" do: return"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingClause);
        assert_eq!(err.found, "ai-feedback");
    }

    #[test]
    fn body_ends_at_next_declaration() {
        let src = r#"function a() why: "first" do: return 1
function b() why: "second" do: fail "no"
define record R
x: Int"#;
        let file = parse(src).unwrap();
        assert_eq!(file.functions.len(), 2);
        assert_eq!(file.functions[0].body.statements.len(), 1);
        assert!(matches!(
            file.functions[1].body.statements[0],
            Statement::Fail { .. }
        ));
        assert_eq!(file.records.len(), 1);
    }

    #[test]
    fn native_blocks_are_collected_separately() {
        let src = r#"function now() returns Time
    why: "Current server time"
    do:
        go-native: "return time.Now()"
        set unused = 1
        ts-native: ```
return new Date();
```
        return t"#;
        let file = parse(src).unwrap();
        let body = &file.functions[0].body;
        assert_eq!(body.statements.len(), 2);
        assert_eq!(body.native_blocks.len(), 2);
        assert_eq!(body.native_blocks[0].language, NativeLanguage::Go);
        assert_eq!(body.native_blocks[0].code, "return time.Now()");
        assert_eq!(body.native_blocks[1].language, NativeLanguage::Ts);
        assert_eq!(body.native_blocks[1].code, "\nreturn new Date();\n");
    }

    #[test]
    fn native_block_needs_code() {
        let err = parse(r#"function f() why: "x" do: go-native: 42"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert!(err.message.contains("native code string"));
    }

    #[test]
    fn legacy_grammar_skips_body_statements() {
        let src = r#"function check(age: Int) returns Bool
    why: "age gate"
    do:
        if age > 18 then return true
        go-native: "return age > 18"
model User { id: Int }
assign-use Email as String"#;
        let file = parse_legacy(src).unwrap();
        let body = &file.functions[0].body;
        assert!(body.statements.is_empty());
        assert_eq!(body.native_blocks.len(), 1);
        assert_eq!(file.models.len(), 1);
        assert_eq!(file.assignments.len(), 1);
    }

    #[test]
    fn legacy_grammar_rejects_current_declarations() {
        let err = parse_legacy("module Shop").unwrap_err();
        assert_eq!(err.found, "module");
        let err = parse_legacy("define record User\nid: Int").unwrap_err();
        assert_eq!(err.found, "define");
    }

    #[test]
    fn legacy_grammar_has_no_annotations() {
        let src = r#"function f() ai-feedback: "x" why: "y" do: return"#;
        let err = parse_legacy(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingClause);
        assert!(parse(src).is_ok());
    }
}

use crate::ast::Position;
use crate::error::ParseError;
use crate::keywords;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords, distinguished in the parser
    Word(String),
    /// Double-quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Backtick-delimited verbatim text, single or triple backticks
    Raw(String),
    /// Integer literal, kept as written
    Int(String),
    /// Decimal literal, kept as written
    Float(String),
    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Comma,
    Dot,
    Eq,
    Lt,
    Gt,
    /// Any other single character. The parser decides whether it is filler.
    Other(char),
    // End of input
    Eof,
}

impl Token {
    /// Source-like text of the token, used in error messages.
    pub fn text(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Str(s) => format!("\"{}\"", s),
            Token::Raw(s) => format!("`{}`", s),
            Token::Int(n) | Token::Float(n) => n.clone(),
            Token::LBrace => "{".to_owned(),
            Token::RBrace => "}".to_owned(),
            Token::LParen => "(".to_owned(),
            Token::RParen => ")".to_owned(),
            Token::Colon => ":".to_owned(),
            Token::Comma => ",".to_owned(),
            Token::Dot => ".".to_owned(),
            Token::Eq => "=".to_owned(),
            Token::Lt => "<".to_owned(),
            Token::Gt => ">".to_owned(),
            Token::Other(c) => c.to_string(),
            Token::Eof => "EOF".to_owned(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub pos: Position,
}

/// Pull scanner: each [`Scanner::advance`] call yields the next token.
pub struct Scanner<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: u32,
    column: u32,
    file: Option<String>,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str, file: Option<&str>) -> Self {
        Scanner {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
            line: 1,
            column: 1,
            file: file.map(str::to_owned),
            done: false,
        }
    }

    fn peek_char(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map_or(self.src.len(), |&(offset, _)| offset)
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.offset(),
            file: self.file.clone(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.src[self.offset()..].starts_with(pat)
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek_char(0) {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_char(1) == Some('/') => {
                    while let Some(c) = self.peek_char(0) {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_char(1) == Some('*') => {
                    let start = self.here();
                    self.bump();
                    self.bump();
                    loop {
                        if self.peek_char(0).is_none() {
                            return Err(ParseError::lexical(
                                "unterminated block comment",
                                "/*",
                                start,
                            ));
                        }
                        if self.peek_char(0) == Some('*') && self.peek_char(1) == Some('/') {
                            self.bump();
                            self.bump();
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Return the next token. After `Eof` every call returns `Eof` again.
    pub fn advance(&mut self) -> Result<Spanned, ParseError> {
        self.skip_trivia()?;
        let pos = self.here();
        let c = match self.peek_char(0) {
            Some(c) => c,
            None => {
                self.done = true;
                return Ok(Spanned {
                    token: Token::Eof,
                    pos,
                });
            }
        };

        let token = if c == '"' {
            self.scan_string(&pos)?
        } else if c == '`' {
            self.scan_raw(&pos)?
        } else if c.is_ascii_digit()
            || (c == '-' && self.peek_char(1).is_some_and(|n| n.is_ascii_digit()))
        {
            self.scan_number()
        } else if c.is_alphabetic() || c == '_' {
            self.scan_word()
        } else {
            self.bump();
            match c {
                '{' => Token::LBrace,
                '}' => Token::RBrace,
                '(' => Token::LParen,
                ')' => Token::RParen,
                ':' => Token::Colon,
                ',' => Token::Comma,
                '.' => Token::Dot,
                '=' => Token::Eq,
                '<' => Token::Lt,
                '>' => Token::Gt,
                other => Token::Other(other),
            }
        };
        Ok(Spanned { token, pos })
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn scan_string(&mut self, start: &Position) -> Result<Token, ParseError> {
        self.bump();
        let mut s = String::new();
        loop {
            let sc = match self.peek_char(0) {
                None | Some('\n') => {
                    return Err(ParseError::lexical(
                        "unterminated string literal",
                        format!("\"{}", s),
                        start.clone(),
                    ))
                }
                Some(sc) => sc,
            };
            self.bump();
            match sc {
                '"' => return Ok(Token::Str(s)),
                '\\' => {
                    let esc = self.bump().ok_or_else(|| {
                        ParseError::lexical(
                            "unterminated escape in string",
                            format!("\"{}", s),
                            start.clone(),
                        )
                    })?;
                    match esc {
                        '"' => s.push('"'),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                }
                other => s.push(other),
            }
        }
    }

    fn scan_raw(&mut self, start: &Position) -> Result<Token, ParseError> {
        let fence = if self.starts_with("```") { "```" } else { "`" };
        for _ in 0..fence.len() {
            self.bump();
        }
        let content_start = self.offset();
        loop {
            if self.peek_char(0).is_none() {
                return Err(ParseError::lexical(
                    "unterminated raw block",
                    fence,
                    start.clone(),
                ));
            }
            if self.starts_with(fence) {
                let content = self.src[content_start..self.offset()].to_owned();
                for _ in 0..fence.len() {
                    self.bump();
                }
                return Ok(Token::Raw(content));
            }
            self.bump();
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.offset();
        if self.peek_char(0) == Some('-') {
            self.bump();
        }
        while self.peek_char(0).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek_char(0) == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.bump(); // consume '.'
            while self.peek_char(0).is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            return Token::Float(self.src[start..self.offset()].to_owned());
        }
        Token::Int(self.src[start..self.offset()].to_owned())
    }

    fn scan_word(&mut self) -> Token {
        if let Some(kw) = self.hyphenated_keyword_here() {
            for _ in 0..kw.chars().count() {
                self.bump();
            }
            return Token::Word(kw.to_owned());
        }
        let start = self.offset();
        while self
            .peek_char(0)
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }
        Token::Word(self.src[start..self.offset()].to_owned())
    }

    /// A hyphenated keyword matches only when it is followed by a word
    /// boundary, so `assign-user` stays three tokens.
    fn hyphenated_keyword_here(&self) -> Option<&'static str> {
        let rest = &self.src[self.offset()..];
        keywords::hyphenated_keywords().find(|kw| {
            rest.starts_with(kw)
                && !rest[kw.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        })
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Spanned, ParseError>;

    /// Yields tokens up to and including `Eof`, or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.advance();
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

/// Scan the whole source. The last token is always `Eof`.
pub fn lex(src: &str, file: Option<&str>) -> Result<Vec<Spanned>, ParseError> {
    Scanner::new(src, file).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        lex(src, None)
            .expect("lex should succeed")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    fn word(w: &str) -> Token {
        Token::Word(w.to_owned())
    }

    #[test]
    fn punctuation_and_words() {
        assert_eq!(
            tokens("model User { id: Int }"),
            vec![
                word("model"),
                word("User"),
                Token::LBrace,
                word("id"),
                Token::Colon,
                word("Int"),
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let src = "// header\nmodule /* inline\nblock */ Billing";
        assert_eq!(tokens(src), vec![word("module"), word("Billing"), Token::Eof]);
    }

    #[test]
    fn numbers_keep_their_text() {
        assert_eq!(
            tokens("18 -3 2.50 7."),
            vec![
                Token::Int("18".into()),
                Token::Int("-3".into()),
                Token::Float("2.50".into()),
                Token::Int("7".into()),
                Token::Dot,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes_are_resolved() {
        assert_eq!(
            tokens(r#""say \"hi\"\n" "a\qb""#),
            vec![
                Token::Str("say \"hi\"\n".into()),
                Token::Str("a\\qb".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn raw_blocks_span_lines() {
        let src = "go-native: ```\nreturn nil\n``` `x := 1`";
        assert_eq!(
            tokens(src),
            vec![
                word("go-native"),
                Token::Colon,
                Token::Raw("\nreturn nil\n".into()),
                Token::Raw("x := 1".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn hyphenated_keywords_are_single_words() {
        assert_eq!(
            tokens("assign-use ai-decision-accepted: ts-native"),
            vec![
                word("assign-use"),
                word("ai-decision-accepted"),
                Token::Colon,
                word("ts-native"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn other_hyphenated_text_is_split() {
        assert_eq!(
            tokens("a-b assign-user"),
            vec![
                word("a"),
                Token::Other('-'),
                word("b"),
                word("assign"),
                Token::Other('-'),
                word("user"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn unknown_characters_become_other_tokens() {
        assert_eq!(
            tokens("a + b * 2"),
            vec![
                word("a"),
                Token::Other('+'),
                word("b"),
                Token::Other('*'),
                Token::Int("2".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn positions_track_line_column_and_offset() {
        let spans = lex("module X\n  définir y", Some("m.cp")).unwrap();
        assert_eq!(spans[0].pos.line, 1);
        assert_eq!(spans[0].pos.column, 1);
        assert_eq!(spans[1].pos.column, 8);
        assert_eq!(spans[1].pos.offset, 7);
        assert_eq!(spans[2].pos.line, 2);
        assert_eq!(spans[2].pos.column, 3);
        assert_eq!(spans[2].pos.offset, 11);
        // 'é' is two bytes but one column
        assert_eq!(spans[3].pos.column, 11);
        assert_eq!(spans[3].pos.offset, 20);
        assert_eq!(spans[3].pos.file.as_deref(), Some("m.cp"));
    }

    #[test]
    fn unterminated_string_is_lexical_error() {
        let err = lex("why: \"open\nnext", None).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Lexical);
        assert_eq!(err.position.line, 1);
        assert_eq!(err.position.column, 6);
    }

    #[test]
    fn unterminated_block_comment_is_lexical_error() {
        let err = lex("model /* never closed", None).unwrap_err();
        assert!(err.message.contains("block comment"));
    }

    #[test]
    fn eof_repeats_after_end() {
        let mut scanner = Scanner::new("x", None);
        assert_eq!(scanner.advance().unwrap().token, word("x"));
        assert_eq!(scanner.advance().unwrap().token, Token::Eof);
        assert!(scanner.is_done());
        assert_eq!(scanner.advance().unwrap().token, Token::Eof);
    }

    #[test]
    fn unterminated_raw_block_is_lexical_error() {
        let err = lex("ts-native: ```\nreturn 1;\n``", None).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Lexical);
        assert!(err.message.contains("raw block"));
        assert_eq!(err.found, "```");
        assert_eq!(err.position.column, 12);

        let err = lex("go-native: `x", None).unwrap_err();
        assert_eq!(err.found, "`");
    }

    #[test]
    fn iterator_and_pull_scanning_report_same_positions() {
        let src = "/* a */ model\n  User";
        let pulled: Vec<_> = {
            let mut scanner = Scanner::new(src, None);
            let mut out = Vec::new();
            loop {
                let spanned = scanner.advance().unwrap();
                let end = spanned.token == Token::Eof;
                out.push(spanned.pos);
                if end {
                    break;
                }
            }
            out
        };
        let iterated: Vec<_> = Scanner::new(src, None)
            .map(|t| t.unwrap().pos)
            .collect();
        assert_eq!(pulled, iterated);
        assert_eq!(pulled[0].column, 9);
        assert_eq!(pulled[1].line, 2);
    }
}

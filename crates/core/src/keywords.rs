//! Keyword classification.
//!
//! The grammar has no block terminators: record bodies, function bodies and
//! `create` assignment lists end when the next word belongs to one of these
//! closed sets. Every greedy loop in the parser checks them with one token
//! of lookahead.

/// Words that start a top-level declaration.
pub const TOP_LEVEL: &[&str] = &["module", "define", "function", "model", "assign-use"];

/// Top-level words valid after the optional leading `module`.
pub const DECLARATION: &[&str] = &["define", "function", "model", "assign-use"];

/// Top-level words of the first-generation grammar.
pub const LEGACY_TOP_LEVEL: &[&str] = &["model", "function", "assign-use"];

/// Words that start a statement. `for` and `while` are reserved: they end
/// greedy loops but have no statement form yet.
pub const STATEMENT: &[&str] = &[
    "if", "return", "set", "create", "fail", "use", "for", "while",
];

pub const AI_ANNOTATION: &[&str] = &[
    "ai-feedback",
    "ai-suggests",
    "ai-security",
    "ai-performance",
    "ai-decision-accepted",
    "ai-decision-rejected",
];

pub const RELATIONSHIP: &[&str] = &["belongs_to", "has_one", "has_many", "references"];

pub const NATIVE_BLOCK: &[&str] = &["go-native", "ts-native"];

pub fn is_top_level_keyword(word: &str) -> bool {
    TOP_LEVEL.contains(&word)
}

pub fn is_legacy_top_level_keyword(word: &str) -> bool {
    LEGACY_TOP_LEVEL.contains(&word)
}

pub fn is_statement_keyword(word: &str) -> bool {
    STATEMENT.contains(&word)
}

pub fn is_ai_annotation(word: &str) -> bool {
    AI_ANNOTATION.contains(&word)
}

pub fn is_relationship_keyword(word: &str) -> bool {
    RELATIONSHIP.contains(&word)
}

pub fn is_native_block_keyword(word: &str) -> bool {
    NATIVE_BLOCK.contains(&word)
}

/// True for words that end an open-ended run inside a function body:
/// `create` assignments, `use` phrases and `return` values.
pub fn ends_body_run(word: &str) -> bool {
    is_statement_keyword(word)
        || is_top_level_keyword(word)
        || is_native_block_keyword(word)
        || word == "else"
}

/// Keywords that contain `-`. The scanner emits these as one word; any
/// other hyphenated text is split at the hyphen.
pub fn hyphenated_keywords() -> impl Iterator<Item = &'static str> {
    TOP_LEVEL
        .iter()
        .chain(AI_ANNOTATION)
        .chain(NATIVE_BLOCK)
        .copied()
        .filter(|kw| kw.contains('-'))
}

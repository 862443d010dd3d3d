use serde::{Deserialize, Serialize};

/// Grammar generation to parse with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    /// `module`, `define record`, `define type`, AI annotations and parsed
    /// function bodies, plus the legacy declarations.
    #[default]
    Current,
    /// First-generation grammar: only `model`, `function` and `assign-use`
    /// at top level, no AI annotations, and function bodies skipped up to
    /// the next declaration with only native blocks collected.
    Legacy,
}

impl Grammar {
    /// Version label of this grammar generation.
    pub fn version(&self) -> &'static str {
        match self {
            Grammar::Current => crate::GRAMMAR_VERSION,
            Grammar::Legacy => "1.0",
        }
    }

    /// Whether `word` starts a top-level declaration in this grammar.
    pub fn is_top_level_keyword(&self, word: &str) -> bool {
        match self {
            Grammar::Current => crate::keywords::is_top_level_keyword(word),
            Grammar::Legacy => crate::keywords::is_legacy_top_level_keyword(word),
        }
    }
}

/// Per-parse settings. Deserializable so host tools can embed it in their
/// own configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Source name attached to every position, for diagnostics only.
    pub filename: Option<String>,
    pub grammar: Grammar,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }
}

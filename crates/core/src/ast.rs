//! AST types for CloudPact source files.
//!
//! These types are produced by the parser and handed to downstream emitters,
//! which only ever read them. Every node carries the [`Position`] of the
//! token that opened it. Nothing here is resolved or type checked.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// ──────────────────────────────────────────────
// Position
// ──────────────────────────────────────────────

/// Source location of a token or node.
///
/// `line` and `column` are 1-based, `column` counts characters. `offset` is
/// the 0-based byte offset into the source text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) if !file.is_empty() => {
                write!(f, "{}:{}:{}", file, self.line, self.column)
            }
            _ => write!(f, "line {}, column {}", self.line, self.column),
        }
    }
}

// ──────────────────────────────────────────────
// File
// ──────────────────────────────────────────────

/// Root node. Current (`define record`) and legacy (`model`) declarations
/// are kept in separate lists; a file may contain both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct File {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<Module>,
    pub records: Vec<Record>,
    pub models: Vec<Model>,
    pub functions: Vec<Function>,
    pub type_defs: Vec<TypeDef>,
    pub assignments: Vec<Assignment>,
    pub position: Position,
}

impl File {
    /// Total number of top-level declarations, not counting the module.
    pub fn declaration_count(&self) -> usize {
        self.records.len()
            + self.models.len()
            + self.functions.len()
            + self.type_defs.len()
            + self.assignments.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub position: Position,
}

// ──────────────────────────────────────────────
// Types
// ──────────────────────────────────────────────

/// A type reference. `constraints` is reserved and always empty after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constraints: BTreeMap<String, Value>,
    pub position: Position,
}

/// `define type Name as Base [why: "..."] [validate: "..."]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub base_type: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub validation: BTreeMap<String, Value>,
    pub position: Position,
}

/// Legacy `assign-use Name as Base [why: "..."] [validate: "..."]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub type_name: String,
    pub base_type: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub validation: BTreeMap<String, Value>,
    pub position: Position,
}

// ──────────────────────────────────────────────
// Records and legacy models
// ──────────────────────────────────────────────

/// `define record Name` followed by `field: Type` lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Type,
    pub position: Position,
}

/// Legacy `model Name { field: Type [relationship Target] ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub fields: Vec<Field>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub target: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    BelongsTo,
    HasOne,
    HasMany,
    References,
}

impl RelationshipKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "belongs_to" => Some(RelationshipKind::BelongsTo),
            "has_one" => Some(RelationshipKind::HasOne),
            "has_many" => Some(RelationshipKind::HasMany),
            "references" => Some(RelationshipKind::References),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::BelongsTo => "belongs_to",
            RelationshipKind::HasOne => "has_one",
            RelationshipKind::HasMany => "has_many",
            RelationshipKind::References => "references",
        }
    }
}

// ──────────────────────────────────────────────
// Functions
// ──────────────────────────────────────────────

/// A function declaration. `why` is mandatory in the grammar, so it is a
/// plain `String` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Type>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ai_annotations: Vec<AiAnnotation>,
    pub why: String,
    pub body: FunctionBody,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Type,
    pub position: Position,
}

/// `ai-<kind>: "content"` attached to a function, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnnotation {
    pub kind: AnnotationKind,
    pub content: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    Feedback,
    Suggests,
    Security,
    Performance,
    DecisionAccepted,
    DecisionRejected,
}

impl AnnotationKind {
    /// Map an `ai-*` keyword to its kind.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "ai-feedback" => Some(AnnotationKind::Feedback),
            "ai-suggests" => Some(AnnotationKind::Suggests),
            "ai-security" => Some(AnnotationKind::Security),
            "ai-performance" => Some(AnnotationKind::Performance),
            "ai-decision-accepted" => Some(AnnotationKind::DecisionAccepted),
            "ai-decision-rejected" => Some(AnnotationKind::DecisionRejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Feedback => "feedback",
            AnnotationKind::Suggests => "suggests",
            AnnotationKind::Security => "security",
            AnnotationKind::Performance => "performance",
            AnnotationKind::DecisionAccepted => "decision-accepted",
            AnnotationKind::DecisionRejected => "decision-rejected",
        }
    }
}

/// Statements and native blocks come from the same token stream but are
/// collected separately; their relative order is not kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionBody {
    pub statements: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub native_blocks: Vec<NativeBlock>,
    pub position: Position,
}

/// Verbatim target-language code, passed through to the matching emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeBlock {
    pub language: NativeLanguage,
    pub code: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeLanguage {
    Go,
    Ts,
}

impl NativeLanguage {
    /// Map a `go-native` / `ts-native` tag to its language.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "go-native" => Some(NativeLanguage::Go),
            "ts-native" => Some(NativeLanguage::Ts),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NativeLanguage::Go => "go",
            NativeLanguage::Ts => "ts",
        }
    }
}

// ──────────────────────────────────────────────
// Statements
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    /// `if cond then stmt [else stmt]`. A branch is `None` when the token
    /// after `then`/`else` does not start a statement.
    If {
        condition: Expr,
        then_branch: Option<Box<Statement>>,
        else_branch: Option<Box<Statement>>,
        position: Position,
    },
    Return {
        value: Option<Expr>,
        position: Position,
    },
    /// `set variable = value`, also produced by `use ...` phrases.
    Assign {
        variable: String,
        value: Expr,
        position: Position,
    },
    /// `create Type with: field = value ...`
    Create {
        type_name: String,
        assignments: Vec<FieldAssignment>,
        position: Position,
    },
    Fail {
        message: String,
        position: Position,
    },
}

impl Statement {
    pub fn position(&self) -> &Position {
        match self {
            Statement::If { position, .. }
            | Statement::Return { position, .. }
            | Statement::Assign { position, .. }
            | Statement::Create { position, .. }
            | Statement::Fail { position, .. } => position,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Statement::If { .. } => "if",
            Statement::Return { .. } => "return",
            Statement::Assign { .. } => "assign",
            Statement::Create { .. } => "create",
            Statement::Fail { .. } => "fail",
        }
    }
}

/// Variable name given to the literal captured by a `use ...` phrase.
pub const USE_VARIABLE: &str = "__use__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub field: String,
    pub value: Expr,
    pub position: Position,
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    Identifier {
        name: String,
        position: Position,
    },
    /// Literal text as written; numbers are not converted.
    Literal {
        value: String,
        kind: LiteralKind,
        position: Position,
    },
    /// Left-associative comparison. `position` is the left operand's.
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        position: Position,
    },
    Member {
        object: Box<Expr>,
        property: String,
        position: Position,
    },
    Call {
        function: String,
        arguments: Vec<Expr>,
        position: Position,
    },
}

impl Expr {
    pub fn position(&self) -> &Position {
        match self {
            Expr::Identifier { position, .. }
            | Expr::Literal { position, .. }
            | Expr::Binary { position, .. }
            | Expr::Member { position, .. }
            | Expr::Call { position, .. } => position,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Identifier { .. } => "identifier",
            Expr::Literal { .. } => "literal",
            Expr::Binary { .. } => "binary",
            Expr::Member { .. } => "member",
            Expr::Call { .. } => "call",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    String,
    Int,
    Float,
}

/// Comparison-tier operators. There are no arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not contains")]
    NotContains,
    /// Bare `not` between two operands.
    #[serde(rename = "not")]
    Not,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Eq => "=",
            BinaryOp::Contains => "contains",
            BinaryOp::NotContains => "not contains",
            BinaryOp::Not => "not",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Syntax tree node types for the minisql SQL front end.
//!
//! The parser produces one [`Statement`] per semicolon-delimited command
//! and hands the caller an [`Ast`] owning the whole sequence. Nodes embed
//! the [`Token`]s they were built from, so every leaf keeps its source
//! span and position. Nothing here is mutated after construction.
//!
//! Rendering a node with `Display` produces canonical SQL that re-parses
//! to a structurally equal tree.

mod display;
pub mod token;

pub use token::{Keyword, Location, Span, Symbol, Token, TokenKind};

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// An expression node.
///
/// Only literal expressions exist in this grammar: a single token of
/// string, numeric, boolean, null, or identifier kind, or the bare `*`
/// projection inside a SELECT item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// A literal constant wrapping the token it was lexed from.
    Literal(Token),
}

impl Expression {
    /// The source range this expression covers.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(token) => token.span,
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A `SELECT items [FROM table]` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    /// The projected expressions. Never empty.
    pub items: Vec<Expression>,
    /// Optional source table (an identifier token).
    pub from: Option<Token>,
}

impl SelectStatement {
    /// The source range from the first item to the last consumed token.
    #[must_use]
    pub fn span(&self) -> Span {
        let items = self
            .items
            .iter()
            .map(Expression::span)
            .reduce(Span::merge)
            .unwrap_or(Span::ZERO);
        match &self.from {
            Some(table) => items.merge(table.span),
            None => items,
        }
    }
}

/// An `INSERT INTO table VALUES (...)` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// Target table name (an identifier token).
    pub table: Token,
    /// The inserted values, in declaration order. Never empty.
    pub values: Vec<Expression>,
}

impl InsertStatement {
    /// The source range from the table name through the last value.
    #[must_use]
    pub fn span(&self) -> Span {
        self.values
            .iter()
            .map(Expression::span)
            .fold(self.table.span, Span::merge)
    }
}

/// A single `name type` entry in a CREATE TABLE column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    /// Column name (an identifier token).
    pub name: Token,
    /// Column datatype (an `int`, `text`, or `boolean` keyword token).
    pub datatype: Token,
}

impl ColumnDefinition {
    /// The source range covering name and datatype.
    #[must_use]
    pub fn span(&self) -> Span {
        self.name.span.merge(self.datatype.span)
    }
}

/// A `CREATE TABLE name (columns)` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableStatement {
    /// Table name (an identifier token).
    pub name: Token,
    /// Column definitions. Never empty.
    pub columns: Vec<ColumnDefinition>,
}

impl CreateTableStatement {
    /// The source range from the table name through the last column.
    #[must_use]
    pub fn span(&self) -> Span {
        self.columns
            .iter()
            .map(ColumnDefinition::span)
            .fold(self.name.span, Span::merge)
    }
}

/// A single parsed SQL statement.
///
/// The enum tag is the statement-kind discriminant; exactly one grammar
/// production matches each variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    CreateTable(CreateTableStatement),
}

impl Statement {
    /// The source range the statement covers.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Select(select) => select.span(),
            Self::Insert(insert) => insert.span(),
            Self::CreateTable(create) => create.span(),
        }
    }
}

/// A whole parsed input: zero or more statements in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ast {
    pub statements: Vec<Statement>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

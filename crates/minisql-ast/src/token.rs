//! The token model: source positions, token classification, and the
//! keyword/symbol vocabularies.
//!
//! The lexer produces a flat sequence of [`Token`]s from source text; the
//! parser consumes them by index. Vocabularies are process-wide constant
//! data consulted by the lexer's longest-match routine, so declaration
//! order in [`Keyword::ALL`] and [`Symbol::ALL`] is the tie-break order
//! between equal-length entries.

use std::fmt;

// ---------------------------------------------------------------------------
// Span — byte-offset source tracking
// ---------------------------------------------------------------------------

/// A byte-offset range into the original SQL source text.
///
/// Every token records the contiguous range it was lexed from, and tree
/// nodes merge their tokens' spans into a covering range for diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first character (inclusive).
    pub start: u32,
    /// Byte offset one past the last character (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from start (inclusive) to end (exclusive) byte offsets.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A zero-length span at position 0, used as a placeholder.
    pub const ZERO: Self = Self { start: 0, end: 0 };

    /// Merge two spans into one that covers both.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    /// Whether the span is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Location — line/column source tracking
// ---------------------------------------------------------------------------

/// A one-based line/column position in the source text.
///
/// Line 1, column 1 is the first character. The lexer advances the column
/// for every consumed character and resets it when it consumes a newline.
/// Locations exist purely for human-readable diagnostics; byte-accurate
/// work goes through [`Span`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: u32,
    pub col: u32,
}

impl Location {
    /// The position of the first character of any input.
    pub const START: Self = Self { line: 1, col: 1 };

    #[must_use]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

// ---------------------------------------------------------------------------
// Token classification
// ---------------------------------------------------------------------------

/// Classification attached to every lexed token.
///
/// A closed set so the parser can match exhaustively. `true`/`false` and
/// `null` are matched by the keyword recognizer but reclassified here as
/// [`TokenKind::Boolean`] and [`TokenKind::Null`], since the grammar treats
/// them as literal values rather than structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Symbol,
    Identifier,
    String,
    Numeric,
    Boolean,
    Null,
}

impl TokenKind {
    /// Stable label used in diagnostics and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Symbol => "symbol",
            Self::Identifier => "identifier",
            Self::String => "string",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Keyword vocabulary
// ---------------------------------------------------------------------------

/// The recognized SQL keywords.
///
/// Matching is case-insensitive and longest-match: `primary key` is a
/// single two-word entry and wins over any shorter entry sharing its
/// prefix. The matched token's text is always the lowercase form returned
/// by [`Keyword::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    From,
    As,
    Table,
    Create,
    Drop,
    Insert,
    Into,
    Values,
    Int,
    Text,
    Boolean,
    Where,
    And,
    Or,
    True,
    False,
    Unique,
    Index,
    On,
    PrimaryKey,
    Null,
    Limit,
    Offset,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: [Self; 24] = [
        Self::Select,
        Self::From,
        Self::As,
        Self::Table,
        Self::Create,
        Self::Drop,
        Self::Insert,
        Self::Into,
        Self::Values,
        Self::Int,
        Self::Text,
        Self::Boolean,
        Self::Where,
        Self::And,
        Self::Or,
        Self::True,
        Self::False,
        Self::Unique,
        Self::Index,
        Self::On,
        Self::PrimaryKey,
        Self::Null,
        Self::Limit,
        Self::Offset,
    ];

    /// The canonical lowercase source text of the keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::From => "from",
            Self::As => "as",
            Self::Table => "table",
            Self::Create => "create",
            Self::Drop => "drop",
            Self::Insert => "insert",
            Self::Into => "into",
            Self::Values => "values",
            Self::Int => "int",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Where => "where",
            Self::And => "and",
            Self::Or => "or",
            Self::True => "true",
            Self::False => "false",
            Self::Unique => "unique",
            Self::Index => "index",
            Self::On => "on",
            Self::PrimaryKey => "primary key",
            Self::Null => "null",
            Self::Limit => "limit",
            Self::Offset => "offset",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Symbol vocabulary
// ---------------------------------------------------------------------------

/// The recognized punctuation symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Semicolon,
    Asterisk,
    Comma,
    LeftParen,
    RightParen,
}

impl Symbol {
    /// Every symbol, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Semicolon,
        Self::Asterisk,
        Self::Comma,
        Self::LeftParen,
        Self::RightParen,
    ];

    /// The source text of the symbol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Semicolon => ";",
            Self::Asterisk => "*",
            Self::Comma => ",",
            Self::LeftParen => "(",
            Self::RightParen => ")",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A classified slice of source text.
///
/// `text` holds the token's value, not necessarily the raw source bytes:
/// keywords and unquoted identifiers are case-folded to lowercase, and
/// string literals have their delimiters stripped and doubled-delimiter
/// escapes collapsed. `span` still covers the full consumed source range,
/// delimiters included.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub span: Span,
    pub loc: Location,
}

impl Token {
    #[must_use]
    pub fn new(text: impl Into<String>, kind: TokenKind, span: Span, loc: Location) -> Self {
        Self {
            text: text.into(),
            kind,
            span,
            loc,
        }
    }

    /// Whether this token is the given structural keyword.
    ///
    /// Always false for `true`/`false`/`null`, which are reclassified as
    /// boolean and null literals during lexing.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword.as_str()
    }

    /// Whether this token is the given punctuation symbol.
    #[must_use]
    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol.as_str()
    }
}

/// Tokens compare by text and kind only. Positions are diagnostic
/// metadata and never participate in equality.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.kind == other.kind
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{Keyword, Location, Span, Symbol, Token, TokenKind};

    /// Helper: a token with throwaway positions.
    fn tok(text: &str, kind: TokenKind) -> Token {
        Token::new(text, kind, Span::ZERO, Location::START)
    }

    #[test]
    fn test_span_merge_covers_both() {
        let a = Span::new(5, 10);
        let b = Span::new(15, 20);
        let merged = a.merge(b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 20);
    }

    #[test]
    fn test_span_len_is_empty() {
        let s = Span::new(10, 20);
        assert_eq!(s.len(), 10);
        assert!(!s.is_empty());

        assert!(Span::ZERO.is_empty());
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new(2, 9).to_string(), "2:9");
        assert_eq!(Location::START.to_string(), "1:1");
    }

    #[test]
    fn test_token_equality_ignores_position() {
        let a = Token::new("foo", TokenKind::Identifier, Span::new(0, 3), Location::START);
        let b = Token::new(
            "foo",
            TokenKind::Identifier,
            Span::new(40, 43),
            Location::new(3, 7),
        );
        assert_eq!(a, b);

        let c = tok("foo", TokenKind::String);
        assert_ne!(a, c);
        let d = tok("bar", TokenKind::Identifier);
        assert_ne!(a, d);
    }

    #[test]
    fn test_keyword_text_includes_multi_word_entry() {
        assert_eq!(Keyword::PrimaryKey.as_str(), "primary key");
        assert_eq!(Keyword::Select.as_str(), "select");
        assert_eq!(Keyword::ALL.len(), 24);
    }

    #[test]
    fn test_symbol_text() {
        assert_eq!(Symbol::Semicolon.as_str(), ";");
        assert_eq!(Symbol::Asterisk.as_str(), "*");
        assert_eq!(Symbol::ALL.len(), 5);
    }

    #[test]
    fn test_token_keyword_and_symbol_predicates() {
        let select = tok("select", TokenKind::Keyword);
        assert!(select.is_keyword(Keyword::Select));
        assert!(!select.is_keyword(Keyword::From));
        assert!(!select.is_symbol(Symbol::Asterisk));

        let semi = tok(";", TokenKind::Symbol);
        assert!(semi.is_symbol(Symbol::Semicolon));

        // Reclassified literals are not structural keywords.
        let truth = tok("true", TokenKind::Boolean);
        assert!(!truth.is_keyword(Keyword::True));
    }

    #[test]
    fn test_token_kind_labels() {
        assert_eq!(TokenKind::Keyword.as_str(), "keyword");
        assert_eq!(TokenKind::Null.to_string(), "null");
    }
}

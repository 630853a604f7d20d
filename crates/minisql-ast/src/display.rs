//! Canonical SQL rendering for AST nodes.
//!
//! Output is normalized: structural keywords uppercase, unquoted
//! identifiers lowercase, string literals single-quoted with
//! doubled-delimiter escapes. Rendered text re-lexes and re-parses to a
//! structurally equal tree; the round-trip tests depend on that.

use std::fmt;

use crate::token::{Keyword, TokenKind};
use crate::{
    Ast, ColumnDefinition, CreateTableStatement, Expression, InsertStatement, SelectStatement,
    Statement,
};

/// Whether identifier text can be rendered without quoting.
///
/// Bare output must re-lex to the same single identifier token: it has to
/// start with a lowercase letter, stay within the unquoted identifier
/// alphabet, and must not begin with a keyword (keywords are tried first
/// by the lexer, so bare `selectx` would come back as `select` + `x`).
fn is_bare_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_lowercase() {
        return false;
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '$' || c == '_') {
        return false;
    }
    !Keyword::ALL
        .iter()
        .any(|keyword| text.starts_with(keyword.as_str()))
}

/// Write `text` wrapped in `delimiter`, doubling embedded delimiters.
fn write_delimited(f: &mut fmt::Formatter<'_>, text: &str, delimiter: char) -> fmt::Result {
    write!(f, "{delimiter}")?;
    for c in text.chars() {
        if c == delimiter {
            write!(f, "{delimiter}{delimiter}")?;
        } else {
            write!(f, "{c}")?;
        }
    }
    write!(f, "{delimiter}")
}

fn write_identifier(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if is_bare_identifier(text) {
        f.write_str(text)
    } else {
        write_delimited(f, text, '"')
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(token) => match token.kind {
                TokenKind::String => write_delimited(f, &token.text, '\''),
                TokenKind::Identifier => write_identifier(f, &token.text),
                TokenKind::Keyword
                | TokenKind::Symbol
                | TokenKind::Numeric
                | TokenKind::Boolean
                | TokenKind::Null => f.write_str(&token.text),
            },
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        if let Some(ref table) = self.from {
            f.write_str(" FROM ")?;
            write_identifier(f, &table.text)?;
        }
        Ok(())
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("INSERT INTO ")?;
        write_identifier(f, &self.table.text)?;
        f.write_str(" VALUES (")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_identifier(f, &self.name.text)?;
        write!(f, " {}", self.datatype.text.to_ascii_uppercase())
    }
}

impl fmt::Display for CreateTableStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CREATE TABLE ")?;
        write_identifier(f, &self.name.text)?;
        f.write_str(" (")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(select) => write!(f, "{select}"),
            Self::Insert(insert) => write!(f, "{insert}"),
            Self::CreateTable(create) => write!(f, "{create}"),
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{statement};")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::token::{Location, Span, Token, TokenKind};
    use crate::{
        Ast, ColumnDefinition, CreateTableStatement, Expression, InsertStatement, SelectStatement,
        Statement,
    };

    /// Helper: a token with throwaway positions.
    fn tok(text: &str, kind: TokenKind) -> Token {
        Token::new(text, kind, Span::ZERO, Location::START)
    }

    /// Helper: a literal expression.
    fn lit(text: &str, kind: TokenKind) -> Expression {
        Expression::Literal(tok(text, kind))
    }

    #[test]
    fn test_display_select_star_from() {
        let stmt = SelectStatement {
            items: vec![lit("*", TokenKind::Symbol)],
            from: Some(tok("foo", TokenKind::Identifier)),
        };
        assert_eq!(stmt.to_string(), "SELECT * FROM foo");
    }

    #[test]
    fn test_display_select_without_from() {
        let stmt = SelectStatement {
            items: vec![lit("1", TokenKind::Numeric), lit("two", TokenKind::String)],
            from: None,
        };
        assert_eq!(stmt.to_string(), "SELECT 1, 'two'");
    }

    #[test]
    fn test_display_insert_escapes_string_values() {
        let stmt = InsertStatement {
            table: tok("foo", TokenKind::Identifier),
            values: vec![
                lit("1", TokenKind::Numeric),
                lit("it's", TokenKind::String),
                lit("true", TokenKind::Boolean),
                lit("null", TokenKind::Null),
            ],
        };
        assert_eq!(
            stmt.to_string(),
            "INSERT INTO foo VALUES (1, 'it''s', true, null)"
        );
    }

    #[test]
    fn test_display_create_table_uppercases_datatypes() {
        let stmt = CreateTableStatement {
            name: tok("foo", TokenKind::Identifier),
            columns: vec![
                ColumnDefinition {
                    name: tok("id", TokenKind::Identifier),
                    datatype: tok("int", TokenKind::Keyword),
                },
                ColumnDefinition {
                    name: tok("name", TokenKind::Identifier),
                    datatype: tok("text", TokenKind::Keyword),
                },
            ],
        };
        assert_eq!(stmt.to_string(), "CREATE TABLE foo (id INT, name TEXT)");
    }

    #[test]
    fn test_display_quotes_unsafe_identifiers() {
        // Mixed case only survives re-lexing inside double quotes.
        let cased = SelectStatement {
            items: vec![lit("CamelCase", TokenKind::Identifier)],
            from: None,
        };
        assert_eq!(cased.to_string(), "SELECT \"CamelCase\"");

        // A keyword prefix would be split by the keyword-first lexer.
        let prefixed = SelectStatement {
            items: vec![lit("int2", TokenKind::Identifier)],
            from: None,
        };
        assert_eq!(prefixed.to_string(), "SELECT \"int2\"");

        // Embedded quotes are doubled.
        let quoted = SelectStatement {
            items: vec![lit("a\"b", TokenKind::Identifier)],
            from: None,
        };
        assert_eq!(quoted.to_string(), "SELECT \"a\"\"b\"");
    }

    #[test]
    fn test_display_ast_joins_statements_with_semicolons() {
        let ast = Ast {
            statements: vec![
                Statement::Select(SelectStatement {
                    items: vec![lit("1", TokenKind::Numeric)],
                    from: None,
                }),
                Statement::Select(SelectStatement {
                    items: vec![lit("2", TokenKind::Numeric)],
                    from: None,
                }),
            ],
        };
        assert_eq!(ast.to_string(), "SELECT 1;\nSELECT 2;");
    }

    #[test]
    fn test_display_empty_ast_is_empty_string() {
        assert_eq!(Ast::default().to_string(), "");
    }
}

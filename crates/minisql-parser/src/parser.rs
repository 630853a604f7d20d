//! Recursive descent parser over the lexer's token sequence.
//!
//! Each grammar production is a pure function taking the token slice and a
//! starting cursor index and returning the parsed node plus the advanced
//! cursor, or a positioned [`ParseError`]. Productions never mutate shared
//! state, so a failed statement-kind trial costs nothing to unwind: the
//! dispatcher simply retries the next alternative from the same index.
//!
//! Statement kinds are tried in fixed order (SELECT, INSERT, CREATE TABLE)
//! and the first success wins. When every trial fails, the error reported
//! is the one whose trial reached furthest into the input.

use tracing::debug;

use minisql_ast::{
    Ast, ColumnDefinition, CreateTableStatement, Expression, InsertStatement, Keyword, Location,
    SelectStatement, Span, Statement, Symbol, Token, TokenKind,
};
use minisql_error::{MinisqlError, ParseError};

use crate::lexer::lex;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A detached keyword token, used as a comparison target. Token equality
/// ignores positions, so the placeholder span/location never matter.
fn keyword_token(keyword: Keyword) -> Token {
    Token::new(keyword.as_str(), TokenKind::Keyword, Span::ZERO, Location::START)
}

/// A detached symbol token, used as a comparison target.
fn symbol_token(symbol: Symbol) -> Token {
    Token::new(symbol.as_str(), TokenKind::Symbol, Span::ZERO, Location::START)
}

/// An error citing the token at `cursor`, or end of input past the last
/// token. The offending text is folded into the message as a hint.
fn err_expected(tokens: &[Token], cursor: usize, what: &str) -> ParseError {
    if let Some(t) = tokens.get(cursor) {
        ParseError::new(
            format!("expected {what}, got '{}'", t.text),
            t.loc.line,
            t.loc.col,
        )
    } else if let Some(t) = tokens.last() {
        ParseError::new(
            format!("expected {what}, got end of input"),
            t.loc.line,
            t.loc.col,
        )
    } else {
        ParseError::new(format!("expected {what}"), 0, 0)
    }
}

/// Consume the given structural keyword or fail.
fn expect_keyword(tokens: &[Token], cursor: usize, keyword: Keyword) -> Result<usize, ParseError> {
    match tokens.get(cursor) {
        Some(t) if t.is_keyword(keyword) => Ok(cursor + 1),
        _ => Err(err_expected(tokens, cursor, &format!("'{keyword}'"))),
    }
}

/// Consume the given punctuation symbol or fail.
fn expect_symbol(tokens: &[Token], cursor: usize, symbol: Symbol) -> Result<usize, ParseError> {
    match tokens.get(cursor) {
        Some(t) if t.is_symbol(symbol) => Ok(cursor + 1),
        _ => Err(err_expected(tokens, cursor, &format!("'{symbol}'"))),
    }
}

/// Consume an identifier token or fail with a message naming its role.
fn expect_identifier<'a>(
    tokens: &'a [Token],
    cursor: usize,
    what: &str,
) -> Result<(&'a Token, usize), ParseError> {
    match tokens.get(cursor) {
        Some(t) if t.kind == TokenKind::Identifier => Ok((t, cursor + 1)),
        _ => Err(err_expected(tokens, cursor, what)),
    }
}

// ---------------------------------------------------------------------------
// Expression productions
// ---------------------------------------------------------------------------

/// A single literal expression: a string, numeric, boolean, null, or
/// identifier token.
fn parse_expression(tokens: &[Token], cursor: usize) -> Result<(Expression, usize), ParseError> {
    match tokens.get(cursor) {
        Some(t) if matches!(
            t.kind,
            TokenKind::String
                | TokenKind::Numeric
                | TokenKind::Identifier
                | TokenKind::Boolean
                | TokenKind::Null
        ) =>
        {
            Ok((Expression::Literal(t.clone()), cursor + 1))
        }
        _ => Err(err_expected(tokens, cursor, "expression")),
    }
}

/// A SELECT projection item: any literal expression, or the bare `*`
/// symbol. `*` is valid only here, not in general expression position.
fn parse_select_item(tokens: &[Token], cursor: usize) -> Result<(Expression, usize), ParseError> {
    match tokens.get(cursor) {
        Some(t) if t.is_symbol(Symbol::Asterisk) => {
            Ok((Expression::Literal(t.clone()), cursor + 1))
        }
        _ => parse_expression(tokens, cursor),
    }
}

/// A non-empty comma-separated list of expressions, ending at (but not
/// consuming) the first token equal to one of `terminators`.
///
/// `element` is the per-item production, so the SELECT item list can admit
/// `*` while VALUES lists cannot. Leading or trailing commas fail.
fn parse_expressions(
    tokens: &[Token],
    initial: usize,
    terminators: &[Token],
    element: fn(&[Token], usize) -> Result<(Expression, usize), ParseError>,
) -> Result<(Vec<Expression>, usize), ParseError> {
    let mut cursor = initial;
    let mut expressions: Vec<Expression> = Vec::new();
    loop {
        let Some(current) = tokens.get(cursor) else {
            return Err(err_expected(tokens, cursor, "expression"));
        };
        if terminators.iter().any(|t| t == current) {
            break;
        }
        if !expressions.is_empty() {
            if !current.is_symbol(Symbol::Comma) {
                return Err(err_expected(tokens, cursor, "','"));
            }
            cursor += 1;
        }

        let (expression, next) = element(tokens, cursor)?;
        expressions.push(expression);
        cursor = next;
    }

    if expressions.is_empty() {
        return Err(err_expected(tokens, initial, "expression"));
    }
    Ok((expressions, cursor))
}

// ---------------------------------------------------------------------------
// Statement productions
// ---------------------------------------------------------------------------

/// `select <items> [from <identifier>]`, with the item list ending at
/// either the `from` keyword or the statement delimiter.
fn parse_select(
    tokens: &[Token],
    initial: usize,
    delimiter: &Token,
) -> Result<(SelectStatement, usize), ParseError> {
    let mut cursor = expect_keyword(tokens, initial, Keyword::Select)?;

    let terminators = [keyword_token(Keyword::From), delimiter.clone()];
    let (items, next) = parse_expressions(tokens, cursor, &terminators, parse_select_item)?;
    cursor = next;

    let mut from = None;
    if tokens.get(cursor).is_some_and(|t| t.is_keyword(Keyword::From)) {
        cursor += 1;
        let (table, next) = expect_identifier(tokens, cursor, "table name after 'from'")?;
        from = Some(table.clone());
        cursor = next;
    }

    Ok((SelectStatement { items, from }, cursor))
}

/// `insert into <identifier> values ( <expressions> )`.
fn parse_insert(tokens: &[Token], initial: usize) -> Result<(InsertStatement, usize), ParseError> {
    let cursor = expect_keyword(tokens, initial, Keyword::Insert)?;
    let cursor = expect_keyword(tokens, cursor, Keyword::Into)?;
    let (table, cursor) = expect_identifier(tokens, cursor, "table name")?;
    let cursor = expect_keyword(tokens, cursor, Keyword::Values)?;
    let cursor = expect_symbol(tokens, cursor, Symbol::LeftParen)?;

    let terminators = [symbol_token(Symbol::RightParen)];
    let (values, cursor) = parse_expressions(tokens, cursor, &terminators, parse_expression)?;
    let cursor = expect_symbol(tokens, cursor, Symbol::RightParen)?;

    Ok((
        InsertStatement {
            table: table.clone(),
            values,
        },
        cursor,
    ))
}

/// One-or-more comma-separated `<identifier> <datatype>` entries, ending
/// at (but not consuming) the closing parenthesis.
fn parse_column_definitions(
    tokens: &[Token],
    initial: usize,
) -> Result<(Vec<ColumnDefinition>, usize), ParseError> {
    let mut cursor = initial;
    let mut columns: Vec<ColumnDefinition> = Vec::new();
    loop {
        let Some(current) = tokens.get(cursor) else {
            return Err(err_expected(tokens, cursor, "column definition"));
        };
        if current.is_symbol(Symbol::RightParen) {
            break;
        }
        if !columns.is_empty() {
            if !current.is_symbol(Symbol::Comma) {
                return Err(err_expected(tokens, cursor, "','"));
            }
            cursor += 1;
        }

        let (name, next) = expect_identifier(tokens, cursor, "column name")?;
        cursor = next;

        let datatype = match tokens.get(cursor) {
            Some(t) if t.is_keyword(Keyword::Int)
                || t.is_keyword(Keyword::Text)
                || t.is_keyword(Keyword::Boolean) =>
            {
                t.clone()
            }
            _ => {
                return Err(err_expected(
                    tokens,
                    cursor,
                    "column datatype ('int', 'text', or 'boolean')",
                ))
            }
        };
        cursor += 1;

        columns.push(ColumnDefinition {
            name: name.clone(),
            datatype,
        });
    }

    if columns.is_empty() {
        return Err(err_expected(tokens, initial, "column definition"));
    }
    Ok((columns, cursor))
}

/// `create table <identifier> ( <column definitions> )`.
fn parse_create_table(
    tokens: &[Token],
    initial: usize,
) -> Result<(CreateTableStatement, usize), ParseError> {
    let cursor = expect_keyword(tokens, initial, Keyword::Create)?;
    let cursor = expect_keyword(tokens, cursor, Keyword::Table)?;
    let (name, cursor) = expect_identifier(tokens, cursor, "table name")?;
    let cursor = expect_symbol(tokens, cursor, Symbol::LeftParen)?;
    let (columns, cursor) = parse_column_definitions(tokens, cursor)?;
    let cursor = expect_symbol(tokens, cursor, Symbol::RightParen)?;

    Ok((
        CreateTableStatement {
            name: name.clone(),
            columns,
        },
        cursor,
    ))
}

// ---------------------------------------------------------------------------
// Statement dispatch
// ---------------------------------------------------------------------------

/// Keep `candidate` if its position is further into the input than the
/// current best; ties keep the earlier trial.
fn keep_furthest(best: &mut Option<ParseError>, candidate: ParseError) {
    let further = best
        .as_ref()
        .is_none_or(|b| (candidate.line, candidate.col) > (b.line, b.col));
    if further {
        *best = Some(candidate);
    }
}

/// Try each statement kind at `initial`, first success wins.
///
/// Trials are all-or-nothing: each starts from the same index and a failed
/// trial leaves nothing behind. The error reported when every trial fails
/// is the one from the trial that got furthest.
fn parse_statement(
    tokens: &[Token],
    initial: usize,
    delimiter: &Token,
) -> Result<(Statement, usize), ParseError> {
    let mut furthest: Option<ParseError> = None;

    match parse_select(tokens, initial, delimiter) {
        Ok((stmt, cursor)) => return Ok((Statement::Select(stmt), cursor)),
        Err(e) => keep_furthest(&mut furthest, e),
    }
    match parse_insert(tokens, initial) {
        Ok((stmt, cursor)) => return Ok((Statement::Insert(stmt), cursor)),
        Err(e) => keep_furthest(&mut furthest, e),
    }
    match parse_create_table(tokens, initial) {
        Ok((stmt, cursor)) => return Ok((Statement::CreateTable(stmt), cursor)),
        Err(e) => keep_furthest(&mut furthest, e),
    }

    Err(furthest.unwrap_or_else(|| err_expected(tokens, initial, "a statement")))
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Parse SQL text into an [`Ast`].
///
/// Every statement must be followed by at least one semicolon; consecutive
/// semicolons are skipped. Empty input yields an empty tree.
///
/// # Errors
///
/// Returns the lexer's error verbatim if tokenization fails, otherwise a
/// [`ParseError`] for the first statement no grammar production matched or
/// the first missing delimiter.
pub fn parse(source: &str) -> Result<Ast, MinisqlError> {
    let tokens = lex(source)?;
    let delimiter = symbol_token(Symbol::Semicolon);

    let mut statements: Vec<Statement> = Vec::new();
    let mut cursor = 0usize;
    while cursor < tokens.len() {
        let (statement, next) = parse_statement(&tokens, cursor, &delimiter)?;
        cursor = next;
        statements.push(statement);

        let mut at_least_one_semicolon = false;
        while tokens
            .get(cursor)
            .is_some_and(|t| t.is_symbol(Symbol::Semicolon))
        {
            cursor += 1;
            at_least_one_semicolon = true;
        }
        if !at_least_one_semicolon {
            return Err(err_expected(&tokens, cursor, "';' delimiter between statements").into());
        }
    }

    debug!(statements = statements.len(), "parsed");
    Ok(Ast { statements })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::parse;
    use minisql_ast::{Ast, Expression, Statement, TokenKind};
    use minisql_error::MinisqlError;

    /// Helper: parse a source expected to contain exactly one statement.
    fn parse_one(source: &str) -> Statement {
        let ast = parse(source).expect("parse should succeed");
        assert_eq!(ast.statements.len(), 1, "expected one statement");
        ast.statements.into_iter().next().expect("one statement")
    }

    /// Helper: the (text, kind) of a literal expression.
    fn literal(expr: &Expression) -> (&str, TokenKind) {
        let Expression::Literal(token) = expr;
        (&token.text, token.kind)
    }

    /// Parse, render, re-parse, render again, and require the two rendered
    /// strings to agree.
    fn assert_roundtrip(source: &str) {
        let first = parse(source).expect("parse should succeed");
        let rendered = first.to_string();
        let second = parse(&rendered)
            .unwrap_or_else(|e| panic!("re-parse of {rendered:?} failed: {e}"));
        assert_eq!(
            rendered,
            second.to_string(),
            "round trip diverged for {source:?}"
        );
        assert_eq!(first, second, "re-parsed tree diverged for {source:?}");
    }

    #[test]
    fn test_parse_select_star_from() {
        let Statement::Select(select) = parse_one("select * from foo;") else {
            panic!("expected a SELECT statement");
        };
        assert_eq!(select.items.len(), 1);
        assert_eq!(literal(&select.items[0]), ("*", TokenKind::Symbol));
        assert_eq!(select.from.as_ref().map(|t| t.text.as_str()), Some("foo"));
    }

    #[test]
    fn test_parse_select_items_without_from() {
        let Statement::Select(select) = parse_one("select 1, 'two', id;") else {
            panic!("expected a SELECT statement");
        };
        assert!(select.from.is_none());
        assert_eq!(
            select
                .items
                .iter()
                .map(literal)
                .collect::<Vec<_>>(),
            vec![
                ("1", TokenKind::Numeric),
                ("two", TokenKind::String),
                ("id", TokenKind::Identifier),
            ]
        );
    }

    #[test]
    fn test_parse_insert() {
        let Statement::Insert(insert) = parse_one("insert into foo values (1, 'a', true);")
        else {
            panic!("expected an INSERT statement");
        };
        assert_eq!(insert.table.text, "foo");
        assert_eq!(
            insert.values.iter().map(literal).collect::<Vec<_>>(),
            vec![
                ("1", TokenKind::Numeric),
                ("a", TokenKind::String),
                ("true", TokenKind::Boolean),
            ]
        );
    }

    #[test]
    fn test_parse_create_table() {
        let Statement::CreateTable(create) = parse_one("create table foo (id int, name text);")
        else {
            panic!("expected a CREATE TABLE statement");
        };
        assert_eq!(create.name.text, "foo");
        let columns: Vec<(&str, &str)> = create
            .columns
            .iter()
            .map(|c| (c.name.text.as_str(), c.datatype.text.as_str()))
            .collect();
        assert_eq!(columns, vec![("id", "int"), ("name", "text")]);
    }

    #[test]
    fn test_parse_create_table_boolean_column() {
        let Statement::CreateTable(create) = parse_one("create table t (flag boolean);") else {
            panic!("expected a CREATE TABLE statement");
        };
        assert_eq!(create.columns[0].datatype.text, "boolean");
    }

    #[test]
    fn test_parse_empty_input_yields_empty_ast() {
        assert_eq!(parse("").expect("parse should succeed"), Ast::default());
        assert_eq!(parse(" \n\t ").expect("parse should succeed"), Ast::default());
    }

    #[test]
    fn test_parse_multiple_statements_and_extra_semicolons() {
        let ast = parse("select 1;;; insert into t values (2);").expect("parse should succeed");
        assert_eq!(ast.statements.len(), 2);
        assert!(matches!(ast.statements[0], Statement::Select(_)));
        assert!(matches!(ast.statements[1], Statement::Insert(_)));
    }

    #[test]
    fn test_parse_missing_semicolon_cites_end_of_input() {
        let err = parse("select 1").expect_err("should fail");
        let MinisqlError::Parse(err) = err else {
            panic!("expected a parse error, got {err}");
        };
        assert!(err.message.contains("end of input"), "{}", err.message);
        // The cited position is the last token, `1` at line 1 column 8.
        assert_eq!((err.line, err.col), (1, 8));
    }

    #[test]
    fn test_parse_null_and_false_literals() {
        let Statement::Insert(insert) = parse_one("insert into t values (null, false);") else {
            panic!("expected an INSERT statement");
        };
        assert_eq!(
            insert.values.iter().map(literal).collect::<Vec<_>>(),
            vec![("null", TokenKind::Null), ("false", TokenKind::Boolean)]
        );
    }

    #[test]
    fn test_parse_star_rejected_outside_select_items() {
        assert!(parse("insert into t values (*);").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_lists() {
        // Trailing, leading, and doubled commas, and empty lists.
        assert!(parse("select 1,;").is_err());
        assert!(parse("select ,1;").is_err());
        assert!(parse("select 1,,2;").is_err());
        assert!(parse("select ;").is_err());
        assert!(parse("insert into t values ();").is_err());
        assert!(parse("create table t ();").is_err());
    }

    #[test]
    fn test_parse_rejects_structural_errors() {
        assert!(parse("select 1 from;").is_err());
        assert!(parse("insert into t values 1;").is_err());
        assert!(parse("insert t values (1);").is_err());
        assert!(parse("create table t (id blob);").is_err());
        assert!(parse("create table (id int);").is_err());
        assert!(parse("drop table t;").is_err());
    }

    #[test]
    fn test_parse_dispatch_reports_furthest_trial() {
        // All trials fail; the INSERT trial gets past two keywords and a
        // table name before rejecting `valves`, so its error is reported.
        let err = parse("insert into foo valves (1);").expect_err("should fail");
        let MinisqlError::Parse(err) = err else {
            panic!("expected a parse error, got {err}");
        };
        assert!(err.message.contains("'valves'"), "{}", err.message);
        assert_eq!((err.line, err.col), (1, 17));
    }

    #[test]
    fn test_parse_lex_failure_passes_through() {
        let err = parse("select ^;").expect_err("should fail");
        assert!(matches!(err, MinisqlError::Lex(_)));
        assert_eq!(err.to_string(), "1:8: unable to lex token after 'select'");
    }

    #[test]
    fn test_parse_positions_across_lines() {
        let err = parse("select 1;\ncreate table t (id uuid);").expect_err("should fail");
        let MinisqlError::Parse(err) = err else {
            panic!("expected a parse error, got {err}");
        };
        assert_eq!(err.line, 2);
        assert_eq!(err.col, 20);
    }

    #[test]
    fn test_parse_quoted_identifiers() {
        let Statement::Select(select) = parse_one("select \"Mixed Case\" from \"My Table\";")
        else {
            panic!("expected a SELECT statement");
        };
        assert_eq!(literal(&select.items[0]).0, "Mixed Case");
        assert_eq!(select.from.as_ref().map(|t| t.text.as_str()), Some("My Table"));
    }

    #[test]
    fn test_roundtrip_statements() {
        assert_roundtrip("select 1;");
        assert_roundtrip("select * from foo;");
        assert_roundtrip("select *, 1, 'two' from foo;");
        assert_roundtrip("SELECT Id, Name FROM Users;");
        assert_roundtrip("select \"Mixed Case\";");
        assert_roundtrip("insert into foo values (1, 'it''s', true, null);");
        assert_roundtrip("insert into foo values (1.5e-2);");
        assert_roundtrip("create table foo (id int, name text, ok boolean);");
        assert_roundtrip("select 1; insert into t values (2); create table u (id int);");
    }

    // -----------------------------------------------------------------------
    // Proptest: render → re-parse round trip
    // -----------------------------------------------------------------------

    mod proptest_roundtrip {
        use super::{assert_roundtrip, parse};
        use minisql_ast::Keyword;
        use proptest::prelude::*;

        /// Generate an identifier that survives bare rendering: lowercase,
        /// no keyword prefix (the keyword-first lexer would split it).
        fn arb_ident() -> BoxedStrategy<String> {
            prop::string::string_regex("[a-z][a-z0-9_$]{0,6}")
                .expect("valid regex")
                .prop_filter("must not start with a keyword", |s| {
                    !Keyword::ALL.iter().any(|k| s.starts_with(k.as_str()))
                })
                .boxed()
        }

        /// Generate a literal value in source form.
        fn arb_literal() -> BoxedStrategy<String> {
            prop_oneof![
                any::<u32>().prop_map(|n| n.to_string()),
                (0u32..10_000, 0u32..100).prop_map(|(i, f)| format!("{i}.{f}")),
                (1u32..1000, -20i32..20).prop_map(|(m, e)| format!("{m}e{e}")),
                prop::string::string_regex("[a-z '\"]{0,8}")
                    .expect("valid regex")
                    .prop_map(|s| format!("'{}'", s.replace('\'', "''"))),
                arb_ident(),
                Just("true".to_string()),
                Just("false".to_string()),
                Just("null".to_string()),
            ]
            .boxed()
        }

        fn arb_select() -> BoxedStrategy<String> {
            let items = proptest::collection::vec(
                prop_oneof![4 => arb_literal(), 1 => Just("*".to_string())],
                1..4,
            );
            (items, prop::option::of(arb_ident()))
                .prop_map(|(items, from)| {
                    let mut sql = format!("select {}", items.join(", "));
                    if let Some(table) = from {
                        sql.push_str(&format!(" from {table}"));
                    }
                    sql
                })
                .boxed()
        }

        fn arb_insert() -> BoxedStrategy<String> {
            (arb_ident(), proptest::collection::vec(arb_literal(), 1..4))
                .prop_map(|(table, values)| {
                    format!("insert into {table} values ({})", values.join(", "))
                })
                .boxed()
        }

        fn arb_create_table() -> BoxedStrategy<String> {
            let column = (arb_ident(), prop_oneof![
                Just("int"),
                Just("text"),
                Just("boolean"),
            ])
                .prop_map(|(name, datatype)| format!("{name} {datatype}"));
            (arb_ident(), proptest::collection::vec(column, 1..4))
                .prop_map(|(table, columns)| {
                    format!("create table {table} ({})", columns.join(", "))
                })
                .boxed()
        }

        fn arb_statements() -> BoxedStrategy<String> {
            let statement = prop_oneof![
                4 => arb_select(),
                3 => arb_insert(),
                2 => arb_create_table(),
            ];
            proptest::collection::vec(statement, 1..4)
                .prop_map(|statements| format!("{};", statements.join("; ")))
                .boxed()
        }

        proptest::proptest! {
            #![proptest_config(ProptestConfig::with_cases(512))]

            #[test]
            fn test_parse_roundtrip_proptest(sql in arb_statements()) {
                // Every generated input is grammatical, so the first parse
                // must already succeed.
                prop_assert!(parse(&sql).is_ok(), "generated SQL failed to parse: {sql:?}");
                assert_roundtrip(&sql);
            }
        }
    }
}

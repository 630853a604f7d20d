//! The minisql front end: a longest-match lexer and a backtracking
//! recursive-descent parser for a minimal SQL statement set (`SELECT`,
//! `INSERT INTO ... VALUES`, `CREATE TABLE`).
//!
//! The pipeline is text → [`lex`] → tokens → [`parse`] → [`Ast`]. Both
//! stages are pure and reentrant; failures are positioned error values,
//! never panics.
//!
//! ```
//! use minisql_parser::parse;
//!
//! let ast = parse("select name, id from users;")?;
//! assert_eq!(ast.statements.len(), 1);
//! # Ok::<(), minisql_error::MinisqlError>(())
//! ```
//!
//! [`Ast`]: minisql_ast::Ast

pub mod lexer;
pub mod parser;

pub use lexer::{
    lex, reset_tokenize_metrics, tokenize_metrics_snapshot, TokenizeMetricsSnapshot,
};
pub use parser::parse;

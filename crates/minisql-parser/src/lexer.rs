//! The lexer: SQL text in, a flat token sequence out.
//!
//! Five recognizers are tried at each cursor position in fixed priority
//! order (keyword, symbol, string, numeric, identifier) and the first one
//! that matches wins. Keyword and symbol recognition share a longest-match
//! scan over the constant vocabularies in `minisql-ast`, so a multi-word
//! entry like `primary key` beats any shorter entry sharing its prefix.
//! Whitespace is consumed by the symbol recognizer without producing a
//! token. Lexing is all-or-nothing: the first unrecognized character fails
//! the whole call with a positioned [`LexError`].

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use minisql_ast::{Keyword, Location, Span, Symbol, Token, TokenKind};
use minisql_error::LexError;

// ---------------------------------------------------------------------------
// Tokenize metrics
// ---------------------------------------------------------------------------

static TOKENIZE_CALLS_TOTAL: AtomicU64 = AtomicU64::new(0);
static TOKENIZE_TOKENS_TOTAL: AtomicU64 = AtomicU64::new(0);
static TOKENIZE_ERRORS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Snapshot of process-local tokenize counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenizeMetricsSnapshot {
    /// Number of [`lex`] calls.
    pub tokenize_calls_total: u64,
    /// Number of tokens produced across all successful calls.
    pub tokenize_tokens_total: u64,
    /// Number of calls that failed with a [`LexError`].
    pub tokenize_errors_total: u64,
}

/// Read the current tokenize counters.
#[must_use]
pub fn tokenize_metrics_snapshot() -> TokenizeMetricsSnapshot {
    TokenizeMetricsSnapshot {
        tokenize_calls_total: TOKENIZE_CALLS_TOTAL.load(Ordering::Relaxed),
        tokenize_tokens_total: TOKENIZE_TOKENS_TOTAL.load(Ordering::Relaxed),
        tokenize_errors_total: TOKENIZE_ERRORS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Reset the tokenize counters to zero. Test hook.
pub fn reset_tokenize_metrics() {
    TOKENIZE_CALLS_TOTAL.store(0, Ordering::Relaxed);
    TOKENIZE_TOKENS_TOTAL.store(0, Ordering::Relaxed);
    TOKENIZE_ERRORS_TOTAL.store(0, Ordering::Relaxed);
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// A position in the source text: byte offset plus line/column.
///
/// Recognizers take a cursor by value and return the advanced copy on
/// success, so a failed recognizer leaves the caller's cursor untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    pointer: usize,
    loc: Location,
}

impl Cursor {
    const START: Self = Self {
        pointer: 0,
        loc: Location::START,
    };

    /// Advance past `len` bytes on the current line.
    fn advanced(self, len: usize) -> Self {
        Self {
            pointer: self.pointer + len,
            loc: Location::new(self.loc.line, self.loc.col + len as u32),
        }
    }
}

// ---------------------------------------------------------------------------
// Recognizers
// ---------------------------------------------------------------------------

/// A token recognizer. `Some((None, cursor))` means input was consumed
/// without producing a token (whitespace); `None` means no match, cursor
/// untouched.
type Recognizer = fn(&str, Cursor) -> Option<(Option<Token>, Cursor)>;

/// Priority order. Keywords before symbols before literals before
/// identifiers, so `select` never lexes as an identifier.
const RECOGNIZERS: [Recognizer; 5] = [
    lex_keyword,
    lex_symbol,
    lex_string,
    lex_numeric,
    lex_identifier,
];

/// Longest exact vocabulary entry matching the input at `ic`.
///
/// Grows a lowercase-folded candidate one byte at a time, dropping entries
/// that stop being a prefix of it, and remembers the longest entry matched
/// exactly so far. An equal-length tie (possible only between duplicate
/// entries) keeps the first-declared one via the strict length comparison.
fn longest_match(source: &str, ic: Cursor, options: &[&'static str]) -> Option<&'static str> {
    let bytes = source.as_bytes();
    let mut alive: Vec<&'static str> = options.to_vec();
    let mut best: Option<&'static str> = None;
    let mut candidate = String::new();
    let mut pointer = ic.pointer;

    while pointer < bytes.len() && !alive.is_empty() {
        candidate.push(bytes[pointer].to_ascii_lowercase() as char);
        pointer += 1;
        alive.retain(|option| {
            if *option == candidate {
                if best.is_none_or(|b| option.len() > b.len()) {
                    best = Some(option);
                }
                return false;
            }
            option.len() > candidate.len() && option.starts_with(candidate.as_str())
        });
    }
    best
}

/// Keyword recognizer. `true`/`false`/`null` are reclassified as boolean
/// and null literals, since the grammar treats them as values.
fn lex_keyword(source: &str, ic: Cursor) -> Option<(Option<Token>, Cursor)> {
    let matched = longest_match(source, ic, &Keyword::ALL.map(Keyword::as_str))?;
    let cur = ic.advanced(matched.len());
    let kind = match matched {
        "true" | "false" => TokenKind::Boolean,
        "null" => TokenKind::Null,
        _ => TokenKind::Keyword,
    };
    let span = Span::new(ic.pointer as u32, cur.pointer as u32);
    Some((Some(Token::new(matched, kind, span, ic.loc)), cur))
}

/// Symbol recognizer. Also the place whitespace is consumed: a space, tab,
/// carriage return, or newline advances the cursor and yields no token,
/// with a newline resetting the column and bumping the line.
fn lex_symbol(source: &str, ic: Cursor) -> Option<(Option<Token>, Cursor)> {
    let c = *source.as_bytes().get(ic.pointer)?;
    match c {
        b'\n' => {
            let cur = Cursor {
                pointer: ic.pointer + 1,
                loc: Location::new(ic.loc.line + 1, 1),
            };
            return Some((None, cur));
        }
        b' ' | b'\t' | b'\r' => return Some((None, ic.advanced(1))),
        _ => {}
    }

    let matched = longest_match(source, ic, &Symbol::ALL.map(Symbol::as_str))?;
    let cur = ic.advanced(matched.len());
    let span = Span::new(ic.pointer as u32, cur.pointer as u32);
    Some((Some(Token::new(matched, TokenKind::Symbol, span, ic.loc)), cur))
}

/// String literal recognizer: single-quote delimited.
fn lex_string(source: &str, ic: Cursor) -> Option<(Option<Token>, Cursor)> {
    lex_delimited(source, ic, b'\'', TokenKind::String)
}

/// Scan a `delimiter`-wrapped literal starting at `ic`.
///
/// A doubled delimiter inside the literal escapes to one literal delimiter
/// character. No closing delimiter before end of input is a non-match,
/// which the driver turns into a fatal lex error. The token's text is the
/// unescaped value; its span still covers the delimiters.
fn lex_delimited(
    source: &str,
    ic: Cursor,
    delimiter: u8,
    kind: TokenKind,
) -> Option<(Option<Token>, Cursor)> {
    let bytes = source.as_bytes();
    if bytes.get(ic.pointer) != Some(&delimiter) {
        return None;
    }

    let mut cur = ic.advanced(1);
    let mut value = String::new();
    while cur.pointer < bytes.len() {
        // Everything up to the next delimiter is literal text.
        let run = memchr::memchr(delimiter, &bytes[cur.pointer..])?;
        value.push_str(&source[cur.pointer..cur.pointer + run]);
        cur = cur.advanced(run);

        if bytes.get(cur.pointer + 1) == Some(&delimiter) {
            value.push(delimiter as char);
            cur = cur.advanced(2);
        } else {
            cur = cur.advanced(1);
            let span = Span::new(ic.pointer as u32, cur.pointer as u32);
            return Some((Some(Token::new(value, kind, span, ic.loc)), cur));
        }
    }
    None
}

/// Numeric literal recognizer.
///
/// Accepts optional leading digits, at most one `.`, and at most one `e`
/// exponent marker followed by an optional sign. A period after the
/// exponent, a doubled marker, an exponent with nothing after it, or an
/// exponent with no digit before it all fail the whole match rather than
/// stopping early. The first character must be a digit or a period.
fn lex_numeric(source: &str, ic: Cursor) -> Option<(Option<Token>, Cursor)> {
    let bytes = source.as_bytes();
    let mut pointer = ic.pointer;
    let mut period_found = false;
    let mut exp_found = false;
    let mut digit_found = false;

    while pointer < bytes.len() {
        let c = bytes[pointer];
        let is_digit = c.is_ascii_digit();

        if pointer == ic.pointer {
            if !is_digit && c != b'.' {
                return None;
            }
            period_found = c == b'.';
            digit_found = is_digit;
            pointer += 1;
            continue;
        }

        if c == b'.' {
            if period_found {
                return None;
            }
            period_found = true;
            pointer += 1;
            continue;
        }

        if c == b'e' {
            if exp_found || !digit_found {
                return None;
            }
            // No period may follow the exponent marker.
            period_found = true;
            exp_found = true;

            // The marker cannot be the last character of input.
            if pointer == bytes.len() - 1 {
                return None;
            }
            let next = bytes[pointer + 1];
            if next == b'-' || next == b'+' {
                pointer += 1;
            }
            pointer += 1;
            continue;
        }

        if !is_digit {
            break;
        }
        digit_found = true;
        pointer += 1;
    }

    if pointer == ic.pointer {
        return None;
    }

    let cur = ic.advanced(pointer - ic.pointer);
    let span = Span::new(ic.pointer as u32, cur.pointer as u32);
    let text = &source[ic.pointer..cur.pointer];
    Some((Some(Token::new(text, TokenKind::Numeric, span, ic.loc)), cur))
}

/// Identifier recognizer: either a double-quote delimited literal (same
/// escape rule as strings) or an unquoted run starting with a letter and
/// continuing through letters, digits, `$`, `_`. Unquoted identifiers are
/// case-folded to lowercase.
fn lex_identifier(source: &str, ic: Cursor) -> Option<(Option<Token>, Cursor)> {
    if let Some(result) = lex_delimited(source, ic, b'"', TokenKind::Identifier) {
        return Some(result);
    }

    let bytes = source.as_bytes();
    let first = *bytes.get(ic.pointer)?;
    if !first.is_ascii_alphabetic() {
        return None;
    }

    let mut pointer = ic.pointer + 1;
    while pointer < bytes.len() {
        let c = bytes[pointer];
        if !(c.is_ascii_alphanumeric() || c == b'$' || c == b'_') {
            break;
        }
        pointer += 1;
    }

    let cur = ic.advanced(pointer - ic.pointer);
    let span = Span::new(ic.pointer as u32, cur.pointer as u32);
    let text = source[ic.pointer..cur.pointer].to_ascii_lowercase();
    Some((Some(Token::new(text, TokenKind::Identifier, span, ic.loc)), cur))
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Tokenize `source` into a flat token sequence.
///
/// # Errors
///
/// Fails on the first position where no recognizer matches, citing the
/// one-based line/column and, when available, the preceding token's text.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    TOKENIZE_CALLS_TOTAL.fetch_add(1, Ordering::Relaxed);

    let mut tokens: Vec<Token> = Vec::new();
    let mut cur = Cursor::START;
    'next_token: while cur.pointer < source.len() {
        for recognize in RECOGNIZERS {
            if let Some((token, next)) = recognize(source, cur) {
                cur = next;
                if let Some(token) = token {
                    trace!(text = %token.text, kind = %token.kind, loc = %token.loc, "token");
                    tokens.push(token);
                }
                continue 'next_token;
            }
        }

        TOKENIZE_ERRORS_TOTAL.fetch_add(1, Ordering::Relaxed);
        let hint = tokens
            .last()
            .map_or_else(String::new, |t| format!(" after '{}'", t.text));
        debug!(line = cur.loc.line, col = cur.loc.col, "tokenize failed");
        return Err(LexError::new(
            format!("unable to lex token{hint}"),
            cur.loc.line,
            cur.loc.col,
        ));
    }

    TOKENIZE_TOKENS_TOTAL.fetch_add(tokens.len() as u64, Ordering::Relaxed);
    debug!(tokens = tokens.len(), "tokenized");
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

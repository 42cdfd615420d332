//! Read-only statement classification.
//!
//! A statement is admitted when its leading keyword, found after any
//! leading whitespace and comments, is one of the [`ReadOnlyKeyword`]s. A
//! `WITH` statement must additionally contain a `SELECT` keyword in its code
//! text, so `WITH ... UPDATE` / `WITH ... DELETE` forms are turned away.
//!
//! Identifiers that look like destructive keywords do not matter:
//! `SELECT * FROM delete` is admitted because only the leading keyword is
//! significant.

use std::fmt;

use crate::error::Rejection;
use crate::lexer::code_words;

/// Leading keywords that signify a read-only statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadOnlyKeyword {
    Select,
    Show,
    Explain,
    Describe,
    Desc,
    /// Common table expressions; a `SELECT` must follow.
    With,
    /// Literal row values.
    Values,
    /// PostgreSQL shorthand for `SELECT * FROM`.
    Table,
}

impl ReadOnlyKeyword {
    /// The complete allow-list.
    pub const ALL: [ReadOnlyKeyword; 8] = [
        ReadOnlyKeyword::Select,
        ReadOnlyKeyword::Show,
        ReadOnlyKeyword::Explain,
        ReadOnlyKeyword::Describe,
        ReadOnlyKeyword::Desc,
        ReadOnlyKeyword::With,
        ReadOnlyKeyword::Values,
        ReadOnlyKeyword::Table,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadOnlyKeyword::Select => "SELECT",
            ReadOnlyKeyword::Show => "SHOW",
            ReadOnlyKeyword::Explain => "EXPLAIN",
            ReadOnlyKeyword::Describe => "DESCRIBE",
            ReadOnlyKeyword::Desc => "DESC",
            ReadOnlyKeyword::With => "WITH",
            ReadOnlyKeyword::Values => "VALUES",
            ReadOnlyKeyword::Table => "TABLE",
        }
    }

    /// Match a token against the allow-list, ignoring ASCII case.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|keyword| token.eq_ignore_ascii_case(keyword.as_str()))
    }
}

impl fmt::Display for ReadOnlyKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Accepted(ReadOnlyKeyword),
    Rejected(Rejection),
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted(_))
    }

    pub fn into_result(self) -> Result<ReadOnlyKeyword, Rejection> {
        match self {
            Classification::Accepted(keyword) => Ok(keyword),
            Classification::Rejected(rejection) => Err(rejection),
        }
    }
}

/// Decide whether `query` is a read-only statement.
pub fn classify(query: &str) -> Classification {
    let Some(statement) = skip_leading_comments(query) else {
        return Classification::Rejected(Rejection::EmptyQuery);
    };

    let token = leading_token(statement);
    let Some(keyword) = ReadOnlyKeyword::from_token(token) else {
        return Classification::Rejected(Rejection::NotReadOnly);
    };

    if keyword == ReadOnlyKeyword::With && !reaches_select(&statement[token.len()..]) {
        return Classification::Rejected(Rejection::NotReadOnly);
    }

    Classification::Accepted(keyword)
}

/// Strip leading whitespace and `--`, `#` and `/* */` comments.
///
/// Returns `None` when nothing but whitespace and comments remains. A block
/// comment that nests another `/*`, or that is a MySQL executable comment
/// or optimizer hint (`/*!`, `/*+`), is left in place: dialects disagree on
/// where such comments end, so the statement is classified as starting with
/// the comment itself.
fn skip_leading_comments(query: &str) -> Option<&str> {
    let mut rest = query.trim_start();

    loop {
        if let Some(body) = rest.strip_prefix("--").or_else(|| rest.strip_prefix('#')) {
            let newline = body.find('\n')?;
            rest = body[newline + 1..].trim_start();
        } else if let Some(body) = rest.strip_prefix("/*") {
            if body.starts_with(['!', '+']) {
                break;
            }
            let end = body.find("*/")?;
            if body[..end].contains("/*") {
                break;
            }
            rest = body[end + 2..].trim_start();
        } else {
            break;
        }
    }

    (!rest.is_empty()).then_some(rest)
}

/// The first token of a statement: everything up to whitespace or the start
/// of a comment.
fn leading_token(statement: &str) -> &str {
    let end = statement
        .char_indices()
        .find(|&(i, c)| {
            c.is_whitespace()
                || c == '#'
                || statement[i..].starts_with("--")
                || statement[i..].starts_with("/*")
        })
        .map_or(statement.len(), |(i, _)| i);
    &statement[..end]
}

fn reaches_select(after_with: &str) -> bool {
    code_words(after_with).any(|word| word.eq_ignore_ascii_case("select"))
}

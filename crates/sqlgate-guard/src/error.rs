//! Rejection reasons produced by the classifier.

use thiserror::Error;

/// Why a query was not admitted.
///
/// Both variants are expected outcomes of classifying caller input, not
/// faults. Their messages are part of the tool's external contract and are
/// surfaced to callers verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The query is blank or consists only of comments.
    #[error("Please pass a valid query")]
    EmptyQuery,

    /// The leading keyword is not on the allow-list, or a `WITH` statement
    /// never reaches a `SELECT`.
    #[error("Only read-only queries are allowed (SELECT, SHOW, EXPLAIN, DESCRIBE, DESC, WITH … SELECT).")]
    NotReadOnly,
}

//! # sqlgate-guard
//!
//! Read-only admission and table prefix rewriting for SQL submitted by AI
//! agents.
//!
//! This crate provides:
//! - A single-pass segment scanner that separates code from string literals,
//!   quoted identifiers and comments
//! - A classifier that admits statements led by a read-only keyword
//! - A rewriter that prefixes declared table names without touching literals,
//!   aliases or longer identifiers
//!
//! ## How It Works
//!
//! | Leading keyword | Outcome |
//! |-----------------|---------|
//! | `SELECT`, `SHOW`, `EXPLAIN`, `DESCRIBE`, `DESC`, `VALUES`, `TABLE` | Admitted |
//! | `WITH` | Admitted when a `SELECT` follows |
//! | anything else | Rejected |
//! | nothing (blank or comments only) | Rejected as empty |
//!
//! ```
//! use sqlgate_guard::{admit, Rejection};
//!
//! let sql = admit("SELECT * FROM users WHERE name = 'users'")
//!     .unwrap()
//!     .with_table_prefix(&["users"], "arpg_")
//!     .into_sql();
//! assert_eq!(sql, "SELECT * FROM arpg_users WHERE name = 'users'");
//!
//! assert_eq!(admit("DROP TABLE users").unwrap_err(), Rejection::NotReadOnly);
//! ```
//!
//! Everything here is a pure function of its input and safe to call from
//! any number of requests at once.

pub mod classifier;
pub mod error;
pub mod gate;
pub mod lexer;
pub mod rewriter;

pub use classifier::{Classification, ReadOnlyKeyword, classify};
pub use error::Rejection;
pub use gate::{AdmittedQuery, QueryGate, admit};
pub use lexer::{Segment, SegmentKind, Segments};
pub use rewriter::rewrite;

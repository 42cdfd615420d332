//! Table prefix rewriting.
//!
//! Callers declare the bare table names their query uses; each declared name
//! is rewritten to `prefix + name` wherever it appears as a whole identifier.
//!
//! **Before (from agent), tables `["users"]`, prefix `arpg_`:**
//! ```sql
//! SELECT u.id FROM users AS u WHERE u.kind = 'users'
//! ```
//!
//! **After:**
//! ```sql
//! SELECT u.id FROM arpg_users AS u WHERE u.kind = 'users'
//! ```
//!
//! The rewrite is purely textual. It never touches string literals or
//! comments, matches quoted identifiers only when the whole identifier equals
//! the table name, and requires bare names to be bounded by non-identifier
//! characters, so `users` never matches inside `users_post`. Because `.` is a
//! separator, `public.users` becomes `public.arpg_users`.
//!
//! A column that happens to share a table's name is rewritten as well; telling
//! the two apart needs a real SQL parser.

use crate::lexer::{Segment, SegmentKind, Segments, is_identifier_char};

/// Prefix every declared table name in `query`.
///
/// Tables are applied in order, each to the output of the previous one.
/// Names that already start with `prefix` are skipped, as are empty names.
/// Returns the query unchanged when `tables` or `prefix` is empty, and
/// silently does nothing for names that do not occur.
pub fn rewrite<S: AsRef<str>>(query: &str, tables: &[S], prefix: &str) -> String {
    if tables.is_empty() || prefix.is_empty() {
        return query.to_string();
    }

    let mut rewritten = query.to_string();
    for table in tables {
        let table = table.as_ref();
        if table.is_empty() || table.starts_with(prefix) {
            continue;
        }

        let prefixed = format!("{}{}", prefix, table);
        rewritten = prefix_table(&rewritten, table, &prefixed);
    }

    rewritten
}

fn prefix_table(query: &str, table: &str, prefixed: &str) -> String {
    let mut out = String::with_capacity(query.len() + prefixed.len() - table.len());

    for segment in Segments::new(query) {
        match segment.kind {
            SegmentKind::Code => replace_bounded(&mut out, segment.text, table, prefixed),
            SegmentKind::QuotedIdentifier => push_quoted(&mut out, segment, table, prefixed),
            SegmentKind::Literal | SegmentKind::Comment => out.push_str(segment.text),
        }
    }

    out
}

fn push_quoted(out: &mut String, segment: Segment<'_>, table: &str, prefixed: &str) {
    match segment.quoted_name() {
        Some((quote, name)) if name == table => {
            out.push(quote);
            out.push_str(prefixed);
            out.push(quote);
        }
        _ => out.push_str(segment.text),
    }
}

/// Copy `text` into `out`, replacing each occurrence of `needle` that is not
/// touching an identifier character on either side.
fn replace_bounded(out: &mut String, text: &str, needle: &str, replacement: &str) {
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(needle) {
        let start = cursor + offset;
        let end = start + needle.len();

        let bounded_before = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_identifier_char(c));
        let bounded_after = text[end..]
            .chars()
            .next()
            .is_none_or(|c| !is_identifier_char(c));

        if bounded_before && bounded_after {
            out.push_str(&text[copied..start]);
            out.push_str(replacement);
            copied = end;
            cursor = end;
        } else {
            // Retry one character further; a bounded match may overlap this one.
            cursor = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
    }

    out.push_str(&text[copied..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_noop_without_tables_or_prefix() {
        let query = "SELECT * FROM users";
        assert_eq!(rewrite::<&str>(query, &[], "arpg_"), query);
        assert_eq!(rewrite(query, &["users"], ""), query);
    }

    #[test]
    fn test_simple_from() {
        assert_eq!(
            rewrite("SELECT * FROM users", &["users"], "arpg_"),
            "SELECT * FROM arpg_users"
        );
    }

    #[test]
    fn test_multiple_tables_and_qualified_columns() {
        assert_eq!(
            rewrite(
                "SELECT users.id, posts.title FROM users JOIN posts ON users.id = posts.user_id",
                &["users", "posts"],
                "arpg_"
            ),
            "SELECT arpg_users.id, arpg_posts.title FROM arpg_users JOIN arpg_posts \
             ON arpg_users.id = arpg_posts.user_id"
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(
            rewrite(
                "SELECT * FROM `users` JOIN \"posts\" ON users.id = posts.user_id",
                &["users", "posts"],
                "arpg_"
            ),
            "SELECT * FROM `arpg_users` JOIN \"arpg_posts\" ON arpg_users.id = arpg_posts.user_id"
        );
    }

    #[test]
    fn test_quoted_identifier_must_match_exactly() {
        assert_eq!(
            rewrite("SELECT * FROM `users`", &["user"], "arpg_"),
            "SELECT * FROM `users`"
        );
        assert_eq!(
            rewrite("SELECT * FROM \"users archive\"", &["users"], "arpg_"),
            "SELECT * FROM \"users archive\""
        );
    }

    #[test]
    fn test_substrings_are_not_replaced() {
        assert_eq!(
            rewrite(
                "SELECT * FROM users JOIN users_post ON users.id = users_post.user_id \
                 JOIN comments_users ON users.id = comments_users.user_id",
                &["users", "users_post", "comments_users"],
                "arpg_"
            ),
            "SELECT * FROM arpg_users JOIN arpg_users_post ON arpg_users.id = arpg_users_post.user_id \
             JOIN arpg_comments_users ON arpg_users.id = arpg_comments_users.user_id"
        );
    }

    #[test]
    fn test_literals_untouched() {
        assert_eq!(
            rewrite(
                r"SELECT * FROM status WHERE name = 'O\'Reilly' AND type = 'status'",
                &["status"],
                "arpg_"
            ),
            r"SELECT * FROM arpg_status WHERE name = 'O\'Reilly' AND type = 'status'"
        );
    }

    #[test]
    fn test_quoted_names_inside_literals_untouched() {
        assert_eq!(
            rewrite("SELECT * FROM users WHERE note = '`users`'", &["users"], "arpg_"),
            "SELECT * FROM arpg_users WHERE note = '`users`'"
        );
    }

    #[test]
    fn test_comments_untouched() {
        assert_eq!(
            rewrite("SELECT * FROM users -- don't touch users\n", &["users"], "arpg_"),
            "SELECT * FROM arpg_users -- don't touch users\n"
        );
    }

    #[test]
    fn test_aliases_untouched() {
        assert_eq!(
            rewrite(
                "SELECT u.id, u.name FROM users AS u WHERE u.active = 1",
                &["users"],
                "arpg_"
            ),
            "SELECT u.id, u.name FROM arpg_users AS u WHERE u.active = 1"
        );
    }

    #[test]
    fn test_schema_qualifier_preserved() {
        assert_eq!(
            rewrite(
                "SELECT * FROM public.users JOIN posts ON users.id = posts.user_id",
                &["users", "posts"],
                "app_"
            ),
            "SELECT * FROM public.app_users JOIN app_posts ON app_users.id = app_posts.user_id"
        );
    }

    #[test]
    fn test_schema_qualified_table_name() {
        assert_eq!(
            rewrite("SELECT * FROM public.users", &["public.users"], "arpg_"),
            "SELECT * FROM arpg_public.users"
        );
    }

    #[test]
    fn test_already_prefixed_name_is_skipped() {
        assert_eq!(
            rewrite("SELECT * FROM arpg_users", &["arpg_users"], "arpg_"),
            "SELECT * FROM arpg_users"
        );
    }

    #[test]
    fn test_rewrite_is_stable_for_prefixed_names() {
        let once = rewrite("SELECT * FROM users", &["users"], "arpg_");
        assert_eq!(rewrite(&once, &["arpg_users"], "arpg_"), once);
    }

    #[test]
    fn test_duplicate_names_follow_sequential_application() {
        // The second pass sees `arpg_users`, which is bounded by `_`, so
        // nothing changes.
        assert_eq!(
            rewrite("SELECT * FROM users", &["users", "users"], "arpg_"),
            "SELECT * FROM arpg_users"
        );
    }

    #[test]
    fn test_unterminated_literal_is_left_alone() {
        assert_eq!(
            rewrite("SELECT * FROM users WHERE a = 'users", &["users"], "arpg_"),
            "SELECT * FROM arpg_users WHERE a = 'users"
        );
    }

    #[test]
    fn test_overlapping_candidate() {
        assert_eq!(rewrite("SELECT a.a.a", &["a.a"], "p_"), "SELECT p_a.a.a");
        assert_eq!(rewrite("SELECT aa, aaa FROM aa", &["aa"], "p_"), "SELECT p_aa, aaa FROM p_aa");
    }

    #[test]
    fn test_unicode_identifiers_are_boundaries() {
        assert_eq!(
            rewrite("SELECT * FROM users, éusers", &["users"], "arpg_"),
            "SELECT * FROM arpg_users, éusers"
        );
    }

    #[test]
    fn test_hash_comments_are_untouched() {
        assert_eq!(
            rewrite("SELECT * FROM users # users only\nWHERE 1 = 1", &["users"], "arpg_"),
            "SELECT * FROM arpg_users # users only\nWHERE 1 = 1"
        );
    }

    #[test]
    fn test_empty_table_name_ignored() {
        assert_eq!(rewrite("SELECT 1", &[""], "arpg_"), "SELECT 1");
    }
}

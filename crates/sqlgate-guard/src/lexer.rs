//! Single-pass SQL segment scanner.
//!
//! Splits a query into runs of plain code, single-quoted string literals,
//! quoted identifiers and comments. This is not a SQL tokenizer: it only
//! knows the delimiters needed to decide which parts of a statement may be
//! inspected or rewritten.
//!
//! All delimiters are ASCII, so scanning works on bytes and every segment
//! boundary falls on a UTF-8 character boundary.

/// What a [`Segment`] contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Keywords, identifiers, operators and whitespace.
    Code,
    /// A `'...'` string literal. A backslash escapes the following character.
    Literal,
    /// A `"..."` or `` `...` `` identifier.
    QuotedIdentifier,
    /// A `-- ...` or `# ...` line comment (without its newline) or a
    /// `/* ... */` block.
    Comment,
}

/// A contiguous slice of the scanned query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

impl<'a> Segment<'a> {
    /// The identifier between the quotes of a terminated quoted identifier,
    /// together with the quote character.
    pub fn quoted_name(&self) -> Option<(char, &'a str)> {
        if self.kind != SegmentKind::QuotedIdentifier || self.text.len() < 2 {
            return None;
        }
        let quote = self.text.chars().next()?;
        let inner = self.text[1..].strip_suffix(quote)?;
        Some((quote, inner))
    }
}

/// Iterator over the segments of a query, in order.
///
/// Concatenating the text of every segment yields the input unchanged.
/// Unterminated literals, quoted identifiers and block comments extend to the
/// end of the input.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    sql: &'a str,
    pos: usize,
}

impl<'a> Segments<'a> {
    pub fn new(sql: &'a str) -> Self {
        Self { sql, pos: 0 }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.sql.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        let (kind, end) = match bytes[start] {
            b'\'' => (SegmentKind::Literal, literal_end(bytes, start + 1)),
            quote @ (b'"' | b'`') => (
                SegmentKind::QuotedIdentifier,
                find_byte(bytes, start + 1, quote).map_or(bytes.len(), |i| i + 1),
            ),
            b'-' if bytes.get(start + 1) == Some(&b'-') => (
                SegmentKind::Comment,
                find_byte(bytes, start + 2, b'\n').unwrap_or(bytes.len()),
            ),
            b'#' => (
                SegmentKind::Comment,
                find_byte(bytes, start + 1, b'\n').unwrap_or(bytes.len()),
            ),
            b'/' if bytes.get(start + 1) == Some(&b'*') => (
                SegmentKind::Comment,
                self.sql[start + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |i| start + 2 + i + 2),
            ),
            _ => (SegmentKind::Code, code_end(bytes, start)),
        };

        self.pos = end;
        Some(Segment {
            kind,
            text: &self.sql[start..end],
        })
    }
}

/// Returns true for characters that may continue an unquoted identifier.
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Iterate over the bare words of the code segments of `sql`, skipping
/// literals, quoted identifiers and comments.
pub fn code_words(sql: &str) -> impl Iterator<Item = &str> {
    Segments::new(sql)
        .filter(|s| s.kind == SegmentKind::Code)
        .flat_map(|s| s.text.split(|c: char| !is_identifier_char(c)))
        .filter(|w| !w.is_empty())
}

fn literal_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn code_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' | b'#' => break,
            b'-' if bytes.get(i + 1) == Some(&b'-') => break,
            b'/' if bytes.get(i + 1) == Some(&b'*') => break,
            _ => i += 1,
        }
    }
    i
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<(SegmentKind, &str)> {
        Segments::new(sql).map(|s| (s.kind, s.text)).collect()
    }

    #[test]
    fn test_plain_code_is_one_segment() {
        assert_eq!(
            kinds("SELECT * FROM users"),
            vec![(SegmentKind::Code, "SELECT * FROM users")]
        );
    }

    #[test]
    fn test_literal_with_escaped_quote() {
        assert_eq!(
            kinds(r"a = 'O\'Reilly' AND b"),
            vec![
                (SegmentKind::Code, "a = "),
                (SegmentKind::Literal, r"'O\'Reilly'"),
                (SegmentKind::Code, " AND b"),
            ]
        );
    }

    #[test]
    fn test_doubled_quote_yields_adjacent_literals() {
        assert_eq!(
            kinds("'it''s'"),
            vec![(SegmentKind::Literal, "'it'"), (SegmentKind::Literal, "'s'")]
        );
    }

    #[test]
    fn test_unterminated_literal_runs_to_end() {
        assert_eq!(
            kinds("x = 'abc FROM users"),
            vec![
                (SegmentKind::Code, "x = "),
                (SegmentKind::Literal, "'abc FROM users"),
            ]
        );
        assert_eq!(kinds(r"'\"), vec![(SegmentKind::Literal, r"'\")]);
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(
            kinds("FROM `users` JOIN \"posts\""),
            vec![
                (SegmentKind::Code, "FROM "),
                (SegmentKind::QuotedIdentifier, "`users`"),
                (SegmentKind::Code, " JOIN "),
                (SegmentKind::QuotedIdentifier, "\"posts\""),
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("a -- it's\nb /* 'x' */ c"),
            vec![
                (SegmentKind::Code, "a "),
                (SegmentKind::Comment, "-- it's"),
                (SegmentKind::Code, "\nb "),
                (SegmentKind::Comment, "/* 'x' */"),
                (SegmentKind::Code, " c"),
            ]
        );
    }

    #[test]
    fn test_hash_line_comment() {
        assert_eq!(
            kinds("SELECT 1 # from users\nFROM t"),
            vec![
                (SegmentKind::Code, "SELECT 1 "),
                (SegmentKind::Comment, "# from users"),
                (SegmentKind::Code, "\nFROM t"),
            ]
        );
        assert_eq!(
            kinds("'#' # x"),
            vec![
                (SegmentKind::Literal, "'#'"),
                (SegmentKind::Code, " "),
                (SegmentKind::Comment, "# x"),
            ]
        );
    }

    #[test]
    fn test_segments_reassemble_input() {
        let sql = "SELECT 'é\\'', \"naïve\" -- ü\n/* ⚠ */ FROM `t` WHERE x = 'unterminated";
        let joined: String = Segments::new(sql).map(|s| s.text).collect();
        assert_eq!(joined, sql);
    }

    #[test]
    fn test_quoted_name() {
        let seg = Segments::new("`users`").next().unwrap();
        assert_eq!(seg.quoted_name(), Some(('`', "users")));

        let seg = Segments::new("\"users").next().unwrap();
        assert_eq!(seg.quoted_name(), None);

        let seg = Segments::new("users").next().unwrap();
        assert_eq!(seg.quoted_name(), None);
    }

    #[test]
    fn test_code_words_skip_literals_and_comments() {
        let words: Vec<_> =
            code_words("cte AS (x) UPDATE t SET a = 'select' -- select\n/* select */ # select").collect();
        assert_eq!(words, vec!["cte", "AS", "x", "UPDATE", "t", "SET", "a"]);
    }
}

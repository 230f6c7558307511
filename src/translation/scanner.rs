#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '#' | '$' | '@')
}

/// Scan a T-SQL variable name starting right after its `@`.
///
/// Returns the byte offset one past the name and the name itself; `None` when no
/// identifier follows.
pub(super) fn scan_identifier(sql: &str, start: usize) -> Option<(usize, &str)> {
    let rest = sql.get(start..)?;
    let len: usize = rest
        .chars()
        .take_while(|c| is_identifier_char(*c))
        .map(char::len_utf8)
        .sum();
    if len == 0 {
        None
    } else {
        Some((start + len, &rest[..len]))
    }
}

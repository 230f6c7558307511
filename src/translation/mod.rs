use std::borrow::Cow;
use std::collections::HashMap;

mod parsers;
mod scanner;

use parsers::{closes_quote, is_block_comment_end, is_block_comment_start, is_line_comment_start};
use scanner::{State, scan_identifier};

use crate::error::{DbHelperError, Result};
use crate::types::SqlParameter;

/// Rewrite named placeholders (`@id`) into the positional `@P1..@Pn` names tiberius declares.
///
/// A placeholder maps to the position of the parameter with the same name, compared
/// case-insensitively. String literals, quoted identifiers, comments and system variables
/// (`@@ROWCOUNT`) are left alone, as are variables that no parameter names.
///
/// ```rust
/// use mssql_helper::prelude::*;
///
/// let params = [SqlParameter::new("@id", 1), SqlParameter::new("@val", "a")];
/// let sql = bind_named_parameters("INSERT INTO t(id,val) VALUES (@id,@val)", &params)?;
/// assert_eq!(sql, "INSERT INTO t(id,val) VALUES (@P1,@P2)");
/// # Ok::<(), DbHelperError>(())
/// ```
///
/// # Errors
/// Returns [`DbHelperError::StatementError`] if two parameters share a name.
pub fn bind_named_parameters<'a>(sql: &'a str, params: &[SqlParameter]) -> Result<Cow<'a, str>> {
    if params.is_empty() {
        return Ok(Cow::Borrowed(sql));
    }

    let mut positions: HashMap<String, usize> = HashMap::with_capacity(params.len());
    for (i, param) in params.iter().enumerate() {
        if positions.insert(param.name().to_lowercase(), i + 1).is_some() {
            return Err(DbHelperError::StatementError(format!(
                "parameter @{} was supplied more than once",
                param.name()
            )));
        }
    }

    let mut out: Option<String> = None;
    let mut state = State::Normal;
    let mut idx = 0;
    // `sql[..copied]` is already in `out`
    let mut copied = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'@' => {
                    if let Some((end, name)) = scan_identifier(sql, idx + 1) {
                        if !name.starts_with('@')
                            && let Some(position) = positions.get(&name.to_lowercase())
                        {
                            let buf = out.get_or_insert_with(|| String::with_capacity(sql.len()));
                            buf.push_str(&sql[copied..idx]);
                            buf.push_str("@P");
                            buf.push_str(&position.to_string());
                            copied = end;
                        }
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                let (closed, at) = closes_quote(bytes, idx, b'\'');
                idx = at;
                if closed {
                    state = State::Normal;
                }
            }
            State::DoubleQuoted => {
                let (closed, at) = closes_quote(bytes, idx, b'"');
                idx = at;
                if closed {
                    state = State::Normal;
                }
            }
            State::Bracketed => {
                let (closed, at) = closes_quote(bytes, idx, b']');
                idx = at;
                if closed {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied..]);
            Ok(Cow::Owned(buf))
        }
        None => Ok(Cow::Borrowed(sql)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<SqlParameter> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| SqlParameter::new(name, i as i64))
            .collect()
    }

    #[test]
    fn rewrites_in_parameter_order() {
        let sql = "UPDATE t SET val = @val WHERE id = @id";
        let res = bind_named_parameters(sql, &params(&["@id", "@val"])).unwrap();
        assert_eq!(res, "UPDATE t SET val = @P2 WHERE id = @P1");
    }

    #[test]
    fn repeated_placeholders_share_a_position() {
        let sql = "SELECT * FROM t WHERE a = @x OR b = @X";
        let res = bind_named_parameters(sql, &params(&["x"])).unwrap();
        assert_eq!(res, "SELECT * FROM t WHERE a = @P1 OR b = @P1");
    }

    #[test]
    fn skips_literals_identifiers_and_comments() {
        let sql = "SELECT '@id', \"@id\", [@id]]x] -- @id\n/* /* @id */ @id */ FROM t WHERE id = @id";
        let res = bind_named_parameters(sql, &params(&["id"])).unwrap();
        assert_eq!(
            res,
            "SELECT '@id', \"@id\", [@id]]x] -- @id\n/* /* @id */ @id */ FROM t WHERE id = @P1"
        );
    }

    #[test]
    fn escaped_quotes_stay_inside_literal() {
        let sql = "SELECT 'it''s @id' WHERE id = @id";
        let res = bind_named_parameters(sql, &params(&["id"])).unwrap();
        assert_eq!(res, "SELECT 'it''s @id' WHERE id = @P1");
    }

    #[test]
    fn leaves_system_and_unknown_variables() {
        let sql = "DECLARE @n INT = @id; SELECT @@ROWCOUNT, @idx";
        let res = bind_named_parameters(sql, &params(&["id"])).unwrap();
        assert_eq!(res, "DECLARE @n INT = @P1; SELECT @@ROWCOUNT, @idx");
    }

    #[test]
    fn unchanged_sql_is_borrowed() {
        let sql = "SELECT 1";
        assert!(matches!(
            bind_named_parameters(sql, &params(&["id"])).unwrap(),
            Cow::Borrowed(_)
        ));
        assert!(matches!(
            bind_named_parameters("SELECT @id", &[]).unwrap(),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        let sql = "SELECT N'héllo' AS ü WHERE nom = @nom";
        let res = bind_named_parameters(sql, &params(&["nom"])).unwrap();
        assert_eq!(res, "SELECT N'héllo' AS ü WHERE nom = @P1");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = bind_named_parameters("SELECT @id", &params(&["@id", "ID"])).unwrap_err();
        assert!(err.is_statement_error());
    }
}

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::TryStreamExt;
use tiberius::{ColumnData, FromSql, QueryItem};

use super::client::MssqlClient;
use super::params::bind_query_params;
use crate::error::{DbHelperError, Result};
use crate::results::ResultSet;
use crate::types::RowValues;

/// Build a result set from the first result of a SQL Server query.
///
/// The whole response is read so that errors raised by later statements in the batch
/// still surface, but only the first result set is kept. A batch that returns no result
/// set at all gives an empty `ResultSet` without columns.
///
/// # Errors
/// Returns [`DbHelperError::StatementError`] if execution, a row fetch, or a value
/// conversion fails.
pub async fn build_result_set(
    client: &mut MssqlClient,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet> {
    let query_builder = bind_query_params(query, params);

    let mut stream = query_builder.query(client).await.map_err(|e| {
        DbHelperError::StatementError(format!("SQL Server query error: {e}"))
    })?;

    let mut result_set: Option<ResultSet> = None;
    let mut first_complete = false;

    while let Some(item) = stream.try_next().await.map_err(|e| {
        DbHelperError::StatementError(format!("SQL Server row fetch error: {e}"))
    })? {
        match item {
            QueryItem::Metadata(meta) => {
                if result_set.is_some() {
                    first_complete = true;
                    continue;
                }
                let column_names: Vec<String> =
                    meta.columns().iter().map(|col| col.name().to_string()).collect();
                let mut first = ResultSet::with_capacity(16);
                first.set_column_names(Arc::new(column_names));
                result_set = Some(first);
            }
            QueryItem::Row(row) => {
                let Some(first) = result_set.as_mut().filter(|_| !first_complete) else {
                    continue;
                };
                let mut row_values = Vec::with_capacity(row.len());
                for (_, data) in row.cells() {
                    row_values.push(column_value(data)?);
                }
                first.add_row_values(row_values);
            }
        }
    }

    Ok(result_set.unwrap_or_default())
}

/// Convert one cell into a `RowValues`, mapping SQL NULL of any type to `Null`.
pub(crate) fn column_value(data: &ColumnData<'static>) -> Result<RowValues> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I16(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I32(v) => v.map(|v| RowValues::Int(i64::from(v))),
        ColumnData::I64(v) => v.map(RowValues::Int),
        ColumnData::F32(v) => v.map(|v| RowValues::Float(f64::from(v))),
        ColumnData::F64(v) => v.map(RowValues::Float),
        ColumnData::Bit(v) => v.map(RowValues::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| RowValues::Text(s.to_string())),
        ColumnData::Guid(v) => v.map(|g| RowValues::Text(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|b| RowValues::Blob(b.to_vec())),
        ColumnData::Numeric(v) => v.as_ref().map(|n| {
            #[allow(clippy::cast_precision_loss)]
            let unscaled = n.value() as f64;
            RowValues::Float(unscaled / 10f64.powi(i32::from(n.scale())))
        }),
        ColumnData::Xml(v) => v.as_ref().map(|x| RowValues::Text((**x).to_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data)
                .map_err(conversion_error)?
                .map(RowValues::Timestamp)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(data)
            .map_err(conversion_error)?
            .map(|d| RowValues::Timestamp(d.and_time(NaiveTime::MIN))),
        ColumnData::Time(_) => NaiveTime::from_sql(data)
            .map_err(conversion_error)?
            .map(|t| RowValues::Text(t.to_string())),
        ColumnData::DateTimeOffset(_) => DateTime::<FixedOffset>::from_sql(data)
            .map_err(conversion_error)?
            .map(|dt| RowValues::Timestamp(dt.naive_utc())),
        #[allow(unreachable_patterns)]
        other => {
            return Err(DbHelperError::StatementError(format!(
                "Unsupported SQL Server column type: {other:?}"
            )));
        }
    };

    Ok(value.unwrap_or(RowValues::Null))
}

fn conversion_error(e: tiberius::error::Error) -> DbHelperError {
    DbHelperError::StatementError(format!("SQL Server value conversion error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn integers_widen_to_i64() {
        assert_eq!(column_value(&ColumnData::U8(Some(7))).unwrap(), RowValues::Int(7));
        assert_eq!(column_value(&ColumnData::I16(Some(-3))).unwrap(), RowValues::Int(-3));
        assert_eq!(column_value(&ColumnData::I32(Some(1))).unwrap(), RowValues::Int(1));
    }

    #[test]
    fn typed_nulls_become_null() {
        assert!(column_value(&ColumnData::I32(None)).unwrap().is_null());
        assert!(column_value(&ColumnData::String(None)).unwrap().is_null());
        assert!(column_value(&ColumnData::DateTime2(None)).unwrap().is_null());
    }

    #[test]
    fn text_and_binary_are_owned() {
        let text = ColumnData::String(Some(Cow::Borrowed("a")));
        assert_eq!(column_value(&text).unwrap(), RowValues::Text("a".into()));

        let blob = ColumnData::Binary(Some(Cow::Owned(vec![1, 2])));
        assert_eq!(column_value(&blob).unwrap(), RowValues::Blob(vec![1, 2]));
    }

    #[test]
    fn numeric_applies_scale() {
        let n = tiberius::numeric::Numeric::new_with_scale(12345, 2);
        assert_eq!(
            column_value(&ColumnData::Numeric(Some(n))).unwrap(),
            RowValues::Float(123.45)
        );
    }
}

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or used as query parameters.
///
/// ```rust
/// use mssql_helper::prelude::*;
///
/// let values = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value, bound as text
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Bit columns come back as `Bool`, but `0`/`1` integers are accepted too.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RowValues::Bool(value) => Some(*value),
            RowValues::Int(1) => Some(true),
            RowValues::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

macro_rules! impl_int_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RowValues {
                fn from(value: $ty) -> Self {
                    RowValues::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for RowValues {
    fn from(value: f32) -> Self {
        RowValues::Float(f64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}

impl From<JsonValue> for RowValues {
    fn from(value: JsonValue) -> Self {
        RowValues::JSON(value)
    }
}

impl From<Vec<u8>> for RowValues {
    fn from(value: Vec<u8>) -> Self {
        RowValues::Blob(value)
    }
}

impl From<&[u8]> for RowValues {
    fn from(value: &[u8]) -> Self {
        RowValues::Blob(value.to_vec())
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// A named bind value for a statement.
///
/// The name may be given with or without the leading `@`; placeholders in the statement
/// always carry it:
/// ```rust
/// use mssql_helper::prelude::*;
///
/// let params = [SqlParameter::new("@id", 1), SqlParameter::new("val", "a")];
/// assert_eq!(params[1].name(), "val");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParameter {
    name: String,
    value: RowValues,
}

impl SqlParameter {
    pub fn new(name: impl AsRef<str>, value: impl Into<RowValues>) -> Self {
        let name = name.as_ref();
        Self {
            name: name.strip_prefix('@').unwrap_or(name).to_string(),
            value: value.into(),
        }
    }

    /// Parameter name without the leading `@`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &RowValues {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_name_drops_at_sign() {
        assert_eq!(SqlParameter::new("@id", 1).name(), "id");
        assert_eq!(SqlParameter::new("id", 1).name(), "id");
    }

    #[test]
    fn option_maps_to_null() {
        let none: Option<i32> = None;
        assert!(RowValues::from(none).is_null());
        assert_eq!(RowValues::from(Some("x")), RowValues::Text("x".into()));
    }

    #[test]
    fn bool_accessor_accepts_bit_like_ints() {
        assert_eq!(RowValues::Int(1).as_bool(), Some(true));
        assert_eq!(RowValues::Int(0).as_bool(), Some(false));
        assert_eq!(RowValues::Int(2).as_bool(), None);
        assert_eq!(RowValues::Bool(false).as_bool(), Some(false));
    }

    #[test]
    fn text_timestamps_are_parsed() {
        let value = RowValues::Text("2024-03-01 12:30:00.250".into());
        let ts = value.as_timestamp().expect("timestamp");
        assert_eq!(ts.format("%H:%M:%S%.3f").to_string(), "12:30:00.250");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_value(vec![
            RowValues::Int(1),
            RowValues::Text("a".into()),
            RowValues::Null,
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!([1, "a", null]));
    }
}

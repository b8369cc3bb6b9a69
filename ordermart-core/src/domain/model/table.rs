// ordermart-core/src/domain/model/table.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical type of a column, independent of the storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Int,
    Float,
    Bool,
    Date,
    Timestamp,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Null, or text that is empty once trimmed.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Render a value as a join / uniqueness key. Integers and text compare
    /// equal when they print the same (`42` and `"42"`).
    pub fn as_key(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            Value::Text(s) => Some(s.trim().to_string()),
            Value::Float(v) if v.fract() == 0.0 => Some(format!("{}", *v as i64)),
            other => Some(other.to_string()),
        }
    }

    /// Coerce this cell into `ty`. Missing cells become `Value::Null`.
    pub fn coerce(&self, ty: ColumnType) -> Result<Value, String> {
        if self.is_missing() {
            return Ok(Value::Null);
        }
        match (ty, self) {
            (ColumnType::Text, Value::Text(s)) => Ok(Value::Text(s.trim().to_string())),
            (ColumnType::Text, other) => Ok(Value::Text(other.to_string())),

            (ColumnType::Int, Value::Int(v)) => Ok(Value::Int(*v)),
            (ColumnType::Int, Value::Float(v)) if v.fract() == 0.0 => Ok(Value::Int(*v as i64)),
            (ColumnType::Int, Value::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| e.to_string()),

            (ColumnType::Float, Value::Float(v)) => Ok(Value::Float(*v)),
            (ColumnType::Float, Value::Int(v)) => Ok(Value::Float(*v as f64)),
            (ColumnType::Float, Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Value::Float(v)),
                Ok(v) => Err(format!("non-finite number {}", v)),
                Err(e) => Err(e.to_string()),
            },

            (ColumnType::Bool, Value::Bool(b)) => Ok(Value::Bool(*b)),
            (ColumnType::Bool, Value::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "t" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "0" => Ok(Value::Bool(false)),
                other => Err(format!("not a boolean: {}", other)),
            },

            (ColumnType::Date, Value::Date(d)) => Ok(Value::Date(*d)),
            (ColumnType::Date, Value::Timestamp(ts)) => Ok(Value::Date(ts.date_naive())),
            (ColumnType::Date, Value::Text(s)) => parse_date(s).map(Value::Date),

            (ColumnType::Timestamp, Value::Timestamp(ts)) => Ok(Value::Timestamp(*ts)),
            (ColumnType::Timestamp, Value::Date(d)) => d
                .and_hms_opt(0, 0, 0)
                .map(|naive| Value::Timestamp(naive.and_utc()))
                .ok_or_else(|| "invalid date".to_string()),
            (ColumnType::Timestamp, Value::Text(s)) => parse_timestamp(s).map(Value::Timestamp),

            (ty, other) => Err(format!("cannot read {:?} as {}", other, ty)),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(""),
            Value::Text(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Accepts RFC 3339, naive datetimes (read as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }
    Err(format!("not a timestamp: {}", raw))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| parse_timestamp(raw).map(|ts| ts.date_naive()))
        .map_err(|_| format!("not a date: {}", raw))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// In-memory table: ordered columns, row-major cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a text-only table, the shape a raw source loader produces.
    pub fn from_text_rows(name: &str, headers: &[&str], rows: &[Vec<Option<&str>>]) -> Self {
        let columns = headers
            .iter()
            .map(|h| ColumnDef::new(*h, ColumnType::Text))
            .collect();
        let rows = rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|cell| match cell {
                        Some(s) => Value::Text((*s).to_string()),
                        None => Value::Null,
                    })
                    .collect()
            })
            .collect();
        Self {
            name: name.to_string(),
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&Value::Null))
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_missing() {
        assert!(Value::Text("   ".into()).is_missing());
        assert!(Value::Null.is_missing());
        assert!(!Value::Text("0".into()).is_missing());
    }

    #[test]
    fn test_key_rendering_is_type_insensitive() {
        assert_eq!(Value::Int(42).as_key(), Some("42".to_string()));
        assert_eq!(Value::Text(" 42 ".into()).as_key(), Some("42".to_string()));
        assert_eq!(Value::Float(42.0).as_key(), Some("42".to_string()));
        assert_eq!(Value::Null.as_key(), None);
    }

    #[test]
    fn test_coerce_timestamp_formats() {
        let expected = parse_timestamp("2024-03-05T10:15:00Z").unwrap();
        for raw in ["2024-03-05 10:15:00", "2024-03-05T10:15:00", "2024-03-05T10:15:00+00:00"] {
            let v = Value::Text(raw.into()).coerce(ColumnType::Timestamp).unwrap();
            assert_eq!(v, Value::Timestamp(expected), "format {}", raw);
        }
    }

    #[test]
    fn test_coerce_rejects_garbage_number() {
        assert!(Value::Text("12abc".into()).coerce(ColumnType::Float).is_err());
        assert!(Value::Text("NaN".into()).coerce(ColumnType::Float).is_err());
        assert_eq!(
            Value::Text("".into()).coerce(ColumnType::Float).unwrap(),
            Value::Null
        );
    }
}

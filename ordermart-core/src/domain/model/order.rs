// ordermart-core/src/domain/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::model::table::{ColumnDef, ColumnType, Table, Value};

// Column names are a contract with downstream reporting (refund rate reads
// `status_clean`, revenue reads `amount`). Do not rename.
pub const ORDER_ID: &str = "order_id";
pub const USER_ID: &str = "user_id";
pub const AMOUNT: &str = "amount";
pub const AMOUNT_RAW: &str = "amount_raw";
pub const STATUS: &str = "status";
pub const STATUS_CLEAN: &str = "status_clean";
pub const AMOUNT_MISSING: &str = "amount_missing";
pub const AMOUNT_WINSORIZED: &str = "amount_winsorized";
pub const TIMESTAMP: &str = "timestamp";

/// Canonical order status. Closed set: anything unrecognized is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusClean {
    Paid,
    Refund,
    Pending,
    Failed,
    Unknown,
}

impl StatusClean {
    pub const ALL: [StatusClean; 5] = [
        StatusClean::Paid,
        StatusClean::Refund,
        StatusClean::Pending,
        StatusClean::Failed,
        StatusClean::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClean::Paid => "paid",
            StatusClean::Refund => "refund",
            StatusClean::Pending => "pending",
            StatusClean::Failed => "failed",
            StatusClean::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusClean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order as it comes out of the quality gate, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOrder {
    pub order_id: String,
    pub user_id: String,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A cleaned order. `status_clean` is always set.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub amount: Option<f64>,
    pub amount_raw: Option<f64>,
    pub status: Option<String>,
    pub status_clean: StatusClean,
    pub amount_missing: bool,
    pub amount_winsorized: bool,
    pub timestamp: DateTime<Utc>,
}

impl RawOrder {
    /// Convert a gated table into typed orders. The gate has already checked
    /// presence and coercibility, so failures here mean the gate was skipped.
    pub fn from_table(table: &Table) -> Result<Vec<RawOrder>, DomainError> {
        let idx = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| DomainError::SchemaError {
                    table: table.name.clone(),
                    missing: vec![name.to_string()],
                    unexpected: vec![],
                })
        };
        let (i_order, i_user, i_amount, i_status, i_ts) = (
            idx(ORDER_ID)?,
            idx(USER_ID)?,
            idx(AMOUNT)?,
            idx(STATUS)?,
            idx(TIMESTAMP)?,
        );

        let invalid = |row: usize, column: &str, reason: String| DomainError::InvalidValue {
            table: table.name.clone(),
            column: column.to_string(),
            row,
            reason,
        };

        let mut orders = Vec::with_capacity(table.len());
        for (row_no, row) in table.rows.iter().enumerate() {
            let cell = |i: usize| row.get(i).unwrap_or(&Value::Null);

            let order_id = cell(i_order)
                .as_key()
                .ok_or_else(|| invalid(row_no, ORDER_ID, "missing key".into()))?;
            let user_id = cell(i_user)
                .as_key()
                .ok_or_else(|| invalid(row_no, USER_ID, "missing key".into()))?;

            let amount = match cell(i_amount)
                .coerce(ColumnType::Float)
                .map_err(|e| invalid(row_no, AMOUNT, e))?
            {
                Value::Float(v) => Some(v),
                _ => None,
            };

            let status = cell(i_status)
                .coerce(ColumnType::Text)
                .map_err(|e| invalid(row_no, STATUS, e))?
                .as_text()
                .map(str::to_string);

            let timestamp = match cell(i_ts)
                .coerce(ColumnType::Timestamp)
                .map_err(|e| invalid(row_no, TIMESTAMP, e))?
            {
                Value::Timestamp(ts) => ts,
                _ => return Err(invalid(row_no, TIMESTAMP, "missing timestamp".into())),
            };

            orders.push(RawOrder {
                order_id,
                user_id,
                amount,
                status,
                timestamp,
            });
        }
        Ok(orders)
    }
}

impl Order {
    pub fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new(ORDER_ID, ColumnType::Text),
            ColumnDef::new(USER_ID, ColumnType::Text),
            ColumnDef::new(AMOUNT, ColumnType::Float),
            ColumnDef::new(AMOUNT_RAW, ColumnType::Float),
            ColumnDef::new(STATUS, ColumnType::Text),
            ColumnDef::new(STATUS_CLEAN, ColumnType::Text),
            ColumnDef::new(AMOUNT_MISSING, ColumnType::Bool),
            ColumnDef::new(AMOUNT_WINSORIZED, ColumnType::Bool),
            ColumnDef::new(TIMESTAMP, ColumnType::Timestamp),
        ]
    }

    /// Cells in the order of [`Order::columns`].
    pub fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.order_id.clone()),
            Value::Text(self.user_id.clone()),
            self.amount.map(Value::Float).unwrap_or(Value::Null),
            self.amount_raw.map(Value::Float).unwrap_or(Value::Null),
            self.status.clone().map(Value::Text).unwrap_or(Value::Null),
            Value::Text(self.status_clean.as_str().to_string()),
            Value::Bool(self.amount_missing),
            Value::Bool(self.amount_winsorized),
            Value::Timestamp(self.timestamp),
        ]
    }

    pub fn to_table(name: &str, orders: &[Order]) -> Table {
        let mut table = Table::new(name, Self::columns());
        for order in orders {
            table.push_row(order.to_values());
        }
        table
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_table_reads_nullable_amount() {
        let table = Table::from_text_rows(
            "orders",
            &["order_id", "user_id", "amount", "status", "timestamp"],
            &[
                vec![Some("o1"), Some("u1"), Some("10.5"), Some("Paid"), Some("2024-01-01 10:00:00")],
                vec![Some("o2"), Some("u2"), Some(""), None, Some("2024-01-02")],
            ],
        );

        let orders = RawOrder::from_table(&table).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].amount, Some(10.5));
        assert_eq!(orders[0].status.as_deref(), Some("Paid"));
        assert_eq!(orders[1].amount, None);
        assert_eq!(orders[1].status, None);
    }

    #[test]
    fn test_status_clean_serializes_lowercase() {
        let json = serde_json::to_string(&StatusClean::Refund).unwrap();
        assert_eq!(json, "\"refund\"");
    }
}

// ordermart-core/src/infrastructure/adapters/arrow.rs

// Conversion Table <-> RecordBatch. Les colonnes typées du domaine
// deviennent des colonnes Arrow natives.

use chrono::Datelike;
use datafusion::arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use datafusion::arrow::error::ArrowError;
use datafusion::arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::domain::model::{ColumnDef, ColumnType, Table, Value};
use crate::infrastructure::error::InfrastructureError;

/// `NaiveDate::num_days_from_ce()` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Text => DataType::Utf8,
        ColumnType::Int => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Bool => DataType::Boolean,
        ColumnType::Date => DataType::Date32,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
    }
}

pub fn schema_of(columns: &[ColumnDef]) -> Schema {
    Schema::new(
        columns
            .iter()
            .map(|c| Field::new(c.name.as_str(), arrow_type(c.data_type), true))
            .collect::<Vec<_>>(),
    )
}

/// One batch holding the whole table. Cells are coerced to their column type.
pub fn table_to_batch(table: &Table) -> Result<RecordBatch, InfrastructureError> {
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());

    for (index, column) in table.columns.iter().enumerate() {
        let ty = column.data_type;
        let array: ArrayRef = match ty {
            ColumnType::Text => Arc::new(StringArray::from(typed(table, index, ty, |v| match v {
                Value::Text(s) => Some(s),
                _ => None,
            })?)),
            ColumnType::Int => Arc::new(Int64Array::from(typed(table, index, ty, |v| match v {
                Value::Int(i) => Some(i),
                _ => None,
            })?)),
            ColumnType::Float => Arc::new(Float64Array::from(typed(table, index, ty, |v| {
                v.as_f64()
            })?)),
            ColumnType::Bool => Arc::new(BooleanArray::from(typed(table, index, ty, |v| match v {
                Value::Bool(b) => Some(b),
                _ => None,
            })?)),
            ColumnType::Date => Arc::new(Date32Array::from(typed(table, index, ty, |v| match v {
                Value::Date(d) => Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
                _ => None,
            })?)),
            ColumnType::Timestamp => Arc::new(
                TimestampMicrosecondArray::from(typed(table, index, ty, |v| match v {
                    Value::Timestamp(ts) => Some(ts.timestamp_micros()),
                    _ => None,
                })?)
                .with_timezone("UTC"),
            ),
        };
        arrays.push(array);
    }

    let schema = Arc::new(schema_of(&table.columns));
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn typed<T>(
    table: &Table,
    index: usize,
    ty: ColumnType,
    pick: impl Fn(Value) -> Option<T>,
) -> Result<Vec<Option<T>>, InfrastructureError> {
    table
        .column_values(index)
        .enumerate()
        .map(|(row, value)| -> Result<Option<T>, InfrastructureError> {
            let coerced = value.coerce(ty).map_err(|reason| {
                ArrowError::CastError(format!(
                    "{}.{} row {}: {}",
                    table.name, table.columns[index].name, row, reason
                ))
            })?;
            Ok(pick(coerced))
        })
        .collect()
}

/// Flatten batches into a text table. Empty cells become `Value::Null`.
pub fn batches_to_text_table(
    name: &str,
    schema: &Schema,
    batches: &[RecordBatch],
) -> Result<Table, InfrastructureError> {
    let columns = schema
        .fields()
        .iter()
        .map(|f| ColumnDef::new(f.name().as_str(), ColumnType::Text))
        .collect();
    let mut table = Table::new(name, columns);

    for batch in batches {
        let mut text_columns = Vec::with_capacity(batch.num_columns());
        for column in batch.columns() {
            text_columns.push(cast(column, &DataType::Utf8)?);
        }
        let strings: Vec<&StringArray> = text_columns
            .iter()
            .map(|c| {
                c.as_any().downcast_ref::<StringArray>().ok_or_else(|| {
                    ArrowError::CastError(format!("column of '{}' did not cast to Utf8", name))
                })
            })
            .collect::<Result<_, _>>()?;

        for row in 0..batch.num_rows() {
            let cells = strings
                .iter()
                .map(|array| {
                    if array.is_null(row) || array.value(row).trim().is_empty() {
                        Value::Null
                    } else {
                        Value::Text(array.value(row).to_string())
                    }
                })
                .collect();
            table.push_row(cells);
        }
    }

    Ok(table)
}

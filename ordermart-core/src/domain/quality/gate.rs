// ordermart-core/src/domain/quality/gate.rs

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::model::{Table, Value};
use crate::domain::quality::contract::TableContract;
use crate::domain::run::{QualityCheck, RunRecorder, TableKind};

/// Duplicates reported in an error message, at most.
const MAX_REPORTED_DUPLICATES: usize = 10;

/// Fail-fast validation of a raw table. Nothing downstream runs on a table
/// that did not pass every check.
pub struct QualityGate;

impl QualityGate {
    /// Run every check in order. Returns the table unchanged on success.
    pub fn check(
        table: Table,
        kind: TableKind,
        contract: &TableContract,
        mut recorder: RunRecorder,
    ) -> Result<(Table, RunRecorder), DomainError> {
        recorder.record_raw_rows(kind, table.len());

        for check in QualityCheck::ALL {
            let outcome = Self::run_check(check, &table, contract);
            recorder.record_check(kind, check, outcome.is_ok());
            match outcome {
                Ok(()) => debug!(table = %table.name, check = check.as_str(), "quality check passed"),
                Err(e) => {
                    warn!(table = %table.name, check = check.as_str(), "quality check failed");
                    return Err(e);
                }
            }
        }

        Ok((table, recorder))
    }

    pub fn run_check(
        check: QualityCheck,
        table: &Table,
        contract: &TableContract,
    ) -> Result<(), DomainError> {
        match check {
            QualityCheck::RequiredColumns => require_columns(table, contract),
            QualityCheck::NonEmpty => assert_non_empty(table),
            QualityCheck::NotNull => assert_not_null(table, contract),
            QualityCheck::ColumnTypes => assert_types(table, contract),
            QualityCheck::Uniqueness => assert_unique(table, contract),
        }
    }
}

fn require_columns(table: &Table, contract: &TableContract) -> Result<(), DomainError> {
    let present: BTreeSet<&str> = table.column_names().into_iter().collect();

    let missing: Vec<String> = contract
        .required
        .iter()
        .filter(|c| !present.contains(c.as_str()))
        .cloned()
        .collect();

    let unexpected: Vec<String> = if contract.strict {
        table
            .column_names()
            .into_iter()
            .filter(|c| !contract.declares(c))
            .map(str::to_string)
            .collect()
    } else {
        vec![]
    };

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(DomainError::SchemaError {
            table: table.name.clone(),
            missing,
            unexpected,
        })
    }
}

fn assert_non_empty(table: &Table) -> Result<(), DomainError> {
    if table.is_empty() {
        return Err(DomainError::EmptyDatasetError {
            table: table.name.clone(),
        });
    }
    Ok(())
}

fn assert_not_null(table: &Table, contract: &TableContract) -> Result<(), DomainError> {
    for column in &contract.not_null {
        let Some(index) = table.column_index(column) else {
            continue;
        };
        let count = table.column_values(index).filter(|v| v.is_missing()).count();
        if count > 0 {
            return Err(DomainError::NullValueError {
                table: table.name.clone(),
                column: column.clone(),
                count,
            });
        }
    }
    Ok(())
}

fn assert_types(table: &Table, contract: &TableContract) -> Result<(), DomainError> {
    for (column, ty) in &contract.types {
        let Some(index) = table.column_index(column) else {
            continue;
        };
        for (row, value) in table.column_values(index).enumerate() {
            if value.coerce(*ty).is_err() {
                return Err(DomainError::TypeError {
                    table: table.name.clone(),
                    column: column.clone(),
                    expected: ty.to_string(),
                    value: value.to_string(),
                    row,
                });
            }
        }
    }
    Ok(())
}

fn assert_unique(table: &Table, contract: &TableContract) -> Result<(), DomainError> {
    for column in &contract.unique {
        let Some(index) = table.column_index(column) else {
            continue;
        };
        let duplicates = duplicate_keys(table.column_values(index));
        if !duplicates.is_empty() {
            return Err(DomainError::UniquenessError {
                table: table.name.clone(),
                column: column.clone(),
                duplicates: duplicates.into_iter().take(MAX_REPORTED_DUPLICATES).collect(),
            });
        }
    }
    Ok(())
}

/// Keys seen more than once, sorted. Missing cells are not keys.
pub fn duplicate_keys<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for key in values.filter_map(Value::as_key) {
        *seen.entry(key).or_insert(0) += 1;
    }
    seen.into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(k, _)| k)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn users(rows: &[Vec<Option<&str>>]) -> Table {
        Table::from_text_rows("users", &["user_id", "country"], rows)
    }

    fn users_contract() -> TableContract {
        TableContract::users(&["country".to_string()], &BTreeMap::new(), false)
    }

    #[test]
    fn test_valid_table_passes_unchanged() {
        let table = users(&[vec![Some("u1"), Some("SA")], vec![Some("u2"), None]]);
        let (out, rec) =
            QualityGate::check(table.clone(), TableKind::Users, &users_contract(), RunRecorder::new())
                .unwrap();
        assert_eq!(out, table);
        assert_eq!(rec.counter(crate::domain::run::Counter::RawRows(TableKind::Users)), 2);
    }

    #[test]
    fn test_missing_required_column() {
        let table = Table::from_text_rows("users", &["user_id"], &[vec![Some("u1")]]);
        let err = QualityGate::check(table, TableKind::Users, &users_contract(), RunRecorder::new())
            .unwrap_err();
        match err {
            DomainError::SchemaError { table, missing, .. } => {
                assert_eq!(table, "users");
                assert_eq!(missing, vec!["country"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_strict_contract_rejects_extra_columns() {
        let mut contract = users_contract();
        contract.strict = true;
        let table = Table::from_text_rows(
            "users",
            &["user_id", "country", "shoe_size"],
            &[vec![Some("u1"), Some("SA"), Some("42")]],
        );
        let err = QualityGate::check(table, TableKind::Users, &contract, RunRecorder::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::SchemaError { unexpected, .. } if unexpected == vec!["shoe_size"]));
    }

    #[test]
    fn test_empty_dataset() {
        let table = users(&[]);
        let err = QualityGate::check(table, TableKind::Users, &users_contract(), RunRecorder::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::EmptyDatasetError { .. }));
        assert_eq!(err.check_name(), "non_empty");
    }

    #[test]
    fn test_duplicate_user_id_is_fatal() {
        let table = users(&[
            vec![Some("u1"), Some("SA")],
            vec![Some("u2"), Some("AE")],
            vec![Some(" u1"), Some("QA")],
        ]);
        let err = QualityGate::check(table, TableKind::Users, &users_contract(), RunRecorder::new())
            .unwrap_err();
        match err {
            DomainError::UniquenessError {
                table,
                column,
                duplicates,
            } => {
                assert_eq!(table, "users");
                assert_eq!(column, "user_id");
                assert_eq!(duplicates, vec!["u1"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_null_key_is_rejected() {
        let table = users(&[vec![Some("u1"), Some("SA")], vec![Some(""), Some("AE")]]);
        let err = QualityGate::check(table, TableKind::Users, &users_contract(), RunRecorder::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::NullValueError { count: 1, .. }));
    }

    #[test]
    fn test_unparseable_timestamp_is_a_type_error() {
        let table = Table::from_text_rows(
            "orders",
            &["order_id", "user_id", "amount", "status", "timestamp"],
            &[vec![Some("o1"), Some("u1"), Some("10"), Some("paid"), Some("yesterday")]],
        );
        let err = QualityGate::check(
            table,
            TableKind::Orders,
            &TableContract::orders(false),
            RunRecorder::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::TypeError { ref column, row: 0, .. } if column == "timestamp"));
    }

    #[test]
    fn test_duplicate_keys_ignores_missing() {
        let values = [Value::Null, Value::Null, Value::Text("a".into())];
        assert!(duplicate_keys(values.iter()).is_empty());
    }
}

// ordermart-core/src/application/validation.rs

use std::path::Path;

use crate::application::pipeline::{ORDERS_TABLE, RunLayout, USERS_TABLE};
use crate::domain::model::{RawOrder, UserTable};
use crate::domain::project::ProjectConfig;
use crate::domain::quality::QualityGate;
use crate::domain::run::{CheckOutcome, RunRecorder, TableKind};
use crate::error::OrdermartError;
use crate::ports::table_io::TableSource;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub orders_rows: usize,
    pub users_rows: usize,
    pub checks: Vec<CheckOutcome>,
}

/// Dry run: load both raw sources and put them through the Quality Gate and
/// record conversion. Nothing is written.
pub async fn validate_inputs<S: TableSource>(
    source: &S,
    project_dir: &Path,
    config: &ProjectConfig,
) -> Result<ValidationReport, OrdermartError> {
    let layout = RunLayout::resolve(project_dir, config);
    let orders = source.load(&layout.orders_source, ORDERS_TABLE).await?;
    let users = source.load(&layout.users_source, USERS_TABLE).await?;

    let (orders_rows, users_rows) = (orders.len(), users.len());
    let users_contract = config.users_contract();

    println!("    🧪 Running quality gate on {} and {}", ORDERS_TABLE, USERS_TABLE);
    let recorder = RunRecorder::new();
    let (orders, recorder) = QualityGate::check(
        orders,
        TableKind::Orders,
        &config.orders_contract(),
        recorder,
    )?;
    let (users, recorder) = QualityGate::check(users, TableKind::Users, &users_contract, recorder)?;

    RawOrder::from_table(&orders)?;
    UserTable::from_table(&users, &users_contract.typed_columns())?;

    for outcome in recorder.checks() {
        println!(
            "      ✅ PASS: {} on {}",
            outcome.check.as_str(),
            outcome.table.as_str()
        );
    }

    Ok(ValidationReport {
        orders_rows,
        users_rows,
        checks: recorder.checks().to_vec(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::model::Table;
    use crate::domain::run::QualityCheck;
    use async_trait::async_trait;

    struct FixedSource {
        orders: Table,
        users: Table,
    }

    #[async_trait]
    impl TableSource for FixedSource {
        async fn load(&self, _location: &Path, name: &str) -> Result<Table, OrdermartError> {
            Ok(if name == ORDERS_TABLE {
                self.orders.clone()
            } else {
                self.users.clone()
            })
        }
    }

    fn source(users: &[Vec<Option<&str>>]) -> FixedSource {
        FixedSource {
            orders: Table::from_text_rows(
                ORDERS_TABLE,
                &["order_id", "user_id", "amount", "status", "timestamp"],
                &[vec![Some("o1"), Some("u1"), Some("10"), Some("paid"), Some("2024-01-01")]],
            ),
            users: Table::from_text_rows(USERS_TABLE, &["user_id"], users),
        }
    }

    fn config() -> ProjectConfig {
        serde_yaml::from_str("name: shop\nversion: '1.0'\n").unwrap()
    }

    #[tokio::test]
    async fn test_every_check_reported_in_order() {
        let report = validate_inputs(&source(&[vec![Some("u1")]]), Path::new("."), &config())
            .await
            .unwrap();
        assert_eq!(report.orders_rows, 1);
        assert_eq!(report.checks.len(), 2 * QualityCheck::ALL.len());
        assert_eq!(report.checks[0].check, QualityCheck::RequiredColumns);
        assert_eq!(report.checks[0].table, TableKind::Orders);
        assert!(report.checks.iter().all(|c| c.passed));
    }

    #[tokio::test]
    async fn test_duplicate_users_fail_validation() {
        let err = validate_inputs(
            &source(&[vec![Some("u1")], vec![Some("u1")]]),
            Path::new("."),
            &config(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            OrdermartError::Domain(DomainError::UniquenessError { .. })
        ));
    }
}

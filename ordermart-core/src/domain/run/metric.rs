// ordermart-core/src/domain/run/metric.rs
//
// Declared keys of the run metadata. Every key listed by `Counter::all()` and
// `Statistic::ALL` is present in every metadata record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::model::StatusClean;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Orders,
    Users,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::Orders, TableKind::Users];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Orders => "orders",
            TableKind::Users => "users",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityCheck {
    RequiredColumns,
    NonEmpty,
    NotNull,
    ColumnTypes,
    Uniqueness,
}

impl QualityCheck {
    /// Execution order inside the gate.
    pub const ALL: [QualityCheck; 5] = [
        QualityCheck::RequiredColumns,
        QualityCheck::NonEmpty,
        QualityCheck::NotNull,
        QualityCheck::ColumnTypes,
        QualityCheck::Uniqueness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityCheck::RequiredColumns => "required_columns",
            QualityCheck::NonEmpty => "non_empty",
            QualityCheck::NotNull => "not_null",
            QualityCheck::ColumnTypes => "column_types",
            QualityCheck::Uniqueness => "uniqueness",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Counter {
    RawRows(TableKind),
    CleanRows(TableKind),
    MissingAmount,
    Winsorized,
    Status(StatusClean),
    JoinTotalOrders,
    JoinMatchedOrders,
    JoinUnmatchedOrders,
    AnalyticsRows,
    CheckPassed(TableKind, QualityCheck),
    CheckFailed(TableKind, QualityCheck),
}

impl Counter {
    pub fn all() -> Vec<Counter> {
        let mut all = Vec::new();
        for table in TableKind::ALL {
            all.push(Counter::RawRows(table));
            all.push(Counter::CleanRows(table));
        }
        all.push(Counter::MissingAmount);
        all.push(Counter::Winsorized);
        all.extend(StatusClean::ALL.into_iter().map(Counter::Status));
        all.push(Counter::JoinTotalOrders);
        all.push(Counter::JoinMatchedOrders);
        all.push(Counter::JoinUnmatchedOrders);
        all.push(Counter::AnalyticsRows);
        for table in TableKind::ALL {
            for check in QualityCheck::ALL {
                all.push(Counter::CheckPassed(table, check));
                all.push(Counter::CheckFailed(table, check));
            }
        }
        all
    }

    pub fn key(&self) -> String {
        match self {
            Counter::RawRows(t) => format!("{}.raw_rows", t),
            Counter::CleanRows(t) => format!("{}.clean_rows", t),
            Counter::MissingAmount => "orders.missing_amount_count".into(),
            Counter::Winsorized => "orders.winsorized_count".into(),
            Counter::Status(StatusClean::Unknown) => "orders.unknown_status_count".into(),
            Counter::Status(s) => format!("orders.status.{}", s),
            Counter::JoinTotalOrders => "join.total_orders".into(),
            Counter::JoinMatchedOrders => "join.matched_orders".into(),
            Counter::JoinUnmatchedOrders => "join.unmatched_orders".into(),
            Counter::AnalyticsRows => "analytics.rows".into(),
            Counter::CheckPassed(t, c) => format!("quality.{}.{}.passed", t, c.as_str()),
            Counter::CheckFailed(t, c) => format!("quality.{}.{}.failed", t, c.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Statistic {
    AmountQ1,
    AmountQ3,
    AmountIqr,
    AmountLowerBound,
    AmountUpperBound,
    Aov,
    MatchRate,
}

impl Statistic {
    pub const ALL: [Statistic; 7] = [
        Statistic::AmountQ1,
        Statistic::AmountQ3,
        Statistic::AmountIqr,
        Statistic::AmountLowerBound,
        Statistic::AmountUpperBound,
        Statistic::Aov,
        Statistic::MatchRate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Statistic::AmountQ1 => "orders.amount_q1",
            Statistic::AmountQ3 => "orders.amount_q3",
            Statistic::AmountIqr => "orders.amount_iqr",
            Statistic::AmountLowerBound => "orders.amount_lower_bound",
            Statistic::AmountUpperBound => "orders.amount_upper_bound",
            Statistic::Aov => "orders.aov",
            Statistic::MatchRate => "join.match_rate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_counter_keys_are_unique() {
        let all = Counter::all();
        let keys: HashSet<String> = all.iter().map(Counter::key).collect();
        assert_eq!(keys.len(), all.len());
        assert!(keys.contains("join.unmatched_orders"));
        assert!(keys.contains("quality.users.uniqueness.failed"));
        assert!(keys.contains("orders.unknown_status_count"));
    }
}

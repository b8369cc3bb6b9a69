// ordermart-core/src/domain/analytics.rs

use chrono::{Datelike, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::join::{JoinedRow, JoinedTable};
use crate::domain::model::{ColumnDef, ColumnType, Order, Table, Value};
use crate::domain::run::RunRecorder;

pub const MATCHED: &str = "matched";
pub const ORDER_DATE: &str = "order_date";
pub const ORDER_YEAR: &str = "order_year";
pub const ORDER_MONTH: &str = "order_month";
pub const ORDER_DOW: &str = "order_dow";
pub const ORDER_HOUR: &str = "order_hour";
pub const ORDER_PERIOD: &str = "order_period";
pub const USER_TENURE_DAYS: &str = "user_tenure_days";

/// Suffix for user attributes whose name collides with an order column.
const USER_SUFFIX: &str = "_user";

/// Granularity of the `order_period` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodGrain {
    Day,
    Week,
    #[default]
    Month,
}

impl PeriodGrain {
    pub fn bucket(&self, date: NaiveDate) -> String {
        match self {
            PeriodGrain::Day => date.format("%Y-%m-%d").to_string(),
            PeriodGrain::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            PeriodGrain::Month => date.format("%Y-%m").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeFeatures {
    pub order_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    /// 0 = Monday
    pub dow: u32,
    pub hour: u32,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsRow {
    pub joined: JoinedRow,
    pub time: TimeFeatures,
    pub user_tenure_days: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsTable {
    pub user_attributes: Vec<ColumnDef>,
    pub with_tenure: bool,
    pub rows: Vec<AnalyticsRow>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsOptions {
    pub period: PeriodGrain,
    /// User attribute holding the signup date, used for `user_tenure_days`.
    pub signup_column: Option<String>,
}

pub struct AnalyticsBuilder {
    options: AnalyticsOptions,
}

impl AnalyticsBuilder {
    pub fn new(options: AnalyticsOptions) -> Self {
        Self { options }
    }

    /// Total: one analytics row per joined row, same order.
    pub fn build(&self, joined: JoinedTable, mut recorder: RunRecorder) -> (AnalyticsTable, RunRecorder) {
        let signup_index = self.options.signup_column.as_deref().and_then(|name| {
            joined
                .user_attributes
                .iter()
                .position(|c| c.name == name)
        });

        let rows: Vec<AnalyticsRow> = joined
            .rows
            .into_iter()
            .map(|row| {
                let time = self.time_features(&row.order);
                let user_tenure_days = signup_index
                    .and_then(|i| row.user.as_ref().and_then(|attrs| attrs.get(i)))
                    .and_then(signup_date)
                    .map(|signup| (time.order_date - signup).num_days());
                AnalyticsRow {
                    joined: row,
                    time,
                    user_tenure_days,
                }
            })
            .collect();

        recorder.record_analytics_rows(rows.len());
        let table = AnalyticsTable {
            user_attributes: joined.user_attributes,
            with_tenure: signup_index.is_some(),
            rows,
        };
        (table, recorder)
    }

    fn time_features(&self, order: &Order) -> TimeFeatures {
        let ts = order.timestamp;
        let order_date = ts.date_naive();
        TimeFeatures {
            order_date,
            year: ts.year(),
            month: ts.month(),
            dow: ts.weekday().num_days_from_monday(),
            hour: ts.hour(),
            period: self.options.period.bucket(order_date),
        }
    }
}

/// `base`, or `base_user`, `base_user_2`... whichever is not taken yet.
fn free_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut candidate = format!("{}{}", base, USER_SUFFIX);
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}{}_{}", base, USER_SUFFIX, n);
        n += 1;
    }
    candidate
}

fn signup_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Timestamp(ts) => Some(ts.date_naive()),
        Value::Text(s) => crate::domain::model::table::parse_date(s).ok(),
        _ => None,
    }
}

impl AnalyticsTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> Vec<ColumnDef> {
        let mut columns = Order::columns();
        columns.push(ColumnDef::new(MATCHED, ColumnType::Bool));

        let mut taken: HashSet<String> = columns
            .iter()
            .map(|c| c.name.clone())
            .chain(Self::feature_columns().into_iter().map(|c| c.name))
            .collect();
        if self.with_tenure {
            taken.insert(USER_TENURE_DAYS.to_string());
        }

        // Les attributs utilisateur ne doivent jamais masquer une colonne existante.
        for attr in &self.user_attributes {
            let name = free_name(&attr.name, &taken);
            taken.insert(name.clone());
            columns.push(ColumnDef::new(name, attr.data_type));
        }

        columns.extend(Self::feature_columns());
        if self.with_tenure {
            columns.push(ColumnDef::new(USER_TENURE_DAYS, ColumnType::Int));
        }
        columns
    }

    fn feature_columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new(ORDER_DATE, ColumnType::Date),
            ColumnDef::new(ORDER_YEAR, ColumnType::Int),
            ColumnDef::new(ORDER_MONTH, ColumnType::Int),
            ColumnDef::new(ORDER_DOW, ColumnType::Int),
            ColumnDef::new(ORDER_HOUR, ColumnType::Int),
            ColumnDef::new(ORDER_PERIOD, ColumnType::Text),
        ]
    }

    pub fn to_table(&self, name: &str) -> Table {
        let mut table = Table::new(name, self.columns());
        let width = self.user_attributes.len();
        for row in &self.rows {
            let mut cells = row.joined.order.to_values();
            cells.push(Value::Bool(row.joined.matched));
            match &row.joined.user {
                Some(attrs) => cells.extend(attrs.iter().cloned()),
                None => cells.extend(std::iter::repeat_n(Value::Null, width)),
            }
            cells.push(Value::Date(row.time.order_date));
            cells.push(Value::Int(i64::from(row.time.year)));
            cells.push(Value::Int(i64::from(row.time.month)));
            cells.push(Value::Int(i64::from(row.time.dow)));
            cells.push(Value::Int(i64::from(row.time.hour)));
            cells.push(Value::Text(row.time.period.clone()));
            if self.with_tenure {
                cells.push(row.user_tenure_days.map(Value::Int).unwrap_or(Value::Null));
            }
            table.push_row(cells);
        }
        table
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::StatusClean;
    use chrono::{TimeZone, Utc};

    fn joined_row(user: Option<Vec<Value>>) -> JoinedRow {
        JoinedRow {
            order: Order {
                order_id: "o1".into(),
                user_id: "u1".into(),
                amount: Some(12.0),
                amount_raw: Some(12.0),
                status: Some("paid".into()),
                status_clean: StatusClean::Paid,
                amount_missing: false,
                amount_winsorized: false,
                // Wednesday
                timestamp: Utc.with_ymd_and_hms(2024, 3, 6, 17, 45, 0).unwrap(),
            },
            matched: user.is_some(),
            user,
        }
    }

    fn joined(rows: Vec<JoinedRow>) -> JoinedTable {
        JoinedTable {
            user_attributes: vec![
                ColumnDef::new("country", ColumnType::Text),
                ColumnDef::new("signup_date", ColumnType::Date),
                ColumnDef::new("status", ColumnType::Text),
            ],
            rows,
        }
    }

    #[test]
    fn test_time_features_and_tenure() {
        let signup = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let input = joined(vec![
            joined_row(Some(vec![
                Value::Text("sa".into()),
                Value::Date(signup),
                Value::Text("active".into()),
            ])),
            joined_row(None),
        ]);
        let builder = AnalyticsBuilder::new(AnalyticsOptions {
            period: PeriodGrain::Month,
            signup_column: Some("signup_date".into()),
        });
        let (table, rec) = builder.build(input, RunRecorder::new());

        assert_eq!(table.len(), 2);
        let first = &table.rows[0];
        assert_eq!(first.time.period, "2024-03");
        assert_eq!(first.time.dow, 2);
        assert_eq!(first.time.hour, 17);
        assert_eq!(first.user_tenure_days, Some(5));
        assert_eq!(table.rows[1].user_tenure_days, None);
        assert_eq!(rec.counter(crate::domain::run::Counter::AnalyticsRows), 2);
    }

    #[test]
    fn test_unmatched_rows_render_null_user_columns() {
        let input = joined(vec![joined_row(None)]);
        let (analytics, _) = AnalyticsBuilder::new(AnalyticsOptions::default()).build(input, RunRecorder::new());
        let table = analytics.to_table("analytics");

        let names = table.column_names();
        assert!(names.contains(&"status_user"));
        assert!(!names.contains(&USER_TENURE_DAYS));

        let country = table.column_index("country").unwrap();
        let matched = table.column_index(MATCHED).unwrap();
        assert_eq!(table.rows[0][country], Value::Null);
        assert_eq!(table.rows[0][matched], Value::Bool(false));
        assert_eq!(table.rows[0].len(), table.columns.len());
    }

    #[test]
    fn test_user_columns_never_shadow_existing_names() {
        let input = JoinedTable {
            user_attributes: vec![
                ColumnDef::new("status_user", ColumnType::Text),
                ColumnDef::new("status", ColumnType::Text),
                ColumnDef::new("country", ColumnType::Text),
                ColumnDef::new("country_user", ColumnType::Text),
                ColumnDef::new("signup_date", ColumnType::Date),
                ColumnDef::new(USER_TENURE_DAYS, ColumnType::Int),
            ],
            rows: vec![joined_row(None)],
        };
        let (analytics, _) = AnalyticsBuilder::new(AnalyticsOptions::default()).build(input, RunRecorder::new());
        assert!(analytics.with_tenure);

        let table = analytics.to_table("analytics");
        let names = table.column_names();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());

        assert!(names.contains(&"status_user_2"));
        assert!(names.contains(&"country"));
        assert!(names.contains(&"country_user"));
        assert!(names.contains(&"user_tenure_days_user"));
        assert_eq!(names.last(), Some(&USER_TENURE_DAYS));
        assert_eq!(table.rows[0].len(), table.columns.len());
    }

    #[test]
    fn test_week_bucket_uses_iso_year() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(PeriodGrain::Week.bucket(date), "2020-W53");
        assert_eq!(PeriodGrain::Day.bucket(date), "2021-01-01");
    }
}

// ordermart-core/src/domain/join.rs

use std::collections::HashMap;
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::model::{ColumnDef, Order, UserTable, Value, user};
use crate::domain::run::RunRecorder;

/// One order with at most one user's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub order: Order,
    /// Aligned with [`JoinedTable::user_attributes`]. `None` when unmatched.
    pub user: Option<Vec<Value>>,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    pub user_attributes: Vec<ColumnDef>,
    pub rows: Vec<JoinedRow>,
}

impl JoinedTable {
    pub fn unmatched(&self) -> usize {
        self.rows.iter().filter(|r| !r.matched).count()
    }
}

/// Left join orders → users on `user_id`, strictly many-to-one.
pub struct SafeJoiner;

impl SafeJoiner {
    pub fn join(
        orders: Vec<Order>,
        users: &UserTable,
        mut recorder: RunRecorder,
    ) -> Result<(JoinedTable, RunRecorder), DomainError> {
        // Re-checked here even though the gate enforced it on load: a
        // duplicate on the right side would fan orders out.
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(users.len());
        for (position, u) in users.users.iter().enumerate() {
            if index.insert(u.user_id.as_str(), position).is_some() {
                return Err(DomainError::JoinCardinalityError {
                    key: user::USER_ID.to_string(),
                    detail: format!(
                        "user_id '{}' appears more than once on the users side (many_to_one expected)",
                        u.user_id
                    ),
                });
            }
        }

        let before = orders.len();
        let rows: Vec<JoinedRow> = orders
            .into_iter()
            .map(|order| {
                let user = index
                    .get(order.user_id.as_str())
                    .map(|&i| users.users[i].attributes.clone());
                JoinedRow {
                    matched: user.is_some(),
                    user,
                    order,
                }
            })
            .collect();

        if rows.len() != before {
            return Err(DomainError::JoinCardinalityError {
                key: user::USER_ID.to_string(),
                detail: format!("join explosion detected: {} -> {} rows", before, rows.len()),
            });
        }

        let joined = JoinedTable {
            user_attributes: users.attributes.clone(),
            rows,
        };
        let unmatched = joined.unmatched();
        info!(
            orders = before,
            unmatched, "orders joined to users"
        );
        recorder.record_join(before - unmatched, unmatched);

        Ok((joined, recorder))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::{ColumnType, StatusClean, User};
    use chrono::{TimeZone, Utc};

    fn order(order_id: &str, user_id: &str) -> Order {
        Order {
            order_id: order_id.into(),
            user_id: user_id.into(),
            amount: Some(10.0),
            amount_raw: Some(10.0),
            status: Some("paid".into()),
            status_clean: StatusClean::Paid,
            amount_missing: false,
            amount_winsorized: false,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn users(ids: &[&str]) -> UserTable {
        UserTable {
            attributes: vec![ColumnDef::new("country", ColumnType::Text)],
            users: ids
                .iter()
                .map(|id| User {
                    user_id: id.to_string(),
                    attributes: vec![Value::Text(format!("country-of-{id}"))],
                })
                .collect(),
        }
    }

    #[test]
    fn test_unmatched_order_is_kept() {
        let (joined, rec) =
            SafeJoiner::join(vec![order("o1", "u1")], &users(&[]), RunRecorder::new()).unwrap();

        assert_eq!(joined.rows.len(), 1);
        assert!(!joined.rows[0].matched);
        assert!(joined.rows[0].user.is_none());

        let meta = rec.finish(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(meta.counter("join.unmatched_orders"), Some(1));
        assert_eq!(meta.statistic("join.match_rate"), Some(0.0));
    }

    #[test]
    fn test_many_orders_to_one_user() {
        let orders = vec![order("o1", "u1"), order("o2", "u1"), order("o3", "u2"), order("o4", "u9")];
        let (joined, _) = SafeJoiner::join(orders, &users(&["u1", "u2"]), RunRecorder::new()).unwrap();

        assert_eq!(joined.rows.len(), 4);
        assert_eq!(joined.unmatched(), 1);
        for row in &joined.rows {
            match &row.user {
                Some(attrs) => {
                    assert!(row.matched);
                    assert_eq!(attrs[0], Value::Text(format!("country-of-{}", row.order.user_id)));
                }
                None => assert!(!row.matched),
            }
        }
    }

    #[test]
    fn test_duplicate_users_fail_instead_of_fanning_out() {
        let err = SafeJoiner::join(
            vec![order("o1", "u1")],
            &users(&["u1", "u2", "u1"]),
            RunRecorder::new(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::JoinCardinalityError { .. }));
        assert!(err.to_string().contains("u1"));
    }
}

// ordermart-core/src/domain/cleaning/cleaner.rs

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::domain::cleaning::status::{StatusMapper, normalize_text};
use crate::domain::cleaning::winsor::{QuantileMethod, WinsorBounds};
use crate::domain::model::{Order, RawOrder, StatusClean, UserTable, Value};
use crate::domain::run::{RunRecorder, TableKind};

pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct CleaningOptions {
    pub iqr_multiplier: f64,
    pub quantile_method: QuantileMethod,
    pub status_mapper: StatusMapper,
    /// User attribute columns that go through `normalize_text`.
    pub normalize_user_columns: Vec<String>,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            quantile_method: QuantileMethod::default(),
            status_mapper: StatusMapper::default(),
            normalize_user_columns: vec!["country".to_string()],
        }
    }
}

/// Row-preserving cleaning: every input row comes out, flagged rather than dropped.
pub struct Cleaner {
    options: CleaningOptions,
}

impl Cleaner {
    pub fn new(options: CleaningOptions) -> Self {
        Self { options }
    }

    pub fn clean_orders(
        &self,
        raw: Vec<RawOrder>,
        mut recorder: RunRecorder,
    ) -> (Vec<Order>, RunRecorder) {
        let orders: Vec<Order> = raw
            .into_iter()
            .map(|r| {
                let status_clean = self.options.status_mapper.map(r.status.as_deref());
                Order {
                    amount_missing: r.amount.is_none(),
                    amount_winsorized: false,
                    amount_raw: r.amount,
                    amount: r.amount,
                    status_clean,
                    order_id: r.order_id,
                    user_id: r.user_id,
                    status: r.status,
                    timestamp: r.timestamp,
                }
            })
            .collect();

        // Bounds are fitted once, over the full population, missing amounts excluded.
        let population: Vec<f64> = orders.iter().filter_map(|o| o.amount).collect();
        let bounds = WinsorBounds::fit(
            &population,
            self.options.iqr_multiplier,
            self.options.quantile_method,
        );

        let (orders, winsorized) = match &bounds {
            Some(b) => Self::winsorize(orders, b),
            None => (orders, 0),
        };

        let missing = orders.iter().filter(|o| o.amount_missing).count();
        let mut by_status: BTreeMap<StatusClean, usize> = BTreeMap::new();
        for order in &orders {
            *by_status.entry(order.status_clean).or_insert(0) += 1;
        }

        if let Some(b) = &bounds {
            info!(
                lower = b.lower,
                upper = b.upper,
                clipped = winsorized,
                "amount fences fitted"
            );
        }
        debug!(?by_status, missing, "orders cleaned");

        recorder.record_clean_rows(TableKind::Orders, orders.len());
        recorder.record_missing_amounts(missing);
        recorder.record_winsorized(winsorized);
        for (status, count) in by_status {
            recorder.record_status(status, count);
        }
        recorder.record_winsor_bounds(bounds);
        recorder.record_aov(average_order_value(&orders));

        (orders, recorder)
    }

    /// Clip amounts into `bounds`. Missing amounts are left alone.
    /// Returns the orders and the number of values that moved.
    pub fn winsorize(orders: Vec<Order>, bounds: &WinsorBounds) -> (Vec<Order>, usize) {
        let mut moved = 0;
        let orders = orders
            .into_iter()
            .map(|mut order| {
                if let Some(amount) = order.amount {
                    let (clipped, was_clipped) = bounds.clip(amount);
                    order.amount = Some(clipped);
                    order.amount_winsorized = was_clipped;
                    if was_clipped {
                        moved += 1;
                    }
                }
                order
            })
            .collect();
        (orders, moved)
    }

    pub fn clean_users(&self, mut users: UserTable, mut recorder: RunRecorder) -> (UserTable, RunRecorder) {
        let targets: Vec<usize> = self
            .options
            .normalize_user_columns
            .iter()
            .filter_map(|c| users.attribute_index(c))
            .collect();

        for user in &mut users.users {
            for &i in &targets {
                if let Some(Value::Text(s)) = user.attributes.get_mut(i) {
                    *s = normalize_text(s);
                }
            }
        }

        recorder.record_clean_rows(TableKind::Users, users.len());
        (users, recorder)
    }
}

/// Mean amount over paid orders with a known amount.
pub fn average_order_value(orders: &[Order]) -> Option<f64> {
    let paid: Vec<f64> = orders
        .iter()
        .filter(|o| o.status_clean == StatusClean::Paid)
        .filter_map(|o| o.amount)
        .collect();
    if paid.is_empty() {
        return None;
    }
    Some(paid.iter().sum::<f64>() / paid.len() as f64)
}

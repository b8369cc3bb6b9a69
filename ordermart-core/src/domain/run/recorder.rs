// ordermart-core/src/domain/run/recorder.rs

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::domain::cleaning::WinsorBounds;
use crate::domain::model::StatusClean;
use crate::domain::run::metadata::{CheckOutcome, RunMetadata};
use crate::domain::run::metric::{Counter, QualityCheck, Statistic, TableKind};

/// Write-only accumulator for one run. Stages take it by value and hand it
/// back; `finish` consumes it, so a run yields at most one metadata record.
///
/// The recorder stores whatever it is given. Business rules live in the
/// stages that push into it.
#[derive(Debug, Clone, Default)]
pub struct RunRecorder {
    counters: BTreeMap<Counter, u64>,
    statistics: BTreeMap<Statistic, f64>,
    checks: Vec<CheckOutcome>,
    winsorization: Option<WinsorBounds>,
    inputs: BTreeMap<String, String>,
    outputs: BTreeMap<String, String>,
    config: BTreeMap<String, String>,
}

impl RunRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, counter: Counter, n: u64) {
        *self.counters.entry(counter).or_insert(0) += n;
    }

    fn set(&mut self, statistic: Statistic, value: Option<f64>) {
        match value {
            Some(v) => {
                self.statistics.insert(statistic, v);
            }
            None => {
                self.statistics.remove(&statistic);
            }
        }
    }

    // --- QUALITY GATE ---

    pub fn record_check(&mut self, table: TableKind, check: QualityCheck, passed: bool) {
        let counter = if passed {
            Counter::CheckPassed(table, check)
        } else {
            Counter::CheckFailed(table, check)
        };
        self.add(counter, 1);
        self.checks.push(CheckOutcome {
            table,
            check,
            passed,
        });
    }

    pub fn record_raw_rows(&mut self, table: TableKind, rows: usize) {
        self.add(Counter::RawRows(table), rows as u64);
    }

    // --- CLEANER ---

    pub fn record_clean_rows(&mut self, table: TableKind, rows: usize) {
        self.add(Counter::CleanRows(table), rows as u64);
    }

    pub fn record_missing_amounts(&mut self, count: usize) {
        self.add(Counter::MissingAmount, count as u64);
    }

    pub fn record_winsorized(&mut self, count: usize) {
        self.add(Counter::Winsorized, count as u64);
    }

    pub fn record_status(&mut self, status: StatusClean, count: usize) {
        self.add(Counter::Status(status), count as u64);
    }

    pub fn record_winsor_bounds(&mut self, bounds: Option<WinsorBounds>) {
        self.set(Statistic::AmountQ1, bounds.map(|b| b.q1));
        self.set(Statistic::AmountQ3, bounds.map(|b| b.q3));
        self.set(Statistic::AmountIqr, bounds.map(|b| b.iqr));
        self.set(Statistic::AmountLowerBound, bounds.map(|b| b.lower));
        self.set(Statistic::AmountUpperBound, bounds.map(|b| b.upper));
        self.winsorization = bounds;
    }

    pub fn record_aov(&mut self, aov: Option<f64>) {
        self.set(Statistic::Aov, aov);
    }

    // --- SAFE JOINER ---

    pub fn record_join(&mut self, matched: usize, unmatched: usize) {
        let total = matched + unmatched;
        self.add(Counter::JoinTotalOrders, total as u64);
        self.add(Counter::JoinMatchedOrders, matched as u64);
        self.add(Counter::JoinUnmatchedOrders, unmatched as u64);
        let rate = (total > 0).then(|| matched as f64 / total as f64);
        self.set(Statistic::MatchRate, rate);
    }

    // --- ANALYTICS ---

    pub fn record_analytics_rows(&mut self, rows: usize) {
        self.add(Counter::AnalyticsRows, rows as u64);
    }

    // --- ARTIFACTS ---

    pub fn record_input(&mut self, name: &str, location: &str) {
        self.inputs.insert(name.to_string(), location.to_string());
    }

    pub fn record_output(&mut self, name: &str, location: &str) {
        self.outputs.insert(name.to_string(), location.to_string());
    }

    pub fn record_config(&mut self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Check outcomes so far, in execution order.
    pub fn checks(&self) -> &[CheckOutcome] {
        &self.checks
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    /// Freeze the run. Declared counters default to 0, declared statistics to null.
    pub fn finish(self, run_at: DateTime<Utc>) -> RunMetadata {
        let counters = Counter::all()
            .into_iter()
            .map(|c| (c.key(), self.counter(c)))
            .collect();
        let statistics = Statistic::ALL
            .into_iter()
            .map(|s| (s.key().to_string(), self.statistics.get(&s).copied()))
            .collect();

        RunMetadata {
            run_timestamp: run_at,
            counters,
            statistics,
            winsorization: self.winsorization,
            quality_checks: self.checks,
            inputs: self.inputs,
            outputs: self.outputs,
            config: self.config,
        }
    }
}

// ordermart-core/src/domain/run/metadata.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::cleaning::WinsorBounds;
use crate::domain::run::metric::{QualityCheck, TableKind};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub table: TableKind,
    pub check: QualityCheck,
    pub passed: bool,
}

/// Immutable snapshot of one run. Keys are sorted so two runs over the same
/// input serialize identically apart from `run_timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_timestamp: DateTime<Utc>,
    pub counters: BTreeMap<String, u64>,
    pub statistics: BTreeMap<String, Option<f64>>,
    pub winsorization: Option<WinsorBounds>,
    pub quality_checks: Vec<CheckOutcome>,
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
    /// Where the run was configured from (`root` = project directory).
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl RunMetadata {
    pub fn counter(&self, key: &str) -> Option<u64> {
        self.counters.get(key).copied()
    }

    pub fn statistic(&self, key: &str) -> Option<f64> {
        self.statistics.get(key).copied().flatten()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

use crate::domain::analytics::{AnalyticsOptions, PeriodGrain};
use crate::domain::cleaning::{
    CleaningOptions, DEFAULT_IQR_MULTIPLIER, QuantileMethod, StatusMapper,
};
use crate::domain::model::{ColumnType, StatusClean};
use crate::domain::quality::TableContract;

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,
    pub version: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    #[validate(length(min = 1))]
    pub target_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    #[validate(nested)]
    #[serde(default)]
    pub sources: SourcesConfig,

    #[validate(nested)]
    #[serde(default)]
    pub outputs: OutputsConfig,

    #[serde(default)]
    pub quality: QualityConfig,

    #[validate(nested)]
    #[serde(default)]
    pub cleaning: CleaningConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Raw inputs, relative to the project directory.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct SourcesConfig {
    #[validate(length(min = 1))]
    pub orders: String,
    #[validate(length(min = 1))]
    pub users: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            orders: "data/raw/orders.csv".to_string(),
            users: "data/raw/users.csv".to_string(),
        }
    }
}

/// Artifact file names, inside `target-path`.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct OutputsConfig {
    #[validate(length(min = 1))]
    pub orders: String,
    #[validate(length(min = 1))]
    pub users: String,
    #[validate(length(min = 1))]
    pub analytics: String,
    #[serde(rename = "run-meta")]
    #[validate(length(min = 1))]
    pub run_meta: String,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            orders: "orders_clean.parquet".to_string(),
            users: "users.parquet".to_string(),
            analytics: "analytics_table.parquet".to_string(),
            run_meta: "_run_meta.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct QualityConfig {
    /// Reject columns the contracts do not declare.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub users: UsersQualityConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct UsersQualityConfig {
    /// Attribute columns that must exist besides `user_id`.
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub types: BTreeMap<String, ColumnType>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct CleaningConfig {
    #[serde(rename = "iqr-multiplier", default = "default_iqr_multiplier")]
    #[validate(custom(function = "validate_multiplier"))]
    pub iqr_multiplier: f64,

    #[serde(rename = "quantile-method", default)]
    pub quantile_method: QuantileMethod,

    /// Extra raw → canonical status mappings, on top of the built-in ones.
    #[serde(rename = "status-aliases", default)]
    pub status_aliases: BTreeMap<String, StatusClean>,

    #[serde(rename = "normalize-user-columns", default = "default_normalize_columns")]
    pub normalize_user_columns: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: default_iqr_multiplier(),
            quantile_method: QuantileMethod::default(),
            status_aliases: BTreeMap::new(),
            normalize_user_columns: default_normalize_columns(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub period: PeriodGrain,
    #[serde(rename = "signup-column", default = "default_signup_column")]
    pub signup_column: Option<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            period: PeriodGrain::default(),
            signup_column: default_signup_column(),
        }
    }
}

impl ProjectConfig {
    pub fn orders_contract(&self) -> TableContract {
        TableContract::orders(self.quality.strict)
    }

    pub fn users_contract(&self) -> TableContract {
        TableContract::users(
            &self.quality.users.required,
            &self.quality.users.types,
            self.quality.strict,
        )
    }

    pub fn cleaning_options(&self) -> CleaningOptions {
        CleaningOptions {
            iqr_multiplier: self.cleaning.iqr_multiplier,
            quantile_method: self.cleaning.quantile_method,
            status_mapper: StatusMapper::with_aliases(&self.cleaning.status_aliases),
            normalize_user_columns: self.cleaning.normalize_user_columns.clone(),
        }
    }

    pub fn analytics_options(&self) -> AnalyticsOptions {
        AnalyticsOptions {
            period: self.analytics.period,
            signup_column: self.analytics.signup_column.clone(),
        }
    }
}

fn validate_multiplier(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("iqr_multiplier_must_be_positive"))
    }
}

fn default_clean_targets() -> Vec<String> {
    vec![default_target_path()]
}
fn default_target_path() -> String {
    "data/processed".to_string()
}
fn default_iqr_multiplier() -> f64 {
    DEFAULT_IQR_MULTIPLIER
}
fn default_normalize_columns() -> Vec<String> {
    vec!["country".to_string()]
}
fn default_signup_column() -> Option<String> {
    Some("signup_date".to_string())
}

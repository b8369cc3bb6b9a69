// ordermart-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{
    AnalyticsConfig, CleaningConfig, OutputsConfig, ProjectConfig, QualityConfig, SourcesConfig,
    UsersQualityConfig,
};

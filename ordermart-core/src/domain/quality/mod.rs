// ordermart-core/src/domain/quality/mod.rs

pub mod contract;
pub mod gate;

pub use contract::TableContract;
pub use gate::QualityGate;

// ordermart-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)] // On autorise le manque de doc pour le moment

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Contrats de lecture / écriture des tables (TableSource, TableSink)
pub mod ports;

// 2. Domain (Cœur du métier)
// Quality Gate, Cleaner, Safe Joiner, Analytics Builder, Run Recorder.
// Ne dépend de RIEN d'autre (ni infra, ni app).
pub mod domain;

// 3. Infrastructure (Adapters)
// CSV (DataFusion), Parquet, config YAML, écriture atomique.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration (Pipeline, Validation, Clean)
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use ordermart_core::OrdermartError;
pub use error::OrdermartError;

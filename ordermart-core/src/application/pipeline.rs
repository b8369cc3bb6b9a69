// ordermart-core/src/application/pipeline.rs

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, instrument};

use crate::error::OrdermartError;
use crate::ports::table_io::{TableSink, TableSource};

// Domain
use crate::domain::analytics::AnalyticsBuilder;
use crate::domain::cleaning::Cleaner;
use crate::domain::error::DomainError;
use crate::domain::join::SafeJoiner;
use crate::domain::model::{Order, RawOrder, Table, UserTable};
use crate::domain::project::ProjectConfig;
use crate::domain::quality::QualityGate;
use crate::domain::run::{RunMetadata, RunRecorder, TableKind};

// Infrastructure
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

pub const ORDERS_TABLE: &str = "orders";
pub const USERS_TABLE: &str = "users";
pub const ORDERS_CLEAN_TABLE: &str = "orders_clean";
pub const USERS_CLEAN_TABLE: &str = "users_clean";
pub const ANALYTICS_TABLE: &str = "analytics";
pub const RUN_META: &str = "run_meta";
pub const CONFIG_ROOT: &str = "root";

/// Everything a run produces, still in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub orders: Table,
    pub users: Table,
    pub analytics: Table,
    pub metadata: RunMetadata,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub metadata: RunMetadata,
    pub artifacts: Vec<PathBuf>,
    pub duration: Duration,
}

/// Resolved locations of one run's inputs and artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLayout {
    pub orders_source: PathBuf,
    pub users_source: PathBuf,
    pub orders_output: PathBuf,
    pub users_output: PathBuf,
    pub analytics_output: PathBuf,
    pub run_meta_output: PathBuf,
}

impl RunLayout {
    pub fn resolve(project_dir: &Path, config: &ProjectConfig) -> Self {
        // join() garde les chemins absolus tels quels
        let target = project_dir.join(&config.target_path);
        Self {
            orders_source: project_dir.join(&config.sources.orders),
            users_source: project_dir.join(&config.sources.users),
            orders_output: target.join(&config.outputs.orders),
            users_output: target.join(&config.outputs.users),
            analytics_output: target.join(&config.outputs.analytics),
            run_meta_output: target.join(&config.outputs.run_meta),
        }
    }
}

/// Pure in-memory run: gate, clean, join, enrich, then freeze the recorder.
/// Any fatal check aborts before a single artifact exists.
pub fn transform(
    orders_raw: Table,
    users_raw: Table,
    config: &ProjectConfig,
    recorder: RunRecorder,
    run_at: DateTime<Utc>,
) -> Result<PipelineOutput, DomainError> {
    // 1. QUALITY GATE (fail-fast, both tables before any cleaning)
    let orders_contract = config.orders_contract();
    let users_contract = config.users_contract();
    let (orders_raw, recorder) =
        QualityGate::check(orders_raw, TableKind::Orders, &orders_contract, recorder)?;
    let (users_raw, recorder) =
        QualityGate::check(users_raw, TableKind::Users, &users_contract, recorder)?;

    let raw_orders = RawOrder::from_table(&orders_raw)?;
    let raw_users = UserTable::from_table(&users_raw, &users_contract.typed_columns())?;

    // 2. CLEANER
    let cleaner = Cleaner::new(config.cleaning_options());
    let (orders, recorder) = cleaner.clean_orders(raw_orders, recorder);
    let (users, recorder) = cleaner.clean_users(raw_users, recorder);
    info!(orders = orders.len(), users = users.len(), "tables cleaned");

    let orders_table = Order::to_table(ORDERS_CLEAN_TABLE, &orders);
    let users_table = users.to_table(USERS_CLEAN_TABLE);

    // 3. SAFE JOINER
    let (joined, recorder) = SafeJoiner::join(orders, &users, recorder)?;

    // 4. ANALYTICS
    let (analytics, recorder) =
        AnalyticsBuilder::new(config.analytics_options()).build(joined, recorder);

    Ok(PipelineOutput {
        orders: orders_table,
        users: users_table,
        analytics: analytics.to_table(ANALYTICS_TABLE),
        metadata: recorder.finish(run_at),
    })
}

#[instrument(skip_all, fields(project = %config.name))]
pub async fn run_pipeline<S, K>(
    source: &S,
    sink: &K,
    project_dir: &Path,
    config: &ProjectConfig,
    run_at: DateTime<Utc>,
) -> Result<RunSummary, OrdermartError>
where
    S: TableSource,
    K: TableSink,
{
    println!("🚀 Starting ordermart pipeline...");
    let start_time = Instant::now();
    let layout = RunLayout::resolve(project_dir, config);

    // 1. INGESTION (Infra)
    println!("📥 Loading raw sources...");
    let orders_raw = source.load(&layout.orders_source, ORDERS_TABLE).await?;
    let users_raw = source.load(&layout.users_source, USERS_TABLE).await?;
    println!(
        "   {} orders, {} users",
        orders_raw.len(),
        users_raw.len()
    );

    let mut recorder = RunRecorder::new();
    recorder.record_input(ORDERS_TABLE, &config.sources.orders);
    recorder.record_input(USERS_TABLE, &config.sources.users);
    for (name, file) in [
        (ORDERS_CLEAN_TABLE, &config.outputs.orders),
        (USERS_CLEAN_TABLE, &config.outputs.users),
        (ANALYTICS_TABLE, &config.outputs.analytics),
        (RUN_META, &config.outputs.run_meta),
    ] {
        recorder.record_output(name, &Path::new(&config.target_path).join(file).to_string_lossy());
    }
    recorder.record_config(CONFIG_ROOT, &project_dir.to_string_lossy());

    // 2. TRANSFORM (Domain, pure)
    println!("🛡️  Running quality gate, cleaning and joins...");
    let output = transform(orders_raw, users_raw, config, recorder, run_at)?;

    let json = output
        .metadata
        .to_json_pretty()
        .map_err(|e| OrdermartError::InternalError(format!("Cannot serialize run metadata: {}", e)))?;

    // 3. PERSISTENCE: stage every table, publish them together, metadata last.
    // Un _run_meta.json présent signifie un jeu d'artefacts complet.
    println!("💾 Writing artifacts...");
    let artifacts = [
        (&output.orders, &layout.orders_output),
        (&output.users, &layout.users_output),
        (&output.analytics, &layout.analytics_output),
    ];
    let mut staged = Vec::with_capacity(artifacts.len());
    for (table, path) in artifacts {
        staged.push(sink.stage(table, path).await?);
    }

    remove_if_exists(&layout.run_meta_output)?;
    sink.commit(staged).await?;
    for (table, path) in artifacts {
        println!("   ✅ {} ({} rows) -> {}", table.name, table.len(), path.display());
    }

    atomic_write(&layout.run_meta_output, json)?;
    println!("   📝 Run metadata -> {}", layout.run_meta_output.display());

    Ok(RunSummary {
        metadata: output.metadata,
        artifacts: vec![
            layout.orders_output,
            layout.users_output,
            layout.analytics_output,
            layout.run_meta_output,
        ],
        duration: start_time.elapsed(),
    })
}

fn remove_if_exists(path: &Path) -> Result<(), InfrastructureError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InfrastructureError::Io(e)),
    }
}

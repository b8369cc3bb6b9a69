// ordermart-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

pub const ENV_TARGET_PATH: &str = "ORDERMART_TARGET_PATH";
pub const ENV_RAW_PATH: &str = "ORDERMART_RAW_PATH";

const CANDIDATES: [&str; 2] = ["ordermart.yaml", "ordermart.yml"];

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Découverte du fichier principal
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. Chargement YAML
    let content = fs::read_to_string(&config_path).map_err(|e| {
        InfrastructureError::ConfigError(format!(
            "Failed to read project config at {:?}: {}",
            config_path, e
        ))
    })?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Override via Variables d'Environnement (Pattern 'Layering')
    // Permet de faire: ORDERMART_TARGET_PATH=/tmp/build ordermart run
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // 4. Validation après overrides : une variable vide est aussi refusée
    config.validate()?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CANDIDATES
    )))
}

/// `ORDERMART_RAW_PATH` moves both raw sources to another directory, keeping
/// their file names.
fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_TARGET_PATH) {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    if let Some(raw_dir) = lookup(ENV_RAW_PATH) {
        info!(new = ?raw_dir, "Overriding raw sources directory via ENV");
        config.sources.orders = relocate(&raw_dir, &config.sources.orders);
        config.sources.users = relocate(&raw_dir, &config.sources.users);
    }
}

fn relocate(dir: &str, file: &str) -> String {
    let name = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    Path::new(dir).join(name).to_string_lossy().into_owned()
}

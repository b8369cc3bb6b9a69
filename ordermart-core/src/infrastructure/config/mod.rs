pub mod project;

pub use crate::domain::project::ProjectConfig;
pub use project::{ENV_RAW_PATH, ENV_TARGET_PATH, load_project_config};

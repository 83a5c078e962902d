use std::path::PathBuf;

use minimap::{ConfigLoadError, InvalidConfiguration, MinimapConfig};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::scenario::{Scenario, ScenarioError};

const CONFIG_PATH_ENV_VAR: &str = "MINIMAP_CONFIG";
const SCENARIO_PATH_ENV_VAR: &str = "MINIMAP_SCENARIO";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("invalid minimap configuration: {0}")]
    Minimap(#[from] InvalidConfiguration),
}

pub(crate) struct AppWiring {
    pub(crate) config: MinimapConfig,
    pub(crate) scenario: Scenario,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Minimap Demo Startup ===");

    let config = match path_from_env(CONFIG_PATH_ENV_VAR) {
        Some(path) => {
            info!(path = %path.display(), "loading_minimap_config");
            MinimapConfig::load(&path)?
        }
        None => MinimapConfig::default(),
    };
    let scenario = match path_from_env(SCENARIO_PATH_ENV_VAR) {
        Some(path) => {
            info!(path = %path.display(), "loading_scenario");
            Scenario::load(&path)?
        }
        None => Scenario::default(),
    };

    Ok(AppWiring { config, scenario })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn path_from_env(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

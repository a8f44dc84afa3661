use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use arcade_engine::{
    resolve_app_paths, FactStore, LogSpeaker, LoopConfig, Stage, StartupError,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::levels::DemoLevels;

const LAUNCH_CONFIG_FILE: &str = "launch.json";
const START_LEVEL_ENV_VAR: &str = "ARCADE_START_LEVEL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LaunchConfig {
    pub(crate) start_level: u32,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    /// Meters of world visible across the window.
    pub(crate) view_width_m: f32,
    pub(crate) facts_file: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            start_level: 1,
            window_width: 1280,
            window_height: 720,
            view_width_m: 16.0,
            facts_file: "facts.json".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum LaunchConfigError {
    #[error("failed to read launch config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse launch config {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid launch config {path}: {field} {message}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        message: &'static str,
    },
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    LaunchConfig(#[from] LaunchConfigError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) stage: Stage,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Arcade Startup ===");

    let paths = resolve_app_paths()?;
    let mut launch = load_launch_config(&paths.root.join(LAUNCH_CONFIG_FILE))?;
    apply_env_overrides(&mut launch, std::env::var(START_LEVEL_ENV_VAR).ok().as_deref());
    info!(
        root = %paths.root.display(),
        start_level = launch.start_level,
        view_width_m = launch.view_width_m,
        "launch_config_resolved"
    );

    let facts_path = paths.facts_path(&launch.facts_file);
    let facts = FactStore::load(&facts_path).unwrap_or_else(|error| {
        warn!(path = %facts_path.display(), error = %error, "game_facts_unreadable");
        FactStore::in_memory()
    });

    let aspect = launch.window_height as f32 / launch.window_width as f32;
    let stage = Stage::new(
        DemoLevels::new(launch.view_width_m, aspect),
        facts,
        Rc::new(LogSpeaker),
        launch.start_level,
    );
    let config = LoopConfig {
        window_width: launch.window_width,
        window_height: launch.window_height,
        ..LoopConfig::default()
    };

    Ok(AppWiring { config, stage })
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

/// A missing file yields the defaults.
pub(crate) fn load_launch_config(path: &Path) -> Result<LaunchConfig, LaunchConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(LaunchConfig::default());
        }
        Err(source) => {
            return Err(LaunchConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_launch_config(path, &raw)?;
    validate_launch_config(path, &config)?;
    Ok(config)
}

fn parse_launch_config(path: &Path, raw: &str) -> Result<LaunchConfig, LaunchConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        LaunchConfigError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

fn validate_launch_config(path: &Path, config: &LaunchConfig) -> Result<(), LaunchConfigError> {
    let invalid = |field, message| LaunchConfigError::Invalid {
        path: path.to_path_buf(),
        field,
        message,
    };
    if config.start_level == 0 {
        return Err(invalid("start_level", "must be at least 1"));
    }
    if config.window_width == 0 || config.window_height == 0 {
        return Err(invalid("window_width/window_height", "must be non-zero"));
    }
    if !config.view_width_m.is_finite() || config.view_width_m <= 0.0 {
        return Err(invalid("view_width_m", "must be a positive number of meters"));
    }
    if config.facts_file.trim().is_empty() {
        return Err(invalid("facts_file", "must not be empty"));
    }
    Ok(())
}

fn apply_env_overrides(config: &mut LaunchConfig, start_level: Option<&str>) {
    let Some(raw) = start_level else {
        return;
    };
    match raw.trim().parse::<u32>() {
        Ok(level) if level >= 1 => config.start_level = level,
        _ => warn!(
            var = START_LEVEL_ENV_VAR,
            value = raw,
            "start_level_override_ignored"
        ),
    }
}

use std::fs;
use std::path::Path;

use parkaccess_core::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cli::AnalysisOverrides;
use crate::error::AppError;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "parkaccess.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `parkaccess_core=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Worker threads for the global rayon pool, all cores when unset
    pub threads: Option<usize>,
}

impl AppConfig {
    /// Read `path`, or `parkaccess.toml` if it exists, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Command line flags win over file values
    pub fn apply_overrides(&mut self, overrides: &AnalysisOverrides) {
        let analysis = &mut self.analysis;
        if let Some(place) = &overrides.place {
            analysis.place_name.clone_from(place);
        }
        if let Some(max_distance) = overrides.max_distance {
            analysis.max_distance_m = max_distance;
        }
        if let Some(crs) = overrides.target_crs {
            analysis.target_crs = crs;
        }
        if let Some(dir) = &overrides.data_dir {
            analysis.data_dir.clone_from(dir);
        }
        if let Some(dir) = &overrides.output_dir {
            analysis.output_dir.clone_from(dir);
        }
        if overrides.no_clip {
            analysis.clip_to_boundary = false;
        }
        if let Some(threads) = overrides.threads {
            self.runtime.threads = Some(threads);
        }
    }
}

//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::store::{PagingLimits, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::core::Project;

/// Default listen address for `spokes serve`
pub const DEFAULT_BIND: &str = "127.0.0.1:5080";

/// Spokes configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file, relative to the project root
    pub database: Option<PathBuf>,

    /// Listen address for the HTTP API
    pub bind: Option<String>,

    /// Default list page size
    pub page_size: Option<i64>,

    /// Upper bound for a requested page size
    pub max_page_size: Option<i64>,

    /// Allowed CORS origins, `*` for any
    pub cors_origins: Option<Vec<String>>,

    /// Bearer token required by the HTTP API when set
    pub api_token: Option<String>,

    /// Log filter directive (e.g. `info`, `spokes=debug`)
    pub log_level: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, discovering the project from
    /// the current directory
    pub fn load() -> Self {
        let project = Project::discover().ok();
        Self::load_for(project.as_ref())
    }

    /// Load configuration from all sources for a known project
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (resolved by the accessors below)

        // 2. Global user config (~/.config/spokes/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.spokes/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    fn read_file(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        // The generated config is all comments
        let is_blank = contents.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if is_blank {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "spokes")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.bind.is_some() {
            self.bind = other.bind;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.max_page_size.is_some() {
            self.max_page_size = other.max_page_size;
        }
        if other.cors_origins.is_some() {
            self.cors_origins = other.cors_origins;
        }
        if other.api_token.is_some() {
            self.api_token = other.api_token;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(database) = non_empty("SPOKES_DATABASE") {
            self.database = Some(PathBuf::from(database));
        }
        if let Some(bind) = non_empty("SPOKES_BIND") {
            self.bind = Some(bind);
        }
        if let Some(token) = non_empty("SPOKES_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(level) = non_empty("SPOKES_LOG") {
            self.log_level = Some(level);
        }
    }

    /// Listen address for the HTTP API
    pub fn bind(&self) -> String {
        self.bind.clone().unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    /// Paging limits with out-of-range values replaced by the defaults
    pub fn paging_limits(&self) -> PagingLimits {
        let max_page_size = self
            .max_page_size
            .filter(|&n| n > 0)
            .unwrap_or(MAX_PAGE_SIZE);
        let default_page_size = self
            .page_size
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(max_page_size);

        PagingLimits {
            default_page_size,
            max_page_size,
        }
    }

    /// Allowed CORS origins; any origin when unset
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .clone()
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()])
    }

    /// API token, ignoring blank values
    pub fn api_token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

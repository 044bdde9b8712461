//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::DATABASE_FILE;
use crate::core::Config;

/// Name of the marker directory at a catalog's root
pub const PROJECT_DIR: &str = ".spokes";

/// Represents a spokes catalog project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .spokes/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = Self::resolve_root(path)?;
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::write_structure(root)
    }

    /// Force initialization even if .spokes/ exists; the config file is
    /// rewritten, the database is left alone
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = Self::resolve_root(path)?;
        Self::write_structure(root)
    }

    fn resolve_root(path: &Path) -> Result<PathBuf, ProjectError> {
        std::fs::create_dir_all(path).map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
    }

    fn write_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.spokes_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# Spokes catalog configuration

# Database file, relative to the project root (default: .spokes/articles.db)
# database: .spokes/articles.db

# Listen address for `spokes serve`
# bind: 127.0.0.1:5080

# Default and maximum page size for list queries
# page_size: 20
# max_page_size: 100

# Origins allowed to call the HTTP API ("*" for any)
# cors_origins:
#   - "*"

# Require `Authorization: Bearer <token>` on /api routes
# api_token: ""

# Log filter (error, warn, info, debug, trace)
# log_level: info

# Default output format (auto, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .spokes configuration directory
    pub fn spokes_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Get the project config file path
    pub fn config_path(&self) -> PathBuf {
        self.spokes_dir().join("config.yaml")
    }

    /// Database location, honouring the `database` config key
    pub fn database_path(&self, config: &Config) -> PathBuf {
        match &config.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.root.join(path),
            None => self.spokes_dir().join(DATABASE_FILE),
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a spokes catalog (searched from {searched_from:?}). Run 'spokes init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("spokes catalog already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.spokes_dir().is_dir());
        assert!(project.config_path().exists());
        let contents = std::fs::read_to_string(project.config_path()).unwrap();
        let parsed: Config = serde_yml::from_str(&contents).unwrap_or_default();
        assert!(parsed.bind.is_none());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_init_force_keeps_database() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let db = project.database_path(&Config::default());
        std::fs::write(&db, b"placeholder").unwrap();

        Project::init_force(tmp.path()).unwrap();
        assert!(db.exists());
    }

    #[test]
    fn test_project_init_creates_missing_directory() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("new/catalog");
        let project = Project::init(&target).unwrap();
        assert!(project.spokes_dir().is_dir());
    }

    #[test]
    fn test_project_discover_finds_spokes_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_spokes_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_database_path_defaults_and_overrides() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let default = project.database_path(&Config::default());
        assert_eq!(default, project.spokes_dir().join("articles.db"));

        let config = Config {
            database: Some(PathBuf::from("/var/lib/spokes/catalog.db")),
            ..Default::default()
        };
        assert_eq!(
            project.database_path(&config),
            PathBuf::from("/var/lib/spokes/catalog.db")
        );
    }
}

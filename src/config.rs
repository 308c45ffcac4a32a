//! Runtime configuration for gradlecfg
//!
//! Settings are loaded from environment variables with sensible defaults. They
//! cover the identity defaults applied to sparse configuration documents and
//! the project-relative locations of the manifests the tool reads and writes.
//!
//! # Environment Variables
//!
//! - `GRADLECFG_DEFAULT_NAME`: App name when the document omits one - default: "TronProtocol"
//! - `GRADLECFG_DEFAULT_PACKAGE`: Package id when the document omits one - default: "com.tronprotocol.app"
//! - `GRADLECFG_MANIFEST_PATH`: Live manifest, relative to the project - default: "app/build.gradle"
//! - `GRADLECFG_GENERATED_PATH`: Generate-only output - default: "app/build.gradle.generated"
//! - `GRADLECFG_BACKUP_SUFFIX`: Suffix appended to the live manifest for backups - default: ".backup"
//! - `GRADLECFG_SOURCE_DIR`: Source tree probed for Kotlin files - default: "app/src"
//! - `GRADLECFG_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use gradlecfg::ToolConfig;
//! use std::path::Path;
//!
//! let config = ToolConfig::default();
//! config.validate().expect("Invalid configuration");
//! let live = config.manifest_path_in(Path::new("/work/project"));
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_APP_NAME: &str = "TronProtocol";
const DEFAULT_PACKAGE: &str = "com.tronprotocol.app";
const DEFAULT_MANIFEST_PATH: &str = "app/build.gradle";
const DEFAULT_GENERATED_PATH: &str = "app/build.gradle.generated";
const DEFAULT_BACKUP_SUFFIX: &str = ".backup";
const DEFAULT_SOURCE_DIR: &str = "app/src";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ToolConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Runtime settings shared by every pipeline invocation
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// App name used when the document does not provide one
    pub default_name: String,

    /// Package id used when the document does not provide one
    pub default_package: String,

    /// Live manifest path, relative to the project root
    pub manifest_path: PathBuf,

    /// Destination of the generate action, relative to the project root
    pub generated_path: PathBuf,

    /// Suffix appended to the live manifest file name for backups
    pub backup_suffix: String,

    /// Source directory probed for Kotlin sources, relative to the project root
    pub source_dir: PathBuf,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Default for ToolConfig {
    /// Loads `GRADLECFG_*` environment variables, falling back to defaults
    fn default() -> Self {
        Self {
            default_name: env_or("GRADLECFG_DEFAULT_NAME", DEFAULT_APP_NAME),
            default_package: env_or("GRADLECFG_DEFAULT_PACKAGE", DEFAULT_PACKAGE),
            manifest_path: PathBuf::from(env_or("GRADLECFG_MANIFEST_PATH", DEFAULT_MANIFEST_PATH)),
            generated_path: PathBuf::from(env_or(
                "GRADLECFG_GENERATED_PATH",
                DEFAULT_GENERATED_PATH,
            )),
            backup_suffix: env_or("GRADLECFG_BACKUP_SUFFIX", DEFAULT_BACKUP_SUFFIX),
            source_dir: PathBuf::from(env_or("GRADLECFG_SOURCE_DIR", DEFAULT_SOURCE_DIR)),
            log_level: env_or("GRADLECFG_LOG_LEVEL", DEFAULT_LOG_LEVEL).to_lowercase(),
        }
    }
}

impl ToolConfig {
    /// Validates the configuration
    ///
    /// Checks that:
    /// - Identity defaults and the backup suffix are non-empty
    /// - Manifest and source paths are relative to the project root
    /// - Log level is valid
    pub fn validate(&self) -> Result<(), ToolConfigError> {
        if self.default_name.trim().is_empty() {
            return Err(ToolConfigError::ValidationFailed(
                "Default app name cannot be empty".to_string(),
            ));
        }
        if self.default_package.trim().is_empty() {
            return Err(ToolConfigError::ValidationFailed(
                "Default package cannot be empty".to_string(),
            ));
        }
        if self.backup_suffix.is_empty() {
            return Err(ToolConfigError::ValidationFailed(
                "Backup suffix cannot be empty".to_string(),
            ));
        }

        for (label, path) in [
            ("Manifest path", &self.manifest_path),
            ("Generated path", &self.generated_path),
            ("Source dir", &self.source_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ToolConfigError::ValidationFailed(format!(
                    "{} cannot be empty",
                    label
                )));
            }
            if path.is_absolute() {
                return Err(ToolConfigError::ValidationFailed(format!(
                    "{} must be relative to the project root: {}",
                    label,
                    path.display()
                )));
            }
        }

        if self.generated_path == self.manifest_path {
            return Err(ToolConfigError::ValidationFailed(
                "Generated path must differ from the live manifest path".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ToolConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn manifest_path_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.manifest_path)
    }

    pub fn generated_path_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.generated_path)
    }

    pub fn source_dir_in(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.source_dir)
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("default_name".to_string(), self.default_name.clone());
        map.insert("default_package".to_string(), self.default_package.clone());
        map.insert(
            "manifest_path".to_string(),
            self.manifest_path.display().to_string(),
        );
        map.insert(
            "generated_path".to_string(),
            self.generated_path.display().to_string(),
        );
        map.insert("backup_suffix".to_string(), self.backup_suffix.clone());
        map.insert(
            "source_dir".to_string(),
            self.source_dir.display().to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for ToolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "gradlecfg Configuration:")?;
        writeln!(f, "  Default Name: {}", self.default_name)?;
        writeln!(f, "  Default Package: {}", self.default_package)?;
        writeln!(f, "  Manifest Path: {}", self.manifest_path.display())?;
        writeln!(f, "  Generated Path: {}", self.generated_path.display())?;
        writeln!(f, "  Backup Suffix: {}", self.backup_suffix)?;
        writeln!(f, "  Source Dir: {}", self.source_dir.display())?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

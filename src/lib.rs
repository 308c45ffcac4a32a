//! gradlecfg - YAML-driven Gradle manifest generation with guarded updates
//!
//! A build description written in one of two YAML dialects is normalized into
//! a single model, its shorthand library names are resolved to Maven
//! coordinates, and an app-module `build.gradle` is rendered from it. Updating
//! the live manifest goes through a safe-update controller that can diff,
//! back up and refuse destructive overwrites.
//!
//! # Example Usage
//!
//! ```no_run
//! use gradlecfg::{Configurator, ToolConfig, UpdateMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let configurator = Configurator::new("build-config.yaml", None, ToolConfig::default());
//! let resolved = configurator.load()?;
//! let outcome = configurator.update(&resolved, UpdateMode { safe: true, force: false })?;
//! if outcome.is_blocked() {
//!     eprintln!("live manifest has local edits");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`dialect`]: schema detection and normalization
//! - [`coordinates`]: shorthand to Maven coordinate resolution
//! - [`manifest`]: manifest rendering and the Kotlin probe
//! - [`update`]: staged, backed-up replacement of the live manifest
//! - [`pipeline`]: the end-to-end run for one document

pub mod advisory;
pub mod cli;
pub mod config;
pub mod coordinates;
pub mod dialect;
pub mod error;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod selfcheck;
pub mod update;
pub mod util;

pub use config::{ToolConfig, ToolConfigError};
pub use coordinates::{resolve, resolve_all, EcosystemGroup};
pub use dialect::{normalize, AppDefaults, Dialect, DialectTag, NormalizedConfig};
pub use error::{ConfigError, Result};
pub use model::{
    AppModel, BuildType, BuildTypes, Coordinate, DependencyDeclaration, ResolvedDependency,
};
pub use pipeline::{Configurator, GeneratedManifest, ResolvedConfig};
pub use update::{ApplyKind, Outcome, SafeUpdater, StagedManifest, UpdateMode};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_gradlecfg() {
        assert_eq!(NAME, "gradlecfg");
    }
}

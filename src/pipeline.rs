//! End-to-end pipeline: load → normalize → resolve → probe → render → apply
//!
//! Each invocation reads its inputs fresh and owns every intermediate value;
//! nothing is shared between runs.

use crate::config::ToolConfig;
use crate::coordinates::resolve_all;
use crate::dialect::{normalize, AppDefaults, DialectTag, NormalizedConfig};
use crate::error::{ConfigError, Result};
use crate::manifest::{self, probe_kotlin};
use crate::model::{AppModel, BuildTypes, ResolvedDependency};
use crate::update::{Outcome, SafeUpdater, StagedManifest, UpdateMode};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A normalized document with its dependencies resolved
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub dialect: DialectTag,
    pub app: AppModel,
    pub build_types: BuildTypes,
    pub dependencies: Vec<ResolvedDependency>,
}

impl ResolvedConfig {
    /// Normalizes `raw` and resolves its dependency declarations
    pub fn from_value(
        raw: &Value,
        forced: Option<DialectTag>,
        defaults: &AppDefaults,
    ) -> Result<Self> {
        let NormalizedConfig {
            dialect,
            app,
            build_types,
            dependencies,
        } = normalize(raw, forced, defaults)?;
        let dependencies = resolve_all(&dependencies);
        debug!(count = dependencies.len(), "Resolved dependencies");

        Ok(Self {
            dialect,
            app,
            build_types,
            dependencies,
        })
    }

    /// Parses YAML text and resolves it; `source` names the document in errors
    pub fn parse(
        text: &str,
        source: &Path,
        forced: Option<DialectTag>,
        defaults: &AppDefaults,
    ) -> Result<Self> {
        let raw: Value = serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            path: source.to_path_buf(),
            source: e,
        })?;
        Self::from_value(&raw, forced, defaults)
    }

    pub fn render(&self, include_kotlin_plugin: bool) -> GeneratedManifest {
        GeneratedManifest {
            text: manifest::render(
                &self.app,
                &self.build_types,
                &self.dependencies,
                include_kotlin_plugin,
            ),
            include_kotlin_plugin,
        }
    }
}

/// Rendered manifest text; rendering is pure, so the model it came from fully
/// determines it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedManifest {
    pub text: String,
    pub include_kotlin_plugin: bool,
}

/// Runs the pipeline for one configuration document
#[derive(Debug, Clone)]
pub struct Configurator {
    config_path: PathBuf,
    project_root: PathBuf,
    forced: Option<DialectTag>,
    tool: ToolConfig,
}

impl Configurator {
    /// The project root defaults to the directory holding the document
    pub fn new(
        config_path: impl Into<PathBuf>,
        forced: Option<DialectTag>,
        tool: ToolConfig,
    ) -> Self {
        let config_path = config_path.into();
        let project_root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_path,
            project_root,
            forced,
            tool,
        }
    }

    pub fn with_project_root(mut self, project_root: impl Into<PathBuf>) -> Self {
        self.project_root = project_root.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn live_manifest_path(&self) -> PathBuf {
        self.tool.manifest_path_in(&self.project_root)
    }

    pub fn generated_manifest_path(&self) -> PathBuf {
        self.tool.generated_path_in(&self.project_root)
    }

    /// Reads, normalizes and resolves the configuration document
    pub fn load(&self) -> Result<ResolvedConfig> {
        if !self.config_path.is_file() {
            return Err(ConfigError::MissingInputFile(self.config_path.clone()));
        }
        let text = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::io(&self.config_path, e))?;
        let resolved = ResolvedConfig::parse(
            &text,
            &self.config_path,
            self.forced,
            &AppDefaults::from(&self.tool),
        )?;

        info!(
            path = %self.config_path.display(),
            dialect = %resolved.dialect,
            "Loaded configuration"
        );
        Ok(resolved)
    }

    /// Renders the manifest, probing the project for Kotlin usage
    pub fn render(&self, resolved: &ResolvedConfig) -> Result<GeneratedManifest> {
        let probe = probe_kotlin(
            &self.tool.source_dir_in(&self.project_root),
            &self.live_manifest_path(),
        )?;
        Ok(resolved.render(probe.include_plugin()))
    }

    /// Writes the manifest to the generate-only path; the live manifest is untouched
    pub fn generate(&self, resolved: &ResolvedConfig) -> Result<PathBuf> {
        let generated = self.render(resolved)?;
        let path = self.generated_manifest_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        fs::write(&path, &generated.text).map_err(|e| ConfigError::io(&path, e))?;
        info!(path = %path.display(), "Generated Gradle configuration");
        Ok(path)
    }

    /// Stages a fresh manifest and hands it to the safe-update controller
    pub fn update(&self, resolved: &ResolvedConfig, mode: UpdateMode) -> Result<Outcome> {
        let generated = self.render(resolved)?;
        let live = self.live_manifest_path();
        let staged = StagedManifest::write_beside(&live, &generated.text)?;
        let outcome = SafeUpdater::new(self.tool.backup_suffix.clone()).apply(staged, &live, mode)?;
        info!(path = %live.display(), outcome = %outcome, "Update finished");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool() -> ToolConfig {
        ToolConfig {
            default_name: "TronProtocol".to_string(),
            default_package: "com.tronprotocol.app".to_string(),
            manifest_path: PathBuf::from("app/build.gradle"),
            generated_path: PathBuf::from("app/build.gradle.generated"),
            backup_suffix: ".backup".to_string(),
            source_dir: PathBuf::from("app/src"),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_missing_input_file() {
        let dir = TempDir::new().unwrap();
        let configurator = Configurator::new(dir.path().join("absent.yaml"), None, tool());
        assert!(matches!(
            configurator.load(),
            Err(ConfigError::MissingInputFile(_))
        ));
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "app: [unclosed\n").unwrap();
        let err = Configurator::new(&path, None, tool()).load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_project_root_is_config_directory() {
        let configurator = Configurator::new("/work/proj/build.yaml", None, tool());
        assert_eq!(
            configurator.live_manifest_path(),
            PathBuf::from("/work/proj/app/build.gradle")
        );
        let configurator = Configurator::new("build.yaml", None, tool());
        assert_eq!(configurator.live_manifest_path(), PathBuf::from("./app/build.gradle"));
    }

    #[test]
    fn test_generate_leaves_live_manifest_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.yaml");
        fs::write(&path, "app: {}\nbuild: {}\n").unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app/build.gradle"), "// hand written\n").unwrap();

        let configurator = Configurator::new(&path, None, tool());
        let resolved = configurator.load().unwrap();
        let out = configurator.generate(&resolved).unwrap();

        assert_eq!(out, dir.path().join("app/build.gradle.generated"));
        assert!(fs::read_to_string(&out).unwrap().contains("namespace 'com.tronprotocol.app'"));
        assert_eq!(
            fs::read_to_string(dir.path().join("app/build.gradle")).unwrap(),
            "// hand written\n"
        );
    }

    #[test]
    fn test_render_uses_kotlin_probe() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.yaml");
        fs::write(&path, "app: {}\nbuild: {}\n").unwrap();
        fs::create_dir_all(dir.path().join("app/src/main/kotlin")).unwrap();
        fs::write(dir.path().join("app/src/main/kotlin/App.kt"), "class App").unwrap();

        let configurator = Configurator::new(&path, None, tool());
        let resolved = configurator.load().unwrap();
        let generated = configurator.render(&resolved).unwrap();
        assert!(generated.include_kotlin_plugin);
        assert!(generated.text.contains("kotlinOptions {"));
    }
}

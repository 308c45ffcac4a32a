//! Output formatting for summaries and tool configuration
//!
//! Summaries render as JSON, YAML or human-readable text. JSON and YAML share
//! one serializable shape so scripts can consume either.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ToolConfig;
use crate::dialect::DialectTag;
use crate::model::{AppModel, BuildType, BuildTypes, ResolvedDependency};
use crate::pipeline::ResolvedConfig;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\
                    \u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\
                    \u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Everything the summary action reports about a resolved document
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub source: String,
    pub dialect: DialectTag,
    pub app: &'a AppModel,
    pub build_types: &'a BuildTypes,
    pub dependencies: &'a [ResolvedDependency],
}

impl<'a> Summary<'a> {
    pub fn new(source: &Path, resolved: &'a ResolvedConfig) -> Self {
        Self {
            source: source.display().to_string(),
            dialect: resolved.dialect,
            app: &resolved.app,
            build_types: &resolved.build_types,
            dependencies: &resolved.dependencies,
        }
    }
}

/// Output formatter for summaries
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_summary(&self, summary: &Summary<'_>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(summary)
                .context("Failed to serialize summary to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(summary).context("Failed to serialize summary to YAML")
            }
            OutputFormat::Human => Ok(self.format_summary_human(summary)),
        }
    }

    /// Formats configuration display
    pub fn format_config(&self, config: &ToolConfig) -> Result<String> {
        let config_map: BTreeMap<String, String> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config_map)
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&config_map).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_summary_human(&self, summary: &Summary<'_>) -> String {
        let app = summary.app;
        let mut output = String::new();

        output.push_str("\u{2713} Gradle Configuration Summary\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Source:    {} ({})\n", summary.source, summary.dialect));
        output.push_str(&format!("App:       {}\n", app.name));
        output.push_str(&format!("Package:   {}\n", app.package_id));
        output.push_str(&format!(
            "Version:   {} (code {})\n",
            app.version_name, app.version_code
        ));
        output.push_str(&format!(
            "SDK:       compile {}, min {}, target {}\n\n",
            app.compile_sdk, app.min_sdk, app.target_sdk
        ));

        output.push_str("Build Types:\n");
        let build_types: Vec<&BuildType> = summary.build_types.iter().collect();
        if build_types.is_empty() {
            output.push_str("\u{2514}\u{2500} (none declared, release is implied)\n");
        }
        for (i, build_type) in build_types.iter().enumerate() {
            output.push_str(&format!(
                "{}\u{2500} {}\n",
                connector(i, build_types.len()),
                describe_build_type(build_type)
            ));
        }
        output.push('\n');

        output.push_str("Dependencies:\n");
        if summary.dependencies.is_empty() {
            output.push_str("\u{2514}\u{2500} (none)\n");
        }
        for (i, dep) in summary.dependencies.iter().enumerate() {
            output.push_str(&format!(
                "{}\u{2500} {}\n",
                connector(i, summary.dependencies.len()),
                dep
            ));
        }

        output
    }
}

fn connector(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        "\u{2514}"
    } else {
        "\u{251C}"
    }
}

fn describe_build_type(build_type: &BuildType) -> String {
    let mut flags = Vec::new();
    if !build_type.enabled {
        flags.push("disabled".to_string());
    }
    if build_type.debuggable {
        flags.push("debuggable".to_string());
    }
    if build_type.minify_enabled {
        flags.push("minify".to_string());
    }
    if build_type.shrink_resources {
        flags.push("shrink".to_string());
    }
    if let Some(output_name) = &build_type.output_name {
        flags.push(format!("output {}", output_name));
    }

    if flags.is_empty() {
        build_type.name.clone()
    } else {
        format!("{} ({})", build_type.name, flags.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AppDefaults;

    fn resolved() -> ResolvedConfig {
        let text = "\
app:
  name: Demo
  package: com.example.demo
build:
  min_sdk: 26
build_types:
  debug:
    debuggable: true
  release:
    minify_enabled: true
    shrink_resources: true
dependencies:
  - androidx.core:core-ktx:1.12.0
";
        ResolvedConfig::parse(
            text,
            Path::new("build.yaml"),
            None,
            &AppDefaults {
                name: "TronProtocol".to_string(),
                package_id: "com.tronprotocol.app".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_human_summary() {
        let resolved = resolved();
        let summary = Summary::new(Path::new("build.yaml"), &resolved);
        let out = OutputFormatter::new(OutputFormat::Human)
            .format_summary(&summary)
            .unwrap();

        assert!(out.contains("Source:    build.yaml (flat)"));
        assert!(out.contains("Package:   com.example.demo"));
        assert!(out.contains("SDK:       compile 34, min 26, target 34"));
        assert!(out.contains("\u{251C}\u{2500} debug (debuggable)"));
        assert!(out.contains("\u{2514}\u{2500} release (minify, shrink)"));
        assert!(out.contains("\u{2514}\u{2500} androidx.core:core-ktx:1.12.0"));
    }

    #[test]
    fn test_json_summary() {
        let resolved = resolved();
        let summary = Summary::new(Path::new("build.yaml"), &resolved);
        let out = OutputFormatter::new(OutputFormat::Json)
            .format_summary(&summary)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["dialect"], "flat");
        assert_eq!(value["app"]["min_sdk"], 26);
        assert_eq!(value["build_types"][1]["name"], "release");
        assert_eq!(value["dependencies"][0], "androidx.core:core-ktx:1.12.0");
    }

    #[test]
    fn test_yaml_summary() {
        let resolved = resolved();
        let summary = Summary::new(Path::new("build.yaml"), &resolved);
        let out = OutputFormatter::new(OutputFormat::Yaml)
            .format_summary(&summary)
            .unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(value["app"]["name"], serde_yaml::Value::from("Demo"));
    }

    #[test]
    fn test_config_json_is_sorted_map() {
        let config = ToolConfig {
            default_name: "TronProtocol".to_string(),
            default_package: "com.tronprotocol.app".to_string(),
            manifest_path: "app/build.gradle".into(),
            generated_path: "app/build.gradle.generated".into(),
            backup_suffix: ".backup".to_string(),
            source_dir: "app/src".into(),
            log_level: "info".to_string(),
        };
        let out = OutputFormatter::new(OutputFormat::Json)
            .format_config(&config)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["backup_suffix"], ".backup");

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_config(&config)
            .unwrap();
        assert!(human.starts_with("gradlecfg Configuration:"));
    }
}

//! Dialect detection and normalization
//!
//! Two configuration schemas describe the same application build:
//!
//! - **flat**: top-level `app`, `version`, `build`, `build_types` and a list of
//!   fully qualified `dependencies`
//! - **declarative**: `project`, `versioning`, `android`, a `variants` list and
//!   grouped shorthand `libraries`
//!
//! A document is classified once into a [`Dialect`] and every extraction step
//! matches on that variant, so the rest of the pipeline only ever sees the
//! normalized model.

mod declarative;
mod flat;

use crate::config::ToolConfig;
use crate::error::{ConfigError, Result};
use crate::model::{AppModel, BuildTypes, DependencyDeclaration};
use regex::Regex;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

pub(crate) const DEFAULT_VERSION_CODE: u32 = 1;
pub(crate) const DEFAULT_VERSION_NAME: &str = "1.0";
pub(crate) const DEFAULT_COMPILE_SDK: u32 = 34;
pub(crate) const DEFAULT_MIN_SDK: u32 = 24;
pub(crate) const DEFAULT_TARGET_SDK: u32 = 34;

/// Identifies which schema a document was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectTag {
    Flat,
    Declarative,
}

impl fmt::Display for DialectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectTag::Flat => f.write_str("flat"),
            DialectTag::Declarative => f.write_str("declarative"),
        }
    }
}

impl FromStr for DialectTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(DialectTag::Flat),
            "declarative" => Ok(DialectTag::Declarative),
            other => Err(format!(
                "Unknown dialect: {}. Valid options: flat, declarative",
                other
            )),
        }
    }
}

/// A configuration document classified by schema
#[derive(Debug, Clone, Copy)]
pub enum Dialect<'a> {
    Flat(&'a Mapping),
    Declarative(&'a Mapping),
}

impl<'a> Dialect<'a> {
    /// Classifies a raw document by its marker keys
    pub fn detect(raw: &'a Value) -> Result<Self> {
        let root = root_mapping(raw)?;
        if root.contains_key("app") && root.contains_key("build") {
            Ok(Dialect::Flat(root))
        } else if root.contains_key("project") && root.contains_key("variants") {
            Ok(Dialect::Declarative(root))
        } else {
            Err(ConfigError::UnrecognizedDialect(
                "expected top-level 'app' and 'build' keys, or 'project' and 'variants' keys"
                    .to_string(),
            ))
        }
    }

    /// Wraps a document in the given dialect without probing marker keys
    pub fn forced(raw: &'a Value, tag: DialectTag) -> Result<Self> {
        let root = root_mapping(raw)?;
        Ok(match tag {
            DialectTag::Flat => Dialect::Flat(root),
            DialectTag::Declarative => Dialect::Declarative(root),
        })
    }

    pub fn tag(&self) -> DialectTag {
        match self {
            Dialect::Flat(_) => DialectTag::Flat,
            Dialect::Declarative(_) => DialectTag::Declarative,
        }
    }

    pub fn app(&self, defaults: &AppDefaults) -> Result<AppModel> {
        let app = match self {
            Dialect::Flat(root) => flat::app(root, defaults)?,
            Dialect::Declarative(root) => declarative::app(root, defaults)?,
        };
        validate_app(&app)?;
        Ok(app)
    }

    pub fn build_types(&self, app: &AppModel) -> Result<BuildTypes> {
        match self {
            Dialect::Flat(root) => flat::build_types(root),
            Dialect::Declarative(root) => declarative::build_types(root, app),
        }
    }

    pub fn dependencies(&self) -> Result<Vec<DependencyDeclaration>> {
        match self {
            Dialect::Flat(root) => flat::dependencies(root),
            Dialect::Declarative(root) => declarative::dependencies(root),
        }
    }
}

fn root_mapping(raw: &Value) -> Result<&Mapping> {
    raw.as_mapping().ok_or_else(|| {
        ConfigError::UnrecognizedDialect("top-level document is not a mapping".to_string())
    })
}

/// Identity values applied when a document leaves them out
#[derive(Debug, Clone)]
pub struct AppDefaults {
    pub name: String,
    pub package_id: String,
}

impl From<&ToolConfig> for AppDefaults {
    fn from(config: &ToolConfig) -> Self {
        Self {
            name: config.default_name.clone(),
            package_id: config.default_package.clone(),
        }
    }
}

/// Everything the normalizer extracts from one document
#[derive(Debug, Clone)]
pub struct NormalizedConfig {
    pub dialect: DialectTag,
    pub app: AppModel,
    pub build_types: BuildTypes,
    pub dependencies: Vec<DependencyDeclaration>,
}

/// Detects (or applies `forced`) the dialect and projects the document into
/// the internal model
pub fn normalize(
    raw: &Value,
    forced: Option<DialectTag>,
    defaults: &AppDefaults,
) -> Result<NormalizedConfig> {
    let dialect = match forced {
        Some(tag) => Dialect::forced(raw, tag)?,
        None => Dialect::detect(raw)?,
    };
    debug!(dialect = %dialect.tag(), forced = forced.is_some(), "Classified configuration");

    let app = dialect.app(defaults)?;
    let build_types = dialect.build_types(&app)?;
    let dependencies = dialect.dependencies()?;

    debug!(
        app = %app.name,
        build_types = build_types.len(),
        dependencies = dependencies.len(),
        "Normalized configuration"
    );

    Ok(NormalizedConfig {
        dialect: dialect.tag(),
        app,
        build_types,
        dependencies,
    })
}

fn package_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").expect("valid regex")
    })
}

fn validate_app(app: &AppModel) -> Result<()> {
    if !package_regex().is_match(&app.package_id) {
        return Err(ConfigError::invalid(
            "package",
            format!(
                "'{}' is not a dotted identifier such as com.example.app",
                app.package_id
            ),
        ));
    }
    if app.name.trim().is_empty() {
        return Err(ConfigError::invalid("name", "must not be empty"));
    }
    Ok(())
}

/// Rejects text that cannot be placed inside a quoted Gradle string
pub(crate) fn check_literal(path: &str, value: &str) -> Result<()> {
    match value
        .chars()
        .find(|&c| c.is_control() || matches!(c, '\'' | '"' | '\\' | '$'))
    {
        Some(c) => Err(ConfigError::invalid(
            path,
            format!("{:?} is not allowed in '{}'", c, value.escape_default()),
        )),
        None => Ok(()),
    }
}

// Field accessors shared by both dialects. `path` is the dotted location
// reported in errors.

pub(crate) fn section<'a>(root: &'a Mapping, key: &str) -> Result<Option<&'a Mapping>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(m)) => Ok(Some(m)),
        Some(_) => Err(ConfigError::invalid(key, "expected a mapping")),
    }
}

pub(crate) fn u32_field(
    map: Option<&Mapping>,
    key: &str,
    path: &str,
    default: u32,
) -> Result<u32> {
    match map.and_then(|m| m.get(key)) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                ConfigError::invalid(path, format!("expected a non-negative integer, got {}", n))
            }),
        Some(other) => Err(ConfigError::invalid(
            path,
            format!("expected a non-negative integer, got {}", describe(other)),
        )),
    }
}

pub(crate) fn string_field(
    map: Option<&Mapping>,
    key: &str,
    path: &str,
    default: &str,
) -> Result<String> {
    match map.and_then(|m| m.get(key)) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(ConfigError::invalid(
            path,
            format!("expected a string, got {}", describe(other)),
        )),
    }
}

pub(crate) fn bool_field(
    map: Option<&Mapping>,
    key: &str,
    path: &str,
    default: bool,
) -> Result<bool> {
    match map.and_then(|m| m.get(key)) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(ConfigError::invalid(
            path,
            format!("expected a boolean, got {}", describe(other)),
        )),
    }
}

pub(crate) fn string_list_field(
    map: Option<&Mapping>,
    key: &str,
    path: &str,
) -> Result<Vec<String>> {
    match map.and_then(|m| m.get(key)) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => {
                    check_literal(&format!("{}[{}]", path, i), s)?;
                    Ok(s.clone())
                }
                other => Err(ConfigError::invalid(
                    format!("{}[{}]", path, i),
                    format!("expected a string, got {}", describe(other)),
                )),
            })
            .collect(),
        Some(other) => Err(ConfigError::invalid(
            path,
            format!("expected a list, got {}", describe(other)),
        )),
    }
}

/// Sequence under `key`, or empty when absent
pub(crate) fn sequence<'a>(map: &'a Mapping, key: &str, path: &str) -> Result<&'a [Value]> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Sequence(items)) => Ok(items.as_slice()),
        Some(other) => Err(ConfigError::invalid(
            path,
            format!("expected a list, got {}", describe(other)),
        )),
    }
}

/// Text form of a YAML value for error messages
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().replace('\n', " "))
            .unwrap_or_else(|_| describe(other).to_string()),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

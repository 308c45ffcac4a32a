//! Normalized build model shared by every dialect
//!
//! The normalizer produces these types exactly once per run; the resolver and
//! the manifest generator only read them.

use crate::coordinates::EcosystemGroup;
use crate::error::{ConfigError, Result};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

fn build_type_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Maven coordinates never contain whitespace, quotes or escapes, and any of
/// them would break out of the quoted `implementation` line
fn is_coordinate_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '\'' | '"' | '\\' | '$'))
}

/// Application identity, versioning and SDK levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppModel {
    pub name: String,
    pub package_id: String,
    pub version_code: u32,
    pub version_name: String,
    pub compile_sdk: u32,
    pub min_sdk: u32,
    pub target_sdk: u32,
}

/// Configuration of a single named build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildType {
    pub name: String,
    pub enabled: bool,
    pub debuggable: bool,
    pub minify_enabled: bool,
    pub shrink_resources: bool,
    pub proguard_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

impl BuildType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            debuggable: false,
            minify_enabled: false,
            shrink_resources: false,
            proguard_files: Vec::new(),
            output_name: None,
        }
    }

    /// Stand-in emitted when a configuration declares no usable build type
    pub fn synthetic_release() -> Self {
        Self::new("release")
    }
}

/// Ordered, name-unique collection of build types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildTypes(Vec<BuildType>);

impl BuildTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a build type, rejecting empty and duplicate names
    pub fn insert(&mut self, build_type: BuildType) -> Result<()> {
        if build_type.name.trim().is_empty() {
            return Err(ConfigError::invalid("build type name", "must not be empty"));
        }
        if !build_type_name_regex().is_match(&build_type.name) {
            return Err(ConfigError::invalid(
                format!("build type '{}'", build_type.name),
                "must be an identifier such as staging or release_candidate",
            ));
        }
        if self.get(&build_type.name).is_some() {
            return Err(ConfigError::invalid(
                format!("build type '{}'", build_type.name),
                "declared more than once",
            ));
        }
        self.0.push(build_type);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&BuildType> {
        self.0.iter().find(|bt| bt.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildType> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|bt| bt.name.as_str()).collect()
    }

    /// Enabled build types in declaration order, or the synthetic release
    /// entry when none are enabled
    pub fn effective(&self) -> Vec<BuildType> {
        let enabled: Vec<BuildType> = self.0.iter().filter(|bt| bt.enabled).cloned().collect();
        if enabled.is_empty() {
            vec![BuildType::synthetic_release()]
        } else {
            enabled
        }
    }
}

/// Canonical `group:artifact:version` dependency identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

/// Resolution output; duplicates are kept to preserve declaration intent
pub type ResolvedDependency = Coordinate;

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Parses an already-qualified triple
    ///
    /// `location` names where the entry came from and is reported on failure.
    pub fn parse(entry: &str, location: &str) -> Result<Self> {
        let segments: Vec<&str> = entry.split(':').map(str::trim).collect();
        match segments.as_slice() {
            [group, artifact, version]
                if [group, artifact, version]
                    .iter()
                    .all(|s| is_coordinate_segment(s)) =>
            {
                Ok(Self::new(*group, *artifact, *version))
            }
            _ => Err(ConfigError::malformed(entry, location)),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A dependency as written in the configuration document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyDeclaration {
    /// Fully qualified triple, validated at normalization time
    Qualified(Coordinate),
    /// `name:version` pair scoped to an ecosystem group
    Shorthand {
        group: EcosystemGroup,
        name: String,
        version: String,
    },
}

impl DependencyDeclaration {
    /// Parses a `name:version` shorthand entry from `group`
    pub fn shorthand(group: EcosystemGroup, entry: &str, location: &str) -> Result<Self> {
        let segments: Vec<&str> = entry.split(':').map(str::trim).collect();
        match segments.as_slice() {
            [name, version] if is_coordinate_segment(name) && is_coordinate_segment(version) => {
                Ok(DependencyDeclaration::Shorthand {
                    group,
                    name: name.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(ConfigError::malformed(entry, location)),
        }
    }
}

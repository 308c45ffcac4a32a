//! Dependency coordinate resolution
//!
//! Shorthand `name:version` entries are scoped to an ecosystem group. Each
//! group knows how to expand a short name into a full Maven coordinate; the
//! UI-toolkit group additionally consults an exception table for artifacts
//! published under a different group id.

use crate::model::{Coordinate, DependencyDeclaration, ResolvedDependency};
use std::fmt;
use tracing::debug;

/// Ecosystem groups accepted under the declarative `libraries` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcosystemGroup {
    AndroidX,
    GoogleServices,
    TensorFlow,
}

/// Short names whose group id differs from `androidx.<name>`
static ANDROIDX_EXCEPTIONS: &[(&str, &str)] = &[
    ("material", "com.google.android.material"),
    ("core-ktx", "androidx.core"),
    ("lifecycle-runtime-ktx", "androidx.lifecycle"),
    ("work-runtime-ktx", "androidx.work"),
];

impl EcosystemGroup {
    /// Order in which groups are visited when collecting declarations
    pub const VISIT_ORDER: [EcosystemGroup; 3] = [
        EcosystemGroup::AndroidX,
        EcosystemGroup::GoogleServices,
        EcosystemGroup::TensorFlow,
    ];

    /// Key of this group under `libraries`
    pub fn key(&self) -> &'static str {
        match self {
            EcosystemGroup::AndroidX => "androidx",
            EcosystemGroup::GoogleServices => "google_services",
            EcosystemGroup::TensorFlow => "tensorflow",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::VISIT_ORDER.into_iter().find(|g| g.key() == key)
    }

    fn prefix(&self) -> &'static str {
        match self {
            EcosystemGroup::AndroidX => "androidx",
            EcosystemGroup::GoogleServices => "com.google.android.gms",
            EcosystemGroup::TensorFlow => "org.tensorflow",
        }
    }

    fn group_id(&self, short_name: &str) -> String {
        match self {
            EcosystemGroup::AndroidX => ANDROIDX_EXCEPTIONS
                .iter()
                .find(|(name, _)| *name == short_name)
                .map(|(_, group)| group.to_string())
                .unwrap_or_else(|| format!("{}.{}", self.prefix(), short_name)),
            EcosystemGroup::GoogleServices | EcosystemGroup::TensorFlow => {
                self.prefix().to_string()
            }
        }
    }
}

impl fmt::Display for EcosystemGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Expands a shorthand entry of `group` into a canonical coordinate
pub fn resolve(group: EcosystemGroup, short_name: &str, version: &str) -> ResolvedDependency {
    let coordinate = Coordinate::new(group.group_id(short_name), short_name, version);
    debug!(group = %group, short_name, coordinate = %coordinate, "Resolved shorthand dependency");
    coordinate
}

/// Resolves declarations in order; qualified triples pass through untouched
pub fn resolve_all(declarations: &[DependencyDeclaration]) -> Vec<ResolvedDependency> {
    declarations
        .iter()
        .map(|decl| match decl {
            DependencyDeclaration::Qualified(coordinate) => coordinate.clone(),
            DependencyDeclaration::Shorthand {
                group,
                name,
                version,
            } => resolve(*group, name, version),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_androidx_default_expansion() {
        let coord = resolve(EcosystemGroup::AndroidX, "recyclerview", "1.3.0");
        assert_eq!(coord.to_string(), "androidx.recyclerview:recyclerview:1.3.0");
    }

    #[test]
    fn test_androidx_exception_table_wins() {
        let coord = resolve(EcosystemGroup::AndroidX, "material", "1.9.0");
        assert_eq!(coord.to_string(), "com.google.android.material:material:1.9.0");

        let coord = resolve(EcosystemGroup::AndroidX, "core-ktx", "1.12.0");
        assert_eq!(coord.to_string(), "androidx.core:core-ktx:1.12.0");
    }

    #[test]
    fn test_google_services_prefix() {
        let coord = resolve(EcosystemGroup::GoogleServices, "play-services-location", "21.0.1");
        assert_eq!(
            coord.to_string(),
            "com.google.android.gms:play-services-location:21.0.1"
        );
    }

    #[test]
    fn test_services_group_ignores_exception_table() {
        let coord = resolve(EcosystemGroup::GoogleServices, "material", "1.0");
        assert_eq!(coord.to_string(), "com.google.android.gms:material:1.0");
    }

    #[test]
    fn test_tensorflow_prefix() {
        let coord = resolve(EcosystemGroup::TensorFlow, "tensorflow-lite", "2.14.0");
        assert_eq!(coord.to_string(), "org.tensorflow:tensorflow-lite:2.14.0");
    }

    #[test]
    fn test_resolve_all_preserves_order_and_duplicates() {
        let decls = vec![
            DependencyDeclaration::Qualified(Coordinate::new("com.example", "lib", "1.0.0")),
            DependencyDeclaration::Shorthand {
                group: EcosystemGroup::AndroidX,
                name: "appcompat".to_string(),
                version: "1.6.1".to_string(),
            },
            DependencyDeclaration::Qualified(Coordinate::new("com.example", "lib", "1.0.0")),
        ];
        let resolved: Vec<String> = resolve_all(&decls).iter().map(ToString::to_string).collect();
        assert_eq!(
            resolved,
            vec![
                "com.example:lib:1.0.0",
                "androidx.appcompat:appcompat:1.6.1",
                "com.example:lib:1.0.0",
            ]
        );
    }

    #[test]
    fn test_group_keys_round_trip() {
        for group in EcosystemGroup::VISIT_ORDER {
            assert_eq!(EcosystemGroup::from_key(group.key()), Some(group));
        }
        assert_eq!(EcosystemGroup::from_key("compose"), None);
    }
}

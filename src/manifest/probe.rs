//! Read-only probe deciding whether the Kotlin plugin belongs in the manifest

use crate::error::{ConfigError, Result};
use ignore::WalkBuilder;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const KOTLIN_EXTENSION: &str = "kt";
const PLUGIN_MARKERS: &[&str] = &["org.jetbrains.kotlin.android", "kotlin-android"];

/// What the probe found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KotlinProbe {
    pub kotlin_sources: bool,
    pub manifest_declares_plugin: bool,
}

impl KotlinProbe {
    pub fn include_plugin(&self) -> bool {
        self.kotlin_sources || self.manifest_declares_plugin
    }
}

/// Scans `source_dir` for `.kt` files and `live_manifest` for a Kotlin plugin
/// declaration. Missing paths count as "not found".
pub fn probe_kotlin(source_dir: &Path, live_manifest: &Path) -> Result<KotlinProbe> {
    let result = KotlinProbe {
        kotlin_sources: has_kotlin_sources(source_dir),
        manifest_declares_plugin: manifest_declares_plugin(live_manifest)?,
    };
    debug!(
        source_dir = %source_dir.display(),
        kotlin_sources = result.kotlin_sources,
        manifest_declares_plugin = result.manifest_declares_plugin,
        "Kotlin probe finished"
    );
    Ok(result)
}

fn has_kotlin_sources(source_dir: &Path) -> bool {
    if !source_dir.is_dir() {
        return false;
    }

    for result in WalkBuilder::new(source_dir)
        .hidden(false)
        .git_ignore(true)
        .build()
    {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(KOTLIN_EXTENSION) {
            debug!(path = %path.display(), "Found Kotlin source");
            return true;
        }
    }
    false
}

fn manifest_declares_plugin(live_manifest: &Path) -> Result<bool> {
    match fs::read_to_string(live_manifest) {
        Ok(content) => Ok(PLUGIN_MARKERS.iter().any(|m| content.contains(m))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(ConfigError::io(PathBuf::from(live_manifest), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app/src/main/java/com/example")).unwrap();
        dir
    }

    #[test]
    fn test_java_only_project_has_no_plugin() {
        let dir = project();
        fs::write(
            dir.path().join("app/src/main/java/com/example/Main.java"),
            "class Main {}",
        )
        .unwrap();

        let probe = probe_kotlin(&dir.path().join("app/src"), &dir.path().join("app/build.gradle"))
            .unwrap();
        assert_eq!(probe, KotlinProbe::default());
        assert!(!probe.include_plugin());
    }

    #[test]
    fn test_kotlin_source_enables_plugin() {
        let dir = project();
        fs::write(
            dir.path().join("app/src/main/java/com/example/Main.kt"),
            "fun main() {}",
        )
        .unwrap();

        let probe = probe_kotlin(&dir.path().join("app/src"), &dir.path().join("app/build.gradle"))
            .unwrap();
        assert!(probe.kotlin_sources);
        assert!(probe.include_plugin());
    }

    #[test]
    fn test_live_manifest_marker_enables_plugin() {
        let dir = project();
        fs::write(
            dir.path().join("app/build.gradle"),
            "plugins {\n    id 'kotlin-android'\n}\n",
        )
        .unwrap();

        let probe = probe_kotlin(&dir.path().join("app/src"), &dir.path().join("app/build.gradle"))
            .unwrap();
        assert!(!probe.kotlin_sources);
        assert!(probe.manifest_declares_plugin);
        assert!(probe.include_plugin());
    }

    #[test]
    fn test_missing_source_dir_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let probe =
            probe_kotlin(&dir.path().join("nope"), &dir.path().join("nope.gradle")).unwrap();
        assert!(!probe.include_plugin());
    }

    #[test]
    fn test_kts_scripts_do_not_count_as_sources() {
        let dir = project();
        fs::write(dir.path().join("app/src/settings.gradle.kts"), "").unwrap();
        let probe = probe_kotlin(&dir.path().join("app/src"), &dir.path().join("app/build.gradle"))
            .unwrap();
        assert!(!probe.kotlin_sources);
    }
}

//! End-to-end pipeline tests against temporary project trees
//!
//! Each test lays out a throwaway project (configuration document, optional
//! live manifest, optional sources) and drives `Configurator` through it.

use gradlecfg::{
    AppDefaults, ApplyKind, ConfigError, Configurator, DialectTag, Outcome, ResolvedConfig,
    ToolConfig, UpdateMode,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use yare::parameterized;

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

fn defaults() -> AppDefaults {
    AppDefaults::from(&tool())
}

fn data(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name);
    fs::read_to_string(&path).expect("Failed to read test data")
}

/// Project with the given configuration document at its root
fn project(config: &str) -> (TempDir, Configurator) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("build-config.yaml");
    fs::write(&path, config).expect("Failed to write config");
    let configurator = Configurator::new(&path, None, tool());
    (dir, configurator)
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn safe() -> UpdateMode {
    UpdateMode {
        safe: true,
        force: false,
    }
}

#[test]
fn test_flat_without_build_types_renders_synthetic_release() {
    let resolved = ResolvedConfig::parse(
        "app: {}\nbuild: {}\ndependencies: [\"com.example:lib:1.0.0\"]\n",
        Path::new("inline.yaml"),
        None,
        &defaults(),
    )
    .unwrap();
    let text = resolved.render(false).text;

    let build_types = text
        .split("buildTypes {")
        .nth(1)
        .and_then(|rest| rest.split("compileOptions").next())
        .unwrap();
    assert_eq!(build_types.matches(" {\n").count(), 1);
    assert!(build_types.contains("release {"));
    assert!(build_types.contains("minifyEnabled false"));

    let dependency_lines: Vec<&str> = text
        .lines()
        .filter(|l| l.trim_start().starts_with("implementation "))
        .collect();
    assert_eq!(dependency_lines, vec!["    implementation 'com.example:lib:1.0.0'"]);
}

#[test]
fn test_declarative_recyclerview_and_material() {
    let resolved = ResolvedConfig::parse(
        "project: {}\nvariants: []\nlibraries:\n  androidx: [\"recyclerview:1.3.0\", \"material:1.9.0\"]\n",
        Path::new("inline.yaml"),
        None,
        &defaults(),
    )
    .unwrap();
    let coordinates: Vec<String> = resolved.dependencies.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        coordinates,
        vec![
            "androidx.recyclerview:recyclerview:1.3.0",
            "com.google.android.material:material:1.9.0",
        ]
    );
}

#[test]
fn test_declarative_release_variant_gets_default_proguard() {
    let resolved = ResolvedConfig::parse(
        "project: {}\nvariants:\n  - name: release\n    config:\n      minifyEnabled: true\n",
        Path::new("inline.yaml"),
        None,
        &defaults(),
    )
    .unwrap();
    let text = resolved.render(false).text;
    assert!(text.contains(
        "        release {\n            debuggable false\n            minifyEnabled true\n            \
         proguardFiles getDefaultProguardFile('proguard-android-optimize.txt')\n        }\n"
    ));
}

#[test]
fn test_both_dialects_render_same_identity() {
    let flat = ResolvedConfig::parse(&data("flat.yaml"), Path::new("flat.yaml"), None, &defaults())
        .unwrap();
    let declarative = ResolvedConfig::parse(
        &data("declarative.yaml"),
        Path::new("declarative.yaml"),
        None,
        &defaults(),
    )
    .unwrap();

    assert_eq!(flat.dialect, DialectTag::Flat);
    assert_eq!(declarative.dialect, DialectTag::Declarative);
    assert_eq!(flat.app, declarative.app);
    assert_eq!(flat.build_types.names(), declarative.build_types.names());

    let coordinates: Vec<String> = declarative.dependencies.iter().map(|d| d.to_string()).collect();
    assert_eq!(
        coordinates,
        vec![
            "com.google.android.material:material:1.11.0",
            "androidx.appcompat:appcompat:1.6.1",
            "org.tensorflow:tensorflow-lite:2.14.0",
        ]
    );
}

#[test]
fn test_render_is_deterministic() {
    let resolved =
        ResolvedConfig::parse(&data("flat.yaml"), Path::new("flat.yaml"), None, &defaults())
            .unwrap();
    assert_eq!(resolved.render(true), resolved.render(true));
    assert_eq!(resolved.render(false).text, resolved.clone().render(false).text);
}

#[parameterized(
    too_few_segments = { "dependencies: [\"com.example:lib\"]", "com.example:lib" },
    too_many_segments = { "dependencies: [\"a:b:c:d\"]", "a:b:c:d" },
    empty_segment = { "dependencies: [\"com.example::1.0\"]", "com.example::1.0" },
    blank_version = { "dependencies: [\"com.example:lib: \"]", "com.example:lib: " },
    non_string = { "dependencies: [42]", "42" },
    embedded_newline = { "dependencies: [\"com.example:lib\\nevil:1.0\"]", "com.example:lib\nevil:1.0" },
    embedded_space = { "dependencies: [\"com.example:my lib:1.0\"]", "com.example:my lib:1.0" },
    embedded_quote = { "dependencies: [\"com.example:lib':1.0\"]", "com.example:lib':1.0" },
)]
fn test_flat_malformed_dependency(dependencies: &str, offending: &str) {
    let text = format!("app: {{}}\nbuild: {{}}\n{}\n", dependencies);
    match ResolvedConfig::parse(&text, Path::new("inline.yaml"), None, &defaults()) {
        Err(ConfigError::MalformedDependency { entry, location }) => {
            assert_eq!(entry, offending);
            assert_eq!(location, "dependencies[0]");
        }
        other => panic!("expected MalformedDependency, got {other:?}"),
    }
}

#[parameterized(
    missing_version = { "androidx", "[\"core-ktx\"]", "core-ktx" },
    extra_segment = { "google_services", "[\"play-services-location:21.0.1:x\"]", "play-services-location:21.0.1:x" },
    empty_name = { "tensorflow", "[\":2.14.0\"]", ":2.14.0" },
    space_in_name = { "androidx", "[\"recycler view:1.3.0\"]", "recycler view:1.3.0" },
    quote_in_version = { "tensorflow", "[\"tensorflow-lite:2.14.0'\"]", "tensorflow-lite:2.14.0'" },
)]
fn test_declarative_malformed_shorthand(group: &str, list: &str, offending: &str) {
    let text = format!("project: {{}}\nvariants: []\nlibraries:\n  {}: {}\n", group, list);
    match ResolvedConfig::parse(&text, Path::new("inline.yaml"), None, &defaults()) {
        Err(ConfigError::MalformedDependency { entry, location }) => {
            assert_eq!(entry, offending);
            assert_eq!(location, format!("libraries.{}[0]", group));
        }
        other => panic!("expected MalformedDependency, got {other:?}"),
    }
}

#[parameterized(
    quoted_version_name = { "version:\n  name: '1.0\" // x'", "version.name" },
    spaced_build_type = { "build_types:\n  \"qa build\": {}", "build type 'qa build'" },
    quoted_proguard_file = {
        "build_types:\n  release:\n    proguard_files: [\"rules'.pro\"]",
        "build_types.release.proguard_files[0]"
    },
)]
fn test_values_that_would_break_the_manifest(fragment: &str, field: &str) {
    let text = format!("app: {{}}\nbuild: {{}}\n{}\n", fragment);
    match ResolvedConfig::parse(&text, Path::new("inline.yaml"), None, &defaults()) {
        Err(ConfigError::InvalidField { field: actual, .. }) => assert_eq!(actual, field),
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[parameterized(
    empty_mapping = { "{}" },
    only_app = { "app: {}" },
    only_variants = { "variants: []" },
    mixed_markers = { "app: {}\nvariants: []" },
    sequence = { "- app\n- build" },
    scalar = { "just text" },
)]
fn test_unrecognized_dialect(text: &str) {
    assert!(matches!(
        ResolvedConfig::parse(text, Path::new("inline.yaml"), None, &defaults()),
        Err(ConfigError::UnrecognizedDialect(_))
    ));
}

#[test]
fn test_update_writes_fresh_manifest() {
    let (dir, configurator) = project(&data("flat.yaml"));
    let resolved = configurator.load().unwrap();

    let outcome = configurator.update(&resolved, safe()).unwrap();

    assert_eq!(outcome, Outcome::Applied(ApplyKind::Fresh));
    let live = fs::read_to_string(dir.path().join("app/build.gradle")).unwrap();
    assert_eq!(live, resolved.render(false).text);
    assert_eq!(entries(&dir.path().join("app")), vec!["build.gradle"]);
}

#[test]
fn test_safe_update_is_idempotent() {
    let (dir, configurator) = project(&data("flat.yaml"));
    let resolved = configurator.load().unwrap();
    configurator.update(&resolved, safe()).unwrap();

    let outcome = configurator.update(&resolved, safe()).unwrap();

    assert_eq!(outcome, Outcome::Skipped);
    assert_eq!(entries(&dir.path().join("app")), vec!["build.gradle"]);
}

#[test]
fn test_safe_update_blocks_hand_edits() {
    let (dir, configurator) = project(&data("flat.yaml"));
    let resolved = configurator.load().unwrap();
    let live = dir.path().join("app/build.gradle");
    fs::create_dir_all(live.parent().unwrap()).unwrap();
    let hand_edited = format!("{}// local tweak\n", resolved.render(false).text);
    fs::write(&live, &hand_edited).unwrap();

    let outcome = configurator.update(&resolved, safe()).unwrap();

    match outcome {
        Outcome::Blocked { diff } => assert!(diff.contains("-// local tweak")),
        other => panic!("expected Blocked, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&live).unwrap(), hand_edited);
    assert_eq!(entries(&dir.path().join("app")), vec!["build.gradle"]);
}

#[test]
fn test_forced_update_keeps_backup_of_previous_content() {
    let (dir, configurator) = project(&data("declarative.yaml"));
    let resolved = configurator.load().unwrap();
    let live = dir.path().join("app/build.gradle");
    fs::create_dir_all(live.parent().unwrap()).unwrap();
    fs::write(&live, "// previous\n").unwrap();

    let outcome = configurator
        .update(
            &resolved,
            UpdateMode {
                safe: true,
                force: true,
            },
        )
        .unwrap();

    let backup = dir.path().join("app/build.gradle.backup");
    assert_eq!(outcome, Outcome::Applied(ApplyKind::Replaced { backup: backup.clone() }));
    assert_eq!(fs::read_to_string(&backup).unwrap(), "// previous\n");
    assert_eq!(fs::read_to_string(&live).unwrap(), resolved.render(false).text);
}

#[test]
fn test_plain_update_always_backs_up() {
    let (dir, configurator) = project(&data("flat.yaml"));
    let resolved = configurator.load().unwrap();
    configurator.update(&resolved, UpdateMode::default()).unwrap();
    let first = fs::read_to_string(dir.path().join("app/build.gradle")).unwrap();

    let outcome = configurator.update(&resolved, UpdateMode::default()).unwrap();

    assert!(matches!(outcome, Outcome::Applied(ApplyKind::Replaced { .. })));
    assert_eq!(
        fs::read_to_string(dir.path().join("app/build.gradle.backup")).unwrap(),
        first
    );
}

#[test]
fn test_kotlin_sources_add_plugin() {
    let (dir, configurator) = project(&data("flat.yaml"));
    let kotlin_dir = dir.path().join("app/src/main/java/com/example/neuron");
    fs::create_dir_all(&kotlin_dir).unwrap();
    fs::write(kotlin_dir.join("MainActivity.kt"), "class MainActivity").unwrap();

    let resolved = configurator.load().unwrap();
    configurator.update(&resolved, safe()).unwrap();

    let live = fs::read_to_string(dir.path().join("app/build.gradle")).unwrap();
    assert!(live.contains("    id 'org.jetbrains.kotlin.android'\n"));
    assert!(live.contains("    kotlinOptions {\n        jvmTarget = '1.8'\n    }\n"));
}

#[test]
fn test_forced_dialect_skips_detection() {
    let (_dir, configurator) = {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build-config.yaml");
        fs::write(&path, "project:\n  name: Forced\n").unwrap();
        let configurator = Configurator::new(&path, Some(DialectTag::Declarative), tool());
        (dir, configurator)
    };
    let resolved = configurator.load().unwrap();
    assert_eq!(resolved.dialect, DialectTag::Declarative);
    assert_eq!(resolved.app.name, "Forced");
}

//! Gradle manifest rendering
//!
//! [`render`] is a pure function of the resolved model: identical inputs always
//! produce byte-identical text, which is what makes diff-based safe updates
//! meaningful. Whether the Kotlin plugin is included is decided by [`probe`]
//! and passed in.

pub mod probe;

use crate::model::{AppModel, BuildType, BuildTypes, ResolvedDependency};

pub use probe::{probe_kotlin, KotlinProbe};

/// Baseline ProGuard file shipped with the Android Gradle plugin
pub const DEFAULT_PROGUARD_FILE: &str = "proguard-android-optimize.txt";

/// Plugin id added when the project uses Kotlin
pub const KOTLIN_PLUGIN_ID: &str = "org.jetbrains.kotlin.android";

const JAVA_VERSION: &str = "JavaVersion.VERSION_1_8";
const JVM_TARGET: &str = "1.8";

const HEADER: &str = "// Auto-generated by gradlecfg\n\
                      // Do not edit manually - changes will be overwritten\n";

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str("    ");
    }
    out.push_str(text);
    out.push('\n');
}

/// Renders the full `build.gradle` text
pub fn render(
    app: &AppModel,
    build_types: &BuildTypes,
    dependencies: &[ResolvedDependency],
    include_kotlin_plugin: bool,
) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    line(&mut out, 0, "plugins {");
    line(&mut out, 1, "id 'com.android.application'");
    if include_kotlin_plugin {
        line(&mut out, 1, &format!("id '{}'", KOTLIN_PLUGIN_ID));
    }
    line(&mut out, 0, "}");
    out.push('\n');

    line(&mut out, 0, "android {");
    line(&mut out, 1, &format!("namespace '{}'", app.package_id));
    line(&mut out, 1, &format!("compileSdk {}", app.compile_sdk));
    out.push('\n');

    line(&mut out, 1, "defaultConfig {");
    line(&mut out, 2, &format!("applicationId \"{}\"", app.package_id));
    line(&mut out, 2, &format!("minSdk {}", app.min_sdk));
    line(&mut out, 2, &format!("targetSdk {}", app.target_sdk));
    line(&mut out, 2, &format!("versionCode {}", app.version_code));
    line(&mut out, 2, &format!("versionName \"{}\"", app.version_name));
    line(&mut out, 1, "}");
    out.push('\n');

    line(&mut out, 1, "buildTypes {");
    for build_type in build_types.effective() {
        render_build_type(&mut out, &build_type);
    }
    line(&mut out, 1, "}");
    out.push('\n');

    line(&mut out, 1, "compileOptions {");
    line(&mut out, 2, &format!("sourceCompatibility {}", JAVA_VERSION));
    line(&mut out, 2, &format!("targetCompatibility {}", JAVA_VERSION));
    line(&mut out, 1, "}");

    if include_kotlin_plugin {
        out.push('\n');
        line(&mut out, 1, "kotlinOptions {");
        line(&mut out, 2, &format!("jvmTarget = '{}'", JVM_TARGET));
        line(&mut out, 1, "}");
    }
    line(&mut out, 0, "}");
    out.push('\n');

    line(&mut out, 0, "dependencies {");
    for dependency in dependencies {
        line(&mut out, 1, &format!("implementation '{}'", dependency));
    }
    line(&mut out, 0, "}");

    out
}

fn render_build_type(out: &mut String, build_type: &BuildType) {
    line(out, 2, &format!("{} {{", build_type.name));
    line(out, 3, &format!("debuggable {}", build_type.debuggable));
    line(out, 3, &format!("minifyEnabled {}", build_type.minify_enabled));
    if build_type.shrink_resources {
        line(out, 3, "shrinkResources true");
    }
    if let Some(directive) = proguard_directive(build_type) {
        line(out, 3, &directive);
    }
    line(out, 2, "}");
}

/// Explicit files follow the baseline; `release` alone gets the baseline by default
fn proguard_directive(build_type: &BuildType) -> Option<String> {
    let baseline = format!("proguardFiles getDefaultProguardFile('{}')", DEFAULT_PROGUARD_FILE);
    if !build_type.proguard_files.is_empty() {
        let extra: String = build_type
            .proguard_files
            .iter()
            .map(|f| format!(", '{}'", f))
            .collect();
        Some(format!("{}{}", baseline, extra))
    } else if build_type.name == "release" {
        Some(baseline)
    } else {
        None
    }
}

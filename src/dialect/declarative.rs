//! Declarative dialect: `project` / `versioning` / `android` / `variants` / `libraries`

use super::{
    bool_field, check_literal, render_value, section, sequence, string_field, string_list_field,
    u32_field, AppDefaults, DEFAULT_COMPILE_SDK, DEFAULT_MIN_SDK, DEFAULT_TARGET_SDK,
    DEFAULT_VERSION_CODE, DEFAULT_VERSION_NAME,
};
use crate::coordinates::EcosystemGroup;
use crate::error::{ConfigError, Result};
use crate::model::{AppModel, BuildType, BuildTypes, DependencyDeclaration};
use serde_yaml::{Mapping, Value};
use tracing::warn;

pub(super) fn app(root: &Mapping, defaults: &AppDefaults) -> Result<AppModel> {
    let project = section(root, "project")?;
    let versioning = section(root, "versioning")?;
    let android = section(root, "android")?;
    let version_name = string_field(
        versioning,
        "version_name",
        "versioning.version_name",
        DEFAULT_VERSION_NAME,
    )?;
    check_literal("versioning.version_name", &version_name)?;

    Ok(AppModel {
        name: string_field(project, "name", "project.name", &defaults.name)?,
        package_id: string_field(project, "id", "project.id", &defaults.package_id)?,
        version_code: u32_field(
            versioning,
            "version_code",
            "versioning.version_code",
            DEFAULT_VERSION_CODE,
        )?,
        version_name,
        compile_sdk: u32_field(android, "compileSdk", "android.compileSdk", DEFAULT_COMPILE_SDK)?,
        min_sdk: u32_field(android, "minSdk", "android.minSdk", DEFAULT_MIN_SDK)?,
        target_sdk: u32_field(android, "targetSdk", "android.targetSdk", DEFAULT_TARGET_SDK)?,
    })
}

pub(super) fn build_types(root: &Mapping, app: &AppModel) -> Result<BuildTypes> {
    let mut types = BuildTypes::new();

    for (i, variant) in sequence(root, "variants", "variants")?.iter().enumerate() {
        let path = format!("variants[{}]", i);
        let variant = variant
            .as_mapping()
            .ok_or_else(|| ConfigError::invalid(&path, "expected a mapping"))?;

        let name = match variant.get("name") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => {
                return Err(ConfigError::invalid(
                    format!("{}.name", path),
                    "every variant needs a non-empty name",
                ))
            }
        };
        let config_path = format!("{}.config", path);
        let config = section(variant, "config")
            .map_err(|_| ConfigError::invalid(&config_path, "expected a mapping"))?;
        let output = section(variant, "output")
            .map_err(|_| ConfigError::invalid(format!("{}.output", path), "expected a mapping"))?;

        let mut build_type = BuildType::new(name.clone());
        build_type.debuggable =
            bool_field(config, "debuggable", &format!("{}.debuggable", config_path), false)?;
        build_type.minify_enabled =
            bool_field(config, "minifyEnabled", &format!("{}.minifyEnabled", config_path), false)?;
        build_type.shrink_resources = bool_field(
            config,
            "shrinkResources",
            &format!("{}.shrinkResources", config_path),
            false,
        )?;
        build_type.proguard_files =
            string_list_field(config, "proguardFiles", &format!("{}.proguardFiles", config_path))?;
        build_type.output_name = Some(string_field(
            output,
            "name",
            &format!("{}.output.name", path),
            &format!("{}-{}", app.name, name),
        )?);
        types.insert(build_type)?;
    }

    Ok(types)
}

pub(super) fn dependencies(root: &Mapping) -> Result<Vec<DependencyDeclaration>> {
    let Some(libraries) = section(root, "libraries")? else {
        return Ok(Vec::new());
    };

    for key in libraries.keys() {
        let known = key
            .as_str()
            .map(|k| EcosystemGroup::from_key(k).is_some())
            .unwrap_or(false);
        if !known {
            warn!(group = %render_value(key), "Ignoring unknown library group");
        }
    }

    let mut declarations = Vec::new();
    for group in EcosystemGroup::VISIT_ORDER {
        let group_path = format!("libraries.{}", group.key());
        for (i, entry) in sequence(libraries, group.key(), &group_path)?.iter().enumerate() {
            let location = format!("{}[{}]", group_path, i);
            let declaration = match entry {
                Value::String(s) => DependencyDeclaration::shorthand(group, s, &location)?,
                other => return Err(ConfigError::malformed(render_value(other), location)),
            };
            declarations.push(declaration);
        }
    }

    Ok(declarations)
}

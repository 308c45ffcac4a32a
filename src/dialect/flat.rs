//! Flat dialect: `app` / `version` / `build` / `build_types` / `dependencies`

use super::{
    bool_field, check_literal, render_value, section, sequence, string_field, string_list_field,
    u32_field, AppDefaults, DEFAULT_COMPILE_SDK, DEFAULT_MIN_SDK, DEFAULT_TARGET_SDK,
    DEFAULT_VERSION_CODE, DEFAULT_VERSION_NAME,
};
use crate::error::{ConfigError, Result};
use crate::model::{AppModel, BuildType, BuildTypes, Coordinate, DependencyDeclaration};
use serde_yaml::{Mapping, Value};

pub(super) fn app(root: &Mapping, defaults: &AppDefaults) -> Result<AppModel> {
    let app = section(root, "app")?;
    let version = section(root, "version")?;
    let build = section(root, "build")?;
    let version_name = string_field(version, "name", "version.name", DEFAULT_VERSION_NAME)?;
    check_literal("version.name", &version_name)?;

    Ok(AppModel {
        name: string_field(app, "name", "app.name", &defaults.name)?,
        package_id: string_field(app, "package", "app.package", &defaults.package_id)?,
        version_code: u32_field(version, "code", "version.code", DEFAULT_VERSION_CODE)?,
        version_name,
        compile_sdk: u32_field(build, "compile_sdk", "build.compile_sdk", DEFAULT_COMPILE_SDK)?,
        min_sdk: u32_field(build, "min_sdk", "build.min_sdk", DEFAULT_MIN_SDK)?,
        target_sdk: u32_field(build, "target_sdk", "build.target_sdk", DEFAULT_TARGET_SDK)?,
    })
}

pub(super) fn build_types(root: &Mapping) -> Result<BuildTypes> {
    let mut types = BuildTypes::new();
    let Some(declared) = section(root, "build_types")? else {
        return Ok(types);
    };

    for (key, value) in declared {
        let name = match key {
            Value::String(s) => s.clone(),
            other => {
                return Err(ConfigError::invalid(
                    format!("build_types.{}", render_value(other)),
                    "build type names must be strings",
                ))
            }
        };
        let path = format!("build_types.{}", name);
        let config = match value {
            Value::Null => None,
            Value::Mapping(m) => Some(m),
            _ => return Err(ConfigError::invalid(path, "expected a mapping")),
        };

        let mut build_type = BuildType::new(name);
        build_type.enabled = bool_field(config, "enabled", &format!("{}.enabled", path), true)?;
        build_type.debuggable =
            bool_field(config, "debuggable", &format!("{}.debuggable", path), false)?;
        build_type.minify_enabled =
            bool_field(config, "minify_enabled", &format!("{}.minify_enabled", path), false)?;
        build_type.shrink_resources = bool_field(
            config,
            "shrink_resources",
            &format!("{}.shrink_resources", path),
            false,
        )?;
        build_type.proguard_files =
            string_list_field(config, "proguard_files", &format!("{}.proguard_files", path))?;
        types.insert(build_type)?;
    }

    Ok(types)
}

pub(super) fn dependencies(root: &Mapping) -> Result<Vec<DependencyDeclaration>> {
    sequence(root, "dependencies", "dependencies")?
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let location = format!("dependencies[{}]", i);
            match entry {
                Value::String(s) => {
                    Coordinate::parse(s, &location).map(DependencyDeclaration::Qualified)
                }
                other => Err(ConfigError::malformed(render_value(other), location)),
            }
        })
        .collect()
}

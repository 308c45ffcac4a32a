//! Built-in self-check against two bundled configuration documents
//!
//! Each document runs through the whole pipeline in memory. The resolved
//! dependency list must match a fixed expected sequence, and rendering must be
//! repeatable byte for byte.

use crate::dialect::{AppDefaults, DialectTag};
use crate::error::{ConfigError, Result};
use crate::pipeline::ResolvedConfig;
use std::path::Path;
use tracing::{debug, info};

struct BundledDocument {
    name: &'static str,
    text: &'static str,
    dialect: DialectTag,
    expected: &'static [&'static str],
}

const DOCUMENTS: &[BundledDocument] = &[
    BundledDocument {
        name: "selfcheck/flat.yaml",
        text: include_str!("../fixtures/selfcheck/flat.yaml"),
        dialect: DialectTag::Flat,
        expected: &[
            "androidx.appcompat:appcompat:1.6.1",
            "com.google.android.material:material:1.11.0",
            "androidx.work:work-runtime:2.9.0",
            "org.tensorflow:tensorflow-lite:2.14.0",
        ],
    },
    BundledDocument {
        name: "selfcheck/declarative.yaml",
        text: include_str!("../fixtures/selfcheck/declarative.yaml"),
        dialect: DialectTag::Declarative,
        expected: &[
            "androidx.recyclerview:recyclerview:1.3.0",
            "com.google.android.material:material:1.9.0",
            "androidx.core:core-ktx:1.12.0",
            "com.google.android.gms:play-services-location:21.0.1",
            "org.tensorflow:tensorflow-lite:2.14.0",
        ],
    },
];

/// Summary of one verified document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedDocument {
    pub name: &'static str,
    pub dialect: DialectTag,
    pub dependencies: usize,
}

/// Runs every bundled document; the first discrepancy is returned as an error
pub fn run(defaults: &AppDefaults) -> Result<Vec<CheckedDocument>> {
    DOCUMENTS.iter().map(|doc| check(doc, defaults)).collect()
}

fn check(doc: &BundledDocument, defaults: &AppDefaults) -> Result<CheckedDocument> {
    debug!(document = doc.name, "Running self-check");
    let resolved = ResolvedConfig::parse(doc.text, Path::new(doc.name), None, defaults)?;

    if resolved.dialect != doc.dialect {
        return Err(ConfigError::SelfCheckMismatch {
            document: format!("{} (dialect)", doc.name),
            expected: vec![doc.dialect.to_string()],
            actual: vec![resolved.dialect.to_string()],
        });
    }

    let actual: Vec<String> = resolved.dependencies.iter().map(ToString::to_string).collect();
    if actual != doc.expected {
        return Err(ConfigError::SelfCheckMismatch {
            document: doc.name.to_string(),
            expected: doc.expected.iter().map(|s| s.to_string()).collect(),
            actual,
        });
    }

    for include_kotlin_plugin in [false, true] {
        let first = resolved.render(include_kotlin_plugin);
        let second = resolved.render(include_kotlin_plugin);
        if first != second {
            return Err(ConfigError::SelfCheckMismatch {
                document: format!("{} (render determinism)", doc.name),
                expected: vec![first.text],
                actual: vec![second.text],
            });
        }
    }

    info!(document = doc.name, dependencies = actual.len(), "Self-check passed");
    Ok(CheckedDocument {
        name: doc.name,
        dialect: resolved.dialect,
        dependencies: actual.len(),
    })
}

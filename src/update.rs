//! Guarded replacement of the live manifest
//!
//! A freshly rendered manifest is first written to a [`StagedManifest`] next
//! to the live file. [`SafeUpdater::apply`] consumes the staged file and either
//! renames it over the live manifest or discards it; the temporary file is
//! removed on every exit path, including errors. Whenever a live file is
//! overwritten, a sibling backup is written first.

use crate::error::{ConfigError, Result};
use similar::TextDiff;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const DIFF_CONTEXT_LINES: usize = 3;

/// Manifest text written to a temporary file beside its destination
///
/// Dropping the value deletes the file.
#[derive(Debug)]
pub struct StagedManifest {
    file: NamedTempFile,
}

impl StagedManifest {
    /// Stages `content` in the directory that holds (or will hold) `live`
    pub fn write_beside(live: &Path, content: &str) -> Result<Self> {
        let dir = live
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;

        let mut file = tempfile::Builder::new()
            .prefix(".gradlecfg-")
            .suffix(".staged")
            .tempfile_in(dir)
            .map_err(|e| ConfigError::io(dir, e))?;
        let path = file.path().to_path_buf();
        file.write_all(content.as_bytes())
            .map_err(|e| ConfigError::io(&path, e))?;
        file.flush().map_err(|e| ConfigError::io(&path, e))?;

        debug!(path = %file.path().display(), bytes = content.len(), "Staged manifest");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn read(&self) -> Result<Vec<u8>> {
        fs::read(self.path()).map_err(|e| ConfigError::io(self.path(), e))
    }

    /// Atomically renames the staged file to `live`
    ///
    /// The live file keeps its permissions. On failure the staged file is
    /// still removed.
    fn promote(self, live: &Path) -> Result<()> {
        let permissions = match fs::metadata(live) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(_) => fresh_permissions(),
        };
        if let Some(permissions) = permissions {
            self.file
                .as_file()
                .set_permissions(permissions)
                .map_err(|e| ConfigError::io(self.path(), e))?;
        }
        self.file
            .persist(live)
            .map_err(|e| ConfigError::io(live, e.error))?;
        Ok(())
    }

    fn discard(self) {
        let path = self.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove staged manifest");
        }
    }
}

/// Safe-mode switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateMode {
    /// Diff against the live manifest before replacing it
    pub safe: bool,
    /// Replace even when the diff is non-empty
    pub force: bool,
}

/// How a manifest was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyKind {
    /// No live manifest existed
    Fresh,
    /// The live manifest was replaced after being copied to `backup`
    Replaced { backup: PathBuf },
}

/// Result of a safe-update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(ApplyKind),
    /// Generated manifest is byte-identical to the live one; nothing written
    Skipped,
    /// Safe mode found changes and `force` was not given; nothing written
    Blocked { diff: String },
}

impl Outcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Outcome::Blocked { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied(ApplyKind::Fresh) => write!(f, "applied (new manifest)"),
            Outcome::Applied(ApplyKind::Replaced { backup }) => {
                write!(f, "applied (previous manifest saved to {})", backup.display())
            }
            Outcome::Skipped => write!(f, "skipped (no changes)"),
            Outcome::Blocked { .. } => write!(f, "blocked (destructive update needs --force)"),
        }
    }
}

/// Applies staged manifests to a live path
#[derive(Debug, Clone)]
pub struct SafeUpdater {
    backup_suffix: String,
}

impl SafeUpdater {
    pub fn new(backup_suffix: impl Into<String>) -> Self {
        Self {
            backup_suffix: backup_suffix.into(),
        }
    }

    pub fn backup_path(&self, live: &Path) -> PathBuf {
        let mut name = live
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(&self.backup_suffix);
        live.with_file_name(name)
    }

    /// Promotes or discards `staged` according to `mode`
    ///
    /// The staged file is renamed into place or deleted, including when an
    /// error is returned.
    pub fn apply(&self, staged: StagedManifest, live: &Path, mode: UpdateMode) -> Result<Outcome> {
        if !live.exists() {
            staged.promote(live)?;
            info!(path = %live.display(), "Wrote new manifest");
            return Ok(Outcome::Applied(ApplyKind::Fresh));
        }
        if !mode.safe {
            return self.replace(staged, live);
        }

        let generated = staged.read()?;
        let current = fs::read(live).map_err(|e| ConfigError::io(live, e))?;
        if current == generated {
            info!(path = %live.display(), "Manifest unchanged");
            staged.discard();
            Ok(Outcome::Skipped)
        } else if mode.force {
            debug!(path = %live.display(), "Forcing replacement despite differences");
            self.replace(staged, live)
        } else {
            let diff = unified_diff(live, &current, &generated);
            warn!(path = %live.display(), "Refusing to overwrite manifest with local changes");
            staged.discard();
            Ok(Outcome::Blocked { diff })
        }
    }

    fn replace(&self, staged: StagedManifest, live: &Path) -> Result<Outcome> {
        let backup = self.backup_path(live);
        fs::copy(live, &backup).map_err(|e| ConfigError::io(&backup, e))?;
        info!(backup = %backup.display(), "Backed up live manifest");

        staged.promote(live)?;
        info!(path = %live.display(), "Replaced manifest");
        Ok(Outcome::Applied(ApplyKind::Replaced { backup }))
    }
}

#[cfg(unix)]
fn fresh_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn fresh_permissions() -> Option<fs::Permissions> {
    None
}

/// Unified diff from the live manifest to the generated one
pub fn unified_diff(live: &Path, current: &[u8], generated: &[u8]) -> String {
    let old = String::from_utf8_lossy(current);
    let new = String::from_utf8_lossy(generated);
    let diff = TextDiff::from_lines(&*old, &*new);
    let rendered = diff
        .unified_diff()
        .context_radius(DIFF_CONTEXT_LINES)
        .header(
            &format!("a/{}", live.display()),
            &format!("b/{} (generated)", live.display()),
        )
        .to_string();
    rendered
}

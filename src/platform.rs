//! Per-OS-family launcher and PATH handling.
//!
//! Orchestration code only talks to [`Platform`]; adding a family means adding
//! an implementation here.

use crate::error::{FsContext, InstallError};
use crate::types::{OsFamily, PathEntry};
use std::fs;
use std::path::{Path, PathBuf};

pub trait Platform {
    fn family(&self) -> OsFamily;

    /// File name of the launcher for `project` on this platform.
    fn launcher_file_name(&self, project: &str) -> String;

    /// Script text that runs `artifact` through `runtime`, forwarding every
    /// caller argument unchanged.
    fn render_launcher(&self, runtime: &[String], artifact: &Path) -> String;

    /// Make `launcher` reachable by name, using `link` where the platform supports it.
    fn publish_entry(&self, launcher: &Path, link: &Path) -> Result<PathEntry, InstallError>;
}

pub fn platform_for(family: OsFamily) -> Box<dyn Platform> {
    match family {
        OsFamily::Posix => Box::new(PosixPlatform),
        OsFamily::Windows => Box::new(WindowsPlatform),
    }
}

/// Writes the launcher for `artifact_name` inside `dir` and returns its path.
pub fn generate_launcher(
    platform: &dyn Platform,
    dir: &Path,
    project: &str,
    artifact_name: &str,
    runtime: &[String],
) -> Result<PathBuf, InstallError> {
    let launcher = dir.join(platform.launcher_file_name(project));
    let script = platform.render_launcher(runtime, &dir.join(artifact_name));

    fs::write(&launcher, script).fs_context("could not write launcher", &launcher)?;
    tracing::info!("Wrote launcher {}", launcher.display());
    Ok(launcher)
}

pub struct PosixPlatform;

impl Platform for PosixPlatform {
    fn family(&self) -> OsFamily {
        OsFamily::Posix
    }

    fn launcher_file_name(&self, project: &str) -> String {
        project.to_string()
    }

    fn render_launcher(&self, runtime: &[String], artifact: &Path) -> String {
        let words: Vec<String> = runtime
            .iter()
            .map(|w| sh_quote(w))
            .chain(std::iter::once(sh_quote(&artifact.to_string_lossy())))
            .collect();
        format!("#!/bin/sh\nexec {} \"$@\"\n", words.join(" "))
    }

    fn publish_entry(&self, launcher: &Path, link: &Path) -> Result<PathEntry, InstallError> {
        make_executable(launcher)?;
        publish_path_entry(launcher, link)?;
        Ok(PathEntry::Linked {
            link: link.to_path_buf(),
            target: launcher.to_path_buf(),
        })
    }
}

pub struct WindowsPlatform;

impl Platform for WindowsPlatform {
    fn family(&self) -> OsFamily {
        OsFamily::Windows
    }

    fn launcher_file_name(&self, project: &str) -> String {
        format!("{}.bat", project)
    }

    fn render_launcher(&self, runtime: &[String], artifact: &Path) -> String {
        let words: Vec<String> = runtime
            .iter()
            .map(|w| bat_quote(w))
            .chain(std::iter::once(bat_quote(&artifact.to_string_lossy())))
            .collect();
        format!("@echo off\r\n{} %*\r\n", words.join(" "))
    }

    fn publish_entry(&self, launcher: &Path, _link: &Path) -> Result<PathEntry, InstallError> {
        Ok(PathEntry::Manual {
            launcher: launcher.to_path_buf(),
        })
    }
}

/// Single-quote a word for POSIX sh. Embedded quotes become `'\''`.
fn sh_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// Double-quote a word for cmd.exe; `%` is doubled so it is not expanded.
fn bat_quote(word: &str) -> String {
    format!("\"{}\"", word.replace('%', "%%"))
}

#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)
        .fs_context("could not read permissions of", path)?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).fs_context("could not mark executable", path)
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<(), InstallError> {
    Err(InstallError::UnsupportedPlatform(
        "executable bits only exist on POSIX systems".to_string(),
    ))
}

/// Replace whatever sits at `link` with a symlink to `launcher`.
///
/// Broken symlinks count as existing. The parent of `link` must already exist.
#[cfg(unix)]
pub fn publish_path_entry(launcher: &Path, link: &Path) -> Result<(), InstallError> {
    if let Ok(meta) = fs::symlink_metadata(link) {
        if meta.is_dir() {
            fs::remove_dir(link).fs_context("could not remove existing directory at", link)?;
        } else {
            fs::remove_file(link).fs_context("could not remove existing entry at", link)?;
        }
        tracing::debug!("Removed existing entry at {}", link.display());
    }

    std::os::unix::fs::symlink(launcher, link).fs_context("could not create symlink", link)?;
    tracing::info!("Created symlink {} -> {}", link.display(), launcher.display());
    Ok(())
}

#[cfg(not(unix))]
pub fn publish_path_entry(_launcher: &Path, _link: &Path) -> Result<(), InstallError> {
    Err(InstallError::UnsupportedPlatform(
        "symlinked PATH entries are only created on POSIX systems".to_string(),
    ))
}

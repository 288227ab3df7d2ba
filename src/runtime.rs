//! Pre-flight checks that the installed artifact can actually run here.

use crate::error::InstallError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;

pub trait EnvironmentCheck {
    fn name(&self) -> String;

    fn check(&self) -> Result<(), InstallError>;
}

/// Requires a `java` of at least `minimum_major`, looked up in `$JAVA_HOME/bin`
/// first and then along `PATH`.
pub struct JavaRuntimeCheck {
    pub minimum_major: u32,
}

impl EnvironmentCheck for JavaRuntimeCheck {
    fn name(&self) -> String {
        format!("Java {}+", self.minimum_major)
    }

    fn check(&self) -> Result<(), InstallError> {
        let path = std::env::var_os("PATH");
        let launched = first_java_on_path(path.clone());
        let candidates = java_candidates(std::env::var_os("JAVA_HOME").map(PathBuf::from), path);

        for candidate in candidates {
            match probe_java_major(&candidate) {
                Some(major) if major >= self.minimum_major => {
                    tracing::info!("Found Java {} at {}", major, candidate.display());
                    if !runs_from_path(&candidate, launched.as_deref()) {
                        // The launcher calls plain `java`, so only PATH matters at run time
                        tracing::warn!(
                            "Java {} at {} satisfies the check, but the launcher will run {}",
                            major,
                            candidate.display(),
                            launched
                                .as_deref()
                                .map(|p| p.display().to_string())
                                .unwrap_or_else(|| "no java (none on PATH)".to_string())
                        );
                    }
                    return Ok(());
                }
                Some(major) => {
                    tracing::debug!("Skipping Java {} at {}", major, candidate.display());
                }
                None => {
                    tracing::debug!("Could not query version of {}", candidate.display());
                }
            }
        }

        Err(InstallError::Environment(format!(
            "Java {} or newer was not found in JAVA_HOME or PATH",
            self.minimum_major
        )))
    }
}

fn java_binary_name() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

fn java_candidates(java_home: Option<PathBuf>, path: Option<std::ffi::OsString>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(home) = java_home {
        candidates.push(home.join("bin").join(java_binary_name()));
    }

    if let Some(path) = path {
        for dir in std::env::split_paths(&path) {
            candidates.push(dir.join(java_binary_name()));
        }
    }

    candidates.retain(|c| c.is_file());
    candidates.dedup();
    candidates
}

/// The `java` a launcher resolves when it runs plain `java`.
fn first_java_on_path(path: Option<std::ffi::OsString>) -> Option<PathBuf> {
    java_candidates(None, path).into_iter().next()
}

fn runs_from_path(checked: &Path, launched: Option<&Path>) -> bool {
    launched == Some(checked)
}

fn probe_java_major(java: &Path) -> Option<u32> {
    let output = Command::new(java).arg("-version").output().ok()?;
    // `java -version` reports on stderr
    let text = String::from_utf8_lossy(&output.stderr);
    parse_java_major(&text)
}

/// Extract the major version from `java -version` output.
///
/// Handles both the legacy `1.8.0_292` scheme and the modern `17.0.2` one.
pub fn parse_java_major(output: &str) -> Option<u32> {
    let re = Regex::new(r#"version "([^"]+)""#).ok()?;
    let version = re.captures(output)?.get(1)?.as_str();

    let mut parts = version.split(|c: char| !c.is_ascii_digit());
    let first: u32 = parts.next()?.parse().ok()?;
    if first == 1 {
        parts.next()?.parse().ok()
    } else {
        Some(first)
    }
}

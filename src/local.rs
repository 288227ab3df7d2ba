//! Building a distribution from a local checkout of the project.

use crate::error::InstallError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where Gradle's `installDist` leaves the distribution for `project`.
pub fn distribution_dir(project_dir: &Path, project: &str) -> PathBuf {
    project_dir.join("build").join("install").join(project)
}

/// Run `gradlew :installDist` in `project_dir` and return the distribution directory.
pub fn build_distribution(project_dir: &Path, project: &str) -> Result<PathBuf, InstallError> {
    if !project_dir.join("build.gradle.kts").is_file() {
        return Err(InstallError::Environment(format!(
            "{} is not a Gradle project directory (no build.gradle.kts)",
            project_dir.display()
        )));
    }

    let wrapper = if cfg!(windows) {
        project_dir.join("gradlew.bat")
    } else {
        project_dir.join("gradlew")
    };

    tracing::info!("Running {} :installDist", wrapper.display());
    let status = Command::new(&wrapper)
        .arg(":installDist")
        .current_dir(project_dir)
        .status()
        .map_err(|e| {
            InstallError::Environment(format!("could not run {}: {}", wrapper.display(), e))
        })?;

    if !status.success() {
        return Err(InstallError::Environment(format!(
            "{} :installDist failed with {}",
            wrapper.display(),
            status
        )));
    }

    Ok(distribution_dir(project_dir, project))
}

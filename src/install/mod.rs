//! Installation module
//!
//! This module provides functionality for:
//! - Resolving the latest release and downloading its artifact
//! - Clearing stale top-level files from the install directory
//! - Writing the launcher and publishing it on PATH
//! - Installing from a locally built distribution

pub mod github;

use crate::download::download_artifact;
use crate::error::{FsContext, InstallError};
use crate::platform::{generate_launcher, platform_for, Platform};
use crate::runtime::{EnvironmentCheck, JavaRuntimeCheck};
use crate::types::{InstallReport, InstallerSettings, OsFamily};
use github::ReleaseClient;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub struct Installer {
    settings: InstallerSettings,
    client: ReleaseClient,
    platform: Box<dyn Platform>,
    checks: Vec<Box<dyn EnvironmentCheck>>,
    show_progress: bool,
}

impl Installer {
    pub fn new(settings: InstallerSettings, platform: Box<dyn Platform>) -> Self {
        let client = ReleaseClient::new(&settings.api_base, &settings.download_base);
        Self {
            settings,
            client,
            platform,
            checks: Vec::new(),
            show_progress: false,
        }
    }

    /// Installer for the host OS family, wired up from settings and the environment.
    pub fn for_host(settings: InstallerSettings) -> Self {
        let check_runtime = settings.check_runtime;
        let min_java = settings.min_java_version;

        let mut installer = Self::new(settings, platform_for(OsFamily::host()));
        installer.client = installer
            .client
            .with_token(std::env::var("GITHUB_TOKEN").ok());

        if check_runtime {
            installer = installer.with_check(Box::new(JavaRuntimeCheck {
                minimum_major: min_java,
            }));
        }
        installer
    }

    pub fn with_check(mut self, check: Box<dyn EnvironmentCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn settings(&self) -> &InstallerSettings {
        &self.settings
    }

    /// Bring the install directory up to the latest release.
    ///
    /// Nothing under the install directory is touched until the release has
    /// been resolved. Any failure aborts the run without rollback.
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        let s = &self.settings;
        let install_dir = s.install_dir();
        tracing::debug!(
            "Installing {} into {} for {:?}",
            s.project,
            install_dir.display(),
            self.platform.family()
        );

        let release = self
            .client
            .resolve_latest_release(&s.owner, &s.repo, s.release_source)
            .await?;
        let artifact_name = s.artifact_name(&release);
        let url = self
            .client
            .artifact_url(&s.owner, &s.repo, &release, &artifact_name)?;

        if self.show_progress {
            eprintln!("Downloading {} {}...", s.project, release);
        }

        clear_install_directory(&install_dir)?;

        let artifact = install_dir.join(&artifact_name);
        download_artifact(self.client.http(), url.as_str(), &artifact, self.show_progress).await?;

        self.run_checks()?;

        let launcher = generate_launcher(
            self.platform.as_ref(),
            &install_dir,
            &s.project,
            &artifact_name,
            &s.runtime_command,
        )?;
        let entry = self.platform.publish_entry(&launcher, &s.link_path())?;

        tracing::info!("Installed {} {} to {}", s.project, release, install_dir.display());
        Ok(InstallReport {
            release,
            artifact,
            launcher,
            entry,
        })
    }

    /// Install a Gradle `installDist` layout (`bin/` and `lib/`) from `dist_dir`.
    ///
    /// `bin/` and `lib/` in the install directory are replaced wholesale; other
    /// subdirectories are left alone.
    pub fn install_local(&self, dist_dir: &Path) -> Result<InstallReport, InstallError> {
        let s = &self.settings;
        let install_dir = s.install_dir();
        let launcher_name = self.platform.launcher_file_name(&s.project);

        let dist_launcher = dist_dir.join("bin").join(&launcher_name);
        if !dist_launcher.is_file() {
            return Err(InstallError::NotFound(format!(
                "no launcher at {}; is {} a built distribution?",
                dist_launcher.display(),
                dist_dir.display()
            )));
        }

        clear_install_directory(&install_dir)?;

        for sub in ["bin", "lib"] {
            let target = install_dir.join(sub);
            if target.exists() {
                fs::remove_dir_all(&target).fs_context("could not remove", &target)?;
            }
            let source = dist_dir.join(sub);
            if source.is_dir() {
                copy_tree(&source, &target)?;
            }
        }

        self.run_checks()?;

        let launcher = install_dir.join("bin").join(&launcher_name);
        let entry = self.platform.publish_entry(&launcher, &s.link_path())?;

        tracing::info!("Installed local build of {} to {}", s.project, install_dir.display());
        Ok(InstallReport {
            release: "local build".to_string(),
            artifact: install_dir.join("lib"),
            launcher,
            entry,
        })
    }

    fn run_checks(&self) -> Result<(), InstallError> {
        for check in &self.checks {
            tracing::debug!("Running environment check: {}", check.name());
            check.check()?;
        }
        Ok(())
    }
}

/// Remove every top-level file in `dir`, creating it if needed.
///
/// Subdirectories (and symlinks to directories) are skipped entirely so an
/// unpacked distribution survives; everything else at the top level goes.
pub fn clear_install_directory(dir: &Path) -> Result<(), InstallError> {
    fs::create_dir_all(dir).fs_context("could not create", dir)?;

    let entries = fs::read_dir(dir).fs_context("could not list", dir)?;
    for entry in entries {
        let entry = entry.fs_context("could not list", dir)?;
        let path = entry.path();
        let file_type = entry.file_type().fs_context("could not inspect", &path)?;

        // `is_dir` follows the link, so links to directories are kept too
        if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
            tracing::debug!("Keeping directory {}", path.display());
            continue;
        }

        fs::remove_file(&path).fs_context("could not remove", &path)?;
        tracing::debug!("Removed {}", path.display());
    }

    Ok(())
}

fn copy_tree(source: &Path, target: &Path) -> Result<(), InstallError> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            InstallError::fs("could not walk", &path, e.into())
        })?;
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).fs_context("could not create", &dest)?;
        } else {
            fs::copy(entry.path(), &dest).fs_context("could not copy to", &dest)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PosixPlatform, WindowsPlatform};
    use crate::types::PathEntry;
    use std::collections::BTreeSet;

    fn top_level_files(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().unwrap().is_file())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_clear_creates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a").join(".sculk");
        clear_install_directory(&dir).unwrap();
        assert!(dir.is_dir());
        clear_install_directory(&dir).unwrap();
    }

    #[test]
    fn test_clear_removes_files_but_keeps_subdirectories() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path();
        fs::write(dir.join("sculk-latest.jar"), "old").unwrap();
        fs::write(dir.join("sculk"), "old launcher").unwrap();
        fs::create_dir_all(dir.join("lib")).unwrap();
        fs::write(dir.join("lib").join("dep.jar"), "keep").unwrap();
        fs::create_dir_all(dir.join("bin")).unwrap();
        fs::write(dir.join("bin").join("sculk"), "keep").unwrap();

        clear_install_directory(dir).unwrap();

        assert!(top_level_files(dir).is_empty());
        assert!(dir.join("lib").join("dep.jar").is_file());
        assert!(dir.join("bin").join("sculk").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_clear_handles_symlinks() {
        use std::os::unix::fs::symlink;

        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("install");
        let outside = root.path().join("outside");
        fs::create_dir_all(&dir).unwrap();
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("file"), "x").unwrap();

        symlink(outside.join("file"), dir.join("file-link")).unwrap();
        symlink(root.path().join("gone"), dir.join("broken-link")).unwrap();
        symlink(&outside, dir.join("dir-link")).unwrap();

        clear_install_directory(&dir).unwrap();

        assert!(fs::symlink_metadata(dir.join("file-link")).is_err());
        assert!(fs::symlink_metadata(dir.join("broken-link")).is_err());
        assert!(dir.join("dir-link").is_dir());
        assert!(outside.join("file").is_file());
    }

    fn settings_for(root: &Path, server_url: &str) -> InstallerSettings {
        InstallerSettings {
            install_dir: Some(root.join(".sculk").to_string_lossy().to_string()),
            link_path: Some(root.join("bin").join("sculk").to_string_lossy().to_string()),
            api_base: server_url.to_string(),
            download_base: server_url.to_string(),
            ..InstallerSettings::default()
        }
    }

    struct FailingCheck;

    impl EnvironmentCheck for FailingCheck {
        fn name(&self) -> String {
            "always fails".to_string()
        }

        fn check(&self) -> Result<(), InstallError> {
            Err(InstallError::Environment("Java 17 or newer was not found".to_string()))
        }
    }

    #[tokio::test]
    async fn test_install_windows_gives_manual_entry() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/sculk-cli/sculk/releases")
            .with_body(r#"[{"tag_name": "v2.3.0"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/sculk-cli/sculk/releases/download/v2.3.0/sculk-v2.3.0.jar")
            .with_body("jar bytes")
            .create_async()
            .await;

        let root = tempfile::tempdir().unwrap();
        let installer =
            Installer::new(settings_for(root.path(), &server.url()), Box::new(WindowsPlatform));
        let report = installer.install().await.unwrap();

        let install_dir = root.path().join(".sculk");
        assert_eq!(report.release, "v2.3.0");
        assert_eq!(report.launcher, install_dir.join("sculk.bat"));
        assert_eq!(
            report.entry,
            PathEntry::Manual {
                launcher: install_dir.join("sculk.bat")
            }
        );
        assert_eq!(
            top_level_files(&install_dir),
            BTreeSet::from(["sculk-v2.3.0.jar".to_string(), "sculk.bat".to_string()])
        );
        assert!(!root.path().join("bin").exists());
    }

    #[tokio::test]
    async fn test_empty_release_list_touches_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/sculk-cli/sculk/releases")
            .with_body("[]")
            .create_async()
            .await;

        let root = tempfile::tempdir().unwrap();
        let install_dir = root.path().join(".sculk");
        fs::create_dir_all(&install_dir).unwrap();
        fs::write(install_dir.join("sculk-v1.0.0.jar"), "previous").unwrap();

        let installer =
            Installer::new(settings_for(root.path(), &server.url()), Box::new(PosixPlatform));
        let err = installer.install().await.unwrap_err();

        assert!(matches!(err, InstallError::NotFound(_)), "got {:?}", err);
        assert_eq!(
            fs::read_to_string(install_dir.join("sculk-v1.0.0.jar")).unwrap(),
            "previous"
        );
    }

    #[tokio::test]
    async fn test_failed_environment_check_stops_before_launcher() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/sculk-cli/sculk/releases")
            .with_body(r#"[{"tag_name": "v2.3.0"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/sculk-cli/sculk/releases/download/v2.3.0/sculk-v2.3.0.jar")
            .with_body("jar bytes")
            .create_async()
            .await;

        let root = tempfile::tempdir().unwrap();
        let installer = Installer::new(
            settings_for(root.path(), &server.url()),
            Box::new(PosixPlatform),
        )
        .with_check(Box::new(FailingCheck));
        let err = installer.install().await.unwrap_err();

        assert!(matches!(err, InstallError::Environment(_)));
        assert!(err.to_string().contains("Java 17"));
        assert!(!root.path().join(".sculk").join("sculk").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_install_local_copies_distribution() {
        let root = tempfile::tempdir().unwrap();
        let dist = root.path().join("dist");
        fs::create_dir_all(dist.join("bin")).unwrap();
        fs::create_dir_all(dist.join("lib")).unwrap();
        fs::write(dist.join("bin").join("sculk"), "#!/bin/sh\n").unwrap();
        fs::write(dist.join("bin").join("sculk.bat"), "@echo off\r\n").unwrap();
        fs::write(dist.join("lib").join("sculk-2.3.0.jar"), "jar").unwrap();
        fs::create_dir_all(root.path().join("bin")).unwrap();

        let install_dir = root.path().join(".sculk");
        fs::create_dir_all(install_dir.join("lib")).unwrap();
        fs::write(install_dir.join("lib").join("sculk-2.2.0.jar"), "stale").unwrap();
        fs::write(install_dir.join("sculk-latest.jar"), "old strategy").unwrap();

        let installer =
            Installer::new(settings_for(root.path(), "http://unused"), Box::new(PosixPlatform));
        let report = installer.install_local(&dist).unwrap();

        assert!(top_level_files(&install_dir).is_empty());
        assert!(install_dir.join("lib").join("sculk-2.3.0.jar").is_file());
        assert!(!install_dir.join("lib").join("sculk-2.2.0.jar").exists());
        assert_eq!(report.launcher, install_dir.join("bin").join("sculk"));
        assert_eq!(
            fs::read_link(root.path().join("bin").join("sculk")).unwrap(),
            install_dir.join("bin").join("sculk")
        );
    }

    #[test]
    fn test_install_local_rejects_non_distribution() {
        let root = tempfile::tempdir().unwrap();
        let installer =
            Installer::new(settings_for(root.path(), "http://unused"), Box::new(PosixPlatform));
        let err = installer.install_local(&root.path().join("nothing")).unwrap_err();
        assert!(matches!(err, InstallError::NotFound(_)));
        assert!(!root.path().join(".sculk").exists());
    }
}

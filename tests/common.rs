use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Not every test binary uses every helper
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub home: PathBuf,
    pub config_path: PathBuf,
    pub install_dir: PathBuf,
    pub link_path: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let home = temp_dir.path().join("home");
        let config_path = temp_dir.path().join("config.json");
        let install_dir = home.join(".sculk");
        let link_dir = home.join(".local").join("bin");
        std::fs::create_dir_all(&link_dir).expect("Failed to create link dir");

        Self {
            home,
            config_path,
            install_dir,
            link_path: link_dir.join("sculk"),
            bin_path: PathBuf::from(env!("CARGO_BIN_EXE_sculk-installer")),
            _temp_dir: temp_dir,
        }
    }

    /// Command with every path and endpoint isolated to this context.
    pub fn cmd(&self, server_url: &str) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("HOME", &self.home);
        cmd.env("SCULK_INSTALLER_CONFIG", &self.config_path);
        cmd.env("SCULK_INSTALLER_INSTALL_DIR", &self.install_dir);
        cmd.env("SCULK_INSTALLER_LINK_PATH", &self.link_path);
        cmd.env("SCULK_INSTALLER_API_URL", server_url);
        cmd.env("SCULK_INSTALLER_DOWNLOAD_URL", server_url);
        cmd.env_remove("SCULK_INSTALLER_CHECK_RUNTIME");
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.status.success(),
            "Command unexpectedly succeeded\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReleaseSource {
    /// `/releases`, first entry wins (includes prereleases)
    #[serde(rename = "list")]
    #[default]
    List,
    /// `/releases/latest`, a single object
    #[serde(rename = "latest")]
    Latest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OsFamily {
    #[serde(rename = "posix")]
    Posix,
    #[serde(rename = "windows")]
    Windows,
}

impl OsFamily {
    pub fn host() -> Self {
        if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Posix
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

/// How the launcher was made reachable by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEntry {
    Linked { link: PathBuf, target: PathBuf },
    Manual { launcher: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub release: String,
    pub artifact: PathBuf,
    pub launcher: PathBuf,
    pub entry: PathEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocsSettings {
    #[serde(default = "default_docs_input_dir")]
    pub input_dir: String,
    #[serde(default = "default_docs_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_docs_extension")]
    pub extension: String,
    #[serde(default = "default_docs_pattern")]
    pub pattern: String,
}

fn default_docs_input_dir() -> String {
    "./src/main/kotlin/commands".to_string()
}
fn default_docs_output_dir() -> String {
    "./docgen".to_string()
}
fn default_docs_extension() -> String {
    "kt".to_string()
}
fn default_docs_pattern() -> String {
    r#"CliktCommand\(name\s*=\s*"(\w*)",\s*help\s*=\s*"([\w\s]*)""#.to_string()
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            input_dir: default_docs_input_dir(),
            output_dir: default_docs_output_dir(),
            extension: default_docs_extension(),
            pattern: default_docs_pattern(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerSettings {
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_repo")]
    pub repo: String,
    /// Defaults to `~/.{project}` when unset
    #[serde(default)]
    pub install_dir: Option<String>,
    /// Defaults to `~/.local/bin/{project}` when unset
    #[serde(default)]
    pub link_path: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_download_base")]
    pub download_base: String,
    #[serde(default)]
    pub release_source: ReleaseSource,
    /// `{project}` and `{release}` are substituted
    #[serde(default = "default_artifact_template")]
    pub artifact_template: String,
    #[serde(default = "default_runtime_command")]
    pub runtime_command: Vec<String>,
    #[serde(default)]
    pub check_runtime: bool,
    #[serde(default = "default_min_java_version")]
    pub min_java_version: u32,
    #[serde(default)]
    pub docs: DocsSettings,
}

fn default_project() -> String {
    "sculk".to_string()
}
fn default_owner() -> String {
    "sculk-cli".to_string()
}
fn default_repo() -> String {
    "sculk".to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_download_base() -> String {
    "https://github.com".to_string()
}
fn default_artifact_template() -> String {
    "{project}-{release}.jar".to_string()
}
fn default_runtime_command() -> Vec<String> {
    vec!["java".to_string(), "-jar".to_string()]
}
fn default_min_java_version() -> u32 {
    17
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            project: default_project(),
            owner: default_owner(),
            repo: default_repo(),
            install_dir: None,
            link_path: None,
            api_base: default_api_base(),
            download_base: default_download_base(),
            release_source: ReleaseSource::default(),
            artifact_template: default_artifact_template(),
            runtime_command: default_runtime_command(),
            check_runtime: false,
            min_java_version: default_min_java_version(),
            docs: DocsSettings::default(),
        }
    }
}

impl InstallerSettings {
    /// Always absolute: the path ends up inside the launcher and as a symlink
    /// target, both of which are used from other working directories.
    pub fn install_dir(&self) -> PathBuf {
        match &self.install_dir {
            Some(dir) => absolute(PathBuf::from(dir)),
            None => absolute(home_dir().join(format!(".{}", self.project))),
        }
    }

    pub fn link_path(&self) -> PathBuf {
        match &self.link_path {
            Some(path) => absolute(PathBuf::from(path)),
            None => absolute(home_dir().join(".local").join("bin").join(&self.project)),
        }
    }

    /// Artifact file name for a given release tag. Slashes in the tag are
    /// flattened so the name stays a single path component.
    pub fn artifact_name(&self, release: &str) -> String {
        self.artifact_template
            .replace("{project}", &self.project)
            .replace("{release}", &release.replace('/', "-"))
    }
}

/// Resolve `path` against the current directory if it is relative.
pub fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::warn!("Could not resolve {}: {}", path.display(), e);
            path
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

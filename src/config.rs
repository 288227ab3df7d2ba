use crate::types::*;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "sculk-installer";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_CONFIG: &str = "SCULK_INSTALLER_CONFIG";
pub const ENV_INSTALL_DIR: &str = "SCULK_INSTALLER_INSTALL_DIR";
pub const ENV_LINK_PATH: &str = "SCULK_INSTALLER_LINK_PATH";
pub const ENV_API_URL: &str = "SCULK_INSTALLER_API_URL";
pub const ENV_DOWNLOAD_URL: &str = "SCULK_INSTALLER_DOWNLOAD_URL";
pub const ENV_CHECK_RUNTIME: &str = "SCULK_INSTALLER_CHECK_RUNTIME";

pub fn get_config_file_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        return Ok(PathBuf::from(path));
    }
    let path = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?
        .join(APP_NAME)
        .join(CONFIG_FILE_NAME);
    tracing::debug!("Config file path: {}", path.display());
    Ok(path)
}

/// Reads settings from `path`, falling back to defaults when the file is absent.
pub fn read_settings_file(path: &Path) -> Result<InstallerSettings> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(InstallerSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file at {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Could not parse config file {} as JSON", path.display()))
}

pub fn load_settings() -> Result<InstallerSettings> {
    let mut settings = read_settings_file(&get_config_file_path()?)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn apply_env_overrides<F>(settings: &mut InstallerSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_INSTALL_DIR) {
        settings.install_dir = Some(dir);
    }

    if let Some(link) = lookup(ENV_LINK_PATH) {
        settings.link_path = Some(link);
    }

    if let Some(api) = lookup(ENV_API_URL) {
        settings.api_base = api;
    }

    if let Some(download) = lookup(ENV_DOWNLOAD_URL) {
        settings.download_base = download;
    }

    if let Some(check) = lookup(ENV_CHECK_RUNTIME) {
        settings.check_runtime = check.to_lowercase() == "true" || check == "1";
    }
}

/// Looks up a single setting by its (normalized) key.
pub fn get_setting(settings: &InstallerSettings, key: &str) -> Option<String> {
    let value = match normalize_key(key).as_str() {
        "project" => settings.project.clone(),
        "owner" => settings.owner.clone(),
        "repo" => settings.repo.clone(),
        "install_dir" => settings.install_dir().display().to_string(),
        "link_path" => settings.link_path().display().to_string(),
        "api_base" => settings.api_base.clone(),
        "download_base" => settings.download_base.clone(),
        "artifact_template" => settings.artifact_template.clone(),
        "runtime_command" => settings.runtime_command.join(" "),
        "check_runtime" => settings.check_runtime.to_string(),
        "min_java_version" => settings.min_java_version.to_string(),
        _ => return None,
    };
    Some(value)
}

pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                format!("_{}", c.to_lowercase())
            } else {
                c.to_string()
            }
        })
        .collect::<String>()
        .to_lowercase()
}

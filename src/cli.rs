use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    if let Some(tag) = option_env!("SCULK_INSTALLER_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("SCULK_INSTALLER_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("SCULK_INSTALLER_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup; clap wants a 'static str
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "sculk-installer")]
#[command(about = "Install or update sculk from GitHub Releases")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Args, Default, Clone)]
pub struct TargetArgs {
    /// Install directory (default: ~/.sculk)
    #[arg(long)]
    pub install_dir: Option<PathBuf>,

    /// Where to create the PATH symlink (default: ~/.local/bin/sculk)
    #[arg(long)]
    pub link_path: Option<PathBuf>,

    /// Check for a suitable Java runtime before writing the launcher
    #[arg(long)]
    pub check_runtime: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install or update to the latest release (the default)
    Install {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Build and install from a local checkout
    #[command(
        after_help = "Examples:\n  sculk-installer local\n  sculk-installer local --project-dir ../sculk --skip-build"
    )]
    Local {
        /// Project checkout containing build.gradle.kts
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Use an existing build/install output instead of running Gradle
        #[arg(long)]
        skip_build: bool,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Generate Markdown stubs for declared commands
    Docs {
        /// Directory of source files to scan
        #[arg(long)]
        input: Option<PathBuf>,

        /// Directory to write Markdown files to
        #[arg(long)]
        output: Option<PathBuf>,

        /// Regex with (name, help) capture groups
        #[arg(long)]
        pattern: Option<String>,

        /// Extension of files to scan
        #[arg(long)]
        extension: Option<String>,
    },

    /// Inspect the installer's configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show the current version
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a configuration setting
    Get {
        /// Key to get (e.g. 'install-dir' or 'installDir')
        key: String,
    },
    /// Show full configuration
    Show {
        /// Output format (json, yaml)
        #[arg(long, default_value = "json")]
        format: String,
    },
}

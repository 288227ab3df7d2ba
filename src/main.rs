mod cli;
mod config;
mod docgen;
mod download;
mod error;
mod install;
mod local;
mod platform;
mod runtime;
mod types;


use anyhow::{anyhow, Result};
use clap::Parser;
use cli::{Cli, Commands, ConfigAction, TargetArgs};
use console::style;
use docgen::DocGenerator;
use install::Installer;
use std::path::PathBuf;
use types::{InstallReport, InstallerSettings, PathEntry};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(&cli);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = config::load_settings()?;
    let show_progress = !cli.quiet;

    match cli.command.unwrap_or(Commands::Install {
        target: TargetArgs::default(),
    }) {
        Commands::Install { target } => {
            let settings = apply_target_args(settings, &target);
            let installer = Installer::for_host(settings).with_progress(show_progress);
            let report = installer.install().await?;
            print_report(installer.settings(), &report);
        }

        Commands::Local {
            project_dir,
            skip_build,
            target,
        } => {
            let settings = apply_target_args(settings, &target);
            let dist_dir = if skip_build {
                local::distribution_dir(&project_dir, &settings.project)
            } else {
                local::build_distribution(&project_dir, &settings.project)?
            };
            let installer = Installer::for_host(settings);
            let report = installer.install_local(&dist_dir)?;
            print_report(installer.settings(), &report);
        }

        Commands::Docs {
            input,
            output,
            pattern,
            extension,
        } => {
            let docs = settings.docs;
            let generator = DocGenerator::new(
                pattern.as_deref().unwrap_or(&docs.pattern),
                extension.as_deref().unwrap_or(&docs.extension),
            )?;
            let input = input.unwrap_or_else(|| PathBuf::from(&docs.input_dir));
            let output = output.unwrap_or_else(|| PathBuf::from(&docs.output_dir));

            let generated = generator.generate(&input, &output)?;
            for (doc, path) in &generated {
                println!("  {} -> {}", doc.name, path.display());
            }
            println!("Generated {} command doc(s) in {}", generated.len(), output.display());
        }

        Commands::Config { action } => match action {
            ConfigAction::Get { key } => {
                let value = config::get_setting(&settings, &key)
                    .ok_or_else(|| anyhow!("Setting '{}' not found", key))?;
                println!("{}", value);
            }
            ConfigAction::Show { format } => match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&settings)?),
                "yaml" => print!("{}", serde_yaml::to_string(&settings)?),
                other => return Err(anyhow!("Unknown format '{}' (use json or yaml)", other)),
            },
        },

        Commands::Version => {
            println!("sculk-installer v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn apply_target_args(mut settings: InstallerSettings, target: &TargetArgs) -> InstallerSettings {
    if let Some(dir) = &target.install_dir {
        settings.install_dir = Some(dir.to_string_lossy().to_string());
    }
    if let Some(link) = &target.link_path {
        settings.link_path = Some(link.to_string_lossy().to_string());
    }
    if target.check_runtime {
        settings.check_runtime = true;
    }
    settings
}

fn print_report(settings: &InstallerSettings, report: &InstallReport) {
    tracing::info!(
        "Launcher {} runs {}",
        report.launcher.display(),
        report.artifact.display()
    );

    match &report.entry {
        PathEntry::Linked { link, target } => {
            tracing::info!("Linked {} -> {}", link.display(), target.display());
        }
        PathEntry::Manual { launcher } => {
            let dir = launcher
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!(
                "Please add {} to your PATH to run {} :)",
                dir,
                launcher.display()
            );
        }
    }

    println!(
        "{}",
        style(format!(
            "{} {} installed successfully!",
            display_name(&settings.project),
            report.release
        ))
        .green()
    );
}

fn display_name(project: &str) -> String {
    let mut chars = project.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn setup_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();
}

//! starterbed CLI entry point
//!
//! Usage:
//!   starterbed cleanup            Remove containers carrying the cleanup label
//!   starterbed ps                 List containers
//!   starterbed logs <container>   Dump container logs
//!   starterbed wait <container>   Poll until a container is running
//!   starterbed volume create/rm   Manage scratch volumes

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use starterbed::cli::commands::{
    CleanupArgs, LogsArgs, OutputFormat, PsArgs, VolumeAction, VolumeArgs, WaitArgs,
};
use starterbed::cli::{Cli, Commands};
use starterbed::config::{load_config, Config};
use starterbed::docker::DockerCli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "starterbed=debug" } else { "starterbed=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let docker = DockerCli::new(&config.docker);
    docker.ensure_available()?;

    match cli.command {
        Commands::Cleanup(args) => cleanup(&docker, &config, args).await,
        Commands::Ps(args) => list_containers(&docker, args).await,
        Commands::Logs(args) => dump_logs(&docker, args).await,
        Commands::Wait(args) => wait_for_container(&docker, &config, args).await,
        Commands::Volume(args) => manage_volume(&docker, args).await,
    }
}

/// Bulk-remove containers by label
async fn cleanup(docker: &DockerCli, config: &Config, args: CleanupArgs) -> Result<()> {
    let label = args
        .label
        .unwrap_or_else(|| config.docker.cleanup_label.clone());
    let removed = docker.remove_containers_by_label(&label).await?;
    if removed == 0 {
        println!("No containers matching {label}");
    } else {
        println!(
            "{}: removed {removed} container(s) matching {label}",
            "cleanup".green()
        );
    }
    Ok(())
}

/// List containers in the requested format
async fn list_containers(docker: &DockerCli, args: PsArgs) -> Result<()> {
    let containers = docker.list_containers(args.label.as_deref()).await?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&containers)?);
        }
        OutputFormat::Plain => {
            for container in &containers {
                println!("{}", container.id);
            }
        }
        OutputFormat::Table => {
            if containers.is_empty() {
                println!("No containers");
                return Ok(());
            }
            println!(
                "{:<14} {:<28} {:<22} {}",
                "ID".bold(),
                "IMAGE".bold(),
                "NAMES".bold(),
                "STATUS".bold()
            );
            for container in &containers {
                println!(
                    "{:<14} {:<28} {:<22} {}",
                    container.id, container.image, container.names, container.status
                );
            }
        }
    }
    Ok(())
}

/// Dump the logs of a single container
async fn dump_logs(docker: &DockerCli, args: LogsArgs) -> Result<()> {
    let logs = docker
        .container_logs(&args.container, args.timestamps)
        .await?;
    print!("{logs}");
    Ok(())
}

/// Poll until the container reports running
async fn wait_for_container(docker: &DockerCli, config: &Config, args: WaitArgs) -> Result<()> {
    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.wait.timeout());
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.wait.interval());

    docker
        .wait_until_running(&args.container, timeout, interval)
        .await?;
    println!("{}: {} is running", "ready".green(), args.container);
    Ok(())
}

/// Create or remove a scratch volume
async fn manage_volume(docker: &DockerCli, args: VolumeArgs) -> Result<()> {
    match args.action {
        VolumeAction::Create { name } => {
            docker.create_volume(&name).await?;
            println!("{}: volume {name}", "created".green());
        }
        VolumeAction::Rm { name } => {
            docker.remove_volume(&name).await?;
            println!("{}: volume {name}", "removed".green());
        }
    }
    Ok(())
}

//! `manifest-rules` is the primary CLI binary.

use clap::Parser;
use colored::Colorize;
use manifest_rules::handlers;
use manifest_rules::{Cli, Command, ManifestError, ManifestResult};
use tracing_subscriber::EnvFilter;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print an error with appropriate formatting based on error type.
fn print_error(e: &ManifestError) {
    println!();
    match e {
        ManifestError::Module { module, source } => {
            println!(
                "  {} {}",
                format!("error[{}]", module).bright_red().bold(),
                source
            );
            if source.is_configuration_error() {
                println!();
                println!(
                    "    {}: check the module's declaration in the project file",
                    "hint".bright_blue().bold()
                );
            }
        }
        ManifestError::ProjectNotFound(path) => {
            println!("  {} project file not found", "error".bright_red().bold());
            println!();
            println!("    {}: {}", "Searched".dimmed(), path.display());
            println!();
            println!(
                "    {}: pass a project file with {}",
                "hint".bright_blue().bold(),
                "--project <path>".bright_white()
            );
        }
        ManifestError::ModuleNotFound(module) => {
            println!(
                "  {} module not found: {}",
                "error".bright_red().bold(),
                module.bright_white()
            );
        }
        ManifestError::BuildFailed { failed, total } => {
            println!(
                "  {} {} of {} modules failed, nothing was written",
                "error".bright_red().bold(),
                failed,
                total
            );
        }
        // For all other errors, use a consistent styled format
        _ => {
            let msg = e.to_string();
            match msg.split_once(": ") {
                Some((prefix, rest)) if prefix.ends_with("error") => {
                    println!(
                        "  {} {}",
                        format!("error[{}]", prefix.to_lowercase().replace(" error", ""))
                            .bright_red()
                            .bold(),
                        rest.dimmed()
                    );
                }
                _ => println!("  {} {}", "error".bright_red().bold(), msg),
            }
        }
    }
    println!();
}

/// Initialize tracing. Only enables logging when RUST_LOG is set.
fn init_tracing() {
    let rust_log_set = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.is_empty())
        .is_some();

    if !rust_log_set {
        return;
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .init();
}

async fn run() -> ManifestResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Args {
            module,
            project,
            json,
        } => handlers::show_args(module, project, json).await,

        Command::Generate {
            project,
            output,
            json,
        } => handlers::generate(project, output, json).await,
    }
}

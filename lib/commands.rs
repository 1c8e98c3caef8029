//! CLI command definitions.

use clap::builder::styling::{AnsiColor, Style, Styles};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const ARGS_EXAMPLES: &str = concat!(
    "\x1b[1;33mExamples:\x1b[0m\n",
    "  manifest-rules args Settings                 Show fixer args of a module\n",
    "  manifest-rules args Settings -p apps.toml    Use another project file\n",
    "  manifest-rules args Settings --json          JSON output for tooling",
);

const GENERATE_EXAMPLES: &str = concat!(
    "\x1b[1;33mExamples:\x1b[0m\n",
    "  manifest-rules generate                      Write build.manifest.ninja\n",
    "  manifest-rules generate -o out/rules.ninja   Write to a custom path\n",
    "  manifest-rules generate --json               Print the graph as JSON",
);

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// manifest-rules - Derive manifest fixer and merger build rules.
#[derive(Debug, Parser)]
#[command(name = "manifest-rules", author, version, styles = styles())]
#[command(about = "Derive manifest fixer and merger build rules for app modules")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the fixer and merger arguments of one module.
    #[command(after_help = ARGS_EXAMPLES)]
    Args {
        /// Module name as declared in the project file.
        module: String,

        /// Project file (defaults to manifest-rules.toml).
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate the manifest build rules of every module.
    #[command(after_help = GENERATE_EXAMPLES)]
    Generate {
        /// Project file (defaults to manifest-rules.toml).
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Ninja file to write (defaults to build.manifest.ninja).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the build graph as JSON instead of writing a Ninja file.
        #[arg(long)]
        json: bool,
    },
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Help output styles.
pub fn styles() -> Styles {
    let error = Style::new().bold().fg_color(Some(AnsiColor::Red.into()));
    let success = Style::new().bold().fg_color(Some(AnsiColor::Green.into()));
    let literal = Style::new().fg_color(Some(AnsiColor::Cyan.into()));

    Styles::styled()
        .header(Style::new().bold().fg_color(Some(AnsiColor::Yellow.into())))
        .usage(success)
        .literal(literal)
        .placeholder(literal)
        .error(error)
        .invalid(error)
        .valid(success)
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_args_command() {
        let cli = Cli::try_parse_from(["manifest-rules", "args", "Settings", "--json"]).unwrap();
        match cli.command {
            Command::Args {
                module,
                project,
                json,
            } => {
                assert_eq!(module, "Settings");
                assert!(project.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_generate_command() {
        let cli = Cli::try_parse_from([
            "manifest-rules",
            "generate",
            "-p",
            "apps.toml",
            "-o",
            "out/rules.ninja",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                project,
                output,
                json,
            } => {
                assert_eq!(project, Some(PathBuf::from("apps.toml")));
                assert_eq!(output, Some(PathBuf::from("out/rules.ninja")));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

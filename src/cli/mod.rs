//! CLI module for Plandigest.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Plandigest - question answering over PDF documents
///
/// Answers a fixed list of questions about PDFs with retrieval-augmented
/// generation, either from a local web page or over a whole directory.
#[derive(Parser, Debug)]
#[command(name = "plandigest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the config file, prompt and question templates
    Init,

    /// Check configuration and input files
    Doctor,

    /// Answer the questions for every PDF in a directory
    Batch {
        /// Directory containing PDF files (asked for if omitted)
        dir: Option<String>,

        /// OpenAI API key (asked for if omitted)
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Directory for the Markdown reports (defaults to batch.output_dir)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start the interactive web page
    Serve {
        /// Host to bind to (defaults to interactive.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to interactive.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_args() {
        let cli =
            Cli::try_parse_from(["plandigest", "-v", "batch", "pdfs", "--api-key", "sk-x"])
                .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Batch { dir, api_key, output } => {
                assert_eq!(dir.as_deref(), Some("pdfs"));
                assert_eq!(api_key.as_deref(), Some("sk-x"));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["plandigest", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve { host: None, port: Some(9000) }
        ));
    }
}

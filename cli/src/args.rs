//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for synthesis results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Per-model answers plus the final synthesis
    Full,
    /// Only the final synthesis
    Synthesis,
    /// JSON output
    Json,
}

/// CLI arguments for polychat
#[derive(Parser, Debug)]
#[command(name = "polychat")]
#[command(author, version, about = "Multi-model chat - fan a prompt out to several LLMs and merge the answers")]
#[command(long_about = r#"
Polychat dispatches a prompt to one or several upstream chat models.

With `ask` a single model answers. With `synthesize` the prompt is fanned
out to several models in rate-limit-friendly chunks, and one more model
merges the surviving answers into a final synthesis.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./polychat.toml     Project-level config
3. ~/.config/polychat/config.toml   Global config

Example:
  polychat ask "What's the best way to handle errors in Rust?" -m deepseek-chat
  polychat synthesize "Compare async runtimes" -m gpt-4o-mini -m claude-3-5-haiku -m deepseek-chat
  polychat models
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single model
    Ask {
        /// The prompt to send
        prompt: String,

        /// Model to ask
        #[arg(short, long, value_name = "MODEL")]
        model: String,
    },

    /// Fan a prompt out to several models and synthesize the answers
    Synthesize {
        /// The prompt to send
        prompt: String,

        /// Target models (can be specified multiple times)
        #[arg(short, long = "model", value_name = "MODEL", required = true)]
        models: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "full")]
        output: OutputFormat,
    },

    /// List the model catalog
    Models,
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// stackgen - resolve FastAPI project options into a template context
#[derive(Parser)]
#[command(name = "stackgen")]
#[command(about = "Validate and resolve project generator options into a render context")]
#[command(version)]
pub struct Cli {
    /// Log engine decisions (forced and ignored options) at debug level.
    ///
    /// `RUST_LOG` takes precedence when set. Logs go to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every option with its kind, default and description
    Options,
    /// Check selections and report every violation
    Validate {
        #[command(flatten)]
        input: SelectionArgs,
    },
    /// Resolve selections and print the render context as JSON
    Render {
        #[command(flatten)]
        input: SelectionArgs,

        /// Write the context to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also print a configuration summary to stderr
        #[arg(long)]
        summary: bool,
    },
    /// Resolve selections and print a configuration summary
    Summary {
        #[command(flatten)]
        input: SelectionArgs,
    },
}

/// Where selections come from; later sources override earlier ones
#[derive(Args, Debug, Default)]
pub struct SelectionArgs {
    /// JSON file of selections (object of option id to scalar)
    pub file: Option<PathBuf>,

    /// Set one option, e.g. `--set database=sqlite` (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,

    /// Project name; normalized to a Python identifier
    #[arg(short, long)]
    pub name: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}

//! CLI type definitions.
//!
//! Clap command structures that define the command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "testforge")]
#[command(about = "Testforge - LLM-driven unit test generation and repair", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a test suite for a symbol and repair the function until the
    /// tests pass or the attempt budget runs out
    Run(RunArgs),

    /// Locate a function or class and print its source
    Locate(LocateArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Python source file containing the symbol under test
    #[arg(short, long)]
    pub file: PathBuf,

    /// Function or class name to test
    #[arg(short, long)]
    pub symbol: String,

    /// Base sampling temperature override
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Model override applied to every stage
    #[arg(short, long)]
    pub model: Option<String>,

    /// Correction attempts allowed before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Stream completions instead of waiting for full responses
    #[arg(long)]
    pub stream: bool,

    /// Echo the conversation with the model to the terminal
    #[arg(long)]
    pub print_text: bool,

    /// Load configuration from this file instead of .testforge/config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Python source file to search
    #[arg(short, long)]
    pub file: PathBuf,

    /// Function or class name to locate
    #[arg(short, long)]
    pub symbol: String,
}

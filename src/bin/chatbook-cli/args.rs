use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chatbook::driver::ChunkMode;

#[derive(Parser, Debug)]
#[command(
    name = "chatbook",
    about = "Create, edit and run conversation documents"
)]
pub struct CliArgs {
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config file if none exists
    Init,
    /// Create a seed document without running it
    New {
        identity: String,
        #[arg(long, short = 'l')]
        language: Option<String>,
        #[arg(long, conflicts_with = "input")]
        content: Option<String>,
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },
    /// Translate a file turn by turn into a new document
    Translate {
        file: PathBuf,
        #[arg(long, short = 'l')]
        language: Option<String>,
        #[arg(long, short = 's', default_value = "lines")]
        split: ChunkMode,
    },
    /// Run one turn of an existing document (default: the last one)
    Run {
        file: PathBuf,
        #[arg(long)]
        cell: Option<usize>,
    },
    /// Edit the parameters of a document interactively
    Params { file: PathBuf },
    /// Print the turns of a document
    Show { file: PathBuf },
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    Set { value: String },
    Get,
    Delete,
}

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[clap(infer_subcommands = true)]
pub struct Args {
    /// Increases the log verbosity, can be repeated
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Builds the site
    Build(BuildArgs),
}

#[derive(Clone, Debug, Parser)]
pub struct BuildArgs {
    /// Directory containing the site configuration
    #[arg(short, long, default_value = ".")]
    pub input: PathBuf,

    /// Directory the site is written to. It is replaced on every build.
    #[arg(short, long, default_value = "site")]
    pub output: PathBuf,
}

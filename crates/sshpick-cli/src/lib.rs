use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sshpick",
    version,
    about = "Pick, add or delete keychain-backed SSH connections with fzf"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Extra config file layered over the user config.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keychain account tag the connections are stored under.
    #[arg(long)]
    pub account: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print stored connections, one per line.
    List,
    Config {
        #[arg(long)]
        init: bool,
    },
}

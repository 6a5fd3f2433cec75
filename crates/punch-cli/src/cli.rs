use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "punch",
    about = "Punch — clock-event relay for RFID readers and kiosk displays",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the relay server
    Serve(ServeArgs),
    /// Validate a configuration file
    CheckConfig(ConfigArgs),
    /// List provisioned tag bindings
    Tags(ConfigArgs),
    /// Show the most recent event in a journal
    Latest(LatestArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured listen address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct LatestArgs {
    /// Event journal file
    pub journal: PathBuf,
}

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pixvault",
    about = "Per-user picture store with conditional writes and renditions",
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
    /// Start the picture server
    Serve(ServeArgs),
    /// Print a default configuration file
    Config(ConfigArgs),
    /// Compute the content identifier of a local file
    Hash(HashArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<String>,
    /// Override the configured storage root
    #[arg(long)]
    pub root: Option<String>,
}

#[derive(Args)]
pub struct ConfigArgs {}

#[derive(Args)]
pub struct HashArgs {
    pub path: String,
}

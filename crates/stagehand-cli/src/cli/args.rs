use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stagehand",
    version,
    about = "Deploys extension packages into the server's disposable resource cache"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one deployment cycle: reset the cache, scan, inject
    Deploy(DeployArgs),
    /// List eligible extensions without touching the cache
    Scan(ScanArgs),
}

#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Server base path; the cache lives under <path>/resources/
    #[arg(long, env = "STAGEHAND_SERVER_PATH")]
    pub server_path: PathBuf,

    /// Root directory holding extension directories
    #[arg(long, env = "STAGEHAND_EXTENSIONS", default_value = "./extensions")]
    pub extensions: PathBuf,

    /// Directory holding locale phrase files
    #[arg(long, default_value = "locale")]
    pub locale_dir: PathBuf,

    /// Language for user-facing messages
    #[arg(long, env = "STAGEHAND_LANGUAGE", default_value = "en")]
    pub language: String,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Root directory holding extension directories
    #[arg(long, env = "STAGEHAND_EXTENSIONS", default_value = "./extensions")]
    pub extensions: PathBuf,
}

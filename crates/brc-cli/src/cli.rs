use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "brcstored",
    about = "BRC storage daemon: per-user record store over TCP",
    version,
)]
pub struct Cli {
    /// Store directory (default: /home/bbs/brcstore/database)
    pub db_path: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Connections served at once
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Close new connections instead of queueing them when at the limit
    #[arg(long)]
    pub reject_when_full: bool,

    /// Threads running store calls
    #[arg(long)]
    pub store_workers: Option<usize>,

    /// Increase log verbosity (-v: per-request logs, -vv: debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

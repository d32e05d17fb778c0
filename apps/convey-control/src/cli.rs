use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "convey-control",
    author,
    version,
    about = "Control and status server for a file-watching test runner"
)]
pub struct Cli {
    /// Address to bind the HTTP listener to.
    #[arg(long, env = "CONVEY_LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen_addr: String,

    /// Directory the watcher starts in (defaults to the working directory).
    #[arg(long, env = "CONVEY_ROOT")]
    pub root: Option<PathBuf>,

    /// JSON file with sound and push notification settings.
    #[arg(long, env = "CONVEY_NOTIFY_CONFIG", default_value = "notifications.json")]
    pub notify_config: PathBuf,

    /// Grace period applied during shutdown.
    #[arg(long, env = "CONVEY_SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub root: PathBuf,
    pub notify_config: PathBuf,
    pub shutdown_grace: Duration,
}

impl TryFrom<Cli> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let listen_addr: SocketAddr = cli
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address: {}", cli.listen_addr))?;
        let root = match cli.root {
            Some(root) => root,
            None => std::env::current_dir().context("failed to resolve working directory")?,
        };
        if !root.is_dir() {
            anyhow::bail!("watch root {} is not a directory", root.display());
        }
        Ok(ServerConfig {
            listen_addr,
            root,
            notify_config: cli.notify_config,
            shutdown_grace: Duration::from_secs(cli.shutdown_grace_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_working_directory() {
        let cli = Cli::try_parse_from(["convey-control"]).unwrap();
        let config = ServerConfig::try_from(cli).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.root, std::env::current_dir().unwrap());
        assert_eq!(config.notify_config, PathBuf::from("notifications.json"));
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_listen_address() {
        let cli = Cli::try_parse_from(["convey-control", "--listen-addr", "nowhere"]).unwrap();
        assert!(ServerConfig::try_from(cli).is_err());
    }

    #[test]
    fn rejects_missing_root() {
        let cli =
            Cli::try_parse_from(["convey-control", "--root", "/definitely/not/here"]).unwrap();
        assert!(ServerConfig::try_from(cli).is_err());
    }
}

use std::sync::Arc;

use anyhow::Context;
use brc_server::{AdmissionPolicy, BrcServer, ServerConfig};
use brc_store::RedbBlobStore;

use crate::cli::Cli;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;

    tracing::warn!(
        "Serving at {} [db:{}]...",
        config.bind_addr,
        config.store_path.display()
    );
    let store = RedbBlobStore::open(&config.store_path, &config.store)
        .with_context(|| format!("opening store at {}", config.store_path.display()))?;

    // One scheduler thread; store calls go to the blocking pool.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .max_blocking_threads(config.store_workers)
        .build()
        .context("building runtime")?;

    let server = BrcServer::new(config, Arc::new(store));
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Flags override the config file, which overrides built-in defaults.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };

    if let Some(path) = &cli.db_path {
        config.store_path = path.clone();
    }
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(n) = cli.max_connections {
        config.max_connections = n;
    }
    if cli.reject_when_full {
        config.admission = AdmissionPolicy::Reject;
    }
    if let Some(n) = cli.store_workers {
        config.store_workers = n;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn defaults_without_flags() {
        let cli = Cli::try_parse_from(["brcstored"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn positional_sets_store_path() {
        let cli = Cli::try_parse_from(["brcstored", "/srv/brc"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/srv/brc"));
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brcstored.toml");
        std::fs::write(
            &path,
            "store_path = \"/from/file\"\nmax_connections = 8\nstore_workers = 3\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "brcstored",
            "--config",
            path.to_str().unwrap(),
            "--max-connections",
            "32",
            "--reject-when-full",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/from/file"));
        assert_eq!(config.max_connections, 32);
        assert_eq!(config.store_workers, 3);
        assert_eq!(config.admission, AdmissionPolicy::Reject);
    }

    #[test]
    fn zero_workers_rejected() {
        let cli = Cli::try_parse_from(["brcstored", "--store-workers", "0"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }
}

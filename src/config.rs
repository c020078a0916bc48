use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "WIRELINE_CONFIG";
/// Environment variable overriding the listen address.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the listener binds to
    pub listen_addr: String,
    /// Bytes requested per socket read
    pub read_chunk_size: usize,
    /// Initial capacity of each connection's request buffer
    pub initial_buffer_capacity: usize,
    /// Depth of the hand-off queue between a streaming handler and the socket
    pub chunk_queue_capacity: usize,
    /// Request targets under this prefix are answered with a chunked body
    pub chunked_prefix: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:42069".to_string(),
            read_chunk_size: 1024,
            initial_buffer_capacity: 8,
            chunk_queue_capacity: 16,
            chunked_prefix: "/chunked/".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the config file named by `WIRELINE_CONFIG` (if any), then
    /// applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var(LISTEN_ENV) {
            cfg.listen_addr = addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw).context("failed to parse YAML config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.is_empty() {
            bail!("listen_addr must not be empty");
        }
        if self.read_chunk_size == 0 {
            bail!("read_chunk_size must be greater than zero");
        }
        if self.initial_buffer_capacity == 0 {
            bail!("initial_buffer_capacity must be greater than zero");
        }
        if self.chunk_queue_capacity == 0 {
            bail!("chunk_queue_capacity must be greater than zero");
        }
        Ok(())
    }
}

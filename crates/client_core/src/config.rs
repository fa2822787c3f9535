use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "goto_frame.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub rpc_addr: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            rpc_addr: "127.0.0.1:4242".into(),
            connect_timeout_ms: 1_000,
            request_timeout_ms: 3_000,
        }
    }
}

impl ClientSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc_addr.trim().is_empty() {
            bail!("rpc_addr must not be empty");
        }
        if self.connect_timeout_ms == 0 || self.request_timeout_ms == 0 {
            bail!("timeouts must be greater than zero");
        }
        Ok(())
    }

    /// Applies a command-line `--rpc-addr` on top of the loaded layers.
    pub fn with_rpc_addr(mut self, rpc_addr: Option<String>) -> anyhow::Result<Self> {
        if let Some(rpc_addr) = rpc_addr {
            self.rpc_addr = rpc_addr;
            self.validate().context("invalid --rpc-addr")?;
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    rpc_addr: Option<String>,
    connect_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
}

/// Defaults, then the first config file found, then environment overrides.
///
/// An explicit `config_path` must exist; the implicit locations are optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_paths().into_iter().find(|path| path.is_file()),
    };
    if let Some(path) = path {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file_settings(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings.validate()?;
    Ok(settings)
}

pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("goto_frame").join("config.toml"));
    }
    paths
}

fn apply_file_settings(settings: &mut ClientSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.rpc_addr {
        settings.rpc_addr = v;
    }
    if let Some(v) = file_cfg.connect_timeout_ms {
        settings.connect_timeout_ms = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms {
        settings.request_timeout_ms = v;
    }
    Ok(())
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GOTO_FRAME_RPC_ADDR") {
        settings.rpc_addr = v;
    }
    if let Some(v) = lookup("APP__RPC_ADDR") {
        settings.rpc_addr = v;
    }

    for (name, slot) in [
        ("APP__CONNECT_TIMEOUT_MS", &mut settings.connect_timeout_ms),
        ("APP__REQUEST_TIMEOUT_MS", &mut settings.request_timeout_ms),
    ] {
        if let Some(v) = lookup(name) {
            match v.trim().parse::<u64>() {
                Ok(parsed) => *slot = parsed,
                Err(err) => tracing::warn!(%name, value = %v, %err, "ignoring invalid timeout override"),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

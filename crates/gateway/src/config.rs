use std::path::{Path, PathBuf};

use {
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use crate::inbound::AutoReply;

/// Config file name, checked project-local then user-global.
const CONFIG_FILENAME: &str = "parley.toml";

/// Gateway configuration with serde defaults throughout, so a partial
/// (or absent) config file is always usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding the message log snapshot. Defaults to the
    /// platform data dir.
    pub data_dir: Option<PathBuf>,
    pub auto_reply: AutoReply,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
            data_dir: None,
            auto_reply: AutoReply::default(),
        }
    }
}

impl GatewayConfig {
    /// Effective data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Load config from an explicit path.
pub fn load_config(path: &Path) -> anyhow::Result<GatewayConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let config = toml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order: `./parley.toml`, then `~/.config/parley/parley.toml`.
/// Falls back to defaults when no file is found or a file fails to load.
pub fn discover_and_load() -> GatewayConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(config) => return config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    GatewayConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "parley") {
        let global = dirs.config_dir().join(CONFIG_FILENAME);
        if global.exists() {
            return Some(global);
        }
    }
    None
}

/// Platform data directory (`~/.local/share/parley` on Linux), falling
/// back to the working directory.
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "parley")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

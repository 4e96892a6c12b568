use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/mdq/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdqConfig {
    /// Maximum number of jobs holding an active slot at once.
    pub max_concurrent: usize,
    /// Command template for the metadata probe. Placeholder: `{url}`.
    #[serde(default = "default_metadata_command")]
    pub metadata_command: String,
    /// Command template for a transfer. Placeholders: `{url}`, `{dest}`,
    /// `{format}`, `{quality}`.
    #[serde(default = "default_transfer_command")]
    pub transfer_command: String,
}

fn default_metadata_command() -> String {
    "yt-dlp --no-warnings --print title {url}".to_string()
}

fn default_transfer_command() -> String {
    "yt-dlp --newline -P {dest} {url}".to_string()
}

impl Default for MdqConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            metadata_command: default_metadata_command(),
            transfer_command: default_transfer_command(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdq")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MdqConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MdqConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MdqConfig = toml::from_str(&data)?;
    Ok(cfg)
}

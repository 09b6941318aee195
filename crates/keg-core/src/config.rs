use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Retry policy parameters (optional section in config.toml).
///
/// Applies to the archive fetch only; checksum and install failures are
/// never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of fetch attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/keg/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KegConfig {
    /// Connect timeout for the archive fetch, in seconds.
    pub connect_timeout_secs: u64,
    /// Overall timeout for the archive fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Optional retry policy for the fetch; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional override for the archive cache directory (default: XDG cache dir).
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for KegConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            fetch_timeout_secs: 600,
            retry: None,
            cache_dir: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("keg")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Directory where fetched archives are cached before install.
/// Honors `cache_dir` from the config when set.
pub fn cache_dir(cfg: &KegConfig) -> Result<PathBuf> {
    if let Some(dir) = &cfg.cache_dir {
        fs::create_dir_all(dir)?;
        return Ok(dir.clone());
    }
    let xdg_dirs = xdg::BaseDirectories::with_prefix("keg")?;
    let dir = xdg_dirs.get_cache_home();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<KegConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = KegConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: KegConfig = toml::from_str(&data)?;
    Ok(cfg)
}

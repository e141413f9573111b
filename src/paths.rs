//! Path resolution for wpdash
//!
//! # Environment Variables
//!
//! - `WPDASH_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/wpdash`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `WPDASH_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/wpdash` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\wpdash`
//!    - macOS/Linux: `~/.config/wpdash`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "WPDASH_CONFIG_DIR";

/// Name of the settings file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the wpdash config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("wpdash");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join("wpdash");
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("wpdash");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the settings file path
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as written.
///
/// ```ignore
/// let sites = paths::expand("~/sites");
/// let dumps = paths::expand("$BACKUP_ROOT/wordpress");
/// ```
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

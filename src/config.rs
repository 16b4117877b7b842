//! Optional user configuration, read from `<config-dir>/tunelet/config.toml`.
//!
//! A missing file means defaults. A malformed file is reported once at
//! startup and defaults are used.

use std::path::PathBuf;

use color_eyre::Result;
use serde::Deserialize;

const DEFAULT_THEME: &str = "Gruvbox Dark";
const DEFAULT_VOLUME: u8 = 50;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    volume: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            volume: DEFAULT_VOLUME,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.is_file() => {
                let contents = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&contents)?)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Initial slider value, clamped to 0..=100.
    pub fn volume(&self) -> u8 {
        self.volume.min(100)
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tunelet").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::{Config, DEFAULT_THEME, DEFAULT_VOLUME};

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.theme, DEFAULT_THEME);
        assert_eq!(config.volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn parses_full_file() {
        let config: Config = toml::from_str("theme = \"Nord\"\nvolume = 80\n").unwrap();
        assert_eq!(config.theme, "Nord");
        assert_eq!(config.volume(), 80);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str("theme = \"Nord\"\n").unwrap();
        assert_eq!(config.volume(), DEFAULT_VOLUME);
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn volume_is_clamped_on_read() {
        let config: Config = toml::from_str("volume = 250\n").unwrap();
        assert_eq!(config.volume(), 100);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(toml::from_str::<Config>("volume = \"loud\"\n").is_err());
    }
}

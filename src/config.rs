use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::logging::LoggingConfig;

pub const DEFAULT_TARGET_URL: &str = "http://localhost:3000";
pub const DEFAULT_SCREENSHOT_PATH: &str = "verification/frontend_load.png";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CheckerConfig {
    /// Frontend address the check navigates to.
    pub target_url: String,
    /// Where the screenshot lands; the parent directory is assumed to exist.
    pub screenshot_path: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
    pub headless: bool,
    pub logging: LoggingConfig,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            screenshot_path: PathBuf::from(DEFAULT_SCREENSHOT_PATH),
            window_width: 1280,
            window_height: 720,
            headless: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl CheckerConfig {
    /// Load the first config.toml found, or defaults when none exists. The
    /// binary takes no arguments; this file is the only behavior knob.
    pub fn load() -> Self {
        let paths = vec![
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lazytask-smoke/config.toml"),
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".lazytask-smoke/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                if let Some(config) = Self::load_from(&path) {
                    return config;
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    fn load_from(path: &Path) -> Option<Self> {
        match fs::read_to_string(path) {
            Ok(content) => match content.parse::<Self>() {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                None
            }
        }
    }

    /// An unparseable target URL falls back to the default rather than
    /// failing the run.
    fn validate(mut self) -> Self {
        if Url::parse(&self.target_url).is_err() {
            tracing::warn!(
                "Invalid target_url '{}', falling back to {}",
                self.target_url,
                DEFAULT_TARGET_URL
            );
            self.target_url = DEFAULT_TARGET_URL.to_string();
        }
        self
    }
}

impl std::str::FromStr for CheckerConfig {
    type Err = toml::de::Error;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        toml::from_str::<Self>(content).map(Self::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_script_contract() {
        let config = CheckerConfig::default();
        assert_eq!(config.target_url, "http://localhost:3000");
        assert_eq!(
            config.screenshot_path,
            PathBuf::from("verification/frontend_load.png")
        );
        assert!(config.headless);
        assert_eq!((config.window_width, config.window_height), (1280, 720));
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let config: CheckerConfig = "target_url = \"http://localhost:8080\"\n"
            .parse()
            .unwrap();
        assert_eq!(config.target_url, "http://localhost:8080");
        assert_eq!(
            config.screenshot_path,
            PathBuf::from(DEFAULT_SCREENSHOT_PATH)
        );
        assert!(config.headless);
    }

    #[test]
    fn invalid_target_url_falls_back_to_default() {
        let config: CheckerConfig = "target_url = \"not a url\"\n".parse().unwrap();
        assert_eq!(config.target_url, DEFAULT_TARGET_URL);
    }

    #[test]
    fn logging_table_parses() {
        let config: CheckerConfig = concat!(
            "headless = false\n",
            "[logging]\n",
            "log_level = \"debug\"\n",
            "file_log = true\n",
        )
        .parse()
        .unwrap();
        assert!(!config.headless);
        assert_eq!(config.logging.log_level.as_deref(), Some("debug"));
        assert_eq!(config.logging.file_log, Some(true));
    }

    #[test]
    fn load_from_reads_a_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "window_width = 1920\nwindow_height = 1080").unwrap();
        let config = CheckerConfig::load_from(file.path()).unwrap();
        assert_eq!((config.window_width, config.window_height), (1920, 1080));
        assert_eq!(config.target_url, DEFAULT_TARGET_URL);
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "target_url = [broken").unwrap();
        assert!(CheckerConfig::load_from(file.path()).is_none());
    }
}

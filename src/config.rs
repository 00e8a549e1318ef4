use crate::detector::DEFAULT_CONFIDENCE_FLOOR;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub detector: Option<DetectorSection>,
    #[serde(default)]
    pub layouts: Option<LayoutsSection>,
    #[serde(default)]
    pub server: Option<ServerSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectorSection {
    /// Recorded detections backing the replay model.
    pub detections_path: Option<PathBuf>,
    /// Minimum detection confidence (default: 0.5)
    pub confidence_floor: Option<f32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutsSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

impl Config {
    pub fn detections_path(&self) -> Option<&Path> {
        let path = self.detector.as_ref()?.detections_path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }

    /// Returns the detection confidence floor (default: 0.5)
    pub fn confidence_floor(&self) -> f32 {
        self.detector
            .as_ref()
            .and_then(|d| d.confidence_floor)
            .unwrap_or(DEFAULT_CONFIDENCE_FLOOR)
    }

    pub fn layouts_path(&self) -> Option<&Path> {
        let path = self.layouts.as_ref()?.path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn default_config_names_detections_and_layouts() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_default()?;
        assert!(config.detections_path().is_some());
        assert!(config.layouts_path().is_some());
        Ok(())
    }

    #[test]
    fn empty_detections_path_is_treated_as_missing() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = temp_dir.join(format!("lotwatch-config-{unique}.toml"));
        let contents = r#"
[app]
name = "lotwatch"

[logging]
level = "info"

[detector]
detections_path = ""
"#;
        fs::write(&path, contents)?;

        let result = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert!(result.detections_path().is_none());
        Ok(())
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = temp_dir.join(format!("lotwatch-config-minimal-{unique}.toml"));
        let contents = r#"
[app]
name = "lotwatch"

[logging]
level = "info"
"#;
        fs::write(&path, contents)?;

        let result = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert!(result.detections_path().is_none());
        assert!(result.layouts_path().is_none());
        assert_eq!(result.confidence_floor(), DEFAULT_CONFIDENCE_FLOOR);
        assert_eq!(result.server_port(), DEFAULT_SERVER_PORT);
        Ok(())
    }

    #[test]
    fn missing_config_file_returns_read_error() {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = temp_dir.join(format!("lotwatch-config-missing-{unique}.toml"));

        let result = load_from_path(&path);

        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn invalid_toml_returns_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = temp_dir.join(format!("lotwatch-config-invalid-{unique}.toml"));
        fs::write(&path, "not = [valid")?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        Ok(())
    }
}

use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, error};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid settings file {path}: {source}")]
    InvalidSettingsFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No home directory found")]
    NoHomeDir,

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Client settings.
/// Supported sources (in order of precedence):
/// - CLI arguments (by clap)
/// - Environment variables (by clap)
/// - Dot-env file (by clap and dotenv)
/// - Settings file
///   - Support Store and Load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// FAIR EVA evaluation endpoint
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Plugin → metadata endpoint lookup; derived from `api_endpoint` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints_url: Option<String>,

    /// Directory for persisted result files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(
        default = "default_request_timeout",
        rename = "request_timeout_ms",
        with = "duration_ms"
    )]
    pub request_timeout: Duration,

    #[serde(
        default = "default_connect_timeout",
        rename = "connect_timeout_ms",
        with = "duration_ms"
    )]
    pub connect_timeout: Duration,

    #[serde(default = "default_probe_attempts")]
    pub probe_attempts: u32,

    #[serde(
        default = "default_probe_delay",
        rename = "probe_delay_ms",
        with = "duration_ms"
    )]
    pub probe_delay: Duration,

    // for internal use
    #[serde(skip)]
    config_dir: Option<String>,
}

pub fn default_api_endpoint() -> String {
    "http://localhost:9090/v1.0/rda/rda_all".to_string()
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_probe_attempts() -> u32 {
    4
}

fn default_probe_delay() -> Duration {
    Duration::from_secs(5)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            endpoints_url: None,
            output_dir: default_output_dir(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            probe_attempts: default_probe_attempts(),
            probe_delay: default_probe_delay(),
            config_dir: None,
        }
    }
}

impl Settings {
    pub fn new(config_dir: String) -> Self {
        Self {
            config_dir: Some(config_dir),
            ..Default::default()
        }
    }

    /// Loads the settings file (if any) and applies CLI/env overrides on top.
    /// A settings file that exists but cannot be read or parsed is an error.
    pub fn initialize(
        config_dir: Option<String>,
        api_endpoint: Option<String>,
        output_dir: Option<PathBuf>,
    ) -> ConfigResult<Self> {
        let mut settings = match config_dir {
            Some(dir) => Settings::new(dir),
            None => Settings::default(),
        };
        match settings.load_settings() {
            Ok(_) => {}
            Err(ConfigError::NoHomeDir) => {
                debug!("No home directory found, using default settings")
            }
            Err(e) => {
                error!("Failed to load settings: {}", e);
                return Err(e);
            }
        }

        if let Some(endpoint) = api_endpoint {
            if !endpoint.is_empty() {
                settings.api_endpoint = endpoint;
            }
        }

        if let Some(dir) = output_dir {
            settings.output_dir = dir;
        }
        Ok(settings)
    }

    /// Get the settings file path, in `config_dir` or the user's config directory
    pub fn get_settings_file_path(&self) -> ConfigResult<PathBuf> {
        if let Some(parent) = self.config_dir.clone() {
            return Ok(Path::new(&parent).join(SETTINGS_FILE));
        }
        let proj_dirs =
            ProjectDirs::from("org", "fair-eva", "fair-eva").ok_or(ConfigError::NoHomeDir)?;
        Ok(proj_dirs.config_dir().join(SETTINGS_FILE))
    }

    pub fn load_settings(&mut self) -> ConfigResult<Settings> {
        let file_path = self.get_settings_file_path()?;
        if file_path.exists() {
            let mut file = File::open(&file_path)?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            let loaded: Self =
                serde_json::from_str(&contents).map_err(|source| ConfigError::InvalidSettingsFile {
                    path: file_path.display().to_string(),
                    source,
                })?;
            debug!("Loaded settings from {}", file_path.display());
            *self = Self {
                config_dir: self.config_dir.take(),
                ..loaded
            };
        }

        Ok(self.clone())
    }

    pub fn api_url(&self) -> ConfigResult<Url> {
        parse_url(&self.api_endpoint)
    }

    /// Endpoint answering `?plugin=<name>` with the plugin's metadata endpoint.
    pub fn endpoints_url(&self) -> ConfigResult<Url> {
        if let Some(url) = &self.endpoints_url {
            return parse_url(url);
        }
        let mut url = self.api_url()?;
        url.set_path("/v1.0/endpoints");
        url.set_query(None);
        Ok(url)
    }

    /// Host and port the readiness probe connects to.
    pub fn probe_target(&self) -> ConfigResult<(String, u16)> {
        let url = self.api_url()?;
        let host = url.host_str().ok_or_else(|| ConfigError::InvalidUrl {
            url: self.api_endpoint.clone(),
            reason: "missing host".to_string(),
        })?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| ConfigError::InvalidUrl {
                url: self.api_endpoint.clone(),
                reason: "missing port".to_string(),
            })?;
        Ok((host.to_string(), port))
    }
}

fn parse_url(url: &str) -> ConfigResult<Url> {
    Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use tempfile::TempDir;

    fn test_endpoint() -> String {
        "http://eva.example.org:8080/v1.0/rda/rda_all".to_string()
    }

    fn create_temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temporary directory")
    }

    fn setup_test_settings_file() -> TempDir {
        let temp_dir = create_temp_dir();
        let settings = Settings {
            api_endpoint: test_endpoint(),
            probe_attempts: 2,
            probe_delay: Duration::from_millis(10),
            config_dir: temp_dir.path().to_str().map(|s| s.to_string()),
            ..Default::default()
        };
        save_settings(&settings);
        temp_dir
    }

    fn save_settings(settings: &Settings) {
        let file_path = settings.get_settings_file_path().unwrap();
        fs::create_dir_all(file_path.parent().unwrap()).unwrap();
        fs::write(file_path, serde_json::to_string_pretty(settings).unwrap()).unwrap();
    }

    fn config_dir_of(dir: &TempDir) -> Option<String> {
        dir.path().to_str().map(|d| d.to_string())
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.api_endpoint, default_api_endpoint());
        assert_eq!(settings.probe_attempts, 4);
        assert_eq!(settings.probe_delay, Duration::from_secs(5));
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_settings_serialization() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["probe_delay_ms"], 5000);
        assert_eq!(json["request_timeout_ms"], 30000);

        let partial: Settings =
            serde_json::from_str(r#"{"probe_attempts": 1, "probe_delay_ms": 250}"#).unwrap();
        assert_eq!(partial.probe_attempts, 1);
        assert_eq!(partial.probe_delay, Duration::from_millis(250));
        assert_eq!(partial.api_endpoint, default_api_endpoint());
    }

    #[test]
    fn test_initialize_settings() {
        let dir = setup_test_settings_file();
        let settings = Settings::initialize(config_dir_of(&dir), None, None).unwrap();
        assert_eq!(settings.api_endpoint, test_endpoint());
        assert_eq!(settings.probe_attempts, 2);

        let settings = Settings::initialize(
            config_dir_of(&dir),
            Some("http://other.example.org/eval".to_string()),
            Some(PathBuf::from("/var/tmp")),
        )
        .unwrap();
        assert_eq!(settings.api_endpoint, "http://other.example.org/eval");
        assert_eq!(settings.output_dir, PathBuf::from("/var/tmp"));
        assert_eq!(settings.probe_attempts, 2);
    }

    #[test]
    fn test_initialize_without_settings_file_uses_defaults() {
        let dir = create_temp_dir();
        let settings = Settings::initialize(config_dir_of(&dir), None, None).unwrap();
        assert_eq!(settings.api_endpoint, default_api_endpoint());
        assert_eq!(settings.probe_attempts, 4);
    }

    #[test]
    fn test_initialize_rejects_malformed_settings_file() {
        let dir = create_temp_dir();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"api_endpoint": "http://eva:1/x", "probe_attempts": "four"}"#,
        )
        .unwrap();

        let err = Settings::initialize(config_dir_of(&dir), None, None).unwrap_err();
        match err {
            ConfigError::InvalidSettingsFile { ref path, .. } => {
                assert!(path.ends_with(SETTINGS_FILE))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("Invalid settings file"));

        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert!(matches!(
            Settings::initialize(config_dir_of(&dir), None, None),
            Err(ConfigError::InvalidSettingsFile { .. })
        ));
    }

    #[test]
    fn test_derived_urls() {
        let settings = Settings {
            api_endpoint: test_endpoint(),
            ..Default::default()
        };
        assert_eq!(
            settings.endpoints_url().unwrap().as_str(),
            "http://eva.example.org:8080/v1.0/endpoints"
        );
        assert_eq!(
            settings.probe_target().unwrap(),
            ("eva.example.org".to_string(), 8080)
        );

        let default_port = Settings {
            api_endpoint: "https://eva.example.org/v1.0/rda/rda_all".to_string(),
            ..Default::default()
        };
        assert_eq!(default_port.probe_target().unwrap().1, 443);

        let invalid = Settings {
            api_endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            invalid.probe_target(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Scoring parameters. Every field has a default so a partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub version: f32,
    pub model_path: String,
    pub input_size: u32,
    pub epsilon: f32,
    /// Fixed divisor for the entropy. `None` means `ln(class count)` of the loaded model.
    pub entropy_normalizer: Option<f32>,
    pub threshold: f32,
    pub max_video_frames: usize,
    pub max_upload_bytes: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: 1.0,
            model_path: "models/xception.pt".to_string(),
            input_size: 299,
            epsilon: 1e-9,
            entropy_normalizer: None,
            threshold: 0.5,
            max_video_frames: 5,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ScoringConfig {
    /// Reads `SCORING_CONFIG` if set, otherwise `config/scoring.yaml` next to the
    /// workspace. A missing default file yields the built-in defaults.
    /// `MODEL_PATH` overrides the model location either way.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("SCORING_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => {
                let path = default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    log::warn!(
                        "No config at {}, using built-in scoring defaults",
                        path.display()
                    );
                    Self::default()
                }
            }
        };

        if let Ok(model_path) = std::env::var("MODEL_PATH") {
            config.model_path = model_path;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        let config: ScoringConfig = serde_yaml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_size == 0 {
            return Err(ConfigError::Invalid {
                field: "input_size",
                reason: "must be greater than zero".into(),
            });
        }
        if !(self.epsilon > 0.0) {
            return Err(ConfigError::Invalid {
                field: "epsilon",
                reason: format!("must be positive, got {}", self.epsilon),
            });
        }
        if let Some(normalizer) = self.entropy_normalizer {
            if !(normalizer > 0.0) || !normalizer.is_finite() {
                return Err(ConfigError::Invalid {
                    field: "entropy_normalizer",
                    reason: format!("must be a positive finite number, got {}", normalizer),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Invalid {
                field: "threshold",
                reason: format!("must lie in [0, 1], got {}", self.threshold),
            });
        }
        if self.max_video_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "max_video_frames",
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_upload_bytes",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => PathBuf::from(format!("{}/../config/scoring.yaml", manifest_dir)),
        Err(_) => PathBuf::from("config/scoring.yaml"),
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_dir: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(port) => port.parse().map_err(|_| ConfigError::Invalid {
                field: "PORT",
                reason: format!("not a port number: {}", port),
            })?,
            Err(_) => 10000,
        };

        let frontend_dir = std::env::var("FRONTEND_DIR").unwrap_or_else(|_| {
            if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
                format!("{}/../frontend/dist", manifest_dir)
            } else {
                "/usr/src/app/frontend/dist".to_string()
            }
        });

        Ok(Self { port, frontend_dir })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classifier_contract() {
        let config = ScoringConfig::default();
        assert_eq!(config.input_size, 299);
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.max_video_frames, 5);
        assert_eq!(config.entropy_normalizer, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config = ScoringConfig::from_yaml("threshold: 0.7\nentropy_normalizer: 6.9\n").unwrap();
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.entropy_normalizer, Some(6.9));
        assert_eq!(config.input_size, 299);
        assert_eq!(config.max_video_frames, 5);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let err = ScoringConfig::from_yaml("threshold: 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "threshold", .. }));
    }

    #[test]
    fn rejects_zero_frame_cap_and_bad_normalizer() {
        assert!(ScoringConfig::from_yaml("max_video_frames: 0\n").is_err());
        assert!(ScoringConfig::from_yaml("entropy_normalizer: 0.0\n").is_err());
        assert!(ScoringConfig::from_yaml("input_size: 0\n").is_err());
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = ScoringConfig::from_yaml("threshold: [not a number").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"max_video_frames: 3\n").unwrap();
        let config = ScoringConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_video_frames, 3);
    }

    #[test]
    fn bind_address_uses_port() {
        let config = ServerConfig {
            port: 8081,
            frontend_dir: "dist".into(),
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
    }
}

//! # Audit Configuration
//!
//! Scoring weights and policy thresholds, loadable from YAML:
//!
//! ```yaml
//! scoring:
//!   emissions: 0.4
//!   compliance: 0.3
//!   signals: 0.3
//!   flag_normalizer: 5
//!   signal_normalizer: 4
//! policy:
//!   review: 0.5
//!   hitl: 0.8
//! ```
//!
//! Every field is optional; omitted fields take the default policy values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::{PolicyEvaluator, PolicyThresholds};
use crate::scoring::{RiskScorer, ScoringWeights};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Errors loading or validating an [`AuditConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid YAML for this schema.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Inline YAML could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is outside its permitted range.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunable audit parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub scoring: ScoringWeights,
    pub policy: PolicyThresholds,
}

impl AuditConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded audit config");
        Ok(config)
    }

    /// Parse and validate inline YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.scoring;
        for (field, value) in [
            ("scoring.emissions", w.emissions),
            ("scoring.compliance", w.compliance),
            ("scoring.signals", w.signals),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("weight must be a non-negative number, got {value}"),
                });
            }
        }
        let sum = w.total_weight();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Invalid {
                field: "scoring",
                reason: format!("weights must sum to 1, got {sum}"),
            });
        }
        for (field, value) in [
            ("scoring.flag_normalizer", w.flag_normalizer),
            ("scoring.signal_normalizer", w.signal_normalizer),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("normalizer must be positive, got {value}"),
                });
            }
        }

        let p = &self.policy;
        if !(0.0..=1.0).contains(&p.review) || !(0.0..=1.0).contains(&p.hitl) {
            return Err(ConfigError::Invalid {
                field: "policy",
                reason: format!("thresholds must lie in [0, 1], got {} and {}", p.review, p.hitl),
            });
        }
        if p.review >= p.hitl {
            return Err(ConfigError::Invalid {
                field: "policy",
                reason: format!(
                    "review threshold {} must be below hitl threshold {}",
                    p.review, p.hitl
                ),
            });
        }
        Ok(())
    }

    /// Scorer configured with these weights.
    pub fn scorer(&self) -> RiskScorer {
        RiskScorer::new(self.scoring)
    }

    /// Evaluator configured with these thresholds.
    pub fn evaluator(&self) -> PolicyEvaluator {
        PolicyEvaluator::new(self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        AuditConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = AuditConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AuditConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = AuditConfig::from_yaml_str("policy:\n  hitl: 0.9\n").unwrap();
        assert_eq!(config.policy.hitl, 0.9);
        assert_eq!(config.policy.review, 0.5);
        assert_eq!(config.scoring, ScoringWeights::default());
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let err = AuditConfig::from_yaml_str("scoring:\n  emissions: 0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "scoring", .. }));
    }

    #[test]
    fn rejects_negative_weight() {
        let yaml = "scoring:\n  emissions: 1.2\n  compliance: -0.2\n  signals: 0.0\n";
        let err = AuditConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "scoring.compliance",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_normalizer() {
        let err = AuditConfig::from_yaml_str("scoring:\n  flag_normalizer: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "scoring.flag_normalizer",
                ..
            }
        ));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = AuditConfig::from_yaml_str("policy:\n  review: 0.8\n  hitl: 0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "policy", .. }));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            AuditConfig::from_yaml_str("polcy: {}\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn invalid_display_names_field() {
        let err = ConfigError::Invalid {
            field: "policy",
            reason: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "invalid policy: bad");
    }
}

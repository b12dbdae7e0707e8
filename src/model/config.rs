use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub adj_p_threshold: f64,
    pub log2fc_threshold: f64,
    pub epsilon: f64,
    pub top_k: usize,
    pub min_edge_score: f64,
    pub report_alpha: f64,
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            adj_p_threshold: 0.05,
            log2fc_threshold: 0.5,
            epsilon: 1e-9,
            top_k: 10,
            min_edge_score: 0.4,
            report_alpha: 0.05,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: AnalysisConfig = toml::from_str(text)?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if !(self.adj_p_threshold > 0.0 && self.adj_p_threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "adj_p_threshold",
                reason: format!("{} not in (0, 1]", self.adj_p_threshold),
            });
        }
        if !(self.log2fc_threshold >= 0.0 && self.log2fc_threshold.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "log2fc_threshold",
                reason: format!("{} must be finite and >= 0", self.log2fc_threshold),
            });
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "epsilon",
                reason: format!("{} must be finite and > 0", self.epsilon),
            });
        }
        if !(0.0..=1.0).contains(&self.min_edge_score) {
            return Err(ConfigError::Invalid {
                field: "min_edge_score",
                reason: format!("{} not in [0, 1]", self.min_edge_score),
            });
        }
        if !(self.report_alpha > 0.0 && self.report_alpha <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "report_alpha",
                reason: format!("{} not in (0, 1]", self.report_alpha),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/config.rs"]
mod tests;

//! Configuration for lineage extraction.

use crate::error::{Result, TributaryError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by every execution context of a deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Namespace stamped on the job of every emitted event.
    pub job_namespace: String,
    /// Facet keys stripped from datasets and runs before emission.
    pub disabled_facets: Vec<String>,
    /// Whether `on_completed` re-extracts datasets and emits a COMPLETE
    /// event.
    pub emit_on_complete: bool,
    /// Buffer capacity of the channel emitter.
    pub emitter_buffer: usize,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            job_namespace: "default".to_string(),
            disabled_facets: Vec::new(),
            emit_on_complete: true,
            emitter_buffer: 1024,
        }
    }
}

impl LineageConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TributaryError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| TributaryError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.job_namespace.is_empty() {
            return Err(TributaryError::InvalidConfig {
                field: "job_namespace".to_string(),
                reason: "Job namespace must be non-empty".to_string(),
            });
        }

        if self.emitter_buffer == 0 {
            return Err(TributaryError::InvalidConfig {
                field: "emitter_buffer".to_string(),
                reason: "Emitter buffer must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = LineageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.job_namespace, "default");
        assert!(config.emit_on_complete);
    }

    #[test]
    fn test_validation_rejects_empty_namespace() {
        let config = LineageConfig {
            job_namespace: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_buffer() {
        let config = LineageConfig {
            emitter_buffer: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_json() {
        let config = LineageConfig {
            job_namespace: "pipelines".to_string(),
            disabled_facets: vec!["schema".to_string()],
            emit_on_complete: false,
            emitter_buffer: 16,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: LineageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.job_namespace, "pipelines");
        assert_eq!(parsed.disabled_facets, vec!["schema".to_string()]);
        assert!(!parsed.emit_on_complete);
    }
}

use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::Path,
};

use crate::error::GenJsonError;

/// Traversal depth ceiling used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Engine settings for one [`crate::session::Session`].
///
/// Loaded from TOML; every field is optional:
///
/// ```toml
/// max_depth = 6
/// enforce_schema = true
/// report_asymmetric = false
/// follow_back_edges = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hard ceiling on tree depth, counted in edges from the root.
    pub max_depth: usize,
    /// Abort loading when the schema oracle rejects the document. When `false` its findings are
    /// recorded as warnings and loading continues.
    pub enforce_schema: bool,
    pub report_asymmetric: bool,
    /// Let traversal expand along derived back-edges, not only declared ones.
    pub follow_back_edges: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            enforce_schema: false,
            report_asymmetric: true,
            follow_back_edges: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, GenJsonError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GenJsonError> {
        tracing::debug!("Reading engine config from: {:?}", path.as_ref());
        let content = read_to_string(path)?;
        EngineConfig::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, GenJsonError> {
        Ok(toml::to_string(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GenJsonError> {
        tracing::debug!("Writing engine config to: {:?}", path.as_ref());
        write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<(), GenJsonError> {
        if self.max_depth == 0 {
            return Err(GenJsonError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

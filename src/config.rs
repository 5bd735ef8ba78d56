//! Job configuration
//!
//! A single job is described by its partition count plus a few execution knobs.
//! Configurations can be built in code or loaded from YAML:
//!
//! ```yaml
//! partitions: 5
//! parse_mode: strict
//! parallel: true
//! threads: 8
//! ```

use crate::error::{TriangleError, TriangleResult};
use crate::input::ParseMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tripart_algorithms::PartitionCount;

/// Configuration for one triangle counting job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Number of buckets `p`; must be greater than 1
    pub partitions: u64,
    /// What to do with input records that are not two integers
    pub parse_mode: ParseMode,
    /// Reduce partition groups on a thread pool
    pub parallel: bool,
    /// Worker threads for the pool (None = rayon default)
    pub threads: Option<usize>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            partitions: 3,
            parse_mode: ParseMode::Lenient,
            parallel: true,
            threads: None,
        }
    }
}

impl JobConfig {
    /// Create a configuration with the given partition count and defaults otherwise
    pub fn new(partitions: u64) -> Self {
        Self {
            partitions,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> TriangleResult<Self> {
        let config: JobConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> TriangleResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Validate configuration, returning the checked partition count
    pub fn validate(&self) -> TriangleResult<PartitionCount> {
        let partitions = PartitionCount::new(self.partitions)?;

        if self.threads == Some(0) {
            return Err(TriangleError::Configuration(
                "threads must be at least 1".to_string(),
            ));
        }

        Ok(partitions)
    }
}

//! Sort tunables, loadable from TOML. Every field has a default so partial
//! files work.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SortError, SortResult};
use crate::key::DEFAULT_DEPTH_OFFSET;

pub const DEFAULT_MAX_SPLATS: usize = 1_000_000;
pub const DEFAULT_MAX_SORTERS: usize = 8;
pub const DEFAULT_POOL_BUFFERS: usize = 2;

/// What to do when a depth key leaves the positive range of the offset or is
/// not finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthCheck {
    Ignore,
    #[default]
    Warn,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Added to the negated projected distance; should exceed the largest
    /// expected camera-to-splat distance.
    pub depth_offset: f32,
    pub depth_check: DepthCheck,
    /// Records beyond this count are dropped when a sorter is created.
    pub max_splats: usize,
    pub max_sorters: usize,
    /// Free output buffers a sorter keeps around (2 = double buffering).
    pub pool_buffers: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            depth_offset: DEFAULT_DEPTH_OFFSET,
            depth_check: DepthCheck::default(),
            max_splats: DEFAULT_MAX_SPLATS,
            max_sorters: DEFAULT_MAX_SORTERS,
            pool_buffers: DEFAULT_POOL_BUFFERS,
        }
    }
}

impl SortConfig {
    pub fn load(path: &Path) -> SortResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SortResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> SortResult<String> {
        toml::to_string_pretty(self).map_err(|e| SortError::Config(e.to_string()))
    }

    pub fn validate(&self) -> SortResult<()> {
        if !self.depth_offset.is_finite() || self.depth_offset <= 0.0 {
            return Err(SortError::InvalidDepthOffset(self.depth_offset));
        }
        if self.max_sorters == 0 {
            return Err(SortError::Config("max_sorters must be at least 1".to_string()));
        }
        Ok(())
    }
}

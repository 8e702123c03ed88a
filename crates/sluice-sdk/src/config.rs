//! Configuration types for the pipeline processor

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use sluice_runtime::DEFAULT_MAX_PROCESSING_PASSES;
use std::path::Path;

/// Processor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Run rules through the closure compiler instead of walking the AST
    pub compile_rules: bool,

    /// Memoize stage layouts per pipeline set
    pub cached_stage_layouts: bool,

    /// Upper bound on re-passes of one batch; `None` means unbounded
    pub max_processing_passes: Option<usize>,

    /// Window in milliseconds during which change notifications are merged
    /// into one reload
    pub reload_debounce_ms: u64,

    /// Capacity of the bounded change-event channel
    pub event_channel_capacity: usize,
}

impl ProcessorConfig {
    pub fn new() -> Self {
        Self {
            compile_rules: true,
            cached_stage_layouts: true,
            max_processing_passes: Some(DEFAULT_MAX_PROCESSING_PASSES),
            reload_debounce_ms: 0,
            event_channel_capacity: 64,
        }
    }

    pub fn with_compile_rules(mut self, enable: bool) -> Self {
        self.compile_rules = enable;
        self
    }

    pub fn with_cached_stage_layouts(mut self, enable: bool) -> Self {
        self.cached_stage_layouts = enable;
        self
    }

    pub fn with_max_processing_passes(mut self, passes: Option<usize>) -> Self {
        self.max_processing_passes = passes;
        self
    }

    pub fn with_reload_debounce_ms(mut self, millis: u64) -> Self {
        self.reload_debounce_ms = millis;
        self
    }

    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// Parse a configuration from YAML. Missing keys take their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Reject values the processor cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.event_channel_capacity == 0 {
            return Err(SdkError::Config(
                "event_channel_capacity must be positive".to_string(),
            ));
        }
        if self.max_processing_passes == Some(0) {
            return Err(SdkError::Config(
                "max_processing_passes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

use serde::{Deserialize, Serialize};

use crate::core::NormalizerConfig;
use crate::error::{ChartError, ChartResult};
use crate::interaction::{ClickConfig, TimePoint};
use crate::render::{ApplyOptions, InitOptions};

/// Public host bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart setup
/// without inventing their own ad-hoc format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Quiet period after the last resize request before the engine resizes.
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce: TimePoint,
    #[serde(default)]
    pub click: ClickConfig,
    /// Flags used by `apply_specification` when the caller passes none.
    #[serde(default)]
    pub apply: ApplyOptions,
    #[serde(default)]
    pub init: InitOptions,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            resize_debounce: default_resize_debounce(),
            click: ClickConfig::default(),
            apply: ApplyOptions::default(),
            init: InitOptions::default(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl HostConfig {
    /// Sets the resize debounce window.
    #[must_use]
    pub fn with_resize_debounce(mut self, resize_debounce: TimePoint) -> Self {
        self.resize_debounce = resize_debounce;
        self
    }

    /// Sets the double-click window.
    #[must_use]
    pub fn with_double_click_delay(mut self, delay: TimePoint) -> Self {
        self.click.double_click_delay = delay;
        self
    }

    /// Enables or disables shift-click multi-selection.
    #[must_use]
    pub fn with_multi_select(mut self, enabled: bool) -> Self {
        self.click.multi_select = enabled;
        self
    }

    /// Sets default apply flags.
    #[must_use]
    pub fn with_apply_options(mut self, options: ApplyOptions) -> Self {
        self.apply = options;
        self
    }

    /// Sets engine creation options.
    #[must_use]
    pub fn with_init_options(mut self, options: InitOptions) -> Self {
        self.init = options;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if self.click.double_click_delay == 0 {
            return Err(ChartError::InvalidData(
                "double-click delay must be > 0".to_owned(),
            ));
        }
        if self.normalizer.shape_sample_size == 0 {
            return Err(ChartError::InvalidData(
                "normalizer shape sample size must be > 0".to_owned(),
            ));
        }
        self.init.validate()
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize host config: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse host config json: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn default_resize_debounce() -> TimePoint {
    100
}

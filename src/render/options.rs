use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Painting backend requested from the engine at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    #[default]
    Canvas,
    Svg,
}

/// Options passed to the engine's `create` entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitOptions {
    #[serde(default)]
    pub renderer: RendererKind,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub locale: Option<String>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            renderer: RendererKind::default(),
            device_pixel_ratio: default_device_pixel_ratio(),
            locale: None,
        }
    }
}

impl InitOptions {
    pub fn validate(&self) -> ChartResult<()> {
        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "device pixel ratio must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_device_pixel_ratio() -> f64 {
    1.0
}

/// Flags controlling one apply call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplyOptions {
    /// Replace the prior specification instead of merging into it.
    #[serde(default)]
    pub full_replace: bool,
    /// Allow the engine to postpone the visual update.
    #[serde(default)]
    pub defer_visual_update: bool,
    /// Skip the fingerprint gate and always reach the engine.
    #[serde(default)]
    pub force: bool,
}

impl ApplyOptions {
    #[must_use]
    pub fn with_full_replace(mut self, full_replace: bool) -> Self {
        self.full_replace = full_replace;
        self
    }

    #[must_use]
    pub fn with_defer_visual_update(mut self, defer_visual_update: bool) -> Self {
        self.defer_visual_update = defer_visual_update;
        self
    }

    #[must_use]
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

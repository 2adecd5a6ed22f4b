use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::Alignment;
use crate::error::{ChartError, ChartResult, EngineError};

/// Transform request forwarded to an external statistics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: Value,
}

impl TransformRequest {
    #[must_use]
    pub fn new(kind: impl Into<String>, config: Value) -> Self {
        Self {
            kind: kind.into(),
            config,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformOutput {
    pub points: Vec<Vec<f64>>,
    /// Derived data such as a fitted-curve expression.
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl TransformOutput {
    #[must_use]
    pub fn expression(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.get("expression"))
            .and_then(Value::as_str)
    }
}

/// Statistical transform (clustering, regression, ...) treated as a black box.
pub trait StatisticalTransform {
    fn kind(&self) -> &str;
    fn apply(&self, dataset: &[Vec<f64>], config: &Value) -> Result<TransformOutput, EngineError>;
}

/// Transforms available to a host, built once and passed by reference.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: Vec<Box<dyn StatisticalTransform>>,
}

impl TransformRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transform with a unique kind.
    pub fn register(&mut self, transform: Box<dyn StatisticalTransform>) -> ChartResult<()> {
        let kind = transform.kind().to_owned();
        if kind.is_empty() {
            return Err(ChartError::InvalidData(
                "transform kind must not be empty".to_owned(),
            ));
        }
        if self.contains(&kind) {
            return Err(ChartError::InvalidData(format!(
                "transform `{kind}` is already registered"
            )));
        }
        self.transforms.push(transform);
        Ok(())
    }

    /// Unregisters a transform by kind. Returns `true` when removed.
    pub fn unregister(&mut self, kind: &str) -> bool {
        if let Some(position) = self.transforms.iter().position(|entry| entry.kind() == kind) {
            self.transforms.remove(position);
            return true;
        }
        false
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.transforms.iter().any(|entry| entry.kind() == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn run(
        &self,
        request: &TransformRequest,
        dataset: &[Vec<f64>],
    ) -> ChartResult<TransformOutput> {
        let transform = self
            .transforms
            .iter()
            .find(|entry| entry.kind() == request.kind)
            .ok_or_else(|| {
                ChartError::InvalidData(format!("unknown transform `{}`", request.kind))
            })?;
        let output = transform.apply(dataset, &request.config).map_err(|err| {
            ChartError::InvalidData(format!("transform `{}` failed: {err}", request.kind))
        })?;
        debug!(
            kind = %request.kind,
            input_len = dataset.len(),
            output_len = output.points.len(),
            "ran statistical transform"
        );
        Ok(output)
    }
}

/// `[x, y]` rows for one aligned series, skipping gaps.
///
/// Numeric domain keys are used as x; other keys fall back to their position.
#[must_use]
pub fn dataset_for_series(alignment: &Alignment, name: &str) -> Option<Vec<Vec<f64>>> {
    let series = alignment.series(name)?;
    Some(
        alignment
            .domain
            .iter()
            .zip(&series.values)
            .enumerate()
            .filter_map(|(index, (key, value))| {
                let x = key.as_f64().unwrap_or(index as f64);
                value.map(|y| vec![x, y])
            })
            .collect(),
    )
}

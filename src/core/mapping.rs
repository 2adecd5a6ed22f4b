use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChartError, ChartResult};

use super::{Record, Scalar};

/// One y-field name or several, each producing its own series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YFields {
    One(String),
    Many(Vec<String>),
}

impl YFields {
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(field) => std::slice::from_ref(field),
            Self::Many(fields) => fields,
        }
    }
}

/// Field-mapping declaration handed in by the caller alongside the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub x_field: String,
    pub y_fields: YFields,
    #[serde(default)]
    pub group_by: Option<String>,
    /// Specification fragments merged into the matching series entry.
    #[serde(default)]
    pub overrides: IndexMap<String, Value>,
}

impl FieldMapping {
    #[must_use]
    pub fn new(x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        Self {
            x_field: x_field.into(),
            y_fields: YFields::One(y_field.into()),
            group_by: None,
            overrides: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_y_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.y_fields = YFields::Many(fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_override(mut self, series: impl Into<String>, fragment: Value) -> Self {
        self.overrides.insert(series.into(), fragment);
        self
    }

    #[must_use]
    pub fn y_fields(&self) -> &[String] {
        self.y_fields.as_slice()
    }
}

/// One logical series before alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSource {
    pub name: String,
    pub records: Vec<Record>,
    pub x_field: String,
    pub y_field: String,
    pub overrides: Option<Value>,
}

impl SeriesSource {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        x_field: impl Into<String>,
        y_field: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            name: name.into(),
            records,
            x_field: x_field.into(),
            y_field: y_field.into(),
            overrides: None,
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: Value) -> Self {
        self.overrides = Some(overrides);
        self
    }
}

/// Input data, classified once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Records(Vec<Record>),
    Tuples(Vec<Vec<Scalar>>),
    /// Caller-built series; validated instead of normalized.
    Series(Vec<SeriesSource>),
}

impl DataSource {
    /// Classifies a JSON array.
    ///
    /// The array is record-shaped when it is non-empty and its first element is
    /// an object; every other array is tuple data. A bare scalar at index `i`
    /// becomes the row `[i, value]`.
    pub fn from_json(value: &Value) -> ChartResult<Self> {
        let items = value.as_array().ok_or_else(|| {
            ChartError::InvalidData("chart data must be a JSON array".to_owned())
        })?;

        if matches!(items.first(), Some(Value::Object(_))) {
            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let object = item.as_object().ok_or_else(|| {
                    ChartError::InvalidData(format!(
                        "record-shaped data has a non-object element at index {index}"
                    ))
                })?;
                records.push(Record::from_json_object(object)?);
            }
            return Ok(Self::Records(records));
        }

        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let row = match item {
                Value::Array(cells) => cells
                    .iter()
                    .map(Scalar::from_json)
                    .collect::<ChartResult<Vec<_>>>()?,
                Value::Object(_) => {
                    return Err(ChartError::InvalidData(format!(
                        "tuple data has an object element at index {index}"
                    )));
                }
                scalar => vec![Scalar::number(index as f64), Scalar::from_json(scalar)?],
            };
            rows.push(row);
        }
        Ok(Self::Tuples(rows))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Records(records) => records.is_empty(),
            Self::Tuples(rows) => rows.is_empty(),
            Self::Series(series) => series.is_empty(),
        }
    }
}

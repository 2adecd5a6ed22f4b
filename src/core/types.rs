use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::primitives::{datetime_to_unix_millis, decimal_to_f64};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Stable identity of a drawing surface owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(u64);

impl SurfaceId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Drawing surface an engine instance binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    pub id: SurfaceId,
    pub viewport: Viewport,
}

impl Surface {
    #[must_use]
    pub fn new(id: SurfaceId, viewport: Viewport) -> Self {
        Self { id, viewport }
    }
}

/// Single cell value read from a record.
///
/// Numbers use `OrderedFloat` so scalars can key the alignment domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn from_decimal(value: Decimal) -> ChartResult<Self> {
        Ok(Self::number(decimal_to_f64(value, "decimal scalar")?))
    }

    /// Reads a JSON leaf. Nested arrays and objects are not scalars.
    pub fn from_json(value: &Value) -> ChartResult<Self> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(flag) => Ok(Self::Bool(*flag)),
            Value::Number(number) => number
                .as_f64()
                .map(Self::number)
                .ok_or_else(|| ChartError::InvalidData(format!("number {number} is not finite"))),
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Array(_) | Value::Object(_) => Err(ChartError::InvalidData(
                "record values must be scalars, found a nested container".to_owned(),
            )),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => serde_json::Number::from_f64(number.0)
                .map_or(Value::Null, Value::Number),
            Self::Text(text) => Value::String(text.clone()),
            Self::Timestamp(time) => Value::String(time.to_rfc3339()),
        }
    }

    /// Numeric reading used for series values.
    ///
    /// Numeric text is parsed; timestamps become epoch milliseconds.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) if number.0.is_finite() => Some(number.0),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::Timestamp(time) => Some(datetime_to_unix_millis(*time)),
            Self::Null | Self::Bool(_) | Self::Number(_) => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{}", number.0),
            Self::Text(text) => f.write_str(text),
            Self::Timestamp(time) => f.write_str(&time.to_rfc3339()),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Ordered field-name to scalar mapping. Field order follows the source.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Record(IndexMap<String, Scalar>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn from_json_object(object: &Map<String, Value>) -> ChartResult<Self> {
        let mut fields = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            fields.insert(key.clone(), Scalar::from_json(value)?);
        }
        Ok(Self(fields))
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.0.get(field)
    }

    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, Scalar};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn numeric_text_reads_as_number() {
        assert_eq!(Scalar::text(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(Scalar::text("Jan").as_f64(), None);
        assert_eq!(Scalar::Null.as_f64(), None);
    }

    #[test]
    fn timestamp_reads_as_epoch_millis() {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid time");
        assert_eq!(Scalar::from(time).as_f64(), Some(1_704_067_200_000.0));
    }

    #[test]
    fn decimal_scalar_converts_to_number() {
        let scalar = Scalar::from_decimal(Decimal::new(1_250, 2)).expect("decimal");
        assert_eq!(scalar, Scalar::number(12.5));
    }

    #[test]
    fn record_from_json_keeps_field_order_and_rejects_containers() {
        let value = json!({"month": "Jan", "sales": 10, "region": null});
        let record = Record::from_json_object(value.as_object().expect("object")).expect("record");
        assert_eq!(
            record.field_names().collect::<Vec<_>>(),
            vec!["month", "sales", "region"]
        );
        assert!(record.get("region").expect("region").is_null());

        let nested = json!({"values": [1, 2]});
        assert!(Record::from_json_object(nested.as_object().expect("object")).is_err());
    }
}

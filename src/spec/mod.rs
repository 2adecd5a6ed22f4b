//! Renderer-ready chart specifications and change detection.

mod fingerprint;

pub use fingerprint::{Fingerprint, fingerprint, fingerprint_value, should_apply};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::core::{Alignment, SeriesSource};

/// Opaque specification tree handed to the engine's apply entry point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Specification(Value);

impl Specification {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Top-level keys, reported as diagnostic context when an apply fails.
    #[must_use]
    pub fn top_level_keys(&self) -> Vec<String> {
        self.0
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Names of entries in the `series` array, in declaration order.
    #[must_use]
    pub fn series_names(&self) -> Vec<String> {
        self.0
            .get("series")
            .and_then(Value::as_array)
            .map(|series| {
                series
                    .iter()
                    .filter_map(|entry| entry.get("name").and_then(Value::as_str))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(self)
    }
}

impl From<Value> for Specification {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Builds a category-axis specification from aligned series.
///
/// `kind` becomes each series' `type`. Object overrides on the matching
/// source are merged over the generated series entry.
#[must_use]
pub fn assemble_specification(
    alignment: &Alignment,
    kind: &str,
    sources: &[SeriesSource],
) -> Specification {
    let names: Vec<&str> = alignment
        .aligned
        .iter()
        .map(|series| series.name.as_str())
        .collect();
    let categories: Vec<Value> = alignment.domain.iter().map(|key| key.to_json()).collect();

    let series: Vec<Value> = alignment
        .aligned
        .iter()
        .map(|aligned| {
            let mut entry = Map::new();
            entry.insert("name".to_owned(), Value::String(aligned.name.clone()));
            entry.insert("type".to_owned(), Value::String(kind.to_owned()));
            entry.insert(
                "data".to_owned(),
                Value::Array(
                    aligned
                        .values
                        .iter()
                        .map(|value| {
                            value
                                .and_then(serde_json::Number::from_f64)
                                .map_or(Value::Null, Value::Number)
                        })
                        .collect(),
                ),
            );
            let overrides = sources
                .iter()
                .find(|source| source.name == aligned.name)
                .and_then(|source| source.overrides.as_ref())
                .and_then(Value::as_object);
            if let Some(overrides) = overrides {
                for (key, value) in overrides {
                    entry.insert(key.clone(), value.clone());
                }
            }
            Value::Object(entry)
        })
        .collect();

    Specification::new(json!({
        "legend": { "data": names },
        "xAxis": { "type": "category", "data": categories },
        "yAxis": { "type": "value" },
        "series": series,
    }))
}

#[cfg(test)]
mod tests {
    use super::{Specification, assemble_specification};
    use crate::core::{Record, SeriesSource, align};
    use serde_json::json;

    #[test]
    fn assembled_specification_carries_domain_and_aligned_values() {
        let a = SeriesSource::new(
            "A",
            "month",
            "value",
            vec![
                Record::new().with("month", "Jan").with("value", 10.0),
                Record::new().with("month", "Feb").with("value", 20.0),
            ],
        )
        .with_overrides(json!({"smooth": true}));
        let b = SeriesSource::new(
            "B",
            "month",
            "value",
            vec![Record::new().with("month", "Mar").with("value", 15.0)],
        );
        let sources = vec![a, b];
        let alignment = align(&sources).expect("align");

        let spec = assemble_specification(&alignment, "line", &sources);
        let value = spec.as_value();
        assert_eq!(value["xAxis"]["data"], json!(["Jan", "Feb", "Mar"]));
        assert_eq!(value["legend"]["data"], json!(["A", "B"]));
        assert_eq!(value["series"][0]["data"], json!([10.0, 20.0, null]));
        assert_eq!(value["series"][0]["smooth"], json!(true));
        assert_eq!(value["series"][1]["type"], json!("line"));
        assert_eq!(spec.series_names(), vec!["A", "B"]);
    }

    #[test]
    fn top_level_keys_of_non_object_are_empty() {
        assert!(Specification::new(json!([1, 2])).top_level_keys().is_empty());
        let keys = Specification::new(json!({"series": [], "xAxis": {}})).top_level_keys();
        assert_eq!(keys, vec!["series", "xAxis"]);
    }
}

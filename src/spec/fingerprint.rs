use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use super::Specification;

/// Cheap structural signature of a specification.
///
/// Structurally equal specifications always share a fingerprint. The reverse
/// does not hold: arrays are sampled at their first, middle and last element,
/// so edits confined to other positions go unnoticed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[must_use]
pub fn fingerprint(spec: &Specification) -> Fingerprint {
    Fingerprint(fingerprint_value(spec.as_value()))
}

/// Returns `true` when there is no previous fingerprint or the two differ.
#[must_use]
pub fn should_apply(previous: Option<&Fingerprint>, candidate: &Fingerprint) -> bool {
    previous != Some(candidate)
}

#[must_use]
pub fn fingerprint_value(value: &Value) -> String {
    match value {
        Value::Array(items) => fingerprint_array(items),
        Value::Object(object) => fingerprint_object(object),
        scalar => scalar_form(scalar),
    }
}

fn fingerprint_array(items: &[Value]) -> String {
    let Some(last_index) = items.len().checked_sub(1) else {
        return "[0]".to_owned();
    };
    let samples: SmallVec<[&Value; 3]> = [0, items.len() / 2, last_index]
        .into_iter()
        .map(|index| &items[index])
        .collect();

    let mut out = format!("[{}", items.len());
    for sample in samples {
        out.push(':');
        out.push_str(&fingerprint_value(sample));
    }
    out.push(']');
    out
}

fn fingerprint_object(object: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = object.keys().collect();
    keys.sort_unstable();

    let pairs: Vec<String> = keys
        .into_iter()
        .map(|key| {
            let shape = match &object[key] {
                Value::Array(items) => fingerprint_array(items),
                Value::Object(nested) => format!("{{{}}}", nested.len()),
                scalar => scalar_form(scalar),
            };
            format!("{key}:{shape}")
        })
        .collect();
    format!("{{{}}}", pairs.join(","))
}

fn scalar_form(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

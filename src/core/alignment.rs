use std::collections::HashMap;

use indexmap::IndexSet;
use serde::Serialize;
use tracing::trace;

use crate::error::ChartResult;

use super::normalize::ensure_unique_names;
use super::{Scalar, SeriesSource};

/// Series values re-expressed against the shared x-domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Alignment {
    /// Distinct x-keys in first-seen order across all series.
    pub domain: Vec<Scalar>,
    pub aligned: Vec<AlignedSeries>,
}

impl Alignment {
    #[must_use]
    pub fn series(&self, name: &str) -> Option<&AlignedSeries> {
        self.aligned.iter().find(|series| series.name == name)
    }
}

/// Aligns every source onto one first-seen-ordered x-domain.
///
/// Records without the x-field are skipped. Within a single source a repeated
/// x-key keeps its last y-value; a y-value that is missing or not numeric
/// aligns as `None`.
pub fn align(sources: &[SeriesSource]) -> ChartResult<Alignment> {
    ensure_unique_names(sources)?;

    let mut domain: IndexSet<&Scalar> = IndexSet::new();
    for source in sources {
        for record in &source.records {
            if let Some(x) = record.get(&source.x_field) {
                domain.insert(x);
            }
        }
    }

    let aligned = sources
        .iter()
        .map(|source| {
            let mut lookup: HashMap<&Scalar, Option<f64>> =
                HashMap::with_capacity(source.records.len());
            for record in &source.records {
                if let Some(x) = record.get(&source.x_field) {
                    let y = record.get(&source.y_field).and_then(Scalar::as_f64);
                    lookup.insert(x, y);
                }
            }
            let values = domain
                .iter()
                .map(|key| lookup.get(key).copied().flatten())
                .collect();
            AlignedSeries {
                name: source.name.clone(),
                values,
            }
        })
        .collect();

    trace!(
        series_count = sources.len(),
        domain_len = domain.len(),
        "aligned series"
    );
    Ok(Alignment {
        domain: domain.into_iter().cloned().collect(),
        aligned,
    })
}

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ChartError, ChartResult};

use super::{DataSource, FieldMapping, Record, Scalar, SeriesSource};

/// Group label used when the grouping field is missing or null.
pub const UNKNOWN_GROUP: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Series longer than this produce a `LargeDataset` warning.
    #[serde(default = "default_large_dataset_threshold")]
    pub large_dataset_threshold: usize,
    /// Number of leading records inspected for shape consistency.
    #[serde(default = "default_shape_sample_size")]
    pub shape_sample_size: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            large_dataset_threshold: default_large_dataset_threshold(),
            shape_sample_size: default_shape_sample_size(),
        }
    }
}

fn default_large_dataset_threshold() -> usize {
    10_000
}

fn default_shape_sample_size() -> usize {
    32
}

/// Non-blocking data quality notes reported next to normalized series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeWarning {
    LargeDataset {
        len: usize,
        threshold: usize,
    },
    InconsistentRecordShape {
        index: usize,
        missing_fields: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    pub series: Vec<SeriesSource>,
    pub warnings: Vec<NormalizeWarning>,
}

/// Resolves data plus field mapping into uniform series sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    #[must_use]
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> NormalizerConfig {
        self.config
    }

    pub fn normalize(&self, data: &DataSource, mapping: &FieldMapping) -> ChartResult<Normalized> {
        let normalized = match data {
            DataSource::Records(records) => self.normalize_records(records, mapping)?,
            DataSource::Tuples(rows) => self.normalize_tuples(rows, mapping)?,
            DataSource::Series(series) => {
                validate_series(series)?;
                Normalized {
                    series: series.clone(),
                    warnings: Vec::new(),
                }
            }
        };

        for warning in &normalized.warnings {
            warn!(?warning, "data normalization warning");
        }
        debug!(
            series_count = normalized.series.len(),
            warning_count = normalized.warnings.len(),
            "normalized chart data"
        );
        Ok(normalized)
    }

    fn normalize_records(
        &self,
        records: &[Record],
        mapping: &FieldMapping,
    ) -> ChartResult<Normalized> {
        let Some(sample) = records.first() else {
            return Ok(Normalized::default());
        };

        let mut required: Vec<&str> = Vec::with_capacity(mapping.y_fields().len() + 2);
        required.push(&mapping.x_field);
        required.extend(mapping.y_fields().iter().map(String::as_str));
        if let Some(group_by) = &mapping.group_by {
            required.push(group_by);
        }
        if mapping.y_fields().is_empty() {
            return Err(ChartError::InvalidData(
                "field mapping must declare at least one y field".to_owned(),
            ));
        }
        for field in &required {
            require_field(sample, field)?;
        }

        let mut warnings = self.shape_warnings(records, |record| {
            required
                .iter()
                .filter(|field| !record.contains_field(field))
                .map(|field| (*field).to_owned())
                .collect()
        });
        if records.len() > self.config.large_dataset_threshold {
            warnings.push(NormalizeWarning::LargeDataset {
                len: records.len(),
                threshold: self.config.large_dataset_threshold,
            });
        }

        let groups: Vec<(Option<String>, Vec<Record>)> = match &mapping.group_by {
            Some(group_by) => group_records(records, group_by)
                .into_iter()
                .map(|(label, members)| (Some(label), members))
                .collect(),
            None => vec![(None, records.to_vec())],
        };

        let multiple_y = mapping.y_fields().len() > 1;
        let mut series = Vec::with_capacity(groups.len() * mapping.y_fields().len());
        for (label, members) in groups {
            for y_field in mapping.y_fields() {
                let name = match (&label, multiple_y) {
                    (None, _) => y_field.clone(),
                    (Some(label), false) => label.clone(),
                    (Some(label), true) => format!("{label} - {y_field}"),
                };
                let mut source =
                    SeriesSource::new(name, &mapping.x_field, y_field, members.clone());
                source.overrides = mapping.overrides.get(&source.name).cloned();
                series.push(source);
            }
        }

        ensure_unique_names(&series)?;
        Ok(Normalized { series, warnings })
    }

    fn normalize_tuples(
        &self,
        rows: &[Vec<Scalar>],
        mapping: &FieldMapping,
    ) -> ChartResult<Normalized> {
        let Some(first) = rows.first() else {
            return Ok(Normalized::default());
        };
        if first.len() < 2 {
            return Err(ChartError::InvalidData(
                "tuple rows need an x column and at least one value column".to_owned(),
            ));
        }

        let width = first.len();
        let records: Vec<Record> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(column, cell)| (column.to_string(), cell.clone()))
                    .collect()
            })
            .collect();

        let mut warnings = self.shape_warnings(&records, |record| {
            (record.len()..width).map(|column| column.to_string()).collect()
        });
        if rows.len() > self.config.large_dataset_threshold {
            warnings.push(NormalizeWarning::LargeDataset {
                len: rows.len(),
                threshold: self.config.large_dataset_threshold,
            });
        }

        let series: Vec<SeriesSource> = (1..width)
            .map(|column| {
                let name = mapping
                    .y_fields()
                    .get(column - 1)
                    .cloned()
                    .unwrap_or_else(|| format!("series-{column}"));
                let mut source =
                    SeriesSource::new(name, "0", column.to_string(), records.clone());
                source.overrides = mapping.overrides.get(&source.name).cloned();
                source
            })
            .collect();

        ensure_unique_names(&series)?;
        Ok(Normalized { series, warnings })
    }

    fn shape_warnings<F>(&self, records: &[Record], missing: F) -> Vec<NormalizeWarning>
    where
        F: Fn(&Record) -> Vec<String>,
    {
        records
            .iter()
            .enumerate()
            .take(self.config.shape_sample_size)
            .skip(1)
            .filter_map(|(index, record)| {
                let missing_fields = missing(record);
                (!missing_fields.is_empty()).then_some(NormalizeWarning::InconsistentRecordShape {
                    index,
                    missing_fields,
                })
            })
            .collect()
    }
}

/// Normalizes with default configuration.
pub fn normalize(data: &DataSource, mapping: &FieldMapping) -> ChartResult<Normalized> {
    Normalizer::default().normalize(data, mapping)
}

/// Stable group-by on the string form of `field`; groups keep first-seen order.
#[must_use]
pub fn group_records(records: &[Record], field: &str) -> IndexMap<String, Vec<Record>> {
    let mut groups: IndexMap<String, Vec<Record>> = IndexMap::new();
    for record in records {
        let label = match record.get(field) {
            None | Some(Scalar::Null) => UNKNOWN_GROUP.to_owned(),
            Some(value) => value.to_string(),
        };
        groups.entry(label).or_default().push(record.clone());
    }
    groups
}

/// Rejects caller-built series with empty or repeated names or undeclared fields.
pub fn validate_series(series: &[SeriesSource]) -> ChartResult<()> {
    for source in series {
        if source.name.is_empty() {
            return Err(ChartError::InvalidData(
                "series name must not be empty".to_owned(),
            ));
        }
        if let Some(sample) = source.records.first() {
            require_field(sample, &source.x_field)?;
            require_field(sample, &source.y_field)?;
        }
    }
    ensure_unique_names(series)
}

pub(crate) fn ensure_unique_names(series: &[SeriesSource]) -> ChartResult<()> {
    let mut seen = HashSet::with_capacity(series.len());
    for source in series {
        if !seen.insert(source.name.as_str()) {
            return Err(ChartError::DuplicateSeries {
                name: source.name.clone(),
            });
        }
    }
    Ok(())
}

fn require_field(sample: &Record, field: &str) -> ChartResult<()> {
    if sample.contains_field(field) {
        return Ok(());
    }
    Err(ChartError::FieldMissing {
        field: field.to_owned(),
        available: sample.field_names().map(str::to_owned).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::{NormalizeWarning, Normalizer, NormalizerConfig, UNKNOWN_GROUP, normalize};
    use crate::core::{DataSource, FieldMapping, Record, Scalar, SeriesSource};
    use crate::error::ChartError;
    use serde_json::json;

    fn sales_records() -> Vec<Record> {
        vec![
            Record::new()
                .with("month", "Jan")
                .with("region", "north")
                .with("sales", 10.0)
                .with("cost", 4.0),
            Record::new()
                .with("month", "Jan")
                .with("region", "south")
                .with("sales", 7.0)
                .with("cost", 3.0),
            Record::new()
                .with("month", "Feb")
                .with("region", "north")
                .with("sales", 12.0)
                .with("cost", 5.0),
        ]
    }

    #[test]
    fn single_y_field_yields_one_series_named_after_field() {
        let data = DataSource::Records(sales_records());
        let normalized = normalize(&data, &FieldMapping::new("month", "sales")).expect("normalize");
        assert_eq!(normalized.series.len(), 1);
        assert_eq!(normalized.series[0].name, "sales");
        assert_eq!(normalized.series[0].records.len(), 3);
        assert!(normalized.warnings.is_empty());
    }

    #[test]
    fn many_y_fields_yield_one_series_per_field() {
        let data = DataSource::Records(sales_records());
        let mapping = FieldMapping::new("month", "sales").with_y_fields(["sales", "cost"]);
        let normalized = normalize(&data, &mapping).expect("normalize");
        let names: Vec<_> = normalized.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["sales", "cost"]);
        assert_eq!(normalized.series[1].y_field, "cost");
    }

    #[test]
    fn grouping_partitions_in_first_seen_order() {
        let mut records = sales_records();
        records.push(Record::new().with("month", "Mar").with("sales", 1.0).with("cost", 1.0));
        records.push(
            Record::new()
                .with("month", "Mar")
                .with("region", Scalar::Null)
                .with("sales", 2.0)
                .with("cost", 1.0),
        );
        let data = DataSource::Records(records);
        let mapping = FieldMapping::new("month", "sales").with_group_by("region");
        let normalized = normalize(&data, &mapping).expect("normalize");

        let names: Vec<_> = normalized.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["north", "south", UNKNOWN_GROUP]);
        assert_eq!(normalized.series[0].records.len(), 2);
        assert_eq!(normalized.series[2].records.len(), 2);
        assert!(matches!(
            normalized.warnings[0],
            NormalizeWarning::InconsistentRecordShape { index: 3, .. }
        ));
    }

    #[test]
    fn grouping_with_many_y_fields_combines_names() {
        let data = DataSource::Records(sales_records());
        let mapping = FieldMapping::new("month", "sales")
            .with_y_fields(["sales", "cost"])
            .with_group_by("region");
        let normalized = normalize(&data, &mapping).expect("normalize");
        let names: Vec<_> = normalized.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["north - sales", "north - cost", "south - sales", "south - cost"]
        );
    }

    #[test]
    fn missing_field_reports_available_fields() {
        let data = DataSource::Records(sales_records());
        let err = normalize(&data, &FieldMapping::new("month", "revenue"))
            .expect_err("revenue is not a field");
        match err {
            ChartError::FieldMissing { field, available } => {
                assert_eq!(field, "revenue");
                assert_eq!(available, vec!["month", "region", "sales", "cost"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overrides_attach_to_matching_series() {
        let data = DataSource::Records(sales_records());
        let mapping = FieldMapping::new("month", "sales")
            .with_override("sales", json!({"smooth": true}));
        let normalized = normalize(&data, &mapping).expect("normalize");
        assert_eq!(normalized.series[0].overrides, Some(json!({"smooth": true})));
    }

    #[test]
    fn tuples_pass_through_by_column() {
        let data = DataSource::from_json(&json!([["Jan", 10, 1], ["Feb", 20, 2]])).expect("data");
        let mapping = FieldMapping::new("unused", "revenue");
        let normalized = normalize(&data, &mapping).expect("normalize");
        let names: Vec<_> = normalized.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["revenue", "series-2"]);
        assert_eq!(normalized.series[1].x_field, "0");
        assert_eq!(normalized.series[1].y_field, "2");
    }

    #[test]
    fn large_dataset_warns_without_failing() {
        let records: Vec<Record> = (0..5)
            .map(|i| Record::new().with("x", f64::from(i)).with("y", 1.0))
            .collect();
        let normalizer = Normalizer::new(NormalizerConfig {
            large_dataset_threshold: 3,
            shape_sample_size: 8,
        });
        let normalized = normalizer
            .normalize(&DataSource::Records(records), &FieldMapping::new("x", "y"))
            .expect("normalize");
        assert_eq!(
            normalized.warnings,
            vec![NormalizeWarning::LargeDataset { len: 5, threshold: 3 }]
        );
    }

    #[test]
    fn explicit_series_with_duplicate_names_are_rejected() {
        let series = vec![
            SeriesSource::new("a", "x", "y", vec![Record::new().with("x", 1.0).with("y", 1.0)]),
            SeriesSource::new("a", "x", "y", Vec::new()),
        ];
        let err = normalize(&DataSource::Series(series), &FieldMapping::new("x", "y"))
            .expect_err("duplicate names");
        assert!(matches!(err, ChartError::DuplicateSeries { name } if name == "a"));
    }

    #[test]
    fn empty_records_normalize_to_nothing() {
        let normalized = normalize(&DataSource::Records(Vec::new()), &FieldMapping::new("x", "y"))
            .expect("normalize");
        assert!(normalized.series.is_empty());
    }
}

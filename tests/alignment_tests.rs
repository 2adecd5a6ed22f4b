use chart_spec::core::{
    DataSource, FieldMapping, Record, Scalar, SeriesSource, align, normalize,
};
use serde_json::json;

fn monthly(name: &str, points: &[(&str, f64)]) -> SeriesSource {
    let records = points
        .iter()
        .map(|(month, value)| Record::new().with("month", *month).with("value", *value))
        .collect();
    SeriesSource::new(name, "month", "value", records)
}

#[test]
fn partially_overlapping_series_share_one_domain() {
    let a = monthly("A", &[("Jan", 10.0), ("Feb", 20.0)]);
    let b = monthly("B", &[("Feb", 5.0), ("Mar", 15.0)]);

    let alignment = align(&[a, b]).expect("align");

    assert_eq!(
        alignment.domain,
        vec![Scalar::text("Jan"), Scalar::text("Feb"), Scalar::text("Mar")]
    );
    assert_eq!(
        alignment.series("A").expect("A").values,
        vec![Some(10.0), Some(20.0), None]
    );
    assert_eq!(
        alignment.series("B").expect("B").values,
        vec![None, Some(5.0), Some(15.0)]
    );
}

#[test]
fn domain_follows_series_order_not_sorted_order() {
    let b = monthly("B", &[("Mar", 1.0)]);
    let a = monthly("A", &[("Jan", 1.0), ("Mar", 2.0)]);

    let alignment = align(&[b, a]).expect("align");

    assert_eq!(
        alignment.domain,
        vec![Scalar::text("Mar"), Scalar::text("Jan")]
    );
    assert_eq!(alignment.aligned[1].values, vec![Some(2.0), Some(1.0)]);
}

#[test]
fn single_series_aligns_to_its_own_order() {
    let a = monthly("A", &[("Mar", 3.0), ("Jan", 1.0), ("Feb", 2.0)]);
    let alignment = align(std::slice::from_ref(&a)).expect("align");
    assert_eq!(alignment.domain.len(), 3);
    assert_eq!(alignment.aligned[0].values, vec![Some(3.0), Some(1.0), Some(2.0)]);
}

#[test]
fn numeric_and_text_keys_stay_distinct() {
    let records = vec![
        Record::new().with("x", 1.0).with("y", 1.0),
        Record::new().with("x", "1").with("y", 2.0),
    ];
    let alignment = align(&[SeriesSource::new("s", "x", "y", records)]).expect("align");
    assert_eq!(alignment.domain.len(), 2);
}

#[test]
fn grouped_records_align_after_normalization() {
    let data = DataSource::from_json(&json!([
        {"day": "Mon", "team": "red", "score": 3},
        {"day": "Tue", "team": "red", "score": 4},
        {"day": "Tue", "team": "blue", "score": 6},
        {"day": "Wed", "team": "blue", "score": 7},
    ]))
    .expect("classify");
    let mapping = FieldMapping::new("day", "score").with_group_by("team");

    let normalized = normalize(&data, &mapping).expect("normalize");
    let alignment = align(&normalized.series).expect("align");

    assert_eq!(
        alignment.domain,
        vec![Scalar::text("Mon"), Scalar::text("Tue"), Scalar::text("Wed")]
    );
    assert_eq!(
        alignment.series("red").expect("red").values,
        vec![Some(3.0), Some(4.0), None]
    );
    assert_eq!(
        alignment.series("blue").expect("blue").values,
        vec![None, Some(6.0), Some(7.0)]
    );
}

#[test]
fn decimal_values_and_timestamp_keys_align_numerically() {
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    let day = |d: u32| Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).single().expect("valid date");
    let price = |raw: &str| {
        Scalar::from_decimal(raw.parse::<Decimal>().expect("decimal")).expect("finite")
    };
    let records = vec![
        Record::new().with("at", day(1)).with("px", price("101.10")),
        Record::new().with("at", day(2)).with("px", price("99.95")),
    ];
    let source = SeriesSource::new("px", "at", "px", records);

    let alignment = align(&[source]).expect("align");
    let values = &alignment.series("px").expect("px").values;

    assert_eq!(alignment.domain, vec![Scalar::from(day(1)), Scalar::from(day(2))]);
    assert_relative_eq!(values[0].expect("first"), 101.10, epsilon = 1e-9);
    assert_relative_eq!(values[1].expect("second"), 99.95, epsilon = 1e-9);
    assert_relative_eq!(
        Scalar::from(day(2)).as_f64().expect("epoch"),
        1_709_337_600_000.0
    );
}

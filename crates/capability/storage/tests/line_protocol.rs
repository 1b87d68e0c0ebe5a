use domain::{FieldValue, MetricRecord};
use m2i_storage::line_protocol::encode;
use m2i_storage::WriteError;
use std::collections::BTreeMap;

fn record(
    measurement: &str,
    tags: &[(&str, &str)],
    fields: &[(&str, FieldValue)],
    ts_ms: i64,
) -> MetricRecord {
    let tags: BTreeMap<String, String> = tags
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let fields: BTreeMap<String, FieldValue> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    MetricRecord::new(measurement, tags, fields, ts_ms).expect("record")
}

#[test]
fn encodes_tags_sorted_and_seconds_precision() {
    let line = encode(&record(
        "sonoff",
        &[("name", "plug1"), ("group", "kitchen")],
        &[("Power", FieldValue::Float(12.0)), ("Voltage", FieldValue::Float(229.5))],
        1_700_000_000_500,
    ))
    .expect("encode");
    assert_eq!(
        line,
        "sonoff,group=kitchen,name=plug1 Power=12,Voltage=229.5 1700000000"
    );
}

#[test]
fn integer_fields_carry_suffix() {
    let line = encode(&record(
        "tasmota_state",
        &[("name", "lamp")],
        &[("power", FieldValue::Integer(1))],
        2_000,
    ))
    .expect("encode");
    assert_eq!(line, "tasmota_state,name=lamp power=1i 2");
}

#[test]
fn escapes_special_characters() {
    let line = encode(&record(
        "living room,temp",
        &[("sensor name", "a=b,c")],
        &[("value x", FieldValue::String("say \"hi\"".to_string()))],
        0,
    ))
    .expect("encode");
    assert_eq!(
        line,
        "living\\ room\\,temp,sensor\\ name=a\\=b\\,c value\\ x=\"say \\\"hi\\\"\" 0"
    );
}

#[test]
fn empty_tag_values_are_omitted() {
    let line = encode(&record(
        "xiaomi",
        &[("model", ""), ("sid", "158d0001")],
        &[("value", FieldValue::Float(21.5))],
        1_000,
    ))
    .expect("encode");
    assert_eq!(line, "xiaomi,sid=158d0001 value=21.5 1");
}

#[test]
fn non_finite_floats_are_rejected() {
    let err = encode(&record(
        "nilan",
        &[],
        &[("value", FieldValue::Float(f64::INFINITY))],
        0,
    ))
    .expect_err("infinite");
    assert!(matches!(err, WriteError::Encoding(_)));
}

#[test]
fn tag_value_with_line_break_is_rejected() {
    let err = encode(&record(
        "xiaomi",
        &[("raw", "open\nxiaomi value=1 0")],
        &[("value", FieldValue::Float(1.0))],
        0,
    ))
    .expect_err("line break");
    assert!(matches!(err, WriteError::Encoding(_)));
}

#[test]
fn tag_value_ending_in_backslash_is_rejected() {
    let err = encode(&record(
        "nilan",
        &[("name", "path\\")],
        &[("value", FieldValue::Float(1.0))],
        0,
    ))
    .expect_err("trailing backslash");
    assert!(matches!(err, WriteError::Encoding(_)));
}

use domain::{FieldValue, InvalidRecord, MagnetPolicy, MetricRecord, ParserKind};
use std::collections::BTreeMap;

#[test]
fn metric_record_requires_measurement_and_field() {
    let mut fields = BTreeMap::new();
    fields.insert("value".to_string(), FieldValue::Float(1.5));

    let err = MetricRecord::new("", BTreeMap::new(), fields.clone(), 1).expect_err("empty name");
    assert_eq!(err, InvalidRecord::EmptyMeasurement);

    let err = MetricRecord::new("nilan", BTreeMap::new(), BTreeMap::new(), 1).expect_err("no fields");
    assert_eq!(err, InvalidRecord::NoFields);

    let record = MetricRecord::new("nilan", BTreeMap::new(), fields, 1000).expect("record");
    assert_eq!(record.measurement(), "nilan");
    assert_eq!(record.field("value"), Some(&FieldValue::Float(1.5)));
    assert_eq!(record.ts_ms(), 1000);
}

#[test]
fn parser_kind_round_trips_identifiers() {
    for kind in ParserKind::ALL {
        let parsed: ParserKind = kind.as_str().parse().expect("known kind");
        assert_eq!(parsed, kind);
    }
    assert!("sonoffpowr2".parse::<ParserKind>().is_err());
    assert!("".parse::<ParserKind>().is_err());
}

#[test]
fn magnet_policy_maps_status() {
    assert_eq!(MagnetPolicy::OpenHigh.value_for("open"), 1.0);
    assert_eq!(MagnetPolicy::OpenHigh.value_for("close"), 0.0);
    assert_eq!(MagnetPolicy::OpenLow.value_for("open"), 0.0);
    assert_eq!(MagnetPolicy::OpenLow.value_for("close"), 1.0);
    assert_eq!(MagnetPolicy::OpenLow.value_for("ajar"), -1.0);
    assert_eq!("open-low".parse::<MagnetPolicy>(), Ok(MagnetPolicy::OpenLow));
    assert_eq!(MagnetPolicy::default(), MagnetPolicy::OpenHigh);
}

#[test]
fn now_epoch_ms_is_wall_clock_millis() {
    let first = domain::now_epoch_ms();
    assert!(first > 1_600_000_000_000);
    assert!(domain::now_epoch_ms() >= first);
}

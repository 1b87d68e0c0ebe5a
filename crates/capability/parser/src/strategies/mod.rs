//! 各设备族解析策略实现。

mod nilan;
mod sonoff;
mod tasmota;
mod watermeter;
mod wunderground;
mod xiaomi;
mod zigbee2mqtt;

pub use nilan::Nilan;
pub use sonoff::SonoffPowR2;
pub use tasmota::{TasmotaDs18b20, TasmotaStatePower};
pub use watermeter::Watermeter;
pub use wunderground::Wunderground;
pub use xiaomi::Xiaomi;
pub use zigbee2mqtt::Zigbee2mqtt;

use crate::DecodeError;
use domain::{FieldValue, MetricRecord};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// `prefix/group/name`，name 可包含多段。nilan 与 zigbee2mqtt 共用。
static GROUPED_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]*/(?P<group>[a-zA-Z0-9]*)/(?P<name>[a-zA-Z0-9_/]*)")
        .expect("valid grouped topic pattern")
});

fn tags<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn single_field(key: &str, value: FieldValue) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();
    fields.insert(key.to_string(), value);
    fields
}

fn record(
    measurement: &str,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    ts_ms: i64,
) -> Result<Option<MetricRecord>, DecodeError> {
    Ok(Some(MetricRecord::new(measurement, tags, fields, ts_ms)?))
}

//! Tasmota 固件遥测：DS18B20 温度传感器与继电器状态。
//!
//! Tasmota 在 `tele/<device>/` 下还会发布 LWT、INFO 等消息，
//! topic 不匹配时按正常忽略处理。

use super::{record, single_field, tags};
use crate::coerce::json_object;
use crate::{DecodeError, Extractor};
use domain::{FieldValue, MetricRecord, ParserKind};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

static SENSOR_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^tele/(?P<sensor>[a-zA-Z0-9]*)/SENSOR").expect("valid tasmota sensor pattern")
});

static STATE_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^tele/(?P<sensor>[a-zA-Z0-9]*)/STATE").expect("valid tasmota state pattern")
});

#[derive(Debug, Deserialize)]
struct SensorPayload {
    #[serde(rename = "DS18B20")]
    ds18b20: Ds18b20Reading,
    #[serde(rename = "TempUnit")]
    temp_unit: String,
}

#[derive(Debug, Deserialize)]
struct Ds18b20Reading {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Temperature")]
    temperature: f64,
}

/// `tele/<sensor>/SENSOR`，payload 含 `DS18B20` 对象。
#[derive(Debug, Clone, Copy, Default)]
pub struct TasmotaDs18b20;

impl Extractor for TasmotaDs18b20 {
    fn kind(&self) -> ParserKind {
        ParserKind::TasmotaDs18b20
    }

    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError> {
        let Some(captures) = SENSOR_TOPIC.captures(topic) else {
            return Ok(None);
        };
        let sensor = &captures["sensor"];

        let reading: SensorPayload = serde_json::from_slice(payload)?;

        record(
            "DS18B20",
            tags([
                ("name", sensor),
                ("id", reading.ds18b20.id.as_str()),
                ("tempunit", reading.temp_unit.as_str()),
            ]),
            single_field("temperature", FieldValue::Float(reading.ds18b20.temperature)),
            ts_ms,
        )
    }
}

/// `tele/<sensor>/STATE`，payload 含 `POWER` 键。
#[derive(Debug, Clone, Copy, Default)]
pub struct TasmotaStatePower;

impl Extractor for TasmotaStatePower {
    fn kind(&self) -> ParserKind {
        ParserKind::TasmotaStatePower
    }

    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError> {
        let Some(captures) = STATE_TOPIC.captures(topic) else {
            return Ok(None);
        };
        let sensor = &captures["sensor"];

        let document = json_object(payload)?;
        let Some(power) = document.get("POWER") else {
            debug!(target: "m2i.parser", topic, "tasmota_power_missing");
            return Ok(None);
        };

        record(
            "TasmotaStatePower",
            tags([("name", sensor)]),
            single_field("power", FieldValue::Integer(power_value(power))),
            ts_ms,
        )
    }
}

fn power_value(value: &Value) -> i64 {
    match value.as_str() {
        Some("ON") => 1,
        Some("OFF") => 0,
        _ => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_value_maps_relay_state() {
        assert_eq!(power_value(&Value::from("ON")), 1);
        assert_eq!(power_value(&Value::from("OFF")), 0);
        assert_eq!(power_value(&Value::from("TOGGLE")), -1);
        assert_eq!(power_value(&Value::from(1)), -1);
    }
}

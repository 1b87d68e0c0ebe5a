//! Aqara / Xiaomi 网关（aqara-mqtt 桥接输出）。

use super::{record, single_field, tags};
use crate::coerce::{payload_text, text_or_number};
use crate::{DecodeError, Extractor};
use domain::{FieldValue, MagnetPolicy, MetricRecord, ParserKind};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<prefix>[a-zA-Z0-9]*)/(?P<type>[a-zA-Z0-9_\.]*)/(?P<id>[a-zA-Z0-9]*)/(?P<sensor>[a-zA-Z0-9]*)",
    )
    .expect("valid xiaomi topic pattern")
});

/// `prefix/type/id/sensor`，measurement 固定为 `xiaomi`。
#[derive(Debug, Clone, Copy, Default)]
pub struct Xiaomi {
    magnet_policy: MagnetPolicy,
}

impl Xiaomi {
    pub fn new(magnet_policy: MagnetPolicy) -> Self {
        Self { magnet_policy }
    }
}

impl Extractor for Xiaomi {
    fn kind(&self) -> ParserKind {
        ParserKind::Xiaomi
    }

    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError> {
        let captures = TOPIC.captures(topic).ok_or_else(|| DecodeError::Topic {
            parser: ParserKind::Xiaomi,
            topic: topic.to_string(),
        })?;
        let device_type = &captures["type"];
        let id = &captures["id"];
        let sensor = &captures["sensor"];
        let mut tags = tags([("type", device_type), ("id", id), ("sensor", sensor)]);

        let value = match (device_type, sensor) {
            ("magnet", "status") => {
                let raw = payload_text(payload)?.trim();
                tags.insert("raw".to_string(), raw.to_string());
                FieldValue::Float(self.magnet_policy.value_for(raw))
            }
            ("motion", "status") => {
                let raw = payload_text(payload)?.trim();
                tags.insert("raw".to_string(), raw.to_string());
                FieldValue::Float(motion_value(raw))
            }
            // 开关点击与网关灯色没有可写入的数值
            ("sensor_switch.aq2", "status") | ("gateway", "rgb") => {
                debug!(target: "m2i.parser", topic, "xiaomi_value_skipped");
                return Ok(None);
            }
            _ => text_or_number(payload)?,
        };

        record("xiaomi", tags, single_field("value", value), ts_ms)
    }
}

fn motion_value(raw: &str) -> f64 {
    match raw {
        "motion" => 1.0,
        "no_motion" => 0.0,
        _ => -1.0,
    }
}

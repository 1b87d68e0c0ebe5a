//! Sonoff POW R2（Tasmota 固件）电能遥测。

use super::{record, tags};
use crate::coerce::{json_object, number_key};
use crate::{DecodeError, Extractor};
use domain::{FieldValue, MetricRecord, ParserKind};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[a-zA-Z0-9]*)/").expect("valid sonoff topic pattern")
});

/// `ENERGY` 对象中的键与输出 field 名。
const ENERGY_FIELDS: [(&str, &str); 9] = [
    ("Total", "total"),
    ("Yesterday", "yesterday"),
    ("Today", "today"),
    ("Power", "power"),
    ("ApparentPower", "apparentpower"),
    ("ReactivePower", "reactivepower"),
    ("Factor", "factor"),
    ("Voltage", "voltage"),
    ("Current", "current"),
];

/// `name/...`，payload 为含 `ENERGY` 子对象的 JSON。
#[derive(Debug, Clone, Copy, Default)]
pub struct SonoffPowR2;

impl Extractor for SonoffPowR2 {
    fn kind(&self) -> ParserKind {
        ParserKind::SonoffPowR2
    }

    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError> {
        let captures = TOPIC.captures(topic).ok_or_else(|| DecodeError::Topic {
            parser: ParserKind::SonoffPowR2,
            topic: topic.to_string(),
        })?;
        let name = &captures["name"];

        let document = json_object(payload)?;
        let energy = match document.get("ENERGY") {
            Some(Value::Object(energy)) => energy,
            _ => return Err(DecodeError::MissingKey("ENERGY")),
        };

        let mut fields = BTreeMap::new();
        for (key, field) in ENERGY_FIELDS {
            let value = number_key(energy, key)?;
            fields.insert(field.to_string(), FieldValue::Float(value));
        }

        record("sonoffPowR2", tags([("name", name)]), fields, ts_ms)
    }
}

//! 水表读数（measurement 取自 topic）。

use super::{record, single_field, tags};
use crate::coerce::parse_number;
use crate::{DecodeError, Extractor};
use domain::{FieldValue, MetricRecord, ParserKind};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]*/(?P<name>[a-zA-Z0-9]*)").expect("valid watermeter topic pattern")
});

/// `prefix/name`，payload 为数值。
#[derive(Debug, Clone, Copy, Default)]
pub struct Watermeter;

impl Extractor for Watermeter {
    fn kind(&self) -> ParserKind {
        ParserKind::Watermeter
    }

    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError> {
        let Some(name) = TOPIC
            .captures(topic)
            .and_then(|captures| captures.name("name"))
            .map(|name| name.as_str())
            .filter(|name| !name.is_empty())
        else {
            return Ok(None);
        };

        let value = parse_number(payload)?;
        // 读表失败时设备上报 0
        if value == 0.0 {
            debug!(target: "m2i.parser", topic, "watermeter_zero_skipped");
            return Ok(None);
        }

        record(
            name,
            tags([("name", name)]),
            single_field("value", FieldValue::Float(value)),
            ts_ms,
        )
    }
}

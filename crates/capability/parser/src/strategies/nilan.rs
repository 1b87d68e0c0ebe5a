//! Nilan 新风机（Nilan_Homeassistant 桥接输出）。

use super::{GROUPED_TOPIC, record, single_field, tags};
use crate::coerce::parse_number;
use crate::{DecodeError, Extractor};
use domain::{FieldValue, MetricRecord, ParserKind};
use tracing::debug;

/// `text` 分组下是文本状态，时序库无法按数值存储。
const TEXT_GROUP: &str = "text";

/// `prefix/group/name`，payload 为数值。
#[derive(Debug, Clone, Copy, Default)]
pub struct Nilan;

impl Extractor for Nilan {
    fn kind(&self) -> ParserKind {
        ParserKind::Nilan
    }

    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError> {
        let Some(captures) = GROUPED_TOPIC.captures(topic) else {
            return Ok(None);
        };
        let group = &captures["group"];
        if group == TEXT_GROUP {
            debug!(target: "m2i.parser", topic, "nilan_text_skipped");
            return Ok(None);
        }
        let name = &captures["name"];

        let value = parse_number(payload)?;
        record(
            "nilan",
            tags([("group", group), ("name", name)]),
            single_field("value", FieldValue::Float(value)),
            ts_ms,
        )
    }
}

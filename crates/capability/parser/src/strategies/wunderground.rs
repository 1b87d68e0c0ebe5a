//! GoWundergroundProxy 气象站输出（measurement 取自站点名）。

use super::{record, single_field, tags};
use crate::coerce::parse_number;
use crate::{DecodeError, Extractor};
use domain::{FieldValue, MetricRecord, ParserKind};
use regex::Regex;
use std::sync::LazyLock;

static TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]*/(?P<station>[a-zA-Z0-9]*)/(?P<name>[a-zA-Z0-9]*)")
        .expect("valid wunderground topic pattern")
});

/// `prefix/station/name`，payload 为数值。
#[derive(Debug, Clone, Copy, Default)]
pub struct Wunderground;

impl Extractor for Wunderground {
    fn kind(&self) -> ParserKind {
        ParserKind::Wunderground
    }

    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError> {
        let Some(captures) = TOPIC.captures(topic) else {
            return Ok(None);
        };
        let station = &captures["station"];
        if station.is_empty() {
            return Ok(None);
        }
        let name = &captures["name"];

        let value = parse_number(payload)?;
        record(
            station,
            tags([("station", station), ("name", name)]),
            single_field("value", FieldValue::Float(value)),
            ts_ms,
        )
    }
}

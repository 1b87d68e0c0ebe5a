//! zigbee2mqtt 设备状态。

use super::{GROUPED_TOPIC, record, tags};
use crate::coerce::{json_field, json_object};
use crate::{DecodeError, Extractor};
use domain::{MetricRecord, ParserKind};
use std::collections::BTreeMap;
use tracing::debug;

/// 桥接自身的状态/日志消息，不是设备数据。
const BRIDGE_GROUP: &str = "bridge";

/// `prefix/group/name`，payload 顶层键（null 除外）全部展开为 field。
#[derive(Debug, Clone, Copy, Default)]
pub struct Zigbee2mqtt;

impl Extractor for Zigbee2mqtt {
    fn kind(&self) -> ParserKind {
        ParserKind::Zigbee2mqtt
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
        if group == BRIDGE_GROUP {
            debug!(target: "m2i.parser", topic, "zigbee2mqtt_bridge_skipped");
            return Ok(None);
        }
        let name = &captures["name"];

        let document = json_object(payload)?;
        let mut fields = BTreeMap::new();
        for (key, value) in &document {
            match json_field(value) {
                Some(field) => {
                    fields.insert(key.clone(), field);
                }
                None => {
                    debug!(target: "m2i.parser", topic, key = %key, "zigbee2mqtt_key_skipped");
                }
            }
        }

        record("zigbee2mqtt", tags([("group", group), ("name", name)]), fields, ts_ms)
    }
}

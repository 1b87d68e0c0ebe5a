//! # 报文解析能力模块
//!
//! 按设备族将 MQTT 报文（topic + payload）转换为 [`MetricRecord`]：
//!
//! ```text
//! AppConfig.parser (ParserKind)
//!       │
//!       ▼
//! registry::resolve ──► Arc<dyn Extractor>（进程生命周期内不变）
//!       │
//!       ▼
//! extract(topic, payload, ts_ms)
//!       ├── Ok(Some(record))  写入时序库
//!       ├── Ok(None)          正常忽略（非目标 topic、桥接消息等）
//!       └── Err(DecodeError)  报文格式非法，丢弃并记录
//! ```
//!
//! ## 支持的设备族
//!
//! | 标识 | topic | payload | measurement |
//! |---|---|---|---|
//! | `xiaomi` | `prefix/type/id/sensor` | 文本 | `xiaomi` |
//! | `sonoffPowR2` | `name/...` | JSON（`ENERGY`） | `sonoffPowR2` |
//! | `nilan` | `prefix/group/name` | 数值 | `nilan` |
//! | `zigbee2mqtt` | `prefix/group/name` | JSON 对象 | `zigbee2mqtt` |
//! | `watermeter` | `prefix/name` | 数值 | name |
//! | `wunderground` | `prefix/station/name` | 数值 | station |
//! | `tasmota-ds18b20` | `tele/<sensor>/SENSOR` | JSON（`DS18B20`） | `DS18B20` |
//! | `tasmota-state-power` | `tele/<sensor>/STATE` | JSON（`POWER`） | `TasmotaStatePower` |

pub mod coerce;
mod error;
pub mod registry;
pub mod strategies;

pub use error::DecodeError;
pub use registry::{RegistryError, resolve, resolve_name};

use domain::{MagnetPolicy, MetricRecord, ParserKind};

/// 解析器构造参数。
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractorOptions {
    pub magnet_policy: MagnetPolicy,
}

/// 设备族解析策略。
///
/// 实现必须是无状态的纯计算，可在多个任务中并发调用。
pub trait Extractor: Send + Sync {
    fn kind(&self) -> ParserKind;

    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError>;
}

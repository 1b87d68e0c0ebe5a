pub mod data;

pub use data::{FieldValue, InvalidRecord, MetricRecord, RawMessage};

use std::fmt;
use std::str::FromStr;

/// 当前 Unix 时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}

/// 解析器类型：每个进程实例只激活一种，启动时确定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Xiaomi,
    SonoffPowR2,
    Nilan,
    Zigbee2mqtt,
    Watermeter,
    Wunderground,
    TasmotaDs18b20,
    TasmotaStatePower,
}

impl ParserKind {
    pub const ALL: [ParserKind; 8] = [
        ParserKind::Xiaomi,
        ParserKind::SonoffPowR2,
        ParserKind::Nilan,
        ParserKind::Zigbee2mqtt,
        ParserKind::Watermeter,
        ParserKind::Wunderground,
        ParserKind::TasmotaDs18b20,
        ParserKind::TasmotaStatePower,
    ];

    /// 配置中使用的标识。
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::Xiaomi => "xiaomi",
            ParserKind::SonoffPowR2 => "sonoffPowR2",
            ParserKind::Nilan => "nilan",
            ParserKind::Zigbee2mqtt => "zigbee2mqtt",
            ParserKind::Watermeter => "watermeter",
            ParserKind::Wunderground => "wunderground",
            ParserKind::TasmotaDs18b20 => "tasmota-ds18b20",
            ParserKind::TasmotaStatePower => "tasmota-state-power",
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知解析器标识。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParserKind(pub String);

impl fmt::Display for UnknownParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parser: {}", self.0)
    }
}

impl std::error::Error for UnknownParserKind {}

impl FromStr for ParserKind {
    type Err = UnknownParserKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ParserKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownParserKind(value.to_string()))
    }
}

/// 门磁状态映射策略。
///
/// 历史部署中 open/close 的取值方向不一致，因此作为显式配置项而非固定常量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagnetPolicy {
    /// open = 1, close = 0
    #[default]
    OpenHigh,
    /// open = 0, close = 1
    OpenLow,
}

impl MagnetPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MagnetPolicy::OpenHigh => "open-high",
            MagnetPolicy::OpenLow => "open-low",
        }
    }

    /// 将门磁状态字符串映射为数值，未知状态返回 -1。
    pub fn value_for(&self, status: &str) -> f64 {
        match (self, status) {
            (MagnetPolicy::OpenHigh, "open") | (MagnetPolicy::OpenLow, "close") => 1.0,
            (MagnetPolicy::OpenHigh, "close") | (MagnetPolicy::OpenLow, "open") => 0.0,
            _ => -1.0,
        }
    }
}

impl FromStr for MagnetPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open-high" => Ok(MagnetPolicy::OpenHigh),
            "open-low" => Ok(MagnetPolicy::OpenLow),
            other => Err(other.to_string()),
        }
    }
}

use std::collections::BTreeMap;
use std::fmt;

/// 订阅侧收到的原始报文。
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub received_at_ms: i64,
}

impl RawMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>, received_at_ms: i64) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            received_at_ms,
        }
    }
}

/// 指标字段值的数据类型。
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    String(String),
    Boolean(bool),
}

/// 指标构造失败原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidRecord {
    EmptyMeasurement,
    NoFields,
}

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidRecord::EmptyMeasurement => write!(f, "measurement name is empty"),
            InvalidRecord::NoFields => write!(f, "metric has no fields"),
        }
    }
}

impl std::error::Error for InvalidRecord {}

/// 一条待写入时序库的指标。
///
/// 只能通过 [`MetricRecord::new`] 构造：measurement 非空且至少一个 field。
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    ts_ms: i64,
}

impl MetricRecord {
    pub fn new(
        measurement: impl Into<String>,
        tags: BTreeMap<String, String>,
        fields: BTreeMap<String, FieldValue>,
        ts_ms: i64,
    ) -> Result<Self, InvalidRecord> {
        let measurement = measurement.into();
        if measurement.is_empty() {
            return Err(InvalidRecord::EmptyMeasurement);
        }
        if fields.is_empty() {
            return Err(InvalidRecord::NoFields);
        }
        Ok(Self {
            measurement,
            tags,
            fields,
            ts_ms,
        })
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// 采集时间（Unix 毫秒）。
    pub fn ts_ms(&self) -> i64 {
        self.ts_ms
    }
}

//! 解析错误类型定义

use domain::{InvalidRecord, ParserKind};

/// 单条报文解析错误（可恢复：丢弃该报文）
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// topic 不符合该设备族的格式
    #[error("topic {topic} does not match {parser} layout")]
    Topic { parser: ParserKind, topic: String },

    /// payload 不是合法 UTF-8
    #[error("payload is not valid utf-8")]
    Utf8,

    /// payload 为空
    #[error("empty payload")]
    EmptyPayload,

    /// JSON 解析错误
    #[error("invalid json: {0}")]
    Json(String),

    /// JSON 顶层不是对象
    #[error("payload is not a json object")]
    NotAnObject,

    /// 缺少必需的键或键类型不符
    #[error("missing or mistyped key: {0}")]
    MissingKey(&'static str),

    /// 数值解析错误
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// 没有可写入的 field
    #[error("no usable fields")]
    NoFields,

    /// measurement 为空
    #[error("empty measurement name")]
    EmptyMeasurement,

    /// 解析过程 panic（由分发层捕获）
    #[error("extractor panicked: {0}")]
    Panicked(String),
}

impl From<InvalidRecord> for DecodeError {
    fn from(err: InvalidRecord) -> Self {
        match err {
            InvalidRecord::EmptyMeasurement => DecodeError::EmptyMeasurement,
            InvalidRecord::NoFields => DecodeError::NoFields,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

//! 存储层错误类型
//!
//! 单条指标写入失败时返回，调用方记录日志后丢弃该指标：
//! - 编码错误（指标无法表示为 line protocol）
//! - 传输错误（连接失败、超时）
//! - 时序库拒绝写入（非 2xx 响应）

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("invalid storage config: {0}")]
    Config(String),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rejected by storage (status {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

//! # M2I Storage 模块
//!
//! 指标写入抽象层：把解析器产出的 `MetricRecord` 写入时序库。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：`MetricSink` 异步写入接口
//! 2. **编码层** (`line_protocol.rs`)：InfluxDB line protocol，秒级精度
//! 3. **错误处理层** (`error.rs`)：`WriteError`
//! 4. **实现层**：
//!    - `influx`：InfluxDB v1 HTTP 写入（生产环境）
//!    - `log`：只打印编码结果（未配置 InfluxDB 时的 dry run）
//!    - `in_memory`：内存实现（测试）
//!
//! ## 写入语义
//!
//! - 每条指标一次请求，不批量、不重试
//! - 写入失败只影响当前指标，由调用方记录并丢弃
//! - 实现可被多个消息任务并发调用
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use m2i_storage::{InfluxConfig, InfluxSink, MetricSink};
//! use std::time::Duration;
//!
//! let sink = InfluxSink::new(InfluxConfig {
//!     url: "http://localhost:8086".to_string(),
//!     database: "sensors".to_string(),
//!     username: None,
//!     password: None,
//!     timeout: Duration::from_secs(10),
//! })?;
//! sink.write(&record).await?;
//! ```

pub mod error;
pub mod in_memory;
pub mod influx;
pub mod line_protocol;
pub mod log;
pub mod traits;

pub use error::WriteError;
pub use in_memory::InMemoryMetricSink;
pub use influx::{InfluxConfig, InfluxSink};
pub use log::LogSink;
pub use traits::MetricSink;

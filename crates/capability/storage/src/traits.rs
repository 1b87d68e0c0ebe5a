//! 写入接口 Trait 定义
//!
//! 设计原则：
//! - 每条指标独立写入，不排队、不批量、不重试
//! - 实现必须可并发调用（不共享可变编码状态）
//! - 使用 async_trait 支持动态分发

use crate::error::WriteError;
use async_trait::async_trait;
use domain::MetricRecord;

/// 指标写入接口
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// 写入单条指标
    async fn write(&self, record: &MetricRecord) -> Result<(), WriteError>;
}

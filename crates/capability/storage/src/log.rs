//! 仅打印日志的写入实现，未配置 InfluxDB 时使用（dry run）。

use crate::error::WriteError;
use crate::line_protocol;
use crate::traits::MetricSink;
use async_trait::async_trait;
use domain::MetricRecord;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl MetricSink for LogSink {
    async fn write(&self, record: &MetricRecord) -> Result<(), WriteError> {
        let line = line_protocol::encode(record)?;
        info!(target: "m2i.storage", line = %line, "metric_dry_run");
        Ok(())
    }
}

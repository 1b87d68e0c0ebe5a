//! 内存写入实现（测试与本地联调用）。

use crate::error::WriteError;
use crate::line_protocol;
use crate::traits::MetricSink;
use async_trait::async_trait;
use domain::MetricRecord;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryMetricSink {
    records: RwLock<Vec<MetricRecord>>,
}

impl InMemoryMetricSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<MetricRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MetricSink for InMemoryMetricSink {
    async fn write(&self, record: &MetricRecord) -> Result<(), WriteError> {
        // 与真实写入一致：无法编码的指标同样拒绝
        line_protocol::encode(record)?;
        let mut guard = self
            .records
            .write()
            .map_err(|_| WriteError::Unavailable("lock failed".to_string()))?;
        guard.push(record.clone());
        Ok(())
    }
}

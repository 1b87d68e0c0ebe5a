//! 采集链路装配模块
//!
//! 把订阅连接、分发器和写入端接在一起：每条 MQTT 消息经分发器解析、写入，
//! 处理结果计入进程级计数器，并刷新心跳。

use async_trait::async_trait;
use domain::RawMessage;
use m2i_config::AppConfig;
use m2i_ingest::{MessageHandler, MqttSubscription};
use m2i_parser::{Extractor, ExtractorOptions, RegistryError, resolve_name};
use m2i_pipeline::{DispatchOutcome, Dispatcher};
use m2i_storage::{InfluxConfig, InfluxSink, LogSink, MetricSink, WriteError};
use m2i_telemetry::{
    Heartbeat, record_dropped_ignored, record_dropped_invalid, record_message_received,
    record_metric_extracted, record_write_failure, record_write_latency_ms, record_write_success,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// 分发处理器
///
/// 实现 `MessageHandler`，每条消息处理完成后（无论结果）刷新心跳。
pub struct DispatchHandler {
    dispatcher: Dispatcher,
    heartbeat: Heartbeat,
}

impl DispatchHandler {
    pub fn new(dispatcher: Dispatcher, heartbeat: Heartbeat) -> Self {
        Self {
            dispatcher,
            heartbeat,
        }
    }
}

#[async_trait]
impl MessageHandler for DispatchHandler {
    async fn handle(&self, message: RawMessage) {
        record_message_received();
        let started_at = Instant::now();
        let outcome = self.dispatcher.handle(message).await;
        match &outcome {
            DispatchOutcome::Written(_) => {
                record_metric_extracted();
                record_write_success();
                record_write_latency_ms(started_at.elapsed().as_millis() as u64);
            }
            DispatchOutcome::Ignored => record_dropped_ignored(),
            DispatchOutcome::Invalid(_) => record_dropped_invalid(),
            DispatchOutcome::WriteFailed { .. } => {
                record_metric_extracted();
                record_write_failure();
            }
        }
        self.heartbeat.poke();
    }
}

/// 按配置中的解析器标识构造解析策略。
pub fn build_extractor(config: &AppConfig) -> Result<Arc<dyn Extractor>, RegistryError> {
    let options = ExtractorOptions {
        magnet_policy: config.magnet_policy,
    };
    resolve_name(&config.parser, &options)
}

/// 按配置选择写入端：未配置 InfluxDB 时只打印日志。
pub fn build_sink(config: &AppConfig) -> Result<Arc<dyn MetricSink>, WriteError> {
    match config.influxdb.as_ref() {
        Some(target) => {
            info!(
                target: "m2i.app",
                url = %target.url,
                database = %target.database,
                "sink: influxdb"
            );
            let sink = InfluxSink::new(InfluxConfig {
                url: target.url.clone(),
                database: target.database.clone(),
                username: target.username.clone(),
                password: target.password.clone(),
                timeout: Duration::from_secs(target.timeout_seconds),
            })?;
            Ok(Arc::new(sink))
        }
        None => {
            info!(target: "m2i.app", "sink: log (influxdb not configured)");
            Ok(Arc::new(LogSink))
        }
    }
}

/// 启动采集任务。
pub fn spawn_ingest(
    subscription: MqttSubscription,
    handler: Arc<dyn MessageHandler>,
) -> tokio::task::JoinHandle<()> {
    info!(
        target: "m2i.app",
        filters = ?subscription.filters(),
        "ingest_started"
    );
    tokio::spawn(subscription.run(handler))
}

//! 消息分发：调用当前解析策略，把产出的指标交给写入端。
//!
//! 单条消息的任何失败（解析错误、策略 panic、写入失败）都只影响这条消息，
//! 以 [`DispatchOutcome`] 返回并记录日志，分发器本身不会中止。

use domain::{MetricRecord, ParserKind, RawMessage, now_epoch_ms};
use m2i_parser::{DecodeError, Extractor};
use m2i_storage::{MetricSink, WriteError};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, warn};

/// 单条消息的处理结果。
#[derive(Debug)]
pub enum DispatchOutcome {
    /// 指标已写入
    Written(MetricRecord),
    /// 策略判定为可忽略的消息
    Ignored,
    /// 消息无法解析
    Invalid(DecodeError),
    /// 解析成功但写入失败，指标丢弃
    WriteFailed {
        record: MetricRecord,
        error: WriteError,
    },
}

impl DispatchOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, DispatchOutcome::Written(_))
    }
}

/// 分发器入口。
#[derive(Clone)]
pub struct Dispatcher {
    extractor: Arc<dyn Extractor>,
    sink: Arc<dyn MetricSink>,
}

impl Dispatcher {
    pub fn new(extractor: Arc<dyn Extractor>, sink: Arc<dyn MetricSink>) -> Self {
        Self { extractor, sink }
    }

    pub fn kind(&self) -> ParserKind {
        self.extractor.kind()
    }

    /// 以当前时间作为指标时间戳分发一条消息。
    pub async fn dispatch(&self, topic: &str, payload: &[u8]) -> DispatchOutcome {
        self.dispatch_at(topic, payload, now_epoch_ms()).await
    }

    /// 以接收时间作为指标时间戳分发一条消息。
    pub async fn handle(&self, message: RawMessage) -> DispatchOutcome {
        self.dispatch_at(&message.topic, &message.payload, message.received_at_ms)
            .await
    }

    async fn dispatch_at(&self, topic: &str, payload: &[u8], ts_ms: i64) -> DispatchOutcome {
        let kind = self.kind();
        let record = match self.extract(topic, payload, ts_ms) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(
                    target: "m2i.pipeline",
                    parser = %kind,
                    topic = %topic,
                    "message_ignored"
                );
                return DispatchOutcome::Ignored;
            }
            Err(err) => {
                warn!(
                    target: "m2i.pipeline",
                    parser = %kind,
                    topic = %topic,
                    payload_bytes = payload.len(),
                    error = %err,
                    "message_invalid"
                );
                return DispatchOutcome::Invalid(err);
            }
        };

        match self.sink.write(&record).await {
            Ok(()) => {
                debug!(
                    target: "m2i.pipeline",
                    parser = %kind,
                    topic = %topic,
                    measurement = %record.measurement(),
                    fields = record.fields().len(),
                    "metric_written"
                );
                DispatchOutcome::Written(record)
            }
            Err(error) => {
                warn!(
                    target: "m2i.pipeline",
                    parser = %kind,
                    topic = %topic,
                    measurement = %record.measurement(),
                    error = %error,
                    "metric_write_failed"
                );
                DispatchOutcome::WriteFailed { record, error }
            }
        }
    }

    /// 策略内的 panic 转换为解析错误。
    fn extract(
        &self,
        topic: &str,
        payload: &[u8],
        ts_ms: i64,
    ) -> Result<Option<MetricRecord>, DecodeError> {
        let extractor = &self.extractor;
        match catch_unwind(AssertUnwindSafe(|| extractor.extract(topic, payload, ts_ms))) {
            Ok(result) => result,
            Err(panic) => {
                let message = if let Some(message) = panic.downcast_ref::<&str>() {
                    (*message).to_string()
                } else if let Some(message) = panic.downcast_ref::<String>() {
                    message.clone()
                } else {
                    "unknown panic".to_string()
                };
                Err(DecodeError::Panicked(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain::FieldValue;
    use m2i_parser::{ExtractorOptions, resolve};
    use m2i_storage::InMemoryMetricSink;

    struct FailingSink;

    #[async_trait]
    impl MetricSink for FailingSink {
        async fn write(&self, _record: &MetricRecord) -> Result<(), WriteError> {
            Err(WriteError::Transport("forced failure".to_string()))
        }
    }

    struct PanickingExtractor;

    impl Extractor for PanickingExtractor {
        fn kind(&self) -> ParserKind {
            ParserKind::Nilan
        }

        fn extract(
            &self,
            _topic: &str,
            _payload: &[u8],
            _ts_ms: i64,
        ) -> Result<Option<MetricRecord>, DecodeError> {
            panic!("strategy exploded");
        }
    }

    fn dispatcher_for(kind: ParserKind, sink: Arc<dyn MetricSink>) -> Dispatcher {
        Dispatcher::new(resolve(kind, &ExtractorOptions::default()), sink)
    }

    #[tokio::test]
    async fn dispatch_writes_extracted_metric() {
        let sink = Arc::new(InMemoryMetricSink::new());
        let dispatcher = dispatcher_for(ParserKind::Nilan, sink.clone());

        let outcome = dispatcher.dispatch("nilan/temp/T1_intake", b"21.5").await;
        assert!(outcome.is_written());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag("name"), Some("T1_intake"));
        assert_eq!(records[0].field("value"), Some(&FieldValue::Float(21.5)));
    }

    #[tokio::test]
    async fn ignored_message_is_not_written() {
        let sink = Arc::new(InMemoryMetricSink::new());
        let dispatcher = dispatcher_for(ParserKind::Nilan, sink.clone());

        let outcome = dispatcher.dispatch("nilan/text/status", b"running").await;
        assert!(matches!(outcome, DispatchOutcome::Ignored));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_is_invalid_and_dispatcher_keeps_working() {
        let sink = Arc::new(InMemoryMetricSink::new());
        let dispatcher = dispatcher_for(ParserKind::SonoffPowR2, sink.clone());

        let outcome = dispatcher.dispatch("plug1/tele/SENSOR", b"{not json").await;
        assert!(matches!(outcome, DispatchOutcome::Invalid(DecodeError::Json(_))));

        let nilan = dispatcher_for(ParserKind::Nilan, sink.clone());
        let outcome = nilan.dispatch("nilan/temp/T1", b"abc").await;
        assert!(matches!(
            outcome,
            DispatchOutcome::Invalid(DecodeError::InvalidNumber(_))
        ));
        assert!(nilan.dispatch("nilan/temp/T1", b"20").await.is_written());
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn panicking_strategy_becomes_invalid() {
        let sink = Arc::new(InMemoryMetricSink::new());
        let dispatcher = Dispatcher::new(Arc::new(PanickingExtractor), sink.clone());

        let outcome = dispatcher.dispatch("nilan/temp/T1", b"20").await;
        match outcome {
            DispatchOutcome::Invalid(DecodeError::Panicked(message)) => {
                assert_eq!(message, "strategy exploded");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn sink_failure_drops_metric() {
        let dispatcher = dispatcher_for(ParserKind::Nilan, Arc::new(FailingSink));

        let outcome = dispatcher.dispatch("nilan/temp/T1", b"20").await;
        match outcome {
            DispatchOutcome::WriteFailed { record, error } => {
                assert_eq!(record.measurement(), "nilan");
                assert!(matches!(error, WriteError::Transport(_)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn replayed_message_is_written_twice() {
        let sink = Arc::new(InMemoryMetricSink::new());
        let dispatcher = dispatcher_for(ParserKind::Watermeter, sink.clone());

        let first = RawMessage::new("watermeter/basement", "123.4", 1_000);
        let second = RawMessage::new("watermeter/basement", "123.4", 2_000);
        assert!(dispatcher.handle(first).await.is_written());
        assert!(dispatcher.handle(second).await.is_written());

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ts_ms(), 1_000);
        assert_eq!(records[1].ts_ms(), 2_000);
        assert_eq!(records[0].measurement(), "basement");
    }
}

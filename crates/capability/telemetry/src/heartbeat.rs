//! 存活心跳。
//!
//! 消息处理完成后调用 [`Heartbeat::poke`]；看门狗任务按固定间隔检查最近一次 poke，
//! 仍在间隔内时写心跳文件供外部监管进程判断存活，否则只记录告警日志。
//! 进程本身不会因心跳过期而退出。

use crate::metrics;
use domain::now_epoch_ms;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// 心跳句柄，可跨任务克隆。
#[derive(Debug, Clone)]
pub struct Heartbeat {
    last_poke_ms: Arc<AtomicI64>,
}

impl Heartbeat {
    /// 创建心跳，启动时刻视为一次 poke。
    pub fn new() -> Self {
        Self {
            last_poke_ms: Arc::new(AtomicI64::new(now_epoch_ms())),
        }
    }

    pub fn poke(&self) {
        self.last_poke_ms.store(now_epoch_ms(), Ordering::Relaxed);
    }

    pub fn last_poke_ms(&self) -> i64 {
        self.last_poke_ms.load(Ordering::Relaxed)
    }

    /// 最近一次 poke 是否落在 `interval` 内。
    pub fn is_fresh(&self, interval: Duration, now_ms: i64) -> bool {
        let age_ms = now_ms.saturating_sub(self.last_poke_ms());
        age_ms <= interval.as_millis() as i64
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}

/// 启动看门狗任务。
pub fn spawn_watchdog(
    heartbeat: Heartbeat,
    interval: Duration,
    heartbeat_file: Option<PathBuf>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // 第一次 tick 立即返回，跳过
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let snapshot = metrics().snapshot();
            info!(
                target: "m2i.telemetry",
                messages_received = snapshot.messages_received,
                metrics_extracted = snapshot.metrics_extracted,
                dropped_ignored = snapshot.dropped_ignored,
                dropped_invalid = snapshot.dropped_invalid,
                write_success = snapshot.write_success,
                write_failure = snapshot.write_failure,
                "telemetry_snapshot"
            );
            beat(&heartbeat, interval, heartbeat_file.as_deref(), now_epoch_ms()).await;
        }
    })
}

/// 单次心跳检查；返回是否判定为存活。
pub(crate) async fn beat(
    heartbeat: &Heartbeat,
    interval: Duration,
    heartbeat_file: Option<&Path>,
    now_ms: i64,
) -> bool {
    if !heartbeat.is_fresh(interval, now_ms) {
        warn!(
            target: "m2i.telemetry",
            last_poke_ms = heartbeat.last_poke_ms(),
            age_ms = now_ms.saturating_sub(heartbeat.last_poke_ms()),
            interval_ms = interval.as_millis() as u64,
            "heartbeat_stale"
        );
        return false;
    }
    if let Some(path) = heartbeat_file {
        let contents = format!("{}\n", now_ms / 1000);
        if let Err(err) = tokio::fs::write(path, contents).await {
            warn!(
                target: "m2i.telemetry",
                path = %path.display(),
                error = %err,
                "heartbeat_file_write_failed"
            );
        }
    }
    true
}

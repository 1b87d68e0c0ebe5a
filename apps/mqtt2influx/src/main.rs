//! MQTT → InfluxDB 指标转发服务入口。

mod ingest;

use clap::Parser;
use m2i_config::AppConfig;
use m2i_ingest::{MqttSource, MqttSourceConfig, client_id, topic_filters};
use m2i_pipeline::Dispatcher;
use m2i_telemetry::{Heartbeat, init_tracing, spawn_watchdog};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "mqtt2influx", version, about = "Subscribe to MQTT telemetry and write it to InfluxDB")]
struct Cli {
    /// 配置文件（env 格式），缺省时读取当前目录的 .env
    config: Option<PathBuf>,

    /// 只校验配置并打印订阅主题，不连接 broker
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    // 初始化结构化日志
    init_tracing();
    // 配置文件 + 环境变量
    let config = AppConfig::load(cli.config.as_deref())?;

    // 未知解析器直接退出
    let extractor = ingest::build_extractor(&config)?;
    let parser = extractor.kind();
    let filters = topic_filters(&config.mqtt_topics);
    let sink = ingest::build_sink(&config)?;
    info!(
        target: "m2i.app",
        parser = %parser,
        broker = %format!("{}:{}", config.mqtt.host, config.mqtt.port),
        filters = ?filters,
        "config_loaded"
    );
    if cli.check {
        info!(target: "m2i.app", "config_ok");
        return Ok(());
    }

    let source = MqttSource::new(MqttSourceConfig {
        host: config.mqtt.host.clone(),
        port: config.mqtt.port,
        username: config.mqtt.username.clone(),
        password: config.mqtt.password.clone(),
        client_id: client_id(parser),
        filters,
        connect_timeout: Duration::from_secs(config.mqtt_connect_timeout_seconds),
    });
    // 首次连接失败直接退出
    let subscription = source.connect().await?;

    let heartbeat = Heartbeat::new();
    let watchdog = spawn_watchdog(
        heartbeat.clone(),
        Duration::from_secs(config.watchdog_interval_seconds),
        config.heartbeat_file.clone(),
    );
    let dispatcher = Dispatcher::new(extractor, sink);
    let handler = Arc::new(ingest::DispatchHandler::new(dispatcher, heartbeat));
    let ingest = ingest::spawn_ingest(subscription, handler);

    tokio::signal::ctrl_c().await?;
    info!(target: "m2i.app", "shutdown");
    ingest.abort();
    watchdog.abort();
    Ok(())
}

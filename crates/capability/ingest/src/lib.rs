//! MQTT 订阅：连接 broker，订阅配置的主题，把每条消息交给处理器。

use async_trait::async_trait;
use domain::{ParserKind, RawMessage, now_epoch_ms};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS, SubscribeFilter,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 采集错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("source error: {0}")]
    Source(String),
}

/// 消息处理器。
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: RawMessage);
}

/// 把逗号分隔的主题列表转换为订阅过滤器（`<topic>/#`），去重并保持顺序。
pub fn topic_filters(topics: &str) -> Vec<String> {
    let mut filters: Vec<String> = Vec::new();
    for topic in topics.split(',') {
        let topic = topic.trim().trim_end_matches('/');
        if topic.is_empty() {
            continue;
        }
        let filter = format!("{}/#", topic);
        if !filters.contains(&filter) {
            filters.push(filter);
        }
    }
    filters
}

/// 订阅连接的 client id。
pub fn client_id(kind: ParserKind) -> String {
    format!("MQTT2Influx-{}", kind)
}

/// MQTT 采集源配置。
#[derive(Debug, Clone)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
    pub filters: Vec<String>,
    pub connect_timeout: Duration,
}

/// MQTT 采集源。
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttSourceConfig,
}

impl MqttSource {
    pub fn new(config: MqttSourceConfig) -> Self {
        Self { config }
    }

    /// 建立连接并发起订阅；在超时内未收到 ConnAck 视为启动失败。
    pub async fn connect(&self) -> Result<MqttSubscription, IngestError> {
        if self.config.filters.is_empty() {
            return Err(IngestError::Source("no topic to subscribe to".to_string()));
        }

        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.host.clone(),
            self.config.port,
        );
        options.set_keep_alive(Duration::from_secs(30));
        options.set_clean_session(true);
        if let Some(username) = self.config.username.as_ref() {
            options.set_credentials(username, self.config.password.clone().unwrap_or_default());
        }

        let (client, mut eventloop) = AsyncClient::new(options, 10);
        let timeout = self.config.connect_timeout;
        match tokio::time::timeout(timeout, wait_for_connack(&mut eventloop)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(IngestError::Connection(format!(
                    "no ConnAck from {}:{} within {}ms",
                    self.config.host,
                    self.config.port,
                    timeout.as_millis()
                )));
            }
        }
        info!(
            target: "m2i.ingest",
            host = %self.config.host,
            port = self.config.port,
            client_id = %self.config.client_id,
            "mqtt_connected"
        );

        let mut subscription = MqttSubscription {
            client,
            eventloop,
            filters: self.config.filters.clone(),
        };
        subscription.subscribe().await?;
        Ok(subscription)
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), IngestError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(IngestError::Connection(format!(
                        "connection refused: {:?}",
                        code
                    ))),
                };
            }
            Ok(_) => {}
            Err(err) => return Err(IngestError::Connection(err.to_string())),
        }
    }
}

/// 已建立的订阅连接。
pub struct MqttSubscription {
    client: AsyncClient,
    eventloop: EventLoop,
    filters: Vec<String>,
}

impl MqttSubscription {
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    async fn subscribe(&mut self) -> Result<(), IngestError> {
        let filters = self
            .filters
            .iter()
            .map(|filter| SubscribeFilter::new(filter.clone(), QoS::AtMostOnce));
        self.client
            .subscribe_many(filters)
            .await
            .map_err(|err| IngestError::Source(err.to_string()))?;
        info!(target: "m2i.ingest", filters = ?self.filters, "mqtt_subscribe_requested");
        Ok(())
    }

    /// 接收循环：每条消息在独立任务中处理，消息之间不保证顺序。
    pub async fn run(mut self, handler: Arc<dyn MessageHandler>) {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let message = RawMessage::new(
                        publish.topic.clone(),
                        publish.payload.to_vec(),
                        now_epoch_ms(),
                    );
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        handler.handle(message).await;
                    });
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // clean session 重连后订阅不会保留
                    info!(target: "m2i.ingest", "mqtt_reconnected");
                    if let Err(err) = self.subscribe().await {
                        warn!(target: "m2i.ingest", error = %err, "mqtt_resubscribe_failed");
                    }
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    debug!(target: "m2i.ingest", pkid = ack.pkid, "mqtt_subscribed");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(target: "m2i.ingest", error = %err, "mqtt_poll_failed");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_append_wildcard_and_dedup() {
        assert_eq!(
            topic_filters("tele, stat/ ,tele,, zigbee2mqtt"),
            vec!["tele/#", "stat/#", "zigbee2mqtt/#"]
        );
        assert!(topic_filters(" , ").is_empty());
    }

    #[test]
    fn distinct_topics_yield_one_filter_each() {
        let filters = topic_filters("a,b,c,d");
        assert_eq!(filters.len(), 4);
        assert!(filters.iter().all(|filter| filter.ends_with("/#")));
    }

    #[test]
    fn client_id_names_parser() {
        assert_eq!(client_id(ParserKind::Xiaomi), "MQTT2Influx-xiaomi");
        assert_eq!(
            client_id(ParserKind::TasmotaStatePower),
            "MQTT2Influx-tasmota-state-power"
        );
    }

    fn config(port: u16, filters: Vec<String>) -> MqttSourceConfig {
        MqttSourceConfig {
            host: "127.0.0.1".to_string(),
            port,
            username: None,
            password: None,
            client_id: client_id(ParserKind::Nilan),
            filters,
            connect_timeout: Duration::from_millis(300),
        }
    }

    #[tokio::test]
    async fn connect_requires_filters() {
        let err = MqttSource::new(config(1883, Vec::new()))
            .connect()
            .await
            .err()
            .expect("no filters");
        assert!(matches!(err, IngestError::Source(_)));
    }

    #[tokio::test]
    async fn silent_broker_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        // 接受连接但从不回复 ConnAck
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let err = MqttSource::new(config(port, topic_filters("nilan")))
            .connect()
            .await
            .err()
            .expect("timeout");
        assert!(matches!(err, IngestError::Connection(_)));
        server.abort();
    }
}

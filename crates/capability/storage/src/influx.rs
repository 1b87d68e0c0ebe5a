//! InfluxDB v1 HTTP 写入实现。
//!
//! 每条指标一次 `POST {url}/write?db=<database>&precision=s`，
//! 配置了用户名时附带 Basic 认证。

use crate::error::WriteError;
use crate::line_protocol::{self, PRECISION};
use crate::traits::MetricSink;
use async_trait::async_trait;
use domain::MetricRecord;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// 连接参数。
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

pub struct InfluxSink {
    client: reqwest::Client,
    write_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl InfluxSink {
    pub fn new(config: InfluxConfig) -> Result<Self, WriteError> {
        let write_url = write_url(&config.url, &config.database)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| WriteError::Config(err.to_string()))?;
        Ok(Self {
            client,
            write_url,
            username: config.username,
            password: config.password,
        })
    }
}

/// 拼接写入地址，保留基础 URL 上已有的路径前缀。
fn write_url(base: &str, database: &str) -> Result<Url, WriteError> {
    let base = format!("{}/", base.trim_end_matches('/'));
    let mut url = Url::parse(&base)
        .and_then(|url| url.join("write"))
        .map_err(|err| WriteError::Config(format!("influxdb url {}: {}", base, err)))?;
    url.query_pairs_mut()
        .append_pair("db", database)
        .append_pair("precision", PRECISION);
    Ok(url)
}

#[async_trait]
impl MetricSink for InfluxSink {
    async fn write(&self, record: &MetricRecord) -> Result<(), WriteError> {
        let line = line_protocol::encode(record)?;
        let mut request = self
            .client
            .post(self.write_url.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|err| WriteError::Transport(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            debug!(
                target: "m2i.storage",
                measurement = %record.measurement(),
                status = status.as_u16(),
                "influx_write_ok"
            );
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(WriteError::Rejected {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

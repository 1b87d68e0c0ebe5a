//! 解析器注册表：启动时将配置中的解析器标识解析为唯一的策略实例。

use crate::strategies::{
    Nilan, SonoffPowR2, TasmotaDs18b20, TasmotaStatePower, Watermeter, Wunderground, Xiaomi,
    Zigbee2mqtt,
};
use crate::{Extractor, ExtractorOptions};
use domain::ParserKind;
use std::sync::Arc;

/// 解析器选择错误（启动期致命）。
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("parser missing in configuration")]
    MissingParser,
    #[error("unknown parser: {0}")]
    UnknownParser(String),
}

/// 按解析器类型构造策略。
pub fn resolve(kind: ParserKind, options: &ExtractorOptions) -> Arc<dyn Extractor> {
    match kind {
        ParserKind::Xiaomi => Arc::new(Xiaomi::new(options.magnet_policy)),
        ParserKind::SonoffPowR2 => Arc::new(SonoffPowR2),
        ParserKind::Nilan => Arc::new(Nilan),
        ParserKind::Zigbee2mqtt => Arc::new(Zigbee2mqtt),
        ParserKind::Watermeter => Arc::new(Watermeter),
        ParserKind::Wunderground => Arc::new(Wunderground),
        ParserKind::TasmotaDs18b20 => Arc::new(TasmotaDs18b20),
        ParserKind::TasmotaStatePower => Arc::new(TasmotaStatePower),
    }
}

/// 按配置字符串构造策略。
pub fn resolve_name(
    name: &str,
    options: &ExtractorOptions,
) -> Result<Arc<dyn Extractor>, RegistryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistryError::MissingParser);
    }
    let kind = name
        .parse::<ParserKind>()
        .map_err(|_| RegistryError::UnknownParser(name.to_string()))?;
    Ok(resolve(kind, options))
}

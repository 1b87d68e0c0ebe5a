//! payload 取值与类型转换。

use crate::DecodeError;
use domain::FieldValue;
use serde_json::{Map, Value};

/// payload 按 UTF-8 解码。
pub fn payload_text(payload: &[u8]) -> Result<&str, DecodeError> {
    std::str::from_utf8(payload).map_err(|_| DecodeError::Utf8)
}

/// 宽松数值解析：去除首尾空白后按 f64 解析，非有限值视为非法。
pub fn parse_number(payload: &[u8]) -> Result<f64, DecodeError> {
    let text = payload_text(payload)?.trim();
    let value = text
        .parse::<f64>()
        .map_err(|_| DecodeError::InvalidNumber(text.to_string()))?;
    if !value.is_finite() {
        return Err(DecodeError::InvalidNumber(text.to_string()));
    }
    Ok(value)
}

/// payload 解析为 JSON 对象。
pub fn json_object(payload: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    match serde_json::from_slice::<Value>(payload)? {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::NotAnObject),
    }
}

/// 读取对象中的数值键。
pub fn number_key(map: &Map<String, Value>, key: &'static str) -> Result<f64, DecodeError> {
    map.get(key)
        .and_then(Value::as_f64)
        .ok_or(DecodeError::MissingKey(key))
}

/// JSON 值转换为 field；null 返回 None，对象和数组按 JSON 文本写为字符串。
///
/// 数字统一按 float 写入，同一 field 在整数和小数之间切换时不会产生类型冲突。
pub fn json_field(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .filter(|v| v.is_finite())
            .map(FieldValue::Float),
        Value::String(text) => Some(FieldValue::String(text.clone())),
        Value::Bool(flag) => Some(FieldValue::Boolean(*flag)),
        Value::Array(_) | Value::Object(_) => Some(FieldValue::String(value.to_string())),
        Value::Null => None,
    }
}

/// 文本透传：可解析为数值则按 float，否则按字符串。
pub fn text_or_number(payload: &[u8]) -> Result<FieldValue, DecodeError> {
    let text = payload_text(payload)?.trim();
    if text.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(FieldValue::Float(value)),
        _ => Ok(FieldValue::String(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_trims_whitespace() {
        assert_eq!(parse_number(b" 123.4\n").expect("number"), 123.4);
        assert_eq!(parse_number(b"-7").expect("number"), -7.0);
    }

    #[test]
    fn parse_number_rejects_text_and_non_finite() {
        assert!(matches!(parse_number(b"abc"), Err(DecodeError::InvalidNumber(_))));
        assert!(matches!(parse_number(b""), Err(DecodeError::InvalidNumber(_))));
        assert!(matches!(parse_number(b"NaN"), Err(DecodeError::InvalidNumber(_))));
        assert!(matches!(parse_number(&[0xff, 0xfe]), Err(DecodeError::Utf8)));
    }

    #[test]
    fn json_object_requires_object() {
        assert!(json_object(br#"{"a":1}"#).is_ok());
        assert!(matches!(json_object(b"[1,2]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(json_object(b"{oops"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn json_field_maps_json_types() {
        assert_eq!(json_field(&Value::from(21)), Some(FieldValue::Float(21.0)));
        assert_eq!(json_field(&Value::from("on")), Some(FieldValue::String("on".to_string())));
        assert_eq!(json_field(&Value::from(true)), Some(FieldValue::Boolean(true)));
        assert_eq!(json_field(&Value::Null), None);
        assert_eq!(
            json_field(&serde_json::json!({"x": 1})),
            Some(FieldValue::String("{\"x\":1}".to_string()))
        );
        assert_eq!(
            json_field(&serde_json::json!([0.3, 0.4])),
            Some(FieldValue::String("[0.3,0.4]".to_string()))
        );
    }

    #[test]
    fn text_or_number_passes_through() {
        assert_eq!(text_or_number(b"42.5").expect("value"), FieldValue::Float(42.5));
        assert_eq!(
            text_or_number(b"click").expect("value"),
            FieldValue::String("click".to_string())
        );
        assert!(matches!(text_or_number(b"  "), Err(DecodeError::EmptyPayload)));
    }
}

//! InfluxDB Line Protocol 编码（秒级精度）。
//!
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_s
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use crate::error::WriteError;
use domain::{FieldValue, MetricRecord};

/// 写入精度，与 `/write?precision=` 参数一致。
pub const PRECISION: &str = "s";

/// 将指标编码为一行 line protocol。
///
/// tag 按 key 排序输出，值为空的 tag 会被省略（时序库不接受空 tag 值）。
/// 含换行或以 `\` 结尾的名称、含换行的字符串值无法编码。
pub fn encode(record: &MetricRecord) -> Result<String, WriteError> {
    let mut line = escape_measurement(checked_name("measurement", record.measurement())?);

    for (key, value) in record.tags() {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(checked_name("tag key", key)?));
        line.push('=');
        line.push_str(&escape_key(checked_name("tag value", value)?));
    }

    line.push(' ');
    for (i, (key, value)) in record.fields().iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(checked_name("field key", key)?));
        line.push('=');
        line.push_str(&field_value(key, value)?);
    }

    line.push(' ');
    line.push_str(&timestamp_seconds(record.ts_ms()).to_string());
    Ok(line)
}

/// 毫秒时间戳转为秒（向下取整）。
pub fn timestamp_seconds(ts_ms: i64) -> i64 {
    ts_ms.div_euclid(1000)
}

fn field_value(key: &str, value: &FieldValue) -> Result<String, WriteError> {
    match value {
        FieldValue::Float(v) if !v.is_finite() => Err(WriteError::Encoding(format!(
            "field {} is not a finite number",
            key
        ))),
        FieldValue::Float(v) => Ok(format!("{}", v)),
        FieldValue::Integer(v) => Ok(format!("{}i", v)),
        FieldValue::String(v) if has_line_break(v) => Err(WriteError::Encoding(format!(
            "field {} contains a line break",
            key
        ))),
        FieldValue::String(v) => {
            let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
            Ok(format!("\"{}\"", escaped))
        }
        FieldValue::Boolean(v) => Ok(v.to_string()),
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

/// 名称中的换行会截断该行，结尾的 `\` 会转义后面的分隔符。
fn checked_name<'a>(what: &str, s: &'a str) -> Result<&'a str, WriteError> {
    if has_line_break(s) {
        return Err(WriteError::Encoding(format!(
            "{} {:?} contains a line break",
            what, s
        )));
    }
    if s.ends_with('\\') {
        return Err(WriteError::Encoding(format!(
            "{} {:?} ends with a backslash",
            what, s
        )));
    }
    Ok(s)
}

/// measurement 需转义逗号和空格。
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// tag key、tag value、field key 需转义逗号、等号和空格。
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_values_use_line_protocol_types() {
        assert_eq!(field_value("f", &FieldValue::Float(3.15)).expect("float"), "3.15");
        assert_eq!(field_value("f", &FieldValue::Float(1.0)).expect("float"), "1");
        assert_eq!(field_value("f", &FieldValue::Integer(-1)).expect("int"), "-1i");
        assert_eq!(field_value("f", &FieldValue::Boolean(false)).expect("bool"), "false");
        assert_eq!(
            field_value("f", &FieldValue::String("say \"hi\"".to_string())).expect("string"),
            "\"say \\\"hi\\\"\""
        );
        assert!(field_value("f", &FieldValue::Float(f64::NAN)).is_err());
        assert!(field_value("f", &FieldValue::String("a\nb".to_string())).is_err());
    }

    #[test]
    fn names_must_not_break_the_line() {
        assert_eq!(checked_name("tag value", "open").expect("plain"), "open");
        assert!(checked_name("tag value", "open\r\n").is_err());
        assert!(checked_name("tag value", "C:\\").is_err());
        assert_eq!(checked_name("tag value", "a\\b").expect("inner"), "a\\b");
    }

    #[test]
    fn timestamp_truncates_to_seconds() {
        assert_eq!(timestamp_seconds(1_700_000_000_999), 1_700_000_000);
        assert_eq!(timestamp_seconds(0), 0);
    }
}

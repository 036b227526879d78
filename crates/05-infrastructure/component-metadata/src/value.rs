//! 纯数据树
//!
//! 元数据对外只以纯数据树的形式出现：映射、序列、字符串、布尔值和任意精度十进制数，
//! 编码层无需了解任何内部类型。

use crate::errors::{MetadataError, MetadataResult};
use bigdecimal::BigDecimal;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

/// 键有序的纯数据映射
pub type PlainMap = BTreeMap<String, PlainValue>;

/// 纯数据值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlainValue {
    Null,
    Bool(bool),
    Number(#[serde(serialize_with = "serialize_decimal")] BigDecimal),
    String(String),
    List(Vec<PlainValue>),
    Map(PlainMap),
}

/// 以精确的 JSON 数字输出十进制数
fn serialize_decimal<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serde_json::Number::from_str(&value.to_string())
        .map_err(serde::ser::Error::custom)?
        .serialize(serializer)
}

/// 解析十进制文本，支持普通写法和科学计数法，不限精度
///
/// 只接受 `[+-]digits[.digits][(e|E)[+-]digits]` 形式，
/// 数字分隔符、空白、`inf`/`nan` 等写法一律视为格式错误。
pub(crate) fn parse_decimal(text: &str) -> Option<BigDecimal> {
    if !is_decimal_literal(text) {
        return None;
    }
    BigDecimal::from_str(text).ok()
}

fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = 0;

    let skip_sign = |pos: &mut usize| {
        if matches!(bytes.get(*pos), Some(b'+' | b'-')) {
            *pos += 1;
        }
    };
    let count_digits = |pos: &mut usize| {
        let start = *pos;
        while bytes.get(*pos).is_some_and(u8::is_ascii_digit) {
            *pos += 1;
        }
        *pos - start
    };

    skip_sign(&mut pos);
    let mut mantissa_digits = count_digits(&mut pos);
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        mantissa_digits += count_digits(&mut pos);
    }
    if mantissa_digits == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        skip_sign(&mut pos);
        if count_digits(&mut pos) == 0 {
            return false;
        }
    }

    pos == bytes.len()
}

impl PlainValue {
    /// 是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 获取字符串
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 获取布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 获取十进制数
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// 获取序列
    pub fn as_list(&self) -> Option<&[PlainValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// 获取映射
    pub fn as_map(&self) -> Option<&PlainMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// 按键取映射中的值
    pub fn get(&self, key: &str) -> Option<&PlainValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// 从存储读取的 JSON 值重建纯数据树
    ///
    /// 数字按其文本精确解析为十进制数，不做舍入。
    pub fn from_json(value: serde_json::Value) -> MetadataResult<Self> {
        Ok(match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                let text = n.to_string();
                match parse_decimal(&text) {
                    Some(decimal) => Self::Number(decimal),
                    None => return Err(MetadataError::parameter_format(text, "number")),
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<MetadataResult<Vec<_>>>()?,
            ),
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Self::from_json(v)?)))
                    .collect::<MetadataResult<PlainMap>>()?,
            ),
        })
    }

    /// 转换为 JSON 值
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_str(&n.to_string())
                .map(serde_json::Value::Number)
                .unwrap_or_else(|_| serde_json::Value::String(n.to_string())),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<bool> for PlainValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<BigDecimal> for PlainValue {
    fn from(value: BigDecimal) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for PlainValue {
    fn from(value: i64) -> Self {
        Self::Number(BigDecimal::from(value))
    }
}

impl From<&str> for PlainValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PlainValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<PlainValue>> for PlainValue {
    fn from(value: Vec<PlainValue>) -> Self {
        Self::List(value)
    }
}

impl From<PlainMap> for PlainValue {
    fn from(value: PlainMap) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<PlainValue>> From<Option<T>> for PlainValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

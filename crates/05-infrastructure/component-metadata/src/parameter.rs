//! 参数定义
//!
//! 参数定义在描述符构建时一次性创建，默认值在构造时即按声明的类型完成转换。

use crate::errors::{MetadataError, MetadataResult};
use crate::value::{parse_decimal, PlainMap, PlainValue};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 密码类参数对外显示时使用的占位符
pub const PASSWORD_MASK: &str = "******";

/// 参数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// 字符串
    String,
    /// 密码（显示时屏蔽）
    Password,
    /// 布尔值
    Boolean,
    /// 任意精度十进制数
    Number,
}

impl ParameterKind {
    /// 类型在元数据中的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Password => "password",
            Self::Boolean => "boolean",
            Self::Number => "number",
        }
    }

    /// 根据元数据中的名称查找类型
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "password" => Some(Self::Password),
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            _ => None,
        }
    }

    /// 将文本转换为本类型的值
    pub fn parse(&self, text: &str) -> MetadataResult<ParameterValue> {
        match self {
            Self::String => Ok(ParameterValue::Text(text.to_string())),
            Self::Password => Ok(ParameterValue::Password(text.to_string())),
            Self::Boolean => {
                if text.eq_ignore_ascii_case("true") {
                    Ok(ParameterValue::Boolean(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(ParameterValue::Boolean(false))
                } else {
                    Err(MetadataError::parameter_format(text, self.as_str()))
                }
            }
            Self::Number => parse_decimal(text)
                .map(ParameterValue::Number)
                .ok_or_else(|| MetadataError::parameter_format(text, self.as_str())),
        }
    }

    /// 将纯数据树中的值转换为本类型的值
    ///
    /// 既接受原生的布尔值和数字，也接受其文本形式。
    pub fn from_plain(&self, value: &PlainValue) -> MetadataResult<ParameterValue> {
        match (self, value) {
            (_, PlainValue::String(text)) => self.parse(text),
            (Self::Boolean, PlainValue::Bool(b)) => Ok(ParameterValue::Boolean(*b)),
            (Self::Number, PlainValue::Number(n)) => Ok(ParameterValue::Number(n.clone())),
            (_, other) => Err(MetadataError::parameter_format(
                other.to_json().to_string(),
                self.as_str(),
            )),
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 已转换的参数值
#[derive(Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Text(String),
    Password(String),
    Boolean(bool),
    Number(BigDecimal),
}

impl ParameterValue {
    /// 值对应的参数类型
    pub fn kind(&self) -> ParameterKind {
        match self {
            Self::Text(_) => ParameterKind::String,
            Self::Password(_) => ParameterKind::Password,
            Self::Boolean(_) => ParameterKind::Boolean,
            Self::Number(_) => ParameterKind::Number,
        }
    }

    /// 获取文本内容（字符串或密码原文）
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Password(s) => Some(s),
            _ => None,
        }
    }

    /// 获取布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
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

    /// 转换为纯数据值
    pub fn to_plain(&self) -> PlainValue {
        match self {
            Self::Text(s) | Self::Password(s) => PlainValue::String(s.clone()),
            Self::Boolean(b) => PlainValue::Bool(*b),
            Self::Number(n) => PlainValue::Number(n.clone()),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Password(_) => f.write_str(PASSWORD_MASK),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl fmt::Debug for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Password(_) => f.debug_tuple("Password").field(&PASSWORD_MASK).finish(),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
        }
    }
}

/// 参数定义
///
/// 可选参数必定带有与类型匹配的默认值；必需参数的默认值不会在分发时使用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
    kind: ParameterKind,
    description: String,
    required: bool,
    default: Option<ParameterValue>,
}

impl ParameterDefinition {
    /// 创建参数定义，默认值文本在此处按类型转换
    pub fn new(
        kind: ParameterKind,
        description: impl Into<String>,
        required: bool,
        raw_default: Option<&str>,
    ) -> MetadataResult<Self> {
        let default = raw_default.map(|text| kind.parse(text)).transpose()?;
        Self::from_parts(kind, description.into(), required, default)
    }

    /// 创建必需参数
    pub fn required(kind: ParameterKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            required: true,
            default: None,
        }
    }

    /// 创建带默认值文本的可选参数
    pub fn optional(
        kind: ParameterKind,
        description: impl Into<String>,
        raw_default: &str,
    ) -> MetadataResult<Self> {
        Self::new(kind, description, false, Some(raw_default))
    }

    /// 使用已转换的默认值创建参数定义
    pub fn with_default(
        kind: ParameterKind,
        description: impl Into<String>,
        required: bool,
        default: ParameterValue,
    ) -> MetadataResult<Self> {
        if default.kind() != kind {
            return Err(MetadataError::parameter_format(
                default.to_string(),
                kind.as_str(),
            ));
        }
        Self::from_parts(kind, description.into(), required, Some(default))
    }

    fn from_parts(
        kind: ParameterKind,
        description: String,
        required: bool,
        default: Option<ParameterValue>,
    ) -> MetadataResult<Self> {
        if !required && default.is_none() {
            return Err(MetadataError::malformed(format!(
                "可选参数 ({}) 必须提供默认值",
                description
            )));
        }

        Ok(Self {
            kind,
            description,
            required,
            default,
        })
    }

    /// 参数类型
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// 参数描述
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 是否必需
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// 默认值
    pub fn default_value(&self) -> Option<&ParameterValue> {
        self.default.as_ref()
    }

    /// 按本参数的类型转换文本
    pub fn parse_value(&self, text: &str) -> MetadataResult<ParameterValue> {
        self.kind.parse(text)
    }

    /// 绑定运行时值
    pub fn bind(&self) -> BoundParameter<'_> {
        BoundParameter {
            definition: self,
            value: None,
        }
    }

    /// 转换为可存储的纯数据形式 `{type, desc, required, default}`
    ///
    /// 密码默认值保留原文，以便重建；对外输出使用 [`as_public_plain`](Self::as_public_plain)。
    pub fn as_plain(&self) -> PlainMap {
        let mut map = PlainMap::new();
        map.insert("type".to_string(), self.kind.as_str().into());
        map.insert("desc".to_string(), self.description.clone().into());
        map.insert("required".to_string(), self.required.into());
        map.insert(
            "default".to_string(),
            self.default
                .as_ref()
                .map_or(PlainValue::Null, ParameterValue::to_plain),
        );
        map
    }

    /// 对外输出的纯数据形式，密码默认值以占位符代替
    pub fn as_public_plain(&self) -> PlainMap {
        let mut map = self.as_plain();
        mask_password_default(&mut map);
        map
    }
}

/// 将纯数据形式参数定义中的密码默认值替换为占位符
pub fn mask_password_default(map: &mut PlainMap) {
    let is_password =
        map.get("type").and_then(PlainValue::as_str) == Some(ParameterKind::Password.as_str());
    if let Some(default) = map.get_mut("default").filter(|_| is_password) {
        if !default.is_null() {
            *default = PASSWORD_MASK.into();
        }
    }
}

/// 绑定了运行时值的参数
#[derive(Debug, Clone)]
pub struct BoundParameter<'a> {
    definition: &'a ParameterDefinition,
    value: Option<ParameterValue>,
}

impl<'a> BoundParameter<'a> {
    /// 参数定义
    pub fn definition(&self) -> &'a ParameterDefinition {
        self.definition
    }

    /// 从文本设置运行时值，转换失败时保留原值
    pub fn set_from_text(&mut self, text: &str) -> MetadataResult<()> {
        self.value = Some(self.definition.parse_value(text)?);
        Ok(())
    }

    /// 设置已转换的运行时值
    pub fn set_value(&mut self, value: ParameterValue) -> MetadataResult<()> {
        if value.kind() != self.definition.kind() {
            return Err(MetadataError::parameter_format(
                value.to_string(),
                self.definition.kind().as_str(),
            ));
        }
        self.value = Some(value);
        Ok(())
    }

    /// 是否已显式设置
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// 当前值；未设置时返回默认值
    pub fn value(&self) -> Option<&ParameterValue> {
        self.value.as_ref().or_else(|| self.definition.default_value())
    }
}

impl fmt::Display for BoundParameter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{}", value),
            None => Ok(()),
        }
    }
}

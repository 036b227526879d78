//! 组件声明
//!
//! 组件通过静态声明描述自身：身份信息、资源创建参数（字段）以及服务方法的形参列表。
//! 声明可以手写，也可以由 `component-macros` 的 `#[derive(ComponentDeclaration)]` 生成。

use crate::parameter::{ParameterKind, PASSWORD_MASK};
use bigdecimal::BigDecimal;
use std::fmt;

/// 组件身份信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    /// 组件名称
    pub name: String,
    /// 组件描述
    pub description: String,
    /// 组件文档
    pub documentation: String,
}

impl ComponentInfo {
    /// 创建组件身份信息
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            documentation: String::new(),
        }
    }

    /// 设置文档
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }
}

/// 字段或形参的值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// 文本
    Text,
    /// 密码文本
    Secret,
    /// 布尔值
    Boolean,
    /// 整数，记录符号与位宽，分发时按此检查取值范围
    Integer {
        /// 是否有符号
        signed: bool,
        /// 位宽
        bits: u32,
    },
    /// 浮点数
    Float,
    /// 任意精度十进制数
    Decimal,
    /// 框架注入的其他类型（如请求上下文）
    Opaque(&'static str),
}

impl ValueType {
    /// 值类型对应的参数类型；框架注入类型没有对应的参数类型
    pub fn parameter_kind(&self) -> Option<ParameterKind> {
        match self {
            Self::Text => Some(ParameterKind::String),
            Self::Secret => Some(ParameterKind::Password),
            Self::Boolean => Some(ParameterKind::Boolean),
            Self::Integer { .. } | Self::Float | Self::Decimal => Some(ParameterKind::Number),
            Self::Opaque(_) => None,
        }
    }

    /// 值类型名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Secret => "secret",
            Self::Boolean => "boolean",
            Self::Integer { signed, bits } => integer_name(*signed, *bits),
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Opaque(name) => *name,
        }
    }

    /// 整数类型的闭区间取值范围
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        match *self {
            Self::Integer { signed: true, bits } if (1..=128).contains(&bits) => {
                Some((i128::MIN >> (128 - bits), i128::MAX >> (128 - bits)))
            }
            Self::Integer { signed: false, bits } if (1..=127).contains(&bits) => {
                Some((0, i128::MAX >> (127 - bits)))
            }
            _ => None,
        }
    }
}

fn integer_name(signed: bool, bits: u32) -> &'static str {
    match (signed, bits) {
        (true, 8) => "i8",
        (true, 16) => "i16",
        (true, 32) => "i32",
        (true, 64) => "i64",
        (true, 128) => "i128",
        (false, 8) => "u8",
        (false, 16) => "u16",
        (false, 32) => "u32",
        (false, 64) => "u64",
        _ => "integer",
    }
}

/// 可作为参数声明的 Rust 类型
pub trait DeclaredValue {
    /// 对应的值类型
    const VALUE_TYPE: ValueType;
}

macro_rules! declared_value {
    ($value_type:expr => $($ty:ty),+) => {
        $(impl DeclaredValue for $ty {
            const VALUE_TYPE: ValueType = $value_type;
        })+
    };
}

declared_value!(ValueType::Text => String, &'static str);
declared_value!(ValueType::Boolean => bool);
macro_rules! declared_integer {
    ($($ty:ty),+) => {
        $(impl DeclaredValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::Integer {
                signed: <$ty>::MIN != 0,
                bits: <$ty>::BITS,
            };
        })+
    };
}
declared_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);
declared_value!(ValueType::Float => f32, f64);
declared_value!(ValueType::Decimal => BigDecimal);

/// 密码文本，调试输出时屏蔽
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password(pub String);

impl Password {
    /// 获取原文
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Password").field(&PASSWORD_MASK).finish()
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(PASSWORD_MASK)
    }
}

declared_value!(ValueType::Secret => Password);

/// 参数注解
///
/// 带默认值的参数为可选参数，否则为必需参数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterAnnotation {
    /// 参数名称，缺省时使用字段或形参自身的名称
    pub name: Option<String>,
    /// 参数描述
    pub description: String,
    /// 默认值文本
    pub default: Option<String>,
    /// 是否按位置传递
    pub positional: bool,
}

impl ParameterAnnotation {
    /// 创建参数注解
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// 覆盖参数名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 设置默认值文本
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// 标记为按位置传递
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }
}

/// 资源创建参数字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceField {
    /// 字段名称
    pub field_name: String,
    /// 字段值类型
    pub value_type: ValueType,
    /// 参数注解；没有注解的字段不是资源参数
    pub annotation: Option<ParameterAnnotation>,
}

impl ResourceField {
    /// 带注解的字段
    pub fn annotated(
        field_name: impl Into<String>,
        value_type: ValueType,
        annotation: ParameterAnnotation,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            value_type,
            annotation: Some(annotation),
        }
    }

    /// 不带注解的字段
    pub fn unannotated(field_name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            field_name: field_name.into(),
            value_type,
            annotation: None,
        }
    }
}

/// 服务方法的形参
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalParameter {
    /// 形参名称
    pub arg_name: String,
    /// 形参值类型
    pub value_type: ValueType,
    /// 参数注解；没有注解的形参由框架注入
    pub annotation: Option<ParameterAnnotation>,
}

/// 服务方法声明
///
/// 形参按声明顺序保存，该顺序即分发时的参数顺序。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMethod {
    /// 服务名称
    pub name: String,
    /// 服务描述
    pub description: String,
    /// 形参列表
    pub parameters: Vec<FormalParameter>,
}

impl ServiceMethod {
    /// 创建服务方法声明
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// 追加带注解的形参
    pub fn param<T: DeclaredValue>(
        self,
        arg_name: impl Into<String>,
        annotation: ParameterAnnotation,
    ) -> Self {
        self.param_of(arg_name, T::VALUE_TYPE, annotation)
    }

    /// 以显式值类型追加带注解的形参
    pub fn param_of(
        mut self,
        arg_name: impl Into<String>,
        value_type: ValueType,
        annotation: ParameterAnnotation,
    ) -> Self {
        self.parameters.push(FormalParameter {
            arg_name: arg_name.into(),
            value_type,
            annotation: Some(annotation),
        });
        self
    }

    /// 追加由框架注入的形参
    pub fn injected(mut self, arg_name: impl Into<String>, type_name: &'static str) -> Self {
        self.parameters.push(FormalParameter {
            arg_name: arg_name.into(),
            value_type: ValueType::Opaque(type_name),
            annotation: None,
        });
        self
    }
}

/// 组件声明
///
/// 提取器只通过此 trait 了解组件的结构。
pub trait ComponentDeclaration: Send + Sync + 'static {
    /// 组件身份信息；未声明时提取失败
    fn component_info() -> Option<ComponentInfo>;

    /// 资源创建参数字段
    fn resource_fields() -> Vec<ResourceField> {
        Vec::new()
    }

    /// 服务方法
    fn service_methods() -> Vec<ServiceMethod> {
        Vec::new()
    }
}

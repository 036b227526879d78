//! 错误类型定义

use thiserror::Error;

/// 元数据错误类型
///
/// 所有错误都只影响单次元数据请求或单次调用分发，不会导致进程终止。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("{scope} '{name}' 已存在")]
    DuplicateKey { scope: &'static str, name: String },

    #[error("服务描述符无效: {message}")]
    MalformedDescriptor { message: String },

    #[error("无法将 '{value}' 转换为 {kind} 类型")]
    ParameterFormat { value: String, kind: String },

    #[error("缺少必需参数 '{name}' (位于 '{section}')")]
    MandatoryParameterMissing { name: String, section: String },

    #[error("未知参数 '{name}' (位于 '{section}')")]
    UnknownParameter { name: String, section: String },

    #[error("组件配置错误: {message}")]
    Configuration { message: String },
}

impl MetadataError {
    /// 创建重复键错误
    pub fn duplicate_key(scope: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateKey {
            scope,
            name: name.into(),
        }
    }

    /// 创建描述符无效错误
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            message: message.into(),
        }
    }

    /// 创建参数格式错误
    pub fn parameter_format(value: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::ParameterFormat {
            value: value.into(),
            kind: kind.into(),
        }
    }

    /// 创建必需参数缺失错误
    pub fn mandatory_missing(name: impl Into<String>, section: impl Into<String>) -> Self {
        Self::MandatoryParameterMissing {
            name: name.into(),
            section: section.into(),
        }
    }

    /// 创建未知参数错误
    pub fn unknown_parameter(name: impl Into<String>, section: impl Into<String>) -> Self {
        Self::UnknownParameter {
            name: name.into(),
            section: section.into(),
        }
    }

    /// 创建组件配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 对应的 HTTP 状态码
    ///
    /// 组件声明缺失属于服务端问题 (500)，其余均为客户端或声明错误 (400)。
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration { .. } => 500,
            Self::DuplicateKey { .. }
            | Self::MalformedDescriptor { .. }
            | Self::ParameterFormat { .. }
            | Self::MandatoryParameterMissing { .. }
            | Self::UnknownParameter { .. } => 400,
        }
    }
}

/// 设置加载错误类型
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("设置加载失败: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("设置验证失败: {message}")]
    Invalid { message: String },
}

/// 结果类型别名
pub type MetadataResult<T> = Result<T, MetadataError>;
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(MetadataError::duplicate_key("服务", "search").status_code(), 400);
        assert_eq!(MetadataError::malformed("ghost").status_code(), 400);
        assert_eq!(MetadataError::parameter_format("x", "number").status_code(), 400);
        assert_eq!(MetadataError::mandatory_missing("q", "search").status_code(), 400);
        assert_eq!(MetadataError::unknown_parameter("z", "search").status_code(), 400);
        assert_eq!(MetadataError::configuration("no info").status_code(), 500);
    }

    #[test]
    fn test_parameter_format_message_names_value_and_kind() {
        let err = MetadataError::parameter_format("abc", "number");
        let message = err.to_string();
        assert!(message.contains("abc"));
        assert!(message.contains("number"));
    }
}

//! 元数据设置
//!
//! 组合 `uri` 字段所需的两个路径前缀。设置值显式传入，不使用全局单例。

use crate::errors::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 默认配置文件（不含扩展名）
pub const DEFAULT_SETTINGS_FILE: &str = "config/metadata";

/// 环境变量前缀
pub const ENV_PREFIX: &str = "METADATA";

/// 元数据设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// 组件代码的路径前缀
    pub code_prefix: String,
    /// 资源实例的路径前缀
    pub resource_prefix: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            code_prefix: "/code".to_string(),
            resource_prefix: "/resource".to_string(),
        }
    }
}

impl MetadataSettings {
    /// 使用指定前缀创建设置
    pub fn new(code_prefix: impl Into<String>, resource_prefix: impl Into<String>) -> Self {
        Self {
            code_prefix: code_prefix.into(),
            resource_prefix: resource_prefix.into(),
        }
    }

    /// 从默认配置文件和环境变量加载设置
    ///
    /// 配置文件可选；环境变量 `METADATA_CODE_PREFIX` 等覆盖文件中的值。
    pub fn load() -> SettingsResult<Self> {
        Self::build(config::File::with_name(DEFAULT_SETTINGS_FILE).required(false))
    }

    /// 从指定配置文件加载设置，环境变量仍然生效
    pub fn load_from(path: impl AsRef<Path>) -> SettingsResult<Self> {
        Self::build(config::File::from(path.as_ref()).required(true))
    }

    fn build<S>(file: S) -> SettingsResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings: Self = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        debug!(
            "元数据设置加载完成: code_prefix={}, resource_prefix={}",
            settings.code_prefix, settings.resource_prefix
        );
        Ok(settings)
    }

    /// 验证前缀格式
    pub fn validate(&self) -> SettingsResult<()> {
        for (key, prefix) in [
            ("code_prefix", &self.code_prefix),
            ("resource_prefix", &self.resource_prefix),
        ] {
            if !prefix.starts_with('/') || (prefix.len() > 1 && prefix.ends_with('/')) {
                return Err(SettingsError::Invalid {
                    message: format!("{} 必须以 '/' 开头且不以 '/' 结尾: {}", key, prefix),
                });
            }
        }
        Ok(())
    }

    /// 组件代码的 URI
    pub fn code_uri(&self, component_name: &str) -> String {
        format!("{}/{}", self.code_prefix, component_name)
    }

    /// 资源实例的 URI
    pub fn resource_uri(&self, resource_name: &str) -> String {
        format!("{}/{}", self.resource_prefix, resource_name)
    }
}

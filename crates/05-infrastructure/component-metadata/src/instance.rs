//! 组件实例
//!
//! 组件实例独占一个按需创建、仅创建一次的元数据，以及调用期的资源名称和凭据。

use crate::declaration::{ComponentDeclaration, ValueType};
use crate::descriptor::ComponentDescriptor;
use crate::errors::{MetadataError, MetadataResult};
use crate::extractor::{extract, ExtractedMetadata};
use crate::parameter::PASSWORD_MASK;
use crate::resource::{resource_creation_params, validate_resource_request, ResourceRequest};
use crate::settings::MetadataSettings;
use crate::value::{PlainMap, PlainValue};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 访问外部服务时使用的凭据
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// 账号
    pub account: String,
    /// 密码
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("password", &PASSWORD_MASK)
            .finish()
    }
}

/// 组件实例
pub struct ComponentInstance<C> {
    component: C,
    resource_name: Option<String>,
    credentials: Option<Credentials>,
    metadata: OnceCell<Arc<ExtractedMetadata>>,
}

impl<C: fmt::Debug> fmt::Debug for ComponentInstance<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("component", &self.component)
            .field("resource_name", &self.resource_name)
            .field("credentials", &self.credentials)
            .field("extracted", &self.metadata.get().is_some())
            .finish()
    }
}

impl<C: ComponentDeclaration> ComponentInstance<C> {
    /// 创建新的组件实例，元数据在首次访问时提取
    pub fn new(component: C) -> Self {
        Self {
            component,
            resource_name: None,
            credentials: None,
            metadata: OnceCell::new(),
        }
    }

    /// 使用从存储重建的描述符创建组件实例，此后不再进行提取
    pub fn with_descriptor(component: C, descriptor: ComponentDescriptor) -> Self {
        Self {
            component,
            resource_name: None,
            credentials: None,
            metadata: OnceCell::with_value(Arc::new(ExtractedMetadata::rehydrated(descriptor))),
        }
    }

    /// 组件
    pub fn component(&self) -> &C {
        &self.component
    }

    /// 可变组件
    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    /// 设置资源名称
    pub fn set_resource_name(&mut self, resource_name: impl Into<String>) {
        self.resource_name = Some(resource_name.into());
    }

    /// 资源名称
    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    /// 设置凭据
    pub fn set_credentials(&mut self, account: impl Into<String>, password: impl Into<String>) {
        self.credentials = Some(Credentials {
            account: account.into(),
            password: password.into(),
        });
    }

    /// 凭据
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// 元数据是否已可用（已提取或已重建）
    pub fn is_extracted(&self) -> bool {
        self.metadata.get().is_some()
    }

    /// 确保元数据已提取
    ///
    /// 并发的首次调用只会触发一次提取，其他调用方等待其完成；
    /// 提取失败时不保存任何结果，错误返回给本次调用方。
    pub fn ensure_extracted(&self) -> MetadataResult<&Arc<ExtractedMetadata>> {
        self.metadata.get_or_try_init(|| {
            debug!("首次访问元数据，开始提取: {}", std::any::type_name::<C>());
            extract::<C>().map(Arc::new)
        })
    }

    /// 可跨线程共享的元数据
    pub fn shared_metadata(&self) -> MetadataResult<Arc<ExtractedMetadata>> {
        self.ensure_extracted().map(Arc::clone)
    }

    /// 组件描述符
    pub fn descriptor(&self) -> MetadataResult<&ComponentDescriptor> {
        Ok(self.ensure_extracted()?.descriptor())
    }

    /// 组件名称
    pub fn name(&self) -> MetadataResult<&str> {
        Ok(self.descriptor()?.name())
    }

    /// 组件代码 URI
    pub fn uri(&self, settings: &MetadataSettings) -> MetadataResult<String> {
        Ok(settings.code_uri(self.name()?))
    }

    /// 资源实例 URI；未设置资源名称时为空
    pub fn resource_uri(&self, settings: &MetadataSettings) -> Option<String> {
        self.resource_name
            .as_deref()
            .map(|name| settings.resource_uri(name))
    }

    /// 服务参数的声明顺序
    pub fn parameter_order(&self, service: &str) -> MetadataResult<&[String]> {
        self.ensure_extracted()?
            .dispatch()
            .parameter_order(service)
            .ok_or_else(|| missing_tables(service))
    }

    /// 与参数顺序对齐的值类型
    pub fn parameter_types(&self, service: &str) -> MetadataResult<&[ValueType]> {
        self.ensure_extracted()?
            .dispatch()
            .parameter_types(service)
            .ok_or_else(|| missing_tables(service))
    }

    /// 全部服务的对外输出形式；`resource_base_uri` 为空时使用组件代码 URI
    pub fn services_as_plain(
        &self,
        settings: &MetadataSettings,
        resource_base_uri: Option<&str>,
    ) -> MetadataResult<PlainMap> {
        Ok(self
            .descriptor()?
            .services_as_plain(settings, resource_base_uri))
    }

    /// 组件元数据 `{uri, name, desc, doc, params, services, resource_creation_params}`
    pub fn metadata(&self, settings: &MetadataSettings) -> MetadataResult<PlainMap> {
        let descriptor = self.descriptor()?;

        let mut map = PlainMap::new();
        map.insert("uri".to_string(), settings.code_uri(descriptor.name()).into());
        map.insert("name".to_string(), descriptor.name().into());
        map.insert("desc".to_string(), descriptor.description().into());
        map.insert("doc".to_string(), descriptor.documentation().into());
        map.insert(
            "params".to_string(),
            PlainValue::Map(descriptor.parameters_as_public_plain()),
        );
        map.insert(
            "services".to_string(),
            PlainValue::Map(descriptor.services_as_plain(settings, None)),
        );
        map.insert(
            "resource_creation_params".to_string(),
            PlainValue::Map(resource_creation_params(descriptor.name())?),
        );
        Ok(map)
    }

    /// 按本组件的参数定义校验资源创建请求并补齐默认值
    pub fn validate_resource_request(
        &self,
        payload: &PlainValue,
    ) -> MetadataResult<ResourceRequest> {
        validate_resource_request(self.descriptor()?, payload)
    }
}

fn missing_tables(service: &str) -> MetadataError {
    MetadataError::malformed(format!("服务 '{}' 没有参数表", service))
}

//! 元数据提取
//!
//! 对组件声明进行一次性遍历，构建组件描述符以及每个服务的参数顺序表和参数类型表。
//! 调用方无法按名称传参，分发层只能依靠这两张按下标对齐的表把无序的请求参数
//! 还原为正确顺序、正确类型的参数列表。

use crate::declaration::{ComponentDeclaration, ParameterAnnotation, ValueType};
use crate::descriptor::{ComponentDescriptor, ServiceDescriptor};
use crate::errors::{MetadataError, MetadataResult};
use crate::parameter::ParameterDefinition;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// 描述符来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorOrigin {
    /// 由组件声明提取
    Extracted,
    /// 从存储重建
    Rehydrated,
}

/// 每个服务的参数顺序表和参数类型表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTables {
    order: BTreeMap<String, Vec<String>>,
    types: BTreeMap<String, Vec<ValueType>>,
}

impl DispatchTables {
    fn register_service(&mut self, service: &str) {
        self.order.entry(service.to_string()).or_default();
        self.types.entry(service.to_string()).or_default();
    }

    fn push(&mut self, service: &str, name: String, value_type: ValueType) {
        self.order.entry(service.to_string()).or_default().push(name);
        self.types.entry(service.to_string()).or_default().push(value_type);
    }

    /// 服务参数的声明顺序
    pub fn parameter_order(&self, service: &str) -> Option<&[String]> {
        self.order.get(service).map(Vec::as_slice)
    }

    /// 与参数顺序对齐的值类型
    pub fn parameter_types(&self, service: &str) -> Option<&[ValueType]> {
        self.types.get(service).map(Vec::as_slice)
    }

    /// 拥有参数表的服务名称
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.order.keys().map(String::as_str)
    }

    /// 是否没有任何服务
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// 提取结果
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMetadata {
    descriptor: ComponentDescriptor,
    dispatch: DispatchTables,
    origin: DescriptorOrigin,
}

impl ExtractedMetadata {
    /// 包装从存储重建的描述符；重建的描述符没有分发表
    pub fn rehydrated(descriptor: ComponentDescriptor) -> Self {
        Self {
            descriptor,
            dispatch: DispatchTables::default(),
            origin: DescriptorOrigin::Rehydrated,
        }
    }

    /// 组件描述符
    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    /// 分发表
    pub fn dispatch(&self) -> &DispatchTables {
        &self.dispatch
    }

    /// 描述符来源
    pub fn origin(&self) -> DescriptorOrigin {
        self.origin
    }
}

/// 根据注解创建参数定义：有默认值即为可选参数
fn definition_for(
    owner: &str,
    value_type: ValueType,
    annotation: &ParameterAnnotation,
) -> MetadataResult<ParameterDefinition> {
    let kind = value_type.parameter_kind().ok_or_else(|| {
        MetadataError::configuration(format!(
            "'{}' 的类型 {} 不能作为参数",
            owner,
            value_type.name()
        ))
    })?;
    let required = annotation.default.is_none();

    ParameterDefinition::new(
        kind,
        annotation.description.clone(),
        required,
        annotation.default.as_deref(),
    )
}

/// 提取组件元数据
///
/// 步骤依次为：读取身份信息、登记资源创建参数、按声明顺序遍历服务方法的形参。
/// 任何错误都会立即返回，不会产生部分构建的结果。
pub fn extract<C: ComponentDeclaration>() -> MetadataResult<ExtractedMetadata> {
    let type_name = std::any::type_name::<C>();

    let info = C::component_info().ok_or_else(|| {
        MetadataError::configuration(format!("组件 {} 未声明组件信息", type_name))
    })?;
    if info.name.is_empty() {
        return Err(MetadataError::configuration(format!(
            "组件 {} 的名称为空",
            type_name
        )));
    }
    debug!("开始提取组件元数据: {} ({})", info.name, type_name);

    let mut descriptor =
        ComponentDescriptor::new(info.name.clone(), info.description, info.documentation);

    for field in C::resource_fields() {
        let Some(annotation) = &field.annotation else {
            continue;
        };
        let name = annotation
            .name
            .clone()
            .unwrap_or_else(|| field.field_name.clone());
        let definition = definition_for(&field.field_name, field.value_type, annotation)?;

        debug!(
            "资源参数: {} (kind={}, required={})",
            name,
            definition.kind(),
            definition.is_required()
        );
        descriptor.add_parameter(name, definition)?;
    }

    let mut dispatch = DispatchTables::default();
    for method in C::service_methods() {
        let mut service = ServiceDescriptor::new(method.description.clone());
        let mut positional = Vec::new();
        dispatch.register_service(&method.name);

        for formal in &method.parameters {
            let Some(annotation) = &formal.annotation else {
                debug!(
                    "跳过框架注入的形参: {}.{} ({})",
                    method.name,
                    formal.arg_name,
                    formal.value_type.name()
                );
                continue;
            };
            let name = annotation
                .name
                .clone()
                .unwrap_or_else(|| formal.arg_name.clone());
            let owner = format!("{}.{}", method.name, formal.arg_name);
            let definition = definition_for(&owner, formal.value_type, annotation)?;

            service.add_parameter(name.clone(), definition)?;
            if annotation.positional {
                positional.push(name.clone());
            }
            dispatch.push(&method.name, name, formal.value_type);
        }

        if !positional.is_empty() {
            service.set_positional_parameters(positional)?;
        }

        debug!(
            "服务: {} ({} 个参数, {} 个位置参数)",
            method.name,
            service.parameters().len(),
            service.positional_parameters().len()
        );
        descriptor.add_service(method.name, service)?;
    }

    info!(
        "组件元数据提取完成: {} ({} 个资源参数, {} 个服务)",
        descriptor.name(),
        descriptor.parameters().len(),
        descriptor.services().len()
    );

    Ok(ExtractedMetadata {
        descriptor,
        dispatch,
        origin: DescriptorOrigin::Extracted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{ComponentInfo, DeclaredValue, ResourceField, ServiceMethod};
    use crate::parameter::ParameterKind;

    struct Search;

    impl ComponentDeclaration for Search {
        fn component_info() -> Option<ComponentInfo> {
            Some(ComponentInfo::new("Search", "搜索组件"))
        }

        fn resource_fields() -> Vec<ResourceField> {
            vec![
                ResourceField::annotated(
                    "key",
                    ValueType::Text,
                    ParameterAnnotation::new("API 密钥").named("api_key"),
                ),
                ResourceField::unannotated("cache", ValueType::Opaque("Cache")),
            ]
        }

        fn service_methods() -> Vec<ServiceMethod> {
            vec![
                ServiceMethod::new("search", "搜索")
                    .injected("request", "Request")
                    .param::<String>("query", ParameterAnnotation::new("查询").positional())
                    .param::<i64>("limit", ParameterAnnotation::new("数量").with_default("10")),
                ServiceMethod::new("status", "状态"),
            ]
        }
    }

    struct Anonymous;

    impl ComponentDeclaration for Anonymous {
        fn component_info() -> Option<ComponentInfo> {
            None
        }
    }

    struct DuplicateServices;

    impl ComponentDeclaration for DuplicateServices {
        fn component_info() -> Option<ComponentInfo> {
            Some(ComponentInfo::new("Dup", ""))
        }

        fn service_methods() -> Vec<ServiceMethod> {
            vec![ServiceMethod::new("run", "a"), ServiceMethod::new("run", "b")]
        }
    }

    struct DuplicateParameter;

    impl ComponentDeclaration for DuplicateParameter {
        fn component_info() -> Option<ComponentInfo> {
            Some(ComponentInfo::new("DupParam", ""))
        }

        fn service_methods() -> Vec<ServiceMethod> {
            vec![ServiceMethod::new("run", "")
                .param::<String>("x", ParameterAnnotation::new("第一个").positional())
                .param::<i64>(
                    "y",
                    ParameterAnnotation::new("第二个").named("x").positional(),
                )]
        }
    }

    struct OpaqueParameter;

    impl ComponentDeclaration for OpaqueParameter {
        fn component_info() -> Option<ComponentInfo> {
            Some(ComponentInfo::new("Opaque", ""))
        }

        fn service_methods() -> Vec<ServiceMethod> {
            vec![ServiceMethod::new("run", "").param_of(
                "blob",
                ValueType::Opaque("Blob"),
                ParameterAnnotation::new("数据"),
            )]
        }
    }

    #[test]
    fn test_extract_builds_descriptor_and_tables() {
        let metadata = extract::<Search>().unwrap();
        let descriptor = metadata.descriptor();

        assert_eq!(metadata.origin(), DescriptorOrigin::Extracted);
        assert_eq!(descriptor.name(), "Search");
        assert_eq!(descriptor.parameters().len(), 1);
        assert!(descriptor.parameters()["api_key"].is_required());

        let search = descriptor.service("search").unwrap();
        assert_eq!(search.positional_parameters(), ["query"]);
        assert_eq!(search.parameters().len(), 2);
        assert_eq!(search.parameter("limit").and_then(|e| e.kind()), Some(ParameterKind::Number));

        let dispatch = metadata.dispatch();
        assert_eq!(dispatch.parameter_order("search").unwrap(), ["query", "limit"]);
        assert_eq!(
            dispatch.parameter_types("search").unwrap(),
            [ValueType::Text, <i64 as DeclaredValue>::VALUE_TYPE]
        );
        assert_eq!(dispatch.parameter_order("status").unwrap().len(), 0);
        assert!(descriptor.service("status").unwrap().positional_parameters().is_empty());
    }

    #[test]
    fn test_missing_component_info_is_configuration_error() {
        let err = extract::<Anonymous>().unwrap_err();
        assert!(matches!(err, MetadataError::Configuration { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_duplicate_service_fails_extraction() {
        let err = extract::<DuplicateServices>().unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateKey { .. }));
    }

    #[test]
    fn test_annotated_opaque_parameter_is_rejected() {
        let err = extract::<OpaqueParameter>().unwrap_err();
        assert!(matches!(err, MetadataError::Configuration { .. }));
    }

    #[test]
    fn test_duplicate_parameter_is_reported_before_positional_marking() {
        let err = extract::<DuplicateParameter>().unwrap_err();
        assert_eq!(err, MetadataError::duplicate_key("参数", "x"));
    }
}

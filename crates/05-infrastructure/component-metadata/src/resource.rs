//! 资源创建请求
//!
//! 客户端创建资源实例时提交 `{params, resource_creation_params}` 两个段落。
//! 每个段落按对应的参数定义校验：拒绝未声明的参数，检查类型，
//! 报告缺失的必需参数，并为缺失的可选参数补齐默认值。

use crate::descriptor::{ComponentDescriptor, ParameterEntry};
use crate::errors::{MetadataError, MetadataResult};
use crate::parameter::{ParameterDefinition, ParameterKind, ParameterValue};
use crate::value::{PlainMap, PlainValue};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 资源参数段落名称
pub const PARAMS_SECTION: &str = "params";

/// 资源创建参数段落名称
pub const CREATION_PARAMS_SECTION: &str = "resource_creation_params";

/// 创建资源实例时可用的参数定义，所有组件统一提供
pub fn resource_creation_definitions(
    component_name: &str,
) -> MetadataResult<BTreeMap<String, ParameterEntry>> {
    let params = [
        (
            "suggested_name",
            ParameterDefinition::new(
                ParameterKind::String,
                "Can be used to suggest the resource name to the server",
                true,
                Some(""),
            )?,
        ),
        (
            "public",
            ParameterDefinition::with_default(
                ParameterKind::Boolean,
                "Indicates whether the resource should be public",
                false,
                ParameterValue::Boolean(false),
            )?,
        ),
        (
            "desc",
            ParameterDefinition::with_default(
                ParameterKind::String,
                "Specifies a description for this new resource",
                false,
                ParameterValue::Text(format!("A '{}' resource", component_name)),
            )?,
        ),
    ];

    Ok(params
        .into_iter()
        .map(|(name, definition)| (name.to_string(), ParameterEntry::Live(definition)))
        .collect())
}

/// 创建资源实例时可用参数的纯数据形式
pub fn resource_creation_params(component_name: &str) -> MetadataResult<PlainMap> {
    Ok(resource_creation_definitions(component_name)?
        .iter()
        .map(|(name, entry)| (name.clone(), PlainValue::Map(entry.to_public_plain())))
        .collect())
}

/// 按参数定义校验一个段落并补齐默认值
///
/// 段落缺失或为空值时视为空映射。返回的映射中，提供的值已按参数类型规范化，
/// 缺失的可选参数取默认值；必需参数的默认值不参与补齐。
pub fn validate_section(
    section: &str,
    payload: Option<&PlainValue>,
    definitions: &BTreeMap<String, ParameterEntry>,
) -> MetadataResult<PlainMap> {
    let empty = PlainMap::new();
    let provided = match payload {
        None | Some(PlainValue::Null) => &empty,
        Some(PlainValue::Map(map)) => map,
        Some(_) => {
            return Err(MetadataError::malformed(format!(
                "'{}' 段落必须是映射",
                section
            )))
        }
    };

    let mut validated = PlainMap::new();
    for (name, value) in provided {
        let entry = definitions.get(name).ok_or_else(|| {
            warn!("段落 {} 中有未声明的参数: {}", section, name);
            MetadataError::unknown_parameter(name.clone(), section)
        })?;
        let kind = entry_kind(entry, name)?;
        validated.insert(name.clone(), kind.from_plain(value)?.to_plain());
    }

    for (name, entry) in definitions {
        if validated.contains_key(name) {
            continue;
        }
        if entry.is_required() {
            return Err(MetadataError::mandatory_missing(name.clone(), section));
        }
        let default = entry.default_plain().ok_or_else(|| {
            MetadataError::malformed(format!("可选参数 '{}' 没有默认值", name))
        })?;
        let kind = entry_kind(entry, name)?;
        validated.insert(name.clone(), kind.from_plain(&default)?.to_plain());
    }

    debug!("段落 {} 校验完成: {} 个参数", section, validated.len());
    Ok(validated)
}

fn entry_kind(entry: &ParameterEntry, name: &str) -> MetadataResult<ParameterKind> {
    entry
        .kind()
        .ok_or_else(|| MetadataError::malformed(format!("参数 '{}' 的类型未知", name)))
}

/// 校验通过的资源创建请求
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRequest {
    params: PlainMap,
    creation_params: PlainMap,
}

impl ResourceRequest {
    /// 资源参数（已补齐默认值）
    pub fn params(&self) -> &PlainMap {
        &self.params
    }

    /// 资源创建参数（已补齐默认值）
    pub fn creation_params(&self) -> &PlainMap {
        &self.creation_params
    }

    /// 建议的资源名称
    pub fn suggested_name(&self) -> &str {
        self.creation_text("suggested_name")
    }

    /// 资源描述
    pub fn description(&self) -> &str {
        self.creation_text("desc")
    }

    /// 是否公开
    pub fn is_public(&self) -> bool {
        self.creation_params
            .get("public")
            .and_then(PlainValue::as_bool)
            .unwrap_or(false)
    }

    fn creation_text(&self, key: &str) -> &str {
        self.creation_params
            .get(key)
            .and_then(PlainValue::as_str)
            .unwrap_or_default()
    }

    /// 可存储的纯数据形式 `{params, resource_creation_params}`
    pub fn as_plain(&self) -> PlainMap {
        let mut map = PlainMap::new();
        map.insert(PARAMS_SECTION.to_string(), PlainValue::Map(self.params.clone()));
        map.insert(
            CREATION_PARAMS_SECTION.to_string(),
            PlainValue::Map(self.creation_params.clone()),
        );
        map
    }
}

/// 校验资源创建请求
///
/// 请求必须是只含 `params` 和 `resource_creation_params` 的映射；
/// `params` 按组件的资源参数校验，`resource_creation_params` 按统一的创建参数校验。
pub fn validate_resource_request(
    descriptor: &ComponentDescriptor,
    payload: &PlainValue,
) -> MetadataResult<ResourceRequest> {
    let request = payload
        .as_map()
        .ok_or_else(|| MetadataError::malformed("资源创建请求必须是映射"))?;

    if let Some(unknown) = request
        .keys()
        .find(|key| key.as_str() != PARAMS_SECTION && key.as_str() != CREATION_PARAMS_SECTION)
    {
        return Err(MetadataError::malformed(format!(
            "资源创建请求中有未知的键: {}",
            unknown
        )));
    }

    let params = validate_section(
        PARAMS_SECTION,
        request.get(PARAMS_SECTION),
        descriptor.parameters(),
    )?;
    let creation_params = validate_section(
        CREATION_PARAMS_SECTION,
        request.get(CREATION_PARAMS_SECTION),
        &resource_creation_definitions(descriptor.name())?,
    )?;

    Ok(ResourceRequest {
        params,
        creation_params,
    })
}

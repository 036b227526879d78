//! 组件描述符与服务描述符
//!
//! 描述符在提取过程中构建，完成后只读。参数条目既可能是刚提取的参数定义，
//! 也可能是从存储重建的纯数据，二者在 [`ParameterEntry`] 中显式区分。

use crate::errors::{MetadataError, MetadataResult};
use crate::parameter::{mask_password_default, ParameterDefinition, ParameterKind};
use crate::settings::MetadataSettings;
use crate::value::{PlainMap, PlainValue};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// 参数条目
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterEntry {
    /// 由组件声明提取的参数定义
    Live(ParameterDefinition),
    /// 从存储重建的纯数据形式
    Plain(PlainMap),
}

impl ParameterEntry {
    /// 转换为纯数据形式；纯数据条目原样返回
    pub fn to_plain(&self) -> PlainMap {
        match self {
            Self::Live(definition) => definition.as_plain(),
            Self::Plain(map) => map.clone(),
        }
    }

    /// 对外输出的纯数据形式，密码默认值被屏蔽
    pub fn to_public_plain(&self) -> PlainMap {
        let mut map = self.to_plain();
        mask_password_default(&mut map);
        map
    }

    /// 参数定义（仅限提取得到的条目）
    pub fn definition(&self) -> Option<&ParameterDefinition> {
        match self {
            Self::Live(definition) => Some(definition),
            Self::Plain(_) => None,
        }
    }

    /// 参数类型
    pub fn kind(&self) -> Option<ParameterKind> {
        match self {
            Self::Live(definition) => Some(definition.kind()),
            Self::Plain(map) => map
                .get("type")
                .and_then(PlainValue::as_str)
                .and_then(ParameterKind::from_name),
        }
    }

    /// 是否必需；纯数据条目缺少该字段时视为必需
    pub fn is_required(&self) -> bool {
        match self {
            Self::Live(definition) => definition.is_required(),
            Self::Plain(map) => map
                .get("required")
                .and_then(PlainValue::as_bool)
                .unwrap_or(true),
        }
    }

    /// 默认值的纯数据形式
    pub fn default_plain(&self) -> Option<PlainValue> {
        match self {
            Self::Live(definition) => definition.default_value().map(|v| v.to_plain()),
            Self::Plain(map) => map.get("default").filter(|v| !v.is_null()).cloned(),
        }
    }
}

impl From<ParameterDefinition> for ParameterEntry {
    fn from(definition: ParameterDefinition) -> Self {
        Self::Live(definition)
    }
}

impl From<PlainMap> for ParameterEntry {
    fn from(map: PlainMap) -> Self {
        Self::Plain(map)
    }
}

fn insert_unique<V>(
    map: &mut BTreeMap<String, V>,
    scope: &'static str,
    name: String,
    value: V,
) -> MetadataResult<()> {
    match map.entry(name) {
        Entry::Occupied(occupied) => Err(MetadataError::duplicate_key(scope, occupied.key().clone())),
        Entry::Vacant(vacant) => {
            vacant.insert(value);
            Ok(())
        }
    }
}

fn parameters_to_plain(
    parameters: &BTreeMap<String, ParameterEntry>,
    render: fn(&ParameterEntry) -> PlainMap,
) -> PlainMap {
    parameters
        .iter()
        .map(|(name, entry)| (name.clone(), PlainValue::Map(render(entry))))
        .collect()
}

fn parameters_from_plain(
    value: Option<&PlainValue>,
    section: &str,
) -> MetadataResult<BTreeMap<String, ParameterEntry>> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(BTreeMap::new());
    };
    let map = value
        .as_map()
        .ok_or_else(|| MetadataError::malformed(format!("'{}' 的 params 必须是映射", section)))?;

    map.iter()
        .map(|(name, param)| {
            let param = param.as_map().ok_or_else(|| {
                MetadataError::malformed(format!("'{}' 的参数 '{}' 必须是映射", section, name))
            })?;
            Ok((name.clone(), ParameterEntry::Plain(param.clone())))
        })
        .collect()
}

fn text_field(map: &PlainMap, key: &str) -> MetadataResult<String> {
    match map.get(key) {
        None | Some(PlainValue::Null) => Ok(String::new()),
        Some(PlainValue::String(s)) => Ok(s.clone()),
        Some(_) => Err(MetadataError::malformed(format!("字段 '{}' 必须是字符串", key))),
    }
}

/// 服务描述符
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    description: String,
    parameters: BTreeMap<String, ParameterEntry>,
    positional: Vec<String>,
}

impl ServiceDescriptor {
    /// 创建新的服务描述符
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            parameters: BTreeMap::new(),
            positional: Vec::new(),
        }
    }

    /// 服务描述
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 添加参数；重名时返回 `DuplicateKey` 且不覆盖已有参数
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        parameter: impl Into<ParameterEntry>,
    ) -> MetadataResult<()> {
        insert_unique(&mut self.parameters, "参数", name.into(), parameter.into())
    }

    /// 标记按位置传递的参数
    ///
    /// 参数必须先通过 [`add_parameter`](Self::add_parameter) 声明，且每个名称只能出现一次；
    /// 任何一个名称未声明或重复时整体失败，描述符保持不变。
    pub fn set_positional_parameters<I, S>(&mut self, names: I) -> MetadataResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(unknown) = names.iter().find(|n| !self.parameters.contains_key(*n)) {
            return Err(MetadataError::malformed(format!(
                "位置参数 '{}' 未声明",
                unknown
            )));
        }

        let mut seen: BTreeSet<&str> = self.positional.iter().map(String::as_str).collect();
        if let Some(repeated) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(MetadataError::malformed(format!(
                "位置参数 '{}' 重复",
                repeated
            )));
        }

        self.positional.extend(names);
        Ok(())
    }

    /// 全部参数
    pub fn parameters(&self) -> &BTreeMap<String, ParameterEntry> {
        &self.parameters
    }

    /// 按名称获取参数
    pub fn parameter(&self, name: &str) -> Option<&ParameterEntry> {
        self.parameters.get(name)
    }

    /// 按位置传递的参数名称
    pub fn positional_parameters(&self) -> &[String] {
        &self.positional
    }

    /// 转换为可存储的纯数据形式 `{desc, params, positional_params}`
    ///
    /// 没有位置参数时省略 `positional_params`。
    pub fn as_plain(&self) -> PlainMap {
        self.render(ParameterEntry::to_plain)
    }

    /// 对外输出的纯数据形式，密码默认值被屏蔽
    pub fn as_public_plain(&self) -> PlainMap {
        self.render(ParameterEntry::to_public_plain)
    }

    fn render(&self, render_parameter: fn(&ParameterEntry) -> PlainMap) -> PlainMap {
        let mut map = PlainMap::new();
        map.insert("desc".to_string(), self.description.clone().into());
        map.insert(
            "params".to_string(),
            PlainValue::Map(parameters_to_plain(&self.parameters, render_parameter)),
        );
        if !self.positional.is_empty() {
            map.insert(
                "positional_params".to_string(),
                PlainValue::List(self.positional.iter().map(|n| n.as_str().into()).collect()),
            );
        }
        map
    }

    /// 从纯数据形式重建服务描述符
    pub fn from_plain(name: &str, map: &PlainMap) -> MetadataResult<Self> {
        let mut service = Self::new(text_field(map, "desc")?);
        service.parameters = parameters_from_plain(map.get("params"), name)?;

        if let Some(value) = map.get("positional_params").filter(|v| !v.is_null()) {
            let names = value
                .as_list()
                .ok_or_else(|| {
                    MetadataError::malformed(format!("'{}' 的 positional_params 必须是列表", name))
                })?
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        MetadataError::malformed(format!("'{}' 的位置参数名称必须是字符串", name))
                    })
                })
                .collect::<MetadataResult<Vec<_>>>()?;
            service.set_positional_parameters(names)?;
        }

        Ok(service)
    }
}

/// 组件描述符
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDescriptor {
    name: String,
    description: String,
    documentation: String,
    parameters: BTreeMap<String, ParameterEntry>,
    services: BTreeMap<String, ServiceDescriptor>,
}

impl ComponentDescriptor {
    /// 创建新的组件描述符
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        documentation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            documentation: documentation.into(),
            parameters: BTreeMap::new(),
            services: BTreeMap::new(),
        }
    }

    /// 组件名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 组件描述
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 组件文档
    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// 添加资源创建参数
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        parameter: impl Into<ParameterEntry>,
    ) -> MetadataResult<()> {
        insert_unique(&mut self.parameters, "参数", name.into(), parameter.into())
    }

    /// 添加服务；重名时返回 `DuplicateKey` 且保留先注册的服务
    pub fn add_service(
        &mut self,
        name: impl Into<String>,
        service: ServiceDescriptor,
    ) -> MetadataResult<()> {
        insert_unique(&mut self.services, "服务", name.into(), service)
    }

    /// 资源创建参数
    pub fn parameters(&self) -> &BTreeMap<String, ParameterEntry> {
        &self.parameters
    }

    /// 全部服务
    pub fn services(&self) -> &BTreeMap<String, ServiceDescriptor> {
        &self.services
    }

    /// 按名称获取服务
    pub fn service(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(name)
    }

    /// 资源创建参数的可存储纯数据形式
    pub fn parameters_as_plain(&self) -> PlainMap {
        parameters_to_plain(&self.parameters, ParameterEntry::to_plain)
    }

    /// 资源创建参数的对外输出形式，密码默认值被屏蔽
    pub fn parameters_as_public_plain(&self) -> PlainMap {
        parameters_to_plain(&self.parameters, ParameterEntry::to_public_plain)
    }

    /// 全部服务的对外输出形式，每个服务注入 `uri = base + "/" + 服务名`
    ///
    /// 未提供资源基础 URI 时以组件代码 URI 为基础；密码默认值被屏蔽。
    pub fn services_as_plain(
        &self,
        settings: &MetadataSettings,
        resource_base_uri: Option<&str>,
    ) -> PlainMap {
        let base_uri = match resource_base_uri {
            Some(uri) => uri.to_string(),
            None => settings.code_uri(&self.name),
        };

        self.services
            .iter()
            .map(|(name, service)| {
                let mut plain = service.as_public_plain();
                plain.insert("uri".to_string(), format!("{}/{}", base_uri, name).into());
                (name.clone(), PlainValue::Map(plain))
            })
            .collect()
    }

    /// 转换为可存储的纯数据形式
    pub fn as_plain(&self) -> PlainMap {
        let mut map = PlainMap::new();
        map.insert("name".to_string(), self.name.clone().into());
        map.insert("desc".to_string(), self.description.clone().into());
        map.insert("doc".to_string(), self.documentation.clone().into());
        map.insert("params".to_string(), PlainValue::Map(self.parameters_as_plain()));
        map.insert(
            "services".to_string(),
            PlainValue::Map(
                self.services
                    .iter()
                    .map(|(name, service)| (name.clone(), PlainValue::Map(service.as_plain())))
                    .collect(),
            ),
        );
        map
    }

    /// 从存储的纯数据形式重建组件描述符
    ///
    /// 重建后的参数条目均为 [`ParameterEntry::Plain`]。
    pub fn from_plain(map: &PlainMap) -> MetadataResult<Self> {
        let name = text_field(map, "name")?;
        if name.is_empty() {
            return Err(MetadataError::configuration("存储的组件描述符缺少名称"));
        }

        let mut descriptor = Self::new(name, text_field(map, "desc")?, text_field(map, "doc")?);
        descriptor.parameters = parameters_from_plain(map.get("params"), &descriptor.name)?;

        if let Some(services) = map.get("services").filter(|v| !v.is_null()) {
            let services = services
                .as_map()
                .ok_or_else(|| MetadataError::malformed("services 必须是映射"))?;
            for (service_name, service) in services {
                let service = service.as_map().ok_or_else(|| {
                    MetadataError::malformed(format!("服务 '{}' 必须是映射", service_name))
                })?;
                descriptor.add_service(
                    service_name.clone(),
                    ServiceDescriptor::from_plain(service_name, service)?,
                )?;
            }
        }

        Ok(descriptor)
    }
}

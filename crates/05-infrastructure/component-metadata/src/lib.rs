//! # Component Metadata
//!
//! 组件元数据框架：组件声明带类型参数的服务，框架在首次访问时对组件进行一次提取，
//! 构建可序列化的组件描述符，并生成分发调用所需的参数顺序表和参数类型表。
//!
//! ## 核心组件
//!
//! - [`ParameterDefinition`] - 带类型、描述、默认值的参数定义
//! - [`ServiceDescriptor`] - 单个服务的描述与参数
//! - [`ComponentDescriptor`] - 组件的资源参数与服务集合
//! - [`ComponentDeclaration`] - 组件的静态声明
//! - [`extract`] - 一次性元数据提取
//! - [`ComponentInstance`] - 持有惰性提取结果的组件实例
//! - [`assemble_arguments`] - 根据分发表组装调用参数
//! - [`validate_resource_request`] - 校验资源创建请求并补齐默认值
//!
//! ## 设计原则
//!
//! - 描述符只构建一次，之后只读，可跨线程共享
//! - 对外只输出纯数据树，编码层无需了解内部类型
//! - 声明错误立即返回给调用方，不做静默修复

pub mod declaration;
pub mod descriptor;
pub mod dispatch;
pub mod errors;
pub mod extractor;
pub mod instance;
pub mod parameter;
pub mod resource;
pub mod settings;
pub mod value;

pub use declaration::*;
pub use descriptor::*;
pub use dispatch::*;
pub use errors::*;
pub use extractor::*;
pub use instance::*;
pub use parameter::*;
pub use resource::*;
pub use settings::*;
pub use value::*;

pub use bigdecimal::BigDecimal;

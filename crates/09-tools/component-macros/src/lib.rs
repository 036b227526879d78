//! # Component Macros
//!
//! 这个 crate 提供了用于生成组件静态声明的过程宏。
//!
//! ## 核心宏
//!
//! - [`ComponentDeclaration`] - 从结构体及其字段生成组件声明
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::ComponentDeclaration;
//! use component_metadata::{ParameterAnnotation, ServiceMethod};
//!
//! #[derive(ComponentDeclaration)]
//! #[component(name = "Search", desc = "网页搜索", services = "Self::services")]
//! pub struct SearchComponent {
//!     #[resource_param(name = "api_key", desc = "搜索接口密钥")]
//!     key: String,
//!     #[resource_param(desc = "最大结果数", default = 10)]
//!     limit: i64,
//! }
//!
//! impl SearchComponent {
//!     fn services() -> Vec<ServiceMethod> {
//!         vec![ServiceMethod::new("search", "执行搜索")
//!             .param::<String>("query", ParameterAnnotation::new("查询语句").positional())]
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod component;
mod utils;

/// 组件声明派生宏
///
/// 为结构体实现 `component_metadata::ComponentDeclaration`。
///
/// # 结构体属性 `#[component(...)]`
///
/// - `name = "Name"` - 组件名称（默认为结构体名称）
/// - `desc = "..."` - 组件描述
/// - `doc = "..."` - 组件文档
/// - `services = "path::to_fn"` - 返回 `Vec<ServiceMethod>` 的函数
///
/// 没有 `#[component]` 属性的结构体不声明身份信息，元数据提取时会返回配置错误。
///
/// # 字段属性 `#[resource_param(...)]`
///
/// - `name = "param_name"` - 参数名称（默认为字段名称）
/// - `desc = "..."` - 参数描述
/// - `default = ...` - 默认值（字符串、整数、浮点数或布尔字面量），有默认值即为可选参数
#[proc_macro_derive(ComponentDeclaration, attributes(component, resource_param))]
pub fn derive_component_declaration(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    component::derive_component_declaration_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

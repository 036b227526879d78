//! 组件声明宏实现

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Path, Result};

use crate::utils::{is_attribute, parse_param_attr, parse_string_value, ParamArgs};

/// 组件属性参数
#[derive(Debug, Clone, Default)]
pub struct ComponentArgs {
    /// 自定义组件名称
    pub name: Option<String>,
    /// 组件描述
    pub desc: String,
    /// 组件文档
    pub doc: String,
    /// 服务目录函数
    pub services: Option<Path>,
}

impl ComponentArgs {
    /// 从结构体属性中解析 `#[component(...)]`；没有该属性时返回 `None`
    pub fn from_attrs(attrs: &[Attribute]) -> Result<Option<Self>> {
        let mut result: Option<Self> = None;

        for attr in attrs.iter().filter(|a| is_attribute(a, "component")) {
            if result.is_some() {
                return Err(syn::Error::new_spanned(attr, "重复的 component 属性"));
            }

            let mut args = ComponentArgs::default();
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    args.name = Some(parse_string_value(&meta)?);
                } else if meta.path.is_ident("desc") {
                    args.desc = parse_string_value(&meta)?;
                } else if meta.path.is_ident("doc") {
                    args.doc = parse_string_value(&meta)?;
                } else if meta.path.is_ident("services") {
                    let lit: LitStr = meta.value()?.parse()?;
                    args.services = Some(lit.parse()?);
                } else {
                    return Err(meta.error("未知的 component 参数"));
                }
                Ok(())
            })?;
            result = Some(args);
        }

        Ok(result)
    }
}

/// 派生宏主体
pub fn derive_component_declaration_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let args = ComponentArgs::from_attrs(&input.attrs)?;

    let component_info = match &args {
        Some(args) => {
            let name = args
                .name
                .clone()
                .unwrap_or_else(|| struct_name.to_string());
            let desc = &args.desc;
            let doc = &args.doc;
            quote! {
                ::core::option::Option::Some(
                    ::component_metadata::ComponentInfo::new(#name, #desc)
                        .with_documentation(#doc)
                )
            }
        }
        None => quote! { ::core::option::Option::None },
    };

    let resource_fields = resource_fields(&input)?;

    let service_methods = match args.as_ref().and_then(|a| a.services.as_ref()) {
        Some(path) => quote! { #path() },
        None => quote! { ::std::vec::Vec::new() },
    };

    Ok(quote! {
        impl #impl_generics ::component_metadata::ComponentDeclaration for #struct_name #ty_generics #where_clause {
            fn component_info() -> ::core::option::Option<::component_metadata::ComponentInfo> {
                #component_info
            }

            fn resource_fields() -> ::std::vec::Vec<::component_metadata::ResourceField> {
                ::std::vec![#(#resource_fields),*]
            }

            fn service_methods() -> ::std::vec::Vec<::component_metadata::ServiceMethod> {
                #service_methods
            }
        }
    })
}

/// 按声明顺序生成字段描述
fn resource_fields(input: &DeriveInput) -> Result<Vec<TokenStream>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "ComponentDeclaration 只支持具名字段结构体",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "ComponentDeclaration 只能用于结构体",
            ))
        }
    };

    fields
        .into_iter()
        .map(|field| {
            // 具名字段必有 ident
            let field_name = field
                .ident
                .as_ref()
                .map(|ident| ident.to_string())
                .unwrap_or_default();
            let ty = &field.ty;

            Ok(match parse_param_attr(field)? {
                Some(param) => {
                    let annotation = annotation_tokens(&param);
                    quote! {
                        ::component_metadata::ResourceField::annotated(
                            #field_name,
                            <#ty as ::component_metadata::DeclaredValue>::VALUE_TYPE,
                            #annotation,
                        )
                    }
                }
                None => {
                    let type_name = ty.to_token_stream().to_string().replace(' ', "");
                    quote! {
                        ::component_metadata::ResourceField::unannotated(
                            #field_name,
                            ::component_metadata::ValueType::Opaque(#type_name),
                        )
                    }
                }
            })
        })
        .collect()
}

fn annotation_tokens(param: &ParamArgs) -> TokenStream {
    let desc = &param.desc;
    let mut tokens = quote! { ::component_metadata::ParameterAnnotation::new(#desc) };
    if let Some(name) = &param.name {
        tokens = quote! { #tokens.named(#name) };
    }
    if let Some(default) = &param.default {
        tokens = quote! { #tokens.with_default(#default) };
    }
    tokens
}

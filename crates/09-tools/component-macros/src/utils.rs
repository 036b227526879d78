//! 宏工具函数

use syn::{meta::ParseNestedMeta, Attribute, Field, Lit, LitStr, Result};

/// 资源参数字段属性
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamArgs {
    /// 参数名称
    pub name: Option<String>,
    /// 参数描述
    pub desc: String,
    /// 默认值文本
    pub default: Option<String>,
}

/// 读取 `key = "value"` 形式的字符串值
pub fn parse_string_value(meta: &ParseNestedMeta<'_>) -> Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// 将字面量转换为默认值文本
pub fn literal_to_default(lit: &Lit) -> Result<String> {
    match lit {
        Lit::Str(lit_str) => Ok(lit_str.value()),
        Lit::Int(lit_int) => Ok(lit_int.base10_digits().to_string()),
        Lit::Float(lit_float) => Ok(lit_float.base10_digits().to_string()),
        Lit::Bool(lit_bool) => Ok(lit_bool.value.to_string()),
        other => Err(syn::Error::new_spanned(
            other,
            "默认值只能是字符串、整数、浮点数或布尔字面量",
        )),
    }
}

/// 检查属性名称
pub fn is_attribute(attr: &Attribute, name: &str) -> bool {
    attr.path().is_ident(name)
}

/// 解析字段上的 `#[resource_param(...)]` 属性；没有该属性时返回 `None`
pub fn parse_param_attr(field: &Field) -> Result<Option<ParamArgs>> {
    let mut result = None;

    for attr in field.attrs.iter().filter(|a| is_attribute(a, "resource_param")) {
        if result.is_some() {
            return Err(syn::Error::new_spanned(attr, "重复的 resource_param 属性"));
        }

        let mut args = ParamArgs::default();
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                args.name = Some(parse_string_value(&meta)?);
            } else if meta.path.is_ident("desc") {
                args.desc = parse_string_value(&meta)?;
            } else if meta.path.is_ident("default") {
                let lit: Lit = meta.value()?.parse()?;
                args.default = Some(literal_to_default(&lit)?);
            } else {
                return Err(meta.error("未知的 resource_param 参数"));
            }
            Ok(())
        })?;
        result = Some(args);
    }

    Ok(result)
}

//! 调用参数组装
//!
//! 请求中的参数是无序的名称到值的映射（外加按位置传递的值），
//! 这里借助参数顺序表和参数类型表把它们还原为服务方法的位置参数列表。

use crate::declaration::{ComponentDeclaration, Password, ValueType};
use crate::errors::{MetadataError, MetadataResult};
use crate::instance::ComponentInstance;
use crate::parameter::ParameterValue;
use crate::value::{PlainMap, PlainValue};
use bigdecimal::{BigDecimal, ToPrimitive};
use std::collections::HashMap;
use tracing::{debug, warn};

/// 已按声明类型转换的调用参数
///
/// `Integer` 的值已落在形参声明类型的取值范围内，可以无损转换为该类型。
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArgument {
    Text(String),
    Secret(Password),
    Boolean(bool),
    Integer(i128),
    Float(f64),
    Decimal(BigDecimal),
}

impl TypedArgument {
    /// 将参数值收窄为形参声明的值类型
    pub fn narrow(value: ParameterValue, value_type: ValueType) -> MetadataResult<Self> {
        let format_error = |value: &ParameterValue| {
            MetadataError::parameter_format(value.to_string(), value_type.name())
        };

        match (value_type, value) {
            (ValueType::Text, ParameterValue::Text(s)) => Ok(Self::Text(s)),
            (ValueType::Secret, ParameterValue::Password(s)) => Ok(Self::Secret(Password(s))),
            (ValueType::Boolean, ParameterValue::Boolean(b)) => Ok(Self::Boolean(b)),
            (ValueType::Integer { .. }, value @ ParameterValue::Number(_)) => {
                let (min, max) = value_type
                    .integer_range()
                    .ok_or_else(|| format_error(&value))?;
                value
                    .as_decimal()
                    .filter(|n| n.is_integer())
                    .and_then(ToPrimitive::to_i128)
                    .filter(|n| (min..=max).contains(n))
                    .map(Self::Integer)
                    .ok_or_else(|| format_error(&value))
            }
            (ValueType::Float, value @ ParameterValue::Number(_)) => value
                .as_decimal()
                .and_then(|n| n.to_f64())
                .map(Self::Float)
                .ok_or_else(|| format_error(&value)),
            (ValueType::Decimal, ParameterValue::Number(n)) => Ok(Self::Decimal(n)),
            (_, value) => Err(format_error(&value)),
        }
    }
}

/// 组装服务调用参数
///
/// 返回的参数与 [`ComponentInstance::parameter_types`] 按下标对齐：
/// 位置参数按出现顺序取自 `positional`，其余参数取自 `named`；
/// 缺少的可选参数使用默认值，缺少的必需参数返回 `MandatoryParameterMissing`。
pub fn assemble_arguments<C: ComponentDeclaration>(
    instance: &ComponentInstance<C>,
    service_name: &str,
    named: &PlainMap,
    positional: &[PlainValue],
) -> MetadataResult<Vec<TypedArgument>> {
    let service = instance
        .descriptor()?
        .service(service_name)
        .ok_or_else(|| MetadataError::malformed(format!("服务 '{}' 不存在", service_name)))?;
    let order = instance.parameter_order(service_name)?;
    let types = instance.parameter_types(service_name)?;

    if let Some(unknown) = named.keys().find(|name| service.parameter(name).is_none()) {
        warn!("服务 {} 收到未声明的参数: {}", service_name, unknown);
        return Err(MetadataError::unknown_parameter(unknown.clone(), service_name));
    }

    let positional_names = service.positional_parameters();
    if positional.len() > positional_names.len() {
        warn!(
            "服务 {} 收到 {} 个位置参数，最多 {} 个",
            service_name,
            positional.len(),
            positional_names.len()
        );
        return Err(MetadataError::unknown_parameter(
            format!("#{}", positional_names.len()),
            service_name,
        ));
    }
    let positional_index: HashMap<&str, usize> = positional_names
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_str(), index))
        .collect();

    let mut arguments = Vec::with_capacity(order.len());
    for (name, value_type) in order.iter().zip(types) {
        let entry = service.parameter(name).ok_or_else(|| {
            MetadataError::malformed(format!("参数 '{}' 不在服务 '{}' 中", name, service_name))
        })?;
        let kind = entry.kind().ok_or_else(|| {
            MetadataError::malformed(format!("参数 '{}' 的类型未知", name))
        })?;

        let by_position = positional_index
            .get(name.as_str())
            .and_then(|index| positional.get(*index));
        let by_name = named.get(name);
        if by_position.is_some() && by_name.is_some() {
            warn!("服务 {} 的参数 {} 同时按位置和名称提供", service_name, name);
            return Err(MetadataError::duplicate_key("请求参数", name.clone()));
        }
        let supplied = by_position.or(by_name).filter(|value| !value.is_null());

        let value = match supplied {
            Some(value) => kind.from_plain(value)?,
            None if entry.is_required() => {
                return Err(MetadataError::mandatory_missing(name.clone(), service_name));
            }
            None => {
                let default = entry.default_plain().ok_or_else(|| {
                    MetadataError::malformed(format!("可选参数 '{}' 没有默认值", name))
                })?;
                kind.from_plain(&default)?
            }
        };

        arguments.push(TypedArgument::narrow(value, *value_type)?);
    }

    debug!(
        "服务 {} 参数组装完成: {} 个参数",
        service_name,
        arguments.len()
    );
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{ComponentInfo, ParameterAnnotation, ServiceMethod};
    use std::str::FromStr;

    struct Counter;

    impl ComponentDeclaration for Counter {
        fn component_info() -> Option<ComponentInfo> {
            Some(ComponentInfo::new("Counter", "计数"))
        }

        fn service_methods() -> Vec<ServiceMethod> {
            vec![ServiceMethod::new("step", "步进")
                .param::<u8>("n", ParameterAnnotation::new("步长"))
                .param::<i16>("offset", ParameterAnnotation::new("偏移").with_default("0"))]
        }
    }

    struct Mailer;

    impl ComponentDeclaration for Mailer {
        fn component_info() -> Option<ComponentInfo> {
            Some(ComponentInfo::new("Mailer", "邮件"))
        }

        fn service_methods() -> Vec<ServiceMethod> {
            vec![ServiceMethod::new("send", "发送")
                .injected("request", "Request")
                .param::<String>("to", ParameterAnnotation::new("收件人").positional())
                .param::<Password>("token", ParameterAnnotation::new("令牌"))
                .param::<i64>("retries", ParameterAnnotation::new("重试").with_default("3"))
                .param::<f64>("ratio", ParameterAnnotation::new("比例").with_default("0.5"))
                .param::<bool>("urgent", ParameterAnnotation::new("加急").with_default("false"))]
        }
    }

    fn named(pairs: &[(&str, PlainValue)]) -> PlainMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_assemble_orders_and_fills_defaults() {
        let instance = ComponentInstance::new(Mailer);
        let args = assemble_arguments(
            &instance,
            "send",
            &named(&[("token", "t0k".into()), ("urgent", "TRUE".into())]),
            &["bob@example.com".into()],
        )
        .unwrap();

        assert_eq!(
            args,
            vec![
                TypedArgument::Text("bob@example.com".to_string()),
                TypedArgument::Secret(Password("t0k".to_string())),
                TypedArgument::Integer(3),
                TypedArgument::Float(0.5),
                TypedArgument::Boolean(true),
            ]
        );
        assert_eq!(args.len(), instance.parameter_types("send").unwrap().len());
    }

    #[test]
    fn test_missing_required_parameter() {
        let instance = ComponentInstance::new(Mailer);
        let err = assemble_arguments(&instance, "send", &named(&[]), &["a@b.c".into()]).unwrap_err();

        assert_eq!(err, MetadataError::mandatory_missing("token", "send"));
    }

    #[test]
    fn test_unknown_parameter() {
        let instance = ComponentInstance::new(Mailer);
        let err = assemble_arguments(
            &instance,
            "send",
            &named(&[("token", "x".into()), ("cc", "y".into())]),
            &["a@b.c".into()],
        )
        .unwrap_err();

        assert!(matches!(err, MetadataError::UnknownParameter { .. }));
    }

    #[test]
    fn test_fractional_value_for_integer_parameter() {
        let instance = ComponentInstance::new(Mailer);
        let err = assemble_arguments(
            &instance,
            "send",
            &named(&[
                ("token", "x".into()),
                ("retries", BigDecimal::from_str("2.5").unwrap().into()),
            ]),
            &["a@b.c".into()],
        )
        .unwrap_err();

        assert!(matches!(err, MetadataError::ParameterFormat { .. }));
    }

    #[test]
    fn test_positional_may_be_supplied_by_name() {
        let instance = ComponentInstance::new(Mailer);
        let args = assemble_arguments(
            &instance,
            "send",
            &named(&[("to", "c@d.e".into()), ("token", "x".into())]),
            &[],
        )
        .unwrap();

        assert_eq!(args[0], TypedArgument::Text("c@d.e".to_string()));
    }

    #[test]
    fn test_unknown_service() {
        let instance = ComponentInstance::new(Mailer);
        let err = assemble_arguments(&instance, "receive", &PlainMap::new(), &[]).unwrap_err();
        assert!(matches!(err, MetadataError::MalformedDescriptor { .. }));
    }

    #[test]
    fn test_integer_out_of_declared_range() {
        let instance = ComponentInstance::new(Counter);

        for n in [-5i64, 256, 1000] {
            let err = assemble_arguments(&instance, "step", &named(&[("n", n.into())]), &[])
                .unwrap_err();
            assert!(matches!(err, MetadataError::ParameterFormat { .. }), "{}", n);
        }

        let err = assemble_arguments(
            &instance,
            "step",
            &named(&[("n", 1i64.into()), ("offset", 40000i64.into())]),
            &[],
        )
        .unwrap_err();
        assert_eq!(err, MetadataError::parameter_format("40000", "i16"));
    }

    #[test]
    fn test_integer_bounds_are_inclusive() {
        let instance = ComponentInstance::new(Counter);
        let args = assemble_arguments(
            &instance,
            "step",
            &named(&[("n", 255i64.into()), ("offset", (-32768i64).into())]),
            &[],
        )
        .unwrap();

        assert_eq!(args, vec![TypedArgument::Integer(255), TypedArgument::Integer(-32768)]);
    }

    #[test]
    fn test_positional_and_named_together_is_rejected() {
        let instance = ComponentInstance::new(Mailer);
        let err = assemble_arguments(
            &instance,
            "send",
            &named(&[("to", "x@y.z".into()), ("token", "t".into())]),
            &["a@b.c".into()],
        )
        .unwrap_err();

        assert!(matches!(err, MetadataError::DuplicateKey { .. }));
        assert_eq!(err.status_code(), 400);
    }
}

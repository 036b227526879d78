//! component-macros 派生宏集成测试

use component_macros::ComponentDeclaration;
use component_metadata::{
    assemble_arguments, extract, BigDecimal, ComponentDeclaration, ComponentInstance,
    MetadataError, MetadataSettings, ParameterAnnotation, ParameterKind, Password, PlainMap,
    PlainValue, ServiceMethod, TypedArgument, ValueType, PASSWORD_MASK,
};

#[allow(dead_code)]
#[derive(ComponentDeclaration)]
#[component(
    name = "Mailer",
    desc = "发送邮件",
    doc = "通过 SMTP 发送邮件",
    services = "Self::services"
)]
pub struct MailerComponent {
    #[resource_param(name = "host", desc = "SMTP 主机")]
    smtp_host: String,
    #[resource_param(desc = "SMTP 端口", default = 25)]
    port: u16,
    #[resource_param(desc = "启用 TLS", default = true)]
    tls: bool,
    #[resource_param(desc = "登录密码", default = "")]
    password: Password,
    transport: Vec<u8>,
}

impl MailerComponent {
    fn services() -> Vec<ServiceMethod> {
        vec![
            ServiceMethod::new("send", "发送一封邮件")
                .param::<String>("to", ParameterAnnotation::new("收件人").positional())
                .param::<String>(
                    "subject",
                    ParameterAnnotation::new("主题").with_default("(no subject)"),
                )
                .param::<BigDecimal>(
                    "priority",
                    ParameterAnnotation::new("优先级").with_default("1.5"),
                )
                .injected("session", "SessionContext"),
            ServiceMethod::new("ping", "检查连接"),
        ]
    }
}

#[derive(ComponentDeclaration)]
#[component(desc = "只有身份的组件")]
pub struct Bare;

#[allow(dead_code)]
#[derive(ComponentDeclaration)]
pub struct Anonymous {
    #[resource_param(desc = "值")]
    value: String,
}

fn mailer() -> MailerComponent {
    MailerComponent {
        smtp_host: "localhost".to_string(),
        port: 25,
        tls: true,
        password: Password(String::new()),
        transport: Vec::new(),
    }
}

#[test]
fn test_derived_identity() {
    let info = MailerComponent::component_info().unwrap();
    assert_eq!(info.name, "Mailer");
    assert_eq!(info.description, "发送邮件");
    assert_eq!(info.documentation, "通过 SMTP 发送邮件");

    let bare = Bare::component_info().unwrap();
    assert_eq!(bare.name, "Bare");
    assert_eq!(bare.documentation, "");

    assert!(Anonymous::component_info().is_none());
}

#[test]
fn test_derived_resource_fields() {
    let fields = MailerComponent::resource_fields();
    assert_eq!(fields.len(), 5);

    assert_eq!(fields[0].field_name, "smtp_host");
    assert_eq!(fields[0].value_type, ValueType::Text);
    let annotation = fields[0].annotation.as_ref().unwrap();
    assert_eq!(annotation.name.as_deref(), Some("host"));
    assert_eq!(annotation.default, None);

    assert_eq!(
        fields[1].value_type,
        ValueType::Integer {
            signed: false,
            bits: 16
        }
    );
    assert_eq!(
        fields[1].annotation.as_ref().unwrap().default.as_deref(),
        Some("25")
    );
    assert_eq!(fields[2].value_type, ValueType::Boolean);
    assert_eq!(fields[3].value_type, ValueType::Secret);

    assert_eq!(fields[4].field_name, "transport");
    assert_eq!(fields[4].value_type, ValueType::Opaque("Vec<u8>"));
    assert!(fields[4].annotation.is_none());

    assert!(Bare::resource_fields().is_empty());
    assert!(Bare::service_methods().is_empty());
}

#[test]
fn test_extract_derived_component() {
    let metadata = extract::<MailerComponent>().unwrap();
    let descriptor = metadata.descriptor();

    assert_eq!(descriptor.name(), "Mailer");

    let host = descriptor.parameters().get("host").unwrap();
    assert!(host.is_required());
    assert_eq!(host.kind(), Some(ParameterKind::String));

    let port = descriptor.parameters().get("port").unwrap();
    assert!(!port.is_required());
    assert_eq!(port.default_plain(), Some(PlainValue::from(25i64)));

    let password = descriptor.parameters().get("password").unwrap();
    assert_eq!(password.kind(), Some(ParameterKind::Password));

    assert!(descriptor.parameters().get("transport").is_none());

    let send = descriptor.service("send").unwrap();
    assert_eq!(send.positional_parameters(), ["to"]);
    assert!(send.parameter("session").is_none());

    assert_eq!(
        metadata.dispatch().parameter_order("send").unwrap(),
        ["to", "subject", "priority"]
    );
    assert_eq!(
        metadata.dispatch().parameter_types("send").unwrap(),
        [ValueType::Text, ValueType::Text, ValueType::Decimal]
    );
    assert_eq!(metadata.dispatch().parameter_order("ping").unwrap().len(), 0);
}

#[test]
fn test_missing_identity_fails_extraction() {
    let err = extract::<Anonymous>().unwrap_err();
    assert!(matches!(err, MetadataError::Configuration { .. }));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_instance_metadata_from_derived_component() {
    let instance = ComponentInstance::new(mailer());
    let settings = MetadataSettings::default();

    let metadata = instance.metadata(&settings).unwrap();
    assert_eq!(
        metadata.get("uri"),
        Some(&PlainValue::from("/code/Mailer"))
    );

    let password_default = metadata
        .get("params")
        .and_then(|p| p.get("password"))
        .and_then(|p| p.get("default"));
    assert_eq!(password_default, Some(&PlainValue::from(PASSWORD_MASK)));

    let services = metadata.get("services").and_then(PlainValue::as_map).unwrap();
    let send = services.get("send").and_then(PlainValue::as_map).unwrap();
    assert_eq!(
        send.get("uri"),
        Some(&PlainValue::from("/code/Mailer/send"))
    );
}

#[test]
fn test_dispatch_derived_service() {
    let instance = ComponentInstance::new(mailer());

    let mut named = PlainMap::new();
    named.insert("subject".to_string(), PlainValue::from("hello"));

    let args = assemble_arguments(
        &instance,
        "send",
        &named,
        &[PlainValue::from("ops@example.com")],
    )
    .unwrap();

    assert_eq!(
        args,
        vec![
            TypedArgument::Text("ops@example.com".to_string()),
            TypedArgument::Text("hello".to_string()),
            TypedArgument::Decimal("1.5".parse().unwrap()),
        ]
    );

    let err = assemble_arguments(&instance, "send", &PlainMap::new(), &[]).unwrap_err();
    assert!(matches!(err, MetadataError::MandatoryParameterMissing { .. }));
}

use component_macros::ComponentDeclaration;
use component_metadata::{extract, ComponentDeclaration, ParameterAnnotation, ServiceMethod};

#[derive(ComponentDeclaration)]
#[component(name = "Echo", desc = "回显", services = "echo_services")]
struct EchoComponent {
    #[resource_param(desc = "前缀", default = ">")]
    prefix: String,
    #[resource_param(name = "repeat", desc = "重复次数", default = 1)]
    times: u32,
}

fn echo_services() -> Vec<ServiceMethod> {
    vec![ServiceMethod::new("echo", "回显文本")
        .param::<String>("text", ParameterAnnotation::new("文本").positional())]
}

fn main() {
    let _ = EchoComponent {
        prefix: String::new(),
        times: 1,
    };
    assert_eq!(EchoComponent::resource_fields().len(), 2);

    let metadata = extract::<EchoComponent>().unwrap();
    assert_eq!(metadata.descriptor().name(), "Echo");
    assert!(metadata.descriptor().service("echo").is_some());
}

use component_macros::ComponentDeclaration;
use component_metadata::ComponentDeclaration;

#[derive(ComponentDeclaration)]
#[component(name = "Noop")]
struct NoopComponent;

fn main() {
    let info = NoopComponent::component_info().unwrap();
    assert_eq!(info.name, "Noop");
    assert!(NoopComponent::service_methods().is_empty());
}

/// Unit tests for ServiceType and BindingKey

use ferrous_ioc::{
    downcast, erase, BindingKey, Constructor, DiError, Injectable, ServiceCast, ServiceType,
};
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

trait Shape: Send + Sync {
    fn sides(&self) -> u32;
}

struct Square;

impl Shape for Square {
    fn sides(&self) -> u32 {
        4
    }
}

impl Injectable for Square {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|_| Ok(Square))]
    }
}

ferrous_ioc::implements!(Square => dyn Shape);

#[test]
fn test_service_type_name() {
    let token = ServiceType::of::<String>();
    assert_eq!(token.name(), "alloc::string::String");
    assert_eq!(token.id(), TypeId::of::<String>());
    assert_eq!(token.to_string(), "alloc::string::String");
}

#[test]
fn test_service_type_trait_object() {
    let token = ServiceType::of::<dyn Shape>();
    assert!(token.name().starts_with("dyn "));
    assert!(token.name().ends_with("Shape"));
    assert_ne!(token, ServiceType::of::<Square>());
}

#[test]
fn test_injectable_token_equals_plain_token() {
    let plain = ServiceType::of::<Square>();
    let injectable = ServiceType::injectable::<Square>();

    assert_eq!(plain, injectable);
    assert!(!plain.is_constructible());
    assert!(injectable.is_constructible());

    let mut set = HashSet::new();
    set.insert(plain);
    assert!(set.contains(&injectable));
}

#[test]
fn test_binding_key_identity() {
    let default = BindingKey::of::<u32>(None);
    let keyed = BindingKey::of::<u32>(Some("port"));
    let other_type = BindingKey::of::<u64>(Some("port"));

    assert_ne!(default, keyed);
    assert_ne!(keyed, other_type);
    assert_eq!(keyed, BindingKey::new(ServiceType::of::<u32>(), Some("port".into())));
    assert_eq!(keyed.default_binding(), default);
    assert_eq!(keyed.service(), &ServiceType::of::<u32>());
    assert_eq!(default.key(), None);
}

#[test]
fn test_binding_key_display() {
    assert_eq!(BindingKey::of::<u32>(None).to_string(), "u32");
    assert_eq!(BindingKey::of::<u32>(Some("port")).to_string(), "u32 [\"port\"]");
    assert_eq!(format!("{:?}", BindingKey::of::<u8>(None)), "BindingKey(u8)");
}

#[test]
fn test_erase_and_downcast() {
    let instance = erase(Arc::new(7u32));
    assert_eq!(*downcast::<u32>(&instance).unwrap(), 7);
    assert!(matches!(downcast::<u64>(&instance), Err(DiError::TypeMismatch("u64"))));
}

#[test]
fn test_trait_object_cast() {
    let concrete = Arc::new(Square);
    let shape: Arc<dyn Shape> = <dyn Shape as ServiceCast<Square>>::cast(concrete.clone());
    assert_eq!(shape.sides(), 4);

    let instance = erase(shape);
    assert!(downcast::<dyn Shape>(&instance).is_ok());
    // The erased payload is the trait object, not the concrete type.
    assert!(downcast::<Square>(&instance).is_err());
}

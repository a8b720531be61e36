/// Configuration binding tests
///
/// `Configuration<T>` values registered directly and, with the `config`
/// feature, read from JSON.
use ferrous_ioc::{Configuration, Constructor, Container, Injectable, Resolver};
use std::sync::Arc;

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
struct MailSettings {
    host: String,
    port: u16,
}

struct Mailer {
    settings: Arc<Configuration<MailSettings>>,
}

impl Injectable for Mailer {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new(|args| Ok(Mailer { settings: args.next()? }))
            .param::<Configuration<MailSettings>>()]
    }
}

fn settings(host: &str) -> MailSettings {
    MailSettings {
        host: host.to_string(),
        port: 25,
    }
}

#[test]
fn test_configuration_is_a_singleton() {
    let ioc = Container::new();
    ioc.configure(settings("mail.local"));

    let first = ioc.resolve::<Configuration<MailSettings>>().unwrap();
    let second = ioc.resolve::<Configuration<MailSettings>>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first.get(), &second.get()));
    assert_eq!(first.value().host, "mail.local");
}

#[test]
fn test_configuration_injected_into_constructor() {
    let ioc = Container::new();
    ioc.configure(settings("smtp.example"));

    let mailer = ioc.resolve_injectable::<Mailer>().unwrap();
    assert_eq!(mailer.settings.value(), &settings("smtp.example"));
}

#[test]
fn test_missing_configuration_is_not_resolvable() {
    let ioc = Container::new();
    assert!(ioc.resolve_injectable::<Mailer>().is_err());
}

#[test]
fn test_keyed_configuration() {
    let ioc = Container::new();
    ioc.configure(settings("default"))
        .configure_keyed("backup", settings("backup"));

    assert_eq!(
        ioc.resolve_keyed::<Configuration<MailSettings>>("backup")
            .unwrap()
            .value()
            .host,
        "backup"
    );
    assert_eq!(
        ioc.resolve::<Configuration<MailSettings>>().unwrap().value().host,
        "default"
    );
}

#[test]
fn test_child_sees_parent_configuration() {
    let parent = Container::new();
    parent.configure(settings("parent"));

    let child = parent.child();
    assert_eq!(child.resolve_injectable::<Mailer>().unwrap().settings.value().host, "parent");

    child.configure(settings("child"));
    assert_eq!(child.resolve_injectable::<Mailer>().unwrap().settings.value().host, "child");
}

#[cfg(feature = "config")]
mod json {
    use super::*;
    use ferrous_ioc::{ContainerOptions, DiError};
    use std::time::Duration;

    #[test]
    fn test_configuration_from_json() {
        let ioc = Container::new();
        ioc.configure_json::<MailSettings>(r#"{ "host": "json.local", "port": 587 }"#)
            .unwrap();

        let mailer = ioc.resolve_injectable::<Mailer>().unwrap();
        assert_eq!(mailer.settings.value().port, 587);
    }

    #[test]
    fn test_invalid_json_names_the_type() {
        let ioc = Container::new();
        match ioc.configure_json::<MailSettings>(r#"{ "host": "x" }"#) {
            Err(DiError::Configuration(message)) => assert!(message.contains("MailSettings")),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
        assert_eq!(ioc.binding_count(), 0);
    }

    #[test]
    fn test_container_built_from_json_options() {
        let options = ContainerOptions::from_json(
            r#"{ "allow_recursive_resolution": true, "singleton_timeout_ms": 20, "max_recursion_depth": 4 }"#,
        )
        .unwrap();
        let ioc = Container::builder().options(options).build();

        assert!(ioc.options().allow_recursive_resolution);
        assert_eq!(ioc.options().singleton_timeout, Duration::from_millis(20));
        assert_eq!(ioc.options().max_recursion_depth, 4);
    }

    #[test]
    fn test_empty_json_keeps_defaults() {
        assert_eq!(ContainerOptions::from_json("{}").unwrap(), ContainerOptions::default());
    }
}

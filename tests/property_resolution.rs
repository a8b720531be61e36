/// Property-based tests for service resolution
///
/// These tests verify that resolution behavior follows expected patterns
/// regardless of the specific keys, values or container shapes used.

use ferrous_ioc::{Container, Resolver};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct ServiceA {
    value: String,
}

// Property: a singleton binding always yields the same instance
proptest! {
    #[test]
    fn singleton_resolution_consistency(service_value in "\\PC{0,50}", resolves in 2usize..10) {
        let ioc = Container::new();
        let value = service_value.clone();
        ioc.bind::<ServiceA>()
            .single_instance()
            .to_factory(move || Arc::new(ServiceA { value: value.clone() }));

        let first = ioc.resolve::<ServiceA>().unwrap();
        for _ in 1..resolves {
            let next = ioc.resolve::<ServiceA>().unwrap();
            prop_assert!(Arc::ptr_eq(&first, &next));
        }
        prop_assert_eq!(&first.value, &service_value);
    }
}

// Property: a transient factory runs exactly once per resolution
proptest! {
    #[test]
    fn transient_factory_invocations(resolves in 0usize..20) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let ioc = Container::new();
        ioc.bind::<usize>().to_factory(move || Arc::new(counter.fetch_add(1, Ordering::SeqCst)));

        for expected in 0..resolves {
            prop_assert_eq!(*ioc.resolve::<usize>().unwrap(), expected);
        }
        prop_assert_eq!(calls.load(Ordering::SeqCst), resolves);
    }
}

// Property: keyed bindings never leak into each other or the default
proptest! {
    #[test]
    fn keyed_bindings_are_independent(
        keys in prop::collection::btree_set("[a-z]{1,8}", 1..8),
        probe in "[A-Z]{1,8}",
    ) {
        let ioc = Container::new();
        let keys: Vec<String> = keys.into_iter().collect();
        for (index, key) in keys.iter().enumerate() {
            ioc.bind::<usize>().keyed(key.as_str()).to_instance(Arc::new(index));
        }

        for (index, key) in keys.iter().enumerate() {
            prop_assert_eq!(*ioc.resolve_keyed::<usize>(key).unwrap(), index);
        }
        // Upper-case probes never collide with the lower-case keys.
        prop_assert!(ioc.resolve_keyed::<usize>(&probe).is_err());
        prop_assert!(ioc.resolve::<usize>().is_err());
        prop_assert_eq!(ioc.binding_count(), keys.len());
    }
}

// Property: resolve_all follows first registration order and last value wins
proptest! {
    #[test]
    fn resolve_all_order(registrations in prop::collection::vec(("[a-d]", any::<u32>()), 0..16)) {
        let ioc = Container::new();
        let mut order: Vec<String> = Vec::new();
        let mut latest: HashMap<String, u32> = HashMap::new();
        for (key, value) in &registrations {
            ioc.bind::<u32>().keyed(key.as_str()).to_instance(Arc::new(*value));
            if !order.contains(key) {
                order.push(key.clone());
            }
            latest.insert(key.clone(), *value);
        }

        let expected: Vec<u32> = order.iter().map(|key| latest[key]).collect();
        let actual: Vec<u32> = ioc.resolve_all::<u32>().unwrap().iter().map(|v| **v).collect();
        prop_assert_eq!(actual, expected);
    }
}

// Property: the nearest container in a chain that binds a service serves it
proptest! {
    #[test]
    fn nearest_ancestor_wins(depth in 1usize..6, bound_levels in prop::collection::btree_set(0usize..6, 0..6)) {
        let bound_levels: BTreeSet<usize> = bound_levels.into_iter().filter(|level| *level < depth).collect();

        let mut chain = vec![Container::new()];
        for _ in 1..depth {
            let child = chain.last().unwrap().child();
            chain.push(child);
        }
        for level in &bound_levels {
            chain[*level].bind::<usize>().to_instance(Arc::new(*level));
        }

        let leaf = chain.last().unwrap();
        match bound_levels.iter().next_back() {
            Some(nearest) => prop_assert_eq!(*leaf.resolve::<usize>().unwrap(), *nearest),
            None => prop_assert!(leaf.resolve::<usize>().is_err()),
        }
    }
}

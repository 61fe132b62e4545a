//! A single registry shared by many threads.

use std::sync::Arc;

use tessera::{Registry, RegistryBuilder, marshal, unmarshal};
use tessera_integration_test::{
    Celsius, CelsiusCodec, Customer, create_test_registry,
};

fn unprepared_registry() -> Registry {
    RegistryBuilder::new()
        .register_typed::<Celsius, _>(CelsiusCodec)
        .build()
        .unwrap()
}

#[test]
fn scoped_threads_share_a_registry() {
    let registry = create_test_registry();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let registry = &registry;
                scope.spawn(move || {
                    for round in 0..50 {
                        let customer = Customer::sample(thread * 100 + round);
                        let bytes = marshal(registry, &customer).unwrap();
                        let decoded: Customer =
                            unmarshal(registry, &bytes).unwrap();
                        assert_eq!(decoded, customer);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    });
}

#[test]
fn lazily_described_structs_are_consistent_across_threads() {
    // nothing registered up front: descriptions are built on first use
    let expected =
        marshal(&create_test_registry(), &Customer::sample(5)).unwrap();

    let fresh = Arc::new(unprepared_registry());
    let outputs: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let fresh = Arc::clone(&fresh);
                scope.spawn(move || marshal(&fresh, &Customer::sample(5)).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for output in outputs {
        assert_eq!(output, expected);
    }
}

//! Codec resolution across the two registry tiers.

use tessera::{
    Registry, RegistryBuilder, marshal, unmarshal,
    document::{Bson, Document},
};
use tessera_integration_test::{
    CardDetails, Payment, REDACTED, RedactedCodec, create_test_registry,
};

fn payment() -> Payment {
    Payment {
        amount: 1250,
        card: CardDetails { number: "4111111111111111".to_owned(), cvv: 123 },
    }
}

#[test]
fn capability_codec_applies_to_declaring_types() {
    let registry = create_test_registry();
    let bytes = marshal(&registry, &payment()).unwrap();
    let document = Document::from_slice(&bytes).unwrap();

    assert_eq!(document.get("card"), Some(&Bson::from("<redacted>")));
    assert_eq!(document.get("amount"), Some(&Bson::Int64(1250)));
}

#[test]
fn redacted_values_decode_to_defaults() {
    let registry = create_test_registry();
    let bytes = marshal(&registry, &payment()).unwrap();

    let decoded: Payment = unmarshal(&registry, &bytes).unwrap();
    assert_eq!(decoded.amount, 1250);
    assert_eq!(decoded.card, CardDetails::default());
}

#[test]
fn without_the_capability_codec_structs_are_encoded_normally() {
    let bytes = marshal(&Registry::default(), &payment()).unwrap();
    let document = Document::from_slice(&bytes).unwrap();

    let card = document.get("card").and_then(Bson::as_document).unwrap();
    assert_eq!(card.get("cvv"), Some(&Bson::Int32(123)));
}

#[test]
fn capability_codec_beats_an_exact_type_codec() {
    let registry = RegistryBuilder::new()
        .register_type::<CardDetails>(tessera::StructCodec::new())
        .register_interface(REDACTED, RedactedCodec)
        .build()
        .unwrap();

    let bytes = marshal(&registry, &payment()).unwrap();
    let document = Document::from_slice(&bytes).unwrap();
    assert_eq!(document.get("card"), Some(&Bson::from("<redacted>")));
}

#[test]
fn registries_are_independent() {
    let redacting = create_test_registry();
    let plain = Registry::default();

    let redacted = marshal(&redacting, &payment()).unwrap();
    let full = marshal(&plain, &payment()).unwrap();

    assert_ne!(redacted, full);
    assert_eq!(marshal(&plain, &payment()).unwrap(), full);
}

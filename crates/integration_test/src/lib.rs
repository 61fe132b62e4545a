//! Shared fixtures for the tessera integration tests.
//!
//! The types here exercise every layer together: derived structs with
//! tags, a hand-written leaf codec, a value-marshaling type and a capability
//! codec.

#![allow(missing_docs)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

use std::collections::{BTreeMap, HashMap};

use tessera::{
    CapabilityKey, Codec, DecodeContext, EncodeContext, Error, MarshalValue,
    Reflect, Registry, RegistryBuilder, Result, TypeInfo, TypedCodec,
    UnmarshalValue, ValueMut, ValueRef,
    document::{Bson, DocumentWriter, ElementType, Value, ValueReader},
    reflect::Shape,
};

// ============================================================================
// Derived Structs
// ============================================================================

/// A postal address, nested inside [`Customer`].
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[tag(doc = "zip,omitempty")]
    pub zip: Option<String>,
}

/// A customer record touching most of the default codecs.
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Customer {
    #[tag(doc = "_id")]
    pub id: u32,
    pub name: String,
    #[tag(doc = "email,omitempty")]
    pub email: String,
    #[tag(doc = "balance,minsize")]
    pub balance: i64,
    pub active: bool,
    pub address: Address,
    pub previous: Vec<Address>,
    pub tags: Vec<String>,
    pub scores: BTreeMap<String, f64>,
    pub home: Option<Celsius>,
    #[tag(doc = ",inline")]
    pub extra: HashMap<String, Bson>,
    pub legacy: LegacyId,
    notes: String,
}

impl Customer {
    /// A fully populated customer.
    pub fn sample(id: u32) -> Self {
        let address = Address {
            street: format!("{id} Main St"),
            city: "Springfield".to_owned(),
            zip: Some("49007".to_owned()),
        };
        Self {
            id,
            name: format!("customer {id}"),
            email: format!("c{id}@example.com"),
            balance: i64::from(id) * 100,
            active: id % 2 == 0,
            address: address.clone(),
            previous: vec![Address { zip: None, ..address }],
            tags: vec!["gold".to_owned(), "early".to_owned()],
            scores: BTreeMap::from([
                ("q1".to_owned(), 1.5),
                ("q2".to_owned(), 2.0),
            ]),
            home: Some(Celsius(21.5)),
            extra: HashMap::from([("region".to_owned(), Bson::from("north"))]),
            legacy: LegacyId { raw: id },
            notes: String::new(),
        }
    }

    /// Sets the private notes, which never leave the process.
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_owned();
        self
    }

    pub fn notes(&self) -> &str { &self.notes }
}

// ============================================================================
// Hand-written Leaf Codec
// ============================================================================

/// A temperature stored as a string such as `"21.5C"`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Celsius(pub f64);

impl Reflect for Celsius {
    fn type_info() -> TypeInfo { TypeInfo::new::<Self>(Shape::Leaf) }
}

/// Encodes [`Celsius`] as a suffixed string. Plain doubles are accepted on
/// decode.
pub struct CelsiusCodec;

impl TypedCodec<Celsius> for CelsiusCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &Celsius,
    ) -> Result<()> {
        writer.write_value(Value::String(&format!("{}C", value.0)))?;
        Ok(())
    }

    fn decode(
        &self,
        _ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut Celsius,
    ) -> Result<()> {
        if reader.element_type() == ElementType::Double {
            value.0 = reader.read_f64()?;
            return Ok(());
        }
        let text = reader.read_str()?;
        value.0 = text
            .strip_suffix('C')
            .and_then(|number| number.parse().ok())
            .ok_or_else(|| {
                Error::custom(format_args!("{text:?} is not a temperature"))
            })?;
        Ok(())
    }
}

// ============================================================================
// Value Marshaler
// ============================================================================

/// An identifier stored in an older `"L-<n>"` string format.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(marshal_value)]
pub struct LegacyId {
    pub raw: u32,
}

impl MarshalValue for LegacyId {
    fn marshal_value(&self) -> Result<Bson> {
        Ok(Bson::String(format!("L-{}", self.raw)))
    }
}

impl UnmarshalValue for LegacyId {
    fn unmarshal_value(&mut self, value: Bson) -> Result<()> {
        let raw = value
            .as_str()
            .and_then(|text| text.strip_prefix("L-"))
            .and_then(|number| number.parse().ok())
            .ok_or_else(|| {
                Error::custom(format_args!("{value:?} is not a legacy id"))
            })?;
        self.raw = raw;
        Ok(())
    }
}

// ============================================================================
// Capability Codec
// ============================================================================

/// Capability declared by types whose contents must never be written.
pub const REDACTED: CapabilityKey = CapabilityKey::declared("redacted");

/// Writes the string `"<redacted>"` for any value and leaves values
/// untouched on decode.
pub struct RedactedCodec;

impl Codec for RedactedCodec {
    fn encode_value(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        _value: ValueRef<'_>,
    ) -> Result<()> {
        writer.write_value(Value::String("<redacted>"))?;
        Ok(())
    }

    fn decode_value(
        &self,
        _ctx: &DecodeContext<'_>,
        _reader: ValueReader<'_>,
        _value: ValueMut<'_>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Card details, redacted wherever they appear.
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
#[reflect(capability = "redacted")]
pub struct CardDetails {
    pub number: String,
    pub cvv: u16,
}

/// A payment holding redacted card details.
#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Payment {
    pub amount: i64,
    pub card: CardDetails,
}

// ============================================================================
// Registry
// ============================================================================

/// The default registry plus [`CelsiusCodec`] and [`RedactedCodec`], with
/// the fixture structs validated up front.
pub fn create_test_registry() -> Registry {
    RegistryBuilder::new()
        .register_typed::<Celsius, _>(CelsiusCodec)
        .register_interface(REDACTED, RedactedCodec)
        .register_struct::<Customer>()
        .register_struct::<Payment>()
        .build()
        .expect("fixture registry is valid")
}

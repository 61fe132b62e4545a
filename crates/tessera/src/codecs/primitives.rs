//! Codecs for booleans, strings and byte vectors.

use tessera_document::{
    BINARY_GENERIC, BINARY_OLD, DocumentWriter, Value, ValueReader,
};

use super::mismatch;
use crate::{
    codec::{DecodeContext, EncodeContext, TypedCodec},
    error::Result,
};

/// Encodes `bool` as a boolean element. Decoding also accepts numbers,
/// where anything non-zero is `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCodec;

impl TypedCodec<bool> for BoolCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &bool,
    ) -> Result<()> {
        writer.write_value(Value::Boolean(*value))?;
        Ok(())
    }

    fn decode(
        &self,
        _ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut bool,
    ) -> Result<()> {
        *value = match reader.read()? {
            Value::Boolean(b) => b,
            Value::Int32(v) => v != 0,
            Value::Int64(v) => v != 0,
            Value::Double(f) => f != 0.0,
            Value::Null | Value::Undefined => false,
            other => return Err(mismatch(other.element_type(), "bool")),
        };
        Ok(())
    }
}

/// Encodes `String` as a string element. Decoding also accepts symbols and
/// JavaScript code.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl TypedCodec<String> for StringCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &String,
    ) -> Result<()> {
        writer.write_value(Value::String(value))?;
        Ok(())
    }

    fn decode(
        &self,
        _ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut String,
    ) -> Result<()> {
        value.clear();
        match reader.read()? {
            Value::String(s) | Value::Symbol(s) | Value::JavaScriptCode(s) => {
                value.push_str(s);
            }
            Value::Null | Value::Undefined => {}
            other => return Err(mismatch(other.element_type(), "String")),
        }
        Ok(())
    }
}

/// Encodes `Vec<u8>` as generic binary rather than an array of integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl TypedCodec<Vec<u8>> for BytesCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &Vec<u8>,
    ) -> Result<()> {
        writer.write_value(Value::Binary {
            subtype: BINARY_GENERIC,
            bytes: value,
        })?;
        Ok(())
    }

    fn decode(
        &self,
        _ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut Vec<u8>,
    ) -> Result<()> {
        value.clear();
        match reader.read()? {
            Value::Binary { subtype: BINARY_GENERIC | BINARY_OLD, bytes } => {
                value.extend_from_slice(bytes);
            }
            Value::Null | Value::Undefined => {}
            other => return Err(mismatch(other.element_type(), "Vec<u8>")),
        }
        Ok(())
    }
}

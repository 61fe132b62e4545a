//! Integer and floating-point codecs.
//!
//! Integers narrower than 32 bits are always written as int32. Signed 64-bit
//! and pointer-sized integers are written as int64, or as int32 when
//! `minsize` is in effect and the value fits. Unsigned 32-bit and wider
//! integers follow the same rule, and fail with [`Error::OutOfRange`] above
//! `i64::MAX`.
//!
//! Decoding accepts any numeric element, booleans and null, and checks the
//! result against the target's range. A double with a fractional part only
//! decodes into an integer under `truncate`; likewise a double that does not
//! survive narrowing to `f32`.

use tessera_document::{DocumentWriter, Value, ValueReader};

use super::mismatch;
use crate::{
    codec::{DecodeContext, EncodeContext, TypedCodec},
    error::{Error, Result},
};

/// Codec for every primitive integer type.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerCodec;

/// Codec for `f32` and `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCodec;

fn write_i64(
    writer: &mut DocumentWriter,
    value: i64,
    min_size: bool,
) -> Result<()> {
    match i32::try_from(value) {
        Ok(small) if min_size => writer.write_value(Value::Int32(small))?,
        _ => writer.write_value(Value::Int64(value))?,
    }
    Ok(())
}

fn write_u64(
    writer: &mut DocumentWriter,
    value: u64,
    min_size: bool,
    target: &'static str,
) -> Result<()> {
    let value = i64::try_from(value)
        .map_err(|_| Error::OutOfRange { value: value.to_string(), target })?;
    write_i64(writer, value, min_size)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn read_integer(
    ctx: &DecodeContext<'_>,
    reader: ValueReader<'_>,
    target: &'static str,
) -> Result<i128> {
    Ok(match reader.read()? {
        Value::Int32(v) => i128::from(v),
        Value::Int64(v) => i128::from(v),
        Value::Double(f) => {
            if !f.is_finite() || f < i64::MIN as f64 || f > i64::MAX as f64 {
                return Err(Error::OutOfRange { value: f.to_string(), target });
            }
            if f.fract() != 0.0 && !ctx.truncate() {
                return Err(Error::PrecisionLoss { value: f.to_string(), target });
            }
            f.trunc() as i128
        }
        Value::Boolean(b) => i128::from(b),
        Value::Null | Value::Undefined => 0,
        other => return Err(mismatch(other.element_type(), target)),
    })
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn read_double(
    ctx: &DecodeContext<'_>,
    reader: ValueReader<'_>,
    target: &'static str,
) -> Result<f64> {
    Ok(match reader.read()? {
        Value::Double(f) => f,
        Value::Int32(v) => f64::from(v),
        Value::Int64(v) => {
            let f = v as f64;
            if !ctx.truncate() && f as i128 != i128::from(v) {
                return Err(Error::PrecisionLoss { value: v.to_string(), target });
            }
            f
        }
        Value::Boolean(b) => f64::from(u8::from(b)),
        Value::Null | Value::Undefined => 0.0,
        other => return Err(mismatch(other.element_type(), target)),
    })
}

macro_rules! impl_narrow_integer {
    ($($ty:ty),*) => {
        $(
            impl TypedCodec<$ty> for IntegerCodec {
                fn encode(
                    &self,
                    _ctx: &EncodeContext<'_>,
                    writer: &mut DocumentWriter,
                    value: &$ty,
                ) -> Result<()> {
                    writer.write_value(Value::Int32(i32::from(*value)))?;
                    Ok(())
                }

                fn decode(
                    &self,
                    ctx: &DecodeContext<'_>,
                    reader: ValueReader<'_>,
                    value: &mut $ty,
                ) -> Result<()> {
                    *value = narrow(read_integer(ctx, reader, stringify!($ty))?, stringify!($ty))?;
                    Ok(())
                }
            }
        )*
    };
}

macro_rules! impl_wide_integer {
    ($($ty:ty => $write:ident as $via:ty),*) => {
        $(
            impl TypedCodec<$ty> for IntegerCodec {
                #[allow(clippy::cast_lossless, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
                fn encode(
                    &self,
                    ctx: &EncodeContext<'_>,
                    writer: &mut DocumentWriter,
                    value: &$ty,
                ) -> Result<()> {
                    impl_wide_integer!(@write $write, writer, *value as $via, ctx.min_size(), stringify!($ty))
                }

                fn decode(
                    &self,
                    ctx: &DecodeContext<'_>,
                    reader: ValueReader<'_>,
                    value: &mut $ty,
                ) -> Result<()> {
                    *value = narrow(read_integer(ctx, reader, stringify!($ty))?, stringify!($ty))?;
                    Ok(())
                }
            }
        )*
    };
    (@write write_i64, $writer:expr, $value:expr, $min_size:expr, $target:expr) => {
        write_i64($writer, $value, $min_size)
    };
    (@write write_u64, $writer:expr, $value:expr, $min_size:expr, $target:expr) => {
        write_u64($writer, $value, $min_size, $target)
    };
}

fn narrow<T: TryFrom<i128>>(value: i128, target: &'static str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| Error::OutOfRange { value: value.to_string(), target })
}

impl_narrow_integer!(i8, i16, i32, u8, u16);
impl_wide_integer!(
    i64 => write_i64 as i64,
    isize => write_i64 as i64,
    u32 => write_u64 as u64,
    u64 => write_u64 as u64,
    usize => write_u64 as u64
);

impl TypedCodec<f64> for FloatCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &f64,
    ) -> Result<()> {
        writer.write_value(Value::Double(*value))?;
        Ok(())
    }

    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut f64,
    ) -> Result<()> {
        *value = read_double(ctx, reader, "f64")?;
        Ok(())
    }
}

impl TypedCodec<f32> for FloatCodec {
    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        writer: &mut DocumentWriter,
        value: &f32,
    ) -> Result<()> {
        writer.write_value(Value::Double(f64::from(*value)))?;
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn decode(
        &self,
        ctx: &DecodeContext<'_>,
        reader: ValueReader<'_>,
        value: &mut f32,
    ) -> Result<()> {
        let wide = read_double(ctx, reader, "f32")?;
        let narrowed = wide as f32;
        if !ctx.truncate() && !wide.is_nan() && f64::from(narrowed) != wide {
            return Err(Error::PrecisionLoss {
                value: wide.to_string(),
                target: "f32",
            });
        }
        *value = narrowed;
        Ok(())
    }
}

//! Integer codecs, four signed and four unsigned widths.
//!
//! Everything up to `i64` travels through the driver's integer slot.
//! `u64` values above `i64::MAX` have no integer slot to fit in and travel
//! as text, the same move drivers make for NUMERIC.

use super::{render_null, type_mismatch, with_cast, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::Dialect;
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::SqlValue;

macro_rules! int_codec {
    ($name:ident, $ty:ident, $rust:ty, $variant:ident) => {
        pub struct $name;

        impl $name {
            fn unwrap(value: &SqlValue) -> BindResult<$rust> {
                match value {
                    SqlValue::$variant(v) => Ok(*v),
                    other => Err(type_mismatch(stringify!($ty), other)),
                }
            }
        }

        impl Codec for $name {
            fn data_type(&self) -> DataType {
                DataType::$ty
            }

            fn render_inline(
                &self,
                ctx: &mut RenderContext<'_>,
                value: &SqlValue,
            ) -> BindResult<()> {
                if value.is_null() {
                    return render_null(ctx, &DataType::$ty);
                }
                let v = Self::unwrap(value)?;
                with_cast(ctx, &DataType::$ty, |ctx| {
                    ctx.push(&v.to_string());
                    Ok(())
                })
            }

            fn set_parameter(
                &self,
                ctx: &mut BindContext<'_>,
                value: &SqlValue,
            ) -> BindResult<()> {
                if value.is_null() {
                    let code = self.type_code(ctx.dialect);
                    return ctx.stmt.set_null(ctx.index, code);
                }
                ctx.stmt.set_i64(ctx.index, Self::unwrap(value)? as i64)
            }

            fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
                let v = ctx.row.get_i64(ctx.index)?;
                if ctx.row.was_null() {
                    return Ok(SqlValue::Null(DataType::$ty));
                }
                let narrowed = <$rust>::try_from(v).map_err(|_| {
                    BindError::malformed(stringify!($ty), v.to_string())
                })?;
                Ok(SqlValue::$variant(narrowed))
            }

            fn write_field(
                &self,
                w: &mut dyn RecordWriter,
                dialect: Dialect,
                value: &SqlValue,
            ) -> BindResult<()> {
                if value.is_null() {
                    return w.write_null(self.type_code(dialect));
                }
                w.write_i64(Self::unwrap(value)? as i64)
            }

            fn read_field(
                &self,
                r: &mut dyn RecordReader,
                _dialect: Dialect,
            ) -> BindResult<SqlValue> {
                let v = r.read_i64()?;
                if r.was_null() {
                    return Ok(SqlValue::Null(DataType::$ty));
                }
                let narrowed = <$rust>::try_from(v).map_err(|_| {
                    BindError::malformed(stringify!($ty), v.to_string())
                })?;
                Ok(SqlValue::$variant(narrowed))
            }
        }
    };
}

int_codec!(TinyIntCodec, TinyInt, i8, TinyInt);
int_codec!(SmallIntCodec, SmallInt, i16, SmallInt);
int_codec!(IntegerCodec, Integer, i32, Int);
int_codec!(BigIntCodec, BigInt, i64, BigInt);
int_codec!(UTinyIntCodec, UTinyInt, u8, UTinyInt);
int_codec!(USmallIntCodec, USmallInt, u16, USmallInt);
int_codec!(UIntegerCodec, UInteger, u32, UInt);

/// `u64` cannot round-trip through the signed integer slot, so values above
/// `i64::MAX` bind as text and reads always go through the text slot.
pub struct UBigIntCodec;

impl UBigIntCodec {
    fn unwrap(value: &SqlValue) -> BindResult<u64> {
        match value {
            SqlValue::UBigInt(v) => Ok(*v),
            other => Err(type_mismatch("UBigInt", other)),
        }
    }
}

impl Codec for UBigIntCodec {
    fn data_type(&self) -> DataType {
        DataType::UBigInt
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            return render_null(ctx, &DataType::UBigInt);
        }
        let v = Self::unwrap(value)?;
        with_cast(ctx, &DataType::UBigInt, |ctx| {
            ctx.push(&v.to_string());
            Ok(())
        })
    }

    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            let code = self.type_code(ctx.dialect);
            return ctx.stmt.set_null(ctx.index, code);
        }
        let v = Self::unwrap(value)?;
        match i64::try_from(v) {
            Ok(fits) => ctx.stmt.set_i64(ctx.index, fits),
            Err(_) => ctx.stmt.set_str(ctx.index, &v.to_string()),
        }
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        // Text read coerces integer slots, covering both bind shapes.
        let Some(s) = ctx.row.get_str(ctx.index)? else {
            return Ok(SqlValue::Null(DataType::UBigInt));
        };
        let v: u64 = s
            .parse()
            .map_err(|_| BindError::malformed("UBigInt", s))?;
        Ok(SqlValue::UBigInt(v))
    }

    fn write_field(
        &self,
        w: &mut dyn RecordWriter,
        dialect: Dialect,
        value: &SqlValue,
    ) -> BindResult<()> {
        if value.is_null() {
            return w.write_null(self.type_code(dialect));
        }
        let v = Self::unwrap(value)?;
        match i64::try_from(v) {
            Ok(fits) => w.write_i64(fits),
            Err(_) => w.write_str(&v.to_string()),
        }
    }

    fn read_field(&self, r: &mut dyn RecordReader, _dialect: Dialect) -> BindResult<SqlValue> {
        let Some(s) = r.read_str()? else {
            return Ok(SqlValue::Null(DataType::UBigInt));
        };
        let v: u64 = s
            .parse()
            .map_err(|_| BindError::malformed("UBigInt", s))?;
        Ok(SqlValue::UBigInt(v))
    }
}

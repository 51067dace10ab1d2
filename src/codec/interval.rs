//! Interval codecs.
//!
//! Dialects without a native interval type carry the textual form as
//! varchar; the text round-trips through `FromStr` on the way back.

use super::{render_null, type_mismatch, with_cast, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::Dialect;
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::interval::{DayToSecond, YearToMonth};
use crate::value::SqlValue;

macro_rules! interval_codec {
    ($name:ident, $ty:ident, $variant:ident, $rust:ty, $label:expr) => {
        pub struct $name;

        impl $name {
            fn unwrap(value: &SqlValue) -> BindResult<&$rust> {
                match value {
                    SqlValue::$variant(v) => Ok(v),
                    other => Err(type_mismatch($label, other)),
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
                let text = Self::unwrap(value)?.to_string();
                // Auto mode casts on native-interval dialects: a bare
                // quoted interval is indistinguishable from varchar.
                with_cast(ctx, &DataType::$ty, |ctx| {
                    ctx.push("'");
                    ctx.push(&text);
                    ctx.push("'");
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
                ctx.stmt
                    .set_str(ctx.index, &Self::unwrap(value)?.to_string())
            }

            fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
                let Some(s) = ctx.row.get_str(ctx.index)? else {
                    return Ok(SqlValue::Null(DataType::$ty));
                };
                let v: $rust = s
                    .parse()
                    .map_err(|_| BindError::malformed($label, s))?;
                Ok(SqlValue::$variant(v))
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
                w.write_str(&Self::unwrap(value)?.to_string())
            }

            fn read_field(
                &self,
                r: &mut dyn RecordReader,
                _dialect: Dialect,
            ) -> BindResult<SqlValue> {
                let Some(s) = r.read_str()? else {
                    return Ok(SqlValue::Null(DataType::$ty));
                };
                let v: $rust = s
                    .parse()
                    .map_err(|_| BindError::malformed($label, s))?;
                Ok(SqlValue::$variant(v))
            }
        }
    };
}

interval_codec!(
    DayToSecondCodec,
    IntervalDayToSecond,
    IntervalDs,
    DayToSecond,
    "interval day to second"
);
interval_codec!(
    YearToMonthCodec,
    IntervalYearToMonth,
    IntervalYm,
    YearToMonth,
    "interval year to month"
);

//! Exact decimal codec.
//!
//! Casting a decimal needs an explicit precision and scale on the target
//! type or the dialect truncates digits. Scale comes straight from the
//! value; precision comes from the value's significant digits unless
//! `scale >= precision`, in which case it is forced to `scale + 1` so
//! values below 1.0 keep every digit after the point.

use rust_decimal::Decimal;

use super::{render_null, should_cast, type_mismatch, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::{Dialect, Feature};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::SqlValue;

pub struct DecimalCodec;

/// Derived `(precision, scale)` for a cast target.
pub fn cast_precision_scale(d: &Decimal) -> (u32, u32) {
    let scale = d.scale();
    let digits = d.mantissa().unsigned_abs().to_string().len() as u32;
    let precision = if scale >= digits { scale + 1 } else { digits };
    (precision, scale)
}

impl DecimalCodec {
    fn unwrap(value: &SqlValue) -> BindResult<Decimal> {
        match value {
            SqlValue::Decimal(d) => Ok(*d),
            other => Err(type_mismatch("decimal", other)),
        }
    }
}

impl Codec for DecimalCodec {
    fn data_type(&self) -> DataType {
        DataType::Decimal
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            return render_null(ctx, &DataType::Decimal);
        }
        let d = Self::unwrap(value)?;
        if !should_cast(ctx, &DataType::Decimal) {
            ctx.push(&d.to_string());
            return Ok(());
        }
        let (precision, scale) = cast_precision_scale(&d);
        let name = format!("numeric({}, {})", precision, scale);
        if ctx.dialect == Dialect::Postgres {
            ctx.push(&d.to_string());
            ctx.push("::");
            ctx.push(&name);
        } else {
            ctx.push("cast(");
            ctx.push(&d.to_string());
            ctx.push(" as ");
            ctx.push(&name);
            ctx.push(")");
        }
        Ok(())
    }

    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            let code = self.type_code(ctx.dialect);
            return ctx.stmt.set_null(ctx.index, code);
        }
        let d = Self::unwrap(value)?;
        if ctx.dialect.supports(Feature::DecimalAsText) {
            ctx.stmt.set_str(ctx.index, &d.to_string())
        } else {
            ctx.stmt.set_decimal(ctx.index, d)
        }
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        if ctx.dialect.supports(Feature::DecimalAsText) {
            let Some(s) = ctx.row.get_str(ctx.index)? else {
                return Ok(SqlValue::Null(DataType::Decimal));
            };
            let d: Decimal = s
                .parse()
                .map_err(|_| BindError::malformed("decimal", s))?;
            return Ok(SqlValue::Decimal(d));
        }
        match ctx.row.get_decimal(ctx.index)? {
            Some(d) => Ok(SqlValue::Decimal(d)),
            None => Ok(SqlValue::Null(DataType::Decimal)),
        }
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
        w.write_decimal(Self::unwrap(value)?)
    }

    fn read_field(&self, r: &mut dyn RecordReader, _dialect: Dialect) -> BindResult<SqlValue> {
        match r.read_decimal()? {
            Some(d) => Ok(SqlValue::Decimal(d)),
            None => Ok(SqlValue::Null(DataType::Decimal)),
        }
    }
}

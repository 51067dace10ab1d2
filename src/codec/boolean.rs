//! Boolean codec.
//!
//! Dialects without a boolean wire type take booleans through the integer
//! slot and render `1`/`0`.

use super::{render_null, type_mismatch, with_cast, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::{Dialect, Feature};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::BindResult;
use crate::value::SqlValue;

pub struct BooleanCodec;

impl BooleanCodec {
    fn unwrap(value: &SqlValue) -> BindResult<bool> {
        match value {
            SqlValue::Boolean(b) => Ok(*b),
            other => Err(type_mismatch("boolean", other)),
        }
    }
}

impl Codec for BooleanCodec {
    fn data_type(&self) -> DataType {
        DataType::Boolean
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            return render_null(ctx, &DataType::Boolean);
        }
        let b = Self::unwrap(value)?;
        with_cast(ctx, &DataType::Boolean, |ctx| {
            let literal = if ctx.dialect.supports(Feature::BooleanAsInteger) {
                if b { "1" } else { "0" }
            } else if b {
                "true"
            } else {
                "false"
            };
            ctx.push(literal);
            Ok(())
        })
    }

    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            let code = self.type_code(ctx.dialect);
            return ctx.stmt.set_null(ctx.index, code);
        }
        let b = Self::unwrap(value)?;
        if ctx.dialect.supports(Feature::BooleanAsInteger) {
            ctx.stmt.set_i64(ctx.index, b as i64)
        } else {
            ctx.stmt.set_bool(ctx.index, b)
        }
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        // Primitive read: a NULL comes back as false, so the was-null
        // check is what separates NULL from a stored false.
        let b = if ctx.dialect.supports(Feature::BooleanAsInteger) {
            ctx.row.get_i64(ctx.index)? != 0
        } else {
            ctx.row.get_bool(ctx.index)?
        };
        if ctx.row.was_null() {
            return Ok(SqlValue::Null(DataType::Boolean));
        }
        Ok(SqlValue::Boolean(b))
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
        w.write_bool(Self::unwrap(value)?)
    }

    fn read_field(&self, r: &mut dyn RecordReader, _dialect: Dialect) -> BindResult<SqlValue> {
        let b = r.read_bool()?;
        if r.was_null() {
            return Ok(SqlValue::Null(DataType::Boolean));
        }
        Ok(SqlValue::Boolean(b))
    }
}

//! Enum literal codec.
//!
//! On dialects with typed enums the literal needs a schema-qualified cast,
//! both inline and after a bound placeholder; elsewhere the literal is a
//! plain string.

use super::{render_null, type_mismatch, with_cast, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::{DataType, EnumType};
use crate::dialect::{Dialect, Feature};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::BindResult;
use crate::value::{EnumValue, SqlValue};

pub struct EnumCodec {
    ty: EnumType,
}

impl EnumCodec {
    pub fn new(ty: EnumType) -> Self {
        Self { ty }
    }

    fn unwrap<'v>(&self, value: &'v SqlValue) -> BindResult<&'v str> {
        match value {
            SqlValue::Enum(e) => Ok(e.literal.as_str()),
            other => Err(type_mismatch("enum", other)),
        }
    }
}

impl Codec for EnumCodec {
    fn data_type(&self) -> DataType {
        DataType::Enum(self.ty.clone())
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        let ty = self.data_type();
        if value.is_null() {
            return render_null(ctx, &ty);
        }
        let literal = self.unwrap(value)?;
        with_cast(ctx, &ty, |ctx| {
            let escaped = ctx.dialect.escape_string(literal);
            ctx.push("'");
            ctx.push(&escaped);
            ctx.push("'");
            Ok(())
        })
    }

    fn render_placeholder(&self, ctx: &mut RenderContext<'_>) -> BindResult<()> {
        let marker = ctx.dialect.placeholder(ctx.param_index);
        ctx.push(&marker);
        // The bound parameter arrives as text; typed-enum dialects cannot
        // infer the enum type from that.
        if ctx.dialect.supports(Feature::EnumCast) {
            ctx.push("::");
            ctx.push(&self.ty.qualified());
        }
        Ok(())
    }

    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            let code = self.type_code(ctx.dialect);
            return ctx.stmt.set_null(ctx.index, code);
        }
        ctx.stmt.set_str(ctx.index, self.unwrap(value)?)
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        match ctx.row.get_str(ctx.index)? {
            Some(s) => Ok(SqlValue::Enum(EnumValue::new(self.ty.clone(), s))),
            None => Ok(SqlValue::Null(self.data_type())),
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
        w.write_str(self.unwrap(value)?)
    }

    fn read_field(&self, r: &mut dyn RecordReader, _dialect: Dialect) -> BindResult<SqlValue> {
        match r.read_str()? {
            Some(s) => Ok(SqlValue::Enum(EnumValue::new(self.ty.clone(), s))),
            None => Ok(SqlValue::Null(self.data_type())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CastMode;

    fn mood() -> EnumType {
        EnumType::with_schema("public", "mood")
    }

    #[test]
    fn test_inline_cast() {
        let codec = EnumCodec::new(mood());
        let v = SqlValue::Enum(EnumValue::new(mood(), "happy"));

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
        codec.render_inline(&mut ctx, &v).unwrap();
        assert_eq!(sql, "'happy'::public.mood");

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::MySql, CastMode::Auto, &mut sql);
        codec.render_inline(&mut ctx, &v).unwrap();
        assert_eq!(sql, "'happy'");
    }

    #[test]
    fn test_placeholder_cast_suffix() {
        let codec = EnumCodec::new(mood());

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
        codec.render_placeholder(&mut ctx).unwrap();
        assert_eq!(sql, "$1::public.mood");

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Sqlite, CastMode::Auto, &mut sql);
        codec.render_placeholder(&mut ctx).unwrap();
        assert_eq!(sql, "?");
    }
}

//! JSON, JSONB and XML document codecs.

use super::{render_null, should_cast, type_mismatch, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::{Dialect, Feature};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::SqlValue;

/// Quoted document literal, cast per dialect syntax where the cast
/// decision applies.
fn render_document(ctx: &mut RenderContext<'_>, ty: &DataType, body: &str) -> BindResult<()> {
    let escaped = ctx.dialect.escape_string(body);
    if !should_cast(ctx, ty) {
        ctx.push("'");
        ctx.push(&escaped);
        ctx.push("'");
        return Ok(());
    }
    let name = ty.cast_name(ctx.dialect);
    if ctx.dialect.supports(Feature::JsonCastFunction) {
        ctx.push("CAST('");
        ctx.push(&escaped);
        ctx.push("' AS ");
        ctx.push(&name.to_uppercase());
        ctx.push(")");
    } else if ctx.dialect == Dialect::Postgres {
        ctx.push("'");
        ctx.push(&escaped);
        ctx.push("'::");
        ctx.push(&name);
    } else {
        ctx.push("cast('");
        ctx.push(&escaped);
        ctx.push("' as ");
        ctx.push(&name);
        ctx.push(")");
    }
    Ok(())
}

macro_rules! json_codec {
    ($name:ident, $ty:ident, $variant:ident) => {
        pub struct $name;

        impl $name {
            fn unwrap(value: &SqlValue) -> BindResult<&serde_json::Value> {
                match value {
                    SqlValue::$variant(v) => Ok(v),
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
                let body = Self::unwrap(value)?.to_string();
                render_document(ctx, &DataType::$ty, &body)
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
                let v = serde_json::from_str(&s)
                    .map_err(|_| BindError::malformed(stringify!($ty), s))?;
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
                let v = serde_json::from_str(&s)
                    .map_err(|_| BindError::malformed(stringify!($ty), s))?;
                Ok(SqlValue::$variant(v))
            }
        }
    };
}

json_codec!(JsonCodec, Json, Json);
json_codec!(JsonbCodec, Jsonb, Jsonb);

/// XML travels as its raw document text.
pub struct XmlCodec;

impl XmlCodec {
    fn unwrap(value: &SqlValue) -> BindResult<&str> {
        match value {
            SqlValue::Xml(s) => Ok(s.as_str()),
            other => Err(type_mismatch("xml", other)),
        }
    }
}

impl Codec for XmlCodec {
    fn data_type(&self) -> DataType {
        DataType::Xml
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            return render_null(ctx, &DataType::Xml);
        }
        render_document(ctx, &DataType::Xml, Self::unwrap(value)?)
    }

    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            let code = self.type_code(ctx.dialect);
            return ctx.stmt.set_null(ctx.index, code);
        }
        ctx.stmt.set_str(ctx.index, Self::unwrap(value)?)
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        match ctx.row.get_str(ctx.index)? {
            Some(s) => Ok(SqlValue::Xml(s)),
            None => Ok(SqlValue::Null(DataType::Xml)),
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
        w.write_str(Self::unwrap(value)?)
    }

    fn read_field(&self, r: &mut dyn RecordReader, _dialect: Dialect) -> BindResult<SqlValue> {
        match r.read_str()? {
            Some(s) => Ok(SqlValue::Xml(s)),
            None => Ok(SqlValue::Null(DataType::Xml)),
        }
    }
}

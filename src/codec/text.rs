//! Character codecs: varchar and clob.

use super::{render_null, type_mismatch, with_cast, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::Dialect;
use crate::driver::{RecordReader, RecordWriter};
use crate::error::BindResult;
use crate::value::SqlValue;

macro_rules! text_codec {
    ($name:ident, $ty:ident, $variant:ident) => {
        pub struct $name;

        impl $name {
            fn unwrap(value: &SqlValue) -> BindResult<&str> {
                match value {
                    SqlValue::$variant(s) => Ok(s.as_str()),
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
                let s = Self::unwrap(value)?;
                // with_cast suppresses the cast for the LOB variant.
                with_cast(ctx, &DataType::$ty, |ctx| {
                    let escaped = ctx.dialect.escape_string(s);
                    ctx.push("'");
                    ctx.push(&escaped);
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
                ctx.stmt.set_str(ctx.index, Self::unwrap(value)?)
            }

            fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
                match ctx.row.get_str(ctx.index)? {
                    Some(s) => Ok(SqlValue::$variant(s)),
                    None => Ok(SqlValue::Null(DataType::$ty)),
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

            fn read_field(
                &self,
                r: &mut dyn RecordReader,
                _dialect: Dialect,
            ) -> BindResult<SqlValue> {
                match r.read_str()? {
                    Some(s) => Ok(SqlValue::$variant(s)),
                    None => Ok(SqlValue::Null(DataType::$ty)),
                }
            }
        }
    };
}

text_codec!(VarcharCodec, Varchar, Text);
text_codec!(ClobCodec, Clob, Clob);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CastMode;

    fn render(dialect: Dialect, mode: CastMode, value: &SqlValue) -> String {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(dialect, mode, &mut sql);
        VarcharCodec.render_inline(&mut ctx, value).unwrap();
        sql
    }

    #[test]
    fn test_quote_doubling() {
        assert_eq!(
            render(Dialect::Postgres, CastMode::Never, &SqlValue::Text("it's".into())),
            "'it''s'"
        );
    }

    #[test]
    fn test_backslash_dialects() {
        assert_eq!(
            render(Dialect::MySql, CastMode::Never, &SqlValue::Text(r"a\b".into())),
            r"'a\\b'"
        );
        assert_eq!(
            render(Dialect::Postgres, CastMode::Never, &SqlValue::Text(r"a\b".into())),
            r"'a\b'"
        );
    }

    #[test]
    fn test_clob_never_casts() {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Always, &mut sql);
        ClobCodec
            .render_inline(&mut ctx, &SqlValue::Clob("big".into()))
            .unwrap();
        assert_eq!(sql, "'big'");
    }
}

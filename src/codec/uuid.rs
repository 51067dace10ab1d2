//! UUID codec.
//!
//! Postgres has a native uuid type; everywhere else the value is emulated
//! as a 36-character varchar. Either way the wire form is the hyphenated
//! text rendering.

use uuid::Uuid;

use super::{render_null, type_mismatch, with_cast, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::Dialect;
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::SqlValue;

pub struct UuidCodec;

impl UuidCodec {
    fn unwrap(value: &SqlValue) -> BindResult<Uuid> {
        match value {
            SqlValue::Uuid(u) => Ok(*u),
            other => Err(type_mismatch("uuid", other)),
        }
    }
}

impl Codec for UuidCodec {
    fn data_type(&self) -> DataType {
        DataType::Uuid
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            return render_null(ctx, &DataType::Uuid);
        }
        let u = Self::unwrap(value)?;
        with_cast(ctx, &DataType::Uuid, |ctx| {
            ctx.push("'");
            ctx.push(&u.to_string());
            ctx.push("'");
            Ok(())
        })
    }

    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            let code = self.type_code(ctx.dialect);
            return ctx.stmt.set_null(ctx.index, code);
        }
        ctx.stmt
            .set_str(ctx.index, &Self::unwrap(value)?.to_string())
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        let Some(s) = ctx.row.get_str(ctx.index)? else {
            return Ok(SqlValue::Null(DataType::Uuid));
        };
        let u = Uuid::parse_str(s.trim()).map_err(|_| BindError::malformed("uuid", s))?;
        Ok(SqlValue::Uuid(u))
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

    fn read_field(&self, r: &mut dyn RecordReader, _dialect: Dialect) -> BindResult<SqlValue> {
        let Some(s) = r.read_str()? else {
            return Ok(SqlValue::Null(DataType::Uuid));
        };
        let u = Uuid::parse_str(s.trim()).map_err(|_| BindError::malformed("uuid", s))?;
        Ok(SqlValue::Uuid(u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CastMode;

    const U: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_native_dialect_casts_in_auto() {
        let v = SqlValue::Uuid(U.parse().unwrap());

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
        UuidCodec.render_inline(&mut ctx, &v).unwrap();
        assert_eq!(sql, format!("'{}'::uuid", U));

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::MySql, CastMode::Auto, &mut sql);
        UuidCodec.render_inline(&mut ctx, &v).unwrap();
        assert_eq!(sql, format!("'{}'", U));
    }

    #[test]
    fn test_emulated_cast_name() {
        let v = SqlValue::Uuid(U.parse().unwrap());
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Sqlite, CastMode::Always, &mut sql);
        UuidCodec.render_inline(&mut ctx, &v).unwrap();
        assert_eq!(sql, format!("cast('{}' as varchar(36))", U));
    }

    #[test]
    fn test_malformed_read() {
        use crate::driver::mem::{MemRow, Slot};
        let mut row = MemRow::new(vec![Slot::Text("not-a-uuid".into())]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        assert!(matches!(
            UuidCodec.get_result(&mut ctx),
            Err(BindError::Malformed { .. })
        ));
    }
}

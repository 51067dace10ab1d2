//! Fallback codec for values without a dedicated mapping.
//!
//! Row ids and unclassified values travel as raw text through the generic
//! string slot. No casting, no validation; if the driver cannot take the
//! text, the failure surfaces at the driver boundary.

use super::{render_null, type_mismatch, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::Dialect;
use crate::driver::{RecordReader, RecordWriter};
use crate::error::BindResult;
use crate::value::SqlValue;

pub struct OpaqueCodec {
    ty: DataType,
}

impl OpaqueCodec {
    pub fn new(ty: DataType) -> Self {
        Self { ty }
    }

    fn unwrap<'v>(&self, value: &'v SqlValue) -> BindResult<&'v str> {
        match value {
            SqlValue::Other(s) | SqlValue::RowId(s) => Ok(s.as_str()),
            other => Err(type_mismatch("opaque", other)),
        }
    }

    fn wrap(&self, s: String) -> SqlValue {
        match self.ty {
            DataType::RowId => SqlValue::RowId(s),
            _ => SqlValue::Other(s),
        }
    }
}

impl Codec for OpaqueCodec {
    fn data_type(&self) -> DataType {
        self.ty.clone()
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            return render_null(ctx, &self.ty);
        }
        let escaped = ctx.dialect.escape_string(self.unwrap(value)?);
        ctx.push("'");
        ctx.push(&escaped);
        ctx.push("'");
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
            Some(s) => Ok(self.wrap(s)),
            None => Ok(SqlValue::Null(self.ty.clone())),
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
            Some(s) => Ok(self.wrap(s)),
            None => Ok(SqlValue::Null(self.ty.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CastMode;
    use crate::driver::mem::MemStatement;

    #[test]
    fn test_inline_never_casts() {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Always, &mut sql);
        OpaqueCodec::new(DataType::Other)
            .render_inline(&mut ctx, &SqlValue::Other("POINT(1 1)".into()))
            .unwrap();
        assert_eq!(sql, "'POINT(1 1)'");
    }

    #[test]
    fn test_rowid_round_trip() {
        let codec = OpaqueCodec::new(DataType::RowId);
        let v = SqlValue::RowId("AAAD5f".into());
        let mut stmt = MemStatement::new();
        {
            let mut ctx = BindContext::new(Dialect::SqlServer, 1, &mut stmt);
            codec.set_parameter(&mut ctx, &v).unwrap();
        }
        let mut row = stmt.into_row();
        let mut ctx = FetchContext::new(Dialect::SqlServer, 1, &mut row);
        assert_eq!(codec.get_result(&mut ctx).unwrap(), v);
    }
}

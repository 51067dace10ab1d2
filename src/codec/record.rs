//! Record/UDT codec.
//!
//! A record has two transfer shapes: composite text (`(a,b,"c d")`) through
//! the ordinary string slot, and the structured member stream when the
//! driver exposes one. Member types come from the declared `RecordType`;
//! an empty declaration reads every member as varchar.

use super::array::{decode_record_text, element_text};
use super::{codec_for, render_null, type_mismatch, with_cast, Codec};
use crate::composite;
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::{DataType, RecordType};
use crate::dialect::{Dialect, Feature};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::{RecordValue, SqlValue};

pub struct RecordCodec {
    ty: RecordType,
}

impl RecordCodec {
    pub fn new(ty: RecordType) -> Self {
        Self { ty }
    }

    fn unwrap<'v>(&self, value: &'v SqlValue) -> BindResult<&'v RecordValue> {
        match value {
            SqlValue::Record(r) => Ok(r),
            other => Err(type_mismatch("record", other)),
        }
    }

    fn encode_text(&self, r: &RecordValue) -> BindResult<String> {
        let texts = r
            .fields
            .iter()
            .map(element_text)
            .collect::<BindResult<Vec<_>>>()?;
        Ok(composite::encode_record(&texts))
    }

    /// Stream each member through its own codec into a structured writer.
    pub fn write_record(
        &self,
        w: &mut dyn RecordWriter,
        dialect: Dialect,
        value: &SqlValue,
    ) -> BindResult<()> {
        let r = self.unwrap(value)?;
        if !self.ty.fields.is_empty() && r.fields.len() != self.ty.fields.len() {
            return Err(BindError::Conversion(format!(
                "record {} declares {} members, value has {}",
                self.ty.qualified(),
                self.ty.fields.len(),
                r.fields.len()
            )));
        }
        for (i, field) in r.fields.iter().enumerate() {
            let ty = self
                .ty
                .fields
                .get(i)
                .cloned()
                .unwrap_or_else(|| field.data_type());
            codec_for(&ty).write_field(w, dialect, field)?;
        }
        Ok(())
    }

    /// Read each declared member from a structured reader.
    pub fn read_record(
        &self,
        r: &mut dyn RecordReader,
        dialect: Dialect,
    ) -> BindResult<SqlValue> {
        let mut fields = Vec::with_capacity(self.ty.fields.len());
        for ty in &self.ty.fields {
            fields.push(codec_for(ty).read_field(r, dialect)?);
        }
        Ok(SqlValue::Record(RecordValue {
            ty: self.ty.clone(),
            fields,
        }))
    }
}

impl Codec for RecordCodec {
    fn data_type(&self) -> DataType {
        DataType::Record(self.ty.clone())
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        let ty = self.data_type();
        if value.is_null() {
            return render_null(ctx, &ty);
        }
        let text = self.encode_text(self.unwrap(value)?)?;
        with_cast(ctx, &ty, |ctx| {
            let escaped = ctx.dialect.escape_string(&text);
            ctx.push("'");
            ctx.push(&escaped);
            ctx.push("'");
            Ok(())
        })
    }

    fn render_placeholder(&self, ctx: &mut RenderContext<'_>) -> BindResult<()> {
        let marker = ctx.dialect.placeholder(ctx.param_index);
        ctx.push(&marker);
        // The bound parameter is composite text; the cast restores the
        // record type.
        if ctx.dialect.supports(Feature::StructuredRecords) {
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
        if !ctx.dialect.supports(Feature::StructuredRecords) {
            return Err(BindError::unsupported(
                ctx.dialect,
                "record bind parameters",
            ));
        }
        let text = self.encode_text(self.unwrap(value)?)?;
        ctx.stmt.set_str(ctx.index, &text)
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        match ctx.row.get_str(ctx.index)? {
            Some(s) => decode_record_text(&self.ty, &s),
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
        let text = self.encode_text(self.unwrap(value)?)?;
        w.write_str(&text)
    }

    fn read_field(&self, r: &mut dyn RecordReader, _dialect: Dialect) -> BindResult<SqlValue> {
        match r.read_str()? {
            Some(s) => decode_record_text(&self.ty, &s),
            None => Ok(SqlValue::Null(self.data_type())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CastMode;
    use crate::driver::mem::{MemRecord, MemRow, MemStatement, Slot};

    fn point_ty() -> RecordType {
        let mut ty = RecordType::new("point", vec![DataType::Integer, DataType::Varchar]);
        ty.schema = Some("public".into());
        ty
    }

    fn point(x: i32, label: &str) -> SqlValue {
        SqlValue::Record(RecordValue {
            ty: point_ty(),
            fields: vec![SqlValue::Int(x), SqlValue::Text(label.into())],
        })
    }

    #[test]
    fn test_inline_composite_text_with_cast() {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
        RecordCodec::new(point_ty())
            .render_inline(&mut ctx, &point(1, "a b"))
            .unwrap();
        assert_eq!(sql, r#"'(1,"a b")'::public.point"#);
    }

    #[test]
    fn test_placeholder_cast() {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
        RecordCodec::new(point_ty())
            .render_placeholder(&mut ctx)
            .unwrap();
        assert_eq!(sql, "$1::public.point");
    }

    #[test]
    fn test_bind_refused_without_record_types() {
        let mut stmt = MemStatement::new();
        let mut ctx = BindContext::new(Dialect::MySql, 1, &mut stmt);
        let err = RecordCodec::new(point_ty())
            .set_parameter(&mut ctx, &point(1, "x"))
            .unwrap_err();
        assert!(matches!(err, BindError::Unsupported { .. }));
    }

    #[test]
    fn test_composite_text_round_trip() {
        let v = point(7, "hello, world");
        let codec = RecordCodec::new(point_ty());
        let mut stmt = MemStatement::new();
        {
            let mut ctx = BindContext::new(Dialect::Postgres, 1, &mut stmt);
            codec.set_parameter(&mut ctx, &v).unwrap();
        }
        let mut row = stmt.into_row();
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        assert_eq!(codec.get_result(&mut ctx).unwrap(), v);
    }

    #[test]
    fn test_unreadable_member_degrades_to_null() {
        let mut row = MemRow::new(vec![Slot::Text("(oops,fine)".into())]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        let got = RecordCodec::new(point_ty()).get_result(&mut ctx).unwrap();
        assert_eq!(
            got,
            SqlValue::Record(RecordValue {
                ty: point_ty(),
                fields: vec![
                    SqlValue::Null(DataType::Integer),
                    SqlValue::Text("fine".into()),
                ],
            })
        );
    }

    #[test]
    fn test_member_count_mismatch_is_hard() {
        let mut row = MemRow::new(vec![Slot::Text("(1,a,extra)".into())]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        assert!(matches!(
            RecordCodec::new(point_ty()).get_result(&mut ctx),
            Err(BindError::Malformed { .. })
        ));
    }

    #[test]
    fn test_structured_stream_round_trip() {
        let v = point(3, "label");
        let codec = RecordCodec::new(point_ty());
        let mut rec = MemRecord::new();
        codec
            .write_record(&mut rec, Dialect::Postgres, &v)
            .unwrap();

        let mut rec = MemRecord::from_slots(rec.slots().to_vec());
        assert_eq!(codec.read_record(&mut rec, Dialect::Postgres).unwrap(), v);
    }

    #[test]
    fn test_undeclared_members_read_as_varchar() {
        let ty = RecordType::new("anon", vec![]);
        let mut row = MemRow::new(vec![Slot::Text("(1,two)".into())]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        let got = RecordCodec::new(ty.clone()).get_result(&mut ctx).unwrap();
        assert_eq!(
            got,
            SqlValue::Record(RecordValue {
                ty,
                fields: vec![SqlValue::Text("1".into()), SqlValue::Text("two".into())],
            })
        );
    }
}

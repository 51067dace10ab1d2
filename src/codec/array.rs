//! Array codec.
//!
//! Native-array dialects get `ARRAY[...]` literals and composite-text binds;
//! everywhere else an inline array degrades to a parenthesized row list (for
//! IN-style predicates) and a bound array is refused outright.

use super::{codec_for, render_null, type_mismatch, with_cast, Codec};
use crate::composite;
use crate::context::{BindContext, CastMode, FetchContext, RenderContext};
use crate::datatype::{DataType, RecordType};
use crate::dialect::{Dialect, Feature};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::{EnumValue, RecordValue, SqlValue};

pub struct ArrayCodec {
    elem: DataType,
}

impl ArrayCodec {
    pub fn new(elem: DataType) -> Self {
        Self { elem }
    }

    fn unwrap<'v>(&self, value: &'v SqlValue) -> BindResult<&'v [SqlValue]> {
        match value {
            SqlValue::Array { values, .. } => Ok(values),
            other => Err(type_mismatch("array", other)),
        }
    }

    /// The element type to render and cast with. A declared `Other` element
    /// type is refined from the first non-null value, like value resolution.
    fn effective_elem(&self, values: &[SqlValue]) -> DataType {
        if self.elem != DataType::Other {
            return self.elem.clone();
        }
        values
            .iter()
            .find(|v| !v.is_null())
            .map(SqlValue::data_type)
            .unwrap_or(DataType::Other)
    }

    fn decode_text(&self, s: &str) -> BindResult<SqlValue> {
        let parsed =
            composite::parse_array(s).map_err(|_| BindError::malformed("array", s))?;
        let mut values = Vec::with_capacity(parsed.len());
        for text in parsed {
            values.push(match text {
                None => SqlValue::Null(self.elem.clone()),
                Some(t) => match element_from_text(&self.elem, &t) {
                    Ok(v) => v,
                    Err(err) => {
                        tracing::warn!(error = %err, raw = %t, "unreadable array element, substituting null");
                        SqlValue::Null(self.elem.clone())
                    }
                },
            });
        }
        Ok(SqlValue::Array {
            elem: self.elem.clone(),
            values,
        })
    }
}

impl Codec for ArrayCodec {
    fn data_type(&self) -> DataType {
        DataType::Array(Box::new(self.elem.clone()))
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            return render_null(ctx, &self.data_type());
        }
        let values = self.unwrap(value)?;
        let elem = self.effective_elem(values);
        let codec = codec_for(&elem);

        if !ctx.dialect.supports(Feature::NativeArray) {
            // Row-list fallback, usable on the right side of IN.
            ctx.push("(");
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                codec.render_inline(ctx, v)?;
            }
            ctx.push(")");
            return Ok(());
        }

        // Elements render uncast; the single trailing cast types the whole
        // constructor.
        let mut body = String::new();
        {
            let mut inner = RenderContext::new(ctx.dialect, CastMode::Never, &mut body);
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    inner.push(", ");
                }
                codec.render_inline(&mut inner, v)?;
            }
        }
        with_cast(ctx, &DataType::Array(Box::new(elem)), |ctx| {
            ctx.push("ARRAY[");
            ctx.push(&body);
            ctx.push("]");
            Ok(())
        })
    }

    fn render_placeholder(&self, ctx: &mut RenderContext<'_>) -> BindResult<()> {
        let marker = ctx.dialect.placeholder(ctx.param_index);
        ctx.push(&marker);
        // Bound arrays travel as composite text; the cast restores the
        // element type on dialects that can take one.
        if ctx.dialect.supports(Feature::NativeArray) {
            ctx.push("::");
            ctx.push(&self.data_type().cast_name(ctx.dialect));
        }
        Ok(())
    }

    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()> {
        if value.is_null() {
            let code = self.type_code(ctx.dialect);
            return ctx.stmt.set_null(ctx.index, code);
        }
        if !ctx.dialect.supports(Feature::NativeArray) {
            return Err(BindError::unsupported(ctx.dialect, "array bind parameters"));
        }
        let values = self.unwrap(value)?;
        let texts = values
            .iter()
            .map(element_text)
            .collect::<BindResult<Vec<_>>>()?;
        ctx.stmt.set_str(ctx.index, &composite::encode_array(&texts))
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        match ctx.row.get_str(ctx.index)? {
            Some(s) => self.decode_text(&s),
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
        let texts = self
            .unwrap(value)?
            .iter()
            .map(element_text)
            .collect::<BindResult<Vec<_>>>()?;
        w.write_str(&composite::encode_array(&texts))
    }

    fn read_field(&self, r: &mut dyn RecordReader, _dialect: Dialect) -> BindResult<SqlValue> {
        match r.read_str()? {
            Some(s) => self.decode_text(&s),
            None => Ok(SqlValue::Null(self.data_type())),
        }
    }
}

/// The composite-text form of one element, `None` for null. Nested arrays
/// and records recurse; everything scalar uses its canonical wire text.
pub(crate) fn element_text(value: &SqlValue) -> BindResult<Option<String>> {
    let text = match value {
        SqlValue::Null(_) => return Ok(None),
        SqlValue::Boolean(b) => b.to_string(),
        SqlValue::TinyInt(v) => v.to_string(),
        SqlValue::SmallInt(v) => v.to_string(),
        SqlValue::Int(v) => v.to_string(),
        SqlValue::BigInt(v) => v.to_string(),
        SqlValue::UTinyInt(v) => v.to_string(),
        SqlValue::USmallInt(v) => v.to_string(),
        SqlValue::UInt(v) => v.to_string(),
        SqlValue::UBigInt(v) => v.to_string(),
        SqlValue::Decimal(v) => v.to_string(),
        SqlValue::Float(v) => format!("{:?}", v),
        SqlValue::Double(v) => format!("{:?}", v),
        SqlValue::Text(s) | SqlValue::Clob(s) => s.clone(),
        SqlValue::Binary(b) | SqlValue::Blob(b) => hex_text(b),
        SqlValue::Date(d) => super::temporal::fmt_date(d),
        SqlValue::Time(t) => super::temporal::fmt_time(t),
        SqlValue::Timestamp(ts) => super::temporal::fmt_timestamp(ts),
        SqlValue::TimestampTz(ts) => super::temporal::fmt_timestamp_tz(ts),
        SqlValue::IntervalDs(i) => i.to_string(),
        SqlValue::IntervalYm(i) => i.to_string(),
        SqlValue::Uuid(u) => u.to_string(),
        SqlValue::RowId(s) => s.clone(),
        SqlValue::Enum(e) => e.literal.clone(),
        SqlValue::Array { values, .. } => {
            let texts = values
                .iter()
                .map(element_text)
                .collect::<BindResult<Vec<_>>>()?;
            composite::encode_array(&texts)
        }
        SqlValue::Record(r) => {
            let texts = r
                .fields
                .iter()
                .map(element_text)
                .collect::<BindResult<Vec<_>>>()?;
            composite::encode_record(&texts)
        }
        SqlValue::Json(v) | SqlValue::Jsonb(v) => v.to_string(),
        SqlValue::Xml(s) => s.clone(),
        SqlValue::Other(s) => s.clone(),
    };
    Ok(Some(text))
}

/// Parse one composite element back into a typed value. Containers recurse
/// and soft-degrade their own members; a scalar that does not parse is an
/// error for the caller to decide on.
pub(crate) fn element_from_text(ty: &DataType, s: &str) -> BindResult<SqlValue> {
    let value = match ty {
        DataType::Boolean => {
            if s.eq_ignore_ascii_case("t") || s.eq_ignore_ascii_case("true") || s == "1" {
                SqlValue::Boolean(true)
            } else if s.eq_ignore_ascii_case("f") || s.eq_ignore_ascii_case("false") || s == "0"
            {
                SqlValue::Boolean(false)
            } else {
                return Err(BindError::malformed("boolean", s));
            }
        }
        DataType::TinyInt => SqlValue::TinyInt(parse_num(s, "tinyint")?),
        DataType::SmallInt => SqlValue::SmallInt(parse_num(s, "smallint")?),
        DataType::Integer => SqlValue::Int(parse_num(s, "integer")?),
        DataType::BigInt => SqlValue::BigInt(parse_num(s, "bigint")?),
        DataType::UTinyInt => SqlValue::UTinyInt(parse_num(s, "tinyint unsigned")?),
        DataType::USmallInt => SqlValue::USmallInt(parse_num(s, "smallint unsigned")?),
        DataType::UInteger => SqlValue::UInt(parse_num(s, "integer unsigned")?),
        DataType::UBigInt => SqlValue::UBigInt(parse_num(s, "bigint unsigned")?),
        DataType::Decimal => SqlValue::Decimal(parse_num(s, "decimal")?),
        DataType::Float => SqlValue::Float(parse_num(s, "real")?),
        DataType::Double => SqlValue::Double(parse_num(s, "double")?),
        DataType::Varchar => SqlValue::Text(s.to_string()),
        DataType::Clob => SqlValue::Clob(s.to_string()),
        DataType::Binary => SqlValue::Binary(parse_hex(s)?),
        DataType::Blob => SqlValue::Blob(parse_hex(s)?),
        DataType::Date => SqlValue::Date(super::temporal::parse_date(s)?),
        DataType::Time => SqlValue::Time(super::temporal::parse_time(s)?),
        DataType::Timestamp => SqlValue::Timestamp(super::temporal::parse_timestamp(s)?),
        DataType::TimestampTz => {
            SqlValue::TimestampTz(super::temporal::parse_timestamp_tz(s)?)
        }
        DataType::IntervalDayToSecond => {
            SqlValue::IntervalDs(parse_num(s, "interval day to second")?)
        }
        DataType::IntervalYearToMonth => {
            SqlValue::IntervalYm(parse_num(s, "interval year to month")?)
        }
        DataType::Uuid => SqlValue::Uuid(
            uuid::Uuid::parse_str(s.trim()).map_err(|_| BindError::malformed("uuid", s))?,
        ),
        DataType::RowId => SqlValue::RowId(s.to_string()),
        DataType::Enum(e) => SqlValue::Enum(EnumValue::new(e.clone(), s)),
        DataType::Array(elem) => {
            let parsed =
                composite::parse_array(s).map_err(|_| BindError::malformed("array", s))?;
            let values = parsed
                .into_iter()
                .map(|t| degrade_member(elem, t))
                .collect();
            SqlValue::Array {
                elem: (**elem).clone(),
                values,
            }
        }
        DataType::Record(rt) => decode_record_text(rt, s)?,
        DataType::Json => SqlValue::Json(
            serde_json::from_str(s).map_err(|_| BindError::malformed("json", s))?,
        ),
        DataType::Jsonb => SqlValue::Jsonb(
            serde_json::from_str(s).map_err(|_| BindError::malformed("jsonb", s))?,
        ),
        DataType::Xml => SqlValue::Xml(s.to_string()),
        DataType::Other => SqlValue::Other(s.to_string()),
    };
    Ok(value)
}

/// Decode `(...)` record text, degrading unreadable members to null.
pub(crate) fn decode_record_text(rt: &RecordType, s: &str) -> BindResult<SqlValue> {
    let parsed = composite::parse_record(s)
        .map_err(|_| BindError::malformed("record", s))?;
    // Unknown member types read as an all-varchar guess.
    let field_types: Vec<DataType> = if rt.fields.is_empty() {
        vec![DataType::Varchar; parsed.len()]
    } else {
        if parsed.len() != rt.fields.len() {
            return Err(BindError::malformed("record", s));
        }
        rt.fields.clone()
    };
    let fields = field_types
        .iter()
        .zip(parsed)
        .map(|(ty, t)| degrade_member(ty, t))
        .collect();
    Ok(SqlValue::Record(RecordValue {
        ty: rt.clone(),
        fields,
    }))
}

/// Nested members never abort the containing composite; an unreadable one
/// becomes a typed null with a warning.
fn degrade_member(ty: &DataType, text: Option<String>) -> SqlValue {
    let Some(t) = text else {
        return SqlValue::Null(ty.clone());
    };
    match element_from_text(ty, &t) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(error = %err, raw = %t, "unreadable composite member, substituting null");
            SqlValue::Null(ty.clone())
        }
    }
}

fn parse_num<T: std::str::FromStr>(s: &str, label: &'static str) -> BindResult<T> {
    s.trim().parse().map_err(|_| BindError::malformed(label, s))
}

fn hex_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn parse_hex(s: &str) -> BindResult<Vec<u8>> {
    let digits = s.strip_prefix("\\x").unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(BindError::malformed("binary", s));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| BindError::malformed("binary", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::EnumType;

    fn ints(values: &[i32]) -> SqlValue {
        SqlValue::Array {
            elem: DataType::Integer,
            values: values.iter().map(|v| SqlValue::Int(*v)).collect(),
        }
    }

    #[test]
    fn test_native_constructor_uncast_for_inferred_elements() {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
        ArrayCodec::new(DataType::Integer)
            .render_inline(&mut ctx, &ints(&[1, 2, 3]))
            .unwrap();
        assert_eq!(sql, "ARRAY[1, 2, 3]");
    }

    #[test]
    fn test_enum_array_gets_one_trailing_cast() {
        let mood = EnumType::with_schema("public", "mood");
        let arr = SqlValue::Array {
            elem: DataType::Enum(mood.clone()),
            values: vec![
                SqlValue::Enum(EnumValue::new(mood.clone(), "happy")),
                SqlValue::Enum(EnumValue::new(mood.clone(), "sad")),
            ],
        };
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
        ArrayCodec::new(DataType::Enum(mood))
            .render_inline(&mut ctx, &arr)
            .unwrap();
        assert_eq!(sql, "ARRAY['happy', 'sad']::public.mood[]");
    }

    #[test]
    fn test_row_list_fallback() {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::MySql, CastMode::Auto, &mut sql);
        ArrayCodec::new(DataType::Integer)
            .render_inline(&mut ctx, &ints(&[1, 2]))
            .unwrap();
        assert_eq!(sql, "(1, 2)");
    }

    #[test]
    fn test_placeholder_cast() {
        let codec = ArrayCodec::new(DataType::Integer);

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Postgres, CastMode::Auto, &mut sql);
        codec.render_placeholder(&mut ctx).unwrap();
        assert_eq!(sql, "$1::integer[]");

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::MySql, CastMode::Auto, &mut sql);
        codec.render_placeholder(&mut ctx).unwrap();
        assert_eq!(sql, "?");
    }

    #[test]
    fn test_bind_refused_without_native_arrays() {
        use crate::driver::mem::MemStatement;
        let mut stmt = MemStatement::new();
        let mut ctx = BindContext::new(Dialect::Sqlite, 1, &mut stmt);
        let err = ArrayCodec::new(DataType::Integer)
            .set_parameter(&mut ctx, &ints(&[1]))
            .unwrap_err();
        assert!(matches!(err, BindError::Unsupported { .. }));
    }

    #[test]
    fn test_composite_text_round_trip() {
        use crate::driver::mem::MemStatement;

        let v = SqlValue::Array {
            elem: DataType::Varchar,
            values: vec![
                SqlValue::Text("hello, world".into()),
                SqlValue::Null(DataType::Varchar),
                SqlValue::Text("NULL".into()),
            ],
        };
        let codec = ArrayCodec::new(DataType::Varchar);
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
    fn test_nested_array_with_quoted_braces() {
        use crate::driver::mem::{MemRow, Slot};
        // Inner arrays arrive unquoted, with quoting only around elements.
        let mut row = MemRow::new(vec![Slot::Text(r#"{{a,"x}y"}}"#.into())]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        let got = ArrayCodec::new(DataType::Array(Box::new(DataType::Varchar)))
            .get_result(&mut ctx)
            .unwrap();
        assert_eq!(
            got,
            SqlValue::Array {
                elem: DataType::Array(Box::new(DataType::Varchar)),
                values: vec![SqlValue::Array {
                    elem: DataType::Varchar,
                    values: vec![SqlValue::Text("a".into()), SqlValue::Text("x}y".into())],
                }],
            }
        );
    }

    #[test]
    fn test_unreadable_element_degrades_to_null() {
        use crate::driver::mem::{MemRow, Slot};
        let mut row = MemRow::new(vec![Slot::Text("{1,oops,3}".into())]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        let got = ArrayCodec::new(DataType::Integer)
            .get_result(&mut ctx)
            .unwrap();
        assert_eq!(
            got,
            SqlValue::Array {
                elem: DataType::Integer,
                values: vec![
                    SqlValue::Int(1),
                    SqlValue::Null(DataType::Integer),
                    SqlValue::Int(3),
                ],
            }
        );
    }

    #[test]
    fn test_malformed_container_is_hard() {
        use crate::driver::mem::{MemRow, Slot};
        let mut row = MemRow::new(vec![Slot::Text("1,2,3".into())]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        assert!(matches!(
            ArrayCodec::new(DataType::Integer).get_result(&mut ctx),
            Err(BindError::Malformed { .. })
        ));
    }
}

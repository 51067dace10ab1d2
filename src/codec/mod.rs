//! Per-type codecs.
//!
//! A codec binds one logical type to the five transfer operations (inline
//! render, placeholder render, parameter set, result get, OUT-parameter get)
//! plus the structured record-member variants. Codecs are stateless after
//! construction and safe to share across threads; every operation receives
//! the value and a borrowed transfer context.

pub mod array;
pub mod binary;
pub mod boolean;
pub mod decimal;
pub mod enums;
pub mod float;
pub mod integer;
pub mod interval;
pub mod json;
pub mod opaque;
pub mod record;
pub mod temporal;
pub mod text;
pub mod uuid;

use std::sync::Arc;

use crate::context::{BindContext, CastMode, FetchContext, RenderContext};
use crate::convert::Convert;
use crate::datatype::DataType;
use crate::dialect::{self, Dialect};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::SqlValue;

/// The per-logical-type transfer component.
pub trait Codec: Send + Sync {
    /// The wire type this codec is bound to.
    fn data_type(&self) -> DataType;

    /// Driver type code used for OUT-parameter registration and null sets.
    /// Delegating codecs forward this unchanged.
    fn type_code(&self, dialect: Dialect) -> i32 {
        self.data_type().type_code(dialect)
    }

    /// Emit the value as a SQL literal.
    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()>;

    /// Emit a parameter marker. A few codecs append a cast suffix after
    /// the marker where the dialect cannot infer the parameter type.
    fn render_placeholder(&self, ctx: &mut RenderContext<'_>) -> BindResult<()> {
        let marker = ctx.dialect.placeholder(ctx.param_index);
        ctx.push(&marker);
        Ok(())
    }

    /// Write the value into a prepared-statement slot.
    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()>;

    /// Read a value back from a result row.
    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue>;

    /// Read a value back from an OUT-parameter slot. Same logic as a result
    /// read for every current dialect; kept separate so codecs can diverge.
    fn get_out_parameter(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        self.get_result(ctx)
    }

    /// Write one member value into a structured record stream.
    fn write_field(
        &self,
        w: &mut dyn RecordWriter,
        dialect: Dialect,
        value: &SqlValue,
    ) -> BindResult<()>;

    /// Read one member value from a structured record stream.
    fn read_field(&self, r: &mut dyn RecordReader, dialect: Dialect) -> BindResult<SqlValue>;
}

/// Whether an inline value of type `ty` gets an explicit cast.
pub(crate) fn should_cast(ctx: &RenderContext<'_>, ty: &DataType) -> bool {
    // LOB values stream; casting them is never valid.
    if ty.is_lob() {
        return false;
    }
    match ctx.cast_mode {
        CastMode::Never => false,
        CastMode::Always => true,
        CastMode::Auto => dialect::needs_inline_cast(ctx.dialect, ty),
    }
}

/// Render `body` wrapped in a cast when the cast decision says so.
/// Postgres uses the `::` suffix form; everything else gets `cast(... as t)`.
pub(crate) fn with_cast(
    ctx: &mut RenderContext<'_>,
    ty: &DataType,
    body: impl FnOnce(&mut RenderContext<'_>) -> BindResult<()>,
) -> BindResult<()> {
    if !should_cast(ctx, ty) {
        return body(ctx);
    }
    let name = ty.cast_name(ctx.dialect);
    if ctx.dialect == Dialect::Postgres {
        body(ctx)?;
        ctx.push("::");
        ctx.push(&name);
    } else {
        ctx.push("cast(");
        body(ctx)?;
        ctx.push(" as ");
        ctx.push(&name);
        ctx.push(")");
    }
    Ok(())
}

/// Emit the null keyword, cast like any other literal of the type.
pub(crate) fn render_null(ctx: &mut RenderContext<'_>, ty: &DataType) -> BindResult<()> {
    with_cast(ctx, ty, |ctx| {
        ctx.push("NULL");
        Ok(())
    })
}

pub(crate) fn type_mismatch(expected: &'static str, got: &SqlValue) -> BindError {
    BindError::Conversion(format!("expected {} value, got {:?}", expected, got))
}

/// A codec layered over another codec through a converter. Used for types
/// implemented on top of a more primitive wire type; the wire type and
/// driver type code pass through unchanged.
pub struct DelegatingCodec {
    inner: Box<dyn Codec>,
    convert: Arc<dyn Convert>,
}

impl DelegatingCodec {
    pub fn new(inner: Box<dyn Codec>, convert: Arc<dyn Convert>) -> Self {
        Self { inner, convert }
    }
}

impl Codec for DelegatingCodec {
    fn data_type(&self) -> DataType {
        self.inner.data_type()
    }

    fn type_code(&self, dialect: Dialect) -> i32 {
        self.inner.type_code(dialect)
    }

    fn render_inline(&self, ctx: &mut RenderContext<'_>, value: &SqlValue) -> BindResult<()> {
        if self.convert.is_identity() {
            return self.inner.render_inline(ctx, value);
        }
        let wire = self.convert.to_wire(value)?;
        self.inner.render_inline(ctx, &wire)
    }

    fn render_placeholder(&self, ctx: &mut RenderContext<'_>) -> BindResult<()> {
        self.inner.render_placeholder(ctx)
    }

    fn set_parameter(&self, ctx: &mut BindContext<'_>, value: &SqlValue) -> BindResult<()> {
        if self.convert.is_identity() {
            return self.inner.set_parameter(ctx, value);
        }
        let wire = self.convert.to_wire(value)?;
        self.inner.set_parameter(ctx, &wire)
    }

    fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        let wire = self.inner.get_result(ctx)?;
        self.convert.from_wire(wire)
    }

    fn get_out_parameter(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
        let wire = self.inner.get_out_parameter(ctx)?;
        self.convert.from_wire(wire)
    }

    fn write_field(
        &self,
        w: &mut dyn RecordWriter,
        dialect: Dialect,
        value: &SqlValue,
    ) -> BindResult<()> {
        if self.convert.is_identity() {
            return self.inner.write_field(w, dialect, value);
        }
        let wire = self.convert.to_wire(value)?;
        self.inner.write_field(w, dialect, &wire)
    }

    fn read_field(&self, r: &mut dyn RecordReader, dialect: Dialect) -> BindResult<SqlValue> {
        let wire = self.inner.read_field(r, dialect)?;
        self.convert.from_wire(wire)
    }
}

/// Resolve the codec for a logical type. Total over the closed type set:
/// arrays and enums carry their metadata, everything without a specific
/// codec falls back to the opaque codec and fails, if at all, at the
/// driver boundary.
pub fn codec_for(ty: &DataType) -> Box<dyn Codec> {
    match ty {
        DataType::Array(elem) => Box::new(array::ArrayCodec::new((**elem).clone())),
        DataType::Enum(e) => Box::new(enums::EnumCodec::new(e.clone())),
        DataType::Record(r) => Box::new(record::RecordCodec::new(r.clone())),
        DataType::Boolean => Box::new(boolean::BooleanCodec),
        DataType::TinyInt => Box::new(integer::TinyIntCodec),
        DataType::SmallInt => Box::new(integer::SmallIntCodec),
        DataType::Integer => Box::new(integer::IntegerCodec),
        DataType::BigInt => Box::new(integer::BigIntCodec),
        DataType::UTinyInt => Box::new(integer::UTinyIntCodec),
        DataType::USmallInt => Box::new(integer::USmallIntCodec),
        DataType::UInteger => Box::new(integer::UIntegerCodec),
        DataType::UBigInt => Box::new(integer::UBigIntCodec),
        DataType::Decimal => Box::new(decimal::DecimalCodec),
        DataType::Float => Box::new(float::FloatCodec),
        DataType::Double => Box::new(float::DoubleCodec),
        DataType::Varchar => Box::new(text::VarcharCodec),
        DataType::Clob => Box::new(text::ClobCodec),
        DataType::Binary => Box::new(binary::BinaryCodec),
        DataType::Blob => Box::new(binary::BlobCodec),
        DataType::Date => Box::new(temporal::DateCodec),
        DataType::Time => Box::new(temporal::TimeCodec),
        DataType::Timestamp => Box::new(temporal::TimestampCodec),
        DataType::TimestampTz => Box::new(temporal::TimestampTzCodec),
        DataType::IntervalDayToSecond => Box::new(interval::DayToSecondCodec),
        DataType::IntervalYearToMonth => Box::new(interval::YearToMonthCodec),
        DataType::Uuid => Box::new(uuid::UuidCodec),
        DataType::Json => Box::new(json::JsonCodec),
        DataType::Jsonb => Box::new(json::JsonbCodec),
        DataType::Xml => Box::new(json::XmlCodec),
        DataType::RowId => Box::new(opaque::OpaqueCodec::new(DataType::RowId)),
        DataType::Other => Box::new(opaque::OpaqueCodec::new(DataType::Other)),
    }
}

/// Resolve the codec for a runtime value.
pub fn resolve(value: &SqlValue) -> Box<dyn Codec> {
    codec_for(&value.data_type())
}

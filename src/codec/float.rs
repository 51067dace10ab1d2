//! Floating-point codecs.
//!
//! NaN has no portable literal. Dialects with a native idiom get an
//! explicit cast of the string `'NaN'`; the rest get `sqrt(-1)`, an
//! expression that evaluates to NaN instead of an unparseable token.
//! Infinity without a native idiom is a hard unsupported error.

use super::{render_null, type_mismatch, with_cast, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::{Dialect, Feature};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::SqlValue;

fn render_f64(ctx: &mut RenderContext<'_>, ty: &DataType, v: f64) -> BindResult<()> {
    if v.is_nan() {
        if ctx.dialect.supports(Feature::NativeNanLiteral) {
            let name = ty.cast_name(ctx.dialect);
            ctx.push("'NaN'::");
            ctx.push(&name);
        } else {
            ctx.push("sqrt(-1)");
        }
        return Ok(());
    }
    if v.is_infinite() {
        if !ctx.dialect.supports(Feature::NativeNanLiteral) {
            return Err(BindError::unsupported(
                ctx.dialect,
                "an infinity literal",
            ));
        }
        let name = ty.cast_name(ctx.dialect);
        ctx.push(if v > 0.0 { "'Infinity'::" } else { "'-Infinity'::" });
        ctx.push(&name);
        return Ok(());
    }
    with_cast(ctx, ty, |ctx| {
        // Debug keeps the decimal point on integral values (1.0, not 1).
        ctx.push(&format!("{:?}", v));
        Ok(())
    })
}

macro_rules! float_codec {
    ($name:ident, $ty:ident, $rust:ty, $variant:ident) => {
        pub struct $name;

        impl $name {
            fn unwrap(value: &SqlValue) -> BindResult<$rust> {
                match value {
                    SqlValue::$variant(v) => Ok(*v),
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
                render_f64(ctx, &DataType::$ty, Self::unwrap(value)? as f64)
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
                ctx.stmt.set_f64(ctx.index, Self::unwrap(value)? as f64)
            }

            fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
                let v = ctx.row.get_f64(ctx.index)?;
                if ctx.row.was_null() {
                    return Ok(SqlValue::Null(DataType::$ty));
                }
                Ok(SqlValue::$variant(v as $rust))
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
                w.write_f64(Self::unwrap(value)? as f64)
            }

            fn read_field(
                &self,
                r: &mut dyn RecordReader,
                _dialect: Dialect,
            ) -> BindResult<SqlValue> {
                let v = r.read_f64()?;
                if r.was_null() {
                    return Ok(SqlValue::Null(DataType::$ty));
                }
                Ok(SqlValue::$variant(v as $rust))
            }
        }
    };
}

float_codec!(FloatCodec, Float, f32, Float);
float_codec!(DoubleCodec, Double, f64, Double);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CastMode;
    use crate::driver::mem::{MemRow, Slot};

    fn render(dialect: Dialect, v: f64) -> String {
        let mut sql = String::new();
        let mut ctx = RenderContext::new(dialect, CastMode::Never, &mut sql);
        DoubleCodec.render_inline(&mut ctx, &SqlValue::Double(v)).unwrap();
        sql
    }

    #[test]
    fn test_nan_idioms() {
        assert_eq!(render(Dialect::Postgres, f64::NAN), "'NaN'::double precision");
        assert_eq!(render(Dialect::MySql, f64::NAN), "sqrt(-1)");
        assert_eq!(render(Dialect::Sqlite, f64::NAN), "sqrt(-1)");
    }

    #[test]
    fn test_infinity() {
        assert_eq!(
            render(Dialect::Postgres, f64::INFINITY),
            "'Infinity'::double precision"
        );
        assert_eq!(
            render(Dialect::Postgres, f64::NEG_INFINITY),
            "'-Infinity'::double precision"
        );

        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::MySql, CastMode::Never, &mut sql);
        assert!(matches!(
            DoubleCodec.render_inline(&mut ctx, &SqlValue::Double(f64::INFINITY)),
            Err(BindError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_integral_keeps_point() {
        assert_eq!(render(Dialect::Postgres, 1.0), "1.0");
        assert_eq!(render(Dialect::Postgres, -2.5), "-2.5");
    }

    #[test]
    fn test_nan_roundtrip_through_driver() {
        let mut row = MemRow::new(vec![Slot::Float(f64::NAN)]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        match DoubleCodec.get_result(&mut ctx).unwrap() {
            SqlValue::Double(v) => assert!(v.is_nan()),
            other => panic!("unexpected {:?}", other),
        }
    }
}

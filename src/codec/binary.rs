//! Byte-sequence codecs: binary and blob.
//!
//! Hex literal syntax differs per dialect: Postgres `'\x..'`, SQL Server
//! `0x..`, the rest `X'..'`.

use super::{render_null, type_mismatch, Codec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::datatype::DataType;
use crate::dialect::Dialect;
use crate::driver::{RecordReader, RecordWriter};
use crate::error::BindResult;
use crate::value::SqlValue;

fn push_hex(sql: &mut String, bytes: &[u8]) {
    for b in bytes {
        sql.push_str(&format!("{:02x}", b));
    }
}

fn render_bytes(ctx: &mut RenderContext<'_>, bytes: &[u8]) {
    match ctx.dialect {
        Dialect::Postgres => {
            ctx.push("'\\x");
            push_hex(ctx.sql, bytes);
            ctx.push("'");
        }
        Dialect::SqlServer => {
            ctx.push("0x");
            push_hex(ctx.sql, bytes);
        }
        Dialect::MySql | Dialect::MariaDb | Dialect::Sqlite => {
            ctx.push("X'");
            push_hex(ctx.sql, bytes);
            ctx.push("'");
        }
    }
}

macro_rules! binary_codec {
    ($name:ident, $ty:ident, $variant:ident) => {
        pub struct $name;

        impl $name {
            fn unwrap(value: &SqlValue) -> BindResult<&[u8]> {
                match value {
                    SqlValue::$variant(b) => Ok(b.as_slice()),
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
                render_bytes(ctx, Self::unwrap(value)?);
                Ok(())
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
                ctx.stmt.set_bytes(ctx.index, Self::unwrap(value)?)
            }

            fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
                match ctx.row.get_bytes(ctx.index)? {
                    Some(b) => Ok(SqlValue::$variant(b)),
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
                w.write_bytes(Self::unwrap(value)?)
            }

            fn read_field(
                &self,
                r: &mut dyn RecordReader,
                _dialect: Dialect,
            ) -> BindResult<SqlValue> {
                match r.read_bytes()? {
                    Some(b) => Ok(SqlValue::$variant(b)),
                    None => Ok(SqlValue::Null(DataType::$ty)),
                }
            }
        }
    };
}

binary_codec!(BinaryCodec, Binary, Binary);
binary_codec!(BlobCodec, Blob, Blob);

//! The dialect-neutral runtime value type.
//!
//! `SqlValue` is the sum type every codec operation carries. Codecs never
//! hold a value; they receive it per call together with a transfer context.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::datatype::{DataType, EnumType, RecordType};
use crate::interval::{DayToSecond, YearToMonth};

/// An enum literal together with its database type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub ty: EnumType,
    pub literal: String,
}

impl EnumValue {
    pub fn new(ty: EnumType, literal: impl Into<String>) -> Self {
        Self {
            ty,
            literal: literal.into(),
        }
    }
}

/// A record/UDT value: the declared type plus one value per member, in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordValue {
    pub ty: RecordType,
    pub fields: Vec<SqlValue>,
}

/// A database-neutral value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL NULL, typed so null binds can register the right driver code.
    Null(DataType),
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    UTinyInt(u8),
    USmallInt(u16),
    UInt(u32),
    UBigInt(u64),
    Decimal(Decimal),
    Float(f32),
    Double(f64),
    Text(String),
    Clob(String),
    Binary(Vec<u8>),
    Blob(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    IntervalDs(DayToSecond),
    IntervalYm(YearToMonth),
    Uuid(uuid::Uuid),
    RowId(String),
    Enum(EnumValue),
    Array {
        /// Declared element type. `DataType::Other` means "too generic to
        /// name" and the effective type is derived from the elements.
        elem: DataType,
        values: Vec<SqlValue>,
    },
    Record(RecordValue),
    Json(serde_json::Value),
    Jsonb(serde_json::Value),
    Xml(String),
    /// A value the library has no explicit codec for; travels as raw text
    /// and fails at the driver boundary if the driver cannot take it.
    Other(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    /// Resolve this value's logical type.
    ///
    /// Resolution is total and never fails. The catch-all ordering is
    /// load-bearing: arrays resolve first (recursing into the element type,
    /// so an array of enums is an array, not an enum), then enums, then
    /// everything unrecognized degrades to `Other`.
    pub fn data_type(&self) -> DataType {
        match self {
            SqlValue::Null(ty) => ty.clone(),
            SqlValue::Array { elem, values } => {
                let elem = if *elem == DataType::Other {
                    // Declared component type is too generic; take the type
                    // of the first non-null element instead.
                    values
                        .iter()
                        .find(|v| !v.is_null())
                        .map(SqlValue::data_type)
                        .unwrap_or(DataType::Other)
                } else {
                    elem.clone()
                };
                DataType::Array(Box::new(elem))
            }
            SqlValue::Enum(e) => DataType::Enum(e.ty.clone()),
            SqlValue::Boolean(_) => DataType::Boolean,
            SqlValue::TinyInt(_) => DataType::TinyInt,
            SqlValue::SmallInt(_) => DataType::SmallInt,
            SqlValue::Int(_) => DataType::Integer,
            SqlValue::BigInt(_) => DataType::BigInt,
            SqlValue::UTinyInt(_) => DataType::UTinyInt,
            SqlValue::USmallInt(_) => DataType::USmallInt,
            SqlValue::UInt(_) => DataType::UInteger,
            SqlValue::UBigInt(_) => DataType::UBigInt,
            SqlValue::Decimal(_) => DataType::Decimal,
            SqlValue::Float(_) => DataType::Float,
            SqlValue::Double(_) => DataType::Double,
            SqlValue::Text(_) => DataType::Varchar,
            SqlValue::Clob(_) => DataType::Clob,
            SqlValue::Binary(_) => DataType::Binary,
            SqlValue::Blob(_) => DataType::Blob,
            SqlValue::Date(_) => DataType::Date,
            SqlValue::Time(_) => DataType::Time,
            SqlValue::Timestamp(_) => DataType::Timestamp,
            SqlValue::TimestampTz(_) => DataType::TimestampTz,
            SqlValue::IntervalDs(_) => DataType::IntervalDayToSecond,
            SqlValue::IntervalYm(_) => DataType::IntervalYearToMonth,
            SqlValue::Uuid(_) => DataType::Uuid,
            SqlValue::RowId(_) => DataType::RowId,
            SqlValue::Record(r) => DataType::Record(r.ty.clone()),
            SqlValue::Json(_) => DataType::Json,
            SqlValue::Jsonb(_) => DataType::Jsonb,
            SqlValue::Xml(_) => DataType::Xml,
            SqlValue::Other(_) => DataType::Other,
        }
    }
}

macro_rules! from_scalar {
    ($($rust:ty => $variant:ident / $null:ident),* $(,)?) => {
        $(
            impl From<$rust> for SqlValue {
                fn from(v: $rust) -> Self {
                    SqlValue::$variant(v)
                }
            }

            impl From<Option<$rust>> for SqlValue {
                fn from(v: Option<$rust>) -> Self {
                    match v {
                        Some(v) => SqlValue::$variant(v),
                        None => SqlValue::Null(DataType::$null),
                    }
                }
            }
        )*
    };
}

from_scalar! {
    bool => Boolean / Boolean,
    i8 => TinyInt / TinyInt,
    i16 => SmallInt / SmallInt,
    i32 => Int / Integer,
    i64 => BigInt / BigInt,
    u8 => UTinyInt / UTinyInt,
    u16 => USmallInt / USmallInt,
    u32 => UInt / UInteger,
    u64 => UBigInt / UBigInt,
    Decimal => Decimal / Decimal,
    f32 => Float / Float,
    f64 => Double / Double,
    String => Text / Varchar,
    NaiveDate => Date / Date,
    NaiveTime => Time / Time,
    NaiveDateTime => Timestamp / Timestamp,
    DayToSecond => IntervalDs / IntervalDayToSecond,
    YearToMonth => IntervalYm / IntervalYearToMonth,
    uuid::Uuid => Uuid / Uuid,
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl<'a> From<Option<&'a str>> for SqlValue {
    fn from(opt: Option<&'a str>) -> Self {
        match opt {
            Some(s) => SqlValue::Text(s.to_string()),
            None => SqlValue::Null(DataType::Varchar),
        }
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(b: Vec<u8>) -> Self {
        SqlValue::Binary(b)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(b: &[u8]) -> Self {
        SqlValue::Binary(b.to_vec())
    }
}

impl From<DateTime<FixedOffset>> for SqlValue {
    fn from(t: DateTime<FixedOffset>) -> Self {
        SqlValue::TimestampTz(t)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(t: DateTime<Utc>) -> Self {
        SqlValue::TimestampTz(t.fixed_offset())
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        SqlValue::Json(v)
    }
}

impl From<EnumValue> for SqlValue {
    fn from(e: EnumValue) -> Self {
        SqlValue::Enum(e)
    }
}

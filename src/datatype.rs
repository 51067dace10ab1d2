//! Logical type descriptors and driver type codes.
//!
//! A `DataType` is the dialect-neutral classification of a value. The set is
//! closed: adding a wire type means adding a variant here plus one codec
//! module, never touching existing ones.

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, Feature};

/// Name metadata for a database enum type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    pub schema: Option<String>,
    pub name: String,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Schema-qualified name as used in casts.
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(s) => format!("{}.{}", s, self.name),
            None => self.name.clone(),
        }
    }
}

/// Name and member metadata for a database record/UDT type. An empty
/// `fields` list means the member types are unknown and reads fall back to
/// an all-varchar guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    pub schema: Option<String>,
    pub name: String,
    pub fields: Vec<DataType>,
}

impl RecordType {
    pub fn new(name: impl Into<String>, fields: Vec<DataType>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            fields,
        }
    }

    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(s) => format!("{}.{}", s, self.name),
            None => self.name.clone(),
        }
    }
}

/// The canonical, dialect-neutral logical type of a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    UTinyInt,
    USmallInt,
    UInteger,
    UBigInt,
    Decimal,
    Float,
    Double,
    Boolean,
    Varchar,
    Clob,
    Binary,
    Blob,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    IntervalDayToSecond,
    IntervalYearToMonth,
    Uuid,
    RowId,
    Enum(EnumType),
    Array(Box<DataType>),
    Record(RecordType),
    Json,
    Jsonb,
    Xml,
    Other,
}

/// Driver-level type codes, one stable integer per logical type, registered
/// for OUT parameters and used to pick null-setting behavior. Values follow
/// the JDBC `java.sql.Types` constants so they line up with what database
/// drivers actually speak.
pub mod code {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const SMALLINT: i32 = 5;
    pub const INTEGER: i32 = 4;
    pub const BIGINT: i32 = -5;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const CHAR: i32 = 1;
    pub const VARCHAR: i32 = 12;
    pub const LONGVARCHAR: i32 = -1;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const TIMESTAMP_WITH_TIMEZONE: i32 = 2014;
    pub const BINARY: i32 = -2;
    pub const VARBINARY: i32 = -3;
    pub const BLOB: i32 = 2004;
    pub const CLOB: i32 = 2005;
    pub const BOOLEAN: i32 = 16;
    pub const ARRAY: i32 = 2003;
    pub const STRUCT: i32 = 2002;
    pub const ROWID: i32 = -8;
    pub const SQLXML: i32 = 2009;
    pub const OTHER: i32 = 1111;
}

impl DataType {
    /// The driver type code for this logical type on the given dialect.
    /// Stable per dialect family; consulted before the first bind of a
    /// parameter and when registering OUT parameters.
    pub fn type_code(&self, dialect: Dialect) -> i32 {
        match self {
            DataType::TinyInt | DataType::UTinyInt => code::TINYINT,
            DataType::SmallInt | DataType::USmallInt => code::SMALLINT,
            DataType::Integer | DataType::UInteger => code::INTEGER,
            DataType::BigInt => code::BIGINT,
            // Above i64 range the value travels as text, so the driver slot
            // is registered as DECIMAL.
            DataType::UBigInt => code::DECIMAL,
            DataType::Decimal => {
                if dialect.supports(Feature::DecimalAsText) {
                    code::VARCHAR
                } else {
                    code::DECIMAL
                }
            }
            DataType::Float => code::REAL,
            DataType::Double => code::DOUBLE,
            DataType::Boolean => {
                if dialect.supports(Feature::BooleanAsInteger) {
                    code::BIT
                } else {
                    code::BOOLEAN
                }
            }
            DataType::Varchar | DataType::Enum(_) => code::VARCHAR,
            DataType::Clob => code::CLOB,
            DataType::Binary => code::VARBINARY,
            DataType::Blob => code::BLOB,
            DataType::Date => code::DATE,
            DataType::Time => code::TIME,
            DataType::Timestamp => code::TIMESTAMP,
            DataType::TimestampTz => code::TIMESTAMP_WITH_TIMEZONE,
            DataType::IntervalDayToSecond | DataType::IntervalYearToMonth => {
                if dialect.supports(Feature::NativeInterval) {
                    code::OTHER
                } else {
                    code::VARCHAR
                }
            }
            DataType::Uuid => {
                if dialect.supports(Feature::NativeUuid) {
                    code::OTHER
                } else {
                    code::VARCHAR
                }
            }
            DataType::RowId => code::ROWID,
            DataType::Array(_) => code::ARRAY,
            DataType::Record(_) => code::STRUCT,
            DataType::Json | DataType::Jsonb => code::VARCHAR,
            DataType::Xml => code::SQLXML,
            DataType::Other => code::OTHER,
        }
    }

    /// The type name used in explicit casts on the given dialect.
    pub fn cast_name(&self, dialect: Dialect) -> String {
        match self {
            DataType::TinyInt => match dialect {
                Dialect::Postgres => "smallint".into(),
                Dialect::SqlServer => "tinyint".into(),
                _ => "tinyint".into(),
            },
            DataType::SmallInt | DataType::UTinyInt => "smallint".into(),
            DataType::Integer | DataType::USmallInt => match dialect {
                Dialect::SqlServer => "int".into(),
                _ => "integer".into(),
            },
            DataType::BigInt | DataType::UInteger => "bigint".into(),
            DataType::UBigInt | DataType::Decimal => "numeric".into(),
            DataType::Float => "real".into(),
            DataType::Double => match dialect {
                Dialect::Postgres => "double precision".into(),
                Dialect::SqlServer => "float".into(),
                _ => "double".into(),
            },
            DataType::Boolean => {
                if dialect.supports(Feature::BooleanAsInteger) {
                    "int".into()
                } else {
                    "boolean".into()
                }
            }
            DataType::Varchar | DataType::Clob => "varchar".into(),
            DataType::Binary | DataType::Blob => match dialect {
                Dialect::Postgres => "bytea".into(),
                Dialect::SqlServer => "varbinary(max)".into(),
                _ => "blob".into(),
            },
            DataType::Date => "date".into(),
            DataType::Time => "time".into(),
            DataType::Timestamp => match dialect {
                Dialect::Postgres => "timestamp".into(),
                Dialect::SqlServer => "datetime2".into(),
                _ => "datetime".into(),
            },
            DataType::TimestampTz => match dialect {
                Dialect::Postgres => "timestamp with time zone".into(),
                Dialect::SqlServer => "datetimeoffset".into(),
                _ => "datetime".into(),
            },
            DataType::IntervalDayToSecond | DataType::IntervalYearToMonth => {
                if dialect.supports(Feature::NativeInterval) {
                    "interval".into()
                } else {
                    "varchar".into()
                }
            }
            DataType::Uuid => {
                if dialect.supports(Feature::NativeUuid) {
                    "uuid".into()
                } else {
                    "varchar(36)".into()
                }
            }
            DataType::RowId => "varchar".into(),
            DataType::Enum(ty) => {
                if dialect.supports(Feature::EnumCast) {
                    ty.qualified()
                } else {
                    "varchar".into()
                }
            }
            DataType::Array(elem) => format!("{}[]", elem.cast_name(dialect)),
            DataType::Record(ty) => ty.qualified(),
            DataType::Json => "json".into(),
            DataType::Jsonb => "jsonb".into(),
            DataType::Xml => "xml".into(),
            DataType::Other => "varchar".into(),
        }
    }

    /// Large-object types suppress casts and keep streaming semantics.
    pub fn is_lob(&self) -> bool {
        matches!(self, DataType::Blob | DataType::Clob)
    }
}

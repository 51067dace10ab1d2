//! SQL dialects and their capability tables.
//!
//! All per-dialect knowledge lives here as static membership tables. Codecs
//! never compare dialects inline; they ask `dialect.supports(Feature::X)` so
//! the dialect snapshot stays centralized and testable on its own.

use serde::{Deserialize, Serialize};

/// A SQL database product family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Postgres,
    MySql,
    MariaDb,
    Sqlite,
    SqlServer,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::MariaDb => write!(f, "mariadb"),
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::SqlServer => write!(f, "sqlserver"),
        }
    }
}

/// A dialect capability consulted by codecs to select behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Has a native UUID column type; otherwise UUIDs travel as varchar(36).
    NativeUuid,
    /// Has native array values; otherwise inline arrays render as a row list
    /// and array binds fail.
    NativeArray,
    /// Array literals need an explicit `::elem[]` cast suffix.
    ArrayCast,
    /// Enum literals and placeholders need a `::schema.name` cast.
    EnumCast,
    /// Has named composite/record types; otherwise record binds fail.
    StructuredRecords,
    /// No boolean wire type; booleans travel through the integer slot.
    BooleanAsInteger,
    /// No exact decimal wire type; decimals travel as text to avoid f64 loss.
    DecimalAsText,
    /// `cast('NaN' as float)` is valid; otherwise NaN needs an expression.
    NativeNanLiteral,
    /// Has a native interval type; otherwise intervals travel as varchar.
    NativeInterval,
    /// Supports `DATE '...'` / `TIMESTAMP '...'` keyword literals.
    TypedTemporalLiterals,
    /// String literals treat backslash as an escape character.
    BackslashEscapes,
    /// JSON literals use `CAST(... AS JSON)` rather than a `::` cast.
    JsonCastFunction,
    /// The dialect infers bare literal types, so Auto cast mode can skip
    /// casting outside the per-family overrides.
    InferredParamTypes,
}

use Dialect::*;

const NATIVE_UUID: &[Dialect] = &[Postgres];
const NATIVE_ARRAY: &[Dialect] = &[Postgres];
const ARRAY_CAST: &[Dialect] = &[Postgres];
const ENUM_CAST: &[Dialect] = &[Postgres];
const STRUCTURED_RECORDS: &[Dialect] = &[Postgres];
const BOOLEAN_AS_INTEGER: &[Dialect] = &[Sqlite, SqlServer];
const DECIMAL_AS_TEXT: &[Dialect] = &[Sqlite];
const NATIVE_NAN_LITERAL: &[Dialect] = &[Postgres];
const NATIVE_INTERVAL: &[Dialect] = &[Postgres];
const TYPED_TEMPORAL_LITERALS: &[Dialect] = &[Postgres, MySql, MariaDb, SqlServer];
const BACKSLASH_ESCAPES: &[Dialect] = &[MySql, MariaDb];
const JSON_CAST_FUNCTION: &[Dialect] = &[MySql, MariaDb];
const INFERRED_PARAM_TYPES: &[Dialect] = &[Postgres, MySql, MariaDb, Sqlite, SqlServer];

impl Dialect {
    /// Capability membership test. The tables are a snapshot of observed
    /// driver behavior, not something to re-derive per release.
    pub fn supports(self, feature: Feature) -> bool {
        let table = match feature {
            Feature::NativeUuid => NATIVE_UUID,
            Feature::NativeArray => NATIVE_ARRAY,
            Feature::ArrayCast => ARRAY_CAST,
            Feature::EnumCast => ENUM_CAST,
            Feature::StructuredRecords => STRUCTURED_RECORDS,
            Feature::BooleanAsInteger => BOOLEAN_AS_INTEGER,
            Feature::DecimalAsText => DECIMAL_AS_TEXT,
            Feature::NativeNanLiteral => NATIVE_NAN_LITERAL,
            Feature::NativeInterval => NATIVE_INTERVAL,
            Feature::TypedTemporalLiterals => TYPED_TEMPORAL_LITERALS,
            Feature::BackslashEscapes => BACKSLASH_ESCAPES,
            Feature::JsonCastFunction => JSON_CAST_FUNCTION,
            Feature::InferredParamTypes => INFERRED_PARAM_TYPES,
        };
        table.contains(&self)
    }

    /// The parameter marker for a 1-based index.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::SqlServer => format!("@P{}", index),
            Dialect::MySql | Dialect::MariaDb | Dialect::Sqlite => "?".to_string(),
        }
    }

    /// Escape a string literal body for this dialect. Single quotes double;
    /// backslash-escaping dialects also double backslashes.
    pub fn escape_string(self, s: &str) -> String {
        let quoted = s.replace('\'', "''");
        if self.supports(Feature::BackslashEscapes) {
            quoted.replace('\\', "\\\\")
        } else {
            quoted
        }
    }
}

/// Whether a value of the given type still needs an inline cast in Auto
/// mode. Interval, JSON-family, UUID and enum literals are ambiguous on
/// Postgres even though it infers most other literal types.
pub fn needs_inline_cast(dialect: Dialect, ty: &crate::datatype::DataType) -> bool {
    use crate::datatype::DataType;
    if !dialect.supports(Feature::InferredParamTypes) {
        return true;
    }
    match ty {
        DataType::IntervalDayToSecond | DataType::IntervalYearToMonth => {
            dialect.supports(Feature::NativeInterval)
        }
        DataType::Json | DataType::Jsonb | DataType::Xml => dialect == Dialect::Postgres,
        DataType::Uuid => dialect.supports(Feature::NativeUuid),
        DataType::Enum(_) => dialect.supports(Feature::EnumCast),
        DataType::Record(_) => dialect.supports(Feature::StructuredRecords),
        DataType::Array(elem) => {
            dialect.supports(Feature::ArrayCast) && needs_inline_cast(dialect, elem)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_tables() {
        assert!(Postgres.supports(Feature::NativeUuid));
        assert!(!MySql.supports(Feature::NativeUuid));
        assert!(Sqlite.supports(Feature::BooleanAsInteger));
        assert!(!Postgres.supports(Feature::BooleanAsInteger));
        assert!(MySql.supports(Feature::BackslashEscapes));
        assert!(!Sqlite.supports(Feature::TypedTemporalLiterals));
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(Postgres.escape_string("it's"), "it''s");
        assert_eq!(MySql.escape_string(r"a\b'c"), r"a\\b''c");
    }

    #[test]
    fn test_display() {
        assert_eq!(Dialect::SqlServer.to_string(), "sqlserver");
    }
}

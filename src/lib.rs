//! Typed SQL value binding for multiple dialects.
//!
//! Values are classified once into a dialect-neutral [`DataType`], then a
//! per-type codec carries them across the four driver boundaries: inline SQL
//! text, placeholder binds, result reads and OUT-parameter reads.
//!
//! ```ignore
//! use sqlbind::prelude::*;
//! let codec = codec_for(&SqlValue::from(42).data_type());
//! ```
//!
//! [`DataType`]: datatype::DataType

pub mod codec;
pub mod composite;
pub mod context;
pub mod convert;
pub mod datatype;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod interval;
pub mod value;

pub use codec::{codec_for, resolve, Codec, DelegatingCodec};
pub use datatype::DataType;
pub use dialect::Dialect;
pub use error::{BindError, BindResult};
pub use value::SqlValue;

pub mod prelude {
    pub use crate::codec::{codec_for, resolve, Codec, DelegatingCodec};
    pub use crate::context::{BindContext, CastMode, FetchContext, RenderContext};
    pub use crate::convert::{chain, Convert, Identity};
    pub use crate::datatype::{DataType, EnumType, RecordType};
    pub use crate::dialect::{Dialect, Feature};
    pub use crate::error::{BindError, BindResult};
    pub use crate::interval::{DayToSecond, YearToMonth};
    pub use crate::value::{EnumValue, RecordValue, SqlValue};
}

//! Transfer contexts passed into every codec operation.
//!
//! A context borrows the active driver handle for the duration of one call;
//! codecs never retain it. Nothing here is owned by the codec layer.

use crate::dialect::Dialect;
use crate::driver::{Row, Statement};

/// Global inline-cast policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CastMode {
    /// Never emit casts. Rendering the same value twice is byte-identical.
    Never,
    /// Cast every inline value with its dialect type name.
    Always,
    /// Cast only where the dialect cannot infer the literal's type.
    #[default]
    Auto,
}

/// Context for inline-literal and placeholder rendering.
pub struct RenderContext<'a> {
    pub dialect: Dialect,
    pub cast_mode: CastMode,
    /// 1-based index of the parameter being rendered, used for
    /// positional placeholder markers.
    pub param_index: usize,
    pub sql: &'a mut String,
}

impl<'a> RenderContext<'a> {
    pub fn new(dialect: Dialect, cast_mode: CastMode, sql: &'a mut String) -> Self {
        Self {
            dialect,
            cast_mode,
            param_index: 1,
            sql,
        }
    }

    pub fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }
}

/// Context for writing one prepared-statement parameter.
pub struct BindContext<'a> {
    pub dialect: Dialect,
    pub index: usize,
    pub stmt: &'a mut dyn Statement,
}

impl<'a> BindContext<'a> {
    pub fn new(dialect: Dialect, index: usize, stmt: &'a mut dyn Statement) -> Self {
        Self {
            dialect,
            index,
            stmt,
        }
    }
}

/// Context for reading one result column or OUT parameter.
pub struct FetchContext<'a> {
    pub dialect: Dialect,
    pub index: usize,
    pub row: &'a mut dyn Row,
}

impl<'a> FetchContext<'a> {
    pub fn new(dialect: Dialect, index: usize, row: &'a mut dyn Row) -> Self {
        Self {
            dialect,
            index,
            row,
        }
    }
}

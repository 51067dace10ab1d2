//! Driver-level transfer traits and the in-memory emulated driver.
//!
//! The traits are the narrow seam between codecs and a concrete database
//! driver: a prepared-statement slot writer, a row/OUT-parameter reader, and
//! the sequential record streams used for structured UDT transfer. Indices
//! are 1-based and assigned by the caller; the codec layer neither allocates
//! nor deduplicates them.
//!
//! The `mem` driver backs the test suite: statements written through it can
//! be replayed as rows, emulating a write-then-read-back cycle without a
//! server.

use rust_decimal::Decimal;

use crate::error::{BindError, BindResult};

/// Writer side of a prepared statement.
pub trait Statement {
    fn set_null(&mut self, index: usize, type_code: i32) -> BindResult<()>;
    fn set_bool(&mut self, index: usize, v: bool) -> BindResult<()>;
    fn set_i64(&mut self, index: usize, v: i64) -> BindResult<()>;
    fn set_f64(&mut self, index: usize, v: f64) -> BindResult<()>;
    fn set_decimal(&mut self, index: usize, v: Decimal) -> BindResult<()>;
    fn set_str(&mut self, index: usize, v: &str) -> BindResult<()>;
    fn set_bytes(&mut self, index: usize, v: &[u8]) -> BindResult<()>;
}

/// Reader side of a result row or OUT-parameter set.
///
/// The primitive getters return a zero value on SQL NULL and set the
/// was-null flag; callers must check `was_null` after every primitive read.
/// This conflation is how real drivers behave and is reproduced on purpose.
pub trait Row {
    fn get_bool(&mut self, index: usize) -> BindResult<bool>;
    fn get_i64(&mut self, index: usize) -> BindResult<i64>;
    fn get_f64(&mut self, index: usize) -> BindResult<f64>;
    fn get_decimal(&mut self, index: usize) -> BindResult<Option<Decimal>>;
    fn get_str(&mut self, index: usize) -> BindResult<Option<String>>;
    fn get_bytes(&mut self, index: usize) -> BindResult<Option<Vec<u8>>>;
    /// Whether the most recent get on this row hit SQL NULL.
    fn was_null(&self) -> bool;
}

/// Sequential writer for structured UDT member transfer.
pub trait RecordWriter {
    fn write_null(&mut self, type_code: i32) -> BindResult<()>;
    fn write_bool(&mut self, v: bool) -> BindResult<()>;
    fn write_i64(&mut self, v: i64) -> BindResult<()>;
    fn write_f64(&mut self, v: f64) -> BindResult<()>;
    fn write_decimal(&mut self, v: Decimal) -> BindResult<()>;
    fn write_str(&mut self, v: &str) -> BindResult<()>;
    fn write_bytes(&mut self, v: &[u8]) -> BindResult<()>;
}

/// Sequential reader for structured UDT member transfer. Same was-null
/// discipline as `Row`.
pub trait RecordReader {
    fn read_bool(&mut self) -> BindResult<bool>;
    fn read_i64(&mut self) -> BindResult<i64>;
    fn read_f64(&mut self) -> BindResult<f64>;
    fn read_decimal(&mut self) -> BindResult<Option<Decimal>>;
    fn read_str(&mut self) -> BindResult<Option<String>>;
    fn read_bytes(&mut self) -> BindResult<Option<Vec<u8>>>;
    fn was_null(&self) -> bool;
}

pub mod mem {
    //! In-memory driver emulation.

    use super::*;

    /// One driver-level slot value.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Slot {
        /// NULL with the driver type code it was registered under.
        Null(i32),
        Bool(bool),
        Int(i64),
        Float(f64),
        Decimal(Decimal),
        Text(String),
        Bytes(Vec<u8>),
    }

    /// A prepared statement whose slots live in memory.
    #[derive(Debug, Default)]
    pub struct MemStatement {
        slots: Vec<Option<Slot>>,
    }

    impl MemStatement {
        pub fn new() -> Self {
            Self::default()
        }

        fn put(&mut self, index: usize, slot: Slot) -> BindResult<()> {
            if index == 0 {
                return Err(BindError::Driver("parameter indices are 1-based".into()));
            }
            if self.slots.len() < index {
                self.slots.resize(index, None);
            }
            self.slots[index - 1] = Some(slot);
            Ok(())
        }

        /// Replay the written parameters as a result row, emulating an
        /// INSERT followed by a SELECT of the same values.
        pub fn into_row(self) -> MemRow {
            MemRow {
                slots: self.slots,
                was_null: false,
            }
        }
    }

    impl Statement for MemStatement {
        fn set_null(&mut self, index: usize, type_code: i32) -> BindResult<()> {
            self.put(index, Slot::Null(type_code))
        }

        fn set_bool(&mut self, index: usize, v: bool) -> BindResult<()> {
            self.put(index, Slot::Bool(v))
        }

        fn set_i64(&mut self, index: usize, v: i64) -> BindResult<()> {
            self.put(index, Slot::Int(v))
        }

        fn set_f64(&mut self, index: usize, v: f64) -> BindResult<()> {
            self.put(index, Slot::Float(v))
        }

        fn set_decimal(&mut self, index: usize, v: Decimal) -> BindResult<()> {
            self.put(index, Slot::Decimal(v))
        }

        fn set_str(&mut self, index: usize, v: &str) -> BindResult<()> {
            self.put(index, Slot::Text(v.to_string()))
        }

        fn set_bytes(&mut self, index: usize, v: &[u8]) -> BindResult<()> {
            self.put(index, Slot::Bytes(v.to_vec()))
        }
    }

    /// A result row over in-memory slots.
    #[derive(Debug)]
    pub struct MemRow {
        slots: Vec<Option<Slot>>,
        was_null: bool,
    }

    impl MemRow {
        /// Fabricate a row directly, the way tests fabricate driver output.
        pub fn new(slots: Vec<Slot>) -> Self {
            Self {
                slots: slots.into_iter().map(Some).collect(),
                was_null: false,
            }
        }

        fn slot(&self, index: usize) -> BindResult<&Slot> {
            self.slots
                .get(index.wrapping_sub(1))
                .and_then(Option::as_ref)
                .ok_or_else(|| BindError::Driver(format!("no value at index {}", index)))
        }

        fn mismatch(&self, index: usize, wanted: &str) -> BindError {
            BindError::Driver(format!(
                "slot {} holds {:?}, wanted {}",
                index,
                self.slots.get(index - 1),
                wanted
            ))
        }
    }

    impl Row for MemRow {
        // The getters clone the slot out first so the was-null flag can be
        // written while the match arms run.
        fn get_bool(&mut self, index: usize) -> BindResult<bool> {
            let slot = self.slot(index)?.clone();
            match slot {
                Slot::Bool(v) => {
                    self.was_null = false;
                    Ok(v)
                }
                // Drivers surface integer-bound booleans through the int slot.
                Slot::Int(v) => {
                    self.was_null = false;
                    Ok(v != 0)
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(false)
                }
                _ => Err(self.mismatch(index, "bool")),
            }
        }

        fn get_i64(&mut self, index: usize) -> BindResult<i64> {
            let slot = self.slot(index)?.clone();
            match slot {
                Slot::Int(v) => {
                    self.was_null = false;
                    Ok(v)
                }
                Slot::Bool(v) => {
                    self.was_null = false;
                    Ok(v as i64)
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(0)
                }
                _ => Err(self.mismatch(index, "i64")),
            }
        }

        fn get_f64(&mut self, index: usize) -> BindResult<f64> {
            let slot = self.slot(index)?.clone();
            match slot {
                Slot::Float(v) => {
                    self.was_null = false;
                    Ok(v)
                }
                Slot::Int(v) => {
                    self.was_null = false;
                    Ok(v as f64)
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(0.0)
                }
                _ => Err(self.mismatch(index, "f64")),
            }
        }

        fn get_decimal(&mut self, index: usize) -> BindResult<Option<Decimal>> {
            let slot = self.slot(index)?.clone();
            match slot {
                Slot::Decimal(v) => {
                    self.was_null = false;
                    Ok(Some(v))
                }
                Slot::Int(v) => {
                    self.was_null = false;
                    Ok(Some(Decimal::from(v)))
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(None)
                }
                _ => Err(self.mismatch(index, "decimal")),
            }
        }

        fn get_str(&mut self, index: usize) -> BindResult<Option<String>> {
            // Text reads coerce, like driver getString does.
            let slot = self.slot(index)?.clone();
            let s = match slot {
                Slot::Text(s) => s,
                Slot::Int(v) => v.to_string(),
                Slot::Float(v) => v.to_string(),
                Slot::Decimal(v) => v.to_string(),
                Slot::Bool(v) => v.to_string(),
                Slot::Null(_) => {
                    self.was_null = true;
                    return Ok(None);
                }
                Slot::Bytes(_) => return Err(self.mismatch(index, "text")),
            };
            self.was_null = false;
            Ok(Some(s))
        }

        fn get_bytes(&mut self, index: usize) -> BindResult<Option<Vec<u8>>> {
            let slot = self.slot(index)?.clone();
            match slot {
                Slot::Bytes(b) => {
                    self.was_null = false;
                    Ok(Some(b))
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(None)
                }
                _ => Err(self.mismatch(index, "bytes")),
            }
        }

        fn was_null(&self) -> bool {
            self.was_null
        }
    }

    /// A structured record stream: writes append, reads advance a cursor.
    #[derive(Debug, Default)]
    pub struct MemRecord {
        slots: Vec<Slot>,
        pos: usize,
        was_null: bool,
    }

    impl MemRecord {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn from_slots(slots: Vec<Slot>) -> Self {
            Self {
                slots,
                pos: 0,
                was_null: false,
            }
        }

        pub fn slots(&self) -> &[Slot] {
            &self.slots
        }

        fn next(&mut self) -> BindResult<Slot> {
            let slot = self
                .slots
                .get(self.pos)
                .cloned()
                .ok_or_else(|| BindError::Driver("record stream exhausted".into()))?;
            self.pos += 1;
            Ok(slot)
        }
    }

    impl RecordWriter for MemRecord {
        fn write_null(&mut self, type_code: i32) -> BindResult<()> {
            self.slots.push(Slot::Null(type_code));
            Ok(())
        }

        fn write_bool(&mut self, v: bool) -> BindResult<()> {
            self.slots.push(Slot::Bool(v));
            Ok(())
        }

        fn write_i64(&mut self, v: i64) -> BindResult<()> {
            self.slots.push(Slot::Int(v));
            Ok(())
        }

        fn write_f64(&mut self, v: f64) -> BindResult<()> {
            self.slots.push(Slot::Float(v));
            Ok(())
        }

        fn write_decimal(&mut self, v: Decimal) -> BindResult<()> {
            self.slots.push(Slot::Decimal(v));
            Ok(())
        }

        fn write_str(&mut self, v: &str) -> BindResult<()> {
            self.slots.push(Slot::Text(v.to_string()));
            Ok(())
        }

        fn write_bytes(&mut self, v: &[u8]) -> BindResult<()> {
            self.slots.push(Slot::Bytes(v.to_vec()));
            Ok(())
        }
    }

    impl RecordReader for MemRecord {
        fn read_bool(&mut self) -> BindResult<bool> {
            match self.next()? {
                Slot::Bool(v) => {
                    self.was_null = false;
                    Ok(v)
                }
                Slot::Int(v) => {
                    self.was_null = false;
                    Ok(v != 0)
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(false)
                }
                other => Err(BindError::Driver(format!("record slot {:?}, wanted bool", other))),
            }
        }

        fn read_i64(&mut self) -> BindResult<i64> {
            match self.next()? {
                Slot::Int(v) => {
                    self.was_null = false;
                    Ok(v)
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(0)
                }
                other => Err(BindError::Driver(format!("record slot {:?}, wanted i64", other))),
            }
        }

        fn read_f64(&mut self) -> BindResult<f64> {
            match self.next()? {
                Slot::Float(v) => {
                    self.was_null = false;
                    Ok(v)
                }
                Slot::Int(v) => {
                    self.was_null = false;
                    Ok(v as f64)
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(0.0)
                }
                other => Err(BindError::Driver(format!("record slot {:?}, wanted f64", other))),
            }
        }

        fn read_decimal(&mut self) -> BindResult<Option<Decimal>> {
            match self.next()? {
                Slot::Decimal(v) => {
                    self.was_null = false;
                    Ok(Some(v))
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(None)
                }
                other => Err(BindError::Driver(format!(
                    "record slot {:?}, wanted decimal",
                    other
                ))),
            }
        }

        fn read_str(&mut self) -> BindResult<Option<String>> {
            let s = match self.next()? {
                Slot::Text(s) => s,
                Slot::Int(v) => v.to_string(),
                Slot::Float(v) => v.to_string(),
                Slot::Decimal(v) => v.to_string(),
                Slot::Bool(v) => v.to_string(),
                Slot::Null(_) => {
                    self.was_null = true;
                    return Ok(None);
                }
                other => {
                    return Err(BindError::Driver(format!(
                        "record slot {:?}, wanted text",
                        other
                    )));
                }
            };
            self.was_null = false;
            Ok(Some(s))
        }

        fn read_bytes(&mut self) -> BindResult<Option<Vec<u8>>> {
            match self.next()? {
                Slot::Bytes(b) => {
                    self.was_null = false;
                    Ok(Some(b))
                }
                Slot::Null(_) => {
                    self.was_null = true;
                    Ok(None)
                }
                other => Err(BindError::Driver(format!(
                    "record slot {:?}, wanted bytes",
                    other
                ))),
            }
        }

        fn was_null(&self) -> bool {
            self.was_null
        }
    }

}

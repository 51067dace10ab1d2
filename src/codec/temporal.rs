//! Date, time and timestamp codecs.
//!
//! Driver output format varies by database and driver version, so reads go
//! through a hand-rolled lenient parser: one left-to-right pass over
//! explicit character positions, no format probing. It accepts `Z` or a
//! numeric offset, a missing colon between offset hours and minutes, a
//! single-digit offset hour, a trailing offset-seconds component, and a
//! `BC`/`AD` era suffix (BC negates the year, calendar types having no
//! negative-year literal of their own).

use std::sync::Arc;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc,
};

use super::{render_null, should_cast, type_mismatch, with_cast, Codec, DelegatingCodec};
use crate::context::{BindContext, FetchContext, RenderContext};
use crate::convert::Convert;
use crate::datatype::DataType;
use crate::dialect::{Dialect, Feature};
use crate::driver::{RecordReader, RecordWriter};
use crate::error::{BindError, BindResult};
use crate::value::SqlValue;

// ---------------------------------------------------------------- formatting

fn fmt_ymd(y: i32, m: u32, d: u32) -> String {
    let shown = if y <= 0 { -y } else { y };
    format!("{:04}-{:02}-{:02}", shown, m, d)
}

pub fn fmt_date(d: &NaiveDate) -> String {
    let mut s = fmt_ymd(d.year(), d.month(), d.day());
    if d.year() <= 0 {
        s.push_str(" BC");
    }
    s
}

pub fn fmt_time(t: &NaiveTime) -> String {
    let mut s = format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second());
    let nanos = t.nanosecond();
    if nanos > 0 {
        let frac = format!("{:09}", nanos);
        s.push('.');
        s.push_str(frac.trim_end_matches('0'));
    }
    s
}

pub fn fmt_timestamp(ts: &NaiveDateTime) -> String {
    // The era suffix goes last, after the clock part.
    let mut s = format!(
        "{} {}",
        fmt_ymd(ts.year(), ts.month(), ts.day()),
        fmt_time(&ts.time())
    );
    if ts.year() <= 0 {
        s.push_str(" BC");
    }
    s
}

pub fn fmt_timestamp_tz(ts: &DateTime<FixedOffset>) -> String {
    // Offset sits between the clock and the era suffix, matching the read
    // grammar. Offsets with a seconds component keep it.
    let naive = ts.naive_local();
    let mut s = format!(
        "{} {}",
        fmt_ymd(naive.year(), naive.month(), naive.day()),
        fmt_time(&naive.time())
    );
    let secs = ts.offset().local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.unsigned_abs();
    s.push(sign);
    s.push_str(&format!("{:02}:{:02}", abs / 3600, (abs % 3600) / 60));
    if abs % 60 != 0 {
        s.push_str(&format!(":{:02}", abs % 60));
    }
    if naive.year() <= 0 {
        s.push_str(" BC");
    }
    s
}

// ------------------------------------------------------------------- parsing

struct Cursor<'a> {
    b: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            b: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.b.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: u8) -> Result<(), ()> {
        if self.eat(c) { Ok(()) } else { Err(()) }
    }

    /// Consume `min..=max` ASCII digits.
    fn digits(&mut self, min: usize, max: usize) -> Result<i64, ()> {
        let start = self.pos;
        while self.pos - start < max && self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let n = self.pos - start;
        if n < min {
            return Err(());
        }
        let mut v = 0i64;
        for &b in &self.b[start..self.pos] {
            v = v * 10 + (b - b'0') as i64;
        }
        Ok(v)
    }

    /// Fractional seconds in nanoseconds, right-padded.
    fn fraction(&mut self) -> Result<u32, ()> {
        let start = self.pos;
        let raw = self.digits(1, 9)?;
        let mut nanos = raw as u32;
        for _ in (self.pos - start)..9 {
            nanos *= 10;
        }
        Ok(nanos)
    }

    fn done(&self) -> bool {
        self.pos == self.b.len()
    }
}

fn parse_date_at(c: &mut Cursor<'_>) -> Result<(i32, u32, u32), ()> {
    let year = c.digits(1, 6)? as i32;
    c.expect(b'-')?;
    let month = c.digits(1, 2)? as u32;
    c.expect(b'-')?;
    let day = c.digits(1, 2)? as u32;
    Ok((year, month, day))
}

fn parse_clock_at(c: &mut Cursor<'_>) -> Result<(u32, u32, u32, u32), ()> {
    let hour = c.digits(1, 2)? as u32;
    c.expect(b':')?;
    let minute = c.digits(2, 2)? as u32;
    c.expect(b':')?;
    let second = c.digits(2, 2)? as u32;
    let nanos = if c.eat(b'.') { c.fraction()? } else { 0 };
    Ok((hour, minute, second, nanos))
}

/// Offset grammar: `Z`, or sign + 1-2 digit hours, then optionally
/// (with or without `:`) 2-digit minutes, then optionally the same for
/// seconds. Returns total seconds east.
fn parse_offset_at(c: &mut Cursor<'_>) -> Result<Option<i32>, ()> {
    if c.eat(b'Z') || c.eat(b'z') {
        return Ok(Some(0));
    }
    let sign = if c.eat(b'+') {
        1
    } else if c.eat(b'-') {
        -1
    } else {
        return Ok(None);
    };
    let hours = c.digits(1, 2)? as i32;
    let mut total = hours * 3600;
    let colon = c.eat(b':');
    if c.peek().is_some_and(|b| b.is_ascii_digit()) {
        total += c.digits(2, 2)? as i32 * 60;
        let colon2 = c.eat(b':');
        if c.peek().is_some_and(|b| b.is_ascii_digit()) {
            total += c.digits(2, 2)? as i32;
        } else if colon2 {
            return Err(());
        }
    } else if colon {
        return Err(());
    }
    Ok(Some(sign * total))
}

/// Trailing ` BC` / ` AD` era marker. BC negates the year.
fn parse_era_at(c: &mut Cursor<'_>, year: i32) -> Result<i32, ()> {
    if c.eat(b' ') {
        if c.eat(b'B') {
            c.expect(b'C')?;
            Ok(-year)
        } else if c.eat(b'A') {
            c.expect(b'D')?;
            Ok(year)
        } else {
            Err(())
        }
    } else {
        Ok(year)
    }
}

/// Parse a date with optional era suffix.
pub fn parse_date(s: &str) -> BindResult<NaiveDate> {
    let malformed = || BindError::malformed("date", s);
    let mut c = Cursor::new(s.trim());
    let (year, month, day) = parse_date_at(&mut c).map_err(|_| malformed())?;
    let year = parse_era_at(&mut c, year).map_err(|_| malformed())?;
    if !c.done() {
        return Err(malformed());
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

/// Parse a time-of-day with optional fraction.
pub fn parse_time(s: &str) -> BindResult<NaiveTime> {
    let malformed = || BindError::malformed("time", s);
    let mut c = Cursor::new(s.trim());
    let (h, m, sec, nanos) = parse_clock_at(&mut c).map_err(|_| malformed())?;
    if !c.done() {
        return Err(malformed());
    }
    NaiveTime::from_hms_nano_opt(h, m, sec, nanos).ok_or_else(malformed)
}

/// One pass over the full timestamp grammar. The offset is `None` when the
/// string carries none.
fn parse_timestamp_parts(s: &str) -> Result<(NaiveDateTime, Option<i32>), ()> {
    let mut c = Cursor::new(s.trim());
    let (year, month, day) = parse_date_at(&mut c)?;
    if !(c.eat(b' ') || c.eat(b'T')) {
        return Err(());
    }
    let (h, m, sec, nanos) = parse_clock_at(&mut c)?;
    let offset = parse_offset_at(&mut c)?;
    let year = parse_era_at(&mut c, year)?;
    if !c.done() {
        return Err(());
    }
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(())?;
    let time = NaiveTime::from_hms_nano_opt(h, m, sec, nanos).ok_or(())?;
    Ok((date.and_time(time), offset))
}

/// Parse a timestamp without time zone. A present offset is ignored.
pub fn parse_timestamp(s: &str) -> BindResult<NaiveDateTime> {
    parse_timestamp_parts(s)
        .map(|(naive, _)| naive)
        .map_err(|_| BindError::malformed("timestamp", s))
}

/// Parse a timestamp with time zone. A missing offset reads as UTC.
pub fn parse_timestamp_tz(s: &str) -> BindResult<DateTime<FixedOffset>> {
    let malformed = || BindError::malformed("timestamp with time zone", s);
    let (naive, offset) = parse_timestamp_parts(s).map_err(|_| malformed())?;
    let offset = FixedOffset::east_opt(offset.unwrap_or(0)).ok_or_else(malformed)?;
    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(malformed)
}

// -------------------------------------------------------------------- codecs

/// Render a temporal literal: keyword form where the dialect has typed
/// literals and no cast applies, otherwise a cast-wrapped plain string.
fn render_temporal(
    ctx: &mut RenderContext<'_>,
    ty: &DataType,
    keyword: &str,
    body: &str,
) -> BindResult<()> {
    if should_cast(ctx, ty) {
        return with_cast(ctx, ty, |ctx| {
            ctx.push("'");
            ctx.push(body);
            ctx.push("'");
            Ok(())
        });
    }
    if ctx.dialect.supports(Feature::TypedTemporalLiterals) {
        ctx.push(keyword);
        ctx.push(" ");
    }
    ctx.push("'");
    ctx.push(body);
    ctx.push("'");
    Ok(())
}

macro_rules! temporal_codec {
    ($name:ident, $ty:ident, $variant:ident, $rust:ty, $keyword:expr,
     $fmt:path, $parse:path) => {
        pub struct $name;

        impl $name {
            fn unwrap(value: &SqlValue) -> BindResult<&$rust> {
                match value {
                    SqlValue::$variant(v) => Ok(v),
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
                let body = $fmt(Self::unwrap(value)?);
                render_temporal(ctx, &DataType::$ty, $keyword, &body)
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
                ctx.stmt.set_str(ctx.index, &$fmt(Self::unwrap(value)?))
            }

            fn get_result(&self, ctx: &mut FetchContext<'_>) -> BindResult<SqlValue> {
                match ctx.row.get_str(ctx.index)? {
                    Some(s) => Ok(SqlValue::$variant($parse(&s)?)),
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
                w.write_str(&$fmt(Self::unwrap(value)?))
            }

            fn read_field(
                &self,
                r: &mut dyn RecordReader,
                _dialect: Dialect,
            ) -> BindResult<SqlValue> {
                match r.read_str()? {
                    Some(s) => Ok(SqlValue::$variant($parse(&s)?)),
                    None => Ok(SqlValue::Null(DataType::$ty)),
                }
            }
        }
    };
}

temporal_codec!(DateCodec, Date, Date, NaiveDate, "DATE", fmt_date, parse_date);
temporal_codec!(TimeCodec, Time, Time, NaiveTime, "TIME", fmt_time, parse_time);
temporal_codec!(
    TimestampCodec,
    Timestamp,
    Timestamp,
    NaiveDateTime,
    "TIMESTAMP",
    fmt_timestamp,
    parse_timestamp
);
temporal_codec!(
    TimestampTzCodec,
    TimestampTz,
    TimestampTz,
    DateTime<FixedOffset>,
    "TIMESTAMP WITH TIME ZONE",
    fmt_timestamp_tz,
    parse_timestamp_tz
);

/// Normalizes offset timestamps to UTC on the way out of the wire. Layered
/// over [`TimestampTzCodec`] this gives a `DateTime<Utc>`-semantics codec
/// without touching the wire type.
pub struct UtcNormalize;

impl Convert for UtcNormalize {
    fn to_wire(&self, user: &SqlValue) -> BindResult<SqlValue> {
        Ok(user.clone())
    }

    fn from_wire(&self, wire: SqlValue) -> BindResult<SqlValue> {
        match wire {
            SqlValue::TimestampTz(ts) => {
                Ok(SqlValue::TimestampTz(ts.with_timezone(&Utc).fixed_offset()))
            }
            other => Ok(other),
        }
    }
}

/// A timestamp-with-time-zone codec that yields UTC-normalized values.
pub fn timestamp_tz_utc() -> DelegatingCodec {
    DelegatingCodec::new(Box::new(TimestampTzCodec), Arc::new(UtcNormalize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_leniency() {
        let expect = parse_timestamp_tz("2024-01-05 10:20:30+02:00").unwrap();
        for s in [
            "2024-01-05 10:20:30+2",
            "2024-01-05 10:20:30+02",
            "2024-01-05 10:20:30+0200",
            "2024-01-05T10:20:30+02:00",
            "2024-01-05 08:20:30Z",
        ] {
            let parsed = parse_timestamp_tz(s).unwrap();
            assert_eq!(parsed, expect, "{}", s);
        }
    }

    #[test]
    fn test_offset_with_seconds() {
        let parsed = parse_timestamp_tz("2024-01-05 10:20:30+02:00:30").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600 + 30);
        // The seconds component survives a format round-trip.
        assert_eq!(fmt_timestamp_tz(&parsed), "2024-01-05 10:20:30+02:00:30");
        assert_eq!(parse_timestamp_tz(&fmt_timestamp_tz(&parsed)).unwrap(), parsed);
    }

    #[test]
    fn test_bc_era_negates_year() {
        let d = parse_date("0044-03-15 BC").unwrap();
        assert!(d.year() <= 0);
        assert_eq!(d.year(), -44);

        let ts = parse_timestamp("0044-03-15 12:00:00 BC").unwrap();
        assert_eq!(ts.year(), -44);

        let ad = parse_date("2024-01-05 AD").unwrap();
        assert_eq!(ad.year(), 2024);
    }

    #[test]
    fn test_fraction() {
        let t = parse_time("10:20:30.5").unwrap();
        assert_eq!(t.nanosecond(), 500_000_000);
        let ts = parse_timestamp("2024-01-05 10:20:30.123456789").unwrap();
        assert_eq!(ts.and_utc().timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_malformed_is_hard_failure() {
        assert!(parse_timestamp_tz("not a timestamp").is_err());
        assert!(parse_timestamp_tz("2024-01-05 10:20:30+02:").is_err());
        assert!(parse_date("2024-13-40").is_err());
        assert!(parse_timestamp("2024-01-05 10:20:30 XY").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        let ts = parse_timestamp_tz("2024-01-05 10:20:30.25+05:30").unwrap();
        assert_eq!(fmt_timestamp_tz(&ts), "2024-01-05 10:20:30.25+05:30");
        assert_eq!(parse_timestamp_tz(&fmt_timestamp_tz(&ts)).unwrap(), ts);
    }

    #[test]
    fn test_bc_format_round_trip() {
        let d = parse_date("0044-03-15 BC").unwrap();
        assert_eq!(fmt_date(&d), "0044-03-15 BC");
        assert_eq!(parse_date(&fmt_date(&d)).unwrap(), d);
    }

    #[test]
    fn test_bc_timestamp_tz_format_round_trip() {
        let ts = parse_timestamp_tz("0043-01-05 10:20:30+02:00 BC").unwrap();
        assert_eq!(ts.year(), -43);
        assert_eq!(fmt_timestamp_tz(&ts), "0043-01-05 10:20:30+02:00 BC");
        assert_eq!(parse_timestamp_tz(&fmt_timestamp_tz(&ts)).unwrap(), ts);
    }

    #[test]
    fn test_utc_normalizing_delegation() {
        use crate::context::CastMode;
        use crate::driver::mem::{MemRow, Slot};

        let codec = timestamp_tz_utc();
        let mut row = MemRow::new(vec![Slot::Text("2024-01-05 10:20:30+02:00".into())]);
        let mut ctx = FetchContext::new(Dialect::Postgres, 1, &mut row);
        match codec.get_result(&mut ctx).unwrap() {
            SqlValue::TimestampTz(ts) => {
                assert_eq!(ts.offset().local_minus_utc(), 0);
                assert_eq!(fmt_timestamp_tz(&ts), "2024-01-05 08:20:30+00:00");
            }
            other => panic!("unexpected {:?}", other),
        }

        // Wire type and rendering pass through unchanged.
        assert_eq!(codec.data_type(), DataType::TimestampTz);
        let mut sql = String::new();
        let mut ctx = RenderContext::new(Dialect::Sqlite, CastMode::Never, &mut sql);
        codec
            .render_inline(
                &mut ctx,
                &SqlValue::TimestampTz(parse_timestamp_tz("2024-01-05 10:20:30Z").unwrap()),
            )
            .unwrap();
        assert_eq!(sql, "'2024-01-05 10:20:30+00:00'");
    }
}

//! Value parsing strategies.
//!
//! Two interchangeable policies turn the raw value text of a record into a
//! number. [`FloatPolicy`] accepts any decimal float. [`FixedPolicy`] relies on
//! every value carrying exactly one fractional digit and accumulates integer
//! tenths instead, converting back only when a report is formatted.

use std::fmt;
use std::ops::Add;

use clap::ValueEnum;

use crate::aggregate::Measure;

/// Numeric strategy selected for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Numeric {
    /// Parse values as decimal floating point
    #[default]
    Float,
    /// Parse one-decimal values into integer tenths
    Fixed,
}

/// Parses the value field of a record.
pub trait NumericPolicy: Send + Sync + 'static {
    type Value: Measure;

    /// Returns `None` when `raw` is not a number this policy accepts.
    fn parse(raw: &[u8]) -> Option<Self::Value>;
}

pub struct FloatPolicy;

impl NumericPolicy for FloatPolicy {
    type Value = f64;

    fn parse(raw: &[u8]) -> Option<f64> {
        let value: f64 = lexical_core::parse(raw.trim_ascii()).ok()?;
        value.is_finite().then_some(value)
    }
}

/// A value stored as an integer count of tenths, so `-16.7` is `Tenths(-167)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tenths(pub i64);

impl Add for Tenths {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Measure for Tenths {
    const SCALE: f64 = 10.0;

    fn to_f64(self) -> f64 {
        self.0 as f64
    }
}

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

pub struct FixedPolicy;

/// Longest accepted value, in digits (`99999.9`). Keeps any i64 sum of
/// accepted values exact for up to 9.2e12 records.
pub const MAX_DIGITS: u32 = 6;

impl NumericPolicy for FixedPolicy {
    type Value = Tenths;

    /// Scans right to left, dropping the decimal point. The position of the
    /// point is not checked: one fractional digit is a precondition.
    fn parse(raw: &[u8]) -> Option<Tenths> {
        let mut value: i64 = 0;
        let mut place: i64 = 1;
        let mut digits = 0;
        for (i, &b) in raw.iter().enumerate().rev() {
            match b {
                b'.' => continue,
                b'-' if i == 0 => return (digits > 0).then_some(Tenths(-value)),
                b'0'..=b'9' if digits < MAX_DIGITS => {
                    value += i64::from(b - b'0') * place;
                    place *= 10;
                    digits += 1;
                }
                _ => return None,
            }
        }
        (digits > 0).then_some(Tenths(value))
    }
}

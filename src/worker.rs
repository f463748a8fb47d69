//! Chunk worker: one pass over a chunk, folded into a private local map.

use clap::ValueEnum;
use tracing::debug;

use crate::error::{Error, Result};
use crate::numeric::NumericPolicy;
use crate::planner::Chunk;
use crate::source::{ByteSource, TERMINATOR};
use crate::table::{observe_into, LocalMap};

pub const SEPARATOR: u8 = b';';

/// Key normalization, fixed for a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum KeyPolicy {
    /// Use the key bytes exactly as they appear
    #[default]
    Verbatim,
    /// Strip surrounding ASCII whitespace from keys
    Trim,
}

impl KeyPolicy {
    #[inline]
    fn apply<'a>(&self, key: &'a [u8]) -> &'a [u8] {
        match self {
            Self::Verbatim => key,
            Self::Trim => key.trim_ascii(),
        }
    }
}

/// Reads `chunk` from `source` and aggregates its records.
pub fn process<P, S>(source: &S, chunk: Chunk, keys: KeyPolicy) -> Result<LocalMap<P::Value>>
where
    P: NumericPolicy,
    S: ByteSource + ?Sized,
{
    let buf = source.read_chunk(chunk)?;
    let local = fold_records::<P>(&buf, chunk.offset, keys)?;
    debug!(
        offset = chunk.offset,
        length = chunk.length,
        keys = local.len(),
        "processed chunk"
    );
    Ok(local)
}

/// Scans `buf` once, left to right, tracking the record start, separator and
/// terminator. `base` is the file offset of `buf[0]`, used in error reports.
///
/// A trailing record without a terminator is folded too; the planner only
/// produces one at end of file.
pub fn fold_records<P: NumericPolicy>(
    buf: &[u8],
    base: u64,
    keys: KeyPolicy,
) -> Result<LocalMap<P::Value>> {
    let mut local = LocalMap::default();
    let mut start = 0;
    let mut separator = None;

    for pos in memchr::memchr2_iter(SEPARATOR, TERMINATOR, buf) {
        if buf[pos] == SEPARATOR {
            if separator.is_some() {
                return Err(Error::ExtraSeparator {
                    offset: base + start as u64,
                    line: line_text(buf, start, pos),
                });
            }
            separator = Some(pos);
            continue;
        }
        fold_record::<P>(&mut local, buf, base, start, separator, pos, keys)?;
        start = pos + 1;
        separator = None;
    }
    if start < buf.len() {
        fold_record::<P>(&mut local, buf, base, start, separator, buf.len(), keys)?;
    }
    Ok(local)
}

#[inline]
fn fold_record<P: NumericPolicy>(
    local: &mut LocalMap<P::Value>,
    buf: &[u8],
    base: u64,
    start: usize,
    separator: Option<usize>,
    end: usize,
    keys: KeyPolicy,
) -> Result<()> {
    let Some(separator) = separator else {
        return Err(Error::MissingSeparator {
            offset: base + start as u64,
            line: line_text(buf, start, end),
        });
    };
    let raw = &buf[separator + 1..end];
    let Some(value) = P::parse(raw) else {
        return Err(Error::InvalidValue {
            offset: base + start as u64,
            value: String::from_utf8_lossy(raw).into_owned(),
            line: line_text(buf, start, end),
        });
    };
    observe_into(local, keys.apply(&buf[start..separator]), value);
    Ok(())
}

/// The whole line containing `buf[start..at]`, for error context.
fn line_text(buf: &[u8], start: usize, at: usize) -> String {
    let end = memchr::memchr(TERMINATOR, &buf[at..]).map_or(buf.len(), |i| at + i);
    String::from_utf8_lossy(&buf[start..end]).into_owned()
}

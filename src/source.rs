//! Random-access byte sources.
//!
//! Workers read their chunks concurrently, so a source never keeps a shared
//! cursor: every read names its own offset.

use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::path::Path;

use clap::ValueEnum;
use memmap2::Mmap;

use crate::error::{Error, Result};
use crate::planner::Chunk;

pub const TERMINATOR: u8 = b'\n';

// Window used when scanning a file for the next terminator.
const SCAN_WINDOW: usize = 4096;

/// How chunk bytes are fetched from the input file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum IoMode {
    /// Memory-map the file; chunks borrow the mapping
    #[default]
    Mmap,
    /// Positional reads into a buffer per chunk
    Pread,
}

pub trait ByteSource: Sync {
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the first record terminator at or after `from`.
    fn find_terminator(&self, from: u64) -> Result<Option<u64>>;

    /// Exactly `chunk.length` bytes starting at `chunk.offset`.
    fn read_chunk(&self, chunk: Chunk) -> Result<Cow<'_, [u8]>>;
}

impl ByteSource for [u8] {
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn find_terminator(&self, from: u64) -> Result<Option<u64>> {
        let from = from as usize;
        if from >= <[u8]>::len(self) {
            return Ok(None);
        }
        Ok(memchr::memchr(TERMINATOR, &self[from..]).map(|i| (from + i) as u64))
    }

    fn read_chunk(&self, chunk: Chunk) -> Result<Cow<'_, [u8]>> {
        let start = chunk.offset as usize;
        let end = chunk.end() as usize;
        match self.get(start..end) {
            Some(bytes) => Ok(Cow::Borrowed(bytes)),
            None => Err(Error::Read {
                offset: chunk.offset,
                length: chunk.length,
                source: io::ErrorKind::UnexpectedEof.into(),
            }),
        }
    }
}

/// A read-only memory mapping of the input file.
pub struct MmapSource {
    // Zero-length files cannot be mapped.
    map: Option<Mmap>,
}

impl MmapSource {
    pub fn open(path: &Path) -> Result<Self> {
        let open_err = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        if file.metadata().map_err(open_err)?.len() == 0 {
            return Ok(Self { map: None });
        }
        // SAFETY: the input is treated as immutable for the duration of the run.
        let map = unsafe { Mmap::map(&file) }.map_err(open_err)?;
        Ok(Self { map: Some(map) })
    }

    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or_default()
    }
}

impl ByteSource for MmapSource {
    fn len(&self) -> u64 {
        ByteSource::len(self.bytes())
    }

    fn find_terminator(&self, from: u64) -> Result<Option<u64>> {
        self.bytes().find_terminator(from)
    }

    fn read_chunk(&self, chunk: Chunk) -> Result<Cow<'_, [u8]>> {
        self.bytes().read_chunk(chunk)
    }
}

/// A file read with positional reads, one owned buffer per chunk.
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let open_err = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let len = file.metadata().map_err(open_err)?.len();
        Ok(Self { file, len })
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        read_exact_at(&self.file, buf, offset).map_err(|source| Error::Read {
            offset,
            length: buf.len() as u64,
            source,
        })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn find_terminator(&self, from: u64) -> Result<Option<u64>> {
        let mut window = [0u8; SCAN_WINDOW];
        let mut pos = from;
        while pos < self.len {
            let n = (self.len - pos).min(SCAN_WINDOW as u64) as usize;
            self.read_at(&mut window[..n], pos)?;
            if let Some(i) = memchr::memchr(TERMINATOR, &window[..n]) {
                return Ok(Some(pos + i as u64));
            }
            pos += n as u64;
        }
        Ok(None)
    }

    fn read_chunk(&self, chunk: Chunk) -> Result<Cow<'_, [u8]>> {
        let mut buf = vec![0u8; chunk.length as usize];
        self.read_at(&mut buf, chunk.offset)?;
        Ok(Cow::Owned(buf))
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => {
                let rest = std::mem::take(&mut buf);
                buf = &mut rest[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

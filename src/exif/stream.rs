use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use super::data::Endian;
use crate::{ExifError, Result};

/// Sequential reader that tracks how many bytes it has consumed and decodes
/// multi-byte integers in a byte order chosen at runtime.
///
/// Position 0 is the first byte read through this reader, whatever the
/// underlying stream consumed before.
#[derive(Debug)]
pub struct CountedReader<R> {
    inner: R,
    position: u64,
    byte_order: Endian,
}

impl<R: Read> CountedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            position: 0,
            byte_order: Endian::Big,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn byte_order(&self) -> Endian {
        self.byte_order
    }

    pub fn set_byte_order(&mut self, byte_order: Endian) {
        self.byte_order = byte_order;
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.inner.read_u8()?;
        self.position += 1;
        Ok(value)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let value = match self.byte_order {
            Endian::Big => self.inner.read_u16::<BigEndian>()?,
            Endian::Little => self.inner.read_u16::<LittleEndian>()?,
        };
        self.position += 2;
        Ok(value)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let value = match self.byte_order {
            Endian::Big => self.inner.read_u32::<BigEndian>()?,
            Endian::Little => self.inner.read_u32::<LittleEndian>()?,
        };
        self.position += 4;
        Ok(value)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let value = match self.byte_order {
            Endian::Big => self.inner.read_i32::<BigEndian>()?,
            Endian::Little => self.inner.read_i32::<LittleEndian>()?,
        };
        self.position += 4;
        Ok(value)
    }

    /// Fills `buf` completely or fails with
    /// [`ExifError::UnexpectedEndOfData`].
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Reads `len` bytes. The buffer grows with the data actually present,
    /// so a corrupt length cannot force a huge allocation up front.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let read = self.inner.by_ref().take(len as u64).read_to_end(&mut buf)?;
        self.position += read as u64;
        if read < len {
            return Err(ExifError::UnexpectedEndOfData);
        }
        Ok(buf)
    }

    /// Discards exactly `n` bytes.
    pub fn skip(&mut self, n: u64) -> Result<()> {
        let skipped = io::copy(&mut self.inner.by_ref().take(n), &mut io::sink())?;
        self.position += skipped;
        if skipped < n {
            return Err(ExifError::UnexpectedEndOfData);
        }
        Ok(())
    }

    /// Moves forward to the absolute position `target`. Positions already
    /// passed cannot be reached again; asking for one is a no-op.
    pub fn skip_to(&mut self, target: u64) -> Result<()> {
        if target > self.position {
            self.skip(target - self.position)?;
        }
        Ok(())
    }
}

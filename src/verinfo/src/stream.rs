//! Seekable byte-stream abstraction used by the VarRec codec.
//!
//! A single trait object carries an in-memory buffer, a file, or a
//! host-provided sink through both `read_from_stream` and `write_to_stream`.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// A seekable byte-oriented stream. Both the VarRec codec and the
/// version-info model depend only on this trait, never on a concrete
/// `File` or `Cursor` type.
pub trait ByteStream {
    /// Reads exactly `buf.len()` bytes at the current position.
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Writes exactly `buf.len()` bytes at the current position.
    fn write_exact(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Returns the current stream position.
    fn position(&mut self) -> io::Result<u64>;

    /// Seeks to an absolute offset from the start of the stream.
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Returns the total size of the stream.
    fn len(&mut self) -> io::Result<u64>;

    fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        (&buf[..]).read_u16::<LittleEndian>()
    }

    fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        (&buf[..]).read_u32::<LittleEndian>()
    }

    fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_exact(&[value])
    }

    fn write_u16_le(&mut self, value: u16) -> io::Result<()> {
        let mut buf = [0u8; 2];
        (&mut buf[..]).write_u16::<LittleEndian>(value)?;
        self.write_exact(&buf)
    }

    fn write_u32_le(&mut self, value: u32) -> io::Result<()> {
        let mut buf = [0u8; 4];
        (&mut buf[..]).write_u32::<LittleEndian>(value)?;
        self.write_exact(&buf)
    }
}

/// Blanket implementation for any concrete reader/writer/seeker, covering
/// `std::io::Cursor<Vec<u8>>` and `std::fs::File` without bespoke adapters.
impl<T: Read + Write + Seek> ByteStream for T {
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        Read::read_exact(self, buf)
    }

    fn write_exact(&mut self, buf: &[u8]) -> io::Result<()> {
        Write::write_all(self, buf)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::Current(0))
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn len(&mut self) -> io::Result<u64> {
        let current = self.position()?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(current))?;
        Ok(end)
    }
}

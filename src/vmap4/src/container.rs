//! Output container writing.
//!
//! The container starts with an 8-byte magic tag followed by a 4-byte
//! little-endian vertex count at offset 8. The count is only known after
//! every geometry chunk has been streamed, so it is reserved up front and
//! patched once at the end instead of buffering the whole body in memory.

use std::io::{self, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

/// Magic tag at offset 0 (7 characters plus a NUL).
pub const RAW_VMAP_MAGIC: [u8; 8] = *b"VMAP044\0";

/// Byte offset of the vertex-count field.
pub const VERTEX_COUNT_OFFSET: u64 = 8;

/// Proof that a u32 field was reserved; consumed exactly once by
/// [`ContainerWriter::finalize`].
#[must_use = "a reserved field must be finalized"]
pub struct PatchToken {
    offset: u64,
}

/// Streaming writer for one output container.
pub struct ContainerWriter<W: Write + Seek> {
    inner: W,
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Wrap `inner` and write the magic tag.
    pub fn new(mut inner: W) -> io::Result<Self> {
        inner.write_all(&RAW_VMAP_MAGIC)?;
        Ok(ContainerWriter { inner })
    }

    /// Reserve a little-endian u32 at the current position, writing a
    /// provisional zero.
    pub fn reserve_u32(&mut self) -> io::Result<PatchToken> {
        let offset = self.inner.stream_position()?;
        self.inner.write_u32::<LittleEndian>(0)?;
        Ok(PatchToken { offset })
    }

    /// Overwrite a reserved field with its final value, then return to the
    /// end of the stream.
    pub fn finalize(&mut self, token: PatchToken, value: u32) -> io::Result<()> {
        let end = self.inner.stream_position()?;
        self.inner.seek(SeekFrom::Start(token.offset))?;
        self.inner.write_u32::<LittleEndian>(value)?;
        self.inner.seek(SeekFrom::Start(end))?;
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> Write for ContainerWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

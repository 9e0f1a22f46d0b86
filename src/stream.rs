use crate::boxes::FourCC;
use crate::error::{ParseError, Result};
use crate::parser::StringType;
use byteorder::{BigEndian, ByteOrder};
use std::path::Path;
use std::sync::Arc;

/// Random-access, big-endian reader over an in-memory buffer.
///
/// A stream always has an active scope `[base, end)`. The root stream covers
/// the whole buffer; [`BinaryStream::sub_stream`] narrows the scope to the
/// payload of a single box so that its decoder cannot see past its own end.
/// Sub-views share the underlying buffer.
#[derive(Clone, Debug)]
pub struct BinaryStream {
    data: Arc<[u8]>,
    base: u64,
    pos: u64,
    end: u64,
}

impl BinaryStream {
    pub fn from_vec(data: Vec<u8>) -> Self {
        let end = data.len() as u64;
        Self {
            data: Arc::from(data),
            base: 0,
            pos: 0,
            end,
        }
    }

    /// Read the whole file at `path` into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), len = data.len(), "loaded file");
        Ok(Self::from_vec(data))
    }

    /// Absolute offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Absolute offset where the active scope starts.
    pub fn scope_start(&self) -> u64 {
        self.base
    }

    /// Absolute offset one past the last byte of the active scope.
    pub fn scope_end(&self) -> u64 {
        self.end
    }

    /// Size of the active scope.
    pub fn len(&self) -> u64 {
        self.end - self.base
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes left between the current position and the end of the scope.
    pub fn remaining(&self) -> u64 {
        self.end.saturating_sub(self.pos)
    }

    pub fn has_bytes_available(&self) -> bool {
        self.remaining() > 0
    }

    // Physical availability is checked before scope so that a read running
    // off the end of the data always reports truncation.
    fn ensure(&self, n: u64) -> Result<()> {
        let physical = (self.data.len() as u64).saturating_sub(self.pos);
        if n > physical {
            return Err(ParseError::TruncatedStream {
                offset: self.pos,
                requested: n,
                available: physical,
            });
        }
        if n > self.remaining() {
            return Err(ParseError::OutOfScope {
                offset: self.pos,
                requested: n,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: u64) -> Result<&[u8]> {
        self.ensure(n)?;
        let start = self.pos as usize;
        self.pos += n;
        Ok(&self.data[start..start + n as usize])
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek(&self, n: u64) -> Result<&[u8]> {
        self.ensure(n)?;
        let start = self.pos as usize;
        Ok(&self.data[start..start + n as usize])
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_u24(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u24(self.take(3)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(self.take(2)?))
    }

    /// Read an unsigned integer stored on `width` bytes (0, 4 or 8), as
    /// used by the variable-width fields of item location boxes.
    pub fn read_sized(&mut self, width: u8) -> Result<Option<u64>> {
        match width {
            0 => Ok(Some(0)),
            4 => Ok(Some(self.read_u32()? as u64)),
            8 => Ok(Some(self.read_u64()?)),
            _ => Ok(None),
        }
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let src = self.take(buf.len() as u64)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    pub fn read_bytes(&mut self, n: u64) -> Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    pub fn read_fourcc(&mut self) -> Result<FourCC> {
        Ok(FourCC(self.read_array()?))
    }

    /// Consume everything left in the scope.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let n = self.remaining();
        self.read_bytes(n)
    }

    /// Read bytes up to a NUL terminator, which is consumed. A string that
    /// runs to the end of the scope without a terminator is accepted.
    pub fn read_null_terminated_string(&mut self) -> Result<String> {
        let rest = self.peek(self.remaining())?;
        let (len, consumed) = match rest.iter().position(|&b| b == 0) {
            Some(i) => (i, i as u64 + 1),
            None => (rest.len(), rest.len() as u64),
        };
        let s = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.skip(consumed)?;
        Ok(s)
    }

    /// Read a length-prefixed (one byte) string.
    pub fn read_pascal_string(&mut self) -> Result<String> {
        let len = self.read_u8()? as u64;
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn read_string(&mut self, kind: StringType) -> Result<String> {
        match kind {
            StringType::NullTerminated => self.read_null_terminated_string(),
            StringType::Pascal => self.read_pascal_string(),
        }
    }

    /// Create a view over the next `len` bytes. The view starts at the
    /// current position and cannot read past `position() + len`. The parent
    /// position is left untouched.
    pub fn sub_stream(&self, len: u64) -> Result<BinaryStream> {
        self.ensure(len)?;
        tracing::trace!(start = self.pos, len, "sub-stream");
        Ok(BinaryStream {
            data: Arc::clone(&self.data),
            base: self.pos,
            pos: self.pos,
            end: self.pos + len,
        })
    }
}

impl From<Vec<u8>> for BinaryStream {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl From<&[u8]> for BinaryStream {
    fn from(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_primitives() {
        let mut s = BinaryStream::from_vec(vec![
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
            0x0f, 0x10, 0x11, 0x12,
        ]);
        assert_eq!(s.read_u8().unwrap(), 0x01);
        assert_eq!(s.read_u16().unwrap(), 0x0203);
        assert_eq!(s.read_u24().unwrap(), 0x040506);
        assert_eq!(s.read_u32().unwrap(), 0x0708090a);
        assert_eq!(s.read_u64().unwrap(), 0x0b0c0d0e0f101112);
        assert!(!s.has_bytes_available());
    }

    #[test]
    fn peek_does_not_consume() {
        let s = BinaryStream::from_vec(b"ftypisom".to_vec());
        assert_eq!(s.peek(4).unwrap(), b"ftyp");
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn read_past_data_is_truncated() {
        let mut s = BinaryStream::from_vec(vec![0, 1, 2]);
        match s.read_u32() {
            Err(ParseError::TruncatedStream {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected TruncatedStream, got {other:?}"),
        }
    }

    #[test]
    fn read_past_sub_view_is_out_of_scope() {
        let mut s = BinaryStream::from_vec(vec![0u8; 16]);
        s.skip(2).unwrap();
        let mut sub = s.sub_stream(4).unwrap();
        assert_eq!(sub.scope_start(), 2);
        assert_eq!(sub.remaining(), 4);
        sub.read_u16().unwrap();
        assert!(matches!(
            sub.read_u32(),
            Err(ParseError::OutOfScope { remaining: 2, .. })
        ));
        // parent position is unaffected by reads on the view
        assert_eq!(s.position(), 2);
    }

    #[test]
    fn sub_view_larger_than_data_is_truncated() {
        let s = BinaryStream::from_vec(vec![0u8; 8]);
        assert!(matches!(
            s.sub_stream(9),
            Err(ParseError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn strings() {
        let mut s = BinaryStream::from_vec(b"abc\0\x02hiname".to_vec());
        assert_eq!(s.read_null_terminated_string().unwrap(), "abc");
        assert_eq!(s.read_pascal_string().unwrap(), "hi");
        // unterminated string runs to the end of scope
        assert_eq!(s.read_null_terminated_string().unwrap(), "name");
        assert_eq!(s.remaining(), 0);
    }

    #[test]
    fn sized_reads() {
        let mut s = BinaryStream::from_vec(vec![0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 9]);
        assert_eq!(s.read_sized(0).unwrap(), Some(0));
        assert_eq!(s.read_sized(4).unwrap(), Some(7));
        assert_eq!(s.read_sized(8).unwrap(), Some(9));
        assert_eq!(s.read_sized(2).unwrap(), None);
    }
}

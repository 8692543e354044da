//! The write side of [`ByteParser`](crate::parse::ByteParser): an append-only
//! big-endian buffer, plus the [`Encode`] trait every model type implements.

use byteorder::{BigEndian, ByteOrder};

use crate::{ClassError, ClassResult};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ByteWriter {
    out: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        ByteWriter::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter {
            out: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.out.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.out
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, val: u8) {
        self.out.push(val);
    }

    pub fn write_i8(&mut self, val: i8) {
        self.out.push(val as u8);
    }

    pub fn write_u16(&mut self, val: u16) {
        let mut buf = [0; 2];
        BigEndian::write_u16(&mut buf, val);
        self.write_bytes(&buf);
    }

    pub fn write_i16(&mut self, val: i16) {
        let mut buf = [0; 2];
        BigEndian::write_i16(&mut buf, val);
        self.write_bytes(&buf);
    }

    pub fn write_u32(&mut self, val: u32) {
        let mut buf = [0; 4];
        BigEndian::write_u32(&mut buf, val);
        self.write_bytes(&buf);
    }

    pub fn write_i32(&mut self, val: i32) {
        let mut buf = [0; 4];
        BigEndian::write_i32(&mut buf, val);
        self.write_bytes(&buf);
    }

    pub fn write_i64(&mut self, val: i64) {
        let mut buf = [0; 8];
        BigEndian::write_i64(&mut buf, val);
        self.write_bytes(&buf);
    }

    pub fn write_f32(&mut self, val: f32) {
        self.write_u32(val.to_bits());
    }

    pub fn write_f64(&mut self, val: f64) {
        let mut buf = [0; 8];
        BigEndian::write_u64(&mut buf, val.to_bits());
        self.write_bytes(&buf);
    }

    /// Writes a `u1` count, failing if `len` does not fit.
    pub fn write_len_u8(&mut self, what: &'static str, len: usize) -> ClassResult<()> {
        let len = u8::try_from(len).map_err(|_| ClassError::TooLarge { what, len })?;
        self.write_u8(len);
        Ok(())
    }

    /// Writes a `u2` count, failing if `len` does not fit.
    pub fn write_len_u16(&mut self, what: &'static str, len: usize) -> ClassResult<()> {
        let len = u16::try_from(len).map_err(|_| ClassError::TooLarge { what, len })?;
        self.write_u16(len);
        Ok(())
    }

    /// Writes a `u4` count, failing if `len` does not fit.
    pub fn write_len_u32(&mut self, what: &'static str, len: usize) -> ClassResult<()> {
        let len = u32::try_from(len).map_err(|_| ClassError::TooLarge { what, len })?;
        self.write_u32(len);
        Ok(())
    }

    /// Writes a placeholder `u4` and returns its position for `patch_u32`.
    pub fn reserve_u32(&mut self) -> usize {
        let pos = self.position();
        self.write_u32(0);
        pos
    }

    pub fn patch_u32(&mut self, pos: usize, val: u32) {
        BigEndian::write_u32(&mut self.out[pos..pos + 4], val);
    }

    /// Writes `items` preceded by a `u2` count.
    pub fn write_seq_u16<T: Encode>(&mut self, what: &'static str, items: &[T]) -> ClassResult<()> {
        self.write_len_u16(what, items.len())?;
        items.iter().try_for_each(|item| item.encode(self))
    }

    /// Writes a `u2` count followed by that many `u2` values.
    pub fn write_u16_table(&mut self, what: &'static str, items: &[u16]) -> ClassResult<()> {
        self.write_len_u16(what, items.len())?;
        items.iter().for_each(|&item| self.write_u16(item));
        Ok(())
    }
}

/// A value with a fixed wire layout.
///
/// `encoded_len` is computed from the structure alone and must always equal
/// the number of bytes `encode` appends.
pub trait Encode {
    fn encoded_len(&self) -> usize;
    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()>;

    fn to_bytes(&self) -> ClassResult<Vec<u8>> {
        let mut out = ByteWriter::with_capacity(self.encoded_len());
        self.encode(&mut out)?;
        Ok(out.into_inner())
    }
}

impl<T: Encode> Encode for [T] {
    fn encoded_len(&self) -> usize {
        self.iter().map(Encode::encoded_len).sum()
    }

    fn encode(&self, out: &mut ByteWriter) -> ClassResult<()> {
        self.iter().try_for_each(|item| item.encode(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backpatch() {
        let mut out = ByteWriter::new();
        out.write_u16(7);
        let pos = out.reserve_u32();
        out.write_bytes(b"abc");
        let len = out.position() - pos - 4;
        out.patch_u32(pos, len as u32);
        assert_eq!(out.as_bytes(), &[0, 7, 0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_length_overflow() {
        let mut out = ByteWriter::new();
        assert_eq!(
            out.write_len_u8("parameters", 256),
            Err(ClassError::TooLarge {
                what: "parameters",
                len: 256
            })
        );
        assert_eq!(out.position(), 0);
    }

    #[test]
    fn test_signed_and_float_writes() {
        let mut out = ByteWriter::new();
        out.write_i16(-2);
        out.write_f32(1.0);
        assert_eq!(out.as_bytes(), &[0xff, 0xfe, 0x3f, 0x80, 0, 0]);
    }
}

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::{mutf8::JavaString, ClassError, ClassResult};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum ParseError {
    #[error("unexpected end of input, {0} more bytes needed")]
    Incomplete(usize),
    #[error("unexpected byte at offset {0}")]
    Error(usize),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Big-endian read cursor over a borrowed byte slice.
///
/// Every read is bounds checked against the slice, so a truncated input
/// produces `ParseError::Incomplete` rather than a panic.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ByteParser<'src> {
    pub src: &'src [u8],
    pub offset: usize,
}

impl<'src> ByteParser<'src> {
    pub fn new(src: &'src [u8]) -> Self {
        ByteParser { src, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.src.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Tries to run the function, and backtraces by setting self to the state
    /// of the parser before the function was run if an error was returned.
    pub fn backtrace<F, T, E>(&mut self, mut func: F) -> Result<T, E>
    where
        F: FnMut(&mut Self) -> Result<T, E>,
    {
        let start = *self;
        func(self).map_err(|err| {
            *self = start;
            err
        })
    }

    /// Takes `tag.len()` bytes and returns an error if the bytes did not match.
    pub fn expect(&mut self, tag: &[u8]) -> ParseResult<()> {
        self.backtrace(|p| {
            if p.remaining() < tag.len() {
                Err(ParseError::Incomplete(tag.len() - p.remaining()))
            } else {
                for (i, &byte) in tag.iter().enumerate() {
                    if p.src[p.offset + i] != byte {
                        return Err(ParseError::Error(p.offset + i));
                    }
                }

                p.offset += tag.len();
                Ok(())
            }
        })
    }

    /// Takes `len` bytes, and errors if there were not enough bytes remaining.
    pub fn take(&mut self, len: usize) -> ParseResult<&'src [u8]> {
        if self.remaining() < len {
            Err(ParseError::Incomplete(len - self.remaining()))
        } else {
            let res = &self.src[self.offset..self.offset + len];
            self.offset += len;
            Ok(res)
        }
    }

    /// Like `take`, but for lengths read out of the input itself. A declared
    /// length larger than what is left is rejected up front, before anything
    /// sized by it gets allocated.
    pub fn take_declared(&mut self, len: usize) -> ClassResult<&'src [u8]> {
        if len > self.remaining() {
            return Err(ClassError::OversizedLength {
                declared: len,
                remaining: self.remaining(),
            });
        }
        Ok(self.take(len)?)
    }

    /// Splits off a parser scoped to exactly the next `len` bytes.
    pub fn sub(&mut self, len: usize) -> ClassResult<ByteParser<'src>> {
        self.take_declared(len).map(ByteParser::new)
    }

    pub fn predicate_len<F>(&self, mut func: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        let mut len = 0;
        // Increase len until we run out of bytes...
        while self.remaining() - len > 0 {
            // ...or we reach the end of the predicate
            if !func(self.src[self.offset + len]) {
                break;
            }

            len += 1;
        }
        len
    }

    /// Takes bytes while the predicate holds, leaving the first byte that
    /// failed it unconsumed. May return an empty slice.
    pub fn peeking_take_while<F>(&mut self, func: F) -> &'src [u8]
    where
        F: FnMut(u8) -> bool,
    {
        let len = self.predicate_len(func);
        let out = &self.src[self.offset..self.offset + len];
        self.offset += len;
        out
    }

    /// Like `take`, but does not advance the parser.
    pub fn peek(&self, len: usize) -> ParseResult<&'src [u8]> {
        if self.remaining() < len {
            Err(ParseError::Incomplete(len - self.remaining()))
        } else {
            Ok(&self.src[self.offset..self.offset + len])
        }
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.src.get(self.offset).copied()
    }

    /// Applies `func` exactly `len` times, and returns a vector of the items
    /// produced by `func`.
    pub fn seq<F, T, E>(&mut self, len: usize, mut func: F) -> Result<Vec<T>, E>
    where
        F: FnMut(&mut Self) -> Result<T, E>,
    {
        // Every item is at least one byte wide, so this bounds the allocation
        // by the input rather than by an untrusted count.
        let mut vec = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            vec.push(func(self)?);
        }
        Ok(vec)
    }

    pub fn parse_u8(&mut self) -> ParseResult<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn parse_u16(&mut self) -> ParseResult<u16> {
        self.take(2).map(BigEndian::read_u16)
    }

    pub fn parse_u32(&mut self) -> ParseResult<u32> {
        self.take(4).map(BigEndian::read_u32)
    }

    pub fn parse_u64(&mut self) -> ParseResult<u64> {
        self.take(8).map(BigEndian::read_u64)
    }

    pub fn parse_i8(&mut self) -> ParseResult<i8> {
        self.take(1).map(|b| b[0] as i8)
    }

    pub fn parse_i16(&mut self) -> ParseResult<i16> {
        self.take(2).map(BigEndian::read_i16)
    }

    pub fn parse_i32(&mut self) -> ParseResult<i32> {
        self.take(4).map(BigEndian::read_i32)
    }

    pub fn parse_i64(&mut self) -> ParseResult<i64> {
        self.take(8).map(BigEndian::read_i64)
    }

    pub fn parse_f32(&mut self) -> ParseResult<f32> {
        self.take(4).map(|b| f32::from_bits(BigEndian::read_u32(b)))
    }

    pub fn parse_f64(&mut self) -> ParseResult<f64> {
        self.take(8).map(|b| f64::from_bits(BigEndian::read_u64(b)))
    }

    /// A `u2` length followed by that many bytes of modified UTF-8.
    pub fn parse_mutf8_string(&mut self) -> ClassResult<JavaString> {
        let len = self.parse_u16()? as usize;
        crate::mutf8::parse_mutf8(self.take_declared(len)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pred_len() {
        let mut parser = ByteParser::new(b"abcdefgh");
        parser.expect(b"abcd").unwrap();
        assert_eq!(4, parser.predicate_len(|_| true));
    }

    #[test]
    fn test_peeking_take_while_valid() {
        let mut parser = ByteParser::new(b"foo.bar");
        assert_eq!(parser.peeking_take_while(|ch| ch != b'.'), &b"foo"[..]);
        assert_eq!(parser.remaining(), 4);
    }

    #[test]
    fn test_expect_backtracks() {
        let mut parser = ByteParser::new(b"abcd");
        assert_eq!(parser.expect(b"abx"), Err(ParseError::Error(2)));
        assert_eq!(parser.offset, 0);
    }

    #[test]
    fn test_big_endian_reads() {
        let mut parser = ByteParser::new(&[0xca, 0xfe, 0xba, 0xbe, 0xff, 0xfe, 0x80]);
        assert_eq!(parser.parse_u32(), Ok(0xcafe_babe));
        assert_eq!(parser.parse_i16(), Ok(-2));
        assert_eq!(parser.parse_i8(), Ok(-128));
        assert_eq!(parser.parse_u8(), Err(ParseError::Incomplete(1)));
    }

    #[test]
    fn test_declared_length_rejected_before_take() {
        let mut parser = ByteParser::new(&[1, 2, 3]);
        assert_eq!(
            parser.take_declared(0xffff_ffff),
            Err(ClassError::OversizedLength {
                declared: 0xffff_ffff,
                remaining: 3
            })
        );
        assert_eq!(parser.offset, 0);
    }

    #[test]
    fn test_sub_parser_is_scoped() {
        let mut parser = ByteParser::new(&[0, 1, 2, 3, 4]);
        let mut sub = parser.sub(2).unwrap();
        assert_eq!(sub.parse_u16(), Ok(1));
        assert!(sub.is_empty());
        assert_eq!(sub.parse_u8(), Err(ParseError::Incomplete(1)));
        assert_eq!(parser.remaining(), 3);
    }
}

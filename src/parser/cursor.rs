//! Immutable byte cursor for the WebAssembly binary format.
//!
//! Every read consumes the cursor by value and hands back the decoded value
//! together with a new cursor positioned after it, so section decoders are
//! plain folds with no hidden parser state:
//!
//! ```
//! use wasmwrap::parser::cursor::Cursor;
//!
//! let bytes = [0xe5, 0x8e, 0x26, 0x03, b'e', b'n', b'v'];
//! let cursor = Cursor::new(&bytes);
//! let (value, cursor) = cursor.read_vu32().unwrap();
//! let (name, cursor) = cursor.read_name().unwrap();
//! assert_eq!(value, 624485);
//! assert_eq!(name, "env");
//! assert!(cursor.is_empty());
//! ```

use byteorder::{ByteOrder, LittleEndian};

use super::error::ParseError;

/// The result of a single decoding step.
pub type Decoded<'a, T> = Result<(T, Cursor<'a>), ParseError>;

#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Cursor<'a> {
        Cursor {
            bytes,
            pos: 0,
            end: bytes.len(),
        }
    }

    // Basic operations --------------------------------------------------------

    /// Absolute offset into the original buffer.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    fn eof(&self, needed: usize) -> ParseError {
        ParseError::UnexpectedEof {
            offset: self.pos,
            needed: needed - self.remaining(),
        }
    }

    pub fn read_u8(self) -> Decoded<'a, u8> {
        if self.is_empty() {
            return Err(self.eof(1));
        }
        let byte = self.bytes[self.pos];
        Ok((byte, self.advance(1)))
    }

    pub fn read_bytes(self, len: usize) -> Decoded<'a, &'a [u8]> {
        if len > self.remaining() {
            return Err(self.eof(len));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        Ok((slice, self.advance(len)))
    }

    pub fn skip(self, len: usize) -> Result<Cursor<'a>, ParseError> {
        self.read_bytes(len).map(|(_, next)| next)
    }

    /// Splits off the next `len` bytes as a bounded cursor (keeping absolute
    /// offsets) and returns it along with this cursor advanced past them.
    pub fn split(self, len: usize) -> Decoded<'a, Cursor<'a>> {
        if len > self.remaining() {
            return Err(self.eof(len));
        }
        let bounded = Cursor {
            bytes: self.bytes,
            pos: self.pos,
            end: self.pos + len,
        };
        Ok((bounded, self.advance(len)))
    }

    fn advance(self, len: usize) -> Cursor<'a> {
        Cursor {
            pos: self.pos + len,
            ..self
        }
    }

    // Read and interpret types ------------------------------------------------

    // le
    pub fn read_u32(self) -> Decoded<'a, u32> {
        let (bytes, next) = self.read_bytes(4)?;
        Ok((LittleEndian::read_u32(bytes), next))
    }

    pub fn read_vu32(self) -> Decoded<'a, u32> {
        self.read_vu(32).map(|(v, next)| (v as u32, next))
    }

    pub fn read_vu64(self) -> Decoded<'a, u64> {
        self.read_vu(64)
    }

    fn read_vu(self, bits: u32) -> Decoded<'a, u64> {
        let start = self.pos;
        let max_bytes = (bits + 6) / 7;
        let mut result: u64 = 0;
        let mut shift = 0;
        let mut cursor = self;

        for i in 0..max_bytes {
            let (byte, next) = cursor.read_u8()?;
            cursor = next;
            let low = (byte & 0x7f) as u64;

            if i == max_bytes - 1 {
                if byte & 0x80 != 0 {
                    return Err(ParseError::IntegerTooLong(start));
                }
                // unused bits of the final byte must be zero
                let allowed = bits - shift;
                if allowed < 7 && (low >> allowed) != 0 {
                    return Err(ParseError::IntegerTooLarge(start));
                }
            }

            result |= low << shift;
            if byte & 0x80 == 0 {
                return Ok((result, cursor));
            }
            shift += 7;
        }

        Err(ParseError::IntegerTooLong(start))
    }

    /// Length-prefixed UTF-8 name.
    pub fn read_name(self) -> Decoded<'a, String> {
        let (len, next) = self.read_vu32()?;
        let start = next.pos;
        let (bytes, next) = next.read_bytes(len as usize)?;
        let name = std::str::from_utf8(bytes).map_err(|_| ParseError::MalformedUtf8(start))?;
        Ok((name.to_string(), next))
    }

    /// A `vec(T)`: a vu32 count followed by that many `T`s decoded by `item`.
    pub fn read_vec<T, F>(self, item: F) -> Decoded<'a, Vec<T>>
    where
        F: Fn(Cursor<'a>) -> Decoded<'a, T>,
    {
        let (count, mut cursor) = self.read_vu32()?;
        // every entry takes at least one byte
        let mut items = Vec::with_capacity((count as usize).min(cursor.remaining()));
        for _ in 0..count {
            let (value, next) = item(cursor)?;
            items.push(value);
            cursor = next;
        }
        Ok((items, cursor))
    }
}

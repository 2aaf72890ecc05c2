//! Binary Byte Stream
//!
//! Sequential, position-tracked codec shared by network payloads and
//! persisted snapshots. There is no tagging: the order of calls IS the format,
//! so every `write_*` must be mirrored by the matching `read_*` in the same
//! position.
//!
//! ## Primitive Layout
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────┐
//! │ boolean      │ 1 byte, 0 = false                            │
//! │ uvint        │ LEB128, 7 bits per byte, 0x80 = continuation │
//! │ vint         │ zigzag(i32) then uvint                       │
//! │ int / long   │ 4 / 8 bytes big-endian                       │
//! │ string/bytes │ int length (-1 = none) + raw bytes           │
//! │ data ref     │ vint class (0 = none) + vint instance        │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::content::GlobalId;

/// Longest legal LEB128 encoding of a 32-bit value.
const MAX_VARINT_BYTES: usize = 5;

/// Errors raised while decoding a stream.
///
/// Writes never fail. Every read error is fatal for the decode call that hit it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Fewer bytes remain than the next primitive needs.
    #[error(
        "unexpected end of stream: needed {needed} bytes at offset {offset}, {remaining} remaining"
    )]
    UnexpectedEndOfStream {
        /// Bytes the read required.
        needed: usize,
        /// Cursor position when the read started.
        offset: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// Varint ran past five bytes.
    #[error("varint too long at offset {0}")]
    VarIntTooLong(usize),

    /// String payload is not UTF-8.
    #[error("invalid utf-8 string at offset {0}")]
    InvalidUtf8(usize),

    /// Length prefix is negative or violates a fixed-size invariant.
    #[error("invalid length {length} for {what}")]
    InvalidLength {
        /// Field being decoded.
        what: &'static str,
        /// Length read from the stream.
        length: i64,
    },

    /// Tag of a sum type is not known.
    #[error("unknown {what} variant tag {tag}")]
    UnknownVariant {
        /// Type being decoded.
        what: &'static str,
        /// Tag read from the stream.
        tag: i32,
    },

    /// Data reference belongs to a different content table.
    #[error("data class mismatch: expected class {expected}, got {got}")]
    DataClassMismatch {
        /// Class the caller asked for.
        expected: i32,
        /// Class found in the stream.
        got: i32,
    },

    /// Data reference does not name a representable content id.
    #[error("invalid data reference {class_id}:{instance_id}")]
    InvalidDataRef {
        /// Class read from the stream.
        class_id: i32,
        /// Instance read from the stream.
        instance_id: i32,
    },
}

/// Result alias for decode operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Position-tracked byte buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteStream {
    buffer: Vec<u8>,
    offset: usize,
}

impl ByteStream {
    /// Create an empty stream for writing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stream with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            offset: 0,
        }
    }

    /// Wrap existing bytes for reading from offset 0.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: bytes.into(),
            offset: 0,
        }
    }

    /// Current cursor position.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total bytes in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// Check if every byte has been consumed.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the stream and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Write a boolean as one byte.
    pub fn write_boolean(&mut self, value: bool) {
        self.buffer.push(value as u8);
        self.offset += 1;
    }

    /// Write an unsigned LEB128 varint.
    pub fn write_uvint(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.buffer.push((value as u8) | 0x80);
            self.offset += 1;
            value >>= 7;
        }
        self.buffer.push(value as u8);
        self.offset += 1;
    }

    /// Write a signed varint (zigzag, then LEB128).
    pub fn write_vint(&mut self, value: i32) {
        self.write_uvint(zigzag_encode(value));
    }

    /// Write a 32-bit big-endian integer.
    pub fn write_int(&mut self, value: i32) {
        self.add_range(&value.to_be_bytes());
    }

    /// Write a 64-bit big-endian integer.
    pub fn write_long(&mut self, value: i64) {
        self.add_range(&value.to_be_bytes());
    }

    /// Write a length-prefixed UTF-8 string. `None` writes length -1.
    pub fn write_string(&mut self, value: Option<&str>) {
        self.write_bytes(value.map(str::as_bytes));
    }

    /// Write a length-prefixed byte array. `None` writes length -1.
    pub fn write_bytes(&mut self, value: Option<&[u8]>) {
        match value {
            Some(bytes) => {
                self.write_int(bytes.len() as i32);
                self.add_range(bytes);
            }
            None => self.write_int(-1),
        }
    }

    /// Append raw bytes with no prefix.
    pub fn add_range(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        self.offset += bytes.len();
    }

    /// Write a content reference as class then instance.
    pub fn write_data_ref(&mut self, value: Option<GlobalId>) {
        match value {
            Some(id) => {
                self.write_vint(id.class_id());
                self.write_vint(id.instance_id());
            }
            None => self.write_vint(0),
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    fn take(&mut self, count: usize) -> CodecResult<&[u8]> {
        if self.remaining() < count {
            return Err(CodecError::UnexpectedEndOfStream {
                needed: count,
                offset: self.offset,
                remaining: self.remaining(),
            });
        }
        let start = self.offset;
        self.offset += count;
        Ok(&self.buffer[start..self.offset])
    }

    /// Read a boolean byte. Any non-zero value is true.
    pub fn read_boolean(&mut self) -> CodecResult<bool> {
        Ok(self.take(1)?[0] != 0)
    }

    /// Read an unsigned LEB128 varint.
    pub fn read_uvint(&mut self) -> CodecResult<u32> {
        let start = self.offset;
        let mut result: u32 = 0;

        for i in 0..MAX_VARINT_BYTES {
            let byte = self.take(1)?[0];
            result |= ((byte & 0x7F) as u32) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }

        Err(CodecError::VarIntTooLong(start))
    }

    /// Read a signed varint.
    pub fn read_vint(&mut self) -> CodecResult<i32> {
        Ok(zigzag_decode(self.read_uvint()?))
    }

    /// Read a 32-bit big-endian integer.
    pub fn read_int(&mut self) -> CodecResult<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a 64-bit big-endian integer.
    pub fn read_long(&mut self) -> CodecResult<i64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(raw))
    }

    /// Read a length-prefixed byte array.
    pub fn read_bytes(&mut self) -> CodecResult<Option<Vec<u8>>> {
        let length = self.read_int()?;
        match length {
            -1 => Ok(None),
            n if n < 0 => Err(CodecError::InvalidLength {
                what: "byte array",
                length: n as i64,
            }),
            n => Ok(Some(self.take(n as usize)?.to_vec())),
        }
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> CodecResult<Option<String>> {
        let start = self.offset;
        match self.read_bytes()? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| CodecError::InvalidUtf8(start)),
            None => Ok(None),
        }
    }

    /// Read `count` raw bytes.
    pub fn read_range(&mut self, count: usize) -> CodecResult<Vec<u8>> {
        Ok(self.take(count)?.to_vec())
    }

    /// Read a content reference of any class.
    pub fn read_data_ref(&mut self) -> CodecResult<Option<GlobalId>> {
        let class_id = self.read_vint()?;
        if class_id == 0 {
            return Ok(None);
        }
        let instance_id = self.read_vint()?;
        GlobalId::checked_new(class_id, instance_id)
            .map(Some)
            .ok_or(CodecError::InvalidDataRef { class_id, instance_id })
    }

    /// Read a content reference that must belong to `class_id`.
    pub fn read_data_ref_of(&mut self, class_id: i32) -> CodecResult<Option<GlobalId>> {
        match self.read_data_ref()? {
            Some(id) if id.class_id() != class_id => Err(CodecError::DataClassMismatch {
                expected: class_id,
                got: id.class_id(),
            }),
            other => Ok(other),
        }
    }

    /// Read a non-negative varint length.
    pub fn read_length(&mut self, what: &'static str) -> CodecResult<usize> {
        let length = self.read_vint()?;
        if length < 0 {
            return Err(CodecError::InvalidLength {
                what,
                length: length as i64,
            });
        }
        Ok(length as usize)
    }
}

#[inline]
fn zigzag_encode(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline]
fn zigzag_decode(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

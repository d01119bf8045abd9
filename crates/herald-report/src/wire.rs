//! Little-endian primitive encoding used inside report payloads.
//!
//! | type        | encoding                                   |
//! |-------------|--------------------------------------------|
//! | `i32`       | 4 bytes, little-endian two's complement    |
//! | `i64`       | 8 bytes, little-endian two's complement    |
//! | `bool`      | 1 byte, `0` or `1`                         |
//! | string      | `i32` byte length, then UTF-8 bytes        |
//! | string list | `i32` element count, then each string      |

/// Errors raised while encoding a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A string is longer than an `i32` length prefix can express.
    #[error("field '{field}' is {len} bytes, longer than a length prefix allows")]
    StringTooLong {
        /// Field being written.
        field: &'static str,
        /// Byte length of the string.
        len: usize,
    },

    /// A list has more elements than an `i32` count can express.
    #[error("field '{field}' has {len} elements, more than a count prefix allows")]
    ListTooLong {
        /// Field being written.
        field: &'static str,
        /// Element count.
        len: usize,
    },
}

/// Errors raised while decoding a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The payload ended inside a field.
    #[error("payload truncated reading '{field}' at offset {offset}")]
    Truncated {
        /// Field being read.
        field: &'static str,
        /// Byte offset where the read started.
        offset: usize,
    },

    /// A length or count prefix was negative.
    #[error("negative length {len} for '{field}'")]
    NegativeLength {
        /// Field being read.
        field: &'static str,
        /// The prefix value.
        len: i32,
    },

    /// A boolean byte was neither 0 nor 1.
    #[error("invalid boolean byte {value} for '{field}'")]
    InvalidBool {
        /// Field being read.
        field: &'static str,
        /// The byte found.
        value: u8,
    },

    /// A string was not valid UTF-8.
    #[error("field '{0}' is not valid UTF-8")]
    InvalidUtf8(&'static str),

    /// An enum ordinal outside the known range.
    #[error("unknown ordinal {value} for '{field}'")]
    UnknownOrdinal {
        /// Field being read.
        field: &'static str,
        /// The ordinal found.
        value: i32,
    },

    /// Bytes were left after the last field.
    #[error("{0} trailing bytes after the last field")]
    TrailingBytes(usize),
}

/// Convert a length into an `i32` prefix.
pub(crate) fn length_prefix(len: usize) -> Option<i32> {
    i32::try_from(len).ok()
}

/// Appends primitives to a growing payload buffer.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: Vec<u8>,
}

impl PayloadWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a 32-bit integer.
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 64-bit integer.
    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a boolean as a single byte.
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, field: &'static str, value: &str) -> Result<(), EncodeError> {
        let len = length_prefix(value.len()).ok_or(EncodeError::StringTooLong {
            field,
            len: value.len(),
        })?;
        self.write_i32(len);
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Write a count-prefixed list of strings.
    pub fn write_str_list<S: AsRef<str>>(
        &mut self,
        field: &'static str,
        values: &[S],
    ) -> Result<(), EncodeError> {
        let count = length_prefix(values.len()).ok_or(EncodeError::ListTooLong {
            field,
            len: values.len(),
        })?;
        self.write_i32(count);
        for value in values {
            self.write_str(field, value.as_ref())?;
        }
        Ok(())
    }

    /// Finish and return the payload bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads primitives back out of a payload.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, field: &'static str, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(DecodeError::Truncated {
                field,
                offset: self.pos,
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Read a 32-bit integer.
    pub fn read_i32(&mut self, field: &'static str) -> Result<i32, DecodeError> {
        let bytes = self.take(field, 4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a 64-bit integer.
    pub fn read_i64(&mut self, field: &'static str) -> Result<i64, DecodeError> {
        let bytes = self.take(field, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(raw))
    }

    /// Read a single-byte boolean.
    pub fn read_bool(&mut self, field: &'static str) -> Result<bool, DecodeError> {
        match self.take(field, 1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(DecodeError::InvalidBool { field, value }),
        }
    }

    fn read_len(&mut self, field: &'static str) -> Result<usize, DecodeError> {
        let len = self.read_i32(field)?;
        usize::try_from(len).map_err(|_| DecodeError::NegativeLength { field, len })
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self, field: &'static str) -> Result<String, DecodeError> {
        let len = self.read_len(field)?;
        let bytes = self.take(field, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8(field))
    }

    /// Read a count-prefixed list of strings.
    pub fn read_string_list(&mut self, field: &'static str) -> Result<Vec<String>, DecodeError> {
        let count = self.read_len(field)?;
        // Every element needs at least its 4-byte prefix.
        if count > self.remaining() / 4 {
            return Err(DecodeError::Truncated {
                field,
                offset: self.pos,
            });
        }
        (0..count).map(|_| self.read_string(field)).collect()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Fail if anything is left unread.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_is_length_prefixed_utf8() {
        let mut w = PayloadWriter::new();
        w.write_str("name", "Zoë").unwrap();
        let bytes = w.into_bytes();
        // "Zoë" is 4 bytes in UTF-8.
        assert_eq!(bytes, vec![4, 0, 0, 0, b'Z', b'o', 0xC3, 0xAB]);
    }

    #[test]
    fn test_empty_list_is_just_a_zero_count() {
        let mut w = PayloadWriter::new();
        w.write_str_list::<&str>("players", &[]).unwrap();
        assert_eq!(w.into_bytes(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_integers_are_little_endian() {
        let mut w = PayloadWriter::new();
        w.write_i32(-2);
        w.write_i64(0x0102_0304_0506_0708);
        w.write_bool(true);
        assert_eq!(
            w.into_bytes(),
            vec![0xFE, 0xFF, 0xFF, 0xFF, 8, 7, 6, 5, 4, 3, 2, 1, 1]
        );
    }

    #[test]
    fn test_length_prefix_limit() {
        assert_eq!(length_prefix(0), Some(0));
        assert_eq!(length_prefix(i32::MAX as usize), Some(i32::MAX));
        assert_eq!(length_prefix(i32::MAX as usize + 1), None);
    }

    #[test]
    fn test_truncated_string_reports_offset() {
        let data = [10, 0, 0, 0, b'a'];
        let mut r = PayloadReader::new(&data);
        assert_eq!(
            r.read_string("banner"),
            Err(DecodeError::Truncated {
                field: "banner",
                offset: 4
            })
        );
    }

    #[test]
    fn test_negative_length_rejected() {
        let data = (-1i32).to_le_bytes();
        let mut r = PayloadReader::new(&data);
        assert_eq!(
            r.read_string("admin"),
            Err(DecodeError::NegativeLength {
                field: "admin",
                len: -1
            })
        );
    }

    #[test]
    fn test_huge_list_count_rejected_before_allocating() {
        let data = i32::MAX.to_le_bytes();
        let mut r = PayloadReader::new(&data);
        assert!(matches!(
            r.read_string_list("players"),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let mut r = PayloadReader::new(&[2]);
        assert_eq!(
            r.read_bool("cheats"),
            Err(DecodeError::InvalidBool {
                field: "cheats",
                value: 2
            })
        );
    }

    #[test]
    fn test_trailing_bytes_detected() {
        let data = [1, 0, 0, 0, 9];
        let mut r = PayloadReader::new(&data);
        assert_eq!(r.read_i32("port").unwrap(), 1);
        assert_eq!(r.finish(), Err(DecodeError::TrailingBytes(1)));
    }
}

//! Cursor-based binary buffer.
//!
//! [`ByteBuffer`] is the only thing in the protocol that touches raw bytes.
//! Every codec reads and writes through it, so the bounds rules live in one
//! place:
//!
//! ```text
//!  0         index                    len
//!  ├───────────┼───────────────────────┤
//!  │ consumed  │ remaining             │
//!  └───────────┴───────────────────────┘
//! ```
//!
//! Reads take bytes at the cursor and move it forward. Writes go to an
//! explicit offset (cursor untouched) or to the cursor (cursor moves).
//! Nothing is ever clamped: an access that does not fit fails with
//! [`ProtocolError::OutOfBounds`] and leaves the buffer as it was.
//!
//! All multi-byte values are big-endian.

use bytes::{Bytes, BytesMut};

use crate::ProtocolError;

/// Fixed-capacity byte region with a movable cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    data: BytesMut,
    index: usize,
}

impl ByteBuffer {
    /// Creates a zero-filled buffer of exactly `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::zeroed(capacity),
            index: 0,
        }
    }

    /// Wraps a copy of `bytes` for reading, cursor at 0.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            index: 0,
        }
    }

    /// Total size of the region.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current cursor position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the cursor. `index == len` is allowed (nothing left to read).
    pub fn set_index(&mut self, index: usize) -> Result<(), ProtocolError> {
        if index > self.data.len() {
            return Err(ProtocolError::OutOfBounds {
                index,
                needed: 0,
                len: self.data.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    /// Bytes between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer and returns its bytes, ready to hand to a transport.
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    // -----------------------------------------------------------------------
    // Bounds
    // -----------------------------------------------------------------------

    fn check(&self, index: usize, needed: usize) -> Result<(), ProtocolError> {
        let fits = index
            .checked_add(needed)
            .is_some_and(|end| end <= self.data.len());
        if fits {
            Ok(())
        } else {
            Err(ProtocolError::OutOfBounds {
                index,
                needed,
                len: self.data.len(),
            })
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        self.check(self.index, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.index..self.index + N]);
        self.index += N;
        Ok(out)
    }

    fn put(&mut self, bytes: &[u8], offset: Option<usize>) -> Result<(), ProtocolError> {
        let at = offset.unwrap_or(self.index);
        self.check(at, bytes.len())?;
        self.data[at..at + bytes.len()].copy_from_slice(bytes);
        if offset.is_none() {
            self.index += bytes.len();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Reads `len` raw bytes at the cursor.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8], ProtocolError> {
        self.check(self.index, len)?;
        let start = self.index;
        self.index += len;
        Ok(&self.data[start..start + len])
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        self.take::<1>().map(|b| b[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ProtocolError> {
        self.take::<1>().map(i8::from_be_bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        self.take::<2>().map(u16::from_be_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        self.take::<2>().map(i16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        self.take::<4>().map(u32::from_be_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        self.take::<4>().map(i32::from_be_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, ProtocolError> {
        self.take::<4>().map(f32::from_be_bytes)
    }

    /// Reads a `u16` length prefix followed by that many UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.read_u16()? as usize;
        let raw = self.read_bytes(len)?;
        String::from_utf8(raw.to_vec()).map_err(|e| ProtocolError::Malformed {
            field: "string",
            reason: e.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Writes
    //
    // `offset: None` writes at the cursor and advances it; `Some(at)` writes
    // at `at` and leaves the cursor where it is.
    // -----------------------------------------------------------------------

    pub fn write_u8(&mut self, value: u8, offset: Option<usize>) -> Result<(), ProtocolError> {
        self.put(&[value], offset)
    }

    pub fn write_i8(&mut self, value: i8, offset: Option<usize>) -> Result<(), ProtocolError> {
        self.put(&value.to_be_bytes(), offset)
    }

    pub fn write_u16(&mut self, value: u16, offset: Option<usize>) -> Result<(), ProtocolError> {
        self.put(&value.to_be_bytes(), offset)
    }

    pub fn write_i16(&mut self, value: i16, offset: Option<usize>) -> Result<(), ProtocolError> {
        self.put(&value.to_be_bytes(), offset)
    }

    pub fn write_u32(&mut self, value: u32, offset: Option<usize>) -> Result<(), ProtocolError> {
        self.put(&value.to_be_bytes(), offset)
    }

    pub fn write_i32(&mut self, value: i32, offset: Option<usize>) -> Result<(), ProtocolError> {
        self.put(&value.to_be_bytes(), offset)
    }

    /// Writes an IEEE-754 single. NaN and infinities are refused.
    pub fn write_f32(&mut self, value: f32, offset: Option<usize>) -> Result<(), ProtocolError> {
        if !value.is_finite() {
            return Err(ProtocolError::Encoding(format!(
                "{value} is not a finite float"
            )));
        }
        self.put(&value.to_be_bytes(), offset)
    }

    /// Writes a `u16` length prefix and the UTF-8 bytes of `value`.
    pub fn write_string(&mut self, value: &str, offset: Option<usize>) -> Result<(), ProtocolError> {
        let len = u16::try_from(value.len()).map_err(|_| {
            ProtocolError::Encoding(format!(
                "string of {} bytes exceeds the {} byte limit",
                value.len(),
                u16::MAX
            ))
        })?;
        let at = offset.unwrap_or(self.index);
        // Check the whole span up front so a failed write leaves no prefix behind.
        self.check(at, 2 + value.len())?;
        self.put(&len.to_be_bytes(), Some(at))?;
        self.put(value.as_bytes(), Some(at + 2))?;
        if offset.is_none() {
            self.index = at + 2 + value.len();
        }
        Ok(())
    }
}

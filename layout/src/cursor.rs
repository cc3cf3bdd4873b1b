//! Read position over a borrowed byte buffer.

use crate::Error;
use bytes::Buf;

/// A read position over an immutable, borrowed byte buffer.
///
/// Field types advance the cursor by exactly the number of bytes they consume. Every read
/// is bounds-checked: consuming more bytes than remain fails with [`Error::EndOfBuffer`].
///
/// `Cursor` implements [`Buf`], so fixed-width values can be pulled with the `bytes`
/// getters once [`Cursor::ensure`] has succeeded.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Returns the underlying buffer.
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Returns the current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the read position to `pos`, which may equal the buffer length.
    pub fn set_position(&mut self, pos: usize) -> Result<(), Error> {
        if pos > self.buf.len() {
            return Err(Error::EndOfBuffer {
                needed: pos,
                remaining: self.buf.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fails unless at least `len` bytes remain.
    #[inline]
    pub fn ensure(&self, len: usize) -> Result<(), Error> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(Error::EndOfBuffer {
                needed: len,
                remaining,
            });
        }
        Ok(())
    }

    /// Consumes the next `len` bytes, borrowing them from the buffer.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        self.ensure(len)?;
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Returns the offset (relative to the current position) of the next `byte`, if any.
    ///
    /// Does not advance the cursor.
    pub fn find(&self, byte: u8) -> Option<usize> {
        self.buf[self.pos..].iter().position(|b| *b == byte)
    }
}

impl Buf for Cursor<'_> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn chunk(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= Buf::remaining(self),
            "cannot advance past the end of the buffer"
        );
        self.pos += cnt;
    }
}

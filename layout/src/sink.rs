//! Chunked output buffer with support for deferred patches.

use crate::Error;
use bytes::{BufMut, Bytes, BytesMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of unique sink identifiers.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// An ordered list of immutable byte chunks and their running total length.
///
/// Field types append to the sink with [`Sink::push`]. Chunks are never mutated once
/// pushed; a deferred patch replaces a whole chunk with another of the same width (see
/// [`Sink::patch`]), so chunk indices recorded earlier stay valid.
#[derive(Debug)]
pub struct Sink {
    id: u64,
    chunks: Vec<Bytes>,
    stamps: Vec<u64>,
    pushed: u64,
    length: usize,
}

/// A snapshot of a [`Sink`] that can be restored with [`Sink::rollback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    chunks: usize,
    length: usize,
}

impl Checkpoint {
    /// Returns the total sink length when the checkpoint was taken.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the sink was empty when the checkpoint was taken.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            chunks: Vec::new(),
            stamps: Vec::new(),
            pushed: 0,
            length: 0,
        }
    }

    /// Returns the identifier of this sink, unique within the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Appends a chunk.
    pub fn push(&mut self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();
        self.length += chunk.len();
        self.chunks.push(chunk);
        self.stamps.push(self.pushed);
        self.pushed += 1;
    }

    /// Returns the total number of bytes pushed.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if no bytes have been pushed.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of chunks pushed.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the stamp of the chunk at `index`.
    ///
    /// Stamps count every push to this sink and are never reused, even after a rollback
    /// discards the chunk that carried one. A patch keeps the stamp of the chunk it replaces.
    pub fn stamp(&self, index: usize) -> Option<u64> {
        self.stamps.get(index).copied()
    }

    /// Returns the chunks in order.
    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }

    /// Copies all chunks, in order, into one contiguous buffer.
    ///
    /// The sink is left untouched: calling `finish` again yields the same bytes.
    pub fn finish(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.length);
        for chunk in &self.chunks {
            buf.put_slice(chunk);
        }
        buf.freeze()
    }

    /// Records the current state of the sink.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            chunks: self.chunks.len(),
            length: self.length,
        }
    }

    /// Discards everything pushed after `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.chunks.truncate(checkpoint.chunks);
        self.stamps.truncate(checkpoint.chunks);
        self.length = checkpoint.length;
    }

    /// Replaces the chunk at `index` with `chunk`, returning the previous chunk.
    ///
    /// The replacement must have the same width as the chunk it replaces, so that every
    /// byte offset computed from the running length stays correct.
    pub fn patch(&mut self, index: usize, chunk: Bytes) -> Result<Bytes, Error> {
        let Some(slot) = self.chunks.get_mut(index) else {
            return Err(Error::UnresolvedReference);
        };
        if slot.len() != chunk.len() {
            return Err(Error::PatchWidth {
                expected: slot.len(),
                found: chunk.len(),
            });
        }
        Ok(std::mem::replace(slot, chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let sink = Sink::new();
        assert!(sink.is_empty());
        assert_eq!(sink.chunk_count(), 0);
        assert_eq!(sink.finish(), Bytes::new());
    }

    #[test]
    fn test_push_tracks_length() {
        let mut sink = Sink::new();
        sink.push(vec![1u8, 2, 3]);
        assert_eq!(sink.len(), 3);
        sink.push(Bytes::from_static(&[4, 5]));
        assert_eq!(sink.len(), 5);
        assert_eq!(
            sink.chunks(),
            &[Bytes::from_static(&[1, 2, 3]), Bytes::from_static(&[4, 5])]
        );
    }

    #[test]
    fn test_finish_is_repeatable() {
        let mut sink = Sink::new();
        sink.push(vec![1u8, 2, 3]);
        sink.push(vec![4u8, 5]);
        assert_eq!(sink.finish(), Bytes::from_static(&[1, 2, 3, 4, 5]));
        assert_eq!(sink.finish(), Bytes::from_static(&[1, 2, 3, 4, 5]));
        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn test_rollback() {
        let mut sink = Sink::new();
        sink.push(vec![1u8]);
        let checkpoint = sink.checkpoint();
        assert_eq!(checkpoint.len(), 1);
        sink.push(vec![2u8, 3]);
        sink.push(vec![4u8]);
        sink.rollback(checkpoint);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.finish(), Bytes::from_static(&[1]));
    }

    #[test]
    fn test_stamps_survive_patch_not_rollback() {
        let mut sink = Sink::new();
        sink.push(vec![0u8]);
        let checkpoint = sink.checkpoint();
        sink.push(vec![1u8]);
        assert_eq!(sink.stamp(1), Some(1));
        sink.rollback(checkpoint);
        assert_eq!(sink.stamp(1), None);

        // The chunk now at index 1 is a different one
        sink.push(vec![2u8]);
        assert_eq!(sink.stamp(1), Some(2));
        sink.patch(1, Bytes::from_static(&[3])).unwrap();
        assert_eq!(sink.stamp(1), Some(2));
        assert_eq!(sink.stamp(0), Some(0));
    }

    #[test]
    fn test_patch() {
        let mut sink = Sink::new();
        sink.push(vec![0u8, 0]);
        sink.push(vec![7u8]);
        let old = sink.patch(0, Bytes::from_static(&[1, 2])).unwrap();
        assert_eq!(old, Bytes::from_static(&[0, 0]));
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.finish(), Bytes::from_static(&[1, 2, 7]));
    }

    #[test]
    fn test_patch_width_mismatch() {
        let mut sink = Sink::new();
        sink.push(vec![0u8, 0]);
        assert_eq!(
            sink.patch(0, Bytes::from_static(&[1])),
            Err(Error::PatchWidth {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(sink.finish(), Bytes::from_static(&[0, 0]));
    }

    #[test]
    fn test_unique_ids() {
        assert_ne!(Sink::new().id(), Sink::new().id());
    }
}

//! Byte collections shared between the stream, segment and reassembly layers.
//!
//! This module primarily implements the [`Message`] collection.

use std::{
    collections::VecDeque,
    fmt::{self, Display},
    ops::{Bound, RangeBounds},
};

mod chunk;
pub use chunk::Chunk;

mod message_bytes;
pub use message_bytes::MessageBytes;

/// A byte collection that can be split, trimmed, and joined without copying.
///
/// The bytes live in reference-counted [`Chunk`]s, so cloning a message only
/// clones a handful of pointers. A segment kept for retransmission and the
/// copy handed to the outgoing queue share the same payload storage.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Never holds an empty chunk
    chunks: VecDeque<Chunk>,
    len: usize,
}

impl Message {
    /// Creates a message holding `body`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use elvis_tcp::message::Message;
    /// let message = Message::new(b"payload");
    /// assert_eq!(message.len(), 7);
    /// ```
    pub fn new(body: impl Into<Chunk>) -> Self {
        let mut message = Self::default();
        message.push_chunk(body.into());
        message
    }

    fn push_chunk(&mut self, chunk: Chunk) {
        if !chunk.is_empty() {
            self.len += chunk.len();
            self.chunks.push_back(chunk);
        }
    }

    /// Appends `other` to the end of this message.
    pub fn concatenate(&mut self, other: Message) {
        for chunk in other.chunks {
            self.push_chunk(chunk);
        }
    }

    /// Restricts the message to the given range of byte offsets.
    ///
    /// # Examples
    ///
    /// ```
    /// # use elvis_tcp::message::Message;
    /// let mut message = Message::new(b"seq");
    /// message.concatenate(Message::new(b"number"));
    /// message.slice(2..6);
    /// assert_eq!(message.to_vec(), b"qnum");
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the range reaches past the end of the message.
    pub fn slice(&mut self, range: impl RangeBounds<usize>) {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end + 1,
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.len,
        };
        assert!(
            start <= end && end <= self.len,
            "range {start}..{end} out of bounds for a message of {} bytes",
            self.len
        );
        self.truncate(end);
        self.remove_front(start);
    }

    /// Keeps the first `len` bytes and drops the rest. Does nothing if the
    /// message is already that short.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;
        let mut remaining = len;
        let mut kept = 0;
        for chunk in self.chunks.iter_mut() {
            if remaining == 0 {
                break;
            }
            chunk.keep_front(remaining);
            remaining -= chunk.len();
            kept += 1;
        }
        self.chunks.truncate(kept);
    }

    /// Splits off the first `len` bytes and returns them as their own
    /// message.
    ///
    /// # Panics
    ///
    /// Panics if `len` is greater than the length of the message.
    pub fn cut(&mut self, len: usize) -> Self {
        assert!(len <= self.len, "cannot cut {len} of {} bytes", self.len);
        let mut front = Self::default();
        while front.len < len {
            let Some(head) = self.chunks.front_mut() else {
                break;
            };
            let piece = head.take_front(len - front.len);
            if head.is_empty() {
                self.chunks.pop_front();
            }
            front.push_chunk(piece);
        }
        self.len -= front.len;
        front
    }

    /// Drops the first `len` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `len` is greater than the length of the message.
    pub fn remove_front(&mut self, len: usize) {
        assert!(len <= self.len, "cannot remove {len} of {} bytes", self.len);
        self.len -= len;
        let mut remaining = len;
        while remaining > 0 {
            let Some(head) = self.chunks.front_mut() else {
                break;
            };
            let skipped = remaining.min(head.len());
            head.skip_front(skipped);
            remaining -= skipped;
            if head.is_empty() {
                self.chunks.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over every byte of the message in order.
    pub fn iter(&self) -> MessageBytes<'_> {
        MessageBytes::new(self.chunks.iter(), self.len)
    }

    /// Copies the message into one contiguous vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.chunks
            .iter()
            .fold(Vec::with_capacity(self.len), |mut out, chunk| {
                out.extend_from_slice(chunk.as_slice());
                out
            })
    }
}

/// Hex dump of the bytes
impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for Message {}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Message {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl<const L: usize> From<[u8; L]> for Message {
    fn from(bytes: [u8; L]) -> Self {
        Self::new(bytes)
    }
}

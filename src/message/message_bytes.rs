use super::Chunk;
use std::{collections::vec_deque, iter::FusedIterator, slice};

/// Iterator over the bytes of a [`Message`](super::Message), produced by
/// [`Message::iter`](super::Message::iter).
#[derive(Debug, Clone)]
pub struct MessageBytes<'a> {
    upcoming: vec_deque::Iter<'a, Chunk>,
    within: slice::Iter<'a, u8>,
    remaining: usize,
}

impl<'a> MessageBytes<'a> {
    pub(super) fn new(upcoming: vec_deque::Iter<'a, Chunk>, remaining: usize) -> Self {
        Self {
            upcoming,
            within: <&[u8]>::default().iter(),
            remaining,
        }
    }
}

impl Iterator for MessageBytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let byte = match self.within.next() {
            Some(byte) => *byte,
            None => {
                // Messages hold no empty chunks, so a fresh one always
                // yields a byte
                self.within = self.upcoming.next()?.as_slice().iter();
                *self.within.next()?
            }
        };
        self.remaining -= 1;
        Some(byte)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for MessageBytes<'_> {}

impl FusedIterator for MessageBytes<'_> {}

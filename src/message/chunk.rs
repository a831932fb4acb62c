use std::{ops::Range, sync::Arc};

/// A visible window onto shared, immutable bytes. Clones share storage, so a
/// [`Message`](super::Message) can split itself without copying any bytes.
#[derive(Debug, Clone)]
pub struct Chunk {
    bytes: Arc<[u8]>,
    window: Range<usize>,
}

impl Chunk {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[self.window.clone()]
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Hides everything after the first `len` visible bytes.
    pub(super) fn keep_front(&mut self, len: usize) {
        self.window.end = self.window.start + len.min(self.len());
    }

    /// Hides the first `len` visible bytes.
    pub(super) fn skip_front(&mut self, len: usize) {
        self.window.start += len.min(self.len());
    }

    /// Splits off the first `len` visible bytes and returns them, leaving
    /// the rest in `self`.
    pub(super) fn take_front(&mut self, len: usize) -> Self {
        let mut front = self.clone();
        front.keep_front(len);
        self.skip_front(len);
        front
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        let window = 0..bytes.len();
        Self {
            bytes: bytes.into(),
            window,
        }
    }
}

impl From<&[u8]> for Chunk {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
            window: 0..bytes.len(),
        }
    }
}

impl<const N: usize> From<&[u8; N]> for Chunk {
    fn from(bytes: &[u8; N]) -> Self {
        Self::from(&bytes[..])
    }
}

impl<const N: usize> From<[u8; N]> for Chunk {
    fn from(bytes: [u8; N]) -> Self {
        Self::from(&bytes[..])
    }
}

impl From<&str> for Chunk {
    fn from(text: &str) -> Self {
        Self::from(text.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_front_shares_storage() {
        let mut chunk = Chunk::from("segment");
        let front = chunk.take_front(3);
        assert_eq!(front.as_slice(), b"seg");
        assert_eq!(chunk.as_slice(), b"ment");
        assert!(Arc::ptr_eq(&front.bytes, &chunk.bytes));

        chunk.skip_front(10);
        assert!(chunk.is_empty());
    }
}

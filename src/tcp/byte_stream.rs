use crate::Message;

/// The sending side's view of the bytes the application wants delivered.
pub trait ByteSource {
    /// Removes and returns up to `max_len` bytes. Returns fewer when fewer are
    /// available and never blocks.
    fn read(&mut self, max_len: usize) -> Message;

    /// Whether the writer has finished and every byte has been read.
    fn eof(&self) -> bool;
}

/// A bounded, in-order byte stream with a writing side and a reading side.
///
/// The stream never holds more than `capacity` unread bytes; writes beyond
/// that are cut short and the caller learns how much was accepted.
#[derive(Debug, Clone, Default)]
pub struct ByteStream {
    buffer: Message,
    capacity: usize,
    bytes_written: u64,
    bytes_read: u64,
    input_ended: bool,
}

impl ByteStream {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Writes as much of `data` as fits and returns the number of bytes
    /// accepted.
    pub fn write(&mut self, data: impl Into<Message>) -> usize {
        if self.input_ended {
            return 0;
        }
        let mut data = data.into();
        let accepted = data.len().min(self.remaining_capacity());
        data.truncate(accepted);
        self.buffer.concatenate(data);
        self.bytes_written += accepted as u64;
        accepted
    }

    /// Signals that no more bytes will be written.
    pub fn end_input(&mut self) {
        self.input_ended = true;
    }

    pub fn input_ended(&self) -> bool {
        self.input_ended
    }

    /// Copies up to `len` bytes from the front of the stream without
    /// consuming them.
    pub fn peek_output(&self, len: usize) -> Message {
        let mut out = self.buffer.clone();
        out.truncate(len);
        out
    }

    /// Discards up to `len` bytes from the front of the stream.
    pub fn pop_output(&mut self, len: usize) {
        let len = len.min(self.buffer.len());
        self.buffer.remove_front(len);
        self.bytes_read += len as u64;
    }

    /// Removes and returns up to `len` bytes from the front of the stream.
    pub fn read(&mut self, len: usize) -> Message {
        let len = len.min(self.buffer.len());
        self.bytes_read += len as u64;
        self.buffer.cut(len)
    }

    /// The number of bytes written but not yet read.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The number of additional bytes the stream can currently accept.
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    /// Whether input has ended and every byte has been read.
    pub fn eof(&self) -> bool {
        self.input_ended && self.buffer_empty()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl ByteSource for ByteStream {
    fn read(&mut self, max_len: usize) -> Message {
        ByteStream::read(self, max_len)
    }

    fn eof(&self) -> bool {
        ByteStream::eof(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_respects_capacity() {
        let mut stream = ByteStream::new(5);
        assert_eq!(stream.write(&b"abc"[..]), 3);
        assert_eq!(stream.write(&b"defg"[..]), 2);
        assert_eq!(stream.remaining_capacity(), 0);
        assert_eq!(stream.bytes_written(), 5);
        assert_eq!(stream.peek_output(10).to_vec(), b"abcde");

        stream.pop_output(2);
        assert_eq!(stream.remaining_capacity(), 2);
        assert_eq!(stream.read(10).to_vec(), b"cde");
        assert_eq!(stream.bytes_read(), 5);
        assert!(stream.buffer_empty());
    }

    #[test]
    fn eof_needs_end_and_drain() {
        let mut stream = ByteStream::new(16);
        stream.write(&b"hi"[..]);
        stream.end_input();
        assert!(stream.input_ended());
        assert!(!stream.eof());
        assert_eq!(stream.write(&b"more"[..]), 0);
        assert_eq!(ByteSource::read(&mut stream, 1).to_vec(), b"h");
        assert!(!ByteSource::eof(&stream));
        assert_eq!(ByteSource::read(&mut stream, 8).to_vec(), b"i");
        assert!(ByteSource::eof(&stream));
    }

    #[test]
    fn reading_an_empty_stream_returns_nothing() {
        let mut stream = ByteStream::new(4);
        assert!(stream.read(3).is_empty());
        stream.pop_output(3);
        assert_eq!(stream.bytes_read(), 0);
    }
}

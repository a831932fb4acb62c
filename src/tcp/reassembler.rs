use super::ByteStream;
use crate::Message;
use std::collections::BTreeMap;

/// The receiving side's view of the ordered stream being rebuilt from
/// segments.
pub trait Reassemble {
    /// Accepts `data` whose first byte sits at stream position `index`.
    /// Fragments may arrive out of order, overlap, or repeat. `eof` marks
    /// `data` as the final fragment of the stream.
    fn push_substring(&mut self, data: Message, index: u64, eof: bool);

    /// The number of bytes assembled in order so far.
    fn bytes_written(&self) -> u64;

    /// The number of assembled bytes the application has yet to read.
    fn buffered_byte_count(&self) -> usize;

    /// Whether the entire stream, through its last byte, has been assembled.
    fn input_ended(&self) -> bool;
}

/// Rebuilds an ordered [`ByteStream`] from fragments.
///
/// ```text
///   bytes_read      bytes_written           bytes_read + capacity
///  -----|---------------|-------------------------|-------
///       |  assembled,   |  pending (may have gaps) |
///       |  unread       |                          |
/// ```
///
/// Bytes before `bytes_written` were already delivered and are ignored.
/// Bytes at or past `bytes_read + capacity` do not fit and are dropped.
#[derive(Debug, Clone)]
pub struct StreamReassembler {
    /// Non-overlapping fragments waiting for the gap before them to fill,
    /// keyed by stream position
    pending: BTreeMap<u64, Message>,
    unassembled: usize,
    /// Stream position one past the final byte, once known
    end: Option<u64>,
    output: ByteStream,
    capacity: usize,
}

impl StreamReassembler {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Default::default(),
            unassembled: 0,
            end: None,
            output: ByteStream::new(capacity),
            capacity,
        }
    }

    /// The number of bytes held that have not yet been assembled.
    pub fn unassembled_bytes(&self) -> usize {
        self.unassembled
    }

    /// Whether no bytes are waiting on a gap.
    pub fn is_empty(&self) -> bool {
        self.unassembled == 0
    }

    pub fn stream_out(&self) -> &ByteStream {
        &self.output
    }

    pub fn stream_out_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }

    /// Stores the parts of `data` (positioned at `start`) that are not
    /// already pending.
    fn store(&mut self, data: Message, start: u64) {
        let end = start + data.len() as u64;
        let occupied: Vec<(u64, u64)> = self
            .pending
            .range(..end)
            .map(|(&at, fragment)| (at, at + fragment.len() as u64))
            .filter(|&(_, fragment_end)| fragment_end > start)
            .collect();

        let mut cursor = start;
        for (fragment_start, fragment_end) in occupied {
            if cursor < fragment_start {
                self.store_piece(&data, start, cursor, fragment_start);
            }
            cursor = cursor.max(fragment_end);
        }
        if cursor < end {
            self.store_piece(&data, start, cursor, end);
        }
    }

    fn store_piece(&mut self, data: &Message, data_start: u64, from: u64, to: u64) {
        let mut piece = data.clone();
        piece.slice((from - data_start) as usize..(to - data_start) as usize);
        self.unassembled += piece.len();
        self.pending.insert(from, piece);
    }

    /// Drops pending bytes at or past stream position `end`.
    fn discard_past(&mut self, end: u64) {
        for fragment in self.pending.split_off(&end).into_values() {
            self.unassembled -= fragment.len();
        }
        if let Some(mut last) = self.pending.last_entry() {
            let at = *last.key();
            let fragment = last.get_mut();
            let fragment_end = at + fragment.len() as u64;
            if fragment_end > end {
                self.unassembled -= (fragment_end - end) as usize;
                fragment.truncate((end - at) as usize);
            }
        }
    }

    /// Moves every fragment that now lines up with the end of the output
    /// stream into it.
    fn assemble(&mut self) {
        while let Some((&at, _)) = self.pending.first_key_value() {
            if at != self.output.bytes_written() {
                break;
            }
            let Some((_, fragment)) = self.pending.pop_first() else {
                break;
            };
            // Always fits: pending fragments never extend past
            // bytes_read + capacity
            self.unassembled -= fragment.len();
            self.output.write(fragment);
        }

        if self.end == Some(self.output.bytes_written()) {
            self.output.end_input();
        }
    }
}

impl Reassemble for StreamReassembler {
    fn push_substring(&mut self, data: Message, index: u64, eof: bool) {
        let first_unassembled = self.output.bytes_written();
        let first_unacceptable = self.output.bytes_read() + self.capacity as u64;
        let data_end = index + data.len() as u64;

        if eof && data_end <= first_unacceptable {
            self.end = Some(data_end);
            self.discard_past(data_end);
        }

        // Nothing past the final byte belongs to the stream
        let start = index.max(first_unassembled);
        let end = data_end
            .min(first_unacceptable)
            .min(self.end.unwrap_or(u64::MAX));
        if start < end {
            let mut data = data;
            data.slice((start - index) as usize..(end - index) as usize);
            self.store(data, start);
        } else if data_end > first_unacceptable {
            tracing::trace!(index, len = data.len(), "fragment lies beyond the window");
        }

        self.assemble();
    }

    fn bytes_written(&self) -> u64 {
        self.output.bytes_written()
    }

    fn buffered_byte_count(&self) -> usize {
        self.output.buffer_size()
    }

    fn input_ended(&self) -> bool {
        self.output.input_ended()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(reassembler: &mut StreamReassembler, data: &str, index: u64, eof: bool) {
        reassembler.push_substring(Message::new(data), index, eof);
    }

    fn read_all(reassembler: &mut StreamReassembler) -> Vec<u8> {
        let stream = reassembler.stream_out_mut();
        let len = stream.buffer_size();
        stream.read(len).to_vec()
    }

    #[test]
    fn in_order() {
        let mut r = StreamReassembler::new(65000);
        push(&mut r, "abcd", 0, false);
        push(&mut r, "efgh", 4, false);
        assert_eq!(r.bytes_written(), 8);
        assert_eq!(read_all(&mut r), b"abcdefgh");
        assert!(r.is_empty());
        assert!(!r.input_ended());
    }

    #[test]
    fn out_of_order_with_gaps() {
        let mut r = StreamReassembler::new(65000);
        push(&mut r, "b", 1, false);
        push(&mut r, "d", 3, false);
        assert_eq!(r.bytes_written(), 0);
        assert_eq!(r.unassembled_bytes(), 2);

        push(&mut r, "abc", 0, false);
        assert_eq!(r.bytes_written(), 4);
        assert_eq!(r.unassembled_bytes(), 0);
        assert_eq!(read_all(&mut r), b"abcd");
    }

    #[test]
    fn overlapping_fragments_count_once() {
        let mut r = StreamReassembler::new(65000);
        push(&mut r, "cdef", 2, false);
        push(&mut r, "bcdefgh", 1, false);
        assert_eq!(r.unassembled_bytes(), 7);
        push(&mut r, "ab", 0, false);
        assert_eq!(r.bytes_written(), 8);
        assert_eq!(read_all(&mut r), b"abcdefgh");

        // Entirely stale data is ignored
        push(&mut r, "abc", 0, false);
        assert_eq!(r.bytes_written(), 8);
        assert_eq!(r.buffered_byte_count(), 0);
    }

    #[test]
    fn capacity_drops_excess() {
        let mut r = StreamReassembler::new(2);
        push(&mut r, "ab", 0, false);
        assert_eq!(r.bytes_written(), 2);
        push(&mut r, "cd", 2, false);
        assert_eq!(r.bytes_written(), 2);
        assert_eq!(r.unassembled_bytes(), 0);

        assert_eq!(read_all(&mut r), b"ab");
        push(&mut r, "cdef", 2, false);
        assert_eq!(r.bytes_written(), 4);
        assert_eq!(read_all(&mut r), b"cd");
    }

    #[test]
    fn eof_after_gap_fills() {
        let mut r = StreamReassembler::new(65000);
        push(&mut r, "z", 3, true);
        assert!(!r.input_ended());
        push(&mut r, "abc", 0, false);
        assert!(r.input_ended());
        assert_eq!(read_all(&mut r), b"abcz");
        assert!(r.stream_out().eof());
    }

    #[test]
    fn truncated_eof_is_not_recorded() {
        let mut r = StreamReassembler::new(3);
        push(&mut r, "abcd", 0, true);
        assert_eq!(r.bytes_written(), 3);
        assert!(!r.input_ended());
        read_all(&mut r);
        push(&mut r, "d", 3, true);
        assert!(r.input_ended());
    }

    #[test]
    fn bytes_past_eof_are_ignored() {
        let mut r = StreamReassembler::new(65000);
        push(&mut r, "c", 2, true);
        push(&mut r, "abcd", 0, false);
        assert_eq!(r.bytes_written(), 3);
        assert!(r.input_ended());
        assert_eq!(read_all(&mut r), b"abc");

        push(&mut r, "cdef", 2, false);
        assert_eq!(r.bytes_written(), 3);
        assert_eq!(r.buffered_byte_count(), 0);
    }

    #[test]
    fn eof_trims_fragments_already_pending() {
        let mut r = StreamReassembler::new(65000);
        push(&mut r, "cdef", 2, false);
        push(&mut r, "xyz", 8, false);
        assert_eq!(r.unassembled_bytes(), 7);

        push(&mut r, "d", 3, true);
        assert_eq!(r.unassembled_bytes(), 2);
        push(&mut r, "ab", 0, false);
        assert!(r.input_ended());
        assert_eq!(read_all(&mut r), b"abcd");
        assert!(r.is_empty());
    }

    #[test]
    fn empty_eof_ends_immediately() {
        let mut r = StreamReassembler::new(10);
        push(&mut r, "", 0, true);
        assert!(r.input_ended());
        assert_eq!(r.bytes_written(), 0);
    }
}

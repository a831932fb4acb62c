use super::{
    ByteStream, Reassemble, ReceiverState, Segment, StreamReassembler, TcpHeaderBuilder,
    WrappingU32,
};
use crate::logging::{segment_event, Direction};

/// The receiving half of a TCP connection. Turns segments into an ordered
/// stream and works out what to acknowledge and how much window to offer.
#[derive(Debug, Clone)]
pub struct TcpReceiver<R = StreamReassembler> {
    phase: Phase,
    reassembler: R,
    capacity: usize,
}

/// Whether a SYN has been seen. The FIN-RECEIVED state is read off the
/// reassembler instead so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Listen,
    Open { isn: WrappingU32 },
}

impl TcpReceiver {
    /// Creates a receiver that buffers at most `capacity` unread or
    /// unassembled bytes.
    pub fn new(capacity: usize) -> Self {
        Self::with_reassembler(StreamReassembler::new(capacity), capacity)
    }

    /// The number of bytes held out of order.
    pub fn unassembled_bytes(&self) -> usize {
        self.reassembler.unassembled_bytes()
    }

    /// The reassembled stream, for the application to read from.
    pub fn stream_out(&self) -> &ByteStream {
        self.reassembler.stream_out()
    }

    pub fn stream_out_mut(&mut self) -> &mut ByteStream {
        self.reassembler.stream_out_mut()
    }
}

impl<R: Reassemble> TcpReceiver<R> {
    /// Creates a receiver around an existing reassembler.
    pub fn with_reassembler(reassembler: R, capacity: usize) -> Self {
        Self {
            phase: Phase::Listen,
            reassembler,
            capacity,
        }
    }

    /// Hands the payload of `seg` to the reassembler. Segments that arrive
    /// before the first SYN are dropped.
    pub fn segment_received(&mut self, seg: Segment) {
        segment_event(Direction::Received, &seg);
        let header = seg.header;
        let isn = match self.phase {
            Phase::Open { isn } => isn,
            Phase::Listen if header.ctl.syn() => {
                self.phase = Phase::Open { isn: header.seq };
                tracing::debug!(isn = %header.seq, "SYN received");
                header.seq
            }
            Phase::Listen => {
                tracing::trace!(seq = %header.seq, "dropping segment received before SYN");
                return;
            }
        };

        let checkpoint = self.reassembler.bytes_written() + 1;
        let absolute = header.seq.unwrap(isn, checkpoint);
        // The SYN occupies absolute position 0 and carries no stream byte, so
        // stream index = absolute - 1, except that a SYN segment's payload
        // starts at index 0. A non-SYN segment claiming position 0 is bogus;
        // its payload cannot have a stream index.
        let Some(index) = (absolute + header.ctl.syn() as u64).checked_sub(1) else {
            tracing::trace!(seq = %header.seq, "dropping segment that overlaps the ISN");
            return;
        };
        self.reassembler.push_substring(seg.text, index, header.ctl.fin());
    }

    /// The acknowledgment number to send: the sequence number of the next
    /// octet expected. `None` until a SYN has been received.
    pub fn ackno(&self) -> Option<WrappingU32> {
        let Phase::Open { isn } = self.phase else {
            return None;
        };
        // One for the SYN, and one more for the FIN once it is assembled
        let next = self.reassembler.bytes_written() + 1 + self.reassembler.input_ended() as u64;
        Some(WrappingU32::wrap(next, isn))
    }

    /// How many more bytes the receiver is willing to accept.
    pub fn window_size(&self) -> usize {
        self.capacity.saturating_sub(self.reassembler.buffered_byte_count())
    }

    pub fn state(&self) -> ReceiverState {
        match self.phase {
            Phase::Listen => ReceiverState::Listen,
            Phase::Open { .. } if self.reassembler.input_ended() => ReceiverState::FinReceived,
            Phase::Open { .. } => ReceiverState::SynReceived,
        }
    }

    /// The peer's initial sequence number, once known.
    pub fn isn(&self) -> Option<WrappingU32> {
        match self.phase {
            Phase::Listen => None,
            Phase::Open { isn } => Some(isn),
        }
    }

    /// Adds the acknowledgment number (if known) and the window, clamped to
    /// what the header can carry, to an outgoing header.
    pub fn stamp(&self, builder: TcpHeaderBuilder) -> TcpHeaderBuilder {
        let wnd = self.window_size().min(u16::MAX as usize) as u16;
        let builder = builder.wnd(wnd);
        match self.ackno() {
            Some(ackno) => builder.ack(ackno),
            None => builder,
        }
    }

    pub fn reassembler(&self) -> &R {
        &self.reassembler
    }
}

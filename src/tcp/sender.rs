use super::{
    ByteSource, ByteStream, Outstanding, RetransmissionTimer, Segment, SenderState, TcpConfig,
    TcpHeaderBuilder, WrappingU32,
};
use crate::{
    logging::{segment_event, Direction},
    Message,
};
use rand::RngCore;
use std::{collections::VecDeque, time::Duration};


/// The sending half of a TCP connection.
///
/// Reads from a [`ByteSource`], cuts what it reads into segments that fit the
/// peer's advertised window, and keeps every segment until a cumulative
/// acknowledgment covers all of it. The oldest unacknowledged segment is
/// retransmitted whenever the retransmission timer runs out.
///
/// ```text
///          acknowledged      outstanding       window left
///  ----------------------|-----------------|-----------------|--------
///                    oldest            next_seqno      ack + window
///                 outstanding
/// ```
///
/// Segments are not sent directly; they are queued and drained by the caller
/// with [`TcpSender::segments`].
#[derive(Debug, Clone)]
pub struct TcpSender<S = ByteStream> {
    isn: WrappingU32,
    /// Absolute sequence number of the next octet to be sent
    next_seqno: u64,
    phase: Phase,
    outstanding: Outstanding,
    /// The window most recently advertised by the peer. Starts at one so the
    /// SYN can go out before anything is heard from the peer.
    window: u16,
    timer: RetransmissionTimer,
    consecutive_retransmissions: u32,
    max_payload_size: usize,
    stream: S,
    queue: VecDeque<Segment>,
}

/// How far through the stream the sender has got. Moves forward only, so a
/// FIN can never precede the SYN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The SYN has not been sent
    Idle,
    /// The SYN has been sent and the FIN has not
    Sending,
    /// The FIN has been sent
    FinSent,
}

impl TcpSender {
    /// Creates a sender with an empty outgoing stream of
    /// `config.send_capacity` bytes.
    pub fn new(config: TcpConfig) -> Self {
        Self::with_stream(config, ByteStream::new(config.send_capacity))
    }
}

impl<S: ByteSource> TcpSender<S> {
    /// Creates a sender that reads from `stream`. The ISN is
    /// `config.fixed_isn` if set and random otherwise.
    pub fn with_stream(config: TcpConfig, stream: S) -> Self {
        Self::with_rng(config, stream, &mut rand::thread_rng())
    }

    /// Creates a sender that reads from `stream`, drawing the ISN from `rng`
    /// unless `config.fixed_isn` is set.
    pub fn with_rng(config: TcpConfig, stream: S, rng: &mut impl RngCore) -> Self {
        let isn = config
            .fixed_isn
            .unwrap_or_else(|| WrappingU32::new(rng.next_u32()));
        Self {
            isn,
            next_seqno: 0,
            phase: Phase::Idle,
            outstanding: Default::default(),
            window: 1,
            timer: RetransmissionTimer::new(config.rt_timeout),
            consecutive_retransmissions: 0,
            max_payload_size: config.max_payload_size,
            stream,
            queue: Default::default(),
        }
    }

    /// Sends as many segments as the peer's window allows.
    ///
    /// An advertised window of zero is treated as one so that a single octet
    /// (or flag) keeps probing the peer until the window reopens.
    pub fn fill_window(&mut self) {
        let window = self.window.max(1) as u64;
        while self.phase != Phase::FinSent && self.bytes_in_flight() < window {
            let syn = self.phase == Phase::Idle;
            let mut header = TcpHeaderBuilder::new(self.next_seqno());
            if syn {
                header = header.syn();
            }

            let room = window - self.bytes_in_flight() - syn as u64;
            let text = self
                .stream
                .read(room.min(self.max_payload_size as u64) as usize);

            // The FIN needs a sequence number of its own inside the window
            let fin = self.stream.eof() && text.len() as u64 + self.bytes_in_flight() < window;
            if fin {
                header = header.fin();
            }

            let segment = Segment::new(header.build(), text);
            let len = segment.length_in_sequence_space();
            if len == 0 {
                break;
            }

            self.phase = if fin { Phase::FinSent } else { Phase::Sending };
            if self.outstanding.is_empty() {
                self.timer.restart();
            }
            segment_event(Direction::Sent, &segment);
            self.queue.push_back(segment.clone());
            self.outstanding.push(self.next_seqno, segment);
            self.next_seqno += len;
        }
    }

    /// Processes an acknowledgment and window advertisement from the peer,
    /// then sends whatever the new window allows.
    ///
    /// An `ackno` for data never sent is ignored entirely.
    pub fn ack_received(&mut self, ackno: WrappingU32, window_size: u16) {
        let absolute = ackno.unwrap(self.isn, self.next_seqno);
        if absolute > self.next_seqno {
            tracing::debug!(
                %ackno,
                next_seqno = self.next_seqno,
                "ignoring acknowledgment of unsent data"
            );
            return;
        }

        if self.outstanding.acknowledge(absolute) > 0 {
            self.timer.restart();
        }
        // Any acceptable acknowledgment shows the peer is alive, even one that
        // retires nothing
        self.consecutive_retransmissions = 0;
        self.window = window_size;
        self.fill_window();
    }

    /// Advances the retransmission timer by `elapsed`, retransmitting the
    /// oldest outstanding segment if the timer runs out.
    pub fn tick(&mut self, elapsed: Duration) {
        self.timer.advance(elapsed);
        let Some(oldest) = self.outstanding.oldest() else {
            return;
        };
        if !self.timer.expired() {
            return;
        }

        let segment = oldest.clone();
        // A timeout with the window shut is only an unanswered probe, not a
        // sign of congestion
        if self.window > 0 {
            self.timer.back_off();
        }
        self.timer.rearm();
        self.consecutive_retransmissions += 1;
        tracing::debug!(
            seq = %segment.header.seq,
            rto_ms = self.timer.rto_millis(),
            attempt = self.consecutive_retransmissions,
            "retransmission timeout"
        );
        segment_event(Direction::Retransmitted, &segment);
        self.queue.push_back(segment);
    }

    /// The number of retransmissions since the last acceptable
    /// acknowledgment. The connection decides when this is too many.
    pub fn consecutive_retransmissions(&self) -> u32 {
        self.consecutive_retransmissions
    }

    /// Queues a segment that occupies no sequence space, for carrying a bare
    /// acknowledgment.
    pub fn send_empty_segment(&mut self) {
        let header = TcpHeaderBuilder::new(self.next_seqno()).build();
        let segment = Segment::new(header, Message::default());
        segment_event(Direction::Sent, &segment);
        self.queue.push_back(segment);
    }

    /// Drains the queue of segments waiting to go out, oldest first.
    pub fn segments(&mut self) -> Vec<Segment> {
        self.queue.drain(..).collect()
    }

    pub fn state(&self) -> SenderState {
        match self.phase {
            Phase::Idle => SenderState::Closed,
            Phase::Sending if self.next_seqno == self.bytes_in_flight() => SenderState::SynSent,
            Phase::Sending => SenderState::SynAcked,
            Phase::FinSent if self.bytes_in_flight() > 0 => SenderState::FinSent,
            Phase::FinSent => SenderState::FinAcked,
        }
    }

    pub fn isn(&self) -> WrappingU32 {
        self.isn
    }

    /// The absolute sequence number of the next octet to be sent.
    pub fn next_seqno_absolute(&self) -> u64 {
        self.next_seqno
    }

    /// The sequence number of the next octet to be sent.
    pub fn next_seqno(&self) -> WrappingU32 {
        WrappingU32::wrap(self.next_seqno, self.isn)
    }

    /// The number of sequence numbers sent but not yet acknowledged.
    pub fn bytes_in_flight(&self) -> u64 {
        self.outstanding.bytes_in_flight()
    }

    pub fn outstanding(&self) -> &Outstanding {
        &self.outstanding
    }

    /// The current retransmission timeout, including any backoff.
    pub fn current_rto(&self) -> Duration {
        self.timer.rto()
    }

    /// The outgoing stream the sender reads from.
    pub fn stream_in(&self) -> &S {
        &self.stream
    }

    pub fn stream_in_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

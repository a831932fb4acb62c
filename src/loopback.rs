//! One sender connected directly to one receiver in the same process.
//!
//! There is no network in between, only a link that can be switched off to
//! lose segments. Acknowledgments travel back over the same link as bare
//! headers built by [`TcpReceiver::stamp`].

use crate::tcp::{
    ConfigError, ReceiverState, SenderState, TcpConfig, TcpHeaderBuilder, TcpReceiver, TcpSender,
};
use std::time::Duration;
use thiserror::Error as ThisError;

/// A sender and the receiver it is sending to.
#[derive(Debug)]
pub struct Loopback {
    sender: TcpSender,
    receiver: TcpReceiver,
    max_retx_attempts: u32,
    link_up: bool,
    stats: LoopbackStats,
}

/// Counters describing what has crossed the link so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopbackStats {
    /// Segments handed to the link by the sender, retransmissions included
    pub segments_sent: u64,
    /// Segments the link dropped while it was down
    pub segments_lost: u64,
    pub retransmissions: u64,
    /// Acknowledgments that made it back to the sender
    pub acks_delivered: u64,
}

impl Loopback {
    pub fn new(config: TcpConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sender: TcpSender::new(config),
            receiver: TcpReceiver::new(config.recv_capacity),
            max_retx_attempts: config.max_retx_attempts,
            link_up: true,
            stats: Default::default(),
        })
    }

    /// Queues bytes for sending and returns how many fit in the outgoing
    /// stream.
    pub fn write(&mut self, data: &[u8]) -> usize {
        self.sender.stream_in_mut().write(data)
    }

    /// Ends the outgoing stream. The FIN goes out once everything before it
    /// has been sent.
    pub fn close(&mut self) {
        self.sender.stream_in_mut().end_input();
    }

    /// Takes every byte the receiver has assembled so far.
    pub fn read(&mut self) -> Vec<u8> {
        let stream = self.receiver.stream_out_mut();
        stream.read(stream.buffer_size()).to_vec()
    }

    /// While the link is down every segment in either direction is lost.
    pub fn set_link_up(&mut self, up: bool) {
        if up != self.link_up {
            tracing::debug!(up, "link state changed");
        }
        self.link_up = up;
    }

    /// Lets `elapsed` pass, then moves one round of segments across the link
    /// and returns a single acknowledgment for them.
    pub fn step(&mut self, elapsed: Duration) -> Result<(), TransferError> {
        let before = self.sender.consecutive_retransmissions();
        self.sender.tick(elapsed);
        let attempts = self.sender.consecutive_retransmissions();
        if attempts > before {
            self.stats.retransmissions += 1;
        }
        if attempts > self.max_retx_attempts {
            tracing::info!(attempts, "giving up on the connection");
            Err(TransferError::RetransmissionLimit { attempts })?
        }

        self.sender.fill_window();
        for segment in self.sender.segments() {
            self.stats.segments_sent += 1;
            if self.link_up {
                self.receiver.segment_received(segment);
            } else {
                self.stats.segments_lost += 1;
            }
        }

        // Nothing can be acknowledged before the SYN has arrived
        let reply = self
            .receiver
            .stamp(TcpHeaderBuilder::new(Default::default()))
            .build();
        if self.link_up && reply.ctl.ack() {
            self.stats.acks_delivered += 1;
            self.sender.ack_received(reply.ack, reply.wnd);
        }
        Ok(())
    }

    /// Whether the whole stream, FIN included, has been delivered and
    /// acknowledged.
    pub fn is_finished(&self) -> bool {
        self.receiver.state() == ReceiverState::FinReceived
            && self.sender.state() == SenderState::FinAcked
    }

    pub fn link_up(&self) -> bool {
        self.link_up
    }

    pub fn stats(&self) -> LoopbackStats {
        self.stats
    }

    pub fn sender(&self) -> &TcpSender {
        &self.sender
    }

    pub fn receiver(&self) -> &TcpReceiver {
        &self.receiver
    }
}

#[derive(Debug, ThisError, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    #[error("Gave up after {attempts} consecutive retransmissions")]
    RetransmissionLimit { attempts: u32 },
}

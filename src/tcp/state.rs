use std::fmt::{self, Display};

/// Where the receiving half of a connection stands. States only ever move
/// forward through the list below.
///
/// ```text
///   +--------+  rcv SYN   +--------------+  FIN assembled  +--------------+
///   | LISTEN |----------->| SYN-RECEIVED |---------------->| FIN-RECEIVED |
///   +--------+            +--------------+                 +--------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReceiverState {
    /// No SYN has arrived, so there is no ISN to acknowledge against.
    Listen,
    /// The stream is open and bytes are being reassembled.
    SynReceived,
    /// Every byte through the peer's FIN has been assembled.
    FinReceived,
}

/// Where the sending half of a connection stands, derived from what has been
/// sent and what the peer has acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SenderState {
    /// Nothing has been sent yet, not even the SYN.
    Closed,
    /// The SYN is out but not yet acknowledged.
    SynSent,
    /// The SYN has been acknowledged and the stream is still being sent.
    SynAcked,
    /// The FIN is out but not everything through it has been acknowledged.
    FinSent,
    /// Every byte, the SYN, and the FIN have been acknowledged.
    FinAcked,
}

impl Display for ReceiverState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReceiverState::Listen => write!(f, "LISTEN"),
            ReceiverState::SynReceived => write!(f, "SYN-RECEIVED"),
            ReceiverState::FinReceived => write!(f, "FIN-RECEIVED"),
        }
    }
}

impl Display for SenderState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SenderState::Closed => write!(f, "CLOSED"),
            SenderState::SynSent => write!(f, "SYN-SENT"),
            SenderState::SynAcked => write!(f, "SYN-ACKED"),
            SenderState::FinSent => write!(f, "FIN-SENT"),
            SenderState::FinAcked => write!(f, "FIN-ACKED"),
        }
    }
}

//! The sending and receiving halves of the [Transmission Control
//! Protocol](https://www.rfc-editor.org/rfc/rfc9293.html).
//!
//! A connection is made of a [`TcpSender`], which turns an outgoing
//! [`ByteStream`] into segments and retransmits them until they are
//! acknowledged, and a [`TcpReceiver`], which puts incoming segments back in
//! order and computes the acknowledgment number and window to advertise.
//! Neither half does any I/O or reads a clock. Segments are handed over as
//! values and time only passes when the owner calls [`TcpSender::tick`].
//!
//! Sequence numbers on the wire are 32 bits and start at a random initial
//! sequence number (ISN). Internally both halves count in 64-bit absolute
//! sequence numbers starting at zero for the SYN. [`WrappingU32`] converts
//! between the two.

mod byte_stream;
pub use byte_stream::{ByteSource, ByteStream};

mod config;
pub use config::{ConfigError, TcpConfig};

mod header;
pub use header::{Control, TcpHeader, TcpHeaderBuilder};

mod outstanding;
pub use outstanding::Outstanding;

mod reassembler;
pub use reassembler::{Reassemble, StreamReassembler};

mod receiver;
pub use receiver::TcpReceiver;

mod segment;
pub use segment::Segment;

mod sender;
pub use sender::TcpSender;

mod state;
pub use state::{ReceiverState, SenderState};

mod timer;
pub use timer::RetransmissionTimer;

pub mod wrapping;
pub use wrapping::WrappingU32;

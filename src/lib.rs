//! The core of a TCP implementation: the sender, the receiver, and the
//! sequence number arithmetic between them.
//!
//! # Organization
//! - [`Message`](message::Message) is the byte collection every layer passes
//!   around
//! - [`tcp`] holds the sender and receiver halves of a connection along with
//!   the byte stream and reassembler they are built on
//! - [`Loopback`](loopback::Loopback) wires one sender to one receiver in
//!   process, which is what the `elvis-tcp` binary and the integration tests
//!   drive
//!
//! # Structure
//!
//! Nothing in this crate owns a socket, a thread, or a clock. A sender hands
//! out [`Segment`](tcp::Segment)s through
//! [`TcpSender::segments`](tcp::TcpSender::segments) and learns about time
//! only through [`TcpSender::tick`](tcp::TcpSender::tick). A receiver takes
//! segments through
//! [`TcpReceiver::segment_received`](tcp::TcpReceiver::segment_received) and
//! reports the acknowledgment number and window the other side should be
//! told about. Putting the two on a real network is the job of a connection
//! layer on top.

pub mod cli;
pub mod logging;
pub mod loopback;

pub mod message;
pub use message::Message;

pub mod tcp;

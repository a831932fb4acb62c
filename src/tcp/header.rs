use super::WrappingU32;
use std::{
    fmt,
    ops::{BitOr, BitOrAssign},
};

/// The header fields that the sender and receiver act on. Ports, checksums and
/// options belong to whatever puts segments on the wire.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq)]
pub struct TcpHeader {
    /// Sequence number of the first octet of the segment, or the ISN when
    /// the SYN flag is set
    pub seq: WrappingU32,
    /// The next sequence number the sender of this segment expects to
    /// receive. Meaningful only with the ACK flag.
    pub ack: WrappingU32,
    pub ctl: Control,
    /// How many octets, starting at `ack`, the sender of this segment is
    /// prepared to accept
    pub wnd: u16,
}

/// Assembles a [`TcpHeader`] one field at a time.
///
/// ```
/// # use elvis_tcp::tcp::{Control, TcpHeaderBuilder, WrappingU32};
/// let header = TcpHeaderBuilder::new(WrappingU32::new(100))
///     .syn()
///     .wnd(512)
///     .build();
/// assert_eq!(header.ctl, Control::SYN);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TcpHeaderBuilder {
    header: TcpHeader,
}

impl TcpHeaderBuilder {
    /// Starts a header at sequence number `seq` with no flags and a zero
    /// window.
    pub fn new(seq: WrappingU32) -> Self {
        Self {
            header: TcpHeader {
                seq,
                ..Default::default()
            },
        }
    }

    pub fn wnd(mut self, wnd: u16) -> Self {
        self.header.wnd = wnd;
        self
    }

    /// Sets the acknowledgment number along with the ACK flag.
    pub fn ack(mut self, ack: WrappingU32) -> Self {
        self.header.ack = ack;
        self.header.ctl |= Control::ACK;
        self
    }

    pub fn syn(mut self) -> Self {
        self.header.ctl |= Control::SYN;
        self
    }

    pub fn fin(mut self) -> Self {
        self.header.ctl |= Control::FIN;
        self
    }

    pub fn build(self) -> TcpHeader {
        self.header
    }
}

/// The control flags of a segment, stored at their on-the-wire bit positions
/// in the TCP flags octet.
#[derive(Default, Hash, PartialEq, Eq, Clone, Copy)]
pub struct Control(u8);

impl Control {
    pub const FIN: Self = Self(1 << 0);
    pub const SYN: Self = Self(1 << 1);
    pub const ACK: Self = Self(1 << 4);

    const NAMED: [(Self, &'static str); 3] =
        [(Self::ACK, "ACK"), (Self::SYN, "SYN"), (Self::FIN, "FIN")];

    /// Whether every flag in `flags` is set.
    pub const fn contains(self, flags: Self) -> bool {
        self.0 & flags.0 == flags.0
    }

    pub fn set(&mut self, flags: Self, on: bool) {
        if on {
            self.0 |= flags.0;
        } else {
            self.0 &= !flags.0;
        }
    }

    pub const fn ack(self) -> bool {
        self.contains(Self::ACK)
    }

    pub const fn syn(self) -> bool {
        self.contains(Self::SYN)
    }

    pub const fn fin(self) -> bool {
        self.contains(Self::FIN)
    }
}

impl BitOr for Control {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Control {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<u8> for Control {
    fn from(flags: u8) -> Self {
        Self(flags)
    }
}

impl From<Control> for u8 {
    fn from(control: Control) -> Self {
        control.0
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Control({})", names.join(", "))
    }
}

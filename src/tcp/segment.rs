use super::TcpHeader;
use crate::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub header: TcpHeader,
    pub text: Message,
}

impl Segment {
    pub fn new(header: TcpHeader, text: Message) -> Self {
        Self { header, text }
    }

    /// The number of sequence numbers the segment occupies: its payload plus
    /// one for each of SYN and FIN
    pub fn length_in_sequence_space(&self) -> u64 {
        self.text.len() as u64 + self.header.ctl.syn() as u64 + self.header.ctl.fin() as u64
    }
}

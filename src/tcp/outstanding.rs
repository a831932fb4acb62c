use super::Segment;
use std::collections::BTreeMap;

/// Segments that have been sent but not yet fully acknowledged, ordered by the
/// absolute sequence number of their first octet.
///
/// Segments are never re-split, so keys are strictly increasing and the spans
/// they start never overlap. A cumulative acknowledgment therefore retires a
/// prefix of the collection.
#[derive(Debug, Clone, Default)]
pub struct Outstanding {
    segments: BTreeMap<u64, Segment>,
    /// Sum of the sequence-space lengths of every segment held
    bytes_in_flight: u64,
}

impl Outstanding {
    /// Records `segment`, which starts at absolute sequence number `start`.
    pub fn push(&mut self, start: u64, segment: Segment) {
        debug_assert!(self
            .segments
            .last_key_value()
            .map_or(true, |(&last, seg)| last + seg.length_in_sequence_space() <= start));
        self.bytes_in_flight += segment.length_in_sequence_space();
        self.segments.insert(start, segment);
    }

    /// Removes every segment whose entire span lies before `ackno` and returns
    /// how many were removed. A segment only partly covered stays.
    pub fn acknowledge(&mut self, ackno: u64) -> usize {
        let mut removed = 0;
        while let Some(entry) = self.segments.first_entry() {
            let span = entry.get().length_in_sequence_space();
            if *entry.key() + span > ackno {
                break;
            }
            entry.remove();
            self.bytes_in_flight -= span;
            removed += 1;
        }
        removed
    }

    /// The segment with the lowest sequence number.
    pub fn oldest(&self) -> Option<&Segment> {
        self.segments.first_key_value().map(|(_, segment)| segment)
    }

    pub fn bytes_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterates over `(start, segment)` pairs in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Segment)> {
        self.segments.iter().map(|(&start, segment)| (start, segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        tcp::{TcpHeaderBuilder, WrappingU32},
        Message,
    };

    fn segment(len: usize) -> Segment {
        Segment::new(
            TcpHeaderBuilder::new(WrappingU32::new(0)).build(),
            Message::new(vec![0; len]),
        )
    }

    #[test]
    fn partial_coverage_keeps_segment() {
        let mut outstanding = Outstanding::default();
        outstanding.push(1, segment(10));
        outstanding.push(11, segment(10));
        assert_eq!(outstanding.bytes_in_flight(), 20);

        assert_eq!(outstanding.acknowledge(15), 1);
        assert_eq!(outstanding.len(), 1);
        assert_eq!(outstanding.bytes_in_flight(), 10);
        assert_eq!(outstanding.iter().next().map(|(start, _)| start), Some(11));

        assert_eq!(outstanding.acknowledge(21), 1);
        assert!(outstanding.is_empty());
        assert_eq!(outstanding.bytes_in_flight(), 0);
        assert!(outstanding.oldest().is_none());
    }

    #[test]
    fn acknowledge_nothing() {
        let mut outstanding = Outstanding::default();
        outstanding.push(0, segment(1));
        assert_eq!(outstanding.acknowledge(0), 0);
        assert_eq!(outstanding.len(), 1);
    }
}

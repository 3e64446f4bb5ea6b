// SPDX-License-Identifier: GPL-3.0-only

//! Report framing and packetization
//!
//! A finished cycle frames its four values as `A` + four 4-digit fields +
//! `B`, 18 ASCII bytes. The UART leg narrows that further: each report
//! sends exactly one 11-byte packet carrying half the carrier, and the
//! half alternates across reports. The downstream controller stitches a
//! full reading together from two consecutive packets.

use crate::constants::wire;

/// Encode a slot value into fixed-width ASCII digits
///
/// Values beyond the field maximum clamp to all nines rather than widening
/// the field; the wire format is fixed length.
pub fn encode_value(value: u32) -> [u8; wire::VALUE_WIDTH] {
    let mut rest = value.min(wire::VALUE_MAX);
    let mut digits = [b'0'; wire::VALUE_WIDTH];
    for slot in digits.iter_mut().rev() {
        *slot = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    digits
}

/// One scan cycle's finalized values, in region order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    values: Vec<u32>,
}

impl Report {
    /// Frame a cycle's values
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }

    /// Finalized values in region order
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// The full wire frame: head, each encoded value, tail
    pub fn wire_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.values.len() * wire::VALUE_WIDTH);
        bytes.push(wire::HEAD);
        for &value in &self.values {
            bytes.extend_from_slice(&encode_value(value));
        }
        bytes.push(wire::TAIL);
        bytes
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.wire_bytes()))
    }
}

/// Which half of the carrier the next packet carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacketIndex {
    /// Regions 1 and 2
    #[default]
    One,
    /// Regions 3 and 4
    Two,
}

impl PacketIndex {
    /// Index digit as it appears on the wire
    pub fn digit(&self) -> u8 {
        match self {
            PacketIndex::One => b'1',
            PacketIndex::Two => b'2',
        }
    }

    /// Index as a number, 1 or 2
    pub fn number(&self) -> u8 {
        self.digit() - b'0'
    }

    /// 0-based offset of the first report value this index carries
    fn value_offset(&self) -> usize {
        match self {
            PacketIndex::One => 0,
            PacketIndex::Two => 2,
        }
    }

    fn flipped(&self) -> Self {
        match self {
            PacketIndex::One => PacketIndex::Two,
            PacketIndex::Two => PacketIndex::One,
        }
    }
}

/// One transmission unit: head, index digit, two values, tail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    bytes: [u8; wire::PACKET_LEN],
}

impl Packet {
    /// The packet exactly as it goes on the wire
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Index digit value, 1 or 2
    pub fn index(&self) -> u8 {
        self.bytes[1] - b'0'
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

/// Splits reports into alternating half-carrier packets
///
/// Holds the ping-pong index and the activity indicator. Exactly one
/// packet goes out per report: index 1 carries the report's regions 1-2,
/// index 2 its regions 3-4, and the index flips after every report.
#[derive(Debug, Default)]
pub struct Packetizer {
    next_index: PacketIndex,
    indicator: bool,
}

impl Packetizer {
    /// Packetizer starting at index 1 with the indicator off
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next packet will carry
    pub fn next_index(&self) -> PacketIndex {
        self.next_index
    }

    /// Activity indicator; flips with every packet built
    pub fn indicator(&self) -> bool {
        self.indicator
    }

    /// Build the packet for this report and advance the ping-pong state
    ///
    /// Defined for four-value reports; a shorter report reads as zeros in
    /// the missing positions.
    pub fn packetize(&mut self, report: &Report) -> Packet {
        let offset = self.next_index.value_offset();
        let first = report.values().get(offset).copied().unwrap_or(0);
        let second = report.values().get(offset + 1).copied().unwrap_or(0);

        let mut bytes = [0u8; wire::PACKET_LEN];
        bytes[0] = wire::HEAD;
        bytes[1] = self.next_index.digit();
        bytes[2..2 + wire::VALUE_WIDTH].copy_from_slice(&encode_value(first));
        bytes[2 + wire::VALUE_WIDTH..2 + 2 * wire::VALUE_WIDTH]
            .copy_from_slice(&encode_value(second));
        bytes[wire::PACKET_LEN - 1] = wire::TAIL;

        self.next_index = self.next_index.flipped();
        self.indicator = !self.indicator;

        Packet { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_and_clamps() {
        assert_eq!(&encode_value(0), b"0000");
        assert_eq!(&encode_value(20), b"0020");
        assert_eq!(&encode_value(9999), b"9999");
        assert_eq!(&encode_value(12345), b"9999", "overflow clamps to the field maximum");
    }

    #[test]
    fn test_report_frame_shape() {
        let report = Report::new(vec![5, 20, 300, 9999]);
        assert_eq!(report.wire_bytes(), b"A0005002003009999B");
        assert_eq!(report.to_string(), "A0005002003009999B");
    }
}

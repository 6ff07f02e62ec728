//! Framer (C2): COBS encode + CRC-16/CCITT over a fixed frame layout
//! (spec.md §4.2, §6).
//!
//! Pre-encoding layout: `[0xB2, type, seq, len, payload[0..len], crc_lo,
//! crc_hi]`. CRC covers `type..payload` (not the leading `0xB2`). The
//! pre-frame is then COBS-encoded and a single `0x00` delimiter appended.
//!
//! Both the CRC and the COBS step are the closest-analog pack idiom for
//! framing a byte-oriented serial link (`crc`, as in the meshbbs-style
//! "CRC for message integrity checking" manifest entry; `cobs`, as used by
//! `postcard::to_slice_cobs`/`CobsAccumulator` in mnemOS's serial trace
//! worker) rather than hand-rolled bit-twiddling.

use crate::config::{Kind, COBS_DELIMITER, FRAME_PAYLOAD_MAX, SOF};
use crate::interfaces::ByteSink;
use crc::{Crc, CRC_16_IBM_3740};

/// `[0xB2, type, seq, len]` + payload + `[crc_lo, crc_hi]`.
const PREFRAME_MAX: usize = 4 + FRAME_PAYLOAD_MAX + 2;
/// `decoded_len + ceil(decoded_len/254) + 1` headroom for the COBS code
/// bytes, per spec.md §4.2's overflow formula, plus one more for the
/// trailing delimiter this scratch buffer does *not* hold (the delimiter is
/// written to the sink separately, see `send_frame`).
const ENCODE_SCRATCH_MAX: usize = PREFRAME_MAX + PREFRAME_MAX / 254 + 2;

/// CRC-16/CCITT-FALSE (init `0xFFFF`, poly `0x1021`, no reflection, no
/// final xor) — the `crc` crate's `CRC_16_IBM_3740` catalog entry, which is
/// this exact parameter set under its other common name.
const CRC16_CCITT: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

pub fn crc16_ccitt(data: &[u8]) -> u16 {
    CRC16_CCITT.checksum(data)
}

/// Encodes and transmits frames; owns the global transmitted-frame
/// sequence counter.
pub struct Framer {
    seq: u8,
}

impl Framer {
    pub fn new() -> Self {
        Self { seq: 0 }
    }

    pub fn seq(&self) -> u8 {
        self.seq
    }

    /// Builds, encodes, and writes one frame to `sink`. Fails (returns
    /// `None`, no side effects) if `len > 64` or the encoded frame would
    /// overflow the local encoding scratch (spec.md §4.2). On success,
    /// returns the exact number of bytes written (encoded length + 1 for
    /// the delimiter) and advances `seq`.
    pub fn send_frame(
        &mut self,
        sink: &mut dyn ByteSink,
        kind: Kind,
        payload: &[u8],
        len: usize,
    ) -> Option<usize> {
        if len > FRAME_PAYLOAD_MAX || len > payload.len() {
            return None;
        }

        let mut preframe = [0u8; PREFRAME_MAX];
        preframe[0] = SOF;
        preframe[1] = kind.wire_type();
        preframe[2] = self.seq;
        preframe[3] = len as u8;
        preframe[4..4 + len].copy_from_slice(&payload[..len]);

        let crc = crc16_ccitt(&preframe[1..4 + len]);
        preframe[4 + len] = (crc & 0xFF) as u8;
        preframe[4 + len + 1] = (crc >> 8) as u8;
        let preframe_len = 4 + len + 2;

        let mut scratch = [0u8; ENCODE_SCRATCH_MAX];
        if cobs::max_encoding_length(preframe_len) > scratch.len() {
            return None;
        }
        let encoded_len = cobs::encode(&preframe[..preframe_len], &mut scratch);

        sink.write(&scratch[..encoded_len]);
        sink.write(&[COBS_DELIMITER]);
        self.seq = self.seq.wrapping_add(1);

        Some(encoded_len + 1)
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::VecSink;

    fn decode_and_check(wire: &[u8]) -> (u8, u8, u8, Vec<u8>) {
        // wire includes the trailing 0x00 delimiter; strip it before COBS-decoding.
        assert_eq!(*wire.last().unwrap(), COBS_DELIMITER);
        let encoded = &wire[..wire.len() - 1];
        assert!(!encoded.contains(&0x00), "encoded region must contain no zero bytes");

        let mut decoded = [0u8; PREFRAME_MAX];
        let n = cobs::decode(encoded, &mut decoded).expect("decode failed");
        let decoded = &decoded[..n];

        let sof = decoded[0];
        let ty = decoded[1];
        let seq = decoded[2];
        let len = decoded[3] as usize;
        let payload = decoded[4..4 + len].to_vec();
        let crc_lo = decoded[4 + len] as u16;
        let crc_hi = decoded[4 + len + 1] as u16;
        let crc = crc_lo | (crc_hi << 8);

        assert_eq!(sof, SOF);
        let expected_crc = crc16_ccitt(&decoded[1..4 + len]);
        assert_eq!(crc, expected_crc, "CRC mismatch after round-trip");

        (ty, seq, len as u8, payload)
    }

    #[test]
    fn round_trip_small_payload() {
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let payload = [1, 2, 3, 4, 5];
        let n = framer.send_frame(&mut sink, Kind::Sensor, &payload, payload.len());
        assert!(n.is_some());
        assert_eq!(sink.bytes.len(), n.unwrap());

        let (ty, seq, len, decoded_payload) = decode_and_check(&sink.bytes);
        assert_eq!(ty, Kind::Sensor.wire_type());
        assert_eq!(seq, 0);
        assert_eq!(len, 5);
        assert_eq!(decoded_payload, payload);
    }

    #[test]
    fn seq_increments_and_wraps_mod_256() {
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        for _ in 0..300 {
            framer.send_frame(&mut sink, Kind::Hb, &[0x01], 1).unwrap();
        }
        assert_eq!(framer.seq(), (300u32 % 256) as u8);
    }

    #[test]
    fn rejects_oversize_payload() {
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let payload = [0u8; 65];
        assert_eq!(framer.send_frame(&mut sink, Kind::Telem, &payload, 65), None);
    }

    #[test]
    fn max_len_64_round_trips_with_no_embedded_zero_in_encoded_region() {
        let mut framer = Framer::new();
        let mut sink = VecSink::new();
        let mut payload = [0u8; 64];
        for (i, b) in payload.iter_mut().enumerate() {
            // include some zero bytes to exercise COBS's reason for existing
            *b = (i % 7) as u8;
        }
        let n = framer.send_frame(&mut sink, Kind::Cmd, &payload, 64).unwrap();
        assert_eq!(n, sink.bytes.len());
        let (_, _, len, decoded_payload) = decode_and_check(&sink.bytes);
        assert_eq!(len, 64);
        assert_eq!(decoded_payload, payload.to_vec());
    }

    #[test]
    fn crc_changes_when_payload_changes() {
        let a = crc16_ccitt(&[1, 2, 3, 4]);
        let b = crc16_ccitt(&[1, 2, 3, 5]);
        assert_ne!(a, b);
    }
}

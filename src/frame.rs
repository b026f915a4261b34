//! Link-layer framing: delimiters, symbols, and the data-frame codec.
//!
//! A data frame wraps the application bytes (destination, source, and the
//! opaque command body) between a DLE STX leader and a DLE ETX terminator,
//! stuffs the interior, and appends the session's checksum trailer:
//!
//! ```text
//! DLE STX <stuffed: DST SRC body...> DLE ETX <checksum>
//! ```
//!
//! Control traffic travels as bare two-byte sequences (DLE ACK, DLE NAK,
//! DLE ENQ) outside any frame.

use crate::checksum::{self, ChecksumKind};
use crate::error::FramingError;
use crate::stuffing;

/// Escape byte introducing every control sequence.
pub const DLE: u8 = 0x10;
/// Start-of-frame symbol.
pub const STX: u8 = 0x02;
/// End-of-frame symbol.
pub const ETX: u8 = 0x03;
/// Repeat-last-response request symbol.
pub const ENQ: u8 = 0x05;
/// Positive acknowledgement symbol.
pub const ACK: u8 = 0x06;
/// Negative acknowledgement symbol. DF1 uses 0x0F here, not the ASCII NAK.
pub const NAK: u8 = 0x0F;

/// Largest legal command body: CMD, STS, TNS, FNC, five addressing bytes,
/// and a full data payload.
pub const MAX_BODY_LEN: usize = 254;

/// One decoded data frame: station addresses plus the unstuffed command body.
///
/// The body is opaque at this layer; [`Command`](crate::Command) and
/// [`Reply`](crate::Reply) give it structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Destination station address.
    pub dst: u8,
    /// Source station address.
    pub src: u8,
    /// Unstuffed application bytes after the two addresses.
    pub body: Vec<u8>,
}

impl Frame {
    /// Creates a frame, rejecting bodies over the protocol maximum.
    pub fn new(dst: u8, src: u8, body: Vec<u8>) -> crate::Result<Self> {
        if body.len() > MAX_BODY_LEN {
            return Err(crate::Df1Error::invalid_parameter(
                "body",
                format!("length {} exceeds the {MAX_BODY_LEN} byte maximum", body.len()),
            ));
        }
        Ok(Self { dst, src, body })
    }

    /// Serializes the frame for the wire: delimiters, stuffed interior, and
    /// the checksum trailer for `kind`.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::{ChecksumKind, Frame};
    ///
    /// let frame = Frame::new(0x01, 0x00, vec![0x06, 0x00, 0xCA, 0xEF, 0x03]).unwrap();
    /// let wire = frame.encode(ChecksumKind::Crc);
    /// assert_eq!(
    ///     wire,
    ///     vec![0x10, 0x02, 0x01, 0x00, 0x06, 0x00, 0xCA, 0xEF, 0x03, 0x10, 0x03, 0x8F, 0x76]
    /// );
    /// ```
    pub fn encode(&self, kind: ChecksumKind) -> Vec<u8> {
        let mut app = Vec::with_capacity(self.body.len() + 2);
        app.push(self.dst);
        app.push(self.src);
        app.extend_from_slice(&self.body);

        let mut wire = Vec::with_capacity(app.len() + 8);
        wire.push(DLE);
        wire.push(STX);
        wire.extend_from_slice(&stuffing::stuff(&app));
        wire.push(DLE);
        wire.push(ETX);
        wire.extend_from_slice(&checksum::compute(&app, kind));
        wire
    }

    /// Parses exactly one frame from `bytes`.
    ///
    /// Returns [`FramingError::Incomplete`] while the terminator or trailer
    /// has not arrived yet, so a caller reading from a stream knows to fetch
    /// more bytes. Anything left over after the trailer is malformed; use
    /// [`ReceiveBuffer`](crate::ReceiveBuffer) to segment a live byte stream.
    pub fn decode(bytes: &[u8], kind: ChecksumKind) -> Result<Self, FramingError> {
        if bytes.is_empty() || (bytes.len() == 1 && bytes[0] == DLE) {
            return Err(FramingError::Incomplete);
        }
        if bytes[0] != DLE || bytes[1] != STX {
            return Err(FramingError::malformed("frame does not start with DLE STX"));
        }

        let mut app = Vec::new();
        let mut pos = 2;
        loop {
            let Some(&byte) = bytes.get(pos) else {
                return Err(FramingError::Incomplete);
            };
            if byte != DLE {
                app.push(byte);
                pos += 1;
                continue;
            }
            match bytes.get(pos + 1) {
                None => return Err(FramingError::Incomplete),
                Some(&next) if next == DLE => {
                    app.push(DLE);
                    pos += 2;
                }
                Some(&next) if next == ETX => {
                    pos += 2;
                    break;
                }
                Some(&next) => {
                    return Err(FramingError::malformed(format!(
                        "unexpected DLE 0x{next:02X} inside frame"
                    )))
                }
            }
        }

        let width = kind.width();
        if bytes.len() < pos + width {
            return Err(FramingError::Incomplete);
        }
        if bytes.len() > pos + width {
            return Err(FramingError::malformed("trailing bytes after checksum"));
        }
        let trailer = &bytes[pos..pos + width];
        if !checksum::verify(&app, trailer, kind) {
            return Err(FramingError::ChecksumMismatch {
                expected: checksum::trailer_value(&checksum::compute(&app, kind), kind),
                received: checksum::trailer_value(trailer, kind),
            });
        }

        if app.len() < 2 {
            return Err(FramingError::malformed(
                "application region shorter than the address bytes",
            ));
        }
        if app.len() - 2 > MAX_BODY_LEN {
            return Err(FramingError::malformed(
                "application region exceeds the protocol maximum",
            ));
        }
        Ok(Self {
            dst: app[0],
            src: app[1],
            body: app[2..].to_vec(),
        })
    }
}

/// One complete inbound message: either a bare control symbol or a data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkMessage {
    /// DLE ACK: the station accepted our last frame.
    Ack,
    /// DLE NAK: the station rejected our last frame.
    Nak,
    /// DLE ENQ: the station asks us to repeat our last control response.
    Enq,
    /// A checksum-verified data frame.
    Frame(Frame),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Captured from live hardware, CRC session.
    const CAPTURE: [u8; 16] = [
        0x10, 0x02, 0x01, 0x00, 0x06, 0x00, 0x6B, 0xC3, 0x01, 0x00, 0x00, 0x0B, 0x10, 0x03, 0x9E,
        0x58,
    ];

    fn capture_frame() -> Frame {
        Frame {
            dst: 0x01,
            src: 0x00,
            body: vec![0x06, 0x00, 0x6B, 0xC3, 0x01, 0x00, 0x00, 0x0B],
        }
    }

    #[test]
    fn test_encode_matches_capture() {
        assert_eq!(capture_frame().encode(ChecksumKind::Crc), CAPTURE.to_vec());
    }

    #[test]
    fn test_decode_matches_capture() {
        let frame = Frame::decode(&CAPTURE, ChecksumKind::Crc).unwrap();
        assert_eq!(frame, capture_frame());
    }

    #[test]
    fn test_decode_matches_second_capture() {
        // Diagnostic status request from the same session.
        let wire = [
            0x10, 0x02, 0x01, 0x00, 0x06, 0x00, 0xCA, 0xEF, 0x03, 0x10, 0x03, 0x8F, 0x76,
        ];
        let frame = Frame::decode(&wire, ChecksumKind::Crc).unwrap();
        assert_eq!(frame.dst, 0x01);
        assert_eq!(frame.src, 0x00);
        assert_eq!(frame.body, vec![0x06, 0x00, 0xCA, 0xEF, 0x03]);
    }

    #[test]
    fn test_roundtrip_with_dle_body_both_kinds() {
        // Write command whose TNS high byte and data words all need stuffing.
        let frame = Frame::new(
            0x01,
            0x00,
            vec![
                0x0F, 0x00, 0x03, 0x10, 0xAA, 0x02, 0x07, 0x89, 0x00, 0x00, 0x10, 0x10,
            ],
        )
        .unwrap();
        for kind in [ChecksumKind::Bcc, ChecksumKind::Crc] {
            let wire = frame.encode(kind);
            assert_eq!(Frame::decode(&wire, kind).unwrap(), frame);
        }
    }

    #[test]
    fn test_encode_stuffs_interior_only() {
        // TNS low byte 0x10 is doubled; the CRC trailer that happens to start
        // with 0x10 is not.
        let frame = Frame::new(
            0x01,
            0x00,
            vec![0x0F, 0x00, 0x14, 0x00, 0xA2, 0x0A, 0x2B, 0x89, 0xF5, 0x00],
        )
        .unwrap();
        let wire = frame.encode(ChecksumKind::Crc);
        assert_eq!(
            wire,
            vec![
                0x10, 0x02, 0x01, 0x00, 0x0F, 0x00, 0x14, 0x00, 0xA2, 0x0A, 0x2B, 0x89, 0xF5,
                0x00, 0x10, 0x03, 0x10, 0x9C
            ]
        );
        assert_eq!(Frame::decode(&wire, ChecksumKind::Crc).unwrap(), frame);
    }

    #[test]
    fn test_decode_incomplete_at_every_cut() {
        for cut in 0..CAPTURE.len() {
            let result = Frame::decode(&CAPTURE[..cut], ChecksumKind::Crc);
            assert_eq!(result, Err(FramingError::Incomplete), "cut at {cut}");
        }
    }

    #[test]
    fn test_decode_rejects_bad_leader() {
        assert!(matches!(
            Frame::decode(&[0x02, 0x10, 0x01], ChecksumKind::Crc),
            Err(FramingError::Malformed { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut wire = CAPTURE.to_vec();
        wire.push(0x00);
        assert!(matches!(
            Frame::decode(&wire, ChecksumKind::Crc),
            Err(FramingError::Malformed { .. })
        ));
    }

    #[test]
    fn test_decode_reports_checksum_mismatch() {
        let mut wire = CAPTURE.to_vec();
        *wire.last_mut().unwrap() ^= 0x01;
        assert_eq!(
            Frame::decode(&wire, ChecksumKind::Crc),
            Err(FramingError::ChecksumMismatch {
                expected: 0x589E,
                received: 0x599E,
            })
        );
    }

    #[test]
    fn test_decode_rejects_stray_dle() {
        // DLE ENQ cannot occur inside a stuffed region.
        let wire = [0x10, 0x02, 0x01, 0x00, 0x10, 0x05, 0x10, 0x03, 0x00];
        assert!(matches!(
            Frame::decode(&wire, ChecksumKind::Bcc),
            Err(FramingError::Malformed { .. })
        ));
    }

    #[test]
    fn test_new_rejects_oversized_body() {
        assert!(Frame::new(0x01, 0x00, vec![0x00; MAX_BODY_LEN]).is_ok());
        assert!(Frame::new(0x01, 0x00, vec![0x00; MAX_BODY_LEN + 1]).is_err());
    }
}

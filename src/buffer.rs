//! Bounded accumulator turning transport chunks into complete link messages.
//!
//! Transports hand over whatever bytes happen to be readable, so frame
//! boundaries rarely line up with read calls. [`ReceiveBuffer`] collects the
//! chunks and yields complete [`LinkMessage`]s in arrival order, hunting past
//! line noise and resuming cleanly after aborted frames.

use crate::checksum::ChecksumKind;
use crate::error::FramingError;
use crate::frame::{Frame, LinkMessage, ACK, DLE, ENQ, ETX, NAK, STX};

/// Capacity of the receive buffer in bytes.
pub const RECEIVE_CAPACITY: usize = 4096;

/// Outcome of scanning the front of the buffer.
enum Scan {
    /// Nothing complete yet; wait for more bytes.
    NeedMore,
    /// Discard this many leading bytes and scan again.
    Skip(usize),
    /// A complete two-byte control sequence sits at the front.
    Control(LinkMessage),
    /// A complete data frame occupies the first `len` bytes.
    Frame { len: usize },
    /// A frame was cut short by a control sequence; discard up to it.
    Abort { keep_from: usize },
}

/// Incremental scanner over the inbound byte stream.
///
/// The session's [`ChecksumKind`] fixes how many trailer bytes follow the
/// DLE ETX terminator, so the scanner always knows where a frame ends.
///
/// # Example
///
/// ```
/// use ab_df1::{ChecksumKind, LinkMessage, ReceiveBuffer};
///
/// let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
/// buffer.extend(&[0x10, 0x06]).unwrap();
/// assert_eq!(buffer.pop_message().unwrap(), Some(LinkMessage::Ack));
/// assert_eq!(buffer.pop_message().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct ReceiveBuffer {
    kind: ChecksumKind,
    data: Vec<u8>,
}

impl ReceiveBuffer {
    /// Creates an empty buffer for a session using `kind` trailers.
    pub fn new(kind: ChecksumKind) -> Self {
        Self {
            kind,
            data: Vec::new(),
        }
    }

    /// Appends a transport chunk.
    ///
    /// Refuses the chunk outright when it would push the buffer past
    /// [`RECEIVE_CAPACITY`]; a link partner that outruns the reader by that
    /// much has lost synchronization anyway.
    pub fn extend(&mut self, chunk: &[u8]) -> crate::Result<()> {
        if self.data.len() + chunk.len() > RECEIVE_CAPACITY {
            return Err(crate::Df1Error::ReceiveOverflow {
                capacity: RECEIVE_CAPACITY,
            });
        }
        self.data.extend_from_slice(chunk);
        Ok(())
    }

    /// Pops the next complete message, if one has fully arrived.
    ///
    /// `Ok(None)` means more bytes are needed. A located frame that fails its
    /// checksum, or a frame cut short by a control sequence, is consumed from
    /// the buffer and reported as the corresponding [`FramingError`] so the
    /// caller can NAK it; later messages remain poppable.
    pub fn pop_message(&mut self) -> Result<Option<LinkMessage>, FramingError> {
        loop {
            match self.scan_front() {
                Scan::NeedMore => return Ok(None),
                Scan::Skip(n) => {
                    self.data.drain(..n);
                }
                Scan::Control(message) => {
                    self.data.drain(..2);
                    return Ok(Some(message));
                }
                Scan::Frame { len } => {
                    let raw: Vec<u8> = self.data.drain(..len).collect();
                    return Frame::decode(&raw, self.kind).map(|f| Some(LinkMessage::Frame(f)));
                }
                Scan::Abort { keep_from } => {
                    self.data.drain(..keep_from);
                    return Err(FramingError::malformed(
                        "frame cut short by a control sequence",
                    ));
                }
            }
        }
    }

    /// Discards everything buffered so far.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Number of bytes currently buffered.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn scan_front(&self) -> Scan {
        let data = &self.data;
        let Some(start) = data.iter().position(|&b| b == DLE) else {
            return if data.is_empty() {
                Scan::NeedMore
            } else {
                Scan::Skip(data.len())
            };
        };
        if start > 0 {
            return Scan::Skip(start);
        }
        let Some(&symbol) = data.get(1) else {
            return Scan::NeedMore;
        };
        match symbol {
            ACK => Scan::Control(LinkMessage::Ack),
            NAK => Scan::Control(LinkMessage::Nak),
            ENQ => Scan::Control(LinkMessage::Enq),
            STX => self.scan_frame(),
            // Hunting state: DLE followed by anything else is dropped whole.
            _ => Scan::Skip(2),
        }
    }

    /// Walks a frame interior starting at the DLE STX leader, stuffing-aware.
    fn scan_frame(&self) -> Scan {
        let data = &self.data;
        let mut pos = 2;
        loop {
            match data.get(pos) {
                None => return Scan::NeedMore,
                Some(&byte) if byte != DLE => pos += 1,
                Some(_) => match data.get(pos + 1) {
                    None => return Scan::NeedMore,
                    Some(&next) if next == DLE => pos += 2,
                    Some(&next) if next == ETX => {
                        let len = pos + 2 + self.kind.width();
                        return if data.len() < len {
                            Scan::NeedMore
                        } else {
                            Scan::Frame { len }
                        };
                    }
                    Some(_) => return Scan::Abort { keep_from: pos },
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::LinkMessage;

    const CAPTURE: [u8; 16] = [
        0x10, 0x02, 0x01, 0x00, 0x06, 0x00, 0x6B, 0xC3, 0x01, 0x00, 0x00, 0x0B, 0x10, 0x03, 0x9E,
        0x58,
    ];

    fn pop_frame(buffer: &mut ReceiveBuffer) -> Frame {
        match buffer.pop_message().unwrap() {
            Some(LinkMessage::Frame(frame)) => frame,
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[test]
    fn test_frame_reassembled_across_chunks() {
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        for chunk in CAPTURE.chunks(3) {
            buffer.extend(chunk).unwrap();
        }
        let frame = pop_frame(&mut buffer);
        assert_eq!(frame.dst, 0x01);
        assert_eq!(frame.body, vec![0x06, 0x00, 0x6B, 0xC3, 0x01, 0x00, 0x00, 0x0B]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_incomplete_frame_waits() {
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        buffer.extend(&CAPTURE[..15]).unwrap();
        assert_eq!(buffer.pop_message().unwrap(), None);
        buffer.extend(&CAPTURE[15..]).unwrap();
        assert!(buffer.pop_message().unwrap().is_some());
    }

    #[test]
    fn test_ack_then_frame_in_one_chunk() {
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        let mut stream = vec![0x10, 0x06];
        stream.extend_from_slice(&CAPTURE);
        buffer.extend(&stream).unwrap();
        assert_eq!(buffer.pop_message().unwrap(), Some(LinkMessage::Ack));
        pop_frame(&mut buffer);
    }

    #[test]
    fn test_noise_before_message_is_skipped() {
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        buffer.extend(&[0x00, 0xFF, 0x42, 0x10, 0x0F]).unwrap();
        assert_eq!(buffer.pop_message().unwrap(), Some(LinkMessage::Nak));
    }

    #[test]
    fn test_hunting_drops_dle_pairs_whole() {
        // A stray stuffed pair outside any frame must not eat the ACK.
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        buffer.extend(&[0x10, 0x10, 0x10, 0x06]).unwrap();
        assert_eq!(buffer.pop_message().unwrap(), Some(LinkMessage::Ack));
    }

    #[test]
    fn test_corrupt_frame_consumed_then_next_message_pops() {
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        let mut corrupt = CAPTURE.to_vec();
        corrupt[14] ^= 0xFF;
        buffer.extend(&corrupt).unwrap();
        buffer.extend(&CAPTURE).unwrap();
        assert!(matches!(
            buffer.pop_message(),
            Err(FramingError::ChecksumMismatch { .. })
        ));
        pop_frame(&mut buffer);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_aborted_frame_yields_error_then_control() {
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        buffer
            .extend(&[0x10, 0x02, 0x01, 0x00, 0x4F, 0x10, 0x05])
            .unwrap();
        assert!(matches!(
            buffer.pop_message(),
            Err(FramingError::Malformed { .. })
        ));
        assert_eq!(buffer.pop_message().unwrap(), Some(LinkMessage::Enq));
    }

    #[test]
    fn test_stuffed_ack_value_inside_frame_is_not_stolen() {
        let frame = Frame::new(0x00, 0x01, vec![0x4F, 0x00, 0x42, 0x00, 0x10, 0x06]).unwrap();
        let wire = frame.encode(ChecksumKind::Crc);
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        buffer.extend(&wire).unwrap();
        assert_eq!(pop_frame(&mut buffer), frame);
    }

    #[test]
    fn test_bcc_session_uses_one_trailer_byte() {
        let frame = Frame::new(0x00, 0x01, vec![0x4F, 0x00, 0x42, 0x00]).unwrap();
        let wire = frame.encode(ChecksumKind::Bcc);
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Bcc);
        buffer.extend(&wire).unwrap();
        buffer.extend(&[0x10, 0x06]).unwrap();
        assert_eq!(pop_frame(&mut buffer), frame);
        assert_eq!(buffer.pop_message().unwrap(), Some(LinkMessage::Ack));
    }

    #[test]
    fn test_overflow_is_refused() {
        let mut buffer = ReceiveBuffer::new(ChecksumKind::Crc);
        buffer.extend(&vec![0x00; RECEIVE_CAPACITY]).unwrap();
        assert!(matches!(
            buffer.extend(&[0x00]),
            Err(crate::Df1Error::ReceiveOverflow { .. })
        ));
    }
}

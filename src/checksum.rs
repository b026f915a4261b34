//! Frame integrity checks: 8-bit BCC and CRC-16.
//!
//! DF1 stations agree on one of two trailer schemes per session. BCC is a one
//! byte two's-complement sum of the application bytes. CRC-16 uses the
//! reflected 0xA001 polynomial with a zero initial value, folds the
//! terminating ETX symbol into the digest, and travels low byte first.

use once_cell::sync::Lazy;

use crate::frame::ETX;

/// Reflected polynomial for the link CRC.
const CRC_POLY: u16 = 0xA001;

static CRC_TABLE: Lazy<[u16; 256]> = Lazy::new(|| {
    let mut table = [0u16; 256];
    for (value, entry) in table.iter_mut().enumerate() {
        let mut crc = value as u16;
        for _ in 0..8 {
            crc = if crc & 0x0001 != 0 {
                (crc >> 1) ^ CRC_POLY
            } else {
                crc >> 1
            };
        }
        *entry = crc;
    }
    table
});

/// Checksum scheme in force for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// One-byte block check character.
    Bcc,
    /// Two-byte CRC-16, transmitted low byte first.
    Crc,
}

impl ChecksumKind {
    /// Number of trailer bytes following DLE ETX on the wire.
    pub fn width(self) -> usize {
        match self {
            ChecksumKind::Bcc => 1,
            ChecksumKind::Crc => 2,
        }
    }
}

impl std::fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumKind::Bcc => write!(f, "BCC"),
            ChecksumKind::Crc => write!(f, "CRC-16"),
        }
    }
}

/// Computes the block check character: the two's complement of the 8-bit sum.
///
/// # Example
///
/// ```
/// use ab_df1::bcc;
///
/// assert_eq!(bcc(&[0x01, 0x02, 0x03]), 0xFA);
/// ```
pub fn bcc(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, &byte| acc.wrapping_add(byte));
    sum.wrapping_neg()
}

/// Computes the link CRC-16 over `data`.
///
/// This is the bare digest; [`compute`] additionally folds in the ETX byte as
/// the wire format requires.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0x0000, |crc, &byte| crc_feed(crc, byte))
}

fn crc_feed(crc: u16, byte: u8) -> u16 {
    let index = ((crc ^ u16::from(byte)) & 0x00FF) as usize;
    (crc >> 8) ^ CRC_TABLE[index]
}

/// Computes the checksum trailer for an unstuffed application body, exactly as
/// transmitted after DLE ETX.
pub fn compute(body: &[u8], kind: ChecksumKind) -> Vec<u8> {
    match kind {
        ChecksumKind::Bcc => vec![bcc(body)],
        ChecksumKind::Crc => {
            let crc = crc_feed(crc16(body), ETX);
            crc.to_le_bytes().to_vec()
        }
    }
}

/// Checks a received trailer against the one computed for `body`.
pub fn verify(body: &[u8], received: &[u8], kind: ChecksumKind) -> bool {
    compute(body, kind) == received
}

/// Interprets trailer bytes as a single value for diagnostics.
///
/// Callers pass exactly `kind.width()` bytes.
pub(crate) fn trailer_value(trailer: &[u8], kind: ChecksumKind) -> u16 {
    match kind {
        ChecksumKind::Bcc => u16::from(trailer[0]),
        ChecksumKind::Crc => u16::from_le_bytes([trailer[0], trailer[1]]),
    }
}

//! Reply parsing and validation.
//!
//! This module handles parsing and validation of replies received from PLCs.
//!
//! # Reply Body Structure
//!
//! | Component | Size | Description |
//! |-----------|------|-------------|
//! | CMD | 1 byte | Command code with the reply flag (0x40) set |
//! | STS | 1 byte | Status code (0x00 = success) |
//! | TNS | 2 bytes | Transaction number, little-endian |
//! | Data | Variable | Reply data (if any) |
//!
//! # Status Codes
//!
//! A reply is successful when STS is 0x00. STS 0xF0 marks an extended
//! status; the actual code then rides in the first data byte and is split
//! off into [`Reply::ext_sts`] during parsing. [`sts_description`] maps
//! codes to human-readable text.
//!
//! [`sts_description`]: crate::sts_description
//!
//! # Example
//!
//! ```
//! use ab_df1::{ChecksumKind, FileType, Frame, Reply, TypedData};
//!
//! // A successful read reply carrying the integers 11 and 12.
//! let wire = [
//!     0x10, 0x02, 0x00, 0x01, 0x4F, 0x00, 0x42, 0x00, 0x0B, 0x00, 0x0C, 0x00,
//!     0x10, 0x03, 0x66, 0x31,
//! ];
//!
//! let frame = Frame::decode(&wire, ChecksumKind::Crc).unwrap();
//! let reply = Reply::from_frame(&frame).unwrap();
//! assert!(reply.is_success());
//! assert_eq!(reply.tns, 0x0042);
//!
//! let values = reply.typed_data(FileType::Integer).unwrap();
//! assert_eq!(values, TypedData::Integers(vec![11, 12]));
//! ```

use crate::command::CMD_REPLY_FLAG;
use crate::error::{Df1Error, Result};
use crate::file_type::{FileType, TypedData};
use crate::frame::Frame;

/// Minimum reply body size: CMD (1) + STS (1) + TNS (2) = 4 bytes.
pub const MIN_REPLY_BODY: usize = 4;

/// STS value marking an extended status in the first data byte.
const STS_EXTENDED: u8 = 0xF0;

/// Parsed reply.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Destination station address (the node that received the reply).
    pub dst: u8,
    /// Source station address (the node that sent the reply).
    pub src: u8,
    /// Command code, with the reply flag set.
    pub cmd: u8,
    /// Status code (0x00 = success).
    pub sts: u8,
    /// Extended status code, present when STS is 0xF0.
    pub ext_sts: Option<u8>,
    /// Transaction number echoed from the command.
    pub tns: u16,
    /// Reply data (if any).
    pub data: Vec<u8>,
}

impl Reply {
    /// Parses a reply from a decoded link frame.
    ///
    /// When STS is 0xF0, the extended status byte is split off the front of
    /// the data before the data is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The body is shorter than [`MIN_REPLY_BODY`]
    /// - The command code does not carry the reply flag
    /// - An extended status is indicated but no status byte follows
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        if frame.body.len() < MIN_REPLY_BODY {
            return Err(Df1Error::invalid_reply(format!(
                "body too short: expected at least {} bytes, got {}",
                MIN_REPLY_BODY,
                frame.body.len()
            )));
        }

        let cmd = frame.body[0];
        if cmd & CMD_REPLY_FLAG == 0 {
            return Err(Df1Error::invalid_reply(format!(
                "command code 0x{cmd:02X} is missing the reply flag"
            )));
        }

        let sts = frame.body[1];
        let mut data = frame.body[4..].to_vec();
        let ext_sts = if sts == STS_EXTENDED {
            if data.is_empty() {
                return Err(Df1Error::invalid_reply(
                    "extended status indicated but no status byte present",
                ));
            }
            Some(data.remove(0))
        } else {
            None
        };

        Ok(Self {
            dst: frame.dst,
            src: frame.src,
            cmd,
            sts,
            ext_sts,
            tns: u16::from_le_bytes([frame.body[2], frame.body[3]]),
            data,
        })
    }

    /// Returns whether the reply indicates success (STS == 0x00).
    pub fn is_success(&self) -> bool {
        self.sts == 0x00
    }

    /// Validates the status and returns an error if the PLC rejected the
    /// command.
    ///
    /// # Errors
    ///
    /// Returns `Df1Error::Plc` carrying the status (and extended status, if
    /// any) when STS is non-zero.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::{ChecksumKind, Frame, Reply};
    ///
    /// // STS 0x50: addressing problem or memory protect rungs.
    /// let wire = [
    ///     0x10, 0x02, 0x00, 0x01, 0x4F, 0x50, 0x42, 0x00, 0x10, 0x03, 0xA5, 0x0A,
    /// ];
    /// let frame = Frame::decode(&wire, ChecksumKind::Crc).unwrap();
    /// let reply = Reply::from_frame(&frame).unwrap();
    /// assert!(reply.check_error().is_err());
    /// ```
    pub fn check_error(&self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Df1Error::plc_status(self.sts, self.ext_sts))
        }
    }

    /// Validates that the echoed transaction number matches the command's.
    ///
    /// # Errors
    ///
    /// Returns `Df1Error::Transaction` with a `StaleReply` cause on a
    /// mismatch.
    pub fn check_tns(&self, expected: u16) -> Result<()> {
        if self.tns == expected {
            Ok(())
        } else {
            Err(Df1Error::stale_reply(expected, self.tns))
        }
    }

    /// Interprets the data bytes according to a file type.
    ///
    /// # Errors
    ///
    /// Fails when the reply itself reports an error, or when the data length
    /// does not divide into whole elements of the given type.
    pub fn typed_data(&self, file_type: FileType) -> Result<TypedData> {
        self.check_error()?;
        file_type.decode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::ChecksumKind;

    fn reply_frame(sts: u8, tns: u16, data: &[u8]) -> Frame {
        let mut body = vec![0x4F, sts];
        body.extend_from_slice(&tns.to_le_bytes());
        body.extend_from_slice(data);
        Frame {
            dst: 0x00,
            src: 0x01,
            body,
        }
    }

    #[test]
    fn test_reply_from_wire() {
        let wire = [
            0x10, 0x02, 0x00, 0x01, 0x4F, 0x00, 0x42, 0x00, 0x0B, 0x00, 0x0C, 0x00, 0x10, 0x03,
            0x66, 0x31,
        ];
        let frame = Frame::decode(&wire, ChecksumKind::Crc).unwrap();
        let reply = Reply::from_frame(&frame).unwrap();

        assert_eq!(reply.dst, 0x00);
        assert_eq!(reply.src, 0x01);
        assert_eq!(reply.cmd, 0x4F);
        assert_eq!(reply.sts, 0x00);
        assert_eq!(reply.ext_sts, None);
        assert_eq!(reply.tns, 0x0042);
        assert_eq!(reply.data, vec![0x0B, 0x00, 0x0C, 0x00]);
        assert_eq!(
            reply.typed_data(FileType::Integer).unwrap(),
            TypedData::Integers(vec![11, 12])
        );
    }

    #[test]
    fn test_reply_too_short() {
        let frame = Frame {
            dst: 0x00,
            src: 0x01,
            body: vec![0x4F, 0x00, 0x42],
        };
        assert!(Reply::from_frame(&frame).is_err());
    }

    #[test]
    fn test_reply_missing_flag() {
        let frame = Frame {
            dst: 0x01,
            src: 0x00,
            body: vec![0x0F, 0x00, 0x42, 0x00],
        };
        assert!(Reply::from_frame(&frame).is_err());
    }

    #[test]
    fn test_extended_status_split() {
        let reply = Reply::from_frame(&reply_frame(0xF0, 0x0001, &[0x0C, 0xAA])).unwrap();
        assert_eq!(reply.sts, 0xF0);
        assert_eq!(reply.ext_sts, Some(0x0C));
        // The status byte no longer counts as data.
        assert_eq!(reply.data, vec![0xAA]);

        match reply.check_error().unwrap_err() {
            Df1Error::Plc { sts, ext_sts } => {
                assert_eq!(sts, 0xF0);
                assert_eq!(ext_sts, Some(0x0C));
            }
            other => panic!("expected Plc error, got {other:?}"),
        }
    }

    #[test]
    fn test_extended_status_missing_byte() {
        assert!(Reply::from_frame(&reply_frame(0xF0, 0x0001, &[])).is_err());
    }

    #[test]
    fn test_check_error() {
        let ok = Reply::from_frame(&reply_frame(0x00, 0x0042, &[])).unwrap();
        assert!(ok.check_error().is_ok());

        let wire = [
            0x10, 0x02, 0x00, 0x01, 0x4F, 0x50, 0x42, 0x00, 0x10, 0x03, 0xA5, 0x0A,
        ];
        let frame = Frame::decode(&wire, ChecksumKind::Crc).unwrap();
        let reply = Reply::from_frame(&frame).unwrap();
        assert!(!reply.is_success());
        assert!(matches!(
            reply.check_error(),
            Err(Df1Error::Plc {
                sts: 0x50,
                ext_sts: None
            })
        ));
    }

    #[test]
    fn test_check_tns() {
        let reply = Reply::from_frame(&reply_frame(0x00, 0x1111, &[0x2A, 0x00])).unwrap();
        assert!(reply.check_tns(0x1111).is_ok());

        match reply.check_tns(0x2222).unwrap_err() {
            Df1Error::Transaction(crate::error::TransactionError::StaleReply {
                expected,
                received,
            }) => {
                assert_eq!(expected, 0x2222);
                assert_eq!(received, 0x1111);
            }
            other => panic!("expected StaleReply, got {other:?}"),
        }
    }

    #[test]
    fn test_typed_data_float() {
        // The TNS low byte 0x10 is stuffed on the wire.
        let wire = [
            0x10, 0x02, 0x00, 0x01, 0x4F, 0x00, 0x10, 0x10, 0x00, 0x00, 0x00, 0xC0, 0x3F, 0x10,
            0x03, 0x61, 0xFA,
        ];
        let frame = Frame::decode(&wire, ChecksumKind::Crc).unwrap();
        let reply = Reply::from_frame(&frame).unwrap();
        assert_eq!(reply.tns, 0x0010);
        assert_eq!(
            reply.typed_data(FileType::Float).unwrap(),
            TypedData::Floats(vec![1.5])
        );
    }

    #[test]
    fn test_typed_data_refuses_failed_reply() {
        let reply = Reply::from_frame(&reply_frame(0x10, 0x0001, &[0x0B, 0x00])).unwrap();
        assert!(reply.typed_data(FileType::Integer).is_err());
    }

    #[test]
    fn test_echo_reply() {
        let wire = [
            0x10, 0x02, 0x00, 0x01, 0x46, 0x00, 0xFF, 0x00, 0xDE, 0xAD, 0x10, 0x03, 0xAE, 0xB7,
        ];
        let frame = Frame::decode(&wire, ChecksumKind::Crc).unwrap();
        let reply = Reply::from_frame(&frame).unwrap();
        assert_eq!(reply.cmd, 0x46);
        assert_eq!(reply.tns, 0x00FF);
        assert_eq!(reply.data, vec![0xDE, 0xAD]);
    }
}

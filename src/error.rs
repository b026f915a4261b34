//! Error types for DF1 communication.

use std::io;
use thiserror::Error;

/// Result type alias for DF1 operations.
pub type Result<T> = std::result::Result<T, Df1Error>;

/// Errors that can occur while talking DF1.
#[derive(Debug, Error)]
pub enum Df1Error {
    /// Error reported by the PLC in the STS byte of a reply.
    #[error("{}", plc_status_line(*sts, *ext_sts))]
    Plc {
        /// Status code from the reply.
        sts: u8,
        /// Extended status byte, present when `sts` is 0xF0.
        ext_sts: Option<u8>,
    },

    /// Command or addressing form the protocol defines but this crate does
    /// not implement.
    #[error("Unsupported command: {reason}")]
    UnsupportedCommand {
        /// Description of the unsupported form.
        reason: String,
    },

    /// Invalid parameter provided.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// A verified frame whose contents do not parse as a reply.
    #[error("Invalid reply: {reason}")]
    InvalidReply {
        /// Description of the parse failure.
        reason: String,
    },

    /// Frame-level decode failure.
    #[error(transparent)]
    Framing(#[from] FramingError),

    /// Handshake or correlation failure after retries.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Inbound bytes exceeded the receive buffer capacity.
    #[error("Receive buffer overflow: capacity of {capacity} bytes exceeded")]
    ReceiveOverflow {
        /// Configured buffer capacity in bytes.
        capacity: usize,
    },

    /// Communication timeout.
    #[error("Communication timeout")]
    Timeout,

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while parsing wire bytes into a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// The frame terminator or checksum bytes have not arrived yet.
    #[error("Incomplete frame: terminator not yet received")]
    Incomplete,

    /// The bytes violate the framing rules.
    #[error("Malformed frame: {reason}")]
    Malformed {
        /// Description of the violation.
        reason: String,
    },

    /// The received checksum does not match the computed one.
    #[error("Checksum mismatch: computed 0x{expected:04X}, received 0x{received:04X}")]
    ChecksumMismatch {
        /// Checksum computed over the received body.
        expected: u16,
        /// Checksum carried by the frame.
        received: u16,
    },
}

impl FramingError {
    /// Creates a new `Malformed` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Errors raised by the transaction state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// The command was never acknowledged.
    #[error("No ACK received after {attempts} attempts")]
    NoAck {
        /// Number of frames transmitted before giving up.
        attempts: u8,
    },

    /// The command was acknowledged but no reply arrived.
    #[error("No reply received after {attempts} attempts")]
    NoReply {
        /// Number of frames transmitted before giving up.
        attempts: u8,
    },

    /// A reply carried a transaction number other than the expected one.
    #[error("Stale reply: expected TNS 0x{expected:04X}, received 0x{received:04X}")]
    StaleReply {
        /// TNS stamped on the outstanding command.
        expected: u16,
        /// TNS carried by the reply.
        received: u16,
    },
}

impl Df1Error {
    /// Creates a new `Plc` error from the STS byte and the optional extended
    /// status byte.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::Df1Error;
    ///
    /// let err = Df1Error::plc_status(0x50, None);
    /// ```
    pub fn plc_status(sts: u8, ext_sts: Option<u8>) -> Self {
        Self::Plc { sts, ext_sts }
    }

    /// Creates a new `UnsupportedCommand` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::Df1Error;
    ///
    /// let err = Df1Error::unsupported_command("file numbers above 0xFE need expanded addressing");
    /// ```
    pub fn unsupported_command(reason: impl Into<String>) -> Self {
        Self::UnsupportedCommand {
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidParameter` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::Df1Error;
    ///
    /// let err = Df1Error::invalid_parameter("count", "must be greater than 0");
    /// ```
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `InvalidReply` error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::Df1Error;
    ///
    /// let err = Df1Error::invalid_reply("reply body shorter than four bytes");
    /// ```
    pub fn invalid_reply(reason: impl Into<String>) -> Self {
        Self::InvalidReply {
            reason: reason.into(),
        }
    }

    /// Creates a new `StaleReply` transaction error.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::Df1Error;
    ///
    /// let err = Df1Error::stale_reply(0x1234, 0x1233);
    /// ```
    pub fn stale_reply(expected: u16, received: u16) -> Self {
        Self::Transaction(TransactionError::StaleReply { expected, received })
    }
}

/// Returns the manual's description for a reply STS code.
///
/// The low nibble carries local (link-layer) errors, the high nibble remote
/// (application-layer) errors; 0xF0 defers to the extended status byte.
///
/// # Example
///
/// ```
/// use ab_df1::sts_description;
///
/// assert_eq!(
///     sts_description(0x50),
///     "addressing problem or memory protect rungs"
/// );
/// ```
pub fn sts_description(sts: u8) -> &'static str {
    match sts {
        0x00 => "success",
        0x01 => "destination node is out of buffer space",
        0x02 => "cannot guarantee delivery, link layer did not get an ACK",
        0x03 => "duplicate token holder detected",
        0x04 => "local port is disconnected",
        0x05 => "application layer timed out waiting for a response",
        0x06 => "duplicate node detected",
        0x07 => "station is offline",
        0x08 => "hardware fault",
        0x10 => "illegal command or format",
        0x20 => "host has a problem and will not communicate",
        0x30 => "remote node is missing, disconnected, or shut down",
        0x40 => "host could not complete function due to hardware fault",
        0x50 => "addressing problem or memory protect rungs",
        0x60 => "function not allowed due to command protection selection",
        0x70 => "processor is in Program mode",
        0x80 => "compatibility mode file missing or communication zone problem",
        0x90 => "remote node cannot buffer command",
        0xB0 => "remote node problem due to download",
        0xA0 | 0xC0 => "waiting for acknowledgement, station buffer full",
        0xF0 => "error code in the extended status byte",
        _ => "unrecognized status code",
    }
}

fn plc_status_line(sts: u8, ext_sts: Option<u8>) -> String {
    match ext_sts {
        Some(ext) => format!(
            "PLC status error: STS 0x{sts:02X}, EXT STS 0x{ext:02X} ({})",
            sts_description(sts)
        ),
        None => format!(
            "PLC status error: STS 0x{sts:02X} ({})",
            sts_description(sts)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plc_status_display() {
        let err = Df1Error::plc_status(0x50, None);
        assert_eq!(
            err.to_string(),
            "PLC status error: STS 0x50 (addressing problem or memory protect rungs)"
        );
    }

    #[test]
    fn test_plc_status_display_with_ext() {
        let err = Df1Error::plc_status(0xF0, Some(0x12));
        assert_eq!(
            err.to_string(),
            "PLC status error: STS 0xF0, EXT STS 0x12 (error code in the extended status byte)"
        );
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = Df1Error::invalid_parameter("count", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'count': must be greater than 0"
        );
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = Df1Error::from(FramingError::ChecksumMismatch {
            expected: 0x589E,
            received: 0x589F,
        });
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: computed 0x589E, received 0x589F"
        );
    }

    #[test]
    fn test_stale_reply_display() {
        let err = Df1Error::stale_reply(0x1234, 0x1233);
        assert_eq!(
            err.to_string(),
            "Stale reply: expected TNS 0x1234, received 0x1233"
        );
    }

    #[test]
    fn test_no_ack_display() {
        let err = Df1Error::from(TransactionError::NoAck { attempts: 3 });
        assert_eq!(err.to_string(), "No ACK received after 3 attempts");
    }

    #[test]
    fn test_sts_descriptions() {
        assert_eq!(sts_description(0x00), "success");
        assert_eq!(sts_description(0x10), "illegal command or format");
        assert_eq!(sts_description(0x70), "processor is in Program mode");
        assert_eq!(sts_description(0xDD), "unrecognized status code");
    }
}

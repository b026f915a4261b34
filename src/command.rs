//! Typed DF1 commands and their serialization.
//!
//! This module contains the typed request model. Every command the crate can
//! send is built through a validating constructor on [`Command`]; parameters
//! the protocol cannot express fail at construction, before any I/O.
//!
//! # Command Set
//!
//! ## Protected typed logical operations (CMD 0x0F)
//! - [`Command::protected_typed_read`] - read elements from a data-table file
//! - [`Command::protected_typed_write`] - write elements to a data-table file
//! - [`Command::protected_typed_write_masked`] - write through a 16-bit mask
//!
//! ## Diagnostic operations (CMD 0x06)
//! - [`Command::echo`] - loop a payload through the PLC unchanged
//! - [`Command::diagnostic_status`] - read the controller status block
//!
//! # Example
//!
//! Commands are typically created and sent through the
//! [`Client`](crate::Client) struct, but can also be built directly for
//! lower-level control:
//!
//! ```
//! use ab_df1::{ChecksumKind, Command, FileType, LogicalAddress};
//!
//! let addr = LogicalAddress::new(7, FileType::Integer, 0).unwrap();
//! let cmd = Command::protected_typed_read(0x01, 0x00, 0x2A00, addr, 20).unwrap();
//! let wire = cmd.to_frame().encode(ChecksumKind::Crc);
//! // wire can now be handed to a transport
//! ```
//!
//! # Constants
//!
//! - [`MAX_DATA_BYTES`] - largest data payload (244) one typed transfer moves

use crate::error::{Df1Error, FramingError, Result};
use crate::file_type::FileType;
use crate::frame::Frame;

/// Protected typed logical command code.
pub(crate) const CMD_PROTECTED_TYPED: u8 = 0x0F;
/// Protected typed logical read function code.
pub(crate) const FNC_TYPED_READ: u8 = 0xA2;
/// Protected typed logical write function code.
pub(crate) const FNC_TYPED_WRITE: u8 = 0xAA;
/// Protected typed logical write with mask function code.
pub(crate) const FNC_TYPED_WRITE_MASKED: u8 = 0xAB;
/// Diagnostic command code.
pub(crate) const CMD_DIAGNOSTIC: u8 = 0x06;
/// Diagnostic loopback (echo) function code.
pub(crate) const FNC_ECHO: u8 = 0x00;
/// Diagnostic status function code.
pub(crate) const FNC_DIAGNOSTIC_STATUS: u8 = 0x03;
/// Bit set in the command code of every reply.
pub(crate) const CMD_REPLY_FLAG: u8 = 0x40;

/// Largest data payload a single protected typed transfer can move.
pub const MAX_DATA_BYTES: usize = 244;

/// Highest table, element, or sub-element number expressible in the
/// three-field addressing form.
const MAX_ADDRESS_FIELD: u8 = 0xFE;

/// Location of a slice of a data-table file: table number, file type,
/// element, and sub-element.
///
/// Values above 0xFE require the protocol's expanded addressing form, which
/// this crate does not implement; constructors reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalAddress {
    /// Data-table (file) number.
    pub table: u8,
    /// File type stored in the table.
    pub file_type: FileType,
    /// Starting element number.
    pub element: u8,
    /// Sub-element within a structured file (0 for plain files).
    pub sub_element: u8,
}

impl LogicalAddress {
    /// Creates an address of a whole element (sub-element 0).
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::{FileType, LogicalAddress};
    ///
    /// let addr = LogicalAddress::new(7, FileType::Integer, 12).unwrap();
    /// assert_eq!(addr.to_string(), "N7:12");
    /// ```
    pub fn new(table: u8, file_type: FileType, element: u8) -> Result<Self> {
        Self::with_sub(table, file_type, element, 0)
    }

    /// Creates an address pointing inside a structured element, such as the
    /// accumulator word of a timer.
    ///
    /// # Errors
    ///
    /// Returns `Df1Error::UnsupportedCommand` when any field exceeds 0xFE.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::{FileType, LogicalAddress};
    ///
    /// let acc = LogicalAddress::with_sub(4, FileType::Timer, 0, 2).unwrap();
    /// assert_eq!(acc.to_string(), "T4:0.2");
    /// ```
    pub fn with_sub(table: u8, file_type: FileType, element: u8, sub_element: u8) -> Result<Self> {
        for (name, value) in [
            ("table", table),
            ("element", element),
            ("sub_element", sub_element),
        ] {
            if value > MAX_ADDRESS_FIELD {
                return Err(Df1Error::unsupported_command(format!(
                    "{name} {value} requires expanded addressing"
                )));
            }
        }
        Ok(Self {
            table,
            file_type,
            element,
            sub_element,
        })
    }

    /// Serializes the address fields as they appear in command payloads.
    pub(crate) fn to_bytes(self) -> [u8; 4] {
        [
            self.table,
            self.file_type.code(),
            self.element,
            self.sub_element,
        ]
    }
}

impl std::fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}:{}", self.file_type, self.table, self.element)?;
        if self.sub_element != 0 {
            write!(f, ".{}", self.sub_element)?;
        }
        Ok(())
    }
}

/// A typed request, ready to be framed and sent.
///
/// A command owns its transaction number; the transaction manager re-stamps
/// it when a NAK forces a resend, and correlates the reply against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    dst: u8,
    src: u8,
    cmd: u8,
    fnc: u8,
    tns: u16,
    payload: Vec<u8>,
}

impl Command {
    /// Creates a protected typed logical read (CMD 0x0F, FNC 0xA2).
    ///
    /// # Arguments
    ///
    /// * `dst` - Destination station address
    /// * `src` - Source station address
    /// * `tns` - Transaction number for reply matching
    /// * `addr` - Data-table location to read from
    /// * `bytes_to_read` - Number of data bytes requested (1-244)
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes_to_read` is 0 or exceeds [`MAX_DATA_BYTES`].
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::{Command, FileType, LogicalAddress};
    ///
    /// let addr = LogicalAddress::new(7, FileType::Integer, 0).unwrap();
    /// let cmd = Command::protected_typed_read(0x01, 0x00, 0x0001, addr, 20).unwrap();
    /// ```
    pub fn protected_typed_read(
        dst: u8,
        src: u8,
        tns: u16,
        addr: LogicalAddress,
        bytes_to_read: u8,
    ) -> Result<Self> {
        if bytes_to_read == 0 {
            return Err(Df1Error::invalid_parameter(
                "bytes_to_read",
                "must be greater than 0",
            ));
        }
        if usize::from(bytes_to_read) > MAX_DATA_BYTES {
            return Err(Df1Error::invalid_parameter(
                "bytes_to_read",
                format!("must not exceed {MAX_DATA_BYTES}"),
            ));
        }

        let mut payload = Vec::with_capacity(5);
        payload.push(bytes_to_read);
        payload.extend_from_slice(&addr.to_bytes());
        Ok(Self {
            dst,
            src,
            cmd: CMD_PROTECTED_TYPED,
            fnc: FNC_TYPED_READ,
            tns,
            payload,
        })
    }

    /// Creates a protected typed logical write (CMD 0x0F, FNC 0xAA).
    ///
    /// `data` is the raw little-endian image of the elements being written;
    /// its length must line up with the file type's element width.
    ///
    /// # Errors
    ///
    /// Returns `Df1Error::UnsupportedCommand` for file types the typed write
    /// cannot carry, and `Df1Error::InvalidParameter` when `data` is empty,
    /// exceeds [`MAX_DATA_BYTES`], or is not a whole number of elements.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::{Command, FileType, LogicalAddress};
    ///
    /// let addr = LogicalAddress::new(7, FileType::Integer, 4).unwrap();
    /// // Two integers, 11 and 12.
    /// let cmd = Command::protected_typed_write(
    ///     0x01,
    ///     0x00,
    ///     0x0001,
    ///     addr,
    ///     &[0x0B, 0x00, 0x0C, 0x00],
    /// )
    /// .unwrap();
    /// ```
    pub fn protected_typed_write(
        dst: u8,
        src: u8,
        tns: u16,
        addr: LogicalAddress,
        data: &[u8],
    ) -> Result<Self> {
        if !addr.file_type.supports_typed_write() {
            return Err(Df1Error::unsupported_command(format!(
                "file type {} cannot be written with the typed write",
                addr.file_type
            )));
        }
        if data.is_empty() {
            return Err(Df1Error::invalid_parameter("data", "must not be empty"));
        }
        if data.len() > MAX_DATA_BYTES {
            return Err(Df1Error::invalid_parameter(
                "data",
                format!("must not exceed {MAX_DATA_BYTES} bytes"),
            ));
        }
        let width = addr.file_type.element_width();
        if data.len() % width != 0 {
            return Err(Df1Error::invalid_parameter(
                "data",
                format!(
                    "length must be a multiple of {width} for {} files",
                    addr.file_type
                ),
            ));
        }

        let mut payload = Vec::with_capacity(5 + data.len());
        payload.push(data.len() as u8);
        payload.extend_from_slice(&addr.to_bytes());
        payload.extend_from_slice(data);
        Ok(Self {
            dst,
            src,
            cmd: CMD_PROTECTED_TYPED,
            fnc: FNC_TYPED_WRITE,
            tns,
            payload,
        })
    }

    /// Creates a protected typed logical write with mask (CMD 0x0F, FNC
    /// 0xAB).
    ///
    /// Only the bits set in `mask` are modified in the target words, which
    /// restricts this command to word-sized file types. The mask occupies two
    /// of the 244 transferable bytes, so `data` holds at most 121 words.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::{Command, FileType, LogicalAddress};
    ///
    /// // Set bit 2 of B3:4 and leave the other bits alone.
    /// let addr = LogicalAddress::new(3, FileType::Bit, 4).unwrap();
    /// let cmd = Command::protected_typed_write_masked(
    ///     0x01, 0x00, 0x0001, addr, 0x0004, &[0x0004],
    /// )
    /// .unwrap();
    /// ```
    pub fn protected_typed_write_masked(
        dst: u8,
        src: u8,
        tns: u16,
        addr: LogicalAddress,
        mask: u16,
        data: &[u16],
    ) -> Result<Self> {
        if !addr.file_type.supports_masked_write() {
            return Err(Df1Error::unsupported_command(format!(
                "file type {} cannot be written through a mask",
                addr.file_type
            )));
        }
        if data.is_empty() {
            return Err(Df1Error::invalid_parameter("data", "must not be empty"));
        }
        if data.len() * 2 + 2 > MAX_DATA_BYTES {
            return Err(Df1Error::invalid_parameter(
                "data",
                format!("mask and data together must not exceed {MAX_DATA_BYTES} bytes"),
            ));
        }

        let mut payload = Vec::with_capacity(7 + data.len() * 2);
        payload.push((data.len() * 2) as u8);
        payload.extend_from_slice(&addr.to_bytes());
        payload.extend_from_slice(&mask.to_le_bytes());
        for word in data {
            payload.extend_from_slice(&word.to_le_bytes());
        }
        Ok(Self {
            dst,
            src,
            cmd: CMD_PROTECTED_TYPED,
            fnc: FNC_TYPED_WRITE_MASKED,
            tns,
            payload,
        })
    }

    /// Creates a diagnostic loopback (CMD 0x06, FNC 0x00).
    ///
    /// The PLC echoes `data` back unchanged, which makes this the cheapest
    /// way to prove a link end to end.
    pub fn echo(dst: u8, src: u8, tns: u16, data: &[u8]) -> Result<Self> {
        if data.len() > MAX_DATA_BYTES {
            return Err(Df1Error::invalid_parameter(
                "data",
                format!("must not exceed {MAX_DATA_BYTES} bytes"),
            ));
        }
        Ok(Self {
            dst,
            src,
            cmd: CMD_DIAGNOSTIC,
            fnc: FNC_ECHO,
            tns,
            payload: data.to_vec(),
        })
    }

    /// Creates a diagnostic status read (CMD 0x06, FNC 0x03).
    pub fn diagnostic_status(dst: u8, src: u8, tns: u16) -> Self {
        Self {
            dst,
            src,
            cmd: CMD_DIAGNOSTIC,
            fnc: FNC_DIAGNOSTIC_STATUS,
            tns,
            payload: Vec::new(),
        }
    }

    /// Returns the transaction number currently stamped on the command.
    pub fn tns(&self) -> u16 {
        self.tns
    }

    /// Re-stamps the transaction number; used when a NAK forces a resend.
    pub(crate) fn set_tns(&mut self, tns: u16) {
        self.tns = tns;
    }

    /// Returns the destination station address.
    pub fn dst(&self) -> u8 {
        self.dst
    }

    /// Returns the source station address.
    pub fn src(&self) -> u8 {
        self.src
    }

    /// Returns the command code.
    pub fn cmd(&self) -> u8 {
        self.cmd
    }

    /// Returns the function code.
    pub fn fnc(&self) -> u8 {
        self.fnc
    }

    /// Returns the command-specific parameter bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Lays the command out as a link frame:
    /// `CMD STS TNS_LO TNS_HI FNC <payload>`.
    pub fn to_frame(&self) -> Frame {
        let mut body = Vec::with_capacity(5 + self.payload.len());
        body.push(self.cmd);
        body.push(0x00);
        body.extend_from_slice(&self.tns.to_le_bytes());
        body.push(self.fnc);
        body.extend_from_slice(&self.payload);
        Frame {
            dst: self.dst,
            src: self.src,
            body,
        }
    }

    /// Re-parses an encoded command frame back into a `Command`.
    ///
    /// The inverse of [`to_frame`](Self::to_frame), useful for inspecting
    /// traffic. Frames carrying the reply flag or a nonzero STS are not
    /// commands and are rejected.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        if frame.body.len() < 5 {
            return Err(FramingError::malformed("command body shorter than five bytes").into());
        }
        let cmd = frame.body[0];
        if cmd & CMD_REPLY_FLAG != 0 {
            return Err(FramingError::malformed("command code carries the reply flag").into());
        }
        if frame.body[1] != 0x00 {
            return Err(FramingError::malformed("nonzero STS in a command frame").into());
        }
        Ok(Self {
            dst: frame.dst,
            src: frame.src,
            cmd,
            fnc: frame.body[4],
            tns: u16::from_le_bytes([frame.body[2], frame.body[3]]),
            payload: frame.body[5..].to_vec(),
        })
    }
}

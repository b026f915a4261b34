//! High-level client for talking to Allen-Bradley PLCs.
//!
//! This module provides the [`Client`] struct, which is the primary interface
//! for reading and writing data-table files over a DF1 link.
//!
//! # Overview
//!
//! The client provides a high-level API that handles:
//! - Command construction and validation
//! - The ACK/NAK/ENQ handshake and retry policy
//! - Reply correlation via transaction numbers
//! - Typed decoding of reply data (integers, floats, bit-table words)
//!
//! # Example
//!
//! ```no_run
//! use ab_df1::{Client, ClientConfig, TimerField};
//!
//! // Station 0 talking to station 1 over CRC-16.
//! let config = ClientConfig::new(0x00, 0x01);
//! let mut client = Client::connect("192.168.1.10:4001".parse().unwrap(), config)?;
//!
//! // Read ten integers from N7:0.
//! let values = client.read_integers(7, 0, 10)?;
//!
//! // Write two integers to N7:4.
//! client.write_integers(7, 4, &[11, 12])?;
//!
//! // Set B3:4/2 without touching the other bits of the word.
//! client.write_bit(3, 4, 2, true)?;
//!
//! // Read the accumulator of T4:0.
//! let elapsed = client.read_timer_field(4, 0, TimerField::Accumulator)?;
//! # Ok::<(), ab_df1::Df1Error>(())
//! ```
//!
//! # Configuration
//!
//! The [`ClientConfig`] struct selects the station addresses, the checksum
//! kind (which must match the controller's configured error-check mode), the
//! handshake timeouts, and the retry limit.
//!
//! # Lifetime
//!
//! The client owns its transport; dropping the client releases the
//! connection on every exit path, including after failed transactions.

use std::net::SocketAddr;
use std::time::Duration;

use crate::checksum::ChecksumKind;
use crate::command::{Command, LogicalAddress, MAX_DATA_BYTES};
use crate::error::{Df1Error, Result};
use crate::file_type::FileType;
use crate::reply::Reply;
use crate::transaction::{
    TransactionManager, DEFAULT_ACK_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_REPLY_TIMEOUT,
};
use crate::transport::{TcpTransport, Transport};
use crate::utils;

/// Word offsets inside a timer or counter element.
const SUB_PRESET: u8 = 1;
const SUB_ACCUMULATOR: u8 = 2;

/// The two value words of a timer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerField {
    /// The programmed target value (.PRE).
    Preset,
    /// The elapsed value (.ACC).
    Accumulator,
}

/// The two value words of a counter element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    /// The programmed target value (.PRE).
    Preset,
    /// The running count (.ACC).
    Accumulator,
}

/// Status flags in a timer element's control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFlag {
    /// Rung conditions are true (.EN).
    Enable,
    /// The timer is timing (.TT).
    Timing,
    /// The accumulator reached the preset (.DN).
    Done,
}

impl TimerFlag {
    /// Bit position of this flag within the control word.
    pub fn bit(self) -> u8 {
        match self {
            TimerFlag::Enable => 15,
            TimerFlag::Timing => 14,
            TimerFlag::Done => 13,
        }
    }
}

/// Status flags in a counter element's control word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterFlag {
    /// Count-up rung is true (.CU).
    CountUp,
    /// Count-down rung is true (.CD).
    CountDown,
    /// The count reached the preset (.DN).
    Done,
    /// The count overflowed (.OV).
    Overflow,
    /// The count underflowed (.UN).
    Underflow,
    /// Update-accumulator, used by high-speed counters (.UA).
    UpdateAcc,
}

impl CounterFlag {
    /// Bit position of this flag within the control word.
    pub fn bit(self) -> u8 {
        match self {
            CounterFlag::CountUp => 15,
            CounterFlag::CountDown => 14,
            CounterFlag::Done => 13,
            CounterFlag::Overflow => 12,
            CounterFlag::Underflow => 11,
            CounterFlag::UpdateAcc => 10,
        }
    }
}

/// Configuration for creating a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Station address of this client.
    pub src: u8,
    /// Station address of the PLC.
    pub dst: u8,
    /// Checksum kind, fixed for the whole session.
    pub checksum: ChecksumKind,
    /// How long to wait for the ACK symbol.
    pub ack_timeout: Duration,
    /// How long to wait for the reply frame.
    pub reply_timeout: Duration,
    /// Frame transmissions per transaction before giving up.
    pub max_retries: u8,
    /// Fixed starting TNS; `None` randomizes it.
    pub initial_tns: Option<u16>,
}

impl ClientConfig {
    /// Creates a configuration with the default CRC-16 checksum, timeouts,
    /// and retry limit.
    ///
    /// # Arguments
    ///
    /// * `src` - Station address of this client (usually 0)
    /// * `dst` - Station address of the PLC (usually 1)
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::ClientConfig;
    ///
    /// let config = ClientConfig::new(0x00, 0x01);
    /// ```
    pub fn new(src: u8, dst: u8) -> Self {
        Self {
            src,
            dst,
            checksum: ChecksumKind::Crc,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_tns: None,
        }
    }

    /// Selects the checksum kind (default is CRC-16).
    ///
    /// Must match the error-check mode configured on the controller's
    /// channel, or every frame will be rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::{ChecksumKind, ClientConfig};
    ///
    /// let config = ClientConfig::new(0x00, 0x01).with_checksum(ChecksumKind::Bcc);
    /// ```
    pub fn with_checksum(mut self, checksum: ChecksumKind) -> Self {
        self.checksum = checksum;
        self
    }

    /// Sets how long to wait for the ACK symbol (default 500 ms).
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Sets how long to wait for the reply frame (default 3 seconds).
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Sets the number of frame transmissions per transaction (default 3).
    pub fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Pins the starting transaction number instead of randomizing it.
    pub fn with_initial_tns(mut self, tns: u16) -> Self {
        self.initial_tns = Some(tns);
        self
    }
}

impl Default for ClientConfig {
    /// Station 0 talking to station 1 over CRC-16.
    fn default() -> Self {
        Self::new(0x00, 0x01)
    }
}

/// DF1 client for reading and writing PLC data-table files.
///
/// Every operation runs one full transaction: the command goes out, the
/// handshake and retries happen inside, and the decoded result comes back.
/// Operations are strictly one at a time; the protocol never multiplexes a
/// single link.
///
/// # Example
///
/// ```no_run
/// use ab_df1::{Client, ClientConfig};
///
/// let mut client = Client::connect(
///     "192.168.1.10:4001".parse().unwrap(),
///     ClientConfig::new(0x00, 0x01),
/// ).unwrap();
///
/// // Read five words of B3 starting at element 0.
/// let words = client.read_binary(3, 0, 5).unwrap();
///
/// // Write a float to F8:2.
/// client.write_floats(8, 2, &[1.5]).unwrap();
/// ```
pub struct Client<T: Transport> {
    transport: T,
    manager: TransactionManager,
    src: u8,
    dst: u8,
}

impl Client<TcpTransport> {
    /// Connects to a serial device server and wraps the stream in a client.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the TCP connection cannot be established.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_df1::{Client, ClientConfig};
    ///
    /// let client = Client::connect(
    ///     "192.168.1.10:4001".parse().unwrap(),
    ///     ClientConfig::default(),
    /// ).unwrap();
    /// ```
    pub fn connect(addr: SocketAddr, config: ClientConfig) -> Result<Self> {
        Ok(Self::new(TcpTransport::connect(addr)?, config))
    }
}

impl<T: Transport> Client<T> {
    /// Wraps an already constructed transport.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        let mut manager = TransactionManager::new(config.checksum)
            .with_ack_timeout(config.ack_timeout)
            .with_reply_timeout(config.reply_timeout)
            .with_max_retries(config.max_retries);
        if let Some(tns) = config.initial_tns {
            manager = manager.with_initial_tns(tns);
        }
        Self {
            transport,
            manager,
            src: config.src,
            dst: config.dst,
        }
    }

    /// Runs a raw command through a full transaction.
    ///
    /// The typed helpers cover the common operations; this is the escape
    /// hatch for commands built by hand. The reply's status has not been
    /// checked, so a PLC-side rejection comes back as a reply, not an error.
    pub fn send(&mut self, command: Command) -> Result<Reply> {
        self.manager.transact(&mut self.transport, command)
    }

    /// Advances and returns the next transaction number, for stamping
    /// hand-built commands.
    pub fn next_tns(&mut self) -> u16 {
        self.manager.next_tns()
    }

    /// Reads integers from an N file.
    ///
    /// # Arguments
    ///
    /// * `table` - File number (conventionally 7)
    /// * `start` - First element to read
    /// * `count` - Number of elements (1-122)
    ///
    /// # Errors
    ///
    /// Returns an error if the count is out of range, the link fails, or
    /// the PLC rejects the command.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_df1::{Client, ClientConfig};
    ///
    /// let mut client = Client::connect(
    ///     "192.168.1.10:4001".parse().unwrap(),
    ///     ClientConfig::default(),
    /// ).unwrap();
    ///
    /// let values = client.read_integers(7, 0, 10).unwrap();
    /// println!("N7:0..10 = {values:?}");
    /// ```
    pub fn read_integers(&mut self, table: u8, start: u8, count: u16) -> Result<Vec<i16>> {
        let bytes = request_bytes(count, 2)?;
        let addr = LogicalAddress::new(table, FileType::Integer, start)?;
        let reply = self.read_typed(addr, bytes)?;
        reply.typed_data(FileType::Integer)?.into_integers()
    }

    /// Reads floats from an F file.
    ///
    /// # Arguments
    ///
    /// * `table` - File number (conventionally 8)
    /// * `start` - First element to read
    /// * `count` - Number of elements (1-61)
    pub fn read_floats(&mut self, table: u8, start: u8, count: u16) -> Result<Vec<f32>> {
        let bytes = request_bytes(count, 4)?;
        let addr = LogicalAddress::new(table, FileType::Float, start)?;
        let reply = self.read_typed(addr, bytes)?;
        reply.typed_data(FileType::Float)?.into_floats()
    }

    /// Reads words from a B (binary) file.
    ///
    /// Use the [`utils`] helpers to pick individual bits out of the words.
    pub fn read_binary(&mut self, table: u8, start: u8, count: u16) -> Result<Vec<u16>> {
        let bytes = request_bytes(count, 2)?;
        let addr = LogicalAddress::new(table, FileType::Bit, start)?;
        let reply = self.read_typed(addr, bytes)?;
        reply.typed_data(FileType::Bit)?.into_words()
    }

    /// Reads words from the O (output image) file.
    pub fn read_outputs(&mut self, table: u8, start: u8, count: u16) -> Result<Vec<u16>> {
        let bytes = request_bytes(count, 2)?;
        let addr = LogicalAddress::new(table, FileType::OutputLogic, start)?;
        let reply = self.read_typed(addr, bytes)?;
        reply.typed_data(FileType::OutputLogic)?.into_words()
    }

    /// Reads words from the I (input image) file.
    pub fn read_inputs(&mut self, table: u8, start: u8, count: u16) -> Result<Vec<u16>> {
        let bytes = request_bytes(count, 2)?;
        let addr = LogicalAddress::new(table, FileType::InputLogic, start)?;
        let reply = self.read_typed(addr, bytes)?;
        reply.typed_data(FileType::InputLogic)?.into_words()
    }

    /// Reads raw bytes from the S (status) file.
    ///
    /// # Arguments
    ///
    /// * `table` - File number (conventionally 2)
    /// * `start` - First element to read
    /// * `count` - Number of bytes (1-244)
    pub fn read_status(&mut self, table: u8, start: u8, count: u16) -> Result<Vec<u8>> {
        let bytes = request_bytes(count, 1)?;
        let addr = LogicalAddress::new(table, FileType::Status, start)?;
        let reply = self.read_typed(addr, bytes)?;
        reply.typed_data(FileType::Status)?.into_bytes()
    }

    /// Reads the preset or accumulator word of a timer element.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_df1::{Client, ClientConfig, TimerField};
    ///
    /// let mut client = Client::connect(
    ///     "192.168.1.10:4001".parse().unwrap(),
    ///     ClientConfig::default(),
    /// ).unwrap();
    ///
    /// let elapsed = client.read_timer_field(4, 0, TimerField::Accumulator).unwrap();
    /// let target = client.read_timer_field(4, 0, TimerField::Preset).unwrap();
    /// println!("T4:0 at {elapsed}/{target}");
    /// ```
    pub fn read_timer_field(&mut self, table: u8, element: u8, field: TimerField) -> Result<i16> {
        let sub = match field {
            TimerField::Preset => SUB_PRESET,
            TimerField::Accumulator => SUB_ACCUMULATOR,
        };
        self.read_structured_word(FileType::Timer, table, element, sub)
    }

    /// Reads the preset or accumulator word of a counter element.
    pub fn read_counter_field(
        &mut self,
        table: u8,
        element: u8,
        field: CounterField,
    ) -> Result<i16> {
        let sub = match field {
            CounterField::Preset => SUB_PRESET,
            CounterField::Accumulator => SUB_ACCUMULATOR,
        };
        self.read_structured_word(FileType::Counter, table, element, sub)
    }

    /// Reads one status flag of a timer element.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_df1::{Client, ClientConfig, TimerFlag};
    ///
    /// let mut client = Client::connect(
    ///     "192.168.1.10:4001".parse().unwrap(),
    ///     ClientConfig::default(),
    /// ).unwrap();
    ///
    /// if client.read_timer_flag(4, 0, TimerFlag::Done).unwrap() {
    ///     println!("T4:0 has finished");
    /// }
    /// ```
    pub fn read_timer_flag(&mut self, table: u8, element: u8, flag: TimerFlag) -> Result<bool> {
        let word = self.read_structured_word(FileType::Timer, table, element, 0)?;
        Ok(utils::get_bit(word as u16, flag.bit()))
    }

    /// Reads one status flag of a counter element.
    pub fn read_counter_flag(
        &mut self,
        table: u8,
        element: u8,
        flag: CounterFlag,
    ) -> Result<bool> {
        let word = self.read_structured_word(FileType::Counter, table, element, 0)?;
        Ok(utils::get_bit(word as u16, flag.bit()))
    }

    /// Writes integers to an N file.
    ///
    /// # Arguments
    ///
    /// * `table` - File number (conventionally 7)
    /// * `start` - First element to write
    /// * `values` - Elements to write (1-122)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_df1::{Client, ClientConfig};
    ///
    /// let mut client = Client::connect(
    ///     "192.168.1.10:4001".parse().unwrap(),
    ///     ClientConfig::default(),
    /// ).unwrap();
    ///
    /// client.write_integers(7, 4, &[11, 12]).unwrap();
    /// ```
    pub fn write_integers(&mut self, table: u8, start: u8, values: &[i16]) -> Result<()> {
        let mut data = Vec::with_capacity(values.len() * 2);
        for value in values {
            data.extend_from_slice(&value.to_le_bytes());
        }
        let addr = LogicalAddress::new(table, FileType::Integer, start)?;
        self.write_typed(addr, &data)
    }

    /// Writes floats to an F file.
    pub fn write_floats(&mut self, table: u8, start: u8, values: &[f32]) -> Result<()> {
        let mut data = Vec::with_capacity(values.len() * 4);
        for value in values {
            data.extend_from_slice(&value.to_le_bytes());
        }
        let addr = LogicalAddress::new(table, FileType::Float, start)?;
        self.write_typed(addr, &data)
    }

    /// Writes whole words to a B (binary) file.
    pub fn write_binary(&mut self, table: u8, start: u8, words: &[u16]) -> Result<()> {
        let addr = LogicalAddress::new(table, FileType::Bit, start)?;
        self.write_words(addr, words)
    }

    /// Writes whole words to the O (output image) file.
    pub fn write_outputs(&mut self, table: u8, start: u8, words: &[u16]) -> Result<()> {
        let addr = LogicalAddress::new(table, FileType::OutputLogic, start)?;
        self.write_words(addr, words)
    }

    /// Sets or clears one bit of a binary-file word, leaving the other
    /// bits untouched.
    ///
    /// Runs as a masked write, so there is no read-modify-write window.
    ///
    /// # Arguments
    ///
    /// * `table` - File number (conventionally 3)
    /// * `element` - Word element holding the bit
    /// * `bit` - Bit position (0-15)
    /// * `state` - Value to set
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_df1::{Client, ClientConfig};
    ///
    /// let mut client = Client::connect(
    ///     "192.168.1.10:4001".parse().unwrap(),
    ///     ClientConfig::default(),
    /// ).unwrap();
    ///
    /// // B3:4/2 on.
    /// client.write_bit(3, 4, 2, true).unwrap();
    /// ```
    pub fn write_bit(&mut self, table: u8, element: u8, bit: u8, state: bool) -> Result<()> {
        if bit > 15 {
            return Err(Df1Error::invalid_parameter("bit", "must be 0-15"));
        }
        let mask = 1u16 << bit;
        let word = if state { mask } else { 0 };
        let addr = LogicalAddress::new(table, FileType::Bit, element)?;
        let tns = self.manager.next_tns();
        let command =
            Command::protected_typed_write_masked(self.dst, self.src, tns, addr, mask, &[word])?;
        self.manager
            .transact(&mut self.transport, command)?
            .check_error()
    }

    /// Loops a payload through the PLC and returns what came back.
    ///
    /// The cheapest way to prove the link end to end; the PLC echoes the
    /// bytes unchanged.
    pub fn echo(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let tns = self.manager.next_tns();
        let command = Command::echo(self.dst, self.src, tns, data)?;
        let reply = self.manager.transact(&mut self.transport, command)?;
        reply.check_error()?;
        Ok(reply.data)
    }

    /// Reads the controller's diagnostic status block.
    ///
    /// The layout of the returned bytes is controller-specific; the first
    /// bytes identify the processor family and series.
    pub fn diagnostic_status(&mut self) -> Result<Vec<u8>> {
        let tns = self.manager.next_tns();
        let command = Command::diagnostic_status(self.dst, self.src, tns);
        let reply = self.manager.transact(&mut self.transport, command)?;
        reply.check_error()?;
        Ok(reply.data)
    }

    /// Returns the station address of this client.
    pub fn src(&self) -> u8 {
        self.src
    }

    /// Returns the station address of the PLC.
    pub fn dst(&self) -> u8 {
        self.dst
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn read_typed(&mut self, addr: LogicalAddress, bytes: u8) -> Result<Reply> {
        let tns = self.manager.next_tns();
        let command = Command::protected_typed_read(self.dst, self.src, tns, addr, bytes)?;
        self.manager.transact(&mut self.transport, command)
    }

    fn write_typed(&mut self, addr: LogicalAddress, data: &[u8]) -> Result<()> {
        let tns = self.manager.next_tns();
        let command = Command::protected_typed_write(self.dst, self.src, tns, addr, data)?;
        self.manager
            .transact(&mut self.transport, command)?
            .check_error()
    }

    fn write_words(&mut self, addr: LogicalAddress, words: &[u16]) -> Result<()> {
        let mut data = Vec::with_capacity(words.len() * 2);
        for word in words {
            data.extend_from_slice(&word.to_le_bytes());
        }
        self.write_typed(addr, &data)
    }

    /// Reads a single word out of a structured (timer/counter) element.
    fn read_structured_word(
        &mut self,
        file_type: FileType,
        table: u8,
        element: u8,
        sub: u8,
    ) -> Result<i16> {
        let addr = LogicalAddress::with_sub(table, file_type, element, sub)?;
        let reply = self.read_typed(addr, 2)?;
        let words = reply.typed_data(file_type)?.into_integers()?;
        words
            .first()
            .copied()
            .ok_or_else(|| Df1Error::invalid_reply("reply carried no data word"))
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("src", &self.src)
            .field("dst", &self.dst)
            .finish()
    }
}

/// Converts an element count to the request's byte count, rejecting counts
/// the protocol cannot move in one transfer.
fn request_bytes(count: u16, element_width: usize) -> Result<u8> {
    if count == 0 {
        return Err(Df1Error::invalid_parameter(
            "count",
            "must be greater than 0",
        ));
    }
    let bytes = count as usize * element_width;
    if bytes > MAX_DATA_BYTES {
        return Err(Df1Error::invalid_parameter(
            "count",
            format!("{count} elements need {bytes} bytes, max is {MAX_DATA_BYTES}"),
        ));
    }
    Ok(bytes as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, ACK, DLE};
    use std::collections::VecDeque;

    struct ScriptedTransport {
        script: VecDeque<Vec<u8>>,
        writes: Vec<Vec<u8>>,
    }

    impl ScriptedTransport {
        fn new(script: &[Vec<u8>]) -> Self {
            Self {
                script: script.iter().cloned().collect(),
                writes: Vec::new(),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
            self.writes.push(bytes.to_vec());
            Ok(())
        }

        fn read_some(&mut self, _max_wait: Duration) -> Result<Vec<u8>> {
            self.script.pop_front().ok_or(Df1Error::Timeout)
        }
    }

    fn reply_wire(sts: u8, tns: u16, data: &[u8]) -> Vec<u8> {
        let mut body = vec![0x4F, sts];
        body.extend_from_slice(&tns.to_le_bytes());
        body.extend_from_slice(data);
        Frame {
            dst: 0x00,
            src: 0x01,
            body,
        }
        .encode(ChecksumKind::Crc)
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.src, 0x00);
        assert_eq!(config.dst, 0x01);
        assert_eq!(config.checksum, ChecksumKind::Crc);
        assert_eq!(config.ack_timeout, DEFAULT_ACK_TIMEOUT);
        assert_eq!(config.reply_timeout, DEFAULT_REPLY_TIMEOUT);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.initial_tns, None);
    }

    #[test]
    fn test_client_config_builders() {
        let config = ClientConfig::new(0x02, 0x05)
            .with_checksum(ChecksumKind::Bcc)
            .with_ack_timeout(Duration::from_millis(100))
            .with_reply_timeout(Duration::from_secs(1))
            .with_max_retries(5)
            .with_initial_tns(0x1234);

        assert_eq!(config.src, 0x02);
        assert_eq!(config.dst, 0x05);
        assert_eq!(config.checksum, ChecksumKind::Bcc);
        assert_eq!(config.ack_timeout, Duration::from_millis(100));
        assert_eq!(config.reply_timeout, Duration::from_secs(1));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_tns, Some(0x1234));
    }

    #[test]
    fn test_request_bytes_validation() {
        assert_eq!(request_bytes(10, 2).unwrap(), 20);
        assert_eq!(request_bytes(61, 4).unwrap(), 244);
        assert_eq!(request_bytes(122, 2).unwrap(), 244);
        assert!(request_bytes(0, 2).is_err());
        assert!(request_bytes(123, 2).is_err());
        assert!(request_bytes(62, 4).is_err());
    }

    #[test]
    fn test_flag_bit_positions() {
        assert_eq!(TimerFlag::Enable.bit(), 15);
        assert_eq!(TimerFlag::Timing.bit(), 14);
        assert_eq!(TimerFlag::Done.bit(), 13);
        assert_eq!(CounterFlag::CountUp.bit(), 15);
        assert_eq!(CounterFlag::UpdateAcc.bit(), 10);
    }

    #[test]
    fn test_read_integers_roundtrip() {
        let transport = ScriptedTransport::new(&[
            vec![DLE, ACK],
            reply_wire(0x00, 0x0042, &[0x0B, 0x00, 0x0C, 0x00]),
        ]);
        let config = ClientConfig::new(0x00, 0x01).with_initial_tns(0x0041);
        let mut client = Client::new(transport, config);

        let values = client.read_integers(43, 245, 2).unwrap();
        assert_eq!(values, vec![11, 12]);
    }

    #[test]
    fn test_write_bit_emits_masked_write() {
        let transport = ScriptedTransport::new(&[
            vec![DLE, ACK],
            reply_wire(0x00, 0x0021, &[]),
        ]);
        let config = ClientConfig::new(0x00, 0x01).with_initial_tns(0x0020);
        let mut client = Client::new(transport, config);

        client.write_bit(3, 4, 2, true).unwrap();

        // Mask and data both carry only bit 2.
        assert_eq!(
            client.transport().writes[0],
            vec![
                0x10, 0x02, 0x01, 0x00, 0x0F, 0x00, 0x21, 0x00, 0xAB, 0x02, 0x03, 0x85, 0x04,
                0x00, 0x04, 0x00, 0x04, 0x00, 0x10, 0x03, 0x8C, 0xF6
            ]
        );
    }

    #[test]
    fn test_plc_rejection_surfaces_as_error() {
        let transport = ScriptedTransport::new(&[
            vec![DLE, ACK],
            reply_wire(0x50, 0x0042, &[]),
        ]);
        let config = ClientConfig::new(0x00, 0x01).with_initial_tns(0x0041);
        let mut client = Client::new(transport, config);

        let err = client.read_integers(7, 0, 1).unwrap_err();
        assert!(matches!(
            err,
            Df1Error::Plc {
                sts: 0x50,
                ext_sts: None
            }
        ));
    }

    #[test]
    fn test_timer_flag_extraction() {
        // Status word with EN and TT set, DN clear.
        let status: i16 = 0b1100_0000_0000_0000u16 as i16;
        let transport = ScriptedTransport::new(&[
            vec![DLE, ACK],
            reply_wire(0x00, 0x0042, &(status as u16).to_le_bytes()),
            vec![DLE, ACK],
            reply_wire(0x00, 0x0043, &(status as u16).to_le_bytes()),
        ]);
        let config = ClientConfig::new(0x00, 0x01).with_initial_tns(0x0041);
        let mut client = Client::new(transport, config);

        assert!(client.read_timer_flag(4, 0, TimerFlag::Enable).unwrap());
        assert!(!client.read_timer_flag(4, 0, TimerFlag::Done).unwrap());
    }
}

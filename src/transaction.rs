//! The link-layer transaction state machine.
//!
//! This module drives one command/reply exchange at a time over a
//! [`Transport`]: it owns the transaction-number counter, sends the encoded
//! frame, runs the ACK/NAK/ENQ handshake, and correlates the reply by TNS.
//!
//! # State Machine
//!
//! | State | Event | Action | Next |
//! |-------|-------|--------|------|
//! | AwaitingAck | DLE ACK | arm the reply deadline | AwaitingReply |
//! | AwaitingAck | DLE NAK | re-stamp TNS | resend |
//! | AwaitingAck | deadline or corrupt input | send DLE ENQ | resend |
//! | AwaitingReply | frame with matching TNS | send DLE ACK | done |
//! | AwaitingReply | frame with stale TNS | send DLE ACK, discard | AwaitingReply |
//! | AwaitingReply | deadline or corrupt input | send DLE NAK | resend |
//! | any | DLE ENQ | repeat the last control response | unchanged |
//!
//! Each resend counts one attempt; after `max_retries` frame transmissions
//! the transaction fails with `TransactionError::NoAck` or `NoReply`,
//! depending on where the final attempt died. A NAK means the responder
//! never accepted the frame, so the resend carries a fresh TNS; a timeout
//! resend keeps the TNS so the responder can recognize a duplicate.
//!
//! A PLC-reported error status inside a well-formed reply is not a link
//! failure. The reply is returned as-is; retrying a logically rejected
//! command would not change the outcome.
//!
//! # Constants
//!
//! - [`DEFAULT_ACK_TIMEOUT`] - wait for the ACK symbol (500 ms)
//! - [`DEFAULT_REPLY_TIMEOUT`] - wait for the reply frame (3 seconds)
//! - [`DEFAULT_MAX_RETRIES`] - frame transmissions per transaction (3)
//!
//! # Example
//!
//! ```no_run
//! use ab_df1::{ChecksumKind, Command, FileType, LogicalAddress};
//! use ab_df1::{TcpTransport, TransactionManager};
//!
//! let mut transport = TcpTransport::connect("192.168.1.10:4001".parse().unwrap()).unwrap();
//! let mut manager = TransactionManager::new(ChecksumKind::Crc);
//!
//! let addr = LogicalAddress::new(7, FileType::Integer, 0).unwrap();
//! let tns = manager.next_tns();
//! let command = Command::protected_typed_read(0x01, 0x00, tns, addr, 4).unwrap();
//!
//! let reply = manager.transact(&mut transport, command).unwrap();
//! println!("STS 0x{:02X}, {} data bytes", reply.sts, reply.data.len());
//! ```

use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::buffer::ReceiveBuffer;
use crate::checksum::ChecksumKind;
use crate::command::Command;
use crate::error::{Df1Error, Result, TransactionError};
use crate::frame::{LinkMessage, ACK, DLE, ENQ, NAK};
use crate::reply::Reply;
use crate::transport::Transport;

/// How long to wait for the ACK symbol after sending a frame.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(500);

/// How long to wait for the reply frame after the command was acknowledged.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(3);

/// Frame transmissions per transaction before giving up.
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Where a single exchange attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    AwaitingAck,
    AwaitingReply,
}

/// Outcome of one frame transmission.
enum Exchange {
    Matched(Reply),
    NoAck { fresh_tns: bool },
    NoReply,
}

/// One unit of inbound traffic, or the reason there is none.
enum Inbound {
    Message(LinkMessage),
    Corrupt,
    TimedOut,
}

/// Runs transactions over a borrowed transport, one at a time.
///
/// The manager owns the per-session link state: the checksum kind, the
/// timeouts and retry limit, the wrapping TNS counter, the receive buffer,
/// and the last control response (repeated when the responder sends ENQ).
#[derive(Debug)]
pub struct TransactionManager {
    checksum: ChecksumKind,
    ack_timeout: Duration,
    reply_timeout: Duration,
    max_retries: u8,
    last_tns: u16,
    buffer: ReceiveBuffer,
    last_response: u8,
    dirty: bool,
}

impl TransactionManager {
    /// Creates a manager with the default timeouts, retry limit, and a
    /// randomized initial transaction number.
    pub fn new(checksum: ChecksumKind) -> Self {
        Self {
            checksum,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            last_tns: rand::random(),
            buffer: ReceiveBuffer::new(checksum),
            last_response: NAK,
            dirty: false,
        }
    }

    /// Sets the starting point of the TNS counter.
    ///
    /// The first [`next_tns`](Self::next_tns) call returns `tns + 1`.
    pub fn with_initial_tns(mut self, tns: u16) -> Self {
        self.last_tns = tns;
        self
    }

    /// Sets how long to wait for the ACK symbol.
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Sets how long to wait for the reply frame.
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Sets how many frame transmissions to make before giving up.
    pub fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns the checksum kind this session runs with.
    pub fn checksum_kind(&self) -> ChecksumKind {
        self.checksum
    }

    /// Advances the TNS counter and returns the next transaction number.
    ///
    /// Commands sent through one manager must take their TNS from here so
    /// replies correlate unambiguously.
    pub fn next_tns(&mut self) -> u16 {
        self.last_tns = self.last_tns.wrapping_add(1);
        self.last_tns
    }

    /// Drives `command` through a full transaction and returns the
    /// correlated reply.
    ///
    /// The reply may still carry a PLC error status; call
    /// [`Reply::check_error`] to turn it into an error.
    ///
    /// # Errors
    ///
    /// - `Df1Error::Transaction` with `NoAck` or `NoReply` after retry
    ///   exhaustion
    /// - `Df1Error::Io` on a transport failure (never retried)
    /// - `Df1Error::ReceiveOverflow` if the responder floods the link
    pub fn transact<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        mut command: Command,
    ) -> Result<Reply> {
        if self.dirty {
            let discarded = transport.drain()?;
            self.buffer.clear();
            if discarded > 0 {
                debug!("drained {discarded} stale bytes from the previous transaction");
            }
            self.dirty = false;
        }

        let mut attempts: u8 = 0;
        let mut failure = TransactionError::NoAck { attempts: 0 };
        while attempts < self.max_retries {
            attempts += 1;
            let wire = command.to_frame().encode(self.checksum);
            trace!(
                "tx frame tns=0x{:04X} ({} bytes), attempt {}/{}",
                command.tns(),
                wire.len(),
                attempts,
                self.max_retries
            );
            self.dirty = true;
            transport.write_all(&wire)?;

            match self.run_exchange(transport, &command)? {
                Exchange::Matched(reply) => {
                    self.dirty = false;
                    return Ok(reply);
                }
                Exchange::NoAck { fresh_tns } => {
                    failure = TransactionError::NoAck { attempts };
                    if fresh_tns {
                        command.set_tns(self.next_tns());
                    }
                }
                Exchange::NoReply => failure = TransactionError::NoReply { attempts },
            }
        }

        warn!("transaction failed: {failure}");
        Err(failure.into())
    }

    /// Runs the handshake for one transmitted frame.
    fn run_exchange<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        command: &Command,
    ) -> Result<Exchange> {
        let mut state = TransactionState::AwaitingAck;
        let mut deadline = Instant::now() + self.ack_timeout;
        let mut pending_reply: Option<Reply> = None;

        loop {
            match self.next_inbound(transport, deadline)? {
                Inbound::Message(LinkMessage::Ack) => match state {
                    TransactionState::AwaitingAck => {
                        if let Some(reply) = pending_reply.take() {
                            return Ok(Exchange::Matched(reply));
                        }
                        trace!("command acknowledged");
                        state = TransactionState::AwaitingReply;
                        deadline = Instant::now() + self.reply_timeout;
                    }
                    TransactionState::AwaitingReply => debug!("duplicate ACK ignored"),
                },
                Inbound::Message(LinkMessage::Nak) => match state {
                    TransactionState::AwaitingAck => {
                        if let Some(reply) = pending_reply.take() {
                            return Ok(Exchange::Matched(reply));
                        }
                        debug!("command rejected with NAK");
                        return Ok(Exchange::NoAck { fresh_tns: true });
                    }
                    TransactionState::AwaitingReply => {
                        debug!("unexpected NAK while awaiting the reply, ignored");
                    }
                },
                Inbound::Message(LinkMessage::Enq) => {
                    debug!("link ENQ, repeating last control response");
                    let symbol = self.last_response;
                    transport.write_all(&[DLE, symbol])?;
                }
                Inbound::Message(LinkMessage::Frame(frame)) => {
                    match Reply::from_frame(&frame) {
                        Ok(reply) if reply.tns == command.tns() => {
                            self.send_ack(transport)?;
                            match state {
                                TransactionState::AwaitingAck => {
                                    debug!("reply arrived ahead of the ACK symbol, holding it");
                                    pending_reply = Some(reply);
                                }
                                TransactionState::AwaitingReply => {
                                    return Ok(Exchange::Matched(reply));
                                }
                            }
                        }
                        Ok(reply) => {
                            // The frame itself was sound, so acknowledge it.
                            self.send_ack(transport)?;
                            warn!(
                                "discarding stale reply tns=0x{:04X}, expected 0x{:04X}",
                                reply.tns,
                                command.tns()
                            );
                        }
                        Err(e) => {
                            debug!("unusable inbound frame: {e}");
                            return self.abort_attempt(transport, state);
                        }
                    }
                }
                Inbound::Corrupt => {
                    if let Some(reply) = pending_reply.take() {
                        return Ok(Exchange::Matched(reply));
                    }
                    return self.abort_attempt(transport, state);
                }
                Inbound::TimedOut => {
                    if let Some(reply) = pending_reply.take() {
                        return Ok(Exchange::Matched(reply));
                    }
                    return self.abort_attempt(transport, state);
                }
            }
        }
    }

    /// Ends an attempt that cannot succeed: solicit a repeat with ENQ (no
    /// ACK seen yet) or reject the garbled reply with NAK (ACK seen).
    fn abort_attempt<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        state: TransactionState,
    ) -> Result<Exchange> {
        match state {
            TransactionState::AwaitingAck => {
                debug!("no usable ACK, sending ENQ");
                self.send_enq(transport)?;
                Ok(Exchange::NoAck { fresh_tns: false })
            }
            TransactionState::AwaitingReply => {
                debug!("no usable reply, sending NAK");
                self.send_nak(transport)?;
                Ok(Exchange::NoReply)
            }
        }
    }

    /// Pops the next complete message, reading from the transport until the
    /// deadline when the buffer runs dry.
    fn next_inbound<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        deadline: Instant,
    ) -> Result<Inbound> {
        loop {
            match self.buffer.pop_message() {
                Ok(Some(message)) => return Ok(Inbound::Message(message)),
                Ok(None) => {}
                Err(e) => {
                    debug!("corrupt inbound data: {e}");
                    return Ok(Inbound::Corrupt);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Inbound::TimedOut);
            }
            match transport.read_some(deadline - now) {
                Ok(chunk) => self.buffer.extend(&chunk)?,
                Err(Df1Error::Timeout) => return Ok(Inbound::TimedOut),
                Err(e) => return Err(e),
            }
        }
    }

    fn send_ack<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        self.last_response = ACK;
        transport.write_all(&[DLE, ACK])
    }

    fn send_nak<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        self.last_response = NAK;
        transport.write_all(&[DLE, NAK])
    }

    fn send_enq<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<()> {
        transport.write_all(&[DLE, ENQ])
    }
}

//! # Allen-Bradley DF1 Protocol Library
//!
//! A Rust library for communicating with Allen-Bradley PLCs (SLC 5/03+,
//! MicroLogix, PLC-5) using the DF1 full-duplex link-layer protocol.
//!
//! This is a **link-layer client** library: it frames commands, runs the
//! ACK/NAK/ENQ handshake with bounded retries, correlates replies by
//! transaction number, and decodes data-table payloads. Polling loops,
//! schedulers, and tag databases belong to the application.
//!
//! ## Features
//!
//! - **Full link layer** — DLE stuffing, BCC or CRC-16 error checking,
//!   ACK/NAK/ENQ handshake with bounded retransmission
//! - **Typed data-table access** — integers, floats, binary words, I/O
//!   images, timers, and counters as Rust types
//! - **Transport-agnostic** — any byte pipe via the [`Transport`] trait;
//!   TCP device servers built in, direct serial behind the `serial` feature
//! - **No panics** — all errors returned as `Result<T, Df1Error>`
//! - **Raw access** — hand-built [`Command`]s and undecoded [`Reply`]s for
//!   anything the typed helpers do not cover
//!
//! ## Quick Start
//!
//! ```no_run
//! use ab_df1::{Client, ClientConfig};
//!
//! fn main() -> ab_df1::Result<()> {
//!     // Station 0 talking to the PLC at station 1, CRC-16 error checking.
//!     let config = ClientConfig::new(0x00, 0x01);
//!     let mut client = Client::connect("192.168.1.10:4001".parse().unwrap(), config)?;
//!
//!     // Read ten integers from N7:0.
//!     let values = client.read_integers(7, 0, 10)?;
//!     println!("N7:0..10 = {values:?}");
//!
//!     // Write two integers to N7:4.
//!     client.write_integers(7, 4, &[11, 12])?;
//!
//!     // Set B3:4/2 without disturbing the rest of the word.
//!     client.write_bit(3, 4, 2, true)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## File Types
//!
//! Data tables are addressed by file number, element, and optional
//! sub-element. Each file type decodes to a matching Rust representation:
//!
//! | Type | Letter | Element Size | Decoded As |
//! |------|:------:|:------------:|------------|
//! | [`FileType::Status`] | S | 1 byte | raw bytes |
//! | [`FileType::Bit`] | B | 2 bytes | `u16` words |
//! | [`FileType::Timer`] | T | 2 bytes | `i16` |
//! | [`FileType::Counter`] | C | 2 bytes | `i16` |
//! | [`FileType::Control`] | R | 2 bytes | `i16` |
//! | [`FileType::Integer`] | N | 2 bytes | `i16` |
//! | [`FileType::Float`] | F | 4 bytes | `f32` |
//! | [`FileType::OutputLogic`] | O | 2 bytes | `u16` words |
//! | [`FileType::InputLogic`] | I | 2 bytes | `u16` words |
//! | [`FileType::Ascii`] | A | 1 byte | raw bytes |
//!
//! ## Core Operations
//!
//! ### Word Operations
//!
//! ```no_run
//! # use ab_df1::{Client, ClientConfig};
//! # let mut client = Client::connect("192.168.1.10:4001".parse().unwrap(), ClientConfig::default()).unwrap();
//! // Read and write integer elements
//! let values = client.read_integers(7, 0, 10)?;
//! client.write_integers(7, 0, &[1, 2, 3])?;
//!
//! // Floats move as IEEE-754 singles
//! let reals = client.read_floats(8, 0, 4)?;
//! client.write_floats(8, 0, &[1.5, -2.25])?;
//!
//! // Binary and I/O image files come back as whole words
//! let words = client.read_binary(3, 0, 5)?;
//! let outputs = client.read_outputs(0, 0, 2)?;
//! let inputs = client.read_inputs(1, 0, 2)?;
//! # Ok::<(), ab_df1::Df1Error>(())
//! ```
//!
//! ### Bit Operations
//!
//! ```no_run
//! # use ab_df1::{Client, ClientConfig, utils};
//! # let mut client = Client::connect("192.168.1.10:4001".parse().unwrap(), ClientConfig::default()).unwrap();
//! // Single-bit write, runs as a masked write on the PLC
//! client.write_bit(3, 4, 2, true)?;
//!
//! // Reading bits goes through the containing word
//! let word = client.read_binary(3, 4, 1)?[0];
//! let state = utils::get_bit(word, 2);
//! # Ok::<(), ab_df1::Df1Error>(())
//! ```
//!
//! ### Timers and Counters
//!
//! ```no_run
//! # use ab_df1::{Client, ClientConfig, CounterField, TimerField, TimerFlag};
//! # let mut client = Client::connect("192.168.1.10:4001".parse().unwrap(), ClientConfig::default()).unwrap();
//! // Value words
//! let elapsed = client.read_timer_field(4, 0, TimerField::Accumulator)?;
//! let target = client.read_timer_field(4, 0, TimerField::Preset)?;
//! let count = client.read_counter_field(5, 0, CounterField::Accumulator)?;
//!
//! // Status flags
//! if client.read_timer_flag(4, 0, TimerFlag::Done)? {
//!     println!("T4:0 done after {elapsed}/{target}");
//! }
//! # Ok::<(), ab_df1::Df1Error>(())
//! ```
//!
//! ### Raw Commands
//!
//! The typed helpers cover the protected typed read/write family; anything
//! else can be built and sent by hand:
//!
//! ```no_run
//! # use ab_df1::{Client, ClientConfig, Command, FileType, LogicalAddress};
//! # let mut client = Client::connect("192.168.1.10:4001".parse().unwrap(), ClientConfig::default()).unwrap();
//! let addr = LogicalAddress::new(7, FileType::Integer, 0)?;
//! let tns = client.next_tns();
//! let command = Command::protected_typed_read(0x01, 0x00, tns, addr, 20)?;
//! let reply = client.send(command)?;
//! reply.check_error()?;
//! println!("raw payload: {:?}", reply.data);
//! # Ok::<(), ab_df1::Df1Error>(())
//! ```
//!
//! ## Utility Functions
//!
//! The [`utils`] module provides bit-manipulation helpers for working with
//! status words and binary-file words:
//!
//! ```
//! use ab_df1::utils::{extract_bits, get_bit, set_bit};
//!
//! // Timer control word with EN and TT set
//! let status: u16 = 0b1100_0000_0000_0000;
//!
//! assert!(get_bit(status, 15));
//! assert!(!get_bit(status, 13));
//!
//! let done = set_bit(status, 13, true);
//! assert_eq!(extract_bits(done, 13, 15), 0b111);
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Df1Error>`]. The library never panics
//! in public code. PLC-side rejections carry the STS code and, for extended
//! status, the EXT STS byte:
//!
//! ```no_run
//! use ab_df1::{sts_description, Client, ClientConfig, Df1Error};
//!
//! let mut client = Client::connect(
//!     "192.168.1.10:4001".parse().unwrap(),
//!     ClientConfig::default(),
//! )?;
//!
//! match client.read_integers(7, 0, 10) {
//!     Ok(values) => println!("{values:?}"),
//!     Err(Df1Error::Timeout) => println!("link timed out"),
//!     Err(Df1Error::Plc { sts, ext_sts }) => {
//!         println!("PLC rejected: {} (ext: {ext_sts:?})", sts_description(sts));
//!     }
//!     Err(e) => println!("error: {e}"),
//! }
//! # Ok::<(), Df1Error>(())
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use ab_df1::{ChecksumKind, ClientConfig};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new(0x00, 0x01)
//!     .with_checksum(ChecksumKind::Bcc)               // Match the channel setup (default: CRC-16)
//!     .with_ack_timeout(Duration::from_millis(200))   // Default: 500 ms
//!     .with_reply_timeout(Duration::from_secs(5))     // Default: 3 s
//!     .with_max_retries(5);                           // Default: 3
//! ```
//!
//! ## Link Behavior
//!
//! DF1 full-duplex is a stop-and-wait protocol from the client's side: each
//! operation sends one command frame, waits for the ACK symbol, then waits
//! for the reply frame and acknowledges it. Lost or corrupted traffic is
//! recovered with ENQ and NAK symbols and bounded retransmission, all inside
//! the call. One transaction runs at a time; there is no multiplexing.
//!
//! The lower layers are public for applications that need them: [`Frame`]
//! and [`LinkMessage`] for the wire format, [`ReceiveBuffer`] for incremental
//! parsing, [`stuff`]/[`destuff`] and [`bcc`]/[`crc16`] for the raw codec,
//! and [`TransactionManager`] for running the handshake over a custom
//! transport.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod buffer;
mod checksum;
mod client;
mod command;
mod error;
mod file_type;
mod frame;
mod reply;
mod stuffing;
mod transaction;
mod transport;
pub mod utils;

// Public re-exports
pub use buffer::{ReceiveBuffer, RECEIVE_CAPACITY};
pub use checksum::{bcc, crc16, ChecksumKind};
pub use client::{Client, ClientConfig, CounterField, CounterFlag, TimerField, TimerFlag};
pub use command::{Command, LogicalAddress, MAX_DATA_BYTES};
pub use error::{sts_description, Df1Error, FramingError, Result, TransactionError};
pub use file_type::{FileType, TypedData};
pub use frame::{Frame, LinkMessage, ACK, DLE, ENQ, ETX, MAX_BODY_LEN, NAK, STX};
pub use reply::{Reply, MIN_REPLY_BODY};
pub use stuffing::{destuff, stuff};
pub use transaction::{
    TransactionManager, DEFAULT_ACK_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_REPLY_TIMEOUT,
};
pub use transport::{TcpTransport, Transport, DEFAULT_CONNECT_TIMEOUT, READ_CHUNK_SIZE};

#[cfg(feature = "serial")]
pub use transport::SerialTransport;

//! Byte-stream transports carrying link traffic.
//!
//! This module defines the [`Transport`] trait the link layer drives, plus
//! two implementations: [`TcpTransport`] for serial device servers that
//! bridge a PLC's serial port onto TCP, and `SerialTransport` (behind the
//! `serial` feature) for a directly attached port.
//!
//! # Design
//!
//! The transport layer follows these principles:
//!
//! - **Protocol agnostic** - Handles only byte transmission, no protocol knowledge
//! - **Synchronous** - Blocking reads with a per-call timeout
//! - **Stepwise** - A transaction is several writes and reads, so the two
//!   directions are separate methods rather than a single exchange
//!
//! # Constants
//!
//! - [`DEFAULT_CONNECT_TIMEOUT`] - TCP connect timeout (3 seconds)
//! - [`READ_CHUNK_SIZE`] - Largest chunk a single read returns (1024 bytes)
//!
//! # Example
//!
//! The transport is typically used through the [`Client`](crate::Client)
//! struct, but can be driven directly:
//!
//! ```no_run
//! use ab_df1::{Transport, TcpTransport};
//! use std::time::Duration;
//!
//! let mut transport = TcpTransport::connect("192.168.1.10:4001".parse().unwrap()).unwrap();
//! transport.write_all(&[0x10, 0x05]).unwrap();
//! let chunk = transport.read_some(Duration::from_millis(500)).unwrap();
//! ```

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::{Df1Error, Result};

/// Timeout for establishing a TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Largest chunk a single read returns.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Shortest wait a transport read is asked for; zero-length socket timeouts
/// are not portable.
const MIN_READ_WAIT: Duration = Duration::from_millis(1);

/// A synchronous byte stream the link layer talks through.
///
/// Implementations deliver bytes as they arrive, without interpreting them.
/// Chunk boundaries carry no meaning; frames are reassembled above the
/// transport.
pub trait Transport {
    /// Writes the whole buffer to the link.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Reads whatever bytes are available, waiting at most `max_wait`.
    ///
    /// Returns at least one byte on success; a window with no traffic maps
    /// to `Df1Error::Timeout` rather than an empty chunk.
    fn read_some(&mut self, max_wait: Duration) -> Result<Vec<u8>>;

    /// Discards bytes already queued on the link and returns how many were
    /// thrown away.
    ///
    /// Called before a transaction when earlier traffic may have left stale
    /// bytes behind.
    fn drain(&mut self) -> Result<usize> {
        let mut drained = 0;
        loop {
            match self.read_some(MIN_READ_WAIT) {
                Ok(chunk) => drained += chunk.len(),
                Err(Df1Error::Timeout) => return Ok(drained),
                Err(e) => return Err(e),
            }
        }
    }
}

/// Transport over a TCP connection to a serial device server.
///
/// Device servers (Moxa NPort, Digi PortServer, Lantronix and the like)
/// expose a PLC's serial port as a raw TCP socket. Nagle's algorithm is
/// disabled on connect so the short control sequences go out immediately.
pub struct TcpTransport {
    stream: TcpStream,
    remote_addr: SocketAddr,
}

impl TcpTransport {
    /// Connects to the device server at `addr`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the connection cannot be established within
    /// [`DEFAULT_CONNECT_TIMEOUT`] or the socket cannot be configured.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_df1::TcpTransport;
    ///
    /// let transport = TcpTransport::connect("192.168.1.10:4001".parse().unwrap()).unwrap();
    /// ```
    pub fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect_timeout(&addr, DEFAULT_CONNECT_TIMEOUT)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            remote_addr: addr,
        })
    }

    /// Wraps an already connected stream.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the socket cannot be configured.
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let remote_addr = stream.peer_addr()?;
        Ok(Self {
            stream,
            remote_addr,
        })
    }

    /// Returns the device server address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}

impl Transport for TcpTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        Ok(())
    }

    fn read_some(&mut self, max_wait: Duration) -> Result<Vec<u8>> {
        let wait = max_wait.max(MIN_READ_WAIT);
        self.stream.set_read_timeout(Some(wait))?;

        let mut buffer = vec![0u8; READ_CHUNK_SIZE];
        match self.stream.read(&mut buffer) {
            Ok(0) => Err(Df1Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed by peer",
            ))),
            Ok(size) => {
                buffer.truncate(size);
                Ok(buffer)
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(Df1Error::Timeout),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(Df1Error::Timeout),
            Err(e) => Err(Df1Error::Io(e)),
        }
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.stream.local_addr().ok())
            .finish()
    }
}

/// Transport over a directly attached serial port, 8-N-1.
///
/// Requires the `serial` feature.
#[cfg(feature = "serial")]
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
    path: String,
}

#[cfg(feature = "serial")]
impl SerialTransport {
    /// Opens the port at `path` with the given baud rate.
    ///
    /// DF1 links run 8 data bits, no parity, one stop bit; only the baud
    /// rate varies between installations.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the port cannot be opened or configured.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ab_df1::SerialTransport;
    ///
    /// let transport = SerialTransport::open("/dev/ttyUSB0", 19_200).unwrap();
    /// ```
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(MIN_READ_WAIT)
            .open()
            .map_err(std::io::Error::from)?;
        Ok(Self {
            port,
            path: path.to_owned(),
        })
    }

    /// Returns the device path the port was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(feature = "serial")]
impl Transport for SerialTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_some(&mut self, max_wait: Duration) -> Result<Vec<u8>> {
        let wait = max_wait.max(MIN_READ_WAIT);
        self.port
            .set_timeout(wait)
            .map_err(std::io::Error::from)?;

        let mut buffer = vec![0u8; READ_CHUNK_SIZE];
        match self.port.read(&mut buffer) {
            // Some drivers report an expired timeout as a zero-length read.
            Ok(0) => Err(Df1Error::Timeout),
            Ok(size) => {
                buffer.truncate(size);
                Ok(buffer)
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(Df1Error::Timeout),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(Df1Error::Timeout),
            Err(e) => Err(Df1Error::Io(e)),
        }
    }
}

#[cfg(feature = "serial")]
impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("path", &self.path)
            .field("baud_rate", &self.port.baud_rate().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn connected_pair() -> (TcpTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let transport = TcpTransport::connect(addr).unwrap();
        let (peer, _) = listener.accept().unwrap();
        (transport, peer)
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs(3));
        assert_eq!(READ_CHUNK_SIZE, 1024);
    }

    #[test]
    fn test_connect_and_write() {
        let (mut transport, mut peer) = connected_pair();
        assert_eq!(transport.remote_addr(), peer.local_addr().unwrap());

        transport.write_all(&[0x10, 0x05]).unwrap();
        let mut received = [0u8; 2];
        peer.read_exact(&mut received).unwrap();
        assert_eq!(received, [0x10, 0x05]);
    }

    #[test]
    fn test_read_some_returns_available_bytes() {
        let (mut transport, mut peer) = connected_pair();
        peer.write_all(&[0x10, 0x06]).unwrap();

        let chunk = transport.read_some(Duration::from_secs(1)).unwrap();
        assert_eq!(chunk, vec![0x10, 0x06]);
    }

    #[test]
    fn test_read_some_times_out() {
        let (mut transport, _peer) = connected_pair();
        let result = transport.read_some(Duration::from_millis(50));
        assert!(matches!(result, Err(Df1Error::Timeout)));
    }

    #[test]
    fn test_drain_discards_stale_bytes() {
        let (mut transport, mut peer) = connected_pair();
        peer.write_all(&[0x01, 0x02, 0x03, 0x04]).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(transport.drain().unwrap(), 4);
        assert_eq!(transport.drain().unwrap(), 0);
    }

    #[test]
    fn test_transport_debug() {
        let (transport, _peer) = connected_pair();
        let debug_str = format!("{transport:?}");
        assert!(debug_str.contains("TcpTransport"));
        assert!(debug_str.contains("127.0.0.1"));
    }
}

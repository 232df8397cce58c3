//! Transport abstraction for the connection server.
//!
//! The server never needs more than "give me the next connection": it reads
//! one request from the stream, writes one response and drops the stream to
//! close it. [`Acceptor`] captures exactly that, so the server can be run
//! over a real TCP listener or over in-memory streams in tests.
//!
//! ```text
//! accept() ──► read request line ──► route ──► write response ──► drop
//! ```

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

/// Source of connections, accepted one at a time.
pub trait Acceptor {
    /// Byte stream of one accepted connection.
    type Stream: Read + Write;

    /// Block until the next connection arrives.
    ///
    /// Returns the stream and, when known, the peer address.
    fn accept(&mut self) -> io::Result<(Self::Stream, Option<SocketAddr>)>;
}

impl Acceptor for TcpListener {
    type Stream = TcpStream;

    fn accept(&mut self) -> io::Result<(TcpStream, Option<SocketAddr>)> {
        let (stream, peer) = TcpListener::accept(self)?;
        Ok((stream, Some(peer)))
    }
}

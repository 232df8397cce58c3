//! Blocking single-connection request server.
//!
//! One connection is handled completely, and closed, before the next one is
//! accepted:
//!
//! ```text
//! Listening ─► Accepted ─► Decoding ─► Routing ─► Responding ─► Closed ─┐
//!     ▲                        │ malformed               ▲              │
//!     │                        └─────────── 400 ─────────┘              │
//!     └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures on one connection (read, write, decode, routing) never stop the
//! loop; they are logged and the server goes back to `accept`.
//!
//! # Example
//!
//! ```rust
//! use rs_homenode::device::Fan;
//! use rs_homenode::hal::{MockAcceptor, MockSwitch};
//! use rs_homenode::services::{ConnectionServer, SharedDevice};
//!
//! let mut acceptor = MockAcceptor::new();
//! let response = acceptor.push_request("POST /toggle HTTP/1.1\r\n\r\n");
//!
//! let fan = SharedDevice::new(Fan::new(MockSwitch::new()));
//! let mut server = ConnectionServer::new(acceptor, &fan);
//! server.serve_one().unwrap();
//!
//! assert!(response.text().starts_with("HTTP/1.0 200 OK\r\n"));
//! assert_eq!(fan.snapshot().unwrap().to_body(), "1");
//! ```

use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener};

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, MalformedRequest};
use crate::response::{encode, Outcome};
use crate::router;
use crate::traits::{Acceptor, StateGuard};

/// Largest request line the server accepts, terminator included.
pub const DEFAULT_REQUEST_BUFFER: usize = 1024;

/// Pending connections the OS queues while one is being served.
pub const DEFAULT_BACKLOG: u32 = 1;

/// Bind a blocking listener with an explicit accept backlog.
///
/// # Errors
///
/// If the socket cannot be created, bound or put into listening state.
pub fn bind_listener(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(i32::try_from(backlog).unwrap_or(i32::MAX))?;
    Ok(socket.into())
}

/// What [`read_request`] took off the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRequest {
    /// Bytes up to and including the first `\n`, or everything before EOF.
    Line(Vec<u8>),
    /// The buffer filled up with no `\n` in it.
    TooLong,
}

impl RawRequest {
    /// Decode, route and apply, or reject an over-long line without
    /// touching the device.
    pub fn handle<G: StateGuard>(&self, guard: &G, limit: usize) -> Outcome {
        match self {
            Self::Line(raw) => router::handle(raw, guard),
            Self::TooLong => {
                warn!(limit, "request line exceeds buffer");
                Outcome::from(Error::from(MalformedRequest::TooLong(limit)))
            }
        }
    }
}

/// Read the request line: up to the first `\n` or EOF, within `limit` bytes.
///
/// Bytes after the `\n` (headers, body) are dropped.
///
/// # Errors
///
/// Any I/O error other than [`ErrorKind::Interrupted`].
pub fn read_request<R: Read>(stream: &mut R, limit: usize) -> io::Result<RawRequest> {
    let mut buf = vec![0u8; limit];
    let mut len = 0;

    while len < limit {
        match stream.read(&mut buf[len..]) {
            Ok(0) => {
                buf.truncate(len);
                return Ok(RawRequest::Line(buf));
            }
            Ok(n) => {
                if let Some(pos) = buf[len..len + n].iter().position(|&b| b == b'\n') {
                    buf.truncate(len + pos + 1);
                    return Ok(RawRequest::Line(buf));
                }
                len += n;
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(RawRequest::TooLong)
}

/// Serves one device, one connection at a time.
pub struct ConnectionServer<A: Acceptor, G: StateGuard> {
    acceptor: A,
    guard: G,
    buffer_size: usize,
    served: u64,
}

impl<A: Acceptor, G: StateGuard> ConnectionServer<A, G> {
    /// Create a server over an acceptor and a guard.
    pub fn new(acceptor: A, guard: G) -> Self {
        Self {
            acceptor,
            guard,
            buffer_size: DEFAULT_REQUEST_BUFFER,
            served: 0,
        }
    }

    /// Set the request buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Number of connections that got a response written.
    pub fn served(&self) -> u64 {
        self.served
    }

    /// The guard this server routes into.
    pub fn guard(&self) -> &G {
        &self.guard
    }

    /// Accept and fully handle one connection.
    ///
    /// Returns the outcome that was sent.
    ///
    /// # Errors
    ///
    /// Accept failures, and read or write failures on the accepted
    /// connection. The connection is closed either way.
    pub fn serve_one(&mut self) -> io::Result<Outcome> {
        trace!("listening");
        let (mut stream, peer) = self.acceptor.accept()?;
        trace!(?peer, "accepted");

        let outcome = self.handle_connection(&mut stream)?;
        self.served += 1;

        drop(stream);
        trace!(?peer, status = outcome.status.code(), "closed");
        Ok(outcome)
    }

    /// Handle up to `count` connections, logging and skipping failures.
    ///
    /// Returns how many got a response.
    pub fn serve_many(&mut self, count: usize) -> usize {
        (0..count).filter(|_| self.serve_logged()).count()
    }

    /// Serve forever.
    pub fn run(&mut self) -> ! {
        info!(buffer = self.buffer_size, "connection server running");
        loop {
            self.serve_logged();
        }
    }

    fn serve_logged(&mut self) -> bool {
        match self.serve_one() {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "connection failed");
                false
            }
        }
    }

    /// Read, route and answer one request on an already accepted stream.
    ///
    /// # Errors
    ///
    /// Read or write failures. Nothing is written if the read fails.
    pub fn handle_connection<S: Read + Write>(&self, stream: &mut S) -> io::Result<Outcome> {
        let raw = read_request(stream, self.buffer_size)?;
        if let RawRequest::Line(line) = &raw {
            trace!(bytes = line.len(), "decoding");
            debug!(request = %first_line_lossy(line), "request");
        }

        let outcome = raw.handle(&self.guard, self.buffer_size);
        trace!(status = outcome.status.code(), "responding");

        stream.write_all(&encode(&outcome))?;
        stream.flush()?;
        Ok(outcome)
    }
}

fn first_line_lossy(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == b'\n').unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim_end().to_string()
}

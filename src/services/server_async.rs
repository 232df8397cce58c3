//! Async variant of the connection server, on tokio.
//!
//! Same cycle and same one-at-a-time discipline as
//! [`ConnectionServer`](super::ConnectionServer): the next connection is only
//! accepted once the current one has been answered and closed. Handy on a
//! desktop where the poller runs as a tokio task too.

use std::io::{self, ErrorKind};
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket};
use tracing::{debug, info, trace, warn};

use super::server::{RawRequest, DEFAULT_BACKLOG, DEFAULT_REQUEST_BUFFER};
use crate::response::{encode, Outcome};
use crate::traits::StateGuard;

/// Read the request line: up to the first `\n` or EOF, within `limit` bytes.
///
/// # Errors
///
/// Any I/O error other than [`ErrorKind::Interrupted`].
pub async fn read_request_async<R: AsyncRead + Unpin>(
    stream: &mut R,
    limit: usize,
) -> io::Result<RawRequest> {
    let mut buf = vec![0u8; limit];
    let mut len = 0;

    while len < limit {
        match stream.read(&mut buf[len..]).await {
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

/// Read, route and answer one request on an accepted stream.
///
/// # Errors
///
/// Read or write failures.
pub async fn handle_connection_async<S, G>(
    stream: &mut S,
    guard: &G,
    buffer_size: usize,
) -> io::Result<Outcome>
where
    S: AsyncRead + AsyncWrite + Unpin,
    G: StateGuard,
{
    let raw = read_request_async(stream, buffer_size).await?;
    if let RawRequest::Line(line) = &raw {
        trace!(bytes = line.len(), "decoding");
    }

    let outcome = raw.handle(guard, buffer_size);
    trace!(status = outcome.status.code(), "responding");

    stream.write_all(&encode(&outcome)).await?;
    stream.flush().await?;
    stream.shutdown().await?;
    Ok(outcome)
}

/// Tokio connection server over a [`TcpListener`].
pub struct AsyncConnectionServer<G: StateGuard> {
    listener: TcpListener,
    guard: G,
    buffer_size: usize,
}

impl<G: StateGuard> AsyncConnectionServer<G> {
    /// Bind to `addr` with a backlog of [`DEFAULT_BACKLOG`].
    ///
    /// # Errors
    ///
    /// If the address cannot be bound.
    pub async fn bind(addr: SocketAddr, guard: G) -> io::Result<Self> {
        Self::bind_with_backlog(addr, DEFAULT_BACKLOG, guard).await
    }

    /// Bind to `addr` with an explicit accept backlog.
    ///
    /// # Errors
    ///
    /// If the address cannot be bound or the socket cannot listen.
    pub async fn bind_with_backlog(addr: SocketAddr, backlog: u32, guard: G) -> io::Result<Self> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(backlog)?;
        Ok(Self::from_listener(listener, guard))
    }

    /// Use an already bound listener.
    pub fn from_listener(listener: TcpListener, guard: G) -> Self {
        Self {
            listener,
            guard,
            buffer_size: DEFAULT_REQUEST_BUFFER,
        }
    }

    /// Set the request buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Address the listener is bound to.
    ///
    /// # Errors
    ///
    /// If the socket has no local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and fully handle one connection.
    ///
    /// # Errors
    ///
    /// Accept, read or write failures.
    pub async fn serve_one(&self) -> io::Result<Outcome> {
        let (mut stream, peer) = self.listener.accept().await?;
        trace!(%peer, "accepted");
        let outcome = handle_connection_async(&mut stream, &self.guard, self.buffer_size).await?;
        debug!(%peer, status = outcome.status.code(), "served");
        Ok(outcome)
    }

    /// Serve forever; failures on one connection are logged and skipped.
    pub async fn run(self) {
        match self.local_addr() {
            Ok(addr) => info!(%addr, "async connection server listening"),
            Err(_) => info!("async connection server listening"),
        }
        loop {
            if let Err(err) = self.serve_one().await {
                warn!(error = %err, "connection failed");
            }
        }
    }
}

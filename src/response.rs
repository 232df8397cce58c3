//! Outcomes and the response encoder.
//!
//! Responses carry a fixed three-line header block and then the body, if
//! any, with no length framing. Clients detect the end of the body by the
//! connection closing.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Error;

/// Status codes used by the controllers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// 200 - request applied or read.
    Ok,
    /// 400 - malformed request, unknown route or invalid parameters.
    BadRequest,
    /// 405 - known route, wrong verb.
    MethodNotAllowed,
    /// 500 - sensor or driver failure.
    InternalServerError,
}

impl Status {
    /// Numeric status code.
    pub const fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }

    /// Reason phrase for the status line.
    pub const fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::InternalServerError => "Internal Server Error",
        }
    }

    /// Complete header block, including the blank line that ends it.
    pub const fn header(self) -> &'static str {
        match self {
            Status::Ok => {
                "HTTP/1.0 200 OK\r\nContent-type: text/html\r\nAccess-Control-Allow-Origin: *\r\n\r\n"
            }
            Status::BadRequest => {
                "HTTP/1.0 400 Bad Request\r\nContent-type: text/html\r\nAccess-Control-Allow-Origin: *\r\n\r\n"
            }
            Status::MethodNotAllowed => {
                "HTTP/1.0 405 Method Not Allowed\r\nContent-type: text/html\r\nAccess-Control-Allow-Origin: *\r\n\r\n"
            }
            Status::InternalServerError => {
                "HTTP/1.0 500 Internal Server Error\r\nContent-type: text/html\r\nAccess-Control-Allow-Origin: *\r\n\r\n"
            }
        }
    }
}

/// Result of handling one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Status to report.
    pub status: Status,
    /// Body for read routes; `None` for everything else.
    pub body: Option<String>,
}

impl Outcome {
    /// 200 without a body.
    pub const fn ok() -> Self {
        Self {
            status: Status::Ok,
            body: None,
        }
    }

    /// 200 with a body.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            body: Some(body.into()),
        }
    }

    /// Check if this is a 200 outcome.
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Body text, or an empty string.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

impl From<Error> for Outcome {
    fn from(err: Error) -> Self {
        Self {
            status: err.status(),
            body: None,
        }
    }
}

/// Encode an outcome into the bytes sent on the wire.
pub fn encode(outcome: &Outcome) -> Vec<u8> {
    let header = outcome.status.header();
    let body = outcome.body();
    let mut bytes = Vec::with_capacity(header.len() + body.len());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(body.as_bytes());
    bytes
}

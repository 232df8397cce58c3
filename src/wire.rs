//! Wire decoder for the request line.
//!
//! Controllers speak a deliberately tiny subset of HTTP: only the first line
//! of a request is looked at, and everything the device needs travels in the
//! query string.
//!
//! ```text
//! <VERB> /<route>[?key=value[&key=value...]] <anything>
//! ```
//!
//! # Example
//!
//! ```rust
//! use rs_homenode::wire::{decode, Verb};
//!
//! let req = decode(b"POST /position?percentage=55 HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
//! assert_eq!(req.verb, Verb::Post);
//! assert_eq!(req.route, "position");
//! assert_eq!(req.param("percentage"), Some("55"));
//! ```

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;

use crate::error::MalformedRequest;

/// Query parameters of one request. Later duplicates overwrite earlier ones.
pub type Params = BTreeMap<String, String>;

/// The method token of a request line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verb {
    /// `GET` - read routes.
    Get,
    /// `POST` - mutating routes.
    Post,
    /// Anything else, kept verbatim so it can be logged.
    Other(String),
}

impl Verb {
    /// Classify a method token. Matching is case-sensitive, like the token on the wire.
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Verb::Get,
            "POST" => Verb::Post,
            other => Verb::Other(other.to_string()),
        }
    }

    /// The token as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Other(token) => token,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully decoded request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Request method.
    pub verb: Verb,
    /// First path segment after the leading slash.
    pub route: String,
    /// Query parameters.
    pub params: Params,
}

impl Request {
    /// Look up a parameter value.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Decode the request line at the start of `raw`.
///
/// Only the first line is parsed; headers and body are ignored. Parsing is
/// all-or-nothing: either every part of the line is well formed or an error
/// is returned.
///
/// # Errors
///
/// Returns [`MalformedRequest`] when the line is empty, not UTF-8, lacks the
/// space after the verb, has a target without a leading `/`, or contains a
/// query segment without `=`.
pub fn decode(raw: &[u8]) -> Result<Request, MalformedRequest> {
    let line = first_line(raw)?;
    if line.is_empty() {
        return Err(MalformedRequest::Empty);
    }

    let (verb, rest) = line.split_once(' ').ok_or(MalformedRequest::MissingSpace)?;
    let target = rest.split(' ').next().unwrap_or_default();
    let path = target
        .strip_prefix('/')
        .ok_or(MalformedRequest::MissingSlash)?;

    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };
    let route = path.split('/').next().unwrap_or_default();

    let params = match query {
        Some(query) => parse_query(query)?,
        None => Params::new(),
    };

    Ok(Request {
        verb: Verb::from_token(verb),
        route: route.to_string(),
        params,
    })
}

/// Split a query string into key/value pairs.
///
/// Each `&`-separated segment is split once on `=`, so `a=b=c` yields
/// `("a", "b=c")`.
pub fn parse_query(query: &str) -> Result<Params, MalformedRequest> {
    let mut params = Params::new();
    for segment in query.split('&') {
        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| MalformedRequest::ParameterWithoutValue(segment.to_string()))?;
        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}

/// Extract the first line of the buffer without its line terminator.
fn first_line(raw: &[u8]) -> Result<&str, MalformedRequest> {
    let end = raw.iter().position(|&b| b == b'\n').unwrap_or(raw.len());
    let line = &raw[..end];
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    core::str::from_utf8(line).map_err(|_| MalformedRequest::NotUtf8)
}

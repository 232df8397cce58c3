//! Error taxonomy for the request cycle.
//!
//! Every failure a controller can hit while serving a request falls into one
//! of five categories, each with a fixed status code:
//!
//! | Variant | Status | Meaning |
//! |---------|--------|---------|
//! | [`Error::Malformed`] | 400 | Request line could not be decoded |
//! | [`Error::InvalidParameters`] | 400 | Missing, non-numeric or out-of-range parameter |
//! | [`Error::UnknownRoute`] | 400 | Route is not served by this device |
//! | [`Error::MethodNotAllowed`] | 405 | Known route, wrong verb |
//! | [`Error::HardwareFault`] | 500 | A driver failed while acquiring or applying |
//!
//! All of them are converted into an [`Outcome`](crate::Outcome) at the router
//! boundary, so none of them ever ends a server loop.

use alloc::string::String;
use thiserror::Error;

use crate::response::Status;
use crate::wire::Verb;

/// Reasons the wire decoder rejects a request buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedRequest {
    /// The buffer held no request line at all.
    #[error("empty request")]
    Empty,

    /// The request line is not valid UTF-8.
    #[error("request line is not valid UTF-8")]
    NotUtf8,

    /// No space separates the verb from the target.
    #[error("missing space after verb")]
    MissingSpace,

    /// The target does not start with `/`.
    #[error("target does not start with '/'")]
    MissingSlash,

    /// A query segment has no `=`.
    #[error("parameter segment {0:?} has no '='")]
    ParameterWithoutValue(String),

    /// The request buffer filled up before the request line ended.
    #[error("request line does not fit in {0} bytes")]
    TooLong(usize),
}

/// Reasons a route's parameters fail validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidParameter {
    /// A required key was not supplied.
    #[error("missing parameter '{0}'")]
    Missing(&'static str),

    /// The value could not be parsed as an integer.
    #[error("parameter '{key}' is not a number: {value:?}")]
    NotANumber {
        /// Parameter name.
        key: &'static str,
        /// Raw value as received.
        value: String,
    },

    /// The value parsed but lies outside the allowed range.
    #[error("parameter '{key}' = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Parameter name.
        key: &'static str,
        /// Parsed value.
        value: i64,
        /// Inclusive minimum.
        min: i64,
        /// Inclusive maximum.
        max: i64,
    },

    /// The value is not one of the accepted words.
    #[error("parameter '{key}' has unsupported value {value:?}")]
    Unsupported {
        /// Parameter name.
        key: &'static str,
        /// Raw value as received.
        value: String,
    },
}

/// Any failure inside one request cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The request line could not be decoded.
    #[error("malformed request: {0}")]
    Malformed(#[from] MalformedRequest),

    /// The parameters of a known route are missing or invalid.
    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] InvalidParameter),

    /// The route exists but does not accept this verb.
    #[error("method {verb} not allowed on /{route}")]
    MethodNotAllowed {
        /// Route that was addressed.
        route: String,
        /// Verb that was used.
        verb: Verb,
    },

    /// The route is not served by this device.
    #[error("unknown route /{0}")]
    UnknownRoute(String),

    /// A hardware driver reported a failure.
    #[error("hardware fault: {0}")]
    HardwareFault(String),
}

impl Error {
    /// Wrap any driver error into [`Error::HardwareFault`].
    pub fn hardware(err: impl core::fmt::Debug) -> Self {
        Self::HardwareFault(alloc::format!("{err:?}"))
    }

    /// Status code this error maps to on the wire.
    pub const fn status(&self) -> Status {
        match self {
            Self::Malformed(_) | Self::InvalidParameters(_) | Self::UnknownRoute(_) => {
                Status::BadRequest
            }
            Self::MethodNotAllowed { .. } => Status::MethodNotAllowed,
            Self::HardwareFault(_) => Status::InternalServerError,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn status_mapping() {
        assert_eq!(
            Error::from(MalformedRequest::MissingSpace).status(),
            Status::BadRequest
        );
        assert_eq!(
            Error::from(InvalidParameter::Missing("red")).status(),
            Status::BadRequest
        );
        assert_eq!(
            Error::UnknownRoute("nope".into()).status(),
            Status::BadRequest
        );
        assert_eq!(
            Error::MethodNotAllowed {
                route: "status".into(),
                verb: Verb::Post
            }
            .status(),
            Status::MethodNotAllowed
        );
        assert_eq!(
            Error::HardwareFault("timeout".into()).status(),
            Status::InternalServerError
        );
    }

    #[test]
    fn hardware_wraps_debug_output() {
        #[derive(Debug)]
        struct ChecksumMismatch;

        let err = Error::hardware(ChecksumMismatch);
        assert_eq!(err, Error::HardwareFault("ChecksumMismatch".into()));
    }

    #[test]
    fn display_messages() {
        let err = Error::from(InvalidParameter::OutOfRange {
            key: "percentage",
            value: 150,
            min: 0,
            max: 100,
        });
        assert_eq!(
            err.to_string(),
            "invalid parameters: parameter 'percentage' = 150 is out of range [0, 100]"
        );

        let err = Error::MethodNotAllowed {
            route: "status".into(),
            verb: Verb::Post,
        };
        assert_eq!(err.to_string(), "method POST not allowed on /status");

        let err = Error::from(MalformedRequest::TooLong(1024));
        assert_eq!(
            err.to_string(),
            "malformed request: request line does not fit in 1024 bytes"
        );
        assert_eq!(err.status(), Status::BadRequest);
    }
}

// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

use std::fmt;

/// The two failure outcomes a crypto-core operation can report.
///
/// There is no third "ok" variant: success is `Result::Ok`. Every public
/// operation collapses whatever the backend reported into one of these two
/// buckets; the originating backend error is kept only as a `source()` for
/// diagnostics and must never be matched on by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A precondition was violated: null/empty argument, wrong buffer size,
    /// unsupported or unrecognized policy URI, mismatched SecretBuffer
    /// length, password not NUL-terminated at the declared length, and so
    /// on. Treated by the caller as a program bug.
    InvalidParameter,
    /// The precondition held but the operation failed for a runtime
    /// reason: backend error, allocation failure, signature mismatch on
    /// verify, chain-validation failure, DRBG exhaustion. Treated by the
    /// caller as a protocol-level security error.
    NotOk,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidParameter => write!(f, "invalid parameter"),
            ErrorKind::NotOk => write!(f, "operation failed"),
        }
    }
}

/// The single error type returned by every fallible crypto-core operation.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Error { kind: ErrorKind::InvalidParameter, message: message.into(), source: None }
    }

    pub fn not_ok(message: impl Into<String>) -> Self {
        Error { kind: ErrorKind::NotOk, message: message.into(), source: None }
    }

    pub fn not_ok_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error { kind: ErrorKind::NotOk, message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_invalid_parameter(&self) -> bool {
        self.kind == ErrorKind::InvalidParameter
    }

    pub fn is_not_ok(&self) -> bool {
        self.kind == ErrorKind::NotOk
    }
}

pub type CryptoResult<T> = Result<T, Error>;

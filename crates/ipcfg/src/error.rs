//! Error types for interface configuration.

use std::fmt;
use std::io;

use crate::net::{AddressParseError, RouteParseError};

/// Result type for interface configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Status codes returned by the IP helper calls that callers commonly match on.
pub mod status {
    pub const NO_ERROR: u32 = 0;
    pub const ERROR_FILE_NOT_FOUND: u32 = 2;
    pub const ERROR_ACCESS_DENIED: u32 = 5;
    pub const ERROR_NOT_ENOUGH_MEMORY: u32 = 8;
    pub const ERROR_INVALID_PARAMETER: u32 = 87;
    pub const ERROR_BUFFER_OVERFLOW: u32 = 111;
    pub const ERROR_NO_DATA: u32 = 232;
    pub const ERROR_NOT_FOUND: u32 = 1168;
    pub const ERROR_OBJECT_ALREADY_EXISTS: u32 = 5010;
}

/// Errors that can occur while reading or changing interface configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (spawning the configuration tool, pipe failures).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An IP helper call returned a failure status.
    #[error("system error: {message} (status {code})")]
    Os {
        /// The status code returned by the call.
        code: u32,
        /// Human-readable error message.
        message: String,
    },

    /// An IP helper call failed, with operation context.
    #[error("{operation}: {message} (status {code})")]
    OsWithContext {
        /// The operation that failed.
        operation: String,
        /// The status code returned by the call.
        code: u32,
        /// Human-readable error message.
        message: String,
    },

    /// A record was cut short by the end of the buffer.
    #[error("record truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes the record needs.
        expected: usize,
        /// Bytes left in the buffer.
        actual: usize,
    },

    /// A record could not be interpreted (dangling pointer, runaway chain).
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// An embedded socket address carried an unknown family tag.
    #[error("malformed address: unknown address family {family}")]
    MalformedAddress {
        /// The family tag found in the socket address.
        family: u16,
    },

    /// The compiled record layout disagrees with the host's declared layout.
    #[error("record layout mismatch: {record}.{field} is {actual}, expected {expected}")]
    Layout {
        /// Record type name.
        record: &'static str,
        /// Field name, or `size` for the whole record.
        field: &'static str,
        /// Offset or size the host declares.
        expected: usize,
        /// Offset or size of the compiled mirror struct.
        actual: usize,
    },

    /// Interface lookup found nothing.
    #[error("interface not found: {key}")]
    InterfaceNotFound {
        /// The key that was looked up (LUID, index, name, GUID).
        key: String,
    },

    /// No route row matched the lookup key.
    #[error("route not found: {destination} via {next_hop}")]
    RouteNotFound {
        /// Destination that was looked up.
        destination: String,
        /// Next hop that was looked up.
        next_hop: String,
    },

    /// No unicast address row matched the lookup key.
    #[error("address not found: {address}")]
    AddressNotFound {
        /// Address that was looked up.
        address: String,
    },

    /// The configuration tool printed something other than the expected banners.
    #[error("netsh reported errors.\ninput:\n{input}\noutput:\n{output}")]
    Tool {
        /// Commands that were sent.
        input: String,
        /// Everything the tool printed.
        output: String,
    },

    /// The configuration tool exited unsuccessfully.
    #[error("netsh exited with status {status}.\ninput:\n{input}\noutput:\n{output}")]
    ToolExit {
        /// Process exit code (-1 if terminated without one).
        status: i32,
        /// Commands that were sent.
        input: String,
        /// Everything the tool printed.
        output: String,
    },

    /// Several independent operations failed.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Operation not supported on this host.
    #[error("operation not supported: {0}")]
    Unsupported(String),
}

/// Describe a status code.
fn status_message(code: u32) -> String {
    let known = match code {
        status::NO_ERROR => Some("The operation completed successfully."),
        status::ERROR_FILE_NOT_FOUND => Some("The system cannot find the file specified."),
        status::ERROR_ACCESS_DENIED => Some("Access is denied."),
        status::ERROR_NOT_ENOUGH_MEMORY => Some("Not enough memory resources are available."),
        status::ERROR_INVALID_PARAMETER => Some("The parameter is incorrect."),
        status::ERROR_BUFFER_OVERFLOW => Some("The file name is too long."),
        status::ERROR_NO_DATA => Some("The pipe is being closed."),
        status::ERROR_NOT_FOUND => Some("Element not found."),
        status::ERROR_OBJECT_ALREADY_EXISTS => Some("The object already exists."),
        _ => None,
    };
    match known {
        Some(message) => message.to_string(),
        #[cfg(windows)]
        None => io::Error::from_raw_os_error(code as i32).to_string(),
        #[cfg(not(windows))]
        None => format!("unknown status {code:#x}"),
    }
}

impl Error {
    /// Create an error from an IP helper status code.
    pub fn from_status(code: u32) -> Self {
        Self::Os {
            code,
            message: status_message(code),
        }
    }

    /// Create an error from a status code with operation context.
    pub fn from_status_with_context(code: u32, operation: impl Into<String>) -> Self {
        Self::OsWithContext {
            operation: operation.into(),
            code,
            message: status_message(code),
        }
    }

    /// Add context to this error.
    ///
    /// Wraps status errors with operation context. Other errors are returned unchanged.
    pub fn with_context(self, operation: impl Into<String>) -> Self {
        match self {
            Self::Os { code, message } => Self::OsWithContext {
                operation: operation.into(),
                code,
                message,
            },
            other => other,
        }
    }

    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Os { code, .. } | Self::OsWithContext { code, .. } => {
                matches!(*code, status::ERROR_FILE_NOT_FOUND | status::ERROR_NOT_FOUND)
            }
            Self::InterfaceNotFound { .. }
            | Self::RouteNotFound { .. }
            | Self::AddressNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this is an "already exists" error.
    pub fn is_already_exists(&self) -> bool {
        self.status() == Some(status::ERROR_OBJECT_ALREADY_EXISTS)
    }

    /// Check if this is a permission error.
    pub fn is_access_denied(&self) -> bool {
        self.status() == Some(status::ERROR_ACCESS_DENIED)
    }

    /// Get the status code if this is a system error.
    pub fn status(&self) -> Option<u32> {
        match self {
            Self::Os { code, .. } | Self::OsWithContext { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<AddressParseError> for Error {
    fn from(e: AddressParseError) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<RouteParseError> for Error {
    fn from(e: RouteParseError) -> Self {
        Self::Parse(e.to_string())
    }
}

/// A single failed operation inside a batch.
#[derive(Debug)]
pub struct OperationError {
    /// What operation was being performed.
    pub operation: String,
    /// The underlying error.
    pub error: Error,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.error)
    }
}

/// Failures collected from a fire-and-continue batch, in the order they happened.
#[derive(Debug, Default)]
pub struct BatchError {
    errors: Vec<OperationError>,
}

impl BatchError {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn push(&mut self, operation: impl Into<String>, error: Error) {
        self.errors.push(OperationError {
            operation: operation.into(),
            error,
        });
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded failures.
    pub fn errors(&self) -> &[OperationError] {
        &self.errors
    }

    /// Collapse into a result.
    ///
    /// No failures is `Ok`, a single failure is returned as that error (with
    /// its operation attached as context), and two or more become [`Error::Batch`].
    pub fn into_result(mut self) -> Result<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => {
                let failed = self.errors.remove(0);
                Err(failed.error.with_context(failed.operation))
            }
            _ => Err(Error::Batch(self)),
        }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors: ", self.errors.len())?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

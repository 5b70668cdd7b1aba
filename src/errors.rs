//! Error types for probe runs.
//!
//! Probes return a [`ProbeError`] carrying an [`ErrorKind`]; the aggregator
//! turns those into failure records, and the CLI maps kinds to exit codes.

use std::error::Error;
use std::fmt;

/// Exit codes for the application.
pub mod exit_codes {
    /// Every probe succeeded.
    pub const SUCCESS: i32 = 0;
    /// Server unreachable or a whole-probe deadline expired.
    pub const NETWORK_ERROR: i32 = 1;
    /// Unexpected status code or an unmeasurable transfer.
    pub const INVALID_RESPONSE: i32 = 2;
    /// Invalid arguments.
    pub const CONFIG_ERROR: i32 = 3;
    /// Some probes failed but others succeeded.
    pub const PARTIAL_FAILURE: i32 = 4;
    /// Unknown/unexpected error.
    pub const UNKNOWN_ERROR: i32 = 99;
    /// Run aborted with Ctrl-C.
    pub const INTERRUPTED: i32 = 130;
}

/// Categories of probe failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// All samples failed, or the server could not be reached.
    Connectivity,
    /// A whole-probe operation exceeded its deadline.
    Timeout,
    /// Unexpected status code, or a transfer too fast to measure.
    InvalidResponse,
    /// Input validation failed.
    Config,
}

impl ErrorKind {
    /// Get the exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Connectivity => exit_codes::NETWORK_ERROR,
            ErrorKind::Timeout => exit_codes::NETWORK_ERROR,
            ErrorKind::InvalidResponse => exit_codes::INVALID_RESPONSE,
            ErrorKind::Config => exit_codes::CONFIG_ERROR,
        }
    }

    /// Get a user-friendly description of this error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::Connectivity => "Connectivity error",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::InvalidResponse => "Invalid response",
            ErrorKind::Config => "Configuration error",
        }
    }
}

/// A probe or configuration failure.
#[derive(Debug)]
pub struct ProbeError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// User-friendly error message.
    pub message: String,
    /// Optional suggestion for how to resolve the error.
    pub suggestion: Option<String>,
    /// The underlying error, if any.
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl ProbeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), suggestion: None, source: None }
    }

    /// Add a suggestion for how to resolve the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add the underlying error source.
    pub fn with_source(
        mut self,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connectivity, message)
            .with_suggestion("Check your internet connection and the target URL.")
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message).with_suggestion(
            "The server may be slow; try a smaller size or a longer --timeout.",
        )
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidResponse, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.description(), self.message)
    }
}

impl Error for ProbeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// Format an error for user display, including any suggestion.
pub fn format_error_for_display(error: &ProbeError) -> String {
    let mut output = format!("Error: {}", error.message);

    if let Some(ref suggestion) = error.suggestion {
        output.push_str(&format!("\n\nSuggestion: {}", suggestion));
    }

    output
}

//! Error types and errno normalization

use std::io;

use thiserror::Error;

/// Error code for failures that reach the dispatcher without an errno.
pub const UNCATEGORIZED: i32 = -111;

/// Error code for walk entries whose failure carries no errno.
pub const WALK_ENTRY: i32 = -222;

/// Message prefix of every malformed-pattern error.
pub const BAD_PATTERN: &str = "syntax error in pattern";

/// Message a walk callback uses to ask for a directory to be skipped.
pub const SKIP_DIR: &str = "skip this directory";

/// Failure of a single request.
///
/// These are reported back to the caller as `error`/`errorCode` fields and
/// never stop the dispatcher.
#[derive(Debug, Error)]
pub enum FsError {
    /// Plain OS error.
    #[error("{0}")]
    Os(#[from] io::Error),
    /// OS error raised while operating on a specific path.
    #[error("{op} {path}: {source}")]
    Path {
        /// Name of the primitive that failed.
        op: &'static str,
        /// Path it was operating on.
        path: String,
        /// Underlying OS error.
        source: io::Error,
    },
    /// Malformed shell pattern.
    #[error("{}: {}", BAD_PATTERN, .0)]
    Pattern(#[from] glob::PatternError),
    /// No lexical relative path exists between the two inputs.
    #[error("Rel: can't make {target} relative to {base}")]
    Rel {
        /// Base path of the request.
        base: String,
        /// Target path of the request.
        target: String,
    },
    /// Operation name with no handler, when rejection is enabled.
    #[error("operation not supported: {0}")]
    UnknownOperation(String),
}

impl FsError {
    /// Wrap an OS error with the operation and path that produced it.
    pub fn path(op: &'static str, path: impl Into<String>, source: io::Error) -> Self {
        Self::Path {
            op,
            path: path.into(),
            source,
        }
    }

    /// The numeric code reported in `errorCode`.
    pub fn code(&self) -> i32 {
        match self {
            FsError::Os(e) => e.raw_os_error().unwrap_or(UNCATEGORIZED),
            FsError::Path { source, .. } => source.raw_os_error().unwrap_or(UNCATEGORIZED),
            FsError::Pattern(_) | FsError::Rel { .. } | FsError::UnknownOperation(_) => {
                UNCATEGORIZED
            }
        }
    }
}

/// Protocol-level failure that terminates the process.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A request could not be decoded.
    #[error("malformed request: {0}")]
    Decode(#[source] serde_json::Error),
    /// A response could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
    /// Reading or writing a standard stream failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The operation name has no handler.
    #[error("operation not supported: {0}")]
    UnknownOperation(String),
    /// The directory walk was stopped by a failing callback.
    #[error("walk of {root} aborted: {source}")]
    WalkAborted {
        /// Root of the walk.
        root: String,
        /// Failure raised by the callback.
        source: Box<BridgeError>,
    },
}

/// Walk entry error code: the errno when there is one, otherwise [`WALK_ENTRY`].
pub fn walk_error_code(err: &walkdir::Error) -> i32 {
    err.io_error()
        .and_then(io::Error::raw_os_error)
        .unwrap_or(WALK_ENTRY)
}

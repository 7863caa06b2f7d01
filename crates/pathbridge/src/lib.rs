//! pathbridge: host path primitives over JSON stdio
//!
//! A caller written in another runtime sends one JSON request per operation
//! (`{"operation": "clean", "path": "a//b/.."}`) and reads back one JSON
//! response per result. Directory walks stream one response per visited
//! entry. Failures are reported as `error`/`errorCode` fields carrying the
//! host errno when there is one.

mod dispatch;
mod error;
mod pattern;
mod protocol;
mod sink;

pub mod fs;
pub mod paths;
pub mod walk;

pub use dispatch::{
    DispatchOptions, Dispatcher, Handler, OperationTable, ServeStats, SingleFn, StreamFn,
    UnknownOperation,
};
pub use error::{
    BAD_PATTERN, BridgeError, FsError, SKIP_DIR, UNCATEGORIZED, WALK_ENTRY, walk_error_code,
};
pub use protocol::{Outcome, Request, Response};
pub use sink::{JsonSink, ResponseSink};

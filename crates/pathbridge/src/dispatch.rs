//! Request dispatch loop
//!
//! Operation names map to handlers through a table built once at startup.
//! A handler either produces a single response or streams any number of
//! responses into the sink.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use tracing::{debug, warn};

use crate::error::{BAD_PATTERN, BridgeError, FsError, SKIP_DIR};
use crate::protocol::{Request, Response};
use crate::sink::{JsonSink, ResponseSink};
use crate::{fs, paths, walk};

/// Handler producing exactly one response.
pub type SingleFn = fn(&Request) -> Result<Response, FsError>;

/// Handler pushing its responses into a sink.
pub type StreamFn = fn(&Request, &mut dyn ResponseSink) -> Result<(), BridgeError>;

/// Implementation of one operation.
#[derive(Clone, Copy)]
pub enum Handler {
    /// One request, one response.
    Single(SingleFn),
    /// One request, zero or more responses.
    Stream(StreamFn),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Single(_) => f.write_str("Handler::Single"),
            Handler::Stream(_) => f.write_str("Handler::Stream"),
        }
    }
}

/// Mapping from wire operation name to handler.
#[derive(Debug, Clone)]
pub struct OperationTable {
    handlers: HashMap<&'static str, Handler>,
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl OperationTable {
    /// An empty table.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Every built-in operation.
    pub fn standard() -> Self {
        use Handler::{Single, Stream};

        let mut table = Self::empty();
        table
            .register("getwd", Single(|_| fs::getwd().map(Response::ok)))
            .register(
                "chdir",
                Single(|req| fs::chdir(&req.path).map(|()| Response::empty())),
            )
            .register(
                "separator",
                Single(|_| Ok(Response::ok(paths::SEPARATOR.to_string()))),
            )
            .register(
                "list-separator",
                Single(|_| Ok(Response::ok(paths::LIST_SEPARATOR.to_string()))),
            )
            .register("abs", Single(|req| fs::abs(&req.path).map(Response::ok)))
            .register(
                "eval-symlinks",
                Single(|req| fs::eval_symlinks(&req.path).map(Response::ok)),
            )
            .register("glob", Single(|req| fs::glob(&req.pattern).map(Response::ok)))
            .register(
                "match",
                Single(|req| fs::matches(&req.pattern, &req.path).map(Response::ok)),
            )
            .register(
                "rel",
                Single(|req| paths::rel(&req.path, &req.secondary_path).map(Response::ok)),
            )
            .register("base", Single(|req| Ok(Response::ok(paths::base(&req.path)))))
            .register("clean", Single(|req| Ok(Response::ok(paths::clean(&req.path)))))
            .register("dir", Single(|req| Ok(Response::ok(paths::dir(&req.path)))))
            .register("ext", Single(|req| Ok(Response::ok(paths::ext(&req.path)))))
            .register(
                "to-slash",
                Single(|req| Ok(Response::ok(paths::to_slash(&req.path)))),
            )
            .register("is-abs", Single(|req| Ok(Response::ok(paths::is_abs(&req.path)))))
            .register(
                "join",
                Single(|req| Ok(Response::ok(paths::join(&req.join_parts)))),
            )
            .register(
                "split-list",
                Single(|req| Ok(Response::ok(paths::split_list(&req.path)))),
            )
            .register(
                "from-slash",
                Single(|req| Ok(Response::ok(paths::from_slash(&req.path)))),
            )
            .register(
                "volume-name",
                Single(|req| Ok(Response::ok(paths::volume_name(&req.path)))),
            )
            .register(
                "split",
                Single(|req| {
                    let (dir, file) = paths::split(&req.path);
                    Ok(Response::ok(dir).with_name(file))
                }),
            )
            .register(
                "has-prefix",
                Single(|req| {
                    Ok(Response::ok(paths::has_prefix(
                        &req.path,
                        &req.secondary_path,
                    )))
                }),
            )
            .register("walk", Stream(|req, sink| walk::walk(&req.path, sink)))
            .register("err-bad-pattern", Single(|_| Ok(Response::ok(BAD_PATTERN))))
            .register("skip-dir", Single(|_| Ok(Response::ok(SKIP_DIR))));
        table
    }

    /// Add or replace the handler for `name`.
    pub fn register(&mut self, name: &'static str, handler: Handler) -> &mut Self {
        self.handlers.insert(name, handler);
        self
    }

    /// Handler for `name`, if any.
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).copied()
    }

    /// Registered operation names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// What to do with an operation name that has no handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownOperation {
    /// Stop serving; the caller speaks a different protocol version.
    #[default]
    Fatal,
    /// Answer with an error response and keep serving.
    Reject,
}

/// Dispatcher configuration.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Policy for unrecognized operation names.
    pub unknown_operation: UnknownOperation,
}

/// Counters reported when the input stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeStats {
    /// Requests processed.
    pub requests: u64,
    /// Responses written.
    pub responses: u64,
}

/// Executes requests against an [`OperationTable`].
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    table: OperationTable,
    options: DispatchOptions,
}

impl Dispatcher {
    /// Dispatcher over the standard table.
    pub fn new(options: DispatchOptions) -> Self {
        Self::with_table(OperationTable::standard(), options)
    }

    /// Dispatcher over a custom table.
    pub fn with_table(table: OperationTable, options: DispatchOptions) -> Self {
        Self { table, options }
    }

    /// Run one request, sending its responses to `sink`.
    pub fn handle(
        &self,
        request: &Request,
        sink: &mut dyn ResponseSink,
    ) -> Result<(), BridgeError> {
        debug!(operation = %request.operation, path = %request.path, "dispatching request");

        let Some(handler) = self.table.get(&request.operation) else {
            return match self.options.unknown_operation {
                UnknownOperation::Fatal => {
                    Err(BridgeError::UnknownOperation(request.operation.clone()))
                }
                UnknownOperation::Reject => {
                    warn!(operation = %request.operation, "rejecting unknown operation");
                    let err = FsError::UnknownOperation(request.operation.clone());
                    sink.send(&Response::from_error(&err))
                }
            };
        };

        match handler {
            Handler::Single(f) => {
                let response = Response::from(f(request));
                if let Some(error) = &response.error {
                    debug!(
                        operation = %request.operation,
                        code = response.error_code,
                        error = %error,
                        "request failed"
                    );
                }
                sink.send(&response)
            }
            Handler::Stream(f) => f(request, sink),
        }
    }

    /// Serve concatenated JSON requests from `input` until it ends.
    ///
    /// Returns on orderly end of input. Any decode, encode, or write failure
    /// is returned as an error and stops the loop.
    pub fn serve<R: Read, W: std::io::Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<ServeStats, BridgeError> {
        let mut sink = JsonSink::new(output);
        let mut stats = ServeStats::default();

        let requests = serde_json::Deserializer::from_reader(input).into_iter::<Request>();
        for request in requests {
            let request = request.map_err(BridgeError::Decode)?;
            self.handle(&request, &mut sink)?;
            stats.requests += 1;
        }

        stats.responses = sink.written();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::error::UNCATEGORIZED;
    use crate::protocol::Outcome;

    fn run(request: Request) -> Vec<Response> {
        let mut out: Vec<Response> = Vec::new();
        Dispatcher::default().handle(&request, &mut out).unwrap();
        out
    }

    fn serve(
        input: &str,
        options: DispatchOptions,
    ) -> (Result<ServeStats, BridgeError>, Vec<Value>) {
        let mut output = Vec::new();
        let result = Dispatcher::new(options).serve(input.as_bytes(), &mut output);
        let lines = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (result, lines)
    }

    #[test]
    fn test_standard_table_is_complete() {
        let names = OperationTable::standard().names();
        assert_eq!(
            names,
            vec![
                "abs",
                "base",
                "chdir",
                "clean",
                "dir",
                "err-bad-pattern",
                "eval-symlinks",
                "ext",
                "from-slash",
                "getwd",
                "glob",
                "has-prefix",
                "is-abs",
                "join",
                "list-separator",
                "match",
                "rel",
                "separator",
                "skip-dir",
                "split",
                "split-list",
                "to-slash",
                "volume-name",
                "walk",
            ]
        );
    }

    #[test]
    fn test_sentinel_message_requests() {
        assert_eq!(
            run(Request::new("err-bad-pattern")),
            vec![Response::ok("syntax error in pattern")]
        );
        assert_eq!(
            run(Request::new("skip-dir")),
            vec![Response::ok("skip this directory")]
        );
    }

    #[test]
    fn test_bad_pattern_error_starts_with_sentinel_message() {
        let out = run(Request::new("match").with_pattern("[").with_path("x"));
        let message = out[0].error.as_deref().unwrap();
        let sentinel = run(Request::new("err-bad-pattern"));
        match &sentinel[0].result {
            Some(Outcome::Text(prefix)) => assert!(message.starts_with(prefix.as_str())),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_join_request() {
        let out = run(Request::new("join").with_join_parts(["a", "b", "c"]));
        assert_eq!(out, vec![Response::ok("a/b/c")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_split_request() {
        let out = run(Request::new("split").with_path("/tmp/file.txt"));
        assert_eq!(out, vec![Response::ok("/tmp/").with_name("file.txt")]);
    }

    #[test]
    fn test_abs_dot_is_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let out = run(Request::new("abs").with_path("."));
        assert_eq!(
            out[0].result,
            Some(Outcome::Text(cwd.to_string_lossy().into_owned()))
        );
    }

    #[test]
    fn test_rel_error_is_uncategorized() {
        let abs_path = std::env::current_dir().unwrap().to_string_lossy().into_owned();
        let out = run(Request::new("rel").with_path(abs_path).with_secondary_path("b"));
        assert_eq!(out.len(), 1);
        assert!(out[0].is_error());
        assert_eq!(out[0].error_code, UNCATEGORIZED);
        assert_eq!(out[0].result, None);
    }

    #[test]
    fn test_unknown_operation_is_fatal_by_default() {
        let mut out: Vec<Response> = Vec::new();
        let err = Dispatcher::default()
            .handle(&Request::new("frobnicate"), &mut out)
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownOperation(op) if op == "frobnicate"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_operation_rejected_when_configured() {
        let options = DispatchOptions {
            unknown_operation: UnknownOperation::Reject,
        };
        let mut out: Vec<Response> = Vec::new();
        Dispatcher::new(options)
            .handle(&Request::new("frobnicate"), &mut out)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].error_code, UNCATEGORIZED);
        assert_eq!(
            out[0].error.as_deref(),
            Some("operation not supported: frobnicate")
        );
    }

    #[test]
    fn test_custom_table() {
        let mut table = OperationTable::empty();
        table.register("ping", Handler::Single(|_| Ok(Response::ok("pong"))));
        let dispatcher = Dispatcher::with_table(table, DispatchOptions::default());

        let mut out: Vec<Response> = Vec::new();
        dispatcher.handle(&Request::new("ping"), &mut out).unwrap();
        assert_eq!(out, vec![Response::ok("pong")]);
        assert!(dispatcher.handle(&Request::new("getwd"), &mut out).is_err());
    }

    #[test]
    fn test_serve_answers_each_request_in_order() {
        let input = r#"{"operation":"is-abs","path":"rel"}
{"operation":"base","path":"a/b.txt"}{"operation":"ext","path":"a/b.txt"}"#;
        let (result, lines) = serve(input, DispatchOptions::default());
        assert_eq!(
            result.unwrap(),
            ServeStats {
                requests: 3,
                responses: 3
            }
        );
        assert_eq!(
            lines,
            vec![
                json!({"errorCode": 0, "result": false}),
                json!({"errorCode": 0, "result": "b.txt"}),
                json!({"errorCode": 0, "result": ".txt"}),
            ]
        );
    }

    #[test]
    fn test_serve_empty_input() {
        let (result, lines) = serve("", DispatchOptions::default());
        assert_eq!(result.unwrap(), ServeStats::default());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_serve_stops_on_malformed_request() {
        let input = r#"{"operation":"clean","path":"a//b"} {"operation": "#;
        let (result, lines) = serve(input, DispatchOptions::default());
        assert!(matches!(result, Err(BridgeError::Decode(_))));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_serve_stops_on_unknown_operation() {
        let input = r#"{"operation":"clean","path":"."}{"operation":"nope"}{"operation":"clean","path":"."}"#;
        let (result, lines) = serve(input, DispatchOptions::default());
        assert!(matches!(result, Err(BridgeError::UnknownOperation(_))));
        assert_eq!(lines, vec![json!({"errorCode": 0, "result": "."})]);
    }
}

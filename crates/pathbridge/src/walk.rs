//! Streaming directory walk

use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{BridgeError, walk_error_code};
use crate::paths;
use crate::protocol::Response;
use crate::sink::ResponseSink;

/// Walk the tree rooted at `root`, sending one response per visited entry.
///
/// Entries are visited depth-first in file-name order without following
/// symbolic links. An entry that cannot be read is reported as an error
/// response and the walk moves on. Only a failing sink stops the walk.
pub fn walk(root: &str, sink: &mut dyn ResponseSink) -> Result<(), BridgeError> {
    let entries = WalkDir::new(root).follow_links(false).sort_by_file_name();
    for entry in entries {
        let response = match entry {
            Ok(entry) => Response::ok(entry.path().to_string_lossy().into_owned())
                .with_name(entry.file_name().to_string_lossy()),
            Err(err) => entry_error(root, &err),
        };
        sink.send(&response)
            .map_err(|source| BridgeError::WalkAborted {
                root: root.to_string(),
                source: Box::new(source),
            })?;
    }
    Ok(())
}

fn entry_error(root: &str, err: &walkdir::Error) -> Response {
    let path = err
        .path()
        .map_or_else(|| root.to_string(), |p: &Path| p.to_string_lossy().into_owned());
    debug!(path = %path, error = %err, "walk entry failed");

    let name = paths::base(&path);
    Response {
        error: Some(err.to_string()),
        error_code: walk_error_code(err),
        result: Some(path.into()),
        name: Some(name),
    }
}

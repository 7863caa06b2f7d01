//! Wire records exchanged over stdio

use serde::{Deserialize, Serialize};

use crate::error::FsError;

/// A single request read from the input stream.
///
/// Every field but `operation` is optional on the wire and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Name of the primitive to invoke.
    pub operation: String,
    /// Primary path argument.
    #[serde(default)]
    pub path: String,
    /// Second path argument (`rel` target, `has-prefix` prefix).
    #[serde(default)]
    pub secondary_path: String,
    /// Shell pattern argument.
    #[serde(default)]
    pub pattern: String,
    /// Elements for `join`.
    #[serde(default)]
    pub join_parts: Vec<String>,
}

impl Request {
    /// Build a request with only an operation name.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Default::default()
        }
    }

    /// Set the primary path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the secondary path.
    pub fn with_secondary_path(mut self, path: impl Into<String>) -> Self {
        self.secondary_path = path.into();
        self
    }

    /// Set the pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the join elements.
    pub fn with_join_parts<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.join_parts = parts.into_iter().map(Into::into).collect();
        self
    }
}

/// Value carried in a response's `result` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Predicate result.
    Bool(bool),
    /// Single path or string.
    Text(String),
    /// Ordered list of paths.
    List(Vec<String>),
}

impl From<bool> for Outcome {
    fn from(value: bool) -> Self {
        Outcome::Bool(value)
    }
}

impl From<String> for Outcome {
    fn from(value: String) -> Self {
        Outcome::Text(value)
    }
}

impl From<&str> for Outcome {
    fn from(value: &str) -> Self {
        Outcome::Text(value.to_string())
    }
}

impl From<Vec<String>> for Outcome {
    fn from(value: Vec<String>) -> Self {
        Outcome::List(value)
    }
}

/// A single record written to the output stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Failure message, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Errno or sentinel on failure, zero on success.
    #[serde(default)]
    pub error_code: i32,
    /// Operation result; `null` when the operation has none.
    #[serde(default)]
    pub result: Option<Outcome>,
    /// Base name, for `split` and walk entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Response {
    /// Successful response carrying `result`.
    pub fn ok(result: impl Into<Outcome>) -> Self {
        Self {
            result: Some(result.into()),
            ..Default::default()
        }
    }

    /// Successful response with no result value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Failed response built from a request error.
    pub fn from_error(err: &FsError) -> Self {
        Self {
            error: Some(err.to_string()),
            error_code: err.code(),
            ..Default::default()
        }
    }

    /// Attach a base name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this response reports a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<Result<Response, FsError>> for Response {
    fn from(result: Result<Response, FsError>) -> Self {
        result.unwrap_or_else(|e| Response::from_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: Request = serde_json::from_str(r#"{"operation": "getwd"}"#).unwrap();
        assert_eq!(req, Request::new("getwd"));
    }

    #[test]
    fn test_request_camel_case_fields() {
        let req: Request = serde_json::from_value(json!({
            "operation": "rel",
            "path": "/a",
            "secondaryPath": "/a/b",
            "joinParts": ["x", "y"],
            "ignored": 1,
        }))
        .unwrap();
        assert_eq!(req.secondary_path, "/a/b");
        assert_eq!(req.join_parts, vec!["x", "y"]);
    }

    #[test]
    fn test_request_requires_operation() {
        assert!(serde_json::from_str::<Request>(r#"{"path": "/"}"#).is_err());
    }

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(Response::ok("/tmp")).unwrap();
        assert_eq!(value, json!({"errorCode": 0, "result": "/tmp"}));
    }

    #[test]
    fn test_empty_shape() {
        let value = serde_json::to_value(Response::empty()).unwrap();
        assert_eq!(value, json!({"errorCode": 0, "result": null}));
    }

    #[test]
    fn test_polymorphic_result() {
        let b = serde_json::to_value(Response::ok(true)).unwrap();
        assert_eq!(b["result"], json!(true));

        let list = serde_json::to_value(Response::ok(vec!["a".to_string()])).unwrap();
        assert_eq!(list["result"], json!(["a"]));

        let named = serde_json::to_value(Response::ok("/tmp/").with_name("f")).unwrap();
        assert_eq!(named["name"], json!("f"));
    }

    #[test]
    fn test_error_shape() {
        let err = FsError::Rel {
            base: "a".into(),
            target: "/b".into(),
        };
        let value = serde_json::to_value(Response::from_error(&err)).unwrap();
        assert_eq!(
            value,
            json!({
                "error": "Rel: can't make /b relative to a",
                "errorCode": -111,
                "result": null,
            })
        );
    }
}

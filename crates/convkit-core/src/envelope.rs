//! Request and response envelopes.
//!
//! These are the only shapes that cross the boundary to the outer layer. Both
//! serialize as camelCase JSON.

use crate::options::{OptionValue, Options};
use serde::{Deserialize, Serialize};

/// A single invocation of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    /// Absent is legal only for generator operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options: Options,
}

impl ConversionRequest {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            input: None,
            operation_id: operation_id.into(),
            options: Options::new(),
        }
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }
}

/// Cost and size figures attached to a processed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Input length in characters; zero when input was absent.
    pub input_length: usize,
    /// Output length in characters; zero on failure.
    pub output_length: usize,
    /// Wall-clock time spent in validate + convert.
    pub processing_time_ms: f64,
    pub operation_id: String,
}

/// Uniform success/failure envelope.
///
/// `output` is present iff `success`; `error` is present iff not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ConversionResponse {
    /// Successful conversion.
    pub fn succeeded(output: String, metadata: Metadata) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            metadata: Some(metadata),
        }
    }

    /// Conversion that ran and failed.
    pub fn failed(error: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            metadata: Some(metadata),
        }
    }

    /// Request rejected before anything ran. Carries no metadata.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            metadata: None,
        }
    }

    /// Lookup miss for an operation id.
    pub fn not_found(operation_id: &str) -> Self {
        Self::rejected(format!("Converter '{operation_id}' not found"))
    }

    /// Generic envelope for faults outside the pipeline.
    pub fn internal_error() -> Self {
        Self::rejected("Internal server error")
    }

    /// The error message, if this is a failure.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_json() {
        let req: ConversionRequest = serde_json::from_str(
            r#"{"input": "hello", "operationId": "base64-encode", "options": {"indent": 2}}"#,
        )
        .unwrap();

        assert_eq!(req.input.as_deref(), Some("hello"));
        assert_eq!(req.operation_id, "base64-encode");
        assert_eq!(req.options.get("indent"), Some(&OptionValue::Int(2)));
    }

    #[test]
    fn test_request_without_input() {
        let req: ConversionRequest =
            serde_json::from_str(r#"{"operationId": "uuid-generate"}"#).unwrap();

        assert!(req.input.is_none());
        assert!(req.options.is_empty());
    }

    #[test]
    fn test_success_json_shape() {
        let resp = ConversionResponse::succeeded(
            "AB".into(),
            Metadata {
                input_length: 2,
                output_length: 2,
                processing_time_ms: 0.25,
                operation_id: "upper".into(),
            },
        );

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["output"], "AB");
        assert!(json.get("error").is_none());
        assert_eq!(json["metadata"]["inputLength"], 2);
        assert_eq!(json["metadata"]["outputLength"], 2);
        assert_eq!(json["metadata"]["operationId"], "upper");
        assert_eq!(json["metadata"]["processingTimeMs"], 0.25);
    }

    #[test]
    fn test_rejected_has_no_metadata() {
        let json = serde_json::to_value(ConversionResponse::rejected("Input is required")).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Input is required");
        assert!(json.get("output").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_not_found_message() {
        let resp = ConversionResponse::not_found("nope");
        assert_eq!(resp.error_message(), Some("Converter 'nope' not found"));
        assert!(resp.metadata.is_none());
    }
}

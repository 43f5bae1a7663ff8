//! Request dispatch: lookup, process, and status classification.
//!
//! This is the thin step an outer layer performs per request. Lookup misses
//! short-circuit before [`Operation::process`](crate::Operation::process) is
//! ever invoked.

use crate::envelope::{ConversionRequest, ConversionResponse};
use crate::registry::Registry;
use serde::Serialize;

/// Outcome class of a dispatched request, mirroring HTTP semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// The operation succeeded.
    Ok,
    /// Validation or conversion failed.
    BadRequest,
    /// No operation with the requested ID.
    NotFound,
    /// A fault outside the pipeline.
    Internal,
}

impl Status {
    /// HTTP status code equivalent.
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::Internal => 500,
        }
    }

    /// Status for a processed envelope.
    pub fn of(response: &ConversionResponse) -> Self {
        if response.success {
            Status::Ok
        } else {
            Status::BadRequest
        }
    }
}

/// Look up the requested operation and process the request.
pub fn dispatch(registry: &Registry, request: &ConversionRequest) -> (Status, ConversionResponse) {
    let Some(operation) = registry.get(&request.operation_id) else {
        tracing::debug!(operation = %request.operation_id, "unknown operation");
        return (
            Status::NotFound,
            ConversionResponse::not_found(&request.operation_id),
        );
    };

    let response = operation.process(request);
    (Status::of(&response), response)
}

/// Parse a JSON request body and dispatch it.
///
/// A malformed body is reported as [`Status::BadRequest`] with the parse
/// error; it never reaches the registry.
pub fn dispatch_json(registry: &Registry, body: &str) -> (Status, ConversionResponse) {
    match serde_json::from_str::<ConversionRequest>(body) {
        Ok(request) => dispatch(registry, &request),
        Err(err) => (
            Status::BadRequest,
            ConversionResponse::rejected(format!("Invalid request body: {err}")),
        ),
    }
}

//! The operation contract and the shared request pipeline.
//!
//! An [`Operation`] is data, not a type hierarchy: a [`Descriptor`] plus the
//! two function values that carry the operation-specific logic. Every
//! operation is driven through the same [`Operation::process`] pipeline:
//!
//! ```text
//! Idle -> Validating -> Rejected
//! Idle -> Validating -> Executing -> Succeeded | Failed
//! ```

use crate::descriptor::Descriptor;
use crate::envelope::{ConversionRequest, ConversionResponse, Metadata};
use crate::options::Options;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

/// Message used when input is absent or blank.
pub const INPUT_REQUIRED: &str = "Input is required";

/// Message used when a conversion fails without a usable description.
pub const CONVERSION_FAILED: &str = "Conversion failed";

/// Outcome of validating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn invalid(error: impl Into<String>) -> Self {
        Validation::Invalid(error.into())
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Validation::Valid => None,
            Validation::Invalid(e) => Some(e),
        }
    }
}

/// Errors an operation's conversion logic can report.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing required option: {0}")]
    MissingOption(String),

    #[error("invalid option '{name}': {reason}")]
    InvalidOption { name: String, reason: String },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ConvertError {
    pub fn failed(msg: impl Into<String>) -> Self {
        ConvertError::Failed(msg.into())
    }

    pub fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConvertError::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Operation-specific validation, run after the default input check.
pub type ValidateFn = dyn Fn(Option<&str>, &Options) -> Validation + Send + Sync;

/// Operation-specific conversion logic.
pub type ConvertFn = dyn Fn(Option<&str>, &Options) -> Result<String, ConvertError> + Send + Sync;

/// A registered conversion operation.
#[derive(Clone)]
pub struct Operation {
    descriptor: Descriptor,
    validator: Option<Arc<ValidateFn>>,
    converter: Arc<ConvertFn>,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("descriptor", &self.descriptor)
            .field("custom_validation", &self.validator.is_some())
            .finish()
    }
}

impl Operation {
    /// Create an operation from its descriptor and conversion logic.
    pub fn new<F>(descriptor: Descriptor, convert: F) -> Self
    where
        F: Fn(Option<&str>, &Options) -> Result<String, ConvertError> + Send + Sync + 'static,
    {
        Self {
            descriptor,
            validator: None,
            converter: Arc::new(convert),
        }
    }

    /// Create an operation that only ever sees present input.
    ///
    /// Absent input is treated as the empty string; the default validation
    /// rejects it before conversion for non-generator operations anyway.
    pub fn text<F>(descriptor: Descriptor, convert: F) -> Self
    where
        F: Fn(&str, &Options) -> Result<String, ConvertError> + Send + Sync + 'static,
    {
        Self::new(descriptor, move |input, options| {
            convert(input.unwrap_or_default(), options)
        })
    }

    /// Add shape checks on top of the default validation.
    ///
    /// The extra validator only runs once the default check has passed, so it
    /// may assume input is present and non-blank for non-generator operations.
    pub fn validate_with<F>(mut self, validate: F) -> Self
    where
        F: Fn(Option<&str>, &Options) -> Validation + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validate));
        self
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn category(&self) -> &str {
        &self.descriptor.category
    }

    /// Validate input and options without converting.
    pub fn validate(&self, input: Option<&str>, options: &Options) -> Validation {
        if !self.descriptor.is_generator() && input.is_none_or(|s| s.trim().is_empty()) {
            return Validation::invalid(INPUT_REQUIRED);
        }
        match &self.validator {
            Some(validate) => validate(input, options),
            None => Validation::Valid,
        }
    }

    /// Run the conversion logic directly, bypassing validation.
    pub fn convert(&self, input: Option<&str>, options: &Options) -> Result<String, ConvertError> {
        (self.converter)(input, options)
    }

    /// Validate, convert, time, and wrap the outcome in an envelope.
    ///
    /// Never panics and never returns an error: every outcome is a
    /// [`ConversionResponse`]. A validation failure carries no metadata; a
    /// conversion failure does.
    pub fn process(&self, request: &ConversionRequest) -> ConversionResponse {
        let started = Instant::now();
        let id = self.id();
        let input = request.input.as_deref();

        let _span = tracing::debug_span!("process", operation = %id).entered();

        if request.operation_id != id {
            tracing::debug!(requested = %request.operation_id, "request addressed to a different id");
        }

        if let Validation::Invalid(error) = self.validate(input, &request.options) {
            tracing::debug!(%error, "rejected");
            return ConversionResponse::rejected(error);
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| self.convert(input, &request.options)));
        let input_length = input.map_or(0, |s| s.chars().count());

        let mut metadata = Metadata {
            input_length,
            output_length: 0,
            processing_time_ms: 0.0,
            operation_id: id.to_string(),
        };

        match outcome {
            Ok(Ok(output)) => {
                metadata.output_length = output.chars().count();
                metadata.processing_time_ms = elapsed_ms(started);
                tracing::debug!(
                    input_length,
                    output_length = metadata.output_length,
                    "converted"
                );
                ConversionResponse::succeeded(output, metadata)
            }
            Ok(Err(err)) => {
                metadata.processing_time_ms = elapsed_ms(started);
                let message = err.to_string();
                tracing::debug!(error = %message, "conversion failed");
                let message = if message.is_empty() {
                    CONVERSION_FAILED.to_string()
                } else {
                    message
                };
                ConversionResponse::failed(message, metadata)
            }
            Err(panic) => {
                metadata.processing_time_ms = elapsed_ms(started);
                tracing::warn!(panic = panic_message(panic.as_ref()), "operation panicked");
                ConversionResponse::failed(CONVERSION_FAILED, metadata)
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}

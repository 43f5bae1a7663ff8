//! convkit: one contract for many small conversions.
//!
//! Operations (encoders, hashes, formatters, generators) are described by a
//! [`Descriptor`], carry their logic as function values, and are indexed by a
//! [`Registry`]. Every invocation goes through [`Operation::process`], which
//! validates, converts, times, and wraps the outcome in a
//! [`ConversionResponse`].

pub mod catalog;
mod descriptor;
pub mod dispatch;
mod envelope;
mod operation;
mod options;
mod registry;

pub use descriptor::{Choice, Descriptor, FieldKind, FieldSpec, InputKind, OutputKind};
pub use dispatch::{Status, dispatch};
pub use envelope::{ConversionRequest, ConversionResponse, Metadata};
pub use operation::{
    CONVERSION_FAILED, ConvertError, ConvertFn, INPUT_REQUIRED, Operation, ValidateFn, Validation,
};
pub use options::{OptionValue, Options, OptionsExt};
pub use registry::{Registry, RegistryStats};

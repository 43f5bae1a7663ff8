//! Built-in conversion operations for convkit.
//!
//! Operations are grouped by category; each group sits behind a cargo
//! feature so embedders can trim the dependency tree.
//!
//! # Features
//!
//! - `text` - Base64, URL and HTML encoding, case changes, unicode escapes
//! - `crypto` - MD5, SHA-1, SHA-256, SHA-512 digests and HMAC-SHA256
//! - `numbers` - decimal, binary and hexadecimal conversion
//! - `colors` - hex and `rgb()` color literals
//! - `time` - Unix timestamps and calendar dates
//! - `data` - JSON, YAML, CSV and XML
//! - `markup` - CSS minify/format and SQL formatting
//! - `regex` - regular expression tester
//! - `generators` - UUID, password, lorem ipsum and QR code links
//! - `all` (default) - every group

use convkit_core::Registry;

#[cfg(feature = "colors")]
mod colors;
#[cfg(feature = "crypto")]
mod crypto;
#[cfg(feature = "data")]
mod data;
#[cfg(feature = "generators")]
mod generators;
#[cfg(feature = "markup")]
mod markup;
#[cfg(feature = "numbers")]
mod numbers;
#[cfg(feature = "regex")]
mod regex_test;
#[cfg(feature = "text")]
mod text;
#[cfg(feature = "time")]
mod time;

/// Register every enabled operation group, in catalogue order.
pub fn register_all(registry: &mut Registry) {
    #[cfg(feature = "text")]
    text::register(registry);
    #[cfg(feature = "crypto")]
    crypto::register(registry);
    #[cfg(feature = "numbers")]
    numbers::register(registry);
    #[cfg(feature = "colors")]
    colors::register(registry);
    #[cfg(feature = "time")]
    time::register(registry);
    #[cfg(feature = "data")]
    data::register(registry);
    #[cfg(feature = "markup")]
    markup::register(registry);
    #[cfg(feature = "regex")]
    regex_test::register(registry);
    #[cfg(feature = "generators")]
    generators::register(registry);

    tracing::debug!(operations = registry.len(), "registered built-in operations");
}

/// A registry holding every enabled built-in operation.
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    register_all(&mut registry);
    registry
}

/// Names of the operation groups compiled into this build.
pub fn enabled_groups() -> Vec<&'static str> {
    [
        #[cfg(feature = "text")]
        "text",
        #[cfg(feature = "crypto")]
        "crypto",
        #[cfg(feature = "numbers")]
        "numbers",
        #[cfg(feature = "colors")]
        "colors",
        #[cfg(feature = "time")]
        "time",
        #[cfg(feature = "data")]
        "data",
        #[cfg(feature = "markup")]
        "markup",
        #[cfg(feature = "regex")]
        "regex",
        #[cfg(feature = "generators")]
        "generators",
    ]
    .into_iter()
    .collect()
}

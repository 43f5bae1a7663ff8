//! Operation descriptors: identity, taxonomy and declared input/output shape.

use crate::options::OptionValue;
use serde::{Deserialize, Serialize};

/// What an operation expects as input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    /// A single line or short block of text.
    #[default]
    PlainText,
    /// No input at all; the operation generates its output from options.
    Generator,
    /// Text plus a form of configuration fields.
    Options,
    /// An uploaded file, delivered as text.
    File,
    /// A larger multi-line block of text.
    Multiline,
    /// A JSON document.
    Json,
    /// A color literal.
    Color,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::PlainText => "plain-text",
            InputKind::Generator => "generator",
            InputKind::Options => "options",
            InputKind::File => "file",
            InputKind::Multiline => "multiline",
            InputKind::Json => "json",
            InputKind::Color => "color",
        }
    }
}

/// What an operation produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputKind {
    #[default]
    Text,
    /// Structured text such as JSON or CSV.
    Structured,
    /// A reference (URL) to an image rather than the image itself.
    ImageReference,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Text => "text",
            OutputKind::Structured => "structured",
            OutputKind::ImageReference => "image-reference",
        }
    }
}

/// One entry of a select field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// The widget shape of a configurable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Textarea,
    /// Bounded integer, rendered as a slider.
    Range { min: i64, max: i64 },
    Checkbox,
    Select { choices: Vec<Choice> },
}

/// Declaration of one configurable option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<OptionValue>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            default: None,
            required: false,
            description: String::new(),
            placeholder: None,
        }
    }

    /// Free-text field.
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    /// Bounded integer field with a default.
    pub fn range(
        name: impl Into<String>,
        label: impl Into<String>,
        bounds: std::ops::RangeInclusive<i64>,
        default: i64,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Range {
                min: *bounds.start(),
                max: *bounds.end(),
            },
        )
        .default_value(default)
    }

    /// Boolean field with a default.
    pub fn checkbox(name: impl Into<String>, label: impl Into<String>, default: bool) -> Self {
        Self::new(name, label, FieldKind::Checkbox).default_value(default)
    }

    /// Choice among fixed values.
    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        choices: impl IntoIterator<Item = Choice>,
    ) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Select {
                choices: choices.into_iter().collect(),
            },
        )
    }

    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Inclusive bounds for range fields.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self.kind {
            FieldKind::Range { min, max } => Some((min, max)),
            _ => None,
        }
    }
}

/// Static description of an operation.
///
/// Describes identity, taxonomy and input/output shape, without containing
/// the conversion logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Unique, stable identifier. Used as the lookup key and in URLs.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Category key, e.g. `text-encoding`.
    pub category: String,
    /// Search keywords.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub input_kind: InputKind,
    #[serde(default)]
    pub output_kind: OutputKind,
    /// Configurable options, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Descriptor {
    /// Create a plain-text → text descriptor.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            tags: Vec::new(),
            featured: false,
            input_kind: InputKind::default(),
            output_kind: OutputKind::default(),
            fields: Vec::new(),
            input_label: None,
            output_label: None,
            placeholder: None,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn input_kind(mut self, kind: InputKind) -> Self {
        self.input_kind = kind;
        self
    }

    pub fn output_kind(mut self, kind: OutputKind) -> Self {
        self.output_kind = kind;
        self
    }

    /// Add a configurable field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn input_label(mut self, label: impl Into<String>) -> Self {
        self.input_label = Some(label.into());
        self
    }

    pub fn output_label(mut self, label: impl Into<String>) -> Self {
        self.output_label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Whether this operation runs without caller-supplied input.
    pub fn is_generator(&self) -> bool {
        self.input_kind == InputKind::Generator
    }

    /// Look up a field by name.
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that must be present in the options bag.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Case-insensitive match against name, description or any tag.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

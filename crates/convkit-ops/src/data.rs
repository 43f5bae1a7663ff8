//! Data Formats: JSON, YAML, CSV and XML reshaping.
//!
//! JSON object key order is preserved throughout (`serde_json` is built with
//! `preserve_order`), so formatting a document never reorders it unless
//! `sortKeys` is requested.

use convkit_core::{
    Choice, ConvertError, Descriptor, FieldSpec, InputKind, Operation, Options, OptionsExt,
    OutputKind, Registry, Validation,
};
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

const CATEGORY: &str = "data-formats";

const INVALID_JSON: &str = "Invalid JSON format";

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        Operation::text(
            Descriptor::new("json-format", "JSON Formatter", CATEGORY)
                .description("Format and validate JSON")
                .tags(["json", "format", "validate"])
                .featured()
                .input_kind(InputKind::Json)
                .output_kind(OutputKind::Structured)
                .field(
                    FieldSpec::range("indent", "Indent", 1..=8, 2)
                        .description("Spaces per indentation level"),
                )
                .field(FieldSpec::checkbox("sortKeys", "Sort Keys", false)),
            |input, opts| {
                let mut value = parse_json(input)?;
                if opts.bool_or("sortKeys", false) {
                    value = sort_keys(value);
                }
                to_pretty_json(&value, opts.int_in("indent", 2, 1..=8) as usize)
            },
        )
        .validate_with(|input, _| validate_json(input)),
    );

    registry.register(
        Operation::text(
            Descriptor::new("json-minify", "JSON Minifier", CATEGORY)
                .description("Minify JSON by removing whitespace")
                .tags(["json", "minify", "compress"])
                .input_kind(InputKind::Json)
                .output_kind(OutputKind::Structured),
            |input, _| {
                let value = parse_json(input)?;
                serde_json::to_string(&value).map_err(|e| ConvertError::Other(e.into()))
            },
        )
        .validate_with(|input, _| validate_json(input)),
    );

    registry.register(
        Operation::text(
            Descriptor::new("yaml-to-json", "YAML to JSON", CATEGORY)
                .description("Convert YAML to JSON format")
                .tags(["yaml", "json", "convert"])
                .input_kind(InputKind::Multiline)
                .output_kind(OutputKind::Structured)
                .field(
                    FieldSpec::range("indent", "Indent", 1..=8, 2)
                        .description("Spaces per JSON indentation level"),
                ),
            |input, opts| {
                let value: Value = serde_yaml::from_str(input)
                    .map_err(|e| ConvertError::failed(format!("Invalid YAML input: {e}")))?;
                to_pretty_json(&value, opts.int_in("indent", 2, 1..=8) as usize)
            },
        )
        .validate_with(|input, _| {
            match serde_yaml::from_str::<serde_yaml::Value>(input.unwrap_or_default()) {
                Ok(_) => Validation::Valid,
                Err(_) => Validation::invalid("Invalid YAML format"),
            }
        }),
    );

    registry.register(
        Operation::text(
            Descriptor::new("json-to-yaml", "JSON to YAML", CATEGORY)
                .description("Convert JSON to YAML format")
                .tags(["json", "yaml", "convert"])
                .input_kind(InputKind::Json)
                .field(
                    FieldSpec::range("indent", "Indent", 1..=8, 2)
                        .description("Spaces per YAML indentation level"),
                ),
            |input, opts| {
                let value = parse_json(input)?;
                let yaml = to_yaml(&value, opts.int_in("indent", 2, 1..=8) as usize)?;
                Ok(yaml.trim_end().to_string())
            },
        )
        .validate_with(|input, _| validate_json(input)),
    );

    registry.register(Operation::text(
        Descriptor::new("csv-to-json", "CSV to JSON", CATEGORY)
            .description("Convert CSV data to JSON format")
            .tags(["csv", "json", "convert"])
            .input_kind(InputKind::Multiline)
            .output_kind(OutputKind::Structured)
            .placeholder("name,age,city\nJohn,30,New York\nJane,25,Los Angeles")
            .field(delimiter_field())
            .field(FieldSpec::checkbox("hasHeader", "First Row is Header", true)),
        |input, opts| csv_to_json(input, delimiter(opts)?, opts.bool_or("hasHeader", true)),
    ));

    registry.register(
        Operation::text(
            Descriptor::new("json-to-csv", "JSON to CSV", CATEGORY)
                .description("Convert JSON array to CSV format")
                .tags(["json", "csv", "convert"])
                .input_kind(InputKind::Multiline)
                .placeholder(r#"[{"name":"John","age":30},{"name":"Jane","age":25}]"#)
                .field(delimiter_field()),
            |input, opts| json_to_csv(input, delimiter(opts)?),
        )
        .validate_with(|input, _| {
            match serde_json::from_str::<Value>(input.unwrap_or_default()) {
                Ok(Value::Array(_)) => Validation::Valid,
                Ok(_) => Validation::invalid("Input must be a JSON array"),
                Err(_) => Validation::invalid(INVALID_JSON),
            }
        }),
    );

    registry.register(Operation::text(
        Descriptor::new("xml-format", "XML Formatter", CATEGORY)
            .description("Format and validate XML")
            .tags(["xml", "format", "validate"])
            .input_kind(InputKind::Multiline)
            .output_kind(OutputKind::Structured)
            .field(
                FieldSpec::text("indent", "Indent")
                    .default_value("  ")
                    .description("Indentation string"),
            ),
        |input, opts| Ok(format_xml(input, opts.str_or("indent", "  "))),
    ));
}

// ============================================
// JSON
// ============================================

fn validate_json(input: Option<&str>) -> Validation {
    match serde_json::from_str::<Value>(input.unwrap_or_default()) {
        Ok(_) => Validation::Valid,
        Err(_) => Validation::invalid(INVALID_JSON),
    }
}

fn parse_json(input: &str) -> Result<Value, ConvertError> {
    serde_json::from_str(input)
        .map_err(|e| ConvertError::failed(format!("Invalid JSON input: {e}")))
}

fn to_pretty_json(value: &Value, indent: usize) -> Result<String, ConvertError> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ConvertError::Other(e.into()))?;
    String::from_utf8(buf).map_err(|e| ConvertError::Other(e.into()))
}

// ============================================
// YAML
// ============================================

/// Block-style YAML with a configurable indentation step.
///
/// Scalars are quoted by `serde_yaml`; collections are laid out here because
/// its emitter has a fixed indent.
fn to_yaml(value: &Value, step: usize) -> Result<String, ConvertError> {
    let mut out = String::new();
    if is_block(value) {
        write_block(value, 0, step, false, &mut out)?;
    } else {
        out.push_str(&yaml_scalar(value)?);
        out.push('\n');
    }
    Ok(out)
}

/// Non-empty mappings and sequences get block layout; everything else is a
/// single flow token.
fn is_block(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

/// Writes a block collection whose lines start at `col`. With `inline` the
/// caller has already written the first line's prefix (a `- ` marker).
fn write_block(
    value: &Value,
    col: usize,
    step: usize,
    inline: bool,
    out: &mut String,
) -> Result<(), ConvertError> {
    match value {
        Value::Object(map) => {
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 || !inline {
                    out.push_str(&" ".repeat(col));
                }
                out.push_str(&yaml_scalar(&Value::String(key.clone()))?);
                out.push(':');
                if is_block(item) {
                    out.push('\n');
                    write_block(item, col + step, step, false, out)?;
                } else {
                    out.push(' ');
                    out.push_str(&yaml_scalar(item)?);
                    out.push('\n');
                }
            }
        }
        Value::Array(items) => {
            // "-" plus padding must be at least two columns wide
            let pad = step.max(2);
            for (i, item) in items.iter().enumerate() {
                if i > 0 || !inline {
                    out.push_str(&" ".repeat(col));
                }
                out.push('-');
                if is_block(item) {
                    out.push_str(&" ".repeat(pad - 1));
                    write_block(item, col + pad, step, true, out)?;
                } else {
                    out.push(' ');
                    out.push_str(&yaml_scalar(item)?);
                    out.push('\n');
                }
            }
        }
        scalar => {
            out.push_str(&" ".repeat(col));
            out.push_str(&yaml_scalar(scalar)?);
            out.push('\n');
        }
    }
    Ok(())
}

/// One scalar (or empty collection) on a single line.
///
/// Values `serde_yaml` would spread over several lines are written as
/// double-quoted JSON strings, which YAML accepts verbatim.
fn yaml_scalar(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::Object(_) => return Ok("{}".to_string()),
        Value::Array(_) => return Ok("[]".to_string()),
        _ => {}
    }
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| ConvertError::failed(format!("YAML serialization failed: {e}")))?;
    let yaml = yaml.trim_end();
    if yaml.contains('\n') {
        serde_json::to_string(value).map_err(|e| ConvertError::Other(e.into()))
    } else {
        Ok(yaml.to_string())
    }
}

/// Recursively order object keys; arrays keep their element order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

// ============================================
// CSV
// ============================================

fn delimiter_field() -> FieldSpec {
    FieldSpec::select(
        "delimiter",
        "Delimiter",
        [
            Choice::new("Comma (,)", ","),
            Choice::new("Semicolon (;)", ";"),
            Choice::new("Tab", "\t"),
            Choice::new("Pipe (|)", "|"),
        ],
    )
    .default_value(",")
}

fn delimiter(opts: &Options) -> Result<u8, ConvertError> {
    match opts.str_or("delimiter", ",").as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(ConvertError::invalid_option(
            "delimiter",
            "must be a single ASCII character",
        )),
    }
}

/// Rows become objects keyed by header (or `column1`, `column2`, ...).
/// Missing trailing values become empty strings; extra values are dropped.
fn csv_to_json(input: &str, delimiter: u8, has_header: bool) -> Result<String, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.trim().as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(|e| ConvertError::failed(format!("Invalid CSV: {e}")))?);
    }

    let Some(first) = records.first() else {
        return Ok("[]".to_string());
    };
    let (headers, rows): (Vec<String>, _) = if has_header {
        (first.iter().map(str::to_string).collect(), &records[1..])
    } else {
        ((1..=first.len()).map(|i| format!("column{i}")).collect(), &records[..])
    };

    let objects: Vec<Value> = rows
        .iter()
        .map(|record| {
            let object = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = record.get(i).unwrap_or_default();
                    (header.clone(), Value::String(value.to_string()))
                })
                .collect();
            Value::Object(object)
        })
        .collect();

    to_pretty_json(&Value::Array(objects), 2)
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Header row is the union of object keys in first-seen order.
fn json_to_csv(input: &str, delimiter: u8) -> Result<String, ConvertError> {
    let Value::Array(items) = parse_json(input)? else {
        return Err(ConvertError::failed("Input must be a JSON array"));
    };

    let headers: IndexSet<&str> = items
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|object| object.keys().map(String::as_str))
        .collect();
    if headers.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let csv_error = |e: csv::Error| ConvertError::failed(format!("CSV write failed: {e}"));
    writer.write_record(&headers).map_err(csv_error)?;
    for item in &items {
        let row = headers.iter().map(|key| csv_cell(item.get(*key)));
        writer.write_record(row).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConvertError::failed(format!("CSV write failed: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}

// ============================================
// XML
// ============================================

/// Splits into tags and text runs and re-indents by nesting depth.
/// Declarations, comments and self-closing tags do not open a level.
fn format_xml(input: &str, indent: &str) -> String {
    let mut lines = Vec::new();
    let mut depth = 0usize;
    let mut rest = input;

    while !rest.is_empty() {
        let (token, tail) = match rest.strip_prefix('<').and_then(|r| r.find('>')) {
            Some(end) => rest.split_at(end + 2),
            None => rest.split_at(rest.find('<').filter(|&i| i > 0).unwrap_or(rest.len())),
        };
        rest = tail;

        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if token.starts_with("</") {
            depth = depth.saturating_sub(1);
            lines.push(indent.repeat(depth) + token);
        } else if token.starts_with('<') && !is_leaf_tag(token) {
            lines.push(indent.repeat(depth) + token);
            depth += 1;
        } else {
            lines.push(indent.repeat(depth) + token);
        }
    }

    lines.join("\n")
}

fn is_leaf_tag(tag: &str) -> bool {
    tag.ends_with("/>") || tag.starts_with("<?") || tag.starts_with("<!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use convkit_core::{ConversionRequest, ConversionResponse, OptionValue};

    fn run(id: &str, input: &str, options: &[(&str, OptionValue)]) -> ConversionResponse {
        let mut registry = Registry::new();
        register(&mut registry);
        let mut request = ConversionRequest::new(id).input(input);
        for (key, value) in options {
            request = request.option(*key, value.clone());
        }
        registry.get(id).unwrap().process(&request)
    }

    fn output(id: &str, input: &str) -> String {
        let resp = run(id, input, &[]);
        assert!(resp.success, "{id} failed: {:?}", resp.error);
        resp.output.unwrap()
    }

    #[test]
    fn test_json_format_preserves_key_order() {
        assert_eq!(
            output("json-format", r#"{"b":1,"a":[1,2]}"#),
            "{\n  \"b\": 1,\n  \"a\": [\n    1,\n    2\n  ]\n}"
        );
    }

    #[test]
    fn test_json_format_options() {
        let resp = run(
            "json-format",
            r#"{"b":{"d":1,"c":2},"a":0}"#,
            &[("sortKeys", true.into()), ("indent", 4.into())],
        );
        assert_eq!(
            resp.output.unwrap(),
            "{\n    \"a\": 0,\n    \"b\": {\n        \"c\": 2,\n        \"d\": 1\n    }\n}"
        );
    }

    #[test]
    fn test_json_format_clamps_indent() {
        let resp = run("json-format", r#"{"a":1}"#, &[("indent", 0.into())]);
        assert_eq!(resp.output.unwrap(), "{\n \"a\": 1\n}");
    }

    #[test]
    fn test_json_validation() {
        for id in ["json-format", "json-minify", "json-to-yaml"] {
            let resp = run(id, "{not json", &[]);
            assert_eq!(resp.error.as_deref(), Some(INVALID_JSON), "{id}");
            assert!(resp.metadata.is_none());
        }
    }

    #[test]
    fn test_json_minify() {
        assert_eq!(output("json-minify", "{ \"a\" : [ 1 , 2 ] }"), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_yaml_json_round_trip() {
        let json = output("yaml-to-json", "name: demo\ntags:\n  - a\n  - b\n");
        assert_eq!(
            json,
            "{\n  \"name\": \"demo\",\n  \"tags\": [\n    \"a\",\n    \"b\"\n  ]\n}"
        );
        assert_eq!(output("json-to-yaml", &json), "name: demo\ntags:\n  - a\n  - b");
    }

    #[test]
    fn test_yaml_indent_option() {
        let resp = run("yaml-to-json", "a:\n  b: 1\n", &[("indent", 4.into())]);
        assert_eq!(resp.output.unwrap(), "{\n    \"a\": {\n        \"b\": 1\n    }\n}");

        let resp = run(
            "json-to-yaml",
            r#"{"a":{"b":[1,{"c":"x","d":true}]},"e":[]}"#,
            &[("indent", 4.into())],
        );
        assert_eq!(
            resp.output.unwrap(),
            "a:\n    b:\n        - 1\n        -   c: x\n            d: true\ne: []"
        );
    }

    #[test]
    fn test_json_to_yaml_output_parses_back() {
        let json = r#"{"text":"line one\nline two","n":null,"quoted":"a: b","nested":[[1,2],{}]}"#;
        for indent in [1, 2, 3, 8] {
            let resp = run("json-to-yaml", json, &[("indent", indent.into())]);
            let yaml = resp.output.unwrap();
            let back: Value = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(back, serde_json::from_str::<Value>(json).unwrap(), "indent {indent}");
        }
    }

    #[test]
    fn test_yaml_validation() {
        let resp = run("yaml-to-json", "key: [unclosed", &[]);
        assert_eq!(resp.error.as_deref(), Some("Invalid YAML format"));
    }

    #[test]
    fn test_csv_to_json_with_header() {
        let json = output("csv-to-json", "name, age\nJohn, 30\nJane");
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"name": "John", "age": "30"},
                {"name": "Jane", "age": ""},
            ])
        );
    }

    #[test]
    fn test_csv_to_json_without_header_and_delimiter() {
        let resp = run(
            "csv-to-json",
            "a;b\nc;d",
            &[("hasHeader", false.into()), ("delimiter", ";".into())],
        );
        let value: Value = serde_json::from_str(&resp.output.unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"column1": "a", "column2": "b"},
                {"column1": "c", "column2": "d"},
            ])
        );
    }

    #[test]
    fn test_csv_bad_delimiter_fails_conversion() {
        let resp = run("csv-to-json", "a,b", &[("delimiter", "::".into())]);
        assert!(!resp.success);
        assert!(resp.metadata.is_some());
    }

    #[test]
    fn test_json_to_csv() {
        let csv = output(
            "json-to-csv",
            r#"[{"name":"John","age":30},{"name":"Smith, Jane","city":"LA"}]"#,
        );
        assert_eq!(csv, "name,age,city\nJohn,30,\n\"Smith, Jane\",,LA");
    }

    #[test]
    fn test_json_to_csv_validation() {
        assert_eq!(
            run("json-to-csv", r#"{"a":1}"#, &[]).error.as_deref(),
            Some("Input must be a JSON array")
        );
        assert_eq!(
            run("json-to-csv", "[1,", &[]).error.as_deref(),
            Some(INVALID_JSON)
        );
        assert_eq!(output("json-to-csv", "[]"), "");
    }

    #[test]
    fn test_xml_format() {
        assert_eq!(
            output("xml-format", "<?xml version=\"1.0\"?><a><b>text</b><c/></a>"),
            "<?xml version=\"1.0\"?>\n<a>\n  <b>\n    text\n  </b>\n  <c/>\n</a>"
        );
    }

    #[test]
    fn test_xml_format_custom_indent() {
        let resp = run("xml-format", "<a><b/></a>", &[("indent", "\t".into())]);
        assert_eq!(resp.output.unwrap(), "<a>\n\t<b/>\n</a>");
    }
}

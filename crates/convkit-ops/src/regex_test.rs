//! Regex tester: runs a pattern over the input and reports matches.
//!
//! Flags follow the familiar single-letter convention: `g` (all matches),
//! `i`, `m`, `s`, `u` (always on) and `y` (sticky, matches must be
//! contiguous from the start).

use convkit_core::{
    ConvertError, Descriptor, FieldSpec, InputKind, Operation, Options, OptionsExt, Registry,
    Validation,
};
use regex::{Regex, RegexBuilder};

const CATEGORY: &str = "regex-tools";

const PATTERN_REQUIRED: &str = "Regular expression pattern is required";

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        Operation::text(
            Descriptor::new("regex-test", "RegEx Tester", CATEGORY)
                .description("Test regular expressions against text")
                .tags(["regex", "test", "pattern"])
                .input_kind(InputKind::Options)
                .input_label("Text to Test")
                .output_label("Test Results")
                .field(
                    FieldSpec::text("pattern", "Regular Expression")
                        .required()
                        .placeholder("^[a-zA-Z0-9]+$")
                        .description("Enter your regex pattern"),
                )
                .field(
                    FieldSpec::text("flags", "Flags")
                        .default_value("g")
                        .placeholder("gi")
                        .description("Regex flags (g, i, m, s, u, y)"),
                )
                .field(
                    FieldSpec::checkbox("showMatches", "Show Matches", true)
                        .description("Highlight and list all matches"),
                ),
            test_regex,
        )
        .validate_with(|_, opts| {
            if opts.str_or("pattern", "").is_empty() {
                Validation::invalid(PATTERN_REQUIRED)
            } else {
                Validation::Valid
            }
        }),
    );
}

#[derive(Debug, Default)]
struct Flags {
    global: bool,
    sticky: bool,
}

fn build_regex(pattern: &str, flags: &str) -> Result<(Regex, Flags), String> {
    let mut builder = RegexBuilder::new(pattern);
    let mut parsed = Flags::default();
    for flag in flags.chars() {
        match flag {
            'g' => parsed.global = true,
            'y' => parsed.sticky = true,
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'u' => {}
            other => return Err(format!("unsupported flag '{other}'")),
        }
    }
    let regex = builder.build().map_err(|e| e.to_string())?;
    Ok((regex, parsed))
}

struct Found<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    groups: Vec<Option<&'a str>>,
}

fn find_matches<'a>(regex: &Regex, flags: &Flags, input: &'a str) -> Vec<Found<'a>> {
    let mut found = Vec::new();
    let mut expected_start = 0;
    for caps in regex.captures_iter(input) {
        let Some(whole) = caps.get(0) else { continue };
        if flags.sticky && whole.start() != expected_start {
            break;
        }
        expected_start = whole.end();
        found.push(Found {
            text: whole.as_str(),
            start: whole.start(),
            end: whole.end(),
            groups: caps.iter().skip(1).map(|g| g.map(|m| m.as_str())).collect(),
        });
        if !flags.global {
            break;
        }
    }
    found
}

fn test_regex(input: &str, opts: &Options) -> Result<String, ConvertError> {
    let pattern = opts.str_or("pattern", "");
    if pattern.is_empty() {
        return Err(ConvertError::MissingOption("pattern".into()));
    }
    let flags = opts.str_or("flags", "g");
    let show_matches = opts.bool_or("showMatches", true);

    let (regex, parsed) = build_regex(pattern, flags)
        .map_err(|e| ConvertError::failed(format!("Invalid regular expression: {e}")))?;
    let matches = find_matches(&regex, &parsed, input);

    let mut report = format!(
        "Pattern: {pattern}\nFlags: {flags}\nTest String Length: {}\n\n",
        input.chars().count()
    );

    if matches.is_empty() {
        report.push_str("❌ No matches found\n");
        return Ok(report);
    }

    report.push_str(&format!("✅ Found {} match(es)\n\n", matches.len()));
    if !show_matches {
        return Ok(report);
    }

    report.push_str("Matches:\n");
    for (i, m) in matches.iter().enumerate() {
        let position = input[..m.start].chars().count();
        report.push_str(&format!("{}. \"{}\" at position {position}\n", i + 1, m.text));
        if !m.groups.is_empty() {
            let groups: Vec<String> = m
                .groups
                .iter()
                .enumerate()
                .map(|(n, g)| format!("${}=\"{}\"", n + 1, g.unwrap_or_default()))
                .collect();
            report.push_str(&format!("   Groups: {}\n", groups.join(", ")));
        }
    }

    report.push_str("\nText with highlights:\n");
    let mut last = 0;
    for m in &matches {
        report.push_str(&input[last..m.start]);
        report.push_str(&format!("[MATCH: {}]", m.text));
        last = m.end;
    }
    report.push_str(&input[last..]);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use convkit_core::{ConversionRequest, ConversionResponse};

    fn run(input: &str, pattern: Option<&str>, flags: Option<&str>) -> ConversionResponse {
        let mut registry = Registry::new();
        register(&mut registry);
        let mut request = ConversionRequest::new("regex-test").input(input);
        if let Some(pattern) = pattern {
            request = request.option("pattern", pattern);
        }
        if let Some(flags) = flags {
            request = request.option("flags", flags);
        }
        registry.get("regex-test").unwrap().process(&request)
    }

    #[test]
    fn test_global_matches_with_groups() {
        let resp = run("a1 b2 c3", Some(r"([a-z])(\d)"), None);
        let output = resp.output.unwrap();

        assert!(output.starts_with("Pattern: ([a-z])(\\d)\nFlags: g\nTest String Length: 8\n\n"));
        assert!(output.contains("✅ Found 3 match(es)"));
        assert!(output.contains("2. \"b2\" at position 3\n   Groups: $1=\"b\", $2=\"2\""));
        assert!(output.ends_with("Text with highlights:\n[MATCH: a1] [MATCH: b2] [MATCH: c3]"));
    }

    #[test]
    fn test_full_report_layout() {
        let output = run("x1 y", Some(r"(\d)"), None).output.unwrap();
        assert_eq!(
            output,
            "Pattern: (\\d)\nFlags: g\nTest String Length: 4\n\n\
             ✅ Found 1 match(es)\n\n\
             Matches:\n\
             1. \"1\" at position 1\n   Groups: $1=\"1\"\n\
             \nText with highlights:\nx[MATCH: 1] y"
        );
    }

    #[test]
    fn test_without_global_flag_reports_first_match() {
        let output = run("aaa", Some("a"), Some("i")).output.unwrap();
        assert!(output.contains("Found 1 match(es)"));
    }

    #[test]
    fn test_case_insensitive_flag() {
        let output = run("Hello", Some("hello"), Some("gi")).output.unwrap();
        assert!(output.contains("Found 1 match(es)"));
    }

    #[test]
    fn test_sticky_flag_stops_at_gap() {
        let output = run("aab a", Some("a"), Some("gy")).output.unwrap();
        assert!(output.contains("Found 2 match(es)"));
    }

    #[test]
    fn test_no_matches() {
        let output = run("abc", Some(r"\d"), None).output.unwrap();
        assert!(output.ends_with("❌ No matches found\n"));
    }

    #[test]
    fn test_positions_count_chars() {
        let output = run("éx", Some("x"), None).output.unwrap();
        assert!(output.contains("1. \"x\" at position 1"));
    }

    #[test]
    fn test_missing_pattern_rejected() {
        let resp = run("text", None, None);
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some(PATTERN_REQUIRED));
        assert!(resp.metadata.is_none());
    }

    #[test]
    fn test_invalid_pattern_fails_conversion() {
        let resp = run("text", Some("(unclosed"), None);
        assert!(!resp.success);
        assert!(resp.error.unwrap().starts_with("Invalid regular expression: "));
        assert!(resp.metadata.is_some());
    }

    #[test]
    fn test_unknown_flag_fails_conversion() {
        let resp = run("text", Some("t"), Some("gx"));
        assert_eq!(
            resp.error.as_deref(),
            Some("Invalid regular expression: unsupported flag 'x'")
        );
    }
}

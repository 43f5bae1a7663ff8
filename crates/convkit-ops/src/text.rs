//! Text & Encoding: Base64, URL and HTML encoding, case changes, unicode escapes.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::prelude::*;
use convkit_core::{ConvertError, Descriptor, Operation, Registry, Validation};

const CATEGORY: &str = "text-encoding";

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        Operation::text(
            Descriptor::new("base64-encode", "Base64 Encode", CATEGORY)
                .description("Encode text to Base64 format")
                .tags(["base64", "encode", "text"])
                .featured(),
            |input, _| Ok(BASE64_STANDARD.encode(input.as_bytes())),
        ),
    );

    registry.register(
        Operation::text(
            Descriptor::new("base64-decode", "Base64 Decode", CATEGORY)
                .description("Decode Base64 to text")
                .tags(["base64", "decode", "text"]),
            |input, _| base64_decode(input),
        )
        .validate_with(|input, _| {
            if is_base64_shaped(input.unwrap_or_default()) {
                Validation::Valid
            } else {
                Validation::invalid("Invalid Base64 format")
            }
        }),
    );

    registry.register(Operation::text(
        Descriptor::new("url-encode", "URL Encode", CATEGORY)
            .description("Encode text for URL usage")
            .tags(["url", "encode", "web"]),
        |input, _| Ok(urlencoding::encode(input).into_owned()),
    ));

    registry.register(Operation::text(
        Descriptor::new("url-decode", "URL Decode", CATEGORY)
            .description("Decode URL encoded text")
            .tags(["url", "decode", "web"]),
        |input, _| {
            urlencoding::decode(input)
                .map(|cow| cow.into_owned())
                .map_err(|_| ConvertError::failed("URI malformed"))
        },
    ));

    registry.register(Operation::text(
        Descriptor::new("html-encode", "HTML Encode", CATEGORY)
            .description("Encode special HTML characters")
            .tags(["html", "encode", "web"]),
        |input, _| Ok(html_encode(input)),
    ));

    registry.register(Operation::text(
        Descriptor::new("html-decode", "HTML Decode", CATEGORY)
            .description("Decode HTML entities")
            .tags(["html", "decode", "web"]),
        |input, _| Ok(html_decode(input)),
    ));

    registry.register(Operation::text(
        Descriptor::new("text-uppercase", "Text Uppercase", CATEGORY)
            .description("Convert text to uppercase")
            .tags(["text", "uppercase", "case"]),
        |input, _| Ok(input.to_uppercase()),
    ));

    registry.register(Operation::text(
        Descriptor::new("text-lowercase", "Text Lowercase", CATEGORY)
            .description("Convert text to lowercase")
            .tags(["text", "lowercase", "case"]),
        |input, _| Ok(input.to_lowercase()),
    ));

    registry.register(Operation::text(
        Descriptor::new("text-capitalize", "Text Capitalize", CATEGORY)
            .description("Capitalize first letter of each word")
            .tags(["text", "capitalize", "case"]),
        |input, _| Ok(capitalize_words(input)),
    ));

    registry.register(Operation::text(
        Descriptor::new("text-reverse", "Text Reverse", CATEGORY)
            .description("Reverse text characters")
            .tags(["text", "reverse"]),
        |input, _| Ok(input.chars().rev().collect()),
    ));

    registry.register(Operation::text(
        Descriptor::new("unicode-to-ascii", "Unicode to ASCII", CATEGORY)
            .description("Convert Unicode characters to ASCII escape sequences")
            .tags(["unicode", "ascii", "escape"]),
        |input, _| Ok(escape_unicode(input)),
    ));

    registry.register(Operation::text(
        Descriptor::new("ascii-to-unicode", "ASCII to Unicode", CATEGORY)
            .description("Convert ASCII escape sequences to Unicode characters")
            .tags(["ascii", "unicode", "unescape"]),
        |input, _| Ok(unescape_unicode(input)),
    ));
}

// ============================================
// Base64
// ============================================

/// Alphabet check with up to two trailing `=`, ignoring whitespace.
fn is_base64_shaped(input: &str) -> bool {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let body = compact.trim_end_matches('=');
    compact.len() - body.len() <= 2
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/')
}

/// Standard alphabet that tolerates missing padding and non-zero trailing bits.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn base64_decode(input: &str) -> Result<String, ConvertError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = LENIENT_BASE64
        .decode(compact.trim_end_matches('='))
        .map_err(|e| ConvertError::failed(format!("Invalid Base64 input: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ============================================
// HTML entities
// ============================================

const HTML_ENTITIES: &[(char, &str)] = &[
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
    ('/', "&#x2F;"),
];

fn html_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match HTML_ENTITIES.iter().find(|(ch, _)| *ch == c) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(c),
        }
    }
    out
}

fn html_decode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = HTML_ENTITIES
            .iter()
            .copied()
            .chain([('\'', "&apos;")])
            .find(|(_, entity)| tail.starts_with(entity));
        match decoded {
            Some((c, entity)) => {
                out.push(c);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ============================================
// Case
// ============================================

/// Capitalizes each word, lowercasing the rest of it.
///
/// A word starts at the first alphanumeric or `_` after whitespace and runs to
/// the next whitespace. Punctuation leading a word is left alone.
fn capitalize_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for c in input.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if c.is_alphanumeric() || c == '_' {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================
// Unicode escapes
// ============================================

/// Non-ASCII characters become `\uXXXX` UTF-16 escapes.
fn escape_unicode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

fn parse_escape(s: &str) -> Option<u16> {
    let hex = s.strip_prefix("\\u")?.get(..4)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

/// Reverse of [`escape_unicode`]. Surrogate pairs are joined; unpaired
/// surrogates are left as written.
fn unescape_unicode(input: &str) -> String {
    const ESCAPE_LEN: usize = 6;

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find("\\u") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let Some(unit) = parse_escape(tail) else {
            out.push_str("\\u");
            rest = &tail[2..];
            continue;
        };

        if (0xD800..0xDC00).contains(&unit) {
            let low = parse_escape(&tail[ESCAPE_LEN..]).filter(|u| (0xDC00..0xE000).contains(u));
            if let Some(Ok(c)) = low.and_then(|low| char::decode_utf16([unit, low]).next()) {
                out.push(c);
                rest = &tail[2 * ESCAPE_LEN..];
                continue;
            }
        }

        match char::from_u32(unit.into()) {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..ESCAPE_LEN]),
        }
        rest = &tail[ESCAPE_LEN..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use convkit_core::ConversionRequest;

    fn run(id: &str, input: &str) -> convkit_core::ConversionResponse {
        let mut registry = Registry::new();
        register(&mut registry);
        registry
            .get(id)
            .unwrap()
            .process(&ConversionRequest::new(id).input(input))
    }

    fn output(id: &str, input: &str) -> String {
        let resp = run(id, input);
        assert!(resp.success, "{id} failed: {:?}", resp.error);
        resp.output.unwrap()
    }

    #[test]
    fn test_base64_round_trip() {
        let encoded = output("base64-encode", "Hello, World!");
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(output("base64-decode", &encoded), "Hello, World!");
    }

    #[test]
    fn test_base64_decode_lenient_whitespace_and_padding() {
        assert_eq!(output("base64-decode", "SGVs\nbG8="), "Hello");
        assert_eq!(output("base64-decode", "SGVsbG8"), "Hello");
        // Non-zero bits after the last full byte are ignored
        assert_eq!(output("base64-decode", "QR=="), "A");
        assert_eq!(output("base64-decode", "SGVsbG9="), "Hello");
    }

    #[test]
    fn test_base64_decode_rejects_bad_alphabet() {
        let resp = run("base64-decode", "not*base64");
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Invalid Base64 format"));
        assert!(resp.metadata.is_none());
    }

    #[test]
    fn test_base64_decode_impossible_length_fails_conversion() {
        let resp = run("base64-decode", "abcde");
        assert!(!resp.success);
        assert!(resp.metadata.is_some());
    }

    #[test]
    fn test_url_round_trip() {
        let encoded = output("url-encode", "a b&c=d/é");
        assert_eq!(encoded, "a%20b%26c%3Dd%2F%C3%A9");
        assert_eq!(output("url-decode", &encoded), "a b&c=d/é");
    }

    #[test]
    fn test_url_decode_invalid_utf8() {
        let resp = run("url-decode", "%FF%FE");
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("URI malformed"));
    }

    #[test]
    fn test_html_round_trip() {
        let encoded = output("html-encode", r#"<a href="/x">Tom's & co</a>"#);
        assert_eq!(
            encoded,
            "&lt;a href=&quot;&#x2F;x&quot;&gt;Tom&#x27;s &amp; co&lt;&#x2F;a&gt;"
        );
        assert_eq!(
            output("html-decode", &encoded),
            r#"<a href="/x">Tom's & co</a>"#
        );
    }

    #[test]
    fn test_html_decode_leaves_unknown_entities() {
        assert_eq!(output("html-decode", "&copy; &apos;x&apos; &"), "&copy; 'x' &");
    }

    #[test]
    fn test_case_operations() {
        assert_eq!(output("text-uppercase", "abc Def"), "ABC DEF");
        assert_eq!(output("text-lowercase", "ABC Def"), "abc def");
        assert_eq!(output("text-capitalize", "hELLO  wORLD\nfoo"), "Hello  World\nFoo");
        assert_eq!(output("text-capitalize", "(hello wORLD"), "(Hello World");
        assert_eq!(output("text-capitalize", "--x-RAY 'QUOTED' _snake"), "--X-ray 'Quoted' _snake");
        assert_eq!(output("text-reverse", "abc"), "cba");
        assert_eq!(output("text-reverse", "añb"), "bña");
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(output("unicode-to-ascii", "café"), "caf\\u00e9");
        assert_eq!(output("unicode-to-ascii", "a😀"), "a\\ud83d\\ude00");
        assert_eq!(output("ascii-to-unicode", "caf\\u00e9"), "café");
        assert_eq!(output("ascii-to-unicode", "a\\ud83d\\ude00"), "a😀");
    }

    #[test]
    fn test_unicode_unescape_edge_cases() {
        assert_eq!(output("ascii-to-unicode", "\\u12"), "\\u12");
        assert_eq!(output("ascii-to-unicode", "\\uzzzz"), "\\uzzzz");
        assert_eq!(output("ascii-to-unicode", "\\ud83d!"), "\\ud83d!");
    }
}

//! Colors & Design: hex and `rgb()` color literals.

use convkit_core::{ConvertError, Descriptor, InputKind, Operation, Registry, Validation};

const CATEGORY: &str = "colors-design";

const HEX_FORMAT_ERROR: &str = "Invalid hex color format (use #RRGGBB or #RGB)";
const RGB_FORMAT_ERROR: &str = "Invalid RGB format (use rgb(r, g, b))";

pub(crate) fn register(registry: &mut Registry) {
    registry.register(
        Operation::text(
            Descriptor::new("hex-to-rgb", "Hex to RGB", CATEGORY)
                .description("Convert hex colors to RGB")
                .tags(["color", "hex", "rgb"])
                .input_kind(InputKind::Color)
                .placeholder("#FF5733"),
            |input, _| {
                let [r, g, b] =
                    parse_hex(input).ok_or_else(|| ConvertError::failed(HEX_FORMAT_ERROR))?;
                Ok(format!("rgb({r}, {g}, {b})"))
            },
        )
        .validate_with(|input, _| match parse_hex(input.unwrap_or_default()) {
            Some(_) => Validation::Valid,
            None => Validation::invalid(HEX_FORMAT_ERROR),
        }),
    );

    registry.register(
        Operation::text(
            Descriptor::new("rgb-to-hex", "RGB to Hex", CATEGORY)
                .description("Convert RGB colors to hex")
                .tags(["color", "rgb", "hex"])
                .input_kind(InputKind::Color)
                .placeholder("rgb(255, 87, 51)"),
            |input, _| {
                let components =
                    parse_rgb(input).ok_or_else(|| ConvertError::failed(RGB_FORMAT_ERROR))?;
                let mut hex = String::from("#");
                for component in components {
                    let byte = u8::try_from(component).map_err(|_| {
                        ConvertError::failed(format!("Color component {component} exceeds 255"))
                    })?;
                    hex.push_str(&format!("{byte:02X}"));
                }
                Ok(hex)
            },
        )
        .validate_with(|input, _| match parse_rgb(input.unwrap_or_default()) {
            Some(_) => Validation::Valid,
            None => Validation::invalid(RGB_FORMAT_ERROR),
        }),
    );
}

/// `#RGB` or `#RRGGBB`, leading `#` optional.
fn parse_hex(input: &str) -> Option<[u8; 3]> {
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Case-insensitive `rgb(r, g, b)` with arbitrary inner whitespace. Components
/// are unbounded here so range errors surface from conversion.
fn parse_rgb(input: &str) -> Option<[u32; 3]> {
    let trimmed = input.trim();
    let (prefix, rest) = trimmed.split_at_checked(4)?;
    if !prefix.eq_ignore_ascii_case("rgb(") {
        return None;
    }
    let body = rest.strip_suffix(')')?;

    let mut components = [0u32; 3];
    let mut parts = body.split(',');
    for slot in &mut components {
        let part = parts.next()?.trim();
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    parts.next().is_none().then_some(components)
}

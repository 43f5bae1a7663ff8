//! Numbers & Math: radix conversion between decimal, binary and hexadecimal.
//!
//! Values are unsigned and bounded by `u128`; anything larger fails
//! conversion rather than losing precision.

use convkit_core::{ConvertError, Descriptor, Operation, Registry, Validation};

const CATEGORY: &str = "numbers-math";

/// Radix conversion: accepted digit shape, parse radix, render function.
struct Radix {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    tags: [&'static str; 3],
    digits: fn(char) -> bool,
    shape_error: &'static str,
    from_radix: u32,
    render: fn(u128) -> String,
}

const CONVERSIONS: &[Radix] = &[
    Radix {
        id: "decimal-to-binary",
        name: "Decimal to Binary",
        description: "Convert decimal numbers to binary",
        tags: ["decimal", "binary", "conversion"],
        digits: |c| c.is_ascii_digit(),
        shape_error: "Input must be a valid decimal number",
        from_radix: 10,
        render: |n| format!("{n:b}"),
    },
    Radix {
        id: "binary-to-decimal",
        name: "Binary to Decimal",
        description: "Convert binary numbers to decimal",
        tags: ["binary", "decimal", "conversion"],
        digits: |c| c == '0' || c == '1',
        shape_error: "Input must contain only 0s and 1s",
        from_radix: 2,
        render: |n| n.to_string(),
    },
    Radix {
        id: "decimal-to-hex",
        name: "Decimal to Hex",
        description: "Convert decimal numbers to hexadecimal",
        tags: ["decimal", "hex", "conversion"],
        digits: |c| c.is_ascii_digit(),
        shape_error: "Input must be a valid decimal number",
        from_radix: 10,
        render: |n| format!("{n:X}"),
    },
    Radix {
        id: "hex-to-decimal",
        name: "Hex to Decimal",
        description: "Convert hexadecimal to decimal",
        tags: ["hex", "decimal", "conversion"],
        digits: |c| c.is_ascii_hexdigit(),
        shape_error: "Input must be valid hexadecimal (0-9, A-F)",
        from_radix: 16,
        render: |n| n.to_string(),
    },
];

pub(crate) fn register(registry: &mut Registry) {
    for radix in CONVERSIONS {
        let Radix {
            digits,
            shape_error,
            from_radix,
            render,
            ..
        } = *radix;

        registry.register(
            Operation::text(
                Descriptor::new(radix.id, radix.name, CATEGORY)
                    .description(radix.description)
                    .tags(radix.tags),
                move |input, _| {
                    let value = u128::from_str_radix(input.trim(), from_radix)
                        .map_err(|e| ConvertError::failed(format!("Number out of range: {e}")))?;
                    Ok(render(value))
                },
            )
            .validate_with(move |input, _| {
                if input.unwrap_or_default().trim().chars().all(digits) {
                    Validation::Valid
                } else {
                    Validation::invalid(shape_error)
                }
            }),
        );
    }
}

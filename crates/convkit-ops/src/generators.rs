//! Generators: UUIDs, passwords, placeholder text and QR code links.

use convkit_core::{
    Choice, ConvertError, Descriptor, FieldSpec, InputKind, Operation, Options, OptionsExt,
    OutputKind, Registry, Validation,
};
use rand::Rng;

const CATEGORY: &str = "generators";

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const UPPERCASE_DISTINCT: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const LOWERCASE_DISTINCT: &str = "abcdefghijkmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const DIGITS_DISTINCT: &str = "23456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

const LOREM_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "reprehenderit",
    "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint",
    "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia", "deserunt",
    "mollit", "anim", "id", "est", "laborum",
];

const QR_ENDPOINT: &str = "https://chart.googleapis.com/chart";
const QR_LEVELS: [&str; 4] = ["L", "M", "Q", "H"];

pub(crate) fn register(registry: &mut Registry) {
    registry.register(Operation::new(
        Descriptor::new("uuid-generate", "UUID Generator", CATEGORY)
            .description("Generate UUID v4 (ignores input)")
            .tags(["uuid", "generate", "unique"])
            .featured()
            .input_kind(InputKind::Generator),
        |_, _| Ok(uuid::Uuid::new_v4().to_string()),
    ));

    registry.register(Operation::new(
        Descriptor::new("password-generate", "Password Generator", CATEGORY)
            .description("Generate secure passwords with custom options")
            .tags(["password", "generate", "secure"])
            .input_kind(InputKind::Generator)
            .output_label("Generated Password")
            .field(FieldSpec::range("length", "Length", 4..=128, 16).description("Password length"))
            .field(FieldSpec::checkbox("includeUppercase", "Include Uppercase (A-Z)", true))
            .field(FieldSpec::checkbox("includeLowercase", "Include Lowercase (a-z)", true))
            .field(FieldSpec::checkbox("includeNumbers", "Include Numbers (0-9)", true))
            .field(FieldSpec::checkbox("includeSymbols", "Include Symbols (!@#$%^&*)", true))
            .field(FieldSpec::checkbox(
                "excludeSimilar",
                "Exclude Similar Characters (0,O,l,I)",
                false,
            )),
        |_, opts| generate_password(opts),
    ));

    registry.register(Operation::new(
        Descriptor::new("lorem-generate", "Lorem Ipsum Generator", CATEGORY)
            .description("Generate Lorem Ipsum text")
            .tags(["lorem", "ipsum", "placeholder"])
            .input_kind(InputKind::Generator)
            .field(
                FieldSpec::range("wordCount", "Word Count", 10..=500, 50)
                    .description("Number of words to generate"),
            ),
        |_, opts| {
            let count = opts.int_in("wordCount", 50, 10..=500) as usize;
            let words: Vec<&str> = LOREM_WORDS.iter().copied().cycle().take(count).collect();
            Ok(format!("{}.", words.join(" ")))
        },
    ));

    registry.register(
        Operation::text(
            Descriptor::new("qr-generate", "QR Code Generator", CATEGORY)
                .description("Generate QR codes from text")
                .tags(["qr", "qrcode", "generate"])
                .input_kind(InputKind::Options)
                .output_kind(OutputKind::ImageReference)
                .input_label("Text for QR Code")
                .output_label("QR Code")
                .field(
                    FieldSpec::range("size", "Size", 100..=500, 200)
                        .description("QR code size in pixels"),
                )
                .field(
                    FieldSpec::select(
                        "errorLevel",
                        "Error Correction",
                        [
                            Choice::new("Low (L)", "L"),
                            Choice::new("Medium (M)", "M"),
                            Choice::new("Quartile (Q)", "Q"),
                            Choice::new("High (H)", "H"),
                        ],
                    )
                    .default_value("M")
                    .description("Error correction level"),
                ),
            |input, opts| {
                let size = opts.int_in("size", 200, 100..=500);
                let level = opts.str_or("errorLevel", "M");
                Ok(format!(
                    "{QR_ENDPOINT}?chs={size}x{size}&cht=qr&chl={}&choe=UTF-8&chld={level}|0",
                    urlencoding::encode(input)
                ))
            },
        )
        .validate_with(|_, opts| {
            if QR_LEVELS.contains(&opts.str_or("errorLevel", "M")) {
                Validation::Valid
            } else {
                Validation::invalid("Error correction level must be one of L, M, Q, H")
            }
        }),
    );
}

fn generate_password(opts: &Options) -> Result<String, ConvertError> {
    let length = opts.int_in("length", 16, 4..=128) as usize;
    let distinct = opts.bool_or("excludeSimilar", false);

    let mut pool = String::new();
    if opts.bool_or("includeUppercase", true) {
        pool.push_str(if distinct { UPPERCASE_DISTINCT } else { UPPERCASE });
    }
    if opts.bool_or("includeLowercase", true) {
        pool.push_str(if distinct { LOWERCASE_DISTINCT } else { LOWERCASE });
    }
    if opts.bool_or("includeNumbers", true) {
        pool.push_str(if distinct { DIGITS_DISTINCT } else { DIGITS });
    }
    if opts.bool_or("includeSymbols", true) {
        pool.push_str(SYMBOLS);
    }
    if pool.is_empty() {
        return Err(ConvertError::failed(
            "At least one character type must be selected",
        ));
    }

    let pool = pool.as_bytes();
    let mut rng = rand::rng();
    Ok((0..length)
        .map(|_| char::from(pool[rng.random_range(0..pool.len())]))
        .collect())
}

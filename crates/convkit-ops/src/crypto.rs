//! Cryptography: digests and keyed hashes, rendered as lowercase hex.

use convkit_core::{ConvertError, Descriptor, InputKind, Operation, Registry, Validation};
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

const CATEGORY: &str = "cryptography";

type HmacSha256 = Hmac<Sha256>;

fn digest_hex<D: Digest>(input: &str) -> String {
    hex::encode(D::digest(input.as_bytes()))
}

fn hash_operation(id: &str, name: &str, algo: &str, hash: fn(&str) -> String) -> Operation {
    Operation::text(
        Descriptor::new(id, name, CATEGORY)
            .description(format!("Generate {name}"))
            .tags(["hash", algo, "crypto"]),
        move |input, _| Ok(hash(input)),
    )
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register(hash_operation("hash-md5", "MD5 Hash", "md5", digest_hex::<Md5>));
    registry.register(hash_operation("hash-sha1", "SHA1 Hash", "sha1", digest_hex::<Sha1>));
    registry.register(hash_operation(
        "hash-sha256",
        "SHA256 Hash",
        "sha256",
        digest_hex::<Sha256>,
    ));
    registry.register(hash_operation(
        "hash-sha512",
        "SHA512 Hash",
        "sha512",
        digest_hex::<Sha512>,
    ));

    registry.register(
        Operation::text(
            Descriptor::new("hmac-sha256", "HMAC-SHA256", CATEGORY)
                .description("Generate HMAC with secret key (input|key on separate lines)")
                .tags(["hmac", "hash", "crypto"])
                .input_kind(InputKind::Multiline)
                .placeholder("Your text\nYour secret key"),
            |input, _| hmac_sha256(input),
        )
        .validate_with(|input, _| {
            if input.unwrap_or_default().contains('\n') {
                Validation::Valid
            } else {
                Validation::invalid("Format: text on first line, secret key on second line")
            }
        }),
    );
}

/// First line is the message, second line the key. Further lines are ignored.
fn hmac_sha256(input: &str) -> Result<String, ConvertError> {
    let mut lines = input.split('\n');
    let text = lines.next().unwrap_or_default();
    let key = lines
        .next()
        .ok_or_else(|| ConvertError::InvalidInput("missing secret key line".into()))?;

    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| ConvertError::failed(format!("HMAC key error: {e}")))?;
    mac.update(text.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

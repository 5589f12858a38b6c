//! Cache key derivation.

use sha2::{Digest, Sha256};

use crate::models::ResolvedConfig;

/// Number of hex characters of the prompt digest kept in a key
const PROMPT_DIGEST_LEN: usize = 16;

/// Deterministic key over `(type, width, height, enhanced_prompt)`.
///
/// Format: `{type}:{width}x{height}:{digest}` where `digest` is a prefix of
/// the SHA-256 of the enhanced prompt.
pub fn cache_key(config: &ResolvedConfig) -> String {
    let digest = sha256_hex(config.enhanced_prompt.as_bytes());
    format!(
        "{}:{}x{}:{}",
        config.category,
        config.width,
        config.height,
        &digest[..PROMPT_DIGEST_LEN]
    )
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

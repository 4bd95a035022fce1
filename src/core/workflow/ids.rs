use sha2::{Digest, Sha256};

/// Fresh identifier for a state written without one: a random UUID hashed
/// into a 64-character lowercase hex string.
pub fn generate_unique_id() -> String {
    let seed = uuid::Uuid::new_v4();
    compute_sha256_hex(seed.as_bytes())
}

pub fn compute_sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

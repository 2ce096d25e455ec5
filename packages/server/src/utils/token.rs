use rand::RngCore;

/// Length in random bytes of an auth token; hex-encodes to 40 characters.
const TOKEN_BYTES: usize = 20;

/// Generate an opaque bearer token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

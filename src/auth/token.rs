use std::future::Future;

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

use crate::error::DomainError;
use crate::guards::retry_until_unique;
use crate::store::RepoError;

/// Random bytes behind every session token.
pub const TOKEN_BYTES: usize = 32;

/// Fresh opaque token: 32 bytes from the OS RNG, URL-safe base64 without
/// padding.
pub fn new_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Generates tokens until `is_taken` reports one that no identity holds.
pub async fn generate_unique_session_token<F, Fut>(is_taken: F) -> Result<String, DomainError>
where
    F: FnMut(&String) -> Fut,
    Fut: Future<Output = Result<bool, RepoError>>,
{
    retry_until_unique(new_session_token(), new_session_token, is_taken).await
}

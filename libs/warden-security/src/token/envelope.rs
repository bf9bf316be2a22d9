//! Plaintext layout of a token before encryption:
//! `sha256(json) || json`, where `json` is a versioned named-field envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::data::{TokenData, TokenType};
use super::error::TokenError;

/// Version written into every envelope. Other versions are rejected.
pub const TOKEN_FORMAT_VERSION: u32 = 2;

const DIGEST_LEN: usize = 32;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Envelope {
    v: u32,
    user: String,
    kind: TokenType,
    created: DateTime<Utc>,
    valid_before: DateTime<Utc>,
    nonce: i64,
}

pub(crate) fn encode(data: &TokenData) -> Result<Vec<u8>, TokenError> {
    let envelope = Envelope {
        v: TOKEN_FORMAT_VERSION,
        user: data.user.clone(),
        kind: data.kind,
        created: data.created,
        valid_before: data.valid_before,
        nonce: data.nonce,
    };
    let json = serde_json::to_vec(&envelope)
        .map_err(|e| TokenError::EncryptionFailed(format!("serialize token data: {e}")))?;

    let mut out = Vec::with_capacity(DIGEST_LEN + json.len());
    out.extend_from_slice(&Sha256::digest(&json));
    out.extend_from_slice(&json);
    Ok(out)
}

/// Parse decrypted bytes. Trailing zero fill from `NoPadding` block modes is
/// ignored; the JSON body never ends in a NUL byte.
pub(crate) fn decode(plaintext: &[u8]) -> Result<TokenData, TokenError> {
    if plaintext.len() <= DIGEST_LEN {
        return Err(TokenError::invalid("token payload too short"));
    }
    let (digest, body) = plaintext.split_at(DIGEST_LEN);
    let end = body.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    let body = &body[..end];

    if !bool::from(Sha256::digest(body).as_slice().ct_eq(digest)) {
        return Err(TokenError::invalid("token digest mismatch"));
    }

    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| TokenError::invalid(format!("malformed token payload: {e}")))?;
    if envelope.v != TOKEN_FORMAT_VERSION {
        return Err(TokenError::invalid(format!(
            "unsupported token format version {}",
            envelope.v
        )));
    }

    Ok(TokenData {
        user: envelope.user,
        kind: envelope.kind,
        created: envelope.created,
        valid_before: envelope.valid_before,
        nonce: envelope.nonce,
    })
}

/// Zero-fill `buf` up to the next multiple of `block`.
pub(crate) fn zero_pad(buf: &mut Vec<u8>, block: usize) {
    let rem = buf.len() % block;
    if rem != 0 {
        buf.resize(buf.len() + block - rem, 0);
    }
}

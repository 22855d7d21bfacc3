// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! RFC 5246 §5 P_SHA pseudorandom function, without label. Grounded in
//! `crypto_functions_lib.c`'s `PSHA`/`PSHA_outer`/`CryptoProvider_DeriveData_PRF_SHA256`:
//! same working-buffer-reuse arena, same overflow guard on `hash_len + seed_len`,
//! same tail-copy on the final (possibly partial) HMAC block.
//!
//! ```text
//! A(0) = seed
//! A(i+1) = HMAC_H(secret, A(i))
//! output = A(1)+seed || A(2)+seed || A(3)+seed || ...
//! ```

use zeroize::Zeroizing;

use crate::error::Error;
use crate::error::CryptoResult;

/// Runs P_SHA with the given one-shot HMAC function (either SHA-1 or
/// SHA-256 depending on policy), producing exactly `out_len` bytes.
///
/// Rejects zero-length secret, seed, or output, per spec §4.7.
pub fn p_hash(
    hmac: impl Fn(&[u8], &[u8]) -> CryptoResult<Vec<u8>>,
    secret: &[u8],
    seed: &[u8],
    out_len: usize,
) -> CryptoResult<Vec<u8>> {
    if secret.is_empty() {
        return Err(Error::invalid_parameter("p_hash: secret must not be empty"));
    }
    if seed.is_empty() {
        return Err(Error::invalid_parameter("p_hash: seed must not be empty"));
    }
    if out_len == 0 {
        return Err(Error::invalid_parameter("p_hash: output length must not be zero"));
    }

    // A(1) = HMAC(secret, A(0)) where A(0) = seed.
    let mut a = hmac(secret, seed)?;
    let hash_len = a.len();

    // a_buf holds A(i) || seed; seed is written once and never changes,
    // only the A(i) prefix is overwritten each round (the "arena" REDESIGN
    // FLAGS calls for instead of a fresh allocation per iteration).
    let buf_len = hash_len
        .checked_add(seed.len())
        .ok_or_else(|| Error::not_ok("p_hash: hash size + seed size overflowed"))?;
    let mut a_buf = Zeroizing::new(vec![0u8; buf_len]);
    a_buf[hash_len..].copy_from_slice(seed);

    let mut output = Vec::with_capacity(out_len);
    while output.len() < out_len {
        a_buf[..hash_len].copy_from_slice(&a);
        let block = hmac(secret, &a_buf)?;

        let remaining = out_len - output.len();
        if remaining >= block.len() {
            output.extend_from_slice(&block);
        } else {
            // Final, partial block: only the needed prefix is copied out.
            output.extend_from_slice(&block[..remaining]);
        }

        a = hmac(secret, &a)?; // A(i+1)
    }

    Ok(output)
}

// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Per-policy numeric constants and algorithm selection, reified as a
//! trait with one zero-sized implementation per policy: a `None`
//! implementation returning invalid-parameter for every primitive except
//! random generation, and one implementation apiece for `Basic256` and
//! `Basic256Sha256`.
//!
//! Grounded in `sopc_crypto_profiles.h`'s per-policy `#define`s and the
//! `SOPC_CryptoProfile` function-pointer struct: `Basic256` uses AES-256-CBC,
//! HMAC-SHA-1 (24-byte key, 20-byte tag), P_SHA-1, RSA-OAEP-SHA-1 /
//! RSA-PKCS1-v1.5-SHA-1, 1024-2048 bit keys; `Basic256Sha256` uses the same
//! AES/OAEP but HMAC-SHA-256 (32/32), P_SHA-256, RSA-PKCS1-v1.5-SHA-256,
//! 2048-4096 bit keys.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::backend::DigestKind;
use crate::error::{CryptoResult, Error};
use crate::policy::{Policy, BASIC256SHA256_URI, BASIC256_URI, NONE_URI};

/// Symmetric block size shared by both active policies.
pub const SYMMETRIC_BLOCK_LEN: usize = 16;

/// A policy's numeric constants and algorithm selection. `None`'s
/// implementation returns `invalid-parameter` for every row except the
/// ones that apply with no cryptography in play at all (reading a key's
/// own bit length needs no policy at all).
pub trait SecurityProfile: Send + Sync {
    fn policy(&self) -> Policy;

    fn symmetric_crypto_key_len(&self) -> CryptoResult<usize>;
    fn symmetric_sign_key_len(&self) -> CryptoResult<usize>;
    fn symmetric_signature_len(&self) -> CryptoResult<usize>;
    fn symmetric_block_len(&self) -> CryptoResult<usize>;
    fn secure_channel_nonce_len(&self) -> CryptoResult<usize> {
        self.symmetric_crypto_key_len()
    }

    fn asymmetric_oaep_hash_len(&self) -> CryptoResult<usize>;
    /// Pure length fact; RSASSA-PSS signing itself is not implemented (no
    /// caller ever needs it), so this is the only PSS-shaped surface the
    /// crate exposes.
    fn asymmetric_pss_hash_len(&self) -> CryptoResult<usize>;
    fn asymmetric_key_bit_bounds(&self) -> CryptoResult<(u32, u32)>;

    /// The digest HMAC is keyed with for symmetric sign/verify.
    fn symmetric_sign_digest(&self) -> CryptoResult<DigestKind>;
    /// The digest RSASSA-PKCS1-v1.5 hashes the message with.
    fn asymmetric_sign_digest(&self) -> CryptoResult<DigestKind>;
    /// Digests the certificate-sanity check accepts on the leaf's own
    /// signature: SHA-256 only for Basic256Sha256; SHA-1 or SHA-256 for
    /// Basic256.
    fn certificate_sanity_allowed_digests(&self) -> CryptoResult<Vec<DigestKind>>;

    fn thumbprint_len(&self) -> CryptoResult<usize>;
    fn sign_algorithm_uri(&self) -> Option<&'static str>;
}

pub struct NoneProfile;
pub struct Basic256Profile;
pub struct Basic256Sha256Profile;

fn unsupported() -> Error {
    Error::invalid_parameter("operation not supported under the None security policy")
}

impl SecurityProfile for NoneProfile {
    fn policy(&self) -> Policy {
        Policy::None
    }
    fn symmetric_crypto_key_len(&self) -> CryptoResult<usize> {
        Err(unsupported())
    }
    fn symmetric_sign_key_len(&self) -> CryptoResult<usize> {
        Err(unsupported())
    }
    fn symmetric_signature_len(&self) -> CryptoResult<usize> {
        Err(unsupported())
    }
    fn symmetric_block_len(&self) -> CryptoResult<usize> {
        Err(unsupported())
    }
    fn asymmetric_oaep_hash_len(&self) -> CryptoResult<usize> {
        Err(unsupported())
    }
    fn asymmetric_pss_hash_len(&self) -> CryptoResult<usize> {
        Err(unsupported())
    }
    fn asymmetric_key_bit_bounds(&self) -> CryptoResult<(u32, u32)> {
        Err(unsupported())
    }
    fn symmetric_sign_digest(&self) -> CryptoResult<DigestKind> {
        Err(unsupported())
    }
    fn asymmetric_sign_digest(&self) -> CryptoResult<DigestKind> {
        Err(unsupported())
    }
    fn certificate_sanity_allowed_digests(&self) -> CryptoResult<Vec<DigestKind>> {
        Err(unsupported())
    }
    fn thumbprint_len(&self) -> CryptoResult<usize> {
        Err(unsupported())
    }
    fn sign_algorithm_uri(&self) -> Option<&'static str> {
        Option::None
    }
}

impl SecurityProfile for Basic256Profile {
    fn policy(&self) -> Policy {
        Policy::Basic256
    }
    fn symmetric_crypto_key_len(&self) -> CryptoResult<usize> {
        Ok(32)
    }
    fn symmetric_sign_key_len(&self) -> CryptoResult<usize> {
        Ok(24)
    }
    fn symmetric_signature_len(&self) -> CryptoResult<usize> {
        Ok(20)
    }
    fn symmetric_block_len(&self) -> CryptoResult<usize> {
        Ok(SYMMETRIC_BLOCK_LEN)
    }
    fn asymmetric_oaep_hash_len(&self) -> CryptoResult<usize> {
        Ok(20)
    }
    fn asymmetric_pss_hash_len(&self) -> CryptoResult<usize> {
        Ok(20)
    }
    fn asymmetric_key_bit_bounds(&self) -> CryptoResult<(u32, u32)> {
        Ok((1024, 2048))
    }
    fn symmetric_sign_digest(&self) -> CryptoResult<DigestKind> {
        Ok(DigestKind::Sha1)
    }
    fn asymmetric_sign_digest(&self) -> CryptoResult<DigestKind> {
        Ok(DigestKind::Sha1)
    }
    fn certificate_sanity_allowed_digests(&self) -> CryptoResult<Vec<DigestKind>> {
        Ok(vec![DigestKind::Sha1, DigestKind::Sha256])
    }
    fn thumbprint_len(&self) -> CryptoResult<usize> {
        Ok(20)
    }
    fn sign_algorithm_uri(&self) -> Option<&'static str> {
        Some("http://www.w3.org/2000/09/xmldsig#rsa-sha1")
    }
}

impl SecurityProfile for Basic256Sha256Profile {
    fn policy(&self) -> Policy {
        Policy::Basic256Sha256
    }
    fn symmetric_crypto_key_len(&self) -> CryptoResult<usize> {
        Ok(32)
    }
    fn symmetric_sign_key_len(&self) -> CryptoResult<usize> {
        Ok(32)
    }
    fn symmetric_signature_len(&self) -> CryptoResult<usize> {
        Ok(32)
    }
    fn symmetric_block_len(&self) -> CryptoResult<usize> {
        Ok(SYMMETRIC_BLOCK_LEN)
    }
    fn asymmetric_oaep_hash_len(&self) -> CryptoResult<usize> {
        // RSA-OAEP stays SHA-1 by spec even under Basic256Sha256.
        Ok(20)
    }
    fn asymmetric_pss_hash_len(&self) -> CryptoResult<usize> {
        Ok(32)
    }
    fn asymmetric_key_bit_bounds(&self) -> CryptoResult<(u32, u32)> {
        Ok((2048, 4096))
    }
    fn symmetric_sign_digest(&self) -> CryptoResult<DigestKind> {
        Ok(DigestKind::Sha256)
    }
    fn asymmetric_sign_digest(&self) -> CryptoResult<DigestKind> {
        Ok(DigestKind::Sha256)
    }
    fn certificate_sanity_allowed_digests(&self) -> CryptoResult<Vec<DigestKind>> {
        Ok(vec![DigestKind::Sha256])
    }
    fn thumbprint_len(&self) -> CryptoResult<usize> {
        Ok(20)
    }
    fn sign_algorithm_uri(&self) -> Option<&'static str> {
        Some("http://www.w3.org/2001/04/xmldsig-more#rsa-sha256")
    }
}

static NONE_PROFILE: NoneProfile = NoneProfile;
static BASIC256_PROFILE: Basic256Profile = Basic256Profile;
static BASIC256SHA256_PROFILE: Basic256Sha256Profile = Basic256Sha256Profile;

/// Immutable URI -> profile table, built once and shared across every
/// `CryptoProvider` for the lifetime of the process: exactly one profile
/// instance exists per policy.
static PROFILE_REGISTRY: Lazy<HashMap<&'static str, &'static dyn SecurityProfile>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, &'static dyn SecurityProfile> = HashMap::new();
    m.insert(BASIC256SHA256_URI, &BASIC256SHA256_PROFILE);
    m.insert(BASIC256_URI, &BASIC256_PROFILE);
    m.insert(NONE_URI, &NONE_PROFILE);
    m
});

/// Case-insensitive, full-string lookup of the profile for a policy URI.
/// Returns `None` for a null/unrecognized URI, never a partial/prefix
/// match.
pub fn profile_for_uri(uri: &str) -> Option<&'static dyn SecurityProfile> {
    let policy = Policy::from_uri(uri)?;
    profile_for_policy(policy)
}

pub fn profile_for_policy(policy: Policy) -> Option<&'static dyn SecurityProfile> {
    let uri = policy.uri()?;
    PROFILE_REGISTRY.get(uri).copied()
}

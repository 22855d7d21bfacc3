// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The pluggable primitive surface the core requires from a crypto library,
//! reified as a trait. The core dispatches every primitive through this
//! trait and never touches a concrete backend (openssl, mbedtls, ...)
//! directly; `opcua-crypto-openssl` is the one implementation shipped in
//! this workspace.

use crate::error::CryptoResult;

/// The digest algorithm selected by a policy or read off a certificate's
/// signature-algorithm field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestKind {
    pub fn output_len(self) -> usize {
        match self {
            DigestKind::Sha1 => 20,
            DigestKind::Sha256 => 32,
            DigestKind::Sha384 => 48,
            DigestKind::Sha512 => 64,
        }
    }
}

/// Minimum certificate-chain validation profile a [`CryptoBackend`] must
/// enforce when asked to verify a chain. This is a policy-independent
/// floor (SHA-256-or-stronger signing hash, RSA >= 2048 bits), not a
/// per-`SecurityPolicy` setting.
#[derive(Debug, Clone)]
pub struct ChainValidationProfile {
    pub allowed_digests: Vec<DigestKind>,
    pub rsa_min_bits: u32,
}

impl Default for ChainValidationProfile {
    fn default() -> Self {
        ChainValidationProfile {
            allowed_digests: vec![DigestKind::Sha256, DigestKind::Sha384, DigestKind::Sha512],
            rsa_min_bits: 2048,
        }
    }
}

/// The backend-crypto capability contract. Every method maps 1:1 onto a
/// single primitive operation; the associated types let the core's
/// [`crate::keys::AsymmetricKey`] / [`crate::keys::Certificate`]
/// wrappers hold a real backend-native handle without the core crate
/// depending on any concrete crypto library.
pub trait CryptoBackend: Send + Sync + 'static {
    type PrivateKey: Send + Sync;
    /// `Clone` so a borrowed key's cached public half and a fresh one
    /// derived from an owned private key share one return type in
    /// [`crate::keys::AsymmetricKey::public_key`].
    type PublicKey: Send + Sync + Clone;
    type Certificate: Send + Sync;

    // -- entropy source + DRBG --------------------------------------
    /// Fills `buf` with cryptographically random bytes from the backend's
    /// entropy source / deterministic random bit generator.
    fn fill_random(&self, buf: &mut [u8]) -> CryptoResult<()>;

    // -- AES-256-CBC --------------------------------------------------
    /// `key` is 32 bytes, `iv` is 16 bytes. The backend may mutate its
    /// working copy of the IV; it must never mutate the caller's slice.
    fn aes256_cbc_encrypt(&self, plain: &[u8], key: &[u8], iv: &[u8]) -> CryptoResult<Vec<u8>>;
    fn aes256_cbc_decrypt(&self, cipher: &[u8], key: &[u8], iv: &[u8]) -> CryptoResult<Vec<u8>>;

    // -- HMAC (one-shot; any incremental start/update/finish/reset API is
    //    internalized by the backend since P_SHA is the only caller and
    //    the core drives it one call per A(i) anyway) --
    fn hmac_sha1(&self, key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>>;
    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>>;

    // -- one-shot message digest ---------------------------------------
    fn digest(&self, kind: DigestKind, data: &[u8]) -> CryptoResult<Vec<u8>>;

    // -- RSA-OAEP-SHA-1 -------------------------------------------------
    fn rsa_oaep_sha1_encrypt(&self, plain: &[u8], key: &Self::PublicKey) -> CryptoResult<Vec<u8>>;
    /// Returns the plaintext; the caller learns the written length from
    /// the returned `Vec`'s length.
    fn rsa_oaep_sha1_decrypt(&self, cipher: &[u8], key: &Self::PrivateKey) -> CryptoResult<Vec<u8>>;

    // -- RSASSA-PKCS1-v1.5 ------------------------------------------------
    fn rsa_pkcs1_sign(
        &self,
        digest_kind: DigestKind,
        digest: &[u8],
        key: &Self::PrivateKey,
    ) -> CryptoResult<Vec<u8>>;
    fn rsa_pkcs1_verify(
        &self,
        digest_kind: DigestKind,
        digest: &[u8],
        signature: &[u8],
        key: &Self::PublicKey,
    ) -> CryptoResult<bool>;

    // -- PK parse / write -----------------------------------------------
    fn private_key_from_der(&self, der: &[u8]) -> CryptoResult<Self::PrivateKey>;
    fn private_key_from_pem(&self, pem: &[u8], password: Option<&[u8]>) -> CryptoResult<Self::PrivateKey>;
    /// Writes from the tail of an internal scratch buffer, same contract
    /// as `mbedtls_pk_write_key_der`: returns the encoded bytes directly,
    /// the caller (`KeyManager::write_key_to_der`) is responsible for the
    /// "copy into a possibly smaller `dest`" dance this mirrors.
    fn private_key_to_der(&self, key: &Self::PrivateKey) -> CryptoResult<Vec<u8>>;
    fn private_key_is_rsa(&self, key: &Self::PrivateKey) -> bool;
    fn private_key_bit_length(&self, key: &Self::PrivateKey) -> CryptoResult<u32>;

    fn public_key_is_rsa(&self, key: &Self::PublicKey) -> bool;
    fn public_key_bit_length(&self, key: &Self::PublicKey) -> CryptoResult<u32>;
    fn public_key_from_private(&self, key: &Self::PrivateKey) -> CryptoResult<Self::PublicKey>;

    // -- X.509 parse / accessors -----------------------------------------
    fn certificate_from_der(&self, der: &[u8]) -> CryptoResult<Self::Certificate>;
    /// The certificate's canonical DER encoding (aliases the backend's
    /// internal storage in the original; here it is a fresh copy, which
    /// is the only representation Rust's ownership model makes safe to
    /// hand back without tying the result's lifetime to the certificate).
    fn certificate_to_der(&self, cert: &Self::Certificate) -> CryptoResult<Vec<u8>>;
    fn certificate_public_key(&self, cert: &Self::Certificate) -> CryptoResult<Self::PublicKey>;
    fn certificate_signature_digest(&self, cert: &Self::Certificate) -> CryptoResult<DigestKind>;

    // -- X.509 chain verify -----------------------------------------------
    /// `crl_der` is an optional DER-encoded certificate revocation list.
    fn verify_chain(
        &self,
        leaf: &Self::Certificate,
        ca: &Self::Certificate,
        crl_der: Option<&[u8]>,
        profile: &ChainValidationProfile,
    ) -> CryptoResult<()>;
}

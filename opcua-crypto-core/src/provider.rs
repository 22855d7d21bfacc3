// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The stateful façade combining a [`SecurityProfile`] with a
//! [`CryptoBackend`]: length algebra, symmetric and asymmetric
//! operations, random generation, and P_SHA-based key derivation.
//! Grounded in `sopc_crypto_provider.c`'s `SOPC_CryptoProvider` and the
//! primitive entry points of `crypto_functions_lib.c`.

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::backend::{CryptoBackend, DigestKind};
use crate::derive::p_hash;
use crate::error::{CryptoResult, Error};
use crate::key_set::SecurityKeySet;
use crate::keys::{AsymmetricKey, Certificate};
use crate::pki::PKIProvider;
use crate::policy::Policy;
use crate::profile::{profile_for_policy, profile_for_uri, SecurityProfile};
use crate::secret::SecretBuffer;

/// Created from a security-policy URI; owns no state of its own beyond a
/// reference to its backend and its (`'static`, shared) profile. Spec
/// §3's separate per-provider `CryptolibContext` (entropy source +
/// seeded DRBG) collapses into the backend reference itself here: every
/// backend in this ecosystem (and `opcua-crypto-openssl` in particular)
/// already owns its own CSPRNG wiring, so a second per-provider context
/// would just be a second handle to the same entropy source.
pub struct CryptoProvider<'b, B: CryptoBackend> {
    backend: &'b B,
    profile: &'static dyn SecurityProfile,
}

impl<'b, B: CryptoBackend> CryptoProvider<'b, B> {
    /// Null URI or unrecognized URI yields `None`, same as `create`
    /// returning a null provider.
    pub fn create(backend: &'b B, uri: &str) -> Option<Self> {
        let profile = profile_for_uri(uri);
        if profile.is_none() {
            warn!(uri, "CryptoProvider::create: unrecognized security policy URI");
        }
        Some(CryptoProvider { backend, profile: profile? })
    }

    pub fn from_policy(backend: &'b B, policy: Policy) -> Option<Self> {
        let profile = profile_for_policy(policy)?;
        Some(CryptoProvider { backend, profile })
    }

    pub fn policy(&self) -> Policy {
        self.profile.policy()
    }

    // ---------------------------------------------------------------
    // 4.3 Length algebra
    // ---------------------------------------------------------------

    pub fn symmetric_crypto_key_len(&self) -> CryptoResult<usize> {
        self.profile.symmetric_crypto_key_len()
    }

    pub fn symmetric_sign_key_len(&self) -> CryptoResult<usize> {
        self.profile.symmetric_sign_key_len()
    }

    pub fn symmetric_signature_len(&self) -> CryptoResult<usize> {
        self.profile.symmetric_signature_len()
    }

    pub fn symmetric_block_len(&self) -> CryptoResult<usize> {
        self.profile.symmetric_block_len()
    }

    pub fn secure_channel_nonce_len(&self) -> CryptoResult<usize> {
        self.profile.secure_channel_nonce_len()
    }

    /// Symmetric cipher/plain length is the identity function of the
    /// input length under both active policies; under `None` there is no
    /// symmetric cipher at all.
    pub fn symmetric_output_len_from_input(&self, input_len: usize) -> CryptoResult<usize> {
        self.profile.symmetric_block_len()?;
        Ok(input_len)
    }

    /// Policy-agnostic: a key's bit length is read straight off the key,
    /// regardless of which policy (or no policy) is in force.
    pub fn asymmetric_key_bits(&self, key: &AsymmetricKey<'_, B>) -> CryptoResult<u32> {
        key.bit_length(self.backend)
    }

    pub fn asymmetric_oaep_hash_len(&self) -> CryptoResult<usize> {
        self.profile.asymmetric_oaep_hash_len()
    }

    pub fn asymmetric_pss_hash_len(&self) -> CryptoResult<usize> {
        self.profile.asymmetric_pss_hash_len()
    }

    /// Key-length in bytes; policy-agnostic like `asymmetric_key_bits`.
    pub fn asymmetric_msg_cipher_len(&self, key_bits: u32) -> CryptoResult<usize> {
        Ok(bits_to_bytes(key_bits))
    }

    /// `cipher - 2*oaep_hash - 2`, guarded against underflow; fails under
    /// `None` because `asymmetric_oaep_hash_len` already fails there.
    pub fn asymmetric_msg_plain_len(&self, key_bits: u32) -> CryptoResult<usize> {
        let oaep = self.profile.asymmetric_oaep_hash_len()?;
        let cipher = bits_to_bytes(key_bits);
        cipher
            .checked_sub(2 * oaep + 2)
            .ok_or_else(|| Error::not_ok("asymmetric_msg_plain_len: cipher length too small for OAEP overhead"))
    }

    /// `ceil(input_len / plain_len) * cipher_len`, with `input_len == 0 =>
    /// 0` as a special case.
    pub fn asymmetric_encrypt_output_len(&self, input_len: usize, key_bits: u32) -> CryptoResult<usize> {
        if input_len == 0 {
            // Still requires a supported policy to report a definite answer.
            self.profile.asymmetric_oaep_hash_len()?;
            return Ok(0);
        }
        let plain = self.asymmetric_msg_plain_len(key_bits)?;
        let cipher = bits_to_bytes(key_bits);
        let passes = ceil_div(input_len, plain)?;
        passes
            .checked_mul(cipher)
            .ok_or_else(|| Error::not_ok("asymmetric_encrypt_output_len: output length overflowed"))
    }

    pub fn asymmetric_decrypt_output_len(&self, input_len: usize, key_bits: u32) -> CryptoResult<usize> {
        if input_len == 0 {
            self.profile.asymmetric_oaep_hash_len()?;
            return Ok(0);
        }
        let plain = self.asymmetric_msg_plain_len(key_bits)?;
        let cipher = bits_to_bytes(key_bits);
        let passes = ceil_div(input_len, cipher)?;
        passes
            .checked_mul(plain)
            .ok_or_else(|| Error::not_ok("asymmetric_decrypt_output_len: output length overflowed"))
    }

    /// One cipher block — same arithmetic as the msg-cipher length, but
    /// fails under `None` because signing itself is unsupported there.
    pub fn asymmetric_signature_len(&self, key_bits: u32) -> CryptoResult<usize> {
        self.profile.asymmetric_sign_digest()?;
        Ok(bits_to_bytes(key_bits))
    }

    pub fn thumbprint_len(&self) -> CryptoResult<usize> {
        self.profile.thumbprint_len()
    }

    /// SHA-1 of the certificate's canonical DER, per spec §4.8: the
    /// output length is checked against this policy's thumbprint length
    /// (which also rejects `None`, which has no thumbprint algorithm) and
    /// the certificate's cached DER is hashed, never re-encoded.
    pub fn compute_certificate_thumbprint(&self, cert: &Certificate<B>) -> CryptoResult<Vec<u8>> {
        let expected_len = self.profile.thumbprint_len()?;
        let digest = self.backend.digest(DigestKind::Sha1, cert.der())?;
        if digest.len() != expected_len {
            return Err(Error::not_ok(
                "compute_certificate_thumbprint: backend digest length does not match the policy's thumbprint length",
            ));
        }
        Ok(digest)
    }

    pub fn sign_algorithm_uri(&self) -> Option<&'static str> {
        self.profile.sign_algorithm_uri()
    }

    /// Crypto-key + sign-key + IV lengths in a single transaction: on any
    /// failure, none of the three lengths is reported.
    pub fn derive_lengths(&self) -> CryptoResult<(usize, usize, usize)> {
        let sign = self.profile.symmetric_sign_key_len();
        let crypto = self.profile.symmetric_crypto_key_len();
        let iv = self.profile.symmetric_block_len();
        match (sign, crypto, iv) {
            (Ok(s), Ok(c), Ok(i)) => Ok((s, c, i)),
            _ => Err(Error::not_ok("derive_lengths: one or more underlying length queries failed")),
        }
    }

    // ---------------------------------------------------------------
    // 4.4 Symmetric operations
    // ---------------------------------------------------------------

    pub fn symmetric_encrypt(
        &self,
        plain: &[u8],
        key: &SecretBuffer,
        iv: &SecretBuffer,
    ) -> CryptoResult<Vec<u8>> {
        let block = self.profile.symmetric_block_len()?;
        let crypto_key_len = self.profile.symmetric_crypto_key_len()?;
        if key.len() != crypto_key_len {
            return Err(Error::invalid_parameter("symmetric_encrypt: key has the wrong length for this policy"));
        }
        if iv.len() != block {
            return Err(Error::invalid_parameter("symmetric_encrypt: IV has the wrong length for this policy"));
        }
        if plain.len() % block != 0 {
            return Err(Error::invalid_parameter("symmetric_encrypt: input length is not a multiple of the block size"));
        }

        self.backend.aes256_cbc_encrypt(plain, &key.expose(), &iv.expose())
    }

    pub fn symmetric_decrypt(
        &self,
        cipher: &[u8],
        key: &SecretBuffer,
        iv: &SecretBuffer,
    ) -> CryptoResult<Vec<u8>> {
        let block = self.profile.symmetric_block_len()?;
        let crypto_key_len = self.profile.symmetric_crypto_key_len()?;
        if key.len() != crypto_key_len {
            return Err(Error::invalid_parameter("symmetric_decrypt: key has the wrong length for this policy"));
        }
        if iv.len() != block {
            return Err(Error::invalid_parameter("symmetric_decrypt: IV has the wrong length for this policy"));
        }
        if cipher.len() % block != 0 {
            return Err(Error::invalid_parameter("symmetric_decrypt: input length is not a multiple of the block size"));
        }

        self.backend.aes256_cbc_decrypt(cipher, &key.expose(), &iv.expose())
    }

    pub fn symmetric_sign(&self, data: &[u8], sign_key: &SecretBuffer) -> CryptoResult<Vec<u8>> {
        let sign_key_len = self.profile.symmetric_sign_key_len()?;
        if sign_key.len() != sign_key_len {
            return Err(Error::invalid_parameter("symmetric_sign: sign key has the wrong length for this policy"));
        }
        match self.profile.symmetric_sign_digest()? {
            DigestKind::Sha1 => self.backend.hmac_sha1(&sign_key.expose(), data),
            DigestKind::Sha256 => self.backend.hmac_sha256(&sign_key.expose(), data),
            other => Err(Error::not_ok(format!("symmetric_sign: unsupported digest {other:?} selected by profile"))),
        }
    }

    /// Recomputes the tag and compares it against `signature` in constant
    /// time; a mismatch is `not-ok`, not `invalid-parameter` — the
    /// precondition (lengths, key) held, the check itself failed.
    pub fn symmetric_verify(
        &self,
        data: &[u8],
        sign_key: &SecretBuffer,
        signature: &[u8],
    ) -> CryptoResult<()> {
        let expected_len = self.profile.symmetric_signature_len()?;
        if signature.len() != expected_len {
            return Err(Error::invalid_parameter("symmetric_verify: signature has the wrong length for this policy"));
        }
        let computed = self.symmetric_sign(data, sign_key)?;
        if computed.ct_eq(signature).into() {
            Ok(())
        } else {
            warn!(policy = ?self.policy(), "symmetric_verify: signature tag mismatch");
            Err(Error::not_ok("symmetric_verify: signature does not match"))
        }
    }

    // ---------------------------------------------------------------
    // 4.5 Asymmetric operations
    // ---------------------------------------------------------------

    fn check_key_bit_window(&self, bits: u32) -> CryptoResult<()> {
        let (min, max) = self.profile.asymmetric_key_bit_bounds()?;
        if bits < min || bits > max {
            return Err(Error::invalid_parameter(format!(
                "asymmetric key bit length {bits} outside policy window [{min}, {max}]"
            )));
        }
        Ok(())
    }

    /// Multi-block OAEP encrypt: iterates while `plain` has remaining
    /// bytes, advancing by the per-pass plain/cipher budgets.
    pub fn asymmetric_encrypt(&self, plain: &[u8], key: &AsymmetricKey<'_, B>) -> CryptoResult<Vec<u8>> {
        let bits = key.bit_length(self.backend)?;
        self.check_key_bit_window(bits)?;
        let public = key.public_key(self.backend)?;
        let plain_budget = self.asymmetric_msg_plain_len(bits)?;
        if plain_budget == 0 {
            return Err(Error::not_ok("asymmetric_encrypt: plain-text budget for this key is zero"));
        }

        // Spec's `lengthIn == 0 -> 0` special case falls out naturally: the
        // loop below never executes and `out` stays empty.
        let mut out = Vec::new();
        let mut offset = 0;
        while offset < plain.len() {
            let end = (offset + plain_budget).min(plain.len());
            let block = self.backend.rsa_oaep_sha1_encrypt(&plain[offset..end], &public)?;
            out.extend_from_slice(&block);
            offset = end;
        }
        Ok(out)
    }

    /// Multi-block OAEP decrypt: each pass may emit fewer plain bytes
    /// than the budget, so the aggregate length is the sum of what the
    /// backend actually wrote, not `passes * plain_budget`.
    pub fn asymmetric_decrypt(&self, cipher: &[u8], key: &AsymmetricKey<'_, B>) -> CryptoResult<Vec<u8>> {
        let bits = key.bit_length(self.backend)?;
        self.check_key_bit_window(bits)?;
        let private = key.private()?;
        let cipher_budget = bits_to_bytes(bits);
        if cipher_budget == 0 || cipher.len() % cipher_budget != 0 {
            return Err(Error::invalid_parameter("asymmetric_decrypt: input length is not a multiple of the key's cipher block"));
        }

        let mut out = Vec::new();
        let mut offset = 0;
        while offset < cipher.len() {
            let end = offset + cipher_budget;
            let block = self.backend.rsa_oaep_sha1_decrypt(&cipher[offset..end], private)?;
            out.extend_from_slice(&block);
            offset = end;
        }
        Ok(out)
    }

    /// Hashes `data` once under the policy's asymmetric-signature digest,
    /// then signs the digest. The scoped digest buffer is just a local
    /// `Vec` here: it is dropped (and, being a
    /// digest rather than key material, does not need zeroizing) at the
    /// end of this call on every exit path, `?` included.
    pub fn asymmetric_sign(&self, data: &[u8], key: &AsymmetricKey<'_, B>) -> CryptoResult<Vec<u8>> {
        let bits = key.bit_length(self.backend)?;
        self.check_key_bit_window(bits)?;
        let private = key.private()?;
        let digest_kind = self.profile.asymmetric_sign_digest()?;
        let digest = self.backend.digest(digest_kind, data)?;
        self.backend.rsa_pkcs1_sign(digest_kind, &digest, private)
    }

    pub fn asymmetric_verify(
        &self,
        data: &[u8],
        key: &AsymmetricKey<'_, B>,
        signature: &[u8],
    ) -> CryptoResult<()> {
        let bits = key.bit_length(self.backend)?;
        self.check_key_bit_window(bits)?;
        let public = key.public_key(self.backend)?;
        let digest_kind = self.profile.asymmetric_sign_digest()?;
        let digest = self.backend.digest(digest_kind, data)?;
        let ok = self.backend.rsa_pkcs1_verify(digest_kind, &digest, signature, &public)?;
        if ok {
            Ok(())
        } else {
            warn!(policy = ?self.policy(), "asymmetric_verify: signature does not match");
            Err(Error::not_ok("asymmetric_verify: signature does not match"))
        }
    }

    /// Per-policy certificate-sanity check: RSA key type, bit-length
    /// window, and signing-hash allow-list. Does not check
    /// `keyUsage`/`extendedKeyUsage` — a deliberate gap this crate
    /// inherits unchanged.
    pub fn certificate_sanity_check(&self, cert: &Certificate<B>) -> CryptoResult<()> {
        let public = self.backend.certificate_public_key(cert.native())?;
        if !self.backend.public_key_is_rsa(&public) {
            return Err(Error::not_ok("certificate_sanity_check: certificate's public key is not RSA"));
        }
        let bits = self.backend.public_key_bit_length(&public)?;
        self.check_key_bit_window(bits)?;

        let allowed = self.profile.certificate_sanity_allowed_digests()?;
        let digest = self.backend.certificate_signature_digest(cert.native())?;
        if !allowed.contains(&digest) {
            return Err(Error::not_ok(format!(
                "certificate_sanity_check: certificate signed with unsupported digest {digest:?}"
            )));
        }
        Ok(())
    }

    /// Two-step dispatch: the profile's own constraints first, then the
    /// PKI's chain check.
    pub fn validate_certificate(
        &self,
        cert: &Certificate<B>,
        pki: &PKIProvider<'_, '_, B>,
    ) -> CryptoResult<()> {
        self.certificate_sanity_check(cert)?;
        let result = pki.validate_certificate(cert);
        match &result {
            Ok(()) => debug!(policy = ?self.policy(), "validate_certificate: chain accepted"),
            Err(e) => warn!(policy = ?self.policy(), error = %e, "validate_certificate: chain rejected"),
        }
        result
    }

    // ---------------------------------------------------------------
    // 4.6 Random generation
    // ---------------------------------------------------------------

    pub fn generate_random_bytes(&self, len: usize) -> CryptoResult<Vec<u8>> {
        if len == 0 {
            return Err(Error::invalid_parameter("generate_random_bytes: length must not be zero"));
        }
        let mut buf = vec![0u8; len];
        self.backend.fill_random(&mut buf)?;
        Ok(buf)
    }

    pub fn generate_secure_channel_nonce(&self) -> CryptoResult<SecretBuffer> {
        let len = self.profile.secure_channel_nonce_len()?;
        let bytes = self.generate_random_bytes(len)?;
        Ok(SecretBuffer::from_vec(bytes))
    }

    pub fn generate_random_id(&self) -> CryptoResult<u32> {
        let mut buf = [0u8; 4];
        self.backend.fill_random(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    // ---------------------------------------------------------------
    // 4.7 Derivation (P_SHA)
    // ---------------------------------------------------------------

    /// `derive_pseudo_random_data(secret, seed, out_len)` — the raw PRF,
    /// exposed for callers that need P_SHA output directly rather than a
    /// full [`SecurityKeySet`] pair.
    pub fn derive_pseudo_random_data(&self, secret: &[u8], seed: &[u8], out_len: usize) -> CryptoResult<Vec<u8>> {
        let digest_kind = self.profile.symmetric_sign_digest()?;
        let hmac = |key: &[u8], data: &[u8]| -> CryptoResult<Vec<u8>> {
            match digest_kind {
                DigestKind::Sha1 => self.backend.hmac_sha1(key, data),
                DigestKind::Sha256 => self.backend.hmac_sha256(key, data),
                other => Err(Error::not_ok(format!("derive_pseudo_random_data: unsupported digest {other:?}"))),
            }
        };
        p_hash(hmac, secret, seed, out_len)
    }

    /// Derives the client and server `SecurityKeySet`s from a nonce pair:
    /// client set uses `secret = server_nonce, seed = client_nonce`;
    /// server set is the mirror image. Every `SecretBuffer` in
    /// `client_set`/`server_set` must already carry this policy's exact
    /// sign/crypto/IV lengths.
    pub fn derive_key_sets(
        &self,
        client_nonce: &[u8],
        server_nonce: &[u8],
        client_set: &mut SecurityKeySet,
        server_set: &mut SecurityKeySet,
    ) -> CryptoResult<()> {
        let (sign_len, crypto_len, iv_len) = self.derive_lengths()?;
        self.check_key_set_lengths(client_set, sign_len, crypto_len, iv_len)?;
        self.check_key_set_lengths(server_set, sign_len, crypto_len, iv_len)?;

        let total = sign_len + crypto_len + iv_len;
        let client_prf = self.derive_pseudo_random_data(server_nonce, client_nonce, total)?;
        let server_prf = self.derive_pseudo_random_data(client_nonce, server_nonce, total)?;

        split_key_set(&client_prf, sign_len, crypto_len, iv_len, client_set);
        split_key_set(&server_prf, sign_len, crypto_len, iv_len, server_set);
        debug!(policy = ?self.policy(), sign_len, crypto_len, iv_len, "derive_key_sets: client and server key sets derived");
        Ok(())
    }

    /// Convenience wrapper taking the client nonce as a `SecretBuffer`.
    pub fn derive_key_sets_with_client_secret(
        &self,
        client_nonce: &SecretBuffer,
        server_nonce: &[u8],
        client_set: &mut SecurityKeySet,
        server_set: &mut SecurityKeySet,
    ) -> CryptoResult<()> {
        self.derive_key_sets(&client_nonce.expose(), server_nonce, client_set, server_set)
    }

    /// Convenience wrapper taking the server nonce as a `SecretBuffer`.
    pub fn derive_key_sets_with_server_secret(
        &self,
        client_nonce: &[u8],
        server_nonce: &SecretBuffer,
        client_set: &mut SecurityKeySet,
        server_set: &mut SecurityKeySet,
    ) -> CryptoResult<()> {
        self.derive_key_sets(client_nonce, &server_nonce.expose(), client_set, server_set)
    }

    fn check_key_set_lengths(
        &self,
        set: &SecurityKeySet,
        sign_len: usize,
        crypto_len: usize,
        iv_len: usize,
    ) -> CryptoResult<()> {
        if set.sign_key.len() != sign_len || set.crypto_key.len() != crypto_len || set.iv.len() != iv_len {
            return Err(Error::invalid_parameter("derive_key_sets: a SecurityKeySet does not have this policy's exact lengths"));
        }
        Ok(())
    }
}

fn split_key_set(prf: &[u8], sign_len: usize, crypto_len: usize, iv_len: usize, out: &mut SecurityKeySet) {
    out.sign_key.fill(&prf[..sign_len]);
    out.crypto_key.fill(&prf[sign_len..sign_len + crypto_len]);
    out.iv.fill(&prf[sign_len + crypto_len..sign_len + crypto_len + iv_len]);
}

fn bits_to_bytes(bits: u32) -> usize {
    ((bits as usize) + 7) / 8
}

fn ceil_div(a: usize, b: usize) -> CryptoResult<usize> {
    if b == 0 {
        return Err(Error::not_ok("ceil_div: division by zero"));
    }
    a.checked_add(b - 1)
        .map(|sum| sum / b)
        .ok_or_else(|| Error::not_ok("ceil_div: numerator overflowed"))
}

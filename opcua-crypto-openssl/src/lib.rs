// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The OpenSSL implementation of [`opcua_crypto_core::CryptoBackend`].
//! Grounded in the original's mbedtls-backed `crypto_functions_lib.c` /
//! `key_manager_lib.c` / `pki_stack.c`, reimplemented against `openssl`
//! the way `cryptography-openssl`'s `OsslContext` wraps FFI calls (error
//! conversion via `ErrorStack`, foreign-type ownership via `PKey`/`X509`).

use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private, Public};
use openssl::pkey_ctx::PkeyCtx;
use openssl::rsa::Padding;
use openssl::sign::Signer;
use openssl::symm::{Cipher, Crypter, Mode};
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509StoreContext;
use openssl::x509::X509;

use opcua_crypto_core::{ChainValidationProfile, CryptoBackend, CryptoResult, DigestKind, Error};

/// Zero-sized handle; all state lives in OpenSSL's own global/thread-local
/// machinery (its default `RAND_bytes` entropy source in particular), so
/// there is nothing for this type itself to own.
#[derive(Default)]
pub struct OpensslBackend;

fn openssl_err(context: &str, e: openssl::error::ErrorStack) -> Error {
    Error::not_ok_with_source(context, e)
}

fn message_digest(kind: DigestKind) -> MessageDigest {
    match kind {
        DigestKind::Sha1 => MessageDigest::sha1(),
        DigestKind::Sha256 => MessageDigest::sha256(),
        DigestKind::Sha384 => MessageDigest::sha384(),
        DigestKind::Sha512 => MessageDigest::sha512(),
    }
}

fn digest_kind_from_nid(nid: Nid) -> CryptoResult<DigestKind> {
    match nid {
        Nid::SHA1 | Nid::SHA1WITHRSAENCRYPTION => Ok(DigestKind::Sha1),
        Nid::SHA256 | Nid::SHA256WITHRSAENCRYPTION => Ok(DigestKind::Sha256),
        Nid::SHA384 | Nid::SHA384WITHRSAENCRYPTION => Ok(DigestKind::Sha384),
        Nid::SHA512 | Nid::SHA512WITHRSAENCRYPTION => Ok(DigestKind::Sha512),
        other => Err(Error::not_ok(format!("unsupported certificate signature algorithm NID {other:?}"))),
    }
}

fn aes256_cbc_crypt(mode: Mode, data: &[u8], key: &[u8], iv: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Cipher::aes_256_cbc();
    let mut crypter =
        Crypter::new(cipher, mode, key, Some(iv)).map_err(|e| openssl_err("aes256_cbc: init", e))?;
    // The wire framing supplies pre-aligned, pre-padded blocks; the core
    // never wants PKCS7 padding added or stripped underneath it.
    crypter.pad(false);

    let mut out = vec![0u8; data.len() + cipher.block_size()];
    let mut written = crypter
        .update(data, &mut out)
        .map_err(|e| openssl_err("aes256_cbc: update", e))?;
    written += crypter
        .finalize(&mut out[written..])
        .map_err(|e| openssl_err("aes256_cbc: finalize", e))?;
    out.truncate(written);
    Ok(out)
}

fn hmac(md: MessageDigest, key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>> {
    let pkey = PKey::hmac(key).map_err(|e| openssl_err("hmac: key", e))?;
    let mut signer = Signer::new(md, &pkey).map_err(|e| openssl_err("hmac: signer", e))?;
    signer.update(data).map_err(|e| openssl_err("hmac: update", e))?;
    signer.sign_to_vec().map_err(|e| openssl_err("hmac: finalize", e))
}

impl CryptoBackend for OpensslBackend {
    type PrivateKey = PKey<Private>;
    type PublicKey = PKey<Public>;
    type Certificate = X509;

    fn fill_random(&self, buf: &mut [u8]) -> CryptoResult<()> {
        openssl::rand::rand_bytes(buf).map_err(|e| openssl_err("fill_random", e))
    }

    fn aes256_cbc_encrypt(&self, plain: &[u8], key: &[u8], iv: &[u8]) -> CryptoResult<Vec<u8>> {
        aes256_cbc_crypt(Mode::Encrypt, plain, key, iv)
    }

    fn aes256_cbc_decrypt(&self, cipher: &[u8], key: &[u8], iv: &[u8]) -> CryptoResult<Vec<u8>> {
        aes256_cbc_crypt(Mode::Decrypt, cipher, key, iv)
    }

    fn hmac_sha1(&self, key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>> {
        hmac(MessageDigest::sha1(), key, data)
    }

    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>> {
        hmac(MessageDigest::sha256(), key, data)
    }

    fn digest(&self, kind: DigestKind, data: &[u8]) -> CryptoResult<Vec<u8>> {
        openssl::hash::hash(message_digest(kind), data)
            .map(|bytes| bytes.to_vec())
            .map_err(|e| openssl_err("digest", e))
    }

    fn rsa_oaep_sha1_encrypt(&self, plain: &[u8], key: &Self::PublicKey) -> CryptoResult<Vec<u8>> {
        let rsa = key.rsa().map_err(|e| openssl_err("rsa_oaep_sha1_encrypt: not an RSA key", e))?;
        let mut out = vec![0u8; rsa.size() as usize];
        let written = rsa
            .public_encrypt(plain, &mut out, Padding::PKCS1_OAEP)
            .map_err(|e| openssl_err("rsa_oaep_sha1_encrypt", e))?;
        out.truncate(written);
        Ok(out)
    }

    fn rsa_oaep_sha1_decrypt(&self, cipher: &[u8], key: &Self::PrivateKey) -> CryptoResult<Vec<u8>> {
        let rsa = key.rsa().map_err(|e| openssl_err("rsa_oaep_sha1_decrypt: not an RSA key", e))?;
        let mut out = vec![0u8; rsa.size() as usize];
        let written = rsa
            .private_decrypt(cipher, &mut out, Padding::PKCS1_OAEP)
            .map_err(|e| openssl_err("rsa_oaep_sha1_decrypt", e))?;
        out.truncate(written);
        Ok(out)
    }

    fn rsa_pkcs1_sign(
        &self,
        digest_kind: DigestKind,
        digest: &[u8],
        key: &Self::PrivateKey,
    ) -> CryptoResult<Vec<u8>> {
        let mut ctx = PkeyCtx::new(key).map_err(|e| openssl_err("rsa_pkcs1_sign: ctx", e))?;
        ctx.sign_init().map_err(|e| openssl_err("rsa_pkcs1_sign: init", e))?;
        ctx.set_signature_md(message_digest(digest_kind))
            .map_err(|e| openssl_err("rsa_pkcs1_sign: set digest", e))?;
        ctx.set_rsa_padding(Padding::PKCS1)
            .map_err(|e| openssl_err("rsa_pkcs1_sign: set padding", e))?;

        let len = ctx
            .sign(digest, None)
            .map_err(|e| openssl_err("rsa_pkcs1_sign: size query", e))?;
        let mut sig = vec![0u8; len];
        let written = ctx
            .sign(digest, Some(&mut sig))
            .map_err(|e| openssl_err("rsa_pkcs1_sign", e))?;
        sig.truncate(written);
        Ok(sig)
    }

    fn rsa_pkcs1_verify(
        &self,
        digest_kind: DigestKind,
        digest: &[u8],
        signature: &[u8],
        key: &Self::PublicKey,
    ) -> CryptoResult<bool> {
        let mut ctx = PkeyCtx::new(key).map_err(|e| openssl_err("rsa_pkcs1_verify: ctx", e))?;
        ctx.verify_init().map_err(|e| openssl_err("rsa_pkcs1_verify: init", e))?;
        ctx.set_signature_md(message_digest(digest_kind))
            .map_err(|e| openssl_err("rsa_pkcs1_verify: set digest", e))?;
        ctx.set_rsa_padding(Padding::PKCS1)
            .map_err(|e| openssl_err("rsa_pkcs1_verify: set padding", e))?;

        // A mismatched signature surfaces as either `Ok(false)` or an
        // `ErrorStack` depending on OpenSSL version; both mean "not ok",
        // never "the precondition was violated".
        Ok(ctx.verify(digest, signature).unwrap_or(false))
    }

    fn private_key_from_der(&self, der: &[u8]) -> CryptoResult<Self::PrivateKey> {
        PKey::private_key_from_der(der).map_err(|e| openssl_err("private_key_from_der", e))
    }

    fn private_key_from_pem(&self, pem: &[u8], password: Option<&[u8]>) -> CryptoResult<Self::PrivateKey> {
        match password {
            Some(pw) => PKey::private_key_from_pem_passphrase(pem, pw),
            Option::None => PKey::private_key_from_pem(pem),
        }
        .map_err(|e| openssl_err("private_key_from_pem", e))
    }

    fn private_key_to_der(&self, key: &Self::PrivateKey) -> CryptoResult<Vec<u8>> {
        key.private_key_to_der().map_err(|e| openssl_err("private_key_to_der", e))
    }

    fn private_key_is_rsa(&self, key: &Self::PrivateKey) -> bool {
        key.rsa().is_ok()
    }

    fn private_key_bit_length(&self, key: &Self::PrivateKey) -> CryptoResult<u32> {
        Ok(key.bits())
    }

    fn public_key_is_rsa(&self, key: &Self::PublicKey) -> bool {
        key.rsa().is_ok()
    }

    fn public_key_bit_length(&self, key: &Self::PublicKey) -> CryptoResult<u32> {
        Ok(key.bits())
    }

    fn public_key_from_private(&self, key: &Self::PrivateKey) -> CryptoResult<Self::PublicKey> {
        let der = key.public_key_to_der().map_err(|e| openssl_err("public_key_from_private: encode", e))?;
        PKey::public_key_from_der(&der).map_err(|e| openssl_err("public_key_from_private: decode", e))
    }

    fn certificate_from_der(&self, der: &[u8]) -> CryptoResult<Self::Certificate> {
        X509::from_der(der).map_err(|e| openssl_err("certificate_from_der", e))
    }

    fn certificate_to_der(&self, cert: &Self::Certificate) -> CryptoResult<Vec<u8>> {
        cert.to_der().map_err(|e| openssl_err("certificate_to_der", e))
    }

    fn certificate_public_key(&self, cert: &Self::Certificate) -> CryptoResult<Self::PublicKey> {
        cert.public_key().map_err(|e| openssl_err("certificate_public_key", e))
    }

    fn certificate_signature_digest(&self, cert: &Self::Certificate) -> CryptoResult<DigestKind> {
        digest_kind_from_nid(cert.signature_algorithm().object().nid())
    }

    fn verify_chain(
        &self,
        leaf: &Self::Certificate,
        ca: &Self::Certificate,
        crl_der: Option<&[u8]>,
        profile: &ChainValidationProfile,
    ) -> CryptoResult<()> {
        let mut store_builder =
            X509StoreBuilder::new().map_err(|e| openssl_err("verify_chain: store", e))?;
        store_builder
            .add_cert(ca.clone())
            .map_err(|e| openssl_err("verify_chain: add CA", e))?;
        if let Some(crl) = crl_der {
            let crl = openssl::x509::X509Crl::from_der(crl)
                .map_err(|e| openssl_err("verify_chain: parse CRL", e))?;
            store_builder
                .add_crl(crl)
                .map_err(|e| openssl_err("verify_chain: add CRL", e))?;
            store_builder
                .set_flags(openssl::x509::verify::X509VerifyFlags::CRL_CHECK)
                .map_err(|e| openssl_err("verify_chain: set CRL flag", e))?;
        }
        let store = store_builder.build();

        let chain = openssl::stack::Stack::new().map_err(|e| openssl_err("verify_chain: chain stack", e))?;
        let mut store_ctx = X509StoreContext::new().map_err(|e| openssl_err("verify_chain: ctx", e))?;
        let passed = store_ctx
            .init(&store, leaf, &chain, |c| c.verify_cert())
            .map_err(|e| openssl_err("verify_chain: init", e))?;
        if !passed {
            return Err(Error::not_ok("verify_chain: chain verification failed"));
        }

        let leaf_digest = digest_kind_from_nid(leaf.signature_algorithm().object().nid())?;
        if !profile.allowed_digests.contains(&leaf_digest) {
            return Err(Error::not_ok(format!(
                "verify_chain: leaf certificate signed with disallowed digest {leaf_digest:?}"
            )));
        }

        let public = self.certificate_public_key(leaf)?;
        if self.public_key_is_rsa(&public) {
            let bits = self.public_key_bit_length(&public)?;
            if bits < profile.rsa_min_bits {
                return Err(Error::not_ok(format!(
                    "verify_chain: leaf RSA key is {bits} bits, below the minimum of {} bits",
                    profile.rsa_min_bits
                )));
            }
        }

        Ok(())
    }
}

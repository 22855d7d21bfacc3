// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Loads and owns asymmetric keys and certificates, in DER/PEM, from
//! memory or file. Grounded in `sopc_key_manager.c`/`key_manager_lib.c`.
//!
//! The original's `isBorrowedFromCert` flag on `SOPC_AsymmetricKey` is a
//! lifetime problem wearing a runtime-checked disguise (REDESIGN FLAGS):
//! here it is a tagged variant whose `Borrowed` arm carries a real
//! `&'cert Certificate<B>`, so the borrow checker — not a flag inspected
//! at `free()` time — is what prevents a borrowed key from outliving its
//! certificate.

use std::fs;
use std::path::Path;

use crate::backend::CryptoBackend;
use crate::error::{CryptoResult, Error};

/// An X.509 certificate, owning the backend-native object plus a cached
/// copy of its canonical DER encoding.
pub struct Certificate<B: CryptoBackend> {
    native: B::Certificate,
    der: Vec<u8>,
}

impl<B: CryptoBackend> Certificate<B> {
    pub fn from_der(backend: &B, der: &[u8]) -> CryptoResult<Self> {
        if der.is_empty() {
            return Err(Error::invalid_parameter("certificate DER buffer must not be empty"));
        }
        let native = backend.certificate_from_der(der)?;
        let der = backend.certificate_to_der(&native)?;
        Ok(Certificate { native, der })
    }

    pub fn from_file(backend: &B, path: impl AsRef<Path>) -> CryptoResult<Self> {
        let bytes = fs::read(path.as_ref())
            .map_err(|e| Error::not_ok_with_source("reading certificate file", e))?;
        Self::from_der(backend, &bytes)
    }

    /// A fresh copy of the certificate's canonical DER encoding.
    pub fn copy_der(&self) -> Vec<u8> {
        self.der.clone()
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn native(&self) -> &B::Certificate {
        &self.native
    }
}

/// An RSA key, either independently owned (loaded from a buffer, file, or
/// generated) or borrowed from a [`Certificate`]'s public key. A borrowed
/// key cannot outlive the certificate it came from — the borrow checker
/// enforces the lifetime rule spec §3 calls out explicitly.
pub enum AsymmetricKey<'cert, B: CryptoBackend> {
    Owned(B::PrivateKey),
    Borrowed { cert: &'cert Certificate<B>, public: B::PublicKey },
}

impl<'cert, B: CryptoBackend> AsymmetricKey<'cert, B> {
    pub fn is_borrowed(&self) -> bool {
        matches!(self, AsymmetricKey::Borrowed { .. })
    }

    /// The key's bit length, as read from the backend.
    pub fn bit_length(&self, backend: &B) -> CryptoResult<u32> {
        match self {
            AsymmetricKey::Owned(k) => backend.private_key_bit_length(k),
            AsymmetricKey::Borrowed { public, .. } => backend.public_key_bit_length(public),
        }
    }

    pub fn is_rsa(&self, backend: &B) -> bool {
        match self {
            AsymmetricKey::Owned(k) => backend.private_key_is_rsa(k),
            AsymmetricKey::Borrowed { public, .. } => backend.public_key_is_rsa(public),
        }
    }

    /// The public half of this key, derived fresh from the private key
    /// for an owned key, or the cached public key for a borrowed one.
    pub fn public_key(&self, backend: &B) -> CryptoResult<B::PublicKey> {
        match self {
            AsymmetricKey::Owned(k) => backend.public_key_from_private(k),
            AsymmetricKey::Borrowed { public, .. } => Ok(public.clone()),
        }
    }

    pub fn private(&self) -> CryptoResult<&B::PrivateKey> {
        match self {
            AsymmetricKey::Owned(k) => Ok(k),
            AsymmetricKey::Borrowed { .. } => {
                Err(Error::invalid_parameter("key borrowed from a certificate has no private component"))
            }
        }
    }
}

/// Loads and owns asymmetric keys and certificates; thin stateless façade
/// over a `CryptoBackend`, grounded in `sopc_key_manager.c`.
pub struct KeyManager<'b, B: CryptoBackend> {
    backend: &'b B,
}

impl<'b, B: CryptoBackend> KeyManager<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        KeyManager { backend }
    }

    pub fn create_asymmetric_key_from_buffer<'cert>(
        &self,
        buffer: &[u8],
    ) -> CryptoResult<AsymmetricKey<'cert, B>> {
        if buffer.is_empty() {
            return Err(Error::invalid_parameter("key buffer must not be empty"));
        }
        // Backend parses DER or PEM transparently, same contract as
        // `mbedtls_pk_parse_key`.
        let key = self.backend.private_key_from_der(buffer).or_else(|_| {
            self.backend.private_key_from_pem(buffer, Option::None)
        })?;
        Ok(AsymmetricKey::Owned(key))
    }

    /// `password`, when present, must not contain an embedded NUL byte —
    /// the Rust-native analogue of spec §3's C NUL-termination-length
    /// check (`password[lenPassword] == '\0'`): a slice with an embedded
    /// NUL means the caller's declared length and the string's real end
    /// disagree.
    pub fn create_asymmetric_key_from_file<'cert>(
        &self,
        path: impl AsRef<Path>,
        password: Option<&[u8]>,
    ) -> CryptoResult<AsymmetricKey<'cert, B>> {
        if let Some(pw) = password {
            if pw.is_empty() || pw.contains(&0u8) {
                return Err(Error::invalid_parameter(
                    "password must be non-empty and must not contain an embedded NUL byte",
                ));
            }
        }

        let bytes = fs::read(path.as_ref())
            .map_err(|e| Error::not_ok_with_source("reading private key file", e))?;
        let key = self
            .backend
            .private_key_from_pem(&bytes, password)
            .or_else(|_| self.backend.private_key_from_der(&bytes))?;
        Ok(AsymmetricKey::Owned(key))
    }

    pub fn create_asymmetric_key_from_certificate<'cert>(
        &self,
        cert: &'cert Certificate<B>,
    ) -> CryptoResult<AsymmetricKey<'cert, B>> {
        let public = self.backend.certificate_public_key(cert.native())?;
        Ok(AsymmetricKey::Borrowed { cert, public })
    }

    /// Encodes an owned private key to DER. Mirrors
    /// `SOPC_KeyManager_AsymmetricKey_ToDER`'s "the backend's encoder
    /// writes from the tail of a scratch buffer" contract at the backend
    /// layer; here the backend already returns the exact encoded bytes,
    /// so there is no scratch-tail copy to perform at this layer.
    pub fn write_key_to_der(&self, key: &AsymmetricKey<'_, B>) -> CryptoResult<Vec<u8>> {
        let private = key.private()?;
        self.backend.private_key_to_der(private)
    }

    pub fn create_certificate_from_der(&self, der: &[u8]) -> CryptoResult<Certificate<B>> {
        Certificate::from_der(self.backend, der)
    }

    pub fn create_certificate_from_file(&self, path: impl AsRef<Path>) -> CryptoResult<Certificate<B>> {
        Certificate::from_file(self.backend, path)
    }

    pub fn copy_certificate_der(&self, cert: &Certificate<B>) -> Vec<u8> {
        cert.copy_der()
    }

    pub fn get_certificate_public_key<'cert>(
        &self,
        cert: &'cert Certificate<B>,
    ) -> CryptoResult<AsymmetricKey<'cert, B>> {
        self.create_asymmetric_key_from_certificate(cert)
    }
}

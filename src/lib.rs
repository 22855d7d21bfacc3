// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Cryptographic service provider core for an OPC UA secure channel.
//!
//! This crate is the consumable façade over [`opcua_crypto_core`]
//! specialized to the [`opcua_crypto_openssl`] backend — the only
//! backend this workspace ships. Callers who want to swap backends (an
//! mbedtls or BoringSSL implementation, say) depend on
//! `opcua-crypto-core` directly and supply their own
//! [`opcua_crypto_core::CryptoBackend`].

pub use opcua_crypto_core::{
    ChainValidationProfile, CryptoResult, DigestKind, Error, ErrorKind, Policy, SecurityKeySet,
    SecurityProfile,
};
pub use opcua_crypto_openssl::OpensslBackend;

/// A `CryptoProvider` bound to the OpenSSL backend — the type most
/// callers of this crate construct and use directly.
pub type CryptoProvider<'b> = opcua_crypto_core::CryptoProvider<'b, OpensslBackend>;

/// An `AsymmetricKey` bound to the OpenSSL backend.
pub type AsymmetricKey<'cert> = opcua_crypto_core::AsymmetricKey<'cert, OpensslBackend>;

/// A `Certificate` bound to the OpenSSL backend.
pub type Certificate = opcua_crypto_core::Certificate<OpensslBackend>;

/// A `KeyManager` bound to the OpenSSL backend.
pub type KeyManager<'b> = opcua_crypto_core::KeyManager<'b, OpensslBackend>;

/// A `PKIProvider` bound to the OpenSSL backend.
pub type PKIProvider<'b, 'ca> = opcua_crypto_core::PKIProvider<'b, 'ca, OpensslBackend>;

pub use opcua_crypto_core::{ExposedBuffer, SecretBuffer};

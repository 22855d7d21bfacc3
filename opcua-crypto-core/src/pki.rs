// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Validates a certificate chain against a trusted CA plus an optional
//! revocation list, under a policy-independent minimum profile. Grounded
//! in `pki_stack.c`'s `PKIProviderStack_ValidateCertificate`.

use crate::backend::{ChainValidationProfile, CryptoBackend};
use crate::error::CryptoResult;
use crate::keys::Certificate;

/// Holds a reference to the trusted CA certificate (and optional CRL) a
/// chain is checked against. The CA must outlive the `PKIProvider`; spec
/// §4.9 states this as a caller obligation, here the borrow checker
/// enforces it the same way [`crate::keys::AsymmetricKey::Borrowed`] ties
/// a borrowed key to its certificate.
pub struct PKIProvider<'b, 'ca, B: CryptoBackend> {
    backend: &'b B,
    ca: &'ca Certificate<B>,
    crl_der: Option<Vec<u8>>,
    profile: ChainValidationProfile,
}

impl<'b, 'ca, B: CryptoBackend> PKIProvider<'b, 'ca, B> {
    /// Uses the default minimum validation profile (spec §4.9: SHA-256,
    /// SHA-384 or SHA-512 signing hash, RSA keys at least 2048 bits, any
    /// other public-key algorithm or named curve accepted unconditionally).
    pub fn create(backend: &'b B, ca: &'ca Certificate<B>, crl_der: Option<&[u8]>) -> Self {
        PKIProvider {
            backend,
            ca,
            crl_der: crl_der.map(|c| c.to_vec()),
            profile: ChainValidationProfile::default(),
        }
    }

    /// Overrides the default minimum profile; not part of spec §4.9's
    /// baseline API but kept available for callers that need a stricter
    /// floor than SHA-256/RSA-2048 without forking the validator.
    pub fn with_profile(mut self, profile: ChainValidationProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Delegates to the backend's chain verifier. Returns ok on pass,
    /// not-ok on any failure — the backend's failure-reason bitmask, if
    /// any, is not surfaced, matching the baseline implementation spec
    /// §4.9 describes.
    pub fn validate_certificate(&self, cert: &Certificate<B>) -> CryptoResult<()> {
        self.backend.verify_chain(
            cert.native(),
            self.ca.native(),
            self.crl_der.as_deref(),
            &self.profile,
        )
    }
}

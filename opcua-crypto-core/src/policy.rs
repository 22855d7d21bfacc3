// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The closed set of OPC UA security policies this core supports, and the
//! URI <-> policy lookup. Grounded in `sopc_crypto_profiles.h`'s
//! `SOPC_SecurityPolicy_*_URI` / `*_ID` constants: ids are stable, small,
//! and intentionally not in declaration order (`None` is the highest id).

/// A supported (or absent) OPC UA security policy.
///
/// The discriminants are part of the wire-adjacent contract inherited from
/// the original stack and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Policy {
    Invalid = 0,
    Basic256Sha256 = 1,
    Basic256 = 2,
    None = 3,
}

pub const BASIC256SHA256_URI: &str = "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256";
pub const BASIC256_URI: &str = "http://opcfoundation.org/UA/SecurityPolicy#Basic256";
pub const NONE_URI: &str = "http://opcfoundation.org/UA/SecurityPolicy#None";

impl Policy {
    /// Case-insensitive, full-string lookup. A prefix match (e.g. a
    /// request for `...Basic256Sha256` matching the `...Basic256` entry)
    /// must never succeed, so this compares the whole string rather than
    /// scanning for a prefix.
    pub fn from_uri(uri: &str) -> Option<Policy> {
        if uri.eq_ignore_ascii_case(BASIC256SHA256_URI) {
            Some(Policy::Basic256Sha256)
        } else if uri.eq_ignore_ascii_case(BASIC256_URI) {
            Some(Policy::Basic256)
        } else if uri.eq_ignore_ascii_case(NONE_URI) {
            Some(Policy::None)
        } else {
            None
        }
    }

    pub fn uri(self) -> Option<&'static str> {
        match self {
            Policy::Basic256Sha256 => Some(BASIC256SHA256_URI),
            Policy::Basic256 => Some(BASIC256_URI),
            Policy::None => Some(NONE_URI),
            Policy::Invalid => Option::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_the_three_policies() {
        assert_eq!(Policy::from_uri(BASIC256SHA256_URI), Some(Policy::Basic256Sha256));
        assert_eq!(Policy::from_uri(BASIC256_URI), Some(Policy::Basic256));
        assert_eq!(Policy::from_uri(NONE_URI), Some(Policy::None));
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(
            Policy::from_uri(&BASIC256SHA256_URI.to_uppercase()),
            Some(Policy::Basic256Sha256)
        );
    }

    #[test]
    fn rejects_unknown_uri() {
        assert_eq!(Policy::from_uri("http://example.com/bogus"), Option::None);
    }

    #[test]
    fn prefix_does_not_match() {
        // A request for Basic256Sha256 must not resolve against the Basic256 entry,
        // and vice versa, even though one URI is a prefix of the other.
        assert_eq!(Policy::from_uri(BASIC256_URI).unwrap().uri(), Some(BASIC256_URI));
        assert_ne!(
            Policy::from_uri(BASIC256_URI),
            Policy::from_uri(BASIC256SHA256_URI)
        );
        assert_eq!(Policy::from_uri("http://opcfoundation.org/UA/SecurityPolicy#Basic256X"), Option::None);
    }
}

// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

use crate::secret::SecretBuffer;

/// Sign-key, encryption-key and IV triple for one direction of a secure
/// channel. Client and server each own one set.
pub struct SecurityKeySet {
    pub sign_key: SecretBuffer,
    pub crypto_key: SecretBuffer,
    pub iv: SecretBuffer,
}

impl SecurityKeySet {
    /// Allocates a zeroed key set of the given lengths, ready to be
    /// written into by [`crate::derive::derive_key_sets`].
    pub fn zeroed(sign_key_len: usize, crypto_key_len: usize, iv_len: usize) -> Self {
        SecurityKeySet {
            sign_key: SecretBuffer::zeroed(sign_key_len),
            crypto_key: SecretBuffer::zeroed(crypto_key_len),
            iv: SecretBuffer::zeroed(iv_len),
        }
    }
}

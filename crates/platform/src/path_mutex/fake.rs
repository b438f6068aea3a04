// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `PathMutexHost` for runtime tests: a shared registry of held
//! names so multiple fake hosts (standing in for separate processes) can
//! contend over the same `MutexName`, mirroring spec.md §8's "Lock in a
//! second process returns false" property.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{PathMutexError, PathMutexHost};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use winss_core::MutexName;

#[derive(Clone, Default)]
pub struct FakePathMutexHost {
    registry: Arc<Mutex<HashSet<String>>>,
    owned: Arc<Mutex<HashSet<String>>>,
}

impl FakePathMutexHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A second handle over the same shared registry, standing in for a
    /// competing process — it starts with no locks of its own.
    pub fn contender(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            owned: Arc::default(),
        }
    }
}

#[async_trait]
impl PathMutexHost for FakePathMutexHost {
    async fn lock(&self, name: &MutexName) -> Result<bool, PathMutexError> {
        if self.owned.lock().contains(name.as_str()) {
            return Ok(true);
        }
        let mut registry = self.registry.lock();
        if registry.contains(name.as_str()) {
            return Ok(false);
        }
        registry.insert(name.as_str().to_string());
        self.owned.lock().insert(name.as_str().to_string());
        Ok(true)
    }

    async fn can_lock(&self, name: &MutexName) -> Result<bool, PathMutexError> {
        if self.owned.lock().contains(name.as_str()) {
            return Ok(true);
        }
        Ok(!self.registry.lock().contains(name.as_str()))
    }

    async fn has_lock(&self, name: &MutexName) -> bool {
        self.owned.lock().contains(name.as_str())
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-session serialization of inbound events.
//!
//! Events for one session run one at a time, each to completion, under that session's lock.
//! Different sessions proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::engine::ConversationEngine;
use crate::model::{Session, SessionId};
use crate::ops::{apply_op, recover_from_domain_error, Op, OpError, OpOutcome};
use crate::source::CaptureSource;
use crate::store::{CaptureStore, StoreError};

/// One async mutex per session, created on first use and dropped once nobody holds or
/// waits for it.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, session_id: &SessionId) -> Arc<tokio::sync::Mutex<()>> {
        // The map only hands out clones, a panic elsewhere cannot leave it half-updated.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(session_id.clone()).or_default().clone()
    }

    /// Waits for the session's lock. The entry is pruned when the guard drops.
    pub async fn acquire(&self, session_id: &SessionId) -> SessionGuard<'_> {
        let guard = self.lock_for(session_id).lock_owned().await;
        SessionGuard { locks: self, session_id: session_id.clone(), guard: Some(guard) }
    }

    /// Removes the entry unless a clone is still out; clones are only made under the map lock.
    fn prune(&self, session_id: &SessionId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(session_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(session_id);
        }
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds one session's lock.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    session_id: SessionId,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.prune(&self.session_id);
    }
}

/// Entry point for inbound events: loads the session, applies the op, recovers from
/// user-facing failures.
pub struct ConversationService {
    store: Arc<dyn CaptureStore>,
    source: Arc<dyn CaptureSource>,
    locks: SessionLocks,
}

impl ConversationService {
    pub fn new(store: Arc<dyn CaptureStore>, source: Arc<dyn CaptureSource>) -> Self {
        Self { store, source, locks: SessionLocks::new() }
    }

    pub fn store(&self) -> &Arc<dyn CaptureStore> {
        &self.store
    }

    /// Applies `op` to the session.
    ///
    /// A [`DomainError`](crate::source::DomainError) is not returned: the failed op's staged
    /// writes are dropped and the session is parked in an error state instead, with the
    /// message in [`OpOutcome::notice`].
    pub async fn apply(&self, session_id: &SessionId, op: &Op) -> Result<OpOutcome, OpError> {
        let _guard = self.locks.acquire(session_id).await;

        let result = {
            let mut engine = ConversationEngine::load(self.store.as_ref(), session_id)?;
            apply_op(&mut engine, self.source.as_ref(), op)
        };

        match result {
            Err(OpError::Domain(err)) => {
                debug!(session = %session_id, op = %op.kind(), "recovering from domain error");
                let mut engine = ConversationEngine::load(self.store.as_ref(), session_id)?;
                Ok(recover_from_domain_error(&mut engine, &err)?)
            }
            other => other,
        }
    }

    /// Current record of a session, waiting for any event in flight.
    pub async fn read(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        let _guard = self.locks.acquire(session_id).await;
        self.store.load(session_id)
    }

    pub fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        self.store.list()
    }

    /// Drops the session record. Returns whether one existed.
    pub async fn remove(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        let _guard = self.locks.acquire(session_id).await;
        self.store.remove(session_id)
    }
}

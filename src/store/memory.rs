// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::model::{Session, SessionId};

use super::{CaptureStore, StoreError};

/// Process-local store, used by `--memory` and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<BTreeMap<SessionId, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaptureStore for MemoryStore {
    fn load(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        let sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions.get(session_id).cloned().unwrap_or_else(|| Session::new(session_id.clone())))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        sessions.insert(session.session_id().clone(), session.clone());
        Ok(())
    }

    fn remove(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions.remove(session_id).is_some())
    }

    fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        let sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions.keys().cloned().collect())
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::data::{SessionData, SessionFlag, StoreKey};
use super::ids::SessionId;
use super::state::StateName;

/// One conversation: its current state plus the persisted data mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    session_id: SessionId,
    state: StateName,
    data: SessionData,
}

impl Session {
    /// A fresh session waiting for its first media item.
    pub fn new(session_id: SessionId) -> Self {
        Self::from_parts(session_id, StateName::WaitingForInput, SessionData::new())
    }

    pub fn from_parts(session_id: SessionId, state: StateName, data: SessionData) -> Self {
        Self { session_id, state, data }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> StateName {
        self.state
    }

    pub fn set_state(&mut self, state: StateName) {
        self.state = state;
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut SessionData {
        &mut self.data
    }

    pub fn set_data(&mut self, data: SessionData) {
        self.data = data;
    }

    pub fn flag(&self, flag: SessionFlag) -> bool {
        self.data
            .get(&StoreKey::Flag(flag))
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    pub fn into_parts(self) -> (SessionId, StateName, SessionData) {
        (self.session_id, self.state, self.data)
    }
}

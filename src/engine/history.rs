// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The ordered record of visited capture-producing states.
//!
//! History lives in the session data under `history`; [`HistoryManager`] only owns the
//! *reference pointer*, the entry an undo is about to return to. The pointer is never cached
//! across history changes: recording clears it, undoing re-derives it as the new top.

use tracing::{debug, warn};

use crate::model::{Capture, StateKey, StateName, StoreKey, StoreValue};

use super::edit_version::EditVersionCounter;
use super::error::EngineError;
use super::staging::Workspace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryManager {
    reference: Option<StateKey>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference(&self) -> Option<&StateKey> {
        self.reference.as_ref()
    }

    /// Number of recorded entries, as seen through the workspace.
    pub fn completed_steps(&self, workspace: &Workspace) -> Result<usize, EngineError> {
        Ok(workspace.history()?.map_or(0, <[StateKey]>::len))
    }

    /// Starts history with the (possibly versioned) `current` state as its only entry.
    pub fn start_history(
        &mut self,
        workspace: &mut Workspace,
        current: StateName,
    ) -> Result<StateKey, EngineError> {
        if workspace.history()?.is_some() {
            return Err(EngineError::HistoryAlreadyStarted);
        }

        let entry = EditVersionCounter::versioned_name(current, &[]);
        workspace.stage(StoreKey::History, StoreValue::History(vec![entry.clone()]));
        self.reference = None;
        debug!(%entry, "history started");
        Ok(entry)
    }

    /// Appends the (possibly versioned) `current` state and returns the appended entry.
    pub fn record_transition(
        &mut self,
        workspace: &mut Workspace,
        current: StateName,
    ) -> Result<StateKey, EngineError> {
        let mut history = workspace.history()?.ok_or(EngineError::MissingHistory)?.to_vec();
        let entry = EditVersionCounter::versioned_name(current, &history);
        history.push(entry.clone());

        debug!(%entry, steps = history.len(), "transition recorded");
        workspace.stage(StoreKey::History, StoreValue::History(history));
        self.reference = None;
        Ok(entry)
    }

    /// Drops the last entry and returns it. The reference moves to the new top.
    pub fn undo_last_transition(
        &mut self,
        workspace: &mut Workspace,
    ) -> Result<StateKey, EngineError> {
        let mut history = workspace.history()?.ok_or(EngineError::MissingHistory)?.to_vec();
        let Some(removed) = history.pop() else {
            return Err(EngineError::HistoryTooShort { len: 0, required: 1 });
        };

        self.reference = history.last().cloned();
        debug!(%removed, steps = history.len(), "transition undone");
        workspace.stage(StoreKey::History, StoreValue::History(history));
        Ok(removed)
    }

    /// Points the reference at the second-to-last entry.
    pub fn point_to_second_last(&mut self, workspace: &Workspace) -> Result<StateKey, EngineError> {
        let history = workspace.history()?.ok_or(EngineError::MissingHistory)?;
        let len = history.len();
        if len < 2 {
            warn!(len, "cannot step back, history too short");
            return Err(EngineError::HistoryTooShort { len, required: 2 });
        }

        let entry = history[len - 2].clone();
        self.reference = Some(entry.clone());
        Ok(entry)
    }

    /// The referenced entry, resolving it to the second-to-last one when unset.
    pub fn resolve_reference(&mut self, workspace: &Workspace) -> Result<StateKey, EngineError> {
        match &self.reference {
            Some(entry) => Ok(entry.clone()),
            None => self.point_to_second_last(workspace),
        }
    }

    /// Capture snapshot stored under the referenced entry.
    pub fn previous_capture(&mut self, workspace: &Workspace) -> Result<Capture, EngineError> {
        let entry = self.resolve_reference(workspace)?;
        match workspace.snapshot(&entry)? {
            Some(snapshot) => Ok(snapshot.capture().clone()),
            None => {
                warn!(%entry, "history entry has no snapshot");
                Err(EngineError::MissingSnapshot { key: entry })
            }
        }
    }

    pub fn is_at_forced_redirect_leaf(&self) -> bool {
        self.reference.as_ref().is_some_and(|entry| entry.state().is_forced_redirect_leaf())
    }
}

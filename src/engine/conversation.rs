// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::{debug, info};

use crate::model::{
    Capture, FilterRecord, MenuKind, RawEvidence, Session, SessionFlag, SessionId, Snapshot,
    StateKey, StateName, StoreKey, StoreValue,
};
use crate::store::CaptureStore;

use super::edit_version::EditVersionCounter;
use super::error::EngineError;
use super::history::HistoryManager;
use super::staging::Workspace;

/// Per-event view of one session.
///
/// Load it at the start of an event, stage writes, then [`commit`](Self::commit). Dropping the
/// engine without committing discards everything staged, including a pending state change.
pub struct ConversationEngine<'a> {
    store: &'a dyn CaptureStore,
    session_id: SessionId,
    state: StateName,
    workspace: Workspace,
    history: HistoryManager,
}

impl<'a> ConversationEngine<'a> {
    pub fn load(store: &'a dyn CaptureStore, session_id: &SessionId) -> Result<Self, EngineError> {
        let (session_id, state, data) = store.load(session_id)?.into_parts();
        debug!(session = %session_id, %state, keys = data.len(), "session loaded");
        Ok(Self {
            store,
            session_id,
            state,
            workspace: Workspace::new(data),
            history: HistoryManager::new(),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> StateName {
        self.state
    }

    /// Changes the pending control state; it becomes durable with the next commit.
    pub fn set_state(&mut self, state: StateName) {
        self.state = state;
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn stage(&mut self, key: StoreKey, value: StoreValue) {
        self.workspace.stage(key, value);
    }

    /// Stages `snapshot` under the versioned current state and returns that key.
    pub fn stage_under_current_state(
        &mut self,
        snapshot: Snapshot,
    ) -> Result<StateKey, EngineError> {
        let key = EditVersionCounter::versioned_name(
            self.state,
            self.workspace.history()?.unwrap_or_default(),
        );
        self.workspace.stage(StoreKey::Snapshot(key.clone()), StoreValue::Snapshot(snapshot));
        Ok(key)
    }

    /// Upserts the staged writes and the pending state into the store.
    ///
    /// Keys that were not staged keep their committed values. Calling it again with nothing
    /// new staged writes the same record.
    pub fn commit(&mut self) -> Result<(), EngineError> {
        let staged = self.workspace.buffer().len();
        let data = self.workspace.merged();
        let session = Session::from_parts(self.session_id.clone(), self.state, data);
        self.store.save(&session)?;

        let (_, _, data) = session.into_parts();
        self.workspace.mark_committed(data);
        debug!(session = %self.session_id, state = %self.state, staged, "committed");
        Ok(())
    }

    /// Wipes the buffer and the stored data, keeping only the present `preserve` keys (set to
    /// `true`). The pending state is saved along with it.
    pub fn reset(&mut self, preserve: &[StoreKey]) -> Result<(), EngineError> {
        let data = self.workspace.preserved(preserve);
        let session = Session::from_parts(self.session_id.clone(), self.state, data);
        self.store.save(&session)?;

        let (_, _, data) = session.into_parts();
        self.workspace.mark_committed(data);
        self.history = HistoryManager::new();
        debug!(session = %self.session_id, kept = self.workspace.committed().len(), "reset");
        Ok(())
    }

    /// Ends the conversation round: reset keeping the persistent flags, then park in `next`.
    pub fn flush(&mut self, next: StateName) -> Result<(), EngineError> {
        self.state = next;
        self.reset(&SessionFlag::persistent_keys())?;
        info!(session = %self.session_id, state = %next, "session flushed");
        Ok(())
    }

    /// Makes sure a current capture and a history with a first snapshot exist, then commits.
    pub fn initialize_defaults(&mut self) -> Result<(), EngineError> {
        if self.workspace.current_capture()?.is_none() {
            self.stage(StoreKey::CurrentCapture, StoreValue::Capture(Capture::null()));
        }

        if self.workspace.history()?.is_none() {
            let entry = self.history.start_history(&mut self.workspace, self.state)?;
            if self.workspace.snapshot(&entry)?.is_none() {
                let capture =
                    self.workspace.current_capture()?.cloned().unwrap_or_else(Capture::null);
                self.stage(StoreKey::Snapshot(entry), StoreValue::Snapshot(Snapshot::new(capture)));
            }
        }

        self.commit()
    }

    pub fn switch_menu_group(&mut self) -> Result<StateName, EngineError> {
        self.switch_group(MenuKind::Edit)
    }

    pub fn switch_filter_menu_group(&mut self) -> Result<StateName, EngineError> {
        self.switch_group(MenuKind::Filters)
    }

    /// Enters the first-time or continuing variant of `kind`. Continuing means at least two
    /// recorded steps; nothing else is consulted.
    pub fn switch_group(&mut self, kind: MenuKind) -> Result<StateName, EngineError> {
        let continuing = self.completed_steps()? >= 2;
        self.state = StateName::menu(kind, continuing);
        debug!(session = %self.session_id, state = %self.state, "menu group switched");
        Ok(self.state)
    }

    /// Returns to the capture of the second-to-last history entry and commits.
    ///
    /// The steps run in a fixed order because reads go through the buffer: the reference and
    /// its capture are resolved before the tail is dropped, and the group switch sees the
    /// shortened history.
    pub fn undo_to_previous_capture(&mut self, kind: MenuKind) -> Result<Capture, EngineError> {
        self.history.point_to_second_last(&self.workspace)?;
        let capture = self.history.previous_capture(&self.workspace)?;
        let removed = self.history.undo_last_transition(&mut self.workspace)?;
        self.switch_group(kind)?;
        self.stage(StoreKey::CurrentCapture, StoreValue::Capture(capture.clone()));
        self.commit()?;

        info!(session = %self.session_id, %removed, state = %self.state, "undid last transition");
        Ok(capture)
    }

    /// Sets the active state to the base state of the referenced history entry.
    pub fn set_previous_state(&mut self) -> Result<StateName, EngineError> {
        let entry = self.history.resolve_reference(&self.workspace)?;
        self.state = entry.state();
        Ok(self.state)
    }

    pub fn point_to_second_last(&mut self) -> Result<StateKey, EngineError> {
        self.history.point_to_second_last(&self.workspace)
    }

    pub fn previous_capture(&mut self) -> Result<Capture, EngineError> {
        self.history.previous_capture(&self.workspace)
    }

    pub fn reference(&self) -> Option<&StateKey> {
        self.history.reference()
    }

    pub fn is_at_forced_redirect_leaf(&self) -> bool {
        self.history.is_at_forced_redirect_leaf()
    }

    pub fn start_history(&mut self) -> Result<StateKey, EngineError> {
        self.history.start_history(&mut self.workspace, self.state)
    }

    pub fn record_transition(&mut self) -> Result<StateKey, EngineError> {
        self.history.record_transition(&mut self.workspace, self.state)
    }

    pub fn undo_last_transition(&mut self) -> Result<StateKey, EngineError> {
        self.history.undo_last_transition(&mut self.workspace)
    }

    pub fn current_capture(&self) -> Result<&Capture, EngineError> {
        self.workspace
            .current_capture()?
            .ok_or(EngineError::MissingKey { key: StoreKey::CurrentCapture })
    }

    pub fn completed_steps(&self) -> Result<usize, EngineError> {
        self.history.completed_steps(&self.workspace)
    }

    /// Recorded history, empty when none was started.
    pub fn history_entries(&self) -> Result<&[StateKey], EngineError> {
        Ok(self.workspace.history()?.unwrap_or_default())
    }

    pub fn snapshot(&self, key: &StateKey) -> Result<Option<&Snapshot>, EngineError> {
        self.workspace.snapshot(key)
    }

    pub fn available_filters(&self) -> Result<Option<&FilterRecord>, EngineError> {
        self.workspace.filters()
    }

    pub fn raw_evidence(&self) -> Result<&RawEvidence, EngineError> {
        self.workspace.evidence()?.ok_or(EngineError::MissingKey { key: StoreKey::RawEvidence })
    }

    pub fn flag(&self, flag: SessionFlag) -> Result<bool, EngineError> {
        self.workspace.flag(&StoreKey::Flag(flag))
    }

    /// Whether a forced redirect result is part of the current round.
    pub fn redirect_used(&self) -> Result<bool, EngineError> {
        self.workspace.flag(&StoreKey::RedirectionFlag)
    }

    /// Switches a persistent flag on (stored as `true`) or off (removed), then commits.
    /// Returns the new value.
    pub fn toggle_flag(&mut self, flag: SessionFlag) -> Result<bool, EngineError> {
        let key = StoreKey::Flag(flag);
        let enabled = !self.workspace.flag(&key)?;
        if enabled {
            self.stage(key, StoreValue::Bool(true));
        } else {
            self.workspace.forget(&key);
        }
        self.commit()?;

        info!(session = %self.session_id, %flag, enabled, "flag toggled");
        Ok(enabled)
    }
}

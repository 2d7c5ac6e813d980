// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Two-phase writes.
//!
//! Handlers stage values into a [`StagingBuffer`]; nothing reaches the store until the
//! engine commits. A [`Workspace`] pairs the committed data with the buffer so reads inside
//! one event see that event's own staged writes.

use std::collections::BTreeMap;

use tracing::trace;

use crate::model::{
    Capture, FilterRecord, RawEvidence, SessionData, Snapshot, StateKey, StoreKey, StoreValue,
};

use super::error::EngineError;

/// Uncommitted writes of one event. Last write per key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingBuffer {
    entries: BTreeMap<StoreKey, StoreValue>,
}

impl StagingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, key: StoreKey, value: StoreValue) {
        trace!(%key, "staged");
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &StoreKey) -> Option<&StoreValue> {
        self.entries.get(key)
    }

    pub fn discard(&mut self, key: &StoreKey) -> Option<StoreValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Upserts every staged entry into `data`. Keys absent from the buffer are left alone,
    /// so applying the same buffer twice is the same as applying it once.
    pub fn apply_to(&self, data: &mut SessionData) {
        for (key, value) in &self.entries {
            data.insert(key.clone(), value.clone());
        }
    }
}

/// Committed session data overlaid with the current event's staged writes.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    committed: SessionData,
    buffer: StagingBuffer,
}

impl Workspace {
    pub fn new(committed: SessionData) -> Self {
        Self { committed, buffer: StagingBuffer::new() }
    }

    pub fn committed(&self) -> &SessionData {
        &self.committed
    }

    pub fn buffer(&self) -> &StagingBuffer {
        &self.buffer
    }

    pub fn get(&self, key: &StoreKey) -> Option<&StoreValue> {
        self.buffer.get(key).or_else(|| self.committed.get(key))
    }

    pub fn contains(&self, key: &StoreKey) -> bool {
        self.get(key).is_some()
    }

    pub fn stage(&mut self, key: StoreKey, value: StoreValue) {
        self.buffer.stage(key, value);
    }

    /// Committed data with the buffer applied.
    pub fn merged(&self) -> SessionData {
        let mut data = self.committed.clone();
        self.buffer.apply_to(&mut data);
        data
    }

    /// Records that `data` is now what the store holds and empties the buffer.
    pub fn mark_committed(&mut self, data: SessionData) {
        self.committed = data;
        self.buffer.clear();
    }

    /// Drops a key from both the buffer and the committed view.
    pub fn forget(&mut self, key: &StoreKey) {
        self.buffer.discard(key);
        self.committed.remove(key);
    }

    /// Data that survives a reset: the `preserve` keys that are present, each set to `true`.
    pub fn preserved(&self, preserve: &[StoreKey]) -> SessionData {
        preserve
            .iter()
            .filter(|key| self.contains(key))
            .map(|key| (key.clone(), StoreValue::Bool(true)))
            .collect()
    }

    pub fn history(&self) -> Result<Option<&[StateKey]>, EngineError> {
        self.typed(&StoreKey::History, StoreValue::as_history)
    }

    pub fn current_capture(&self) -> Result<Option<&Capture>, EngineError> {
        self.typed(&StoreKey::CurrentCapture, StoreValue::as_capture)
    }

    pub fn snapshot(&self, key: &StateKey) -> Result<Option<&Snapshot>, EngineError> {
        self.typed(&StoreKey::Snapshot(key.clone()), StoreValue::as_snapshot)
    }

    pub fn filters(&self) -> Result<Option<&FilterRecord>, EngineError> {
        self.typed(&StoreKey::AvailableFilters, StoreValue::as_filters)
    }

    pub fn evidence(&self) -> Result<Option<&RawEvidence>, EngineError> {
        self.typed(&StoreKey::RawEvidence, StoreValue::as_evidence)
    }

    pub fn message_id(&self, key: &StoreKey) -> Result<Option<i64>, EngineError> {
        self.typed(key, StoreValue::as_message_id)
    }

    pub fn flag(&self, key: &StoreKey) -> Result<bool, EngineError> {
        Ok(self.typed(key, StoreValue::as_bool)?.unwrap_or(false))
    }

    fn typed<'a, T>(
        &'a self,
        key: &StoreKey,
        extract: impl FnOnce(&'a StoreValue) -> Option<T>,
    ) -> Result<Option<T>, EngineError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => extract(value)
                .map(Some)
                .ok_or_else(|| EngineError::UnexpectedValue { key: key.clone() }),
        }
    }
}

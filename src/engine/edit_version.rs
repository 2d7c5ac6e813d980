// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{StateKey, StateName};

/// Versions the repeatable edit state so each edit round gets its own snapshot key.
///
/// The version is always recomputed from history: after an undo truncates the tail, the
/// next edit reuses the freed number.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditVersionCounter;

impl EditVersionCounter {
    /// `base` with a decimal suffix equal to the number of history entries already recorded
    /// for it. Non-repeatable states come back unversioned.
    pub fn versioned_name(base: StateName, history: &[StateKey]) -> StateKey {
        if !base.is_repeatable() {
            return StateKey::plain(base);
        }
        StateKey::versioned(base, Self::completed_rounds(base, history))
    }

    pub fn completed_rounds(base: StateName, history: &[StateKey]) -> u32 {
        let rounds = history.iter().filter(|entry| entry.state() == base).count();
        u32::try_from(rounds).unwrap_or(u32::MAX)
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smallvec::SmallVec;

use crate::model::{ContentFilter, FilterRecord};

/// Tracks which content filters are still offered in the filter submenu.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentFilterTracker;

impl ContentFilterTracker {
    pub fn initialize() -> FilterRecord {
        SmallVec::from_buf(ContentFilter::ALL)
    }

    pub fn mark_used(record: &mut FilterRecord, filter: ContentFilter) {
        record.retain(|candidate| *candidate != filter);
    }

    /// Puts `filter` back at its canonical position, whatever the record currently holds.
    pub fn restore(record: &mut FilterRecord, filter: ContentFilter) {
        if !record.contains(&filter) {
            record.push(filter);
        }
        record.sort_by_key(|candidate| candidate.canonical_index());
    }
}

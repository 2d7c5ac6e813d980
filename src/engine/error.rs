// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use thiserror::Error;

use crate::model::{StateKey, StoreKey};
use crate::store::StoreError;

/// Failures raised by the engine itself.
///
/// Everything except [`EngineError::Store`] is structural: data the engine relies on is
/// missing or has the wrong shape. Structural errors are surfaced, never absorbed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("session has no history")]
    MissingHistory,
    #[error("history already started")]
    HistoryAlreadyStarted,
    #[error("history has {len} entries, at least {required} required")]
    HistoryTooShort { len: usize, required: usize },
    #[error("session data has no `{key}`")]
    MissingKey { key: StoreKey },
    #[error("no capture snapshot stored under `{key}`")]
    MissingSnapshot { key: StateKey },
    #[error("`{key}` holds a value of the wrong shape")]
    UnexpectedValue { key: StoreKey },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

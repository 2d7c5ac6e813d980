// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for sessions.
//!
//! A [`CaptureStore`] keeps one [`Session`] record (state name plus data mapping) per session
//! id. The engine reads a record once per event and writes it back on commit or reset.

pub mod memory;
pub mod session_folder;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::{IdError, Session, SessionId};

pub use memory::MemoryStore;
pub use session_folder::{SessionFolder, WriteDurability};

/// The persisted substrate the engine commits into.
///
/// Loading an unknown session id yields a fresh [`Session`]; nothing is written until the
/// first save.
pub trait CaptureStore: Send + Sync {
    fn load(&self, session_id: &SessionId) -> Result<Session, StoreError>;

    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Drops a session record. Returns whether one existed.
    fn remove(&self, session_id: &SessionId) -> Result<bool, StoreError>;

    fn list(&self) -> Result<Vec<SessionId>, StoreError>;
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("json error at {path:?}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("invalid session id `{value}` in {path:?}: {source}")]
    InvalidId { path: PathBuf, value: String, source: IdError },
    #[error("unsupported session format version {version} in {path:?}")]
    UnsupportedVersion { path: PathBuf, version: u32 },
    #[error("session file {path:?} holds `{found}`, expected `{expected}`")]
    SessionMismatch { path: PathBuf, expected: SessionId, found: SessionId },
    #[error("refusing to follow symlink at {path:?}")]
    SymlinkRefused { path: PathBuf },
    #[error("session store lock poisoned")]
    Poisoned,
}

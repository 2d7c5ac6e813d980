// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Session, SessionData, SessionId, StateName};

use super::{CaptureStore, StoreError};

const SESSION_FILE_SUFFIX: &str = ".session.json";
const TEMP_FILE_PREFIX: &str = ".capture-flow.tmp.";
const SESSION_FORMAT_VERSION: u32 = 1;

/// A directory holding one JSON file per session.
#[derive(Debug, Clone)]
pub struct SessionFolder {
    root: PathBuf,
    durability: WriteDurability,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync/sync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Attempts to flush written file contents and rename operations to stable storage where
    /// possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionJson {
    version: u32,
    session_id: String,
    state: StateName,
    #[serde(default)]
    data: SessionData,
}

impl SessionFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), durability: WriteDurability::default() }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_path(&self, session_id: &SessionId) -> PathBuf {
        self.root.join(format!(
            "{}{SESSION_FILE_SUFFIX}",
            encode_persisted_id_segment(session_id.as_str())
        ))
    }
}

impl CaptureStore for SessionFolder {
    fn load(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        let path = self.session_path(session_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                debug!(session = %session_id, "no session file, starting fresh");
                return Ok(Session::new(session_id.clone()));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let json: SessionJson = serde_json::from_str(&raw)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        if json.version != SESSION_FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion { path, version: json.version });
        }
        let stored_id = SessionId::new(json.session_id.clone()).map_err(|source| {
            StoreError::InvalidId { path: path.clone(), value: json.session_id, source }
        })?;
        if &stored_id != session_id {
            return Err(StoreError::SessionMismatch {
                path,
                expected: session_id.clone(),
                found: stored_id,
            });
        }

        Ok(Session::from_parts(stored_id, json.state, json.data))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let path = self.session_path(session.session_id());
        let json = SessionJson {
            version: SESSION_FORMAT_VERSION,
            session_id: session.session_id().as_str().to_owned(),
            state: session.state(),
            data: session.data().clone(),
        };
        let raw = serde_json::to_string_pretty(&json)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;

        write_atomic(&self.root, &path, format!("{raw}\n").as_bytes(), self.durability)?;
        debug!(session = %session.session_id(), state = %session.state(), "session saved");
        Ok(())
    }

    fn remove(&self, session_id: &SessionId) -> Result<bool, StoreError> {
        let path = self.session_path(session_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn list(&self) -> Result<Vec<SessionId>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: self.root.clone(), source }),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|source| StoreError::Io { path: self.root.clone(), source })?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with(TEMP_FILE_PREFIX) {
                continue;
            }
            let Some(segment) = file_name.strip_suffix(SESSION_FILE_SUFFIX) else {
                continue;
            };

            let value = decode_persisted_id_segment(segment);
            let session_id = SessionId::new(value.clone()).map_err(|source| {
                StoreError::InvalidId { path: entry.path(), value, source }
            })?;
            ids.push(session_id);
        }

        ids.sort();
        Ok(ids)
    }
}

// Extracted file-name encoding and atomic write helpers.
include!("session_folder/helpers.rs");

#[cfg(test)]
mod tests;

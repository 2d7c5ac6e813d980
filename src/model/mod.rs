// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A session holds its current conversation state plus a key/value data mapping with the
//! current capture, the visited-state history, and one capture snapshot per history entry.

pub mod capture;
pub mod data;
pub mod evidence;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod filter;
pub mod ids;
pub mod session;
pub mod state;

pub use capture::{is_content_rating_tag, Capture, CONTENT_RATING_TAGS};
pub use data::{SessionData, SessionFlag, Snapshot, StoreKey, StoreValue};
pub use evidence::RawEvidence;
pub use filter::{ContentFilter, FilterRecord, UnknownFilter};
pub use ids::{Id, IdError, SessionId};
pub use session::Session;
pub use state::{MenuKind, ParseStateError, StateKey, StateName};

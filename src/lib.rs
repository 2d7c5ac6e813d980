// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! capture-flow: conversation state and history engine for a capture-and-repost chat bot.
//!
//! A user submits a media item, reviews the generated capture (tags, fandom, character, artist),
//! edits or filters it in several steps, steps back through those edits, and finally posts it.
//! The crate keeps that conversation as a persisted per-session state machine:
//!
//! - [`model`]: sessions, state names, captures, and the typed key/value session data.
//! - [`store`]: the persisted substrate ([`store::MemoryStore`], [`store::SessionFolder`]).
//! - [`engine`]: staging, commit/reset/flush, the visited-state history and undo.
//! - [`ops`]: one inbound user event per [`ops::Op`], checked against the state table.
//! - [`service`]: per-session serialization of events.
//! - [`mcp`]: the MCP tool surface over the service.

pub mod engine;
pub mod logging;
pub mod mcp;
pub mod model;
pub mod ops;
pub mod service;
pub mod source;
pub mod store;

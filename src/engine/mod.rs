// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Conversation state and history engine.
//!
//! One [`ConversationEngine`] is loaded per inbound event. It stages writes in a buffer,
//! tracks the visited-state history for undo, and commits to the [`CaptureStore`] only when
//! the handler succeeds.
//!
//! [`CaptureStore`]: crate::store::CaptureStore

pub mod conversation;
pub mod edit_version;
pub mod error;
pub mod filters;
pub mod history;
pub mod staging;

pub use conversation::ConversationEngine;
pub use edit_version::EditVersionCounter;
pub use error::EngineError;
pub use filters::ContentFilterTracker;
pub use history::HistoryManager;
pub use staging::{StagingBuffer, Workspace};

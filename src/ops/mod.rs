// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Workflow operations.
//!
//! Each [`Op`] is one inbound user event (a submitted media item, a button press, an edit
//! message). [`apply_op`] checks that the op is allowed in the session's current state, drives
//! the engine, and commits only when every step succeeded.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::{ContentFilterTracker, ConversationEngine, EngineError};
use crate::model::{
    Capture, ContentFilter, MenuKind, RawEvidence, SessionFlag, Snapshot, StateKey, StateName,
    StoreKey, StoreValue,
};
use crate::source::{CaptureRequest, CaptureSource, DomainError, SearchMode};

/// Told to the user when the media goes back as a plain repost with the reactions keyboard.
pub const SPECIAL_REPOST_NOTICE: &str = "special content: reposting the media with reactions";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// A new media item with its search evidence.
    Submit { evidence: RawEvidence },
    OpenEditMenu,
    OpenFilterMenu,
    ApplyFilter { filter: ContentFilter },
    /// The user asked to type an edit; `message_id` is the prompt the bot sent.
    BeginEdit { message_id: i64 },
    /// The edit text plus the id of the message showing the edited capture.
    SubmitEdit { text: String, message_id: i64 },
    ForceRedirect,
    Back,
    StepBack,
    Confirm,
    Post,
    Cancel,
    ToggleFlag { flag: SessionFlag },
    AcknowledgeError,
}

impl Op {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Submit { .. } => OpKind::Submit,
            Self::OpenEditMenu => OpKind::OpenEditMenu,
            Self::OpenFilterMenu => OpKind::OpenFilterMenu,
            Self::ApplyFilter { .. } => OpKind::ApplyFilter,
            Self::BeginEdit { .. } => OpKind::BeginEdit,
            Self::SubmitEdit { .. } => OpKind::SubmitEdit,
            Self::ForceRedirect => OpKind::ForceRedirect,
            Self::Back => OpKind::Back,
            Self::StepBack => OpKind::StepBack,
            Self::Confirm => OpKind::Confirm,
            Self::Post => OpKind::Post,
            Self::Cancel => OpKind::Cancel,
            Self::ToggleFlag { .. } => OpKind::ToggleFlag,
            Self::AcknowledgeError => OpKind::AcknowledgeError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Submit,
    OpenEditMenu,
    OpenFilterMenu,
    ApplyFilter,
    BeginEdit,
    SubmitEdit,
    ForceRedirect,
    Back,
    StepBack,
    Confirm,
    Post,
    Cancel,
    ToggleFlag,
    AcknowledgeError,
}

impl OpKind {
    pub const ALL: [OpKind; 14] = [
        Self::Submit,
        Self::OpenEditMenu,
        Self::OpenFilterMenu,
        Self::ApplyFilter,
        Self::BeginEdit,
        Self::SubmitEdit,
        Self::ForceRedirect,
        Self::Back,
        Self::StepBack,
        Self::Confirm,
        Self::Post,
        Self::Cancel,
        Self::ToggleFlag,
        Self::AcknowledgeError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::OpenEditMenu => "open_edit_menu",
            Self::OpenFilterMenu => "open_filter_menu",
            Self::ApplyFilter => "apply_filter",
            Self::BeginEdit => "begin_edit",
            Self::SubmitEdit => "submit_edit",
            Self::ForceRedirect => "force_redirect",
            Self::Back => "back",
            Self::StepBack => "step_back",
            Self::Confirm => "confirm",
            Self::Post => "post",
            Self::Cancel => "cancel",
            Self::ToggleFlag => "toggle_flag",
            Self::AcknowledgeError => "acknowledge_error",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller needs to refresh its view after an op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpOutcome {
    pub state: StateName,
    pub completed_steps: usize,
    pub capture: Option<Capture>,
    pub caption: Option<String>,
    /// Chat message to update in place, set when an edit round is undone or submitted.
    pub message_id: Option<i64>,
    /// New value of a toggled flag.
    pub flag: Option<bool>,
    /// User-facing explanation when the session was parked in an error state.
    pub notice: Option<String>,
}

impl OpOutcome {
    /// Reads the outcome off the engine after a successful op.
    pub fn observe(engine: &ConversationEngine<'_>) -> Result<Self, EngineError> {
        let capture = engine.workspace().current_capture()?.cloned();
        Ok(Self {
            state: engine.state(),
            completed_steps: engine.completed_steps()?,
            caption: capture.as_ref().filter(|capture| !capture.is_null()).map(Capture::caption),
            capture,
            message_id: None,
            flag: None,
            notice: None,
        })
    }

    fn with_message_id(mut self, message_id: Option<i64>) -> Self {
        self.message_id = message_id;
        self
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpError {
    #[error("`{op}` is not allowed in state `{state}`")]
    InvalidTransition { op: OpKind, state: StateName },
    #[error("filter `{filter}` was already applied")]
    FilterUnavailable { filter: ContentFilter },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Applies one op to the loaded session.
///
/// On error nothing staged by this op is committed, except where a step itself committed
/// earlier (opening the edit menu initializes defaults before switching).
pub fn apply_op(
    engine: &mut ConversationEngine<'_>,
    source: &dyn CaptureSource,
    op: &Op,
) -> Result<OpOutcome, OpError> {
    let state = engine.state();
    if !op_allowed(op.kind(), state) {
        warn!(session = %engine.session_id(), op = %op.kind(), %state, "op rejected");
        return Err(OpError::InvalidTransition { op: op.kind(), state });
    }

    let outcome = match op {
        Op::Submit { evidence } => submit(engine, source, evidence)?,
        Op::OpenEditMenu => open_edit_menu(engine)?,
        Op::OpenFilterMenu => {
            engine.switch_filter_menu_group()?;
            engine.commit()?;
            OpOutcome::observe(engine)?
        }
        Op::ApplyFilter { filter } => apply_filter(engine, source, *filter)?,
        Op::BeginEdit { message_id } => {
            engine.set_state(StateName::EditAwaitingInput);
            engine.stage(StoreKey::PromptMessageId, StoreValue::MessageId(*message_id));
            engine.commit()?;
            OpOutcome::observe(engine)?
        }
        Op::SubmitEdit { text, message_id } => submit_edit(engine, text, *message_id)?,
        Op::ForceRedirect => force_redirect(engine, source)?,
        Op::Back => back(engine)?,
        Op::StepBack => step_back(engine)?,
        Op::Confirm => confirm(engine)?,
        Op::Post => post(engine)?,
        Op::Cancel => {
            engine.flush(StateName::WaitingForInput)?;
            OpOutcome::observe(engine)?
        }
        Op::ToggleFlag { flag } => {
            let enabled = engine.toggle_flag(*flag)?;
            OpOutcome { flag: Some(enabled), ..OpOutcome::observe(engine)? }
        }
        Op::AcknowledgeError if state == StateName::SpecialContentError => special_repost(engine)?,
        Op::AcknowledgeError => {
            engine.flush(StateName::WaitingForInput)?;
            OpOutcome::observe(engine)?
        }
    };

    info!(
        session = %engine.session_id(),
        op = %op.kind(),
        from = %state,
        to = %outcome.state,
        steps = outcome.completed_steps,
        "op applied"
    );
    Ok(outcome)
}

/// Ops the state table admits in `state`, in declaration order.
///
/// Admission is necessary, not sufficient: a forced redirect is refused once a round has
/// used it, and a step back needs two history entries.
pub fn allowed_ops(state: StateName) -> Vec<OpKind> {
    OpKind::ALL.into_iter().filter(|op| op_allowed(*op, state)).collect()
}

/// Parks the session after a user-facing failure.
///
/// `engine` must be freshly loaded: whatever the failed op staged is gone. The special-content
/// branch gets its own error state.
pub fn recover_from_domain_error(
    engine: &mut ConversationEngine<'_>,
    err: &DomainError,
) -> Result<OpOutcome, EngineError> {
    let next =
        if err.is_special_content() { StateName::SpecialContentError } else { StateName::Error };
    engine.flush(next)?;
    warn!(
        session = %engine.session_id(),
        state = %next,
        error = %err,
        "session parked after error"
    );
    Ok(OpOutcome { notice: Some(err.to_string()), ..OpOutcome::observe(engine)? })
}

// Per-op handlers and the state table.
include!("ops_impl.rs");

#[cfg(test)]
mod tests;

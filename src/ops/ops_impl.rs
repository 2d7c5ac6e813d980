// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// States showing a capture the user can confirm or keep editing.
fn is_review_state(state: StateName) -> bool {
    matches!(
        state,
        StateName::ResultReview
            | StateName::RedirectReview
            | StateName::ReApprove
            | StateName::FilterApplied(_)
            | StateName::Edited
    )
}

fn op_allowed(op: OpKind, state: StateName) -> bool {
    match op {
        OpKind::Submit => matches!(state, StateName::WaitingForInput | StateName::Posting),
        OpKind::OpenEditMenu | OpKind::Confirm => is_review_state(state),
        OpKind::OpenFilterMenu | OpKind::BeginEdit => state.is_edit_menu(),
        OpKind::ApplyFilter => state.is_filter_menu(),
        OpKind::SubmitEdit => state == StateName::EditAwaitingInput,
        OpKind::ForceRedirect => state == StateName::ResultReview || state.is_edit_menu(),
        OpKind::Back | OpKind::StepBack => {
            state.is_edit_menu()
                || state.is_filter_menu()
                || state == StateName::EditAwaitingInput
                || (is_review_state(state) && state != StateName::ResultReview)
        }
        OpKind::Post => state == StateName::Confirmed,
        OpKind::Cancel | OpKind::ToggleFlag => true,
        OpKind::AcknowledgeError => {
            matches!(state, StateName::Error | StateName::SpecialContentError)
        }
    }
}

/// Skips the search and hands the media back for a plain repost with reactions.
fn special_repost(engine: &mut ConversationEngine<'_>) -> Result<OpOutcome, OpError> {
    engine.flush(StateName::Posting)?;
    let notice = Some(SPECIAL_REPOST_NOTICE.to_owned());
    Ok(OpOutcome { notice, ..OpOutcome::observe(engine)? })
}

/// Starts a round. An empty primary search falls back to the redirect search once; the
/// round then starts at the redirect leaf with the redirect already used.
fn submit(
    engine: &mut ConversationEngine<'_>,
    source: &dyn CaptureSource,
    evidence: &RawEvidence,
) -> Result<OpOutcome, OpError> {
    if engine.flag(SessionFlag::SpecialContent)? {
        return special_repost(engine);
    }

    let sfw = engine.flag(SessionFlag::Sfw)?;
    let request = CaptureRequest::new(evidence).with_sfw(sfw);
    let (state, capture) = match source.produce_capture(request) {
        Ok(capture) => (StateName::ResultReview, capture),
        Err(DomainError::SearchFailed) => {
            debug!(session = %engine.session_id(), "primary search failed, redirecting");
            let capture = source.produce_capture(request.with_mode(SearchMode::Redirect))?;
            (StateName::RedirectReview, capture)
        }
        Err(err) => return Err(err.into()),
    };

    engine.set_state(state);
    engine.stage(StoreKey::RawEvidence, StoreValue::Evidence(evidence.clone()));
    engine.stage(StoreKey::CurrentCapture, StoreValue::Capture(capture.clone()));
    let redirected = state == StateName::RedirectReview;
    engine.stage(StoreKey::RedirectionFlag, StoreValue::Bool(redirected));
    engine.stage_under_current_state(Snapshot::new(capture))?;
    engine.start_history()?;
    engine.commit()?;
    Ok(OpOutcome::observe(engine)?)
}

fn open_edit_menu(engine: &mut ConversationEngine<'_>) -> Result<OpOutcome, OpError> {
    if engine.available_filters()?.is_none() {
        let filters = ContentFilterTracker::initialize();
        engine.stage(StoreKey::AvailableFilters, StoreValue::Filters(filters));
    }
    engine.initialize_defaults()?;
    engine.switch_menu_group()?;
    engine.commit()?;
    Ok(OpOutcome::observe(engine)?)
}

fn apply_filter(
    engine: &mut ConversationEngine<'_>,
    source: &dyn CaptureSource,
    filter: ContentFilter,
) -> Result<OpOutcome, OpError> {
    let mut filters =
        engine.available_filters()?.cloned().unwrap_or_else(ContentFilterTracker::initialize);
    if !filters.contains(&filter) {
        return Err(OpError::FilterUnavailable { filter });
    }

    let sfw = engine.flag(SessionFlag::Sfw)?;
    let request = CaptureRequest::new(engine.raw_evidence()?).with_filter(filter).with_sfw(sfw);
    let capture = source.produce_capture(request)?;

    engine.set_state(StateName::FilterApplied(filter));
    engine.stage_under_current_state(Snapshot::new(capture.clone()))?;
    ContentFilterTracker::mark_used(&mut filters, filter);
    engine.stage(StoreKey::AvailableFilters, StoreValue::Filters(filters));
    engine.stage(StoreKey::CurrentCapture, StoreValue::Capture(capture));
    engine.record_transition()?;
    engine.commit()?;
    Ok(OpOutcome::observe(engine)?)
}

fn submit_edit(
    engine: &mut ConversationEngine<'_>,
    text: &str,
    message_id: i64,
) -> Result<OpOutcome, OpError> {
    let previous = engine.current_capture()?.clone();
    let edited = previous.apply_user_edit(text);

    engine.set_state(StateName::Edited);
    let snapshot = Snapshot::edited(edited.clone(), previous, Some(message_id));
    engine.stage_under_current_state(snapshot)?;
    engine.stage(StoreKey::CurrentCapture, StoreValue::Capture(edited));
    engine.record_transition()?;
    engine.commit()?;
    Ok(OpOutcome::observe(engine)?.with_message_id(Some(message_id)))
}

/// Re-runs the search over similar images. Allowed once per round: the redirect entry is
/// not repeatable, so a second one would overwrite the first one's snapshot.
fn force_redirect(
    engine: &mut ConversationEngine<'_>,
    source: &dyn CaptureSource,
) -> Result<OpOutcome, OpError> {
    let already_redirected = engine
        .history_entries()?
        .iter()
        .any(|entry| entry.state().is_forced_redirect_leaf());
    if engine.redirect_used()? || already_redirected {
        let state = engine.state();
        return Err(OpError::InvalidTransition { op: OpKind::ForceRedirect, state });
    }

    let sfw = engine.flag(SessionFlag::Sfw)?;
    let request =
        CaptureRequest::new(engine.raw_evidence()?).with_mode(SearchMode::Redirect).with_sfw(sfw);
    let capture = source.produce_capture(request)?;

    engine.set_state(StateName::RedirectReview);
    engine.stage_under_current_state(Snapshot::new(capture.clone()))?;
    engine.stage(StoreKey::CurrentCapture, StoreValue::Capture(capture));
    engine.stage(StoreKey::RedirectionFlag, StoreValue::Bool(true));
    if engine.workspace().history()?.is_none() {
        engine.start_history()?;
    } else {
        engine.record_transition()?;
    }
    engine.commit()?;
    Ok(OpOutcome::observe(engine)?)
}

/// Stages the inverse of the side effects the top history entry had beyond its snapshot.
/// Returns the chat message an undone edit was shown in.
fn revert_top_entry(engine: &mut ConversationEngine<'_>) -> Result<Option<i64>, EngineError> {
    let Some(top) = engine.history_entries()?.last().cloned() else {
        return Ok(None);
    };

    match top.state() {
        StateName::FilterApplied(filter) => {
            let mut filters = engine.available_filters()?.cloned().unwrap_or_default();
            ContentFilterTracker::restore(&mut filters, filter);
            engine.stage(StoreKey::AvailableFilters, StoreValue::Filters(filters));
            Ok(None)
        }
        StateName::RedirectReview => {
            engine.stage(StoreKey::RedirectionFlag, StoreValue::Bool(false));
            Ok(None)
        }
        StateName::Edited => Ok(engine.snapshot(&top)?.and_then(Snapshot::message_id)),
        _ => Ok(None),
    }
}

fn back(engine: &mut ConversationEngine<'_>) -> Result<OpOutcome, OpError> {
    let state = engine.state();
    match state {
        StateName::FilterMenuFirst
        | StateName::FilterMenuContinuing
        | StateName::EditAwaitingInput => {
            engine.switch_menu_group()?;
            engine.commit()?;
        }
        StateName::EditMenuFirst => {
            let top = engine.history_entries()?.last().map(StateKey::state);
            if top.is_some_and(StateName::is_forced_redirect_leaf) {
                engine.set_state(StateName::RedirectReview);
            } else {
                engine.stage(StoreKey::RedirectionFlag, StoreValue::Bool(false));
                engine.set_state(StateName::ResultReview);
            }
            engine.commit()?;
        }
        StateName::EditMenuContinuing => {
            engine.set_state(StateName::ReApprove);
            engine.commit()?;
        }
        StateName::ReApprove
        | StateName::FilterApplied(_)
        | StateName::Edited
        | StateName::RedirectReview => {
            let kind = match state {
                StateName::FilterApplied(_) => MenuKind::Filters,
                _ => MenuKind::Edit,
            };
            let message_id = revert_top_entry(engine)?;
            engine.undo_to_previous_capture(kind)?;
            debug!(
                session = %engine.session_id(),
                on_redirect_result = engine.is_at_forced_redirect_leaf(),
                "back to menu"
            );
            return Ok(OpOutcome::observe(engine)?.with_message_id(message_id));
        }
        _ => return Err(OpError::InvalidTransition { op: OpKind::Back, state }),
    }
    Ok(OpOutcome::observe(engine)?)
}

/// Generic undo: drops the top entry and returns to the state that recorded the one below.
fn step_back(engine: &mut ConversationEngine<'_>) -> Result<OpOutcome, OpError> {
    engine.point_to_second_last()?;
    let capture = engine.previous_capture()?;
    let message_id = revert_top_entry(engine)?;
    engine.set_previous_state()?;
    engine.undo_last_transition()?;
    engine.stage(StoreKey::CurrentCapture, StoreValue::Capture(capture));
    engine.commit()?;
    Ok(OpOutcome::observe(engine)?.with_message_id(message_id))
}

fn confirm(engine: &mut ConversationEngine<'_>) -> Result<OpOutcome, OpError> {
    let is_null = engine.workspace().current_capture()?.map_or(true, Capture::is_null);
    if is_null {
        engine.flush(StateName::WaitingForInput)?;
        let notice = Some("nothing to post, send another picture".to_owned());
        return Ok(OpOutcome { notice, ..OpOutcome::observe(engine)? });
    }

    engine.set_state(StateName::Confirmed);
    engine.commit()?;
    Ok(OpOutcome::observe(engine)?)
}

/// Hands the final caption to the caller and clears the round.
fn post(engine: &mut ConversationEngine<'_>) -> Result<OpOutcome, OpError> {
    let capture = engine.current_capture()?.clone();
    engine.flush(StateName::Posting)?;
    Ok(OpOutcome {
        caption: Some(capture.caption()),
        capture: Some(capture),
        ..OpOutcome::observe(engine)?
    })
}

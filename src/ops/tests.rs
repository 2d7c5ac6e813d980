// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use super::{
    allowed_ops, apply_op, recover_from_domain_error, Op, OpError, OpKind, OpOutcome,
    SPECIAL_REPOST_NOTICE,
};
use crate::engine::ConversationEngine;
use crate::model::fixtures::{beach_evidence, restricted_evidence, sid};
use crate::model::{
    ContentFilter, RawEvidence, Session, SessionData, SessionFlag, SessionId, StateKey, StateName,
    StoreKey, StoreValue,
};
use crate::source::{DomainError, EvidenceSource};
use crate::store::{CaptureStore, MemoryStore};

struct OpsTestCtx {
    store: MemoryStore,
    source: EvidenceSource,
    session_id: SessionId,
}

impl OpsTestCtx {
    /// Applies `op` the way one inbound event does: fresh engine, one op.
    fn apply(&self, op: Op) -> Result<OpOutcome, OpError> {
        let mut engine = ConversationEngine::load(&self.store, &self.session_id).expect("load");
        apply_op(&mut engine, &self.source, &op)
    }

    fn run(&self, ops: impl IntoIterator<Item = Op>) -> OpOutcome {
        let mut last = None;
        for op in ops {
            let kind = op.kind();
            last = Some(self.apply(op).unwrap_or_else(|err| panic!("{kind}: {err}")));
        }
        last.expect("at least one op")
    }

    fn session(&self) -> Session {
        self.store.load(&self.session_id).expect("load session")
    }

    fn history(&self) -> Vec<String> {
        let session = self.session();
        let history = session
            .data()
            .get(&StoreKey::History)
            .and_then(StoreValue::as_history)
            .map(<[StateKey]>::to_vec)
            .unwrap_or_default();
        history.iter().map(ToString::to_string).collect()
    }

    fn filters(&self) -> Vec<ContentFilter> {
        let session = self.session();
        let filters = session.data().get(&StoreKey::AvailableFilters);
        filters.and_then(StoreValue::as_filters).map(|record| record.to_vec()).unwrap_or_default()
    }
}

#[fixture]
fn ctx() -> OpsTestCtx {
    OpsTestCtx { store: MemoryStore::new(), source: EvidenceSource, session_id: sid("chat-7") }
}

fn submit(evidence: RawEvidence) -> Op {
    Op::Submit { evidence }
}

#[rstest]
fn submit_starts_a_round_at_result_review(ctx: OpsTestCtx) {
    let outcome = ctx.run([submit(beach_evidence())]);

    assert_eq!(outcome.state, StateName::ResultReview);
    assert_eq!(outcome.completed_steps, 1);
    assert_eq!(
        outcome.caption.as_deref(),
        Some("#Genshin_Impact #Lumine #ecchi #bikini #beach\nBy: some_artist")
    );
    assert_eq!(ctx.history(), vec!["conversation:result_review"]);
}

#[rstest]
fn ops_outside_their_states_are_rejected(ctx: OpsTestCtx) {
    let err = ctx.apply(Op::OpenEditMenu).unwrap_err();
    assert!(matches!(
        err,
        OpError::InvalidTransition { op: OpKind::OpenEditMenu, state: StateName::WaitingForInput }
    ));

    ctx.run([submit(beach_evidence())]);
    let err = ctx.apply(submit(beach_evidence())).unwrap_err();
    assert_eq!(err.to_string(), "`submit` is not allowed in state `conversation:result_review`");
}

#[rstest]
fn first_menu_visit_initializes_filters(ctx: OpsTestCtx) {
    let outcome = ctx.run([submit(beach_evidence()), Op::OpenEditMenu]);

    assert_eq!(outcome.state, StateName::EditMenuFirst);
    assert_eq!(ctx.filters(), ContentFilter::ALL.to_vec());
    assert_eq!(outcome.completed_steps, 1);
}

#[rstest]
fn applying_a_filter_records_a_step_and_switches_to_continuing_menus(ctx: OpsTestCtx) {
    let outcome = ctx.run([
        submit(beach_evidence()),
        Op::OpenEditMenu,
        Op::OpenFilterMenu,
        Op::ApplyFilter { filter: ContentFilter::Partial },
    ]);
    assert_eq!(outcome.state, StateName::FilterApplied(ContentFilter::Partial));
    assert_eq!(outcome.completed_steps, 2);
    assert_eq!(ctx.filters(), vec![ContentFilter::Absolute, ContentFilter::AnalIgnore]);

    let outcome = ctx.run([Op::OpenEditMenu]);
    assert_eq!(outcome.state, StateName::EditMenuContinuing);
    let outcome = ctx.run([Op::OpenFilterMenu]);
    assert_eq!(outcome.state, StateName::FilterMenuContinuing);

    let err = ctx.apply(Op::ApplyFilter { filter: ContentFilter::Partial }).unwrap_err();
    assert!(matches!(err, OpError::FilterUnavailable { filter: ContentFilter::Partial }));
}

#[rstest]
fn back_from_a_filter_restores_capture_and_filter(ctx: OpsTestCtx) {
    let reviewed = ctx.run([submit(beach_evidence()), Op::OpenEditMenu, Op::OpenFilterMenu]);
    ctx.run([Op::ApplyFilter { filter: ContentFilter::Absolute }]);

    let outcome = ctx.run([Op::Back]);
    assert_eq!(outcome.state, StateName::FilterMenuFirst);
    assert_eq!(outcome.completed_steps, 1);
    assert_eq!(outcome.capture, reviewed.capture);
    assert_eq!(ctx.filters(), ContentFilter::ALL.to_vec());
    assert_eq!(ctx.history(), vec!["conversation:result_review"]);
}

#[rstest]
fn edit_round_trip_reports_the_message_to_update(ctx: OpsTestCtx) {
    let reviewed = ctx.run([
        submit(beach_evidence()),
        Op::OpenEditMenu,
        Op::BeginEdit { message_id: 10 },
    ]);
    assert_eq!(reviewed.state, StateName::EditAwaitingInput);

    let edited = ctx.run([Op::SubmitEdit { text: "#nude By: someone".to_owned(), message_id: 11 }]);
    assert_eq!(edited.state, StateName::Edited);
    assert_eq!(edited.message_id, Some(11));
    let capture = edited.capture.expect("capture");
    assert_eq!(capture.tags().and_then(<[String]>::first).map(String::as_str), Some("#nude"));
    assert_eq!(capture.artist().map(<[String]>::len), Some(2));

    let undone = ctx.run([Op::Back]);
    assert_eq!(undone.state, StateName::EditMenuFirst);
    assert_eq!(undone.message_id, Some(11));
    assert_eq!(undone.capture, reviewed.capture);
}

#[rstest]
fn repeated_edits_get_versioned_history_entries(ctx: OpsTestCtx) {
    ctx.run([
        submit(beach_evidence()),
        Op::OpenEditMenu,
        Op::BeginEdit { message_id: 1 },
        Op::SubmitEdit { text: "#beach".to_owned(), message_id: 2 },
        Op::OpenEditMenu,
        Op::BeginEdit { message_id: 3 },
        Op::SubmitEdit { text: "#sunset".to_owned(), message_id: 4 },
    ]);

    assert_eq!(
        ctx.history(),
        vec![
            "conversation:result_review",
            "conversation.user_edit:edited0",
            "conversation.user_edit:edited1",
        ]
    );
}

#[rstest]
fn back_through_re_approve_undoes_the_last_step(ctx: OpsTestCtx) {
    let reviewed = ctx.run([
        submit(beach_evidence()),
        Op::OpenEditMenu,
        Op::BeginEdit { message_id: 1 },
        Op::SubmitEdit { text: "#sunset".to_owned(), message_id: 2 },
        Op::OpenEditMenu,
    ]);
    assert_eq!(reviewed.state, StateName::EditMenuContinuing);

    let outcome = ctx.run([Op::Back]);
    assert_eq!(outcome.state, StateName::ReApprove);

    let outcome = ctx.run([Op::Back]);
    assert_eq!(outcome.state, StateName::EditMenuFirst);
    assert_eq!(outcome.completed_steps, 1);
    assert_eq!(outcome.message_id, Some(2));
}

#[rstest]
fn back_from_first_menu_returns_to_review(ctx: OpsTestCtx) {
    let outcome = ctx.run([submit(beach_evidence()), Op::OpenEditMenu, Op::Back]);
    assert_eq!(outcome.state, StateName::ResultReview);
}

#[rstest]
fn forced_redirect_is_offered_once_per_round(ctx: OpsTestCtx) {
    let original = ctx.run([submit(beach_evidence()), Op::OpenEditMenu]);
    let redirected = ctx.run([Op::ForceRedirect]);

    assert_eq!(redirected.state, StateName::RedirectReview);
    assert_eq!(redirected.completed_steps, 2);
    let flag = ctx.session().data().get(&StoreKey::RedirectionFlag).cloned();
    assert_eq!(flag, Some(StoreValue::Bool(true)));

    ctx.run([Op::OpenEditMenu]);
    let err = ctx.apply(Op::ForceRedirect).unwrap_err();
    assert!(matches!(err, OpError::InvalidTransition { op: OpKind::ForceRedirect, .. }));

    ctx.run([Op::Back]);
    let undone = ctx.run([Op::Back]);
    assert_eq!(undone.state, StateName::EditMenuFirst);
    assert_eq!(undone.capture, original.capture);
    let flag = ctx.session().data().get(&StoreKey::RedirectionFlag).cloned();
    assert_eq!(flag, Some(StoreValue::Bool(false)));
}

#[rstest]
fn step_back_returns_to_the_recorded_state(ctx: OpsTestCtx) {
    ctx.run([
        submit(beach_evidence()),
        Op::OpenEditMenu,
        Op::OpenFilterMenu,
        Op::ApplyFilter { filter: ContentFilter::Partial },
        Op::OpenEditMenu,
        Op::BeginEdit { message_id: 5 },
        Op::SubmitEdit { text: "#sunset".to_owned(), message_id: 6 },
    ]);

    let outcome = ctx.run([Op::StepBack]);
    assert_eq!(outcome.state, StateName::FilterApplied(ContentFilter::Partial));
    assert_eq!(outcome.completed_steps, 2);
    assert_eq!(outcome.message_id, Some(6));

    let outcome = ctx.run([Op::StepBack]);
    assert_eq!(outcome.state, StateName::ResultReview);
    assert_eq!(outcome.completed_steps, 1);
    assert_eq!(ctx.filters(), ContentFilter::ALL.to_vec());
}

#[rstest]
fn step_back_needs_two_entries(ctx: OpsTestCtx) {
    ctx.run([submit(beach_evidence()), Op::OpenEditMenu]);
    let err = ctx.apply(Op::StepBack).unwrap_err();
    assert!(matches!(err, OpError::Engine(ref inner) if inner.is_structural()));
}

#[rstest]
fn posting_hands_out_the_caption_and_clears_the_round(ctx: OpsTestCtx) {
    ctx.run([Op::ToggleFlag { flag: SessionFlag::Sfw }, submit(beach_evidence())]);
    let confirmed = ctx.run([Op::Confirm]);
    assert_eq!(confirmed.state, StateName::Confirmed);

    let posted = ctx.run([Op::Post]);
    assert_eq!(posted.state, StateName::Posting);
    assert_eq!(posted.completed_steps, 0);
    assert_eq!(posted.caption, confirmed.caption);

    let session = ctx.session();
    assert!(session.flag(SessionFlag::Sfw));
    assert_eq!(session.data().len(), 1);

    let next = ctx.run([submit(beach_evidence())]);
    assert_eq!(next.state, StateName::ResultReview);
}

#[rstest]
fn confirming_a_null_capture_restarts(ctx: OpsTestCtx) {
    let parked =
        Session::from_parts(ctx.session_id.clone(), StateName::ResultReview, SessionData::new());
    ctx.store.save(&parked).expect("save");

    let outcome = ctx.run([Op::Confirm]);
    assert_eq!(outcome.state, StateName::WaitingForInput);
    assert!(outcome.notice.is_some());
}

#[rstest]
fn sfw_flag_rates_new_captures(ctx: OpsTestCtx) {
    let toggled = ctx.run([Op::ToggleFlag { flag: SessionFlag::Sfw }]);
    assert_eq!(toggled.flag, Some(true));

    let outcome = ctx.run([submit(beach_evidence())]);
    let caption = outcome.caption.expect("caption");
    assert!(caption.contains("#sfw #bikini"), "{caption}");
    assert!(!caption.contains("#ecchi"), "{caption}");
}

#[rstest]
fn domain_errors_commit_nothing_until_recovered(ctx: OpsTestCtx) {
    let err = ctx.apply(submit(restricted_evidence())).unwrap_err();
    let OpError::Domain(domain) = err else {
        panic!("expected a domain error");
    };
    assert!(ctx.store.list().expect("list").is_empty());

    let mut engine = ConversationEngine::load(&ctx.store, &ctx.session_id).expect("load");
    let outcome = recover_from_domain_error(&mut engine, &domain).expect("recover");
    assert_eq!(outcome.state, StateName::Error);
    assert_eq!(outcome.notice.as_deref(), Some("media contains restricted tags: #blood"));

    let outcome = ctx.run([Op::AcknowledgeError]);
    assert_eq!(outcome.state, StateName::WaitingForInput);
}

#[rstest]
fn special_content_parks_in_its_own_error_state(ctx: OpsTestCtx) {
    let mut engine = ConversationEngine::load(&ctx.store, &ctx.session_id).expect("load");
    let err = DomainError::SpecialContent { tags: vec!["#x".to_owned()] };
    let outcome = recover_from_domain_error(&mut engine, &err).expect("recover");
    assert_eq!(outcome.state, StateName::SpecialContentError);

    let outcome = ctx.run([Op::AcknowledgeError]);
    assert_eq!(outcome.state, StateName::Posting);
    assert_eq!(outcome.notice.as_deref(), Some(SPECIAL_REPOST_NOTICE));
    assert!(outcome.capture.is_none());
}

#[rstest]
fn special_content_flag_skips_the_search(ctx: OpsTestCtx) {
    ctx.run([Op::ToggleFlag { flag: SessionFlag::SpecialContent }]);

    let outcome = ctx.run([submit(beach_evidence())]);
    assert_eq!(outcome.state, StateName::Posting);
    assert_eq!(outcome.completed_steps, 0);
    assert_eq!(outcome.notice.as_deref(), Some(SPECIAL_REPOST_NOTICE));
    assert!(outcome.capture.is_none());

    let session = ctx.session();
    assert!(session.flag(SessionFlag::SpecialContent));
    assert_eq!(session.data().len(), 1);

    let again = ctx.run([submit(beach_evidence())]);
    assert_eq!(again.state, StateName::Posting);
}

fn similar_only_evidence() -> RawEvidence {
    RawEvidence {
        similar_tags: vec!["sea".to_owned(), "sand".to_owned()],
        ..RawEvidence::new("media-similar")
    }
}

#[rstest]
fn empty_primary_search_falls_back_to_redirect(ctx: OpsTestCtx) {
    let outcome = ctx.run([submit(similar_only_evidence())]);

    assert_eq!(outcome.state, StateName::RedirectReview);
    assert_eq!(outcome.completed_steps, 1);
    let capture = outcome.capture.expect("capture");
    assert_eq!(capture.fandom(), None);
    assert_eq!(capture.tags(), Some(&["#sea".to_owned(), "#sand".to_owned()][..]));
    assert_eq!(ctx.history(), vec!["conversation.redirect:result_review"]);
    let flag = ctx.session().data().get(&StoreKey::RedirectionFlag).cloned();
    assert_eq!(flag, Some(StoreValue::Bool(true)));

    ctx.run([Op::OpenEditMenu]);
    let err = ctx.apply(Op::ForceRedirect).unwrap_err();
    assert!(matches!(err, OpError::InvalidTransition { op: OpKind::ForceRedirect, .. }));

    let outcome = ctx.run([Op::Back]);
    assert_eq!(outcome.state, StateName::RedirectReview);
}

#[rstest]
fn failed_fallback_search_is_a_domain_error(ctx: OpsTestCtx) {
    let err = ctx.apply(submit(RawEvidence::new("media-empty"))).unwrap_err();
    assert!(matches!(err, OpError::Domain(DomainError::SearchFailed)));
    assert!(ctx.store.list().expect("list").is_empty());
}

#[rstest]
fn cancel_flushes_from_anywhere(ctx: OpsTestCtx) {
    ctx.run([submit(beach_evidence()), Op::OpenEditMenu, Op::OpenFilterMenu]);
    let outcome = ctx.run([Op::Cancel]);

    assert_eq!(outcome.state, StateName::WaitingForInput);
    assert!(outcome.capture.is_none());
    assert!(ctx.session().data().is_empty());
}

#[test]
fn allowed_ops_follow_the_state_table() {
    assert_eq!(
        allowed_ops(StateName::WaitingForInput),
        vec![OpKind::Submit, OpKind::Cancel, OpKind::ToggleFlag]
    );
    assert_eq!(
        allowed_ops(StateName::Confirmed),
        vec![OpKind::Post, OpKind::Cancel, OpKind::ToggleFlag]
    );
    let review = allowed_ops(StateName::ResultReview);
    assert!(review.contains(&OpKind::ForceRedirect));
    assert!(!review.contains(&OpKind::Back));
}

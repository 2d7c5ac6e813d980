// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-CaptureFlow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of capture-flow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{
    decode_persisted_id_segment, discard_temp_on_error, encode_persisted_id_segment,
    SessionFolder, WriteDurability,
};
use crate::model::fixtures::{numbered_capture, sid};
use crate::model::{SessionFlag, Snapshot, StateKey, StateName, StoreKey, StoreValue};
use crate::store::{CaptureStore, StoreError};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("capture-flow-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct SessionFolderTestCtx {
    tmp: TempDir,
    folder: SessionFolder,
}

impl SessionFolderTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let folder = SessionFolder::new(tmp.path().join("sessions"));
        Self { tmp, folder }
    }
}

#[fixture]
fn ctx() -> SessionFolderTestCtx {
    SessionFolderTestCtx::new("session-folder")
}

#[rstest]
fn loading_a_missing_session_starts_fresh(ctx: SessionFolderTestCtx) {
    let session = ctx.folder.load(&sid("100")).expect("load");
    assert_eq!(session.session_id(), &sid("100"));
    assert_eq!(session.state(), StateName::WaitingForInput);
    assert!(session.data().is_empty());
    assert!(!ctx.folder.session_path(&sid("100")).exists());
}

#[rstest]
fn saved_sessions_round_trip(ctx: SessionFolderTestCtx) {
    let mut session = ctx.folder.load(&sid("100")).expect("load");
    session.set_state(StateName::Edited);
    let data = session.data_mut();
    data.insert(StoreKey::Flag(SessionFlag::Sfw), StoreValue::Bool(true));
    data.insert(StoreKey::CurrentCapture, StoreValue::Capture(numbered_capture(1)));
    data.insert(
        StoreKey::History,
        StoreValue::History(vec![
            StateKey::plain(StateName::ResultReview),
            StateKey::versioned(StateName::Edited, 0),
        ]),
    );
    data.insert(
        StoreKey::Snapshot(StateKey::versioned(StateName::Edited, 0)),
        StoreValue::Snapshot(Snapshot::edited(numbered_capture(1), numbered_capture(0), Some(7))),
    );

    ctx.folder.save(&session).expect("save");
    let loaded = ctx.folder.load(&sid("100")).expect("reload");
    assert_eq!(loaded, session);

    let raw = std::fs::read_to_string(ctx.folder.session_path(&sid("100"))).expect("read");
    assert!(raw.ends_with('\n'));
    assert!(raw.contains("\"conversation.user_edit:edited0\""));
}

#[rstest]
fn durable_writes_persist_the_same_bytes(ctx: SessionFolderTestCtx) {
    let durable = ctx.folder.clone().with_durability(WriteDurability::Durable);
    assert_eq!(durable.durability(), WriteDurability::Durable);

    let mut session = durable.load(&sid("7")).expect("load");
    session.set_state(StateName::Confirmed);
    durable.save(&session).expect("save");

    assert_eq!(ctx.folder.load(&sid("7")).expect("reload").state(), StateName::Confirmed);
}

#[rstest]
fn list_decodes_encoded_ids_and_skips_foreign_files(ctx: SessionFolderTestCtx) {
    for raw in ["b", "a:1", "CON"] {
        let session = ctx.folder.load(&sid(raw)).expect("load");
        ctx.folder.save(&session).expect("save");
    }
    std::fs::write(ctx.folder.root().join("notes.txt"), "x").unwrap();
    std::fs::write(ctx.folder.root().join(".capture-flow.tmp.b.session.json.1"), "x").unwrap();

    let ids = ctx.folder.list().expect("list");
    assert_eq!(ids, vec![sid("CON"), sid("a:1"), sid("b")]);
}

#[rstest]
fn list_of_missing_root_is_empty(ctx: SessionFolderTestCtx) {
    let folder = SessionFolder::new(ctx.tmp.path().join("nope"));
    assert!(folder.list().expect("list").is_empty());
}

#[rstest]
fn remove_reports_whether_a_session_existed(ctx: SessionFolderTestCtx) {
    let session = ctx.folder.load(&sid("1")).expect("load");
    ctx.folder.save(&session).expect("save");

    assert!(ctx.folder.remove(&sid("1")).expect("remove"));
    assert!(!ctx.folder.remove(&sid("1")).expect("remove again"));
}

#[rstest]
fn corrupt_session_files_surface_json_errors(ctx: SessionFolderTestCtx) {
    std::fs::create_dir_all(ctx.folder.root()).unwrap();
    std::fs::write(ctx.folder.session_path(&sid("9")), "{ not json").unwrap();

    let err = ctx.folder.load(&sid("9")).unwrap_err();
    assert!(matches!(err, StoreError::Json { .. }), "unexpected error: {err}");
}

#[rstest]
fn files_of_another_session_are_rejected(ctx: SessionFolderTestCtx) {
    let session = ctx.folder.load(&sid("a")).expect("load");
    ctx.folder.save(&session).expect("save");
    std::fs::copy(ctx.folder.session_path(&sid("a")), ctx.folder.session_path(&sid("b")))
        .expect("copy");

    let err = ctx.folder.load(&sid("b")).unwrap_err();
    assert!(
        matches!(err, StoreError::SessionMismatch { ref expected, ref found, .. }
            if expected == &sid("b") && found == &sid("a")),
        "unexpected error: {err}"
    );
}

#[rstest]
fn unknown_format_versions_are_rejected(ctx: SessionFolderTestCtx) {
    let session = ctx.folder.load(&sid("9")).expect("load");
    ctx.folder.save(&session).expect("save");
    let path = ctx.folder.session_path(&sid("9"));
    let raw = std::fs::read_to_string(&path).expect("read");
    assert!(raw.contains("\"version\": 1"), "{raw}");
    std::fs::write(&path, raw.replace("\"version\": 1", "\"version\": 2")).expect("write");

    let err = ctx.folder.load(&sid("9")).unwrap_err();
    assert!(
        matches!(err, StoreError::UnsupportedVersion { version: 2, .. }),
        "unexpected error: {err}"
    );
}

#[rstest]
fn failed_writes_leave_no_temp_file(ctx: SessionFolderTestCtx) {
    std::fs::create_dir_all(ctx.folder.root()).unwrap();
    let tmp_path = ctx.folder.root().join(".capture-flow.tmp.x.session.json.1");
    let target = ctx.folder.root().join("x.session.json");

    std::fs::write(&tmp_path, "partial").unwrap();
    let failed: std::io::Result<()> = Err(std::io::Error::other("disk full"));
    let err = discard_temp_on_error(&tmp_path, &target, failed).unwrap_err();
    assert!(matches!(err, StoreError::Io { ref path, .. } if path == &target), "{err}");
    assert!(!tmp_path.exists());

    std::fs::write(&tmp_path, "complete").unwrap();
    discard_temp_on_error(&tmp_path, &target, Ok(())).expect("ok passes through");
    assert!(tmp_path.exists());
}

#[cfg(unix)]
#[rstest]
fn refuses_to_write_through_symlinks(ctx: SessionFolderTestCtx) {
    std::fs::create_dir_all(ctx.folder.root()).unwrap();
    let target = ctx.tmp.path().join("elsewhere.json");
    std::fs::write(&target, "{}").unwrap();
    std::os::unix::fs::symlink(&target, ctx.folder.session_path(&sid("5"))).unwrap();

    let session = crate::model::Session::new(sid("5"));
    let err = ctx.folder.save(&session).unwrap_err();
    assert!(matches!(err, StoreError::SymlinkRefused { .. }), "unexpected error: {err}");
}

#[test]
fn id_segment_encoding_round_trips() {
    for raw in ["plain", "-100200", "a:b", "CON", "~tilde", ".hidden", "trailing."] {
        let encoded = encode_persisted_id_segment(raw);
        assert!(!encoded.contains(':'), "{encoded}");
        assert_eq!(decode_persisted_id_segment(&encoded), raw);
    }
    assert_eq!(encode_persisted_id_segment("plain"), "plain");
    assert_eq!(decode_persisted_id_segment("~zz"), "~zz");
}

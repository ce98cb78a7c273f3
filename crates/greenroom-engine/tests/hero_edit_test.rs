//! The post-creation hero edit region: explicit state machine, inline upload
//! on save, and orphan collection of the replaced image.

mod helpers;

use std::sync::Arc;
use uuid::Uuid;

use greenroom_core::models::HeroMediaRecord;
use greenroom_core::{WizardConfig, WizardStep};
use greenroom_docstore::{DraftStore, MemoryDraftStore};
use greenroom_engine::{
    EngineError, HeroEditState, HeroEditUpdate, NoopSizeProbe, WizardSession,
};

use helpers::*;

#[tokio::test]
async fn edit_save_uploads_replacement_and_deletes_old_path() {
    let storage = TestStorage::new();
    let store = Arc::new(MemoryDraftStore::new());

    let mut draft = draft_at(WizardStep::TechRider);
    let old_path = format!("artists/{}/hero/{}_1700000000000.jpg", draft.profile_id, Uuid::new_v4());
    draft.hero_media = Some(HeroMediaRecord {
        url: TestStorage::url_for(&old_path),
        storage_path: Some(old_path.clone()),
    });

    let session = session_for(
        draft,
        storage.clone(),
        store.clone(),
        Arc::new(StubThumbnailer { bytes: b"PNG" }),
    )
    .await;

    session.begin_hero_edit().unwrap();
    session.toggle_hero_reposition().unwrap();
    assert_eq!(session.hero_edit_state(), HeroEditState::Repositioning);
    session.toggle_hero_reposition().unwrap();

    session
        .save_hero_edit(HeroEditUpdate {
            file: Some(image_file("hero-new.jpg", 128)),
            brightness: Some(120),
            position_y: Some(35),
        })
        .await
        .unwrap();

    assert_eq!(session.hero_edit_state(), HeroEditState::Viewing);
    assert_eq!(storage.uploads().len(), 1);
    assert_eq!(storage.deletes(), vec![old_path]);

    let saved = store.read_draft(session.profile_id()).await.unwrap().unwrap();
    let hero = saved.hero_media.unwrap();
    assert_eq!(hero.storage_path.as_deref(), Some(storage.uploads()[0].as_str()));
    assert_eq!(saved.hero_brightness, 120);
    assert_eq!(saved.hero_position_y, 35);
}

#[tokio::test]
async fn settings_only_save_skips_upload() {
    let storage = TestStorage::new();
    let store = Arc::new(MemoryDraftStore::new());

    let mut draft = draft_at(WizardStep::TechRider);
    let path = format!("artists/{}/hero/{}_1700000000000.jpg", draft.profile_id, Uuid::new_v4());
    draft.hero_media = Some(HeroMediaRecord {
        url: TestStorage::url_for(&path),
        storage_path: Some(path.clone()),
    });

    let session = session_for(
        draft,
        storage.clone(),
        store.clone(),
        Arc::new(StubThumbnailer { bytes: b"PNG" }),
    )
    .await;

    session.begin_hero_edit().unwrap();
    session
        .save_hero_edit(HeroEditUpdate {
            file: None,
            brightness: Some(80),
            position_y: None,
        })
        .await
        .unwrap();

    assert!(storage.uploads().is_empty());
    assert!(storage.deletes().is_empty());

    let saved = store.read_draft(session.profile_id()).await.unwrap().unwrap();
    assert_eq!(saved.hero_brightness, 80);
    assert_eq!(saved.hero_media.unwrap().storage_path.as_deref(), Some(path.as_str()));
}

#[tokio::test]
async fn edit_transitions_are_guarded() {
    let storage = TestStorage::new();
    let store = Arc::new(MemoryDraftStore::new());
    let session = session_for(
        draft_at(WizardStep::TechRider),
        storage.clone(),
        store.clone(),
        Arc::new(StubThumbnailer { bytes: b"PNG" }),
    )
    .await;

    // Repositioning and saving are only reachable from inside the edit region.
    assert!(matches!(
        session.toggle_hero_reposition().unwrap_err(),
        EngineError::InvalidHeroEdit(_)
    ));
    assert!(matches!(
        session.save_hero_edit(HeroEditUpdate::default()).await.unwrap_err(),
        EngineError::InvalidHeroEdit(_)
    ));

    session.begin_hero_edit().unwrap();
    assert!(matches!(
        session.begin_hero_edit().unwrap_err(),
        EngineError::InvalidHeroEdit(_)
    ));

    session.cancel_hero_edit();
    assert_eq!(session.hero_edit_state(), HeroEditState::Viewing);
}

#[tokio::test]
async fn usage_report_flags_soft_limit_without_blocking() {
    let storage = TestStorage::new();
    let store = Arc::new(MemoryDraftStore::new());

    let draft = draft_at(WizardStep::Tracks);
    store.create_draft(draft.clone()).await.unwrap();

    let config = WizardConfig {
        media_storage_limit_bytes: 1024,
        ..WizardConfig::default()
    };
    let session = WizardSession::from_draft(
        draft,
        config,
        storage.clone(),
        store.clone(),
        Arc::new(StubThumbnailer { bytes: b"PNG" }),
        Arc::new(NoopSizeProbe),
    )
    .await;

    session.add_track(audio_file("big.mp3", 4096));
    let report = session.usage_report().await;
    assert_eq!(report.used_bytes, 4096);
    assert_eq!(report.limit_bytes, 1024);
    assert!(report.over_limit);

    // The limit is advisory: the upload batch still runs.
    session.advance().await.unwrap();
    let rx = session.progress(greenroom_engine::MediaFamily::Tracks).unwrap();
    wait_until("batch still runs over limit", || {
        rx.borrow().status == greenroom_engine::BatchStatus::Complete
    })
    .await;
    assert_eq!(storage.uploads().len(), 1);
}

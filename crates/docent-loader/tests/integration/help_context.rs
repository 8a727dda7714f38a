//! The help context driving a loader.

use std::time::Duration;

use docent_core::ContentState;
use docent_loader::HelpContext;
use docent_storage::{FileBackend, Preferences, Storage};

use crate::common::mixed_loader;

#[tokio::test]
async fn test_state_transitions_for_a_session() {
    let ctx = HelpContext::new(mixed_loader());
    ctx.load_manifest().await.unwrap();
    let mut rx = ctx.subscribe();
    assert_eq!(*rx.borrow_and_update(), ContentState::Idle);

    ctx.load_article("welcome").await.unwrap();
    let state = ctx.state().wait_settled(Duration::from_secs(1)).await.unwrap();
    assert_eq!(state.article().unwrap().id, "welcome");
    assert_eq!(state.navigation().unwrap().next.as_ref().unwrap().id, "shortcuts");

    assert!(ctx.load_article("ghost").await.is_none());
    assert_eq!(ctx.state().state().error(), Some("Article 'ghost' not found"));
}

#[tokio::test]
async fn test_preferences_persist_across_contexts() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("prefs.json");

    {
        let storage = Storage::new(FileBackend::open(&path).unwrap(), "help:");
        let ctx = HelpContext::new(mixed_loader()).with_preferences(Preferences::new(storage));
        ctx.load_manifest().await.unwrap();
        ctx.load_article("limits").await;
        ctx.search("shortcuts").await;
        ctx.preferences().unwrap().toggle_bookmark("limits").unwrap();
    }

    let prefs = Preferences::new(Storage::new(FileBackend::open(&path).unwrap(), "help:"));
    assert_eq!(prefs.history().unwrap()[0].id, "limits");
    assert_eq!(prefs.recent_searches().unwrap(), vec!["shortcuts"]);
    assert!(prefs.is_bookmarked("limits").unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_debounced_search_publishes_latest() {
    let ctx = HelpContext::new(mixed_loader());
    ctx.load_manifest().await.unwrap();
    let mut results = ctx.subscribe_search();

    for partial in ["wi", "wid", "widg"] {
        ctx.search_debounced(partial);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(!results.has_changed().unwrap());

    tokio::time::sleep(Duration::from_millis(300)).await;
    results.changed().await.unwrap();
    assert_eq!(results.borrow()[0].id, "widgets");
}

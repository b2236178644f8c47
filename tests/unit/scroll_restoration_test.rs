//! End-to-end tests for the scroll restoration binder.
//!
//! Time is driven by hand: `pump` advances the binder one 16 ms frame at a
//! time. A binder mounted at t=0 with no loading flags fires its ready timer at
//! t=32, so a restoration starts at t=32 and its animation ends at t=1632.

use scrollkeeper::managers::position_store::{PositionStore, PositionStoreTrait};
use scrollkeeper::managers::scroll_restoration::{ScrollRestoration, ScrollRestorationTrait};
use scrollkeeper::platform::viewport::{SimulatedViewport, Viewport};
use scrollkeeper::services::session_storage::{MemorySessionStorage, SessionStorage};
use scrollkeeper::types::events::{RestorationPhase, ViewportEvent};
use scrollkeeper::types::position::LocationKey;
use scrollkeeper::types::settings::RestorationSettings;

type Binder = ScrollRestoration<MemorySessionStorage, SimulatedViewport>;

const FRAME_MS: u64 = 16;
const START: u64 = 32;

fn key(location: &str) -> LocationKey {
    LocationKey::parse(location).unwrap()
}

/// A binder mounted at t=0 on `location` with the given loading flags, whose
/// session already holds the given `(location, y)` records.
fn binder_loading(
    location: &str,
    records: &[(&str, f64)],
    document_height: f64,
    loading: &[bool],
) -> Binder {
    let settings = RestorationSettings::default();
    let mut storage = MemorySessionStorage::new();
    for (saved_location, y) in records {
        storage
            .set_item(
                &format!("{}{}", settings.storage_key_prefix, key(saved_location)),
                &format!(r#"{{"x":0,"y":{},"timestamp":1718000000000}}"#, y),
            )
            .unwrap();
    }
    let store = PositionStore::new(storage, settings.storage_key_prefix.clone());
    ScrollRestoration::new(
        store,
        SimulatedViewport::new(document_height, 800.0),
        key(location),
        settings,
        loading,
        0,
    )
}

fn binder(location: &str, records: &[(&str, f64)], document_height: f64) -> Binder {
    binder_loading(location, records, document_height, &[])
}

fn pump(binder: &mut Binder, from: u64, to: u64) {
    let mut now = from;
    while now <= to {
        binder.advance(now);
        now += FRAME_MS;
    }
}

fn saved_y(binder: &Binder, location: &str) -> Option<f64> {
    binder.store().load(&key(location)).map(|p| p.y)
}

// === Startup ===

#[test]
fn test_is_restoring_reflects_saved_record_before_ready() {
    let with_record = binder_loading(
        "/articles?page=2",
        &[("/articles?page=2", 2000.0)],
        5000.0,
        &[true],
    );
    let without_record = binder("/articles?page=2", &[("/articles?page=3", 2000.0)], 5000.0);

    assert!(with_record.is_restoring());
    assert!(!without_record.is_restoring());
    assert!(!with_record.is_ready());
    assert_eq!(with_record.phase(), RestorationPhase::Idle);
}

#[test]
fn test_subscribes_to_all_events_on_creation() {
    let b = binder("/", &[], 5000.0);
    assert_eq!(b.subscriptions(), ViewportEvent::ALL.to_vec());
}

#[test]
fn test_restores_after_ready_delay() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);
    assert_eq!(b.next_deadline(), Some(START));

    pump(&mut b, 0, START - FRAME_MS);
    assert_eq!(b.phase(), RestorationPhase::Idle);

    b.advance(START);
    assert_eq!(b.phase(), RestorationPhase::Animating);
    assert_eq!(b.monitor().restoration_start(), START);

    pump(&mut b, START + FRAME_MS, START + 1600);
    assert_eq!(b.viewport().scroll_y(), 2000.0);
    assert_eq!(b.phase(), RestorationPhase::Correcting);
    assert!(b.is_restoring());
}

#[test]
fn test_view_without_loading_flags_restores_on_mount() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);
    assert!(b.is_ready());
    assert!(b.is_restoring());

    pump(&mut b, 0, 12_000);

    assert_eq!(b.viewport().scroll_y(), 2000.0);
    assert_eq!(b.monitor().has_restored_key(), Some(&key("/")));
    assert!(!b.is_restoring());
}

#[test]
fn test_view_without_loading_flags_saves_after_restoring() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);
    pump(&mut b, 0, 12_000);

    b.viewport_mut().user_scroll_to(500.0);
    b.handle_event(ViewportEvent::Scroll, 12_000);
    pump(&mut b, 12_016, 12_400);

    assert_eq!(saved_y(&b, "/"), Some(500.0));
}

// === Readiness gating ===

#[test]
fn test_waits_while_any_loading_flag_is_set() {
    let mut b = binder_loading(
        "/category/world",
        &[("/category/world", 1500.0)],
        5000.0,
        &[false, true],
    );
    pump(&mut b, 0, 2000);

    assert_eq!(b.phase(), RestorationPhase::Idle);
    assert_eq!(b.viewport().programmatic_scrolls(), 0);
    assert!(!b.has_pending_work());

    b.set_loading_flags(&[false, false], 2000);
    pump(&mut b, 2016, 2048);
    assert_eq!(b.phase(), RestorationPhase::Animating);
    assert_eq!(b.monitor().restoration_start(), 2032);
}

#[test]
fn test_loading_again_cancels_pending_ready_timer() {
    let mut b = binder_loading("/", &[("/", 1500.0)], 5000.0, &[true]);
    b.set_loading_flags(&[false], 500);
    b.set_loading_flags(&[true], 516);
    pump(&mut b, 500, 1000);

    assert_eq!(b.phase(), RestorationPhase::Idle);
    assert_eq!(b.viewport().programmatic_scrolls(), 0);
    assert!(!b.has_pending_work());
}

// === Idempotence ===

#[test]
fn test_restores_once_per_location() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);
    pump(&mut b, 0, START + 11_000);

    assert_eq!(b.phase(), RestorationPhase::Idle);
    assert!(!b.is_restoring());
    assert_eq!(b.monitor().has_restored_key(), Some(&key("/")));

    // The view reloads its data and becomes ready again.
    b.viewport_mut().user_scroll_to(300.0);
    let writes = b.viewport().programmatic_scrolls();
    b.set_loading_flags(&[true], 12_000);
    b.set_loading_flags(&[false], 12_500);
    pump(&mut b, 12_500, 14_000);

    assert!(!b.restore(14_000));
    assert_eq!(b.viewport().scroll_y(), 300.0);
    assert_eq!(b.viewport().programmatic_scrolls(), writes);
}

#[test]
fn test_restore_refused_while_correcting() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);
    pump(&mut b, 0, 500);

    assert!(!b.restore(500));
    assert_eq!(b.monitor().restoration_start(), START);
}

// === Cancellation precedence ===

#[test]
fn test_user_interaction_stops_forcing_within_one_frame() {
    let mut b = binder("/", &[("/", 3000.0)], 8000.0);
    pump(&mut b, 0, START + 496);

    let event_at = START + 500;
    b.handle_event(ViewportEvent::Wheel, event_at);
    assert!(b.monitor().user_interacted());
    assert_eq!(b.phase(), RestorationPhase::Correcting);

    // The user keeps scrolling on their own.
    b.viewport_mut().user_scroll_to(1000.0);
    let writes = b.viewport().programmatic_scrolls();

    b.advance(START + 512);
    assert_eq!(b.phase(), RestorationPhase::Finalizing);
    assert_eq!(b.viewport().scroll_y(), 1000.0);

    pump(&mut b, START + 528, event_at + 1100);
    assert!(!b.is_restoring());
    assert_eq!(b.phase(), RestorationPhase::Idle);
    assert_eq!(b.viewport().programmatic_scrolls(), writes);
    assert_eq!(b.viewport().scroll_y(), 1000.0);
}

#[test]
fn test_interaction_during_grace_is_ignored() {
    let mut b = binder("/", &[("/", 3000.0)], 8000.0);
    pump(&mut b, 0, START + 192);

    b.handle_event(ViewportEvent::TouchStart, START + 200);
    assert!(!b.monitor().user_interacted());

    pump(&mut b, START + 208, START + 1600);
    assert_eq!(b.viewport().scroll_y(), 3000.0);
    assert!(b.is_restoring());
}

#[test]
fn test_position_saved_after_user_takes_over() {
    let mut b = binder("/", &[("/", 3000.0)], 8000.0);
    pump(&mut b, 0, START + 496);
    b.handle_event(ViewportEvent::KeyDown, START + 500);
    pump(&mut b, START + 512, START + 1600);
    assert!(!b.is_restoring());

    b.viewport_mut().user_scroll_to(1800.0);
    b.handle_event(ViewportEvent::Scroll, 1700);
    pump(&mut b, 1712, 2000);

    assert_eq!(saved_y(&b, "/"), Some(1800.0));
}

// === Layout shifts ===

#[test]
fn test_layout_shift_after_animation_is_undone_next_frame() {
    let mut b = binder("/category/world", &[("/category/world", 2000.0)], 5000.0);
    pump(&mut b, 0, START + 1792);
    assert_eq!(b.viewport().scroll_y(), 2000.0);

    b.viewport_mut().shift_layout(6000.0, 1200.0);
    b.advance(START + 1808);
    assert_eq!(b.viewport().scroll_y(), 2000.0);

    pump(&mut b, START + 1824, START + 4992);
    b.viewport_mut().shift_layout(6500.0, 1480.0);
    b.advance(START + 5008);
    assert_eq!(b.viewport().scroll_y(), 2000.0);
}

#[test]
fn test_drift_corrected_after_settle_buffer() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);
    pump(&mut b, 0, START + 2992);

    b.viewport_mut().user_scroll_to(1900.0);
    b.advance(START + 3008);
    assert_eq!(b.viewport().scroll_y(), 2000.0);
}

// === Bounded ownership ===

#[test]
fn test_correction_loop_ends_after_window_and_cooldown() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);

    pump(&mut b, 0, START + 9_984);
    assert_eq!(b.phase(), RestorationPhase::Correcting);

    b.advance(START + 10_000);
    assert_eq!(b.phase(), RestorationPhase::Finalizing);
    assert!(b.is_restoring());
    let writes = b.viewport().programmatic_scrolls();

    pump(&mut b, START + 10_016, START + 10_784);
    assert!(b.is_restoring());

    b.advance(START + 10_800);
    assert!(!b.is_restoring());
    assert_eq!(b.phase(), RestorationPhase::Idle);
    assert!(!b.monitor().is_actively_correcting());
    assert!(!b.has_pending_work());

    // No forcing after the window closes, even if the page drifts.
    b.viewport_mut().user_scroll_to(700.0);
    pump(&mut b, START + 10_816, START + 12_000);
    assert_eq!(b.viewport().scroll_y(), 700.0);
    assert_eq!(b.viewport().programmatic_scrolls(), writes);
}

// === Saving ===

#[test]
fn test_scroll_saves_after_quiet_period() {
    let mut b = binder("/tag/rust", &[], 5000.0);
    pump(&mut b, 0, 48);

    b.viewport_mut().user_scroll_to(700.0);
    b.handle_event(ViewportEvent::Scroll, 100);
    b.viewport_mut().user_scroll_to(900.0);
    b.handle_event(ViewportEvent::Scroll, 200);

    b.advance(449);
    assert_eq!(saved_y(&b, "/tag/rust"), None);

    b.advance(450);
    assert_eq!(saved_y(&b, "/tag/rust"), Some(900.0));
    assert!(!b.has_pending_work());
}

#[test]
fn test_scroll_events_ignored_while_restoring() {
    let mut b = binder_loading("/", &[("/", 2000.0)], 5000.0, &[true]);

    // Before the view is ready the binder already claims the viewport.
    b.viewport_mut().user_scroll_to(50.0);
    b.handle_event(ViewportEvent::Scroll, 0);
    assert!(!b.has_pending_work());

    b.set_loading_flags(&[false], 0);
    pump(&mut b, 0, 496);
    b.handle_event(ViewportEvent::Scroll, 500);
    pump(&mut b, 512, 2000);

    assert_eq!(saved_y(&b, "/"), Some(2000.0));
}

#[test]
fn test_restore_cancels_pending_save() {
    let mut b = binder("/", &[], 5000.0);
    pump(&mut b, 0, 48);

    b.viewport_mut().user_scroll_to(100.0);
    b.handle_event(ViewportEvent::Scroll, 60);
    assert_eq!(b.next_deadline(), Some(310));

    let storage_key = b.store().storage_key(&key("/"));
    b.store_mut()
        .storage_mut()
        .set_item(&storage_key, r#"{"x":0,"y":2500,"timestamp":0}"#)
        .unwrap();
    assert!(b.restore(64));
    assert_ne!(b.next_deadline(), Some(310));

    pump(&mut b, 64, 400);
    assert_eq!(saved_y(&b, "/"), Some(2500.0));
}

#[test]
fn test_explicit_save_records_current_offset() {
    let mut b = binder("/search?q=rust", &[], 5000.0);
    b.viewport_mut().user_scroll_to(1234.0);
    let saved = b.save();
    assert_eq!(saved.y, 1234.0);
    assert_eq!(saved_y(&b, "/search?q=rust"), Some(1234.0));
}

// === Location changes ===

#[test]
fn test_location_change_cancels_old_restoration() {
    let mut b = binder(
        "/articles?page=1",
        &[("/articles?page=1", 2000.0), ("/articles?page=2", 600.0)],
        5000.0,
    );
    pump(&mut b, 0, START + 496);
    assert_eq!(b.phase(), RestorationPhase::Animating);

    b.set_location(key("/articles?page=2"), 540);
    assert_eq!(b.key(), &key("/articles?page=2"));
    assert_eq!(b.phase(), RestorationPhase::Idle);
    assert!(b.monitor().has_restored_key().is_none());
    assert!(!b.wants_frame());
    assert!(b.is_restoring());

    pump(&mut b, 544, 12_000);
    assert_eq!(b.viewport().scroll_y(), 600.0);
    assert_eq!(b.monitor().has_restored_key(), Some(&key("/articles?page=2")));
    assert!(!b.is_restoring());
}

#[test]
fn test_location_change_after_restore_allows_returning() {
    let mut b = binder(
        "/articles?page=1",
        &[("/articles?page=1", 2000.0)],
        5000.0,
    );
    pump(&mut b, 0, 11_000);
    assert!(!b.is_restoring());

    b.set_location(key("/articles?page=2"), 11_000);
    assert!(!b.is_restoring());
    pump(&mut b, 11_008, 11_200);
    assert_eq!(b.phase(), RestorationPhase::Idle);
    assert!(!b.has_pending_work());

    b.viewport_mut().user_scroll_to(0.0);
    b.set_location(key("/articles?page=1"), 11_200);
    assert!(b.is_restoring());
    pump(&mut b, 11_216, 13_000);
    assert_eq!(b.viewport().scroll_y(), 2000.0);
}

// === Enable / teardown ===

#[test]
fn test_disable_drops_restoration_and_events() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);
    pump(&mut b, 0, 496);

    b.set_enabled(false, 500);
    assert!(!b.is_enabled());
    assert!(!b.is_restoring());
    assert_eq!(b.phase(), RestorationPhase::Idle);
    assert!(!b.has_pending_work());
    assert!(b.subscriptions().is_empty());
    assert!(!b.restore(510));

    b.set_enabled(true, 600);
    assert_eq!(b.subscriptions().len(), ViewportEvent::ALL.len());
    assert!(b.is_restoring());
    pump(&mut b, 608, 640);
    assert_eq!(b.phase(), RestorationPhase::Animating);
}

#[test]
fn test_teardown_leaves_nothing_behind() {
    let mut b = binder("/", &[("/", 2000.0)], 5000.0);
    pump(&mut b, 0, 800);
    let y = b.viewport().scroll_y();

    b.teardown();
    b.teardown();
    assert!(!b.has_pending_work());
    assert!(b.subscriptions().is_empty());

    b.handle_event(ViewportEvent::Scroll, 900);
    pump(&mut b, 816, 3000);
    assert!(!b.has_pending_work());
    assert_eq!(b.viewport().scroll_y(), y);
}

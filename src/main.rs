//! Scrollkeeper demo.
//!
//! Runs the restoration engine against a simulated viewport and prints what
//! happens frame by frame. Set `RUST_LOG=scrollkeeper=debug` for the internal
//! state transitions.

use std::error::Error;

use scrollkeeper::app::App;
use scrollkeeper::managers::position_store::{PositionStore, PositionStoreTrait};
use scrollkeeper::managers::scroll_restoration::{ScrollRestoration, ScrollRestorationTrait};
use scrollkeeper::managers::view_tracker::ViewTrackerTrait;
use scrollkeeper::platform::viewport::{SimulatedViewport, Viewport};
use scrollkeeper::services::session_storage::{MemorySessionStorage, SessionStorage};
use scrollkeeper::types::events::ViewportEvent;
use scrollkeeper::types::position::LocationKey;
use scrollkeeper::types::settings::RestorationSettings;

const FRAME_MS: u64 = 16;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scrollkeeper=info")),
        )
        .with_target(false)
        .init();

    println!();
    println!("Scrollkeeper v{} demo", env!("CARGO_PKG_VERSION"));
    println!();

    demo_position_store()?;
    demo_restoration_with_layout_shift()?;
    demo_user_takes_over()?;
    demo_app_session()?;

    println!("═══════════════════════════════════════════════════════════════");
    println!("  All demos finished.");
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

/// Pumps the binder one frame at a time from `from` to `to` inclusive.
fn run_frames<S: SessionStorage, V: Viewport>(
    binder: &mut ScrollRestoration<S, V>,
    from: u64,
    to: u64,
) {
    let mut now = from;
    while now <= to {
        binder.advance(now);
        now += FRAME_MS;
    }
}

fn demo_position_store() -> Result<(), Box<dyn Error>> {
    section("Position Store");

    let mut store = PositionStore::new(MemorySessionStorage::new(), "scroll_position_");
    let mut viewport = SimulatedViewport::new(6000.0, 900.0);
    let key = LocationKey::parse("/articles?page=2")?;

    viewport.user_scroll_to(1840.0);
    let saved = store.save(&key, &viewport);
    println!("  Saved {} at y={}", key, saved.y);
    println!("  Storage key: {}", store.storage_key(&key));

    let storage_key = store.storage_key(&key);
    store.storage_mut().set_item(&storage_key, "{not json")?;
    println!("  Corrupt record loads as: {:?}", store.load(&key));
    println!();
    Ok(())
}

fn demo_restoration_with_layout_shift() -> Result<(), Box<dyn Error>> {
    section("Restoration with a late layout shift");

    let settings = RestorationSettings::default();
    let key = LocationKey::parse("/category/world")?;

    let mut storage = MemorySessionStorage::new();
    storage.set_item(
        &format!("{}{}", settings.storage_key_prefix, key),
        r#"{"x":0,"y":2000,"timestamp":0}"#,
    )?;
    let store = PositionStore::new(storage, settings.storage_key_prefix.clone());
    let mut binder = ScrollRestoration::new(
        store,
        SimulatedViewport::new(5000.0, 900.0),
        key,
        settings,
        &[true, true],
        0,
    );

    println!("  is_restoring before data arrives: {}", binder.is_restoring());
    binder.set_loading_flags(&[false, false], 200);
    run_frames(&mut binder, 200, 232);
    let start = binder.monitor().restoration_start();
    println!("  Restoration began at t={}ms", start);

    run_frames(&mut binder, 248, start + 800);
    println!("  t=+800ms  y={:.1} ({:?})", binder.viewport().scroll_y(), binder.phase());

    run_frames(&mut binder, start + 816, start + 1792);
    binder.viewport_mut().shift_layout(6500.0, 1200.0);
    println!("  t=+1800ms images loaded, viewport pushed to y=1200");
    binder.advance(start + 1808);
    println!("  next frame y={:.1}", binder.viewport().scroll_y());

    run_frames(&mut binder, start + 1824, start + 11_000);
    println!(
        "  t=+11000ms phase={:?} is_restoring={}",
        binder.phase(),
        binder.is_restoring()
    );
    println!();
    Ok(())
}

fn demo_user_takes_over() -> Result<(), Box<dyn Error>> {
    section("User interaction cancels restoration");

    let settings = RestorationSettings::default();
    let key = LocationKey::parse("/")?;
    let mut storage = MemorySessionStorage::new();
    storage.set_item(
        &format!("{}{}", settings.storage_key_prefix, key),
        r#"{"x":0,"y":3000,"timestamp":0}"#,
    )?;
    let store = PositionStore::new(storage, settings.storage_key_prefix.clone());
    let mut binder = ScrollRestoration::new(
        store,
        SimulatedViewport::new(8000.0, 900.0),
        key,
        settings,
        &[],
        0,
    );

    run_frames(&mut binder, 0, 32);
    let start = binder.monitor().restoration_start();
    run_frames(&mut binder, 48, start + 496);

    binder.handle_event(ViewportEvent::Wheel, start + 500);
    let y_at_wheel = binder.viewport().scroll_y();
    println!("  Wheel at t=+500ms, y={:.1}", y_at_wheel);

    run_frames(&mut binder, start + 512, start + 1600);
    println!(
        "  t=+1600ms y={:.1} phase={:?} is_restoring={}",
        binder.viewport().scroll_y(),
        binder.phase(),
        binder.is_restoring()
    );
    println!();
    Ok(())
}

fn demo_app_session() -> Result<(), Box<dyn Error>> {
    section("App session with SQLite storage");

    let dir = std::env::temp_dir().join("scrollkeeper-demo");
    let settings_path = dir.join("settings.json").to_string_lossy().to_string();
    let mut app = App::in_memory(Some(settings_path))?;
    app.startup();
    println!("  Session {}", app.session_id());

    let key = LocationKey::parse("/tag/rust")?;
    let mut binder =
        app.scroll_restoration(key.clone(), SimulatedViewport::new(4000.0, 900.0), &[], 0)?;
    binder.viewport_mut().user_scroll_to(1500.0);
    binder.handle_event(ViewportEvent::Scroll, 100);
    binder.advance(400);
    println!("  Saved after debounce: {:?}", binder.store().load(&key).map(|p| p.y));
    drop(binder);

    let mut tracker = app.view_tracker("rust-2024-edition", true, 0);
    tracker.on_visibility_change(true, 12_000);
    tracker.on_visibility_change(false, 20_000);
    let mut now = 20_000;
    let report = loop {
        now += 1000;
        if let Some(report) = tracker.poll(now) {
            break report;
        }
    };
    println!(
        "  View reported to {} with {} after {}ms",
        report.endpoint_path(),
        report.body(),
        now
    );

    app.shutdown()?;
    println!("  Session ended, positions cleared");
    println!();
    Ok(())
}

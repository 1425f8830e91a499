//! Shared helpers for integration tests.

use std::rc::Rc;
use std::sync::Once;

use canvas_engine::{CanvasEngine, EngineConfig, HostSurface, RawPointerEvent, SurfaceEventKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// `RUST_LOG` controls the level (default: `warn,canvas_engine=debug`).
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,canvas_engine=debug"));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

/// An engine attached to a fresh host surface for pointer and keys.
pub fn engine_with_surface(config: EngineConfig) -> (CanvasEngine, Rc<HostSurface>) {
    init_tracing();
    let engine = CanvasEngine::new(config).expect("valid config");
    let surface = Rc::new(HostSurface::new());
    assert!(engine.attach(surface.clone()));
    assert!(engine.attach_keyboard(surface.clone()));
    (engine, surface)
}

/// Press, move through `path`, release.
pub fn drag(surface: &HostSurface, from: (f64, f64), path: &[(f64, f64)]) {
    surface.pointer(
        SurfaceEventKind::PointerDown,
        &RawPointerEvent::at(from.0, from.1, 1),
    );
    let mut last = from;
    for &(x, y) in path {
        surface.pointer(SurfaceEventKind::PointerMove, &RawPointerEvent::at(x, y, 1));
        last = (x, y);
    }
    surface.pointer(
        SurfaceEventKind::PointerUp,
        &RawPointerEvent::at(last.0, last.1, 0),
    );
}

//! WebAssembly bindings for canvas-engine.
//!
//! The JavaScript glue owns the DOM listeners and forwards raw events here;
//! a [`HostSurface`] turns them back into surface callbacks for the engine.

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::engine::CanvasEngine;
use crate::event::{KeyPhase, RawKeyEvent, RawPointerEvent, SurfaceEventKind};
use crate::geometry::Point;
use crate::surface::HostSurface;
use crate::tool::Tool;
use crate::EngineConfig;

/// Shift bit in a modifier mask passed from JavaScript.
pub const MOD_SHIFT: u8 = 1;
/// Control bit.
pub const MOD_CTRL: u8 = 2;
/// Alt bit.
pub const MOD_ALT: u8 = 4;
/// Meta bit.
pub const MOD_META: u8 = 8;

/// Initialize the canvas WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Canvas instance for WASM.
#[wasm_bindgen]
pub struct WasmCanvas {
    engine: CanvasEngine,
    surface: Rc<HostSurface>,
}

#[wasm_bindgen]
impl WasmCanvas {
    /// Create a canvas from an optional JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error string if the config is malformed or invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmCanvas, String> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(|e| e.to_string())?,
            None => EngineConfig::default(),
        };
        let engine = CanvasEngine::new(config).map_err(|e| e.to_string())?;
        let surface = Rc::new(HostSurface::new());
        engine.attach(surface.clone());
        engine.attach_keyboard(surface.clone());
        Ok(Self { engine, surface })
    }

    /// Move the canvas origin within the page.
    #[wasm_bindgen(js_name = setOrigin)]
    pub fn set_origin(&self, x: f64, y: f64) {
        self.surface.set_origin(Point::new(x, y));
    }

    /// Forward a pointer event. `kind` is a bus topic name such as
    /// `"pointerdown"`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown kind.
    #[wasm_bindgen(js_name = pointerEvent)]
    pub fn pointer_event(
        &self,
        kind: &str,
        x: f64,
        y: f64,
        buttons: u16,
        modifiers: u8,
    ) -> Result<(), String> {
        let kind = SurfaceEventKind::ALL
            .into_iter()
            .find(|k| k.topic().as_str() == kind)
            .ok_or_else(|| format!("unknown pointer event kind: {kind}"))?;
        let raw = with_modifiers(RawPointerEvent::at(x, y, buttons), modifiers);
        self.surface.pointer(kind, &raw);
        Ok(())
    }

    /// Forward a wheel event.
    #[wasm_bindgen(js_name = wheelEvent)]
    pub fn wheel_event(&self, x: f64, y: f64, delta_x: f64, delta_y: f64, modifiers: u8) {
        let raw = RawPointerEvent {
            delta_x,
            delta_y,
            ..with_modifiers(RawPointerEvent::at(x, y, 0), modifiers)
        };
        self.surface.pointer(SurfaceEventKind::Wheel, &raw);
    }

    /// Forward a keydown (`down = true`) or keyup event.
    #[wasm_bindgen(js_name = keyEvent)]
    pub fn key_event(&self, down: bool, key: &str, code: &str, modifiers: u8) {
        let raw = RawKeyEvent {
            ctrl_key: modifiers & MOD_CTRL != 0,
            shift_key: modifiers & MOD_SHIFT != 0,
            alt_key: modifiers & MOD_ALT != 0,
            meta_key: modifiers & MOD_META != 0,
            ..RawKeyEvent::key(key, code)
        };
        let phase = if down { KeyPhase::Down } else { KeyPhase::Up };
        self.surface.key(phase, &raw);
    }

    /// Switch tools by name (`"select"`, `"rect"`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown tool.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, name: &str) -> Result<(), String> {
        let tool: Tool = serde_json::from_value(serde_json::Value::String(name.to_string()))
            .map_err(|e| e.to_string())?;
        self.engine.set_tool(tool);
        Ok(())
    }

    /// Get the full state as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = getSnapshotJson)]
    pub fn get_snapshot_json(&self) -> Result<String, String> {
        self.engine.snapshot().to_json().map_err(|e| e.to_string())
    }

    /// Replace the state from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing fails.
    #[wasm_bindgen(js_name = loadSnapshotJson)]
    pub fn load_snapshot_json(&self, json: &str) -> Result<(), String> {
        self.engine.load_snapshot_json(json).map_err(|e| e.to_string())
    }

    /// Drain journaled mutations as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = takeMutationsJson)]
    pub fn take_mutations_json(&self) -> Result<String, String> {
        let records = self.engine.store().borrow_mut().take_mutations();
        serde_json::to_string(&records).map_err(|e| e.to_string())
    }
}

fn with_modifiers(raw: RawPointerEvent, modifiers: u8) -> RawPointerEvent {
    RawPointerEvent {
        shift_key: modifiers & MOD_SHIFT != 0,
        ctrl_key: modifiers & MOD_CTRL != 0,
        alt_key: modifiers & MOD_ALT != 0,
        meta_key: modifiers & MOD_META != 0,
        ..raw
    }
}

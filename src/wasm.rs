#![cfg(target_arch = "wasm32")]

use crate::algorithms::flocking::AgentParams;
use crate::engine::{Engine, PRESET_SKY_WIDGET, PresetInfo, preset_catalog, preset_config};
use crate::flock::FlockConfig;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn available_presets() -> js_sys::Array {
    let out = js_sys::Array::new();
    for info in preset_catalog() {
        out.push(&preset_info_to_js(info));
    }
    out
}

#[wasm_bindgen]
pub fn flock_defaults() -> JsValue {
    let config = FlockConfig::default();
    serde_wasm_bindgen::to_value(&config).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub fn agent_defaults() -> JsValue {
    let params = AgentParams::default();
    serde_wasm_bindgen::to_value(&params).unwrap_or(JsValue::NULL)
}

/// Config object behind a built-in preset, so the page can tweak and rebuild it.
#[wasm_bindgen]
pub fn preset_defaults(preset_id: &str) -> Result<JsValue, JsValue> {
    let config = preset_config(preset_id).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&config).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn preset_info_to_js(info: &PresetInfo) -> JsValue {
    let obj = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&obj, &JsValue::from_str("id"), &JsValue::from_str(info.id));
    let _ = js_sys::Reflect::set(&obj, &JsValue::from_str("name"), &JsValue::from_str(info.name));
    let _ = js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("description"),
        &JsValue::from_str(info.description),
    );
    JsValue::from(obj)
}

#[wasm_bindgen]
pub struct WasmFlock {
    engine: Engine,
}

#[wasm_bindgen]
impl WasmFlock {
    #[wasm_bindgen(constructor)]
    pub fn new(preset_id: Option<String>) -> Result<WasmFlock, JsValue> {
        let preset_id = preset_id.as_deref().unwrap_or(PRESET_SKY_WIDGET);
        let engine = Engine::new_builtin(preset_id).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmFlock { engine })
    }

    /// Build from a config object shaped like `flock_defaults()`; missing keys fall back
    /// to the defaults.
    #[wasm_bindgen(js_name = "newFromConfig")]
    pub fn new_from_config(config: JsValue) -> Result<WasmFlock, JsValue> {
        let cfg: FlockConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("invalid config: {}", e)))?;
        let engine = Engine::new_custom(&cfg).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmFlock { engine })
    }

    pub fn len(&self) -> usize { self.engine.len() }

    /// Advance by one frame; `dt` in seconds.
    pub fn tick(&mut self, dt: f64) { self.engine.tick(dt); }

    pub fn positions(&self) -> Vec<f32> { self.engine.positions_flat() }

    #[wasm_bindgen(js_name = "lookTargets")]
    pub fn look_targets(&self) -> Vec<f32> { self.engine.look_targets_flat() }

    pub fn orientations(&self) -> Vec<f32> { self.engine.orientations_flat() }

    pub fn boundary(&self) -> Vec<f32> { self.engine.boundary_flat() }

    #[wasm_bindgen(js_name = "outsideCount")]
    pub fn outside_count(&self) -> usize { self.engine.outside_count() }

    #[wasm_bindgen(js_name = "presetId")]
    pub fn preset_id(&self) -> String { self.engine.preset_id().to_string() }

    pub fn snapshots(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.engine.flock().agent_snapshots()).unwrap_or(JsValue::NULL)
    }
}

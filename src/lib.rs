// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Packet Flow Simulation Suite ("Meshflow")

pub mod types;
pub mod config;
pub mod topology;
pub mod congestion;
pub mod cost;
pub mod routing;
pub mod presets;
pub mod simulation;

pub use config::SimConfig;
pub use simulation::{CommandError, NetSimulation};
pub use topology::{Topology, TopologyDoc, TopologyError};
pub use types::*;

use wasm_bindgen::prelude::*;

fn to_js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Built-in preset ids, in the order the UI cycles through them.
#[wasm_bindgen]
pub fn topology_presets() -> JsValue {
    serde_wasm_bindgen::to_value(presets::preset_ids()).unwrap_or(JsValue::NULL)
}

// ─── WASM Interface ──────────────────────────────────────────────────────────
//
// One JS-facing method per command in the UI surface; each converts its
// string arguments, delegates to the core method, and maps errors to JS
// strings. The rendering layer polls `snapshot` after advancing.

#[wasm_bindgen]
impl NetSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(preset_id: Option<String>) -> Result<NetSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let preset = preset_id.unwrap_or_else(|| presets::DEFAULT_PRESET.to_string());
        NetSimulation::with_preset(SimConfig::default(), &preset).map_err(to_js_err)
    }

    /// Advance exactly one tick, regardless of pause state (test/debug hook).
    pub fn tick(&mut self) -> JsValue {
        let result = self.tick_core();
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    /// Advance one frame: `speed` ticks, or nothing while paused.
    pub fn advance(&mut self) -> JsValue {
        match self.advance_frame() {
            Some(result) => serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// Run N ticks without marshalling intermediate results.
    #[wasm_bindgen(js_name = runBatch)]
    pub fn run_batch(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick_core();
        }
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.snapshot()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = stats)]
    pub fn stats_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = select)]
    pub fn select_js(&mut self, node_id: Option<String>) -> Result<(), JsValue> {
        self.select(node_id.map(NodeId)).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node_js(&mut self, x: f64, y: f64) -> String {
        self.add_node(Position::new(x, y)).0
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node_js(&mut self, node_id: &str) -> Result<(), JsValue> {
        self.remove_node(&NodeId::from(node_id)).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = addLink)]
    pub fn add_link_js(&mut self, a: &str, b: &str) -> Result<(), JsValue> {
        self.add_link(&NodeId::from(a), &NodeId::from(b)).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = removeLink)]
    pub fn remove_link_js(&mut self, a: &str, b: &str) -> Result<(), JsValue> {
        self.remove_link(&NodeId::from(a), &NodeId::from(b)).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node_js(&mut self, node_id: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.move_node(&NodeId::from(node_id), Position::new(x, y))
            .map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = lockCongestion)]
    pub fn lock_congestion_js(&mut self, node_id: &str) -> Result<(), JsValue> {
        self.lock_congestion(&NodeId::from(node_id)).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = unlockCongestion)]
    pub fn unlock_congestion_js(&mut self, node_id: &str) -> Result<(), JsValue> {
        self.unlock_congestion(&NodeId::from(node_id)).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = impulseCongestion)]
    pub fn impulse_congestion_js(&mut self, node_id: &str, duration_ticks: u32) -> Result<(), JsValue> {
        self.impulse_congestion(&NodeId::from(node_id), duration_ticks)
            .map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = injectRandomPacket)]
    pub fn inject_random_packet_js(&mut self) -> Result<u64, JsValue> {
        self.inject_random_packet().map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = injectPacket)]
    pub fn inject_packet_js(&mut self, src: &str, dst: &str) -> Result<u64, JsValue> {
        self.inject_packet(&NodeId::from(src), &NodeId::from(dst))
            .map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = smartInject)]
    pub fn smart_inject_js(&mut self, node_id: &str) -> Result<u64, JsValue> {
        self.smart_inject(&NodeId::from(node_id)).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed_js(&mut self, multiplier: u32) {
        self.set_speed(multiplier);
    }

    #[wasm_bindgen(js_name = pause)]
    pub fn pause_js(&mut self) {
        self.pause();
    }

    #[wasm_bindgen(js_name = resume)]
    pub fn resume_js(&mut self) {
        self.resume();
    }

    #[wasm_bindgen(js_name = reset)]
    pub fn reset_js(&mut self) {
        self.reset();
    }

    /// Switch to a built-in preset, or a blank canvas when no id is given.
    #[wasm_bindgen(js_name = switchTopology)]
    pub fn switch_topology_js(&mut self, preset_id: Option<String>) -> Result<(), JsValue> {
        self.switch_topology(preset_id.as_deref()).map_err(to_js_err)
    }

    /// Load a topology document produced by the external loader.
    #[wasm_bindgen(js_name = loadTopology)]
    pub fn load_topology_js(&mut self, json: &str) -> Result<(), JsValue> {
        let doc = TopologyDoc::from_json(json).map_err(to_js_err)?;
        self.load_doc(&doc).map_err(to_js_err)
    }
}

#![forbid(unsafe_code)]

//! `brkbridge-web` is the browser half of the level transfer bridge.
//!
//! It wires the page's file input, catalog container, and default-asset
//! prefetch to the deterministic core in `brkbridge-core`, and exports the
//! two functions the game module pulls through (`js_send_level_bytes`,
//! `js_recv_level_bytes`) via `wasm-bindgen`. The loader page forwards those
//! exports into the module's import object and registers the module's
//! "data ready" entry point with [`wasm::bridge_set_ready_callback`].
//!
//! Everything browser-specific lives in [`wasm`]; the core never sees a DOM
//! type.

/// JS API version of the exported bridge surface. Bumped on any breaking
/// change to the exported function set or their signatures.
pub const BRIDGE_JS_API_VERSION: u32 = 1;

pub use brkbridge_core::config::{BridgeConfig, ConfigError};
pub use brkbridge_core::{BridgeCore, BridgeError, EntryId, PackHeader, PackOrigin};

#[cfg(target_arch = "wasm32")]
pub mod wasm;

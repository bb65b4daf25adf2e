#![forbid(unsafe_code)]

//! `wasm-bindgen` exports and DOM wiring for the level transfer bridge.
//!
//! The loader page calls [`bridge_init`] once, forwards
//! [`js_send_level_bytes`] / [`js_recv_level_bytes`] into the game module's
//! import object, and registers the module's "data ready" entry point via
//! [`bridge_set_ready_callback`]. Only compiled on `wasm32` targets.
//!
//! Every producer path (file picker, prefetch, catalog click) funnels into
//! the core's single-slot mailbox; the module drains it with a synchronous
//! pull. Nothing in here throws into the module: failures are logged to the
//! console and the affected pack simply never becomes available.

use std::cell::RefCell;

use brkbridge_core::config::BridgeConfig;
use brkbridge_core::{BridgeCore, EntryId, PackOrigin, header};
use js_sys::{Reflect, Uint8Array};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Blob, BlobPropertyBag, Document, Element, Event, HtmlAnchorElement, HtmlInputElement,
};

const OCTET_STREAM: &str = "application/octet-stream";
/// Returned by [`js_send_level_bytes`] when nothing is staged.
const NO_DATA_SENTINEL: i32 = -1;

/// DOM handles resolved once at [`bridge_init`] time.
#[derive(Clone)]
struct DomHandles {
    document: Document,
    catalog_host: Element,
}

struct BridgeHandle {
    core: BridgeCore,
    dom: Option<DomHandles>,
    ready: Option<js_sys::Function>,
    autoload_single: bool,
}

impl BridgeHandle {
    const fn new() -> Self {
        Self {
            core: BridgeCore::new(),
            dom: None,
            ready: None,
            autoload_single: true,
        }
    }
}

thread_local! {
    // Module-instance scope, like the single global slot the module polls.
    static BRIDGE: RefCell<BridgeHandle> = const { RefCell::new(BridgeHandle::new()) };
}

fn console_call(method: &str, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(function) = Reflect::get(&console, &method.into()) else {
        return;
    };
    let Ok(function) = function.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = function.call1(&console, &JsValue::from_str(msg));
}

fn console_error(msg: &str) {
    console_call("error", msg);
}

fn console_warn(msg: &str) {
    console_call("warn", msg);
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has an unexpected type")))
}

/// Version of the exported JS surface, for loader compatibility checks.
#[wasm_bindgen]
#[must_use]
pub fn bridge_api_version() -> u32 {
    crate::BRIDGE_JS_API_VERSION
}

/// One-time bridge setup: resolve the file input and catalog container,
/// install the picker listener, and start prefetching the configured default
/// packs. `config_json` is a [`BridgeConfig`] document; blank means defaults.
#[wasm_bindgen]
pub fn bridge_init(config_json: &str) -> Result<(), JsValue> {
    install_panic_hook();

    let config = BridgeConfig::from_json(config_json)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document to attach to"))?;
    let input: HtmlInputElement = element_by_id(&document, &config.file_input_id)?;
    let catalog_host: Element = element_by_id(&document, &config.catalog_id)?;

    let already_wired = BRIDGE.with(|bridge| {
        let mut bridge = bridge.borrow_mut();
        if bridge.dom.is_some() {
            return true;
        }
        bridge.dom = Some(DomHandles {
            document,
            catalog_host,
        });
        bridge.autoload_single = config.autoload_single;
        false
    });
    if already_wired {
        return Err(JsValue::from_str("bridge already initialized"));
    }

    let on_change = Closure::wrap(Box::new(on_files_selected) as Box<dyn FnMut(Event)>);
    input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
    on_change.forget();

    debug!(
        defaults = config.default_packs.len(),
        "bridge wired to the page"
    );

    // Defaults fetch relative to the page origin, one request each; a failed
    // pack is logged and stays unavailable, the rest are unaffected.
    for name in config.default_packs {
        spawn_local(async move {
            match fetch_pack_bytes(&name).await {
                Ok(bytes) => add_pack_and_row(&name, bytes, PackOrigin::Prefetched, false),
                Err(err) => {
                    warn!(pack = %name, "default pack fetch failed");
                    console_error(&format!("failed to load default pack {name}: {err:?}"));
                }
            }
        });
    }

    Ok(())
}

/// Register the module's "data ready" entry point, invoked after every
/// catalog or programmatic stage so the module knows a poll will pay off.
#[wasm_bindgen]
pub fn bridge_set_ready_callback(callback: js_sys::Function) {
    BRIDGE.with(|bridge| bridge.borrow_mut().ready = Some(callback));
}

/// Outbound pull, called synchronously by the module.
///
/// Returns the staged buffer as a `Uint8Array`, or `-1` when nothing is
/// staged. The pull consumes the slot. Never throws.
#[wasm_bindgen]
#[must_use]
pub fn js_send_level_bytes() -> JsValue {
    let pulled = BRIDGE.with(|bridge| bridge.borrow_mut().core.pull_pending());
    match pulled {
        Some(bytes) => Uint8Array::from(bytes.as_slice()).into(),
        None => JsValue::from(NO_DATA_SENTINEL),
    }
}

/// Inbound transfer, called by the module to hand a finished pack to the
/// user as a download.
///
/// The buffer is copied out of `bytes` immediately; the handle is never
/// retained past this call. Failures are logged, never thrown.
#[wasm_bindgen]
pub fn js_recv_level_bytes(bytes: Uint8Array) {
    let bytes = bytes.to_vec();
    if let Err(err) = trigger_pack_download(&bytes) {
        warn!(len = bytes.len(), "pack download failed");
        console_error(&format!("failed to save pack: {err:?}"));
    }
}

/// Stage raw pack bytes programmatically, as if a catalog row was clicked
/// (including the ready notification). For loader scripts.
#[wasm_bindgen]
pub fn bridge_stage_pack(bytes: Uint8Array) {
    let ready = BRIDGE.with(|bridge| {
        let mut bridge = bridge.borrow_mut();
        bridge.core.stage_bytes(bytes.to_vec());
        bridge.ready.clone()
    });
    notify_ready(ready);
}

fn notify_ready(ready: Option<js_sys::Function>) {
    if let Some(callback) = ready
        && let Err(err) = callback.call0(&JsValue::NULL)
    {
        console_error(&format!("data-ready callback threw: {err:?}"));
    }
}

fn stage_entry_and_notify(id: EntryId) {
    let ready = BRIDGE.with(|bridge| {
        let mut bridge = bridge.borrow_mut();
        if !bridge.core.stage_entry(id) {
            return None;
        }
        bridge.ready.clone()
    });
    // The callback runs with no bridge borrow held: the module may poll
    // synchronously from inside it.
    notify_ready(ready);
}

/// `change` handler for the file input. Reads every selected `.brk` file and
/// admits it to the catalog; other extensions are logged and skipped.
fn on_files_selected(event: Event) {
    let Some(input) = event
        .target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
    else {
        return;
    };
    let Some(files) = input.files() else {
        console_warn("no file selected");
        return;
    };

    let count = files.length();
    let autoload_single =
        count == 1 && BRIDGE.with(|bridge| bridge.borrow().autoload_single);

    for index in 0..count {
        let Some(file) = files.get(index) else {
            continue;
        };
        let name = file.name();
        if header::pack_file_stem(&name).is_none() {
            warn!(file = %name, "skipping non-pack selection");
            console_warn(&format!(
                "skipping {name}: not a .{} pack",
                header::PACK_EXTENSION
            ));
            continue;
        }

        // Reads resolve in whatever order the browser finishes them; the
        // last one to land wins the mailbox slot.
        let read = file.array_buffer();
        spawn_local(async move {
            match JsFuture::from(read).await {
                Ok(buffer) => {
                    let bytes = Uint8Array::new(&buffer).to_vec();
                    add_pack_and_row(&name, bytes, PackOrigin::FilePicker, autoload_single);
                }
                Err(err) => {
                    warn!(file = %name, "file read failed");
                    console_error(&format!("failed to read {name}: {err:?}"));
                }
            }
        });
    }
}

async fn fetch_pack_bytes(url: &str) -> Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))?;
    let response = JsFuture::from(window.fetch_with_str(url)).await?;
    let response: web_sys::Response = response.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP {} fetching {url}",
            response.status()
        )));
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Admit finished bytes to the catalog and grow the on-page list by one row.
fn add_pack_and_row(file_name: &str, bytes: Vec<u8>, origin: PackOrigin, autoload: bool) {
    let admitted = BRIDGE.with(|bridge| {
        let mut bridge = bridge.borrow_mut();
        match bridge.core.add_pack(file_name, bytes, origin) {
            Ok(id) => {
                let author = bridge
                    .core
                    .catalog()
                    .get(id)
                    .map(|entry| entry.author().to_owned())
                    .unwrap_or_default();
                bridge.dom.clone().map(|dom| (id, author, dom))
            }
            Err(err) => {
                warn!(file = %file_name, %err, "pack not admitted");
                console_warn(&format!("ignoring {file_name}: {err}"));
                None
            }
        }
    });

    let Some((id, author, dom)) = admitted else {
        return;
    };
    if let Err(err) = append_catalog_row(&dom, id, file_name, &author, origin.closable()) {
        console_error(&format!("failed to add catalog row for {file_name}: {err:?}"));
        return;
    }
    debug!(file = %file_name, entry = id.get(), "catalog row added");

    if autoload {
        stage_entry_and_notify(id);
    }
}

/// Build one catalog row: a select button, a "By <author>" label, and a
/// close button for rows the user loaded.
fn append_catalog_row(
    dom: &DomHandles,
    id: EntryId,
    file_name: &str,
    author: &str,
    closable: bool,
) -> Result<(), JsValue> {
    let row = dom.document.create_element("div")?;

    let select = dom.document.create_element("button")?;
    select.set_text_content(Some(file_name));
    let on_select = Closure::wrap(Box::new(move |_event: Event| {
        stage_entry_and_notify(id);
    }) as Box<dyn FnMut(Event)>);
    select.add_event_listener_with_callback("click", on_select.as_ref().unchecked_ref())?;
    on_select.forget();
    row.append_child(&select)?;

    let label = dom.document.create_text_node(&format!("By {author}"));
    row.append_child(&label)?;

    if closable {
        let close = dom.document.create_element("button")?;
        close.set_text_content(Some("X"));
        close.set_attribute("aria-label", "remove pack")?;
        let row_for_close = row.clone();
        let on_close = Closure::wrap(Box::new(move |_event: Event| {
            // Removal is UI-local: anything already staged stays staged.
            row_for_close.remove();
            BRIDGE.with(|bridge| bridge.borrow_mut().core.remove_entry(id));
        }) as Box<dyn FnMut(Event)>);
        close.add_event_listener_with_callback("click", on_close.as_ref().unchecked_ref())?;
        on_close.forget();
        row.append_child(&close)?;
    }

    dom.catalog_host.append_child(&row)?;
    Ok(())
}

/// Package `bytes` as a named `.brk` download and click it through a
/// temporary anchor. The object URL and anchor are torn down immediately
/// after the click.
fn trigger_pack_download(bytes: &[u8]) -> Result<(), JsValue> {
    let file_name = header::export_file_name(bytes);
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("missing document"))?;

    let parts = js_sys::Array::new();
    parts.push(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(OCTET_STREAM);
    let blob = Blob::new_with_u8_array_sequence_and_options(parts.as_ref(), &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&file_name);
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&anchor)?;
    anchor.click();

    web_sys::Url::revoke_object_url(&url)?;
    anchor.remove();

    debug!(file = %file_name, len = bytes.len(), "pack handed to the browser for download");
    Ok(())
}

//! WASM-specific implementation using wasm-bindgen.
//!
//! Binds the core capability traits to `web-sys` and provides the
//! JavaScript-facing API.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::{Function, Object, Promise, Reflect};
use nutrition_sidebar_core::markup::{CHECKBOX_GROUP_CLASS, FILTER_INPUT_CLASS, MENU_LINK_CLASS, Node};
use nutrition_sidebar_core::{
    DeferredAction, Document, FilterPatch, HostBridge, HostCommand, INBOUND_HANDLERS,
    MemoryStorage, NoopBridge, OutboundInput, Query, Scheduler, Sidebar, SidebarError,
    SidebarEvent, SidebarResult, Storage,
};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AddEventListenerOptions, CustomEvent, CustomEventInit, Element, Event,
    EventTarget, HtmlElement, HtmlInputElement, HtmlSelectElement, KeyboardEvent, Window,
};

use crate::{console, document_is_parsed, parse_mount_config};

type WebSidebar = Sidebar<WebDocument>;
type SharedSidebar = Rc<RefCell<WebSidebar>>;

// ──────────────────────────────────────────────────────────────────────────────
// Initialization
// ──────────────────────────────────────────────────────────────────────────────

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn wasm_init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console-panic")]
    console_error_panic_hook::set_once();
}

/// Resolves once the document has been parsed.
async fn document_ready(document: &web_sys::Document) -> Result<(), JsValue> {
    if document_is_parsed(&document.ready_state()) {
        return Ok(());
    }
    let target = document.clone();
    let promise = Promise::new(&mut |resolve, _reject| {
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        if target
            .add_event_listener_with_callback_and_add_event_listener_options(
                "DOMContentLoaded",
                &resolve,
                &options,
            )
            .is_err()
        {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    });
    JsFuture::from(promise).await.map(|_| ())
}

/// Mount the sidebar once the document is ready.
///
/// `config_json` is an optional JSON object (see `SidebarConfig`). Resolves
/// to a [`SidebarHandle`]; rejects with an `Error` whose `name` is the error
/// type (e.g. `INVALID_CONFIG`, `DOM_ERROR`). A page holds at most one
/// sidebar: mounting again rejects with `DOM_ERROR` and leaves the first
/// instance in place.
#[wasm_bindgen(js_name = mountSidebar)]
pub async fn mount_sidebar(config_json: Option<String>) -> Result<SidebarHandle, JsValue> {
    let config = parse_mount_config(config_json.as_deref()).map_err(|e| to_js_error(&e))?;
    console::init(&config.log_filter);

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    document_ready(&document).await?;

    let shiny = ShinyBridge::detect(&window);
    let bridge: Box<dyn HostBridge> = match &shiny {
        Some(shiny) => Box::new(shiny.clone()),
        None => {
            tracing::info!("no Shiny runtime detected; host inputs are disabled");
            Box::new(NoopBridge)
        }
    };
    let storage = open_storage(&window);
    let web_document = WebDocument {
        window: window.clone(),
        document: document.clone(),
    };

    let shared: SharedSidebar = Rc::new_cyclic(|weak| {
        let scheduler = TimeoutScheduler {
            window: window.clone(),
            sidebar: weak.clone(),
        };
        RefCell::new(Sidebar::new(
            web_document,
            storage,
            bridge,
            Box::new(scheduler),
            config,
        ))
    });

    shared.borrow_mut().setup().map_err(|e| to_js_error(&e))?;
    bind_events(&shared, &window, &document).map_err(|e| to_js_error(&e))?;
    if let Some(shiny) = &shiny {
        register_host_commands(shiny, &Rc::downgrade(&shared));
    }

    tracing::info!("sidebar ready");
    Ok(SidebarHandle { inner: shared })
}

// ──────────────────────────────────────────────────────────────────────────────
// JS handle
// ──────────────────────────────────────────────────────────────────────────────

/// Handle returned by `mountSidebar`.
///
/// Calls made from a `sidebar:*` event listener while the sidebar is still
/// dispatching are rejected with `SIDEBAR_BUSY`.
#[wasm_bindgen]
pub struct SidebarHandle {
    inner: SharedSidebar,
}

impl SidebarHandle {
    fn with_mut<R>(&self, f: impl FnOnce(&mut WebSidebar) -> R) -> Result<R, JsValue> {
        let mut sidebar = self.inner.try_borrow_mut().map_err(|_| busy())?;
        Ok(f(&mut sidebar))
    }

    fn with<R>(&self, f: impl FnOnce(&WebSidebar) -> R) -> Result<R, JsValue> {
        let sidebar = self.inner.try_borrow().map_err(|_| busy())?;
        Ok(f(&sidebar))
    }
}

#[wasm_bindgen]
impl SidebarHandle {
    pub fn toggle(&self) -> Result<(), JsValue> {
        self.with_mut(WebSidebar::toggle_sidebar)
    }

    pub fn expand(&self) -> Result<(), JsValue> {
        self.with_mut(WebSidebar::expand_sidebar)
    }

    pub fn collapse(&self) -> Result<(), JsValue> {
        self.with_mut(WebSidebar::collapse_sidebar)
    }

    /// Select a tab as if clicked. Resolves `false` for unknown tabs.
    #[wasm_bindgen(js_name = setActiveTab)]
    pub fn set_active_tab(&self, tab_name: &str) -> Result<bool, JsValue> {
        self.with_mut(|s| s.set_active_tab(tab_name))
    }

    /// Apply a partial filter record (`{year, province, ageGroup, nutrient, indicators}`).
    #[wasm_bindgen(js_name = updateFilters)]
    pub fn update_filters(&self, filters: JsValue) -> Result<(), JsValue> {
        let patch: FilterPatch = serde_wasm_bindgen::from_value(filters).map_err(|e| {
            to_js_error(&SidebarError::MalformedCommand {
                handler: "updateFilters".to_string(),
                reason: e.to_string(),
            })
        })?;
        self.with_mut(|s| s.update_filters(&patch))
    }

    #[wasm_bindgen(js_name = getCurrentFilters)]
    pub fn get_current_filters(&self) -> Result<JsValue, JsValue> {
        let filters = self.with(WebSidebar::get_current_filters)?;
        filters
            .serialize(&Serializer::json_compatible())
            .map_err(|e| JsValue::from_str(&format!("Conversion error: {e}")))
    }

    #[wasm_bindgen(getter, js_name = isCollapsed)]
    pub fn is_collapsed(&self) -> Result<bool, JsValue> {
        self.with(WebSidebar::is_collapsed)
    }

    #[wasm_bindgen(getter, js_name = isMobile)]
    pub fn is_mobile(&self) -> Result<bool, JsValue> {
        self.with(WebSidebar::is_mobile)
    }

    #[wasm_bindgen(getter, js_name = activeTab)]
    pub fn active_tab(&self) -> Result<Option<String>, JsValue> {
        self.with(WebSidebar::active_tab)
    }
}

fn busy() -> JsValue {
    let err = js_sys::Error::new("sidebar is dispatching an event; retry after it returns");
    err.set_name("SIDEBAR_BUSY");
    err.into()
}

fn to_js_error(err: &SidebarError) -> JsValue {
    let js = js_sys::Error::new(&err.to_string());
    js.set_name(err.error_type());
    js.into()
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

// ──────────────────────────────────────────────────────────────────────────────
// Document
// ──────────────────────────────────────────────────────────────────────────────

pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl Document for WebDocument {
    type Element = Element;

    fn mount(&self, tree: &Node) -> SidebarResult<()> {
        let body = self
            .document
            .body()
            .ok_or_else(|| SidebarError::Dom("document has no body".to_string()))?;
        body.insert_adjacent_html("afterbegin", &tree.render())
            .map_err(|e| SidebarError::Dom(format!("insert failed: {}", describe(&e))))
    }

    fn query(&self, query: &Query) -> Option<Element> {
        self.document.query_selector(&query.to_css()).ok().flatten()
    }

    fn query_all(&self, query: &Query) -> Vec<Element> {
        self.document
            .query_selector_all(&query.to_css())
            .map(elements)
            .unwrap_or_default()
    }

    fn query_in(&self, scope: &Element, query: &Query) -> Option<Element> {
        scope.query_selector(&query.to_css()).ok().flatten()
    }

    fn query_all_in(&self, scope: &Element, query: &Query) -> Vec<Element> {
        scope
            .query_selector_all(&query.to_css())
            .map(elements)
            .unwrap_or_default()
    }

    fn add_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().add_1(class);
    }

    fn remove_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().remove_1(class);
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_inner_html(&self, element: &Element, html: &str) {
        element.set_inner_html(html);
    }

    fn value(&self, element: &Element) -> Option<String> {
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            return Some(select.value());
        }
        element.dyn_ref::<HtmlInputElement>().map(HtmlInputElement::value)
    }

    fn set_value(&self, element: &Element, value: &str) {
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn is_checked(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlInputElement>()
            .is_some_and(HtmlInputElement::checked)
    }

    fn set_checked(&self, element: &Element, checked: bool) {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_checked(checked);
        }
    }

    fn force_reflow(&self, element: &Element) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let _ = html.offset_height();
        }
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0)
    }

    fn dispatch(&self, event: &SidebarEvent) {
        let detail = event
            .detail()
            .serialize(&Serializer::json_compatible())
            .unwrap_or(JsValue::NULL);
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_detail(&detail);
        let name = event.name();
        match CustomEvent::new_with_event_init_dict(&name, &init) {
            Ok(custom) => {
                if let Err(e) = self.document.dispatch_event(&custom) {
                    tracing::warn!(event = %name, "dispatch failed: {}", describe(&e));
                }
            }
            Err(e) => tracing::warn!(event = %name, "could not create event: {}", describe(&e)),
        }
    }
}

fn elements(list: web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

// ──────────────────────────────────────────────────────────────────────────────
// Storage, host bridge, timers
// ──────────────────────────────────────────────────────────────────────────────

struct LocalStorage(web_sys::Storage);

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> SidebarResult<Option<String>> {
        self.0
            .get_item(key)
            .map_err(|e| SidebarError::Storage(describe(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> SidebarResult<()> {
        self.0
            .set_item(key, value)
            .map_err(|e| SidebarError::Storage(describe(&e)))
    }
}

fn open_storage(window: &Window) -> Box<dyn Storage> {
    match window.local_storage() {
        Ok(Some(storage)) => Box::new(LocalStorage(storage)),
        Ok(None) | Err(_) => {
            tracing::warn!("localStorage unavailable; collapse state will not survive reloads");
            Box::new(MemoryStorage::new())
        }
    }
}

/// `window.Shiny`, looked up once at mount.
#[derive(Clone)]
pub struct ShinyBridge {
    shiny: JsValue,
}

impl ShinyBridge {
    fn detect(window: &Window) -> Option<Self> {
        let shiny = Reflect::get(window, &JsValue::from_str("Shiny")).ok()?;
        shiny.is_object().then_some(Self { shiny })
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.shiny, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn add_custom_message_handler(&self, name: &str, handler: &Function) -> SidebarResult<()> {
        let add = self.method("addCustomMessageHandler").ok_or_else(|| {
            SidebarError::Bridge("Shiny.addCustomMessageHandler is missing".to_string())
        })?;
        add.call2(&self.shiny, &JsValue::from_str(name), handler)
            .map(|_| ())
            .map_err(|e| SidebarError::Bridge(describe(&e)))
    }
}

impl HostBridge for ShinyBridge {
    fn set_input_value(&self, input: &OutboundInput) -> SidebarResult<()> {
        // Shiny installs setInputValue only after its session connects.
        let Some(set_input_value) = self.method("setInputValue") else {
            return Ok(());
        };
        let value = input
            .value
            .serialize(&Serializer::json_compatible())
            .map_err(|e| SidebarError::Bridge(e.to_string()))?;
        let options = Object::new();
        Reflect::set(
            &options,
            &JsValue::from_str("priority"),
            &JsValue::from_str(input.priority.as_str()),
        )
        .map_err(|e| SidebarError::Bridge(describe(&e)))?;
        set_input_value
            .call3(&self.shiny, &JsValue::from_str(input.name), &value, &options)
            .map(|_| ())
            .map_err(|e| SidebarError::Bridge(describe(&e)))
    }
}

fn register_host_commands(shiny: &ShinyBridge, sidebar: &Weak<RefCell<WebSidebar>>) {
    for handler in INBOUND_HANDLERS {
        let sidebar = sidebar.clone();
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |message: JsValue| {
            let command = serde_wasm_bindgen::from_value::<serde_json::Value>(message)
                .map_err(|e| SidebarError::MalformedCommand {
                    handler: handler.to_string(),
                    reason: e.to_string(),
                })
                .and_then(|value| HostCommand::parse(handler, value));
            match command {
                Ok(command) => {
                    with_sidebar(&sidebar, |s| s.handle_command(&command));
                }
                Err(e) => tracing::warn!("ignoring host message: {e}"),
            }
        });
        if let Err(e) = shiny.add_custom_message_handler(handler, callback.as_ref().unchecked_ref()) {
            tracing::warn!(handler, "could not register host handler: {e}");
        }
        callback.forget();
    }
}

struct TimeoutScheduler {
    window: Window,
    sidebar: Weak<RefCell<WebSidebar>>,
}

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, action: DeferredAction) {
        let sidebar = self.sidebar.clone();
        let callback = Closure::once_into_js(move || {
            with_sidebar(&sidebar, |s| s.run_deferred(action));
        });
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            tracing::warn!("setTimeout failed: {}", describe(&e));
        }
    }
}

/// Run `f` on the sidebar if it is still alive and not already borrowed.
fn with_sidebar<R>(
    sidebar: &Weak<RefCell<WebSidebar>>,
    f: impl FnOnce(&mut WebSidebar) -> R,
) -> Option<R> {
    let shared = sidebar.upgrade()?;
    let Ok(mut sidebar) = shared.try_borrow_mut() else {
        tracing::debug!("sidebar busy; dropping re-entrant callback");
        return None;
    };
    Some(f(&mut sidebar))
}

// ──────────────────────────────────────────────────────────────────────────────
// Event wiring
// ──────────────────────────────────────────────────────────────────────────────

fn listen(
    target: &EventTarget,
    name: &str,
    handler: impl FnMut(Event) + 'static,
) -> SidebarResult<()> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
        .map_err(|e| SidebarError::Dom(format!("addEventListener({name}): {}", describe(&e))))?;
    closure.forget();
    Ok(())
}

fn bind_events(
    shared: &SharedSidebar,
    window: &Window,
    document: &web_sys::Document,
) -> SidebarResult<()> {
    let sidebar = shared.borrow();
    let weak = Rc::downgrade(shared);

    if let Some(toggle) = sidebar.toggle_button() {
        let weak = weak.clone();
        listen(toggle, "click", move |event| {
            event.prevent_default();
            with_sidebar(&weak, WebSidebar::toggle_sidebar);
        })?;
    }

    let Some(root) = sidebar.root().cloned() else {
        return Err(SidebarError::Dom("sidebar is not mounted".to_string()));
    };
    let scoped = |query: &Query| sidebar.document().query_all_in(&root, query);

    for link in scoped(&Query::class(MENU_LINK_CLASS)) {
        let weak = weak.clone();
        let target = link.clone();
        listen(&link, "click", move |event| {
            event.prevent_default();
            with_sidebar(&weak, |s| s.handle_menu_click(&target));
        })?;
    }

    let selects = scoped(&Query::class(FILTER_INPUT_CLASS));
    let checkboxes = scoped(&Query::InputsWithin {
        class: CHECKBOX_GROUP_CLASS.to_string(),
        checked_only: false,
    });
    for input in selects.into_iter().chain(checkboxes) {
        let weak = weak.clone();
        listen(&input, "change", move |_| {
            with_sidebar(&weak, WebSidebar::handle_filter_change);
        })?;
    }

    {
        let weak = weak.clone();
        listen(document, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let consumed = with_sidebar(&weak, |s| s.handle_shortcut(&key.key(), key.ctrl_key()));
            if consumed == Some(true) {
                event.prevent_default();
            }
        })?;
    }

    {
        let weak = weak.clone();
        listen(window, "resize", move |_| {
            with_sidebar(&weak, WebSidebar::handle_responsive);
        })?;
    }

    // The toggle rewrites its own icon before this listener runs, so the
    // clicked icon may already be detached; use the dispatch path instead
    // of `contains`.
    listen(document, "click", move |event| {
        let inside = event.composed_path().includes(&root, 0);
        with_sidebar(&weak, |s| s.handle_outside_click(inside));
    })?;

    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// Utility exports
// ──────────────────────────────────────────────────────────────────────────────

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

//! The sidebar widget.
//!
//! [`Sidebar`] owns collapse state and mirrors the filter controls. It is
//! driven by the platform adapter: DOM listeners, resize, timers, and host
//! messages all end up calling one of its public methods. None of them fail;
//! a missing element or an unavailable host is skipped and logged.

use crate::bridge::{HostBridge, HostCommand, OutboundInput};
use crate::catalog::SELECT_FILTERS;
use crate::config::SidebarConfig;
use crate::dom::{Document, Query};
use crate::error::{Result, SidebarError};
use crate::events::SidebarEvent;
use crate::markup::{
    ACTIVE_CLASS, ANIMATED_TEXT_CLASSES, CHECKBOX_GROUP_CLASS, COLLAPSED_CLASS, DATA_TAB_ATTR,
    FADE_IN_CLASS, FADE_OUT_CLASS, MAIN_COLLAPSED_CLASS, MAIN_CONTENT_CLASS, MENU_LINK_CLASS,
    SIDEBAR_ROOT_ID, TOGGLE_ICON_HTML, TOGGLE_ID, sidebar_tree,
};
use crate::models::{CollapseState, FilterPatch, FilterSelection};
use crate::schedule::{DeferredAction, Scheduler};
use crate::storage::Storage;

pub struct Sidebar<D: Document> {
    document: D,
    storage: Box<dyn Storage>,
    bridge: Box<dyn HostBridge>,
    scheduler: Box<dyn Scheduler>,
    config: SidebarConfig,
    root: Option<D::Element>,
    toggle: Option<D::Element>,
    main_content: Option<D::Element>,
    state: CollapseState,
    is_mobile: bool,
    mounted: bool,
}

impl<D: Document> Sidebar<D> {
    /// Create an unmounted widget. The layout mode is sampled immediately;
    /// nothing touches the document until [`setup`](Self::setup).
    pub fn new(
        document: D,
        storage: Box<dyn Storage>,
        bridge: Box<dyn HostBridge>,
        scheduler: Box<dyn Scheduler>,
        config: SidebarConfig,
    ) -> Self {
        let is_mobile = config.is_mobile_width(document.viewport_width());
        Self {
            document,
            storage,
            bridge,
            scheduler,
            config,
            root: None,
            toggle: None,
            main_content: None,
            state: CollapseState::Expanded,
            is_mobile,
            mounted: false,
        }
    }

    /// Mount the markup, resolve element references, and reconcile the
    /// initial collapse state. Listener wiring is left to the adapter.
    pub fn setup(&mut self) -> Result<()> {
        if self.mounted {
            tracing::warn!("sidebar already mounted; ignoring setup");
            return Ok(());
        }
        if self.document.query(&Query::id(SIDEBAR_ROOT_ID)).is_some() {
            return Err(SidebarError::Dom(format!(
                "#{SIDEBAR_ROOT_ID} already exists; only one sidebar per page"
            )));
        }
        self.document.mount(&sidebar_tree(&self.config))?;
        self.mounted = true;

        self.root = self.document.query(&Query::id(SIDEBAR_ROOT_ID));
        self.toggle = self.document.query(&Query::id(TOGGLE_ID));
        if self.root.is_none() {
            return Err(SidebarError::Dom(format!(
                "#{SIDEBAR_ROOT_ID} missing after mount"
            )));
        }
        self.main_content = self.locate_main_content();

        self.update_sidebar_state();
        self.handle_responsive();
        tracing::debug!(
            state = ?self.state,
            is_mobile = self.is_mobile,
            main_content = self.main_content.is_some(),
            "sidebar mounted"
        );
        Ok(())
    }

    fn locate_main_content(&self) -> Option<D::Element> {
        let found = self
            .config
            .main_content_classes
            .iter()
            .find_map(|class| self.document.query(&Query::class(class)))?;
        if !self.document.has_class(&found, MAIN_CONTENT_CLASS) {
            self.document.add_class(&found, MAIN_CONTENT_CLASS);
        }
        Some(found)
    }

    // ── Collapse state ──────────────────────────────────────────────────

    pub fn toggle_sidebar(&mut self) {
        if self.state.is_collapsed() {
            self.expand_sidebar();
        } else {
            self.collapse_sidebar();
        }
    }

    pub fn expand_sidebar(&mut self) {
        self.apply_state(CollapseState::Expanded);
    }

    pub fn collapse_sidebar(&mut self) {
        self.apply_state(CollapseState::Collapsed);
    }

    fn apply_state(&mut self, state: CollapseState) {
        self.state = state;
        let collapsed = state.is_collapsed();

        if let Some(root) = &self.root {
            self.set_class(root, COLLAPSED_CLASS, collapsed);
        }
        if let Some(main) = &self.main_content {
            self.set_class(main, MAIN_COLLAPSED_CLASS, collapsed);
        }
        if let Some(toggle) = &self.toggle {
            self.document.set_inner_html(toggle, TOGGLE_ICON_HTML);
        }

        self.animate_text(if collapsed { FADE_OUT_CLASS } else { FADE_IN_CLASS });
        self.persist(state);
        self.document.dispatch(&if collapsed {
            SidebarEvent::Collapsed
        } else {
            SidebarEvent::Expanded
        });
        tracing::debug!(?state, "sidebar state applied");
    }

    fn set_class(&self, element: &D::Element, class: &str, on: bool) {
        if on {
            self.document.add_class(element, class);
        } else {
            self.document.remove_class(element, class);
        }
    }

    /// Descendants of the sidebar root matching `query`. Host-page elements
    /// sharing the sidebar's class names are never touched.
    fn query_all_in_sidebar(&self, query: &Query) -> Vec<D::Element> {
        self.root
            .as_ref()
            .map(|root| self.document.query_all_in(root, query))
            .unwrap_or_default()
    }

    fn animate_text(&self, animation: &str) {
        for element in self.query_all_in_sidebar(&Query::any_class(&ANIMATED_TEXT_CLASSES)) {
            self.document.remove_class(&element, FADE_IN_CLASS);
            self.document.remove_class(&element, FADE_OUT_CLASS);
            self.document.force_reflow(&element);
            self.document.add_class(&element, animation);
        }
    }

    fn persist(&self, state: CollapseState) {
        if let Err(e) = self
            .storage
            .set_item(&self.config.storage_key, state.as_stored())
        {
            tracing::warn!("failed to persist sidebar state: {e}");
        }
    }

    fn persisted_state(&self) -> CollapseState {
        match self.storage.get_item(&self.config.storage_key) {
            Ok(value) => CollapseState::from_stored(value.as_deref()),
            Err(e) => {
                tracing::warn!("failed to read sidebar state: {e}");
                CollapseState::Expanded
            }
        }
    }

    // ── Layout ──────────────────────────────────────────────────────────

    /// Re-evaluate the breakpoint after a resize.
    pub fn handle_responsive(&mut self) {
        let was_mobile = self.is_mobile;
        self.is_mobile = self
            .config
            .is_mobile_width(self.document.viewport_width());
        if was_mobile == self.is_mobile {
            return;
        }
        tracing::debug!(is_mobile = self.is_mobile, "layout breakpoint crossed");
        if self.is_mobile || self.persisted_state().is_collapsed() {
            self.collapse_sidebar();
        } else {
            self.expand_sidebar();
        }
    }

    /// Initial reconciliation: desktop restores a persisted collapse, mobile
    /// always starts collapsed.
    pub fn update_sidebar_state(&mut self) {
        if self.is_mobile || self.persisted_state().is_collapsed() {
            self.collapse_sidebar();
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────

    pub fn handle_menu_click(&mut self, link: &D::Element) {
        for other in self.query_all_in_sidebar(&Query::class(MENU_LINK_CLASS)) {
            self.document.remove_class(&other, ACTIVE_CLASS);
        }
        self.document.add_class(link, ACTIVE_CLASS);

        let tab_name = self.document.attribute(link, DATA_TAB_ATTR);
        if tab_name.is_none() {
            tracing::warn!("clicked menu link has no {DATA_TAB_ATTR}");
        }

        self.send(&OutboundInput::tab_change(tab_name.as_deref()));
        if self.is_mobile {
            self.scheduler
                .schedule(self.config.mobile_collapse_delay(), DeferredAction::Collapse);
        }
        tracing::debug!(tab = ?tab_name, "menu item selected");
        self.document
            .dispatch(&SidebarEvent::MenuItemSelected { tab_name });
    }

    /// Select `tab_name` as if its link were clicked. Returns `false` when no
    /// link carries that identifier.
    pub fn set_active_tab(&mut self, tab_name: &str) -> bool {
        let query = Query::ClassWithAttr {
            class: MENU_LINK_CLASS.to_string(),
            name: DATA_TAB_ATTR.to_string(),
            value: tab_name.to_string(),
        };
        let link = self
            .root
            .as_ref()
            .and_then(|root| self.document.query_in(root, &query));
        match link {
            Some(link) => {
                self.handle_menu_click(&link);
                true
            }
            None => {
                tracing::debug!(tab = tab_name, "setActiveTab: unknown tab");
                false
            }
        }
    }

    /// Identifier of the link currently marked active.
    #[must_use]
    pub fn active_tab(&self) -> Option<String> {
        self.query_all_in_sidebar(&Query::class(MENU_LINK_CLASS))
            .into_iter()
            .find(|link| self.document.has_class(link, ACTIVE_CLASS))
            .and_then(|link| self.document.attribute(&link, DATA_TAB_ATTR))
    }

    // ── Filters ─────────────────────────────────────────────────────────

    pub fn handle_filter_change(&mut self) {
        let filters = self.get_current_filters();
        match OutboundInput::filters(&filters) {
            Ok(input) => self.send(&input),
            Err(e) => tracing::warn!("failed to encode filters: {e}"),
        }
        self.document
            .dispatch(&SidebarEvent::FiltersChanged { filters });
    }

    /// Read every control live from the document.
    #[must_use]
    pub fn get_current_filters(&self) -> FilterSelection {
        let [year, province, age_group, nutrient] =
            SELECT_FILTERS.map(|filter| self.control_value(filter.id));
        let indicators = self
            .document
            .query_all(&Query::InputsWithin {
                class: CHECKBOX_GROUP_CLASS.to_string(),
                checked_only: true,
            })
            .iter()
            .filter_map(|cb| self.document.value(cb))
            .collect();
        FilterSelection {
            year,
            province,
            age_group,
            nutrient,
            indicators,
        }
    }

    fn control_value(&self, id: &str) -> Option<String> {
        self.document
            .query(&Query::id(id))
            .and_then(|el| self.document.value(&el))
    }

    /// Apply a host-supplied patch. Does not notify the host back.
    pub fn update_filters(&mut self, patch: &FilterPatch) {
        let scalars = [&patch.year, &patch.province, &patch.age_group, &patch.nutrient];
        for (filter, value) in SELECT_FILTERS.iter().zip(scalars) {
            let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Some(control) = self.document.query(&Query::id(filter.id)) {
                self.document.set_value(&control, value);
            }
        }

        if let Some(indicators) = &patch.indicators {
            let checkboxes = self.document.query_all(&Query::InputsWithin {
                class: CHECKBOX_GROUP_CLASS.to_string(),
                checked_only: false,
            });
            for cb in checkboxes {
                let checked = self
                    .document
                    .value(&cb)
                    .is_some_and(|v| indicators.contains(&v));
                self.document.set_checked(&cb, checked);
            }
        }
    }

    // ── Host and platform entry points ─────────────────────────────────

    pub fn handle_command(&mut self, command: &HostCommand) {
        tracing::debug!(handler = command.handler(), "host command");
        match command {
            HostCommand::UpdateFilters(patch) => self.update_filters(patch),
            HostCommand::SetActiveTab { tab_name } => {
                self.set_active_tab(tab_name);
            }
        }
    }

    pub fn run_deferred(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::Collapse => self.collapse_sidebar(),
        }
    }

    /// Keyboard shortcut handler. Returns `true` when the key was consumed
    /// and the default browser action should be suppressed.
    pub fn handle_shortcut(&mut self, key: &str, ctrl: bool) -> bool {
        if self.config.keyboard_shortcut && ctrl && key == "b" {
            self.toggle_sidebar();
            return true;
        }
        false
    }

    /// Document click. On mobile, a click outside the open panel closes it.
    pub fn handle_outside_click(&mut self, inside_sidebar: bool) {
        if self.is_mobile && !inside_sidebar && !self.state.is_collapsed() {
            self.collapse_sidebar();
        }
    }

    fn send(&self, input: &OutboundInput) {
        if let Err(e) = self.bridge.set_input_value(input) {
            tracing::warn!(input = input.name, "host bridge rejected input: {e}");
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub const fn state(&self) -> CollapseState {
        self.state
    }

    #[must_use]
    pub const fn is_collapsed(&self) -> bool {
        self.state.is_collapsed()
    }

    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.is_mobile
    }

    #[must_use]
    pub const fn document(&self) -> &D {
        &self.document
    }

    #[must_use]
    pub const fn root(&self) -> Option<&D::Element> {
        self.root.as_ref()
    }

    #[must_use]
    pub const fn toggle_button(&self) -> Option<&D::Element> {
        self.toggle.as_ref()
    }
}

//! In-memory implementations of the widget's capabilities.
//!
//! [`MemoryDocument`] models just enough of the DOM for the sidebar: an
//! element arena built from [`Node`] trees, class lists, `<select>` values
//! constrained to their options, checkbox state, a settable viewport width,
//! and a log of dispatched events. [`RecordingBridge`] and
//! [`ManualScheduler`] record what the widget sends and schedules.
//!
//! ```rust
//! use nutrition_sidebar_core::testing::{ManualScheduler, MemoryDocument, RecordingBridge};
//! use nutrition_sidebar_core::{MemoryStorage, Sidebar, SidebarConfig};
//!
//! let mut sidebar = Sidebar::new(
//!     MemoryDocument::new(1280.0),
//!     Box::new(MemoryStorage::new()),
//!     Box::new(RecordingBridge::new()),
//!     Box::new(ManualScheduler::new()),
//!     SidebarConfig::default(),
//! );
//! sidebar.setup().unwrap();
//! assert!(!sidebar.is_collapsed());
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;

use crate::bridge::{HostBridge, OutboundInput};
use crate::dom::{Document, Query};
use crate::error::{Result, SidebarError};
use crate::events::SidebarEvent;
use crate::markup::{Child, Node};
use crate::schedule::{DeferredAction, Scheduler};

const BODY: usize = 0;

#[derive(Debug, Clone)]
struct Element {
    tag: &'static str,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    inner_html: Option<String>,
    value: Option<String>,
    checked: bool,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// A dispatched `CustomEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub detail: Value,
}

#[derive(Debug)]
pub struct MemoryDocument {
    elements: RefCell<Vec<Element>>,
    viewport_width: Cell<f64>,
    events: RefCell<Vec<RecordedEvent>>,
    reflows: Cell<usize>,
    fail_mount: bool,
}

impl MemoryDocument {
    /// Empty `<body>` at the given viewport width.
    #[must_use]
    pub fn new(viewport_width: f64) -> Self {
        let body = Element {
            tag: "body",
            classes: Vec::new(),
            attrs: Vec::new(),
            inner_html: None,
            value: None,
            checked: false,
            parent: None,
            children: Vec::new(),
        };
        Self {
            elements: RefCell::new(vec![body]),
            viewport_width: Cell::new(viewport_width),
            events: RefCell::new(Vec::new()),
            reflows: Cell::new(0),
            fail_mount: false,
        }
    }

    /// Append host-page content to `<body>` before the sidebar mounts.
    #[must_use]
    pub fn with_page(self, page: &Node) -> Self {
        let idx = self.insert_tree(page, BODY);
        self.elements.borrow_mut()[BODY].children.push(idx);
        self
    }

    /// A document whose body rejects insertion.
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.fail_mount = true;
        self
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.viewport_width.set(width);
    }

    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.events.borrow().iter().map(|e| e.name.clone()).collect()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    #[must_use]
    pub fn reflow_count(&self) -> usize {
        self.reflows.get()
    }

    /// Classes of the first element matching `query`.
    #[must_use]
    pub fn classes_of(&self, query: &Query) -> Option<Vec<String>> {
        self.query(query)
            .map(|idx| self.elements.borrow()[idx].classes.clone())
    }

    #[must_use]
    pub fn inner_html_of(&self, query: &Query) -> Option<String> {
        self.query(query)
            .and_then(|idx| self.elements.borrow()[idx].inner_html.clone())
    }

    /// Tag names of `<body>`'s direct children, in order.
    #[must_use]
    pub fn body_children(&self) -> Vec<&'static str> {
        let elements = self.elements.borrow();
        elements[BODY]
            .children
            .iter()
            .map(|&idx| elements[idx].tag)
            .collect()
    }

    /// Simulate a user picking a value in a control.
    pub fn select(&self, id: &str, value: &str) {
        if let Some(idx) = self.query(&Query::id(id)) {
            self.set_value(&idx, value);
        }
    }

    /// Simulate a user toggling a checkbox.
    pub fn check(&self, id: &str, checked: bool) {
        if let Some(idx) = self.query(&Query::id(id)) {
            self.set_checked(&idx, checked);
        }
    }

    /// Remove the first element matching `query` (and its subtree) from the
    /// tree.
    pub fn detach(&self, query: &Query) {
        if let Some(idx) = self.query(query) {
            let mut elements = self.elements.borrow_mut();
            if let Some(parent) = elements[idx].parent.take() {
                elements[parent].children.retain(|&c| c != idx);
            }
        }
    }

    fn insert_tree(&self, node: &Node, parent: usize) -> usize {
        let value = match node.tag {
            "input" | "option" => node.get_attr("value").map(str::to_string),
            "select" => node
                .children
                .iter()
                .filter_map(|c| match c {
                    Child::Element(opt) if opt.tag == "option" => Some(opt),
                    _ => None,
                })
                .find(|opt| opt.get_attr("selected").is_some())
                .or_else(|| {
                    node.children.iter().find_map(|c| match c {
                        Child::Element(opt) if opt.tag == "option" => Some(opt),
                        _ => None,
                    })
                })
                .and_then(|opt| opt.get_attr("value"))
                .map(str::to_string),
            _ => None,
        };
        let idx = {
            let mut elements = self.elements.borrow_mut();
            elements.push(Element {
                tag: node.tag,
                classes: node.classes.clone(),
                attrs: node.attrs.clone(),
                inner_html: None,
                value,
                checked: node.get_attr("checked").is_some(),
                parent: Some(parent),
                children: Vec::new(),
            });
            elements.len() - 1
        };
        for child in &node.children {
            if let Child::Element(child) = child {
                let child_idx = self.insert_tree(child, idx);
                self.elements.borrow_mut()[idx].children.push(child_idx);
            }
        }
        idx
    }

    fn has_ancestor_with_class(elements: &[Element], idx: usize, class: &str) -> bool {
        let mut cursor = elements[idx].parent;
        while let Some(parent) = cursor {
            if elements[parent].has_class(class) {
                return true;
            }
            cursor = elements[parent].parent;
        }
        false
    }

    fn matches(elements: &[Element], idx: usize, query: &Query) -> bool {
        let el = &elements[idx];
        match query {
            Query::Id(id) => el.attr("id") == Some(id.as_str()),
            Query::Class(class) => el.has_class(class),
            Query::AnyClass(classes) => classes.iter().any(|c| el.has_class(c)),
            Query::ClassWithAttr { class, name, value } => {
                el.has_class(class) && el.attr(name) == Some(value.as_str())
            }
            Query::InputsWithin {
                class,
                checked_only,
            } => {
                el.tag == "input"
                    && (!checked_only || el.checked)
                    && Self::has_ancestor_with_class(elements, idx, class)
            }
        }
    }

    /// Descendants of `scope` matching `query`, in document order.
    fn collect(&self, scope: usize, query: &Query) -> Vec<usize> {
        let elements = self.elements.borrow();
        let mut out = Vec::new();
        let mut stack = vec![scope];
        while let Some(idx) = stack.pop() {
            if idx != scope && Self::matches(&elements, idx, query) {
                out.push(idx);
            }
            stack.extend(elements[idx].children.iter().rev());
        }
        out
    }
}

impl Document for MemoryDocument {
    type Element = usize;

    fn mount(&self, tree: &Node) -> Result<()> {
        if self.fail_mount {
            return Err(SidebarError::Dom("document has no body".to_string()));
        }
        let idx = self.insert_tree(tree, BODY);
        self.elements.borrow_mut()[BODY].children.insert(0, idx);
        Ok(())
    }

    fn query(&self, query: &Query) -> Option<usize> {
        self.collect(BODY, query).into_iter().next()
    }

    fn query_all(&self, query: &Query) -> Vec<usize> {
        self.collect(BODY, query)
    }

    fn query_in(&self, scope: &usize, query: &Query) -> Option<usize> {
        self.collect(*scope, query).into_iter().next()
    }

    fn query_all_in(&self, scope: &usize, query: &Query) -> Vec<usize> {
        self.collect(*scope, query)
    }

    fn add_class(&self, element: &usize, class: &str) {
        let mut elements = self.elements.borrow_mut();
        let el = &mut elements[*element];
        if !el.has_class(class) {
            el.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, element: &usize, class: &str) {
        self.elements.borrow_mut()[*element]
            .classes
            .retain(|c| c != class);
    }

    fn has_class(&self, element: &usize, class: &str) -> bool {
        self.elements.borrow()[*element].has_class(class)
    }

    fn attribute(&self, element: &usize, name: &str) -> Option<String> {
        let elements = self.elements.borrow();
        let el = &elements[*element];
        if name == "class" {
            return Some(el.classes.join(" "));
        }
        el.attr(name).map(str::to_string)
    }

    fn set_inner_html(&self, element: &usize, html: &str) {
        self.elements.borrow_mut()[*element].inner_html = Some(html.to_string());
    }

    fn value(&self, element: &usize) -> Option<String> {
        let elements = self.elements.borrow();
        let el = &elements[*element];
        match el.tag {
            "select" | "input" => Some(el.value.clone().unwrap_or_default()),
            _ => None,
        }
    }

    /// Like the browser, a `<select>` given a value none of its options
    /// carry ends up with no selection (`""`).
    fn set_value(&self, element: &usize, value: &str) {
        let mut elements = self.elements.borrow_mut();
        let new_value = if elements[*element].tag == "select" {
            let known = elements[*element]
                .children
                .iter()
                .any(|&opt| elements[opt].value.as_deref() == Some(value));
            if known { value.to_string() } else { String::new() }
        } else {
            value.to_string()
        };
        elements[*element].value = Some(new_value);
    }

    fn is_checked(&self, element: &usize) -> bool {
        self.elements.borrow()[*element].checked
    }

    fn set_checked(&self, element: &usize, checked: bool) {
        self.elements.borrow_mut()[*element].checked = checked;
    }

    fn force_reflow(&self, _element: &usize) {
        self.reflows.set(self.reflows.get() + 1);
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width.get()
    }

    fn dispatch(&self, event: &SidebarEvent) {
        self.events.borrow_mut().push(RecordedEvent {
            name: event.name(),
            detail: event.detail(),
        });
    }
}

/// Bridge that records every input it is given. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    sent: Rc<RefCell<Vec<OutboundInput>>>,
    failing: bool,
}

impl RecordingBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge that rejects every send (after recording it).
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sent(&self) -> Vec<OutboundInput> {
        self.sent.borrow().clone()
    }

    #[must_use]
    pub fn sent_to(&self, name: &str) -> Vec<Value> {
        self.sent
            .borrow()
            .iter()
            .filter(|i| i.name == name)
            .map(|i| i.value.clone())
            .collect()
    }
}

impl HostBridge for RecordingBridge {
    fn set_input_value(&self, input: &OutboundInput) -> Result<()> {
        self.sent.borrow_mut().push(input.clone());
        if self.failing {
            return Err(SidebarError::Bridge("host disconnected".to_string()));
        }
        Ok(())
    }
}

/// Scheduler that holds actions until the test fires them. Clones share the
/// queue.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: Rc<RefCell<Vec<(Duration, DeferredAction)>>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> Vec<(Duration, DeferredAction)> {
        self.pending.borrow().clone()
    }

    /// Remove and return every pending action, in scheduling order.
    #[must_use]
    pub fn take_due(&self) -> Vec<DeferredAction> {
        self.pending
            .borrow_mut()
            .drain(..)
            .map(|(_, action)| action)
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, action: DeferredAction) {
        self.pending.borrow_mut().push((delay, action));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SidebarConfig;
    use crate::markup::sidebar_tree;

    fn mounted() -> MemoryDocument {
        let doc = MemoryDocument::new(1024.0)
            .with_page(&Node::new("div").class("content-wrapper"));
        doc.mount(&sidebar_tree(&SidebarConfig::default())).unwrap();
        doc
    }

    #[test]
    fn mount_inserts_before_existing_content() {
        let doc = mounted();
        assert_eq!(doc.body_children(), vec!["div", "div"]);
        let in_order = doc.query_all(&Query::any_class(&["content-wrapper", "sidebar-container"]));
        let first = doc.attribute(&in_order[0], "class").unwrap();
        assert_eq!(first, "sidebar-container");
        assert_eq!(doc.query_all(&Query::class("sidebar-menu-link")).len(), 10);
    }

    #[test]
    fn selects_default_to_first_option() {
        let doc = mounted();
        let year = doc.query(&Query::id("filter-year")).unwrap();
        assert_eq!(doc.value(&year).as_deref(), Some("2020"));
        let province = doc.query(&Query::id("filter-province")).unwrap();
        assert_eq!(doc.value(&province).as_deref(), Some("all"));
    }

    #[test]
    fn select_rejects_unknown_values() {
        let doc = mounted();
        let year = doc.query(&Query::id("filter-year")).unwrap();
        doc.set_value(&year, "2017");
        assert_eq!(doc.value(&year).as_deref(), Some("2017"));
        doc.set_value(&year, "1999");
        assert_eq!(doc.value(&year).as_deref(), Some(""));
    }

    #[test]
    fn checked_query_tracks_state() {
        let doc = mounted();
        let checked = Query::InputsWithin {
            class: "sidebar-checkbox-group".into(),
            checked_only: true,
        };
        assert_eq!(doc.query_all(&checked).len(), 3);
        doc.check("indicator-wasting", false);
        assert_eq!(doc.query_all(&checked).len(), 2);
    }

    #[test]
    fn query_all_is_in_document_order() {
        let doc = mounted();
        let tabs: Vec<_> = doc
            .query_all(&Query::class("sidebar-menu-link"))
            .iter()
            .filter_map(|l| doc.attribute(l, "data-tab"))
            .collect();
        assert_eq!(tabs.first().map(String::as_str), Some("language"));
        assert_eq!(tabs.last().map(String::as_str), Some("reports"));
    }

    #[test]
    fn scoped_queries_stay_inside_the_scope() {
        let doc = MemoryDocument::new(1024.0).with_page(
            &Node::new("div")
                .class("content-wrapper")
                .child(Node::new("a").class("sidebar-menu-link")),
        );
        doc.mount(&sidebar_tree(&SidebarConfig::default())).unwrap();
        let root = doc.query(&Query::id("modern-sidebar")).unwrap();
        let link = Query::class("sidebar-menu-link");
        assert_eq!(doc.query_all(&link).len(), 11);
        assert_eq!(doc.query_all_in(&root, &link).len(), 10);
        let page = doc.query(&Query::class("content-wrapper")).unwrap();
        assert!(doc.query_in(&page, &Query::id("modern-sidebar")).is_none());
    }

    #[test]
    fn detached_elements_are_not_found() {
        let doc = mounted();
        doc.detach(&Query::id("filter-nutrient"));
        assert!(doc.query(&Query::id("filter-nutrient")).is_none());
    }

    #[test]
    fn recording_bridge_and_scheduler_share_state_across_clones() {
        let bridge = RecordingBridge::new();
        let view = bridge.clone();
        bridge
            .set_input_value(&OutboundInput::tab_change(Some("trends")))
            .unwrap();
        assert_eq!(view.sent_to("sidebar_tab_change"), vec![Value::from("trends")]);

        let scheduler = ManualScheduler::new();
        let view = scheduler.clone();
        scheduler.schedule(Duration::from_millis(300), DeferredAction::Collapse);
        assert_eq!(view.take_due(), vec![DeferredAction::Collapse]);
        assert!(scheduler.pending().is_empty());
    }
}

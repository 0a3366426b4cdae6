//! Typed markup tree for the sidebar.
//!
//! The sidebar is built as a [`Node`] tree and rendered to HTML once at mount
//! time. Element ids and class names are shared with the dashboard stylesheet
//! and must not change.

use std::fmt::{self, Write as _};

use crate::catalog::{INDICATORS_LABEL, MENU_ENTRIES, SELECT_FILTERS, SelectFilter, indicator_checkbox_id};
use crate::config::SidebarConfig;
use crate::models::Indicator;

pub const SIDEBAR_ROOT_ID: &str = "modern-sidebar";
pub const TOGGLE_ID: &str = "sidebar-toggle";

pub const MENU_LINK_CLASS: &str = "sidebar-menu-link";
pub const FILTER_INPUT_CLASS: &str = "sidebar-filter-input";
pub const CHECKBOX_GROUP_CLASS: &str = "sidebar-checkbox-group";
pub const DATA_TAB_ATTR: &str = "data-tab";

pub const ACTIVE_CLASS: &str = "active";
pub const COLLAPSED_CLASS: &str = "collapsed";
/// Added to the main-content region while the sidebar is collapsed.
pub const MAIN_COLLAPSED_CLASS: &str = "sidebar-collapsed";
/// Marker the stylesheet expects on the main-content region.
pub const MAIN_CONTENT_CLASS: &str = "main-content";

pub const FADE_IN_CLASS: &str = "fade-in";
pub const FADE_OUT_CLASS: &str = "fade-out";
/// Elements whose text fades on collapse/expand.
pub const ANIMATED_TEXT_CLASSES: [&str; 3] = [
    "sidebar-menu-text",
    "sidebar-filters-title",
    "sidebar-filter-label",
];

/// Toggle button content. The same icon is used in both states.
pub const TOGGLE_ICON_HTML: &str = r#"<i class="fas fa-bars"></i>"#;

const VOID_TAGS: [&str; 2] = ["input", "br"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Element(Node),
    Text(String),
}

/// An element with attributes and children.
///
/// `class` is kept apart from the other attributes so callers can build it
/// up incrementally; boolean attributes are stored with an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: &'static str,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Child>,
}

impl Node {
    #[must_use]
    pub const fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn flag(self, name: &str) -> Self {
        self.attr(name, "")
    }

    #[must_use]
    pub fn child(mut self, node: Self) -> Self {
        self.children.push(Child::Element(node));
        self
    }

    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(nodes.into_iter().map(Child::Element));
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Child::Text(text.to_string()));
        self
    }

    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        if name == "class" {
            return None;
        }
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn element_id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Depth-first search over this node and its descendants.
    #[must_use]
    pub fn find(&self, pred: &dyn Fn(&Self) -> bool) -> Option<&Self> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| match child {
            Child::Element(node) => node.find(pred),
            Child::Text(_) => None,
        })
    }

    /// Render to an HTML string.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        if !self.classes.is_empty() {
            write!(f, " class=\"{}\"", escape(&self.classes.join(" ")))?;
        }
        for (name, value) in &self.attrs {
            if value.is_empty() && name != "href" && name != "value" {
                write!(f, " {name}")?;
            } else {
                write!(f, " {name}=\"{}\"", escape(value))?;
            }
        }
        f.write_char('>')?;
        if VOID_TAGS.contains(&self.tag) {
            return Ok(());
        }
        for child in &self.children {
            match child {
                Child::Element(node) => write!(f, "{node}")?,
                Child::Text(text) => f.write_str(&escape(text))?,
            }
        }
        write!(f, "</{}>", self.tag)
    }
}

/// Escape text for use in element content or a double-quoted attribute.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn icon(classes: &str) -> Node {
    Node::new("i").class(classes)
}

fn header(config: &SidebarConfig) -> Node {
    Node::new("div").class("sidebar-header").children([
        Node::new("a")
            .class("sidebar-logo")
            .attr("href", "#")
            .child(Node::new("div").class("sidebar-logo-icon").child(icon("fas fa-chart-line")))
            .child(Node::new("span").class("sidebar-logo-text").text(&config.brand_title)),
        Node::new("button")
            .class("sidebar-toggle")
            .id(TOGGLE_ID)
            .attr("aria-label", "Toggle navigation")
            .child(icon("fas fa-bars")),
    ])
}

fn menu() -> Node {
    let items = MENU_ENTRIES.iter().map(|entry| {
        Node::new("li").class("sidebar-menu-item").child(
            Node::new("a")
                .class(MENU_LINK_CLASS)
                .attr("href", "#")
                .attr(DATA_TAB_ATTR, entry.tab)
                .attr("data-tooltip", entry.label)
                .child(icon(&format!("sidebar-menu-icon fas {}", entry.icon)))
                .child(Node::new("span").class("sidebar-menu-text").text(entry.label)),
        )
    });
    Node::new("nav")
        .class("sidebar-nav")
        .child(Node::new("ul").class("sidebar-menu").children(items))
}

fn filter_label(text: &str) -> Node {
    Node::new("label").class("sidebar-filter-label").text(text)
}

fn select_group(filter: &SelectFilter) -> Node {
    let options = filter
        .options
        .iter()
        .map(|o| Node::new("option").attr("value", o.value).text(o.label));
    Node::new("div").class("sidebar-filter-group").children([
        filter_label(filter.label),
        Node::new("select")
            .class(FILTER_INPUT_CLASS)
            .id(filter.id)
            .children(options),
    ])
}

fn indicator_group() -> Node {
    let boxes = Indicator::ALL.into_iter().map(|indicator| {
        Node::new("label").class("sidebar-checkbox-item").children([
            Node::new("input")
                .attr("type", "checkbox")
                .id(&indicator_checkbox_id(indicator))
                .attr("value", indicator.value())
                .flag("checked"),
            Node::new("span").text(indicator.label()),
        ])
    });
    Node::new("div").class("sidebar-filter-group").children([
        filter_label(INDICATORS_LABEL),
        Node::new("div").class(CHECKBOX_GROUP_CLASS).children(boxes),
    ])
}

fn filters() -> Node {
    Node::new("div")
        .class("sidebar-filters")
        .child(Node::new("h5").class("sidebar-filters-title").text("Global Filters"))
        .children(SELECT_FILTERS.into_iter().map(select_group))
        .child(indicator_group())
}

/// The complete sidebar tree, inserted as the first child of `<body>`.
#[must_use]
pub fn sidebar_tree(config: &SidebarConfig) -> Node {
    Node::new("div")
        .class("sidebar-container")
        .id(SIDEBAR_ROOT_ID)
        .children([header(config), menu(), filters()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Node {
        sidebar_tree(&SidebarConfig::default())
    }

    #[test]
    fn root_and_toggle_identifiers_are_preserved() {
        let root = tree();
        assert_eq!(root.element_id(), Some(SIDEBAR_ROOT_ID));
        assert!(root.has_class("sidebar-container"));
        let toggle = root.find(&|n| n.element_id() == Some(TOGGLE_ID)).unwrap();
        assert_eq!(toggle.tag, "button");
        assert_eq!(toggle.get_attr("aria-label"), Some("Toggle navigation"));
    }

    #[test]
    fn every_menu_entry_becomes_a_tab_link() {
        let root = tree();
        for entry in MENU_ENTRIES {
            let link = root
                .find(&|n| n.get_attr(DATA_TAB_ATTR) == Some(entry.tab))
                .unwrap_or_else(|| panic!("missing link for {}", entry.tab));
            assert!(link.has_class(MENU_LINK_CLASS));
            assert_eq!(link.get_attr("data-tooltip"), Some(entry.label));
            let label = format!(">{}</span>", escape(entry.label));
            assert!(link.render().contains(&label), "{}", link.render());
        }
    }

    #[test]
    fn selects_carry_filter_ids() {
        let root = tree();
        for filter in SELECT_FILTERS {
            let select = root.find(&|n| n.element_id() == Some(filter.id)).unwrap();
            assert_eq!(select.tag, "select");
            assert!(select.has_class(FILTER_INPUT_CLASS));
            assert_eq!(select.children.len(), filter.options.len());
        }
    }

    #[test]
    fn indicators_start_checked() {
        let html = tree().render();
        assert!(html.contains(
            r#"<input type="checkbox" id="indicator-stunting" value="stunting" checked>"#
        ));
        assert!(html.contains(r#"id="indicator-anemia""#));
    }

    #[test]
    fn render_escapes_text_and_attributes() {
        let html = tree().render();
        assert!(html.contains(r#"data-tooltip="Export &amp; Reports""#));
        assert!(html.contains(">Urwego rw&#39;amavuko</label>"));
        assert!(html.starts_with(r#"<div class="sidebar-container" id="modern-sidebar">"#));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn brand_title_comes_from_config() {
        let config = SidebarConfig {
            brand_title: "<Demo>".into(),
            ..SidebarConfig::default()
        };
        let html = sidebar_tree(&config).render();
        assert!(html.contains(r#"<span class="sidebar-logo-text">&lt;Demo&gt;</span>"#));
    }

    #[test]
    fn toggle_icon_matches_initial_markup() {
        let root = tree();
        let toggle = root.find(&|n| n.element_id() == Some(TOGGLE_ID)).unwrap();
        let inner: String = toggle
            .children
            .iter()
            .map(|c| match c {
                Child::Element(n) => n.render(),
                Child::Text(t) => t.clone(),
            })
            .collect();
        assert_eq!(inner, TOGGLE_ICON_HTML);
    }
}

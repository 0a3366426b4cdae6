//! Document capability used by the sidebar.
//!
//! The widget never talks to a concrete DOM. It asks a [`Document`] for
//! elements by [`Query`] and manipulates them through the trait, so the same
//! logic runs against the browser (`web-sys`) and the in-memory document used
//! in tests. Lookups that find nothing return `None`/empty and callers skip
//! the write.

use crate::error::Result;
use crate::events::SidebarEvent;
use crate::markup::Node;

/// Element lookup, translatable to a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Id(String),
    Class(String),
    /// Elements carrying any of the classes
    AnyClass(Vec<String>),
    /// Elements with `class` whose attribute `name` equals `value`
    ClassWithAttr {
        class: String,
        name: String,
        value: String,
    },
    /// `<input>` descendants of elements with `class`
    InputsWithin { class: String, checked_only: bool },
}

impl Query {
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self::Id(id.to_string())
    }

    #[must_use]
    pub fn class(class: &str) -> Self {
        Self::Class(class.to_string())
    }

    #[must_use]
    pub fn any_class(classes: &[&str]) -> Self {
        Self::AnyClass(classes.iter().map(|c| (*c).to_string()).collect())
    }

    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => format!("#{}", css_ident(id)),
            Self::Class(class) => format!(".{}", css_ident(class)),
            Self::AnyClass(classes) => classes
                .iter()
                .map(|c| format!(".{}", css_ident(c)))
                .collect::<Vec<_>>()
                .join(", "),
            Self::ClassWithAttr { class, name, value } => format!(
                ".{}[{}=\"{}\"]",
                css_ident(class),
                css_ident(name),
                css_string(value)
            ),
            Self::InputsWithin {
                class,
                checked_only,
            } => {
                let suffix = if *checked_only { ":checked" } else { "" };
                format!(".{} input{suffix}", css_ident(class))
            }
        }
    }
}

/// Escape an identifier for a CSS selector.
fn css_ident(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, ch) in raw.chars().enumerate() {
        let plain = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii();
        if plain && !(i == 0 && ch.is_ascii_digit()) {
            out.push(ch);
        } else if ch.is_ascii_digit() {
            out.push_str(&format!("\\{:x} ", u32::from(ch)));
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

/// Escape the body of a double-quoted CSS string.
fn css_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

/// DOM operations the sidebar needs.
///
/// `Element` is an opaque handle: a `web_sys::Element` in the browser, an
/// index in the in-memory document.
pub trait Document {
    type Element: Clone;

    /// Insert `tree` as the first child of `<body>`.
    fn mount(&self, tree: &Node) -> Result<()>;

    fn query(&self, query: &Query) -> Option<Self::Element>;
    fn query_all(&self, query: &Query) -> Vec<Self::Element>;

    /// Like [`query`](Self::query), restricted to descendants of `scope`.
    fn query_in(&self, scope: &Self::Element, query: &Query) -> Option<Self::Element>;
    fn query_all_in(&self, scope: &Self::Element, query: &Query) -> Vec<Self::Element>;

    fn add_class(&self, element: &Self::Element, class: &str);
    fn remove_class(&self, element: &Self::Element, class: &str);
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_inner_html(&self, element: &Self::Element, html: &str);

    /// Current `value` of a `<select>` or `<input>`; `None` for other elements.
    fn value(&self, element: &Self::Element) -> Option<String>;
    fn set_value(&self, element: &Self::Element, value: &str);

    fn is_checked(&self, element: &Self::Element) -> bool;
    fn set_checked(&self, element: &Self::Element, checked: bool);

    /// Force a synchronous layout so a re-added animation class restarts.
    fn force_reflow(&self, element: &Self::Element);

    fn viewport_width(&self) -> f64;

    /// Dispatch a bubbling custom event on the document.
    fn dispatch(&self, event: &SidebarEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_selectors() {
        assert_eq!(Query::id("filter-year").to_css(), "#filter-year");
        assert_eq!(Query::class("sidebar-menu-link").to_css(), ".sidebar-menu-link");
        assert_eq!(
            Query::any_class(&["sidebar-menu-text", "sidebar-filter-label"]).to_css(),
            ".sidebar-menu-text, .sidebar-filter-label"
        );
    }

    #[test]
    fn attribute_selector_quotes_value() {
        let q = Query::ClassWithAttr {
            class: "sidebar-menu-link".into(),
            name: "data-tab".into(),
            value: r#"we"ird\tab"#.into(),
        };
        assert_eq!(
            q.to_css(),
            r#".sidebar-menu-link[data-tab="we\"ird\\tab"]"#
        );
    }

    #[test]
    fn checkbox_selectors() {
        let all = Query::InputsWithin {
            class: "sidebar-checkbox-group".into(),
            checked_only: false,
        };
        let checked = Query::InputsWithin {
            class: "sidebar-checkbox-group".into(),
            checked_only: true,
        };
        assert_eq!(all.to_css(), ".sidebar-checkbox-group input");
        assert_eq!(checked.to_css(), ".sidebar-checkbox-group input:checked");
    }

    #[test]
    fn identifiers_are_escaped() {
        assert_eq!(Query::id("a.b").to_css(), "#a\\.b");
        assert_eq!(Query::id("2020").to_css(), "#\\32 020");
    }
}

//! Detached subtrees and HTML serialization.

use scraper::{ElementRef, Node};

use super::{ElementData, NodeData};

/// Elements that never carry children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text content is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// An owned subtree that is not attached to any document.
///
/// Produced by selecting from a parsed source page; appending it to a
/// [`Document`](super::Document) always deep-copies, so one fragment can be
/// injected any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub data: NodeData,
    pub children: Vec<Fragment>,
}

impl Fragment {
    /// A bare element with the given attributes and no children.
    pub fn element(name: &str, attrs: &[(&str, &str)]) -> Self {
        let mut data = ElementData::new(name);
        for (key, value) in attrs {
            data.set_attr(key, value);
        }
        Self {
            data: NodeData::Element(data),
            children: Vec::new(),
        }
    }

    /// A text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            data: NodeData::Text(text.into()),
            children: Vec::new(),
        }
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Fragment) -> Self {
        self.children.push(child);
        self
    }

    /// Copy a parsed `scraper` element and everything below it.
    pub fn from_element(element: ElementRef<'_>) -> Self {
        let value = element.value();
        let mut data = ElementData::new(value.name());
        for (key, attr) in value.attrs() {
            data.set_attr(key, attr);
        }

        let mut children = Vec::new();
        for child in element.children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        children.push(Self::from_element(child_element));
                    }
                }
                Node::Text(text) => children.push(Self::text(&**text)),
                Node::Comment(comment) => children.push(Self {
                    data: NodeData::Comment((**comment).to_string()),
                    children: Vec::new(),
                }),
                _ => {}
            }
        }

        Self {
            data: NodeData::Element(data),
            children,
        }
    }

    /// The element data, if this fragment is an element.
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text of the whole subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.data {
            NodeData::Text(text) => out.push_str(text),
            _ => self.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Serialize the subtree, including this node.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_node(&self.data, &self.children, false, &mut out);
        out
    }
}

pub(crate) fn write_node(data: &NodeData, children: &[Fragment], raw: bool, out: &mut String) {
    match data {
        NodeData::Root => {
            for child in children {
                write_node(&child.data, &child.children, false, out);
            }
        }
        NodeData::Text(text) => {
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(element.name());
            for (key, value) in element.attrs() {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&element.name()) {
                return;
            }
            let raw_children = RAW_TEXT_ELEMENTS.contains(&element.name());
            for child in children {
                write_node(&child.data, &child.children, raw_children, out);
            }
            out.push_str("</");
            out.push_str(element.name());
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

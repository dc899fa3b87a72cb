//! In-memory page tree.
//!
//! [`Document`] is an arena of nodes with a synthetic root. It is what every
//! page behaviour operates on: lookups go through [`ElementLookup`] and
//! [`ElementQuery`], mutations through the inherent methods. Source pages are
//! parsed with `scraper` and copied in as [`Fragment`]s.

mod event;
mod fragment;
mod matching;

use std::cell::RefCell;

use scraper::Html;

use crate::error::Result;

pub use event::PageEvent;
pub use fragment::Fragment;
pub use matching::SelectorList;

/// A page shared by behaviours that run concurrently on one task.
///
/// Borrows are taken for a single synchronous step and never held across an
/// `.await`.
pub type SharedPage<'a> = RefCell<&'a mut Document>;

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Payload of a single node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Root,
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Tag name plus attributes, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    name: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    fn set_classes(&mut self, classes: &[&str]) {
        if classes.is_empty() {
            self.remove_attr("class");
        } else {
            self.set_attr("class", &classes.join(" "));
        }
    }
}

/// Lookup of elements by their `id` attribute.
pub trait ElementLookup {
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
}

/// Lookup of elements by selector, in document order.
pub trait ElementQuery {
    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>>;

    fn query(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_all(selector)?.into_iter().next())
    }
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable page tree.
///
/// Slots of removed subtrees are recycled, so a [`NodeId`] is only valid
/// while its node stays attached.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    const ROOT: NodeId = NodeId(0);

    /// An empty document holding only the synthetic root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
            }],
            free: Vec::new(),
        }
    }

    /// Parse a complete HTML document. Parsing is permissive and never fails.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut document = Self::new();
        document.append_fragment(Self::ROOT, &Fragment::from_element(parsed.root_element()));
        document
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(Self::ROOT)
            .iter()
            .copied()
            .find(|id| self.element(*id).is_some())
    }

    /// The `<body>` element.
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|id| self.element(*id).is_some_and(|e| e.name() == "body"))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Child nodes that are elements.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }

    /// First element following `id` under the same parent.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .skip_while(|c| **c != id)
            .skip(1)
            .copied()
            .find(|c| self.element(*c).is_some())
    }

    /// True when `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// All nodes below `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    fn push_node(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        };
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Return a detached subtree's slots to the free list.
    fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        let children = std::mem::take(&mut node.children);
        node.parent = None;
        node.data = NodeData::Text(String::new());
        self.free.push(id);
        for child in children {
            self.release(child);
        }
    }

    /// Slots in use, attached or free.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Deep-copy `fragment` as the last child of `parent`.
    pub fn append_fragment(&mut self, parent: NodeId, fragment: &Fragment) -> NodeId {
        let id = self.push_node(parent, fragment.data.clone());
        for child in &fragment.children {
            self.append_fragment(id, child);
        }
        id
    }

    /// Drop every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.release(child);
        }
    }

    /// Drop `id` and its subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent {
            self.nodes[parent.0].children.retain(|c| *c != id);
            self.release(id);
        }
    }

    /// Owned copy of the subtree rooted at `id`.
    pub fn fragment(&self, id: NodeId) -> Fragment {
        Fragment {
            data: self.data(id).clone(),
            children: self.children(id).iter().map(|c| self.fragment(*c)).collect(),
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.fragment(id).text_content()
    }

    /// Replace all children of `id` with a single text node.
    ///
    /// A lone existing text child is rewritten in place.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let [only] = self.nodes[id.0].children[..] {
            if !text.is_empty() {
                if let NodeData::Text(current) = &mut self.nodes[only.0].data {
                    current.clear();
                    current.push_str(text);
                    return;
                }
            }
        }
        self.clear_children(id);
        if !text.is_empty() {
            self.push_node(id, NodeData::Text(text.to_string()));
        }
    }

    /// Replace all children of `id` with parsed markup.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        self.clear_children(id);
        let parsed = Html::parse_fragment(html);
        let wrapper = Fragment::from_element(parsed.root_element());
        for child in &wrapper.children {
            self.append_fragment(id, child);
        }
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        self.fragment(id).outer_html()
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .map(|c| self.outer_html(*c))
            .collect()
    }

    /// Serialize the whole document with a doctype.
    pub fn to_html(&self) -> String {
        format!("<!DOCTYPE html>{}", self.outer_html(Self::ROOT))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.set_attr(name, value);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(element) = self.element_mut(id) {
            if !element.has_class(class) {
                let mut classes: Vec<String> = element.classes().map(String::from).collect();
                classes.push(class.to_string());
                let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
                element.set_classes(&refs);
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(element) = self.element_mut(id) {
            let classes: Vec<String> = element
                .classes()
                .filter(|c| *c != class)
                .map(String::from)
                .collect();
            let refs: Vec<&str> = classes.iter().map(String::as_str).collect();
            element.set_classes(&refs);
        }
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    /// Read one inline style property.
    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        parse_style(self.attr(id, "style")?)
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    /// Set one inline style property; an empty value removes it.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let mut declarations = parse_style(element.attr("style").unwrap_or(""));
        declarations.retain(|(k, _)| k != property);
        if !value.is_empty() {
            declarations.push((property.to_string(), value.to_string()));
        }
        if declarations.is_empty() {
            element.remove_attr("style");
        } else {
            let style = declarations
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            element.set_attr("style", &style);
        }
    }
}

impl ElementLookup for Document {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }
}

impl ElementQuery for Document {
    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        Ok(SelectorList::parse(selector)?.select(self))
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

//! Selector matching for the page tree.
//!
//! Selectors are parsed with scraper's grammar and matched through the
//! `selectors` crate, so a query against the live page accepts exactly what
//! [`crate::utils::html::parse_selector`] accepts for fetched documents.

use std::fmt;

use scraper::error::SelectorErrorKind;
use scraper::selector::{CssLocalName, CssString, NonTSPseudoClass, Parser, PseudoElement, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
    self, ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode,
    NeedsSelectorFlags, QuirksMode, SelectorCaches,
};
use selectors::parser::ParseRelative;
use selectors::{Element, OpaqueElement, SelectorImpl};

use crate::error::{AppError, Result};

use super::{Document, ElementData, NodeData, NodeId};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed, comma-separated selector group.
#[derive(Debug, Clone)]
pub struct SelectorList(selectors::SelectorList<Simple>);

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(selector);
        let mut parser = cssparser::Parser::new(&mut input);
        selectors::SelectorList::parse(&Parser, &mut parser, ParseRelative::No)
            .map(Self)
            .map_err(|e| AppError::selector(selector, SelectorErrorKind::from(e)))
    }

    /// Elements of `doc` matching any selector in the group, in document order.
    pub fn select(&self, doc: &Document) -> Vec<NodeId> {
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );

        doc.descendants(doc.root())
            .into_iter()
            .filter(|id| {
                PageElement::wrap(doc, *id).is_some_and(|element| {
                    self.0
                        .slice()
                        .iter()
                        .any(|s| matching::matches_selector(s, 0, None, &element, &mut context))
                })
            })
            .collect()
    }
}

/// An element node seen through the `selectors` matching interface.
///
/// Non-tree-structural pseudo-classes never match.
#[derive(Clone, Copy)]
struct PageElement<'a> {
    doc: &'a Document,
    id: NodeId,
    element: &'a ElementData,
}

impl<'a> PageElement<'a> {
    fn wrap(doc: &'a Document, id: NodeId) -> Option<Self> {
        doc.element(id).map(|element| Self { doc, id, element })
    }

    fn siblings(&self) -> (&'a [NodeId], usize) {
        let siblings = self
            .doc
            .parent(self.id)
            .map(|p| self.doc.children(p))
            .unwrap_or(&[]);
        let position = siblings.iter().position(|c| *c == self.id).unwrap_or(0);
        (siblings, position)
    }
}

impl fmt::Debug for PageElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> {:?}", self.element.name(), self.id)
    }
}

impl Element for PageElement<'_> {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(self.element)
    }

    fn parent_element(&self) -> Option<Self> {
        self.doc
            .parent(self.id)
            .and_then(|parent| Self::wrap(self.doc, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let (siblings, position) = self.siblings();
        siblings[..position]
            .iter()
            .rev()
            .find_map(|c| Self::wrap(self.doc, *c))
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let (siblings, position) = self.siblings();
        siblings
            .iter()
            .skip(position + 1)
            .find_map(|c| Self::wrap(self.doc, *c))
    }

    fn first_element_child(&self) -> Option<Self> {
        self.doc
            .children(self.id)
            .iter()
            .find_map(|c| Self::wrap(self.doc, *c))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &CssLocalName) -> bool {
        self.element.name() == &*local_name.0
    }

    fn has_namespace(&self, ns: &<Simple as SelectorImpl>::BorrowedNamespaceUrl) -> bool {
        &**ns == HTML_NAMESPACE
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.element.name() == other.element.name()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&<Simple as SelectorImpl>::NamespaceUrl>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&CssString>,
    ) -> bool {
        // Parsed attributes all live in the null namespace.
        if matches!(*ns, NamespaceConstraint::Specific(url) if !url.is_empty()) {
            return false;
        }
        self.element
            .attrs()
            .any(|(name, value)| name == &*local_name.0 && operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<Self::Impl>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        self.element.name() == "link"
    }

    fn is_html_slot_element(&self) -> bool {
        true
    }

    fn has_id(&self, id: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.element
            .attr("id")
            .is_some_and(|value| case_sensitivity.eq(id.0.as_bytes(), value.as_bytes()))
    }

    fn has_class(&self, name: &CssLocalName, case_sensitivity: CaseSensitivity) -> bool {
        self.element
            .classes()
            .any(|class| case_sensitivity.eq(name.0.as_bytes(), class.as_bytes()))
    }

    fn has_custom_state(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn imported_part(&self, _name: &CssLocalName) -> Option<CssLocalName> {
        None
    }

    fn is_part(&self, _name: &CssLocalName) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        !self
            .doc
            .children(self.id)
            .iter()
            .any(|c| match self.doc.data(*c) {
                NodeData::Element(_) => true,
                NodeData::Text(text) => !text.is_empty(),
                _ => false,
            })
    }

    fn is_root(&self) -> bool {
        self.doc.parent(self.id) == Some(self.doc.root())
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}

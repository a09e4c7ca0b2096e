//! In-memory document tree.
//!
//! Nodes live in an arena indexed by [`NodeId`]; index 0 is the document
//! root. Layout is explicit: every node carries an origin relative to its
//! parent and a size, and inline `left` / `top` styles replace the origin the
//! way absolutely positioned elements do in a browser.

use std::collections::HashMap;

use super::{Dom, NodeId, Offset, Size, Style, StyleProp, CLASS_NOT_DISPLAY};
use crate::error::{BehaviorError, BehaviorResult};

/// How a node's origin is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    /// Origin is relative to the parent's offset.
    #[default]
    Static,
    /// Origin is relative to the viewport and follows the scroll position.
    Fixed,
}

#[derive(Debug, Clone, Default)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    origin: Offset,
    size: Size,
    text: String,
    attributes: HashMap<String, String>,
    styles: HashMap<StyleProp, Style>,
    positioning: Positioning,
}

impl Node {
    /// Neither an inline `display:none` nor the `not_display` class.
    fn is_displayed(&self) -> bool {
        !self.styles.contains_key(&StyleProp::Display) && !self.classes.iter().any(|c| c == CLASS_NOT_DISPLAY)
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Node>,
    scroll_top: f64,
    viewport_height: f64,
}

impl MemoryDom {
    /// Create a document whose root box has the given size.
    pub fn new(size: Size) -> Self {
        Self {
            nodes: vec![Node {
                size,
                ..Node::default()
            }],
            scroll_top: 0.0,
            viewport_height: 0.0,
        }
    }

    /// Append a child element laid out at `origin` inside `parent`.
    pub fn append(&mut self, parent: NodeId, origin: Offset, size: Size) -> BehaviorResult<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(BehaviorError::UnknownNode(parent.0));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            origin,
            size,
            ..Node::default()
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Append a child element and give it classes and text in one go.
    pub fn append_with(
        &mut self,
        parent: NodeId,
        origin: Offset,
        size: Size,
        classes: &[&str],
        text: &str,
    ) -> BehaviorResult<NodeId> {
        let id = self.append(parent, origin, size)?;
        for class in classes {
            self.add_class(id, class);
        }
        self.set_text(id, text);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn origin(&self, node: NodeId) -> Offset {
        self.nodes.get(node.0).map(|n| n.origin).unwrap_or_default()
    }

    pub fn set_origin(&mut self, node: NodeId, origin: Offset) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.origin = origin;
        }
    }

    pub fn set_size(&mut self, node: NodeId, size: Size) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.size = size;
        }
    }

    pub fn positioning(&self, node: NodeId) -> Positioning {
        self.nodes
            .get(node.0)
            .map(|n| n.positioning)
            .unwrap_or_default()
    }

    pub fn set_positioning(&mut self, node: NodeId, positioning: Positioning) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.positioning = positioning;
        }
    }

    /// Resize the viewport and re-clamp the scroll position to it.
    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
        self.set_scroll_top(self.scroll_top);
    }

    fn max_scroll_top(&self) -> f64 {
        (self.nodes[0].size.height - self.viewport_height).max(0.0)
    }

    /// Deepest visible node whose box contains the document point `(x, y)`.
    ///
    /// Later children are checked first since they paint on top.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.find_deepest(self.document(), x, y)
    }

    fn find_deepest(&self, node: NodeId, x: f64, y: f64) -> Option<NodeId> {
        let n = self.nodes.get(node.0)?;
        if !n.is_displayed() {
            return None;
        }

        for &child in n.children.iter().rev() {
            if let Some(hit) = self.find_deepest(child, x, y) {
                return Some(hit);
            }
        }

        let hidden = n.styles.contains_key(&StyleProp::Visibility);
        let offset = self.offset(node);
        let inside = x >= offset.left
            && y >= offset.top
            && x < offset.left + n.size.width
            && y < offset.top + n.size.height;

        (inside && !hidden).then_some(node)
    }

    /// Origin after inline `left` / `top` overrides.
    fn effective_origin(n: &Node) -> Offset {
        let left = match n.styles.get(&StyleProp::Left) {
            Some(Style::Left(v)) => *v,
            _ => n.origin.left,
        };
        let top = match n.styles.get(&StyleProp::Top) {
            Some(Style::Top(v)) => *v,
            _ => n.origin.top,
        };
        Offset::new(left, top)
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(node) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }
}

impl Dom for MemoryDom {
    fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(root, &mut out);
        out
    }

    fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes
            .get(node.0)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.classes.retain(|c| c != class);
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        if node.0 >= self.nodes.len() {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            let n = &self.nodes[id.0];
            if !n.is_displayed() {
                return false;
            }
            current = n.parent;
        }
        true
    }

    fn offset(&self, node: NodeId) -> Offset {
        let Some(n) = self.nodes.get(node.0) else {
            return Offset::default();
        };
        let own = Self::effective_origin(n);

        match (n.positioning, n.parent) {
            (Positioning::Fixed, _) => Offset::new(own.left, own.top + self.scroll_top),
            (Positioning::Static, Some(parent)) => {
                let base = self.offset(parent);
                Offset::new(base.left + own.left, base.top + own.top)
            }
            (Positioning::Static, None) => own,
        }
    }

    fn size(&self, node: NodeId) -> Size {
        let Some(n) = self.nodes.get(node.0) else {
            return Size::default();
        };
        match n.styles.get(&StyleProp::Width) {
            Some(Style::Width(width)) => Size::new(*width, n.size.height),
            _ => n.size,
        }
    }

    fn style(&self, node: NodeId, prop: StyleProp) -> Option<Style> {
        self.nodes
            .get(node.0)
            .and_then(|n| n.styles.get(&prop).copied())
    }

    fn set_style(&mut self, node: NodeId, style: Style) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.styles.insert(style.prop(), style);
        }
    }

    fn clear_style(&mut self, node: NodeId, prop: StyleProp) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.styles.remove(&prop);
        }
    }

    fn text(&self, node: NodeId) -> String {
        self.nodes
            .get(node.0)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.text = text.to_string();
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes
            .get(node.0)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.attributes.remove(name);
        }
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Clamps to `0..=document height - viewport height`.
    fn set_scroll_top(&mut self, scroll_top: f64) {
        self.scroll_top = scroll_top.clamp(0.0, self.max_scroll_top());
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}

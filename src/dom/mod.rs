//! Document capability the widgets are written against.
//!
//! The trait mirrors the handful of element queries and mutations the
//! behaviors need: geometry, class list, attributes, inline style, text and
//! the document scroll position. [`MemoryDom`] is the in-memory implementation.

pub mod tree;

pub use tree::{MemoryDom, Positioning};

// ─── Shared class names ──────────────────────────────────────────────────

/// Marks an element that starts hidden until a widget takes over its display.
pub const CLASS_NOT_DISPLAY: &str = "not_display";
/// Popup descendant that closes the popup when clicked.
pub const CLASS_CLOSE_BUTTON: &str = "popup_close";
/// Anchor element used to align a popup with its opener.
pub const CLASS_POSITIONER: &str = "popup_positioner";
/// Selected switcher item.
pub const CLASS_SELECTED: &str = "selected";
/// Fixer block parked against one of its limiters.
pub const CLASS_STOPPED: &str = "stopped";
/// Default clickable link inside a switcher item.
pub const CLASS_PSEUDO: &str = "pseudo";
/// Input showing its placeholder text.
pub const CLASS_EMPTY: &str = "empty";
/// Input holding text the user typed.
pub const CLASS_FILLED: &str = "filled";

// ─── Geometry ────────────────────────────────────────────────────────────

/// Opaque handle to an element of a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Document coordinates of an element's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub left: f64,
    pub top: f64,
}

impl Offset {
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ─── Inline style ────────────────────────────────────────────────────────

/// Key of an inline style property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProp {
    Display,
    Visibility,
    Opacity,
    Left,
    Top,
    Width,
    BackgroundPosition,
}

/// Inline style value. Clearing a property restores the stylesheet default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Style {
    DisplayNone,
    VisibilityHidden,
    Opacity(f32),
    Left(f64),
    Top(f64),
    Width(f64),
    BackgroundPosition(f64, f64),
}

impl Style {
    pub fn prop(&self) -> StyleProp {
        match self {
            Style::DisplayNone => StyleProp::Display,
            Style::VisibilityHidden => StyleProp::Visibility,
            Style::Opacity(_) => StyleProp::Opacity,
            Style::Left(_) => StyleProp::Left,
            Style::Top(_) => StyleProp::Top,
            Style::Width(_) => StyleProp::Width,
            Style::BackgroundPosition(..) => StyleProp::BackgroundPosition,
        }
    }
}

// ─── Capability ──────────────────────────────────────────────────────────

/// Read/write access to a document. Unknown nodes read as empty and ignore
/// writes.
pub trait Dom {
    /// The document root; the default external click catcher.
    fn document(&self) -> NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Descendants of `root` (excluding `root`) in document order.
    fn descendants(&self, root: NodeId) -> Vec<NodeId>;

    fn classes(&self, node: NodeId) -> Vec<String>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Node is rendered: neither it nor any ancestor is `display:none`.
    fn is_visible(&self, node: NodeId) -> bool;

    /// Top-left corner in document coordinates.
    fn offset(&self, node: NodeId) -> Offset;

    fn size(&self, node: NodeId) -> Size;

    fn style(&self, node: NodeId, prop: StyleProp) -> Option<Style>;

    fn set_style(&mut self, node: NodeId, style: Style);

    fn clear_style(&mut self, node: NodeId, prop: StyleProp);

    fn text(&self, node: NodeId) -> String;

    fn set_text(&mut self, node: NodeId, text: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Vertical document scroll position.
    fn scroll_top(&self) -> f64;

    /// Scroll the document. Implementations clamp to the scrollable range.
    fn set_scroll_top(&mut self, scroll_top: f64);

    /// Height of the visible part of the document.
    fn viewport_height(&self) -> f64;

    /// `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// First descendant of `root` carrying `class`.
    fn find_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.has_class(id, class))
    }

    /// All descendants of `root` carrying `class`.
    fn find_all_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }
}

//! Keeps a block fixed to the viewport while the page scrolls, parking it
//! against the top of one limiter or the bottom of another when the
//! viewport leaves their span.
//!
//! The block is expected to be laid out inside the top limiter: while
//! parked it carries [`CLASS_STOPPED`] and a `top` relative to that limiter;
//! while free it has no class, `top` equal to the margin and `left` equal to
//! the limiter's document left, for a host that renders it viewport-fixed.

use tracing::debug;

use crate::dom::{Dom, NodeId, Style, StyleProp, CLASS_STOPPED};

pub const DEFAULT_TOP_MARGIN: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    NotStopped,
    StoppedOnTop,
    StoppedOnBottom,
}

/// Vertical span the block may travel within, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixerPosition {
    pub status: PositionStatus,
    /// Document top of a parked block; 0 when free.
    pub top: f64,
}

/// Where a block of `height` belongs for the given scroll position.
pub fn resolve(scroll_top: f64, top_margin: f64, height: f64, bounds: Bounds) -> FixerPosition {
    let free_top = scroll_top + top_margin;

    if free_top < bounds.top || height > bounds.height() {
        FixerPosition {
            status: PositionStatus::StoppedOnTop,
            top: bounds.top,
        }
    } else if free_top + height > bounds.bottom {
        FixerPosition {
            status: PositionStatus::StoppedOnBottom,
            top: bounds.bottom - height,
        }
    } else {
        FixerPosition {
            status: PositionStatus::NotStopped,
            top: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixerOptions {
    /// Element whose width the block copies on refresh.
    pub width_like: Option<NodeId>,
    pub top_margin: f64,
}

impl Default for FixerOptions {
    fn default() -> Self {
        Self {
            width_like: None,
            top_margin: DEFAULT_TOP_MARGIN,
        }
    }
}

#[derive(Debug)]
pub struct VerticalFixer {
    root: NodeId,
    top_limiter: NodeId,
    bottom_limiter: NodeId,
    width_like: Option<NodeId>,
    top_margin: f64,
    enabled: bool,
    status: Option<PositionStatus>,
}

impl VerticalFixer {
    pub fn new<D: Dom>(
        dom: &mut D,
        root: NodeId,
        top_limiter: NodeId,
        bottom_limiter: NodeId,
        options: FixerOptions,
    ) -> Self {
        let mut fixer = Self {
            root,
            top_limiter,
            bottom_limiter,
            width_like: options.width_like,
            top_margin: options.top_margin,
            enabled: true,
            status: None,
        };
        fixer.refresh(dom);
        fixer
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Status of the last applied position; `None` before the first refresh.
    pub fn status(&self) -> Option<PositionStatus> {
        self.status
    }

    /// Re-read every geometry input and re-apply the position.
    pub fn refresh<D: Dom>(&mut self, dom: &mut D) {
        self.refresh_left(dom);
        self.refresh_width(dom);
        self.refresh_position(dom, true);
    }

    pub fn enable<D: Dom>(&mut self, dom: &mut D) {
        self.enabled = true;
        self.refresh(dom);
    }

    /// Stop tracking and drop every inline style the fixer set.
    pub fn disable<D: Dom>(&mut self, dom: &mut D) {
        self.enabled = false;
        dom.clear_style(self.root, StyleProp::Left);
        dom.clear_style(self.root, StyleProp::Top);
        dom.clear_style(self.root, StyleProp::Width);
        dom.remove_class(self.root, CLASS_STOPPED);
    }

    /// Re-applies only when the status changes.
    pub fn on_scroll<D: Dom>(&mut self, dom: &mut D) {
        if self.enabled {
            self.refresh_position(dom, false);
        }
    }

    pub fn on_resize<D: Dom>(&mut self, dom: &mut D) {
        if self.enabled {
            self.refresh(dom);
        }
    }

    fn bounds<D: Dom>(&self, dom: &D) -> Bounds {
        Bounds {
            top: dom.offset(self.top_limiter).top,
            bottom: dom.offset(self.bottom_limiter).top + dom.size(self.bottom_limiter).height,
        }
    }

    fn refresh_position<D: Dom>(&mut self, dom: &mut D, force: bool) {
        let position = resolve(
            dom.scroll_top(),
            self.top_margin,
            dom.size(self.root).height,
            self.bounds(dom),
        );
        if Some(position.status) == self.status && !force {
            return;
        }
        if Some(position.status) != self.status {
            debug!(node = self.root.0, status = ?position.status, "fixer status changed");
        }
        self.status = Some(position.status);

        let stopped = position.status != PositionStatus::NotStopped;
        self.refresh_left(dom);
        dom.toggle_class(self.root, CLASS_STOPPED, stopped);

        let top = if stopped {
            position.top - dom.offset(self.top_limiter).top
        } else {
            self.top_margin
        };
        dom.set_style(self.root, Style::Top(top));
    }

    fn refresh_left<D: Dom>(&self, dom: &mut D) {
        if self.status == Some(PositionStatus::NotStopped) {
            let left = dom.offset(self.top_limiter).left;
            dom.set_style(self.root, Style::Left(left));
        } else {
            dom.clear_style(self.root, StyleProp::Left);
        }
    }

    fn refresh_width<D: Dom>(&self, dom: &mut D) {
        if let Some(source) = self.width_like {
            let width = dom.size(source).width;
            dom.set_style(self.root, Style::Width(width));
        }
    }
}

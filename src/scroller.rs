//! Animated document scrolling to an offset or to bring a block into view.
//!
//! The animation is an interval timer stepping `scroll_top` along a swing
//! curve; the host reports ticks back through [`VerticalScroller::on_timer`].
//! Starting a new scroll drops the running one together with its completion.

use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::animate::{Easing, Host};
use crate::dom::{Dom, NodeId};
use crate::popup::Completion;
use crate::timer::TimerId;

pub const TOP_MARGIN: f64 = 10.0;
pub const SCROLL_DURATION: Duration = Duration::from_millis(700);
/// Shorter moves complete at once without animating.
pub const MIN_SCROLLING_DISTANCE: f64 = 2.0;
/// Step period of the scroll animation.
pub const SCROLL_TICK: Duration = Duration::from_millis(13);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollerOptions {
    /// Gap kept between a revealed block and the viewport edge.
    pub top_margin: f64,
    pub duration: Duration,
}

impl Default for ScrollerOptions {
    fn default() -> Self {
        Self {
            top_margin: TOP_MARGIN,
            duration: SCROLL_DURATION,
        }
    }
}

struct Scroll {
    timer: TimerId,
    from: f64,
    to: f64,
    start: Duration,
    on_complete: Option<Completion>,
}

#[derive(Default)]
pub struct VerticalScroller {
    options: ScrollerOptions,
    scroll: Option<Scroll>,
}

/// Scroll position that brings `block` fully into view with the least
/// movement, or `None` when it already is (or has no height).
pub fn scroll_top_to_move_to<D: Dom>(dom: &D, block: NodeId, top_margin: f64) -> Option<f64> {
    let height = dom.size(block).height;
    if height == 0.0 {
        return None;
    }

    let top = dom.offset(block).top;
    let bottom = top + height;
    let viewport_top = dom.scroll_top();
    let viewport_height = dom.viewport_height();
    let viewport_bottom = viewport_top + viewport_height;

    let need_up = top < viewport_top;
    let need_down = bottom > viewport_bottom;
    if !need_up && !need_down {
        return None;
    }

    let larger_than_viewport = height + top_margin > viewport_height;
    if larger_than_viewport || need_up {
        Some(top - top_margin)
    } else {
        Some(bottom + top_margin - viewport_height)
    }
}

impl VerticalScroller {
    pub fn new(options: ScrollerOptions) -> Self {
        Self { options, scroll: None }
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some()
    }

    /// Reveal `block`. With `always_to_top` its top goes to the top margin;
    /// otherwise the document scrolls as little as possible.
    pub fn scroll_to_block<H: Host>(
        &mut self,
        host: &mut H,
        block: NodeId,
        always_to_top: bool,
        on_complete: Option<Completion>,
    ) {
        let dom = host.dom();
        let target = if always_to_top {
            dom.offset(block).top - self.options.top_margin
        } else {
            scroll_top_to_move_to(dom, block, self.options.top_margin).unwrap_or_else(|| dom.scroll_top())
        };
        self.scroll_to_offset(host, target, on_complete);
    }

    pub fn scroll_to_offset<H: Host>(&mut self, host: &mut H, offset: f64, on_complete: Option<Completion>) {
        self.stop(host);
        let from = host.dom().scroll_top();

        if (from - offset).abs() < MIN_SCROLLING_DISTANCE {
            if let Some(on_complete) = on_complete {
                on_complete();
            }
            return;
        }

        debug!(from, to = offset, "scroll started");
        let timer = host.set_interval(SCROLL_TICK);
        self.scroll = Some(Scroll {
            timer,
            from,
            to: offset,
            start: host.now(),
            on_complete,
        });
    }

    /// Drop the running scroll where it is, without its completion.
    pub fn stop<H: Host>(&mut self, host: &mut H) {
        if let Some(scroll) = self.scroll.take() {
            host.clear(scroll.timer);
        }
    }

    /// Step the animation. Returns `false` for foreign timers.
    pub fn on_timer<H: Host>(&mut self, host: &mut H, id: TimerId) -> bool {
        let Some(scroll) = self.scroll.as_ref().filter(|s| s.timer == id) else {
            return false;
        };

        let elapsed = host.now().saturating_sub(scroll.start);
        let t = if self.options.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.options.duration.as_secs_f64()).min(1.0)
        };
        let progress = f64::from(Easing::Swing.apply(t as f32));
        let position = if t >= 1.0 {
            scroll.to
        } else {
            scroll.from + progress * (scroll.to - scroll.from)
        };
        trace!(position, "scroll step");
        host.dom_mut().set_scroll_top(position);

        if t >= 1.0 {
            let on_complete = self.scroll.take().and_then(|scroll| {
                host.clear(scroll.timer);
                scroll.on_complete
            });
            debug!(position, "scroll finished");
            if let Some(on_complete) = on_complete {
                on_complete();
            }
        }
        true
    }
}

impl fmt::Debug for VerticalScroller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerticalScroller")
            .field("options", &self.options)
            .field("scrolling", &self.scroll.is_some())
            .finish()
    }
}

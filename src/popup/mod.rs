//! Popup: a region whose display is toggled by opener elements and closed by
//! an inner close button, an outside click or the Escape key.
//!
//! The visible state only flips when a transition completes. While an
//! opacity transition runs, every open / close / toggle request is ignored.

pub mod position;
pub mod registry;

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::animate::{AnimationId, Easing, Host};
use crate::dom::{Dom, NodeId, Style, StyleProp, CLASS_CLOSE_BUTTON, CLASS_NOT_DISPLAY, CLASS_POSITIONER};
use crate::observer::{ListenerId, Observers};

pub use registry::{PopupId, PopupRegistry};

/// Callback run when a transition finishes, before the AFTER_* event.
pub type Completion = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupEventKind {
    BeforeOpen,
    AfterOpen,
    BeforeClose,
    AfterClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupEvent {
    pub kind: PopupEventKind,
    /// Opener that triggered an open; `None` for programmatic opens and for
    /// close events.
    pub opener: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

impl MouseButton {
    /// Decode a `which`-style button code. Both 0 and 1 mean the primary
    /// button: some engines report 0 for a plain left click.
    pub fn from_which(code: u16) -> Option<Self> {
        match code {
            0 | 1 => Some(MouseButton::Primary),
            2 => Some(MouseButton::Middle),
            3 => Some(MouseButton::Secondary),
            _ => None,
        }
    }

    pub fn is_primary(self) -> bool {
        self == MouseButton::Primary
    }
}

/// A click delivered to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub target: NodeId,
    pub button: MouseButton,
}

impl Click {
    pub fn primary(target: NodeId) -> Self {
        Self {
            target,
            button: MouseButton::Primary,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PopupOptions {
    /// Elements whose click toggles the popup.
    pub openers: Vec<NodeId>,
    /// Element whose clicks outside the popup close it. Defaults to the
    /// document.
    pub catcher: Option<NodeId>,
    /// Opacity transition length. `None` toggles display instantly.
    pub duration: Option<Duration>,
}

enum Transition {
    Opening {
        animation: AnimationId,
        opener: Option<NodeId>,
        on_complete: Option<Completion>,
    },
    Closing {
        animation: AnimationId,
        on_complete: Option<Completion>,
        reopen: Option<NodeId>,
    },
}

impl Transition {
    fn animation(&self) -> AnimationId {
        match self {
            Transition::Opening { animation, .. } | Transition::Closing { animation, .. } => {
                *animation
            }
        }
    }
}

pub struct Popup {
    root: NodeId,
    openers: Vec<NodeId>,
    closers: Vec<NodeId>,
    positioner: Option<NodeId>,
    catcher: NodeId,
    duration: Option<Duration>,
    state: PopupState,
    transition: Option<Transition>,
    last_used_opener: Option<NodeId>,
    observers: Observers<PopupEventKind, PopupEvent>,
}

impl Popup {
    /// Bind a popup to `root`. The initial state is closed when the root is
    /// not visible or carries the `not_display` marker.
    pub fn new<H: Host>(host: &mut H, root: NodeId, options: PopupOptions) -> Self {
        let dom = host.dom_mut();
        let closed = dom.has_class(root, CLASS_NOT_DISPLAY) || !dom.is_visible(root);

        if closed {
            dom.set_style(root, Style::DisplayNone);
            dom.remove_class(root, CLASS_NOT_DISPLAY);
        } else {
            dom.clear_style(root, StyleProp::Display);
        }

        let closers = dom.find_all_class(root, CLASS_CLOSE_BUTTON);
        let positioner = dom.find_class(root, CLASS_POSITIONER);
        let catcher = options.catcher.unwrap_or_else(|| dom.document());

        Self {
            root,
            openers: options.openers,
            closers,
            positioner,
            catcher,
            duration: options.duration.filter(|d| !d.is_zero()),
            state: if closed {
                PopupState::Closed
            } else {
                PopupState::Open
            },
            transition: None,
            last_used_opener: None,
            observers: Observers::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn openers(&self) -> &[NodeId] {
        &self.openers
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == PopupState::Closed
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn last_used_opener(&self) -> Option<NodeId> {
        self.last_used_opener
    }

    pub fn add_event_listener<F>(&mut self, kind: PopupEventKind, callback: F) -> ListenerId
    where
        F: FnMut(&PopupEvent) + 'static,
    {
        self.observers.add(kind, callback)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.observers.remove(id)
    }

    /// Open when closed, close when open. Given an opener, an open popup that
    /// was last opened by a different opener closes and reopens against the
    /// new one instead.
    pub fn toggle<H: Host>(&mut self, host: &mut H, opener: Option<NodeId>) {
        match opener {
            Some(opener) => self.toggle_or_reopen(host, opener),
            None => match self.state {
                PopupState::Closed => self.open(host, None, None),
                PopupState::Open => self.close(host, None),
            },
        }
    }

    /// Opener click behavior: open, close, or close-then-reopen when the
    /// opener changed.
    pub fn toggle_or_reopen<H: Host>(&mut self, host: &mut H, opener: NodeId) {
        match self.state {
            PopupState::Closed => self.open(host, Some(opener), None),
            PopupState::Open if self.last_used_opener != Some(opener) => {
                self.close_inner(host, None, Some(opener));
            }
            PopupState::Open => self.close(host, None),
        }
        self.last_used_opener = Some(opener);
    }

    pub fn open<H: Host>(&mut self, host: &mut H, opener: Option<NodeId>, on_complete: Option<Completion>) {
        if self.state == PopupState::Open || self.is_animating() {
            return;
        }

        self.emit(PopupEventKind::BeforeOpen, opener);

        let root = self.root;
        match self.duration {
            Some(duration) => {
                let dom = host.dom_mut();
                dom.set_style(root, Style::Opacity(0.0));
                dom.clear_style(root, StyleProp::Display);
                self.position(host, opener);

                let animation = host.animate_opacity(root, 1.0, duration, Easing::Linear);
                debug!(root = root.0, ?duration, "popup opening");
                self.transition = Some(Transition::Opening {
                    animation,
                    opener,
                    on_complete,
                });
            }
            None => {
                let dom = host.dom_mut();
                dom.set_style(root, Style::VisibilityHidden);
                dom.clear_style(root, StyleProp::Display);
                self.position(host, opener);

                self.state = PopupState::Open;
                host.dom_mut().clear_style(root, StyleProp::Visibility);
                debug!(root = root.0, "popup opened");
                self.finish_open(opener, on_complete);
            }
        }
    }

    pub fn close<H: Host>(&mut self, host: &mut H, on_complete: Option<Completion>) {
        self.close_inner(host, on_complete, None);
    }

    /// Escape key: close, subject to the usual no-op rules.
    pub fn handle_escape<H: Host>(&mut self, host: &mut H) {
        self.close(host, None);
    }

    /// Route a document click: opener and close-button activations first,
    /// then the external catcher check.
    pub fn handle_click<H: Host>(&mut self, host: &mut H, click: Click) {
        let target = click.target;

        if click.button.is_primary() {
            let dom = host.dom();
            let opener = self.openers.iter().copied().find(|&o| dom.contains(o, target));
            let on_closer = self.closers.iter().any(|&c| dom.contains(c, target));

            if let Some(opener) = opener {
                self.toggle_or_reopen(host, opener);
            }
            if on_closer {
                self.close(host, None);
            }
        }

        if host.dom().contains(self.catcher, target) {
            self.on_catcher_click(host, click);
        }
    }

    /// Finish the transition owning `id`. Returns `false` for foreign ids.
    pub fn on_animation_done<H: Host>(&mut self, host: &mut H, id: AnimationId) -> bool {
        if self.transition.as_ref().map(Transition::animation) != Some(id) {
            return false;
        }

        match self.transition.take() {
            Some(Transition::Opening {
                opener, on_complete, ..
            }) => {
                self.state = PopupState::Open;
                debug!(root = self.root.0, "popup opened");
                self.finish_open(opener, on_complete);
            }
            Some(Transition::Closing {
                on_complete, reopen, ..
            }) => {
                host.dom_mut().set_style(self.root, Style::DisplayNone);
                self.state = PopupState::Closed;
                debug!(root = self.root.0, "popup closed");
                self.finish_close(host, on_complete, reopen);
            }
            None => {}
        }
        true
    }

    fn close_inner<H: Host>(&mut self, host: &mut H, on_complete: Option<Completion>, reopen: Option<NodeId>) {
        if self.state == PopupState::Closed || self.is_animating() {
            return;
        }

        self.emit(PopupEventKind::BeforeClose, None);

        match self.duration {
            Some(duration) => {
                let animation = host.animate_opacity(self.root, 0.0, duration, Easing::Linear);
                debug!(root = self.root.0, ?duration, "popup closing");
                self.transition = Some(Transition::Closing {
                    animation,
                    on_complete,
                    reopen,
                });
            }
            None => {
                self.state = PopupState::Closed;
                host.dom_mut().set_style(self.root, Style::DisplayNone);
                debug!(root = self.root.0, "popup closed");
                self.finish_close(host, on_complete, reopen);
            }
        }
    }

    fn finish_open(&mut self, opener: Option<NodeId>, on_complete: Option<Completion>) {
        if let Some(on_complete) = on_complete {
            on_complete();
        }
        self.emit(PopupEventKind::AfterOpen, opener);
    }

    fn finish_close<H: Host>(&mut self, host: &mut H, on_complete: Option<Completion>, reopen: Option<NodeId>) {
        if let Some(on_complete) = on_complete {
            on_complete();
        }
        self.emit(PopupEventKind::AfterClose, None);

        if let Some(opener) = reopen {
            self.open(host, Some(opener), None);
        }
    }

    fn on_catcher_click<H: Host>(&mut self, host: &mut H, click: Click) {
        let dom = host.dom();
        let target = click.target;
        let inside_popup = dom.contains(self.root, target);
        let inside_openers = self.openers.iter().any(|&o| dom.contains(o, target));
        let outside = (!inside_popup && !inside_openers) || target == self.catcher;

        if click.button.is_primary() && outside {
            self.close(host, None);
        }
    }

    fn position<H: Host>(&self, host: &mut H, opener: Option<NodeId>) {
        if let Some(opener) = opener {
            position::position_if_possible(host.dom_mut(), self.root, self.positioner, opener);
        }
    }

    fn emit(&mut self, kind: PopupEventKind, opener: Option<NodeId>) {
        self.observers.emit(kind, &PopupEvent { kind, opener });
    }
}

impl fmt::Debug for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popup")
            .field("root", &self.root)
            .field("openers", &self.openers)
            .field("state", &self.state)
            .field("animating", &self.is_animating())
            .field("last_used_opener", &self.last_used_opener)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, Offset, Size};
    use crate::stage::{Notice, Stage};
    use crate::timer::Timers;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        stage: Stage,
        root: NodeId,
        anchor: NodeId,
        closer: NodeId,
        body: NodeId,
        opener_a: NodeId,
        opener_b: NodeId,
        outside: NodeId,
    }

    fn fixture() -> Fixture {
        let mut dom = MemoryDom::new(Size::new(200.0, 100.0));
        let doc = dom.document();
        let opener_a = dom
            .append_with(doc, Offset::new(10.0, 5.0), Size::new(10.0, 2.0), &[], "A")
            .unwrap();
        dom.append_with(opener_a, Offset::new(2.0, 1.0), Size::new(1.0, 1.0), &[CLASS_POSITIONER], "")
            .unwrap();
        let opener_b = dom
            .append_with(doc, Offset::new(80.0, 5.0), Size::new(10.0, 2.0), &[], "B")
            .unwrap();
        let root = dom
            .append_with(doc, Offset::new(0.0, 20.0), Size::new(30.0, 10.0), &[CLASS_NOT_DISPLAY], "")
            .unwrap();
        let anchor = dom
            .append_with(root, Offset::new(4.0, 0.0), Size::new(1.0, 1.0), &[CLASS_POSITIONER], "")
            .unwrap();
        let closer = dom
            .append_with(root, Offset::new(26.0, 0.0), Size::new(3.0, 1.0), &[CLASS_CLOSE_BUTTON], "x")
            .unwrap();
        let body = dom
            .append(root, Offset::new(1.0, 2.0), Size::new(20.0, 6.0))
            .unwrap();
        let outside = dom
            .append(doc, Offset::new(150.0, 80.0), Size::new(10.0, 10.0))
            .unwrap();

        Fixture {
            stage: Stage::new(dom),
            root,
            anchor,
            closer,
            body,
            opener_a,
            opener_b,
            outside,
        }
    }

    fn popup(f: &mut Fixture, duration: Option<Duration>) -> Popup {
        let options = PopupOptions {
            openers: vec![f.opener_a, f.opener_b],
            catcher: None,
            duration,
        };
        Popup::new(&mut f.stage, f.root, options)
    }

    fn record(popup: &mut Popup) -> Rc<RefCell<Vec<PopupEventKind>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            PopupEventKind::BeforeOpen,
            PopupEventKind::AfterOpen,
            PopupEventKind::BeforeClose,
            PopupEventKind::AfterClose,
        ] {
            let log = Rc::clone(&log);
            popup.add_event_listener(kind, move |e| log.borrow_mut().push(e.kind));
        }
        log
    }

    fn finish_animations(stage: &mut Stage, popup: &mut Popup) {
        let limit = stage.now() + Duration::from_secs(10);
        stage.run_until(limit, |stage, notice| {
            if let Notice::AnimationDone(id) = notice {
                popup.on_animation_done(stage, id);
            }
        });
    }

    use PopupEventKind::*;

    #[test]
    fn initial_state_from_marker_class() {
        let mut f = fixture();
        let p = popup(&mut f, None);
        assert!(p.is_closed());
        let dom = f.stage.memory_dom();
        assert!(!dom.has_class(f.root, CLASS_NOT_DISPLAY));
        assert_eq!(dom.style(f.root, StyleProp::Display), Some(Style::DisplayNone));
    }

    #[test]
    fn initially_visible_root_starts_open() {
        let mut f = fixture();
        f.stage.memory_dom_mut().remove_class(f.root, CLASS_NOT_DISPLAY);
        let p = popup(&mut f, None);
        assert_eq!(p.state(), PopupState::Open);
        assert!(f.stage.memory_dom().is_visible(f.root));
    }

    #[test]
    fn instant_open_and_close_emit_event_pairs() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        let log = record(&mut p);

        p.open(&mut f.stage, None, None);
        assert_eq!(p.state(), PopupState::Open);
        assert!(f.stage.memory_dom().is_visible(f.root));
        assert_eq!(f.stage.memory_dom().style(f.root, StyleProp::Visibility), None);

        p.close(&mut f.stage, None);
        assert!(p.is_closed());
        assert!(!f.stage.memory_dom().is_visible(f.root));
        assert_eq!(*log.borrow(), vec![BeforeOpen, AfterOpen, BeforeClose, AfterClose]);
    }

    #[test]
    fn completion_runs_before_after_event() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        let order = Rc::new(RefCell::new(Vec::new()));
        let o = Rc::clone(&order);
        p.add_event_listener(AfterOpen, move |_| o.borrow_mut().push("after"));
        let o = Rc::clone(&order);
        p.open(&mut f.stage, None, Some(Box::new(move || o.borrow_mut().push("complete"))));
        assert_eq!(*order.borrow(), vec!["complete", "after"]);
    }

    #[test]
    fn double_open_during_animation_yields_one_pair() {
        let mut f = fixture();
        let mut p = popup(&mut f, Some(Duration::from_millis(200)));
        let log = record(&mut p);

        p.open(&mut f.stage, None, None);
        assert!(p.is_animating());
        assert!(p.is_closed());
        p.open(&mut f.stage, None, None);
        p.toggle(&mut f.stage, None);
        p.close(&mut f.stage, None);

        finish_animations(&mut f.stage, &mut p);
        assert_eq!(p.state(), PopupState::Open);
        assert!(!p.is_animating());
        assert_eq!(*log.borrow(), vec![BeforeOpen, AfterOpen]);
        assert_eq!(
            f.stage.memory_dom().style(f.root, StyleProp::Opacity),
            Some(Style::Opacity(1.0))
        );
    }

    #[test]
    fn animating_flag_clears_only_on_completion() {
        let mut f = fixture();
        let mut p = popup(&mut f, Some(Duration::from_millis(100)));
        p.open(&mut f.stage, None, None);

        f.stage.advance_to(Duration::from_millis(99));
        assert!(p.is_animating());
        finish_animations(&mut f.stage, &mut p);
        assert!(!p.is_animating());

        p.close(&mut f.stage, None);
        assert!(p.is_animating());
        assert!(f.stage.memory_dom().is_visible(f.root));
        finish_animations(&mut f.stage, &mut p);
        assert!(p.is_closed());
        assert!(!f.stage.memory_dom().is_visible(f.root));
    }

    #[test]
    fn foreign_animation_ids_are_ignored() {
        let mut f = fixture();
        let mut p = popup(&mut f, Some(Duration::from_millis(100)));
        p.open(&mut f.stage, None, None);
        assert!(!p.on_animation_done(&mut f.stage, AnimationId(9999)));
        assert!(p.is_animating());
    }

    #[test]
    fn outside_click_requires_primary_button() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        p.open(&mut f.stage, None, None);

        let secondary = Click {
            target: f.outside,
            button: MouseButton::Secondary,
        };
        p.handle_click(&mut f.stage, secondary);
        assert_eq!(p.state(), PopupState::Open);

        let middle = Click {
            target: f.outside,
            button: MouseButton::Middle,
        };
        p.handle_click(&mut f.stage, middle);
        assert_eq!(p.state(), PopupState::Open);

        p.handle_click(&mut f.stage, Click::primary(f.outside));
        assert!(p.is_closed());
    }

    #[test]
    fn click_inside_popup_keeps_it_open_but_close_button_closes() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        p.open(&mut f.stage, None, None);

        p.handle_click(&mut f.stage, Click::primary(f.body));
        assert_eq!(p.state(), PopupState::Open);

        p.handle_click(&mut f.stage, Click::primary(f.closer));
        assert!(p.is_closed());
    }

    #[test]
    fn click_on_catcher_itself_counts_as_outside() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        p.open(&mut f.stage, None, None);
        let doc = f.stage.memory_dom().document();
        p.handle_click(&mut f.stage, Click::primary(doc));
        assert!(p.is_closed());
    }

    #[test]
    fn custom_catcher_ignores_clicks_outside_itself() {
        let mut f = fixture();
        let options = PopupOptions {
            openers: vec![f.opener_a],
            catcher: Some(f.opener_b),
            duration: None,
        };
        let mut p = Popup::new(&mut f.stage, f.root, options);
        p.open(&mut f.stage, None, None);

        p.handle_click(&mut f.stage, Click::primary(f.outside));
        assert_eq!(p.state(), PopupState::Open);
        p.handle_click(&mut f.stage, Click::primary(f.opener_b));
        assert!(p.is_closed());
    }

    #[test]
    fn same_opener_twice_opens_then_closes() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        p.handle_click(&mut f.stage, Click::primary(f.opener_a));
        assert_eq!(p.state(), PopupState::Open);
        assert_eq!(p.last_used_opener(), Some(f.opener_a));
        p.handle_click(&mut f.stage, Click::primary(f.opener_a));
        assert!(p.is_closed());
    }

    #[test]
    fn switching_opener_closes_then_reopens() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        p.toggle_or_reopen(&mut f.stage, f.opener_a);
        let log = record(&mut p);

        p.toggle_or_reopen(&mut f.stage, f.opener_b);
        assert_eq!(p.state(), PopupState::Open);
        assert_eq!(*log.borrow(), vec![BeforeClose, AfterClose, BeforeOpen, AfterOpen]);
        assert_eq!(p.last_used_opener(), Some(f.opener_b));
    }

    #[test]
    fn switching_opener_with_animation_reopens_after_close_completes() {
        let mut f = fixture();
        let mut p = popup(&mut f, Some(Duration::from_millis(50)));
        p.toggle(&mut f.stage, Some(f.opener_a));
        finish_animations(&mut f.stage, &mut p);
        let log = record(&mut p);

        p.toggle(&mut f.stage, Some(f.opener_b));
        finish_animations(&mut f.stage, &mut p);
        assert_eq!(p.state(), PopupState::Open);
        assert_eq!(*log.borrow(), vec![BeforeClose, AfterClose, BeforeOpen, AfterOpen]);
    }

    #[test]
    fn opening_from_opener_aligns_positioners() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        p.add_event_listener(BeforeOpen, move |e| *s.borrow_mut() = e.opener);

        p.handle_click(&mut f.stage, Click::primary(f.opener_a));
        let dom = f.stage.memory_dom();
        assert_eq!(dom.offset(f.anchor), Offset::new(12.0, 6.0));
        assert_eq!(*seen.borrow(), Some(f.opener_a));
    }

    #[test]
    fn escape_closes_open_popup() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        p.open(&mut f.stage, None, None);
        p.handle_escape(&mut f.stage);
        assert!(p.is_closed());
        p.handle_escape(&mut f.stage);
        assert!(p.is_closed());
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let mut f = fixture();
        let mut p = popup(&mut f, None);
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        let id = p.add_event_listener(AfterOpen, move |_| *h.borrow_mut() += 1);
        p.open(&mut f.stage, None, None);
        assert!(p.remove_event_listener(id));
        assert!(!p.remove_event_listener(id));
        p.close(&mut f.stage, None);
        p.open(&mut f.stage, None, None);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn mouse_button_codes() {
        assert_eq!(MouseButton::from_which(0), Some(MouseButton::Primary));
        assert_eq!(MouseButton::from_which(1), Some(MouseButton::Primary));
        assert_eq!(MouseButton::from_which(3), Some(MouseButton::Secondary));
        assert_eq!(MouseButton::from_which(9), None);
    }
}

//! The playground document and the widgets bound to it.
//!
//! Coordinates are terminal cells: one cell is one document pixel.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;

use ui_behaviors::dom::{
    MemoryDom, Positioning, CLASS_CLOSE_BUTTON, CLASS_NOT_DISPLAY, CLASS_POSITIONER, CLASS_PSEUDO,
    CLASS_SELECTED, CLASS_STOPPED,
};
use ui_behaviors::fixer::{FixerOptions, VerticalFixer};
use ui_behaviors::integer_input::{IntegerInput, IntegerInputEventKind, IntegerInputOptions, StepKey};
use ui_behaviors::popup::{Popup, PopupEventKind, PopupId, PopupOptions, PopupRegistry};
use ui_behaviors::rolling::RollingNumber;
use ui_behaviors::scroller::{ScrollerOptions, VerticalScroller, SCROLL_DURATION};
use ui_behaviors::sprite::{PixelSize, SpriteAnimator, SpriteEventKind, SpriteOptions};
use ui_behaviors::switcher::multiple::VALUE_ATTRIBUTE;
use ui_behaviors::switcher::{LinkSelector, MultipleSwitcher, SwitcherEventKind, SwitcherOptions, Switcher};
use ui_behaviors::{BehaviorResult, Dom, NodeId, Notice, Offset, Size, Stage, TimerId};

use crate::config::Config;

/// Braille spinner used as a 10-frame horizontal sprite sheet.
pub const SPRITE_GLYPHS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub const DOCUMENT_WIDTH: f64 = 78.0;
pub const DOCUMENT_HEIGHT: f64 = 95.0;
const FIXER_MARGIN: f64 = 1.0;
const ACTIVITY_LINES: usize = 6;
const QUANTITY_MAX: i64 = 99;

const CONTENT_TEXT: &str = "Scroll this page with the mouse wheel or the arrow keys.\n\
The sidebar on the right stays pinned to the top of the viewport while\n\
its column is in view, parks against the column top above it and\n\
against the footer bottom below it.\n\n\
Openers A and B toggle the same popup. Clicking the other opener while\n\
the popup is open closes it and reopens it under the new opener.\n\
A right click outside never closes it; a left click does.";

// ─── Scene ───────────────────────────────────────────────────────────────

/// How the renderer draws a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Look {
    /// Bordered block with a title and the node text inside
    Panel(&'static str),
    /// Bare text
    Text,
    /// Bordered block showing the current sprite frame glyph
    Sprite,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub opener_a: NodeId,
    pub opener_b: NodeId,
    pub popup: NodeId,
    pub sprite: NodeId,
    pub counter: NodeId,
    pub badge: NodeId,
    pub tags: Vec<NodeId>,
    pub quantity: NodeId,
    pub tabs: Vec<NodeId>,
    pub views: Vec<NodeId>,
    pub column: NodeId,
    pub sidebar: NodeId,
    pub footer: NodeId,
    /// Drawn nodes, in paint order
    pub looks: Vec<(NodeId, Look)>,
}

impl Scene {
    pub fn build() -> BehaviorResult<(MemoryDom, Scene)> {
        let mut dom = MemoryDom::new(Size::new(DOCUMENT_WIDTH, DOCUMENT_HEIGHT));
        let doc = dom.document();
        let mut looks = Vec::new();

        let intro = dom.append_with(
            doc,
            Offset::new(2.0, 0.0),
            Size::new(72.0, 1.0),
            &[],
            "Click openers, tabs and [x]. ? shows every key.",
        )?;
        looks.push((intro, Look::Text));

        let mut opener = |dom: &mut MemoryDom, left: f64, title: &'static str| -> BehaviorResult<NodeId> {
            let node = dom.append_with(doc, Offset::new(left, 2.0), Size::new(14.0, 3.0), &[], "click me")?;
            dom.append_with(node, Offset::new(0.0, 3.0), Size::new(1.0, 1.0), &[CLASS_POSITIONER], "")?;
            looks.push((node, Look::Panel(title)));
            Ok(node)
        };
        let opener_a = opener(&mut dom, 2.0, "Opener A")?;
        let opener_b = opener(&mut dom, 18.0, "Opener B")?;

        let sprite = dom.append(doc, Offset::new(36.0, 2.0), Size::new(14.0, 3.0))?;
        looks.push((sprite, Look::Sprite));

        let badge = dom.append(doc, Offset::new(52.0, 2.0), Size::new(22.0, 3.0))?;
        let counter = dom.append_with(badge, Offset::new(2.0, 1.0), Size::new(18.0, 1.0), &[], "1 024")?;
        looks.push((badge, Look::Panel("Badge")));
        looks.push((counter, Look::Text));

        let mut tags = Vec::new();
        for (i, label) in ["red", "green", "blue"].into_iter().enumerate() {
            let left = 36.0 + i as f64 * 12.0;
            let tag = dom.append_with(doc, Offset::new(left, 6.0), Size::new(11.0, 3.0), &[], "")?;
            dom.set_attribute(tag, VALUE_ATTRIBUTE, label);
            let link = dom.append_with(tag, Offset::new(2.0, 1.0), Size::new(7.0, 1.0), &[CLASS_PSEUDO], label)?;
            looks.push((tag, Look::Panel("")));
            looks.push((link, Look::Text));
            tags.push(tag);
        }

        let quantity = dom.append_with(doc, Offset::new(36.0, 9.0), Size::new(14.0, 3.0), &[], "3")?;
        looks.push((quantity, Look::Panel("Qty")));

        let mut tabs = Vec::new();
        for (i, (label, classes)) in [
            ("Alpha", &[CLASS_SELECTED][..]),
            ("Beta", &[][..]),
            ("All", &["for_all"][..]),
        ]
        .into_iter()
        .enumerate()
        {
            let left = 2.0 + i as f64 * 12.0;
            let tab = dom.append_with(doc, Offset::new(left, 13.0), Size::new(11.0, 3.0), classes, "")?;
            let link = dom.append_with(tab, Offset::new(2.0, 1.0), Size::new(7.0, 1.0), &[CLASS_PSEUDO], label)?;
            looks.push((tab, Look::Panel("")));
            looks.push((link, Look::Text));
            tabs.push(tab);
        }

        let mut views = Vec::new();
        for (i, text) in ["First view", "Second view"].into_iter().enumerate() {
            let left = 2.0 + i as f64 * 18.0;
            let view = dom.append_with(doc, Offset::new(left, 17.0), Size::new(17.0, 5.0), &[], text)?;
            looks.push((view, Look::Panel("View")));
            views.push(view);
        }

        let content = dom.append_with(doc, Offset::new(2.0, 23.0), Size::new(42.0, 70.0), &[], CONTENT_TEXT)?;
        looks.push((content, Look::Panel("Content")));

        let column = dom.append(doc, Offset::new(46.0, 13.0), Size::new(28.0, 70.0))?;
        let sidebar = dom.append_with(column, Offset::new(1.0, 0.0), Size::new(26.0, 6.0), &[], "")?;
        let footer = dom.append_with(doc, Offset::new(46.0, 83.0), Size::new(28.0, 8.0), &[], "bottom limiter")?;
        looks.push((column, Look::Panel("Column")));
        looks.push((sidebar, Look::Panel("Fixed")));
        looks.push((footer, Look::Panel("Footer")));

        // Last child paints on top and wins hit tests.
        let popup = dom.append_with(
            doc,
            Offset::new(2.0, 6.0),
            Size::new(30.0, 5.0),
            &[CLASS_NOT_DISPLAY],
            "Anchored to its opener.\nEsc or a left click outside\ncloses it.",
        )?;
        dom.append_with(popup, Offset::new(0.0, 0.0), Size::new(1.0, 1.0), &[CLASS_POSITIONER], "")?;
        let close = dom.append_with(popup, Offset::new(25.0, 0.0), Size::new(3.0, 1.0), &[CLASS_CLOSE_BUTTON], "[x]")?;
        looks.push((popup, Look::Panel("Popup")));
        looks.push((close, Look::Text));

        let scene = Scene {
            opener_a,
            opener_b,
            popup,
            sprite,
            counter,
            badge,
            tags,
            quantity,
            tabs,
            views,
            column,
            sidebar,
            footer,
            looks,
        };
        Ok((dom, scene))
    }
}

// ─── Activity Feed ───────────────────────────────────────────────────────

/// Most recent widget events, newest last. Shared with listener closures.
#[derive(Debug, Clone, Default)]
pub struct Activity(Rc<RefCell<VecDeque<String>>>);

impl Activity {
    pub fn push(&self, line: String) {
        let mut lines = self.0.borrow_mut();
        lines.push_back(line);
        while lines.len() > ACTIVITY_LINES {
            lines.pop_front();
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().iter().cloned().collect()
    }
}

// ─── Widgets ─────────────────────────────────────────────────────────────

pub struct Widgets {
    pub popups: PopupRegistry,
    pub popup: PopupId,
    pub sprite: SpriteAnimator,
    pub rolling: RollingNumber,
    pub switcher: Switcher,
    pub tags: MultipleSwitcher,
    pub quantity: IntegerInput,
    pub fixer: VerticalFixer,
    pub scroller: VerticalScroller,
    pub footer: NodeId,
    pub activity: Activity,
    animations: bool,
}

impl Widgets {
    pub fn new(stage: &mut Stage, scene: &Scene, config: &Config) -> BehaviorResult<Self> {
        let activity = Activity::default();

        let mut popup = Popup::new(
            stage,
            scene.popup,
            PopupOptions {
                openers: vec![scene.opener_a, scene.opener_b],
                catcher: None,
                duration: config.popup_duration(),
            },
        );
        for kind in [
            PopupEventKind::BeforeOpen,
            PopupEventKind::AfterOpen,
            PopupEventKind::BeforeClose,
            PopupEventKind::AfterClose,
        ] {
            let feed = activity.clone();
            popup.add_event_listener(kind, move |event| {
                let from = event.opener.map(|n| format!(" from #{}", n.0)).unwrap_or_default();
                feed.push(format!("popup {:?}{from}", event.kind));
            });
        }
        let mut popups = PopupRegistry::new();
        let popup = popups.register(popup);

        let mut sprite = SpriteAnimator::new(
            scene.sprite,
            PixelSize::horizontal(1),
            PixelSize::horizontal(SPRITE_GLYPHS.len() as u32),
            SpriteOptions {
                pause_frames: config.sprite.pause_frames.clone(),
                frames_interval_ms: config.sprite.interval_ms,
                ..SpriteOptions::default()
            },
        )?;
        let feed = activity.clone();
        sprite.add_event_listener(SpriteEventKind::Pause, move |event| {
            feed.push(format!("sprite paused on frame {}", event.frame));
        });
        sprite.play(stage);

        let rolling = RollingNumber::new(stage, scene.counter, Some(scene.badge));

        let mut switcher = Switcher::new(
            stage.memory_dom_mut(),
            &scene.tabs,
            SwitcherOptions {
                views: scene.views.clone(),
                ..SwitcherOptions::default()
            },
        );
        let feed = activity.clone();
        switcher.add_event_listener(SwitcherEventKind::Change, move |event| {
            let by = event.author.as_deref().unwrap_or("click");
            feed.push(format!("tab {} selected by {by}", event.index));
        });

        let mut tags = MultipleSwitcher::new(stage.memory_dom_mut(), &scene.tags, LinkSelector::default())?;
        let feed = activity.clone();
        tags.add_event_listener(SwitcherEventKind::Change, move |event| {
            let state = if event.selected { "on" } else { "off" };
            feed.push(format!("tag {} {state}", event.value));
        });

        let mut quantity = IntegerInput::new(
            stage,
            scene.quantity,
            IntegerInputOptions {
                max: Some(QUANTITY_MAX),
                ..IntegerInputOptions::default()
            },
        );
        let feed = activity.clone();
        quantity.add_event_listener(IntegerInputEventKind::Change, move |event| {
            let value = event.value.map(|v| v.to_string()).unwrap_or_default();
            feed.push(format!("qty {value}"));
        });

        let scroller = VerticalScroller::new(ScrollerOptions {
            top_margin: FIXER_MARGIN,
            duration: if config.appearance.animations {
                SCROLL_DURATION
            } else {
                Duration::ZERO
            },
        });

        let fixer = VerticalFixer::new(
            stage.memory_dom_mut(),
            scene.sidebar,
            scene.column,
            scene.footer,
            FixerOptions {
                width_like: None,
                top_margin: FIXER_MARGIN,
            },
        );

        let mut widgets = Self {
            popups,
            popup,
            sprite,
            rolling,
            switcher,
            tags,
            quantity,
            fixer,
            scroller,
            footer: scene.footer,
            activity,
            animations: config.appearance.animations,
        };
        widgets.sync_fixed_positioning(stage.memory_dom_mut());
        Ok(widgets)
    }

    /// Route a due timer or finished animation to the widget owning it.
    pub fn dispatch(&mut self, stage: &mut Stage, notice: Notice) {
        let handled = match notice {
            Notice::Timer(id) => {
                self.sprite.on_timer(stage, id)
                    || self.rolling.on_timer(stage, id)
                    || self.quantity.on_timer(stage, id)
                    || self.scroll_step(stage, id)
            }
            Notice::AnimationDone(id) => {
                self.popups.on_animation_done(stage, id) || self.rolling.on_animation_done(stage, id)
            }
        };
        if !handled {
            trace!(?notice, "notice without owner");
        }
    }

    /// Jump the stage clock to `now` and deliver everything due. After a
    /// stall each overdue timer fires once, so loops resume instead of
    /// replaying the missed ticks.
    pub fn pump(&mut self, stage: &mut Stage, now: Duration) {
        stage.catch_up(now, |stage, notice| self.dispatch(stage, notice));
    }

    pub fn change_counter(&mut self, stage: &mut Stage, value: i64) {
        if self.animations {
            self.rolling.set_value(stage, value, None);
        } else {
            self.rolling.set_value_without_roll(stage, value);
        }
    }

    pub fn scroll(&mut self, stage: &mut Stage, scroll_top: f64, viewport_height: f64) {
        let dom = stage.memory_dom_mut();
        dom.set_viewport_height(viewport_height);
        dom.set_scroll_top(scroll_top);
        self.after_scroll(dom);
    }

    /// Animate back to the top of the document.
    pub fn scroll_home(&mut self, stage: &mut Stage, viewport_height: f64) {
        stage.memory_dom_mut().set_viewport_height(viewport_height);
        self.scroller.scroll_to_offset(stage, 0.0, None);
    }

    /// Animate until the footer is in view.
    pub fn scroll_to_footer(&mut self, stage: &mut Stage, viewport_height: f64) {
        stage.memory_dom_mut().set_viewport_height(viewport_height);
        let feed = self.activity.clone();
        self.scroller
            .scroll_to_block(stage, self.footer, false, Some(Box::new(move || feed.push("footer reached".into()))));
    }

    pub fn step_quantity(&mut self, stage: &mut Stage, key: StepKey) {
        self.quantity.on_step_key(stage, key);
    }

    fn scroll_step(&mut self, stage: &mut Stage, id: TimerId) -> bool {
        if !self.scroller.on_timer(stage, id) {
            return false;
        }
        self.after_scroll(stage.memory_dom_mut());
        true
    }

    fn after_scroll(&mut self, dom: &mut MemoryDom) {
        self.fixer.on_scroll(dom);
        self.sync_fixed_positioning(dom);
    }

    pub fn resize(&mut self, stage: &mut Stage) {
        let dom = stage.memory_dom_mut();
        self.fixer.on_resize(dom);
        self.sync_fixed_positioning(dom);
    }

    /// The free sidebar is viewport-fixed; a parked one flows with its column.
    fn sync_fixed_positioning(&self, dom: &mut MemoryDom) {
        let root = self.fixer.root();
        let positioning = if dom.has_class(root, CLASS_STOPPED) {
            Positioning::Static
        } else {
            Positioning::Fixed
        };
        dom.set_positioning(root, positioning);
        let status = self
            .fixer
            .status()
            .map(|s| format!("{s:?}"))
            .unwrap_or_default();
        dom.set_text(root, &status);
    }
}

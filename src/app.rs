use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton as TermButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use tracing::debug;

use ui_behaviors::integer_input::StepKey;
use ui_behaviors::popup::{Click, MouseButton};
use ui_behaviors::{BehaviorResult, Dom, Stage};

use crate::config::{Config, KeysConfig};
use crate::demo::{Scene, Widgets};
use crate::event::Event;

/// Rows moved per wheel notch.
const WHEEL_ROWS: f64 = 3.0;

// ── Application State ─────────────────────────────────────────────────

pub struct App {
    pub config: Config,
    pub stage: Stage,
    pub scene: Scene,
    pub widgets: Widgets,
    /// Screen area the document is drawn into; set by the renderer
    pub viewport: Rect,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> BehaviorResult<Self> {
        let (dom, scene) = Scene::build()?;
        let mut stage = Stage::new(dom);
        let widgets = Widgets::new(&mut stage, &scene, &config)?;

        Ok(Self {
            config,
            stage,
            scene,
            widgets,
            viewport: Rect::default(),
            show_help: false,
            should_quit: false,
        })
    }

    /// Handle one terminal event. `now` is the time since start; the stage
    /// clock is caught up to it after every event.
    pub fn handle_event(&mut self, event: Event, now: Duration) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(_w, _h) => self.widgets.resize(&mut self.stage),
            Event::Tick => {}
        }
        self.widgets.pump(&mut self.stage, now);
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let keys = &self.config.keys;
        if self.show_help {
            if key.code == KeyCode::Esc || KeysConfig::matches(&keys.help, key.code) {
                self.show_help = false;
            }
            return;
        }

        let code = key.code;
        if KeysConfig::matches(&keys.quit, code) {
            self.should_quit = true;
        } else if KeysConfig::matches(&keys.help, code) {
            self.show_help = true;
        } else if KeysConfig::matches(&keys.play_pause, code) {
            self.toggle_sprite();
        } else if KeysConfig::matches(&keys.rewind, code) {
            self.widgets.sprite.rewind(&mut self.stage);
        } else if KeysConfig::matches(&keys.reverse, code) {
            let interval = self.widgets.sprite.frames_interval();
            self.widgets.sprite.set_frames_interval(-interval);
        } else if KeysConfig::matches(&keys.increment, code) {
            self.shift_counter(self.config.rolling.step);
        } else if KeysConfig::matches(&keys.decrement, code) {
            self.shift_counter(-self.config.rolling.step);
        } else if KeysConfig::matches(&keys.zero, code) {
            self.widgets.change_counter(&mut self.stage, 0);
        } else {
            match code {
                KeyCode::Esc => self.widgets.popups.on_escape(&mut self.stage),
                KeyCode::Up => self.scroll_by(-1.0),
                KeyCode::Down => self.scroll_by(1.0),
                KeyCode::PageUp => self.scroll_by(-f64::from(self.viewport.height)),
                KeyCode::PageDown => self.scroll_by(f64::from(self.viewport.height)),
                KeyCode::Home => {
                    let height = f64::from(self.viewport.height);
                    self.widgets.scroll_home(&mut self.stage, height);
                }
                KeyCode::End => {
                    let height = f64::from(self.viewport.height);
                    self.widgets.scroll_to_footer(&mut self.stage, height);
                }
                KeyCode::Char(']') => self.widgets.step_quantity(&mut self.stage, StepKey::Up),
                KeyCode::Char('[') => self.widgets.step_quantity(&mut self.stage, StepKey::Down),
                _ => {}
            }
        }
    }

    /// Clicks become document clicks at the hit node; the wheel scrolls.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let which = match mouse.kind {
            MouseEventKind::Down(TermButton::Left) => 1,
            MouseEventKind::Down(TermButton::Middle) => 2,
            MouseEventKind::Down(TermButton::Right) => 3,
            MouseEventKind::ScrollUp => return self.scroll_by(-WHEEL_ROWS),
            MouseEventKind::ScrollDown => return self.scroll_by(WHEEL_ROWS),
            _ => return,
        };
        let Some(button) = MouseButton::from_which(which) else {
            return;
        };
        if !self.viewport.contains(Position::new(mouse.column, mouse.row)) {
            return;
        }

        let dom = self.stage.memory_dom();
        let x = f64::from(mouse.column - self.viewport.x);
        let y = f64::from(mouse.row - self.viewport.y) + dom.scroll_top();
        let target = dom.hit_test(x, y).unwrap_or_else(|| dom.document());
        debug!(x, y, target = target.0, ?button, "click");

        self.widgets
            .popups
            .on_click(&mut self.stage, Click { target, button });
        if button.is_primary() {
            let dom = self.stage.memory_dom_mut();
            if !self.widgets.switcher.handle_click(dom, target) {
                self.widgets.tags.handle_click(dom, target);
            }
        }
    }

    /// Re-clamp the scroll position and re-measure the fixer after the
    /// viewport changed size.
    pub fn refit(&mut self) {
        self.widgets.resize(&mut self.stage);
        self.scroll_by(0.0);
    }

    fn toggle_sprite(&mut self) {
        if self.widgets.sprite.is_animating() {
            self.widgets.sprite.pause(&mut self.stage);
        } else {
            self.widgets.sprite.play(&mut self.stage);
        }
    }

    fn shift_counter(&mut self, delta: i64) {
        let value = self.widgets.rolling.value().saturating_add(delta);
        self.widgets.change_counter(&mut self.stage, value);
    }

    fn scroll_by(&mut self, rows: f64) {
        let top = self.stage.memory_dom().scroll_top() + rows;
        let height = f64::from(self.viewport.height);
        self.widgets.scroll(&mut self.stage, top, height);
    }
}

//! Text input that only holds an integer within `min..=max`.
//!
//! The host forwards the input's events: `on_key_up` / `on_input` while
//! typing, `on_blur`, `on_focus`, `on_step_key` for Up / Down, `on_wheel`
//! and `on_form_submit`. Typing is parsed after a debounce timer (0 ms, or
//! [`KEYBOARD_INPUT_DELAY`] when delayed input is enabled) that the host
//! reports back through [`IntegerInput::on_timer`].

use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::animate::Host;
use crate::dom::{Dom, NodeId};
use crate::error::{BehaviorError, BehaviorResult};
use crate::format::{format_integer, NumberFormat};
use crate::observer::{ListenerId, Observers};
use crate::timer::TimerId;

pub const KEYBOARD_INPUT_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MIN: i64 = 1;
pub const DEFAULT_STEP: i64 = 1;
/// Value an empty input starts with when empty values are not allowed.
const FALLBACK_VALUE: i64 = 1;

/// Which input event queued the pending parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTrigger {
    KeyUp,
    Input,
    Blur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKey {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerInputEventKind {
    Change,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerChangeEvent {
    pub kind: IntegerInputEventKind,
    pub value: Option<i64>,
    /// Who asked for the change; `None` for user input.
    pub author: Option<String>,
}

/// Bounds fall back to the element's `min` / `max` / `step` attributes,
/// which are removed once read.
#[derive(Debug, Clone, Default)]
pub struct IntegerInputOptions {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub step: Option<i64>,
    pub allow_empty_value: bool,
    /// Group digits on blur, strip the grouping on focus and submit.
    pub format_value: bool,
    pub number_format: NumberFormat,
    pub delayed_keyboard_input: bool,
    pub mousewheel_change: bool,
}

pub struct IntegerInput {
    root: NodeId,
    min: i64,
    max: Option<i64>,
    step: i64,
    allow_empty_value: bool,
    format_value: bool,
    number_format: NumberFormat,
    input_delay: Duration,
    mousewheel_change: bool,
    value: Option<i64>,
    pending: Option<(TimerId, InputTrigger)>,
    observers: Observers<IntegerInputEventKind, IntegerChangeEvent>,
}

/// Digits of the text as a number; `None` without any digit. Runs of digits
/// too long for `i64` saturate.
fn parse_digits(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(i64::MAX))
}

fn read_bound<D: Dom>(dom: &mut D, root: NodeId, given: Option<i64>, attribute: &str) -> Option<i64> {
    if given.is_some() {
        return given;
    }
    let parsed = dom.attribute(root, attribute)?.trim().parse().ok();
    if parsed.is_some() {
        dom.remove_attribute(root, attribute);
    }
    parsed
}

impl IntegerInput {
    /// Take over `root`, reading the starting value from its text. The first
    /// value is set silently.
    pub fn new<H: Host>(host: &mut H, root: NodeId, options: IntegerInputOptions) -> Self {
        let dom = host.dom_mut();
        let min = read_bound(dom, root, options.min, "min").unwrap_or(DEFAULT_MIN);
        let max = read_bound(dom, root, options.max, "max");
        let step = read_bound(dom, root, options.step, "step").unwrap_or(DEFAULT_STEP);
        if let Some(max) = max {
            dom.set_attribute(root, "maxlength", &max.to_string().len().to_string());
        }

        let mut input = Self {
            root,
            min,
            max,
            step,
            allow_empty_value: options.allow_empty_value,
            format_value: options.format_value,
            number_format: options.number_format,
            input_delay: if options.delayed_keyboard_input {
                KEYBOARD_INPUT_DELAY
            } else {
                Duration::ZERO
            },
            mousewheel_change: options.mousewheel_change,
            value: None,
            pending: None,
            observers: Observers::new(),
        };

        let typed = parse_digits(&host.dom().text(root));
        let initial = if input.allow_empty_value {
            typed
        } else {
            Some(typed.unwrap_or(FALLBACK_VALUE))
        };
        input.store(host, initial, true, None);
        if input.format_value {
            input.show_formatted(host);
        }
        debug!(node = root.0, value = ?input.value, min, ?max, step, "integer input created");
        input
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn value(&self) -> Option<i64> {
        self.value
    }

    /// Fails with [`BehaviorError::EmptyInput`] while the input is empty.
    pub fn non_nullable_value(&self) -> BehaviorResult<i64> {
        self.value.ok_or(BehaviorError::EmptyInput)
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    /// `None` means unbounded.
    pub fn max(&self) -> Option<i64> {
        self.max
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Clamp and show `value`. `None` is ignored unless empty values are
    /// allowed.
    pub fn set_value<H: Host>(&mut self, host: &mut H, value: Option<i64>, author: Option<&str>) {
        if value.is_some() || self.allow_empty_value {
            self.store(host, value, false, author);
        }
    }

    pub fn add_event_listener<F>(&mut self, kind: IntegerInputEventKind, callback: F) -> ListenerId
    where
        F: FnMut(&IntegerChangeEvent) + 'static,
    {
        self.observers.add(kind, callback)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.observers.remove(id)
    }

    pub fn on_key_up<H: Host>(&mut self, host: &mut H) {
        self.schedule(host, InputTrigger::KeyUp);
    }

    pub fn on_input<H: Host>(&mut self, host: &mut H) {
        self.schedule(host, InputTrigger::Input);
    }

    /// Parse the text now; an empty input falls back to the last value
    /// unless empty values are allowed.
    pub fn on_blur<H: Host>(&mut self, host: &mut H) {
        self.cancel_pending(host);
        self.parse_input(host, InputTrigger::Blur);
        if self.format_value {
            self.show_formatted(host);
        }
    }

    pub fn on_focus<H: Host>(&mut self, host: &mut H) {
        if self.format_value {
            self.show_plain(host);
        }
    }

    pub fn on_form_submit<H: Host>(&mut self, host: &mut H) {
        if self.format_value {
            self.show_plain(host);
        }
    }

    /// Step by one increment. Returns `true`; the key is consumed.
    pub fn on_step_key<H: Host>(&mut self, host: &mut H, key: StepKey) -> bool {
        match key {
            StepKey::Up => self.increment(host),
            StepKey::Down => self.decrement(host),
        }
        true
    }

    /// Positive deltas increment. Returns `false` when wheel changes are off.
    pub fn on_wheel<H: Host>(&mut self, host: &mut H, delta: f64) -> bool {
        if !self.mousewheel_change {
            return false;
        }
        if delta > 0.0 {
            self.increment(host);
        } else {
            self.decrement(host);
        }
        true
    }

    /// Run the debounced parse. Returns `false` for foreign timers.
    pub fn on_timer<H: Host>(&mut self, host: &mut H, id: TimerId) -> bool {
        let Some((_, trigger)) = self.pending.filter(|(timer, _)| *timer == id) else {
            return false;
        };
        self.pending = None;
        self.parse_input(host, trigger);
        true
    }

    pub fn increment<H: Host>(&mut self, host: &mut H) {
        if let Some(value) = self.value {
            self.set_value(host, Some(value.saturating_add(self.step)), None);
        }
    }

    pub fn decrement<H: Host>(&mut self, host: &mut H) {
        if let Some(value) = self.value {
            self.set_value(host, Some(value.saturating_sub(self.step)), None);
        }
    }

    fn schedule<H: Host>(&mut self, host: &mut H, trigger: InputTrigger) {
        self.cancel_pending(host);
        let timer = host.set_timeout(self.input_delay);
        trace!(node = self.root.0, ?trigger, "integer input parse scheduled");
        self.pending = Some((timer, trigger));
    }

    fn cancel_pending<H: Host>(&mut self, host: &mut H) {
        if let Some((timer, _)) = self.pending.take() {
            host.clear(timer);
        }
    }

    fn parse_input<H: Host>(&mut self, host: &mut H, trigger: InputTrigger) {
        match parse_digits(&host.dom().text(self.root)) {
            Some(value) => self.set_value(host, Some(value), None),
            None => match trigger {
                InputTrigger::KeyUp => host.dom_mut().set_text(self.root, ""),
                InputTrigger::Blur => {
                    let fallback = if self.allow_empty_value { None } else { self.value };
                    self.set_value(host, fallback, None);
                }
                InputTrigger::Input => {}
            },
        }
    }

    fn normalize(&self, value: i64) -> i64 {
        let capped = self.max.map_or(value, |max| value.min(max));
        capped.max(self.min)
    }

    fn store<H: Host>(&mut self, host: &mut H, value: Option<i64>, initial: bool, author: Option<&str>) {
        let value = value.map(|v| self.normalize(v));
        let text = value.map(|v| v.to_string()).unwrap_or_default();
        if host.dom().text(self.root) != text {
            host.dom_mut().set_text(self.root, &text);
        }

        if value == self.value {
            return;
        }
        self.value = value;
        if !initial {
            debug!(node = self.root.0, ?value, author, "integer input changed");
            self.observers.emit(
                IntegerInputEventKind::Change,
                &IntegerChangeEvent {
                    kind: IntegerInputEventKind::Change,
                    value,
                    author: author.map(str::to_string),
                },
            );
        }
    }

    fn show_formatted<H: Host>(&self, host: &mut H) {
        if let Some(value) = self.value {
            let text = format_integer(value, &self.number_format);
            host.dom_mut().set_text(self.root, &text);
        }
    }

    fn show_plain<H: Host>(&self, host: &mut H) {
        if let Some(value) = self.value {
            host.dom_mut().set_text(self.root, &value.to_string());
        }
    }
}

impl fmt::Debug for IntegerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegerInput")
            .field("root", &self.root)
            .field("value", &self.value)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("step", &self.step)
            .finish()
    }
}

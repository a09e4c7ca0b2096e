//! Animated change of an element's numeric text.
//!
//! One change is [`ROLL_FRAMES`] rolls, [`ROLL_INTERVAL`] apart. Each roll
//! shows an evenly spaced intermediate value; the last shows the exact target.

use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::animate::{AnimationId, Easing, Host};
use crate::dom::{Dom, NodeId, Style, StyleProp};
use crate::format::{clean_to_number, format_digits, NumberFormat, MINUS};
use crate::popup::Completion;
use crate::timer::TimerId;

pub const ROLL_FRAMES: u32 = 8;
pub const ROLL_INTERVAL: Duration = Duration::from_millis(45);
/// Fade-out length of the hide-if-zero element.
pub const HIDE_DURATION: Duration = Duration::from_millis(300);

struct Roll {
    timer: TimerId,
    start: i64,
    target: i64,
    frame: u32,
    on_complete: Option<Completion>,
}

pub struct RollingNumber {
    root: NodeId,
    hide_if_zero: Option<NodeId>,
    format: NumberFormat,
    value: i64,
    visible_value: i64,
    roll: Option<Roll>,
    hiding: Option<AnimationId>,
}

impl RollingNumber {
    /// Take over `root`, reading the starting value from its text (0 when it
    /// shows no number). `hide_if_zero` is hidden while the value is 0.
    pub fn new<H: Host>(host: &mut H, root: NodeId, hide_if_zero: Option<NodeId>) -> Self {
        let value = clean_to_number(&host.dom().text(root)).unwrap_or(0);
        let mut rolling = Self {
            root,
            hide_if_zero,
            format: NumberFormat::default(),
            value,
            visible_value: value,
            roll: None,
            hiding: None,
        };
        rolling.insert_number(host, value);
        rolling.hide_if_needed(host, true);
        debug!(node = root.0, value, "rolling number created");
        rolling
    }

    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// The number currently on screen; lags [`value`](Self::value) mid-roll.
    pub fn visible_value(&self) -> i64 {
        self.visible_value
    }

    pub fn is_rolling(&self) -> bool {
        self.roll.is_some()
    }

    pub fn set_value<H: Host>(&mut self, host: &mut H, value: i64, on_complete: Option<Completion>) {
        self.change(host, value, true, on_complete);
    }

    pub fn set_value_without_roll<H: Host>(&mut self, host: &mut H, value: i64) {
        self.change(host, value, false, None);
    }

    /// Returns `false` for foreign timers.
    pub fn on_timer<H: Host>(&mut self, host: &mut H, id: TimerId) -> bool {
        let Some(roll) = self.roll.as_mut().filter(|roll| roll.timer == id) else {
            return false;
        };

        roll.frame += 1;
        let last = roll.frame >= ROLL_FRAMES;
        let shown = if last {
            roll.target
        } else {
            roll_step(roll.start, roll.target, roll.frame)
        };
        trace!(node = self.root.0, frame = roll.frame, shown, "roll");
        self.insert_number(host, shown);

        if last {
            let on_complete = self.roll.as_mut().and_then(|roll| roll.on_complete.take());
            self.stop_all(host);
            self.hide_if_needed(host, false);
            if let Some(on_complete) = on_complete {
                on_complete();
            }
        }
        true
    }

    /// Returns `false` when the animation is not this counter's fade.
    pub fn on_animation_done<H: Host>(&mut self, _host: &mut H, id: AnimationId) -> bool {
        if self.hiding != Some(id) {
            return false;
        }
        self.hiding = None;
        true
    }

    fn change<H: Host>(&mut self, host: &mut H, value: i64, roll: bool, on_complete: Option<Completion>) {
        if value == self.value {
            return;
        }

        self.stop_all(host);
        if value != 0 && self.value == 0 {
            self.show(host);
        }
        debug!(node = self.root.0, from = self.value, to = value, roll, "rolling number change");
        self.value = value;

        if roll {
            let timer = host.set_interval(ROLL_INTERVAL);
            self.roll = Some(Roll {
                timer,
                start: self.visible_value,
                target: value,
                frame: 0,
                on_complete,
            });
        } else {
            self.insert_number(host, value);
            self.hide_if_needed(host, true);
        }
    }

    fn insert_number<H: Host>(&mut self, host: &mut H, number: i64) {
        let digits = format_digits(number.unsigned_abs(), &self.format);
        let text = if number < 0 {
            format!("{MINUS}{digits}")
        } else {
            digits
        };
        host.dom_mut().set_text(self.root, &text);
        self.visible_value = number;
    }

    /// Cancel the roll (dropping its completion) and any hide fade.
    fn stop_all<H: Host>(&mut self, host: &mut H) {
        if let Some(roll) = self.roll.take() {
            host.clear(roll.timer);
        }
        if let Some(id) = self.hiding.take() {
            host.stop(id);
        }
    }

    fn show<H: Host>(&mut self, host: &mut H) {
        if let Some(node) = self.hide_if_zero {
            host.dom_mut().clear_style(node, StyleProp::Opacity);
        }
    }

    fn hide_if_needed<H: Host>(&mut self, host: &mut H, quickly: bool) {
        if self.value != 0 {
            return;
        }
        let Some(node) = self.hide_if_zero else {
            return;
        };

        if quickly {
            host.dom_mut().set_style(node, Style::Opacity(0.0));
        } else {
            self.hiding = Some(host.animate_opacity(node, 0.0, HIDE_DURATION, Easing::Swing));
        }
    }
}

/// Value shown on roll `frame`: `frame / ROLL_FRAMES` of the way from `start`
/// to `target`, rounded half away from zero. Exact for any pair of `i64`.
fn roll_step(start: i64, target: i64, frame: u32) -> i64 {
    let span = i128::from(target) - i128::from(start);
    let scaled = span * i128::from(frame);
    let frames = i128::from(ROLL_FRAMES);
    let half = if scaled < 0 { -(frames / 2) } else { frames / 2 };
    let moved = (scaled + half) / frames;
    i64::try_from(i128::from(start) + moved).unwrap_or(target)
}

impl fmt::Debug for RollingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollingNumber")
            .field("root", &self.root)
            .field("value", &self.value)
            .field("visible_value", &self.visible_value)
            .field("rolling", &self.roll.is_some())
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

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn setup(text: &str) -> (Stage, NodeId, NodeId) {
        let mut dom = MemoryDom::new(Size::new(50.0, 50.0));
        let doc = dom.document();
        let badge = dom.append(doc, Offset::default(), Size::new(10.0, 3.0)).unwrap();
        let counter = dom
            .append_with(badge, Offset::default(), Size::new(8.0, 1.0), &[], text)
            .unwrap();
        (Stage::new(dom), counter, badge)
    }

    fn run(stage: &mut Stage, rolling: &mut RollingNumber, until: Duration, seen: &mut Vec<String>) {
        let root = rolling.root();
        stage.run_until(until, |stage, notice| match notice {
            Notice::Timer(id) => {
                if rolling.on_timer(stage, id) {
                    seen.push(stage.memory_dom().text(root));
                }
            }
            Notice::AnimationDone(id) => {
                rolling.on_animation_done(stage, id);
            }
        });
    }

    fn opacity(stage: &Stage, node: NodeId) -> Option<Style> {
        stage.memory_dom().style(node, StyleProp::Opacity)
    }

    #[test]
    fn reads_initial_value_from_text() {
        let (mut stage, counter, _) = setup("12\u{2009}345 points");
        let rolling = RollingNumber::new(&mut stage, counter, None);
        assert_eq!(rolling.value(), 12345);

        let (mut stage, counter, badge) = setup("none");
        let rolling = RollingNumber::new(&mut stage, counter, Some(badge));
        assert_eq!(rolling.value(), 0);
        assert_eq!(stage.memory_dom().text(counter), "0");
        assert_eq!(opacity(&stage, badge), Some(Style::Opacity(0.0)));
    }

    #[test]
    fn rolls_in_eight_even_steps() {
        let (mut stage, counter, _) = setup("0");
        let mut rolling = RollingNumber::new(&mut stage, counter, None);
        let done = Rc::new(RefCell::new(false));
        let d = Rc::clone(&done);
        rolling.set_value(&mut stage, 80, Some(Box::new(move || *d.borrow_mut() = true)));

        assert_eq!(rolling.value(), 80);
        assert_eq!(rolling.visible_value(), 0);

        let mut seen = Vec::new();
        run(&mut stage, &mut rolling, ms(1000), &mut seen);
        assert_eq!(seen, ["10", "20", "30", "40", "50", "60", "70", "80"]);
        assert!(*done.borrow());
        assert!(!rolling.is_rolling());
        assert_eq!(stage.pending_timers(), 0);
    }

    #[test]
    fn last_roll_lands_exactly_on_target() {
        let (mut stage, counter, _) = setup("0");
        let mut rolling = RollingNumber::new(&mut stage, counter, None);
        rolling.set_value(&mut stage, 12345, None);
        let mut seen = Vec::new();
        run(&mut stage, &mut rolling, ms(1000), &mut seen);
        assert_eq!(seen.len(), ROLL_FRAMES as usize);
        assert_eq!(seen.last().map(String::as_str), Some("12\u{2009}345"));
    }

    #[test]
    fn interrupted_roll_continues_from_visible_value() {
        let (mut stage, counter, _) = setup("0");
        let mut rolling = RollingNumber::new(&mut stage, counter, None);
        let first_done = Rc::new(RefCell::new(false));
        let f = Rc::clone(&first_done);
        rolling.set_value(&mut stage, 80, Some(Box::new(move || *f.borrow_mut() = true)));

        let mut seen = Vec::new();
        run(&mut stage, &mut rolling, ms(90), &mut seen);
        assert_eq!(rolling.visible_value(), 20);

        rolling.set_value(&mut stage, 100, None);
        seen.clear();
        run(&mut stage, &mut rolling, ms(1000), &mut seen);
        assert_eq!(seen, ["30", "40", "50", "60", "70", "80", "90", "100"]);
        assert!(!*first_done.borrow());
    }

    #[test]
    fn negative_values_use_minus_sign() {
        let (mut stage, counter, _) = setup("3");
        let mut rolling = RollingNumber::new(&mut stage, counter, None);
        rolling.set_value_without_roll(&mut stage, -1500);
        assert_eq!(stage.memory_dom().text(counter), "\u{2212}1500");
    }

    #[test]
    fn custom_format_groups_with_its_separator() {
        let (mut stage, counter, _) = setup("1");
        let format = NumberFormat {
            group_separator: ",".into(),
            ..NumberFormat::default()
        };
        let mut rolling = RollingNumber::new(&mut stage, counter, None).with_format(format);
        rolling.set_value_without_roll(&mut stage, 1_234_567);
        assert_eq!(stage.memory_dom().text(counter), "1,234,567");
    }

    #[test]
    fn rolls_across_the_whole_i64_range() {
        let (mut stage, counter, _) = setup("0");
        let mut rolling = RollingNumber::new(&mut stage, counter, None);
        rolling.set_value_without_roll(&mut stage, i64::MIN);
        rolling.set_value(&mut stage, i64::MAX, None);

        let mut seen = Vec::new();
        run(&mut stage, &mut rolling, ROLL_INTERVAL, &mut seen);
        assert_eq!(rolling.visible_value(), -6_917_529_027_641_081_856);

        run(&mut stage, &mut rolling, ms(1000), &mut seen);
        assert_eq!(rolling.visible_value(), i64::MAX);
        assert_eq!(seen.len(), ROLL_FRAMES as usize);
    }

    #[test]
    fn roll_steps_round_half_away_from_zero() {
        assert_eq!(roll_step(0, 4, 1), 1);
        assert_eq!(roll_step(0, -4, 1), -1);
        assert_eq!(roll_step(0, 3, 1), 0);
        assert_eq!(roll_step(20, 100, 1), 30);
    }

    #[test]
    fn large_values_keep_every_digit() {
        let (mut stage, counter, _) = setup("0");
        let mut rolling = RollingNumber::new(&mut stage, counter, None);
        rolling.set_value_without_roll(&mut stage, -9_007_199_254_740_993);
        assert_eq!(
            stage.memory_dom().text(counter),
            "\u{2212}9\u{2009}007\u{2009}199\u{2009}254\u{2009}740\u{2009}993"
        );
    }

    #[test]
    fn same_value_is_a_no_op() {
        let (mut stage, counter, _) = setup("5");
        let mut rolling = RollingNumber::new(&mut stage, counter, None);
        rolling.set_value(&mut stage, 5, None);
        assert!(!rolling.is_rolling());
        assert_eq!(stage.pending_timers(), 0);
    }

    #[test]
    fn rolling_to_zero_fades_the_badge_and_leaving_zero_shows_it() {
        let (mut stage, counter, badge) = setup("16");
        let mut rolling = RollingNumber::new(&mut stage, counter, Some(badge));
        assert_eq!(opacity(&stage, badge), None);

        rolling.set_value(&mut stage, 0, None);
        let mut seen = Vec::new();
        run(&mut stage, &mut rolling, ms(360), &mut seen);
        assert_eq!(stage.running_animations(), 1);

        run(&mut stage, &mut rolling, ms(1000), &mut seen);
        assert_eq!(opacity(&stage, badge), Some(Style::Opacity(0.0)));

        rolling.set_value(&mut stage, 4, None);
        assert_eq!(opacity(&stage, badge), None);
    }

    #[test]
    fn new_change_stops_a_running_fade() {
        let (mut stage, counter, badge) = setup("8");
        let mut rolling = RollingNumber::new(&mut stage, counter, Some(badge));
        rolling.set_value(&mut stage, 0, None);
        let mut seen = Vec::new();
        run(&mut stage, &mut rolling, ms(400), &mut seen);
        assert_eq!(stage.running_animations(), 1);

        rolling.set_value_without_roll(&mut stage, 2);
        assert_eq!(stage.running_animations(), 0);
        assert_eq!(opacity(&stage, badge), None);
        assert_eq!(stage.memory_dom().text(counter), "2");
    }

    #[test]
    fn set_without_roll_to_zero_hides_immediately() {
        let (mut stage, counter, badge) = setup("8");
        let mut rolling = RollingNumber::new(&mut stage, counter, Some(badge));
        rolling.set_value_without_roll(&mut stage, 0);
        assert_eq!(opacity(&stage, badge), Some(Style::Opacity(0.0)));
        assert_eq!(stage.running_animations(), 0);
    }

    #[test]
    fn foreign_notices_are_ignored() {
        let (mut stage, counter, _) = setup("1");
        let mut rolling = RollingNumber::new(&mut stage, counter, None);
        let other = stage.set_timeout(ms(1));
        assert!(!rolling.on_timer(&mut stage, other));
        assert!(!rolling.on_animation_done(&mut stage, AnimationId(99)));
    }
}

//! In-memory [`Host`]: a [`MemoryDom`] plus a timer queue and opacity tweens
//! on a clock the caller moves forward.
//!
//! The stage never calls into widgets. Callers pull due work with
//! [`Stage::next_due`] and route each [`Notice`] to the widget owning the
//! handle. Two ways to drain the queue:
//!
//! - [`Stage::run_until`] replays time: each notice moves the clock to its due
//!   time, so callbacks observe the time they were scheduled for. Tests use
//!   it to step through a schedule deterministically.
//! - [`Stage::catch_up`] behaves like a wall clock: the clock jumps to the
//!   target first and every overdue timer fires once at that time. A host
//!   that stalled sees one late callback per timer, not a replayed burst.

use std::time::Duration;

use tracing::trace;

use crate::animate::{lerp, AnimationId, Animator, Easing, Host};
use crate::dom::{Dom, MemoryDom, NodeId, Style, StyleProp};
use crate::timer::{TimerId, Timers};

/// Work that became due on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Timer(TimerId),
    AnimationDone(AnimationId),
}

#[derive(Debug, Clone)]
struct PendingTimer {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    seq: u64,
}

#[derive(Debug, Clone)]
struct Tween {
    id: AnimationId,
    node: NodeId,
    from: f32,
    to: f32,
    start: Duration,
    duration: Duration,
    easing: Easing,
    seq: u64,
}

impl Tween {
    fn end(&self) -> Duration {
        self.start + self.duration
    }

    fn value_at(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_sub(self.start).as_secs_f32();
        let t = elapsed / self.duration.as_secs_f32();
        lerp(self.from, self.to, self.easing.apply(t))
    }
}

/// Smallest period an interval timer re-arms with.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct Stage {
    dom: MemoryDom,
    now: Duration,
    next_id: u64,
    next_seq: u64,
    timers: Vec<PendingTimer>,
    tweens: Vec<Tween>,
}

impl Stage {
    pub fn new(dom: MemoryDom) -> Self {
        Self {
            dom,
            now: Duration::ZERO,
            next_id: 1,
            next_seq: 0,
            timers: Vec::new(),
            tweens: Vec::new(),
        }
    }

    /// Pop the earliest timer or finished animation due at or before `limit`.
    pub fn next_due(&mut self, limit: Duration) -> Option<Notice> {
        let timer = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, t)| (i, t.due, t.seq));
        let tween = self
            .tweens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.end() <= limit)
            .min_by_key(|(_, t)| (t.end(), t.seq))
            .map(|(i, t)| (i, t.end(), t.seq));

        let take_timer = match (timer, tween) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some((_, t_due, t_seq)), Some((_, w_due, w_seq))) => (t_due, t_seq) <= (w_due, w_seq),
        };

        if take_timer {
            let (index, due, _) = timer?;
            self.move_clock(due);
            let id = self.timers[index].id;
            match self.timers[index].period {
                Some(period) => {
                    let seq = self.bump_seq();
                    let entry = &mut self.timers[index];
                    entry.due = self.now + period;
                    entry.seq = seq;
                }
                None => {
                    self.timers.swap_remove(index);
                }
            }
            trace!(timer = id.0, at_ms = due.as_millis() as u64, "timer fired");
            Some(Notice::Timer(id))
        } else {
            let (index, end, _) = tween?;
            let finished = self.tweens.swap_remove(index);
            self.move_clock(end);
            self.dom.set_style(finished.node, Style::Opacity(finished.to));
            trace!(animation = finished.id.0, "animation finished");
            Some(Notice::AnimationDone(finished.id))
        }
    }

    /// Deliver every notice due up to `limit` in order, then park the clock
    /// at `limit`. Work scheduled by `deliver` is picked up if it falls due
    /// before `limit`.
    pub fn run_until<F>(&mut self, limit: Duration, mut deliver: F)
    where
        F: FnMut(&mut Stage, Notice),
    {
        while let Some(notice) = self.next_due(limit) {
            deliver(self, notice);
        }
        self.advance_to(limit);
    }

    /// Jump the clock to `now`, then deliver everything due without moving it
    /// again. Overdue timeouts fire once; overdue intervals fire once and
    /// re-arm a full period after `now`.
    pub fn catch_up<F>(&mut self, now: Duration, mut deliver: F)
    where
        F: FnMut(&mut Stage, Notice),
    {
        self.advance_to(now);
        while let Some(notice) = self.next_due(self.now) {
            deliver(self, notice);
        }
    }

    /// Move the clock forward without delivering anything.
    pub fn advance_to(&mut self, time: Duration) {
        self.move_clock(time);
    }

    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty() || !self.tweens.is_empty()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn running_animations(&self) -> usize {
        self.tweens.len()
    }

    pub fn memory_dom(&self) -> &MemoryDom {
        &self.dom
    }

    pub fn memory_dom_mut(&mut self) -> &mut MemoryDom {
        &mut self.dom
    }

    fn move_clock(&mut self, time: Duration) {
        if time > self.now {
            self.now = time;
        }
        for tween in &self.tweens {
            self.dom
                .set_style(tween.node, Style::Opacity(tween.value_at(self.now)));
        }
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn bump_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push_timer(&mut self, delay: Duration, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.bump_id());
        let seq = self.bump_seq();
        self.timers.push(PendingTimer {
            id,
            due: self.now + delay,
            period,
            seq,
        });
        id
    }
}

impl Timers for Stage {
    fn now(&self) -> Duration {
        self.now
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.push_timer(delay, None)
    }

    fn set_interval(&mut self, period: Duration) -> TimerId {
        let period = period.max(MIN_INTERVAL);
        self.push_timer(period, Some(period))
    }

    fn clear(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }
}

impl Animator for Stage {
    fn animate_opacity(
        &mut self,
        node: NodeId,
        to: f32,
        duration: Duration,
        easing: Easing,
    ) -> AnimationId {
        let from = match self.dom.style(node, StyleProp::Opacity) {
            Some(Style::Opacity(value)) => value,
            _ => 1.0,
        };
        let id = AnimationId(self.bump_id());
        let seq = self.bump_seq();
        self.tweens.push(Tween {
            id,
            node,
            from,
            to,
            start: self.now,
            duration,
            easing,
            seq,
        });
        id
    }

    fn stop(&mut self, id: AnimationId) {
        self.tweens.retain(|t| t.id != id);
    }
}

impl Host for Stage {
    type Dom = MemoryDom;

    fn dom(&self) -> &MemoryDom {
        &self.dom
    }

    fn dom_mut(&mut self) -> &mut MemoryDom {
        &mut self.dom
    }
}

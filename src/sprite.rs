//! Frame animation over a CSS-style sprite sheet.
//!
//! Frames are numbered from 1, left to right then top to bottom. A horizontal
//! 100x10 sheet with 10x10 frames plays `1 2 3 ... 10`; a 20x40 grid plays
//!
//! ```text
//! 1 2
//! 3 4
//! 5 6
//! 7 8
//! ```
//!
//! The loop wakes every [`LOOP_TICK`] but only advances once the clock has
//! reached a deadline recomputed from the current time after each advance,
//! so a late wake-up delays the next frame instead of bursting to catch up.

use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::animate::Host;
use crate::dom::{Dom, NodeId, Offset, Style};
use crate::error::{BehaviorError, BehaviorResult};
use crate::observer::{ListenerId, Observers};
use crate::timer::TimerId;

/// Default milliseconds between frames.
pub const DEFAULT_FRAMES_INTERVAL_MS: i64 = 33;
pub const START_FRAME: u32 = 1;
/// Scheduling granularity of the advance loop.
pub const LOOP_TICK: Duration = Duration::from_millis(5);

/// Pixel size where a zero dimension means "not given".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Only a width: the sheet is a single row.
    pub const fn horizontal(width: u32) -> Self {
        Self { width, height: 0 }
    }

    /// Only a height: the sheet is a single column.
    pub const fn vertical(height: u32) -> Self {
        Self { width: 0, height }
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Grid layout of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteGeometry {
    frame: PixelSize,
    cols: u32,
    rows: u32,
    count: u32,
}

impl SpriteGeometry {
    /// Derive columns and rows from the sizes. An explicit `frames_count`
    /// covers sheets whose last row is not full.
    pub fn new(frame: PixelSize, sprite: PixelSize, frames_count: Option<u32>) -> BehaviorResult<Self> {
        let cols = axis_frames(frame.width, sprite.width);
        let rows = axis_frames(frame.height, sprite.height);
        let count = match frames_count {
            Some(count) => count,
            None => cols.checked_mul(rows).ok_or_else(|| BehaviorError::SpriteTooLarge {
                frame: frame.to_string(),
                sprite: sprite.to_string(),
            })?,
        };

        if count == 0 || cols == 0 {
            return Err(BehaviorError::EmptySprite {
                frame: frame.to_string(),
                sprite: sprite.to_string(),
            });
        }

        Ok(Self {
            frame,
            cols,
            rows,
            count,
        })
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn check(&self, frame: u32) -> BehaviorResult<u32> {
        if frame < 1 || frame > self.count {
            return Err(BehaviorError::FrameOutOfRange {
                frame,
                count: self.count,
            });
        }
        Ok(frame)
    }

    /// Pixel offset of a frame's top-left corner inside the sheet. Computed in
    /// `f64`; a row far past the sheet's height cannot overflow.
    pub fn frame_position(&self, frame: u32) -> BehaviorResult<Offset> {
        let frame = self.check(frame)?;
        let row = frame.div_ceil(self.cols);
        let col = (frame - 1) % self.cols + 1;

        Ok(Offset::new(
            f64::from(col - 1) * f64::from(self.frame.width),
            f64::from(row - 1) * f64::from(self.frame.height),
        ))
    }
}

fn axis_frames(frame: u32, sprite: u32) -> u32 {
    if frame != 0 && sprite != 0 {
        sprite / frame
    } else {
        1
    }
}

/// Which style property a frame change writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpriteProp {
    /// Sheet is the element background: `background-position` gets the
    /// negated frame offset.
    #[default]
    BackgroundPosition,
    /// Sheet is a foreground element moved inside a clipping parent: `left`
    /// / `top` get the negated offset, skipping an axis with one frame.
    Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteEventKind {
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteEvent {
    pub kind: SpriteEventKind,
    pub frame: u32,
}

#[derive(Debug, Clone)]
pub struct SpriteOptions {
    pub prop: SpriteProp,
    /// Frames where playback pauses after arriving. Listing the last frame
    /// turns the loop into a one-shot.
    pub pause_frames: Vec<u32>,
    pub frames_count: Option<u32>,
    /// Signed milliseconds between frames; negative plays backwards.
    pub frames_interval_ms: i64,
}

impl Default for SpriteOptions {
    fn default() -> Self {
        Self {
            prop: SpriteProp::default(),
            pause_frames: Vec::new(),
            frames_count: None,
            frames_interval_ms: DEFAULT_FRAMES_INTERVAL_MS,
        }
    }
}

pub struct SpriteAnimator {
    node: NodeId,
    prop: SpriteProp,
    geometry: SpriteGeometry,
    pause_frames: Vec<u32>,
    frames_interval_ms: i64,
    current_frame: u32,
    animating: bool,
    next_advance_at: Duration,
    loop_timer: Option<TimerId>,
    observers: Observers<SpriteEventKind, SpriteEvent>,
}

impl SpriteAnimator {
    pub fn new(
        node: NodeId,
        frame_size: PixelSize,
        sprite_size: PixelSize,
        options: SpriteOptions,
    ) -> BehaviorResult<Self> {
        let geometry = SpriteGeometry::new(frame_size, sprite_size, options.frames_count)?;
        debug!(
            node = node.0,
            cols = geometry.cols(),
            rows = geometry.rows(),
            frames = geometry.count(),
            "sprite animator created"
        );

        Ok(Self {
            node,
            prop: options.prop,
            geometry,
            pause_frames: options.pause_frames,
            frames_interval_ms: options.frames_interval_ms,
            current_frame: START_FRAME,
            animating: false,
            next_advance_at: Duration::ZERO,
            loop_timer: None,
            observers: Observers::new(),
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn geometry(&self) -> &SpriteGeometry {
        &self.geometry
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn frames_count(&self) -> u32 {
        self.geometry.count()
    }

    pub fn frames_interval(&self) -> i64 {
        self.frames_interval_ms
    }

    /// Sign picks the direction, magnitude the delay. Zero is accepted and
    /// advances backwards on every tick.
    pub fn set_frames_interval(&mut self, interval_ms: i64) {
        self.frames_interval_ms = interval_ms;
    }

    pub fn pause_frames(&self) -> &[u32] {
        &self.pause_frames
    }

    pub fn set_pause_frames(&mut self, pause_frames: Vec<u32>) {
        self.pause_frames = pause_frames;
    }

    pub fn add_event_listener<F>(&mut self, kind: SpriteEventKind, callback: F) -> ListenerId
    where
        F: FnMut(&SpriteEvent) + 'static,
    {
        self.observers.add(kind, callback)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.observers.remove(id)
    }

    pub fn play<H: Host>(&mut self, host: &mut H) {
        if !self.animating {
            self.animating = true;
            debug!(node = self.node.0, frame = self.current_frame, "sprite playing");
            self.run_loop(host);
        }
    }

    pub fn pause<H: Host>(&mut self, host: &mut H) {
        if self.animating {
            self.animating = false;
            self.cancel_loop(host);
            debug!(node = self.node.0, frame = self.current_frame, "sprite paused");
            self.observers.emit(
                SpriteEventKind::Pause,
                &SpriteEvent {
                    kind: SpriteEventKind::Pause,
                    frame: self.current_frame,
                },
            );
        }
    }

    /// Back to the first frame; keeps playing if it was.
    pub fn rewind<H: Host>(&mut self, host: &mut H) {
        self.cancel_loop(host);
        self.current_frame = START_FRAME;
        self.draw(host);

        if self.animating {
            self.run_loop(host);
        }
    }

    /// Jump to a frame. Fails without any change when `frame` is outside
    /// `1..=frames_count`.
    pub fn move_to_frame<H: Host>(&mut self, host: &mut H, frame: u32) -> BehaviorResult<()> {
        let frame = self.geometry.check(frame)?;
        self.show_frame(host, frame);
        Ok(())
    }

    /// Drive the loop. Returns `false` for foreign timers.
    pub fn on_timer<H: Host>(&mut self, host: &mut H, id: TimerId) -> bool {
        if self.loop_timer != Some(id) {
            return false;
        }
        self.loop_timer = None;
        self.run_loop(host);
        true
    }

    fn run_loop<H: Host>(&mut self, host: &mut H) {
        self.loop_timer = Some(host.set_timeout(LOOP_TICK));

        let now = host.now();
        if self.next_advance_at <= now {
            trace!(node = self.node.0, at_ms = now.as_millis() as u64, "sprite advance");
            self.advance(host);
            self.next_advance_at = now + Duration::from_millis(self.frames_interval_ms.unsigned_abs());
        }
    }

    fn advance<H: Host>(&mut self, host: &mut H) {
        let count = i64::from(self.geometry.count());
        let step = if self.frames_interval_ms > 0 { 1 } else { -1 };
        let mut next = i64::from(self.current_frame) + step;

        if next > count {
            next = 1;
        }
        if next < 1 {
            next = count;
        }

        self.show_frame(host, next as u32);
    }

    fn show_frame<H: Host>(&mut self, host: &mut H, frame: u32) {
        self.current_frame = frame;
        self.draw(host);

        if self.pause_frames.contains(&frame) {
            self.pause(host);
        }
    }

    fn draw<H: Host>(&self, host: &mut H) {
        let Ok(position) = self.geometry.frame_position(self.current_frame) else {
            return;
        };
        let dom = host.dom_mut();

        match self.prop {
            SpriteProp::BackgroundPosition => {
                dom.set_style(self.node, Style::BackgroundPosition(-position.left, -position.top));
            }
            SpriteProp::Position => {
                if self.geometry.cols() != 1 {
                    dom.set_style(self.node, Style::Left(-position.left));
                }
                if self.geometry.rows() != 1 {
                    dom.set_style(self.node, Style::Top(-position.top));
                }
            }
        }
    }

    fn cancel_loop<H: Host>(&mut self, host: &mut H) {
        if let Some(id) = self.loop_timer.take() {
            host.clear(id);
        }
    }
}

impl fmt::Debug for SpriteAnimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteAnimator")
            .field("node", &self.node)
            .field("geometry", &self.geometry)
            .field("current_frame", &self.current_frame)
            .field("frames_interval_ms", &self.frames_interval_ms)
            .field("animating", &self.animating)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, Size, StyleProp};
    use crate::stage::{Notice, Stage};
    use crate::timer::Timers;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn setup(frame: PixelSize, sprite: PixelSize, options: SpriteOptions) -> (Stage, SpriteAnimator) {
        let mut dom = MemoryDom::new(Size::new(100.0, 100.0));
        let doc = dom.document();
        let node = dom.append(doc, Offset::default(), Size::new(10.0, 10.0)).unwrap();
        let sprite = SpriteAnimator::new(node, frame, sprite, options).unwrap();
        (Stage::new(dom), sprite)
    }

    fn run(stage: &mut Stage, sprite: &mut SpriteAnimator, until: Duration) {
        stage.run_until(until, |stage, notice| {
            if let Notice::Timer(id) = notice {
                sprite.on_timer(stage, id);
            }
        });
    }

    #[test]
    fn horizontal_sheet_geometry() {
        let g = SpriteGeometry::new(PixelSize::new(10, 10), PixelSize::new(100, 10), None).unwrap();
        assert_eq!((g.cols(), g.rows(), g.count()), (10, 1, 10));
        assert_eq!(g.frame_position(5).unwrap(), Offset::new(40.0, 0.0));
    }

    #[test]
    fn grid_sheet_geometry() {
        let g = SpriteGeometry::new(PixelSize::new(10, 10), PixelSize::new(20, 40), None).unwrap();
        assert_eq!((g.cols(), g.rows(), g.count()), (2, 4, 8));
        assert_eq!(g.frame_position(6).unwrap(), Offset::new(10.0, 20.0));
        assert_eq!(g.frame_position(1).unwrap(), Offset::new(0.0, 0.0));
        assert_eq!(g.frame_position(8).unwrap(), Offset::new(10.0, 30.0));
    }

    #[test]
    fn omitted_axis_counts_as_one() {
        let g = SpriteGeometry::new(PixelSize::vertical(16), PixelSize::vertical(64), None).unwrap();
        assert_eq!((g.cols(), g.rows(), g.count()), (1, 4, 4));
        assert_eq!(g.frame_position(3).unwrap(), Offset::new(0.0, 32.0));
    }

    #[test]
    fn explicit_frame_count_wins() {
        let g = SpriteGeometry::new(PixelSize::new(10, 10), PixelSize::new(100, 100), Some(95)).unwrap();
        assert_eq!(g.count(), 95);
        assert!(g.frame_position(96).is_err());
    }

    #[test]
    fn empty_sheet_is_rejected() {
        let err = SpriteGeometry::new(PixelSize::new(50, 10), PixelSize::new(20, 10), None);
        assert!(matches!(err, Err(BehaviorError::EmptySprite { .. })));
        let err = SpriteGeometry::new(PixelSize::new(10, 10), PixelSize::new(20, 10), Some(0));
        assert!(matches!(err, Err(BehaviorError::EmptySprite { .. })));
    }

    #[test]
    fn frame_count_overflow_is_rejected() {
        let err = SpriteGeometry::new(PixelSize::new(1, 1), PixelSize::new(70_000, 70_000), None);
        assert!(matches!(err, Err(BehaviorError::SpriteTooLarge { .. })));

        let g = SpriteGeometry::new(PixelSize::new(1, 1), PixelSize::new(70_000, 70_000), Some(1_000)).unwrap();
        assert_eq!(g.frame_position(1_000).unwrap(), Offset::new(999.0, 0.0));
    }

    #[test]
    fn frame_position_past_the_sheet_does_not_overflow() {
        let g = SpriteGeometry::new(PixelSize::new(10, 10), PixelSize::new(10, 10), Some(u32::MAX)).unwrap();
        let position = g.frame_position(u32::MAX).unwrap();
        assert_eq!(position.left, 0.0);
        assert_eq!(position.top, f64::from(u32::MAX - 1) * 10.0);
    }

    #[test]
    fn move_to_frame_out_of_range_changes_nothing() {
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), SpriteOptions::default());
        sprite.move_to_frame(&mut stage, 4).unwrap();

        for bad in [0, 11, 500] {
            let err = sprite.move_to_frame(&mut stage, bad);
            assert!(matches!(err, Err(BehaviorError::FrameOutOfRange { frame, count: 10 }) if frame == bad));
            assert_eq!(sprite.current_frame(), 4);
        }
        assert_eq!(
            stage.memory_dom().style(sprite.node(), StyleProp::BackgroundPosition),
            Some(Style::BackgroundPosition(-30.0, 0.0))
        );
    }

    #[test]
    fn position_mode_skips_single_frame_axis() {
        let options = SpriteOptions {
            prop: SpriteProp::Position,
            ..SpriteOptions::default()
        };
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), options);
        sprite.move_to_frame(&mut stage, 3).unwrap();

        let dom = stage.memory_dom();
        assert_eq!(dom.style(sprite.node(), StyleProp::Left), Some(Style::Left(-20.0)));
        assert_eq!(dom.style(sprite.node(), StyleProp::Top), None);
        assert_eq!(dom.style(sprite.node(), StyleProp::BackgroundPosition), None);
    }

    #[test]
    fn advances_on_deadline_not_on_every_tick() {
        let options = SpriteOptions {
            frames_interval_ms: 10,
            ..SpriteOptions::default()
        };
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), options);
        sprite.play(&mut stage);
        assert_eq!(sprite.current_frame(), 2);

        run(&mut stage, &mut sprite, ms(45));
        assert_eq!(sprite.current_frame(), 6);
        assert!(sprite.is_animating());
    }

    #[test]
    fn late_wake_up_advances_once_and_rebases_deadline() {
        let options = SpriteOptions {
            frames_interval_ms: 10,
            ..SpriteOptions::default()
        };
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), options);
        sprite.play(&mut stage);
        assert_eq!(sprite.current_frame(), 2);

        stage.advance_to(ms(100));
        run(&mut stage, &mut sprite, ms(100));
        assert_eq!(sprite.current_frame(), 3);

        run(&mut stage, &mut sprite, ms(109));
        assert_eq!(sprite.current_frame(), 3);
        run(&mut stage, &mut sprite, ms(110));
        assert_eq!(sprite.current_frame(), 4);
    }

    #[test]
    fn negative_interval_plays_backwards_and_wraps_to_last() {
        let options = SpriteOptions {
            frames_interval_ms: -10,
            ..SpriteOptions::default()
        };
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(20, 40), options);
        sprite.play(&mut stage);
        assert_eq!(sprite.current_frame(), 8);
        run(&mut stage, &mut sprite, ms(20));
        assert_eq!(sprite.current_frame(), 6);
    }

    #[test]
    fn ascending_playback_wraps_to_first() {
        let options = SpriteOptions {
            frames_interval_ms: 10,
            ..SpriteOptions::default()
        };
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(30, 10), options);
        sprite.move_to_frame(&mut stage, 3).unwrap();
        sprite.play(&mut stage);
        assert_eq!(sprite.current_frame(), 1);
    }

    #[test]
    fn pause_frame_emits_once_and_halts() {
        let options = SpriteOptions {
            frames_interval_ms: 10,
            pause_frames: vec![4],
            ..SpriteOptions::default()
        };
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), options);
        let pauses = Rc::new(RefCell::new(Vec::new()));
        let p = Rc::clone(&pauses);
        sprite.add_event_listener(SpriteEventKind::Pause, move |e| p.borrow_mut().push(e.frame));

        sprite.play(&mut stage);
        run(&mut stage, &mut sprite, ms(500));
        assert_eq!(*pauses.borrow(), vec![4]);
        assert_eq!(sprite.current_frame(), 4);
        assert!(!sprite.is_animating());
        assert_eq!(stage.pending_timers(), 0);

        sprite.play(&mut stage);
        assert_eq!(sprite.current_frame(), 5);
        assert!(sprite.is_animating());
    }

    #[test]
    fn pause_only_emits_when_playing() {
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), SpriteOptions::default());
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        sprite.add_event_listener(SpriteEventKind::Pause, move |_| *c.borrow_mut() += 1);

        sprite.pause(&mut stage);
        assert_eq!(*count.borrow(), 0);
        sprite.play(&mut stage);
        sprite.play(&mut stage);
        assert_eq!(stage.pending_timers(), 1);
        sprite.pause(&mut stage);
        sprite.pause(&mut stage);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn manual_move_onto_pause_frame_pauses_playback() {
        let options = SpriteOptions {
            pause_frames: vec![7],
            ..SpriteOptions::default()
        };
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), options);
        sprite.play(&mut stage);
        sprite.move_to_frame(&mut stage, 7).unwrap();
        assert!(!sprite.is_animating());
    }

    #[test]
    fn rewind_resets_and_keeps_single_loop() {
        let options = SpriteOptions {
            frames_interval_ms: 10,
            ..SpriteOptions::default()
        };
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), options);
        sprite.play(&mut stage);
        run(&mut stage, &mut sprite, ms(30));
        sprite.rewind(&mut stage);
        assert_eq!(sprite.current_frame(), 1);
        assert_eq!(stage.pending_timers(), 1);
        assert!(sprite.is_animating());

        sprite.pause(&mut stage);
        sprite.move_to_frame(&mut stage, 5).unwrap();
        sprite.rewind(&mut stage);
        assert_eq!(sprite.current_frame(), 1);
        assert_eq!(stage.pending_timers(), 0);
        assert_eq!(
            stage.memory_dom().style(sprite.node(), StyleProp::BackgroundPosition),
            Some(Style::BackgroundPosition(0.0, 0.0))
        );
    }

    #[test]
    fn foreign_timer_is_ignored() {
        let (mut stage, mut sprite) = setup(PixelSize::new(10, 10), PixelSize::new(100, 10), SpriteOptions::default());
        let other = stage.set_timeout(ms(1));
        assert!(!sprite.on_timer(&mut stage, other));
    }

    proptest! {
        #[test]
        fn current_frame_stays_in_range(
            cols in 1u32..6,
            rows in 1u32..6,
            interval in prop_oneof![-40i64..=-1, 1i64..=40],
            run_ms in 0u64..2_000,
        ) {
            let options = SpriteOptions {
                frames_interval_ms: interval,
                ..SpriteOptions::default()
            };
            let (mut stage, mut sprite) =
                setup(PixelSize::new(8, 8), PixelSize::new(8 * cols, 8 * rows), options);
            sprite.play(&mut stage);
            run(&mut stage, &mut sprite, ms(run_ms));

            let frame = sprite.current_frame();
            prop_assert!(frame >= 1 && frame <= cols * rows);
        }

        #[test]
        fn move_to_frame_accepts_exactly_the_valid_range(target in 0u32..40) {
            let (mut stage, mut sprite) =
                setup(PixelSize::new(10, 10), PixelSize::new(20, 40), SpriteOptions::default());
            let result = sprite.move_to_frame(&mut stage, target);
            if (1..=8).contains(&target) {
                prop_assert!(result.is_ok());
                prop_assert_eq!(sprite.current_frame(), target);
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(sprite.current_frame(), 1);
            }
        }
    }
}

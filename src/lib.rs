//! Small, independent UI behaviors driven by a pluggable document and timer
//! host: a popup toggle state machine, a sprite-frame animator, a rolling
//! number, a vertical scroll fixer, an animated scroller, radio and
//! checkbox switchers, an integer input and an input placeholder.
//!
//! Widgets never own the document. Every operation takes a [`Host`] that
//! provides the [`Dom`], [`Timers`] and [`Animator`] capabilities, and the host
//! feeds timer / animation completions back through each widget's
//! `on_timer` / `on_animation_done`. [`Stage`] is the in-memory host used by
//! the tests and the terminal playground.

pub mod animate;
pub mod dom;
pub mod error;
pub mod fixer;
pub mod format;
pub mod integer_input;
pub mod observer;
pub mod placeholder;
pub mod popup;
pub mod rolling;
pub mod scroller;
pub mod sprite;
pub mod stage;
pub mod switcher;
pub mod timer;

pub use animate::{AnimationId, Animator, Easing, Host};
pub use dom::{Dom, NodeId, Offset, Size, Style, StyleProp};
pub use error::{BehaviorError, BehaviorResult};
pub use observer::{ListenerId, Observers};
pub use stage::{Notice, Stage};
pub use timer::{TimerId, Timers};

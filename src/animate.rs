//! Property animation capability and easing curves.

use std::time::Duration;

use crate::dom::{Dom, NodeId};
use crate::timer::Timers;

/// Handle of a running property animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

/// Easing curves for property animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Cosine ease-in-out
    Swing,
}

impl Easing {
    /// Map linear progress `t` (clamped to 0..=1) onto the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Swing => 0.5 - (t * std::f32::consts::PI).cos() / 2.0,
        }
    }
}

/// Linear interpolation
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Animates numeric style properties. Completion is reported back through
/// the owning widget's `on_animation_done`.
pub trait Animator {
    /// Tween the node's opacity from its current value to `to`.
    fn animate_opacity(
        &mut self,
        node: NodeId,
        to: f32,
        duration: Duration,
        easing: Easing,
    ) -> AnimationId;

    /// Freeze a running animation where it is. No completion is reported.
    fn stop(&mut self, id: AnimationId);
}

/// Everything a widget needs from its environment.
pub trait Host: Timers + Animator {
    type Dom: Dom;

    fn dom(&self) -> &Self::Dom;

    fn dom_mut(&mut self) -> &mut Self::Dom;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints() {
        for easing in [Easing::Linear, Easing::Swing] {
            assert!((easing.apply(0.0)).abs() < 1e-6);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
            assert!((easing.apply(2.0) - 1.0).abs() < 1e-6);
        }
        assert!((Easing::Swing.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn lerp_clamps_progress() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 3.0), 10.0);
        assert_eq!(lerp(1.0, 0.0, -1.0), 1.0);
    }
}

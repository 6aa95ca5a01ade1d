//! Animation curves and the engine that runs them.
//!
//! The scheduler describes every animated view change as an [`Animation`] and hands it to an
//! [`AnimationEngine`], which samples it over time (typically on another thread) and reports
//! back with [`AnimationEvent`]s.

use cgmath::Vector2;

/// Inertia decay rates are clamped to `[MIN_INERTIA_DECAY_RATE, 1]`.
pub const MIN_INERTIA_DECAY_RATE: f64 = 0.001;

/// Inertia settles once less than this fraction of the total displacement remains.
const INERTIA_REST_FRACTION: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(u64);

impl AnimationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for AnimationId {
    fn from(id: u64) -> Self {
        AnimationId(id)
    }
}

/// A sampled animation value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatedValue {
    Offsets(Vector2<f64>),
    ZoomFactor(f64),
}

/// A curve over time. Durations and times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    /// Eased transition between two offsets.
    Offsets {
        from: Vector2<f64>,
        to: Vector2<f64>,
        duration: f64,
    },
    /// Eased transition between two zoom factors.
    ZoomFactor { from: f64, to: f64, duration: f64 },
    /// Decelerating motion towards a precomputed resting position.
    OffsetsInertia {
        from: Vector2<f64>,
        rest: Vector2<f64>,
        decay: Vector2<f64>,
    },
    ZoomFactorInertia { from: f64, rest: f64, decay: f64 },
}

fn ease_out_cubic(t: f64) -> f64 {
    let t = 1. - t.max(0.).min(1.);
    1. - t * t * t
}

pub fn clamp_decay_rate(decay: f64) -> f64 {
    decay.max(MIN_INERTIA_DECAY_RATE).min(1.)
}

/// Where a value moving at `velocity` (units per second) comes to rest when losing `decay` of
/// its velocity every second.
pub fn inertia_rest(from: f64, velocity: f64, decay: f64) -> f64 {
    let decay = clamp_decay_rate(decay);
    if decay >= 1. {
        return from;
    }
    from + velocity / -(1. - decay).ln()
}

/// Fraction of the displacement covered after `t` seconds, and whether the motion has settled.
fn inertia_progress(decay: f64, t: f64) -> (f64, bool) {
    let decay = clamp_decay_rate(decay);
    if decay >= 1. {
        return (1., true);
    }
    let remaining = (1. - decay).powf(t.max(0.));
    if remaining < INERTIA_REST_FRACTION {
        (1., true)
    } else {
        (1. - remaining, false)
    }
}

impl Animation {
    /// Samples the curve `t` seconds after its start. Returns the value and whether the curve has
    /// finished; a finished sample is always exactly the final value.
    pub fn sample(&self, t: f64) -> (AnimatedValue, bool) {
        match *self {
            Animation::Offsets { from, to, duration } => {
                if t >= duration {
                    return (AnimatedValue::Offsets(to), true);
                }
                let p = ease_out_cubic(t / duration);
                (AnimatedValue::Offsets(from + (to - from) * p), false)
            }
            Animation::ZoomFactor { from, to, duration } => {
                if t >= duration {
                    return (AnimatedValue::ZoomFactor(to), true);
                }
                let p = ease_out_cubic(t / duration);
                (AnimatedValue::ZoomFactor(from + (to - from) * p), false)
            }
            Animation::OffsetsInertia { from, rest, decay } => {
                let (px, done_x) = if from.x == rest.x {
                    (1., true)
                } else {
                    inertia_progress(decay.x, t)
                };
                let (py, done_y) = if from.y == rest.y {
                    (1., true)
                } else {
                    inertia_progress(decay.y, t)
                };
                if done_x && done_y {
                    return (AnimatedValue::Offsets(rest), true);
                }
                let value = Vector2::new(
                    from.x + (rest.x - from.x) * px,
                    from.y + (rest.y - from.y) * py,
                );
                (AnimatedValue::Offsets(value), false)
            }
            Animation::ZoomFactorInertia { from, rest, decay } => {
                let (p, done) = if from == rest {
                    (1., true)
                } else {
                    inertia_progress(decay, t)
                };
                if done {
                    return (AnimatedValue::ZoomFactor(rest), true);
                }
                (AnimatedValue::ZoomFactor(from + (rest - from) * p), false)
            }
        }
    }

    pub fn final_value(&self) -> AnimatedValue {
        match *self {
            Animation::Offsets { to, .. } => AnimatedValue::Offsets(to),
            Animation::OffsetsInertia { rest, .. } => AnimatedValue::Offsets(rest),
            Animation::ZoomFactor { to, .. } => AnimatedValue::ZoomFactor(to),
            Animation::ZoomFactorInertia { rest, .. } => AnimatedValue::ZoomFactor(rest),
        }
    }

    pub fn is_inertial(&self) -> bool {
        match self {
            Animation::OffsetsInertia { .. } | Animation::ZoomFactorInertia { .. } => true,
            Animation::Offsets { .. } | Animation::ZoomFactor { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationEventKind {
    /// An intermediate sample.
    Progress(AnimatedValue),
    /// The animation reached its final value.
    Completed(AnimatedValue),
    /// The animation was stopped before completing.
    Stopped,
}

/// Reported by an animation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationEvent {
    pub id: AnimationId,
    pub kind: AnimationEventKind,
}

/// Something that runs animations.
///
/// Engines report through [`AnimationEvent`]s delivered to
/// [`ViewChangeScheduler::handle_animation_event`](crate::ViewChangeScheduler::handle_animation_event)
/// on the thread that owns the scheduler. Events for animations the scheduler no longer tracks are
/// ignored, so an engine doesn’t need to synchronize `stop` with events already in flight.
pub trait AnimationEngine {
    /// Starts running an animation.
    fn start(&mut self, id: AnimationId, animation: Animation);

    /// Stops an animation. Does not need to report [`AnimationEventKind::Stopped`].
    fn stop(&mut self, id: AnimationId);
}

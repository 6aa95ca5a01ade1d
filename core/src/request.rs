//! View change requests.

use crate::error::{Error, Result};
use cgmath::{Point2, Vector2};
use std::fmt;

/// Identifies a submitted view change in its completion notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(i32);

impl CorrelationId {
    /// Returned for requests that were ignored before being assigned an id.
    pub const NO_OP: CorrelationId = CorrelationId(-1);

    pub(crate) fn new(id: i32) -> CorrelationId {
        CorrelationId(id)
    }

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn is_no_op(self) -> bool {
        self == Self::NO_OP
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a view change reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationMode {
    /// Jump to the target.
    Disabled,
    /// Animate to the target.
    Enabled,
    /// Animate if the system allows animations.
    Auto,
}

impl Default for AnimationMode {
    fn default() -> Self {
        AnimationMode::Auto
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapPointsMode {
    /// Targets are adjusted by registered snap points.
    Default,
    Ignore,
}

impl Default for SnapPointsMode {
    fn default() -> Self {
        SnapPointsMode::Default
    }
}

/// Where a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// A direct call on the public API.
    Api,
    /// Keyboard or mouse wheel input on the surface.
    SurfaceInput,
    HorizontalController,
    VerticalController,
}

/// View changes of one category replace each other; the two categories are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewChangeCategory {
    Offsets,
    ZoomFactor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOptions {
    pub animation_mode: AnimationMode,
    pub snap_points_mode: SnapPointsMode,
}

impl ScrollOptions {
    pub fn new(animation_mode: AnimationMode, snap_points_mode: SnapPointsMode) -> Self {
        ScrollOptions {
            animation_mode,
            snap_points_mode,
        }
    }

    pub fn jump() -> Self {
        ScrollOptions::new(AnimationMode::Disabled, SnapPointsMode::Default)
    }

    pub fn animated() -> Self {
        ScrollOptions::new(AnimationMode::Enabled, SnapPointsMode::Default)
    }
}

/// Zooming uses the same options as scrolling.
pub type ZoomOptions = ScrollOptions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewChangeKind {
    AbsoluteOffsets {
        horizontal: f64,
        vertical: f64,
    },
    RelativeOffsets {
        horizontal_delta: f64,
        vertical_delta: f64,
    },
    OffsetsVelocity {
        velocity: Vector2<f64>,
        /// Per axis; the configured default is used if absent.
        inertia_decay_rate: Option<Vector2<f64>>,
    },
    AbsoluteZoom {
        zoom_factor: f64,
        /// In viewport coordinates; the viewport center if absent.
        center: Option<Point2<f64>>,
    },
    RelativeZoom {
        delta: f64,
        center: Option<Point2<f64>>,
    },
    ZoomVelocity {
        velocity: f64,
        inertia_decay_rate: Option<f64>,
        center: Option<Point2<f64>>,
    },
}

/// A request to change the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewChangeRequest {
    pub kind: ViewChangeKind,
    pub animation_mode: AnimationMode,
    pub snap_points_mode: SnapPointsMode,
    pub trigger: Trigger,
}

impl ViewChangeRequest {
    pub fn new(kind: ViewChangeKind, options: ScrollOptions) -> Self {
        ViewChangeRequest {
            kind,
            animation_mode: options.animation_mode,
            snap_points_mode: options.snap_points_mode,
            trigger: Trigger::Api,
        }
    }

    pub fn scroll_to(horizontal: f64, vertical: f64, options: ScrollOptions) -> Self {
        Self::new(ViewChangeKind::AbsoluteOffsets { horizontal, vertical }, options)
    }

    pub fn scroll_by(horizontal_delta: f64, vertical_delta: f64, options: ScrollOptions) -> Self {
        Self::new(
            ViewChangeKind::RelativeOffsets {
                horizontal_delta,
                vertical_delta,
            },
            options,
        )
    }

    /// Velocity requests always animate.
    pub fn scroll_from(velocity: Vector2<f64>, inertia_decay_rate: Option<Vector2<f64>>) -> Self {
        Self::new(
            ViewChangeKind::OffsetsVelocity {
                velocity,
                inertia_decay_rate,
            },
            ScrollOptions::animated(),
        )
    }

    pub fn zoom_to(zoom_factor: f64, center: Option<Point2<f64>>, options: ZoomOptions) -> Self {
        Self::new(ViewChangeKind::AbsoluteZoom { zoom_factor, center }, options)
    }

    pub fn zoom_by(delta: f64, center: Option<Point2<f64>>, options: ZoomOptions) -> Self {
        Self::new(ViewChangeKind::RelativeZoom { delta, center }, options)
    }

    pub fn zoom_from(
        velocity: f64,
        inertia_decay_rate: Option<f64>,
        center: Option<Point2<f64>>,
    ) -> Self {
        Self::new(
            ViewChangeKind::ZoomVelocity {
                velocity,
                inertia_decay_rate,
                center,
            },
            ZoomOptions::animated(),
        )
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_snap_points_mode(mut self, mode: SnapPointsMode) -> Self {
        self.snap_points_mode = mode;
        self
    }

    pub fn category(&self) -> ViewChangeCategory {
        match self.kind {
            ViewChangeKind::AbsoluteOffsets { .. }
            | ViewChangeKind::RelativeOffsets { .. }
            | ViewChangeKind::OffsetsVelocity { .. } => ViewChangeCategory::Offsets,
            ViewChangeKind::AbsoluteZoom { .. }
            | ViewChangeKind::RelativeZoom { .. }
            | ViewChangeKind::ZoomVelocity { .. } => ViewChangeCategory::ZoomFactor,
        }
    }

    pub fn is_velocity(&self) -> bool {
        matches!(
            self.kind,
            ViewChangeKind::OffsetsVelocity { .. } | ViewChangeKind::ZoomVelocity { .. }
        )
    }

    /// Rejects requests carrying NaN or infinite values.
    pub fn validate(&self) -> Result<()> {
        let check_center = |center: Option<Point2<f64>>| -> Result<()> {
            if let Some(center) = center {
                Error::check_finite("center point x", center.x)?;
                Error::check_finite("center point y", center.y)?;
            }
            Ok(())
        };

        match self.kind {
            ViewChangeKind::AbsoluteOffsets { horizontal, vertical } => {
                Error::check_finite("horizontal offset", horizontal)?;
                Error::check_finite("vertical offset", vertical)?;
            }
            ViewChangeKind::RelativeOffsets {
                horizontal_delta,
                vertical_delta,
            } => {
                Error::check_finite("horizontal offset delta", horizontal_delta)?;
                Error::check_finite("vertical offset delta", vertical_delta)?;
            }
            ViewChangeKind::OffsetsVelocity {
                velocity,
                inertia_decay_rate,
            } => {
                Error::check_finite("horizontal velocity", velocity.x)?;
                Error::check_finite("vertical velocity", velocity.y)?;
                if let Some(rate) = inertia_decay_rate {
                    Error::check_finite("horizontal inertia decay rate", rate.x)?;
                    Error::check_finite("vertical inertia decay rate", rate.y)?;
                }
            }
            ViewChangeKind::AbsoluteZoom { zoom_factor, center } => {
                Error::check_finite("zoom factor", zoom_factor)?;
                check_center(center)?;
            }
            ViewChangeKind::RelativeZoom { delta, center } => {
                Error::check_finite("zoom factor delta", delta)?;
                check_center(center)?;
            }
            ViewChangeKind::ZoomVelocity {
                velocity,
                inertia_decay_rate,
                center,
            } => {
                Error::check_finite("zoom velocity", velocity)?;
                if let Some(rate) = inertia_decay_rate {
                    Error::check_finite("zoom inertia decay rate", rate)?;
                }
                check_center(center)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let ok = ViewChangeRequest::scroll_by(10., -3., ScrollOptions::default());
        assert_eq!(ok.validate(), Ok(()));
        assert_eq!(ok.category(), ViewChangeCategory::Offsets);

        let bad = ViewChangeRequest::scroll_to(f64::NAN, 0., ScrollOptions::jump());
        assert_eq!(
            bad.validate().unwrap_err().to_string(),
            "horizontal offset must be a finite number (got NaN)"
        );

        let bad_center =
            ViewChangeRequest::zoom_to(2., Some(Point2::new(0., f64::INFINITY)), ZoomOptions::jump());
        assert!(bad_center.validate().is_err());

        let bad_decay = ViewChangeRequest::zoom_from(1., Some(f64::NEG_INFINITY), None);
        assert!(bad_decay.validate().is_err());
        assert!(bad_decay.is_velocity());
        assert_eq!(bad_decay.category(), ViewChangeCategory::ZoomFactor);
    }

    #[test]
    fn test_velocity_requests_animate() {
        let request = ViewChangeRequest::scroll_from(Vector2::new(0., 100.), None);
        assert_eq!(request.animation_mode, AnimationMode::Enabled);
        assert_eq!(request.trigger, Trigger::Api);
        assert_eq!(
            request.with_trigger(Trigger::VerticalController).trigger,
            Trigger::VerticalController
        );
    }
}

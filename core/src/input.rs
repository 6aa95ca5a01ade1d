//! Translates surface input into view change requests.

use crate::animation::clamp_decay_rate;
use crate::config::{InputKind, ScrollerConfig, ZoomMode};
use crate::controller::Orientation;
use crate::request::{
    AnimationMode, ScrollOptions, SnapPointsMode, Trigger, ViewChangeRequest,
};
use crate::view_state::ViewState;
use cgmath::{Point2, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    pub fn orientation(self) -> Orientation {
        match self {
            ScrollDirection::Up | ScrollDirection::Down => Orientation::Vertical,
            ScrollDirection::Left | ScrollDirection::Right => Orientation::Horizontal,
        }
    }

    fn unit(self) -> Vector2<f64> {
        match self {
            ScrollDirection::Up => Vector2::new(0., -1.),
            ScrollDirection::Down => Vector2::new(0., 1.),
            ScrollDirection::Left => Vector2::new(-1., 0.),
            ScrollDirection::Right => Vector2::new(1., 0.),
        }
    }
}

fn keyboard_request(delta: Vector2<f64>) -> ViewChangeRequest {
    ViewChangeRequest::scroll_by(
        delta.x,
        delta.y,
        ScrollOptions::new(AnimationMode::Auto, SnapPointsMode::Ignore),
    )
    .with_trigger(Trigger::SurfaceInput)
}

/// Scrolls by one line.
pub fn line_request(direction: ScrollDirection, config: &ScrollerConfig) -> ViewChangeRequest {
    keyboard_request(direction.unit() * config.line_delta)
}

/// Scrolls by one viewport.
pub fn page_request(direction: ScrollDirection, view: &ViewState) -> ViewChangeRequest {
    let unit = direction.unit();
    let viewport = view.viewport();
    keyboard_request(Vector2::new(unit.x * viewport.x, unit.y * viewport.y))
}

/// Scrolls by a mouse wheel delta.
pub fn mouse_wheel_scroll_request(delta: Vector2<f64>) -> ViewChangeRequest {
    ViewChangeRequest::scroll_by(delta.x, delta.y, ScrollOptions::default())
        .with_trigger(Trigger::SurfaceInput)
}

/// Zooms with the mouse wheel around `pointer` (in viewport coordinates).
///
/// Returns `None` if wheel zooming is disabled or ignored, the delta is zero, or the zoom factor is already
/// at the bound the wheel is pushing towards.
pub fn mouse_wheel_zoom_request(
    wheel_delta: f64,
    pointer: Point2<f64>,
    view: &ViewState,
    config: &ScrollerConfig,
) -> Option<ViewChangeRequest> {
    if config.zoom_mode == ZoomMode::Disabled
        || config.ignores(InputKind::MouseWheel)
        || !wheel_delta.is_finite()
        || wheel_delta == 0.
    {
        return None;
    }

    let zoom_factor = view.zoom_factor();
    let zooming_in = wheel_delta > 0.;
    if (zooming_in && zoom_factor >= view.max_zoom_factor())
        || (!zooming_in && zoom_factor <= view.min_zoom_factor())
    {
        return None;
    }

    let per_unit = config.mouse_wheel_zoom_per_velocity_unit;
    let room = if zooming_in {
        view.max_zoom_factor() - zoom_factor
    } else {
        zoom_factor - view.min_zoom_factor()
    };
    let units = (wheel_delta.abs() / config.mouse_wheel_delta_per_velocity_unit)
        .min(config.mouse_wheel_max_velocity_units)
        .min(room / per_unit)
        + config.mouse_wheel_min_velocity_units;
    let change = units * per_unit * if zooming_in { 1. } else { -1. };

    // the inertia comes to rest `change` away from the current zoom factor
    let decay = clamp_decay_rate(config.mouse_wheel_inertia_decay_rate);
    let velocity = change * -(1. - decay).ln();

    let viewport = view.viewport();
    let center = Point2::new(
        pointer.x.max(0.).min(viewport.x),
        pointer.y.max(0.).min(viewport.y),
    );
    Some(
        ViewChangeRequest::zoom_from(velocity, Some(decay), Some(center))
            .with_trigger(Trigger::SurfaceInput),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::inertia_rest;
    use crate::request::ViewChangeKind;

    fn view(config: &ScrollerConfig) -> ViewState {
        let mut view = ViewState::new(config);
        view.set_viewport(Vector2::new(300., 200.));
        view.set_content_size(Some(Vector2::new(1200., 600.)));
        view
    }

    #[test]
    fn test_line_and_page() {
        let config = ScrollerConfig::default();
        let line = line_request(ScrollDirection::Up, &config);
        assert_eq!(
            line.kind,
            ViewChangeKind::RelativeOffsets {
                horizontal_delta: 0.,
                vertical_delta: -16.
            }
        );
        assert_eq!(line.trigger, Trigger::SurfaceInput);
        assert_eq!(line.snap_points_mode, SnapPointsMode::Ignore);

        let page = page_request(ScrollDirection::Right, &view(&config));
        assert_eq!(
            page.kind,
            ViewChangeKind::RelativeOffsets {
                horizontal_delta: 300.,
                vertical_delta: 0.
            }
        );
        assert_eq!(ScrollDirection::Right.orientation(), Orientation::Horizontal);
    }

    #[test]
    fn test_wheel_zoom_requires_zoom_mode() {
        let config = ScrollerConfig::default();
        assert_eq!(
            mouse_wheel_zoom_request(120., Point2::new(0., 0.), &view(&config), &config),
            None
        );
    }

    #[test]
    fn test_wheel_zoom() {
        let mut config = ScrollerConfig::default();
        config.zoom_mode = ZoomMode::Enabled;
        let view = view(&config);

        let request =
            mouse_wheel_zoom_request(120., Point2::new(500., -20.), &view, &config).unwrap();
        match request.kind {
            ViewChangeKind::ZoomVelocity {
                velocity,
                inertia_decay_rate: Some(decay),
                center,
            } => {
                assert_eq!(center, Some(Point2::new(300., 0.)), "center is clamped to the viewport");
                let rest = inertia_rest(1., velocity, decay);
                assert!((rest - 1.105).abs() < 1e-9, "rested at {}", rest);
            }
            other => panic!("unexpected request {:?}", other),
        }
        assert_eq!(request.trigger, Trigger::SurfaceInput);
    }

    #[test]
    fn test_wheel_zoom_stops_at_bounds() {
        let mut config = ScrollerConfig::default();
        config.zoom_mode = ZoomMode::Enabled;
        config.max_zoom_factor = 1.;
        let view = view(&config);

        assert_eq!(
            mouse_wheel_zoom_request(120., Point2::new(0., 0.), &view, &config),
            None
        );
        assert!(mouse_wheel_zoom_request(-120., Point2::new(0., 0.), &view, &config).is_some());
    }
}

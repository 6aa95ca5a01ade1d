//! The observable view: offsets and zoom factor over some content.

use crate::config::{RailMode, ScrollerConfig};
use crate::error::{Error, Result};
use cgmath::{Point2, Vector2};

/// An immutable copy of the view values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
    pub zoom_factor: f64,
    /// Zoomed content size, or zero without content.
    pub extent: Vector2<f64>,
    pub viewport: Vector2<f64>,
}

/// Offsets and zoom factor of a scrolling surface.
///
/// Offsets are expressed in zoomed content coordinates. Only the scheduler mutates a view state;
/// everyone else reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    horizontal_offset: f64,
    vertical_offset: f64,
    zoom_factor: f64,
    content_size: Option<Vector2<f64>>,
    viewport: Vector2<f64>,
    min_zoom_factor: f64,
    max_zoom_factor: f64,
    horizontal_rail: RailMode,
    vertical_rail: RailMode,
}

impl ViewState {
    /// Creates a view state without content and with a zero-sized viewport.
    pub fn new(config: &ScrollerConfig) -> ViewState {
        ViewState {
            horizontal_offset: 0.,
            vertical_offset: 0.,
            zoom_factor: 1_f64.max(config.min_zoom_factor).min(config.max_zoom_factor),
            content_size: None,
            viewport: Vector2::new(0., 0.),
            min_zoom_factor: config.min_zoom_factor,
            max_zoom_factor: config.max_zoom_factor,
            horizontal_rail: config.horizontal_rail,
            vertical_rail: config.vertical_rail,
        }
    }

    pub fn horizontal_offset(&self) -> f64 {
        self.horizontal_offset
    }

    pub fn vertical_offset(&self) -> f64 {
        self.vertical_offset
    }

    pub fn offsets(&self) -> Vector2<f64> {
        Vector2::new(self.horizontal_offset, self.vertical_offset)
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    pub fn min_zoom_factor(&self) -> f64 {
        self.min_zoom_factor
    }

    pub fn max_zoom_factor(&self) -> f64 {
        self.max_zoom_factor
    }

    /// Unzoomed content size, if content is attached.
    pub fn content_size(&self) -> Option<Vector2<f64>> {
        self.content_size
    }

    pub fn has_content(&self) -> bool {
        self.content_size.is_some()
    }

    pub fn viewport(&self) -> Vector2<f64> {
        self.viewport
    }

    pub fn viewport_center(&self) -> Point2<f64> {
        Point2::new(self.viewport.x / 2., self.viewport.y / 2.)
    }

    /// Zoomed content size.
    pub fn extent(&self) -> Vector2<f64> {
        self.extent_at(self.zoom_factor)
    }

    fn extent_at(&self, zoom_factor: f64) -> Vector2<f64> {
        match self.content_size {
            Some(size) => size * zoom_factor,
            None => Vector2::new(0., 0.),
        }
    }

    /// How far the content can be scrolled on each axis.
    pub fn scrollable(&self) -> Vector2<f64> {
        self.scrollable_at(self.zoom_factor)
    }

    fn scrollable_at(&self, zoom_factor: f64) -> Vector2<f64> {
        let extent = self.extent_at(zoom_factor);
        Vector2::new(
            (extent.x - self.viewport.x).max(0.),
            (extent.y - self.viewport.y).max(0.),
        )
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            horizontal_offset: self.horizontal_offset,
            vertical_offset: self.vertical_offset,
            zoom_factor: self.zoom_factor,
            extent: self.extent(),
            viewport: self.viewport,
        }
    }

    /// Clamps offsets into the scrollable range at the current zoom factor.
    pub fn clamp_offsets(&self, horizontal: f64, vertical: f64) -> (f64, f64) {
        self.clamp_offsets_at(self.zoom_factor, horizontal, vertical)
    }

    /// Clamps offsets into the scrollable range the view would have at `zoom_factor`.
    pub fn clamp_offsets_at(&self, zoom_factor: f64, horizontal: f64, vertical: f64) -> (f64, f64) {
        let scrollable = self.scrollable_at(zoom_factor);
        let clamp = |value: f64, max: f64, rail: RailMode| match rail {
            RailMode::Enabled => value.max(0.).min(max),
            RailMode::Disabled => value,
        };
        (
            clamp(horizontal, scrollable.x, self.horizontal_rail),
            clamp(vertical, scrollable.y, self.vertical_rail),
        )
    }

    /// Clamps a zoom factor into the zoom bounds. Non-finite values are rejected.
    pub fn clamp_zoom(&self, zoom_factor: f64) -> Result<f64> {
        let zoom_factor = Error::check_finite("zoom factor", zoom_factor)?;
        Ok(zoom_factor.max(self.min_zoom_factor).min(self.max_zoom_factor))
    }

    /// Offsets that keep `center` (in viewport coordinates) fixed on screen when the zoom factor
    /// changes to `zoom_factor`.
    pub fn offsets_after_zoom(&self, center: Point2<f64>, zoom_factor: f64) -> (f64, f64) {
        let ratio = zoom_factor / self.zoom_factor;
        let horizontal = (self.horizontal_offset + center.x) * ratio - center.x;
        let vertical = (self.vertical_offset + center.y) * ratio - center.y;
        self.clamp_offsets_at(zoom_factor, horizontal, vertical)
    }

    /// Sets offsets, clamped. Returns true if anything changed.
    pub(crate) fn set_offsets(&mut self, horizontal: f64, vertical: f64) -> bool {
        let (horizontal, vertical) = self.clamp_offsets(horizontal, vertical);
        let changed = horizontal != self.horizontal_offset || vertical != self.vertical_offset;
        self.horizontal_offset = horizontal;
        self.vertical_offset = vertical;
        changed
    }

    /// Zooms around `center`, moving the offsets along. Returns true if anything changed.
    ///
    /// The previous zoom factor is kept if `zoom_factor` is not finite.
    pub(crate) fn zoom_around(&mut self, center: Point2<f64>, zoom_factor: f64) -> Result<bool> {
        let zoom_factor = self.clamp_zoom(zoom_factor)?;
        let (horizontal, vertical) = self.offsets_after_zoom(center, zoom_factor);
        let changed = zoom_factor != self.zoom_factor
            || horizontal != self.horizontal_offset
            || vertical != self.vertical_offset;
        self.zoom_factor = zoom_factor;
        self.horizontal_offset = horizontal;
        self.vertical_offset = vertical;
        Ok(changed)
    }

    pub(crate) fn set_zoom_factor_bounds(&mut self, min: f64, max: f64) -> Result<bool> {
        let min = Error::check_finite("min zoom factor", min)?;
        let max = Error::check_finite("max zoom factor", max)?;
        if min <= 0. || min > max {
            return Err(Error::InvalidZoomBounds { min, max });
        }
        self.min_zoom_factor = min;
        self.max_zoom_factor = max;
        let zoom_factor = self.zoom_factor.max(min).min(max);
        if zoom_factor != self.zoom_factor {
            let center = Point2::new(0., 0.);
            return self.zoom_around(center, zoom_factor);
        }
        Ok(false)
    }

    /// Attaches or detaches content. Offsets are re-clamped; returns true if they changed.
    pub(crate) fn set_content_size(&mut self, size: Option<Vector2<f64>>) -> bool {
        self.content_size = size;
        self.reclamp()
    }

    pub(crate) fn set_viewport(&mut self, viewport: Vector2<f64>) -> bool {
        self.viewport = viewport;
        self.reclamp()
    }

    fn reclamp(&mut self) -> bool {
        let (horizontal, vertical) = (self.horizontal_offset, self.vertical_offset);
        self.set_offsets(horizontal, vertical)
    }
}

//! Configuration.

use crate::controller::Orientation;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Whether an axis is bounded by the content extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RailMode {
    /// Offsets are clamped to `[0, scrollable]`.
    Enabled,
    /// Offsets are unbounded on this axis.
    Disabled,
}

impl Default for RailMode {
    fn default() -> Self {
        RailMode::Enabled
    }
}

/// Whether surface input may scroll along an axis.
///
/// Scroll requests made through the API or a scroll controller are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollMode {
    Enabled,
    Disabled,
}

impl Default for ScrollMode {
    fn default() -> Self {
        ScrollMode::Enabled
    }
}

/// A kind of surface input that can be ignored as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// Line and page scrolling.
    Keyboard,
    /// Wheel scrolling and wheel zooming.
    MouseWheel,
}

/// Whether surface input (the mouse wheel) may change the zoom factor.
///
/// Zoom requests made through the API are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoomMode {
    Enabled,
    Disabled,
}

impl Default for ZoomMode {
    fn default() -> Self {
        ZoomMode::Disabled
    }
}

/// Maps an animation distance to a duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationTiming {
    /// Milliseconds per unit of distance travelled.
    pub ms_per_unit: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl AnimationTiming {
    /// Duration in seconds for an animation covering `distance`.
    pub fn duration_for(&self, distance: f64) -> f64 {
        let ms = distance.abs() * self.ms_per_unit;
        ms.max(self.min_ms).min(self.max_ms) / 1000.
    }
}

/// Engine configuration.
///
/// Every field has a default, so a TOML document only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollerConfig {
    pub min_zoom_factor: f64,
    pub max_zoom_factor: f64,
    pub horizontal_rail: RailMode,
    pub vertical_rail: RailMode,
    pub horizontal_scroll_mode: ScrollMode,
    pub vertical_scroll_mode: ScrollMode,
    pub zoom_mode: ZoomMode,
    /// Surface input that never changes the view.
    pub ignored_input_kinds: BTreeSet<InputKind>,

    /// Distance covered by one line of keyboard scrolling.
    pub line_delta: f64,

    /// Fraction of velocity lost per second when a velocity request omits a decay rate.
    pub default_inertia_decay_rate: f64,

    pub offsets_animation: AnimationTiming,
    pub zoom_animation: AnimationTiming,

    /// Mouse wheel delta that makes up one unit of zoom velocity.
    pub mouse_wheel_delta_per_velocity_unit: f64,
    pub mouse_wheel_max_velocity_units: f64,
    pub mouse_wheel_min_velocity_units: f64,
    /// Zoom factor change produced by one unit of wheel velocity.
    pub mouse_wheel_zoom_per_velocity_unit: f64,
    pub mouse_wheel_inertia_decay_rate: f64,

    /// Interval between compositor frames.
    pub frame_interval_ms: u64,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        ScrollerConfig {
            min_zoom_factor: 0.1,
            max_zoom_factor: 10.,
            horizontal_rail: RailMode::Enabled,
            vertical_rail: RailMode::Enabled,
            horizontal_scroll_mode: ScrollMode::Enabled,
            vertical_scroll_mode: ScrollMode::Enabled,
            zoom_mode: ZoomMode::Disabled,
            ignored_input_kinds: BTreeSet::new(),
            line_delta: 16.,
            default_inertia_decay_rate: 0.95,
            offsets_animation: AnimationTiming {
                ms_per_unit: 5.,
                min_ms: 50.,
                max_ms: 1000.,
            },
            zoom_animation: AnimationTiming {
                ms_per_unit: 250.,
                min_ms: 50.,
                max_ms: 1000.,
            },
            mouse_wheel_delta_per_velocity_unit: 120.,
            mouse_wheel_max_velocity_units: 5.,
            mouse_wheel_min_velocity_units: 0.05,
            mouse_wheel_zoom_per_velocity_unit: 0.1,
            mouse_wheel_inertia_decay_rate: 0.999972,
            frame_interval_ms: 16,
        }
    }
}

impl ScrollerConfig {
    /// Parses a configuration from TOML and validates it.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: ScrollerConfig =
            toml::from_str(source).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn scroll_mode(&self, orientation: Orientation) -> ScrollMode {
        match orientation {
            Orientation::Horizontal => self.horizontal_scroll_mode,
            Orientation::Vertical => self.vertical_scroll_mode,
        }
    }

    pub fn ignores(&self, kind: InputKind) -> bool {
        self.ignored_input_kinds.contains(&kind)
    }

    /// Whether input of `kind` may scroll along `orientation`.
    pub fn accepts_input(&self, kind: InputKind, orientation: Orientation) -> bool {
        !self.ignores(kind) && self.scroll_mode(orientation) == ScrollMode::Enabled
    }

    /// Checks that the configuration describes a usable engine.
    pub fn validate(&self) -> Result<()> {
        let min = Error::check_finite("min_zoom_factor", self.min_zoom_factor)?;
        let max = Error::check_finite("max_zoom_factor", self.max_zoom_factor)?;
        if min <= 0. || min > max {
            return Err(Error::InvalidZoomBounds { min, max });
        }

        for (name, value) in [
            ("line_delta", self.line_delta),
            ("default_inertia_decay_rate", self.default_inertia_decay_rate),
            ("mouse_wheel_min_velocity_units", self.mouse_wheel_min_velocity_units),
            ("mouse_wheel_inertia_decay_rate", self.mouse_wheel_inertia_decay_rate),
        ] {
            Error::check_finite(name, value)?;
        }

        for (name, value) in [
            ("mouse_wheel_delta_per_velocity_unit", self.mouse_wheel_delta_per_velocity_unit),
            ("mouse_wheel_max_velocity_units", self.mouse_wheel_max_velocity_units),
            ("mouse_wheel_zoom_per_velocity_unit", self.mouse_wheel_zoom_per_velocity_unit),
            ("offsets_animation.ms_per_unit", self.offsets_animation.ms_per_unit),
            ("zoom_animation.ms_per_unit", self.zoom_animation.ms_per_unit),
        ] {
            if Error::check_finite(name, value)? <= 0. {
                return Err(Error::Config(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        for (name, timing) in [
            ("offsets_animation", &self.offsets_animation),
            ("zoom_animation", &self.zoom_animation),
        ] {
            if !(timing.min_ms >= 0. && timing.min_ms <= timing.max_ms) {
                return Err(Error::Config(format!(
                    "{}: min_ms ({}) must be in [0, max_ms ({})]",
                    name, timing.min_ms, timing.max_ms
                )));
            }
        }

        if self.frame_interval_ms == 0 {
            return Err(Error::Config("frame_interval_ms must not be zero".into()));
        }
        Ok(())
    }
}

/// Host settings the engine consults at runtime.
pub trait SystemSettings: Send + Sync {
    /// Whether the system allows UI animations. Consulted for requests in
    /// [`AnimationMode::Auto`](crate::AnimationMode::Auto).
    fn animations_enabled(&self) -> bool;
}

/// Settings with fixed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSettings {
    pub animations_enabled: bool,
}

impl Default for FixedSettings {
    fn default() -> Self {
        FixedSettings {
            animations_enabled: true,
        }
    }
}

impl SystemSettings for FixedSettings {
    fn animations_enabled(&self) -> bool {
        self.animations_enabled
    }
}

impl fmt::Debug for dyn SystemSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SystemSettings")
            .field("animations_enabled", &self.animations_enabled())
            .finish()
    }
}

//! Scrolling surfaces driven by a threaded compositor.
//!
//! See [`scroller_core`] for how view changes are scheduled.

mod compositor;
pub mod events;
mod host;
mod presenter;

pub use compositor::Compositor;
pub use host::Host;
pub use presenter::ScrollPresenter;
pub use scroller_core::{
    AnimationMode, CorrelationId, Error, FixedSettings, InputKind, InteractionState, Orientation,
    RailMode, Result, ScrollController, ScrollControllerValues, ScrollDirection, ScrollMode,
    ScrollOptions, ScrollerConfig, SharedScrollController, SnapPoint, SnapPointAlignment,
    SnapPointAxis, SnapPointKind, SnapPointsMode, SystemSettings, ViewChangeResult, ZoomMode,
    ZoomOptions,
};

//! View change engine for scrolling surfaces.
//!
//! # Conceptual overview
//! A scrolling surface shows a viewport onto some content. What part of the content is visible is
//! described by a [`ViewState`]: a horizontal and a vertical offset, and a zoom factor. This crate
//! decides how a view state moves from one value to another; it doesn’t render, lay out or
//! hit-test anything.
//!
//! ## Requests and operations
//! Everything that wants to move the view submits a [`ViewChangeRequest`] to the
//! [`ViewChangeScheduler`]: scroll to or by some amount, coast with a velocity, or the same three
//! for the zoom factor. Submitting a request assigns it a [`CorrelationId`] and turns it into an
//! [`Operation`]. Exactly one completion notification will be sent for every id: the request either
//! reaches its target (completed), is cut short (interrupted), or has no effect at all (ignored).
//!
//! Requests fall into two categories: offsets and zoom factor. There is at most one current
//! operation per category, and a new request interrupts the current operation of its category.
//! The categories themselves are independent, so scrolling and zooming may animate at the same
//! time. Submitting a zero-delta jump is the canonical way to stop an animation.
//!
//! ## Jumps and animations
//! A request either jumps, in which case the view is updated before `submit` returns, or animates.
//! Animations are described as [`Animation`] curves and run by an [`AnimationEngine`], which
//! usually lives on another thread and reports back with [`AnimationEvent`]s. Those must be handed
//! to the scheduler on the thread that owns it; the scheduler is never shared.
//!
//! Velocity requests always animate: the velocity decays at an inertia decay rate until the view
//! comes to rest, and the resting position is known up front.
//!
//! ## Snap points
//! [`SnapPoint`]s attract resting positions. They are immutable and shared by reference; each
//! collection they’re registered in computes its own applicable zones, so the same snap point can
//! behave differently on different axes.
//!
//! ## Scroll controllers
//! A [`ScrollController`] is an external object like a scroll bar. The [`ScrollControllerBridge`]
//! keeps controllers informed about the view and translates their requests into submissions,
//! routing completions back to them.
//!
//! ## Notifications
//! Nothing is reported by calling back into the code that submitted a request. All changes are
//! sent as [`Notification`]s through a channel, so observers always see them asynchronously.
//!
//! ## Coordinate system
//! Offsets are in zoomed content coordinates, with the origin at the top left of the content.
//! Zoom center points are in viewport coordinates.

pub mod animation;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod notification;
pub mod operation;
pub mod request;
pub mod scheduler;
pub mod snap;
pub mod view_state;

pub use animation::{
    AnimatedValue, Animation, AnimationEngine, AnimationEvent, AnimationEventKind, AnimationId,
};
pub use config::{
    AnimationTiming, FixedSettings, InputKind, RailMode, ScrollMode, ScrollerConfig,
    SystemSettings, ZoomMode,
};
pub use controller::{
    Orientation, ScrollController, ScrollControllerBridge, ScrollControllerValues,
    SharedScrollController,
};
pub use error::{Error, Result};
pub use input::ScrollDirection;
pub use notification::{Completion, InteractionState, Notification};
pub use operation::{Operation, OperationState, ViewChangeResult};
pub use request::{
    AnimationMode, CorrelationId, ScrollOptions, SnapPointsMode, Trigger, ViewChangeCategory,
    ViewChangeKind, ViewChangeRequest, ZoomOptions,
};
pub use scheduler::ViewChangeScheduler;
pub use snap::{
    SnapPoint, SnapPointAlignment, SnapPointAxis, SnapPointCollection, SnapPointId, SnapPointKind,
    SnapPointResolver,
};
pub use view_state::{ViewSnapshot, ViewState};

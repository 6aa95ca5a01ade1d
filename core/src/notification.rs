//! Notifications sent by the scheduler.

use crate::operation::ViewChangeResult;
use crate::request::{CorrelationId, Trigger};
use crate::view_state::ViewSnapshot;

/// What the surface is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionState {
    Idle,
    /// A scroll controller is being dragged.
    Interacting,
    /// An eased animation is running.
    Animation,
    /// An inertial motion is running.
    Inertia,
}

/// The terminal notification of a view change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Completion {
    pub id: CorrelationId,
    pub result: ViewChangeResult,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    /// Offsets or zoom factor changed.
    ViewChanged(ViewSnapshot),
    /// Content or viewport size changed.
    ExtentChanged(ViewSnapshot),
    ScrollCompleted(Completion),
    ZoomCompleted(Completion),
    StateChanged(InteractionState),
}

impl Notification {
    pub fn completion(&self) -> Option<Completion> {
        match self {
            Notification::ScrollCompleted(completion) | Notification::ZoomCompleted(completion) => {
                Some(*completion)
            }
            _ => None,
        }
    }
}

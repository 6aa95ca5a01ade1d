//! Operations: submitted view changes and their lifecycle.

use crate::animation::AnimationId;
use crate::request::{CorrelationId, Trigger, ViewChangeCategory, ViewChangeRequest};
use cgmath::Point2;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    /// Waiting for the surface to load.
    Pending,
    Jumping,
    Animating,
    Completed,
    Interrupted,
    Ignored,
}

impl OperationState {
    pub fn is_terminal(self) -> bool {
        match self {
            OperationState::Completed | OperationState::Interrupted | OperationState::Ignored => {
                true
            }
            OperationState::Pending | OperationState::Jumping | OperationState::Animating => false,
        }
    }
}

/// How a view change ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewChangeResult {
    /// The target was reached.
    Completed,
    /// A newer request, an unload or detaching the content cut the change short.
    Interrupted,
    /// The request had no effect.
    Ignored,
}

impl From<ViewChangeResult> for OperationState {
    fn from(result: ViewChangeResult) -> Self {
        match result {
            ViewChangeResult::Completed => OperationState::Completed,
            ViewChangeResult::Interrupted => OperationState::Interrupted,
            ViewChangeResult::Ignored => OperationState::Ignored,
        }
    }
}

/// A view change that was assigned a correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    id: CorrelationId,
    request: ViewChangeRequest,
    state: OperationState,
    started_at: Instant,
    pub(crate) animation: Option<AnimationId>,
    /// Zoom center in viewport coordinates, resolved when the operation starts.
    pub(crate) center: Option<Point2<f64>>,
    pub(crate) inertial: bool,
}

impl Operation {
    pub(crate) fn new(id: CorrelationId, request: ViewChangeRequest) -> Operation {
        Operation {
            id,
            request,
            state: OperationState::Pending,
            started_at: Instant::now(),
            animation: None,
            center: None,
            inertial: false,
        }
    }

    pub fn id(&self) -> CorrelationId {
        self.id
    }

    pub fn request(&self) -> &ViewChangeRequest {
        &self.request
    }

    pub fn category(&self) -> ViewChangeCategory {
        self.request.category()
    }

    pub fn trigger(&self) -> Trigger {
        self.request.trigger
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    /// When the request was submitted.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub(crate) fn set_state(&mut self, state: OperationState) {
        debug_assert!(!self.state.is_terminal(), "{} already ended", self.id);
        self.state = state;
    }
}

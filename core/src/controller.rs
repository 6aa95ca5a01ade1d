//! External scroll controllers (scroll bars and the like).
//!
//! A [`ScrollController`] is owned elsewhere and shared with the bridge. The bridge keeps it up
//! to date with the surface’s values and turns the controller’s requests into scheduler
//! submissions; it never touches the view itself.

use crate::animation::AnimationEngine;
use crate::error::Result;
use crate::notification::Completion;
use crate::operation::ViewChangeResult;
use crate::request::{CorrelationId, ScrollOptions, Trigger, ViewChangeRequest};
use crate::scheduler::ViewChangeScheduler;
use crate::view_state::ViewState;
use cgmath::Vector2;
use log::debug;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    fn trigger(self) -> Trigger {
        match self {
            Orientation::Horizontal => Trigger::HorizontalController,
            Orientation::Vertical => Trigger::VerticalController,
        }
    }
}

/// What a controller gets to see of the surface along its orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollControllerValues {
    pub min_offset: f64,
    pub max_offset: f64,
    pub offset: f64,
    pub viewport_length: f64,
}

impl ScrollControllerValues {
    pub fn of(view: &ViewState, orientation: Orientation) -> Self {
        let (offset, scrollable, viewport_length) = match orientation {
            Orientation::Horizontal => (
                view.horizontal_offset(),
                view.scrollable().x,
                view.viewport().x,
            ),
            Orientation::Vertical => (
                view.vertical_offset(),
                view.scrollable().y,
                view.viewport().y,
            ),
        };
        ScrollControllerValues {
            min_offset: 0.,
            max_offset: scrollable,
            offset,
            viewport_length,
        }
    }
}

/// A scroll controller.
///
/// A bidirectional controller is installed for both orientations and is told which one the
/// values are for.
pub trait ScrollController: Send {
    fn set_values(&mut self, orientation: Orientation, values: ScrollControllerValues);

    /// A change requested through this controller ended.
    fn on_scroll_completed(&mut self, id: CorrelationId, result: ViewChangeResult) {
        let _ = (id, result);
    }
}

pub type SharedScrollController = Arc<Mutex<dyn ScrollController>>;

struct ControllerSlot {
    controller: SharedScrollController,
    is_interacting: bool,
    scroller_interactions_allowed: bool,
    controller_interactions_allowed: bool,
    last_values: Option<ScrollControllerValues>,
}

impl ControllerSlot {
    fn new(controller: SharedScrollController) -> Self {
        ControllerSlot {
            controller,
            is_interacting: false,
            scroller_interactions_allowed: true,
            controller_interactions_allowed: true,
            last_values: None,
        }
    }
}

impl fmt::Debug for ControllerSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ControllerSlot")
            .field("is_interacting", &self.is_interacting)
            .field("scroller_interactions_allowed", &self.scroller_interactions_allowed)
            .field("controller_interactions_allowed", &self.controller_interactions_allowed)
            .field("last_values", &self.last_values)
            .finish()
    }
}

/// Connects up to two scroll controllers to a scheduler.
#[derive(Debug, Default)]
pub struct ScrollControllerBridge {
    horizontal: Option<ControllerSlot>,
    vertical: Option<ControllerSlot>,
}

impl ScrollControllerBridge {
    pub fn new() -> Self {
        ScrollControllerBridge::default()
    }

    fn slot(&self, orientation: Orientation) -> Option<&ControllerSlot> {
        match orientation {
            Orientation::Horizontal => self.horizontal.as_ref(),
            Orientation::Vertical => self.vertical.as_ref(),
        }
    }

    fn slot_mut(&mut self, orientation: Orientation) -> &mut Option<ControllerSlot> {
        match orientation {
            Orientation::Horizontal => &mut self.horizontal,
            Orientation::Vertical => &mut self.vertical,
        }
    }

    /// Installs or removes the controller of one orientation.
    pub fn set_controller(
        &mut self,
        orientation: Orientation,
        controller: Option<SharedScrollController>,
    ) {
        debug!("{:?} scroll controller set: {}", orientation, controller.is_some());
        *self.slot_mut(orientation) = controller.map(ControllerSlot::new);
    }

    /// Installs one controller for both orientations.
    pub fn set_bidirectional_controller(&mut self, controller: Option<SharedScrollController>) {
        self.set_controller(Orientation::Horizontal, controller.clone());
        self.set_controller(Orientation::Vertical, controller);
    }

    pub fn controller(&self, orientation: Orientation) -> Option<&SharedScrollController> {
        self.slot(orientation).map(|slot| &slot.controller)
    }

    pub fn is_bidirectional(&self) -> bool {
        match (&self.horizontal, &self.vertical) {
            (Some(h), Some(v)) => Arc::ptr_eq(&h.controller, &v.controller),
            _ => false,
        }
    }

    pub fn is_interacting(&self, orientation: Orientation) -> bool {
        self.slot(orientation).map_or(false, |slot| slot.is_interacting)
    }

    /// Sets whether the controller of an orientation is being dragged.
    pub fn set_is_interacting<E: AnimationEngine>(
        &mut self,
        scheduler: &mut ViewChangeScheduler<E>,
        orientation: Orientation,
        is_interacting: bool,
    ) {
        if let Some(slot) = self.slot_mut(orientation) {
            slot.is_interacting = is_interacting;
        }
        let any = self.is_interacting(Orientation::Horizontal)
            || self.is_interacting(Orientation::Vertical);
        scheduler.set_interacting(any);
    }

    /// Whether surface input may scroll along an orientation.
    pub fn are_scroller_interactions_allowed(&self, orientation: Orientation) -> bool {
        self.slot(orientation)
            .map_or(true, |slot| slot.scroller_interactions_allowed)
    }

    pub fn set_scroller_interactions_allowed(&mut self, orientation: Orientation, allowed: bool) {
        if let Some(slot) = self.slot_mut(orientation) {
            slot.scroller_interactions_allowed = allowed;
        }
    }

    /// Whether the controller of an orientation may request view changes.
    pub fn are_scroll_controller_interactions_allowed(&self, orientation: Orientation) -> bool {
        self.slot(orientation)
            .map_or(false, |slot| slot.controller_interactions_allowed)
    }

    pub fn set_scroll_controller_interactions_allowed(
        &mut self,
        orientation: Orientation,
        allowed: bool,
    ) {
        if let Some(slot) = self.slot_mut(orientation) {
            slot.controller_interactions_allowed = allowed;
        }
    }

    /// Pushes the view’s values to every controller whose values changed.
    pub fn sync(&mut self, view: &ViewState) {
        for &orientation in &[Orientation::Horizontal, Orientation::Vertical] {
            if let Some(slot) = self.slot_mut(orientation) {
                let values = ScrollControllerValues::of(view, orientation);
                if slot.last_values != Some(values) {
                    slot.last_values = Some(values);
                    slot.controller.lock().set_values(orientation, values);
                }
            }
        }
    }

    /// Hands the completion of a controller-originated change back to its controller.
    pub fn handle_completion(&mut self, completion: &Completion) {
        let orientation = match completion.trigger {
            Trigger::HorizontalController => Orientation::Horizontal,
            Trigger::VerticalController => Orientation::Vertical,
            Trigger::Api | Trigger::SurfaceInput => return,
        };
        if let Some(slot) = self.slot(orientation) {
            slot.controller
                .lock()
                .on_scroll_completed(completion.id, completion.result);
        }
    }

    pub fn scroll_to<E: AnimationEngine>(
        &mut self,
        scheduler: &mut ViewChangeScheduler<E>,
        orientation: Orientation,
        offset: f64,
        options: ScrollOptions,
    ) -> Result<CorrelationId> {
        let view = scheduler.view();
        let request = match orientation {
            Orientation::Horizontal => {
                ViewChangeRequest::scroll_to(offset, view.vertical_offset(), options)
            }
            Orientation::Vertical => {
                ViewChangeRequest::scroll_to(view.horizontal_offset(), offset, options)
            }
        };
        self.submit(scheduler, orientation, request)
    }

    pub fn scroll_by<E: AnimationEngine>(
        &mut self,
        scheduler: &mut ViewChangeScheduler<E>,
        orientation: Orientation,
        delta: f64,
        options: ScrollOptions,
    ) -> Result<CorrelationId> {
        let request = match orientation {
            Orientation::Horizontal => ViewChangeRequest::scroll_by(delta, 0., options),
            Orientation::Vertical => ViewChangeRequest::scroll_by(0., delta, options),
        };
        self.submit(scheduler, orientation, request)
    }

    pub fn add_scroll_velocity<E: AnimationEngine>(
        &mut self,
        scheduler: &mut ViewChangeScheduler<E>,
        orientation: Orientation,
        velocity: f64,
        inertia_decay_rate: Option<f64>,
    ) -> Result<CorrelationId> {
        let velocity = match orientation {
            Orientation::Horizontal => Vector2::new(velocity, 0.),
            Orientation::Vertical => Vector2::new(0., velocity),
        };
        let decay = inertia_decay_rate.map(|rate| Vector2::new(rate, rate));
        let request = ViewChangeRequest::scroll_from(velocity, decay);
        self.submit(scheduler, orientation, request)
    }

    fn submit<E: AnimationEngine>(
        &mut self,
        scheduler: &mut ViewChangeScheduler<E>,
        orientation: Orientation,
        request: ViewChangeRequest,
    ) -> Result<CorrelationId> {
        let request = request.with_trigger(orientation.trigger());
        request.validate()?;
        if !self.are_scroll_controller_interactions_allowed(orientation) {
            debug!("{:?} scroll controller request suppressed", orientation);
            return Ok(scheduler.ignore(request));
        }
        scheduler.submit(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, AnimationId};
    use crate::config::{FixedSettings, ScrollerConfig};
    use crate::notification::{InteractionState, Notification};
    use crossbeam::channel::{self, Receiver};
    use pretty_assertions::assert_eq;

    struct JumpEngine;

    impl AnimationEngine for JumpEngine {
        fn start(&mut self, _: AnimationId, _: Animation) {}
        fn stop(&mut self, _: AnimationId) {}
    }

    #[derive(Debug, Default)]
    struct RecordingController {
        values: Vec<(Orientation, ScrollControllerValues)>,
        completions: Vec<(CorrelationId, ViewChangeResult)>,
    }

    impl ScrollController for RecordingController {
        fn set_values(&mut self, orientation: Orientation, values: ScrollControllerValues) {
            self.values.push((orientation, values));
        }

        fn on_scroll_completed(&mut self, id: CorrelationId, result: ViewChangeResult) {
            self.completions.push((id, result));
        }
    }

    fn scheduler() -> (ViewChangeScheduler<JumpEngine>, Receiver<Notification>) {
        let (sender, receiver) = channel::unbounded();
        let mut scheduler = ViewChangeScheduler::new(
            ScrollerConfig::default(),
            Arc::new(FixedSettings::default()),
            JumpEngine,
            sender,
        )
        .unwrap();
        scheduler.set_viewport_size(Vector2::new(300., 200.)).unwrap();
        scheduler
            .set_content_size(Some(Vector2::new(1200., 600.)))
            .unwrap();
        scheduler.load();
        receiver.try_iter().for_each(drop);
        (scheduler, receiver)
    }

    /// Routes completions like a host would.
    fn dispatch(bridge: &mut ScrollControllerBridge, receiver: &Receiver<Notification>) {
        for notification in receiver.try_iter() {
            if let Some(completion) = notification.completion() {
                bridge.handle_completion(&completion);
            }
        }
    }

    #[test]
    fn test_values_are_pushed_on_change() {
        let (mut scheduler, _receiver) = scheduler();
        let controller = Arc::new(Mutex::new(RecordingController::default()));
        let mut bridge = ScrollControllerBridge::new();
        bridge.set_controller(Orientation::Vertical, Some(controller.clone()));

        bridge.sync(scheduler.view());
        bridge.sync(scheduler.view());
        scheduler
            .submit(ViewChangeRequest::scroll_to(30., 100., ScrollOptions::jump()))
            .unwrap();
        bridge.sync(scheduler.view());

        assert_eq!(
            controller.lock().values,
            vec![
                (
                    Orientation::Vertical,
                    ScrollControllerValues {
                        min_offset: 0.,
                        max_offset: 400.,
                        offset: 0.,
                        viewport_length: 200.,
                    }
                ),
                (
                    Orientation::Vertical,
                    ScrollControllerValues {
                        min_offset: 0.,
                        max_offset: 400.,
                        offset: 100.,
                        viewport_length: 200.,
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_controller_request_keeps_other_axis() {
        let (mut scheduler, receiver) = scheduler();
        scheduler
            .submit(ViewChangeRequest::scroll_to(50., 0., ScrollOptions::jump()))
            .unwrap();
        let controller = Arc::new(Mutex::new(RecordingController::default()));
        let mut bridge = ScrollControllerBridge::new();
        bridge.set_controller(Orientation::Vertical, Some(controller.clone()));

        let id = bridge
            .scroll_to(&mut scheduler, Orientation::Vertical, 120., ScrollOptions::jump())
            .unwrap();
        assert_eq!(scheduler.view().offsets(), Vector2::new(50., 120.));
        let by = bridge
            .scroll_by(&mut scheduler, Orientation::Vertical, -20., ScrollOptions::jump())
            .unwrap();
        assert_eq!(scheduler.view().offsets(), Vector2::new(50., 100.));

        dispatch(&mut bridge, &receiver);
        assert_eq!(
            controller.lock().completions,
            vec![
                (id, ViewChangeResult::Completed),
                (by, ViewChangeResult::Completed)
            ]
        );
    }

    #[test]
    fn test_suppressed_controller_requests_are_ignored() {
        let (mut scheduler, receiver) = scheduler();
        let controller = Arc::new(Mutex::new(RecordingController::default()));
        let mut bridge = ScrollControllerBridge::new();
        bridge.set_controller(Orientation::Horizontal, Some(controller.clone()));
        bridge.set_scroll_controller_interactions_allowed(Orientation::Horizontal, false);

        let id = bridge
            .scroll_to(&mut scheduler, Orientation::Horizontal, 120., ScrollOptions::jump())
            .unwrap();
        assert!(id.is_no_op());
        assert_eq!(scheduler.view().offsets(), Vector2::new(0., 0.));

        dispatch(&mut bridge, &receiver);
        assert_eq!(
            controller.lock().completions,
            vec![(CorrelationId::NO_OP, ViewChangeResult::Ignored)]
        );

        assert!(bridge
            .add_scroll_velocity(&mut scheduler, Orientation::Horizontal, f64::NAN, None)
            .is_err());
    }

    #[test]
    fn test_without_controller_nothing_is_submitted() {
        let (mut scheduler, _receiver) = scheduler();
        let mut bridge = ScrollControllerBridge::new();
        assert!(bridge.are_scroller_interactions_allowed(Orientation::Vertical));
        let id = bridge
            .scroll_by(&mut scheduler, Orientation::Vertical, 10., ScrollOptions::jump())
            .unwrap();
        assert!(id.is_no_op());
    }

    #[test]
    fn test_bidirectional_controller() {
        let (mut scheduler, _receiver) = scheduler();
        let controller = Arc::new(Mutex::new(RecordingController::default()));
        let mut bridge = ScrollControllerBridge::new();
        bridge.set_bidirectional_controller(Some(controller.clone()));
        assert!(bridge.is_bidirectional());

        bridge.sync(scheduler.view());
        let orientations: Vec<_> = controller.lock().values.iter().map(|v| v.0).collect();
        assert_eq!(orientations, vec![Orientation::Horizontal, Orientation::Vertical]);

        bridge.set_scroller_interactions_allowed(Orientation::Horizontal, false);
        assert!(!bridge.are_scroller_interactions_allowed(Orientation::Horizontal));
        assert!(bridge.are_scroller_interactions_allowed(Orientation::Vertical));

        bridge.set_is_interacting(&mut scheduler, Orientation::Vertical, true);
        assert!(bridge.is_interacting(Orientation::Vertical));
        assert_eq!(scheduler.interaction_state(), InteractionState::Interacting);
        bridge.set_is_interacting(&mut scheduler, Orientation::Vertical, false);
        assert_eq!(scheduler.interaction_state(), InteractionState::Idle);
    }
}

//! The view change scheduler.
//!
//! Every change to a [`ViewState`] goes through here. Requests are split into two categories
//! (offsets and zoom factor) with at most one current operation each: submitting a request
//! interrupts the current operation of its category, then either jumps to the target or starts
//! an animation on the engine.

use crate::animation::{
    clamp_decay_rate, inertia_rest, AnimatedValue, Animation, AnimationEngine, AnimationEvent,
    AnimationEventKind, AnimationId,
};
use crate::config::{ScrollerConfig, SystemSettings};
use crate::error::{Error, Result};
use crate::notification::{Completion, InteractionState, Notification};
use crate::operation::{Operation, OperationState, ViewChangeResult};
use crate::request::{
    AnimationMode, CorrelationId, ViewChangeCategory, ViewChangeKind, ViewChangeRequest,
};
use crate::snap::{SnapPoint, SnapPointAxis, SnapPointResolver};
use crate::view_state::ViewState;
use cgmath::Vector2;
use crossbeam::channel::Sender;
use log::{debug, trace, warn};
use std::collections::VecDeque;
use std::sync::Arc;

/// Drives view changes of one scrolling surface.
///
/// Notifications are sent through the channel passed to [`ViewChangeScheduler::new`]; nothing is
/// ever reported by calling back into the submitter.
pub struct ViewChangeScheduler<E> {
    config: ScrollerConfig,
    settings: Arc<dyn SystemSettings>,
    animations_override: Option<bool>,
    view: ViewState,
    snap_points: SnapPointResolver,
    engine: E,
    notifier: Sender<Notification>,
    loaded: bool,
    interacting: bool,
    interaction_state: InteractionState,
    last_id: i32,
    last_animation_id: u64,
    offsets: Option<Operation>,
    zoom: Option<Operation>,
    /// Operations submitted while unloaded, in submission order.
    delayed: VecDeque<Operation>,
}

impl<E: AnimationEngine> ViewChangeScheduler<E> {
    /// Creates an unloaded scheduler without content.
    pub fn new(
        config: ScrollerConfig,
        settings: Arc<dyn SystemSettings>,
        engine: E,
        notifier: Sender<Notification>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(ViewChangeScheduler {
            view: ViewState::new(&config),
            config,
            settings,
            animations_override: None,
            snap_points: SnapPointResolver::new(),
            engine,
            notifier,
            loaded: false,
            interacting: false,
            interaction_state: InteractionState::Idle,
            last_id: 0,
            last_animation_id: 0,
            offsets: None,
            zoom: None,
            delayed: VecDeque::new(),
        })
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    pub fn snap_points(&self) -> &SnapPointResolver {
        &self.snap_points
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.interaction_state
    }

    /// The pending, jumping or animating operation of a category.
    pub fn current_operation(&self, category: ViewChangeCategory) -> Option<&Operation> {
        match category {
            ViewChangeCategory::Offsets => self.offsets.as_ref(),
            ViewChangeCategory::ZoomFactor => self.zoom.as_ref(),
        }
    }

    /// Operations waiting for the surface to load.
    pub fn delayed_operations(&self) -> impl Iterator<Item = &Operation> {
        self.delayed.iter()
    }

    fn slot_mut(&mut self, category: ViewChangeCategory) -> &mut Option<Operation> {
        match category {
            ViewChangeCategory::Offsets => &mut self.offsets,
            ViewChangeCategory::ZoomFactor => &mut self.zoom,
        }
    }

    /// Whether requests in [`AnimationMode::Auto`] animate.
    pub fn animations_enabled(&self) -> bool {
        self.animations_override
            .unwrap_or_else(|| self.settings.animations_enabled())
    }

    /// Overrides the system animation setting; `None` restores it.
    pub fn set_animations_enabled_override(&mut self, enabled: Option<bool>) {
        self.animations_override = enabled;
    }

    fn notify(&self, notification: Notification) {
        if self.notifier.send(notification).is_err() {
            trace!("dropping {:?}: nobody is listening", notification);
        }
    }

    fn notify_view_changed(&self) {
        self.notify(Notification::ViewChanged(self.view.snapshot()));
    }

    fn notify_completion(
        &self,
        category: ViewChangeCategory,
        id: CorrelationId,
        result: ViewChangeResult,
        request: &ViewChangeRequest,
    ) {
        let completion = Completion {
            id,
            result,
            trigger: request.trigger,
        };
        self.notify(match category {
            ViewChangeCategory::Offsets => Notification::ScrollCompleted(completion),
            ViewChangeCategory::ZoomFactor => Notification::ZoomCompleted(completion),
        });
    }

    fn finish(&mut self, mut operation: Operation, result: ViewChangeResult) {
        debug!("{} {:?}", operation.id(), result);
        operation.set_state(result.into());
        self.notify_completion(
            operation.category(),
            operation.id(),
            result,
            operation.request(),
        );
    }

    fn update_interaction_state(&mut self) {
        let running = |slot: &Option<Operation>| {
            slot.as_ref()
                .filter(|op| op.state() == OperationState::Animating)
                .map(|op| op.inertial)
        };
        let (offsets, zoom) = (running(&self.offsets), running(&self.zoom));

        let state = if self.interacting {
            InteractionState::Interacting
        } else if offsets == Some(true) || zoom == Some(true) {
            InteractionState::Inertia
        } else if offsets.is_some() || zoom.is_some() {
            InteractionState::Animation
        } else {
            InteractionState::Idle
        };

        if state != self.interaction_state {
            trace!("interaction state {:?} -> {:?}", self.interaction_state, state);
            self.interaction_state = state;
            self.notify(Notification::StateChanged(state));
        }
    }

    /// Sets whether a scroll controller is being dragged.
    pub fn set_interacting(&mut self, interacting: bool) {
        self.interacting = interacting;
        self.update_interaction_state();
    }

    /// Submits a view change.
    ///
    /// Returns the correlation id of the operation, or [`CorrelationId::NO_OP`] if the request was
    /// ignored because there is no content. Either way, exactly one completion notification will
    /// be sent for it. Requests with non-finite values are rejected without a notification.
    pub fn submit(&mut self, request: ViewChangeRequest) -> Result<CorrelationId> {
        if let Err(err) = request.validate() {
            warn!("rejected {:?}: {}", request.kind, err);
            return Err(err);
        }

        if !self.view.has_content() {
            debug!("ignoring {:?}: no content", request.kind);
            return Ok(self.ignore(request));
        }

        self.last_id = if self.last_id == i32::MAX {
            1
        } else {
            self.last_id + 1
        };
        let id = CorrelationId::new(self.last_id);
        let operation = Operation::new(id, request);
        debug!("{} submitted: {:?}", id, request);

        if self.loaded {
            self.process(operation);
            self.update_interaction_state();
        } else {
            let category = request.category();
            if let Some(index) = self.delayed.iter().position(|op| op.category() == category) {
                if let Some(replaced) = self.delayed.remove(index) {
                    self.finish(replaced, ViewChangeResult::Interrupted);
                }
            }
            debug!("{} delayed until the surface is loaded", id);
            self.delayed.push_back(operation);
        }
        Ok(id)
    }

    /// Resolves a request as ignored without assigning it an id.
    pub fn ignore(&mut self, request: ViewChangeRequest) -> CorrelationId {
        self.notify_completion(
            request.category(),
            CorrelationId::NO_OP,
            ViewChangeResult::Ignored,
            &request,
        );
        CorrelationId::NO_OP
    }

    fn interrupt(&mut self, category: ViewChangeCategory) {
        if let Some(operation) = self.slot_mut(category).take() {
            if let Some(animation) = operation.animation {
                self.engine.stop(animation);
            }
            self.finish(operation, ViewChangeResult::Interrupted);
        }
    }

    fn interrupt_all(&mut self) {
        self.interrupt(ViewChangeCategory::Offsets);
        self.interrupt(ViewChangeCategory::ZoomFactor);
        while let Some(operation) = self.delayed.pop_front() {
            self.finish(operation, ViewChangeResult::Interrupted);
        }
    }

    fn next_animation_id(&mut self) -> AnimationId {
        self.last_animation_id += 1;
        AnimationId::from(self.last_animation_id)
    }

    fn should_animate(&self, request: &ViewChangeRequest) -> bool {
        if request.is_velocity() {
            return true;
        }
        match request.animation_mode {
            AnimationMode::Disabled => false,
            AnimationMode::Enabled => true,
            AnimationMode::Auto => self.animations_enabled(),
        }
    }

    fn process(&mut self, mut operation: Operation) {
        let category = operation.category();
        self.interrupt(category);

        let request = *operation.request();
        let animation = match request.kind {
            ViewChangeKind::AbsoluteOffsets { .. } | ViewChangeKind::RelativeOffsets { .. } => {
                let (horizontal, vertical) = self.offsets_target(&request);
                if self.should_animate(&request) {
                    let from = self.view.offsets();
                    let to = Vector2::new(horizontal, vertical);
                    let distance = (to.x - from.x).abs().max((to.y - from.y).abs());
                    Animation::Offsets {
                        from,
                        to,
                        duration: self.config.offsets_animation.duration_for(distance),
                    }
                } else {
                    operation.set_state(OperationState::Jumping);
                    if self.view.set_offsets(horizontal, vertical) {
                        self.notify_view_changed();
                    }
                    self.finish(operation, ViewChangeResult::Completed);
                    return;
                }
            }
            ViewChangeKind::OffsetsVelocity {
                velocity,
                inertia_decay_rate,
            } => {
                let default_decay = self.config.default_inertia_decay_rate;
                let decay = inertia_decay_rate.unwrap_or(Vector2::new(default_decay, default_decay));
                let decay = Vector2::new(clamp_decay_rate(decay.x), clamp_decay_rate(decay.y));
                let from = self.view.offsets();
                let rest_on = |axis: SnapPointAxis, from: f64, velocity: f64, decay: f64| {
                    if velocity == 0. {
                        from
                    } else {
                        let rest = inertia_rest(from, velocity, decay);
                        self.snap_points.resolve(axis, rest, request.snap_points_mode)
                    }
                };
                let rest_x = rest_on(SnapPointAxis::Horizontal, from.x, velocity.x, decay.x);
                let rest_y = rest_on(SnapPointAxis::Vertical, from.y, velocity.y, decay.y);
                let (rest_x, rest_y) = self.view.clamp_offsets(rest_x, rest_y);
                Animation::OffsetsInertia {
                    from,
                    rest: Vector2::new(rest_x, rest_y),
                    decay,
                }
            }
            ViewChangeKind::AbsoluteZoom { center, .. } | ViewChangeKind::RelativeZoom { center, .. } => {
                let zoom_factor = self.zoom_target(&request);
                let center = center.unwrap_or_else(|| self.view.viewport_center());
                operation.center = Some(center);
                if self.should_animate(&request) {
                    let from = self.view.zoom_factor();
                    Animation::ZoomFactor {
                        from,
                        to: zoom_factor,
                        duration: self.config.zoom_animation.duration_for(zoom_factor - from),
                    }
                } else {
                    operation.set_state(OperationState::Jumping);
                    self.apply_zoom(center, zoom_factor);
                    self.finish(operation, ViewChangeResult::Completed);
                    return;
                }
            }
            ViewChangeKind::ZoomVelocity {
                velocity,
                inertia_decay_rate,
                center,
            } => {
                let decay = clamp_decay_rate(
                    inertia_decay_rate.unwrap_or(self.config.default_inertia_decay_rate),
                );
                let from = self.view.zoom_factor();
                let rest = if velocity == 0. {
                    from
                } else {
                    let rest = inertia_rest(from, velocity, decay);
                    self.snap_points
                        .resolve(SnapPointAxis::Zoom, rest, request.snap_points_mode)
                };
                operation.center = Some(center.unwrap_or_else(|| self.view.viewport_center()));
                Animation::ZoomFactorInertia {
                    from,
                    rest: self.clamp_zoom_or_current(rest),
                    decay,
                }
            }
        };

        let animation_id = self.next_animation_id();
        debug!("{} animating with {:?}: {:?}", operation.id(), animation_id, animation);
        operation.animation = Some(animation_id);
        operation.inertial = animation.is_inertial();
        operation.set_state(OperationState::Animating);
        *self.slot_mut(category) = Some(operation);
        self.engine.start(animation_id, animation);
    }

    fn offsets_target(&self, request: &ViewChangeRequest) -> (f64, f64) {
        // a zero delta freezes the view where it is, snap points or not
        if let ViewChangeKind::RelativeOffsets {
            horizontal_delta,
            vertical_delta,
        } = request.kind
        {
            if horizontal_delta == 0. && vertical_delta == 0. {
                return self.view.clamp_offsets(
                    self.view.horizontal_offset(),
                    self.view.vertical_offset(),
                );
            }
        }

        let (horizontal, vertical) = match request.kind {
            ViewChangeKind::AbsoluteOffsets {
                horizontal,
                vertical,
            } => (horizontal, vertical),
            ViewChangeKind::RelativeOffsets {
                horizontal_delta,
                vertical_delta,
            } => (
                self.view.horizontal_offset() + horizontal_delta,
                self.view.vertical_offset() + vertical_delta,
            ),
            _ => (self.view.horizontal_offset(), self.view.vertical_offset()),
        };
        let mode = request.snap_points_mode;
        let horizontal = self
            .snap_points
            .resolve(SnapPointAxis::Horizontal, horizontal, mode);
        let vertical = self
            .snap_points
            .resolve(SnapPointAxis::Vertical, vertical, mode);
        self.view.clamp_offsets(horizontal, vertical)
    }

    fn zoom_target(&self, request: &ViewChangeRequest) -> f64 {
        let zoom_factor = match request.kind {
            ViewChangeKind::AbsoluteZoom { zoom_factor, .. } => zoom_factor,
            ViewChangeKind::RelativeZoom { delta, .. } => self.view.zoom_factor() + delta,
            _ => self.view.zoom_factor(),
        };
        let zoom_factor =
            self.snap_points
                .resolve(SnapPointAxis::Zoom, zoom_factor, request.snap_points_mode);
        self.clamp_zoom_or_current(zoom_factor)
    }

    fn clamp_zoom_or_current(&self, zoom_factor: f64) -> f64 {
        // requests are validated on submission
        self.view
            .clamp_zoom(zoom_factor)
            .unwrap_or_else(|_| self.view.zoom_factor())
    }

    fn apply_zoom(&mut self, center: cgmath::Point2<f64>, zoom_factor: f64) {
        match self.view.zoom_around(center, zoom_factor) {
            Ok(true) => self.notify_view_changed(),
            Ok(false) => (),
            Err(err) => warn!("zoom factor not applied: {}", err),
        }
    }

    /// Applies an event reported by the animation engine.
    pub fn handle_animation_event(&mut self, event: AnimationEvent) {
        let runs = |slot: &Option<Operation>| {
            slot.as_ref().and_then(|op| op.animation) == Some(event.id)
        };
        let category = if runs(&self.offsets) {
            ViewChangeCategory::Offsets
        } else if runs(&self.zoom) {
            ViewChangeCategory::ZoomFactor
        } else {
            trace!("ignoring {:?} for stale animation {:?}", event.kind, event.id);
            return;
        };

        match event.kind {
            AnimationEventKind::Progress(value) => self.apply_animated_value(category, value),
            AnimationEventKind::Completed(value) => {
                self.apply_animated_value(category, value);
                if let Some(operation) = self.slot_mut(category).take() {
                    self.finish(operation, ViewChangeResult::Completed);
                }
            }
            AnimationEventKind::Stopped => {
                if let Some(operation) = self.slot_mut(category).take() {
                    self.finish(operation, ViewChangeResult::Interrupted);
                }
            }
        }
        self.update_interaction_state();
    }

    fn apply_animated_value(&mut self, category: ViewChangeCategory, value: AnimatedValue) {
        match (category, value) {
            (ViewChangeCategory::Offsets, AnimatedValue::Offsets(offsets)) => {
                if self.view.set_offsets(offsets.x, offsets.y) {
                    self.notify_view_changed();
                }
            }
            (ViewChangeCategory::ZoomFactor, AnimatedValue::ZoomFactor(zoom_factor)) => {
                let center = self
                    .zoom
                    .as_ref()
                    .and_then(|op| op.center)
                    .unwrap_or_else(|| self.view.viewport_center());
                self.apply_zoom(center, zoom_factor);
            }
            (category, value) => warn!("{:?} animation produced {:?}", category, value),
        }
    }

    /// Marks the surface as loaded and runs delayed operations in submission order.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        debug!("loaded with {} delayed operations", self.delayed.len());
        let delayed = std::mem::take(&mut self.delayed);
        for operation in delayed {
            self.process(operation);
        }
        self.update_interaction_state();
    }

    /// Marks the surface as unloaded, interrupting every running operation.
    ///
    /// Changes already applied to the view are kept.
    pub fn unload(&mut self) {
        if !self.loaded {
            return;
        }
        self.loaded = false;
        self.interrupt_all();
        self.update_interaction_state();
    }

    /// Attaches content of the given (unzoomed) size, or detaches it with `None`.
    ///
    /// Detaching interrupts every operation.
    pub fn set_content_size(&mut self, size: Option<Vector2<f64>>) -> Result<()> {
        let size = match size {
            Some(size) => Some(checked_size("content size", size)?),
            None => {
                self.interrupt_all();
                None
            }
        };
        if self.view.set_content_size(size) {
            self.notify_view_changed();
        }
        self.notify(Notification::ExtentChanged(self.view.snapshot()));
        self.update_interaction_state();
        Ok(())
    }

    pub fn set_viewport_size(&mut self, size: Vector2<f64>) -> Result<()> {
        let size = checked_size("viewport size", size)?;
        self.snap_points.set_viewport(size);
        if self.view.set_viewport(size) {
            self.notify_view_changed();
        }
        self.notify(Notification::ExtentChanged(self.view.snapshot()));
        Ok(())
    }

    pub fn set_zoom_factor_bounds(&mut self, min: f64, max: f64) -> Result<()> {
        if self.view.set_zoom_factor_bounds(min, max)? {
            self.notify_view_changed();
        }
        Ok(())
    }

    /// Registers a snap point on an axis. Only affects requests submitted afterwards.
    pub fn add_snap_point(&mut self, axis: SnapPointAxis, snap_point: Arc<SnapPoint>) -> Result<()> {
        self.snap_points.add(axis, snap_point).map_err(|err| {
            warn!("snap point rejected on {:?}: {}", axis, err);
            err
        })
    }

    /// Unregisters a snap point. Returns false if it was not registered on that axis.
    pub fn remove_snap_point(&mut self, axis: SnapPointAxis, snap_point: &SnapPoint) -> bool {
        self.snap_points.remove(axis, snap_point)
    }
}

fn checked_size(name: &'static str, size: Vector2<f64>) -> Result<Vector2<f64>> {
    Ok(Vector2::new(
        Error::check_finite(name, size.x)?.max(0.),
        Error::check_finite(name, size.y)?.max(0.),
    ))
}

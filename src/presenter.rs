//! The scroll presenter: the public surface of a scrolling view.

use crate::events::{
    EventHandler, EventHandlers, ExtentChanged, HandlerId, ScrollCompleted, StateChanged,
    ViewChanged, ZoomCompleted,
};
use cgmath::{Point2, Vector2};
use crossbeam::channel::{self, Receiver};
use log::debug;
use scroller_core::input;
use scroller_core::{
    AnimationEngine, AnimationEvent, CorrelationId, InputKind, InteractionState, Notification,
    Orientation, Result, ScrollControllerBridge, ScrollDirection, ScrollOptions, ScrollerConfig,
    SharedScrollController, SnapPoint, SnapPointAxis, SystemSettings, ViewChangeRequest,
    ViewChangeScheduler, ViewState, ZoomOptions,
};
use std::sync::Arc;

/// A scrolling surface.
///
/// View changes are submitted right away, but their events are only delivered by
/// [`ScrollPresenter::dispatch`], never from within the call that caused them.
pub struct ScrollPresenter<E: AnimationEngine> {
    scheduler: ViewChangeScheduler<E>,
    bridge: ScrollControllerBridge,
    notifications: Receiver<Notification>,
    handlers: EventHandlers,
}

impl<E: AnimationEngine> ScrollPresenter<E> {
    pub fn new(
        config: ScrollerConfig,
        settings: Arc<dyn SystemSettings>,
        engine: E,
    ) -> Result<ScrollPresenter<E>> {
        let (notifier, notifications) = channel::unbounded();
        Ok(ScrollPresenter {
            scheduler: ViewChangeScheduler::new(config, settings, engine, notifier)?,
            bridge: ScrollControllerBridge::new(),
            notifications,
            handlers: EventHandlers::new(),
        })
    }

    pub fn scheduler(&self) -> &ViewChangeScheduler<E> {
        &self.scheduler
    }

    pub fn view(&self) -> &ViewState {
        self.scheduler.view()
    }

    pub fn horizontal_offset(&self) -> f64 {
        self.view().horizontal_offset()
    }

    pub fn vertical_offset(&self) -> f64 {
        self.view().vertical_offset()
    }

    pub fn zoom_factor(&self) -> f64 {
        self.view().zoom_factor()
    }

    pub fn extent(&self) -> Vector2<f64> {
        self.view().extent()
    }

    pub fn scrollable_width(&self) -> f64 {
        self.view().scrollable().x
    }

    pub fn scrollable_height(&self) -> f64 {
        self.view().scrollable().y
    }

    pub fn state(&self) -> InteractionState {
        self.scheduler.interaction_state()
    }

    // surface

    pub fn set_content_size(&mut self, size: Option<Vector2<f64>>) -> Result<()> {
        self.scheduler.set_content_size(size)
    }

    pub fn set_viewport_size(&mut self, size: Vector2<f64>) -> Result<()> {
        self.scheduler.set_viewport_size(size)
    }

    pub fn load(&mut self) {
        self.scheduler.load();
    }

    pub fn unload(&mut self) {
        self.scheduler.unload();
    }

    pub fn set_zoom_factor_bounds(&mut self, min: f64, max: f64) -> Result<()> {
        self.scheduler.set_zoom_factor_bounds(min, max)
    }

    pub fn set_animations_enabled_override(&mut self, enabled: Option<bool>) {
        self.scheduler.set_animations_enabled_override(enabled);
    }

    // view changes

    pub fn scroll_to(
        &mut self,
        horizontal_offset: f64,
        vertical_offset: f64,
        options: ScrollOptions,
    ) -> Result<CorrelationId> {
        self.scheduler.submit(ViewChangeRequest::scroll_to(
            horizontal_offset,
            vertical_offset,
            options,
        ))
    }

    pub fn scroll_by(
        &mut self,
        horizontal_delta: f64,
        vertical_delta: f64,
        options: ScrollOptions,
    ) -> Result<CorrelationId> {
        self.scheduler.submit(ViewChangeRequest::scroll_by(
            horizontal_delta,
            vertical_delta,
            options,
        ))
    }

    /// Coasts with a velocity in units per second.
    pub fn scroll_from(
        &mut self,
        velocity: Vector2<f64>,
        inertia_decay_rate: Option<Vector2<f64>>,
    ) -> Result<CorrelationId> {
        self.scheduler
            .submit(ViewChangeRequest::scroll_from(velocity, inertia_decay_rate))
    }

    pub fn zoom_to(
        &mut self,
        zoom_factor: f64,
        center_point: Option<Point2<f64>>,
        options: ZoomOptions,
    ) -> Result<CorrelationId> {
        self.scheduler
            .submit(ViewChangeRequest::zoom_to(zoom_factor, center_point, options))
    }

    pub fn zoom_by(
        &mut self,
        zoom_factor_delta: f64,
        center_point: Option<Point2<f64>>,
        options: ZoomOptions,
    ) -> Result<CorrelationId> {
        self.scheduler.submit(ViewChangeRequest::zoom_by(
            zoom_factor_delta,
            center_point,
            options,
        ))
    }

    pub fn zoom_from(
        &mut self,
        velocity: f64,
        inertia_decay_rate: Option<f64>,
        center_point: Option<Point2<f64>>,
    ) -> Result<CorrelationId> {
        self.scheduler.submit(ViewChangeRequest::zoom_from(
            velocity,
            inertia_decay_rate,
            center_point,
        ))
    }

    // surface input

    /// Whether surface input of `kind` may scroll along `orientation`.
    fn accepts_input(&self, kind: InputKind, orientation: Orientation) -> bool {
        self.scheduler.config().accepts_input(kind, orientation)
            && self.bridge.are_scroller_interactions_allowed(orientation)
    }

    fn submit_input(
        &mut self,
        accepted: bool,
        request: ViewChangeRequest,
    ) -> Result<CorrelationId> {
        if accepted {
            self.scheduler.submit(request)
        } else {
            debug!("surface input suppressed: {:?}", request.kind);
            request.validate()?;
            Ok(self.scheduler.ignore(request))
        }
    }

    /// Scrolls by one line, as with the arrow keys.
    pub fn line(&mut self, direction: ScrollDirection) -> Result<CorrelationId> {
        let request = input::line_request(direction, self.scheduler.config());
        let accepted = self.accepts_input(InputKind::Keyboard, direction.orientation());
        self.submit_input(accepted, request)
    }

    /// Scrolls by one viewport, as with the page keys.
    pub fn page(&mut self, direction: ScrollDirection) -> Result<CorrelationId> {
        let request = input::page_request(direction, self.view());
        let accepted = self.accepts_input(InputKind::Keyboard, direction.orientation());
        self.submit_input(accepted, request)
    }

    /// Scrolls by a mouse wheel delta. Axes that don't accept wheel input keep their offset.
    pub fn mouse_wheel_scroll(&mut self, delta: Vector2<f64>) -> Result<CorrelationId> {
        let horizontal = self.accepts_input(InputKind::MouseWheel, Orientation::Horizontal);
        let vertical = self.accepts_input(InputKind::MouseWheel, Orientation::Vertical);
        let delta = Vector2::new(
            if horizontal { delta.x } else { 0. },
            if vertical { delta.y } else { 0. },
        );
        let request = input::mouse_wheel_scroll_request(delta);
        self.submit_input(horizontal || vertical, request)
    }

    /// Zooms with the mouse wheel around `pointer`. Returns `None` if the wheel had no effect.
    pub fn mouse_wheel_zoom(
        &mut self,
        wheel_delta: f64,
        pointer: Point2<f64>,
    ) -> Result<Option<CorrelationId>> {
        match input::mouse_wheel_zoom_request(
            wheel_delta,
            pointer,
            self.view(),
            self.scheduler.config(),
        ) {
            Some(request) => self.scheduler.submit(request).map(Some),
            None => Ok(None),
        }
    }

    // snap points

    pub fn add_snap_point(&mut self, axis: SnapPointAxis, snap_point: Arc<SnapPoint>) -> Result<()> {
        self.scheduler.add_snap_point(axis, snap_point)
    }

    pub fn remove_snap_point(&mut self, axis: SnapPointAxis, snap_point: &SnapPoint) -> bool {
        self.scheduler.remove_snap_point(axis, snap_point)
    }

    pub fn snap_point_count(&self, axis: SnapPointAxis) -> usize {
        self.scheduler.snap_points().len(axis)
    }

    // scroll controllers

    pub fn set_horizontal_scroll_controller(&mut self, controller: Option<SharedScrollController>) {
        self.bridge.set_controller(Orientation::Horizontal, controller);
        self.bridge.sync(self.scheduler.view());
    }

    pub fn set_vertical_scroll_controller(&mut self, controller: Option<SharedScrollController>) {
        self.bridge.set_controller(Orientation::Vertical, controller);
        self.bridge.sync(self.scheduler.view());
    }

    pub fn set_bidirectional_scroll_controller(
        &mut self,
        controller: Option<SharedScrollController>,
    ) {
        self.bridge.set_bidirectional_controller(controller);
        self.bridge.sync(self.scheduler.view());
    }

    pub fn scroll_controllers(&self) -> &ScrollControllerBridge {
        &self.bridge
    }

    pub fn controller_scroll_to(
        &mut self,
        orientation: Orientation,
        offset: f64,
        options: ScrollOptions,
    ) -> Result<CorrelationId> {
        self.bridge
            .scroll_to(&mut self.scheduler, orientation, offset, options)
    }

    pub fn controller_scroll_by(
        &mut self,
        orientation: Orientation,
        delta: f64,
        options: ScrollOptions,
    ) -> Result<CorrelationId> {
        self.bridge
            .scroll_by(&mut self.scheduler, orientation, delta, options)
    }

    pub fn controller_add_scroll_velocity(
        &mut self,
        orientation: Orientation,
        velocity: f64,
        inertia_decay_rate: Option<f64>,
    ) -> Result<CorrelationId> {
        self.bridge.add_scroll_velocity(
            &mut self.scheduler,
            orientation,
            velocity,
            inertia_decay_rate,
        )
    }

    pub fn set_controller_interacting(&mut self, orientation: Orientation, interacting: bool) {
        self.bridge
            .set_is_interacting(&mut self.scheduler, orientation, interacting);
    }

    pub fn set_scroller_interactions_allowed(&mut self, orientation: Orientation, allowed: bool) {
        self.bridge
            .set_scroller_interactions_allowed(orientation, allowed);
    }

    pub fn set_scroll_controller_interactions_allowed(
        &mut self,
        orientation: Orientation,
        allowed: bool,
    ) {
        self.bridge
            .set_scroll_controller_interactions_allowed(orientation, allowed);
    }

    // events

    pub fn on_view_changed<F: 'static + FnMut(&ViewChanged) + Send>(&mut self, f: F) -> HandlerId {
        self.handlers.add_handler(EventHandler::new(f))
    }

    pub fn on_extent_changed<F: 'static + FnMut(&ExtentChanged) + Send>(
        &mut self,
        f: F,
    ) -> HandlerId {
        self.handlers.add_handler(EventHandler::new(f))
    }

    pub fn on_scroll_completed<F: 'static + FnMut(&ScrollCompleted) + Send>(
        &mut self,
        f: F,
    ) -> HandlerId {
        self.handlers.add_handler(EventHandler::new(f))
    }

    pub fn on_zoom_completed<F: 'static + FnMut(&ZoomCompleted) + Send>(
        &mut self,
        f: F,
    ) -> HandlerId {
        self.handlers.add_handler(EventHandler::new(f))
    }

    pub fn on_state_changed<F: 'static + FnMut(&StateChanged) + Send>(
        &mut self,
        f: F,
    ) -> HandlerId {
        self.handlers.add_handler(EventHandler::new(f))
    }

    /// Removes an event handler. Returns false if it was already removed.
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        self.handlers.remove_handler(id)
    }

    // owner thread

    /// Applies an event from the animation engine. Call [`ScrollPresenter::dispatch`] afterwards.
    pub fn handle_animation_event(&mut self, event: AnimationEvent) {
        self.scheduler.handle_animation_event(event);
    }

    /// Delivers pending notifications to event handlers and scroll controllers. Returns how many
    /// notifications were delivered.
    pub fn dispatch(&mut self) -> usize {
        let mut count = 0;
        let mut view_changed = false;
        for notification in self.notifications.try_iter() {
            count += 1;
            match notification {
                Notification::ViewChanged(_) | Notification::ExtentChanged(_) => {
                    view_changed = true
                }
                Notification::ScrollCompleted(completion) => {
                    self.bridge.handle_completion(&completion)
                }
                Notification::ZoomCompleted(_) | Notification::StateChanged(_) => (),
            }
            self.handlers.dispatch(&notification);
        }
        if view_changed {
            self.bridge.sync(self.scheduler.view());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use scroller_core::{
        AnimatedValue, Animation, AnimationEventKind, AnimationId, FixedSettings, ScrollController,
        ScrollControllerValues, ScrollMode, ViewChangeResult, ZoomMode,
    };

    struct JumpEngine;

    impl AnimationEngine for JumpEngine {
        fn start(&mut self, _: AnimationId, _: Animation) {}
        fn stop(&mut self, _: AnimationId) {}
    }

    fn loaded_presenter(config: ScrollerConfig) -> ScrollPresenter<JumpEngine> {
        let _ = env_logger::builder().is_test(true).try_init();
        let settings = Arc::new(FixedSettings {
            animations_enabled: false,
        });
        let mut presenter = ScrollPresenter::new(config, settings, JumpEngine).unwrap();
        presenter.set_viewport_size(Vector2::new(300., 200.)).unwrap();
        presenter
            .set_content_size(Some(Vector2::new(1200., 600.)))
            .unwrap();
        presenter.load();
        presenter.dispatch();
        presenter
    }

    fn record_scrolls(
        presenter: &mut ScrollPresenter<JumpEngine>,
    ) -> Arc<Mutex<Vec<ScrollCompleted>>> {
        let completed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&completed);
        presenter.on_scroll_completed(move |event| sink.lock().push(*event));
        completed
    }

    #[test]
    fn test_events_wait_for_dispatch() {
        let mut presenter = loaded_presenter(ScrollerConfig::default());
        let completed = record_scrolls(&mut presenter);
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        let handler = presenter.on_view_changed(move |event| sink.lock().push(*event));

        let id = presenter.scroll_to(100., 50., ScrollOptions::jump()).unwrap();
        assert_eq!(presenter.horizontal_offset(), 100.);
        assert!(completed.lock().is_empty());

        assert_eq!(presenter.dispatch(), 2);
        assert_eq!(
            *completed.lock(),
            vec![ScrollCompleted {
                correlation_id: id,
                result: ViewChangeResult::Completed,
            }]
        );
        assert_eq!(
            *changes.lock(),
            vec![ViewChanged {
                horizontal_offset: 100.,
                vertical_offset: 50.,
                zoom_factor: 1.,
            }]
        );

        assert!(presenter.remove_handler(handler));
        assert!(!presenter.remove_handler(handler));
        presenter.scroll_by(10., 0., ScrollOptions::jump()).unwrap();
        presenter.dispatch();
        assert_eq!(changes.lock().len(), 1);
        assert_eq!(completed.lock().len(), 2);
    }

    #[test]
    fn test_keyboard_input() {
        let mut presenter = loaded_presenter(ScrollerConfig::default());
        presenter.line(ScrollDirection::Down).unwrap();
        presenter.line(ScrollDirection::Down).unwrap();
        assert_eq!(presenter.vertical_offset(), 32.);
        presenter.page(ScrollDirection::Right).unwrap();
        presenter.page(ScrollDirection::Right).unwrap();
        assert_eq!(presenter.horizontal_offset(), 600.);
        presenter.line(ScrollDirection::Up).unwrap();
        presenter.page(ScrollDirection::Up).unwrap();
        assert_eq!(presenter.vertical_offset(), 0.);
    }

    #[derive(Default)]
    struct Bar {
        values: Option<ScrollControllerValues>,
        completed: Vec<(CorrelationId, ViewChangeResult)>,
    }

    impl ScrollController for Bar {
        fn set_values(&mut self, _: Orientation, values: ScrollControllerValues) {
            self.values = Some(values);
        }

        fn on_scroll_completed(&mut self, id: CorrelationId, result: ViewChangeResult) {
            self.completed.push((id, result));
        }
    }

    #[test]
    fn test_scroll_controller() {
        let mut presenter = loaded_presenter(ScrollerConfig::default());
        let bar = Arc::new(Mutex::new(Bar::default()));
        presenter.set_vertical_scroll_controller(Some(bar.clone()));
        assert_eq!(bar.lock().values.map(|v| v.max_offset), Some(400.));

        let id = presenter
            .controller_scroll_to(Orientation::Vertical, 250., ScrollOptions::jump())
            .unwrap();
        presenter.dispatch();
        assert_eq!(presenter.vertical_offset(), 250.);
        assert_eq!(bar.lock().values.map(|v| v.offset), Some(250.));
        assert_eq!(bar.lock().completed, vec![(id, ViewChangeResult::Completed)]);

        // the bar disallows keyboard scrolling along its axis
        presenter.set_scroller_interactions_allowed(Orientation::Vertical, false);
        let id = presenter.line(ScrollDirection::Down).unwrap();
        assert!(id.is_no_op());
        presenter.mouse_wheel_scroll(Vector2::new(40., 40.)).unwrap();
        assert_eq!(presenter.vertical_offset(), 250.);
        assert_eq!(presenter.horizontal_offset(), 40.);

        presenter.set_controller_interacting(Orientation::Vertical, true);
        assert_eq!(presenter.state(), InteractionState::Interacting);
    }

    #[test]
    fn test_mouse_wheel_zoom() {
        let mut presenter = loaded_presenter(ScrollerConfig::default());
        assert_eq!(
            presenter.mouse_wheel_zoom(120., Point2::new(10., 10.)),
            Ok(None),
            "zoom mode is disabled by default"
        );

        let mut config = ScrollerConfig::default();
        config.zoom_mode = ZoomMode::Enabled;
        let mut presenter = loaded_presenter(config);
        let id = presenter
            .mouse_wheel_zoom(120., Point2::new(10., 10.))
            .unwrap();
        assert_eq!(id.map(|id| id.get()), Some(1));
    }

    #[test]
    fn test_scroll_modes() {
        let mut config = ScrollerConfig::default();
        config.vertical_scroll_mode = ScrollMode::Disabled;
        let mut presenter = loaded_presenter(config);
        let completed = record_scrolls(&mut presenter);

        let id = presenter.line(ScrollDirection::Down).unwrap();
        assert!(id.is_no_op());
        presenter.page(ScrollDirection::Right).unwrap();
        presenter.mouse_wheel_scroll(Vector2::new(20., 50.)).unwrap();
        assert_eq!(presenter.horizontal_offset(), 320.);
        assert_eq!(presenter.vertical_offset(), 0.);

        // the API still scrolls a disabled axis
        presenter.scroll_to(0., 150., ScrollOptions::jump()).unwrap();
        assert_eq!(presenter.vertical_offset(), 150.);

        presenter.dispatch();
        assert_eq!(
            completed.lock()[0],
            ScrollCompleted {
                correlation_id: CorrelationId::NO_OP,
                result: ViewChangeResult::Ignored,
            }
        );
    }

    #[test]
    fn test_ignored_input_kinds() {
        let mut config = ScrollerConfig::default();
        config.zoom_mode = ZoomMode::Enabled;
        config.ignored_input_kinds.insert(InputKind::MouseWheel);
        let mut presenter = loaded_presenter(config);
        let completed = record_scrolls(&mut presenter);

        let id = presenter.mouse_wheel_scroll(Vector2::new(40., 40.)).unwrap();
        assert!(id.is_no_op());
        assert_eq!(presenter.mouse_wheel_zoom(120., Point2::new(10., 10.)), Ok(None));
        assert_eq!(presenter.horizontal_offset(), 0.);
        assert_eq!(presenter.vertical_offset(), 0.);

        presenter.line(ScrollDirection::Right).unwrap();
        assert_eq!(presenter.horizontal_offset(), 16.);

        presenter.dispatch();
        let results: Vec<_> = completed.lock().iter().map(|c| c.result).collect();
        assert_eq!(
            results,
            vec![ViewChangeResult::Ignored, ViewChangeResult::Completed]
        );
    }

    #[test]
    fn test_zoom_and_state_events() {
        let mut config = ScrollerConfig::default();
        config.zoom_mode = ZoomMode::Enabled;
        let _ = env_logger::builder().is_test(true).try_init();
        let settings = Arc::new(FixedSettings {
            animations_enabled: false,
        });
        let mut presenter = ScrollPresenter::new(config, settings, JumpEngine).unwrap();

        let extents = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&extents);
        presenter.on_extent_changed(move |event| sink.lock().push(*event));
        let zooms = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&zooms);
        presenter.on_zoom_completed(move |event| sink.lock().push(*event));
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        presenter.on_state_changed(move |event| sink.lock().push(event.state));

        presenter.set_viewport_size(Vector2::new(300., 200.)).unwrap();
        presenter
            .set_content_size(Some(Vector2::new(1200., 600.)))
            .unwrap();
        presenter.load();
        presenter.dispatch();
        assert_eq!(
            extents.lock().last(),
            Some(&ExtentChanged {
                extent: Vector2::new(1200., 600.),
                viewport: Vector2::new(300., 200.),
            })
        );

        let jump = presenter.zoom_to(2., None, ZoomOptions::jump()).unwrap();
        assert_eq!(presenter.zoom_factor(), 2.);
        assert_eq!(presenter.extent(), Vector2::new(2400., 1200.));

        // wheel zooming coasts; the engine reports the end by hand
        let wheel = presenter
            .mouse_wheel_zoom(-120., Point2::new(0., 0.))
            .unwrap()
            .unwrap();
        assert_eq!(presenter.state(), InteractionState::Inertia);
        presenter.handle_animation_event(AnimationEvent {
            id: AnimationId::from(1),
            kind: AnimationEventKind::Completed(AnimatedValue::ZoomFactor(1.5)),
        });
        assert_eq!(presenter.zoom_factor(), 1.5);
        presenter.dispatch();

        assert_eq!(
            *zooms.lock(),
            vec![
                ZoomCompleted {
                    correlation_id: jump,
                    result: ViewChangeResult::Completed,
                },
                ZoomCompleted {
                    correlation_id: wheel,
                    result: ViewChangeResult::Completed,
                },
            ]
        );
        assert_eq!(
            *states.lock(),
            vec![InteractionState::Inertia, InteractionState::Idle]
        );
    }
}

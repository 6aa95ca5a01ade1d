//! Events.

use cgmath::Vector2;
use core::fmt;
use parking_lot::Mutex;
use scroller_core::{CorrelationId, InteractionState, Notification, ViewChangeResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// List of event types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTypeId {
    ViewChanged = 0,
    ExtentChanged = 1,
    ScrollCompleted = 2,
    ZoomCompleted = 3,
    StateChanged = 4,
}

pub trait EventType: fmt::Debug {
    fn type_id() -> EventTypeId;
}

/// The offsets or the zoom factor changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewChanged {
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
    pub zoom_factor: f64,
}

/// The content or the viewport was resized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtentChanged {
    /// Zoomed content size.
    pub extent: Vector2<f64>,
    pub viewport: Vector2<f64>,
}

/// A scroll request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCompleted {
    pub correlation_id: CorrelationId,
    pub result: ViewChangeResult,
}

/// A zoom request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomCompleted {
    pub correlation_id: CorrelationId,
    pub result: ViewChangeResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    pub state: InteractionState,
}

macro_rules! impl_event_type {
    ($($t:tt),+) => {
        $(
            impl EventType for $t {
                fn type_id() -> EventTypeId {
                    EventTypeId::$t
                }
            }
        )+
    }
}
impl_event_type!(ViewChanged, ExtentChanged, ScrollCompleted, ZoomCompleted, StateChanged);

pub struct EventHandler<Type>(Arc<Mutex<dyn FnMut(&Type) + Send>>);

impl<T> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl<T: EventType> EventHandler<T> {
    pub fn new<F: 'static + FnMut(&T) + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    fn call(&self, event: &T) {
        let mut handler = self.0.lock();
        (&mut *handler)(event)
    }
}

impl<T: EventType> fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler<{:?}>", T::type_id())
    }
}

/// Refers to a registered event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(EventTypeId, u64);

/// Helper enum for EventHandlers.
#[derive(Debug)]
pub(crate) enum PolyEventHandler {
    ViewChanged(EventHandler<ViewChanged>),
    ExtentChanged(EventHandler<ExtentChanged>),
    ScrollCompleted(EventHandler<ScrollCompleted>),
    ZoomCompleted(EventHandler<ZoomCompleted>),
    StateChanged(EventHandler<StateChanged>),
}

/// Helper trait for EventHandlers.
pub(crate) trait PolyEventHandlerType {
    fn type_id() -> EventTypeId;
    fn into(self) -> PolyEventHandler;
}

macro_rules! impl_peht {
    ($($t:tt),+) => {
        $(
            impl PolyEventHandlerType for EventHandler<$t> {
                fn type_id() -> EventTypeId {
                    $t::type_id()
                }
                fn into(self) -> PolyEventHandler {
                    PolyEventHandler::$t(self)
                }
            }
        )+
    }
}
impl_peht!(ViewChanged, ExtentChanged, ScrollCompleted, ZoomCompleted, StateChanged);

/// List of event handlers, called in registration order.
#[derive(Debug, Default)]
pub(crate) struct EventHandlers {
    map: BTreeMap<HandlerId, PolyEventHandler>,
    last_id: u64,
}

impl EventHandlers {
    pub(crate) fn new() -> EventHandlers {
        EventHandlers::default()
    }

    pub(crate) fn add_handler<T: PolyEventHandlerType>(&mut self, handler: T) -> HandlerId {
        self.last_id += 1;
        let id = HandlerId(T::type_id(), self.last_id);
        self.map.insert(id, handler.into());
        id
    }

    pub(crate) fn remove_handler(&mut self, id: HandlerId) -> bool {
        self.map.remove(&id).is_some()
    }

    fn handlers_of(&self, ty: EventTypeId) -> impl Iterator<Item = &PolyEventHandler> {
        self.map
            .range(HandlerId(ty, 0)..=HandlerId(ty, u64::MAX))
            .map(|(_, handler)| handler)
    }

    /// Calls the handlers interested in a notification.
    pub(crate) fn dispatch(&self, notification: &Notification) {
        match *notification {
            Notification::ViewChanged(snapshot) => {
                let event = ViewChanged {
                    horizontal_offset: snapshot.horizontal_offset,
                    vertical_offset: snapshot.vertical_offset,
                    zoom_factor: snapshot.zoom_factor,
                };
                for handler in self.handlers_of(EventTypeId::ViewChanged) {
                    if let PolyEventHandler::ViewChanged(handler) = handler {
                        handler.call(&event);
                    }
                }
            }
            Notification::ExtentChanged(snapshot) => {
                let event = ExtentChanged {
                    extent: snapshot.extent,
                    viewport: snapshot.viewport,
                };
                for handler in self.handlers_of(EventTypeId::ExtentChanged) {
                    if let PolyEventHandler::ExtentChanged(handler) = handler {
                        handler.call(&event);
                    }
                }
            }
            Notification::ScrollCompleted(completion) => {
                let event = ScrollCompleted {
                    correlation_id: completion.id,
                    result: completion.result,
                };
                for handler in self.handlers_of(EventTypeId::ScrollCompleted) {
                    if let PolyEventHandler::ScrollCompleted(handler) = handler {
                        handler.call(&event);
                    }
                }
            }
            Notification::ZoomCompleted(completion) => {
                let event = ZoomCompleted {
                    correlation_id: completion.id,
                    result: completion.result,
                };
                for handler in self.handlers_of(EventTypeId::ZoomCompleted) {
                    if let PolyEventHandler::ZoomCompleted(handler) = handler {
                        handler.call(&event);
                    }
                }
            }
            Notification::StateChanged(state) => {
                let event = StateChanged { state };
                for handler in self.handlers_of(EventTypeId::StateChanged) {
                    if let PolyEventHandler::StateChanged(handler) = handler {
                        handler.call(&event);
                    }
                }
            }
        }
    }
}

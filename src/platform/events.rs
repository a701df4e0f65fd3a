//! Page-level event listener registry
//!
//! Components subscribe to page notifications by registering a listener
//! record; the page routes each dispatched event to the subscribers that are
//! registered for it at that moment.

use std::collections::HashMap;

/// Page notifications a component can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Scroll,
    Resize,
    OrientationChange,
    VisibilityChange,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::OrientationChange => "orientationchange",
            Self::VisibilityChange => "visibilitychange",
        }
    }
}

/// The component a listener delivers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscriber {
    /// The polling fallback of the lazy observation engine
    LazyFallback,
}

/// Listener registration options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    /// A passive listener never blocks the gesture it observes
    pub passive: bool,
}

impl ListenerOptions {
    pub fn passive() -> Self {
        Self { passive: true }
    }
}

/// Identifier returned on registration, used to remove the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub id: ListenerId,
    pub subscriber: Subscriber,
    pub options: ListenerOptions,
}

/// Listener registry for page events
pub struct ListenerRegistry {
    listeners: HashMap<EventType, Vec<Listener>>,
    next_id: u64,
}

impl ListenerRegistry {
    /// Create a new, empty registry
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 1,
        }
    }

    /// Add an event listener
    pub fn add_listener(
        &mut self,
        event_type: EventType,
        subscriber: Subscriber,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(event_type).or_default().push(Listener {
            id,
            subscriber,
            options,
        });
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, event_type: EventType, id: ListenerId) -> bool {
        let Some(listeners) = self.listeners.get_mut(&event_type) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            self.listeners.remove(&event_type);
        }
        removed
    }

    /// Listeners currently registered for an event type, in registration order
    pub fn listeners(&self, event_type: EventType) -> Vec<Listener> {
        self.listeners.get(&event_type).cloned().unwrap_or_default()
    }

    /// Total number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

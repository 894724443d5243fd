//! Synchronous publish/subscribe event bus.
//!
//! Handlers subscribe to an [`EventCategory`] and receive every event of that
//! category, in registration order, on the publishing thread. There is no
//! queue: [`EventBus::publish`] returns once every handler has run.
//!
//! Dispatch is re-entrant. A handler may publish further events (or subscribe
//! and unsubscribe) while it is being called:
//! - The subscriber list is snapshotted before iterating, so an outer event
//!   still reaches every handler that was registered when it was published.
//! - A handler that is currently running cannot be borrowed again; nested
//!   events skip it and reach everybody else.
//!
//! Failures are isolated per handler. An `Err` is logged at `warn`, a panic is
//! caught and logged at `error`, and delivery moves on to the next handler.
//!
//! Subscriptions can be grouped in a [`ScopeId`] and dropped together with
//! [`EventBus::close_scope`]; scenes use this to tear down their handlers on
//! unload.

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::{debug, error, trace, warn};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{Event, EventCategory};
use crate::error::HandlerError;

pub type HandlerResult = Result<(), HandlerError>;

/// Receiver of bus events.
pub trait EventHandler {
    fn handle(&mut self, event: &Event) -> HandlerResult;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> HandlerResult,
{
    fn handle(&mut self, event: &Event) -> HandlerResult {
        self(event)
    }
}

/// Handler shared between the bus and its owner.
pub type SharedHandler = Rc<RefCell<dyn EventHandler>>;

/// Returned by `subscribe`; pass it to [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

/// Group of subscriptions removed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

struct Subscriber {
    token: SubscriptionToken,
    scope: Option<ScopeId>,
    handler: SharedHandler,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<FxHashMap<EventCategory, Vec<Subscriber>>>,
    next_token: Cell<u64>,
    next_scope: Cell<u32>,
    depth: Cell<u32>,
    published: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every event of `category`.
    pub fn subscribe<H>(&self, category: EventCategory, handler: H) -> SubscriptionToken
    where
        H: EventHandler + 'static,
    {
        self.insert(category, None, Rc::new(RefCell::new(handler)))
    }

    /// Register `handler` inside `scope`.
    pub fn subscribe_scoped<H>(
        &self,
        scope: ScopeId,
        category: EventCategory,
        handler: H,
    ) -> SubscriptionToken
    where
        H: EventHandler + 'static,
    {
        self.insert(category, Some(scope), Rc::new(RefCell::new(handler)))
    }

    /// Register a handler the caller keeps a handle to.
    pub fn subscribe_shared(
        &self,
        category: EventCategory,
        scope: Option<ScopeId>,
        handler: SharedHandler,
    ) -> SubscriptionToken {
        self.insert(category, scope, handler)
    }

    fn insert(
        &self,
        category: EventCategory,
        scope: Option<ScopeId>,
        handler: SharedHandler,
    ) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token.get());
        self.next_token.set(token.0 + 1);
        self.subscribers
            .borrow_mut()
            .entry(category)
            .or_default()
            .push(Subscriber {
                token,
                scope,
                handler,
            });
        trace!("Subscribed {:?} to {:?} (scope {:?})", token, category, scope);
        token
    }

    /// Remove one subscription. Returns false if the token is unknown.
    ///
    /// Events already being dispatched still reach the removed handler.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        for list in subscribers.values_mut() {
            if let Some(pos) = list.iter().position(|s| s.token == token) {
                list.remove(pos);
                trace!("Unsubscribed {:?}", token);
                return true;
            }
        }
        false
    }

    pub fn create_scope(&self) -> ScopeId {
        let scope = ScopeId(self.next_scope.get());
        self.next_scope.set(scope.0 + 1);
        scope
    }

    /// Remove every subscription registered in `scope`; returns how many.
    pub fn close_scope(&self, scope: ScopeId) -> usize {
        let mut removed = 0;
        for list in self.subscribers.borrow_mut().values_mut() {
            let before = list.len();
            list.retain(|s| s.scope != Some(scope));
            removed += before - list.len();
        }
        debug!("Closed {:?}: {} subscription(s) removed", scope, removed);
        removed
    }

    pub fn subscriber_count(&self, category: EventCategory) -> usize {
        self.subscribers
            .borrow()
            .get(&category)
            .map_or(0, |list| list.len())
    }

    pub fn total_subscribers(&self) -> usize {
        self.subscribers.borrow().values().map(Vec::len).sum()
    }

    /// Nesting level of the dispatch currently running; 0 outside handlers.
    pub fn dispatch_depth(&self) -> u32 {
        self.depth.get()
    }

    /// Number of events published so far.
    pub fn published_count(&self) -> u64 {
        self.published.get()
    }

    /// Deliver `event` to every handler of its category.
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let category = event.category();
        self.published.set(self.published.get() + 1);

        let snapshot: SmallVec<[(SubscriptionToken, SharedHandler); 8]> = self
            .subscribers
            .borrow()
            .get(&category)
            .map(|list| {
                list.iter()
                    .map(|s| (s.token, Rc::clone(&s.handler)))
                    .collect()
            })
            .unwrap_or_default();

        if snapshot.is_empty() {
            trace!("No subscribers for {:?}/{:?}", category, event.action());
            return;
        }

        let _depth = DepthGuard::enter(&self.depth);
        for (token, handler) in snapshot {
            let Ok(mut handler) = handler.try_borrow_mut() else {
                debug!(
                    "Skipping {:?} for nested {:?}/{:?}: handler is already running",
                    token,
                    category,
                    event.action()
                );
                continue;
            };
            match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(
                        "Handler {:?} failed on {:?}/{:?}: {}",
                        token,
                        category,
                        event.action(),
                        err
                    );
                }
                Err(payload) => {
                    error!(
                        "Handler {:?} panicked on {:?}/{:?}: {}",
                        token,
                        category,
                        event.action(),
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
    }
}

struct DepthGuard<'a>(&'a Cell<u32>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        DepthGuard(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MenuEvent, SoundEvent};

    #[test]
    fn tokens_and_scopes_are_unique() {
        let bus = EventBus::new();
        let a = bus.subscribe(EventCategory::Menu, |_: &Event| -> HandlerResult { Ok(()) });
        let b = bus.subscribe(EventCategory::Menu, |_: &Event| -> HandlerResult { Ok(()) });
        assert_ne!(a, b);
        assert_ne!(bus.create_scope(), bus.create_scope());
    }

    #[test]
    fn unsubscribe_unknown_token_is_false() {
        let bus = EventBus::new();
        let token = bus.subscribe(EventCategory::Menu, |_: &Event| -> HandlerResult { Ok(()) });
        assert!(bus.unsubscribe(token));
        assert!(!bus.unsubscribe(token));
        assert_eq!(bus.total_subscribers(), 0);
    }

    #[test]
    fn depth_tracks_nesting() {
        let bus = Rc::new(EventBus::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner_bus = Rc::clone(&bus);
        let inner_seen = Rc::clone(&seen);
        bus.subscribe(EventCategory::Menu, move |_: &Event| -> HandlerResult {
            inner_seen.borrow_mut().push(inner_bus.dispatch_depth());
            inner_bus.publish(SoundEvent::play_2d("nested"));
            Ok(())
        });
        let sound_bus = Rc::clone(&bus);
        let sound_seen = Rc::clone(&seen);
        bus.subscribe(EventCategory::Sound, move |_: &Event| -> HandlerResult {
            sound_seen.borrow_mut().push(sound_bus.dispatch_depth());
            Ok(())
        });

        bus.publish(MenuEvent::Pause);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(bus.dispatch_depth(), 0);
        assert_eq!(bus.published_count(), 2);
    }

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn std::any::Any + Send> = Box::new("borrowed");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
    }
}

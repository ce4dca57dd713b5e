//! Generic service/listener/connector abstractions. The fabric itself carries no domain
//! semantics beyond observer dispatch — every concrete service in [`crate::services`] and
//! [`crate::historical`] is built on top of these three traits.
//!
//! Every service in this crate is owned by the topology through an `Rc<RefCell<_>>` handle and
//! referenced non-owningly by the listeners registered on it and the connector driving it. This
//! keeps sharing legal in a single thread without introducing `Arc`/`Mutex`/channels, which the
//! synchronous, non-parallel scheduling model (one connector's read loop runs to completion
//! before the next starts) does not need.

use std::cell::RefCell;
use std::rc::Rc;

/// A keyed store of domain entities reachable via an inbound message handler and a list of
/// registered listeners. `get` returns a default-constructed value on miss rather than an
/// `Option`, matching the reference's "missing product" behavior (§7): callers that need to
/// detect absence should check beforehand via a service-specific `contains` when one is exposed.
pub trait Service<K: ?Sized, V> {
    fn get(&self, key: &K) -> V;
    fn on_message(&mut self, data: V);
}

/// Callbacks a service invokes on every registered listener. Any given update dispatches through
/// exactly one of these three per the data's path through the topology; the other two are
/// no-ops by default, so concrete listeners only override the callback they actually use.
pub trait Listener<V> {
    fn process_add(&mut self, _data: &V) {}
    fn process_remove(&mut self, _data: &V) {}
    fn process_update(&mut self, _data: &V) {}
}

/// A non-owning handle to a listener, shared between the topology (which owns it) and the
/// service it is registered on (which only ever calls through it).
pub type ListenerHandle<V> = Rc<RefCell<dyn Listener<V>>>;

/// An append-only registry of listener handles. Fixed at topology wiring time: nothing removes
/// a listener once added, and no handler mutates this list while dispatching through it, so
/// re-entrant callbacks (a listener's callback driving a chain that loops back into this
/// service) never observe a container being mutated mid-iteration.
#[derive(Default)]
pub struct ListenerRegistry<V>(Vec<ListenerHandle<V>>);

impl<V> ListenerRegistry<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn add(&mut self, listener: ListenerHandle<V>) {
        self.0.push(listener);
    }

    pub fn notify_add(&self, data: &V) {
        for listener in &self.0 {
            listener.borrow_mut().process_add(data);
        }
    }

    pub fn notify_remove(&self, data: &V) {
        for listener in &self.0 {
            listener.borrow_mut().process_remove(data);
        }
    }

    pub fn notify_update(&self, data: &V) {
        for listener in &self.0 {
            listener.borrow_mut().process_update(data);
        }
    }

    /// Clones the handle list out (cheap `Rc` bumps). Services whose own listeners can call back
    /// into the service that is dispatching them (the inquiry lifecycle, §4.10) must notify from
    /// a snapshot taken after releasing their own `RefCell` borrow, or a re-entrant callback would
    /// hit an already-borrowed cell.
    pub fn snapshot(&self) -> Vec<ListenerHandle<V>> {
        self.0.clone()
    }
}

/// A subscribe connector's sole job: read an external source once, start to finish, pushing each
/// record into its target service's `on_message`. Implementations are expected to log and skip
/// malformed lines rather than abort the run (§7).
pub trait SubscribeConnector {
    fn run(&mut self) -> crate::error::FabricResult<()>;
}

/// A publish connector writes a single record out. `publish` never returns an error to its
/// caller: a closed or unopenable file is logged once at connector construction and every
/// subsequent publish is a silent no-op, matching the reference's "File not open" handling (§7).
pub trait PublishConnector<V> {
    fn publish(&mut self, data: &V);
}

/// Convenience alias for the shared, interior-mutable handle every service is held by.
pub type ServiceHandle<T> = Rc<RefCell<T>>;

pub fn handle<T>(value: T) -> ServiceHandle<T> {
    Rc::new(RefCell::new(value))
}

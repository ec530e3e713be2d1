use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, Handler};

/// Maps each event kind to the handlers registered for it.
///
/// Build it up front, then share it behind an `Arc`. Dispatch only reads, so
/// it is safe from any number of streaming threads at once.
pub struct HandlerTable<E, P> {
    handlers: BTreeMap<EventKind, Vec<Handler<E, P>>>,
}

impl<E, P> Default for HandlerTable<E, P> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<E, P> HandlerTable<E, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` under `kind`, refusing a handler of another signature.
    pub fn register(&mut self, kind: EventKind, handler: Handler<E, P>) -> Result<()> {
        if handler.kind() != kind {
            return Err(Error::SignatureMismatch {
                event: kind,
                expected: kind.signature(),
                found: handler.kind(),
            });
        }
        tracing::debug!("registered handler for {}", kind);
        self.handlers.entry(kind).or_default().push(handler);
        Ok(())
    }

    /// Same as [`register`](Self::register) with the kind given by signal name.
    pub fn register_by_name(&mut self, signal: &str, handler: Handler<E, P>) -> Result<()> {
        self.register(signal.parse()?, handler)
    }

    pub fn on_negotiation_needed<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.push(Handler::negotiation_needed(f))
    }

    pub fn on_ice_candidate<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&E, u32, &str) + Send + Sync + 'static,
    {
        self.push(Handler::ice_candidate(f))
    }

    pub fn on_pad_added<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&E, &P) + Send + Sync + 'static,
    {
        self.push(Handler::pad_added(f))
    }

    fn push(&mut self, handler: Handler<E, P>) -> &mut Self {
        self.handlers.entry(handler.kind()).or_default().push(handler);
        self
    }

    /// Kinds with at least one handler, in a stable order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.handlers
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }

    /// Runs every handler for the event's kind in registration order.
    pub fn dispatch(&self, event: &Event<E, P>) -> usize {
        let kind = event.kind();
        let Some(list) = self.handlers.get(&kind) else {
            tracing::trace!("no handler for {}", kind);
            return 0;
        };
        list.iter().filter(|handler| handler.call(event)).count()
    }
}

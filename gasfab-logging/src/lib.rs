//! Buffered, typed event logging, shared by every `gasfab` component.
//!
//! A [`Registry`] binds string-named streams to an action run over batches of
//! events; a [`Logger<T>`] is a cheap, cloneable handle into one such stream.
//! Nothing here prints anything on its own — installing a stderr-printing
//! action is the caller's job (see `gasfab::logging`).

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A collection of named, independently-typed logging streams.
pub struct Registry {
    /// An instant common to all logging statements, used to compute relative timestamps.
    time: Instant,
    /// A map from stream name to a type-erased `Logger<T>`.
    map: HashMap<String, Box<dyn Any>>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Registry {
    /// Creates a new, empty registry anchored at the current instant.
    pub fn new() -> Self {
        Registry::anchored_at(Instant::now())
    }

    /// Creates a new, empty registry anchored at `time`.
    pub fn anchored_at(time: Instant) -> Self {
        Registry {
            time,
            map: HashMap::new(),
        }
    }

    /// Binds a stream name to an action invoked on each flushed batch of events.
    ///
    /// Returns any logger previously bound under `name`. Existing handles to the old
    /// logger keep writing to the old action; only newly-created handles see the new one.
    pub fn insert<T: 'static>(
        &mut self,
        name: impl Into<String>,
        action: impl Fn(&Duration, &[(Duration, T)]) + 'static,
    ) -> Option<Box<dyn Any>> {
        let logger = Logger::<T>::new(self.time, Box::new(action));
        self.map.insert(name.into(), Box::new(logger))
    }

    /// Removes a bound stream, signaling its end to anyone still holding a handle.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Any>> {
        self.map.remove(name)
    }

    /// Retrieves a handle to a named stream, if one has been bound.
    pub fn get<T: 'static>(&self, name: &str) -> Option<Logger<T>> {
        self.map
            .get(name)
            .and_then(|entry| entry.downcast_ref::<Logger<T>>())
            .cloned()
    }
}

/// A cheaply-cloneable, buffering handle onto one named logging stream.
pub struct Logger<T> {
    time: Instant,
    action: Rc<dyn Fn(&Duration, &[(Duration, T)])>,
    buffer: Rc<RefCell<Vec<(Duration, T)>>>,
}

impl<T> Clone for Logger<T> {
    fn clone(&self) -> Self {
        Logger {
            time: self.time,
            action: Rc::clone(&self.action),
            buffer: Rc::clone(&self.buffer),
        }
    }
}

impl<T> Logger<T> {
    /// Allocates a new logger bound to a write destination.
    pub fn new(time: Instant, action: Box<dyn Fn(&Duration, &[(Duration, T)])>) -> Self {
        Logger {
            time,
            action: Rc::from(action),
            buffer: Rc::new(RefCell::new(Vec::with_capacity(256))),
        }
    }

    /// Logs an event, timestamped at the moment of the call.
    ///
    /// The event may sit in the buffer until capacity forces a flush, or until
    /// [`Logger::flush`] is called explicitly. All clones of a `Logger` share the
    /// buffer, so the action always sees one stream with non-decreasing timestamps.
    pub fn log(&self, event: T) {
        let mut buffer = self.buffer.borrow_mut();
        buffer.push((self.time.elapsed(), event));
        if buffer.len() == buffer.capacity() {
            (self.action)(&self.time.elapsed(), &buffer[..]);
            buffer.clear();
        }
    }

    /// Flushes any buffered events through the action immediately.
    pub fn flush(&self) {
        let mut buffer = self.buffer.borrow_mut();
        if !buffer.is_empty() {
            (self.action)(&self.time.elapsed(), &buffer[..]);
            buffer.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn logged_events_reach_the_action_on_flush() {
        let seen: Rc<StdRefCell<Vec<u32>>> = Rc::new(StdRefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let mut registry = Registry::anchored_at(Instant::now());
        registry.insert::<u32>("counts", move |_now, events| {
            seen_clone.borrow_mut().extend(events.iter().map(|(_, e)| *e));
        });

        let logger: Logger<u32> = registry.get("counts").unwrap();
        logger.log(1);
        logger.log(2);
        logger.flush();

        assert_eq!(&*seen.borrow(), &[1, 2]);
    }

    #[test]
    fn missing_stream_returns_none() {
        let registry = Registry::anchored_at(Instant::now());
        assert!(registry.get::<u32>("nope").is_none());
    }

    #[test]
    fn clones_share_the_buffer() {
        let seen: Rc<StdRefCell<Vec<u32>>> = Rc::new(StdRefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let mut registry = Registry::anchored_at(Instant::now());
        registry.insert::<u32>("counts", move |_now, events| {
            seen_clone.borrow_mut().extend(events.iter().map(|(_, e)| *e));
        });
        let a: Logger<u32> = registry.get("counts").unwrap();
        let b = a.clone();
        a.log(10);
        b.log(20);
        b.flush();
        assert_eq!(&*seen.borrow(), &[10, 20]);
    }
}

//! Extension points around outbound messages.
//!
//! The send pipeline talks to a [`SendHooks`] collaborator injected into
//! [`CqBot`](crate::CqBot): one cancellable call before transmission, one
//! notification after an awaited send completes. Both run synchronously on
//! the sending task.
//!
//! [`HookBus`] is a ready-made registry:
//!
//! ```rust
//! use cqhttp::hooks::{HookBus, SessionEvent};
//!
//! let hooks = HookBus::new();
//! // Veto anything containing a forbidden word, rewrite the rest.
//! hooks.before_send(|session| {
//!     if session.content.contains("secret") {
//!         return true;
//!     }
//!     session.content = session.content.trim().to_string();
//!     false
//! });
//! hooks.on(|event, session| {
//!     if event == SessionEvent::Send {
//!         println!("sent {:?}", session.message_id);
//!     }
//! });
//! ```

use parking_lot::RwLock;

use crate::session::OutboundSession;

/// Events emitted by the send pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// A message was delivered and its id is known.
    Send,
}

/// Hook dispatch used by the send pipeline.
pub trait SendHooks: Send + Sync {
    /// Runs before transmission. May rewrite `session.content`.
    ///
    /// Returns `true` to cancel the send.
    fn try_intercept(&self, session: &mut OutboundSession) -> bool;

    /// Observes a completed session.
    fn notify(&self, event: SessionEvent, session: &OutboundSession);
}

/// Hooks that never cancel and ignore notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl SendHooks for NoopHooks {
    fn try_intercept(&self, _session: &mut OutboundSession) -> bool {
        false
    }

    fn notify(&self, _event: SessionEvent, _session: &OutboundSession) {}
}

type Interceptor = Box<dyn Fn(&mut OutboundSession) -> bool + Send + Sync>;
type Listener = Box<dyn Fn(SessionEvent, &OutboundSession) + Send + Sync>;

/// A registry of before-send interceptors and session listeners.
///
/// Interceptors run in registration order; the first one returning `true`
/// cancels the send and the rest are skipped.
#[derive(Default)]
pub struct HookBus {
    interceptors: RwLock<Vec<Interceptor>>,
    listeners: RwLock<Vec<Listener>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a before-send interceptor.
    pub fn before_send<F>(&self, interceptor: F)
    where
        F: Fn(&mut OutboundSession) -> bool + Send + Sync + 'static,
    {
        self.interceptors.write().push(Box::new(interceptor));
    }

    /// Registers a session listener.
    pub fn on<F>(&self, listener: F)
    where
        F: Fn(SessionEvent, &OutboundSession) + Send + Sync + 'static,
    {
        self.listeners.write().push(Box::new(listener));
    }
}

impl SendHooks for HookBus {
    fn try_intercept(&self, session: &mut OutboundSession) -> bool {
        self.interceptors
            .read()
            .iter()
            .any(|interceptor| interceptor(session))
    }

    fn notify(&self, event: SessionEvent, session: &OutboundSession) {
        for listener in self.listeners.read().iter() {
            listener(event, session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MessageType, TargetType};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session(content: &str) -> OutboundSession {
        OutboundSession::new("1", MessageType::Group, TargetType::Group, "100", content)
    }

    #[test]
    fn test_first_cancel_wins() {
        let later = Arc::new(AtomicUsize::new(0));
        let later_clone = Arc::clone(&later);

        let bus = HookBus::new();
        bus.before_send(|s| {
            s.content.push('!');
            false
        });
        bus.before_send(|s| s.content.starts_with("stop"));
        bus.before_send(move |_| {
            later_clone.fetch_add(1, Ordering::SeqCst);
            false
        });

        let mut allowed = session("go");
        assert!(!bus.try_intercept(&mut allowed));
        assert_eq!(allowed.content, "go!");
        assert_eq!(later.load(Ordering::SeqCst), 1);

        let mut blocked = session("stop");
        assert!(bus.try_intercept(&mut blocked));
        assert_eq!(later.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listeners_all_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let bus = HookBus::new();
        for _ in 0..2 {
            let c = Arc::clone(&counter);
            bus.on(move |event, _| {
                assert_eq!(event, SessionEvent::Send);
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        bus.notify(SessionEvent::Send, &session("x"));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_noop_hooks() {
        let mut s = session("x");
        assert!(!NoopHooks.try_intercept(&mut s));
        assert_eq!(s.content, "x");
    }
}

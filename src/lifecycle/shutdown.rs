use futures::future::BoxFuture;
use std::future::Future;
use tracing::debug;

use super::session::CallSession;

type Hook = Box<dyn FnOnce(CallSession) -> BoxFuture<'static, CallSession> + Send>;

/// Typed on-terminate callback list with one-shot semantics.
///
/// Hooks run in registration order, each taking the call state and handing
/// it to the next. A fired flag guarantees the list runs at most once, so
/// worker-initiated and agent-initiated termination converge on a single
/// teardown pass. Hooks must tolerate state whose upstream resources
/// (recording, session) were never created.
pub struct TerminationHooks {
    hooks: Vec<Hook>,
    fired: bool,
}

impl TerminationHooks {
    pub fn new() -> Self {
        Self {
            hooks: Vec::new(),
            fired: false,
        }
    }

    pub fn register<F, Fut>(&mut self, hook: F)
    where
        F: FnOnce(CallSession) -> Fut + Send + 'static,
        Fut: Future<Output = CallSession> + Send + 'static,
    {
        self.hooks.push(Box::new(move |session| {
            let fut: BoxFuture<'static, CallSession> = Box::pin(hook(session));
            fut
        }));
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Run all registered hooks once, in order. Subsequent calls return
    /// the state untouched.
    pub async fn fire(&mut self, mut session: CallSession) -> CallSession {
        if std::mem::replace(&mut self.fired, true) {
            debug!("Termination hooks already fired");
            return session;
        }

        for hook in self.hooks.drain(..) {
            session = hook(session).await;
        }

        session
    }
}

impl Default for TerminationHooks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_hooks_run_in_registration_order() {
        let mut hooks = TerminationHooks::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            hooks.register(move |session| async move {
                order.lock().unwrap().push(label);
                session
            });
        }

        hooks.fire(CallSession::new("call-test")).await;
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_hooks_fire_at_most_once() {
        let mut hooks = TerminationHooks::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        hooks.register(move |session| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            session
        });

        let session = hooks.fire(CallSession::new("call-test")).await;
        let session = hooks.fire(session).await;
        hooks.fire(session).await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(hooks.has_fired());
    }

    #[tokio::test]
    async fn test_hooks_thread_session_state_through() {
        let mut hooks = TerminationHooks::new();

        hooks.register(|mut session| async move {
            session.recording_id = Some("EG_test".to_string());
            session
        });

        let session = hooks.fire(CallSession::new("call-test")).await;
        assert_eq!(session.recording_id.as_deref(), Some("EG_test"));
    }
}

//! # Debouncer
//!
//! Runs a task only after its input has gone quiet.
//!
//! ## Timeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  keystroke  a     ab    abc                                            │
//! │             │     │     │                                              │
//! │  pending    [──x  [──x  [──────────]                                   │
//! │                   abort abort      ▼                                   │
//! │                                    run("abc")                          │
//! │                                                                         │
//! │  Each call aborts the pending task and spawns a fresh one, so at most  │
//! │  one task is ever waiting and stale input never runs.                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `task` after the delay, dropping any task still waiting.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn call<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            trace!("Debounced call superseded");
        }
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Aborts the waiting task. Returns true if one was still pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the scheduled task, if any, to run to completion.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.pending.take() {
            // An aborted task reports a JoinError; nothing to surface.
            let _ = handle.await;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn push(log: &Log, term: &str) -> impl Future<Output = ()> + Send + 'static {
        let log = log.clone();
        let term = term.to_string();
        async move { log.lock().unwrap().push(term) }
    }

    #[tokio::test]
    async fn test_only_last_input_runs() {
        tokio::time::pause();
        let log = Log::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(250));

        for term in ["a", "ab", "abc"] {
            debouncer.call(push(&log, term));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(log.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*log.lock().unwrap(), vec!["abc".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test]
    async fn test_separate_bursts_each_run() {
        tokio::time::pause();
        let log = Log::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(250));

        debouncer.call(push(&log, "rice"));
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.call(push(&log, "tea"));
        debouncer.settle().await;

        assert_eq!(*log.lock().unwrap(), vec!["rice".to_string(), "tea".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel() {
        tokio::time::pause();
        let log = Log::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(250));

        debouncer.call(push(&log, "x"));
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(log.lock().unwrap().is_empty());
    }
}

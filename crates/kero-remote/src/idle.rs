//! # Idle Watchdog
//!
//! Fires once after a period with no activity. Each `touch` restarts the
//! countdown; the expiry action (drop the session, send the operator to
//! `/login/?reason=idle`) is supplied by the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::debounce::Debouncer;

pub struct IdleWatchdog<F> {
    timer: Debouncer,
    on_expire: Arc<F>,
}

impl<F, Fut> IdleWatchdog<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    /// Starts the countdown immediately.
    pub fn start(timeout: Duration, on_expire: F) -> Self {
        let mut watchdog = IdleWatchdog {
            timer: Debouncer::new(timeout),
            on_expire: Arc::new(on_expire),
        };
        watchdog.touch();
        watchdog
    }

    /// Records activity.
    pub fn touch(&mut self) {
        let on_expire = self.on_expire.clone();
        let timeout = self.timer.delay();
        self.timer.call(async move {
            info!(idle_secs = timeout.as_secs(), "Idle timeout reached");
            on_expire().await;
        });
    }

    /// Stops watching. Returns true if the countdown had not yet fired.
    pub fn stop(&mut self) -> bool {
        self.timer.cancel()
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn timeout(&self) -> Duration {
        self.timer.delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (Arc<AtomicUsize>, impl Fn() -> std::future::Ready<()> + Send + Sync + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        (fired, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        })
    }

    #[tokio::test]
    async fn test_activity_keeps_session_alive() {
        tokio::time::pause();
        let (fired, on_expire) = counting();
        let mut watchdog = IdleWatchdog::start(Duration::from_secs(15 * 60), on_expire);

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_secs(10 * 60)).await;
            watchdog.touch();
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(watchdog.is_armed());

        tokio::time::sleep(Duration::from_secs(15 * 60 + 1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!watchdog.is_armed());
    }

    #[tokio::test]
    async fn test_stop() {
        tokio::time::pause();
        let (fired, on_expire) = counting();
        let mut watchdog = IdleWatchdog::start(Duration::from_secs(60), on_expire);

        assert!(watchdog.stop());
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}

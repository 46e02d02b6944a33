use super::{RateLimitHub, RateLimitInfo, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Per-consumer view of the shared limiting state.
///
/// Each watch subscribes to the hub and projects incoming notifications into
/// its own local state cell. A notification that carries a known wait arms a
/// one-shot timer; when it fires the state is forced back to baseline. Every
/// watch on the same hub sees every notification, so one caller's 429 can
/// disable another caller's controls. That broadcast is intentional.
pub struct RateLimitWatch {
    state: Arc<Mutex<RateLimitInfo>>,
    epoch: Arc<AtomicU64>,
    _subscription: Subscription,
}

impl RateLimitWatch {
    /// Subscribe to the hub. Expiry timers are spawned tasks, so the watch
    /// must be created inside a tokio runtime.
    pub fn new(hub: &RateLimitHub) -> Self {
        let state = Arc::new(Mutex::new(RateLimitInfo::baseline()));
        let epoch = Arc::new(AtomicU64::new(0));
        let subscription = hub.subscribe({
            let state = Arc::clone(&state);
            let epoch = Arc::clone(&epoch);
            move |info| {
                *state.lock().unwrap() = info.clone();
                // Each notification starts a new episode; older timers are stale.
                let armed = epoch.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(secs) = info.retry_after {
                    let state = Arc::clone(&state);
                    let epoch = Arc::clone(&epoch);
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_secs(secs)).await;
                        if epoch.load(Ordering::SeqCst) == armed {
                            *state.lock().unwrap() = RateLimitInfo::baseline();
                        }
                    });
                }
            }
        });
        Self {
            state,
            epoch,
            _subscription: subscription,
        }
    }

    pub fn current(&self) -> RateLimitInfo {
        self.state.lock().unwrap().clone()
    }

    pub fn is_limited(&self) -> bool {
        self.state.lock().unwrap().is_limited
    }

    /// Force the state back to baseline immediately. Idempotent; an in-flight
    /// expiry timer becomes a no-op.
    pub fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = RateLimitInfo::baseline();
    }
}

impl Drop for RateLimitWatch {
    fn drop(&mut self) {
        // The subscription guard unregisters; the bump strands any timer
        // still in flight so nothing mutates state after teardown.
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Let freshly spawned timer tasks register before the jump, then let
    // them observe the new time.
    async fn advance(secs: u64) {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        tokio::time::advance(Duration::from_secs(secs)).await;
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn notification_sets_state_and_expires() {
        let hub = RateLimitHub::new();
        let watch = RateLimitWatch::new(&hub);
        assert!(!watch.is_limited());

        hub.notify(Some(2));
        let info = watch.current();
        assert!(info.is_limited);
        assert_eq!(info.retry_after, Some(2));

        advance(1).await;
        assert!(watch.is_limited());
        advance(1).await;
        assert_eq!(watch.current(), RateLimitInfo::baseline());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_wait_stays_limited_until_reset() {
        let hub = RateLimitHub::new();
        let watch = RateLimitWatch::new(&hub);
        hub.notify(None);
        advance(60).await;
        assert!(watch.is_limited());
        watch.reset();
        assert_eq!(watch.current(), RateLimitInfo::baseline());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_on_baseline_is_a_no_op() {
        let hub = RateLimitHub::new();
        let watch = RateLimitWatch::new(&hub);
        watch.reset();
        assert_eq!(watch.current(), RateLimitInfo::baseline());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_clobber_newer_state() {
        let hub = RateLimitHub::new();
        let watch = RateLimitWatch::new(&hub);

        hub.notify(Some(2));
        watch.reset();
        assert!(!watch.is_limited());

        // A fresh episode with no known wait; the stranded 2s timer from the
        // first episode must not clear it.
        hub.notify(None);
        advance(5).await;
        assert!(watch.is_limited());
    }

    #[tokio::test(start_paused = true)]
    async fn broadcast_reaches_every_watch() {
        let hub = RateLimitHub::new();
        let a = RateLimitWatch::new(&hub);
        let b = RateLimitWatch::new(&hub);

        hub.notify(Some(7));
        assert_eq!(a.current(), b.current());
        assert_eq!(a.current().retry_after, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_watch_unsubscribes() {
        let hub = RateLimitHub::new();
        let watch = RateLimitWatch::new(&hub);
        assert_eq!(hub.observer_count(), 1);
        drop(watch);
        assert_eq!(hub.observer_count(), 0);
        // No registered observers left; fan-out is a no-op.
        hub.notify(Some(1));
    }
}

use log::warn;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

pub mod watch;

pub use watch::RateLimitWatch;

/// One snapshot of limiting status, delivered to observers when the
/// interceptor classifies a 429 response.
///
/// `retry_after` is the server-declared wait in seconds at the moment of
/// notification; it is a fixed value, not a live countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub is_limited: bool,
    pub retry_after: Option<u64>,
    pub message: String,
}

impl RateLimitInfo {
    /// The "not limited" resting state.
    pub fn baseline() -> Self {
        Self {
            is_limited: false,
            retry_after: None,
            message: String::new(),
        }
    }

    pub fn limited(retry_after: Option<u64>) -> Self {
        let message = match retry_after {
            Some(secs) => format!("Request limit exceeded. Wait {} seconds.", secs),
            None => "Request limit exceeded. Please wait.".to_string(),
        };
        Self {
            is_limited: true,
            retry_after,
            message,
        }
    }
}

type Observer = Arc<dyn Fn(&RateLimitInfo) + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    observers: Vec<(u64, Observer)>,
}

/// Shared broadcast source for rate-limit notifications.
///
/// Cheap to clone; every clone refers to the same ordered observer list.
/// Construct one hub per process and hand it to every consumer that issues
/// requests or watches limiting state.
#[derive(Clone, Default)]
pub struct RateLimitHub {
    inner: Arc<Mutex<HubInner>>,
}

impl RateLimitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer. No deduplication: the same closure subscribed
    /// twice is notified twice. The returned guard removes exactly this
    /// entry when dropped.
    pub fn subscribe(
        &self,
        observer: impl Fn(&RateLimitInfo) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.observers.push((id, Arc::new(observer)));
        Subscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().unwrap().observers.len()
    }

    /// Broadcast one limiting snapshot to every observer, in subscription
    /// order, and return the snapshot. Normally driven by the interceptor
    /// when it classifies a 429. Observers run outside the registry lock; a
    /// panicking observer is logged and does not stop delivery to the rest.
    pub fn notify(&self, retry_after: Option<u64>) -> RateLimitInfo {
        let info = RateLimitInfo::limited(retry_after);
        let snapshot: Vec<Observer> = {
            let inner = self.inner.lock().unwrap();
            inner.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
        };
        for observer in snapshot {
            if catch_unwind(AssertUnwindSafe(|| observer(&info))).is_err() {
                warn!("rate-limit observer panicked; continuing fan-out");
            }
        }
        info
    }
}

/// Scoped registration handle. Dropping it unsubscribes the observer;
/// the relative order of the remaining observers is preserved.
pub struct Subscription {
    hub: Weak<Mutex<HubInner>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            if let Ok(mut inner) = hub.lock() {
                inner.observers.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

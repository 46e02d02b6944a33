use crate::limit::RateLimitInfo;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Presentation state for one limiting episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeState {
    Hidden,
    Visible { remaining: Option<u64> },
}

type CloseFn = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    state: NoticeState,
    epoch: u64,
    on_close: CloseFn,
}

/// Self-expiring countdown notice.
///
/// When shown with a known wait it ticks its own one-second timer, counting
/// the displayed value down; at zero it hides itself and fires the close
/// callback exactly once. The ticker is deliberately independent of the
/// watch's expiry timer, so the two can drift by up to a second relative to
/// each other. Callers that hide the notice because the watch already reset
/// must use [`hide`](Self::hide), which cancels the ticker without firing
/// the callback.
pub struct CountdownNotice {
    inner: Arc<Mutex<Inner>>,
}

impl CountdownNotice {
    pub fn new(on_close: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: NoticeState::Hidden,
                epoch: 0,
                on_close: Arc::new(on_close),
            })),
        }
    }

    pub fn state(&self) -> NoticeState {
        self.inner.lock().unwrap().state.clone()
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state(), NoticeState::Visible { .. })
    }

    /// Seconds left on the displayed countdown, if one is running.
    pub fn remaining(&self) -> Option<u64> {
        match self.state() {
            NoticeState::Visible { remaining } => remaining,
            NoticeState::Hidden => None,
        }
    }

    /// Make the notice visible for one limiting episode. With a known wait a
    /// one-second ticker is spawned, so this must run inside a tokio runtime.
    /// Without one the notice shows the message only and stays until
    /// dismissed or hidden.
    pub fn show(&self, info: &RateLimitInfo) {
        let armed = {
            let mut inner = self.inner.lock().unwrap();
            inner.state = NoticeState::Visible {
                remaining: info.retry_after,
            };
            inner.epoch += 1;
            inner.epoch
        };
        if info.retry_after.is_some() {
            let shared = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(Duration::from_secs(1));
                // The first interval tick completes immediately.
                tick.tick().await;
                loop {
                    tick.tick().await;
                    if !Self::step(&shared, armed) {
                        break;
                    }
                }
            });
        }
    }

    /// Explicit user dismissal. Hides the notice and fires the close
    /// callback; a no-op when already hidden.
    pub fn dismiss(&self) {
        let close = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state == NoticeState::Hidden {
                return;
            }
            inner.state = NoticeState::Hidden;
            inner.epoch += 1;
            Arc::clone(&inner.on_close)
        };
        close();
    }

    /// External visibility flip: hide without firing the close callback and
    /// cancel the ticker so no stray callback lands later.
    pub fn hide(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = NoticeState::Hidden;
        inner.epoch += 1;
    }

    // One ticker step. Returns false when the ticker should stop: the
    // episode it was armed for is over, or the countdown just finished.
    fn step(shared: &Arc<Mutex<Inner>>, armed: u64) -> bool {
        let close = {
            let mut inner = shared.lock().unwrap();
            if inner.epoch != armed {
                return false;
            }
            match inner.state {
                NoticeState::Visible {
                    remaining: Some(n),
                } if n > 1 => {
                    inner.state = NoticeState::Visible {
                        remaining: Some(n - 1),
                    };
                    return true;
                }
                NoticeState::Visible { remaining: Some(_) } => {
                    inner.state = NoticeState::Hidden;
                    inner.epoch += 1;
                    Arc::clone(&inner.on_close)
                }
                _ => return false,
            }
        };
        close();
        false
    }
}

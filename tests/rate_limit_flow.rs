// End-to-end timing behavior of the watch + notice pair, driven on a paused
// tokio clock.

use docqa_client::limit::{RateLimitHub, RateLimitInfo, RateLimitWatch};
use docqa_client::notice::{CountdownNotice, NoticeState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Let freshly spawned timer tasks register before the jump, then let them
// observe the new time.
async fn advance(secs: u64) {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    tokio::time::advance(Duration::from_secs(secs)).await;
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

fn counting_notice() -> (CountdownNotice, Arc<AtomicUsize>) {
    let closes = Arc::new(AtomicUsize::new(0));
    let notice = CountdownNotice::new({
        let closes = Arc::clone(&closes);
        move || {
            closes.fetch_add(1, Ordering::SeqCst);
        }
    });
    (notice, closes)
}

#[tokio::test(start_paused = true)]
async fn full_episode_expires_both_timers_and_closes_once() {
    let hub = RateLimitHub::new();
    let watch = RateLimitWatch::new(&hub);
    let (notice, closes) = counting_notice();

    hub.notify(Some(5));
    let info = watch.current();
    assert!(info.is_limited);
    assert_eq!(info.retry_after, Some(5));
    assert!(info.message.contains("5"));

    notice.show(&info);
    assert_eq!(notice.remaining(), Some(5));

    advance(5).await;
    assert_eq!(watch.current(), RateLimitInfo::baseline());
    assert_eq!(notice.state(), NoticeState::Hidden);
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    advance(10).await;
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn watch_expiry_can_lead_the_presentation_tick() {
    let hub = RateLimitHub::new();
    let watch = RateLimitWatch::new(&hub);
    let (notice, closes) = counting_notice();

    // The watch timer and the notice ticker approximate the same wait
    // independently; give the notice the longer view of it so the watch
    // demonstrably expires first.
    hub.notify(Some(2));
    notice.show(&RateLimitInfo::limited(Some(3)));

    advance(2).await;
    assert_eq!(watch.current(), RateLimitInfo::baseline());
    assert_eq!(
        notice.state(),
        NoticeState::Visible { remaining: Some(1) }
    );

    // The caller reflects the watch baseline by flipping visibility off;
    // that path must not fire the close callback.
    notice.hide();
    advance(5).await;
    assert_eq!(notice.state(), NoticeState::Hidden);
    assert_eq!(closes.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn unknown_wait_episode_persists_until_dismissed() {
    let hub = RateLimitHub::new();
    let watch = RateLimitWatch::new(&hub);
    let (notice, closes) = counting_notice();

    hub.notify(None);
    let info = watch.current();
    assert_eq!(info.retry_after, None);

    notice.show(&info);
    advance(300).await;
    assert!(watch.is_limited());
    assert!(notice.is_visible());
    assert_eq!(notice.remaining(), None);

    notice.dismiss();
    watch.reset();
    assert_eq!(notice.state(), NoticeState::Hidden);
    assert_eq!(watch.current(), RateLimitInfo::baseline());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

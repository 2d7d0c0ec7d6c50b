use grocer_cart::{CancelToken, Scheduler, TokioScheduler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn counting_task(counter: &Arc<AtomicUsize>) -> Box<dyn FnOnce() + Send> {
    let counter = counter.clone();
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test(start_paused = true)]
async fn armed_task_runs_after_delay() {
    let fired = Arc::new(AtomicUsize::new(0));
    let token = TokioScheduler::current().arm(Duration::from_millis(2_000), counting_task(&fired));

    tokio::time::sleep(Duration::from_millis(1_999)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(!token.is_finished());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(token.is_finished());
}

#[tokio::test(start_paused = true)]
async fn zero_delay_runs_on_next_tick_not_inline() {
    let fired = Arc::new(AtomicUsize::new(0));
    let _token = TokioScheduler::current().arm(Duration::ZERO, counting_task(&fired));

    assert_eq!(fired.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_task_never_runs() {
    let fired = Arc::new(AtomicUsize::new(0));
    let token = TokioScheduler::current().arm(Duration::from_millis(500), counting_task(&fired));

    tokio::time::sleep(Duration::from_millis(100)).await;
    token.cancel();

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(token.is_finished());
}

#[tokio::test(start_paused = true)]
async fn cancel_after_fire_is_harmless() {
    let fired = Arc::new(AtomicUsize::new(0));
    let token = TokioScheduler::current().arm(Duration::from_millis(10), counting_task(&fired));

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn noop_token_reports_finished() {
    let token = CancelToken::noop();
    token.cancel();
    assert!(token.is_finished());
    assert!(format!("{token:?}").contains("finished: true"));
}

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tomb::{Phase, Signal, TaskError, TaskResult, Tomb};

const LIMIT: Duration = Duration::from_secs(5);

type BoxTask = Pin<Box<dyn Future<Output = TaskResult> + Send>>;

/// Runs until the tomb starts dying, then acknowledges the stop.
async fn until_dying(dying: Signal) -> TaskResult {
    dying.fired().await;
    Err(TaskError::Dying)
}

async fn finish(outcome: TaskResult) -> TaskResult {
    outcome
}

async fn explode() -> TaskResult {
    panic!("task blew up")
}

/// Finishes once `release` is sent (or dropped) with the given outcome.
async fn gated(release: oneshot::Receiver<()>, outcome: TaskResult) -> TaskResult {
    let _ = release.await;
    outcome
}

#[tokio::test]
async fn test_single_clean_task() {
    let tomb = Tomb::new();
    tomb.go(async { Ok(()) });

    let reason = timeout(LIMIT, tomb.wait()).await.expect("tomb never died");
    assert!(reason.is_ok());
    assert!(tomb.dying().is_fired());
    assert!(tomb.dead().is_fired());
    assert_eq!(tomb.phase(), Phase::Dead);
    assert_eq!(tomb.live_tasks(), 0);
}

#[tokio::test]
async fn test_last_clean_exit_fires_dying_before_dead() {
    let tomb = Tomb::new();
    let (release, gate) = oneshot::channel();
    tomb.go(gated(gate, Ok(())));
    assert!(tomb.alive());

    // Nobody calls kill: the last clean exit still moves through dying.
    let dying = tomb.dying();
    let dead_watcher = {
        let (dead, dying) = (tomb.dead(), dying.clone());
        tokio::spawn(async move {
            dead.fired().await;
            dying.is_fired()
        })
    };

    release.send(()).unwrap();
    let dying_when_dead = timeout(LIMIT, dead_watcher).await.unwrap().unwrap();
    assert!(dying_when_dead, "dead fired before dying");
    assert!(dying.is_fired());
    assert!(tomb.wait().await.is_ok());
}

#[tokio::test]
async fn test_failure_kills_but_dead_waits_for_all() {
    let tomb = Tomb::new();
    let (release_b, gate_b) = oneshot::channel();
    let (release_c, gate_c) = oneshot::channel();
    let tasks: Vec<BoxTask> = vec![
        Box::pin(finish(Err(TaskError::msg("disk full")))),
        Box::pin(gated(gate_b, Err(TaskError::Dying))),
        Box::pin(gated(gate_c, Err(TaskError::Dying))),
    ];
    tomb.go_all(tasks);

    timeout(LIMIT, tomb.dying().fired()).await.unwrap();
    assert!(!tomb.alive());
    assert!(!tomb.dead().is_fired(), "dead fired with two tasks still running");
    assert_eq!(tomb.live_tasks(), 2);

    // One acknowledgement in, one still running.
    release_b.send(()).unwrap();
    timeout(LIMIT, async {
        while tomb.live_tasks() > 1 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    assert!(!tomb.dead().is_fired(), "dead fired with a task still running");
    assert_eq!(tomb.phase(), Phase::Dying);

    release_c.send(()).unwrap();
    let reason = timeout(LIMIT, tomb.wait()).await.unwrap();
    assert_eq!(reason.unwrap_err().to_string(), "disk full");
    assert_eq!(tomb.live_tasks(), 0);
}

#[tokio::test]
async fn test_external_kill_preempts_clean_exit() {
    let tomb = Tomb::new();
    let dying = tomb.dying();
    tomb.go(async move {
        // Loop reporting no error until asked to stop, then exit cleanly.
        while !dying.is_fired() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(())
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(tomb.alive());
    tomb.kill(Some(TaskError::msg("shutdown")));

    let reason = timeout(LIMIT, tomb.wait()).await.unwrap();
    assert_eq!(reason.unwrap_err().to_string(), "shutdown");
}

#[tokio::test]
async fn test_clean_kill_waits_for_tasks() {
    let tomb = Tomb::new();
    tomb.go_all([until_dying(tomb.dying()), until_dying(tomb.dying())]);
    assert_eq!(tomb.live_tasks(), 2);

    tomb.kill(None);
    let reason = timeout(LIMIT, tomb.wait()).await.unwrap();
    assert!(reason.is_ok());
    assert_eq!(tomb.live_tasks(), 0);
}

#[tokio::test]
async fn test_batch_registration_counts_every_task_first() {
    let tomb = Tomb::new();
    let ran = Arc::new(AtomicUsize::new(0));

    // Every task finishes immediately; none may see the tomb dead before its siblings run.
    let tasks = (0..16).map(|_| {
        let ran = ran.clone();
        async move {
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    tomb.go_all(tasks);

    assert!(timeout(LIMIT, tomb.wait()).await.unwrap().is_ok());
    assert_eq!(ran.load(Ordering::SeqCst), 16);
}

#[tokio::test]
async fn test_empty_batch_is_a_no_op() {
    let tomb = Tomb::new();
    tomb.go_all(Vec::<BoxTask>::new());
    assert!(tomb.alive());
    assert_eq!(tomb.live_tasks(), 0);

    tomb.done();
    assert!(tomb.wait().await.is_ok());
}

#[tokio::test]
async fn test_reentrant_registration_keeps_tomb_alive() {
    let tomb = Tomb::new();
    let (release, gate) = oneshot::channel();
    let (started_tx, started) = oneshot::channel();

    let parent_tomb = tomb.clone();
    tomb.go(async move {
        // Register a child before returning, so the parent isn't the last one out.
        parent_tomb.go(async move {
            let _ = started_tx.send(());
            gated(gate, Ok(())).await
        });
        Ok(())
    });

    timeout(LIMIT, started).await.unwrap().unwrap();
    assert!(tomb.alive(), "parent exit must not kill the tomb while the child runs");
    assert_eq!(tomb.live_tasks(), 1);

    release.send(()).unwrap();
    assert!(timeout(LIMIT, tomb.wait()).await.unwrap().is_ok());
}

#[tokio::test]
async fn test_go_after_dead_never_runs() {
    let tomb = Tomb::new();
    tomb.done();

    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    tomb.go(async move {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    });
    let flag = ran.clone();
    tomb.go_blocking(move || {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(tomb.live_tasks(), 0);
    assert!(tomb.wait().await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_go_blocking() {
    let tomb = Tomb::new();
    let dying = tomb.dying();
    tomb.go_blocking(move || {
        dying.wait_blocking();
        Err(TaskError::Dying)
    });
    tomb.go_blocking(|| Err(TaskError::msg("blocking failure")));

    let reason = timeout(LIMIT, tomb.wait()).await.unwrap();
    assert_eq!(reason.unwrap_err().to_string(), "blocking failure");
}

#[tokio::test]
async fn test_panicking_task_is_recorded_as_failure() {
    let tomb = Tomb::new();
    tomb.go(explode());

    let reason = timeout(LIMIT, tomb.wait()).await.unwrap();
    assert_eq!(
        reason.unwrap_err().to_string(),
        "tomb: task panicked or was cancelled"
    );
}

#[tokio::test]
async fn test_dying_returned_while_alive_is_recorded_as_failure() {
    let tomb = Tomb::new();
    let (release, gate) = oneshot::channel::<()>();
    let tasks: Vec<BoxTask> = vec![
        Box::pin(finish(Err(TaskError::Dying))),
        Box::pin(gated(gate, Err(TaskError::Dying))),
    ];
    tomb.go_all(tasks);

    // The first task breaks the contract; its panic is reaped as a failure.
    timeout(LIMIT, tomb.dying().fired()).await.unwrap();
    drop(release);
    let reason = timeout(LIMIT, tomb.wait()).await.unwrap();
    assert_eq!(
        reason.unwrap_err().to_string(),
        "tomb: task panicked or was cancelled"
    );
}

#[test]
fn test_configured_handle_spawns_outside_runtime_context() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();

    let tomb = Tomb::builder()
        .name("detached")
        .handle(runtime.handle().clone())
        .build();

    // Called from a plain thread: tasks go to the configured runtime.
    tomb.go(finish(Err(TaskError::msg("from runtime"))));
    let reason = tomb.wait_blocking();
    assert_eq!(reason.unwrap_err().to_string(), "from runtime");
}

#[tokio::test]
async fn test_wait_races_external_timeout() {
    let tomb = Tomb::new();
    tomb.go(until_dying(tomb.dying()));

    // Nobody kills the tomb, so the caller's own timeout gives up first.
    assert!(timeout(Duration::from_millis(30), tomb.wait()).await.is_err());
    assert!(tomb.alive());

    tomb.kill(None);
    assert!(timeout(LIMIT, tomb.wait()).await.unwrap().is_ok());
}

#[test]
fn test_registration_outside_runtime_leaves_tomb_untouched() {
    let tomb = Tomb::new();

    // No runtime and no configured handle: spawning panics before anything is counted.
    let batch = std::panic::catch_unwind(AssertUnwindSafe(|| {
        tomb.go_all([finish(Ok(())), finish(Ok(())), finish(Ok(()))])
    }));
    assert!(batch.is_err());
    let blocking = std::panic::catch_unwind(AssertUnwindSafe(|| tomb.go_blocking(|| Ok(()))));
    assert!(blocking.is_err());

    assert!(tomb.alive());
    assert_eq!(tomb.phase(), Phase::Running);
    assert_eq!(tomb.live_tasks(), 0);
    assert!(!tomb.dying().is_fired());

    tomb.done();
    assert!(tomb.wait_blocking().is_ok());
}

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::pin;

use futures_util::{stream, FutureExt, StreamExt};

/// A task that did not produce a value: its worker returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("task {index} failed: {message}")]
pub struct TaskFailure {
    pub index: usize,
    pub message: String,
}

/// Run `worker` over `tasks` with at most `limit` invocations in flight.
///
/// A queued task starts as soon as any running one finishes, so a slow task
/// only holds its own slot. The result at position `i` always belongs to
/// `tasks[i]`. A failing or panicking worker only affects its own slot.
/// `limit` is clamped to at least 1.
pub async fn run_bounded<T, R, E, F, Fut>(
    tasks: Vec<T>,
    limit: usize,
    worker: F,
) -> Vec<Result<R, TaskFailure>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Display,
{
    if tasks.is_empty() {
        return Vec::new();
    }

    let count = tasks.len();
    let worker = &worker;
    let completions = stream::iter(tasks.into_iter().enumerate())
        .map(move |(index, task)| async move {
            let outcome = match AssertUnwindSafe(async { worker(task).await })
                .catch_unwind()
                .await
            {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(TaskFailure {
                    index,
                    message: err.to_string(),
                }),
                Err(panic) => Err(TaskFailure {
                    index,
                    message: panic_message(panic.as_ref()),
                }),
            };
            (index, outcome)
        })
        .buffer_unordered(limit.max(1));
    let mut completions = pin!(completions);

    // Completion order drives scheduling; slots restore input order.
    let mut slots: Vec<Option<Result<R, TaskFailure>>> = (0..count).map(|_| None).collect();
    while let Some((index, outcome)) = completions.next().await {
        slots[index] = Some(outcome);
    }
    slots.into_iter().flatten().collect()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked".to_string()
    }
}

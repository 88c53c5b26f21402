//! Scheduler - Deferred work that runs after the current event turn.
//!
//! A task is a closure with a due instant. The mount loop calls `run_due`
//! after routing each event, so a task scheduled with `Duration::ZERO` runs
//! once the handler that scheduled it has returned and before the next frame.
//!
//! Tasks may carry a [`TaskKey`]. Scheduling under a key that already has a
//! pending task replaces that task, so at most one task per key is pending.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::state::scheduler::{self, TaskKey};
//!
//! let key = TaskKey::new(row_index, "advance");
//! scheduler::schedule_keyed(key, Duration::from_millis(10), move || {
//!     focus::focus(next_cell);
//! });
//!
//! // A newer request wins
//! scheduler::schedule_keyed(key, Duration::ZERO, move || { /* ... */ });
//!
//! // Unmount
//! scheduler::cancel_owner(row_index);
//! ```

use std::cell::RefCell;
use std::time::{Duration, Instant};

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Replacement key: the owning component index plus a channel name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub owner: usize,
    pub channel: &'static str,
}

impl TaskKey {
    pub const fn new(owner: usize, channel: &'static str) -> Self {
        Self { owner, channel }
    }
}

struct Task {
    id: TaskId,
    key: Option<TaskKey>,
    due: Instant,
    action: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Queue {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Queue {
    fn push(&mut self, key: Option<TaskKey>, due: Instant, action: Box<dyn FnOnce()>) -> TaskId {
        if let Some(key) = key {
            self.remove_key(key);
        }
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task { id, key, due, action });
        id
    }

    fn remove_key(&mut self, key: TaskKey) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.key != Some(key));
        before != self.tasks.len()
    }

    /// Remove every task due at `now`, oldest deadline first.
    fn take_due(&mut self, now: Instant) -> Vec<Task> {
        let (mut due, pending): (Vec<Task>, Vec<Task>) =
            self.tasks.drain(..).partition(|task| task.due <= now);
        self.tasks = pending;
        due.sort_by_key(|task| (task.due, task.id));
        due
    }
}

thread_local! {
    static QUEUE: RefCell<Queue> = RefCell::new(Queue::default());
}

/// Upper bound on `flush` passes, for tasks that keep rescheduling themselves.
const MAX_FLUSH_ROUNDS: usize = 64;

// =============================================================================
// SCHEDULING
// =============================================================================

/// Run `action` once `delay` has passed.
pub fn schedule<F>(delay: Duration, action: F) -> TaskId
where
    F: FnOnce() + 'static,
{
    let due = Instant::now() + delay;
    let id = QUEUE.with(|q| q.borrow_mut().push(None, due, Box::new(action)));
    tracing::trace!(?id, ?delay, "task scheduled");
    id
}

/// Run `action` once `delay` has passed, replacing any task pending under `key`.
pub fn schedule_keyed<F>(key: TaskKey, delay: Duration, action: F) -> TaskId
where
    F: FnOnce() + 'static,
{
    let due = Instant::now() + delay;
    let id = QUEUE.with(|q| q.borrow_mut().push(Some(key), due, Box::new(action)));
    tracing::trace!(?id, owner = key.owner, channel = key.channel, ?delay, "keyed task scheduled");
    id
}

/// Cancel a task by id. Returns true if it was still pending.
pub fn cancel(id: TaskId) -> bool {
    let removed = QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        let before = q.tasks.len();
        q.tasks.retain(|task| task.id != id);
        before != q.tasks.len()
    });
    if removed {
        tracing::trace!(?id, "task cancelled");
    }
    removed
}

/// Cancel the task pending under `key`. Returns true if there was one.
pub fn cancel_key(key: TaskKey) -> bool {
    let removed = QUEUE.with(|q| q.borrow_mut().remove_key(key));
    if removed {
        tracing::trace!(owner = key.owner, channel = key.channel, "keyed task cancelled");
    }
    removed
}

/// Cancel every keyed task belonging to `owner`. Returns how many were dropped.
pub fn cancel_owner(owner: usize) -> usize {
    QUEUE.with(|q| {
        let mut q = q.borrow_mut();
        let before = q.tasks.len();
        q.tasks
            .retain(|task| task.key.is_none_or(|key| key.owner != owner));
        before - q.tasks.len()
    })
}

// =============================================================================
// RUNNING
// =============================================================================

/// Run every task whose deadline has passed. Returns how many ran.
pub fn run_due() -> usize {
    run_due_at(Instant::now())
}

/// Run every task due at `now`.
///
/// Tasks scheduled by a running task are not run in the same pass.
pub fn run_due_at(now: Instant) -> usize {
    let due = QUEUE.with(|q| q.borrow_mut().take_due(now));
    let count = due.len();
    for task in due {
        tracing::trace!(id = ?task.id, "task running");
        (task.action)();
    }
    count
}

/// Run everything pending regardless of deadline, including tasks scheduled
/// while flushing. Returns how many ran.
pub fn flush() -> usize {
    let mut total = 0;
    for _ in 0..MAX_FLUSH_ROUNDS {
        let far = QUEUE.with(|q| q.borrow().tasks.iter().map(|task| task.due).max());
        let Some(far) = far else {
            break;
        };
        total += run_due_at(far);
    }
    total
}

// =============================================================================
// QUERIES
// =============================================================================

/// Number of pending tasks.
pub fn pending_count() -> usize {
    QUEUE.with(|q| q.borrow().tasks.len())
}

/// Whether a task is pending under `key`.
pub fn is_pending(key: TaskKey) -> bool {
    QUEUE.with(|q| q.borrow().tasks.iter().any(|task| task.key == Some(key)))
}

/// Earliest pending deadline.
pub fn next_deadline() -> Option<Instant> {
    QUEUE.with(|q| q.borrow().tasks.iter().map(|task| task.due).min())
}

/// Time from `now` until the earliest pending deadline (zero if overdue).
pub fn time_until_next(now: Instant) -> Option<Duration> {
    next_deadline().map(|due| due.saturating_duration_since(now))
}

/// Drop every pending task (for testing).
pub fn reset_scheduler() {
    QUEUE.with(|q| *q.borrow_mut() = Queue::default());
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |name: &'static str| -> Box<dyn FnOnce()> {
            let log = log_clone.clone();
            Box::new(move || log.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_zero_delay_runs_on_next_pass() {
        reset_scheduler();
        let (log, make) = recorder();

        schedule(Duration::ZERO, make("a"));
        assert_eq!(pending_count(), 1);
        assert!(log.borrow().is_empty());

        assert_eq!(run_due(), 1);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(pending_count(), 0);
    }

    #[test]
    fn test_not_due_yet() {
        reset_scheduler();
        let (log, make) = recorder();

        let now = Instant::now();
        schedule(Duration::from_secs(60), make("late"));
        assert_eq!(run_due_at(now), 0);
        assert!(log.borrow().is_empty());

        let wait = time_until_next(now).unwrap();
        assert!(wait > Duration::from_secs(59));

        assert_eq!(run_due_at(now + Duration::from_secs(61)), 1);
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    #[test]
    fn test_keyed_replaces_pending() {
        reset_scheduler();
        let (log, make) = recorder();
        let key = TaskKey::new(0, "advance");

        schedule_keyed(key, Duration::ZERO, make("first"));
        schedule_keyed(key, Duration::ZERO, make("second"));
        assert_eq!(pending_count(), 1);
        assert!(is_pending(key));

        flush();
        assert_eq!(*log.borrow(), vec!["second"]);
        assert!(!is_pending(key));
    }

    #[test]
    fn test_cancel_by_id_key_and_owner() {
        reset_scheduler();
        let (log, make) = recorder();

        let id = schedule(Duration::ZERO, make("by-id"));
        schedule_keyed(TaskKey::new(1, "a"), Duration::ZERO, make("by-key"));
        schedule_keyed(TaskKey::new(2, "a"), Duration::ZERO, make("owner-a"));
        schedule_keyed(TaskKey::new(2, "b"), Duration::ZERO, make("owner-b"));
        schedule(Duration::ZERO, make("kept"));

        assert!(cancel(id));
        assert!(!cancel(id));
        assert!(cancel_key(TaskKey::new(1, "a")));
        assert!(!cancel_key(TaskKey::new(1, "a")));
        assert_eq!(cancel_owner(2), 2);

        flush();
        assert_eq!(*log.borrow(), vec!["kept"]);
    }

    #[test]
    fn test_runs_in_deadline_order() {
        reset_scheduler();
        let (log, make) = recorder();

        schedule(Duration::from_millis(20), make("slow"));
        schedule(Duration::ZERO, make("fast"));

        flush();
        assert_eq!(*log.borrow(), vec!["fast", "slow"]);
    }

    #[test]
    fn test_task_may_schedule_more_work() {
        reset_scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));

        let outer_log = log.clone();
        schedule(Duration::ZERO, move || {
            outer_log.borrow_mut().push("outer");
            let inner_log = outer_log.clone();
            schedule(Duration::ZERO, move || inner_log.borrow_mut().push("inner"));
        });

        // Nested task waits for the following pass
        assert_eq!(run_due(), 1);
        assert_eq!(*log.borrow(), vec!["outer"]);
        assert_eq!(pending_count(), 1);

        assert_eq!(flush(), 1);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }
}

use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// Registry of running scan tasks.
///
/// A task is a member from the moment `spawn` is called until its future
/// completes, fails, panics or is aborted. Tasks may spawn further members;
/// `wait_idle` only returns once the registry is empty.
#[derive(Clone)]
pub struct TaskSet {
    inner: Arc<Inner>,
}

struct Inner {
    tasks: Mutex<HashMap<u64, Option<AbortHandle>>>,
    active: watch::Sender<usize>,
    next_id: AtomicU64,
    launched: AtomicUsize,
    failed: AtomicUsize,
    /// Set by `abort_all`; only changed while `tasks` is locked.
    closed: AtomicBool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub launched: usize,
    pub failed: usize,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<u64, Option<AbortHandle>>> {
        // A panicking task must not wedge the registry for everyone else
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Removes its task from the registry when dropped.
struct Membership {
    inner: Arc<Inner>,
    id: u64,
}

impl Drop for Membership {
    fn drop(&mut self) {
        let mut tasks = self.inner.lock();
        tasks.remove(&self.id);
        self.inner.active.send_replace(tasks.len());
    }
}

impl Default for TaskSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSet {
    pub fn new() -> Self {
        let (active, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                tasks: Mutex::new(HashMap::new()),
                active,
                next_id: AtomicU64::new(0),
                launched: AtomicUsize::new(0),
                failed: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Starts `fut` concurrently as a new member. Errors are logged and
    /// counted, never propagated to other members.
    ///
    /// Once `abort_all` has run the set is closed and `fut` is dropped unstarted.
    pub fn spawn<F>(&self, label: String, fut: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut tasks = self.inner.lock();
            if self.inner.closed.load(Ordering::SeqCst) {
                tracing::debug!("Task set closed, not starting {}", label);
                return;
            }
            tasks.insert(id, None);
            self.inner.active.send_replace(tasks.len());
        }
        self.inner.launched.fetch_add(1, Ordering::Relaxed);

        let membership = Membership {
            inner: Arc::clone(&self.inner),
            id,
        };
        let handle = tokio::spawn(async move {
            let membership = membership;
            if let Err(e) = fut.await {
                membership.inner.failed.fetch_add(1, Ordering::Relaxed);
                // The scan itself reports to the operator
                tracing::debug!("Task {} failed: {:#}", label, e);
            } else {
                tracing::debug!("Task {} finished", label);
            }
        });

        // The task may already be gone, in which case there is nothing to record.
        // If the set closed while it was starting, abort_all could not see it.
        let abort_now = {
            let mut tasks = self.inner.lock();
            match tasks.get_mut(&id) {
                Some(_) if self.inner.closed.load(Ordering::SeqCst) => true,
                Some(slot) => {
                    *slot = Some(handle.abort_handle());
                    false
                }
                None => false,
            }
        };
        if abort_now {
            handle.abort();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats {
            launched: self.inner.launched.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }

    /// Waits, without polling, until no member remains.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.active.subscribe();
        // The sender lives in `inner`, which we hold, so the channel cannot close
        let _ = rx.wait_for(|active| *active == 0).await;
    }

    /// Aborts every member and closes the set to new ones. Best effort: tasks
    /// stop at their next await point.
    pub fn abort_all(&self) {
        let handles: Vec<AbortHandle> = {
            let tasks = self.inner.lock();
            self.inner.closed.store(true, Ordering::SeqCst);
            tasks.values().flatten().cloned().collect()
        };
        for handle in handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_wait_idle_on_empty_set_returns() {
        let set = TaskSet::new();
        set.wait_idle().await;
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_covers_tasks_added_while_waiting() {
        let set = TaskSet::new();
        let child_done = Arc::new(AtomicBool::new(false));

        let spawner = set.clone();
        let flag = Arc::clone(&child_done);
        set.spawn("parent".to_string(), async move {
            sleep(Duration::from_millis(20)).await;
            spawner.spawn("child".to_string(), async move {
                sleep(Duration::from_millis(100)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            });
            Ok(())
        });

        set.wait_idle().await;
        assert!(child_done.load(Ordering::SeqCst));
        assert_eq!(set.len(), 0);
        assert_eq!(set.stats(), TaskStats { launched: 2, failed: 0 });
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_counted() {
        let set = TaskSet::new();
        let sibling_done = Arc::new(AtomicBool::new(false));

        set.spawn("broken".to_string(), async { anyhow::bail!("gobuster exited with status 1") });
        let flag = Arc::clone(&sibling_done);
        set.spawn("healthy".to_string(), async move {
            sleep(Duration::from_millis(10)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        set.wait_idle().await;
        assert!(sibling_done.load(Ordering::SeqCst));
        assert_eq!(set.stats(), TaskStats { launched: 2, failed: 1 });
    }

    #[tokio::test]
    async fn test_panicking_task_leaves_the_set() {
        let set = TaskSet::new();
        set.spawn("panics".to_string(), async { panic!("boom") });
        set.wait_idle().await;
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn test_abort_all_empties_the_set() {
        let set = TaskSet::new();
        for i in 0..3 {
            set.spawn(format!("sleeper-{}", i), async {
                sleep(Duration::from_secs(3600)).await;
                Ok(())
            });
        }
        assert_eq!(set.len(), 3);

        set.abort_all();
        tokio::time::timeout(Duration::from_secs(5), set.wait_idle())
            .await
            .expect("aborted tasks should leave the set");
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn test_closed_set_refuses_late_children() {
        let set = TaskSet::new();
        let child_ran = Arc::new(AtomicBool::new(false));

        let spawner = set.clone();
        let flag = Arc::clone(&child_ran);
        set.spawn("parent".to_string(), async move {
            sleep(Duration::from_millis(50)).await;
            spawner.spawn("late-child".to_string(), async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            });
            Ok(())
        });

        set.abort_all();
        set.spawn("after-shutdown".to_string(), async { Ok(()) });

        tokio::time::timeout(Duration::from_secs(5), set.wait_idle())
            .await
            .expect("aborted tasks should leave the set");
        sleep(Duration::from_millis(100)).await;
        assert!(!child_ran.load(Ordering::SeqCst));
        assert_eq!(set.len(), 0);
        assert_eq!(set.stats().launched, 1);
    }
}

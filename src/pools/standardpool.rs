// SPDX-License-Identifier: MIT

use crate::error::ConfigError;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

/// Trait defining a general task structure, with an execute method to be
/// implemented by each task.
pub trait Task {
    fn execute(&self);
}

/// Task implementation that represents a barrier synchronization point.
/// Each worker thread must reach the barrier before any are allowed to proceed.
struct BarrierTask {
    /// Count of arrivals and barrier condition.
    sync_point: Arc<(Mutex<usize>, Condvar)>,
    /// Number of participants (workers plus the caller) required to arrive.
    total_workers: usize,
}

impl Task for BarrierTask {
    fn execute(&self) {
        let (ref arrival_count, ref barrier_condvar) = *self.sync_point;
        let mut count_guard = lock_recovering(arrival_count);

        *count_guard += 1;

        // Last to arrive releases everyone else.
        if *count_guard == self.total_workers {
            barrier_condvar.notify_all();
            return;
        }

        while *count_guard != self.total_workers {
            count_guard = barrier_condvar
                .wait(count_guard)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// One member's share of a fork-join phase started by
/// [`StandardPool::run_team`].
struct TeamTask<F> {
    /// Index of this member within the team, in `0..team_size`.
    member: usize,
    job: Arc<F>,
}

impl<F> Task for TeamTask<F>
where
    F: Fn(usize) + Send + Sync,
{
    fn execute(&self) {
        (self.job)(self.member);
    }
}

/// Shared data structure for the pool, holding the task queue and a
/// shutdown flag.
struct SchedulerSharedData {
    /// Queue of tasks for worker threads.
    task_queue: VecDeque<Arc<dyn Task + Send + Sync>>,
    /// Flag to signal shutdown to worker threads.
    shutdown_flag: bool,
}

impl SchedulerSharedData {
    fn new() -> Self {
        SchedulerSharedData {
            task_queue: VecDeque::with_capacity(128),
            shutdown_flag: false,
        }
    }
}

/// Persistent pool of worker threads fed from a single FIFO task queue.
///
/// Besides plain task submission the pool offers a fork-join primitive,
/// [`run_team`](StandardPool::run_team), which hands one task to every worker
/// and waits on the barrier before returning.
pub struct StandardPool {
    /// Pool of worker threads.
    worker_threads: Vec<thread::JoinHandle<()>>,
    /// Shared data protected by a mutex.
    shared_data: Arc<Mutex<SchedulerSharedData>>,
    /// Condition variable to notify workers of new tasks or shutdown.
    task_available: Arc<Condvar>,
    /// Held for the whole of a team phase so that two phases never interleave
    /// their team and barrier tasks.
    team_phase: Mutex<()>,
}

impl StandardPool {
    /// Creates a new pool with the specified number of worker threads.
    ///
    /// A pool without workers could never pass a barrier, so zero is
    /// rejected.
    pub fn new(thread_count: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(thread_count)
            .map(StandardPool::spawn)
            .ok_or(ConfigError::ZeroWorkers)
    }

    /// Creates a pool sized to the hardware concurrency reported by the
    /// operating system, falling back to a single worker.
    pub fn with_available_parallelism() -> Self {
        StandardPool::spawn(
            thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        )
    }

    fn spawn(thread_count: NonZeroUsize) -> Self {
        let thread_count = thread_count.get();
        let mut pool = StandardPool {
            worker_threads: Vec::with_capacity(thread_count),
            shared_data: Arc::new(Mutex::new(SchedulerSharedData::new())),
            task_available: Arc::new(Condvar::new()),
            team_phase: Mutex::new(()),
        };

        // Spawn worker threads that wait for tasks to be added to the task
        // queue.
        for _ in 0..thread_count {
            let shared_data = pool.shared_data.clone();
            let task_condvar = pool.task_available.clone();
            pool.worker_threads.push(thread::spawn(move || loop {
                let task = {
                    let mut shared_data_guard = lock_recovering(&shared_data);

                    // Wait until there is a task to process or a shutdown
                    // signal.
                    while shared_data_guard.task_queue.is_empty()
                        && !shared_data_guard.shutdown_flag
                    {
                        shared_data_guard = task_condvar
                            .wait(shared_data_guard)
                            .unwrap_or_else(|e| e.into_inner());
                    }

                    match shared_data_guard.task_queue.pop_front() {
                        Some(task) => task,
                        None => break,
                    }
                };

                // Execute the task outside the lock scope. The task is dropped
                // before this worker can pick up its barrier task.
                task.execute();
            }));
        }

        tracing::debug!(workers = thread_count, "worker pool started");
        pool
    }

    /// Number of worker threads in the pool, i.e. the size of a team.
    pub fn team_size(&self) -> usize {
        self.worker_threads.len()
    }

    /// Adds a task to the pool's task queue and notifies one waiting
    /// worker thread.
    pub fn add_task(&self, task: Arc<dyn Task + Send + Sync>) {
        let mut shared_data_guard = lock_recovering(&self.shared_data);
        shared_data_guard.task_queue.push_back(task);
        self.task_available.notify_one();
    }

    /// Blocks until every task queued before this call has finished.
    pub fn barrier(&self) {
        let shared_sync_point = Arc::new((Mutex::new(0), Condvar::new()));
        let total_workers = self.worker_threads.len() + 1;

        for _ in 0..total_workers - 1 {
            self.add_task(Arc::new(BarrierTask {
                sync_point: shared_sync_point.clone(),
                total_workers,
            }));
        }

        // The caller is the last participant.
        let main_barrier_task = BarrierTask {
            sync_point: shared_sync_point,
            total_workers,
        };
        main_barrier_task.execute();
    }

    /// Runs `job` once for every team member `0..team_size()` and returns only
    /// after all of them have completed.
    ///
    /// The queue is FIFO and every worker takes exactly one barrier task, so
    /// the barrier cannot be passed while a team task is still running.
    pub fn run_team<F>(&self, job: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        let _phase = lock_recovering(&self.team_phase);
        let job = Arc::new(job);

        for member in 0..self.team_size() {
            self.add_task(Arc::new(TeamTask {
                member,
                job: job.clone(),
            }));
        }

        self.barrier();
    }
}

impl Drop for StandardPool {
    /// Signals the workers to shut down and joins them.
    fn drop(&mut self) {
        {
            let mut shared_data_guard = lock_recovering(&self.shared_data);
            shared_data_guard.shutdown_flag = true;
            self.task_available.notify_all();
        }

        for handler in self.worker_threads.drain(..) {
            let _ = handler.join();
        }
    }
}

/// Locks `mutex`, taking the data out of a poisoned lock instead of failing.
fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            mutex.clear_poison();
            poisoned.into_inner()
        }
    }
}

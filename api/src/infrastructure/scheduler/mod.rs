use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

mod jobs;

pub use jobs::PurgeExpiredSessions;

#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &'static str;
    fn interval(&self) -> Duration;
    async fn run(&self) -> anyhow::Result<()>;
}

/// Collects periodic jobs at startup and runs each on its own timer.
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<Arc<dyn ScheduledJob>>,
}

pub struct SchedulerHandle {
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job: Arc<dyn ScheduledJob>) -> &mut Self {
        self.jobs.push(job);
        self
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Spawns one loop per job. The first run happens one interval after start.
    pub fn start(self) -> SchedulerHandle {
        let handles = self
            .jobs
            .into_iter()
            .map(|job| {
                let name = job.name();
                let period = job.interval().max(Duration::from_millis(1));
                tracing::info!(job = name, interval_secs = period.as_secs_f64(), "cron_job_registered");
                let handle = tokio::spawn(async move {
                    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        ticker.tick().await;
                        if let Err(e) = job.run().await {
                            tracing::error!(job = name, error = ?e, "cron_job_failed");
                        }
                    }
                });
                (name, handle)
            })
            .collect();
        SchedulerHandle { handles }
    }
}

impl SchedulerHandle {
    pub fn job_names(&self) -> Vec<&'static str> {
        self.handles.iter().map(|(name, _)| *name).collect()
    }

    pub fn shutdown(self) {
        for (name, handle) in self.handles {
            handle.abort();
            tracing::debug!(job = name, "cron_job_stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        runs: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl ScheduledJob for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn interval(&self) -> Duration {
            Duration::from_secs(60)
        }

        async fn run(&self) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("job failure");
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failing_job_keeps_its_schedule() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register(Arc::new(Counting {
            runs: runs.clone(),
            fail: true,
        }));
        let handle = scheduler.start();
        assert_eq!(handle.job_names(), vec!["counting"]);

        // Ticks land at 60s, 120s and 180s.
        for secs in [61, 60, 60] {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tokio::task::yield_now().await;
        }
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        handle.shutdown();
    }
}

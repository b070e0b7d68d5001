use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::ActivityConfig;
use crate::db::Store;

const JOB_NAME: &str = "activity_retention";

/// Rows removed by one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub activities: u64,
    pub refresh_tokens: u64,
}

/// Deletes activities older than `days` and purges dead refresh tokens.
pub async fn run_retention(store: &Store, days: u32) -> Result<RetentionReport> {
    let activities = store.prune_activities(i64::from(days)).await?;
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let refresh_tokens = store.purge_refresh_tokens(&now).await?;

    Ok(RetentionReport {
        activities,
        refresh_tokens,
    })
}

pub struct Scheduler {
    store: Store,
    config: ActivityConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(store: Store, config: ActivityConfig) -> Self {
        Self {
            store,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Runs the retention job on its cron schedule until [`Scheduler::stop`] is called.
    pub async fn start(&self) -> Result<()> {
        if !self.config.retention_enabled {
            info!("Activity retention is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;

        let mut sched = JobScheduler::new().await?;

        let store = self.store.clone();
        let running = Arc::clone(&self.running);
        let days = self.config.retention_days;

        let job = Job::new_async(self.config.retention_cron.as_str(), move |_uuid, _lock| {
            let store = store.clone();
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                let start = std::time::Instant::now();
                info!(event = "job_started", job_name = JOB_NAME, retention_days = days, "Starting activity retention sweep");

                match run_retention(&store, days).await {
                    Ok(report) => info!(
                        event = "job_finished",
                        job_name = JOB_NAME,
                        activities_removed = report.activities,
                        refresh_tokens_removed = report.refresh_tokens,
                        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Activity retention sweep finished"
                    ),
                    Err(e) => error!(
                        event = "job_failed",
                        job_name = JOB_NAME,
                        error = %e,
                        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Activity retention sweep failed"
                    ),
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!(
            "Scheduler running with cron: {} (retention {} days)",
            self.config.retention_cron, days
        );

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }
}

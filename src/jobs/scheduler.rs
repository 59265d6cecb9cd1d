//! Wall-clock wiring between cron triggers and scrape jobs.
//!
//! Every trigger spawns its job independently, so different jobs may run
//! concurrently; overlapping runs of the same job are refused by the job's
//! own run guard. Each job also runs once right after registration.

use std::sync::Arc;

use chrono_tz::Tz;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use super::ScrapeJob;
use crate::error::ConfigError;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

/// 10:00, 10:20, 10:40 and 11:00, when the daily price is published
pub const DEFAULT_PRICE_CRONS: &[&str] = &[
    "0 0 10 * * *",
    "0 20 10 * * *",
    "0 40 10 * * *",
    "0 0 11 * * *",
];

pub const DEFAULT_NEWS_CRONS: &[&str] = &["0 0 */2 * * *"];

pub const DEFAULT_CHART_CRONS: &[&str] = &["0 */30 * * * *"];

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub timezone: Tz,
    pub price_crons: Vec<String>,
    pub news_crons: Vec<String>,
    pub chart_crons: Vec<String>,
    pub run_on_startup: bool,
}

pub fn owned_crons(crons: &[&str]) -> Vec<String> {
    crons.iter().map(|c| c.to_string()).collect()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            price_crons: owned_crons(DEFAULT_PRICE_CRONS),
            news_crons: owned_crons(DEFAULT_NEWS_CRONS),
            chart_crons: owned_crons(DEFAULT_CHART_CRONS),
            run_on_startup: true,
        }
    }
}

/// A job and the cron expressions that fire it.
pub struct ScheduledJob {
    pub job: Arc<dyn ScrapeJob>,
    pub crons: Vec<String>,
}

impl ScheduledJob {
    pub fn new(job: Arc<dyn ScrapeJob>, crons: Vec<String>) -> Self {
        Self { job, crons }
    }
}

fn scheduler_error(e: impl std::fmt::Debug) -> ConfigError {
    ConfigError::Scheduler(format!("{:?}", e))
}

/// Register all triggers, start the scheduler and kick off the startup runs.
///
/// The returned scheduler must be kept alive for the triggers to keep firing.
pub async fn start_scheduler(
    timezone: Tz,
    jobs: Vec<ScheduledJob>,
    run_on_startup: bool,
) -> Result<JobScheduler, ConfigError> {
    let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;

    for entry in &jobs {
        for cron in &entry.crons {
            let job = Arc::clone(&entry.job);
            let trigger = cron.clone();

            let scheduled = Job::new_async_tz(cron.as_str(), timezone, move |_uuid, _lock| {
                let job = Arc::clone(&job);
                let trigger = trigger.clone();
                Box::pin(async move {
                    info!(job = job.name(), trigger = %trigger, "Running scheduled scrape");
                    job.run().await;
                })
            })
            .map_err(|e| ConfigError::Scheduler(format!("{} ({}): {:?}", entry.job.name(), cron, e)))?;

            scheduler.add(scheduled).await.map_err(scheduler_error)?;
        }

        info!(
            job = entry.job.name(),
            triggers = ?entry.crons,
            timezone = %timezone,
            "Scrape job scheduled"
        );
    }

    scheduler.start().await.map_err(scheduler_error)?;

    if run_on_startup {
        for entry in &jobs {
            let job = Arc::clone(&entry.job);
            tokio::spawn(async move {
                info!(job = job.name(), "Running initial scrape");
                job.run().await;
            });
        }
    }

    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingJob(AtomicUsize);

    #[async_trait]
    impl ScrapeJob for CountingJob {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_default_schedule() {
        let config = ScheduleConfig::default();
        assert_eq!(config.timezone, chrono_tz::Asia::Seoul);
        assert_eq!(config.price_crons.len(), 4);
        assert!(config.run_on_startup);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_startup_run_fires_each_job_once() {
        let job = Arc::new(CountingJob(AtomicUsize::new(0)));
        // Far from now so the cron trigger itself cannot fire during the test
        let crons = vec!["0 0 0 1 1 *".to_string()];

        let mut scheduler = start_scheduler(
            DEFAULT_TIMEZONE,
            vec![ScheduledJob::new(job.clone(), crons)],
            true,
        )
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(job.0.load(Ordering::SeqCst), 1);

        let _ = scheduler.shutdown().await;
    }
}

pub mod chart_scraper;
pub mod news_scraper;
pub mod scheduler;
pub mod silver_price_scraper;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

/// Entry point the scheduler fires. Implementations log and swallow every
/// failure: a run never returns an error and never takes the scheduler down.
#[async_trait]
pub trait ScrapeJob: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self);
}

/// Held for the duration of one run of a job; a second run of the same job
/// is refused while it is alive.
pub struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    pub fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

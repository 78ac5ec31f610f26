use crate::api::JobBoardApi;
use crate::config::PollConfig;
use crate::model::{DateFilter, Job, ScrapeAck, ScrapeRequest};
use crate::ClientError;
use log::{debug, info, warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// How a scrape-and-wait run ended
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    /// The job count grew past the baseline while polling
    NewJobs { jobs: Vec<Job>, attempts: u32 },
    /// No growth was seen; `jobs` comes from one final fetch
    TimedOut { jobs: Vec<Job>, attempts: u32 },
}

impl ScrapeOutcome {
    pub fn jobs(&self) -> &[Job] {
        match self {
            ScrapeOutcome::NewJobs { jobs, .. } | ScrapeOutcome::TimedOut { jobs, .. } => jobs,
        }
    }

    pub fn into_jobs(self) -> Vec<Job> {
        match self {
            ScrapeOutcome::NewJobs { jobs, .. } | ScrapeOutcome::TimedOut { jobs, .. } => jobs,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ScrapeOutcome::NewJobs { attempts, .. } | ScrapeOutcome::TimedOut { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn found_new_jobs(&self) -> bool {
        matches!(self, ScrapeOutcome::NewJobs { .. })
    }
}

/// Triggers a background scrape and polls until its jobs show up
pub struct ScrapeWorkflow<'a, A: JobBoardApi + ?Sized> {
    api: &'a A,
    poll: PollConfig,
    jobs_limit: usize,
    date_filter: DateFilter,
}

impl<'a, A: JobBoardApi + ?Sized> ScrapeWorkflow<'a, A> {
    pub fn new(api: &'a A, poll: PollConfig) -> Self {
        Self {
            api,
            poll,
            jobs_limit: 1000,
            date_filter: DateFilter::All,
        }
    }

    /// How many jobs each poll requests
    pub fn jobs_limit(mut self, limit: usize) -> Self {
        self.jobs_limit = limit;
        self
    }

    /// Date window each poll requests
    pub fn date_filter(mut self, date_filter: DateFilter) -> Self {
        self.date_filter = date_filter;
        self
    }

    /// Number of jobs currently listed, used as the baseline for [`Self::wait_for_new_jobs`]
    pub async fn baseline(&self) -> Result<usize, ClientError> {
        let page = self.api.jobs(self.jobs_limit, self.date_filter).await?;
        Ok(page.jobs.len())
    }

    pub async fn trigger(&self, request: &ScrapeRequest) -> Result<ScrapeAck, ClientError> {
        let ack = self.api.trigger_scrape(request).await?;
        info!(
            "Scrape queued for '{}' on {} platform(s)",
            request.role,
            request.platforms.len()
        );
        Ok(ack)
    }

    /// Poll until more than `baseline` jobs are listed.
    ///
    /// Each of the `max_attempts` polls first waits one interval. Failed polls
    /// still count as attempts. When every attempt is used up, the jobs are
    /// fetched one final time and returned as [`ScrapeOutcome::TimedOut`].
    ///
    /// # Errors
    /// `ClientError::Cancelled` when `cancel` fires, or the error of the final
    /// fetch.
    pub async fn wait_for_new_jobs(
        &self,
        baseline: usize,
        cancel: &CancellationToken,
    ) -> Result<ScrapeOutcome, ClientError> {
        let max_attempts = self.poll.max_attempts;

        for attempt in 1..=max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Stopped waiting for scrape results after {} attempt(s)", attempt - 1);
                    return Err(ClientError::Cancelled);
                }
                _ = sleep(self.poll.interval()) => {}
            }

            debug!("Polling for new jobs (attempt {}/{})", attempt, max_attempts);
            match self.api.jobs(self.jobs_limit, self.date_filter).await {
                Ok(page) if page.jobs.len() > baseline => {
                    info!(
                        "Found {} new job(s) after {} attempt(s)",
                        page.jobs.len() - baseline,
                        attempt
                    );
                    return Ok(ScrapeOutcome::NewJobs {
                        jobs: page.jobs,
                        attempts: attempt,
                    });
                }
                Ok(page) => debug!("Still {} job(s), baseline {}", page.jobs.len(), baseline),
                Err(e) => warn!(
                    "Poll failed (attempt {}/{}): {}",
                    attempt, max_attempts, e
                ),
            }
        }

        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        warn!(
            "No new jobs after {} attempt(s), fetching current listing",
            max_attempts
        );
        let page = self.api.jobs(self.jobs_limit, self.date_filter).await?;
        Ok(ScrapeOutcome::TimedOut {
            jobs: page.jobs,
            attempts: max_attempts,
        })
    }

    /// Trigger a scrape, then wait for its results.
    ///
    /// `after_trigger` runs once the API has accepted the scrape and before
    /// the first poll. It is skipped when the trigger fails, and its error
    /// stops the run before any polling.
    pub async fn run<F>(
        &self,
        request: &ScrapeRequest,
        baseline: usize,
        cancel: &CancellationToken,
        after_trigger: F,
    ) -> Result<ScrapeOutcome, ClientError>
    where
        F: FnOnce(&ScrapeAck) -> Result<(), ClientError>,
    {
        let ack = self.trigger(request).await?;
        after_trigger(&ack)?;
        self.wait_for_new_jobs(baseline, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Company, CompanyInfo, CompanyJobs, JobsPage, ScrapeSession, SearchMetadata,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Serves a scripted sequence of job counts; `None` simulates a failed poll
    struct ScriptedApi {
        counts: Mutex<VecDeque<Option<usize>>>,
        job_calls: AtomicU32,
        scrape_calls: AtomicU32,
        fail_scrape: bool,
    }

    impl ScriptedApi {
        fn new(counts: Vec<Option<usize>>) -> Self {
            Self {
                counts: Mutex::new(counts.into()),
                job_calls: AtomicU32::new(0),
                scrape_calls: AtomicU32::new(0),
                fail_scrape: false,
            }
        }
    }

    fn jobs(count: usize) -> Vec<Job> {
        (0..count)
            .map(|i| Job {
                job_id: format!("job-{i}"),
                ..Default::default()
            })
            .collect()
    }

    #[async_trait]
    impl JobBoardApi for ScriptedApi {
        async fn trigger_scrape(&self, request: &ScrapeRequest) -> Result<ScrapeAck, ClientError> {
            self.scrape_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_scrape {
                return Err(ClientError::Status {
                    status: 500,
                    url: "/api/scrape".to_string(),
                });
            }
            Ok(ScrapeAck {
                message: "Scraping started in background".to_string(),
                role: Some(request.role.clone()),
            })
        }

        async fn jobs(&self, _limit: usize, _filter: DateFilter) -> Result<JobsPage, ClientError> {
            self.job_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.counts.lock().unwrap().pop_front().unwrap_or(Some(0));
            match next {
                Some(count) => Ok(JobsPage {
                    jobs: jobs(count),
                    total: count,
                    new_jobs_count: 0,
                }),
                None => Err(ClientError::Status {
                    status: 503,
                    url: "/api/jobs".to_string(),
                }),
            }
        }

        async fn companies(
            &self,
            _filter: DateFilter,
            _role: Option<&str>,
        ) -> Result<Vec<Company>, ClientError> {
            Ok(Vec::new())
        }

        async fn company_jobs(&self, name: &str) -> Result<CompanyJobs, ClientError> {
            Err(ClientError::NotFound(name.to_string()))
        }

        async fn company_info(&self, _name: &str) -> Result<CompanyInfo, ClientError> {
            Ok(CompanyInfo::default())
        }

        async fn scrape_sessions(&self, _limit: usize) -> Result<Vec<ScrapeSession>, ClientError> {
            Ok(Vec::new())
        }

        async fn session_jobs(&self, _id: &str) -> Result<Vec<Job>, ClientError> {
            Ok(Vec::new())
        }

        async fn job_detail(&self, id: &str) -> Result<Job, ClientError> {
            Err(ClientError::NotFound(id.to_string()))
        }

        async fn search_metadata(&self, _key: &str) -> Result<Option<SearchMetadata>, ClientError> {
            Ok(None)
        }
    }

    fn poll(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval_ms: 3000,
            max_attempts,
        }
    }

    fn request() -> ScrapeRequest {
        ScrapeRequest::builder().role("Rust Developer").build().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_finishes_as_soon_as_jobs_grow() {
        let api = ScriptedApi::new(vec![Some(5), Some(5), Some(7)]);
        let workflow = ScrapeWorkflow::new(&api, poll(30));

        let outcome = workflow
            .run(&request(), 5, &CancellationToken::new(), |_| Ok(()))
            .await
            .unwrap();

        assert!(outcome.found_new_jobs());
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.jobs().len(), 7);
        assert_eq!(api.scrape_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.job_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_polls_count_as_attempts() {
        let api = ScriptedApi::new(vec![None, None, Some(1)]);
        let workflow = ScrapeWorkflow::new(&api, poll(3));

        let outcome = workflow
            .wait_for_new_jobs(0, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome, ScrapeOutcome::NewJobs { jobs: jobs(1), attempts: 3 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_final_fetch() {
        let api = ScriptedApi::new(vec![Some(2), Some(2), Some(2), Some(2)]);
        let workflow = ScrapeWorkflow::new(&api, poll(3));

        let outcome = workflow
            .run(&request(), 2, &CancellationToken::new(), |_| Ok(()))
            .await
            .unwrap();

        assert!(!outcome.found_new_jobs());
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.into_jobs().len(), 2);
        // three polls plus the final fetch
        assert_eq!(api.job_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_one_interval_before_each_poll() {
        let api = ScriptedApi::new(vec![Some(0), Some(0), Some(1)]);
        let workflow = ScrapeWorkflow::new(&api, poll(5));

        let started = tokio::time::Instant::now();
        workflow
            .wait_for_new_jobs(0, &CancellationToken::new())
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= std::time::Duration::from_millis(9000));
        assert!(elapsed < std::time::Duration::from_millis(12000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_polling() {
        let api = ScriptedApi::new(Vec::new());
        let workflow = ScrapeWorkflow::new(&api, poll(30));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = workflow.wait_for_new_jobs(0, &cancel).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
        assert_eq!(api.job_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trigger_skips_polling() {
        let mut api = ScriptedApi::new(Vec::new());
        api.fail_scrape = true;
        let workflow = ScrapeWorkflow::new(&api, poll(30));

        let mut hook_ran = false;
        let result = workflow
            .run(&request(), 0, &CancellationToken::new(), |_| {
                hook_ran = true;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(ClientError::Status { status: 500, .. })));
        assert!(!hook_ran);
        assert_eq!(api.job_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_trigger_sees_ack_before_polling() {
        let api = ScriptedApi::new(vec![Some(1)]);
        let workflow = ScrapeWorkflow::new(&api, poll(3));

        let mut acked_role = None;
        let outcome = workflow
            .run(&request(), 0, &CancellationToken::new(), |ack| {
                assert_eq!(api.job_calls.load(Ordering::SeqCst), 0);
                acked_role = ack.role.clone();
                Ok(())
            })
            .await
            .unwrap();

        assert!(outcome.found_new_jobs());
        assert_eq!(acked_role.as_deref(), Some("Rust Developer"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_trigger_error_stops_run() {
        let api = ScriptedApi::new(vec![Some(1)]);
        let workflow = ScrapeWorkflow::new(&api, poll(3));

        let result = workflow
            .run(&request(), 0, &CancellationToken::new(), |_| {
                Err(ClientError::Cancelled)
            })
            .await;

        assert!(matches!(result, Err(ClientError::Cancelled)));
        assert_eq!(api.scrape_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.job_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_baseline_counts_current_jobs() {
        let api = ScriptedApi::new(vec![Some(12)]);
        let workflow = ScrapeWorkflow::new(&api, poll(1))
            .jobs_limit(50)
            .date_filter(DateFilter::Week);
        assert_eq!(workflow.baseline().await.unwrap(), 12);
    }
}

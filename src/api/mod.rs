mod http;

pub use http::HttpApiClient;

use crate::model::{
    Company, CompanyInfo, CompanyJobs, DateFilter, Job, JobsPage, ScrapeAck, ScrapeRequest,
    ScrapeSession, SearchMetadata,
};
use crate::ClientError;
use async_trait::async_trait;

/// Operations offered by the job scraping API
#[async_trait]
pub trait JobBoardApi: Send + Sync {
    /// Queue a scrape in the background (`POST /api/scrape`)
    async fn trigger_scrape(&self, request: &ScrapeRequest) -> Result<ScrapeAck, ClientError>;

    /// Active jobs, newest first (`GET /api/jobs`)
    async fn jobs(&self, limit: usize, date_filter: DateFilter) -> Result<JobsPage, ClientError>;

    /// Companies aggregated by job count (`GET /api/companies`)
    async fn companies(
        &self,
        date_filter: DateFilter,
        search_role: Option<&str>,
    ) -> Result<Vec<Company>, ClientError>;

    /// Every job of one company (`GET /api/companies/{name}/jobs`)
    async fn company_jobs(&self, company_name: &str) -> Result<CompanyJobs, ClientError>;

    /// Enrichment data for one company (`GET /api/companies/{name}/info`)
    async fn company_info(&self, company_name: &str) -> Result<CompanyInfo, ClientError>;

    /// Recent scrape sessions, newest first (`GET /api/scrape-sessions`)
    async fn scrape_sessions(&self, limit: usize) -> Result<Vec<ScrapeSession>, ClientError>;

    /// Jobs collected by one session (`GET /api/scrape-sessions/{id}/jobs`)
    async fn session_jobs(&self, session_id: &str) -> Result<Vec<Job>, ClientError>;

    /// One job including its full description (`GET /api/jobs/detail/{id}`)
    async fn job_detail(&self, job_id: &str) -> Result<Job, ClientError>;

    /// Pagination state of a search (`GET /api/search/metadata/{key}`).
    ///
    /// `None` when the search was never run or has not scraped anything yet.
    async fn search_metadata(&self, search_key: &str)
        -> Result<Option<SearchMetadata>, ClientError>;
}

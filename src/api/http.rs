use super::JobBoardApi;
use crate::model::{
    Company, CompanyInfo, CompanyJobs, DateFilter, Job, JobsPage, ScrapeAck, ScrapeRequest,
    ScrapeSession, SearchMetadata,
};
use crate::ClientError;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct CompaniesPage {
    #[serde(default)]
    companies: Vec<Company>,
}

#[derive(Debug, Deserialize)]
struct SessionsPage {
    #[serde(default)]
    sessions: Vec<ScrapeSession>,
}

#[derive(Debug, Deserialize)]
struct SessionJobsPage {
    #[serde(default)]
    jobs: Vec<Job>,
}

/// [`JobBoardApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
}

impl HttpApiClient {
    /// Create a client for the API rooted at `base_url`
    ///
    /// The timeout defaults to 30 seconds.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::BuilderError(format!("Invalid API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BuilderError(format!(
                "API URL cannot be used as a base: {base_url}"
            )));
        }

        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("job-scraper-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL joined with path segments, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        decode(url, response).await
    }
}

async fn decode<T: DeserializeOwned>(url: Url, response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(url.path().to_string()));
    }
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl JobBoardApi for HttpApiClient {
    async fn trigger_scrape(&self, request: &ScrapeRequest) -> Result<ScrapeAck, ClientError> {
        let url = self.endpoint(&["api", "scrape"]);
        debug!("POST {} for role '{}'", url, request.role);
        let response = self.client.post(url.clone()).json(request).send().await?;
        decode(url, response).await
    }

    async fn jobs(&self, limit: usize, date_filter: DateFilter) -> Result<JobsPage, ClientError> {
        let mut url = self.endpoint(&["api", "jobs"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("date_filter", date_filter.as_str());
        self.get_json(url).await
    }

    async fn companies(
        &self,
        date_filter: DateFilter,
        search_role: Option<&str>,
    ) -> Result<Vec<Company>, ClientError> {
        let mut url = self.endpoint(&["api", "companies"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("date_filter", date_filter.as_str());
            if let Some(role) = search_role.filter(|r| !r.trim().is_empty()) {
                query.append_pair("search_role", role);
            }
        }
        let page: CompaniesPage = self.get_json(url).await?;
        Ok(page.companies)
    }

    async fn company_jobs(&self, company_name: &str) -> Result<CompanyJobs, ClientError> {
        let url = self.endpoint(&["api", "companies", company_name, "jobs"]);
        self.get_json(url).await
    }

    async fn company_info(&self, company_name: &str) -> Result<CompanyInfo, ClientError> {
        let url = self.endpoint(&["api", "companies", company_name, "info"]);
        self.get_json(url).await
    }

    async fn scrape_sessions(&self, limit: usize) -> Result<Vec<ScrapeSession>, ClientError> {
        let mut url = self.endpoint(&["api", "scrape-sessions"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let page: SessionsPage = self.get_json(url).await?;
        Ok(page.sessions)
    }

    async fn session_jobs(&self, session_id: &str) -> Result<Vec<Job>, ClientError> {
        let url = self.endpoint(&["api", "scrape-sessions", session_id, "jobs"]);
        let page: SessionJobsPage = self.get_json(url).await?;
        Ok(page.jobs)
    }

    async fn job_detail(&self, job_id: &str) -> Result<Job, ClientError> {
        let url = self.endpoint(&["api", "jobs", "detail", job_id]);
        self.get_json(url).await
    }

    async fn search_metadata(
        &self,
        search_key: &str,
    ) -> Result<Option<SearchMetadata>, ClientError> {
        let url = self.endpoint(&["api", "search", "metadata", search_key]);
        match self.get_json::<SearchMetadata>(url).await {
            Ok(metadata) if metadata.total_scraped > 0 => Ok(Some(metadata)),
            Ok(_) | Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A scraped job posting as returned by the API.
///
/// Only `job_id`, `title`, `company`, `location`, `url` and `source` are
/// always present; everything else depends on the platform it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Storage id assigned by the API
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
    /// Platform the job was scraped from ("linkedin", "indeed", ...)
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_verified: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Search role the job was scraped for
    #[serde(default)]
    pub search_category: Option<String>,
}

/// Response of `GET /api/jobs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsPage {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub total: usize,
    /// Jobs created within the last 24 hours
    #[serde(default)]
    pub new_jobs_count: usize,
}

/// A company aggregated over its job postings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub total_jobs: usize,
    #[serde(default)]
    pub latest_job_date: Option<String>,
    #[serde(default)]
    pub job_titles: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Response of `GET /api/companies/{name}/jobs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyJobs {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub total_jobs: usize,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// Enrichment data from `GET /api/companies/{name}/info`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    /// Set when the enrichment service was unavailable
    #[serde(default)]
    pub fallback: bool,
}

/// A recorded run of the scraper
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScrapeSession {
    pub session_id: String,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub search_location: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub total_jobs: usize,
    #[serde(default)]
    pub new_jobs: usize,
    #[serde(default)]
    pub duplicate_jobs: usize,
    #[serde(default)]
    pub scraped_at: Option<String>,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub date_filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Completed,
    Failed,
    Other(String),
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Other(status) => status,
        }
    }
}

impl From<String> for SessionStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "in_progress" => SessionStatus::InProgress,
            "completed" => SessionStatus::Completed,
            "failed" => SessionStatus::Failed,
            _ => SessionStatus::Other(status),
        }
    }
}

impl From<SessionStatus> for String {
    fn from(status: SessionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Pagination state the scraper keeps per search key
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchMetadata {
    #[serde(default)]
    pub search_key: String,
    #[serde(default)]
    pub last_offset: u64,
    #[serde(default)]
    pub total_scraped: u64,
    #[serde(default)]
    pub last_scrape_date: Option<String>,
    #[serde(default)]
    pub platforms_used: Option<Vec<String>>,
}

/// Body of `POST /api/scrape`. Build it with [`ScrapeRequest::builder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest {
    pub role: String,
    pub location: String,
    pub platforms: Vec<Platform>,
    pub max_jobs: u32,
    pub continue_from_last: bool,
}

/// Acknowledgement returned when a scrape is queued
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Job boards the scraper knows how to crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linkedin,
    Jsearch,
    Indeed,
    Glassdoor,
    Arbeitnow,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Linkedin,
        Platform::Jsearch,
        Platform::Indeed,
        Platform::Glassdoor,
        Platform::Arbeitnow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linkedin => "linkedin",
            Platform::Jsearch => "jsearch",
            Platform::Indeed => "indeed",
            Platform::Glassdoor => "glassdoor",
            Platform::Arbeitnow => "arbeitnow",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown platform: {}", s))
    }
}

/// Server-side date window applied to job and company listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    Yesterday,
    Week,
}

impl DateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFilter::All => "all",
            DateFilter::Today => "today",
            DateFilter::Yesterday => "yesterday",
            DateFilter::Week => "week",
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DateFilter::All),
            "today" => Ok(DateFilter::Today),
            "yesterday" => Ok(DateFilter::Yesterday),
            "week" => Ok(DateFilter::Week),
            _ => Err(format!("Unknown date filter: {}", s)),
        }
    }
}

/// Which listing the recruiter looks at by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Jobs,
    Companies,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Jobs => "jobs",
            ViewMode::Companies => "companies",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jobs" => Ok(ViewMode::Jobs),
            "companies" => Ok(ViewMode::Companies),
            _ => Err(format!("Unknown view mode: {}", s)),
        }
    }
}

/// Key under which the scraper stores pagination state for a search.
///
/// # Example
/// ```
/// use job_scraper_client::model::search_key;
///
/// assert_eq!(search_key("Data Engineer", "New York"), "data_engineer_new_york");
/// ```
pub fn search_key(role: &str, location: &str) -> String {
    format!("{}_{}", role, location)
        .to_lowercase()
        .replace(' ', "_")
}

/// Parse a timestamp as the API emits it.
///
/// Accepts RFC 3339 and the naive ISO form (treated as UTC).
pub fn parse_api_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_job_deserializes_with_missing_fields() {
        let job: Job = serde_json::from_str(
            r#"{"_id": "abc", "job_id": "li-1", "title": "Engineer", "company": "Acme",
                "location": "Remote", "url": "https://x", "source": "linkedin",
                "salary": null, "unknown_field": 42}"#,
        )
        .unwrap();

        assert_eq!(job.id.as_deref(), Some("abc"));
        assert_eq!(job.title, "Engineer");
        assert!(job.salary.is_none());
        assert!(job.description.is_none());
    }

    #[test]
    fn test_session_status_round_trip() {
        let session: ScrapeSession = serde_json::from_str(
            r#"{"session_id": "s1", "status": "completed", "platforms": ["linkedin"]}"#,
        )
        .unwrap();
        assert_eq!(session.status, SessionStatus::Completed);

        let other = SessionStatus::from("queued".to_string());
        assert_eq!(other.as_str(), "queued");
        assert_eq!(SessionStatus::default(), SessionStatus::InProgress);
    }

    #[test]
    fn test_platform_parsing() {
        assert_eq!("LinkedIn".parse::<Platform>().unwrap(), Platform::Linkedin);
        assert_eq!(" jsearch ".parse::<Platform>().unwrap(), Platform::Jsearch);
        assert!("monster".parse::<Platform>().is_err());
        assert_eq!(
            serde_json::to_string(&Platform::Arbeitnow).unwrap(),
            "\"arbeitnow\""
        );
    }

    #[test]
    fn test_date_filter_and_view_mode_parsing() {
        assert_eq!("Week".parse::<DateFilter>().unwrap(), DateFilter::Week);
        assert!("month".parse::<DateFilter>().is_err());
        assert_eq!(DateFilter::default().as_str(), "all");
        assert_eq!("companies".parse::<ViewMode>().unwrap(), ViewMode::Companies);
        assert!("grid".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_search_key() {
        assert_eq!(search_key("Rust Developer", ""), "rust_developer_");
        assert_eq!(search_key("QA", "San Jose CA"), "qa_san_jose_ca");
    }

    #[test]
    fn test_parse_api_timestamp() {
        let aware = parse_api_timestamp("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(aware.hour(), 8);

        let naive = parse_api_timestamp("2024-03-01T10:30:00.123456").unwrap();
        assert_eq!(naive.day(), 1);
        assert_eq!(naive.hour(), 10);

        assert!(parse_api_timestamp("yesterday").is_none());
    }
}

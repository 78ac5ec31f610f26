use crate::{ClientError, Platform, ScrapeRequest};

const DEFAULT_MAX_JOBS: u32 = 10;

/// Builder for scrape requests
#[derive(Debug, Default)]
pub struct ScrapeRequestBuilder {
    role: Option<String>,
    location: Option<String>,
    platforms: Option<Vec<Platform>>,
    max_jobs: Option<u32>,
    continue_from_last: bool,
}

impl ScrapeRequestBuilder {
    /// Set the role (job title or keywords) to scrape for
    ///
    /// # Example
    /// ```
    /// use job_scraper_client::ScrapeRequest;
    ///
    /// let builder = ScrapeRequest::builder()
    ///     .role("Backend Engineer");
    /// ```
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Restrict the scrape to a location
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add a platform to scrape
    ///
    /// The first call replaces the default platform selection.
    ///
    /// # Example
    /// ```
    /// use job_scraper_client::{Platform, ScrapeRequest};
    ///
    /// let request = ScrapeRequest::builder()
    ///     .role("Data Analyst")
    ///     .platform(Platform::Indeed)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(request.platforms, vec![Platform::Indeed]);
    /// ```
    pub fn platform(mut self, platform: Platform) -> Self {
        let platforms = self.platforms.get_or_insert_with(Vec::new);
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
        self
    }

    /// Replace the platform selection
    pub fn platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        let mut selected = Vec::new();
        for platform in platforms {
            if !selected.contains(&platform) {
                selected.push(platform);
            }
        }
        self.platforms = Some(selected);
        self
    }

    /// Maximum number of jobs the scraper should collect
    pub fn max_jobs(mut self, max_jobs: u32) -> Self {
        self.max_jobs = Some(max_jobs);
        self
    }

    /// Resume from the offset stored for this search instead of starting over
    pub fn continue_from_last(mut self, resume: bool) -> Self {
        self.continue_from_last = resume;
        self
    }

    /// Validate and build the request
    ///
    /// # Errors
    /// Returns `ClientError::BuilderError` if:
    /// - No role was given, or the role is blank
    /// - The platform selection is empty
    /// - `max_jobs` is zero
    pub fn build(self) -> Result<ScrapeRequest, ClientError> {
        let role = self
            .role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                ClientError::BuilderError("No role specified. Use .role()".to_string())
            })?;

        let platforms = self
            .platforms
            .unwrap_or_else(|| vec![Platform::Linkedin, Platform::Jsearch]);
        if platforms.is_empty() {
            return Err(ClientError::BuilderError(
                "Please select at least one platform to scrape".to_string(),
            ));
        }

        let max_jobs = self.max_jobs.unwrap_or(DEFAULT_MAX_JOBS);
        if max_jobs == 0 {
            return Err(ClientError::BuilderError(
                "max_jobs must be at least 1".to_string(),
            ));
        }

        Ok(ScrapeRequest {
            role,
            location: self
                .location
                .map(|l| l.trim().to_string())
                .unwrap_or_default(),
            platforms,
            max_jobs,
            continue_from_last: self.continue_from_last,
        })
    }
}

impl ScrapeRequest {
    /// Creates a new builder for scrape requests
    pub fn builder() -> ScrapeRequestBuilder {
        ScrapeRequestBuilder::default()
    }

    /// Key the scraper uses to remember how far this search got
    pub fn search_key(&self) -> String {
        crate::model::search_key(&self.role, &self.location)
    }
}

//! Client for a job scraping API.
//!
//! The API scrapes job boards in the background and stores postings; this
//! crate lists what it stored, triggers new scrapes and waits for their
//! results, and turns free-text job descriptions into titled sections for
//! display.
//!
//! # Example
//! ```no_run
//! use job_scraper_client::{HttpApiClient, JobBoardApi, DateFilter, sectionize};
//!
//! # async fn run() -> Result<(), job_scraper_client::ClientError> {
//! let api = HttpApiClient::new("http://localhost:8000", None)?;
//! let page = api.jobs(50, DateFilter::Today).await?;
//! for job in &page.jobs {
//!     let sections = sectionize(job.description.as_deref());
//!     println!("{}: {} section(s)", job.title, sections.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod builder;
pub mod company;
pub mod config;
pub mod description;
pub mod error;
pub mod filter;
pub mod model;
pub mod prefs;
pub mod render;
pub mod scrape;
pub mod sectionizer;

pub use api::{HttpApiClient, JobBoardApi};
pub use builder::ScrapeRequestBuilder;
pub use company::CompanyProfile;
pub use config::{AppConfig, PollConfig};
pub use error::ClientError;
pub use model::{
    Company, CompanyInfo, DateFilter, Job, Platform, ScrapeRequest, ScrapeSession, ViewMode,
};
pub use prefs::{FileStore, MemoryStore, PreferenceSession, PreferenceStore, Preferences};
pub use scrape::{ScrapeOutcome, ScrapeWorkflow};
pub use sectionizer::{sectionize, sectionize_with, HeadingRegistry, Section};

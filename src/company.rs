use crate::model::{CompanyInfo, Job};
use log::debug;
use std::collections::HashSet;

/// Industry reported when no keyword table reaches the threshold
pub const GENERAL_INDUSTRY: &str = "General";

/// An industry is detected once more than this many of its keywords occur
const INDUSTRY_MATCH_THRESHOLD: usize = 2;

struct IndustryMatchers {
    industries: Vec<(&'static str, Vec<&'static str>)>,
}

impl IndustryMatchers {
    fn new() -> Self {
        Self {
            industries: vec![
                (
                    "Technology",
                    vec![
                        "software",
                        "developer",
                        "engineer",
                        "tech",
                        "IT",
                        "data",
                        "cloud",
                        "AI",
                    ],
                ),
                (
                    "Construction",
                    vec![
                        "construction",
                        "engineering",
                        "BIM",
                        "architecture",
                        "building",
                        "civil",
                    ],
                ),
                (
                    "Healthcare",
                    vec![
                        "healthcare",
                        "medical",
                        "hospital",
                        "nurse",
                        "doctor",
                        "clinical",
                    ],
                ),
                (
                    "Finance",
                    vec![
                        "finance",
                        "banking",
                        "financial",
                        "accountant",
                        "investment",
                    ],
                ),
                (
                    "Education",
                    vec!["education", "teacher", "training", "learning", "academic"],
                ),
                (
                    "Retail",
                    vec![
                        "retail",
                        "sales",
                        "store",
                        "customer service",
                        "merchandising",
                    ],
                ),
            ],
        }
    }

    /// First industry, in table order, with enough distinct keyword hits
    fn detect(&self, text: &str) -> &'static str {
        let text = text.to_lowercase();
        for (industry, keywords) in &self.industries {
            let hits = keywords
                .iter()
                .filter(|keyword| text.contains(&keyword.to_lowercase()))
                .count();
            if hits > INDUSTRY_MATCH_THRESHOLD {
                debug!("Detected industry {} ({} keyword hits)", industry, hits);
                return industry;
            }
        }
        GENERAL_INDUSTRY
    }
}

/// Everything shown on a company page
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
    pub name: String,
    pub description: String,
    pub industry: String,
    pub website: String,
    pub locations: Vec<String>,
    pub job_types: Vec<String>,
    pub open_positions: usize,
}

/// Guess the industry from the combined job descriptions
pub fn detect_industry(jobs: &[Job]) -> &'static str {
    let descriptions = jobs
        .iter()
        .filter_map(|job| job.description.as_deref())
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    IndustryMatchers::new().detect(&descriptions)
}

/// Coarse role family for a job title
pub fn role_type(title: &str) -> &'static str {
    let title = title.to_lowercase();
    if title.contains("engineer") {
        "Engineering"
    } else if title.contains("developer") {
        "Development"
    } else if title.contains("manager") {
        "Management"
    } else if title.contains("designer") {
        "Design"
    } else if title.contains("analyst") {
        "Analysis"
    } else {
        "Professional"
    }
}

/// Website to link when the enrichment service has none
pub fn fallback_website(company_name: &str) -> String {
    let cleaned: String = company_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    format!("https://www.{cleaned}.com")
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| !value.is_empty() && seen.insert(*value))
        .map(String::from)
        .collect()
}

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}

fn generated_description(
    company_name: &str,
    jobs: &[Job],
    industry: &str,
    locations: &[String],
) -> String {
    let role_types = unique(jobs.iter().map(|job| role_type(&job.title)));
    let more = if role_types.len() > 3 { " and more" } else { "" };
    let shown_roles = role_types
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    let shown_locations = locations
        .iter()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .join(" and ");

    format!(
        "{company_name} is actively hiring across {} position{} in the {} sector. \
         The company has opportunities in {shown_roles} roles{more}, with openings \
         across {} location{} including {shown_locations}.",
        jobs.len(),
        plural(jobs.len()),
        industry.to_lowercase(),
        locations.len(),
        plural(locations.len()),
    )
}

impl CompanyProfile {
    /// Build the profile from a company's jobs and, when available, the
    /// enrichment service's answer.
    ///
    /// Without enrichment data only locations come from the jobs; the
    /// industry stays general and the description is a short stock sentence.
    pub fn build(company_name: &str, jobs: &[Job], info: Option<&CompanyInfo>) -> Self {
        let locations = unique(jobs.iter().map(|job| job.location.as_str()));

        let Some(info) = info else {
            return Self {
                name: company_name.to_string(),
                description: format!(
                    "{company_name} is currently hiring for {} position{}. \
                     View all available opportunities and apply directly.",
                    jobs.len(),
                    plural(jobs.len())
                ),
                industry: GENERAL_INDUSTRY.to_string(),
                website: fallback_website(company_name),
                locations,
                job_types: Vec::new(),
                open_positions: jobs.len(),
            };
        };

        let job_types = unique(jobs.iter().filter_map(|job| job.job_type.as_deref()));
        let industry = detect_industry(jobs);

        let description = match info.description.as_deref() {
            Some(description) if !description.trim().is_empty() && !info.fallback => {
                description.to_string()
            }
            _ => generated_description(company_name, jobs, industry, &locations),
        };

        let website = info
            .website
            .clone()
            .filter(|w| !w.trim().is_empty())
            .unwrap_or_else(|| fallback_website(company_name));

        Self {
            name: company_name.to_string(),
            description,
            industry: industry.to_string(),
            website,
            locations,
            job_types,
            open_positions: jobs.len(),
        }
    }
}

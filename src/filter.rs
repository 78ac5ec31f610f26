//! Local search over listings that were already fetched.
//!
//! All matching is case-insensitive substring matching; nothing here talks
//! to the API.

use crate::model::{Company, Job};
use std::collections::{BTreeMap, HashMap};

/// Company name used when a job has none
pub const UNKNOWN_COMPANY: &str = "Unknown";

fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

fn contains_lower(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn contains_opt(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| contains_lower(h, needle))
}

/// Jobs matching any word of a saved search.
///
/// A word matches when it occurs in the title, company or search category.
/// An absent or blank query keeps every job.
pub fn filter_by_query<'a>(jobs: &'a [Job], query: Option<&str>) -> Vec<&'a Job> {
    let words = query.map(query_words).unwrap_or_default();
    if words.is_empty() {
        return jobs.iter().collect();
    }

    jobs.iter()
        .filter(|job| {
            words.iter().any(|word| {
                contains_lower(&job.title, word)
                    || contains_lower(&job.company, word)
                    || contains_opt(job.search_category.as_deref(), word)
            })
        })
        .collect()
}

/// Free-text search over title, company, location, description and salary
pub fn search_jobs<'a>(jobs: &'a [Job], query: &str) -> Vec<&'a Job> {
    search(jobs, query, true)
}

/// Free-text search within one company's jobs; the company name is not searched
pub fn search_company_jobs<'a>(jobs: &'a [Job], query: &str) -> Vec<&'a Job> {
    search(jobs, query, false)
}

fn search<'a>(jobs: &'a [Job], query: &str, include_company: bool) -> Vec<&'a Job> {
    if query.trim().is_empty() {
        return jobs.iter().collect();
    }

    let needle = query.to_lowercase();
    jobs.iter()
        .filter(|job| {
            contains_lower(&job.title, &needle)
                || (include_company && contains_lower(&job.company, &needle))
                || contains_lower(&job.location, &needle)
                || contains_opt(job.description.as_deref(), &needle)
                || contains_opt(job.salary.as_deref(), &needle)
        })
        .collect()
}

/// Companies whose name contains `query`
pub fn search_companies<'a>(companies: &'a [Company], query: &str) -> Vec<&'a Company> {
    if query.trim().is_empty() {
        return companies.iter().collect();
    }

    let needle = query.to_lowercase();
    companies
        .iter()
        .filter(|company| contains_lower(&company.company_name, &needle))
        .collect()
}

/// Number of jobs a saved search would show.
///
/// Counts jobs whose title or search category contains any query word.
pub fn history_match_count(jobs: &[Job], query: &str) -> usize {
    let words = query_words(query);
    jobs.iter()
        .filter(|job| {
            words.iter().any(|word| {
                contains_lower(&job.title, word)
                    || contains_opt(job.search_category.as_deref(), word)
            })
        })
        .count()
}

/// Job count per source platform, ordered by source name
pub fn source_counts(jobs: &[Job]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for job in jobs {
        *counts.entry(job.source.clone()).or_insert(0) += 1;
    }
    counts
}

/// Group a flat job list into companies, in first-seen order.
///
/// The first job seen for a company provides its latest job date, since the
/// API returns jobs newest first.
pub fn companies_from_jobs(jobs: &[Job]) -> Vec<Company> {
    let mut companies: Vec<Company> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for job in jobs {
        let name = if job.company.trim().is_empty() {
            UNKNOWN_COMPANY
        } else {
            job.company.as_str()
        };

        match index.get(name) {
            Some(&i) => {
                let company = &mut companies[i];
                company.total_jobs += 1;
                company.job_titles.push(job.title.clone());
                company.locations.push(job.location.clone());
            }
            None => {
                index.insert(name, companies.len());
                companies.push(Company {
                    company_name: name.to_string(),
                    total_jobs: 1,
                    latest_job_date: job.created_at.clone(),
                    job_titles: vec![job.title.clone()],
                    locations: vec![job.location.clone()],
                });
            }
        }
    }

    companies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str, company: &str, location: &str) -> Job {
        Job {
            job_id: format!("{title}-{company}"),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            source: "linkedin".to_string(),
            ..Default::default()
        }
    }

    fn titles(jobs: Vec<&Job>) -> Vec<&str> {
        jobs.into_iter().map(|j| j.title.as_str()).collect()
    }

    fn sample() -> Vec<Job> {
        let mut data = job("Senior Rust Engineer", "Ferrous Systems", "Berlin");
        data.search_category = Some("Backend".to_string());
        data.salary = Some("€90k".to_string());

        let mut nurse = job("Registered Nurse", "City Hospital", "Austin, TX");
        nurse.description = Some("Provide patient care on a busy ward".to_string());
        nurse.source = "indeed".to_string();

        vec![
            data,
            nurse,
            job("Frontend Developer", "Rusty Widgets", "Remote"),
        ]
    }

    #[test]
    fn test_filter_by_query_matches_any_word() {
        let jobs = sample();
        assert_eq!(
            titles(filter_by_query(&jobs, Some("nurse backend"))),
            vec!["Senior Rust Engineer", "Registered Nurse"]
        );
        // Company names count too
        assert_eq!(
            titles(filter_by_query(&jobs, Some("RUSTY"))),
            vec!["Frontend Developer"]
        );
    }

    #[test]
    fn test_filter_by_query_without_query_keeps_all() {
        let jobs = sample();
        assert_eq!(filter_by_query(&jobs, None).len(), 3);
        assert_eq!(filter_by_query(&jobs, Some("   ")).len(), 3);
    }

    #[test]
    fn test_search_jobs_fields() {
        let jobs = sample();
        assert_eq!(titles(search_jobs(&jobs, "austin")), vec!["Registered Nurse"]);
        assert_eq!(titles(search_jobs(&jobs, "patient care")), vec!["Registered Nurse"]);
        assert_eq!(titles(search_jobs(&jobs, "€90")), vec!["Senior Rust Engineer"]);
        assert_eq!(
            titles(search_jobs(&jobs, "rust")),
            vec!["Senior Rust Engineer", "Frontend Developer"]
        );
        assert_eq!(search_jobs(&jobs, "").len(), 3);
    }

    #[test]
    fn test_search_company_jobs_ignores_company() {
        let jobs = sample();
        assert_eq!(
            titles(search_company_jobs(&jobs, "rust")),
            vec!["Senior Rust Engineer"]
        );
    }

    #[test]
    fn test_search_companies() {
        let companies = companies_from_jobs(&sample());
        let found = search_companies(&companies, "hosp");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].company_name, "City Hospital");
        assert_eq!(search_companies(&companies, "").len(), 3);
    }

    #[test]
    fn test_history_match_count_ignores_company() {
        let jobs = sample();
        assert_eq!(history_match_count(&jobs, "rust"), 1);
        assert_eq!(history_match_count(&jobs, "backend developer"), 2);
        assert_eq!(history_match_count(&jobs, ""), 0);
    }

    #[test]
    fn test_source_counts() {
        let counts = source_counts(&sample());
        assert_eq!(counts.get("linkedin"), Some(&2));
        assert_eq!(counts.get("indeed"), Some(&1));
        assert_eq!(counts.keys().next().map(String::as_str), Some("indeed"));
    }

    #[test]
    fn test_companies_from_jobs() {
        let mut first = job("Engineer", "Acme", "Paris");
        first.created_at = Some("2024-05-02T09:00:00".to_string());
        let mut second = job("Designer", "Acme", "Lyon");
        second.created_at = Some("2024-05-01T09:00:00".to_string());
        let jobs = vec![first, job("Analyst", "", "Oslo"), second];

        let companies = companies_from_jobs(&jobs);
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].company_name, "Acme");
        assert_eq!(companies[0].total_jobs, 2);
        assert_eq!(companies[0].job_titles, vec!["Engineer", "Designer"]);
        assert_eq!(companies[0].locations, vec!["Paris", "Lyon"]);
        assert_eq!(
            companies[0].latest_job_date.as_deref(),
            Some("2024-05-02T09:00:00")
        );
        assert_eq!(companies[1].company_name, UNKNOWN_COMPANY);
    }

    #[test]
    fn test_companies_from_large_listing_keep_first_seen_order() {
        let names = ["Zeta", "Alpha", "Mid"];
        let jobs: Vec<Job> = (0..1000)
            .map(|i| job(&format!("Role {i}"), names[i % 3], "Remote"))
            .collect();

        let companies = companies_from_jobs(&jobs);
        let order: Vec<_> = companies.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(order, names);
        assert_eq!(companies[0].total_jobs, 334);
        assert_eq!(companies[2].total_jobs, 333);
        assert_eq!(companies[1].job_titles[1], "Role 4");
    }
}

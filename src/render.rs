//! Terminal rendering of jobs, sessions, company profiles and sections.

use crate::company::CompanyProfile;
use crate::description::to_plain_text;
use crate::model::{parse_api_timestamp, Company, Job, ScrapeSession};
use crate::sectionizer::{sectionize, Section};
use chrono::{DateTime, Datelike, Utc};
use std::fmt::Write;

/// Shown instead of sections when a description yields none
pub const EMPTY_DESCRIPTION: &str = "No detailed description available for this position.";

/// Label for jobs without any usable date
pub const UNKNOWN_DATE: &str = "Recently";

fn plural(count: i64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Sections as heading lines followed by bullet lines, separated by a blank
/// line. An empty slice renders [`EMPTY_DESCRIPTION`].
pub fn render_sections(sections: &[Section]) -> String {
    if sections.is_empty() {
        return EMPTY_DESCRIPTION.to_string();
    }

    sections
        .iter()
        .map(|section| {
            let mut block = section.title.clone();
            for item in &section.items {
                block.push_str("\n  • ");
                block.push_str(item);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// How long ago `then` was, for times within the last week.
///
/// Older times are shown as a short date, with the year only when it differs
/// from the year of `now`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 60 {
        format!("{} minute{} ago", minutes, plural(minutes))
    } else if hours < 24 {
        format!("{} hour{} ago", hours, plural(hours))
    } else if days < 7 {
        format!("{} day{} ago", days, plural(days))
    } else if then.year() != now.year() {
        then.format("%b %-d, %Y").to_string()
    } else {
        then.format("%b %-d").to_string()
    }
}

/// Age of a posting in whole days, weeks or months
pub fn posted_label(date: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(date) = date.and_then(parse_api_timestamp) else {
        return UNKNOWN_DATE.to_string();
    };

    let days = (now - date).num_days().abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=29 => format!("{} weeks ago", days / 7),
        _ => format!("{} months ago", days / 30),
    }
}

/// Whether a job was stored within the last 24 hours
pub fn is_new(created_at: Option<&str>, now: DateTime<Utc>) -> bool {
    created_at
        .and_then(parse_api_timestamp)
        .is_some_and(|created| (now - created).num_hours() < 24)
}

pub fn platform_icon(platform: &str) -> &'static str {
    match platform.to_lowercase().as_str() {
        "linkedin" => "💼",
        "jsearch" => "🔍",
        "indeed" => "🟢",
        _ => "📡",
    }
}

/// One line per job for listings
pub fn job_line(job: &Job, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{} {} | {} | {}",
        platform_icon(&job.source),
        job.title,
        job.company,
        job.location
    );
    if let Some(salary) = job.salary.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(line, " | {salary}");
    }
    let posted = job.posted_date.as_deref().or(job.created_at.as_deref());
    let _ = write!(line, " | {}", posted_label(posted, now));
    if is_new(job.created_at.as_deref(), now) {
        line.push_str(" [NEW]");
    }
    let _ = write!(line, "  ({})", job.job_id);
    line
}

pub fn company_line(company: &Company, now: DateTime<Utc>) -> String {
    format!(
        "{} | {} job{} | latest {}",
        company.company_name,
        company.total_jobs,
        plural(company.total_jobs as i64),
        posted_label(company.latest_job_date.as_deref(), now)
    )
}

pub fn session_line(session: &ScrapeSession, now: DateTime<Utc>) -> String {
    let when = session
        .scraped_at
        .as_deref()
        .and_then(parse_api_timestamp)
        .map(|at| relative_time(at, now))
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());
    let icons = session
        .platforms
        .iter()
        .map(|p| platform_icon(p))
        .collect::<Vec<_>>()
        .join(" ");
    let location = if session.search_location.is_empty() {
        String::new()
    } else {
        format!(" in {}", session.search_location)
    };

    format!(
        "{} {}{} | {} new / {} total / {} duplicates | {} | {}  ({})",
        icons,
        session.search_query,
        location,
        session.new_jobs,
        session.total_jobs,
        session.duplicate_jobs,
        session.status.as_str(),
        when,
        session.session_id
    )
}

/// Full job view with the description broken into sections
pub fn job_detail(job: &Job, now: DateTime<Utc>) -> String {
    let mut out = format!("{}\n{} | {}\n", job.title, job.company, job.location);
    let posted = job.posted_date.as_deref().or(job.created_at.as_deref());
    let _ = writeln!(
        out,
        "{} {} | posted {}",
        platform_icon(&job.source),
        job.source,
        posted_label(posted, now)
    );
    if let Some(salary) = job.salary.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Salary: {salary}");
    }
    if let Some(job_type) = job.job_type.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Type: {job_type}");
    }
    if !job.url.is_empty() {
        let _ = writeln!(out, "Apply: {}", job.url);
    }

    let description = job.description.as_deref().map(to_plain_text);
    out.push('\n');
    out.push_str(&render_sections(&sectionize(description.as_deref())));
    out
}

pub fn company_profile(profile: &CompanyProfile) -> String {
    let mut out = format!(
        "{}\n{} | {} open position{}\n{}\n\n{}\n",
        profile.name,
        profile.industry,
        profile.open_positions,
        plural(profile.open_positions as i64),
        profile.website,
        profile.description
    );
    if !profile.locations.is_empty() {
        let _ = writeln!(out, "\nLocations: {}", profile.locations.join(", "));
    }
    if !profile.job_types.is_empty() {
        let _ = writeln!(out, "Job types: {}", profile.job_types.join(", "));
    }
    out
}

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use job_scraper_client::description::to_plain_text;
use job_scraper_client::filter::{
    companies_from_jobs, filter_by_query, history_match_count, search_companies,
    search_company_jobs, search_jobs, source_counts,
};
use job_scraper_client::render::{
    company_line, company_profile, job_detail, job_line, platform_icon, relative_time,
    render_sections, session_line,
};
use job_scraper_client::{
    sectionize, AppConfig, ClientError, CompanyProfile, DateFilter, FileStore, HttpApiClient,
    Job, JobBoardApi, Platform, PreferenceSession, ScrapeOutcome, ScrapeRequest, ScrapeWorkflow,
    ViewMode,
};
use log::{debug, warn};
use std::error::Error;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "job-scraper", version)]
#[command(about = "Browse scraped jobs, trigger new scrapes and read structured job descriptions")]
struct Cli {
    /// Base URL of the scraping API
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Preference file
    #[arg(long, global = true, value_name = "PATH")]
    prefs: Option<PathBuf>,

    /// Without a command, lists jobs or companies depending on the saved view
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List scraped jobs
    Jobs {
        /// Date window (all, today, yesterday, week); saved as the new default
        #[arg(short, long)]
        date: Option<DateFilter>,
        /// Keep jobs matching any word of a saved search
        #[arg(short, long)]
        filter: Option<String>,
        /// Free-text search over title, company, location, description and salary
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List companies by job count
    Companies {
        /// Date window (all, today, yesterday, week); saved as the new default
        #[arg(short, long)]
        date: Option<DateFilter>,
        /// Company name search
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a company profile and its jobs
    Company {
        name: String,
        /// Search within the company's jobs
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one job with its description broken into sections
    Job { id: String },
    /// List recent scrape sessions
    Sessions {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// List the jobs a scrape session found
    Session { id: String },
    /// Trigger a scrape and wait for its results
    Scrape {
        role: String,
        #[arg(short, long, default_value = "")]
        location: String,
        /// Platform to scrape; repeat for several (default: linkedin, jsearch)
        #[arg(short, long = "platform", value_name = "PLATFORM")]
        platforms: Vec<Platform>,
        #[arg(short = 'n', long, default_value = "10")]
        max_jobs: u32,
        /// Continue from where the last scrape of this search stopped
        #[arg(long = "continue")]
        resume: bool,
    },
    /// Manage the search history
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },
    /// Show or change saved preferences
    Prefs {
        #[arg(short, long)]
        date: Option<DateFilter>,
        #[arg(short, long)]
        view: Option<ViewMode>,
    },
    /// Break a job description into sections, reading stdin without FILE
    Sectionize {
        file: Option<PathBuf>,
        /// Print sections as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List recent searches
    List,
    /// Remove a search by its exact query
    Remove { query: String },
    /// Remove every search
    Clear,
}

struct App {
    config: AppConfig,
    api: HttpApiClient,
    prefs: PreferenceSession<FileStore>,
    now: DateTime<Utc>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    // Sectionizing is local and needs neither configuration nor the API
    if let Some(Commands::Sectionize { file, json }) = &cli.command {
        return sectionize_command(file.as_ref(), *json).await;
    }

    let mut config = AppConfig::load()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(prefs) = cli.prefs {
        config.preferences_path = prefs;
    }
    debug!("Using API at {}", config.api_url);

    let mut app = App {
        api: HttpApiClient::new(&config.api_url, Some(config.timeout()))?,
        prefs: PreferenceSession::load(FileStore::new(config.preferences_path.clone()))?,
        config,
        now: Utc::now(),
    };

    let command = cli.command.unwrap_or_else(|| match app.prefs.preferences().view_mode {
        ViewMode::Jobs => Commands::Jobs {
            date: None,
            filter: None,
            search: None,
        },
        ViewMode::Companies => Commands::Companies {
            date: None,
            search: None,
        },
    });

    match command {
        Commands::Jobs {
            date,
            filter,
            search,
        } => app.jobs(date, filter.as_deref(), search.as_deref()).await,
        Commands::Companies { date, search } => app.companies(date, search.as_deref()).await,
        Commands::Company { name, search } => app.company(&name, search.as_deref()).await,
        Commands::Job { id } => {
            let job = app.api.job_detail(&id).await?;
            println!("{}", job_detail(&job, app.now));
            Ok(())
        }
        Commands::Sessions { limit } => app.sessions(limit).await,
        Commands::Session { id } => {
            let jobs = app.api.session_jobs(&id).await?;
            print_jobs(jobs.iter(), app.now);
            Ok(())
        }
        Commands::Scrape {
            role,
            location,
            platforms,
            max_jobs,
            resume,
        } => app.scrape(role, location, platforms, max_jobs, resume).await,
        Commands::History { command } => app.history(command).await,
        Commands::Prefs { date, view } => app.preferences(date, view),
        Commands::Sectionize { .. } => Ok(()),
    }
}

async fn sectionize_command(file: Option<&PathBuf>, json: bool) -> Result<(), Box<dyn Error>> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            input
        }
    };

    let text = to_plain_text(&raw);
    let sections = sectionize(Some(text.as_str()));
    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
    } else {
        println!("{}", render_sections(&sections));
    }
    Ok(())
}

fn print_jobs<'a>(jobs: impl ExactSizeIterator<Item = &'a Job>, now: DateTime<Utc>) {
    if jobs.len() == 0 {
        println!("No jobs found");
        return;
    }
    for job in jobs {
        println!("{}", job_line(job, now));
    }
}

impl App {
    /// Date window from the command line, saved as the new default
    fn date_filter(&mut self, date: Option<DateFilter>) -> Result<DateFilter, ClientError> {
        match date {
            Some(date) => {
                self.prefs.set_date_filter(date)?;
                Ok(date)
            }
            None => Ok(self.prefs.preferences().date_filter),
        }
    }

    async fn jobs(
        &mut self,
        date: Option<DateFilter>,
        filter: Option<&str>,
        search: Option<&str>,
    ) -> Result<(), Box<dyn Error>> {
        let date = self.date_filter(date)?;
        let page = self.api.jobs(self.config.jobs_limit, date).await?;

        println!(
            "{} job(s), {} new in the last 24 hours ({})",
            page.total, page.new_jobs_count, date
        );
        let counts = source_counts(&page.jobs);
        if !counts.is_empty() {
            let summary = counts
                .iter()
                .map(|(source, count)| format!("{} {}: {}", platform_icon(source), source, count))
                .collect::<Vec<_>>()
                .join("  ");
            println!("{summary}");
        }
        println!();

        let matching: Vec<Job> = filter_by_query(&page.jobs, filter)
            .into_iter()
            .cloned()
            .collect();
        let shown = search_jobs(&matching, search.unwrap_or(""));
        print_jobs(shown.into_iter(), self.now);
        Ok(())
    }

    async fn companies(
        &mut self,
        date: Option<DateFilter>,
        search: Option<&str>,
    ) -> Result<(), Box<dyn Error>> {
        let date = self.date_filter(date)?;
        let companies = match self.api.companies(date, None).await {
            Ok(companies) => companies,
            Err(e) => {
                warn!("Company listing unavailable ({}), grouping jobs locally", e);
                let page = self.api.jobs(self.config.jobs_limit, date).await?;
                companies_from_jobs(&page.jobs)
            }
        };

        let shown = search_companies(&companies, search.unwrap_or(""));
        if shown.is_empty() {
            println!("No companies found");
        }
        for company in shown {
            println!("{}", company_line(company, self.now));
        }
        Ok(())
    }

    async fn company(&self, name: &str, search: Option<&str>) -> Result<(), Box<dyn Error>> {
        let company = self.api.company_jobs(name).await?;
        let info = match self.api.company_info(name).await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("No company information for {}: {}", name, e);
                None
            }
        };

        let profile = CompanyProfile::build(&company.company_name, &company.jobs, info.as_ref());
        println!("{}", company_profile(&profile));

        let shown = search_company_jobs(&company.jobs, search.unwrap_or(""));
        print_jobs(shown.into_iter(), self.now);
        Ok(())
    }

    async fn sessions(&self, limit: Option<usize>) -> Result<(), Box<dyn Error>> {
        let limit = limit.unwrap_or(self.config.sessions_limit);
        let sessions = self.api.scrape_sessions(limit).await?;
        if sessions.is_empty() {
            println!("No scrape sessions yet");
        }
        for session in &sessions {
            println!("{}", session_line(session, self.now));
        }
        Ok(())
    }

    async fn scrape(
        &mut self,
        role: String,
        location: String,
        platforms: Vec<Platform>,
        max_jobs: u32,
        resume: bool,
    ) -> Result<(), Box<dyn Error>> {
        let mut builder = ScrapeRequest::builder()
            .role(role)
            .location(location)
            .max_jobs(max_jobs);
        if !platforms.is_empty() {
            builder = builder.platforms(platforms);
        }
        let mut request = builder.build()?;

        if resume {
            match self.api.search_metadata(&request.search_key()).await? {
                Some(metadata) => {
                    println!(
                        "Continuing after {} previously scraped job(s) (offset {})",
                        metadata.total_scraped, metadata.last_offset
                    );
                    request.continue_from_last = true;
                }
                None => println!("No earlier scrape for this search, starting fresh"),
            }
        }

        let date = self.prefs.preferences().date_filter;
        let workflow = ScrapeWorkflow::new(&self.api, self.config.poll.clone())
            .jobs_limit(self.config.jobs_limit)
            .date_filter(date);
        let baseline = workflow.baseline().await?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let platforms = request
            .platforms
            .iter()
            .map(Platform::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let prefs = &mut self.prefs;
        let now = self.now;
        let result = workflow
            .run(&request, baseline, &cancel, |_| {
                prefs.record_search(&request.role, &request.location, now.timestamp_millis())?;
                println!(
                    "Scraping '{}' on {} (press Ctrl-C to stop waiting)",
                    request.role, platforms
                );
                Ok(())
            })
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(ClientError::Cancelled) => {
                println!("Stopped waiting. The scrape keeps running on the server.");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        match &outcome {
            ScrapeOutcome::NewJobs { jobs, .. } => {
                println!("{} new job(s) found\n", jobs.len().saturating_sub(baseline))
            }
            ScrapeOutcome::TimedOut { attempts, .. } => println!(
                "No new jobs after {} check(s). The scrape may still be running.\n",
                attempts
            ),
        }
        let jobs = outcome.into_jobs();
        print_jobs(filter_by_query(&jobs, Some(request.role.as_str())).into_iter(), self.now);
        Ok(())
    }

    async fn history(&mut self, command: Option<HistoryCommands>) -> Result<(), Box<dyn Error>> {
        match command.unwrap_or(HistoryCommands::List) {
            HistoryCommands::List => {
                let history = &self.prefs.preferences().search_history;
                if history.is_empty() {
                    println!("No searches yet");
                    return Ok(());
                }

                let date = self.prefs.preferences().date_filter;
                let jobs = match self.api.jobs(self.config.jobs_limit, date).await {
                    Ok(page) => Some(page.jobs),
                    Err(e) => {
                        warn!("Could not count matching jobs: {}", e);
                        None
                    }
                };

                for item in history {
                    let mut line = item.query.clone();
                    if !item.location.is_empty() {
                        line.push_str(&format!(" in {}", item.location));
                    }
                    if let Some(jobs) = &jobs {
                        line.push_str(&format!(
                            " | {} job(s)",
                            history_match_count(jobs, &item.query)
                        ));
                    }
                    if let Some(at) = DateTime::from_timestamp_millis(item.timestamp) {
                        line.push_str(&format!(" | {}", relative_time(at, self.now)));
                    }
                    println!("{line}");
                }
            }
            HistoryCommands::Remove { query } => {
                if self.prefs.remove_search(&query)? {
                    println!("Removed '{query}'");
                } else {
                    println!("No search named '{query}'");
                }
            }
            HistoryCommands::Clear => {
                self.prefs.clear_history()?;
                println!("Search history cleared");
            }
        }
        Ok(())
    }

    fn preferences(
        &mut self,
        date: Option<DateFilter>,
        view: Option<ViewMode>,
    ) -> Result<(), Box<dyn Error>> {
        if let Some(date) = date {
            self.prefs.set_date_filter(date)?;
        }
        if let Some(view) = view {
            self.prefs.set_view_mode(view)?;
        }

        let prefs = self.prefs.preferences();
        println!("Preference file: {}", self.prefs.store().path().display());
        println!("Date filter: {}", prefs.date_filter);
        println!("View: {}", prefs.view_mode);
        println!("Saved searches: {}", prefs.search_history.len());
        Ok(())
    }
}

//! Crawlwatch main entry point
//!
//! This is the command-line interface for submitting crawls to the backend
//! and following the resulting tasks.

use anyhow::{bail, Context as _};
use clap::{Args, Parser, Subcommand};
use crawlwatch::aggregate::{self, DashboardStats, TaskCounts};
use crawlwatch::api::{SingleCrawlRequest, StructuredExtractionRequest};
use crawlwatch::config::{load_config_with_hash, validate, Config};
use crawlwatch::options::{build_config, CrawlConfig, RawCrawlInput};
use crawlwatch::output::{self, ResultSaver, ResultSink};
use crawlwatch::tracker::{Poller, TaskTracker};
use crawlwatch::CrawlClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Crawlwatch: submit and monitor crawls on a remote crawl service
///
/// Single-URL crawls and structured extractions return their result
/// directly. Batches run in the background as tasks that can be listed,
/// watched, cancelled and cleaned up.
#[derive(Parser, Debug)]
#[command(name = "crawlwatch")]
#[command(version = "1.0.0")]
#[command(about = "Submit and monitor crawls on a remote crawl service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend and its crawler are reachable
    Ping,

    /// Crawl a single URL and print the result
    Crawl {
        url: String,

        #[command(flatten)]
        options: CrawlArgs,

        /// Save the result as JSON under the export directory
        #[arg(long)]
        save: bool,
    },

    /// Crawl a URL and extract structured data described by a prompt
    Extract {
        url: String,

        /// What to extract, in natural language
        prompt: String,

        #[command(flatten)]
        options: CrawlArgs,

        #[arg(long)]
        save: bool,
    },

    /// Submit a batch of URLs as a background task
    Batch {
        /// URLs to crawl
        urls: Vec<String>,

        /// Read newline-delimited URLs from a file
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Number of URLs the backend crawls in parallel
        #[arg(long, value_name = "N")]
        concurrency: Option<u32>,

        /// Follow the task until it finishes
        #[arg(short, long)]
        watch: bool,

        #[command(flatten)]
        options: CrawlArgs,
    },

    /// List tasks
    Tasks,

    /// Show one task with its results
    Task {
        task_id: String,

        /// Write a markdown report to this path
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,

        /// Save the task's results as JSON under the export directory
        #[arg(long)]
        save: bool,
    },

    /// Show a task's progress counters
    Progress { task_id: String },

    /// Cancel running tasks
    Cancel {
        #[arg(required = true)]
        task_ids: Vec<String>,
    },

    /// Delete tasks
    Delete {
        #[arg(required_unless_present = "finished")]
        task_ids: Vec<String>,

        /// Delete every completed, failed or cancelled task
        #[arg(long, conflicts_with = "task_ids")]
        finished: bool,
    },

    /// Remove finished tasks older than the given age on the backend
    Cleanup {
        #[arg(long, value_name = "HOURS")]
        max_age_hours: Option<u32>,
    },

    /// Refresh the task list until no task is running
    Watch,

    /// Show dashboard statistics
    Stats,

    /// Manage projects
    Projects {
        #[command(subcommand)]
        action: Option<ProjectCommand>,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// List projects
    List,

    /// Create a project
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Show one project
    Show { project_id: String },

    /// Delete a project
    Delete { project_id: String },
}

/// Crawl options, layered over the `[crawl]` table of the configuration
#[derive(Args, Debug, Default)]
struct CrawlArgs {
    /// enabled, disabled, bypass, read_only or write_only
    #[arg(long)]
    cache_mode: Option<String>,

    /// Page load event to wait for
    #[arg(long)]
    wait_until: Option<String>,

    /// Page timeout in milliseconds (1000 to 300000)
    #[arg(long, value_name = "MS")]
    page_timeout: Option<i64>,

    /// CSS selector or JS condition to wait for
    #[arg(long)]
    wait_for: Option<String>,

    /// Seconds to wait before capturing the HTML
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    #[arg(long)]
    word_count_threshold: Option<i64>,

    #[arg(long)]
    css_selector: Option<String>,

    /// Tag to strip from the content; repeatable
    #[arg(long = "excluded-tag", value_name = "TAG")]
    excluded_tags: Vec<String>,

    #[arg(long)]
    excluded_selector: Option<String>,

    #[arg(long)]
    only_text: bool,

    #[arg(long)]
    screenshot: bool,

    #[arg(long)]
    pdf: bool,

    #[arg(long)]
    exclude_external_images: bool,

    /// Follow links from the start page
    #[arg(long)]
    deep_crawl: bool,

    /// Link depth for deep crawls (1 to 10); ignored unless deep crawl is on
    #[arg(long)]
    crawl_depth: Option<i64>,

    /// bfs, dfs or best_first
    #[arg(long)]
    crawl_strategy: Option<String>,

    #[arg(long)]
    exclude_external_links: bool,

    /// Keep links to social media sites
    #[arg(long)]
    include_social_media_links: bool,

    /// Domain whose links are dropped; repeatable
    #[arg(long = "exclude-domain", value_name = "DOMAIN")]
    exclude_domains: Vec<String>,

    /// JavaScript to run on the page; repeatable
    #[arg(long = "js-code", value_name = "SCRIPT")]
    js_code: Vec<String>,

    #[arg(long)]
    simulate_user: bool,

    #[arg(long)]
    override_navigator: bool,

    #[arg(long)]
    magic: bool,

    #[arg(long)]
    proxy_server: Option<String>,

    #[arg(long)]
    proxy_username: Option<String>,

    #[arg(long)]
    proxy_password: Option<String>,
}

impl CrawlArgs {
    fn into_raw(self) -> RawCrawlInput {
        RawCrawlInput {
            cache_mode: self.cache_mode,
            wait_until: self.wait_until,
            page_timeout: self.page_timeout,
            wait_for: self.wait_for,
            delay_before_return_html: self.delay,
            word_count_threshold: self.word_count_threshold,
            css_selector: self.css_selector,
            excluded_tags: self.excluded_tags,
            excluded_selector: self.excluded_selector,
            only_text: flag(self.only_text),
            screenshot: flag(self.screenshot),
            pdf: flag(self.pdf),
            exclude_external_images: flag(self.exclude_external_images),
            deep_crawl: flag(self.deep_crawl),
            crawl_depth: self.crawl_depth,
            crawl_strategy: self.crawl_strategy,
            exclude_external_links: flag(self.exclude_external_links),
            exclude_social_media_links: self.include_social_media_links.then_some(false),
            exclude_domains: self.exclude_domains,
            js_code: self.js_code,
            simulate_user: flag(self.simulate_user),
            override_navigator: flag(self.override_navigator),
            magic: flag(self.magic),
            proxy_server: self.proxy_server,
            proxy_username: self.proxy_username,
            proxy_password: self.proxy_password,
            experimental: None,
        }
    }
}

// An unset flag leaves the configured default in place.
fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_settings(&cli)?;
    let client = Arc::new(CrawlClient::from_config(&config.server)?);
    tracing::debug!("Using backend at {}", client.base_url());
    let tracker = TaskTracker::from_config(Arc::clone(&client), &config.tracker);

    match cli.command {
        Command::Ping => handle_ping(&client).await,
        Command::Crawl { url, options, save } => handle_crawl(&config, &client, &url, options, save).await,
        Command::Extract {
            url,
            prompt,
            options,
            save,
        } => handle_extract(&config, &client, &url, &prompt, options, save).await,
        Command::Batch {
            urls,
            file,
            concurrency,
            watch,
            options,
        } => handle_batch(&config, &tracker, urls, file, concurrency, watch, options).await,
        Command::Tasks => {
            tracker.fetch_all().await?;
            output::print_task_table(&tracker.snapshot());
            Ok(())
        }
        Command::Task {
            task_id,
            report,
            save,
        } => handle_task(&config, &tracker, &task_id, report, save).await,
        Command::Progress { task_id } => {
            let progress = client.task_progress(&task_id).await?;
            println!("{}", output::format_progress(&progress));
            Ok(())
        }
        Command::Cancel { task_ids } => handle_cancel(&tracker, &task_ids).await,
        Command::Delete { task_ids, finished } => handle_delete(&tracker, &task_ids, finished).await,
        Command::Cleanup { max_age_hours } => {
            let hours = max_age_hours.unwrap_or(config.tracker.cleanup_max_age_hours);
            let message = tracker.cleanup(hours).await?;
            println!("{}", message);
            output::print_task_table(&tracker.snapshot());
            Ok(())
        }
        Command::Watch => handle_watch(&tracker).await,
        Command::Stats => handle_stats(&tracker).await,
        Command::Projects { action } => handle_projects(&client, action.unwrap_or(ProjectCommand::List)).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawlwatch=info,warn"),
            1 => EnvFilter::new("crawlwatch=debug,info"),
            2 => EnvFilter::new("crawlwatch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, if any, and applies command-line overrides
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.server.base_url = base_url.clone();
        validate(&config)?;
    }
    Ok(config)
}

/// Merges command-line crawl options over the configured defaults
fn crawl_options(config: &Config, args: CrawlArgs) -> anyhow::Result<Option<CrawlConfig>> {
    let raw = config.crawl.clone().merge(args.into_raw());
    let built = build_config(&raw)?;
    Ok((!built.is_empty()).then_some(built))
}

async fn handle_ping(client: &CrawlClient) -> anyhow::Result<()> {
    if client.test_connection().await? {
        println!("✓ Backend reachable at {}", client.base_url());
        Ok(())
    } else {
        bail!("Backend at {} reported a problem", client.base_url())
    }
}

async fn handle_crawl(
    config: &Config,
    client: &CrawlClient,
    url: &str,
    options: CrawlArgs,
    save: bool,
) -> anyhow::Result<()> {
    let crawl_config = crawl_options(config, options)?;
    let request = SingleCrawlRequest::new(url, crawl_config)?;

    let outcome = client.crawl_single(&request).await?;
    output::print_outcome(&outcome);

    if save {
        let saver = ResultSaver::new(&config.output.export_dir)?;
        let path = saver.save_single(outcome.result(), request.config.as_ref())?;
        println!("✓ Saved to: {}", path.display());
    }
    Ok(())
}

async fn handle_extract(
    config: &Config,
    client: &CrawlClient,
    url: &str,
    prompt: &str,
    options: CrawlArgs,
    save: bool,
) -> anyhow::Result<()> {
    let crawl_config = crawl_options(config, options)?;
    let request = StructuredExtractionRequest::new(url, prompt, crawl_config)?;

    let outcome = client.extract_structured(&request).await?;
    output::print_outcome(&outcome);
    if let Some(data) = &outcome.result().extracted_data {
        println!("{}", serde_json::to_string_pretty(data)?);
    }

    if save {
        let saver = ResultSaver::new(&config.output.export_dir)?;
        let path = saver.save_extraction(&request.extraction_prompt, outcome.result(), request.config.as_ref())?;
        println!("✓ Saved to: {}", path.display());
    }
    Ok(())
}

async fn handle_batch(
    config: &Config,
    tracker: &TaskTracker,
    urls: Vec<String>,
    file: Option<PathBuf>,
    concurrency: Option<u32>,
    watch: bool,
    options: CrawlArgs,
) -> anyhow::Result<()> {
    let mut text = urls.join("\n");
    if let Some(path) = file {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read URL list {}", path.display()))?;
        text.push('\n');
        text.push_str(&contents);
    }

    let crawl_config = crawl_options(config, options)?;
    let task = aggregate::submit_batch(tracker, &text, crawl_config, concurrency).await?;
    println!("✓ Submitted task {} ({} URLs)", task.task_id, task.total_urls);

    if watch {
        handle_watch(tracker).await?;
        if let Some(finished) = tracker.get(&task.task_id) {
            output::print_task_detail(&finished);
        }
    }
    Ok(())
}

async fn handle_task(
    config: &Config,
    tracker: &TaskTracker,
    task_id: &str,
    report: Option<PathBuf>,
    save: bool,
) -> anyhow::Result<()> {
    let task = tracker.fetch_one(task_id).await?;
    output::print_task_detail(&task);

    if let Some(path) = report {
        output::write_task_report(&task, &path)?;
        println!("✓ Report written to: {}", path.display());
    }
    if save {
        let saver = ResultSaver::new(&config.output.export_dir)?;
        let path = saver.save_batch(&task, None)?;
        println!("✓ Saved to: {}", path.display());
    }
    Ok(())
}

async fn handle_cancel(tracker: &TaskTracker, task_ids: &[String]) -> anyhow::Result<()> {
    if let Err(e) = tracker.fetch_all().await {
        tracing::warn!("Could not load tasks before cancelling: {}", e);
    }

    if let [task_id] = task_ids {
        let message = tracker.cancel(task_id).await?;
        println!("{}", message);
        return Ok(());
    }

    let report = aggregate::cancel_many(tracker, task_ids).await;
    println!("{}", report);
    match report.failed {
        Some((_, e)) => Err(e.into()),
        None => Ok(()),
    }
}

async fn handle_delete(tracker: &TaskTracker, task_ids: &[String], finished: bool) -> anyhow::Result<()> {
    if let Err(e) = tracker.fetch_all().await {
        tracing::warn!("Could not load tasks before deleting: {}", e);
    }

    let report = if finished {
        aggregate::delete_finished(tracker).await
    } else if let [task_id] = task_ids {
        let message = tracker.delete(task_id).await?;
        println!("{}", message);
        return Ok(());
    } else {
        aggregate::delete_many(tracker, task_ids).await
    };

    println!("{}", report);
    match report.failed {
        Some((_, e)) => Err(e.into()),
        None => Ok(()),
    }
}

/// Follows tasks in the foreground until none is running or Ctrl-C
async fn handle_watch(tracker: &TaskTracker) -> anyhow::Result<()> {
    let follow = Poller::run_until_idle(tracker, |transitions, tasks| {
        for t in transitions {
            println!("• {}", t);
        }
        let counts = TaskCounts::from_tasks(tasks);
        println!(
            "{} running, {} pending, {} completed, {} failed",
            counts.running, counts.pending, counts.completed, counts.failed
        );
    });

    tokio::select! {
        result = follow => result?,
        _ = tokio::signal::ctrl_c() => {
            tracker.close_view();
            tracing::info!("Stopped watching; tasks keep running on the backend");
        }
    }
    Ok(())
}

async fn handle_stats(tracker: &TaskTracker) -> anyhow::Result<()> {
    tracker.fetch_all().await?;
    let projects = tracker.client().list_projects().await?;
    let tasks = tracker.snapshot();

    let stats = DashboardStats::derive(&tasks, &projects);
    output::print_dashboard(&stats, &TaskCounts::from_tasks(&tasks));
    Ok(())
}

async fn handle_projects(client: &CrawlClient, action: ProjectCommand) -> anyhow::Result<()> {
    match action {
        ProjectCommand::List => {
            output::print_projects(&client.list_projects().await?);
        }
        ProjectCommand::Create { name, description } => {
            let project = client.create_project(&name, description.as_deref()).await?;
            println!("✓ Created project {} ({})", project.name, project.project_id);
        }
        ProjectCommand::Show { project_id } => {
            output::print_projects(&[client.get_project(&project_id).await?]);
        }
        ProjectCommand::Delete { project_id } => {
            println!("{}", client.delete_project(&project_id).await?);
        }
    }
    Ok(())
}

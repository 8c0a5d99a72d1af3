use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commitpulse::config::Config;
use commitpulse::git::{
    group_by_origin, AuthorFilter, GitRepo, MultiRepoAggregator, StatsAggregator,
    DEFAULT_DISCOVERY_DEPTH,
};
use commitpulse::output::{console, report_metadata, CommitGroup, Metadata, Reporter};
use commitpulse::patterns::{group_by_author, search, CommitFilter};
use commitpulse::{Commit, TimeWindow};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository path (any directory inside the working copy)
    #[arg(short, long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Configuration file, instead of the default search locations
    #[arg(long, global = true, env = "COMMITPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List commits in a period
    Commits {
        #[command(flatten)]
        period: PeriodArgs,

        /// Author name, team alias, or "me"
        #[arg(short, long)]
        author: Option<String>,

        /// Group the listing
        #[arg(short, long, value_enum)]
        group_by: Option<GroupBy>,

        /// Keep only messages containing one of these comma-separated keywords
        #[arg(long)]
        include: Option<String>,

        /// Drop messages containing one of these comma-separated keywords
        #[arg(short = 'x', long)]
        exclude: Option<String>,

        #[command(flatten)]
        export: ExportArgs,
    },
    /// Line and file statistics per author
    Stats {
        #[command(flatten)]
        period: PeriodArgs,

        #[arg(short, long)]
        author: Option<String>,

        /// How many authors to list
        #[arg(long, default_value = "10")]
        top: usize,
    },
    /// Compare the last N days with the N days before
    Compare {
        #[arg(short, long, default_value = "7")]
        days: i64,

        #[arg(short, long)]
        author: Option<String>,
    },
    /// Group commits by referenced ticket
    Tickets {
        #[command(flatten)]
        period: PeriodArgs,

        #[arg(short, long)]
        author: Option<String>,

        #[command(flatten)]
        export: ExportArgs,
    },
    /// Search commit messages
    Search {
        keyword: String,

        #[command(flatten)]
        period: PeriodArgs,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(long)]
        case_sensitive: bool,
    },
    /// Merge commits from several repositories
    Multirepo {
        /// Comma-separated repository paths
        #[arg(long, value_delimiter = ',')]
        repos: Vec<PathBuf>,

        /// Discover repositories under this directory
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Discovery depth below the workspace
        #[arg(long, default_value_t = DEFAULT_DISCOVERY_DEPTH)]
        depth: usize,

        #[command(flatten)]
        period: PeriodArgs,

        #[arg(short, long)]
        author: Option<String>,

        /// Group the listing by repository
        #[arg(long)]
        by_repo: bool,

        #[command(flatten)]
        export: ExportArgs,
    },
    /// List everyone who committed in a period
    Authors {
        #[command(flatten)]
        period: PeriodArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupBy {
    Component,
    Author,
    Ticket,
}

/// Period selection. The first option given wins, in the order listed.
#[derive(Args, Clone)]
struct PeriodArgs {
    /// Start date (YYYY-MM-DD); the end defaults to today
    #[arg(long)]
    from: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Calendar month (1-12)
    #[arg(long)]
    month: Option<u32>,

    /// Year for --month, defaults to the current year
    #[arg(long, requires = "month")]
    year: Option<i32>,

    /// Last N days including today
    #[arg(short, long)]
    days: Option<i64>,

    #[arg(long)]
    last_week: bool,

    #[arg(long)]
    week: bool,

    #[arg(long)]
    yesterday: bool,

    /// The default
    #[arg(long)]
    today: bool,
}

impl PeriodArgs {
    fn window(&self) -> commitpulse::Result<TimeWindow> {
        if let Some(from) = &self.from {
            let today = Local::now().date_naive().to_string();
            return TimeWindow::custom(from, self.to.as_deref().unwrap_or(&today));
        }
        if let Some(month) = self.month {
            let year = self.year.unwrap_or_else(|| Local::now().year());
            return TimeWindow::month(year, month);
        }
        if let Some(days) = self.days {
            return TimeWindow::last_n_days(days);
        }
        if self.last_week {
            return TimeWindow::last_week();
        }
        if self.week {
            return TimeWindow::this_week();
        }
        if self.yesterday {
            return TimeWindow::yesterday();
        }
        TimeWindow::today()
    }
}

#[derive(Args, Clone)]
struct ExportArgs {
    /// Export format (json, markdown, html, email)
    #[arg(short, long)]
    format: Option<String>,

    /// Export file; the format's extension is added when missing
    #[arg(short, long)]
    output: Option<String>,

    /// Report title
    #[arg(long)]
    title: Option<String>,
}

impl ExportArgs {
    fn requested(&self) -> bool {
        self.format.is_some() || self.output.is_some()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match &cli.command {
        Command::Commits {
            period,
            author,
            group_by,
            include,
            exclude,
            export,
        } => {
            let window = period.window()?;
            let author = config.effective_author(author.as_deref());
            let repo = open_repo(&cli)?;
            let commits = repo.list_commits(&window, AuthorFilter::parse(author.as_deref()).as_ref())?;
            let commits =
                CommitFilter::from_lists(include.as_deref(), exclude.as_deref()).apply(&commits);

            let groups = match group_by {
                Some(GroupBy::Component) => Some(config.categorizer().group_commits(&commits)),
                Some(GroupBy::Author) => Some(group_by_author(&commits)),
                Some(GroupBy::Ticket) => Some(config.ticket_extractor()?.commit_groups(&commits)),
                None => None,
            };

            if export.requested() {
                let metadata = report_metadata(
                    export.title.as_deref(),
                    &window,
                    author.as_deref(),
                    &config.team.members,
                );
                write_export(&config, export, &commits, &metadata, groups.as_deref())?;
            } else {
                print!("{}", console::header("Commits", &window, commits.len()));
                match &groups {
                    Some(groups) => print!("{}", console::group_lines(groups, false)),
                    None => print!("{}", console::commit_lines(&commits, false)),
                }
            }
        }
        Command::Stats {
            period,
            author,
            top,
        } => {
            let window = period.window()?;
            let author = config.effective_author(author.as_deref());
            let repo = open_repo(&cli)?;

            let pb = spinner("Computing diff statistics...")?;
            let stats = StatsAggregator::new(&repo)
                .compute(&window, AuthorFilter::parse(author.as_deref()).as_ref())?;
            pb.finish_and_clear();

            print!("{}", console::header("Statistics", &window, stats.total_commits));
            print!("{}", console::stats_summary(&stats, *top));
        }
        Command::Compare { days, author } => {
            let current = TimeWindow::last_n_days(*days)?;
            let previous = TimeWindow::previous_n_days(*days)?;
            let author = config.effective_author(author.as_deref());
            let filter = AuthorFilter::parse(author.as_deref());
            let repo = open_repo(&cli)?;

            let pb = spinner("Computing statistics for both periods...")?;
            let aggregator = StatsAggregator::new(&repo);
            let before = aggregator.compute(&previous, filter.as_ref())?;
            let after = aggregator.compute(&current, filter.as_ref())?;
            pb.finish_and_clear();

            println!(
                "{} {} vs {}",
                "Comparing".bright_cyan().bold(),
                current.to_string().bright_white(),
                previous.to_string().bright_white()
            );
            print!("{}", console::comparison_table(&before, &after, &before.compare(&after)));
        }
        Command::Tickets {
            period,
            author,
            export,
        } => {
            let window = period.window()?;
            let author = config.effective_author(author.as_deref());
            let repo = open_repo(&cli)?;
            let commits = repo.list_commits(&window, AuthorFilter::parse(author.as_deref()).as_ref())?;
            let groups = config.ticket_extractor()?.commit_groups(&commits);

            if export.requested() {
                let metadata = report_metadata(
                    export.title.as_deref(),
                    &window,
                    author.as_deref(),
                    &config.team.members,
                );
                write_export(&config, export, &commits, &metadata, Some(groups.as_slice()))?;
            } else {
                print!("{}", console::header("Tickets", &window, commits.len()));
                print!("{}", console::group_lines(&groups, false));
            }
        }
        Command::Search {
            keyword,
            period,
            author,
            case_sensitive,
        } => {
            let window = period.window()?;
            let author = config.effective_author(author.as_deref());
            let repo = open_repo(&cli)?;
            let commits = repo.list_commits(&window, AuthorFilter::parse(author.as_deref()).as_ref())?;
            let matches = search(&commits, keyword, *case_sensitive);

            print!("{}", console::header(&format!("Search \"{}\"", keyword), &window, matches.len()));
            print!("{}", console::commit_lines(&matches, false));
        }
        Command::Multirepo {
            repos,
            workspace,
            depth,
            period,
            author,
            by_repo,
            export,
        } => {
            let window = period.window()?;
            let author = config.effective_author(author.as_deref());

            let aggregator = match workspace {
                Some(base) => {
                    let found = MultiRepoAggregator::discover(base, *depth);
                    println!(
                        "Found {} repositories under {}",
                        found.paths().len().to_string().bright_white(),
                        base.display()
                    );
                    found
                }
                None if !repos.is_empty() => MultiRepoAggregator::new(repos.as_slice()),
                None => anyhow::bail!("Specify --workspace or --repos"),
            };

            let pb = spinner("Collecting commits...")?;
            let commits =
                aggregator.collect(&window, AuthorFilter::parse(author.as_deref()).as_ref());
            pb.finish_and_clear();

            let groups = by_repo.then(|| group_by_origin(&commits));
            if export.requested() {
                let metadata = report_metadata(
                    export.title.as_deref(),
                    &window,
                    author.as_deref(),
                    &config.team.members,
                );
                write_export(&config, export, &commits, &metadata, groups.as_deref())?;
            } else {
                print!("{}", console::header("Commits across repositories", &window, commits.len()));
                match &groups {
                    Some(groups) => print!("{}", console::group_lines(groups, false)),
                    None => print!("{}", console::commit_lines(&commits, true)),
                }
            }
        }
        Command::Authors { period } => {
            let window = period.window()?;
            let repo = open_repo(&cli)?;
            let authors = repo.authors(&window)?;

            print!("{}", console::header("Authors", &window, authors.len()));
            print!("{}", console::author_lines(&authors, &config.team.members));
        }
    }

    Ok(())
}

fn open_repo(cli: &Cli) -> Result<GitRepo> {
    let repo = GitRepo::open(&cli.repo)?;
    info!("Using repository {}", repo.path().display());
    Ok(repo)
}

fn write_export(
    config: &Config,
    export: &ExportArgs,
    commits: &[Commit],
    metadata: &Metadata,
    groups: Option<&[CommitGroup]>,
) -> Result<()> {
    let format = export
        .format
        .as_deref()
        .unwrap_or(config.defaults.format.as_str());
    let reporter = Reporter::new(format, export.output.as_deref())?;
    reporter.generate_report(commits, Some(metadata), groups)?;

    if let Some(path) = reporter.output_path() {
        eprintln!(
            "{} {}",
            "Report saved to".bright_green().bold(),
            path.display()
        );
    }
    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

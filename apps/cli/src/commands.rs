//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use sitesearch_core::{
    CrawlSiteConfig, CrawlSummary, FragmentWriter, ProgressReporter, STDOUT_PATH,
};
use sitesearch_discovery::DiscoveryOptions;
use sitesearch_shared::{AppConfig, CrawlConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SiteSearch: turn a website into searchable text fragments.
#[derive(Parser)]
#[command(
    name = "sitesearch",
    version,
    about = "Crawl a site's sitemap and extract text fragments with structural context as JSON lines.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl every page listed in the site's sitemaps.
    Crawl {
        /// Site homepage.
        homepage: String,

        /// Use this sitemap instead of looking for one.
        #[arg(long)]
        sitemap: Option<String>,

        /// Number of pages fetched concurrently.
        #[arg(short, long)]
        workers: Option<u32>,

        /// Output file (`-` for stdout).
        #[arg(short, long)]
        out: Option<String>,

        /// Delay in milliseconds before each page request.
        #[arg(long)]
        rate_limit_ms: Option<u64>,
    },

    /// List the page URLs found in the site's sitemaps.
    Sitemap {
        /// Site homepage.
        homepage: String,

        /// Use this sitemap instead of looking for one.
        #[arg(long)]
        sitemap: Option<String>,
    },

    /// Extract fragments from a local HTML file.
    Extract {
        /// HTML file to read.
        file: PathBuf,

        /// URL the page was published at.
        #[arg(long)]
        url: String,

        /// Output file (`-` for stdout).
        #[arg(short, long, default_value = STDOUT_PATH)]
        out: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so fragments can
/// be streamed on stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sitesearch=info",
        1 => "sitesearch=debug",
        _ => "sitesearch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Crawl {
            homepage,
            sitemap,
            workers,
            out,
            rate_limit_ms,
        } => {
            cmd_crawl(
                &homepage,
                sitemap.as_deref(),
                workers,
                out.as_deref(),
                rate_limit_ms,
            )
            .await
        }
        Command::Sitemap { homepage, sitemap } => cmd_sitemap(&homepage, sitemap.as_deref()).await,
        Command::Extract { file, url, out } => cmd_extract(&file, &url, &out),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn parse_url(kind: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| eyre!("invalid {kind} URL '{raw}': {e}"))
}

async fn cmd_crawl(
    homepage: &str,
    sitemap: Option<&str>,
    workers: Option<u32>,
    out: Option<&str>,
    rate_limit_ms: Option<u64>,
) -> Result<()> {
    let config = load_config()?;

    let homepage = parse_url("homepage", homepage)?;
    let sitemap_url = sitemap.map(|s| parse_url("sitemap", s)).transpose()?;

    let mut crawl = CrawlConfig::from(&config);
    if let Some(workers) = workers {
        if workers == 0 {
            return Err(eyre!("--workers must be at least 1"));
        }
        crawl.workers = workers;
    }
    if let Some(ms) = rate_limit_ms {
        crawl.rate_limit_ms = ms;
    }

    let site_config = CrawlSiteConfig {
        homepage,
        sitemap_url,
        output: out.map(String::from).unwrap_or(config.defaults.output),
        crawl,
    };

    info!(
        homepage = %site_config.homepage,
        output = %site_config.output,
        workers = site_config.crawl.workers,
        "crawling site"
    );

    let reporter = CliProgress::new();
    let summary = sitesearch_core::crawl_site(&site_config, &reporter).await?;

    // Keep stdout clean when it carries the fragments.
    let report = |line: String| {
        if site_config.output == STDOUT_PATH {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };

    report(String::new());
    report("  Crawl finished".into());
    report(format!("  Pages:     {}", summary.pages_total));
    report(format!("  Extracted: {}", summary.pages_extracted));
    report(format!("  Failed:    {}", summary.pages_failed));
    report(format!("  Skipped:   {}", summary.pages_skipped));
    report(format!("  Fragments: {}", summary.fragments));
    report(format!("  Output:    {}", site_config.output));
    report(format!("  Time:      {:.1}s", summary.elapsed.as_secs_f64()));
    for (url, error) in &summary.errors {
        report(format!("  ! {url}: {error}"));
    }
    report(String::new());

    Ok(())
}

async fn cmd_sitemap(homepage: &str, sitemap: Option<&str>) -> Result<()> {
    let config = load_config()?;

    let homepage = parse_url("homepage", homepage)?;
    let sitemap_url = sitemap.map(|s| parse_url("sitemap", s)).transpose()?;

    let opts = DiscoveryOptions {
        timeout_secs: config.defaults.timeout_secs,
        max_depth: config.crawl_policies.max_sitemap_depth,
    };

    let entries =
        sitesearch_discovery::collect_page_urls(&homepage, sitemap_url.as_ref(), &opts).await?;

    for entry in &entries {
        match homepage.join(entry) {
            Ok(url) => println!("{url}"),
            Err(_) => println!("{entry}"),
        }
    }

    info!(count = entries.len(), "sitemap listing complete");
    Ok(())
}

fn cmd_extract(file: &std::path::Path, url: &str, out: &str) -> Result<()> {
    let url = parse_url("page", url)?;
    let fragments = sitesearch_core::extract_file(file, &url)?;

    let mut writer = FragmentWriter::create(out)?;
    writer.write_page(&fragments)?;

    info!(file = %file.display(), fragments = fragments.len(), "page extracted");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner that turns into a bar
/// once the page count is known.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn page_done(&self, url: &str, current: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
            self.bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {wide_bar} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
        }
        self.bar.set_position(current as u64);
        self.bar.set_message(url.to_string());
    }

    fn done(&self, _summary: &CrawlSummary) {
        self.bar.finish_and_clear();
    }
}

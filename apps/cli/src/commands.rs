//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use briefwright_core::{Collaborators, ProgressReporter, StaticOutline, build_package};
use briefwright_shared::{
    AppConfig, CandidateSource, ContentPackage, init_config, init_config_at, load_config,
    load_config_from, validate_config,
};
use briefwright_vetting::{SourceVetter, VettingPolicy, normalize_url};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// briefwright: vetted sources, bounded slides, meaningful charts.
#[derive(Parser)]
#[command(
    name = "briefwright",
    version,
    about = "Turn a request into a vetted, renderer-agnostic content package.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.briefwright/briefwright.toml.
    #[arg(long, global = true, env = "BRIEFWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Build a content package for a request.
    Build {
        /// The request, e.g. "ant life cycle report".
        prompt: String,

        /// Outline JSON produced by the text-generation step.
        #[arg(long)]
        outline: PathBuf,

        /// Override the minimum vetted-source count.
        #[arg(long)]
        min_sources: Option<usize>,

        /// Write the package JSON here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Score and vet a single source.
    Vet {
        url: String,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        snippet: String,
    },

    /// Print the canonical form of a URL.
    NormalizeUrl { url: String },

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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "briefwright=info",
        1 => "briefwright=debug",
        _ => "briefwright=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
    let config_path = cli.config;
    match cli.command {
        Command::Build {
            prompt,
            outline,
            min_sources,
            out,
        } => {
            cmd_build(
                config_path.as_deref(),
                &prompt,
                &outline,
                min_sources,
                out.as_deref(),
            )
            .await
        }
        Command::Vet {
            url,
            title,
            snippet,
        } => cmd_vet(config_path.as_deref(), &url, &title, &snippet),
        Command::NormalizeUrl { url } => {
            println!("{}", normalize_url(&url));
            Ok(())
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path.as_deref()),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Resolve the config and apply command-line overrides, re-validating the result.
fn build_config(path: Option<&Path>, min_sources: Option<usize>) -> Result<AppConfig> {
    let mut config = resolve_config(path)?;
    if let Some(n) = min_sources {
        config.harvest.min_required = n;
    }
    validate_config(&config).wrap_err("invalid command-line override")?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(
    config_path: Option<&Path>,
    prompt: &str,
    outline_path: &Path,
    min_sources: Option<usize>,
    out: Option<&Path>,
) -> Result<()> {
    let config = build_config(config_path, min_sources)?;

    let outline = StaticOutline::from_file(outline_path)?;
    let collaborators = Collaborators::from_config(&config, Arc::new(outline))?;

    info!(prompt, min_sources = config.harvest.min_required, "building content package");

    let reporter = CliProgress::new();
    let result = build_package(prompt, &config, &collaborators, &reporter).await;
    reporter.spinner.finish_and_clear();
    let package = result?;

    let json = serde_json::to_string_pretty(&package)?;
    match out {
        Some(path) => {
            std::fs::write(path, json)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            print_summary(&package, path);
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn print_summary(package: &ContentPackage, path: &Path) {
    let fillers = package.slides.iter().filter(|s| s.is_filler).count();
    println!();
    println!("  Content package built!");
    println!("  ID:      {}", package.task_id);
    println!("  Title:   {}", package.title);
    println!("  Slides:  {} ({fillers} filler)", package.slides.len());
    println!("  Charts:  {}", package.charts.len());
    println!(
        "  Sources: {} of {} required{}, {} cited",
        package.sourcing.achieved,
        package.sourcing.required,
        if package.sourcing.rigorous { " (rigorous)" } else { "" },
        package.sourcing.cited
    );
    for record in &package.harvest_log {
        println!(
            "           {} +{} → {}",
            record.round, record.added_count, record.cumulative_vetted_count
        );
    }
    println!("  Path:    {}", path.display());
    println!();
}

fn cmd_vet(config_path: Option<&Path>, url: &str, title: &str, snippet: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(eyre!("a URL is required"));
    }
    let config = resolve_config(config_path)?;
    let vetter = SourceVetter::new(VettingPolicy::from(&config.vetting));

    let score = vetter.score_source(url, title, snippet);
    let verdict = match vetter.vet(&CandidateSource::new(url, title, snippet)) {
        Some(source) => format!("vetted ({:?})", source.admission).to_lowercase(),
        None => "rejected".to_string(),
    };

    println!("  URL:        {}", normalize_url(url));
    println!("  Score:      {score:.2} (minimum {:.2})", config.vetting.min_score);
    println!("  Verdict:    {verdict}");
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(p) => init_config_at(p)?,
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn sources(&self, achieved: usize, required: usize) {
        self.spinner
            .set_message(format!("Vetted sources: {achieved}/{required}"));
    }

    fn done(&self, _package: &ContentPackage) {
        self.spinner.finish_and_clear();
    }
}

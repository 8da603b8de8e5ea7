use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use glean_core::{
    DEFAULT_GALLERY_SIZE, Extractor, ExtractorConfig, OutputFormat, RawDocument, fetch_file, fetch_stdin, fetch_url,
};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL used to resolve links when a file or stdin is read without `--base-url`
const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Extract a clean article record (title, body, byline, date, images) from a web page
#[derive(Parser, Debug)]
#[command(name = "glean")]
#[command(author = "Glean Contributors")]
#[command(version)]
#[command(about = "Extract clean article records from web pages", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Page URL for file or stdin input, used for relative images and the site name
    #[arg(long, value_name = "URL")]
    base_url: Option<Url>,

    /// Output format (json, text, markdown)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "15", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, env = "GLEAN_USER_AGENT", value_name = "UA")]
    user_agent: Option<String>,

    /// Minimum body length in characters before the record is rejected
    #[arg(long, default_value = "100", value_name = "CHARS")]
    min_content: usize,

    /// Emit the record even when the body is shorter than --min-content
    #[arg(long)]
    allow_short: bool,

    /// Number of images listed in text and markdown output
    #[arg(long, default_value_t = DEFAULT_GALLERY_SIZE, value_name = "NUM")]
    gallery: usize,

    /// Run the two extraction strategies one after the other
    #[arg(long)]
    sequential: bool,

    /// Enable debug logging, field sources and timings
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "glean=debug,glean_core=debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

fn build_config(args: &Args) -> ExtractorConfig {
    let mut builder = ExtractorConfig::builder().timeout(args.timeout).parallel(!args.sequential);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    builder.build()
}

async fn read_input(args: &Args, config: &ExtractorConfig) -> anyhow::Result<RawDocument> {
    if is_url(&args.input) {
        if args.verbose {
            echo::print_step(1, 3, &format!("Fetching {}", args.input.bright_white().underline()));
        }
        return fetch_url(&args.input, &config.fetch)
            .await
            .with_context(|| format!("Failed to fetch {}", args.input));
    }

    let html = if args.input == "-" {
        if args.verbose {
            echo::print_step(1, 3, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else {
        if args.verbose {
            echo::print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    let base_url = args.base_url.as_ref().map_or(DEFAULT_BASE_URL, Url::as_str);
    RawDocument::new(html, base_url).with_context(|| format!("Invalid base URL: {}", base_url))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
    }

    let started = Instant::now();
    let extractor = Extractor::with_config(build_config(&args));
    let raw = read_input(&args, extractor.config()).await?;

    if args.verbose {
        echo::print_field("Size", echo::format_size(raw.html().len()));
        echo::print_field("Site", raw.hostname());
        echo::print_step(2, 3, "Extracting article");
    }

    let (article, report) = extractor.extract_document_with_report(&raw);
    debug!(url = %article.url, chars = article.content.chars().count(), "extraction finished");

    if args.verbose {
        echo::print_report(&article, &report, started.elapsed());
    }

    if args.allow_short {
        if !article.has_sufficient_content(args.min_content) {
            echo::print_warning(&format!(
                "Body is shorter than {} characters, keeping it because of --allow-short",
                args.min_content
            ));
        }
    } else {
        article
            .ensure_sufficient_content(args.min_content)
            .context("Extracted body is too short (pass --allow-short to keep it)")?;
    }

    if args.verbose {
        echo::print_step(3, 3, &format!("Rendering {:?}", args.format));
    }

    let mut output = article.render(args.format, args.gallery).context("Failed to render article")?;
    if !output.ends_with('\n') {
        output.push('\n');
    }

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", output),
    }

    Ok(())
}

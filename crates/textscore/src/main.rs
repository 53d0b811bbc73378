use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use textscore_core::cache::{ArticleCache, CachedSource};
use textscore_core::config::{Config, CONFIG_FILE};
use textscore_core::lexicon::Lexicons;
use textscore_core::pipeline::BatchPipeline;
use textscore_core::source::ArticleSource;

use textscore_fetch::HttpArticleSource;
use textscore_report::{json, markdown, text};

#[derive(Parser)]
#[command(name = "textscore")]
#[command(about = "Fetch articles and score their readability and sentiment")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every article listed in the input file and append its metrics to the output file
    Analyze {
        /// Input CSV with URL_ID and URL columns (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output CSV (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Config file path (defaults to the nearest .textscore.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Worker threads, 0 for one per CPU (overrides config)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Skip the random delay before each request
        #[arg(long)]
        no_delay: bool,
        /// Summary format
        #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
        format: SummaryFormat,
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Score a local text file, or stdin when the path is "-"
    Score {
        /// Text file to score
        path: PathBuf,
        /// Config file path (defaults to the nearest .textscore.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Create a default .textscore.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SummaryFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
    Markdown,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            input,
            output,
            config,
            jobs,
            no_delay,
            format,
            compact,
        } => cmd_analyze(
            AnalyzeOverrides {
                input,
                output,
                jobs,
                no_delay,
            },
            config.as_deref(),
            format,
            compact,
        ),
        Commands::Score {
            path,
            config,
            format,
            compact,
        } => cmd_score(&path, config.as_deref(), format, compact),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "textscore={level},textscore_core={level},textscore_fetch={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct AnalyzeOverrides {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    jobs: Option<usize>,
    no_delay: bool,
}

fn cmd_analyze(
    overrides: AnalyzeOverrides,
    config_path: Option<&Path>,
    format: SummaryFormat,
    compact: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(input) = overrides.input {
        config.batch.input = input;
    }
    if let Some(output) = overrides.output {
        config.batch.output = output;
    }
    if let Some(jobs) = overrides.jobs {
        config.batch.jobs = jobs;
    }

    let lexicons = Lexicons::load(&config.lexicon);

    let mut http =
        HttpArticleSource::new(&config.fetch).context("failed to initialize article source")?;
    if overrides.no_delay {
        http = http.no_delay();
    }
    let source: Box<dyn ArticleSource> = match &config.fetch.cache_dir {
        Some(dir) => {
            info!(cache_dir = %dir.display(), "caching fetched articles");
            Box::new(CachedSource::new(http, ArticleCache::new(dir)))
        }
        None => Box::new(http),
    };

    let summary = BatchPipeline::new(source, lexicons, config.batch).run()?;
    let report = match format {
        SummaryFormat::Text => text::format_summary(&summary),
        SummaryFormat::Json => json::format_summary(&summary, compact),
    };
    println!("{report}");
    Ok(())
}

fn cmd_score(
    path: &Path,
    config_path: Option<&Path>,
    format: ReportFormat,
    compact: bool,
) -> Result<()> {
    let (source, content) = if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        ("stdin".to_string(), content)
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        (path.display().to_string(), content)
    };

    let config = load_config(config_path)?;
    let lexicons = Lexicons::load(&config.lexicon);
    let metrics = lexicons.score(&content);

    let report = match format {
        ReportFormat::Text => text::format_metrics(&source, &metrics),
        ReportFormat::Json => json::format_metrics(&source, &metrics, compact),
        ReportFormat::Markdown => markdown::format_metrics(&source, &metrics),
    };
    println!("{report}");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE}"))?;
    println!("Created {CONFIG_FILE} with default configuration.");
    Ok(())
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => {
            let cwd = std::env::current_dir().context("failed to determine working directory")?;
            Ok(Config::load_or_default(&cwd))
        }
    }
}

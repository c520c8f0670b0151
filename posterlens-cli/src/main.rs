//! Posterlens CLI - summarize poster accessibility evaluations

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output
// - Logs go to stderr; stdout carries only the report

use anyhow::Context;
use clap::{Parser, Subcommand};
use posterlens_core::config::{self, FontPolicyKind, Overrides, ResolutionPolicyKind};
use posterlens_core::detail::detail_json;
use posterlens_core::policy::{FontPolicy, GradeBands, ResolutionPolicy};
use posterlens_core::store::SessionStore;
use posterlens_core::{render_json, render_text, summarize_stored, MetricFamily, ResolvedConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "posterlens")]
#[command(about = "Summarize poster accessibility evaluation results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize every metric family of an evaluation payload
    Summarize {
        /// Path to the evaluation service's JSON response
        payload: PathBuf,

        /// Base URL joined with relative asset paths (overrides config file)
        #[arg(long)]
        base_url: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Font size policy (overrides config file)
        #[arg(long)]
        font_policy: Option<FontPolicyArg>,

        /// Resolution policy (overrides config file)
        #[arg(long)]
        resolution_policy: Option<ResolutionPolicyArg>,
    },
    /// Print display rows of one metric family as JSON
    Detail {
        /// Path to the evaluation service's JSON response
        payload: PathBuf,

        /// Metric family to show
        #[arg(long)]
        metric: MetricArg,

        /// Base URL joined with relative asset paths (overrides config file)
        #[arg(long)]
        base_url: Option<String>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the normalized analysis snapshot as JSON
    Snapshot {
        /// Path to the evaluation service's JSON response
        payload: PathBuf,

        /// Base URL joined with relative asset paths (overrides config file)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Validate or show a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without evaluating anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum FontPolicyArg {
    Single,
    TypeAware,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ResolutionPolicyArg {
    Dpi,
    Dimensions,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MetricArg {
    Contrast,
    Font,
    Logo,
    Resolution,
    Hyperlinks,
    Authors,
    Tables,
    Diagrams,
}

impl From<FontPolicyArg> for FontPolicyKind {
    fn from(arg: FontPolicyArg) -> Self {
        match arg {
            FontPolicyArg::Single => FontPolicyKind::SingleThreshold,
            FontPolicyArg::TypeAware => FontPolicyKind::TypeAware,
        }
    }
}

impl From<ResolutionPolicyArg> for ResolutionPolicyKind {
    fn from(arg: ResolutionPolicyArg) -> Self {
        match arg {
            ResolutionPolicyArg::Dpi => ResolutionPolicyKind::Dpi,
            ResolutionPolicyArg::Dimensions => ResolutionPolicyKind::Dimensions,
        }
    }
}

impl From<MetricArg> for MetricFamily {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Contrast => MetricFamily::Contrast,
            MetricArg::Font => MetricFamily::Font,
            MetricArg::Logo => MetricFamily::Logo,
            MetricArg::Resolution => MetricFamily::Resolution,
            MetricArg::Hyperlinks => MetricFamily::Hyperlinks,
            MetricArg::Authors => MetricFamily::Authors,
            MetricArg::Tables => MetricFamily::Tables,
            MetricArg::Diagrams => MetricFamily::Diagrams,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("POSTERLENS_LOG")
                .from_env_lossy(),
        )
        .try_init()
        .context("failed to initialize logging")?;

    match cli.command {
        Commands::Summarize {
            payload,
            base_url,
            format,
            config,
            font_policy,
            resolution_policy,
        } => {
            let overrides = Overrides {
                base_url,
                font_policy: font_policy.map(Into::into),
                resolution_policy: resolution_policy.map(Into::into),
            };
            let resolved = resolve_config(config.as_deref(), &overrides)?;
            let store = load_session(&payload, &resolved.base_url)?;

            let aggregate = summarize_stored(&store, &resolved.policies);
            match format {
                OutputFormat::Text => print!("{}", render_text(&aggregate)),
                OutputFormat::Json => println!("{}", render_json(&aggregate)),
            }
        }
        Commands::Detail {
            payload,
            metric,
            base_url,
            config,
        } => {
            let overrides = Overrides {
                base_url,
                ..Overrides::default()
            };
            let resolved = resolve_config(config.as_deref(), &overrides)?;
            let store = load_session(&payload, &resolved.base_url)?;
            let snapshot = store.get()?;

            let value = detail_json(metric.into(), snapshot, &resolved.policies)
                .context("failed to build detail view")?;
            let json =
                serde_json::to_string_pretty(&value).context("failed to serialize detail view")?;
            println!("{}", json);
        }
        Commands::Snapshot { payload, base_url } => {
            let overrides = Overrides {
                base_url,
                ..Overrides::default()
            };
            let resolved = resolve_config(None, &overrides)?;
            let store = load_session(&payload, &resolved.base_url)?;

            let json = serde_json::to_string_pretty(store.get()?)
                .context("failed to serialize snapshot")?;
            println!("{}", json);
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&root, path.as_deref(), &Overrides::default());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let root = std::env::current_dir()?;
                let resolved =
                    config::load_and_resolve(&root, path.as_deref(), &Overrides::default())
                        .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Resolve configuration from the working directory, logging where it came from
fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> anyhow::Result<ResolvedConfig> {
    let root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&root, path, overrides)
        .context("failed to load configuration")?;
    if let Some(ref p) = resolved.config_path {
        info!("Using config: {}", p.display());
    }
    debug!(
        base_url = %resolved.base_url,
        font = resolved.policies.font.name(),
        resolution = resolved.policies.resolution.name(),
        "resolved policies"
    );
    Ok(resolved)
}

/// Run one upload cycle over a payload file and hand back the session
fn load_session(payload: &Path, base_url: &str) -> anyhow::Result<SessionStore> {
    let content = std::fs::read_to_string(payload)
        .with_context(|| format!("failed to read payload: {}", payload.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse payload: {}", payload.display()))?;

    let mut store = SessionStore::new();
    let ticket = store.begin_upload();
    store
        .complete_upload(ticket, &raw, base_url)
        .with_context(|| format!("invalid evaluation payload: {}", payload.display()))?;
    Ok(store)
}

fn print_config(resolved: &ResolvedConfig) {
    let policies = &resolved.policies;

    println!("Configuration:");
    if let Some(ref p) = resolved.config_path {
        println!("  Source: {}", p.display());
    } else {
        println!("  Source: defaults (no config file found)");
    }
    println!("  Base URL: {}", resolved.base_url);
    println!();
    println!("Font:");
    match policies.font {
        FontPolicy::SingleThreshold { min_size } => {
            println!("  policy: single_threshold");
            println!("  min_size: {}", min_size);
        }
        FontPolicy::TypeAware {
            heading_min,
            body_min,
        } => {
            println!("  policy: type_aware");
            println!("  heading_min: {}", heading_min);
            println!("  body_min: {}", body_min);
        }
    }
    println!();
    println!("Resolution:");
    match policies.resolution {
        ResolutionPolicy::Dpi { min_dpi } => {
            println!("  policy: dpi");
            println!("  min_dpi: {}", min_dpi);
        }
        ResolutionPolicy::Dimensions { minimum, hd } => {
            println!("  policy: dimensions");
            println!("  minimum: {}", minimum);
            println!("  hd: {}", hd);
        }
    }
    println!();
    println!("Grades:");
    for (name, bands) in [
        ("contrast", &policies.contrast),
        ("font", &policies.font_grades),
        ("logo", &policies.logo),
        ("hyperlinks", &policies.hyperlink_list),
        ("captions", &policies.captions),
    ] {
        println!("  {}: {}", name, format_bands(bands));
    }
}

fn format_bands(bands: &GradeBands) -> String {
    match bands.warning {
        Some(warning) => format!("success >= {}%, warning >= {}%", bands.success, warning),
        None => format!("success >= {}%", bands.success),
    }
}

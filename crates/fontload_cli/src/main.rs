//! FONTLOAD CLI
//!
//! Loads font manifests against the local font database, remembering
//! completed loads in a file-backed session cache.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use fontload_cache::FileCache;
use fontload_core::{CacheKey, DEFAULT_CACHE_PREFIX, FontRequest, LoaderConfig, SettingValue, Settings};
use fontload_runtime::FontLoader;
use fontload_system::{DEFAULT_POLL_INTERVAL, SystemObserverFactory, SystemObserverOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CACHE: &str = ".fontload/session.json";
const DEFAULT_FILTER: &str = "fontload_core=info,fontload_cache=info,fontload_runtime=info,fontload_system=info";

#[derive(Parser)]
#[command(name = "fontload")]
#[command(about = "Load fonts and remember them for the session", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every font in a JSON manifest
    Load {
        /// Path to the manifest (JSON array of font requests)
        #[arg(short, long)]
        manifest: PathBuf,
        /// Session cache file
        #[arg(short, long, default_value = DEFAULT_CACHE)]
        cache: PathBuf,
        /// Loader config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Extra font directory to watch
        #[arg(long = "font-dir")]
        font_dirs: Vec<PathBuf>,
        /// Do not scan system font directories
        #[arg(long)]
        no_system_fonts: bool,
        /// Delay between font scans in milliseconds
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
        poll_ms: u64,
        /// Print metrics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the session cache key for a font
    Key {
        /// Font family name
        #[arg(short, long)]
        name: String,
        /// Style setting as key=value, in key order
        #[arg(short, long = "setting", value_parser = parse_setting)]
        settings: Vec<(String, SettingValue)>,
        /// Key prefix
        #[arg(long, default_value = DEFAULT_CACHE_PREFIX)]
        prefix: String,
    },
    /// List session cache entries
    Cache {
        /// Session cache file
        #[arg(short, long, default_value = DEFAULT_CACHE)]
        cache: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            manifest,
            cache,
            config,
            font_dirs,
            no_system_fonts,
            poll_ms,
            json,
        } => {
            let options = font_dirs.into_iter().fold(
                SystemObserverOptions::new()
                    .with_system_fonts(!no_system_fonts)
                    .with_poll_interval(Duration::from_millis(poll_ms)),
                SystemObserverOptions::with_font_dir,
            );
            run_load(manifest, cache, config, options, json).await
        }
        Commands::Key { name, settings, prefix } => {
            let settings: Settings = settings.into_iter().collect();
            let settings = (!settings.is_empty()).then_some(&settings);
            println!("{}", CacheKey::compute(&prefix, &name, settings));
            Ok(())
        }
        Commands::Cache { cache } => {
            let cache = FileCache::open(cache)?;
            for (key, loaded) in cache.entries() {
                println!("{}\t{}", key, loaded);
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(DEFAULT_FILTER)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_load(
    manifest: PathBuf,
    cache: PathBuf,
    config: Option<PathBuf>,
    options: SystemObserverOptions,
    json: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };

    let input = std::fs::read_to_string(&manifest)
        .wrap_err_with(|| format!("Failed to read manifest {}", manifest.display()))?;
    let mut requests = FontRequest::list_from_json(&input)
        .wrap_err_with(|| format!("Invalid manifest {}", manifest.display()))?;
    requests.iter_mut().for_each(announce_loads);
    tracing::info!(manifest = %manifest.display(), requests = requests.len(), "loading manifest");

    let cache = Arc::new(FileCache::open(cache)?);
    let factory = Arc::new(SystemObserverFactory::new(options));
    let loader = FontLoader::with_config(factory, cache, config);

    let result = loader.load(&requests).await;
    let detached = loader.settle_detached().await;
    let metrics = loader.metrics();

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        println!(
            "{} started, {} from cache, {} observed, {} failed",
            metrics.nodes_started, metrics.cache_hits, metrics.observations, metrics.nodes_failed
        );
    }

    result.wrap_err("Font loading failed")?;
    if !detached.is_empty() {
        for err in &detached {
            eprintln!("chained load failed: {}", err);
        }
        bail!("{} chained load(s) failed", detached.len());
    }
    Ok(())
}

/// Attach a console message to every request in the chain
fn announce_loads(request: &mut FontRequest) {
    let mut cursor = Some(request);
    while let Some(request) = cursor {
        if let Some(name) = request.family().map(str::to_string) {
            request.onload = Some(fontload_core::OnLoad::new(move || println!("loaded {}", name)));
        }
        cursor = request.next.as_deref_mut();
    }
}

/// Parse `key=value`; integers, floats and booleans keep their type
fn parse_setting(input: &str) -> Result<(String, SettingValue), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", input))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty setting name in `{}`", input));
    }

    let value = value.trim();
    let value = if let Ok(n) = value.parse::<i64>() {
        SettingValue::Int(n)
    } else if let Ok(b) = value.parse::<bool>() {
        SettingValue::Bool(b)
    } else if let Ok(x) = value.parse::<f64>() {
        SettingValue::Float(x)
    } else {
        SettingValue::Str(value.to_string())
    };
    Ok((key.to_string(), value))
}

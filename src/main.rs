//! redis2csv - Export a Redis keyspace to CSV in object storage

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;
use url::Url;

use redis2csv::config::{ExportConfig, KeyOrder, Layout, MissingValuePolicy, OutputFormat, RedisConfig};
use redis2csv::output::render_to_stdout;
use redis2csv::pipeline::ExportPipeline;
use redis2csv::source::RedisSource;
use redis2csv::store::{region_from_env, AwsCredentials, LocalFsStore, ObjectStore, S3Store};
use redis2csv::ExportError;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLayout {
    Sparse,
    KeyValue,
}

impl From<CliLayout> for Layout {
    fn from(l: CliLayout) -> Self {
        match l {
            CliLayout::Sparse => Layout::Sparse,
            CliLayout::KeyValue => Layout::KeyValue,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliKeyOrder {
    Sorted,
    Enumeration,
}

impl From<CliKeyOrder> for KeyOrder {
    fn from(o: CliKeyOrder) -> Self {
        match o {
            CliKeyOrder::Sorted => KeyOrder::Sorted,
            CliKeyOrder::Enumeration => KeyOrder::Enumeration,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOnMissing {
    Empty,
    Abort,
}

impl From<CliOnMissing> for MissingValuePolicy {
    fn from(m: CliOnMissing) -> Self {
        match m {
            CliOnMissing::Empty => MissingValuePolicy::EmptyCell,
            CliOnMissing::Abort => MissingValuePolicy::Abort,
        }
    }
}

/// Export every key in a Redis instance to a CSV object
#[derive(Parser, Debug)]
#[command(name = "redis2csv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Redis host
    #[arg(long, env = "REDIS_HOST", default_value = "127.0.0.1")]
    redis_host: String,

    /// Redis port
    #[arg(long, env = "REDIS_PORT", default_value_t = 6379)]
    redis_port: u16,

    /// Redis database index
    #[arg(long, env = "REDIS_DB", default_value_t = 0)]
    redis_db: i64,

    /// Redis ACL username
    #[arg(long, env = "REDIS_USERNAME")]
    redis_username: Option<String>,

    /// Redis password
    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    redis_password: Option<String>,

    /// Pattern passed to KEYS
    #[arg(long, env = "REDIS_KEY_PATTERN", default_value = "*")]
    pattern: String,

    /// Destination bucket (optional with --local-dir)
    #[arg(long, env = "S3_BUCKET", required_unless_present = "local_dir")]
    bucket: Option<String>,

    /// Destination object key
    #[arg(long, env = "S3_KEY", default_value = "redis_data")]
    object_key: String,

    /// Content type of the uploaded object
    #[arg(long, default_value = "text/csv")]
    content_type: String,

    /// AWS region (falls back to AWS_REGION, AWS_DEFAULT_REGION, us-east-1)
    #[arg(long)]
    region: Option<String>,

    /// S3-compatible endpoint, addressed path-style
    #[arg(long, env = "S3_ENDPOINT_URL")]
    endpoint: Option<Url>,

    /// Write to {dir}/{bucket}/{key}, or {dir}/{key} without a bucket, instead of uploading to S3
    #[arg(long)]
    local_dir: Option<PathBuf>,

    /// Table layout
    #[arg(long, value_enum, default_value = "sparse")]
    layout: CliLayout,

    /// Key ordering in the document
    #[arg(long, value_enum, default_value = "sorted")]
    key_order: CliKeyOrder,

    /// What to do with keys that vanish between KEYS and GET
    #[arg(long, value_enum, default_value = "empty")]
    on_missing: CliOnMissing,

    /// Report format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<ExportError>() {
                error!(stage = %err.stage(), "Export aborted");
            }
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let bucket = cli
        .bucket
        .unwrap_or_else(|| LocalFsStore::ROOT_BUCKET.to_string());
    let config = ExportConfig::new(bucket)
        .with_redis(RedisConfig {
            host: cli.redis_host,
            port: cli.redis_port,
            db: cli.redis_db,
            username: cli.redis_username,
            password: cli.redis_password,
        })
        .with_key_pattern(cli.pattern)
        .with_object_key(cli.object_key)
        .with_content_type(cli.content_type)
        .with_layout(cli.layout.into())
        .with_key_order(cli.key_order.into())
        .with_missing_values(cli.on_missing.into());
    config.validate()?;

    // Store before source
    let store: Box<dyn ObjectStore> = match cli.local_dir {
        Some(dir) => Box::new(LocalFsStore::new(dir)),
        None => {
            let credentials = AwsCredentials::from_env().context("Failed to load AWS credentials")?;
            let region = cli.region.unwrap_or_else(region_from_env);
            let mut s3 = S3Store::new(credentials, region)?;
            if let Some(endpoint) = cli.endpoint {
                s3 = s3.with_endpoint(endpoint);
            }
            Box::new(s3)
        }
    };

    let source = RedisSource::connect(&config.redis)
        .context("Failed to open Redis connection")?;

    let mut pipeline = ExportPipeline::new(config, source, store);
    let report = pipeline.run().context("Export failed")?;

    render_to_stdout(&report, cli.format.into())?;
    Ok(())
}

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use subsampler::{Config, SelectionPolicy, SubsampleOptions};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "subsampler",
    about = "Stream a uniform, order-preserving sample of N-line tokens from a large file"
)]
#[command(group(ArgGroup::new("policy").required(true).args(["count", "rate"])))]
struct Cli {
    /// Path to the file to subsample
    #[arg(long)]
    input: PathBuf,
    /// Path the sampled tokens are written to
    #[arg(long)]
    output: PathBuf,
    /// Number of tokens to keep
    #[arg(long)]
    count: Option<usize>,
    /// Fraction of tokens to keep, in [0, 1]
    #[arg(long)]
    rate: Option<f64>,
    /// Lines per token
    #[arg(long)]
    token_size: Option<usize>,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Log scan progress every this many lines (0 disables)
    #[arg(long)]
    log_each: Option<u64>,
    /// Scan the input on all cores
    #[arg(long)]
    parallel_scan: bool,
    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    // 加载配置
    let config = Config::from_env()?;

    let policy = match (cli.count, cli.rate) {
        (Some(count), _) => SelectionPolicy::ExactCount(count),
        (None, Some(rate)) => SelectionPolicy::Rate(rate),
        (None, None) => anyhow::bail!("either --count or --rate is required"),
    };

    let mut options = SubsampleOptions::from_config(cli.input, policy, &config);
    if let Some(token_size) = cli.token_size {
        options.token_size = token_size;
    }
    if let Some(seed) = cli.seed {
        options.seed = seed;
    }
    if let Some(log_each) = cli.log_each {
        options.log_each = log_each;
    }
    options.parallel_scan |= cli.parallel_scan;

    info!("Configuration: {:?}", options);

    let report = subsampler::run(&options, &cli.output)?;

    if let Some(path) = cli.report {
        std::fs::write(&path, serde_json::to_vec_pretty(&report)?)?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

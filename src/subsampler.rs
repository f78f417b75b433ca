use crate::config::Config;
use crate::core::{scan, scan_parallel, OffsetTable, SourceFile, TokenStream};
use crate::error::{Result, SubsampleError};
use crate::sampling::{InclusionMask, SelectionPolicy, Selector, ShuffleSelector};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SubsampleOptions {
    pub input: PathBuf,
    pub policy: SelectionPolicy,
    pub token_size: usize,
    pub seed: u64,
    pub log_each: u64,
    pub parallel_scan: bool,
    pub scan_chunk_size: usize,
    /// Known token starts; when set the input is not scanned.
    pub offsets: Option<OffsetTable>,
}

impl SubsampleOptions {
    pub fn new(input: impl Into<PathBuf>, policy: SelectionPolicy) -> Self {
        Self::from_config(input, policy, &Config::default())
    }

    pub fn from_config(
        input: impl Into<PathBuf>,
        policy: SelectionPolicy,
        config: &Config,
    ) -> Self {
        Self {
            input: input.into(),
            policy,
            token_size: config.token_size,
            seed: config.seed,
            log_each: config.log_each,
            parallel_scan: config.parallel_scan,
            scan_chunk_size: config.scan_chunk_size,
            offsets: None,
        }
    }

    pub fn token_size(mut self, token_size: usize) -> Self {
        self.token_size = token_size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn offsets(mut self, offsets: OffsetTable) -> Self {
        self.offsets = Some(offsets);
        self
    }
}

/// Tokens of `token_size` lines sampled from one file, in file order.
///
/// Construction scans and selects once; every call to [`iter`] is a new
/// pass over the same selection.
///
/// [`iter`]: SubsampledTokenStream::iter
#[derive(Debug)]
pub struct SubsampledTokenStream {
    source: SourceFile,
    token_size: usize,
    offsets: OffsetTable,
    mask: InclusionMask,
}

impl SubsampledTokenStream {
    pub fn new(options: &SubsampleOptions) -> Result<Self> {
        let source = SourceFile::open(&options.input)?;

        let offsets = match &options.offsets {
            Some(offsets) => {
                info!("Using {} offsets given as input", offsets.len());
                offsets.clone()
            }
            None => {
                info!(
                    "Scanning {} to find byte offsets of each token",
                    source.path().display()
                );
                if options.parallel_scan {
                    scan_parallel(&source, options.token_size, options.scan_chunk_size)?
                } else {
                    scan(&source, options.token_size, options.log_each)?
                }
            }
        };

        let selector = ShuffleSelector::new(options.policy, options.seed);
        let mask = selector.select(offsets.len())?;

        info!(
            "Selected {} of {} tokens ({})",
            mask.included_count(),
            offsets.len(),
            options.policy
        );

        Ok(Self {
            source,
            token_size: options.token_size,
            offsets,
            mask,
        })
    }

    pub fn iter(&self) -> Result<TokenStream> {
        TokenStream::new(self.source.clone(), &self.offsets, &self.mask, self.token_size)
    }

    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    pub fn mask(&self) -> &InclusionMask {
        &self.mask
    }

    pub fn total_tokens(&self) -> usize {
        self.offsets.len()
    }

    pub fn selected_tokens(&self) -> usize {
        self.mask.included_count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub token_size: usize,
    pub seed: u64,
    pub policy: SelectionPolicy,
    pub total_tokens: usize,
    pub selected_tokens: usize,
    pub bytes_written: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Samples `options.input` and writes the kept tokens to `output`.
///
/// Tokens go to a temporary file next to `output`, which replaces `output`
/// only once every token is written. Any failure aborts the run and leaves
/// `output` untouched.
pub fn run(options: &SubsampleOptions, output: impl AsRef<Path>) -> Result<SampleReport> {
    let output = output.as_ref();
    let started_at = Utc::now();
    let timer = Instant::now();

    let sampled = SubsampledTokenStream::new(options)?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut writer = BufWriter::new(NamedTempFile::new_in(dir)?);
    let mut bytes_written: u64 = 0;
    for token in sampled.iter()? {
        let token = token?;
        writer.write_all(&token)?;
        bytes_written += token.len() as u64;
    }

    // 全部写完后再替换目标文件
    let staged = writer.into_inner().map_err(|e| e.into_error())?;
    staged
        .persist(output)
        .map_err(|e| SubsampleError::FileAccess(e.error))?;

    let report = SampleReport {
        input: options.input.clone(),
        output: output.to_path_buf(),
        token_size: options.token_size,
        seed: options.seed,
        policy: options.policy,
        total_tokens: sampled.total_tokens(),
        selected_tokens: sampled.selected_tokens(),
        bytes_written,
        started_at,
        elapsed_ms: timer.elapsed().as_millis() as u64,
    };

    info!(
        "Wrote {} tokens ({} bytes) to {}",
        report.selected_tokens,
        report.bytes_written,
        output.display()
    );

    Ok(report)
}

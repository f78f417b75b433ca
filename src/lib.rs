//! Order-preserving random subsampling of fixed-size, multi-line records
//! ("tokens") from line-oriented files too large to load into memory.
//!
//! The pipeline is scan, then select, then stream: [`scan`] records where
//! every token starts, [`select`] picks which tokens to keep, and
//! [`TokenStream`] reads the kept ones back in file order.

pub mod config;
pub mod core;
pub mod error;
pub mod sampling;
pub mod subsampler;

pub use crate::config::Config;
pub use crate::core::{
    scan, scan_parallel, scan_with_progress, OffsetTable, SourceFile, Token, TokenStream,
};
pub use crate::error::{ErrorKind, Result, SubsampleError};
pub use crate::sampling::{select, InclusionMask, SelectionPolicy, Selector, ShuffleSelector};
pub use crate::subsampler::{run, SampleReport, SubsampleOptions, SubsampledTokenStream};

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum SubsampleError {
    // 文件相关错误
    FileNotFound(PathBuf),
    FileAccess(std::io::Error),
    TruncatedToken {
        offset: u64,
        expected: usize,
        found: usize,
    },

    // 采样错误
    TooManyTokens { requested: usize, total: usize },
    InvalidRate(f64),
    InvalidTokenSize(usize),
    UnorderedOffsets(usize),
    MaskMismatch { mask: usize, offsets: usize },
}

/// Coarse classification callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    OutOfRange,
}

impl SubsampleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_) | Self::FileAccess(_) | Self::TruncatedToken { .. } => {
                ErrorKind::Io
            }
            Self::TooManyTokens { .. }
            | Self::InvalidRate(_)
            | Self::InvalidTokenSize(_)
            | Self::UnorderedOffsets(_)
            | Self::MaskMismatch { .. } => ErrorKind::OutOfRange,
        }
    }
}

impl fmt::Display for SubsampleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            Self::FileAccess(e) => write!(f, "File access error: {}", e),
            Self::TruncatedToken {
                offset,
                expected,
                found,
            } => write!(
                f,
                "Truncated token at offset {}: expected {} lines, found {}",
                offset, expected, found
            ),
            Self::TooManyTokens { requested, total } => write!(
                f,
                "Too many tokens requested: {} of {} available",
                requested, total
            ),
            Self::InvalidRate(rate) => write!(f, "Sampling rate out of range [0, 1]: {}", rate),
            Self::InvalidTokenSize(size) => write!(f, "Invalid token size: {}", size),
            Self::UnorderedOffsets(index) => {
                write!(f, "Offsets are not strictly increasing at index {}", index)
            }
            Self::MaskMismatch { mask, offsets } => write!(
                f,
                "Inclusion mask length {} does not match {} offsets",
                mask, offsets
            ),
        }
    }
}

impl std::error::Error for SubsampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileAccess(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SubsampleError {
    fn from(e: std::io::Error) -> Self {
        Self::FileAccess(e)
    }
}

// 便捷的Result类型
pub type Result<T> = std::result::Result<T, SubsampleError>;

use crate::core::offsets::OffsetTable;
use crate::core::source::{read_lines, SourceFile};
use crate::error::{Result, SubsampleError};
use crate::sampling::InclusionMask;
use rayon::prelude::*;
use tracing::error;

/// One token's bytes, line terminators included.
pub type Token = Vec<u8>;

/// Single pass over the selected tokens in file order.
///
/// The stream owns a handle on the mapping; dropping it, finished or not,
/// releases that handle. After the first error it yields nothing more.
pub struct TokenStream {
    source: SourceFile,
    selected: Vec<u64>,
    cursor: usize,
    token_size: usize,
    failed: bool,
}

impl TokenStream {
    pub fn new(
        source: SourceFile,
        offsets: &OffsetTable,
        mask: &InclusionMask,
        token_size: usize,
    ) -> Result<Self> {
        if token_size == 0 {
            return Err(SubsampleError::InvalidTokenSize(token_size));
        }
        if mask.len() != offsets.len() {
            return Err(SubsampleError::MaskMismatch {
                mask: mask.len(),
                offsets: offsets.len(),
            });
        }

        let selected = offsets
            .starts()
            .iter()
            .zip(mask.as_slice())
            .filter_map(|(&offset, &keep)| keep.then_some(offset))
            .collect();

        Ok(Self {
            source,
            selected,
            cursor: 0,
            token_size,
            failed: false,
        })
    }

    /// Offsets still to be emitted.
    pub fn remaining(&self) -> &[u64] {
        if self.failed {
            return &[];
        }
        &self.selected[self.cursor..]
    }

    /// Reads every remaining token on the rayon pool, keeping file order.
    pub fn collect_parallel(self) -> Result<Vec<Token>> {
        let bytes = self.source.bytes();
        let token_size = self.token_size;

        self.remaining()
            .par_iter()
            .map(|&offset| read_lines(bytes, offset, token_size).map(<[u8]>::to_vec))
            .collect()
    }
}

impl Iterator for TokenStream {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let offset = *self.selected.get(self.cursor)?;
        self.cursor += 1;

        match read_lines(self.source.bytes(), offset, self.token_size) {
            Ok(token) => Some(Ok(token.to_vec())),
            Err(e) => {
                // Fast-fail: 偏移表与文件不一致
                error!("Failed to read token at offset {}: {}", offset, e);
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining().len()))
    }
}

impl std::iter::FusedIterator for TokenStream {}

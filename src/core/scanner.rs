use crate::core::offsets::OffsetTable;
use crate::core::source::{line_end, SourceFile};
use crate::error::{Result, SubsampleError};
use rayon::prelude::*;
use tracing::{debug, info};

/// Records the byte offset after every `token_size`-th line.
///
/// The first entry is always 0. Lines left over after the last complete
/// token are not part of any token. A progress line is logged every
/// `log_interval` lines; 0 disables progress logging.
pub fn scan(source: &SourceFile, token_size: usize, log_interval: u64) -> Result<OffsetTable> {
    scan_with_progress(source, token_size, log_interval, |lines| {
        info!("{} lines scanned", lines);
    })
}

/// [`scan`] with a caller-supplied progress sink, called with the running
/// line count every `log_interval` lines.
pub fn scan_with_progress<F>(
    source: &SourceFile,
    token_size: usize,
    log_interval: u64,
    mut on_progress: F,
) -> Result<OffsetTable>
where
    F: FnMut(u64),
{
    check_token_size(token_size)?;

    let bytes = source.bytes();
    let token_size = token_size as u64;
    let mut boundaries = vec![0u64];
    let mut lines: u64 = 0;
    let mut pos = 0;

    while let Some(end) = line_end(bytes, pos) {
        lines += 1;
        if lines % token_size == 0 {
            boundaries.push(end as u64);
        }
        if log_interval > 0 && lines % log_interval == 0 {
            on_progress(lines);
        }
        pos = end;
    }

    debug!(
        "Scanned {}: {} lines, {} tokens",
        source.path().display(),
        lines,
        boundaries.len() - 1
    );

    Ok(OffsetTable::from_boundaries(boundaries))
}

/// Same result as [`scan`], sharded across the rayon pool.
///
/// The first pass counts newlines per chunk; the second emits boundaries
/// knowing the line number each chunk starts at. Chunks need not be
/// aligned to line boundaries.
pub fn scan_parallel(
    source: &SourceFile,
    token_size: usize,
    chunk_size: usize,
) -> Result<OffsetTable> {
    check_token_size(token_size)?;

    let bytes = source.bytes();
    let token_size = token_size as u64;
    let chunk_size = chunk_size.max(1);

    // 第一遍：并行统计换行数
    let counts: Vec<u64> = bytes
        .par_chunks(chunk_size)
        .map(|chunk| memchr::memchr_iter(b'\n', chunk).count() as u64)
        .collect();

    let mut lines_before = Vec::with_capacity(counts.len());
    let mut terminated: u64 = 0;
    for count in &counts {
        lines_before.push(terminated);
        terminated += count;
    }

    // 第二遍：按块输出边界
    let per_chunk: Vec<Vec<u64>> = bytes
        .par_chunks(chunk_size)
        .zip(lines_before.par_iter())
        .enumerate()
        .map(|(i, (chunk, &before))| {
            let base = (i * chunk_size) as u64;
            memchr::memchr_iter(b'\n', chunk)
                .enumerate()
                .filter_map(|(j, p)| {
                    let line = before + j as u64 + 1;
                    (line % token_size == 0).then(|| base + p as u64 + 1)
                })
                .collect()
        })
        .collect();

    let mut boundaries = Vec::with_capacity(1 + (terminated / token_size) as usize);
    boundaries.push(0u64);
    for chunk in per_chunk {
        boundaries.extend(chunk);
    }

    // 最后一行可能没有换行符
    let mut lines = terminated;
    if bytes.last().is_some_and(|&b| b != b'\n') {
        lines += 1;
        if lines % token_size == 0 {
            boundaries.push(bytes.len() as u64);
        }
    }

    info!(
        "{} lines scanned in {} chunks, {} tokens",
        lines,
        counts.len(),
        boundaries.len() - 1
    );

    Ok(OffsetTable::from_boundaries(boundaries))
}

fn check_token_size(token_size: usize) -> Result<()> {
    if token_size == 0 {
        return Err(SubsampleError::InvalidTokenSize(token_size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONTENT: &[u8] = b"1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n11\n12\n";

    fn source_with(content: &[u8]) -> (NamedTempFile, SourceFile) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        let source = SourceFile::open(file.path()).unwrap();
        (file, source)
    }

    #[test]
    fn twelve_lines_in_tokens_of_four() {
        let (_file, source) = source_with(CONTENT);
        let table = scan(&source, 4, 1_000_000).unwrap();
        assert_eq!(table.boundaries(), vec![0, 8, 16, 27]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn twelve_lines_in_tokens_of_two() {
        let (_file, source) = source_with(CONTENT);
        let table = scan(&source, 2, 0).unwrap();
        assert_eq!(table.boundaries(), vec![0, 4, 8, 12, 16, 21, 27]);
    }

    #[test]
    fn trailing_partial_token_is_dropped() {
        let (_file, source) = source_with(CONTENT);
        let table = scan(&source, 5, 0).unwrap();
        // lines 1..5 end at 10, 6..10 end at 21; 11 and 12 are left over
        assert_eq!(table.starts(), &[0u64, 10]);
        assert_eq!(table.end(), Some(21));
    }

    #[test]
    fn unterminated_last_line_completes_token() {
        let (_file, source) = source_with(b"a\nb\nc\nd");
        let table = scan(&source, 2, 0).unwrap();
        assert_eq!(table.boundaries(), vec![0, 4, 7]);
    }

    #[test]
    fn empty_file_has_no_tokens() {
        let (_file, source) = source_with(b"");
        let table = scan(&source, 4, 0).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.boundaries(), vec![0]);
    }

    #[test]
    fn zero_token_size_is_rejected() {
        let (_file, source) = source_with(CONTENT);
        assert!(matches!(
            scan(&source, 0, 0),
            Err(SubsampleError::InvalidTokenSize(0))
        ));
        assert!(matches!(
            scan_parallel(&source, 0, 16),
            Err(SubsampleError::InvalidTokenSize(0))
        ));
    }

    #[test]
    fn progress_fires_every_interval() {
        let (_file, source) = source_with(CONTENT);
        let mut reported = Vec::new();
        let table = scan_with_progress(&source, 4, 5, |lines| reported.push(lines)).unwrap();
        assert_eq!(reported, vec![5, 10]);
        assert_eq!(table, scan(&source, 4, 0).unwrap());
    }

    #[test]
    fn progress_every_line_and_disabled() {
        let (_file, source) = source_with(CONTENT);
        let mut reported = Vec::new();
        scan_with_progress(&source, 3, 1, |lines| reported.push(lines)).unwrap();
        assert_eq!(reported, (1..=12).collect::<Vec<u64>>());

        let mut calls = 0;
        scan_with_progress(&source, 3, 0, |_| calls += 1).unwrap();
        assert_eq!(calls, 0);
    }

    #[test]
    fn rescanning_is_stable() {
        let (_file, source) = source_with(CONTENT);
        assert_eq!(scan(&source, 3, 0).unwrap(), scan(&source, 3, 0).unwrap());
    }

    #[test]
    fn parallel_matches_sequential_for_every_chunk_size() {
        let content: Vec<u8> = (0..500)
            .map(|i| format!("line {}\n", i * 37 % 1001))
            .collect::<String>()
            .into_bytes();
        let (_file, source) = source_with(&content);

        for token_size in [1, 3, 4, 7] {
            let expected = scan(&source, token_size, 0).unwrap();
            for chunk_size in [1, 2, 5, 64, 1024, 1 << 20] {
                assert_eq!(
                    scan_parallel(&source, token_size, chunk_size).unwrap(),
                    expected,
                    "token_size={} chunk_size={}",
                    token_size,
                    chunk_size
                );
            }
        }
    }

    #[test]
    fn parallel_handles_unterminated_tail() {
        let (_file, source) = source_with(b"a\nb\nc\nd");
        for chunk_size in [1, 3, 100] {
            assert_eq!(
                scan_parallel(&source, 2, chunk_size).unwrap(),
                scan(&source, 2, 0).unwrap()
            );
        }
    }
}
